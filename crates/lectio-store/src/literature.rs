//! Literature record CRUD operations.

use crate::database::Database;
use crate::error::{StoreError, StoreResult};
use chrono::{DateTime, Utc};
use lectio_core::{FileType, Literature, LiteratureStatus};
use rusqlite::params;
use tracing::info;

impl Database {
    /// Create a new literature record.
    pub fn create_literature(&self, literature: &Literature) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO literature (
                id, original_name, storage_path, size_bytes, file_type,
                content_length, reading_guide, tags, description, status,
                created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                literature.id,
                literature.original_name,
                literature.storage_path,
                literature.size_bytes as i64,
                literature.file_type.as_str(),
                literature.content_length as i64,
                literature.reading_guide,
                literature
                    .tags
                    .as_ref()
                    .map(serde_json::to_string)
                    .transpose()?,
                literature.description,
                literature.status.as_str(),
                literature.created_at.to_rfc3339(),
                literature.updated_at.to_rfc3339(),
            ],
        )?;

        info!(
            "Created literature record {} ({})",
            literature.id, literature.original_name
        );
        Ok(())
    }

    /// Get a literature record by ID.
    pub fn get_literature(&self, id: &str) -> StoreResult<Literature> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT id, original_name, storage_path, size_bytes, file_type, content_length,
                    reading_guide, tags, description, status, created_at, updated_at
             FROM literature WHERE id = ?1",
            params![id],
            row_to_literature,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => {
                StoreError::NotFound(format!("Literature not found: {}", id))
            }
            _ => StoreError::from(e),
        })
    }

    /// Store the generated reading guide for a record.
    pub fn update_reading_guide(&self, id: &str, reading_guide: &str) -> StoreResult<()> {
        let conn = self.conn()?;
        let rows = conn.execute(
            "UPDATE literature SET reading_guide = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, reading_guide, Utc::now().to_rfc3339()],
        )?;

        if rows == 0 {
            return Err(StoreError::NotFound(format!("Literature not found: {}", id)));
        }

        info!("Updated reading guide for literature {}", id);
        Ok(())
    }

    /// Store classification results and mark the record completed.
    ///
    /// Tags and description are written together; this also flips the
    /// status because a stored classification implies the guide succeeded.
    pub fn update_classification(
        &self,
        id: &str,
        tags: &[String],
        description: &str,
    ) -> StoreResult<()> {
        let conn = self.conn()?;
        let rows = conn.execute(
            "UPDATE literature
             SET tags = ?2, description = ?3, status = ?4, updated_at = ?5
             WHERE id = ?1",
            params![
                id,
                serde_json::to_string(tags)?,
                description,
                LiteratureStatus::Completed.as_str(),
                Utc::now().to_rfc3339(),
            ],
        )?;

        if rows == 0 {
            return Err(StoreError::NotFound(format!("Literature not found: {}", id)));
        }

        info!(
            "Updated classification for literature {} ({} tags)",
            id,
            tags.len()
        );
        Ok(())
    }

    /// Update only the processing status of a record.
    pub fn update_status(&self, id: &str, status: LiteratureStatus) -> StoreResult<()> {
        let conn = self.conn()?;
        let rows = conn.execute(
            "UPDATE literature SET status = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, status.as_str(), Utc::now().to_rfc3339()],
        )?;

        if rows == 0 {
            return Err(StoreError::NotFound(format!("Literature not found: {}", id)));
        }

        info!("Updated status of literature {} to {}", id, status);
        Ok(())
    }

    /// List the most recently created records.
    pub fn list_recent_literature(&self, limit: i64) -> StoreResult<Vec<Literature>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, original_name, storage_path, size_bytes, file_type, content_length,
                    reading_guide, tags, description, status, created_at, updated_at
             FROM literature ORDER BY created_at DESC LIMIT ?1",
        )?;

        let records = stmt.query_map(params![limit], row_to_literature)?;
        records
            .collect::<Result<Vec<_>, _>>()
            .map_err(StoreError::from)
    }
}

fn row_to_literature(row: &rusqlite::Row) -> rusqlite::Result<Literature> {
    let file_type_str: String = row.get(4)?;
    let tags_str: Option<String> = row.get(7)?;
    let status_str: String = row.get(9)?;
    let created_at_str: String = row.get(10)?;
    let updated_at_str: String = row.get(11)?;

    Ok(Literature {
        id: row.get(0)?,
        original_name: row.get(1)?,
        storage_path: row.get(2)?,
        size_bytes: row.get::<_, i64>(3)? as u64,
        file_type: FileType::from_str(&file_type_str).unwrap_or(FileType::Pdf),
        content_length: row.get::<_, i64>(5)? as usize,
        reading_guide: row.get(6)?,
        tags: tags_str.and_then(|s| serde_json::from_str(&s).ok()),
        description: row.get(8)?,
        status: LiteratureStatus::from_str(&status_str).unwrap_or(LiteratureStatus::Processing),
        created_at: parse_timestamp(&created_at_str),
        updated_at: parse_timestamp(&updated_at_str),
    })
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Literature {
        Literature::new("paper.pdf", "/uploads/abc.pdf", 2048, FileType::Pdf, 900)
    }

    #[test]
    fn test_literature_crud() {
        let db = Database::open_in_memory().unwrap();

        let lit = sample();
        db.create_literature(&lit).unwrap();

        let fetched = db.get_literature(&lit.id).unwrap();
        assert_eq!(fetched.original_name, "paper.pdf");
        assert_eq!(fetched.file_type, FileType::Pdf);
        assert_eq!(fetched.status, LiteratureStatus::Processing);
        assert!(fetched.reading_guide.is_none());
        assert!(fetched.tags.is_none());

        assert!(db.get_literature("missing").is_err());
    }

    #[test]
    fn test_update_reading_guide() {
        let db = Database::open_in_memory().unwrap();
        let lit = sample();
        db.create_literature(&lit).unwrap();

        db.update_reading_guide(&lit.id, "An excellent guide.").unwrap();

        let fetched = db.get_literature(&lit.id).unwrap();
        assert_eq!(fetched.reading_guide.as_deref(), Some("An excellent guide."));
        // Guide alone does not complete the record
        assert_eq!(fetched.status, LiteratureStatus::Processing);
        assert!(fetched.updated_at >= fetched.created_at);
    }

    #[test]
    fn test_update_classification_completes_record() {
        let db = Database::open_in_memory().unwrap();
        let lit = sample();
        db.create_literature(&lit).unwrap();
        db.update_reading_guide(&lit.id, "Guide text").unwrap();

        let tags = vec!["AI".to_string(), "NLP".to_string()];
        db.update_classification(&lit.id, &tags, "A short description")
            .unwrap();

        let fetched = db.get_literature(&lit.id).unwrap();
        assert_eq!(fetched.tags.as_deref(), Some(&tags[..]));
        assert_eq!(fetched.description.as_deref(), Some("A short description"));
        assert_eq!(fetched.status, LiteratureStatus::Completed);
        // Classification never touches the stored guide
        assert_eq!(fetched.reading_guide.as_deref(), Some("Guide text"));
    }

    #[test]
    fn test_update_status() {
        let db = Database::open_in_memory().unwrap();
        let lit = sample();
        db.create_literature(&lit).unwrap();

        db.update_status(&lit.id, LiteratureStatus::Failed).unwrap();
        let fetched = db.get_literature(&lit.id).unwrap();
        assert_eq!(fetched.status, LiteratureStatus::Failed);

        assert!(db.update_status("missing", LiteratureStatus::Failed).is_err());
    }

    #[test]
    fn test_tag_order_preserved() {
        let db = Database::open_in_memory().unwrap();
        let lit = sample();
        db.create_literature(&lit).unwrap();

        let tags: Vec<String> = ["zeta", "alpha", "mid"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        db.update_classification(&lit.id, &tags, "desc").unwrap();

        let fetched = db.get_literature(&lit.id).unwrap();
        assert_eq!(fetched.tags.unwrap(), tags);
    }

    #[test]
    fn test_list_recent() {
        let db = Database::open_in_memory().unwrap();
        for _ in 0..3 {
            db.create_literature(&sample()).unwrap();
        }

        let records = db.list_recent_literature(2).unwrap();
        assert_eq!(records.len(), 2);
    }
}
