//! Chat request construction and the detached classification task.

use crate::error::PipelineResult;
use crate::prompts::{PromptKind, PromptProvider};
use lectio_chat::{ChatClient, ChatRequest};
use lectio_config::AiConfig;
use lectio_core::{Classification, LiteratureId, LiteratureStatus};
use lectio_store::Database;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Token budget for classification responses; a tag list and one line of
/// description never need more.
const CLASSIFY_MAX_TOKENS: u32 = 500;

/// Lower temperature for classification keeps the JSON output on rails.
const CLASSIFY_TEMPERATURE: f64 = 0.3;

/// Build the reading-guide request for a document's extracted text.
pub(crate) fn guide_request(
    config: &AiConfig,
    prompts: &PromptProvider,
    document_text: &str,
    stream: bool,
) -> PipelineResult<ChatRequest> {
    let system = prompts.system_prompt(PromptKind::Guide)?;
    let user = format!(
        "Generate a reading guide for the following document:\n\n{}",
        document_text
    );

    Ok(ChatRequest::new(&config.model, system, user)
        .with_max_tokens(config.max_tokens)
        .with_temperature(config.temperature)
        .with_stream(stream))
}

/// Build the classification request for a finished reading guide.
pub(crate) fn classification_request(
    config: &AiConfig,
    prompts: &PromptProvider,
    reading_guide: &str,
) -> PipelineResult<ChatRequest> {
    let system = prompts.system_prompt(PromptKind::Classify)?;
    let user = format!(
        "Generate classification tags and a description for the following reading guide:\n\n{}",
        reading_guide
    );

    Ok(ChatRequest::new(&config.model, system, user)
        .with_max_tokens(CLASSIFY_MAX_TOKENS)
        .with_temperature(CLASSIFY_TEMPERATURE)
        .with_json_output())
}

/// Parse the model's structured classification output.
pub(crate) fn parse_classification(content: &str) -> Result<Classification, serde_json::Error> {
    serde_json::from_str(content.trim())
}

/// Launch classification as a detached task.
///
/// The task owns every input it needs (guide text, record id, API key);
/// nothing request-scoped crosses the boundary, so it survives the caller
/// returning or the client disconnecting. Classification is best-effort
/// enrichment: any failure leaves the record `Completed` with the
/// classification fields absent and never touches the stored guide.
pub(crate) fn spawn_classification(
    chat: ChatClient,
    db: Database,
    config: AiConfig,
    prompts: Arc<PromptProvider>,
    api_key: String,
    reading_guide: String,
    literature_id: LiteratureId,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        classify_and_store(&chat, &db, &config, &prompts, &api_key, &reading_guide, &literature_id)
            .await;
    })
}

async fn classify_and_store(
    chat: &ChatClient,
    db: &Database,
    config: &AiConfig,
    prompts: &PromptProvider,
    api_key: &str,
    reading_guide: &str,
    literature_id: &str,
) {
    let request = match classification_request(config, prompts, reading_guide) {
        Ok(request) => request,
        Err(e) => {
            warn!(
                "Could not build classification request for {}: {}",
                literature_id, e
            );
            mark_completed(db, literature_id);
            return;
        }
    };

    info!(
        "Requesting classification for literature {} (guide length {})",
        literature_id,
        reading_guide.len()
    );

    let content = match chat.complete(api_key, request).await {
        Ok(content) => content,
        Err(e) => {
            warn!("Classification call failed for {}: {}", literature_id, e);
            mark_completed(db, literature_id);
            return;
        }
    };

    match parse_classification(&content) {
        Ok(classification) => {
            match db.update_classification(literature_id, &classification.tags, &classification.desc)
            {
                Ok(()) => info!(
                    "Stored classification for literature {} ({} tags)",
                    literature_id,
                    classification.tags.len()
                ),
                Err(e) => warn!(
                    "Failed to store classification for {}: {}",
                    literature_id, e
                ),
            }
        }
        Err(e) => {
            warn!(
                "Failed to parse classification result for {}: {} - {}",
                literature_id, e, content
            );
            mark_completed(db, literature_id);
        }
    }
}

fn mark_completed(db: &Database, literature_id: &str) {
    if let Err(e) = db.update_status(literature_id, LiteratureStatus::Completed) {
        warn!("Failed to update status for {}: {}", literature_id, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_classification() {
        let parsed =
            parse_classification(r#"  {"tags":["AI","NLP"],"desc":"Survey paper."}  "#).unwrap();
        assert_eq!(parsed.tags, vec!["AI", "NLP"]);
        assert_eq!(parsed.desc, "Survey paper.");

        assert!(parse_classification("not json").is_err());
        assert!(parse_classification(r#"{"tags": "wrong-shape"}"#).is_err());
    }
}
