//! The batch import pipeline.
//!
//! Batch mode runs one task per file (the work is I/O-bound, so there is no
//! cap below the file count), uses the blocking guide call instead of the
//! streaming one, and reports coarse per-file milestones. A shared atomic
//! counter decides when the single terminal event fires.

use crate::ai;
use crate::error::{PipelineError, PipelineResult};
use crate::pipeline::{IncomingFile, Pipeline};
use crate::validate::validate_file;
use lectio_chat::ChatClient;
use lectio_core::{BatchEvent, Literature, LiteratureId, LiteratureStatus};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

impl Pipeline {
    /// Import a batch of files concurrently.
    ///
    /// The API key is validated once up front; a bad key fails the whole
    /// batch before any file is touched. Per-file failures are isolated:
    /// every file is attempted, each is counted exactly once, and exactly
    /// one `batch_complete` event closes the stream.
    pub async fn run_batch(
        &self,
        files: Vec<IncomingFile>,
        api_key: &str,
        sink: mpsc::Sender<BatchEvent>,
    ) -> PipelineResult<()> {
        ChatClient::validate_api_key(api_key)?;

        if files.is_empty() {
            return Err(PipelineError::Validation(
                "No files provided for batch import".to_string(),
            ));
        }
        let max_files = self.config.batch.max_files;
        if files.len() > max_files {
            return Err(PipelineError::Validation(format!(
                "Batch size exceeds the limit of {} files",
                max_files
            )));
        }

        let total = files.len();
        info!("Starting batch import of {} files", total);
        send_batch_event(&sink, BatchEvent::BatchStart { total }).await;

        let completed = Arc::new(AtomicUsize::new(0));
        let errors = Arc::new(AtomicUsize::new(0));

        // Indices are fixed at submission order; nothing re-derives them
        // from list positions later.
        let mut handles = Vec::with_capacity(total);
        for (index, file) in files.into_iter().enumerate() {
            let pipeline = self.clone();
            let sink = sink.clone();
            let api_key = api_key.to_string();
            let completed = completed.clone();
            let errors = errors.clone();

            handles.push(tokio::spawn(async move {
                pipeline
                    .process_batch_file(index, file, &api_key, &sink, &completed, &errors, total)
                    .await;
            }));
        }

        let ceiling = Duration::from_secs(self.config.batch.timeout_seconds);
        match tokio::time::timeout(ceiling, futures_util::future::join_all(handles)).await {
            Ok(_) => Ok(()),
            Err(_) => {
                warn!("Batch import exceeded the {}s ceiling", ceiling.as_secs());
                Err(PipelineError::Timeout {
                    seconds: ceiling.as_secs(),
                })
            }
        }
    }

    async fn process_batch_file(
        &self,
        index: usize,
        file: IncomingFile,
        api_key: &str,
        sink: &mpsc::Sender<BatchEvent>,
        completed: &AtomicUsize,
        errors: &AtomicUsize,
        total: usize,
    ) {
        send_batch_event(
            sink,
            BatchEvent::FileStart {
                index,
                filename: file.name.clone(),
            },
        )
        .await;

        match self.import_file(index, &file, api_key, sink).await {
            Ok(literature_id) => {
                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                send_batch_event(
                    sink,
                    BatchEvent::FileComplete {
                        index,
                        literature_id,
                        completed: done,
                        total,
                    },
                )
                .await;

                if done == total {
                    send_batch_event(
                        sink,
                        BatchEvent::BatchComplete {
                            total,
                            errors: errors.load(Ordering::SeqCst),
                        },
                    )
                    .await;
                }
            }
            Err((error, literature_id)) => {
                warn!("Batch file {} failed: {}", file.name, error);
                if let Some(id) = literature_id.as_deref() {
                    if let Err(e) = self.db.update_status(id, LiteratureStatus::Failed) {
                        warn!("Failed to mark literature {} as failed: {}", id, e);
                    }
                }

                errors.fetch_add(1, Ordering::SeqCst);
                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                send_batch_event(
                    sink,
                    BatchEvent::FileError {
                        index,
                        filename: file.name,
                        error: error.to_string(),
                        completed: done,
                        total,
                    },
                )
                .await;

                if done == total {
                    send_batch_event(
                        sink,
                        BatchEvent::BatchComplete {
                            total,
                            errors: errors.load(Ordering::SeqCst),
                        },
                    )
                    .await;
                }
            }
        }
    }

    /// Run one file through the non-streaming variant of the pipeline.
    ///
    /// Returns the created record id, or the failure paired with the id if
    /// a record already existed when the failure happened.
    async fn import_file(
        &self,
        index: usize,
        file: &IncomingFile,
        api_key: &str,
        sink: &mpsc::Sender<BatchEvent>,
    ) -> Result<LiteratureId, (PipelineError, Option<LiteratureId>)> {
        let file_type = validate_file(&file.name, &file.bytes, &self.config.storage)
            .map_err(|e| (e, None))?;

        let storage_path = self
            .blobs
            .save(&file.bytes, &file.name)
            .map_err(|e| (PipelineError::from(e), None))?;

        // Extraction failure leaves no record behind.
        let text = lectio_extract::extract(&storage_path, file_type)
            .map_err(|e| (PipelineError::from(e), None))?;

        let literature = Literature::new(
            &file.name,
            storage_path.to_string_lossy(),
            file.bytes.len() as u64,
            file_type,
            text.chars().count(),
        );
        self.db
            .create_literature(&literature)
            .map_err(|e| (PipelineError::from(e), None))?;
        let literature_id = literature.id.clone();

        send_batch_event(
            sink,
            BatchEvent::FileSaved {
                index,
                literature_id: literature_id.clone(),
            },
        )
        .await;

        let request = ai::guide_request(&self.config.ai, &self.prompts, &text, false)
            .map_err(|e| (e, Some(literature_id.clone())))?;
        let guide = self
            .chat
            .complete(api_key, request)
            .await
            .map_err(|e| (PipelineError::from(e), Some(literature_id.clone())))?;

        self.db
            .update_reading_guide(&literature_id, &guide)
            .map_err(|e| (PipelineError::from(e), Some(literature_id.clone())))?;

        ai::spawn_classification(
            self.chat.clone(),
            self.db.clone(),
            self.config.ai.clone(),
            self.prompts.clone(),
            api_key.to_string(),
            guide,
            literature_id.clone(),
        );

        Ok(literature_id)
    }
}

/// Deliver a batch event, tolerating a departed receiver.
async fn send_batch_event(sink: &mpsc::Sender<BatchEvent>, event: BatchEvent) {
    if sink.send(event).await.is_err() {
        warn!("Batch event receiver dropped");
    }
}
