//! The interactive single-document pipeline.

use crate::ai;
use crate::error::{PipelineError, PipelineResult};
use crate::prompts::PromptProvider;
use crate::validate::validate_file;
use lectio_chat::{ChatClient, ChatStreamEvent};
use lectio_config::Config;
use lectio_core::{Literature, LiteratureId, LiteratureStatus, StreamEvent};
use lectio_store::{BlobStore, Database};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// An uploaded file about to be processed.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl IncomingFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Read an incoming file from disk, keeping its file name.
    pub fn from_path(path: &std::path::Path) -> std::io::Result<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        let bytes = std::fs::read(path)?;
        Ok(Self { name, bytes })
    }
}

/// Orchestrates document processing end to end.
///
/// Cloning is cheap: the database and chat client share their pools and the
/// prompt provider is shared behind an `Arc`.
#[derive(Clone)]
pub struct Pipeline {
    pub(crate) config: Config,
    pub(crate) db: Database,
    pub(crate) blobs: BlobStore,
    pub(crate) chat: ChatClient,
    pub(crate) prompts: Arc<PromptProvider>,
}

impl Pipeline {
    /// Build a pipeline over its collaborators.
    pub fn new(config: Config, db: Database, blobs: BlobStore) -> PipelineResult<Self> {
        let chat = ChatClient::from_config(&config.ai)?;
        let prompts = Arc::new(PromptProvider::from_config(&config.ai));

        Ok(Self {
            config,
            db,
            blobs,
            chat,
            prompts,
        })
    }

    /// The record store backing this pipeline.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Eagerly load the prompt templates; call at startup so a broken
    /// template surfaces before the first document.
    pub fn ensure_prompts(&self) -> PipelineResult<()> {
        self.prompts.ensure_loaded()
    }

    /// Process one document interactively, streaming guide fragments to
    /// `sink` as they arrive.
    ///
    /// Every failure path emits a final `error` event and leaves the record
    /// (if one was created) in `Failed` state; the whole flow is bounded by
    /// the configured stream ceiling. On success the record holds the guide
    /// and classification continues in a detached task after this method
    /// returns.
    pub async fn run_stream(
        &self,
        file: IncomingFile,
        api_key: &str,
        sink: mpsc::Sender<StreamEvent>,
    ) -> PipelineResult<()> {
        if let Err(e) = ChatClient::validate_api_key(api_key) {
            let error = PipelineError::from(e);
            send_stream_event(
                &sink,
                StreamEvent::Error {
                    message: error.to_string(),
                },
            )
            .await;
            return Err(error);
        }

        send_stream_event(&sink, StreamEvent::Start).await;

        let ceiling = Duration::from_secs(self.config.ai.stream_timeout_seconds);
        let mut literature_id: Option<LiteratureId> = None;

        let outcome = tokio::time::timeout(
            ceiling,
            self.stream_document(&file, api_key, &sink, &mut literature_id),
        )
        .await;

        let result = match outcome {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    "Document flow for {} exceeded the {}s ceiling",
                    file.name,
                    ceiling.as_secs()
                );
                Err(PipelineError::Timeout {
                    seconds: ceiling.as_secs(),
                })
            }
        };

        if let Err(e) = &result {
            self.mark_failed(literature_id.as_deref());
            send_stream_event(
                &sink,
                StreamEvent::Error {
                    message: e.to_string(),
                },
            )
            .await;
        }

        result
    }

    async fn stream_document(
        &self,
        file: &IncomingFile,
        api_key: &str,
        sink: &mpsc::Sender<StreamEvent>,
        literature_id: &mut Option<LiteratureId>,
    ) -> PipelineResult<()> {
        // Validation happens before anything reaches storage.
        let file_type = validate_file(&file.name, &file.bytes, &self.config.storage)?;

        let storage_path = self.blobs.save(&file.bytes, &file.name)?;
        send_stream_event(
            sink,
            StreamEvent::Progress {
                message: "File saved, extracting content".to_string(),
            },
        )
        .await;

        // Extraction failure leaves no record behind.
        let text = lectio_extract::extract(&storage_path, file_type)?;

        let literature = Literature::new(
            &file.name,
            storage_path.to_string_lossy(),
            file.bytes.len() as u64,
            file_type,
            text.chars().count(),
        );
        self.db.create_literature(&literature)?;
        *literature_id = Some(literature.id.clone());

        send_stream_event(
            sink,
            StreamEvent::Progress {
                message: "Content extracted, generating reading guide".to_string(),
            },
        )
        .await;

        let request = ai::guide_request(&self.config.ai, &self.prompts, &text, true)?;
        let mut stream = self.chat.complete_stream(api_key, request).await?;

        let mut guide = String::new();
        loop {
            match stream.next_event().await {
                Some(ChatStreamEvent::Content(fragment)) => {
                    // Forward immediately; whitespace-only fragments are
                    // part of the guide's formatting.
                    guide.push_str(&fragment);
                    let delivered = sink
                        .send(StreamEvent::Content { text: fragment })
                        .await
                        .is_ok();
                    if !delivered {
                        stream.cancel();
                        return Err(PipelineError::Generation(
                            "client disconnected".to_string(),
                        ));
                    }
                }
                Some(ChatStreamEvent::Done) => break,
                Some(ChatStreamEvent::Error(message)) => {
                    return Err(PipelineError::Generation(message));
                }
                None => {
                    return Err(PipelineError::Generation(
                        "stream ended unexpectedly".to_string(),
                    ));
                }
            }
        }

        if guide.trim().is_empty() {
            return Err(PipelineError::EmptyGuide);
        }

        self.db.update_reading_guide(&literature.id, &guide)?;
        info!(
            "Reading guide stored for literature {} ({} chars)",
            literature.id,
            guide.len()
        );

        // Classification runs detached; a client disconnect from here on
        // cannot stop it.
        ai::spawn_classification(
            self.chat.clone(),
            self.db.clone(),
            self.config.ai.clone(),
            self.prompts.clone(),
            api_key.to_string(),
            guide,
            literature.id.clone(),
        );

        send_stream_event(sink, StreamEvent::Complete).await;
        Ok(())
    }

    pub(crate) fn mark_failed(&self, literature_id: Option<&str>) {
        if let Some(id) = literature_id {
            if let Err(e) = self.db.update_status(id, LiteratureStatus::Failed) {
                warn!("Failed to mark literature {} as failed: {}", id, e);
            }
        }
    }
}

/// Deliver an event, tolerating a departed receiver.
pub(crate) async fn send_stream_event(sink: &mpsc::Sender<StreamEvent>, event: StreamEvent) {
    if sink.send(event).await.is_err() {
        warn!("Stream event receiver dropped");
    }
}
