//! Document delivery to the Bot API `sendDocument` endpoint.
//!
//! The file part is streamed from disk in fixed-size chunks. Each chunk
//! handed to the transport produces one progress report. Reports go through
//! a [`ProgressReporter`], which drops them silently when nobody is
//! listening, so progress can never change the outcome of an upload.

use crate::models::{FileDescriptor, RemoteConfig};
use crate::services::error::{GENERIC_REJECTION, UploadError};
use crate::services::registry::OCTET_STREAM;
use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_util::io::ReaderStream;

pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// What the server told us about a successful delivery.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delivery {
    pub message_id: Option<i64>,
}

/// Single, final result of one upload attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Success(Delivery),
    /// No response was received
    NetworkError(String),
    /// A response arrived but did not confirm the delivery
    ServerRejected(String),
    /// The file could not be opened; nothing was sent
    FileUnreadable(String),
}

impl UploadOutcome {
    pub fn into_result(self) -> Result<Delivery, UploadError> {
        match self {
            UploadOutcome::Success(delivery) => Ok(delivery),
            UploadOutcome::NetworkError(detail) => Err(UploadError::NetworkError(detail)),
            UploadOutcome::ServerRejected(description) => {
                Err(UploadError::ServerRejected(description))
            }
            UploadOutcome::FileUnreadable(detail) => Err(UploadError::FileUnreadable(detail)),
        }
    }
}

/// Sending half of the progress channel.
///
/// Reporting never fails from the caller's point of view.
#[derive(Debug, Clone, Default)]
pub struct ProgressReporter {
    tx: Option<mpsc::UnboundedSender<u8>>,
}

impl ProgressReporter {
    pub fn new(tx: mpsc::UnboundedSender<u8>) -> Self {
        Self { tx: Some(tx) }
    }

    /// A reporter that discards everything.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn report(&self, percent: u8) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(percent.min(100));
        }
    }
}

/// `round(sent * 100 / total)`, clamped to 100. An empty body counts as done.
pub fn percent_of(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }

    let sent = sent.min(total) as u128;
    let total = total as u128;
    ((sent * 100 + total / 2) / total) as u8
}

/// Remote delivery of a picked file.
#[async_trait]
pub trait DocumentUploader: Send + Sync {
    async fn upload(&self, file: &FileDescriptor, progress: ProgressReporter) -> UploadOutcome;
}

/// Bot API response envelope.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    result: Option<serde_json::Value>,
}

/// Classify a received response body.
///
/// Only `ok: true` counts as success, whatever the HTTP status says.
pub fn classify_response(body: &str) -> UploadOutcome {
    match serde_json::from_str::<ApiResponse>(body) {
        Ok(response) if response.ok => UploadOutcome::Success(Delivery {
            message_id: response
                .result
                .as_ref()
                .and_then(|r| r.get("message_id"))
                .and_then(|id| id.as_i64()),
        }),
        Ok(response) => UploadOutcome::ServerRejected(
            response
                .description
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| GENERIC_REJECTION.to_string()),
        ),
        Err(e) => {
            tracing::warn!("Unparseable upload response: {}", e);
            UploadOutcome::ServerRejected(GENERIC_REJECTION.to_string())
        }
    }
}

/// Wrap a chunk stream so every chunk that passes through is reported.
fn track_progress<S>(
    chunks: S,
    total: u64,
    progress: ProgressReporter,
) -> impl Stream<Item = std::io::Result<Bytes>> + Send + Sync + 'static
where
    S: Stream<Item = std::io::Result<Bytes>> + Send + Sync + 'static,
{
    let mut sent: u64 = 0;

    chunks.map(move |chunk| {
        if let Ok(bytes) = &chunk {
            sent += bytes.len() as u64;
            progress.report(percent_of(sent, total));
        }
        chunk
    })
}

/// Content type for the document part. Anything reqwest cannot parse as a
/// MIME type is sent as `application/octet-stream`.
fn part_content_type(mime_type: &str) -> &str {
    match Part::bytes(Vec::new()).mime_str(mime_type) {
        Ok(_) => mime_type,
        Err(e) => {
            tracing::warn!(
                "Unusable MIME type {:?} ({}), sending as {}",
                mime_type,
                e,
                OCTET_STREAM
            );
            OCTET_STREAM
        }
    }
}

/// User-facing detail for a request that got no response.
///
/// Names the failure kind and appends the source chain, which is where
/// reqwest keeps the actual cause. Call on an error already stripped of its
/// URL.
fn describe_send_error(e: &reqwest::Error) -> String {
    let kind = if e.is_timeout() {
        "request timed out"
    } else if e.is_connect() {
        "could not connect"
    } else {
        "request failed"
    };

    let mut detail = kind.to_string();
    let mut source = std::error::Error::source(e);
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !detail.ends_with(&cause_text) {
            detail.push_str(": ");
            detail.push_str(&cause_text);
        }
        source = std::error::Error::source(cause);
    }
    detail
}

/// Uploads through the Telegram Bot API.
pub struct TelegramUploader {
    client: reqwest::Client,
    config: Arc<RemoteConfig>,
    chunk_size: usize,
}

impl TelegramUploader {
    pub fn new(config: Arc<RemoteConfig>, timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            config,
            chunk_size: DEFAULT_CHUNK_SIZE,
        })
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    async fn build_form(
        &self,
        file: &FileDescriptor,
        progress: ProgressReporter,
    ) -> Result<Form, UploadOutcome> {
        let source = tokio::fs::File::open(&file.path).await.map_err(|e| {
            tracing::error!("Cannot open {}: {}", file.path, e);
            UploadOutcome::FileUnreadable(e.to_string())
        })?;

        if file.size_bytes == 0 {
            progress.report(100);
        }

        let chunks = ReaderStream::with_capacity(source, self.chunk_size);
        let body = reqwest::Body::wrap_stream(track_progress(chunks, file.size_bytes, progress));

        let document = Part::stream_with_length(body, file.size_bytes)
            .file_name(file.name.clone())
            .mime_str(part_content_type(&file.mime_type))
            .map_err(|e| {
                tracing::error!("Cannot build document part for {}: {}", file.name, e);
                UploadOutcome::ServerRejected(GENERIC_REJECTION.to_string())
            })?;

        Ok(Form::new()
            .text("chat_id", self.config.target_chat_id.clone())
            .part("document", document))
    }
}

#[async_trait]
impl DocumentUploader for TelegramUploader {
    async fn upload(&self, file: &FileDescriptor, progress: ProgressReporter) -> UploadOutcome {
        let form = match self.build_form(file, progress).await {
            Ok(form) => form,
            Err(outcome) => return outcome,
        };

        tracing::info!(
            "Uploading {} ({} bytes) to chat {}",
            file.name,
            file.size_bytes,
            self.config.target_chat_id
        );
        let start = Instant::now();

        let response = match self
            .client
            .post(self.config.send_document_url())
            .multipart(form)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                // The URL carries the bot token
                let detail = describe_send_error(&e.without_url());
                tracing::error!("Upload error: {}", detail);
                return UploadOutcome::NetworkError(detail);
            }
        };

        let status = response.status();
        let outcome = match response.text().await {
            Ok(body) => classify_response(&body),
            Err(e) => {
                tracing::warn!("Failed to read upload response: {}", e.without_url());
                UploadOutcome::ServerRejected(GENERIC_REJECTION.to_string())
            }
        };

        tracing::info!(
            "Upload of {} finished in {:.2}s with HTTP {}: {:?}",
            file.name,
            start.elapsed().as_secs_f32(),
            status.as_u16(),
            outcome
        );

        outcome
    }
}
