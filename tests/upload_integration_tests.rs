//! Integration tests for TelegramUploader against a local Bot API stand-in
//!
//! These tests verify:
//! - The multipart request shape (chat_id field, document part)
//! - Streaming progress over the real request body
//! - Classification of confirmed, rejected and unparseable responses
//! - Network failures never leak the bot token
//! - The whole pipeline end to end with a file on disk

use async_trait::async_trait;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use camino::Utf8PathBuf;
use filemitra::services::{
    Delivery, DocumentUploader, FilePicker, FileSelector, FixedPrompt, GENERIC_REJECTION,
    PermissionGate, PermissionStatus, PickerError, Platform, ProgressReporter, TelegramUploader,
    UploadOutcome, describe_path,
};
use filemitra::{
    AttemptReport, FileDescriptor, RemoteConfig, StateChange, StateManager, TypeRegistry,
    UploadController,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc;

const TOKEN: &str = "123456-test-token";
const CHAT: &str = "@filemitra_test";

#[derive(Debug, Clone, Default)]
struct CapturedPart {
    name: String,
    file_name: Option<String>,
    content_type: Option<String>,
    data: Vec<u8>,
}

#[derive(Clone)]
struct ApiState {
    parts: Arc<Mutex<Vec<CapturedPart>>>,
    reply: (StatusCode, String),
}

async fn send_document(
    State(state): State<ApiState>,
    mut multipart: Multipart,
) -> (StatusCode, String) {
    while let Some(field) = multipart.next_field().await.unwrap() {
        let part = CapturedPart {
            name: field.name().unwrap_or_default().to_string(),
            file_name: field.file_name().map(str::to_string),
            content_type: field.content_type().map(str::to_string),
            data: field.bytes().await.unwrap().to_vec(),
        };
        state.parts.lock().unwrap().push(part);
    }

    state.reply.clone()
}

/// Start a stand-in Bot API answering `sendDocument` with `reply`.
async fn spawn_api(status: StatusCode, body: &str) -> (String, Arc<Mutex<Vec<CapturedPart>>>) {
    let parts = Arc::new(Mutex::new(Vec::new()));
    let state = ApiState {
        parts: Arc::clone(&parts),
        reply: (status, body.to_string()),
    };

    let app = Router::new()
        .route(&format!("/bot{}/sendDocument", TOKEN), post(send_document))
        .layer(DefaultBodyLimit::max(32 * 1024 * 1024))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), parts)
}

fn uploader(base_url: &str, chunk_size: usize) -> TelegramUploader {
    TelegramUploader::new(
        Arc::new(RemoteConfig::new(base_url, TOKEN, CHAT)),
        Duration::from_secs(10),
    )
    .unwrap()
    .with_chunk_size(chunk_size)
}

fn write_file(dir: &TempDir, name: &str, contents: &[u8]) -> Utf8PathBuf {
    let path = Utf8PathBuf::try_from(dir.path().join(name)).unwrap();
    std::fs::write(&path, contents).unwrap();
    path
}

fn collect(mut rx: mpsc::UnboundedReceiver<u8>) -> Vec<u8> {
    let mut values = Vec::new();
    while let Ok(percent) = rx.try_recv() {
        values.push(percent);
    }
    values
}

const CONFIRMED: &str = r#"{"ok":true,"result":{"message_id":4242,"chat":{"id":-100}}}"#;

#[tokio::test]
async fn test_upload_sends_multipart_document() {
    let (base_url, parts) = spawn_api(StatusCode::OK, CONFIRMED).await;
    let dir = TempDir::new().unwrap();
    let contents: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
    let path = write_file(&dir, "report.pdf", &contents);

    let file = FileDescriptor::new(&path, "report.pdf", "application/pdf", contents.len() as u64);
    let (tx, rx) = mpsc::unbounded_channel();

    let outcome = uploader(&base_url, 16 * 1024)
        .upload(&file, ProgressReporter::new(tx))
        .await;

    assert_eq!(
        outcome,
        UploadOutcome::Success(Delivery {
            message_id: Some(4242)
        })
    );

    let parts = parts.lock().unwrap().clone();
    assert_eq!(parts.len(), 2);

    let chat = parts.iter().find(|p| p.name == "chat_id").unwrap();
    assert_eq!(String::from_utf8_lossy(&chat.data), CHAT);

    let document = parts.iter().find(|p| p.name == "document").unwrap();
    assert_eq!(document.file_name.as_deref(), Some("report.pdf"));
    assert_eq!(document.content_type.as_deref(), Some("application/pdf"));
    assert_eq!(document.data, contents);

    let progress = collect(rx);
    assert!(progress.len() > 1, "expected several reports: {:?}", progress);
    assert!(progress.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(progress.last(), Some(&100));
}

#[tokio::test]
async fn test_empty_file_reports_complete() {
    let (base_url, parts) = spawn_api(StatusCode::OK, CONFIRMED).await;
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "empty.png", b"");

    let file = FileDescriptor::new(&path, "empty.png", "image/png", 0);
    let (tx, rx) = mpsc::unbounded_channel();

    let outcome = uploader(&base_url, 1024)
        .upload(&file, ProgressReporter::new(tx))
        .await;

    assert!(matches!(outcome, UploadOutcome::Success(_)));
    assert_eq!(collect(rx), vec![100]);

    let parts = parts.lock().unwrap();
    let document = parts.iter().find(|p| p.name == "document").unwrap();
    assert!(document.data.is_empty());
}

#[tokio::test]
async fn test_rejection_uses_server_description() {
    let (base_url, _parts) = spawn_api(
        StatusCode::BAD_REQUEST,
        r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#,
    )
    .await;
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "cv.docx", b"PK\x03\x04docx");
    let file = FileDescriptor::new(
        &path,
        "cv.docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        8,
    );

    let outcome = uploader(&base_url, 1024)
        .upload(&file, ProgressReporter::disabled())
        .await;

    assert_eq!(
        outcome,
        UploadOutcome::ServerRejected("Bad Request: chat not found".to_string())
    );
}

#[tokio::test]
async fn test_ok_status_without_confirmation_is_rejected() {
    let (base_url, _parts) = spawn_api(StatusCode::OK, r#"{"ok":false}"#).await;
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "a.pdf", b"%PDF-1.4");
    let file = FileDescriptor::new(&path, "a.pdf", "application/pdf", 8);

    let outcome = uploader(&base_url, 1024)
        .upload(&file, ProgressReporter::disabled())
        .await;

    assert_eq!(
        outcome,
        UploadOutcome::ServerRejected(GENERIC_REJECTION.to_string())
    );
}

#[tokio::test]
async fn test_unparseable_body_is_rejected() {
    let (base_url, _parts) =
        spawn_api(StatusCode::BAD_GATEWAY, "<html>502 Bad Gateway</html>").await;
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "a.pdf", b"%PDF-1.4");
    let file = FileDescriptor::new(&path, "a.pdf", "application/pdf", 8);

    let outcome = uploader(&base_url, 1024)
        .upload(&file, ProgressReporter::disabled())
        .await;

    assert_eq!(
        outcome,
        UploadOutcome::ServerRejected(GENERIC_REJECTION.to_string())
    );
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "a.pdf", b"%PDF-1.4");
    let file = FileDescriptor::new(&path, "a.pdf", "application/pdf", 8);

    let outcome = uploader(&format!("http://{}", addr), 1024)
        .upload(&file, ProgressReporter::disabled())
        .await;

    match outcome {
        UploadOutcome::NetworkError(detail) => {
            assert!(!detail.contains("test-token"), "token leaked: {}", detail);
            assert!(detail.starts_with("could not connect"), "detail: {}", detail);
            // The cause from the connector is kept
            assert!(detail.len() > "could not connect".len(), "detail: {}", detail);
        }
        other => panic!("expected NetworkError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_stalled_server_is_timeout() {
    let app = Router::new().route(
        &format!("/bot{}/sendDocument", TOKEN),
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            CONFIRMED
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "a.pdf", b"%PDF-1.4");
    let file = FileDescriptor::new(&path, "a.pdf", "application/pdf", 8);

    let uploader = TelegramUploader::new(
        Arc::new(RemoteConfig::new(format!("http://{}", addr), TOKEN, CHAT)),
        Duration::from_millis(300),
    )
    .unwrap();

    match uploader.upload(&file, ProgressReporter::disabled()).await {
        UploadOutcome::NetworkError(detail) => {
            assert!(detail.starts_with("request timed out"), "detail: {}", detail);
            assert!(!detail.contains("test-token"), "token leaked: {}", detail);
        }
        other => panic!("expected NetworkError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unparseable_mime_sent_as_octet_stream() {
    let (base_url, parts) = spawn_api(StatusCode::OK, CONFIRMED).await;
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "blob.pdf", b"%PDF-1.4");
    let file = FileDescriptor::new(&path, "blob.pdf", "pdf", 8);

    let outcome = uploader(&base_url, 1024)
        .upload(&file, ProgressReporter::disabled())
        .await;

    assert!(matches!(outcome, UploadOutcome::Success(_)));
    let parts = parts.lock().unwrap();
    let document = parts.iter().find(|p| p.name == "document").unwrap();
    assert_eq!(
        document.content_type.as_deref(),
        Some("application/octet-stream")
    );
    assert_eq!(document.data, b"%PDF-1.4");
}

#[tokio::test]
async fn test_missing_file_sends_nothing() {
    let (base_url, parts) = spawn_api(StatusCode::OK, CONFIRMED).await;
    let file = FileDescriptor::new(
        "/nonexistent/filemitra/gone.pdf",
        "gone.pdf",
        "application/pdf",
        1024,
    );

    let outcome = uploader(&base_url, 1024)
        .upload(&file, ProgressReporter::disabled())
        .await;

    assert!(matches!(outcome, UploadOutcome::FileUnreadable(_)));
    assert!(parts.lock().unwrap().is_empty());
}

/// Hands out one path from disk, like a user choosing it in a dialog.
struct PathPicker {
    path: Utf8PathBuf,
    registry: Arc<TypeRegistry>,
}

#[async_trait]
impl FilePicker for PathPicker {
    async fn pick(&self, _allowed: &[String]) -> Result<Option<FileDescriptor>, PickerError> {
        describe_path(&self.path, &self.registry).await.map(Some)
    }
}

#[tokio::test]
async fn test_pipeline_delivers_five_megabyte_pdf() {
    let (base_url, parts) = spawn_api(StatusCode::OK, CONFIRMED).await;
    let dir = TempDir::new().unwrap();
    let contents = vec![0x25u8; 5 * 1024 * 1024];
    let path = write_file(&dir, "Thesis.PDF", &contents);

    let registry = Arc::new(TypeRegistry::default());
    let state = Arc::new(StateManager::new());
    let mut rx = state.subscribe();

    let controller = UploadController::new(
        Arc::clone(&state),
        Arc::clone(&registry),
        PermissionGate::new(Arc::new(FixedPrompt(PermissionStatus::Granted))),
        FileSelector::new(Arc::new(PathPicker {
            path,
            registry: Arc::clone(&registry),
        })),
        Arc::new(uploader(&base_url, 64 * 1024)),
        10 * 1024 * 1024,
    )
    .with_platform(Platform::Desktop);

    let report = controller.request_pick().await;
    assert_eq!(
        report,
        AttemptReport::Uploaded(Delivery {
            message_id: Some(4242)
        })
    );

    let mut progress = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let StateChange::ProgressUpdated { percent } = event {
            progress.push(percent);
        }
    }

    // Climbs to 100, then the post-attempt reset
    assert_eq!(progress.last(), Some(&0));
    let climb = &progress[..progress.len() - 1];
    assert_eq!(climb.last(), Some(&100));
    assert!(climb.windows(2).all(|w| w[0] < w[1]));

    let parts = parts.lock().unwrap();
    let document = parts.iter().find(|p| p.name == "document").unwrap();
    assert_eq!(document.file_name.as_deref(), Some("Thesis.PDF"));
    assert_eq!(document.content_type.as_deref(), Some("application/pdf"));
    assert_eq!(document.data.len(), contents.len());
}
