//! Web server for the intake API.
//!
//! One liveness route, one upload route. Uploads are staged on disk
//! under the configured directory, keyed by sanitized filename; a
//! colliding concurrent upload is last-writer-wins by design.

mod handlers;
mod routes;

pub use routes::create_router;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Settings;
use crate::llm::LlmClient;
use crate::services::IntakeService;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub intake: Arc<IntakeService>,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&settings.upload_dir)?;
        let summarizer = Arc::new(LlmClient::new(settings.llm.clone()));

        Ok(Self {
            intake: Arc::new(IntakeService::new(summarizer)),
            upload_dir: settings.upload_dir.clone(),
            max_upload_bytes: settings.max_upload_bytes,
        })
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(settings)?;
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tempfile::tempdir;
    use tower::ServiceExt;

    use crate::llm::CannedSummarizer;

    fn test_state(upload_dir: &std::path::Path) -> AppState {
        let summarizer = Arc::new(CannedSummarizer {
            description: "Access Card Reader\n\nA wall-mounted reader beside a door.".to_string(),
            findings: "- Digital access control\n- Depends on card validity\n".to_string(),
        });
        AppState {
            intake: Arc::new(IntakeService::new(summarizer)),
            upload_dir: upload_dir.to_path_buf(),
            max_upload_bytes: 1024 * 1024,
        }
    }

    fn multipart_request(filename: &str, content: &[u8]) -> Request<Body> {
        let boundary = "test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    const PNG_STUB: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 1, 2, 3, 4];

    #[tokio::test]
    async fn health_route_responds() {
        let dir = tempdir().unwrap();
        let app = create_router(test_state(dir.path()));

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(String::from_utf8_lossy(&body).contains("running"));
    }

    #[tokio::test]
    async fn upload_image_returns_full_result_shape() {
        let dir = tempdir().unwrap();
        let app = create_router(test_state(dir.path()));

        let response = app
            .oneshot(multipart_request("badge-reader.png", PNG_STUB))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["filename"], "badge-reader.png");
        assert_eq!(json["file_type"], "Image");
        assert!(json["file_description"]
            .as_str()
            .unwrap()
            .contains("Access Card Reader"));
        assert_eq!(json["key_findings"][0], "- Digital access control");
    }

    #[tokio::test]
    async fn upload_rejects_disallowed_extension_before_processing() {
        let dir = tempdir().unwrap();
        let app = create_router(test_state(dir.path()));

        let response = app
            .oneshot(multipart_request("notes.docx", b"stub"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["error"].as_str().unwrap().contains("not allowed"));
        // Rejected uploads are never staged.
        assert!(!dir.path().join("notes.docx").exists());
    }

    #[tokio::test]
    async fn upload_without_file_field_is_rejected() {
        let dir = tempdir().unwrap();
        let app = create_router(test_state(dir.path()));

        let boundary = "test-boundary";
        let body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\nvalue\r\n--{boundary}--\r\n"
        );
        let request = Request::builder()
            .method("POST")
            .uri("/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn upload_sanitizes_hostile_filenames() {
        let dir = tempdir().unwrap();
        let app = create_router(test_state(dir.path()));

        let response = app
            .oneshot(multipart_request("../../escape.png", PNG_STUB))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["filename"], "escape.png");
        assert!(dir.path().join("escape.png").exists());
    }
}
