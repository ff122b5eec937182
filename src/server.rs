//! HTTP surface.
//!
//! ```text
//! POST /upload   multipart field "file" → squared image as an attachment
//! *    /upload   303 → /
//! *    /*        static files from server.public_dir
//! ```
//!
//! ## Status Mapping
//!
//! The handler returns `Result<Response, UploadError>`; [`UploadError`] is the
//! only place pipeline errors become HTTP statuses:
//!
//! | Error | Status |
//! |---|---|
//! | body is not multipart / malformed | 400 |
//! | no `file` field | 400 |
//! | body over `server.max_upload_bytes` | 413 |
//! | declared type not JPEG/PNG, or GIF etc. inside | 415 |
//! | bytes do not decode | 422 |
//! | encode failure, worker panic | 500 |
//!
//! Decoding and encoding are CPU-bound and run on tokio's blocking pool.

use crate::config::Config;
use crate::imaging::{Format, ImageBackend, ImagingError, RustBackend, SquareParams};
use crate::naming;
use axum::Router;
use axum::body::Bytes;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::post;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Name of the multipart field carrying the image.
pub const FILE_FIELD: &str = "file";

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Invalid upload request: {0}")]
    Rejected(#[from] MultipartRejection),
    #[error("Invalid multipart body: {0}")]
    Multipart(#[from] MultipartError),
    #[error("Missing form field \"file\"")]
    MissingField,
    #[error("Unsupported content type {0:?}; expected image/jpeg, image/jpg or image/png")]
    UnsupportedMediaType(String),
    #[error(transparent)]
    Imaging(#[from] ImagingError),
    #[error("Image worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl UploadError {
    pub fn status(&self) -> StatusCode {
        match self {
            UploadError::Rejected(rejection) => rejection.status(),
            UploadError::Multipart(err) => err.status(),
            UploadError::MissingField => StatusCode::BAD_REQUEST,
            UploadError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            UploadError::Imaging(ImagingError::Decode(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            UploadError::Imaging(ImagingError::UnsupportedFormat(_)) => {
                StatusCode::UNSUPPORTED_MEDIA_TYPE
            }
            UploadError::Imaging(ImagingError::Encode(_)) | UploadError::Worker(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(%status, error = %self, "upload failed");
        } else {
            tracing::warn!(%status, error = %self, "upload rejected");
        }
        (status, self.to_string()).into_response()
    }
}

/// State shared by every request.
#[derive(Clone)]
struct AppState {
    backend: Arc<dyn ImageBackend>,
    params: SquareParams,
}

/// The HTTP server, built from an explicit [`Config`].
pub struct Server {
    config: Config,
    backend: Arc<dyn ImageBackend>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self::with_backend(config, Arc::new(RustBackend::new()))
    }

    /// Build a server around a specific backend (allows testing with mock).
    pub fn with_backend(config: Config, backend: Arc<dyn ImageBackend>) -> Self {
        Self { config, backend }
    }

    /// Routes, static fallback, body limit and request tracing.
    pub fn router(&self) -> Router {
        let state = AppState {
            backend: Arc::clone(&self.backend),
            params: self.config.imaging.params(),
        };
        Router::new()
            .route("/upload", post(upload).fallback(redirect_home))
            .fallback_service(ServeDir::new(&self.config.server.public_dir))
            .layer(DefaultBodyLimit::max(self.config.server.max_upload_bytes))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Bind and serve until Ctrl-C.
    pub async fn run(self) -> Result<(), ServeError> {
        let address = self.config.server.bind_address();
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|source| ServeError::Bind {
                address: address.clone(),
                source,
            })?;
        tracing::info!(
            %address,
            public_dir = %self.config.server.public_dir.display(),
            "starting server"
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutting down"),
        Err(err) => {
            // Without a signal handler the server can only be killed
            tracing::error!("failed to install Ctrl-C handler: {err}");
            std::future::pending::<()>().await;
        }
    }
}

async fn redirect_home() -> Redirect {
    tracing::warn!("upload endpoint only accepts POST, redirecting to /");
    Redirect::to("/")
}

/// The `file` part of an upload form.
struct UploadedFile {
    file_name: Option<String>,
    bytes: Bytes,
}

/// Find the `file` field, check its declared type, and read its body.
async fn read_file_field(multipart: &mut Multipart) -> Result<UploadedFile, UploadError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let declared = field.content_type().unwrap_or_default().to_string();
        if Format::from_mime(&declared).is_none() {
            return Err(UploadError::UnsupportedMediaType(declared));
        }
        let file_name = field.file_name().map(str::to_owned);
        let bytes = field.bytes().await?;
        return Ok(UploadedFile { file_name, bytes });
    }
    Err(UploadError::MissingField)
}

async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, UploadError> {
    let mut multipart = multipart?;
    let file = read_file_field(&mut multipart).await?;

    let backend = Arc::clone(&state.backend);
    let params = state.params;
    let bytes = file.bytes;
    let squared = tokio::task::spawn_blocking(move || backend.square(&bytes, &params)).await??;

    let filename = naming::attachment_name(file.file_name.as_deref(), squared.format);
    tracing::info!(
        width = squared.source.width,
        height = squared.source.height,
        side = squared.side,
        format = %squared.format,
        %filename,
        "upload squared"
    );

    let headers = [
        (header::CONTENT_TYPE, squared.format.mime_type().to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ),
        (header::CONTENT_LENGTH, squared.bytes.len().to_string()),
    ];
    Ok((StatusCode::OK, headers, squared.bytes).into_response())
}
