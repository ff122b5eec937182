//! # squarefit
//!
//! Letterboxes images onto a black square canvas as large as their shorter
//! edge. The image is fit-resized (Lanczos3) so its longer edge matches the
//! square, centered, and re-encoded.
//!
//! ```text
//! bytes → decode → normalize → encode → bytes
//!          (sniff)   (fit + center     (JPEG or
//!                     on black)         source format)
//! ```
//!
//! Two entry points share that pipeline and differ only in where bytes come
//! from and go to:
//!
//! - **Upload endpoint**: `POST /upload` with a multipart `file` field returns
//!   the squared image as a download.
//! - **Batch mode**: walks a directory and writes `name-resize.ext` beside
//!   every file, stopping at the first failure.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Codec, letterbox transform, [`imaging::ImageBackend`] seam |
//! | [`naming`] | `-resize` output names and attachment filenames |
//! | [`server`] | axum router: upload handler, static fallback, status mapping |
//! | [`batch`] | Fail-fast directory walker |
//! | [`config`] | Layered config: defaults → TOML file → `PORT` → CLI flags |
//! | [`output`] | CLI formatting of batch progress |
//!
//! # Design Decisions
//!
//! ## Errors Become Statuses at the Boundary
//!
//! The pipeline returns typed errors and knows nothing about HTTP. The upload
//! handler returns [`server::UploadError`], whose `IntoResponse` impl is the
//! single place a decode failure turns into a 422 or a bad content type into
//! a 415.
//!
//! ## Output Format Policy
//!
//! By default every result is JPEG, whatever was uploaded. Setting
//! `imaging.output = "preserve"` re-encodes PNG input as PNG instead. Batch
//! output keeps the source file's extension either way.

pub mod batch;
pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod server;
