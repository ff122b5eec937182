//! Directory batch mode.
//!
//! Walks a directory tree and writes a squared copy of every file next to the
//! original, named by [`naming::output_path`](crate::naming::output_path):
//!
//! ```text
//! photos/                      photos/
//! ├── dawn.jpg          →      ├── dawn.jpg
//! └── trips/                   ├── dawn-resize.jpg
//!     └── rome.png             └── trips/
//!                                  ├── rome.png
//!                                  └── rome-resize.png
//! ```
//!
//! ## Walk Order
//!
//! Entries are visited in file-name order. The full file list is collected
//! before anything is written, so `-resize` files created during a run are
//! never picked up by the same run. The root entry itself and directories are
//! skipped.
//!
//! ## Failure Model
//!
//! Fail-fast. The first walk, read, transform or write error aborts the run
//! and is returned with the offending path. Files after that point are left
//! untouched; outputs already written stay on disk.

use crate::imaging::{Dimensions, Format, ImageBackend, ImagingError, RustBackend, SquareParams};
use crate::naming;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to process {path}: {source}")]
    Transform {
        path: PathBuf,
        #[source]
        source: ImagingError,
    },
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Progress events emitted while a batch runs.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    /// The walk finished collecting files; processing starts.
    Started { root: PathBuf, file_count: usize },
    /// One squared image was written.
    FileWritten {
        /// 1-based position in walk order.
        index: usize,
        source: PathBuf,
        output: PathBuf,
        original: Dimensions,
        side: u32,
        format: Format,
        bytes: usize,
    },
}

/// Totals for a completed batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub files: usize,
    pub bytes: u64,
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = if self.files == 1 { "file" } else { "files" };
        write!(f, "{} {} written, {} bytes", self.files, noun, self.bytes)
    }
}

/// Square every file under `root` with the pure Rust backend.
pub fn run(
    root: &Path,
    params: &SquareParams,
    events: Option<Sender<BatchEvent>>,
) -> Result<BatchSummary, BatchError> {
    run_with_backend(&RustBackend::new(), root, params, events)
}

/// Square every file under `root` using a specific backend (allows testing with mock).
pub fn run_with_backend(
    backend: &impl ImageBackend,
    root: &Path,
    params: &SquareParams,
    events: Option<Sender<BatchEvent>>,
) -> Result<BatchSummary, BatchError> {
    let files = collect_files(root)?;
    tracing::debug!(root = %root.display(), files = files.len(), "starting batch");
    if let Some(tx) = &events {
        tx.send(BatchEvent::Started {
            root: root.to_path_buf(),
            file_count: files.len(),
        })
        .ok();
    }

    let mut summary = BatchSummary::default();
    for (i, path) in files.iter().enumerate() {
        let bytes = fs::read(path).map_err(|source| BatchError::Read {
            path: path.clone(),
            source,
        })?;
        let squared = backend
            .square(&bytes, params)
            .map_err(|source| BatchError::Transform {
                path: path.clone(),
                source,
            })?;

        let output = naming::output_path(path);
        fs::write(&output, &squared.bytes).map_err(|source| BatchError::Write {
            path: output.clone(),
            source,
        })?;

        tracing::debug!(
            source = %path.display(),
            output = %output.display(),
            side = squared.side,
            "wrote squared image"
        );
        summary.files += 1;
        summary.bytes += squared.bytes.len() as u64;

        if let Some(tx) = &events {
            tx.send(BatchEvent::FileWritten {
                index: i + 1,
                source: path.clone(),
                output,
                original: squared.source,
                side: squared.side,
                format: squared.format,
                bytes: squared.bytes.len(),
            })
            .ok();
        }
    }

    Ok(summary)
}

/// Every non-directory entry under `root`, in walk order, excluding `root`.
fn collect_files(root: &Path) -> Result<Vec<PathBuf>, BatchError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if entry.path() == root || entry.file_type().is_dir() {
            continue;
        }
        files.push(entry.into_path());
    }
    Ok(files)
}
