//! Output filename derivation.
//!
//! Squared images are written next to their source with a `-resize` marker
//! inserted before the extension:
//! - `photo.png` → `photo-resize.png`
//! - `a/b/c.jpeg` → `a/b/c-resize.jpeg`
//! - `README` → `README-resize`
//!
//! The same rule names the attachment returned by the upload endpoint.

use crate::imaging::Format;
use std::path::{Path, PathBuf};

/// Marker inserted between the file stem and its extension.
pub const RESIZE_SUFFIX: &str = "-resize";

/// Sibling path for the squared version of `path`.
pub fn output_path(path: &Path) -> PathBuf {
    let mut name = path.file_stem().unwrap_or_default().to_os_string();
    name.push(RESIZE_SUFFIX);
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }
    path.with_file_name(name)
}

/// String form of [`output_path`].
pub fn output_name(path: &str) -> String {
    output_path(Path::new(path)).to_string_lossy().into_owned()
}

/// Filename for the `Content-Disposition` header of an upload response.
///
/// Only the final component of the client-supplied name is used, characters
/// that would break the quoted header value are replaced with `_`, and a
/// missing or empty name falls back to `image.<ext>` for the output format.
pub fn attachment_name(uploaded: Option<&str>, format: Format) -> String {
    let base = uploaded
        .and_then(|name| name.rsplit(['/', '\\']).next())
        .map(str::trim)
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
        .map(|name| {
            name.chars()
                .map(|c| if c == '"' || c.is_control() { '_' } else { c })
                .collect::<String>()
        })
        .unwrap_or_else(|| format!("image.{}", format.extension()));
    output_name(&base)
}
