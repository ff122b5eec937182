//! CLI output formatting for batch runs.
//!
//! ```text
//! Squaring 3 files under photos/
//! 001 dawn.jpg
//!     Source: photos/dawn.jpg
//!     1920x1080 → 1080x1080 jpeg (183204 bytes)
//!     Output: photos/dawn-resize.jpg
//! ```
//!
//! Format functions are pure and return `Vec<String>` for testability; `main`
//! prints them as events arrive.

use crate::batch::BatchEvent;
use std::path::Path;

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Render one batch event as output lines.
pub fn format_batch_event(event: &BatchEvent) -> Vec<String> {
    match event {
        BatchEvent::Started { root, file_count } => {
            let noun = if *file_count == 1 { "file" } else { "files" };
            vec![format!(
                "Squaring {} {} under {}",
                file_count,
                noun,
                root.display()
            )]
        }
        BatchEvent::FileWritten {
            index,
            source,
            output,
            original,
            side,
            format,
            bytes,
        } => vec![
            format!("{:03} {}", index, file_label(source)),
            format!("    Source: {}", source.display()),
            format!(
                "    {}x{} → {}x{} {} ({} bytes)",
                original.width, original.height, side, side, format, bytes
            ),
            format!("    Output: {}", output.display()),
        ],
    }
}
