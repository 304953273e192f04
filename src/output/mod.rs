//! Output artifacts
//! - state.rs: single-line text file holding the last reported version
//! - feed.rs: RSS 2.0 document regenerated on every run

pub mod feed;
pub mod state;

use std::path::Path;

pub use feed::{FeedItem, render_feed, write_feed};
pub use state::FileStateStore;

use crate::version::error::PersistenceError;

/// Replace `path` with `contents` in one step.
///
/// The data goes to a hidden sibling first and is renamed over the target, so
/// readers never observe a half-written file.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), PersistenceError> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = path.with_file_name(format!(".{}.tmp", file_name));

    let to_write_error = |source| PersistenceError::Write {
        path: path.to_path_buf(),
        source,
    };

    std::fs::write(&temp_path, contents).map_err(to_write_error)?;
    std::fs::rename(&temp_path, path).map_err(|e| {
        let _ = std::fs::remove_file(&temp_path);
        to_write_error(e)
    })
}
