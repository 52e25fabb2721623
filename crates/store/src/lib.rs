//! Local persistence for comic projects.
//!
//! All projects live in one JSON document (`comic-projects.json`) inside the
//! data directory. Every write replaces the whole document, so the last
//! writer for a project id wins.

mod projects;

pub use projects::ProjectStore;

/// File name of the project document inside the data directory.
pub const STORE_FILE_NAME: &str = "comic-projects.json";

/// Errors from writing the project document.
///
/// Reads never fail: a missing or unreadable document is treated as an
/// empty project list.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize projects: {0}")]
    Serialize(#[from] serde_json::Error),
}
