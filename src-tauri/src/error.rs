use std::path::PathBuf;
use std::time::Duration;

/// Errors surfaced by workbench filesystem operations.
///
/// Per-file failures inside a batch never become a `WorkbenchError`; they are
/// collected into the batch report instead. Only the variants below cross a
/// function boundary.
#[derive(Debug, thiserror::Error)]
pub enum WorkbenchError {
    #[error("Cannot create target folder {}: {source}", .path.display())]
    CreateTarget {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Folder does not exist: {}", .0.display())]
    FolderMissing(PathBuf),

    #[error("Path does not exist: {}", .0.display())]
    PathMissing(PathBuf),

    #[error("A file or folder named {0} already exists")]
    AlreadyExists(String),

    #[error("Invalid name: {0:?}")]
    InvalidName(String),

    #[error("Operation timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Background task failed: {0}")]
    TaskFailed(String),

    #[error("Invalid name pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, WorkbenchError>;
