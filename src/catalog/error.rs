use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanWarningReason {
    #[error("file has no path")]
    EmptyPath,

    #[error("no title in metadata and no usable file name")]
    MissingTitle,

    #[error("file is not inside any folder")]
    MissingFolder,

    #[error("same path reported more than once")]
    DuplicatePath,

    #[error("unreadable: {0}")]
    Unreadable(String),
}

/// One file left out of the catalog. Never aborts a scan.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("skipped {}: {reason}", path.display())]
pub struct ScanWarning {
    pub path: PathBuf,
    pub reason: ScanWarningReason,
}

impl ScanWarning {
    pub fn new(path: impl Into<PathBuf>, reason: ScanWarningReason) -> Self {
        Self {
            path: path.into(),
            reason,
        }
    }
}

/// The media source failed as a whole.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("library root {} is not readable: {source}", path.display())]
    Root {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("scan task failed: {0}")]
    Task(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaylistError {
    #[error("playlist already exists: {0}")]
    AlreadyExists(String),

    #[error("playlist not found: {0}")]
    NotFound(String),

    #[error("playlist name is empty")]
    EmptyName,

    #[error("music not in catalog: {0}")]
    UnknownMusic(u64),
}
