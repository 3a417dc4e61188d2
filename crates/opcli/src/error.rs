use std::path::PathBuf;

/// Failures of local inputs and files. Server-side failures use [`opcli_core::Error`].
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0}")]
    InvalidArgs(String),

    #[error("Content file not found: {}", .0.display())]
    ContentFileNotFound(PathBuf),

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
