use inspect::InspectError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiagramError {
    #[error("IO error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Inspect error: {0}")]
    Inspect(#[from] InspectError),
}

pub type Result<T> = std::result::Result<T, DiagramError>;
