use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while assembling a catalog or persisting settings.
///
/// Session operations never fail; only the edges that touch the filesystem do.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed csv manifest {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("malformed json manifest: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown label {value:?} for {file}")]
    UnknownLabel { file: String, value: String },

    #[error("catalog path is empty")]
    EmptyPath,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
