//! Station directory and favorites error types.

/// Errors from loading the station directory or persisting favorites.
#[derive(Debug, thiserror::Error)]
pub enum StationError {
    /// Reading or writing a file failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// File contents were not valid JSON of the expected shape
    #[error("JSON error: {message}")]
    Json { message: String },

    /// A station reference could not be resolved
    #[error("unknown station: {0}")]
    UnknownStation(String),
}

impl StationError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        StationError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
