use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while materializing the sanitized request body.
///
/// None of the variants carry request content, so they are safe to log.
#[derive(Debug, Error)]
pub enum BodyError {
    /// The host transport failed during the one-time buffering read.
    ///
    /// The buffer is left unpopulated. Reading again is not guaranteed to
    /// produce the full body, since the transport may have been partially
    /// consumed.
    #[error("failed to read request body: {0}")]
    Transport(#[source] io::Error),

    /// The body is not valid UTF-8 and cannot be sanitized as text.
    #[error("request body is not valid UTF-8 (valid up to byte {valid_up_to})")]
    NotUtf8 {
        /// Length of the longest valid UTF-8 prefix.
        valid_up_to: usize,
    },

    /// The body exceeded the configured buffering cap.
    #[error("request body exceeds the buffering limit of {limit} bytes")]
    TooLarge {
        /// The configured limit, in bytes.
        limit: usize,
    },
}

impl BodyError {
    /// Returns the `io::ErrorKind` this error surfaces as.
    pub fn kind(&self) -> io::ErrorKind {
        match self {
            BodyError::Transport(err) => err.kind(),
            BodyError::NotUtf8 { .. } => io::ErrorKind::InvalidData,
            BodyError::TooLarge { .. } => io::ErrorKind::Other,
        }
    }
}

// Body accessors keep the `io::Result` contract of a plain stream. The
// `BodyError` rides along as the inner error so callers can downcast.
impl From<BodyError> for io::Error {
    fn from(err: BodyError) -> Self {
        io::Error::new(err.kind(), err)
    }
}

/// Errors raised while loading a [`SanitizeConfig`](crate::SanitizeConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// The configuration text is not valid TOML for the schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}
