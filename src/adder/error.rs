use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("time server {addr}: {source}")]
    Network {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: {source}")]
    Bincode {
        path: PathBuf,
        #[source]
        source: bincode::Error,
    },

    #[error("expected a word of {expected} bits, got {actual}")]
    WordLength { expected: usize, actual: usize },

    #[error("{path}: unexpected data after {count} ciphertexts")]
    TrailingData { path: PathBuf, count: usize },

    #[error("carry must be 0 or 1, got {0}")]
    InvalidCarry(i32),

    #[error("{path}: not a timestamp: {value:?}")]
    InvalidTimestamp { path: PathBuf, value: String },

    #[error("transport key must be 16, 24 or 32 bytes, got {0}")]
    TransportKeyLength(usize),

    #[error("transport key is not hex: {0}")]
    TransportKeyHex(#[from] hex::FromHexError),

    #[error("{path}: not a sealed file: {reason}")]
    SealedFormat { path: PathBuf, reason: &'static str },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn bincode(path: impl Into<PathBuf>, source: bincode::Error) -> Self {
        Self::Bincode {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
