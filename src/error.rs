//! Dataset faults.
//!
//! Bad input never produces an error: an invalid cell or an out-of-range coordinate is
//! just "no match". The variants here cover datasets that exist on disk but cannot be
//! used, which is a deployment problem the caller has to see.

use std::path::PathBuf;

/// Errors raised while reading or writing a dataset file.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The file exists but could not be read or written.
    #[error("dataset {path}: {source}")]
    Io {
        /// Offending dataset file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The JSON dataset is not a map of cell ids to location objects.
    #[error("dataset {path} is not valid JSON: {source}")]
    Json {
        /// Offending dataset file.
        path: PathBuf,
        /// Parser failure.
        #[source]
        source: serde_json::Error,
    },

    /// The compact dataset could not be decoded.
    #[error("dataset {path} is corrupt: {source}")]
    Decode {
        /// Offending dataset file.
        path: PathBuf,
        /// Decoder failure.
        #[source]
        source: bincode::error::DecodeError,
    },

    /// A store could not be encoded into the compact format.
    #[error("failed to encode dataset {path}: {source}")]
    Encode {
        /// Destination file.
        path: PathBuf,
        /// Encoder failure.
        #[source]
        source: bincode::error::EncodeError,
    },
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;
