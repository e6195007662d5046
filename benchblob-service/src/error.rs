use std::path::PathBuf;

use bytesize::ByteSize;
use thiserror::Error;

/// Errors that can occur while generating benchmark files.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// The output disk does not have enough room for the next file.
    #[error("insufficient disk space: need {needed} but only {available} is available")]
    InsufficientSpace {
        /// Bytes required for the next file, including the configured reserve.
        needed: ByteSize,
        /// Bytes currently available on the output filesystem.
        available: ByteSize,
    },

    /// The `openssl` strategy was requested but the host cannot run it.
    #[error("the openssl strategy is unavailable on this host")]
    OpenSslUnavailable,

    /// The byte source ended before the expected number of bytes was produced.
    #[error("byte source produced {actual} of {expected} expected bytes")]
    ShortRead {
        /// The number of bytes that should have been produced.
        expected: u64,
        /// The number of bytes actually produced.
        actual: u64,
    },

    /// A finished file does not have the expected byte length.
    #[error("{path:?} has {actual} bytes, expected {expected}")]
    SizeMismatch {
        /// Path of the offending file.
        path: PathBuf,
        /// The expected byte length.
        expected: u64,
        /// The byte length found on disk.
        actual: u64,
    },

    /// The configured size ladder contains the same size twice.
    #[error("duplicate size in ladder: {0}")]
    DuplicateSize(ByteSize),

    /// An I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
