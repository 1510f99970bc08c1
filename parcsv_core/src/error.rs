//! Error classifier (spec §7): maps formatter, allocator, deflate, and
//! write failures into a small taxonomy the host can act on.
//!
//! Formatters themselves never fail (inputs are domain-checked before a
//! formatter is ever called); everything below originates from
//! configuration validation, file-system interaction, or the deflate
//! codec.

use std::path::PathBuf;

use thiserror::Error;

/// The full error taxonomy for a `parcsv_core` emission.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid job configuration: out-of-range `buffMB`, zero-length
    /// `eol`, or an internal "no max-length method for this writer tag"
    /// programming error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Failed to open or create the destination file.
    #[error("{path}: {reason}")]
    Open {
        /// Destination path that could not be opened.
        path: PathBuf,
        /// Human-readable reason, already disambiguated between
        /// "exists but not writable" and "cannot create".
        reason: String,
        #[source]
        source: std::io::Error,
    },

    /// Scratch, compressed-buffer, or deflate-stream allocation failure.
    #[error("unable to allocate {mib} MiB: {source}")]
    Allocation {
        /// Requested size, in mebibytes, for the failed allocation.
        mib: u64,
        #[source]
        source: std::io::Error,
    },

    /// A non-success return from deflate stream init or `deflate()`.
    #[error("compression error (code {code}): {message}")]
    Compression {
        /// The underlying codec's error code (opaque, codec-specific).
        code: i32,
        /// Human-readable detail.
        message: String,
    },

    /// A short write or OS-level write failure (`EIO`, `ENOSPC`,
    /// `EPIPE`, ...).
    #[error("{path}: {source}")]
    Write {
        /// Destination path being written to.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Close-after-success failure. Only ever constructed when no
    /// earlier failure already explains the state (see
    /// [`Error::is_close`] and the engine's close-suppression rule).
    #[error("{path}: error closing file: {source}")]
    Close {
        /// Destination path that failed to close.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// True for [`Error::Compression`] variants — used by the engine to
    /// prefer reporting a compression failure over a write failure,
    /// since compression failing is the more likely root cause (spec
    /// §7 propagation rule).
    pub fn is_compression(&self) -> bool {
        matches!(self, Error::Compression { .. })
    }

    /// True for [`Error::Close`] variants.
    pub fn is_close(&self) -> bool {
        matches!(self, Error::Close { .. })
    }
}

/// Convenience alias used throughout `parcsv_core`.
pub type Result<T> = std::result::Result<T, Error>;
