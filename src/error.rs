//! Error types for the interface detector
//!
//! This module defines the errors that abort a whole operation: reading body
//! input, loading configuration, and detection preconditions. Per-face
//! extraction problems are not errors; see [`crate::catalog::SkipReason`].

use thiserror::Error;

/// Error types for interface detection operations
#[derive(Error, Debug)]
pub enum InterfaceDetectorError {
    /// Detection was requested over an empty body set
    ///
    /// This is the only hard precondition of a detection run. Everything
    /// else (unsupported faces, open loops) is skipped and logged.
    #[error("No bodies supplied for contact detection")]
    EmptyBodySet,

    /// Body input is malformed
    ///
    /// Raised when reading a body set whose structure is invalid, such as
    /// duplicate face ids or coordinate arrays of the wrong length.
    #[error("Invalid body definition: {0}")]
    InvalidBodyDefinition(String),

    /// File I/O error
    ///
    /// Wraps standard I/O errors from file operations.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration error
    ///
    /// Invalid configuration file format, missing required fields,
    /// or invalid parameter values.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Geometric computation error
    #[error("Geometry error: {0}")]
    GeometryError(String),
}

/// Convenience type alias for Results with [`InterfaceDetectorError`]
///
/// # Example
/// ```
/// use interface_detector::Result;
///
/// fn my_function() -> Result<()> {
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, InterfaceDetectorError>;
