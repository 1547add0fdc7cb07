//! Common error types for wavetap.
//!
//! A single Error enum covers the few failure domains the daemons have:
//! file descriptors, GPIO access, the named pipe, and configuration.

use thiserror::Error;

/// Main error type for wavetap operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors from std or tokio
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Sysfs GPIO errors
    #[error("GPIO error: {0}")]
    Gpio(#[from] linux_embedded_hal::sysfs_gpio::Error),

    /// Hardware-level faults reported by a pin backend
    #[error("Hardware error: {0}")]
    Hardware(String),

    /// Named pipe errors
    #[error("Pipe error: {0}")]
    Pipe(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience type alias for Results using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
