use std::io;
use thiserror::Error;

/// Custom error types for slotsync
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed beacon: {0}")]
    MalformedBeacon(String),

    #[error("Malformed data message: {0}")]
    MalformedData(String),

    #[error("Radio error: {0}")]
    Radio(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Creates a new malformed-beacon error
    pub fn malformed_beacon(msg: impl Into<String>) -> Self {
        Error::MalformedBeacon(msg.into())
    }

    /// Creates a new malformed-data error
    pub fn malformed_data(msg: impl Into<String>) -> Self {
        Error::MalformedData(msg.into())
    }

    /// Creates a new radio error
    pub fn radio(msg: impl Into<String>) -> Self {
        Error::Radio(msg.into())
    }

    /// Creates a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }
}
