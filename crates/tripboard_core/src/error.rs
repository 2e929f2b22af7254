use std::fmt;

use crate::model::PointId;

/// Errors converting a wire record into a point
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointError {
    /// `date_from` / `date_to` was not a valid RFC 3339 timestamp
    InvalidDate { field: &'static str, value: String },
    /// The record could not be decoded at all
    Malformed(String),
}

impl fmt::Display for PointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointError::InvalidDate { field, value } => {
                write!(f, "invalid {field} timestamp {value:?}")
            }
            PointError::Malformed(msg) => write!(f, "malformed point record: {msg}"),
        }
    }
}

impl std::error::Error for PointError {}

/// Errors parsing dates typed into the edit form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    /// Text did not match the configured format
    Format { input: String, format: &'static str },
    /// Civil time does not exist or is ambiguous in the configured zone
    Zone(String),
}

impl fmt::Display for DateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateError::Format { input, format } => {
                write!(f, "{input:?} does not match date format {format}")
            }
            DateError::Zone(msg) => write!(f, "cannot place date in time zone: {msg}"),
        }
    }
}

impl std::error::Error for DateError {}

/// Errors returned by a persistence backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Filesystem failure
    Io(String),
    /// Stored or received data could not be decoded
    Parse(String),
    /// Data could not be encoded for storage or transport
    Serialize(String),
    /// Transport level failure talking to the remote API
    Network(String),
    /// Remote API answered with a non-success status
    Status { code: u16, message: String },
    /// The point to update or delete does not exist
    NotFound(PointId),
    /// A point with this id already exists
    Conflict(PointId),
    /// Failure injected by a test backend
    Injected(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Io(msg) => write!(f, "IO error: {msg}"),
            BackendError::Parse(msg) => write!(f, "Parse error: {msg}"),
            BackendError::Serialize(msg) => write!(f, "Serialization error: {msg}"),
            BackendError::Network(msg) => write!(f, "Network error: {msg}"),
            BackendError::Status { code, message } => {
                write!(f, "Server responded {code}: {message}")
            }
            BackendError::NotFound(id) => write!(f, "point {id} not found"),
            BackendError::Conflict(id) => write!(f, "point {id} already exists"),
            BackendError::Injected(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for BackendError {}
