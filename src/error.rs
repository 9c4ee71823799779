//! Error types for Synheart Pulse
//!
//! Errors exist only at the crate edges (input parsing, file I/O). Inside
//! the scoring core every failure mode degrades to absent data or a neutral
//! score rather than an error.

use thiserror::Error;

/// Errors that can occur at the crate boundary
#[derive(Debug, Error)]
pub enum PulseError {
    #[error("Failed to parse day records: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
