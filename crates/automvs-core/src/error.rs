//! Error types for automvs.

use std::time::Duration;

use thiserror::Error;

use crate::{AbortReason, StreamKind};

/// Main error type for automvs operations.
#[derive(Debug, Error)]
pub enum Error {
    /// None of the awaited strings appeared before the deadline
    #[error("Timed out after {}ms waiting on {stream} output for {targets:?}", .elapsed.as_millis())]
    WaitTimeout {
        /// Strings that were awaited
        targets: Vec<String>,
        /// Buffer that was drained
        stream: StreamKind,
        /// Time spent waiting
        elapsed: Duration,
    },

    /// Emulator could not be started
    #[error("Unable to launch emulator: {0}")]
    Launch(String),

    /// Emulator went away outside a requested shutdown or restart
    #[error("Emulator aborted: {0}")]
    ProcessAborted(AbortReason),

    /// No emulator process is running
    #[error("Session already terminated")]
    SessionTerminated,

    /// Job not present in the printer output
    #[error("Job {jobname} not found in printer output {printer_file}")]
    JobNotFound {
        /// Job name searched for
        jobname: String,
        /// Printer file that was scanned
        printer_file: String,
    },

    /// A job step ended with an unexpected condition code
    #[error("Step {stepname} condition code does not match expected condition code: {actual} vs {expected}, review {printer_file} for errors")]
    StepFailed {
        /// Step name
        stepname: String,
        /// Condition code found in the report
        actual: String,
        /// Condition code that was expected
        expected: String,
        /// Printer file holding the job output
        printer_file: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid input or parameters (generic)
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Whether this error is a wait timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::WaitTimeout { .. })
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
