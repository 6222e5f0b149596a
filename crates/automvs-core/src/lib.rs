//! # automvs-core
//!
//! Core types for automvs.
//!
//! This crate contains all fundamental types with **no internal dependencies**
//! on other automvs crates. It provides:
//!
//! - Error types
//! - Configuration loaded from YAML
//! - Console patterns (fatal errors, noise, reply prompts, shutdown confirmation)
//! - Stream and line types shared by the monitor and the session layer
//! - Session identity, state and abort reasons
//! - Job step status records
//!
//! ## Architecture
//!
//! This is Layer 0 in the architecture - all other crates depend on this one,
//! but this crate has no dependencies on other automvs crates.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod job;
pub mod patterns;
pub mod session;
pub mod stream;

// Re-export commonly used types
pub use config::{AutomationConfig, EmulatorSettings, OutputSettings, SubmitSettings, TimingSettings};
pub use error::{Error, Result};
pub use job::StepStatus;
pub use session::{AbortReason, SessionId, SessionState};
pub use stream::{OutputLine, StreamKind};
