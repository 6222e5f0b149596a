//! # automvs-monitor
//!
//! Output capture and liveness supervision for one emulator session.
//!
//! This crate provides:
//! - Ordered line buffers, one per emulator output stream
//! - Stream readers that decode, filter and buffer emulator output
//! - Coordination flags shared by every monitoring thread
//! - A liveness supervisor that notices when the emulator dies
//! - Blocking "wait until this string appears" with deadlines
//! - The supervised process handle itself
//!
//! ## Architecture
//!
//! This is Layer 1 in the architecture - it depends only on automvs-core.
//! The session layer builds the lifecycle controller on top of it.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod buffer;
pub mod context;
pub mod flags;
pub mod process;
pub mod reader;
pub mod sanitize;
pub mod supervisor;
pub mod wait;

// Re-export commonly used types
pub use buffer::LineBuffer;
pub use context::{AbortHandler, ExitProcess, LogOnly, ReplyToken, SessionContext, INITIAL_REPLY};
pub use flags::CoordinationFlags;
pub use process::{LaunchSpec, OutputPipes, SupervisedProcess};
pub use reader::{LineDisposition, ReaderProfile, StreamReader};
pub use sanitize::LineDecoder;
pub use supervisor::{LivenessSupervisor, Verdict, DEFAULT_LIVENESS_INTERVAL};
pub use wait::{WaitCondition, WaitResult, DEFAULT_POLL_INTERVAL, DEFAULT_WAIT_TIMEOUT};
