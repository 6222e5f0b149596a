//! # automvs-report
//!
//! Job results scraped from the emulator's printer output.
//!
//! This crate provides:
//! - Parsing of `IEF142I` step completion messages
//! - Condition code checks against per-step expectations
//!
//! ## Architecture
//!
//! This is Layer 1 in the architecture - it depends only on automvs-core
//! and reads files the emulator writes. It never talks to the emulator.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod check;
pub mod parse;

// Re-export commonly used types
pub use check::{check_maxcc, check_steps, ExpectedCodes};
pub use parse::{parse_step_line, read_printer_file, scan_report, STEP_MESSAGE};
