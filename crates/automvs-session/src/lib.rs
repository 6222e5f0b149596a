//! # automvs-session
//!
//! Emulator sessions for automvs.
//!
//! This crate provides:
//! - The lifecycle controller (launch, restart, quit handshake)
//! - Console command formatting
//! - Job submission through the socket card reader
//! - The automation facade with IPL, shutdown and submit-and-check scripts
//! - Distribution layouts and the `Mainframe` factory
//!
//! ## Architecture
//!
//! This is Layer 2 in the architecture - it depends on automvs-core,
//! automvs-monitor and automvs-report to drive emulator sessions.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod automation;
pub mod commands;
pub mod controller;
pub mod distribution;
pub mod layout;
pub mod submit;

// Re-export commonly used types
pub use automation::Automation;
pub use controller::{ControllerOptions, KillHandle, LifecycleController};
pub use distribution::{connect, connect_with, Mainframe, MvsCe, Tk4, MVSCE_LAYOUT, TK4_LAYOUT};
pub use layout::{Layout, LayoutDefaults};
pub use submit::{jobname_from_jcl, submit_deck, JobDeck};

pub use automvs_report::ExpectedCodes;
