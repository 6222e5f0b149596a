//! # automvs
//!
//! Command line front end for the automvs crates.
//!
//! ## Architecture
//!
//! This is Layer 3 in the architecture - it parses arguments, loads the
//! configuration, sets up logging and runs one session to completion.
//! The binary is in main.rs.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod run;
pub mod schema;

// Re-export commonly used types
pub use cli::{Cli, Commands};
pub use run::{default_log_filter, execute, exit_code, load_config, load_decks, run, JobReport};
pub use schema::{config_schema, SchemaTransformer};
