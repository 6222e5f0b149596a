//! Command line definition.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

const LONG_ABOUT: &str = r#"automvs drives an MVS 3.8j system running under the Hercules emulator.

Each command boots the configured distribution, does its work and shuts the
system down again. Console output is logged on stderr; results go to stdout.

EXIT CODES:
    0  success
    1  failure (launch, configuration, aborted emulator, ...)
    2  timed out waiting for console output
    3  a job step ended with an unexpected condition code

EXAMPLES:
    # Boot with CLPA and shut down
    automvs --location ~/mvsce ipl --clpa

    # Submit two decks and check every step ended with 0000
    automvs -c automvs.yaml submit build.jcl test.jcl

    # Print the configuration schema for editors
    automvs config-schema --draft07"#;

#[derive(Debug, Parser)]
#[command(name = "automvs")]
#[command(author, version)]
#[command(about = "Automate MVS 3.8j running under Hercules")]
#[command(long_about = LONG_ABOUT)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// YAML configuration file
    #[arg(short, long, global = true, env = "AUTOMVS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Distribution folder (overrides the configuration)
    #[arg(short, long, global = true)]
    pub location: Option<PathBuf>,

    /// Distribution: mvsce or tk4 (overrides the configuration)
    #[arg(short, long, global = true)]
    pub distribution: Option<String>,

    /// Seconds to wait for any console message (overrides the configuration)
    #[arg(short, long, global = true)]
    pub timeout: Option<u64>,

    /// More output: -v logs debug messages, -vv also every diagnostic line
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// IPL the system, then shut it down
    Ipl {
        /// Answer the console prompt with CLPA
        #[arg(long)]
        clpa: bool,
    },

    /// Submit job decks and check their condition codes
    #[command(long_about = r#"Submit job decks and check their condition codes.

The system is IPLed first. Decks are submitted one at a time through the
socket card reader; each must be purged by JES2 before the next is sent.
Step results are printed as JSON.

EXAMPLES:
    automvs submit build.jcl
    automvs submit --ebcdic --jobname RELEASE release.ebcdic
    automvs submit --no-check install.jcl"#)]
    Submit {
        /// JCL files to submit, in order
        #[arg(required = true)]
        decks: Vec<PathBuf>,

        /// Job name to wait for (taken from the JOB card when omitted)
        #[arg(short, long)]
        jobname: Option<String>,

        /// Send the files as raw EBCDIC bytes (default from `submit.ebcdic`)
        #[arg(long)]
        ebcdic: bool,

        /// Wait for the jobs but skip the condition code check
        #[arg(long)]
        no_check: bool,
    },

    /// IPL, send operator commands, then shut down
    Oper {
        /// Operator commands, without the leading slash
        #[arg(required = true)]
        commands: Vec<String>,
    },

    /// Print the JSON schema of the configuration file
    ConfigSchema {
        /// Emit draft-07 (definitions instead of $defs)
        #[arg(long)]
        draft07: bool,
    },
}

impl Commands {
    /// Whether the command needs an emulator.
    pub fn boots(&self) -> bool {
        !matches!(self, Commands::ConfigSchema { .. })
    }
}
