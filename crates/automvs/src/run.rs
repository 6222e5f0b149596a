//! Command execution.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use automvs_core::{AutomationConfig, Error, StepStatus};
use automvs_session::{connect, ExpectedCodes, JobDeck, Mainframe};

use crate::cli::{Cli, Commands};
use crate::schema::config_schema;

/// Process exit code for a successful run.
pub const EXIT_OK: i32 = 0;
/// Process exit code for any other failure.
pub const EXIT_FAILURE: i32 = 1;
/// Process exit code when console output did not appear in time.
pub const EXIT_TIMEOUT: i32 = 2;
/// Process exit code when a job step ended with an unexpected condition code.
pub const EXIT_STEP_FAILED: i32 = 3;

/// Results of one submitted deck.
#[derive(Debug, Serialize)]
pub struct JobReport {
    /// File the deck was read from
    pub deck: PathBuf,
    /// Job name waited for
    pub jobname: String,
    /// Step results, empty with `--no-check`
    pub steps: Vec<StepStatus>,
}

/// Load the configuration file, if any, and apply command line overrides.
pub fn load_config(cli: &Cli) -> Result<AutomationConfig> {
    let mut config = match &cli.config {
        Some(path) => AutomationConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => AutomationConfig::default(),
    };

    if let Some(location) = &cli.location {
        config.emulator.location = Some(location.clone());
    }
    if let Some(distribution) = &cli.distribution {
        config.emulator.distribution = distribution.clone();
    }
    if let Some(timeout) = cli.timeout {
        config.timing.timeout_secs = timeout;
    }
    if cli.verbose > 1 {
        config.output.diagnostics_verbose = true;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter(config: &AutomationConfig, verbose: u8) -> String {
    match verbose {
        0 => config.output.log_level.clone(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Map an error to the process exit code.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<Error>() {
        Some(Error::WaitTimeout { .. }) => EXIT_TIMEOUT,
        Some(Error::StepFailed { .. }) => EXIT_STEP_FAILED,
        _ => EXIT_FAILURE,
    }
}

/// Read a deck from disk.
pub fn read_deck(path: &Path, ebcdic: bool) -> Result<JobDeck> {
    let deck = if ebcdic {
        JobDeck::Ebcdic(fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?)
    } else {
        JobDeck::Text(
            fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?,
        )
    };
    Ok(deck)
}

/// Read every deck up front. `--ebcdic` or `submit.ebcdic` sends raw bytes.
pub fn load_decks(
    paths: &[PathBuf],
    ebcdic: bool,
    config: &AutomationConfig,
) -> Result<Vec<(PathBuf, JobDeck)>> {
    let ebcdic = ebcdic || config.submit.ebcdic;
    paths
        .iter()
        .map(|path| Ok((path.clone(), read_deck(path, ebcdic)?)))
        .collect()
}

/// Run `cli` to completion.
///
/// The session itself is blocking and runs on the blocking pool. Ctrl-C kills
/// the emulator, which ends the program through the abort path.
pub async fn run(cli: Cli, config: AutomationConfig) -> Result<()> {
    if let Commands::ConfigSchema { draft07 } = cli.command {
        println!("{}", serde_json::to_string_pretty(&config_schema(draft07))?);
        return Ok(());
    }

    let mainframe = connect(config).context("Unable to prepare the emulator session")?;
    let kill = mainframe.automation().kill_handle();
    info!(
        "Starting {} session: id={}",
        mainframe.name(),
        mainframe.automation().controller().id()
    );

    let command = cli.command;
    let task = tokio::task::spawn_blocking(move || execute(mainframe, &command));

    tokio::select! {
        joined = task => joined.context("Session task failed")?,
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl-C")?;
            warn!("Interrupted, killing Hercules");
            kill.kill();
            Err(anyhow!("Interrupted"))
        }
    }
}

/// Drive one booting command against `mainframe`.
///
/// Once the system is up it is shut down even when the work fails; the
/// work's error wins. A failed IPL leaves Hercules to be killed on drop.
pub fn execute(mut mainframe: Box<dyn Mainframe>, command: &Commands) -> Result<()> {
    let (clpa, decks) = match command {
        Commands::Ipl { clpa } => (*clpa, Vec::new()),
        Commands::Submit { decks, ebcdic, .. } => {
            let loaded = load_decks(decks, *ebcdic, mainframe.automation().config())?;
            (false, loaded)
        }
        Commands::Oper { .. } => (false, Vec::new()),
        Commands::ConfigSchema { .. } => return Ok(()),
    };

    mainframe.ipl(clpa).context("IPL failed")?;

    let work = match command {
        Commands::Submit {
            jobname, no_check, ..
        } => submit_all(mainframe.as_ref(), &decks, jobname.as_deref(), *no_check).and_then(
            |reports| {
                println!("{}", serde_json::to_string_pretty(&reports)?);
                Ok(())
            },
        ),
        Commands::Oper { commands } => send_all(mainframe.as_ref(), commands),
        _ => Ok(()),
    };

    let down = mainframe.shutdown().context("Shutdown failed");
    work?;
    down
}

fn send_all(mainframe: &dyn Mainframe, commands: &[String]) -> Result<()> {
    for command in commands {
        mainframe
            .send_command(command)
            .with_context(|| format!("Failed to send '{command}'"))?;
    }
    Ok(())
}

fn submit_all(
    mainframe: &dyn Mainframe,
    decks: &[(PathBuf, JobDeck)],
    jobname: Option<&str>,
    no_check: bool,
) -> Result<Vec<JobReport>> {
    let automation = mainframe.automation();
    let expected = ExpectedCodes::new();
    let mut reports = Vec::with_capacity(decks.len());

    for (path, deck) in decks {
        let name = deck
            .jobname(jobname)
            .with_context(|| format!("No job name for {}", path.display()))?;
        info!("Submitting {}: job={}", path.display(), name);

        let steps = if no_check {
            automation.submit(deck)?;
            automation.wait_for_job(&name)?;
            Vec::new()
        } else {
            automation.submit_and_check(deck, Some(&name), &expected)?
        };

        reports.push(JobReport {
            deck: path.clone(),
            jobname: name,
            steps,
        });
    }
    Ok(reports)
}
