//! automvs - drive MVS 3.8j under Hercules from the command line.

use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use automvs::{default_log_filter, exit_code, load_config, run, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err:#}");
            std::process::exit(exit_code(&err));
        }
    };

    // Logs go to stderr, stdout carries results
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_log_filter(&config, cli.verbose))),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    debug!("Configuration: {:?}", config);

    // Exit directly: an interrupted session may still hold a blocking thread
    let code = match run(cli, config).await {
        Ok(()) => automvs::run::EXIT_OK,
        Err(err) => {
            error!("{:#}", err);
            eprintln!("Error: {err:#}");
            exit_code(&err)
        }
    };
    std::process::exit(code);
}
