//! Command line parsing and the binary's behaviour without an emulator.

use std::process::Command;

use clap::Parser;

use automvs::{Cli, Commands};

fn automvs() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_automvs"));
    cmd.env_remove("AUTOMVS_CONFIG").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_parse_submit() {
    let cli = Cli::try_parse_from([
        "automvs",
        "submit",
        "--jobname",
        "RELEASE",
        "--ebcdic",
        "a.ebcdic",
        "b.ebcdic",
    ])
    .unwrap();

    match cli.command {
        Commands::Submit {
            decks,
            jobname,
            ebcdic,
            no_check,
        } => {
            assert_eq!(decks.len(), 2);
            assert_eq!(jobname.as_deref(), Some("RELEASE"));
            assert!(ebcdic);
            assert!(!no_check);
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from(["automvs", "ipl", "--clpa", "-d", "tk4", "-v"]).unwrap();
    assert!(matches!(cli.command, Commands::Ipl { clpa: true }));
    assert_eq!(cli.distribution.as_deref(), Some("tk4"));
    assert_eq!(cli.verbose, 1);
    assert!(cli.command.boots());
}

#[test]
fn test_submit_needs_a_deck() {
    assert!(Cli::try_parse_from(["automvs", "submit"]).is_err());
    assert!(Cli::try_parse_from(["automvs", "oper"]).is_err());
}

#[test]
fn test_config_schema_command() {
    let output = automvs().args(["config-schema", "--draft07"]).output().unwrap();
    assert!(output.status.success());

    let schema: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(schema["properties"]["timing"].is_object());
    assert!(schema.get("$defs").is_none());
}

#[test]
fn test_missing_distribution_folder_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = automvs()
        .arg("--location")
        .arg(dir.path().join("mvsce"))
        .arg("ipl")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    println!("{stderr}");
    assert!(stderr.contains("does not exist"));
}

#[test]
fn test_bad_config_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("automvs.yaml");
    std::fs::write(&path, "timing:\n  timeout_secs: 0\n").unwrap();

    let output = automvs().arg("-c").arg(&path).arg("ipl").output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("timing.timeout_secs must be > 0"));
}
