//! Configuration types for automvs.

use std::path::{Path, PathBuf};
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Distributions understood by the session layer.
pub const KNOWN_DISTRIBUTIONS: &[&str] = &["mvsce", "tk4"];

/// Automation configuration loaded from a YAML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default, JsonSchema)]
#[serde(default)]
pub struct AutomationConfig {
    /// Emulator settings
    pub emulator: EmulatorSettings,
    /// Timeouts and polling periods
    pub timing: TimingSettings,
    /// Card reader used for job submission
    pub submit: SubmitSettings,
    /// Printer and logging settings
    pub output: OutputSettings,
}

impl AutomationConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string.
    pub fn from_yaml(yaml: &str) -> crate::Result<Self> {
        let config: AutomationConfig =
            serde_yaml::from_str(yaml).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> crate::Result<()> {
        if !KNOWN_DISTRIBUTIONS.contains(&self.emulator.distribution.as_str()) {
            return Err(Error::Config(format!(
                "unknown distribution '{}' (expected one of {:?})",
                self.emulator.distribution, KNOWN_DISTRIBUTIONS
            )));
        }

        if self.emulator.hercules.trim().is_empty() {
            return Err(Error::Config(
                "emulator.hercules cannot be empty".to_string(),
            ));
        }

        if self.timing.timeout_secs == 0 {
            return Err(Error::Config("timing.timeout_secs must be > 0".to_string()));
        }

        if self.timing.poll_interval_ms == 0 || self.timing.liveness_interval_ms == 0 {
            return Err(Error::Config(
                "timing poll intervals must be > 0".to_string(),
            ));
        }

        if self.submit.port == 0 {
            return Err(Error::Config("submit.port must be > 0".to_string()));
        }

        Ok(())
    }
}

/// Emulator settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct EmulatorSettings {
    /// Distribution: mvsce or tk4
    pub distribution: String,
    /// Distribution folder (defaults to the distribution's usual folder name)
    pub location: Option<PathBuf>,
    /// Hercules configuration file, relative to the folder unless absolute
    pub config: Option<PathBuf>,
    /// Hercules rc file, relative to the folder unless absolute
    pub rc: Option<PathBuf>,
    /// Hercules executable
    pub hercules: String,
    /// Extra arguments appended to the Hercules command line
    pub extra_args: Vec<String>,
}

impl Default for EmulatorSettings {
    fn default() -> Self {
        Self {
            distribution: "mvsce".to_string(),
            location: None,
            config: None,
            rc: None,
            hercules: "hercules".to_string(),
            extra_args: vec![],
        }
    }
}

/// Timeouts and polling periods.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TimingSettings {
    /// Default wait timeout in seconds
    pub timeout_secs: u64,
    /// Sleep between buffer polls while waiting, in milliseconds
    pub poll_interval_ms: u64,
    /// Sleep between emulator liveness checks, in milliseconds
    pub liveness_interval_ms: u64,
    /// How long a fresh emulator must stay up to count as launched, in milliseconds
    pub launch_grace_ms: u64,
    /// How long a restart waits for the old emulator to confirm shutdown, in seconds
    pub restart_grace_secs: u64,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 1800,
            poll_interval_ms: 10,
            liveness_interval_ms: 50,
            launch_grace_ms: 250,
            restart_grace_secs: 60,
        }
    }
}

impl TimingSettings {
    /// Default wait timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Buffer poll interval.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Liveness poll interval.
    pub fn liveness_interval(&self) -> Duration {
        Duration::from_millis(self.liveness_interval_ms)
    }

    /// Launch grace window.
    pub fn launch_grace(&self) -> Duration {
        Duration::from_millis(self.launch_grace_ms)
    }

    /// Restart confirmation grace.
    pub fn restart_grace(&self) -> Duration {
        Duration::from_secs(self.restart_grace_secs)
    }
}

/// Card reader socket used for job submission.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SubmitSettings {
    /// Host running the sockdev card reader
    pub host: String,
    /// Card reader port
    pub port: u16,
    /// Send decks as raw EBCDIC bytes
    pub ebcdic: bool,
}

impl Default for SubmitSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3505,
            ebcdic: false,
        }
    }
}

/// Printer and logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct OutputSettings {
    /// Printer file holding job output, relative to the folder unless absolute
    pub printer_file: PathBuf,
    /// Log every diagnostic line, not only performance figures
    pub diagnostics_verbose: bool,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            printer_file: PathBuf::from("printers/prt00e.txt"),
            diagnostics_verbose: false,
            log_level: "warn".to_string(),
        }
    }
}
