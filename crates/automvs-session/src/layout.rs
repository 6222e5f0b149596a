//! Where a distribution lives on disk and how Hercules is started from it.

use std::path::{Path, PathBuf};

use tracing::debug;

use automvs_core::{EmulatorSettings, Error, Result};
use automvs_monitor::LaunchSpec;

/// Default folder, config and rc file of a distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutDefaults {
    /// Display name used in error messages
    pub label: &'static str,
    /// Folder, relative to the working directory
    pub folder: &'static str,
    /// Hercules configuration, relative to the folder
    pub config: &'static str,
    /// Hercules rc file, relative to the folder
    pub rc: Option<&'static str>,
}

/// Resolved, existing paths of one distribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Distribution folder; Hercules runs with this as working directory
    pub folder: PathBuf,
    /// Hercules configuration file
    pub config: PathBuf,
    /// Hercules rc file
    pub rc: Option<PathBuf>,
}

impl Layout {
    /// Resolve `settings` against `defaults` and check every path exists.
    ///
    /// Paths are made absolute so they stay valid from the folder.
    pub fn resolve(settings: &EmulatorSettings, defaults: &LayoutDefaults) -> Result<Self> {
        let folder = settings
            .location
            .clone()
            .unwrap_or_else(|| PathBuf::from(defaults.folder));
        let folder = existing(&folder, defaults.label, "folder")?;

        let config = folder.join(settings.config.as_deref().unwrap_or(Path::new(defaults.config)));
        let config = existing(&config, defaults.label, "config file")?;

        let rc = match (&settings.rc, defaults.rc) {
            (Some(rc), _) => Some(folder.join(rc)),
            (None, Some(rc)) => Some(folder.join(rc)),
            (None, None) => None,
        };
        let rc = rc
            .map(|rc| existing(&rc, defaults.label, "rc file"))
            .transpose()?;

        debug!("{} location: {}", defaults.label, folder.display());
        debug!("{} config location: {}", defaults.label, config.display());
        if let Some(rc) = &rc {
            debug!("{} RC location: {}", defaults.label, rc.display());
        }

        Ok(Self { folder, config, rc })
    }

    /// Command line starting Hercules in this layout.
    ///
    /// The rc file is only passed when `with_rc` is set.
    pub fn launch_spec(&self, settings: &EmulatorSettings, with_rc: bool) -> LaunchSpec {
        let mut spec = LaunchSpec::new(settings.hercules.as_str())
            .arg("--externalgui")
            .arg("-f")
            .arg(self.config.display().to_string());
        if let (true, Some(rc)) = (with_rc, &self.rc) {
            spec = spec.arg("-r").arg(rc.display().to_string());
        }
        spec.args(settings.extra_args.iter().cloned()).cwd(&self.folder)
    }

    /// Resolve `path` against the folder unless it is absolute.
    pub fn path_in_folder(&self, path: &Path) -> PathBuf {
        self.folder.join(path)
    }
}

fn existing(path: &Path, label: &str, what: &str) -> Result<PathBuf> {
    if !path.exists() {
        return Err(Error::Config(format!(
            "The {label} {what} provided does not exist: {}",
            path.display()
        )));
    }
    Ok(std::fs::canonicalize(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const DEFAULTS: LayoutDefaults = LayoutDefaults {
        label: "MVS/CE",
        folder: "mvsce/",
        config: "conf/local.cnf",
        rc: Some("conf/mvsce.rc"),
    };

    fn distribution_folder() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("conf")).unwrap();
        fs::write(dir.path().join("conf/local.cnf"), "").unwrap();
        fs::write(dir.path().join("conf/mvsce.rc"), "").unwrap();
        dir
    }

    fn settings(dir: &Path) -> EmulatorSettings {
        EmulatorSettings {
            location: Some(dir.to_path_buf()),
            ..EmulatorSettings::default()
        }
    }

    #[test]
    fn test_resolve_defaults() {
        let dir = distribution_folder();
        let layout = Layout::resolve(&settings(dir.path()), &DEFAULTS).unwrap();

        assert!(layout.folder.is_absolute());
        assert!(layout.config.ends_with("conf/local.cnf"));
        assert!(layout.rc.as_ref().unwrap().ends_with("conf/mvsce.rc"));
    }

    #[test]
    fn test_resolve_missing_folder() {
        let dir = tempfile::tempdir().unwrap();
        let err = Layout::resolve(&settings(&dir.path().join("nope")), &DEFAULTS).unwrap_err();
        println!("{err}");
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("folder")));
    }

    #[test]
    fn test_resolve_missing_rc() {
        let dir = distribution_folder();
        let mut settings = settings(dir.path());
        settings.rc = Some(PathBuf::from("conf/other.rc"));

        let err = Layout::resolve(&settings, &DEFAULTS).unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("rc file")));
    }

    #[test]
    fn test_launch_spec_with_and_without_rc() {
        let dir = distribution_folder();
        let mut settings = settings(dir.path());
        settings.extra_args = vec!["-d".to_string()];
        let layout = Layout::resolve(&settings, &DEFAULTS).unwrap();

        let spec = layout.launch_spec(&settings, true);
        assert_eq!(spec.program, "hercules");
        assert_eq!(spec.args[0], "--externalgui");
        assert_eq!(spec.args[1], "-f");
        assert_eq!(spec.args[3], "-r");
        assert_eq!(spec.args.last().unwrap(), "-d");
        assert_eq!(spec.cwd.as_deref(), Some(layout.folder.as_path()));

        let clpa = layout.launch_spec(&settings, false);
        assert!(!clpa.args.contains(&"-r".to_string()));
    }

    #[test]
    fn test_layout_without_rc() {
        let dir = distribution_folder();
        let defaults = LayoutDefaults { rc: None, ..DEFAULTS };
        let layout = Layout::resolve(&settings(dir.path()), &defaults).unwrap();
        assert!(layout.rc.is_none());
        assert_eq!(layout.launch_spec(&settings(dir.path()), true).args.len(), 3);
    }
}
