//! A scripted stand-in for Hercules and a distribution folder around it.
//!
//! The script only uses shell builtins so that killing it closes its pipes.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use automvs_core::AutomationConfig;

const FAKE_HERCULES: &str = r#"#!/bin/sh
echo "HHC01413I Hercules version 4.7.0.0-fake"
echo "HHC00100I Thread id 00007f3c, prio 15, name 'Processor CP00' started"
echo "HHC01417I Diagnostic output follows" >&2
for arg in "$@"; do
  case "$arg" in
    -r|*tk4-.cnf)
      echo "HHC01603I ipl 150"
      echo "IKT005I TCAS IS INITIALIZED"
      ;;
  esac
done
deaf=""
while IFS= read -r line; do
  echo "HHC01603I $line"
  case "$line" in
    quit)
      if [ -z "$deaf" ]; then
        echo "HHC01420I Begin Hercules shutdown" >&2
        echo "HHC01422I Hercules shutdown complete" >&2
        exit 0
      fi
      ;;
    deaf)
      deaf=1
      ;;
    "ipl 150")
      echo "HHC00010A Enter input for console 0:0009"
      ;;
    "/r 0,clpa")
      echo "IKT005I TCAS IS INITIALIZED"
      ;;
    '/$PJES2,ABEND')
      echo '/*00 $HASP098 ENTER TERMINATION OPTION'
      ;;
    "/r 00,PURGE")
      echo "IEF196I IEF285I   VOL SER NOS= SPOOL0."
      ;;
    "/z eod")
      echo "IEE334I HALT     EOD SUCCESSFUL"
      ;;
    /quiesce|"/f bsppilot,shutnow")
      echo "HHC00809I Processor CP00: disabled wait state 00020000 00000000"
      ;;
    stop)
      echo "HHC00811I Processor CP00: stopped"
      ;;
    "prompt "*)
      echo "/*${line#prompt } IEF238D REPLY DEVICE NAME OR 'CANCEL'."
      ;;
    "jobdone "*)
      printf '$HASP250 %-8s IS PURGED\n' "${line#jobdone }"
      ;;
    fatal)
      echo "HHC00809I Processor CP00: disabled wait state 00020000 80000005"
      ;;
    die)
      exit 7
      ;;
  esac
done
"#;

/// Path of the fake Hercules executable, written once per test binary.
pub fn fake_hercules() -> &'static Path {
    static SCRIPT: OnceLock<PathBuf> = OnceLock::new();
    SCRIPT.get_or_init(|| {
        let dir = tempfile::tempdir().unwrap().into_path();
        let path = dir.join("hercules");
        fs::write(&path, FAKE_HERCULES).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    })
}

/// A distribution folder with the files the layout checks for.
pub struct FakeDistribution {
    /// Keeps the folder alive
    pub dir: tempfile::TempDir,
    /// Configuration pointing at the folder and the fake Hercules
    pub config: AutomationConfig,
}

impl FakeDistribution {
    /// Folder path.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write the default printer file.
    pub fn write_printer_file(&self, contents: &str) {
        fs::write(self.path().join("printers/prt00e.txt"), contents).unwrap();
    }
}

fn distribution(name: &str, files: &[&str]) -> FakeDistribution {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("conf")).unwrap();
    fs::create_dir(dir.path().join("printers")).unwrap();
    for file in files {
        fs::write(dir.path().join(file), "").unwrap();
    }

    let mut config = AutomationConfig::default();
    config.emulator.distribution = name.to_string();
    config.emulator.location = Some(dir.path().to_path_buf());
    config.emulator.hercules = fake_hercules().display().to_string();
    config.timing.timeout_secs = 10;
    config.timing.restart_grace_secs = 5;

    FakeDistribution { dir, config }
}

/// MVS/CE folder with `conf/local.cnf` and `conf/mvsce.rc`.
pub fn mvsce() -> FakeDistribution {
    distribution("mvsce", &["conf/local.cnf", "conf/mvsce.rc"])
}

/// TK4- folder with `conf/tk4-.cnf`.
pub fn tk4() -> FakeDistribution {
    distribution("tk4", &["conf/tk4-.cnf"])
}
