//! Handle to the spawned emulator process.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command, ExitStatus, Stdio};
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, error, info, warn};

use automvs_core::{Error, Result};

/// How to start the emulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    /// Executable, looked up on `PATH` when not a path
    pub program: String,
    /// Command line arguments
    pub args: Vec<String>,
    /// Working directory
    pub cwd: Option<PathBuf>,
}

impl LaunchSpec {
    /// Launch `program` with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    /// Append an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }
}

/// Output pipes handed to the stream readers.
#[derive(Debug)]
pub struct OutputPipes {
    /// Primary output
    pub stdout: ChildStdout,
    /// Diagnostic output
    pub stderr: ChildStderr,
}

/// The live emulator: its stdin, its exit status and the ability to kill it.
///
/// Shared by the controller (commands) and the liveness supervisor (polling).
#[derive(Debug)]
pub struct SupervisedProcess {
    pid: u32,
    child: Mutex<Child>,
    stdin: Mutex<Option<ChildStdin>>,
}

impl SupervisedProcess {
    /// Spawn the emulator with all three standard streams piped.
    pub fn spawn(spec: &LaunchSpec) -> Result<(Self, OutputPipes)> {
        info!(
            "Spawning emulator: program='{}' args={:?} cwd={:?}",
            spec.program, spec.args, spec.cwd
        );

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(dir) = &spec.cwd {
            debug!("Setting working directory to: {}", dir.display());
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn().map_err(|e| {
            error!("Failed to spawn '{}': {}", spec.program, e);
            match e.kind() {
                std::io::ErrorKind::NotFound => Error::Launch(format!("{} not found", spec.program)),
                _ => Error::Launch(format!("failed to spawn {}: {e}", spec.program)),
            }
        })?;

        let (stdin, stdout, stderr) = match (child.stdin.take(), child.stdout.take(), child.stderr.take()) {
            (Some(stdin), Some(stdout), Some(stderr)) => (stdin, stdout, stderr),
            _ => {
                let _ = child.kill();
                return Err(Error::Launch("emulator pipes unavailable".to_string()));
            }
        };

        let pid = child.id();
        info!("Emulator spawned: pid={}", pid);

        Ok((
            Self {
                pid,
                child: Mutex::new(child),
                stdin: Mutex::new(Some(stdin)),
            },
            OutputPipes { stdout, stderr },
        ))
    }

    /// Operating system process id.
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Exit status if the process has exited, without blocking.
    pub fn try_exit_status(&self) -> Result<Option<ExitStatus>> {
        Ok(self.child().try_wait()?)
    }

    /// Whether the process is still running.
    pub fn is_alive(&self) -> bool {
        matches!(self.try_exit_status(), Ok(None))
    }

    /// Write `line` plus a line terminator to stdin and flush.
    pub fn write_line(&self, line: &str) -> Result<()> {
        let mut stdin = self.stdin.lock().unwrap_or_else(|e| e.into_inner());
        let pipe = stdin.as_mut().ok_or(Error::SessionTerminated)?;
        pipe.write_all(line.as_bytes())?;
        pipe.write_all(b"\n")?;
        pipe.flush()?;
        Ok(())
    }

    /// Close stdin so the emulator sees end of input.
    pub fn close_stdin(&self) {
        self.stdin.lock().unwrap_or_else(|e| e.into_inner()).take();
    }

    /// Kill the process and reap it.
    pub fn kill(&self) -> Result<()> {
        info!("Killing emulator: pid={}", self.pid);
        let mut child = self.child();
        if child.try_wait()?.is_some() {
            debug!("Emulator {} already exited", self.pid);
            return Ok(());
        }
        if let Err(e) = child.kill() {
            warn!("Kill of emulator {} failed: {}", self.pid, e);
            return Err(Error::Io(e));
        }
        child.wait()?;
        Ok(())
    }

    fn child(&self) -> MutexGuard<'_, Child> {
        self.child.lock().unwrap_or_else(|e| e.into_inner())
    }
}
