//! Lifecycle of the emulator process: launch, restart, shutdown.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use automvs_core::patterns::SHUTDOWN_COMPLETE;
use automvs_core::{Error, Result, SessionId, SessionState, StreamKind, TimingSettings};
use automvs_monitor::{
    AbortHandler, LaunchSpec, LivenessSupervisor, SessionContext, StreamReader, SupervisedProcess,
    WaitCondition, WaitResult,
};

/// Timing of the controller's state transitions.
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// How long a fresh emulator must stay up to count as launched
    pub launch_grace: Duration,

    /// How long a restart waits for the old emulator's shutdown confirmation
    pub restart_grace: Duration,

    /// How long a shutdown waits for the confirmation
    pub shutdown_timeout: Duration,

    /// Sleep between liveness checks
    pub liveness_interval: Duration,

    /// Sleep between buffer polls
    pub poll_interval: Duration,

    /// How long to wait for helper threads to finish
    pub join_grace: Duration,

    /// Diagnostic output that confirms the emulator has shut down
    pub shutdown_confirmation: String,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self::from(&TimingSettings::default())
    }
}

impl From<&TimingSettings> for ControllerOptions {
    fn from(timing: &TimingSettings) -> Self {
        Self {
            launch_grace: timing.launch_grace(),
            restart_grace: timing.restart_grace(),
            shutdown_timeout: timing.timeout(),
            liveness_interval: timing.liveness_interval(),
            poll_interval: timing.poll_interval(),
            join_grace: Duration::from_secs(2),
            shutdown_confirmation: SHUTDOWN_COMPLETE.to_string(),
        }
    }
}

/// Sets kill-requested from another thread, e.g. a Ctrl-C handler.
#[derive(Debug, Clone)]
pub struct KillHandle {
    ctx: Arc<SessionContext>,
}

impl KillHandle {
    /// Ask the supervisor to kill the emulator. Returns `false` if already asked.
    pub fn kill(&self) -> bool {
        self.ctx.flags().request_kill()
    }
}

/// One emulator process and the threads watching it.
#[derive(Debug)]
struct Generation {
    process: Arc<SupervisedProcess>,
    readers: Vec<JoinHandle<()>>,
    supervisor: Option<JoinHandle<()>>,
}

impl Generation {
    fn join(self, grace: Duration) {
        for reader in self.readers {
            join_with_grace(reader, grace, "stream reader");
        }
        if let Some(supervisor) = self.supervisor {
            join_with_grace(supervisor, grace, "supervisor");
        }
    }
}

/// Starts, restarts and stops the emulator, and owns its stdin.
#[derive(Debug)]
pub struct LifecycleController {
    ctx: Arc<SessionContext>,
    options: ControllerOptions,
    state: SessionState,
    generation: Option<Generation>,
}

impl LifecycleController {
    /// Create a cold controller.
    pub fn new(options: ControllerOptions, abort_handler: Arc<dyn AbortHandler>) -> Self {
        let ctx = Arc::new(SessionContext::new(abort_handler));
        info!("Session created: id={}", ctx.id());
        Self {
            ctx,
            options,
            state: SessionState::Cold,
            generation: None,
        }
    }

    /// Session identifier.
    pub fn id(&self) -> SessionId {
        self.ctx.id()
    }

    /// Shared session context.
    pub fn context(&self) -> &Arc<SessionContext> {
        &self.ctx
    }

    /// Controller timing.
    pub fn options(&self) -> &ControllerOptions {
        &self.options
    }

    /// Current state. An abort overrides whatever the controller last did.
    pub fn state(&self) -> SessionState {
        if self.ctx.abort_reason().is_some() {
            SessionState::Aborted
        } else {
            self.state
        }
    }

    /// Process id of the live emulator, if any.
    pub fn pid(&self) -> Option<u32> {
        self.generation.as_ref().map(|g| g.process.pid())
    }

    /// Handle that can request a kill from any thread.
    pub fn kill_handle(&self) -> KillHandle {
        KillHandle {
            ctx: Arc::clone(&self.ctx),
        }
    }

    /// Start the emulator from a cold or terminated session.
    pub fn launch(&mut self, spec: &LaunchSpec) -> Result<()> {
        self.ensure_not_aborted()?;
        if self.generation.is_some() {
            return Err(Error::InvalidInput(
                "emulator already running, restart it instead".to_string(),
            ));
        }

        let flags = self.ctx.flags();
        flags.clear_for_launch();

        // The previous emulator's readers are joined; its unread output goes
        let dropped = self.ctx.discard_buffered();
        if dropped > 0 {
            debug!("Discarded {} lines of previous output", dropped);
        }

        let (process, pipes) = SupervisedProcess::spawn(spec)?;
        let process = Arc::new(process);

        let readers = match self.spawn_readers(pipes) {
            Ok(readers) => readers,
            Err(e) => {
                let _ = process.kill();
                return Err(e.into());
            }
        };

        let deadline = Instant::now() + self.options.launch_grace;
        loop {
            if let Some(status) = process.try_exit_status()? {
                warn!("Hercules exited during startup: {}", status);
                Generation {
                    process,
                    readers,
                    supervisor: None,
                }
                .join(self.options.join_grace);
                self.ctx.discard_buffered();
                return Err(Error::Launch(format!(
                    "{} exited during startup ({status})",
                    spec.program
                )));
            }
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            std::thread::sleep(Duration::from_millis(10).min(deadline - now));
        }

        let supervisor = LivenessSupervisor::new(
            Arc::clone(&process),
            Arc::clone(&self.ctx),
            self.options.liveness_interval,
        )
        .spawn();
        let supervisor = match supervisor {
            Ok(handle) => handle,
            Err(e) => {
                let _ = process.kill();
                return Err(e.into());
            }
        };

        info!("Hercules launched: pid={}", process.pid());
        self.generation = Some(Generation {
            process,
            readers,
            supervisor: Some(supervisor),
        });
        self.set_state(SessionState::Running);
        Ok(())
    }

    /// Replace the running emulator with a fresh one, or launch if none runs.
    ///
    /// The old emulator is asked to quit and given `restart_grace` to confirm.
    /// Without confirmation the restart goes ahead anyway and the old process
    /// is killed. Unread output of the old emulator is discarded.
    pub fn restart(&mut self, spec: &LaunchSpec) -> Result<()> {
        self.ensure_not_aborted()?;
        info!("Restarting hercules");

        if let Some(generation) = self.generation.take() {
            let flags = Arc::clone(self.ctx.flags());

            if generation.process.is_alive() {
                flags.request_quit();
                let confirmed = generation
                    .process
                    .write_line("quit")
                    .and_then(|_| self.wait_for_confirmation(self.options.restart_grace));
                if let Err(e) = confirmed {
                    warn!("Hercules did not confirm shutdown, restarting anyway: {}", e);
                }
            }

            flags.request_reset();
            if let Err(e) = generation.process.kill() {
                warn!("Unable to kill previous hercules: {}", e);
            }
            generation.join(self.options.join_grace);
            self.set_state(SessionState::Terminated);
        }

        self.launch(spec)
    }

    /// Quit the emulator and wait for its confirmation.
    ///
    /// Does nothing unless the session is running, so repeated calls are fine.
    pub fn shutdown(&mut self) -> Result<()> {
        if self.state() != SessionState::Running {
            debug!("Hercules already shutdown");
            return Ok(());
        }
        let Some(generation) = self.generation.take() else {
            debug!("Hercules already shutdown");
            return Ok(());
        };

        info!("Shutting down hercules: pid={}", generation.process.pid());
        self.ctx.flags().request_quit();

        let result = if generation.process.is_alive() {
            generation
                .process
                .write_line("quit")
                .and_then(|_| self.wait_for_confirmation(self.options.shutdown_timeout))
        } else {
            debug!("Hercules already exited");
            Ok(())
        };

        generation.process.close_stdin();
        reap(&generation.process, self.options.join_grace);
        generation.join(self.options.join_grace);
        self.set_state(SessionState::Terminated);

        match result {
            Ok(()) => {
                info!("Hercules has exited");
                Ok(())
            }
            Err(e) => {
                warn!("Hercules shutdown was not confirmed: {}", e);
                Err(e)
            }
        }
    }

    /// Write one command line to the emulator's stdin.
    pub fn send(&self, line: &str) -> Result<()> {
        self.ensure_not_aborted()?;
        let generation = self.generation.as_ref().ok_or(Error::SessionTerminated)?;
        debug!("Sending Hercules command: {}", line);
        generation.process.write_line(line)
    }

    /// Wait for output on the buffer `condition` selects.
    pub fn wait_for(&self, condition: &WaitCondition) -> Result<WaitResult> {
        self.ctx.wait_for(condition)
    }

    fn wait_for_confirmation(&self, timeout: Duration) -> Result<()> {
        let condition = WaitCondition::for_text(self.options.shutdown_confirmation.as_str())
            .on(StreamKind::Diagnostic)
            .with_timeout(timeout)
            .with_poll_interval(self.options.poll_interval);
        self.ctx.wait_for(&condition).map(|_| ())
    }

    fn spawn_readers(&self, pipes: automvs_monitor::OutputPipes) -> std::io::Result<Vec<JoinHandle<()>>> {
        let primary = StreamReader::new(StreamKind::Primary, Arc::clone(&self.ctx)).spawn(pipes.stdout)?;
        let diagnostic =
            StreamReader::new(StreamKind::Diagnostic, Arc::clone(&self.ctx)).spawn(pipes.stderr)?;
        Ok(vec![primary, diagnostic])
    }

    fn ensure_not_aborted(&self) -> Result<()> {
        match self.ctx.abort_reason() {
            Some(reason) => Err(Error::ProcessAborted(reason)),
            None => Ok(()),
        }
    }

    fn set_state(&mut self, state: SessionState) {
        if self.state != state {
            info!(
                "Session state changed: id={}, {:?} → {:?}",
                self.ctx.id(),
                self.state,
                state
            );
            self.state = state;
        }
    }
}

impl Drop for LifecycleController {
    fn drop(&mut self) {
        if let Some(generation) = self.generation.take() {
            debug!("Dropping live session {}, killing hercules", self.ctx.id());
            self.ctx.flags().request_reset();
            let _ = generation.process.kill();
        }
    }
}

/// Give an exiting process `grace` to go, then kill it.
fn reap(process: &SupervisedProcess, grace: Duration) {
    let deadline = Instant::now() + grace;
    while Instant::now() < deadline {
        if !process.is_alive() {
            return;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    warn!("Hercules still running after shutdown, killing pid={}", process.pid());
    let _ = process.kill();
}

fn join_with_grace(handle: JoinHandle<()>, grace: Duration, what: &str) {
    let deadline = Instant::now() + grace;
    while !handle.is_finished() {
        if Instant::now() >= deadline {
            warn!("{} did not stop within {:?}, detaching it", what, grace);
            return;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    if handle.join().is_err() {
        warn!("{} panicked", what);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use automvs_monitor::LogOnly;

    fn controller() -> LifecycleController {
        LifecycleController::new(ControllerOptions::default(), Arc::new(LogOnly))
    }

    #[test]
    fn test_options_follow_timing_settings() {
        let timing = TimingSettings {
            timeout_secs: 60,
            launch_grace_ms: 100,
            ..TimingSettings::default()
        };
        let options = ControllerOptions::from(&timing);
        assert_eq!(options.shutdown_timeout, Duration::from_secs(60));
        assert_eq!(options.launch_grace, Duration::from_millis(100));
        assert_eq!(options.restart_grace, Duration::from_secs(60));
        assert_eq!(options.shutdown_confirmation, SHUTDOWN_COMPLETE);
    }

    #[test]
    fn test_new_controller_is_cold() {
        let controller = controller();
        assert_eq!(controller.state(), SessionState::Cold);
        assert!(controller.pid().is_none());
    }

    #[test]
    fn test_send_without_process_fails() {
        let controller = controller();
        assert!(matches!(controller.send("quit"), Err(Error::SessionTerminated)));
    }

    #[test]
    fn test_shutdown_when_cold_is_noop() {
        let mut controller = controller();
        controller.shutdown().unwrap();
        controller.shutdown().unwrap();
        assert_eq!(controller.state(), SessionState::Cold);
    }

    #[test]
    fn test_launch_missing_executable() {
        let mut controller = controller();
        let err = controller
            .launch(&LaunchSpec::new("automvs-missing-hercules"))
            .unwrap_err();
        assert!(matches!(err, Error::Launch(_)));
        assert_eq!(controller.state(), SessionState::Cold);
    }

    #[test]
    fn test_launch_immediate_exit() {
        let mut controller = controller();
        let err = controller
            .launch(&LaunchSpec::new("sh").args(["-c", "exit 1"]))
            .unwrap_err();
        println!("{err}");
        assert!(matches!(err, Error::Launch(_)));
        assert_eq!(controller.state(), SessionState::Cold);
    }

    #[test]
    fn test_aborted_controller_refuses_commands() {
        let mut controller = controller();
        controller
            .context()
            .abort(automvs_core::AbortReason::FatalError);

        assert_eq!(controller.state(), SessionState::Aborted);
        assert!(matches!(controller.send("x"), Err(Error::ProcessAborted(_))));
        assert!(matches!(
            controller.restart(&LaunchSpec::new("sh")),
            Err(Error::ProcessAborted(_))
        ));
    }

    #[test]
    fn test_kill_handle_raises_flag_once() {
        let controller = controller();
        let handle = controller.kill_handle();
        assert!(handle.kill());
        assert!(!handle.kill());
        assert!(controller.context().flags().kill_requested());
    }
}
