//! Liveness supervision of the emulator process.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error, info, warn};

use automvs_core::AbortReason;

use crate::context::SessionContext;
use crate::process::SupervisedProcess;

/// Default time between liveness checks.
pub const DEFAULT_LIVENESS_INTERVAL: Duration = Duration::from_millis(50);

/// Outcome of one supervision cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Keep watching
    Alive,
    /// A shutdown or restart is underway, stop watching
    Released,
    /// The session was aborted
    Aborted(AbortReason),
}

/// Watches one emulator generation and reacts when it dies or must die.
#[derive(Debug)]
pub struct LivenessSupervisor {
    process: Arc<SupervisedProcess>,
    ctx: Arc<SessionContext>,
    interval: Duration,
}

impl LivenessSupervisor {
    /// Create a supervisor polling every `interval`.
    pub fn new(process: Arc<SupervisedProcess>, ctx: Arc<SessionContext>, interval: Duration) -> Self {
        Self {
            process,
            ctx,
            interval,
        }
    }

    /// Start supervising on a dedicated thread.
    pub fn spawn(self) -> std::io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("automvs-supervisor".to_string())
            .spawn(move || self.run())
    }

    /// Supervise on the current thread until released or aborted.
    pub fn run(self) {
        info!("Supervising emulator pid={}", self.process.pid());
        loop {
            match self.check() {
                Verdict::Alive => thread::sleep(self.interval),
                Verdict::Released => {
                    debug!("Supervisor released for pid={}", self.process.pid());
                    return;
                }
                Verdict::Aborted(reason) => {
                    self.ctx.abort(reason);
                    return;
                }
            }
        }
    }

    /// Run one supervision cycle.
    pub fn check(&self) -> Verdict {
        let flags = self.ctx.flags();
        if flags.quit_requested() || flags.reset_requested() {
            return Verdict::Released;
        }

        if flags.kill_requested() {
            error!("Killing emulator pid={} after irrecoverable error", self.process.pid());
            if let Err(e) = self.process.kill() {
                warn!("Unable to kill emulator: {}", e);
            }
            return Verdict::Aborted(AbortReason::FatalError);
        }

        match self.process.try_exit_status() {
            Ok(None) => Verdict::Alive,
            Ok(Some(status)) => {
                // A shutdown may have been requested while the process was exiting
                if flags.quit_requested() || flags.reset_requested() {
                    return Verdict::Released;
                }
                error!("Hercules process exited unexpectedly: {}", status);
                Verdict::Aborted(AbortReason::UnexpectedExit {
                    code: status.code(),
                })
            }
            Err(e) => {
                warn!("Unable to poll emulator status: {}", e);
                Verdict::Alive
            }
        }
    }
}
