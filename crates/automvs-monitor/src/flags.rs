//! Cooperative shutdown signals shared by the controller, readers and supervisor.

use std::sync::atomic::{AtomicBool, Ordering};

/// Advisory flags for one session.
///
/// These are signals, not locks: any thread may read them at any time and
/// must tolerate them changing underneath it.
#[derive(Debug, Default)]
pub struct CoordinationFlags {
    quit: AtomicBool,
    reset: AtomicBool,
    kill: AtomicBool,
    diagnostics_verbose: AtomicBool,
}

impl CoordinationFlags {
    /// Create a cleared set of flags.
    pub fn new() -> Self {
        Self::default()
    }

    /// A controlled shutdown is underway.
    pub fn request_quit(&self) {
        self.quit.store(true, Ordering::SeqCst);
    }

    /// Whether a controlled shutdown is underway.
    pub fn quit_requested(&self) -> bool {
        self.quit.load(Ordering::SeqCst)
    }

    /// The current emulator generation is being replaced.
    pub fn request_reset(&self) {
        self.reset.store(true, Ordering::SeqCst);
    }

    /// Whether the current emulator generation is being replaced.
    pub fn reset_requested(&self) -> bool {
        self.reset.load(Ordering::SeqCst)
    }

    /// Clear the reset request once the old generation is gone.
    pub fn clear_reset(&self) {
        self.reset.store(false, Ordering::SeqCst);
    }

    /// Ask the supervisor to kill the emulator.
    ///
    /// Returns `true` only for the call that actually raised the flag.
    pub fn request_kill(&self) -> bool {
        !self.kill.swap(true, Ordering::SeqCst)
    }

    /// Whether the emulator must be killed.
    pub fn kill_requested(&self) -> bool {
        self.kill.load(Ordering::SeqCst)
    }

    /// Log every diagnostic line.
    pub fn set_diagnostics_verbose(&self, verbose: bool) {
        self.diagnostics_verbose.store(verbose, Ordering::SeqCst);
    }

    /// Whether every diagnostic line is logged.
    pub fn diagnostics_verbose(&self) -> bool {
        self.diagnostics_verbose.load(Ordering::SeqCst)
    }

    /// Clear quit, reset and kill before a new emulator is launched.
    ///
    /// The diagnostics setting is left alone.
    pub fn clear_for_launch(&self) {
        self.quit.store(false, Ordering::SeqCst);
        self.reset.store(false, Ordering::SeqCst);
        self.kill.store(false, Ordering::SeqCst);
    }
}
