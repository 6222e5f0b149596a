//! Scripted control of an MVS system running under Hercules.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use automvs_core::patterns::{job_purged, BOOT_COMPLETE};
use automvs_core::{AutomationConfig, Error, Result, SessionState, StepStatus, StreamKind};
use automvs_monitor::{AbortHandler, WaitCondition, WaitResult};
use automvs_report::ExpectedCodes;

use crate::commands::{self, mvs};
use crate::controller::{ControllerOptions, KillHandle, LifecycleController};
use crate::layout::{Layout, LayoutDefaults};
use crate::submit::{submit_deck, JobDeck};

/// One automation session: an emulator plus the scripts that drive it.
///
/// # Example
/// ```no_run
/// # use std::sync::Arc;
/// # use automvs_core::AutomationConfig;
/// # use automvs_monitor::ExitProcess;
/// # use automvs_session::{Automation, MVSCE_LAYOUT};
/// let config = AutomationConfig::default();
/// let mut build = Automation::new(config, &MVSCE_LAYOUT, Arc::new(ExitProcess)).unwrap();
///
/// build.ipl(false).unwrap();
/// build.send_oper("d a,l").unwrap();
/// build.shutdown_mvs(false).unwrap();
/// build.quit().unwrap();
/// ```
#[derive(Debug)]
pub struct Automation {
    config: AutomationConfig,
    layout: Layout,
    controller: LifecycleController,
}

impl Automation {
    /// Check the distribution's files exist and prepare a cold session.
    pub fn new(
        config: AutomationConfig,
        defaults: &LayoutDefaults,
        abort_handler: Arc<dyn AbortHandler>,
    ) -> Result<Self> {
        config.validate()?;
        let layout = Layout::resolve(&config.emulator, defaults)?;

        let controller = LifecycleController::new(ControllerOptions::from(&config.timing), abort_handler);
        controller
            .context()
            .flags()
            .set_diagnostics_verbose(config.output.diagnostics_verbose);

        Ok(Self {
            config,
            layout,
            controller,
        })
    }

    /// Configuration in use.
    pub fn config(&self) -> &AutomationConfig {
        &self.config
    }

    /// Resolved distribution paths.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Underlying lifecycle controller.
    pub fn controller(&self) -> &LifecycleController {
        &self.controller
    }

    /// Session state.
    pub fn state(&self) -> SessionState {
        self.controller.state()
    }

    /// Handle to kill the emulator from another thread.
    pub fn kill_handle(&self) -> KillHandle {
        self.controller.kill_handle()
    }

    /// Reply number of the last outstanding-reply prompt.
    pub fn reply_number(&self) -> String {
        self.controller.context().reply().get()
    }

    /// Restart Hercules, or start it if it is not running.
    ///
    /// With `clpa` the rc file is left out so the IPL can be answered by hand.
    pub fn restart(&mut self, clpa: bool) -> Result<()> {
        let spec = self.layout.launch_spec(&self.config.emulator, !clpa);
        debug!("Launching hercules with: {} {:?}", spec.program, spec.args);
        self.controller.restart(&spec)
    }

    /// Boot MVS and wait until TCAS is up.
    pub fn ipl(&mut self, clpa: bool) -> Result<()> {
        info!("IPLing MVS (clpa={})", clpa);
        self.restart(clpa)?;

        if clpa {
            self.send_herc(mvs::IPL)?;
            self.wait_for_string(mvs::CONSOLE_PROMPT)?;
            self.send_oper(mvs::CLPA_REPLY)?;
        }
        self.wait_for_string(BOOT_COMPLETE)
    }

    /// Bring MVS down: stop JES2, end of day, quiesce, stop the processors.
    ///
    /// `cust` selects the JES2 termination message of customised systems.
    pub fn shutdown_mvs(&mut self, cust: bool) -> Result<()> {
        info!("Shutting down MVS");
        self.send_oper(mvs::JES2_ABEND)?;
        self.wait_for_string(mvs::JES2_TERMINATION_PROMPT)?;
        self.send_oper(mvs::JES2_PURGE)?;
        if cust {
            self.wait_for_string(mvs::JES2_ENDED)?;
        } else {
            self.wait_for_string(mvs::SPOOL_RELEASED)?;
        }
        self.send_oper(mvs::END_OF_DAY)?;
        self.wait_for_string(mvs::END_OF_DAY_DONE)?;
        self.send_oper(mvs::QUIESCE)?;
        self.wait_for_string(mvs::DISABLED_WAIT)?;
        self.send_herc(mvs::STOP)
    }

    /// Quit Hercules and wait for its confirmation.
    pub fn quit(&mut self) -> Result<()> {
        self.controller.shutdown()
    }

    /// Send a Hercules command.
    pub fn send_herc(&self, command: &str) -> Result<()> {
        debug!("Sending Hercules Command: {}", command);
        self.controller.send(command)
    }

    /// Send an MVS operator command.
    pub fn send_oper(&self, command: &str) -> Result<()> {
        debug!("Sending Operator command: /{}", command);
        self.send_herc(&commands::operator(command))
    }

    /// Answer the last outstanding reply with `text`.
    pub fn send_reply(&self, text: &str) -> Result<()> {
        let line = commands::reply(&self.reply_number(), text);
        debug!("Sending reply: {}", line);
        self.send_herc(&line)
    }

    /// Wait condition with this session's timeout and poll interval.
    pub fn condition<I, S>(&self, targets: I) -> WaitCondition
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        WaitCondition::for_any(targets)
            .with_timeout(self.config.timing.timeout())
            .with_poll_interval(self.config.timing.poll_interval())
    }

    /// Wait for `condition`.
    pub fn wait_for(&self, condition: &WaitCondition) -> Result<WaitResult> {
        self.controller.wait_for(condition)
    }

    /// Wait for `text` on the console with the session timeout.
    pub fn wait_for_string(&self, text: &str) -> Result<()> {
        self.wait_for_string_on(text, StreamKind::Primary, None)
    }

    /// Wait for `text` on `stream`, optionally with a different timeout.
    pub fn wait_for_string_on(
        &self,
        text: &str,
        stream: StreamKind,
        timeout: Option<Duration>,
    ) -> Result<()> {
        self.wait_for_any(&[text], stream, timeout).map(|_| ())
    }

    /// Wait for the first of `targets` to appear and return it.
    pub fn wait_for_any(
        &self,
        targets: &[&str],
        stream: StreamKind,
        timeout: Option<Duration>,
    ) -> Result<String> {
        let mut condition = self.condition(targets.iter().copied()).on(stream);
        if let Some(timeout) = timeout {
            condition = condition.with_timeout(timeout);
        }
        self.wait_for(&condition).map(|result| result.matched)
    }

    /// Wait until JES2 has purged `jobname`.
    pub fn wait_for_job(&self, jobname: &str) -> Result<()> {
        self.wait_for_string(&job_purged(jobname))
    }

    /// Punch `deck` into the socket card reader.
    pub fn submit(&self, deck: &JobDeck) -> Result<()> {
        submit_deck(&self.config.submit, deck)
    }

    /// Submit `deck`, wait for it to finish and check its condition codes.
    ///
    /// The job name comes from the JCL unless given; EBCDIC decks need it.
    pub fn submit_and_check(
        &self,
        deck: &JobDeck,
        jobname: Option<&str>,
        expected: &ExpectedCodes,
    ) -> Result<Vec<StepStatus>> {
        let jobname = deck.jobname(jobname)?;
        debug!("Submitting {}", jobname);
        self.submit(deck)?;
        self.wait_for_job(&jobname)?;
        self.check_maxcc(&jobname, expected, false)
    }

    /// Check the condition codes `jobname` left in the printer file.
    pub fn check_maxcc(
        &self,
        jobname: &str,
        expected: &ExpectedCodes,
        ignore: bool,
    ) -> Result<Vec<StepStatus>> {
        let printer_file = self.layout.path_in_folder(&self.config.output.printer_file);
        automvs_report::check_maxcc(jobname, expected, &printer_file, ignore)
    }

    /// Send punch card output to `path`, relative to the distribution folder.
    pub fn change_punchcard_output(&self, path: &Path) -> Result<()> {
        debug!("Changing 3525 Punchcard output location to: '{}'", path.display());
        let folder = match path.parent() {
            Some(parent) => self.layout.path_in_folder(parent),
            None => self.layout.folder.clone(),
        };
        if !folder.is_dir() {
            return Err(Error::Config(format!(
                "Punchcard folder '{}' does not exist",
                folder.display()
            )));
        }
        for command in commands::punch_output(&path.display().to_string()) {
            self.send_herc(&command)?;
        }
        Ok(())
    }
}
