//! Supported MVS distributions.

use std::sync::Arc;

use tracing::info;

use automvs_core::patterns::BOOT_COMPLETE;
use automvs_core::{AutomationConfig, Error, Result, StepStatus};
use automvs_monitor::{AbortHandler, ExitProcess, WaitCondition, WaitResult};
use automvs_report::ExpectedCodes;

use crate::automation::Automation;
use crate::commands::mvs;
use crate::layout::LayoutDefaults;
use crate::submit::JobDeck;

/// Files of an MVS/CE installation.
pub const MVSCE_LAYOUT: LayoutDefaults = LayoutDefaults {
    label: "MVS/CE",
    folder: "mvsce/",
    config: "conf/local.cnf",
    rc: Some("conf/mvsce.rc"),
};

/// Files of a TK4- installation.
pub const TK4_LAYOUT: LayoutDefaults = LayoutDefaults {
    label: "TK4-",
    folder: "tk4-/",
    config: "conf/tk4-.cnf",
    rc: None,
};

/// What every distribution can do.
pub trait Mainframe: Send {
    /// Distribution name as used in configuration.
    fn name(&self) -> &'static str;

    /// Boot the system.
    fn ipl(&mut self, clpa: bool) -> Result<()>;

    /// Shut the system down and quit Hercules.
    fn shutdown(&mut self) -> Result<()>;

    /// Submit a job deck.
    fn submit(&self, deck: &JobDeck) -> Result<()>;

    /// Wait for console or diagnostic output.
    fn wait_for(&self, condition: &WaitCondition) -> Result<WaitResult>;

    /// Condition codes of a finished job.
    fn check_results(&self, jobname: &str, expected: &ExpectedCodes) -> Result<Vec<StepStatus>>;

    /// Send an operator command.
    fn send_command(&self, command: &str) -> Result<()>;

    /// The session behind this distribution.
    fn automation(&self) -> &Automation;

    /// The session behind this distribution, mutably.
    fn automation_mut(&mut self) -> &mut Automation;
}

/// MVS 3.8j Community Edition.
#[derive(Debug)]
pub struct MvsCe {
    automation: Automation,
}

impl MvsCe {
    /// Prepare an MVS/CE session.
    pub fn new(config: AutomationConfig, abort_handler: Arc<dyn AbortHandler>) -> Result<Self> {
        Ok(Self {
            automation: Automation::new(config, &MVSCE_LAYOUT, abort_handler)?,
        })
    }
}

impl Mainframe for MvsCe {
    fn name(&self) -> &'static str {
        "mvsce"
    }

    fn ipl(&mut self, clpa: bool) -> Result<()> {
        self.automation.ipl(clpa)
    }

    fn shutdown(&mut self) -> Result<()> {
        self.automation.shutdown_mvs(false)?;
        self.automation.quit()
    }

    fn submit(&self, deck: &JobDeck) -> Result<()> {
        self.automation.submit(deck)
    }

    fn wait_for(&self, condition: &WaitCondition) -> Result<WaitResult> {
        self.automation.wait_for(condition)
    }

    fn check_results(&self, jobname: &str, expected: &ExpectedCodes) -> Result<Vec<StepStatus>> {
        self.automation.check_maxcc(jobname, expected, false)
    }

    fn send_command(&self, command: &str) -> Result<()> {
        self.automation.send_oper(command)
    }

    fn automation(&self) -> &Automation {
        &self.automation
    }

    fn automation_mut(&mut self) -> &mut Automation {
        &mut self.automation
    }
}

/// TK4- update 08.
///
/// Its configuration IPLs the system by itself and it ships an automated
/// shutdown procedure, so boot and shutdown are simpler than on MVS/CE.
#[derive(Debug)]
pub struct Tk4 {
    automation: Automation,
}

impl Tk4 {
    /// Prepare a TK4- session.
    pub fn new(config: AutomationConfig, abort_handler: Arc<dyn AbortHandler>) -> Result<Self> {
        Ok(Self {
            automation: Automation::new(config, &TK4_LAYOUT, abort_handler)?,
        })
    }
}

impl Mainframe for Tk4 {
    fn name(&self) -> &'static str {
        "tk4"
    }

    fn ipl(&mut self, _clpa: bool) -> Result<()> {
        info!("IPLing TK4-");
        self.automation.restart(false)?;
        self.automation.wait_for_string(BOOT_COMPLETE)
    }

    fn shutdown(&mut self) -> Result<()> {
        info!("Shutting down TK4-");
        self.automation.send_oper(mvs::TK4_SHUTDOWN)?;
        self.automation.wait_for_string(mvs::DISABLED_WAIT)?;
        self.automation.send_herc(mvs::STOP)?;
        self.automation.quit()
    }

    fn submit(&self, deck: &JobDeck) -> Result<()> {
        self.automation.submit(deck)
    }

    fn wait_for(&self, condition: &WaitCondition) -> Result<WaitResult> {
        self.automation.wait_for(condition)
    }

    fn check_results(&self, jobname: &str, expected: &ExpectedCodes) -> Result<Vec<StepStatus>> {
        self.automation.check_maxcc(jobname, expected, false)
    }

    fn send_command(&self, command: &str) -> Result<()> {
        self.automation.send_oper(command)
    }

    fn automation(&self) -> &Automation {
        &self.automation
    }

    fn automation_mut(&mut self) -> &mut Automation {
        &mut self.automation
    }
}

/// Open a session for the configured distribution.
///
/// The emulator is not started; call [`Mainframe::ipl`]. An unexpected
/// emulator exit terminates the program.
pub fn connect(config: AutomationConfig) -> Result<Box<dyn Mainframe>> {
    connect_with(config, Arc::new(ExitProcess))
}

/// Like [`connect`], with a custom abort handler.
pub fn connect_with(
    config: AutomationConfig,
    abort_handler: Arc<dyn AbortHandler>,
) -> Result<Box<dyn Mainframe>> {
    config.validate()?;
    match config.emulator.distribution.as_str() {
        "mvsce" => Ok(Box::new(MvsCe::new(config, abort_handler)?)),
        "tk4" => Ok(Box::new(Tk4::new(config, abort_handler)?)),
        other => Err(Error::Config(format!("Unknown distribution: {other}"))),
    }
}
