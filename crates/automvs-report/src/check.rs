//! Condition code checks for finished jobs.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, error};

use automvs_core::job::DEFAULT_EXPECTED_CC;
use automvs_core::{Error, Result, StepStatus};

use crate::parse::{read_printer_file, scan_report};

/// Expected condition code per step name. Unlisted steps must end with `0000`.
pub type ExpectedCodes = HashMap<String, String>;

/// Check every step of `jobname` in `printer_file`.
///
/// Returns the step statuses in print order. Fails with `JobNotFound` when
/// the job printed no step messages, and with `StepFailed` when a step's
/// condition code differs from its expectation, unless `ignore` is set.
pub fn check_maxcc(
    jobname: &str,
    expected: &ExpectedCodes,
    printer_file: &Path,
    ignore: bool,
) -> Result<Vec<StepStatus>> {
    debug!("Checking {} job results", jobname);
    let text = read_printer_file(printer_file)?;
    let steps = scan_report(&text, jobname);
    check_steps(jobname, steps, expected, &printer_file.display().to_string(), ignore)
}

/// Compare already scanned `steps` against `expected`.
///
/// `printer_file` is only used in error messages.
pub fn check_steps(
    jobname: &str,
    steps: Vec<StepStatus>,
    expected: &ExpectedCodes,
    printer_file: &str,
    ignore: bool,
) -> Result<Vec<StepStatus>> {
    if steps.is_empty() {
        return Err(Error::JobNotFound {
            jobname: jobname.to_string(),
            printer_file: printer_file.to_string(),
        });
    }

    let mut failure = None;
    for step in &steps {
        debug!(
            "Jobname: {:<8} Procname: {:<8} Stepname: {:<8} Exit Code: {:<8}",
            step.jobname, step.procname, step.stepname, step.exitcode
        );

        let want = expected
            .get(&step.stepname)
            .map(String::as_str)
            .unwrap_or(DEFAULT_EXPECTED_CC);
        if step.exitcode == want {
            continue;
        }

        let err = Error::StepFailed {
            stepname: step.stepname.clone(),
            actual: step.exitcode.clone(),
            expected: want.to_string(),
            printer_file: printer_file.to_string(),
        };
        if ignore {
            debug!("{}", err);
        } else {
            error!("{}", err);
        }
        // The last mismatch is the one reported
        failure = Some(err);
    }

    match failure {
        Some(err) if !ignore => Err(err),
        _ => Ok(steps),
    }
}
