//! Parsing of `IEF142I` step completion messages.
//!
//! A step line looks like
//!
//! ```text
//! IEF142I MVPINST INSTALL - STEP WAS EXECUTED - COND CODE 0000
//! IEF142I BUILD COMPILE ASM - STEP WAS EXECUTED - COND CODE 0004
//! ```
//!
//! where the second form names a procedure step. Anything printed before
//! the message id (page carriage, timestamps) is ignored.

use std::path::Path;

use tracing::debug;

use automvs_core::{Result, StepStatus};

/// Message id of a step completion message.
pub const STEP_MESSAGE: &str = "IEF142I";

// Token positions counted from the message id
const JOBNAME: usize = 1;
const CODE: usize = 10;

/// Parse one step completion line.
///
/// Returns `None` when the line carries no `IEF142I` token or is too short
/// to hold a condition code.
pub fn parse_step_line(line: &str) -> Option<StepStatus> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let start = tokens.iter().position(|t| *t == STEP_MESSAGE)?;
    let j = &tokens[start..];

    if j.len() <= CODE {
        return None;
    }

    // A third token other than "-" means "job proc step"
    if j[3] != "-" {
        let code = j.get(CODE + 1)?;
        return Some(StepStatus {
            jobname: j[JOBNAME].to_string(),
            procname: j[2].to_string(),
            stepname: j[3].to_string(),
            exitcode: code.to_string(),
        });
    }

    Some(StepStatus {
        jobname: j[JOBNAME].to_string(),
        procname: String::new(),
        stepname: j[2].to_string(),
        exitcode: j[CODE].to_string(),
    })
}

/// Collect the steps of `jobname` from printer output, in print order.
///
/// Lines are selected by substring: they must contain both `IEF142I` and
/// the job name anywhere.
pub fn scan_report(text: &str, jobname: &str) -> Vec<StepStatus> {
    text.lines()
        .filter(|line| line.contains(STEP_MESSAGE) && line.contains(jobname))
        .filter_map(|line| {
            let status = parse_step_line(line);
            if status.is_none() {
                debug!("Skipping malformed step line: {}", line.trim());
            }
            status
        })
        .collect()
}

/// Read a printer file, replacing bytes that are not UTF-8.
pub fn read_printer_file(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
