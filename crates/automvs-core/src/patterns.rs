//! Console patterns recognised in Hercules and MVS output.
//!
//! All matching is literal, case-sensitive substring containment except for
//! the reply prompt, which is anchored at the start of the line.

use lazy_static::lazy_static;
use regex::Regex;

/// Output that means the emulator cannot continue. Seeing any of these on
/// either stream kills the emulator.
pub const FATAL_PATTERNS: &[&str] = &[
    "open error",
    "Creating crash dump",
    "DISASTROUS ERROR",
    "HHC01023W Waiting for port 3270 to become free for console connections",
    "disabled wait state 00020000 80000005",
    "invalid ipl psw 0000000000000",
];

/// Primary stream messages that are never buffered.
///
/// ```text
/// HHC90020W 'hthread_setschedparam()' failed at loc=timer.c:193: rc=22: Invalid argument
/// HHC00007I Previous message from function 'hthread_set_thread_prio' at hthreads.c(1170)
/// ```
pub const PRIMARY_NOISE: &[&str] = &["HHC90020W", "HHC00007I", "HHC00107I", "HHC00100I"];

/// Diagnostic stream messages that are never buffered.
pub const DIAGNOSTIC_NOISE: &[&str] = &[];

/// Printed on the diagnostic stream once Hercules has exited cleanly.
pub const SHUTDOWN_COMPLETE: &str = "Hercules shutdown complete";

/// Printed by MVS once TSO is available, the end of a normal IPL.
pub const BOOT_COMPLETE: &str = "IKT005I TCAS IS INITIALIZED";

/// Diagnostic lines carrying this are logged even when verbose diagnostics are off.
pub const PERFORMANCE_MARKER: &str = "MIPS";

lazy_static! {
    static ref REPLY_PROMPT: Regex = Regex::new(r"^/\*([0-9]{2})").unwrap();
}

/// Return the fatal pattern contained in `line`, if any.
pub fn fatal_pattern(line: &str) -> Option<&'static str> {
    FATAL_PATTERNS
        .iter()
        .copied()
        .find(|pattern| line.contains(*pattern))
}

/// Whether `line` contains any entry of the `noise` list.
pub fn is_noise(line: &str, noise: &[&str]) -> bool {
    noise.iter().any(|pattern| line.contains(*pattern))
}

/// Extract the reply number from an outstanding-reply prompt.
///
/// MVS prefixes messages that expect an operator reply with `/*` and a
/// two-digit reply id, e.g. `/*01 IEF238D ... REPLY DEVICE NAME`.
pub fn parse_reply_token(line: &str) -> Option<&str> {
    REPLY_PROMPT
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Message JES2 prints once a job has left the system.
pub fn job_purged(jobname: &str) -> String {
    format!("HASP250 {jobname:<8} IS PURGED")
}
