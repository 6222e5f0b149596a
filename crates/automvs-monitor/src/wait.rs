//! Waiting for strings to appear in emulator output.

use std::time::{Duration, Instant};

use tracing::debug;

use automvs_core::{Error, OutputLine, Result, StreamKind};

use crate::buffer::LineBuffer;
use crate::context::SessionContext;

/// Default time to wait for a string: half an hour, long enough for a cold IPL.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(1800);

/// Default pause between buffer checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Strings to wait for in one output stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitCondition {
    /// Substrings to look for, in priority order
    pub targets: Vec<String>,

    /// Buffer to drain
    pub stream: StreamKind,

    /// Maximum time to wait
    pub timeout: Duration,

    /// Pause between checks of an empty buffer
    pub poll_interval: Duration,
}

impl WaitCondition {
    /// Wait for `text` on the primary stream.
    pub fn for_text(text: impl Into<String>) -> Self {
        Self::for_any([text])
    }

    /// Wait for the first of `targets` on the primary stream.
    pub fn for_any<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            targets: targets.into_iter().map(Into::into).collect(),
            stream: StreamKind::Primary,
            timeout: DEFAULT_WAIT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Select the stream to drain.
    pub fn on(mut self, stream: StreamKind) -> Self {
        self.stream = stream;
        self
    }

    /// Set timeout duration.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set polling interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    fn timed_out(&self, elapsed: Duration) -> Error {
        Error::WaitTimeout {
            targets: self.targets.clone(),
            stream: self.stream,
            elapsed,
        }
    }
}

/// A successful wait.
#[derive(Debug, Clone)]
pub struct WaitResult {
    /// Target that was found
    pub matched: String,

    /// Line that contained it
    pub line: OutputLine,

    /// Time spent waiting
    pub waited: Duration,
}

impl LineBuffer {
    /// Consume lines until one contains a target or the timeout expires.
    ///
    /// Lines are inspected once, oldest first, and discarded when nothing
    /// matches. Targets are tried in order, so when one line holds several
    /// the earliest target wins. Lines after the match stay buffered.
    ///
    /// The stream of `condition` is ignored here; this buffer is drained.
    pub fn wait_for(&self, condition: &WaitCondition) -> Result<WaitResult> {
        self.wait_until(condition, || None)
    }

    fn wait_until<F>(&self, condition: &WaitCondition, mut interrupted: F) -> Result<WaitResult>
    where
        F: FnMut() -> Option<Error>,
    {
        if condition.targets.is_empty() {
            return Err(Error::InvalidInput("no strings to wait for".to_string()));
        }

        debug!(
            "Waiting up to {}s on {} for {:?}",
            condition.timeout.as_secs(),
            self.stream(),
            condition.targets
        );
        let start = Instant::now();

        loop {
            let popped = self.try_pop();
            let empty = popped.is_none();

            if let Some(line) = popped {
                if let Some(target) = line.find_match(&condition.targets) {
                    debug!("Found '{}' in: {}", target, line.text);
                    return Ok(WaitResult {
                        matched: target.to_string(),
                        line,
                        waited: start.elapsed(),
                    });
                }
            }

            // Checked on every miss so a chatty stream cannot hold a wait open
            let elapsed = start.elapsed();
            if elapsed >= condition.timeout {
                return Err(condition.timed_out(elapsed));
            }

            if empty {
                if let Some(err) = interrupted() {
                    return Err(err);
                }
                std::thread::sleep(condition.poll_interval.min(condition.timeout - elapsed));
            }
        }
    }
}

impl SessionContext {
    /// Wait on the buffer selected by `condition.stream`.
    ///
    /// Once the session has aborted and the stream's reader has stopped, an
    /// empty buffer ends the wait with `ProcessAborted`: nothing more will
    /// ever be read.
    pub fn wait_for(&self, condition: &WaitCondition) -> Result<WaitResult> {
        let buffer = self.buffer(condition.stream);
        buffer.wait_until(condition, || {
            // Closed before empty: every line pushed before close is visible
            if buffer.is_closed() && buffer.is_empty() {
                self.abort_reason().map(Error::ProcessAborted)
            } else {
                None
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use automvs_core::AbortReason;

    use crate::context::LogOnly;

    fn buffer_with(lines: &[&str]) -> LineBuffer {
        let buffer = LineBuffer::new(StreamKind::Primary);
        for (seq, text) in lines.iter().enumerate() {
            buffer.push(OutputLine::new(StreamKind::Primary, seq as u64, *text));
        }
        buffer
    }

    fn quick(condition: WaitCondition) -> WaitCondition {
        condition
            .with_timeout(Duration::from_millis(200))
            .with_poll_interval(Duration::from_millis(5))
    }

    #[test]
    fn test_wait_condition_defaults() {
        let condition = WaitCondition::for_text("IKT005I");
        assert_eq!(condition.targets, vec!["IKT005I"]);
        assert_eq!(condition.stream, StreamKind::Primary);
        assert_eq!(condition.timeout, DEFAULT_WAIT_TIMEOUT);
        assert_eq!(condition.poll_interval, DEFAULT_POLL_INTERVAL);
    }

    #[test]
    fn test_wait_condition_builders() {
        let condition = WaitCondition::for_any(["a", "b"])
            .on(StreamKind::Diagnostic)
            .with_timeout(Duration::from_secs(5))
            .with_poll_interval(Duration::from_millis(1));
        assert_eq!(condition.targets, vec!["a", "b"]);
        assert_eq!(condition.stream, StreamKind::Diagnostic);
        assert_eq!(condition.timeout, Duration::from_secs(5));
        assert_eq!(condition.poll_interval, Duration::from_millis(1));
    }

    #[test]
    fn test_empty_target_list_is_rejected() {
        let buffer = buffer_with(&["anything"]);
        let condition = WaitCondition::for_any(Vec::<String>::new());
        assert!(matches!(
            buffer.wait_for(&condition),
            Err(Error::InvalidInput(_))
        ));
        // Nothing was consumed
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_first_target_in_list_wins() {
        let buffer = buffer_with(&["JOB 1 READY ENDED"]);
        let result = buffer
            .wait_for(&quick(WaitCondition::for_any(["ENDED", "READY"])))
            .unwrap();
        assert_eq!(result.matched, "ENDED");
        assert_eq!(result.line.text, "JOB 1 READY ENDED");
    }

    #[test]
    fn test_lines_before_match_are_consumed_and_after_are_kept() {
        let buffer = buffer_with(&["A", "B", "C"]);

        let result = buffer.wait_for(&quick(WaitCondition::for_text("B"))).unwrap();
        assert_eq!(result.line.seq, 1);
        assert_eq!(buffer.len(), 1);

        // A is gone for good
        let err = buffer.wait_for(&quick(WaitCondition::for_text("A"))).unwrap_err();
        assert!(err.is_timeout());
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_match_is_case_sensitive_substring() {
        let buffer = buffer_with(&["hasp250 lower", "$HASP250 TESTJOB  IS PURGED"]);
        let result = buffer
            .wait_for(&quick(WaitCondition::for_text("HASP250")))
            .unwrap();
        assert_eq!(result.line.seq, 1);
    }

    #[test]
    fn test_timeout_precision() {
        let buffer = LineBuffer::new(StreamKind::Diagnostic);
        let condition = WaitCondition::for_text("never")
            .on(StreamKind::Diagnostic)
            .with_timeout(Duration::from_millis(200));

        let start = Instant::now();
        let err = buffer.wait_for(&condition).unwrap_err();
        let elapsed = start.elapsed();

        assert!(elapsed >= Duration::from_millis(200), "returned early: {elapsed:?}");
        assert!(elapsed <= Duration::from_millis(300), "returned late: {elapsed:?}");
        match err {
            Error::WaitTimeout { targets, stream, .. } => {
                assert_eq!(targets, vec!["never"]);
                assert_eq!(stream, StreamKind::Diagnostic);
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[test]
    fn test_timeout_message_names_targets_and_stream() {
        let buffer = LineBuffer::new(StreamKind::Diagnostic);
        let condition = WaitCondition::for_text("Hercules shutdown complete")
            .on(StreamKind::Diagnostic)
            .with_timeout(Duration::from_millis(20));

        let message = buffer.wait_for(&condition).unwrap_err().to_string();
        println!("{message}");
        assert!(message.contains("Hercules shutdown complete"));
        assert!(message.contains("diagnostic"));
    }

    #[test]
    fn test_wait_sees_lines_produced_later() {
        let buffer = Arc::new(LineBuffer::new(StreamKind::Primary));
        let producer = {
            let buffer = Arc::clone(&buffer);
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(50));
                buffer.push(OutputLine::new(StreamKind::Primary, 0, "noise"));
                buffer.push(OutputLine::new(
                    StreamKind::Primary,
                    1,
                    "IKT005I TCAS IS INITIALIZED",
                ));
            })
        };

        let result = buffer
            .wait_for(&WaitCondition::for_text("IKT005I").with_timeout(Duration::from_secs(5)))
            .unwrap();
        producer.join().unwrap();

        assert_eq!(result.line.seq, 1);
        assert!(result.waited >= Duration::from_millis(40));
    }

    #[test]
    fn test_context_wait_selects_stream() {
        let ctx = SessionContext::new(Arc::new(LogOnly));
        ctx.buffer(StreamKind::Primary)
            .push(OutputLine::new(StreamKind::Primary, 0, "target on primary"));
        ctx.buffer(StreamKind::Diagnostic).push(OutputLine::new(
            StreamKind::Diagnostic,
            0,
            "target on diagnostic",
        ));

        let result = ctx
            .wait_for(&quick(WaitCondition::for_text("target")).on(StreamKind::Diagnostic))
            .unwrap();
        assert_eq!(result.line.stream, StreamKind::Diagnostic);
        assert_eq!(ctx.buffer(StreamKind::Primary).len(), 1);
    }

    #[test]
    fn test_context_wait_stops_after_abort_once_buffer_is_empty() {
        let ctx = SessionContext::new(Arc::new(LogOnly));
        ctx.buffer(StreamKind::Primary)
            .push(OutputLine::new(StreamKind::Primary, 0, "last words"));
        ctx.abort(AbortReason::UnexpectedExit { code: Some(3) });
        ctx.buffer(StreamKind::Primary).close();

        // Buffered output is still searchable
        let result = ctx
            .wait_for(&quick(WaitCondition::for_text("last")))
            .unwrap();
        assert_eq!(result.matched, "last");

        let start = Instant::now();
        let err = ctx
            .wait_for(&WaitCondition::for_text("more").with_timeout(Duration::from_secs(30)))
            .unwrap_err();
        assert!(start.elapsed() < Duration::from_secs(1));
        assert!(matches!(
            err,
            Error::ProcessAborted(AbortReason::UnexpectedExit { code: Some(3) })
        ));
    }

    #[test]
    fn test_context_wait_reads_tail_after_abort() {
        let ctx = Arc::new(SessionContext::new(Arc::new(LogOnly)));
        ctx.abort(AbortReason::FatalError);

        // The reader is still draining the dead emulator's pipe
        let reader = {
            let ctx = Arc::clone(&ctx);
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(50));
                let buffer = ctx.buffer(StreamKind::Primary);
                buffer.push(OutputLine::new(
                    StreamKind::Primary,
                    0,
                    "HHC00809I Processor CP00: disabled wait state 00020000 80000005",
                ));
                buffer.close();
            })
        };

        let result = ctx
            .wait_for(&WaitCondition::for_text("disabled wait state").with_timeout(Duration::from_secs(5)))
            .unwrap();
        reader.join().unwrap();
        assert_eq!(result.matched, "disabled wait state");

        // Closed and empty now
        let err = ctx
            .wait_for(&WaitCondition::for_text("more").with_timeout(Duration::from_secs(5)))
            .unwrap_err();
        assert!(matches!(err, Error::ProcessAborted(AbortReason::FatalError)));
    }
}
