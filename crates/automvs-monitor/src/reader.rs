//! Stream readers: one thread per emulator output stream.

use std::io::{BufRead, BufReader, Read};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, error, warn};

use automvs_core::patterns::{self, DIAGNOSTIC_NOISE, PERFORMANCE_MARKER, PRIMARY_NOISE};
use automvs_core::{OutputLine, StreamKind};

use crate::context::SessionContext;
use crate::sanitize::LineDecoder;

/// Per-stream reading rules.
#[derive(Debug, Clone, Copy)]
pub struct ReaderProfile {
    /// Stream being read
    pub stream: StreamKind,
    /// Lines containing any of these are dropped
    pub noise: &'static [&'static str],
}

impl ReaderProfile {
    /// Rules for `stream`.
    pub fn for_stream(stream: StreamKind) -> Self {
        let noise = match stream {
            StreamKind::Primary => PRIMARY_NOISE,
            StreamKind::Diagnostic => DIAGNOSTIC_NOISE,
        };
        Self { stream, noise }
    }
}

/// What the reader did with one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineDisposition {
    /// Blank line, ignored
    Blank,
    /// Matched the noise list, dropped
    Noise,
    /// Appended to the buffer
    Buffered,
    /// Appended to the buffer and raised the kill request
    Fatal(&'static str),
}

/// Reads one output stream of the emulator into its line buffer.
#[derive(Debug)]
pub struct StreamReader {
    profile: ReaderProfile,
    ctx: Arc<SessionContext>,
    next_seq: u64,
}

impl StreamReader {
    /// Create a reader for `stream` sharing `ctx`.
    pub fn new(stream: StreamKind, ctx: Arc<SessionContext>) -> Self {
        Self {
            profile: ReaderProfile::for_stream(stream),
            ctx,
            next_seq: 0,
        }
    }

    /// Start reading `source` on a dedicated thread.
    ///
    /// The thread ends when the stream closes or a reset is requested.
    pub fn spawn<R>(self, source: R) -> std::io::Result<JoinHandle<()>>
    where
        R: Read + Send + 'static,
    {
        thread::Builder::new()
            .name(format!("automvs-{}-reader", self.profile.stream))
            .spawn(move || self.run(source))
    }

    /// Read `source` line by line on the current thread.
    pub fn run<R: Read>(mut self, source: R) {
        let stream = self.profile.stream;
        let mut reader = BufReader::new(source);
        let mut decoder = LineDecoder::new();
        let mut raw = Vec::new();

        loop {
            raw.clear();
            match reader.read_until(b'\n', &mut raw) {
                Ok(0) => {
                    debug!("{} stream closed", stream);
                    break;
                }
                Ok(_) => {
                    let text = decoder.decode(&raw);
                    self.handle_line(&text);
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!("Error reading {} stream: {}", stream, e);
                    break;
                }
            }

            if self.ctx.flags().reset_requested() {
                debug!("Reset requested, {} reader exiting", stream);
                break;
            }
        }

        self.ctx.buffer(stream).close();
    }

    /// Classify one decoded line and apply its side effects.
    pub fn handle_line(&mut self, text: &str) -> LineDisposition {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return LineDisposition::Blank;
        }

        if let Some(reply) = patterns::parse_reply_token(text) {
            self.ctx.reply().set(reply);
            debug!("Reply number set to {}", reply);
        }

        if patterns::is_noise(text, self.profile.noise) {
            return LineDisposition::Noise;
        }

        self.log_line(trimmed);

        let line = OutputLine::new(self.profile.stream, self.next_seq, text.trim_end());
        self.next_seq += 1;
        self.ctx.buffer(self.profile.stream).push(line);

        match patterns::fatal_pattern(text) {
            Some(pattern) => {
                if self.ctx.flags().request_kill() {
                    match self.profile.stream {
                        StreamKind::Primary => {
                            error!("Quitting! Irrecoverable Hercules error: {}", trimmed)
                        }
                        StreamKind::Diagnostic => {
                            warn!("Quitting! Irrecoverable Hercules error: {}", trimmed)
                        }
                    }
                }
                LineDisposition::Fatal(pattern)
            }
            None => LineDisposition::Buffered,
        }
    }

    fn log_line(&self, trimmed: &str) {
        match self.profile.stream {
            StreamKind::Primary => debug!(target: "automvs::herclog", "{}", trimmed),
            StreamKind::Diagnostic => {
                if self.ctx.flags().diagnostics_verbose() || trimmed.contains(PERFORMANCE_MARKER) {
                    debug!(target: "automvs::diag", "{}", trimmed);
                }
            }
        }
    }
}
