//! Ordered line buffers fed by the stream readers.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use automvs_core::{OutputLine, StreamKind};

/// FIFO of lines read from one emulator stream.
///
/// One reader thread appends; the waiting caller pops. The controller may
/// also drain it while restarting, never at the same time as a wait.
///
/// The reader marks the buffer closed when it stops; nothing is pushed after
/// that until the buffer is reset for the next emulator.
#[derive(Debug)]
pub struct LineBuffer {
    stream: StreamKind,
    lines: Mutex<VecDeque<OutputLine>>,
    closed: AtomicBool,
}

impl LineBuffer {
    /// Create an empty buffer for `stream`.
    pub fn new(stream: StreamKind) -> Self {
        Self {
            stream,
            lines: Mutex::new(VecDeque::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// Stream this buffer collects.
    pub fn stream(&self) -> StreamKind {
        self.stream
    }

    /// Append a line at the back.
    pub fn push(&self, line: OutputLine) {
        self.lock().push_back(line);
    }

    /// Remove and return the oldest line, if any. Never blocks on an empty buffer.
    pub fn try_pop(&self) -> Option<OutputLine> {
        self.lock().pop_front()
    }

    /// Remove every buffered line, returning them oldest first.
    pub fn drain(&self) -> Vec<OutputLine> {
        self.lock().drain(..).collect()
    }

    /// Drop every buffered line and reopen the buffer. Returns how many were dropped.
    pub fn reset(&self) -> usize {
        let mut lines = self.lock();
        let dropped = lines.len();
        lines.clear();
        self.closed.store(false, Ordering::SeqCst);
        dropped
    }

    /// Mark that no more lines will arrive.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    /// Whether the reader feeding this buffer has stopped.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Number of buffered lines.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no line is buffered.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A reader that panicked mid-push leaves the queue intact, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, VecDeque<OutputLine>> {
        self.lines.lock().unwrap_or_else(|e| e.into_inner())
    }
}
