//! State shared between the controller and the monitoring threads of one session.

use std::sync::{Arc, Mutex};

use tracing::error;

use automvs_core::{AbortReason, SessionId, StreamKind};

use crate::buffer::LineBuffer;
use crate::flags::CoordinationFlags;

/// Reply number used before any reply prompt has been seen.
pub const INITIAL_REPLY: &str = "0";

/// What happens when the emulator goes away on its own.
pub trait AbortHandler: Send + Sync {
    /// Called once per abort, from the supervisor thread.
    fn on_abort(&self, session: SessionId, reason: &AbortReason);
}

/// Terminates the whole program with exit code 1.
///
/// Nothing else will ever be printed by a dead emulator, so every pending
/// wait would otherwise sit until its deadline.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExitProcess;

impl AbortHandler for ExitProcess {
    fn on_abort(&self, session: SessionId, reason: &AbortReason) {
        error!("Session {} aborted: {}. Exiting.", session, reason);
        std::process::exit(1);
    }
}

/// Logs the abort and lets the caller find out through `ProcessAborted` errors.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogOnly;

impl AbortHandler for LogOnly {
    fn on_abort(&self, session: SessionId, reason: &AbortReason) {
        error!("Session {} aborted: {}", session, reason);
    }
}

/// Last reply number announced by a `/*nn` prompt.
#[derive(Debug, Clone)]
pub struct ReplyToken(Arc<Mutex<String>>);

impl ReplyToken {
    /// Create a token holding [`INITIAL_REPLY`].
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(INITIAL_REPLY.to_string())))
    }

    /// Current reply number.
    pub fn get(&self) -> String {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Replace the reply number.
    pub fn set(&self, reply: &str) {
        let mut current = self.0.lock().unwrap_or_else(|e| e.into_inner());
        current.clear();
        current.push_str(reply);
    }
}

impl Default for ReplyToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything the readers, the supervisor and the waiting caller share.
///
/// One instance per session, handed to every thread at spawn time.
pub struct SessionContext {
    id: SessionId,
    primary: Arc<LineBuffer>,
    diagnostic: Arc<LineBuffer>,
    flags: Arc<CoordinationFlags>,
    reply: ReplyToken,
    abort: Mutex<Option<AbortReason>>,
    abort_handler: Arc<dyn AbortHandler>,
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("id", &self.id)
            .field("flags", &self.flags)
            .field("reply", &self.reply)
            .finish_non_exhaustive()
    }
}

impl SessionContext {
    /// Create a context with empty buffers and cleared flags.
    pub fn new(abort_handler: Arc<dyn AbortHandler>) -> Self {
        Self {
            id: SessionId::new(),
            primary: Arc::new(LineBuffer::new(StreamKind::Primary)),
            diagnostic: Arc::new(LineBuffer::new(StreamKind::Diagnostic)),
            flags: Arc::new(CoordinationFlags::new()),
            reply: ReplyToken::new(),
            abort: Mutex::new(None),
            abort_handler,
        }
    }

    /// Session identifier.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Buffer collecting `stream`.
    pub fn buffer(&self, stream: StreamKind) -> &Arc<LineBuffer> {
        match stream {
            StreamKind::Primary => &self.primary,
            StreamKind::Diagnostic => &self.diagnostic,
        }
    }

    /// Coordination flags.
    pub fn flags(&self) -> &Arc<CoordinationFlags> {
        &self.flags
    }

    /// Reply token.
    pub fn reply(&self) -> &ReplyToken {
        &self.reply
    }

    /// Discard unread lines from both buffers and reopen them for the next
    /// emulator. Returns how many lines were dropped.
    pub fn discard_buffered(&self) -> usize {
        self.primary.reset() + self.diagnostic.reset()
    }

    /// Record an abort and hand it to the abort handler. Only the first abort counts.
    pub fn abort(&self, reason: AbortReason) {
        {
            let mut slot = self.abort.lock().unwrap_or_else(|e| e.into_inner());
            if slot.is_some() {
                return;
            }
            *slot = Some(reason.clone());
        }
        self.abort_handler.on_abort(self.id, &reason);
    }

    /// Abort recorded for this session, if any.
    pub fn abort_reason(&self) -> Option<AbortReason> {
        self.abort.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}
