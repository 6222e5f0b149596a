//! Job submission through the emulator's socket card reader.

use std::io::Write;
use std::net::TcpStream;

use tracing::debug;

use automvs_core::{Error, Result, SubmitSettings};

/// A job deck ready to be punched into the card reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobDeck {
    /// ASCII JCL, translated by the reader
    Text(String),
    /// Deck already in EBCDIC, sent byte for byte
    Ebcdic(Vec<u8>),
}

impl JobDeck {
    /// Bytes sent over the socket.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            JobDeck::Text(jcl) => jcl.as_bytes(),
            JobDeck::Ebcdic(bytes) => bytes,
        }
    }

    /// Whether the deck is EBCDIC.
    pub fn is_ebcdic(&self) -> bool {
        matches!(self, JobDeck::Ebcdic(_))
    }

    /// Name of the job this deck submits.
    ///
    /// Taken from the first JCL statement of a text deck (`//NAME JOB ...`).
    /// EBCDIC decks cannot be inspected and need `explicit`.
    pub fn jobname(&self, explicit: Option<&str>) -> Result<String> {
        if let Some(name) = explicit {
            return Ok(name.to_string());
        }
        match self {
            JobDeck::Text(jcl) => jobname_from_jcl(jcl),
            JobDeck::Ebcdic(_) => Err(Error::InvalidInput(
                "job name of an EBCDIC deck cannot be detected, pass it explicitly".to_string(),
            )),
        }
    }
}

impl From<String> for JobDeck {
    fn from(jcl: String) -> Self {
        JobDeck::Text(jcl)
    }
}

impl From<&str> for JobDeck {
    fn from(jcl: &str) -> Self {
        JobDeck::Text(jcl.to_string())
    }
}

/// Job name from the first statement of `jcl`.
pub fn jobname_from_jcl(jcl: &str) -> Result<String> {
    let first = jcl.split_whitespace().next().unwrap_or_default();
    match first.strip_prefix("//") {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(Error::InvalidInput(format!(
            "JCL does not start with a job statement: '{first}'"
        ))),
    }
}

/// Send `deck` to the card reader at `settings.host:settings.port`.
pub fn submit_deck(settings: &SubmitSettings, deck: &JobDeck) -> Result<()> {
    debug!(
        "Submitting JCL host={} port={} EBCDIC={}",
        settings.host,
        settings.port,
        deck.is_ebcdic()
    );
    let mut stream = TcpStream::connect((settings.host.as_str(), settings.port))?;
    stream.write_all(deck.as_bytes())?;
    stream.flush()?;
    Ok(())
}
