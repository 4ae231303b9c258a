//! Parser for interleaved, multi-process tracer output.
//!
//! Two dialects are supported: the system-call
//! dialect (`openat` records from a `strace`-style tracer) and the
//! library-call dialect (`ltrace`-style, with `<unfinished ...>` /
//! `<... resumed>` continuation pairing). Both parsers are pure functions
//! over a text blob — they perform no I/O and never suspend.

mod error;
mod ltrace;
mod strace;

pub use error::{Result, TraceError};
pub use ltrace::{parse_ltrace, parse_ltrace_with_residual, LibraryCallTrace};
pub use strace::parse_strace;

use serde::{Deserialize, Serialize};

/// A single (pid, symbol) observation from the library-call tracer.
/// Equality and hashing are over both fields; no ordering is preserved by
/// the parser.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallEvent {
    pub pid: u32,
    pub symbol: String,
}

impl CallEvent {
    pub fn new(pid: u32, symbol: impl Into<String>) -> Self {
        Self {
            pid,
            symbol: symbol.into(),
        }
    }
}

/// Transient key used while matching `<unfinished ...>` openings to later
/// `<... resumed>` continuations. A non-empty residual set at end-of-trace
/// is a warning (the tracer may have dropped openings under load), never a
/// hard error.
pub type UnfinishedKey = (u32, String);

/// Parse a decimal pid token, rejecting anything that isn't a valid
/// non-negative integer — the one input shape whose corruption is
/// treated as fatal for the whole stream.
pub(crate) fn parse_pid(token: &str, line_no: usize) -> Result<u32> {
    token
        .parse::<u32>()
        .map_err(|_| TraceError::InvalidPid {
            line_no,
            token: token.to_string(),
        })
}

/// Split a tracer output blob into lines, tolerating both an empty
/// trailing record and none (open question in §9 — superseded drafts
/// disagree on whether the last line is guaranteed empty).
pub(crate) fn trace_lines(input: &str) -> impl Iterator<Item = (usize, &str)> {
    input
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty())
}
