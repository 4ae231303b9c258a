use crate::{parse_pid, trace_lines, CallEvent, Result, UnfinishedKey};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Output of the library-call dialect parser: per-pid call sets, and their
/// union as a flat symbol set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibraryCallTrace {
    pub events_by_pid: HashMap<u32, HashSet<CallEvent>>,
    pub symbols: HashSet<String>,
}

impl LibraryCallTrace {
    fn record(&mut self, pid: u32, symbol: &str) {
        self.events_by_pid
            .entry(pid)
            .or_default()
            .insert(CallEvent::new(pid, symbol));
        self.symbols.insert(symbol.to_string());
    }
}

const UNFINISHED_SPELLINGS: [&str; 2] = ["<unfinished", "<unfinised"];

/// Decode library-call-dialect tracer output.
///
/// Logs a warning and discards any residual `<unfinished ...>` entries
/// left unmatched at end-of-stream (§3: a non-empty residual is a warning,
/// not an error).
pub fn parse_ltrace(input: &str) -> Result<LibraryCallTrace> {
    let (trace, residual) = parse_ltrace_with_residual(input)?;
    if !residual.is_empty() {
        warn!(
            count = residual.len(),
            "trace ended with unmatched <unfinished ...> openings"
        );
    }
    Ok(trace)
}

/// Like [`parse_ltrace`] but also returns the residual unfinished-call
/// scratch set, so callers (and tests asserting the end-of-stream
/// invariant) can inspect it directly instead of only seeing a log line.
pub fn parse_ltrace_with_residual(
    input: &str,
) -> Result<(LibraryCallTrace, HashSet<UnfinishedKey>)> {
    let mut trace = LibraryCallTrace::default();
    let mut scratch: HashSet<UnfinishedKey> = HashSet::new();

    for (line_no, line) in trace_lines(input) {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }

        let pid = parse_pid(tokens[0], line_no)?;

        if tokens.len() < 2 {
            warn!(line_no, line, "ltrace line too short to parse, skipping");
            continue;
        }

        // process exit: `pid +++`
        if tokens[1] == "+++" {
            continue;
        }
        // signal: `pid --- SIG...`
        if tokens[1] == "---" && tokens.get(2).is_some_and(|t| t.starts_with("SIG")) {
            continue;
        }
        // tracer warning: `pid unexpected ...`
        if tokens[1] == "unexpected" {
            continue;
        }

        // close-continuation: `pid <... sym resumed> ... = rv`
        if tokens.len() >= 4 && tokens[1] == "<..." && tokens[3] == "resumed>" {
            let symbol = tokens[2];
            let key = (pid, symbol.to_string());
            if !scratch.remove(&key) {
                warn!(
                    line_no,
                    pid, symbol, "resumed call had no matching <unfinished ...> opening"
                );
            }
            trace.record(pid, symbol);
            continue;
        }

        let last = tokens[tokens.len() - 1];
        let second_last = tokens.get(tokens.len().wrapping_sub(2)).copied();
        let third_last = tokens.get(tokens.len().wrapping_sub(3)).copied();

        // open-continuation: `pid sym(args <unfinished ...>`
        if last == "...>" && second_last.is_some_and(|t| UNFINISHED_SPELLINGS.contains(&t)) {
            if let Some(symbol) = symbol_from_call_token(tokens[1]) {
                scratch.insert((pid, symbol.to_string()));
            } else {
                warn!(line_no, line, "could not extract symbol from unfinished call");
            }
            continue;
        }

        // no-return: `pid sym(args) <no return ...>`
        if last == "...>" && second_last == Some("return") && third_last == Some("<no") {
            if let Some(symbol) = symbol_from_call_token(tokens[1]) {
                trace.record(pid, symbol);
            } else {
                warn!(line_no, line, "could not extract symbol from no-return call");
            }
            continue;
        }

        // one-line complete: `pid sym(args) = rv`
        if let Some(symbol) = symbol_from_call_token(tokens[1]) {
            trace.record(pid, symbol);
        } else {
            warn!(line_no, line, "unrecognized ltrace record, skipping");
        }
    }

    Ok((trace, scratch))
}

fn symbol_from_call_token(token: &str) -> Option<&str> {
    token.find('(').map(|idx| &token[..idx])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_line_complete_is_recorded() {
        let trace = parse_ltrace("1234 printf(...) = 0\n").unwrap();
        assert_eq!(trace.symbols, HashSet::from(["printf".to_string()]));
        assert!(trace.events_by_pid[&1234].contains(&CallEvent::new(1234, "printf")));
    }

    #[test]
    fn unfinished_resumed_pairing_leaves_empty_residual() {
        let input = "12 read(...) <unfinished ...>\n12 <... read resumed> ... = 42\n";
        let (trace, residual) = parse_ltrace_with_residual(input).unwrap();
        assert_eq!(trace.symbols, HashSet::from(["read".to_string()]));
        assert!(residual.is_empty());
    }

    #[test]
    fn misspelled_unfinished_is_tolerated() {
        let input = "12 read(...) <unfinised ...>\n12 <... read resumed> ... = 42\n";
        let (trace, residual) = parse_ltrace_with_residual(input).unwrap();
        assert_eq!(trace.symbols, HashSet::from(["read".to_string()]));
        assert!(residual.is_empty());
    }

    #[test]
    fn unmatched_resumed_still_emits_and_warns() {
        let input = "12 <... read resumed> ... = 42\n";
        let (trace, residual) = parse_ltrace_with_residual(input).unwrap();
        assert_eq!(trace.symbols, HashSet::from(["read".to_string()]));
        assert!(residual.is_empty());
    }

    #[test]
    fn residual_unfinished_at_end_of_stream_is_nonempty() {
        let input = "12 read(...) <unfinished ...>\n";
        let (_trace, residual) = parse_ltrace_with_residual(input).unwrap();
        assert_eq!(residual.len(), 1);
    }

    #[test]
    fn no_return_call_is_recorded() {
        let input = "7 longjmp(...) <no return ...>\n";
        let trace = parse_ltrace(input).unwrap();
        assert!(trace.symbols.contains("longjmp"));
    }

    #[test]
    fn exit_signal_and_unexpected_records_are_discarded() {
        let input = "1 +++ exited (status 0) +++\n2 --- SIGCHLD ---\n3 unexpected breakpoint at foo\n";
        let trace = parse_ltrace(input).unwrap();
        assert!(trace.symbols.is_empty());
    }

    #[test]
    fn flat_symbol_set_equals_union_over_pids() {
        let input = "1 foo(...) = 0\n2 bar(...) = 0\n1 baz(...) = 0\n";
        let trace = parse_ltrace(input).unwrap();
        let union: HashSet<String> = trace
            .events_by_pid
            .values()
            .flat_map(|evs| evs.iter().map(|e| e.symbol.clone()))
            .collect();
        assert_eq!(union, trace.symbols);
    }

    #[test]
    fn invalid_pid_is_fatal() {
        assert!(parse_ltrace("nope printf(...) = 0\n").is_err());
    }
}
