use crate::{parse_pid, trace_lines, Result};
use std::collections::HashSet;
use tracing::warn;

/// Decode system-call-dialect tracer output (`openat`-only `strace`
/// records) into the set of absolute file paths observed.
///
/// See §4.1: a record is kept when its second token begins with `openat`;
/// the filename argument is the third token, dropped if it's an
/// unresolved `0x...` address, otherwise stripped of its surrounding
/// quote-and-comma. Process-exit (`+++`) and signal (`---`) records are
/// dropped.
pub fn parse_strace(input: &str) -> Result<HashSet<String>> {
    let mut paths = HashSet::new();

    for (line_no, line) in trace_lines(input) {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 2 {
            warn!(line_no, line, "strace line too short to parse, skipping");
            continue;
        }

        // pid token corruption is fatal for the whole stream.
        let _pid = parse_pid(tokens[0], line_no)?;

        if tokens[1].starts_with("+++") || tokens[1].starts_with("---") {
            continue;
        }

        if !tokens[1].starts_with("openat") {
            warn!(line_no, line, "unrecognized strace record, skipping");
            continue;
        }

        let Some(&filename_token) = tokens.get(2) else {
            warn!(line_no, line, "openat record missing filename argument");
            continue;
        };

        if filename_token.starts_with("0x") {
            // Unresolved address — no path to record.
            continue;
        }

        let path = filename_token
            .strip_prefix('"')
            .unwrap_or(filename_token);
        let path = path
            .strip_suffix("\",")
            .or_else(|| path.strip_suffix('"'))
            .unwrap_or(path);

        paths.insert(path.to_string());
    }

    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openat_path_is_extracted() {
        let input = "99 openat(AT_FDCWD, \"/usr/lib/x86_64-linux-gnu/libc.so.6\", O_RDONLY) = 3\n\
                     99 openat(AT_FDCWD, 0x7ff000000000, O_RDONLY) = -1\n";
        let paths = parse_strace(input).unwrap();
        assert_eq!(paths.len(), 1);
        assert!(paths.contains("/usr/lib/x86_64-linux-gnu/libc.so.6"));
    }

    #[test]
    fn signal_and_exit_records_are_dropped() {
        let input = "1 +++ exited with 0 +++\n2 --- SIGCHLD {si_signo=SIGCHLD} ---\n";
        let paths = parse_strace(input).unwrap();
        assert!(paths.is_empty());
    }

    #[test]
    fn invalid_pid_is_fatal() {
        let input = "notapid openat(AT_FDCWD, \"/x\", O_RDONLY) = 3\n";
        assert!(parse_strace(input).is_err());
    }

    #[test]
    fn tolerates_missing_trailing_newline_and_blank_trailer() {
        let with_trailer = "99 openat(AT_FDCWD, \"/a\", O_RDONLY) = 3\n";
        let without_trailer = "99 openat(AT_FDCWD, \"/a\", O_RDONLY) = 3";
        assert_eq!(
            parse_strace(with_trailer).unwrap(),
            parse_strace(without_trailer).unwrap()
        );
    }

    #[test]
    fn non_openat_calls_are_ignored() {
        let input = "1 read(3, \"...\", 128) = 42\n";
        let paths = parse_strace(input).unwrap();
        assert!(paths.is_empty());
    }
}
