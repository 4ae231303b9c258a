//! Fuzzing target for the system-call and library-call trace parsers.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = goscan_trace::parse_strace(s);
        let _ = goscan_trace::parse_ltrace(s);
    }
});
