//! Fuzzing target for the CVE corpus flat-text parser.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = goscan_vulndb::parse_cve_file(s);
    }
});
