#![no_main]
use kerndiff::analyzer::{build_graph, parse_report};
use libfuzzer_sys::fuzz_target;

const MAX_WRAPPED_INPUT_LEN: usize = 10_000;

/// Fuzz the analyzer report parser.
///
/// Wraps input in a minimal record envelope as well, to reach record
/// field parsing rather than failing at the document level, and runs
/// the accepted records through graph construction.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Try raw input first
        if let Ok(records) = parse_report(s) {
            let _ = build_graph(&records).normalize();
        }

        // Also try as the body of one comparison record
        if s.len() < MAX_WRAPPED_INPUT_LEN {
            let wrapped = format!(
                "- first:\n    function: {s}\n  second:\n    function: f\n  result: equal\n"
            );
            if let Ok(records) = parse_report(&wrapped) {
                let _ = build_graph(&records).normalize();
            }
        }
    }
});
