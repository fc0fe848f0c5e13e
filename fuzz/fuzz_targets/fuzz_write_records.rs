#![no_main]
use libfuzzer_sys::fuzz_target;

/// Fuzz the record writing entry point.
///
/// Any input that parses as JSON is dispatched to whichever writer its
/// markers select. Writers must return an error, never panic.
fuzz_target!(|data: &[u8]| {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) {
        let _ = sbom_graph::write_records(&value);
    }
});
