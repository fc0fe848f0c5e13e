#![no_main]
use libfuzzer_sys::fuzz_target;

/// Fuzz the format detection logic.
fuzz_target!(|data: &[u8]| {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) {
        let _ = sbom_graph::detect_format(&value);
    }
});
