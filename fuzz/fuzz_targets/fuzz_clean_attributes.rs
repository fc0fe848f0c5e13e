#![no_main]
use libfuzzer_sys::fuzz_target;

/// Fuzz attribute cleanup, checking it is idempotent whenever it succeeds.
fuzz_target!(|data: &[u8]| {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_slice(data) {
        if let Ok(once) = sbom_graph::clean_attributes(&map, ".") {
            if let Ok(twice) = sbom_graph::clean_attributes(&once, ".") {
                assert_eq!(once, twice);
            }
        }
    }
});
