#![no_main]
use libfuzzer_sys::fuzz_target;
use sbom_graph::{CycloneDxWriter, SbomWriter};
use serde_json::Value;

const MAX_WRAPPED_INPUT_LEN: usize = 10_000;

/// Fuzz the CycloneDX writer directly.
///
/// Also wraps the input in a CycloneDX envelope as the `components` list so
/// the component, license and reference paths get reached.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(value) = serde_json::from_str::<Value>(s) {
            let _ = CycloneDxWriter::new(&value).write_document();
        }

        if s.len() < MAX_WRAPPED_INPUT_LEN {
            let wrapped = format!(
                r#"{{"bomFormat":"CycloneDX","specVersion":"1.5","components":[{s}]}}"#,
            );
            if let Ok(value) = serde_json::from_str::<Value>(&wrapped) {
                let _ = CycloneDxWriter::new(&value).write_document();
            }
        }
    }
});
