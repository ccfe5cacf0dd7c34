#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(source) = std::str::from_utf8(data) {
        // Parsing and diagram validation must never panic
        if let Ok(raw) = microzoo::parse("fuzz", source) {
            let _ = microzoo::domain::services::diagram_validator::validate(&raw);
        }
    }
});
