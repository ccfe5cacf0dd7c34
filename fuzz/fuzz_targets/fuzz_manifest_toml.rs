#![no_main]

use std::path::Path;

use libfuzzer_sys::fuzz_target;
use microzoo::infrastructure::manifest::parse_descriptor;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        let _ = parse_descriptor(Path::new("manifest.toml"), "service", "fuzz", content);
    }
});
