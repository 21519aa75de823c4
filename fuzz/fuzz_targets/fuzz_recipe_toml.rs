#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        // Fuzz recipe parsing - this should never panic
        let _ = stratum::recipe::parse_with_warnings(content, std::path::Path::new("stratum.toml"));
    }
});
