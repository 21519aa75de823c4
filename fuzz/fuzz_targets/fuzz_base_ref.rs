#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(reference) = std::str::from_utf8(data) {
        // Fuzz base reference parsing - this should never panic
        let _ = stratum::BaseRef::parse(reference);
    }
});
