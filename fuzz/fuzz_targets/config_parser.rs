#![no_main]

use flopwatch::TimerConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Parsing must either fail cleanly or yield a valid config
        if let Ok(config) = TimerConfig::from_toml_str(input) {
            assert!(config.validate().is_ok());
        }
    }
});
