#![no_main]
use libfuzzer_sys::fuzz_target;
use sdp_decode::{parse_with, ParseLimits, ParseMode, ParserConfig};
use sdp_observe::NoopParseObserver;
use std::sync::Arc;

fuzz_target!(|data: &[u8]| {
    if data.len() > 8192 {
        return;
    }

    // Try to convert to UTF-8 string
    if let Ok(s) = std::str::from_utf8(data) {
        let config = ParserConfig::default()
            .with_limits(ParseLimits::hardened())
            .with_observer(Arc::new(NoopParseObserver));
        // Decoding should never panic, whatever the mode
        let _ = parse_with(s, &config.clone().with_mode(ParseMode::Strict));
        let _ = parse_with(s, &config.with_mode(ParseMode::Relaxed));
    }
});
