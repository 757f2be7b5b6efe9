#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Some(event) = dify_sse::parse_frame(data) {
        assert!(!event.is_empty());
    }
});
