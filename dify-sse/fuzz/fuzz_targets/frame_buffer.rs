#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // First byte picks the append size so chunk boundaries vary.
    let Some((&step, rest)) = data.split_first() else {
        return;
    };
    let step = usize::from(step).max(1);

    let mut buffer = dify_sse::FrameBuffer::new();
    let mut framed = 0;
    for chunk in rest.chunks(step) {
        buffer.append(chunk);
        while let Some(frame) = buffer.try_extract_frame() {
            framed += frame.len();
        }
    }
    if let Some(frame) = buffer.drain() {
        framed += frame.len();
    }
    assert!(framed <= rest.len());
    assert!(buffer.is_empty());
});
