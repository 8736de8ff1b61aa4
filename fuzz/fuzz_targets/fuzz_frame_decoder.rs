//! Fuzz target: `FrameDecoder::feed` + request decoding
//!
//! Drives arbitrary byte sequences through the streaming frame decoder and
//! decodes every frame it yields as a request.  Asserts that it never
//! panics, always makes progress, and never yields an empty or oversized
//! payload.
//!
//! cargo fuzz run fuzz_frame_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use sg90::ServoCommand;
use sg90::rpc::codec::{self, FrameDecoder, MAX_FRAME_SIZE};

fuzz_target!(|data: &[u8]| {
    let mut decoder = FrameDecoder::new();
    let mut rest = data;

    while !rest.is_empty() {
        let (used, frame) = decoder.feed(rest);
        assert!(used > 0, "decoder must consume input");
        if let Some(payload) = frame {
            assert!(!payload.is_empty(), "decoder must not yield empty payload");
            assert!(payload.len() <= MAX_FRAME_SIZE, "payload exceeds MAX_FRAME_SIZE");
            let _ = codec::decode_payload::<ServoCommand>(payload);
        }
        rest = &rest[used..];
    }

    // After a reset the decoder must accept bytes cleanly again.
    decoder.reset();
    let _ = decoder.feed(data);
});
