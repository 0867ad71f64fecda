//! Property-based tests for the frame detector
//!
//! Verifies the demuxing invariants with proptest-generated streams: every
//! complete frame comes out byte-identical and in order, and nothing outside
//! SOI..EOI ever leaks into a frame.

use proptest::prelude::*;
use std::io::Cursor;

use camrec::testing::synthetic_mjpeg_stream;
use camrec::FrameDetector;

/// Frame bodies and inter-frame garbage avoid 0xFF entirely, so the only
/// markers in a generated stream are the ones placed deliberately.
fn markerless_bytes(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(0u8..=0xFE, 0..max_len)
}

fn jpeg_frame() -> impl Strategy<Value = Vec<u8>> {
    markerless_bytes(64).prop_map(|body| {
        let mut frame = vec![0xFF, 0xD8];
        frame.extend_from_slice(&body);
        frame.extend_from_slice(&[0xFF, 0xD9]);
        frame
    })
}

fn collect_frames(stream: Vec<u8>) -> Vec<Vec<u8>> {
    FrameDetector::new(Cursor::new(stream))
        .map(|f| f.expect("cursor reads cannot fail"))
        .collect()
}

proptest! {
    /// INVARIANT: N concatenated well-formed frames are emitted exactly N
    /// times, byte-identical and in order.
    #[test]
    fn concatenated_frames_round_trip(frames in prop::collection::vec(jpeg_frame(), 0..10)) {
        let stream: Vec<u8> = frames.iter().flatten().copied().collect();
        let emitted = collect_frames(stream);
        prop_assert_eq!(emitted, frames);
    }

    /// INVARIANT: garbage before the first SOI never appears in any frame.
    #[test]
    fn leading_garbage_is_discarded(
        garbage in markerless_bytes(32),
        frames in prop::collection::vec(jpeg_frame(), 1..6),
    ) {
        let mut stream = garbage;
        for frame in &frames {
            stream.extend_from_slice(frame);
        }
        let emitted = collect_frames(stream);
        prop_assert_eq!(emitted, frames);
    }

    /// INVARIANT: a trailing frame with its EOI cut off yields no emission.
    #[test]
    fn truncated_trailing_frame_is_dropped(
        frames in prop::collection::vec(jpeg_frame(), 1..6),
        cut in 1usize..=2,
    ) {
        let mut stream: Vec<u8> = frames.iter().flatten().copied().collect();
        stream.truncate(stream.len() - cut);
        let emitted = collect_frames(stream);
        prop_assert_eq!(emitted.len(), frames.len() - 1);
        prop_assert_eq!(&emitted[..], &frames[..frames.len() - 1]);
    }

    /// INVARIANT: a stream with no markers emits nothing.
    #[test]
    fn markerless_stream_emits_nothing(garbage in markerless_bytes(256)) {
        prop_assert!(collect_frames(garbage).is_empty());
    }

    /// INVARIANT: real JPEG output survives demuxing byte-identically; the
    /// encoder's 0xFF escaping guarantees no false boundaries.
    #[test]
    fn synthetic_jpeg_streams_round_trip(count in 1u64..5) {
        let stream = synthetic_mjpeg_stream(count, 48, 32);
        let emitted = collect_frames(stream.clone());
        prop_assert_eq!(emitted.len() as u64, count);
        let rejoined: Vec<u8> = emitted.into_iter().flatten().collect();
        prop_assert_eq!(rejoined, stream);
    }
}
