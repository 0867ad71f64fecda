//! Synthetic JPEG frames with per-frame varying content

use image::codecs::jpeg::JpegEncoder;
use image::{ImageBuffer, Rgb};

/// Encode one real JPEG in memory: a gradient that shifts with
/// `frame_number`, so consecutive frames differ.
pub fn synthetic_jpeg(frame_number: u64, width: u32, height: u32) -> Vec<u8> {
    let base = (frame_number % 256) as u8;
    let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([
            base.wrapping_add((x % 256) as u8),
            base.wrapping_add((y % 256) as u8),
            base.wrapping_add(((x + y) % 256) as u8),
        ])
    });

    let mut bytes = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut bytes, 85);
    encoder
        .encode_image(&img)
        .expect("in-memory JPEG encoding cannot fail");
    bytes
}

/// Concatenate `count` synthetic frames with no delimiters, the way an MJPEG
/// camera body interleaves them.
pub fn synthetic_mjpeg_stream(count: u64, width: u32, height: u32) -> Vec<u8> {
    let mut stream = Vec::new();
    for n in 0..count {
        stream.extend_from_slice(&synthetic_jpeg(n, width, height));
    }
    stream
}
