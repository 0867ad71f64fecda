//! JPEG frame boundary detection over an unbounded byte stream
//!
//! MJPEG carries no length prefix or delimiter between images; the only
//! structure is the JPEG Start-of-Image / End-of-Image markers themselves.
//! The detector scans the stream with a two-byte sliding window and
//! accumulates everything between a SOI and its matching EOI into one frame.

use std::io::{ErrorKind, Read};

use crate::errors::RecorderError;

/// JPEG Start-of-Image marker.
pub const SOI: [u8; 2] = [0xFF, 0xD8];
/// JPEG End-of-Image marker.
pub const EOI: [u8; 2] = [0xFF, 0xD9];

/// Splits a continuous byte source into complete JPEG frames.
///
/// Frames are yielded lazily, each a contiguous byte sequence starting with
/// SOI and ending with EOI. Bytes before the first SOI are discarded. A frame
/// begun but never terminated (a new SOI arrives first, or the stream ends)
/// is silently dropped.
pub struct FrameDetector<R: Read> {
    source: R,
    last: u8,
    in_frame: bool,
    buffer: Vec<u8>,
    frames_emitted: u64,
}

impl<R: Read> FrameDetector<R> {
    pub fn new(source: R) -> Self {
        Self {
            source,
            last: 0,
            in_frame: false,
            buffer: Vec::new(),
            frames_emitted: 0,
        }
    }

    /// Blocks until the next complete frame arrives, the stream ends, or a
    /// read fails.
    ///
    /// `Ok(None)` means the source reached end-of-stream; any bytes of a
    /// partially accumulated frame are dropped. A read error is terminal for
    /// this source and surfaces as [`RecorderError::Connection`].
    pub fn next_frame(&mut self) -> Result<Option<Vec<u8>>, RecorderError> {
        loop {
            let current = match self.read_byte()? {
                Some(b) => b,
                None => {
                    if self.in_frame {
                        log::debug!(
                            "Stream ended mid-frame, dropping {} partial bytes",
                            self.buffer.len()
                        );
                        self.in_frame = false;
                        self.buffer.clear();
                    }
                    return Ok(None);
                }
            };

            let window = [self.last, current];
            self.last = current;

            if window == SOI {
                if self.in_frame {
                    log::debug!(
                        "New SOI before EOI, dropping {} unterminated bytes",
                        self.buffer.len()
                    );
                }
                self.buffer.clear();
                self.buffer.push(SOI[0]);
                self.in_frame = true;
            }

            if !self.in_frame {
                continue;
            }

            self.buffer.push(current);

            if window == EOI {
                self.in_frame = false;
                self.frames_emitted += 1;
                return Ok(Some(std::mem::take(&mut self.buffer)));
            }
        }
    }

    /// Total complete frames emitted by this detector.
    pub fn frames_emitted(&self) -> u64 {
        self.frames_emitted
    }

    fn read_byte(&mut self) -> Result<Option<u8>, RecorderError> {
        let mut byte = [0u8; 1];
        loop {
            match self.source.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(RecorderError::Connection(format!(
                        "Failed to read from stream: {}",
                        e
                    )))
                }
            }
        }
    }
}

impl<R: Read> Iterator for FrameDetector<R> {
    type Item = Result<Vec<u8>, RecorderError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_frame().transpose()
    }
}
