use std::fmt;

#[derive(Debug)]
pub enum RecorderError {
    /// The camera stream could not be opened or read. Fatal.
    Connection(String),
    /// A segment container could not be created. Fatal.
    EncoderOpen(String),
    /// A segment container could not be written or finalized. Fatal.
    EncoderFinalize(String),
    /// A reassembled frame was not a decodable image. The frame is dropped
    /// and recording continues.
    FrameDecode(String),
}

impl RecorderError {
    /// Everything except a bad frame terminates the session.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, RecorderError::FrameDecode(_))
    }
}

impl fmt::Display for RecorderError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RecorderError::Connection(msg) => write!(f, "Connection error: {}", msg),
            RecorderError::EncoderOpen(msg) => write!(f, "Encoder open error: {}", msg),
            RecorderError::EncoderFinalize(msg) => write!(f, "Encoder finalize error: {}", msg),
            RecorderError::FrameDecode(msg) => write!(f, "Frame decode error: {}", msg),
        }
    }
}

impl std::error::Error for RecorderError {}
