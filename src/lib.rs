//! camrec: MJPEG network camera recorder with time-based segmentation
//!
//! Pulls a Motion-JPEG stream from a camera's HTTP endpoint, reassembles the
//! individual JPEG frames from the raw byte stream, and re-encodes them into
//! time-bounded MP4 segment files. Segments rotate on a wall-clock budget and
//! every finalized file is independently playable.
//!
//! # Usage
//! ```rust,ignore
//! use camrec::{RecorderConfig, RecordingSession};
//! use std::time::Duration;
//!
//! let config = RecorderConfig::new("192.168.1.10:8080", "admin", "secret")
//!     .with_segment_duration(Duration::from_secs(15 * 60));
//!
//! let session = RecordingSession::start(config)?;
//! // ... later, from any thread:
//! session.stop();
//! session.wait()?;
//! ```

pub mod detector;
pub mod errors;
pub mod recording;
pub mod stream;

// Testing utilities - synthetic MJPEG data for offline testing
pub mod testing;

// Re-exports for convenience
pub use detector::FrameDetector;
pub use errors::RecorderError;
pub use recording::{RecorderConfig, RecordingSession, SegmentStats, SessionState};
pub use stream::CameraStream;

/// Initialize logging for the recorder
pub fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "camrec=info");
    }
    let _ = env_logger::try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
