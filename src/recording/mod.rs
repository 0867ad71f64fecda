//! Recording: time-bounded MP4 segments from an MJPEG frame stream
//!
//! - `image` decodes each JPEG frame
//! - `openh264` encodes frames to H.264
//! - `muxide` muxes the result into MP4 containers
//!
//! # Example
//! ```rust,ignore
//! use camrec::recording::{RecorderConfig, RecordingSession};
//!
//! let config = RecorderConfig::new("192.168.1.10:8080", "admin", "secret");
//! let session = RecordingSession::start(config)?;
//!
//! // From a signal handler or another thread:
//! session.stop();
//!
//! session.wait()?;
//! ```

mod config;
mod controller;
mod segment;

pub use config::{RecorderConfig, SegmentStats, DEFAULT_SEGMENT_DURATION, FRAME_RATE};
pub use controller::{RecordingSession, SessionState, StopHandle};
pub use segment::SegmentWriter;
