//! Synthetic MJPEG data for offline testing
//!
//! Real JPEG frames generated in memory, so detector and segment tests run
//! without a camera or a network.

mod synthetic;

pub use synthetic::{synthetic_jpeg, synthetic_mjpeg_stream};
