//! Recording configuration and per-segment statistics

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Output container frame rate. The camera delivers frames at whatever pace
/// it likes; the container is stamped at a fixed rate.
pub const FRAME_RATE: f64 = 15.0;

/// Default cap on a single segment's wall-clock coverage.
pub const DEFAULT_SEGMENT_DURATION: Duration = Duration::from_secs(15 * 60);

/// Configuration for a recording session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecorderConfig {
    /// Camera host, e.g. `192.168.1.10:8080`
    pub host: String,
    /// Camera account name
    pub user: String,
    /// Camera account password
    pub password: String,
    /// Directory segments are written to, created if absent
    pub output_dir: PathBuf,
    /// Maximum wall-clock duration covered by one segment file
    pub segment_duration: Duration,
}

impl RecorderConfig {
    pub fn new(
        host: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            user: user.into(),
            password: password.into(),
            output_dir: PathBuf::from("./videos"),
            segment_duration: DEFAULT_SEGMENT_DURATION,
        }
    }

    /// Set the segment output directory
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set the maximum segment duration
    pub fn with_segment_duration(mut self, duration: Duration) -> Self {
        self.segment_duration = duration;
        self
    }
}

/// Statistics returned when a segment is finalized
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentStats {
    /// Frames encoded into the container
    pub frames_written: u64,
    /// Frames rejected as undecodable and skipped
    pub frames_skipped: u64,
    /// Total bytes written to the file
    pub bytes_written: u64,
    /// Container duration in seconds (frames / fps)
    pub duration_secs: f64,
    /// Final path of the segment file
    pub output_path: PathBuf,
}

impl SegmentStats {
    /// True if the segment was finalized without a single encoded frame.
    pub fn is_empty(&self) -> bool {
        self.frames_written == 0
    }
}
