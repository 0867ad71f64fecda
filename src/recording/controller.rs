//! Segmentation controller: owns the recording loop and session lifecycle

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use chrono::Local;

use super::config::{RecorderConfig, SegmentStats, FRAME_RATE};
use super::segment::SegmentWriter;
use crate::detector::FrameDetector;
use crate::errors::RecorderError;
use crate::stream::CameraStream;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Recording,
    Stopping,
    Stopped,
}

/// A recording session running on a dedicated background thread.
///
/// `start` launches the thread and returns immediately; `stop` (or a
/// [`StopHandle`]) only raises a flag, taking effect at the next loop
/// iteration boundary; `wait` joins the thread and surfaces the session's
/// terminal result. A stopped session cannot be restarted.
pub struct RecordingSession {
    stop_flag: Arc<AtomicBool>,
    state: Arc<Mutex<SessionState>>,
    thread: Option<JoinHandle<Result<(), RecorderError>>>,
}

/// Cheap clonable handle for requesting a stop from another thread, e.g. a
/// signal handler.
#[derive(Clone)]
pub struct StopHandle {
    stop_flag: Arc<AtomicBool>,
    state: Arc<Mutex<SessionState>>,
}

impl StopHandle {
    pub fn stop(&self) {
        request_stop(&self.stop_flag, &self.state);
    }
}

impl RecordingSession {
    /// Spawn the recording loop. The thread opens the camera stream, creates
    /// the output directory if absent, and opens segment #1; failures of any
    /// of those surface through [`RecordingSession::wait`].
    pub fn start(config: RecorderConfig) -> Result<Self, RecorderError> {
        let stop_flag = Arc::new(AtomicBool::new(false));
        let state = Arc::new(Mutex::new(SessionState::Recording));

        let thread_flag = Arc::clone(&stop_flag);
        let thread_state = Arc::clone(&state);
        let thread = std::thread::Builder::new()
            .name("camrec-recording".to_string())
            .spawn(move || {
                let result = record_loop(&config, &thread_flag);
                *thread_state.lock().expect("lock poisoned") = SessionState::Stopped;
                result
            })
            .map_err(|e| {
                RecorderError::Connection(format!("Failed to spawn recording thread: {}", e))
            })?;

        Ok(Self {
            stop_flag,
            state,
            thread: Some(thread),
        })
    }

    /// Request shutdown. Non-blocking; the in-flight frame read and encode
    /// complete before the loop exits and finalizes the open segment.
    pub fn stop(&self) {
        request_stop(&self.stop_flag, &self.state);
    }

    /// Handle for stopping the session from another thread.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            stop_flag: Arc::clone(&self.stop_flag),
            state: Arc::clone(&self.state),
        }
    }

    pub fn state(&self) -> SessionState {
        *self.state.lock().expect("lock poisoned")
    }

    /// Block until the recording loop exits and return its terminal result.
    pub fn wait(mut self) -> Result<(), RecorderError> {
        match self.thread.take() {
            Some(handle) => handle.join().unwrap_or_else(|_| {
                Err(RecorderError::Connection(
                    "Recording thread panicked".to_string(),
                ))
            }),
            None => Ok(()),
        }
    }
}

impl Drop for RecordingSession {
    fn drop(&mut self) {
        // An abandoned session must not record forever.
        if self.thread.is_some() {
            self.stop_flag.store(true, Ordering::Relaxed);
        }
    }
}

fn request_stop(stop_flag: &AtomicBool, state: &Mutex<SessionState>) {
    let mut state = state.lock().expect("lock poisoned");
    if *state == SessionState::Recording {
        *state = SessionState::Stopping;
    }
    stop_flag.store(true, Ordering::Relaxed);
}

/// Seam between the loop and segment storage, so the loop is testable
/// without a disk encoder.
pub(crate) trait SegmentOutput {
    type Sink: SegmentSink;
    fn open_segment(&mut self) -> Result<Self::Sink, RecorderError>;
}

pub(crate) trait SegmentSink: Sized {
    fn write_jpeg(&mut self, bytes: &[u8]) -> Result<(), RecorderError>;
    fn finish(self) -> Result<SegmentStats, RecorderError>;
}

impl SegmentSink for SegmentWriter {
    fn write_jpeg(&mut self, bytes: &[u8]) -> Result<(), RecorderError> {
        SegmentWriter::write_jpeg(self, bytes)
    }

    fn finish(self) -> Result<SegmentStats, RecorderError> {
        SegmentWriter::finish(self)
    }
}

/// Opens timestamped segment files in the output directory.
pub(crate) struct DirectoryOutput {
    dir: PathBuf,
    fps: f64,
}

impl DirectoryOutput {
    pub(crate) fn new(dir: PathBuf, fps: f64) -> Self {
        Self { dir, fps }
    }
}

impl SegmentOutput for DirectoryOutput {
    type Sink = SegmentWriter;

    fn open_segment(&mut self) -> Result<SegmentWriter, RecorderError> {
        let path = segment_path(&self.dir);
        log::info!("Opening segment {}", path.display());
        SegmentWriter::create(path, self.fps)
    }
}

/// Timestamped, filesystem-safe segment path. Same-second collisions get a
/// numeric suffix instead of overwriting the earlier segment.
fn segment_path(dir: &Path) -> PathBuf {
    let stamp = Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();
    unique_path(dir, &stamp)
}

fn unique_path(dir: &Path, stamp: &str) -> PathBuf {
    let mut path = dir.join(format!("{}.mp4", stamp));
    let mut counter = 1u32;
    while path.exists() {
        path = dir.join(format!("{}-{}.mp4", stamp, counter));
        counter += 1;
    }
    path
}

fn record_loop(config: &RecorderConfig, stop_flag: &AtomicBool) -> Result<(), RecorderError> {
    let stream = CameraStream::open(&config.host, &config.user, &config.password)?;

    std::fs::create_dir_all(&config.output_dir).map_err(|e| {
        RecorderError::EncoderOpen(format!(
            "Failed to create output directory {}: {}",
            config.output_dir.display(),
            e
        ))
    })?;

    let detector = FrameDetector::new(stream);
    let mut output = DirectoryOutput::new(config.output_dir.clone(), FRAME_RATE);
    run_loop(detector, &mut output, config.segment_duration, stop_flag)
}

/// The steady-state loop: frame in, frame encoded, rotation check.
///
/// The rotation check runs when a frame arrives, before that frame is
/// encoded, so a segment never covers more than its budget plus the time to
/// detect one frame boundary; the late frame opens the next segment. Every
/// exit path finalizes the open segment so previously written files are
/// always playable.
pub(crate) fn run_loop<R: Read, O: SegmentOutput>(
    mut frames: FrameDetector<R>,
    output: &mut O,
    segment_duration: Duration,
    stop_flag: &AtomicBool,
) -> Result<(), RecorderError> {
    let mut segment = output.open_segment()?;
    let mut started = Instant::now();

    loop {
        if stop_flag.load(Ordering::Relaxed) {
            log::info!("Stop requested, finalizing current segment");
            finalize(segment)?;
            return Ok(());
        }

        let frame = match frames.next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                log::info!("Camera stream ended after {} frames", frames.frames_emitted());
                finalize(segment)?;
                return Ok(());
            }
            Err(e) => {
                finalize_best_effort(segment);
                return Err(e);
            }
        };

        if started.elapsed() >= segment_duration {
            finalize(segment)?;
            segment = output.open_segment()?;
            started = Instant::now();
        }

        match segment.write_jpeg(&frame) {
            Ok(()) => {}
            Err(e) if !e.is_fatal() => {
                log::warn!("Dropping frame ({} bytes): {}", frame.len(), e);
            }
            Err(e) => {
                finalize_best_effort(segment);
                return Err(e);
            }
        }
    }
}

fn finalize<S: SegmentSink>(segment: S) -> Result<SegmentStats, RecorderError> {
    let stats = segment.finish()?;
    if stats.is_empty() {
        log::info!("Discarded empty segment {}", stats.output_path.display());
    } else {
        log::info!(
            "Saved segment {} ({} frames, {} skipped, {} bytes, {:.1}s)",
            stats.output_path.display(),
            stats.frames_written,
            stats.frames_skipped,
            stats.bytes_written,
            stats.duration_secs
        );
    }
    Ok(stats)
}

fn finalize_best_effort<S: SegmentSink>(segment: S) {
    if let Err(e) = finalize(segment) {
        log::error!("Could not finalize segment during abort: {}", e);
    }
}
