//! Segment writer: JPEG frames in, one playable MP4 file out

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use muxide::api::{Metadata, Muxer, MuxerBuilder, VideoCodec};
use openh264::encoder::{Encoder, FrameType};
use openh264::formats::YUVBuffer;

use super::config::SegmentStats;
use crate::errors::RecorderError;

/// Writes one video segment: decodes JPEG frames, encodes them to H.264, and
/// muxes them into an MP4 container.
///
/// The container file is created eagerly so an unwritable output directory
/// fails at segment open, but the encoder and muxer are initialized lazily on
/// the first frame, when the stream's true dimensions become known. The
/// writer is consumed by [`SegmentWriter::finish`]; a finalized segment is an
/// independently playable file.
pub struct SegmentWriter {
    path: PathBuf,
    fps: f64,
    // Holds the file until the first frame fixes the dimensions.
    pending: Option<BufWriter<File>>,
    encoder: Option<Encoder>,
    muxer: Option<Muxer<BufWriter<File>>>,
    width: u32,
    height: u32,
    frames_written: u64,
    frames_skipped: u64,
}

impl SegmentWriter {
    /// Create the container file at `path` for an `fps` frames-per-second
    /// segment. Fails with [`RecorderError::EncoderOpen`] if the file cannot
    /// be created.
    pub fn create<P: AsRef<Path>>(path: P, fps: f64) -> Result<Self, RecorderError> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|e| {
            RecorderError::EncoderOpen(format!(
                "Failed to create segment file {}: {}",
                path.display(),
                e
            ))
        })?;

        Ok(Self {
            path,
            fps,
            pending: Some(BufWriter::new(file)),
            encoder: None,
            muxer: None,
            width: 0,
            height: 0,
            frames_written: 0,
            frames_skipped: 0,
        })
    }

    /// Decode `bytes` as a JPEG and append it as the segment's next frame.
    ///
    /// Undecodable bytes and frames whose dimensions differ from the first
    /// frame's fail with [`RecorderError::FrameDecode`]; the frame is counted
    /// as skipped and the writer stays usable. Encoder or container write
    /// failures are fatal.
    pub fn write_jpeg(&mut self, bytes: &[u8]) -> Result<(), RecorderError> {
        match self.encode_jpeg(bytes) {
            Ok(()) => Ok(()),
            Err(e) => {
                if !e.is_fatal() {
                    self.frames_skipped += 1;
                }
                Err(e)
            }
        }
    }

    fn encode_jpeg(&mut self, bytes: &[u8]) -> Result<(), RecorderError> {
        let image = image::load_from_memory(bytes)
            .map_err(|e| RecorderError::FrameDecode(format!("Invalid frame: {}", e)))?;
        let rgb = image.to_rgb8();
        let (full_width, full_height) = rgb.dimensions();

        // 4:2:0 subsampling needs even planes; shave an odd edge row/column.
        let (width, height) = (full_width & !1, full_height & !1);
        if width == 0 || height == 0 {
            return Err(RecorderError::FrameDecode(format!(
                "Frame too small to encode: {}x{}",
                full_width, full_height
            )));
        }

        if self.muxer.is_none() {
            self.init_container(width, height)?;
        } else if width != self.width || height != self.height {
            return Err(RecorderError::FrameDecode(format!(
                "Frame dimensions {}x{} don't match segment {}x{}",
                width, height, self.width, self.height
            )));
        }

        let yuv = rgb_to_yuv420(rgb.as_raw(), full_width as usize, width, height);
        let yuv_buffer = YUVBuffer::from_vec(yuv, width as usize, height as usize);

        let encoder = self.encoder.as_mut().ok_or_else(|| {
            RecorderError::EncoderFinalize("Encoder missing after container init".to_string())
        })?;
        let bitstream = encoder
            .encode(&yuv_buffer)
            .map_err(|e| RecorderError::EncoderFinalize(format!("Encoding failed: {}", e)))?;

        let is_keyframe = matches!(bitstream.frame_type(), FrameType::IDR | FrameType::I);
        let data = bitstream.to_vec();
        if data.is_empty() {
            // The encoder may emit nothing for a frame; the segment stays valid.
            return Ok(());
        }

        let pts = self.frames_written as f64 / self.fps;
        let muxer = self.muxer.as_mut().ok_or_else(|| {
            RecorderError::EncoderFinalize("Muxer missing after container init".to_string())
        })?;
        muxer
            .write_video(pts, &data, is_keyframe)
            .map_err(|e| RecorderError::EncoderFinalize(format!("Failed to write frame: {}", e)))?;

        self.frames_written += 1;
        Ok(())
    }

    fn init_container(&mut self, width: u32, height: u32) -> Result<(), RecorderError> {
        let writer = self.pending.take().ok_or_else(|| {
            RecorderError::EncoderOpen("Segment file already consumed".to_string())
        })?;

        let encoder = Encoder::new()
            .map_err(|e| RecorderError::EncoderOpen(format!("Failed to create encoder: {}", e)))?;

        let muxer = MuxerBuilder::new(writer)
            .video(VideoCodec::H264, width, height, self.fps)
            .with_fast_start(true)
            .with_metadata(Metadata::new().with_current_time())
            .build()
            .map_err(|e| RecorderError::EncoderOpen(format!("Failed to create muxer: {}", e)))?;

        self.encoder = Some(encoder);
        self.muxer = Some(muxer);
        self.width = width;
        self.height = height;
        log::debug!(
            "Segment {} container initialized at {}x{}",
            self.path.display(),
            width,
            height
        );
        Ok(())
    }

    /// Finalize the container so the file is complete and playable. The
    /// writer cannot be used afterwards. A segment that never received a
    /// frame is deleted rather than left as a zero-length file.
    pub fn finish(self) -> Result<SegmentStats, RecorderError> {
        match self.muxer {
            Some(muxer) => {
                let muxer_stats = muxer.finish_with_stats().map_err(|e| {
                    RecorderError::EncoderFinalize(format!("Failed to finalize segment: {}", e))
                })?;

                Ok(SegmentStats {
                    frames_written: muxer_stats.video_frames,
                    frames_skipped: self.frames_skipped,
                    bytes_written: muxer_stats.bytes_written,
                    duration_secs: muxer_stats.duration_secs,
                    output_path: self.path,
                })
            }
            None => {
                // No frame ever arrived; drop the empty file.
                drop(self.pending);
                if let Err(e) = std::fs::remove_file(&self.path) {
                    log::warn!(
                        "Could not remove empty segment {}: {}",
                        self.path.display(),
                        e
                    );
                }
                Ok(SegmentStats {
                    frames_written: 0,
                    frames_skipped: self.frames_skipped,
                    bytes_written: 0,
                    duration_secs: 0.0,
                    output_path: self.path,
                })
            }
        }
    }

    /// Path of the segment file being written.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Frames encoded so far.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Frames rejected as undecodable so far.
    pub fn frames_skipped(&self) -> u64 {
        self.frames_skipped
    }
}

/// Convert RGB24 to YUV420 planar, reading `width`x`height` pixels from a
/// buffer whose rows are `stride_px` pixels wide (BT.601).
fn rgb_to_yuv420(rgb: &[u8], stride_px: usize, width: u32, height: u32) -> Vec<u8> {
    let w = width as usize;
    let h = height as usize;

    let y_size = w * h;
    let uv_size = (w / 2) * (h / 2);
    let mut yuv = vec![0u8; y_size + uv_size * 2];

    let (y_plane, uv_planes) = yuv.split_at_mut(y_size);
    let (u_plane, v_plane) = uv_planes.split_at_mut(uv_size);

    for y in 0..h {
        for x in 0..w {
            let rgb_idx = (y * stride_px + x) * 3;
            let r = rgb[rgb_idx] as i32;
            let g = rgb[rgb_idx + 1] as i32;
            let b = rgb[rgb_idx + 2] as i32;

            let y_val = ((66 * r + 129 * g + 25 * b + 128) >> 8) + 16;
            y_plane[y * w + x] = y_val.clamp(0, 255) as u8;

            if y % 2 == 0 && x % 2 == 0 {
                let uv_idx = (y / 2) * (w / 2) + (x / 2);
                let u_val = ((-38 * r - 74 * g + 112 * b + 128) >> 8) + 128;
                let v_val = ((112 * r - 94 * g - 18 * b + 128) >> 8) + 128;
                u_plane[uv_idx] = u_val.clamp(0, 255) as u8;
                v_plane[uv_idx] = v_val.clamp(0, 255) as u8;
            }
        }
    }

    yuv
}
