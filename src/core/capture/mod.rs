//! Media capture pipelines.
//!
//! Two independent pipelines turn device media into realtime input chunks:
//!
//! - [`AudioCapturePipeline`]: microphone -> 16kHz PCM16 -> base64
//! - [`ScreenCapturePipeline`]: display frames sampled on a timer -> JPEG -> base64
//!
//! Neither pipeline does transport I/O. Each emits into its own [`SinkSlot`],
//! which holds at most one sink at a time.
//!
//! # Cancellation
//!
//! Every activation owns a `CancellationToken`. Stopping cancels the token
//! under the same lock that guards delivery, so once `stop()` returns no
//! further chunk from that activation reaches the sink. A permission grant
//! that resolves after `stop()` is released and discarded.

mod audio;
mod encode;
mod screen;

pub use audio::{AudioCapturePipeline, MicrophoneSource, MicrophoneStream};
pub use encode::{
    TARGET_SAMPLE_RATE, encode_audio_chunk, encode_jpeg_chunk, f32_to_pcm16_le, resample_linear,
};
pub use screen::{
    DisplaySource, DisplayStream, FrameGrabber, MIN_FRAME_INTERVAL, ScreenCaptureOptions,
    ScreenCapturePipeline, ScreenEndedCallback,
};

use parking_lot::Mutex;
use std::sync::Arc;
use thiserror::Error;

use crate::core::realtime::RealtimeInputChunk;

// =============================================================================
// Errors
// =============================================================================

/// Capture failures. None of these end the session.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CaptureError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Capture device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Encoding failed: {0}")]
    EncodingFailed(String),
}

pub type CaptureResult<T> = Result<T, CaptureError>;

// =============================================================================
// Devices
// =============================================================================

/// A live device track (microphone or display).
pub trait MediaTrack: Send + Sync {
    /// Release the device. Safe to call more than once.
    fn stop(&self);

    /// Whether the track is still producing media.
    fn is_live(&self) -> bool;
}

/// One RGBA video frame at its native size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA, `width * height * 4` bytes
    pub rgba: Vec<u8>,
}

impl VideoFrame {
    /// Frame filled with a single colour.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = width as usize * height as usize;
        Self {
            width,
            height,
            rgba: rgba.repeat(pixels),
        }
    }
}

// =============================================================================
// Sink
// =============================================================================

/// Receiver of encoded chunks.
pub type ChunkSink = Arc<dyn Fn(RealtimeInputChunk) + Send + Sync>;

/// Holds at most one sink.
///
/// Setting a sink replaces the previous one atomically, so each chunk is
/// delivered to exactly one sink.
#[derive(Default)]
pub struct SinkSlot {
    sink: Mutex<Option<ChunkSink>>,
}

impl SinkSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, sink: ChunkSink) {
        *self.sink.lock() = Some(sink);
    }

    pub fn clear(&self) {
        self.sink.lock().take();
    }

    pub fn is_set(&self) -> bool {
        self.sink.lock().is_some()
    }

    /// Hand `chunk` to the current sink. Returns false if none is set.
    pub fn deliver(&self, chunk: RealtimeInputChunk) -> bool {
        let sink = self.sink.lock().clone();
        match sink {
            Some(sink) => {
                sink(chunk);
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for SinkSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SinkSlot").field("set", &self.is_set()).finish()
    }
}
