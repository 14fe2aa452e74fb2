//! Screen capture.
//!
//! While sharing, a sampler task ticks every `frame_interval` (500ms by
//! default), grabs the current frame at its native size, encodes it as JPEG
//! off the async runtime and emits it. Every exit path (local stop, session
//! teardown, the platform ending the capture) goes through one idempotent
//! teardown that cancels the sampler.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::encode::encode_jpeg_chunk;
use super::{CaptureResult, ChunkSink, MediaTrack, SinkSlot, VideoFrame};
use crate::core::realtime::RealtimeInputChunk;

/// Source of the frame currently shown on a display track.
pub trait FrameGrabber: Send + Sync {
    /// Latest frame, or `None` if nothing is available yet.
    fn current_frame(&self) -> Option<VideoFrame>;
}

/// A granted screen or window capture.
pub struct DisplayStream {
    pub track: Arc<dyn MediaTrack>,
    pub frames: Arc<dyn FrameGrabber>,
    /// Cancelled by the platform when the user ends the capture out of band
    pub ended: CancellationToken,
}

/// Platform screen capture access.
#[async_trait]
pub trait DisplaySource: Send + Sync {
    /// Ask the user to pick a screen or window.
    async fn request_display(&self) -> CaptureResult<DisplayStream>;
}

/// Shortest sampling period the sampler will run at.
pub const MIN_FRAME_INTERVAL: Duration = Duration::from_millis(1);

/// Called after the platform ended a capture and the pipeline tore it down.
pub type ScreenEndedCallback = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenCaptureOptions {
    /// Sampling period
    pub frame_interval: Duration,
    /// JPEG quality, 1..=100
    pub jpeg_quality: u8,
}

impl Default for ScreenCaptureOptions {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(500),
            jpeg_quality: 60,
        }
    }
}

impl ScreenCaptureOptions {
    /// Clamp the interval to [`MIN_FRAME_INTERVAL`] and the quality to 1..=100.
    pub fn normalized(self) -> Self {
        Self {
            frame_interval: self.frame_interval.max(MIN_FRAME_INTERVAL),
            jpeg_quality: self.jpeg_quality.clamp(1, 100),
        }
    }
}

enum ScreenState {
    Inactive,
    Starting(CancellationToken),
    Active {
        token: CancellationToken,
        track: Arc<dyn MediaTrack>,
        frames: Arc<dyn FrameGrabber>,
    },
}

struct ScreenInner {
    state: ScreenState,
}

impl ScreenInner {
    fn teardown(&mut self) -> bool {
        match std::mem::replace(&mut self.state, ScreenState::Inactive) {
            ScreenState::Inactive => false,
            ScreenState::Starting(token) => {
                token.cancel();
                true
            }
            ScreenState::Active { token, track, .. } => {
                token.cancel();
                track.stop();
                true
            }
        }
    }
}

/// Screen frames to realtime input pipeline.
#[derive(Clone)]
pub struct ScreenCapturePipeline {
    source: Arc<dyn DisplaySource>,
    options: ScreenCaptureOptions,
    sink: Arc<SinkSlot>,
    on_ended: Arc<Mutex<Option<ScreenEndedCallback>>>,
    inner: Arc<Mutex<ScreenInner>>,
}

impl ScreenCapturePipeline {
    pub fn new(source: Arc<dyn DisplaySource>, options: ScreenCaptureOptions) -> Self {
        let normalized = options.normalized();
        if normalized != options {
            warn!(?options, ?normalized, "Screen capture options out of range, clamped");
        }
        Self {
            source,
            options: normalized,
            sink: Arc::new(SinkSlot::new()),
            on_ended: Arc::new(Mutex::new(None)),
            inner: Arc::new(Mutex::new(ScreenInner {
                state: ScreenState::Inactive,
            })),
        }
    }

    pub fn options(&self) -> ScreenCaptureOptions {
        self.options
    }

    pub fn set_sink(&self, sink: ChunkSink) {
        self.sink.set(sink);
    }

    pub fn clear_sink(&self) {
        self.sink.clear();
    }

    /// Register the callback for captures ended by the platform.
    pub fn on_ended(&self, callback: ScreenEndedCallback) {
        *self.on_ended.lock() = Some(callback);
    }

    /// Whether a capture is held.
    pub fn is_sharing(&self) -> bool {
        matches!(self.inner.lock().state, ScreenState::Active { .. })
    }

    /// Whether a request is pending or a capture is held.
    pub fn is_engaged(&self) -> bool {
        !matches!(self.inner.lock().state, ScreenState::Inactive)
    }

    /// Frame source of the held capture, for local preview.
    pub fn preview(&self) -> Option<Arc<dyn FrameGrabber>> {
        match &self.inner.lock().state {
            ScreenState::Active { frames, .. } => Some(frames.clone()),
            _ => None,
        }
    }

    /// Request a capture and start sampling.
    ///
    /// Engages the pipeline immediately. Resolves to `Ok(false)` if already
    /// engaged or if the request resolved after
    /// [`stop_sharing`](Self::stop_sharing).
    pub fn start_sharing(&self) -> impl Future<Output = CaptureResult<bool>> + Send + 'static {
        let reserved = {
            let mut inner = self.inner.lock();
            if matches!(inner.state, ScreenState::Inactive) {
                let token = CancellationToken::new();
                inner.state = ScreenState::Starting(token.clone());
                Some(token)
            } else {
                debug!("Screen capture already started");
                None
            }
        };

        let pipeline = self.clone();
        async move {
            match reserved {
                Some(token) => pipeline.request(token).await,
                None => Ok(false),
            }
        }
    }

    async fn request(&self, token: CancellationToken) -> CaptureResult<bool> {
        let requested = self.source.request_display().await;

        let mut inner = self.inner.lock();
        if token.is_cancelled() {
            if let Ok(stream) = requested {
                stream.track.stop();
            }
            debug!("Discarding display grant that resolved after stop");
            return Ok(false);
        }

        let stream = match requested {
            Ok(stream) => stream,
            Err(e) => {
                inner.state = ScreenState::Inactive;
                warn!("Screen capture unavailable: {}", e);
                return Err(e);
            }
        };

        inner.state = ScreenState::Active {
            token: token.clone(),
            track: stream.track.clone(),
            frames: stream.frames.clone(),
        };
        drop(inner);

        let sampler = Sampler {
            token,
            ended: stream.ended,
            track: stream.track,
            frames: stream.frames,
            options: self.options,
            inner: self.inner.clone(),
            sink: self.sink.clone(),
            on_ended: self.on_ended.clone(),
        };
        tokio::spawn(sampler.run());
        info!(
            interval_ms = self.options.frame_interval.as_millis() as u64,
            "Screen capture started"
        );
        Ok(true)
    }

    /// Stop all tracks and cancel sampling. No-op when inactive.
    pub fn stop_sharing(&self) {
        if self.inner.lock().teardown() {
            info!("Screen capture stopped");
        }
    }
}

struct Sampler {
    token: CancellationToken,
    ended: CancellationToken,
    track: Arc<dyn MediaTrack>,
    frames: Arc<dyn FrameGrabber>,
    options: ScreenCaptureOptions,
    inner: Arc<Mutex<ScreenInner>>,
    sink: Arc<SinkSlot>,
    on_ended: Arc<Mutex<Option<ScreenEndedCallback>>>,
}

impl Sampler {
    async fn run(self) {
        let mut ticker = tokio::time::interval(self.options.frame_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // first tick completes immediately; the first frame is due one period in
        ticker.tick().await;

        loop {
            tokio::select! {
                biased;
                _ = self.token.cancelled() => break,
                _ = self.ended.cancelled() => {
                    self.end_from_platform();
                    break;
                }
                _ = ticker.tick() => {
                    if !self.sample().await {
                        break;
                    }
                }
            }
        }
        debug!("Screen sampler exited");
    }

    /// Capture and emit one frame. Returns false once the activation is gone.
    async fn sample(&self) -> bool {
        if !self.track.is_live() {
            return !self.token.is_cancelled();
        }
        let Some(frame) = self.frames.current_frame() else {
            return true;
        };
        if frame.width == 0 || frame.height == 0 {
            return true;
        }

        let quality = self.options.jpeg_quality;
        let encoded = tokio::task::spawn_blocking(move || encode_jpeg_chunk(&frame, quality)).await;
        let chunk = match encoded {
            Ok(Ok(chunk)) => chunk,
            Ok(Err(e)) => {
                warn!("Dropping screen frame: {}", e);
                return true;
            }
            Err(e) => {
                warn!("Frame encoder task failed: {}", e);
                return true;
            }
        };

        self.deliver_if_current(chunk)
    }

    fn deliver_if_current(&self, chunk: RealtimeInputChunk) -> bool {
        let _guard = self.inner.lock();
        if self.token.is_cancelled() {
            debug!("Dropping frame encoded after stop");
            return false;
        }
        self.sink.deliver(chunk);
        true
    }

    fn end_from_platform(&self) {
        let torn_down = {
            let mut inner = self.inner.lock();
            !self.token.is_cancelled() && inner.teardown()
        };
        if torn_down {
            info!("Screen capture ended by the platform");
            let callback = self.on_ended.lock().clone();
            if let Some(callback) = callback {
                callback();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::capture::CaptureError;

    struct NoDisplay;

    #[async_trait]
    impl DisplaySource for NoDisplay {
        async fn request_display(&self) -> CaptureResult<DisplayStream> {
            Err(CaptureError::DeviceUnavailable("no display".to_string()))
        }
    }

    #[test]
    fn test_normalized_clamps_out_of_range_options() {
        let options = ScreenCaptureOptions {
            frame_interval: Duration::ZERO,
            jpeg_quality: 0,
        }
        .normalized();
        assert_eq!(options.frame_interval, MIN_FRAME_INTERVAL);
        assert_eq!(options.jpeg_quality, 1);

        let options = ScreenCaptureOptions {
            frame_interval: Duration::from_millis(250),
            jpeg_quality: 200,
        }
        .normalized();
        assert_eq!(options.frame_interval, Duration::from_millis(250));
        assert_eq!(options.jpeg_quality, 100);

        assert_eq!(
            ScreenCaptureOptions::default().normalized(),
            ScreenCaptureOptions::default()
        );
    }

    #[test]
    fn test_pipeline_stores_normalized_options() {
        let pipeline = ScreenCapturePipeline::new(
            Arc::new(NoDisplay),
            ScreenCaptureOptions {
                frame_interval: Duration::ZERO,
                jpeg_quality: 60,
            },
        );
        assert_eq!(pipeline.options().frame_interval, MIN_FRAME_INTERVAL);
    }
}
