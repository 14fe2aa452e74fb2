//! Microphone capture.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::encode::encode_audio_chunk;
use super::{CaptureResult, ChunkSink, MediaTrack, SinkSlot};
use crate::core::realtime::RealtimeInputChunk;

/// An acquired microphone.
pub struct MicrophoneStream {
    /// Native sample rate of `frames`
    pub sample_rate: u32,
    /// Mono f32 buffers in capture order
    pub frames: mpsc::Receiver<Vec<f32>>,
    pub track: Arc<dyn MediaTrack>,
}

/// Platform microphone access.
#[async_trait]
pub trait MicrophoneSource: Send + Sync {
    /// Ask for microphone access. May wait on a user prompt.
    async fn acquire(&self) -> CaptureResult<MicrophoneStream>;
}

enum AudioState {
    Inactive,
    Starting(CancellationToken),
    Active {
        token: CancellationToken,
        track: Arc<dyn MediaTrack>,
    },
}

struct AudioInner {
    state: AudioState,
}

impl AudioInner {
    /// Drop the current activation. Returns false if already inactive.
    fn teardown(&mut self) -> bool {
        match std::mem::replace(&mut self.state, AudioState::Inactive) {
            AudioState::Inactive => false,
            AudioState::Starting(token) => {
                token.cancel();
                true
            }
            AudioState::Active { token, track } => {
                token.cancel();
                track.stop();
                true
            }
        }
    }
}

/// Deliver `chunk` unless `token`'s activation has been torn down.
fn deliver_if_current(
    inner: &Mutex<AudioInner>,
    token: &CancellationToken,
    sink: &SinkSlot,
    chunk: RealtimeInputChunk,
) -> bool {
    let _guard = inner.lock();
    if token.is_cancelled() {
        return false;
    }
    sink.deliver(chunk);
    true
}

/// Tear down after the device went away, unless a stop already did.
fn end_if_current(inner: &Mutex<AudioInner>, token: &CancellationToken) -> bool {
    let mut guard = inner.lock();
    // a live token means this activation is still the current one
    !token.is_cancelled() && guard.teardown()
}

/// Microphone to realtime input pipeline.
///
/// Cloning yields another handle to the same pipeline.
#[derive(Clone)]
pub struct AudioCapturePipeline {
    source: Arc<dyn MicrophoneSource>,
    sink: Arc<SinkSlot>,
    inner: Arc<Mutex<AudioInner>>,
}

impl AudioCapturePipeline {
    pub fn new(source: Arc<dyn MicrophoneSource>) -> Self {
        Self {
            source,
            sink: Arc::new(SinkSlot::new()),
            inner: Arc::new(Mutex::new(AudioInner {
                state: AudioState::Inactive,
            })),
        }
    }

    /// Register the chunk sink, replacing any previous one.
    pub fn set_sink(&self, sink: ChunkSink) {
        self.sink.set(sink);
    }

    pub fn clear_sink(&self) {
        self.sink.clear();
    }

    /// Whether the microphone is held and streaming.
    pub fn is_active(&self) -> bool {
        matches!(self.inner.lock().state, AudioState::Active { .. })
    }

    /// Whether a start is pending or the microphone is streaming.
    pub fn is_engaged(&self) -> bool {
        !matches!(self.inner.lock().state, AudioState::Inactive)
    }

    /// Acquire the microphone and begin emitting chunks.
    ///
    /// The pipeline is engaged as soon as this is called, so a `stop()` made
    /// before the returned future is polled still cancels the start.
    /// Resolves to `Ok(true)` once streaming, `Ok(false)` if already started
    /// or if the pipeline was stopped while the permission request was
    /// pending.
    pub fn start(&self) -> impl Future<Output = CaptureResult<bool>> + Send + 'static {
        let reserved = {
            let mut inner = self.inner.lock();
            if matches!(inner.state, AudioState::Inactive) {
                let token = CancellationToken::new();
                inner.state = AudioState::Starting(token.clone());
                Some(token)
            } else {
                debug!("Audio capture already started");
                None
            }
        };

        let pipeline = self.clone();
        async move {
            match reserved {
                Some(token) => pipeline.acquire(token).await,
                None => Ok(false),
            }
        }
    }

    async fn acquire(&self, token: CancellationToken) -> CaptureResult<bool> {
        let acquired = self.source.acquire().await;

        let mut inner = self.inner.lock();
        if token.is_cancelled() {
            if let Ok(stream) = acquired {
                stream.track.stop();
            }
            debug!("Discarding microphone grant that resolved after stop");
            return Ok(false);
        }

        let stream = match acquired {
            Ok(stream) => stream,
            Err(e) => {
                inner.state = AudioState::Inactive;
                warn!("Microphone unavailable: {}", e);
                return Err(e);
            }
        };

        let MicrophoneStream {
            sample_rate,
            frames,
            track,
        } = stream;
        inner.state = AudioState::Active {
            token: token.clone(),
            track,
        };
        drop(inner);

        tokio::spawn(run_audio(
            frames,
            sample_rate,
            token,
            self.inner.clone(),
            self.sink.clone(),
        ));
        info!(sample_rate, "Audio capture started");
        Ok(true)
    }

    /// Release the microphone. No-op when inactive.
    pub fn stop(&self) {
        if self.inner.lock().teardown() {
            info!("Audio capture stopped");
        }
    }
}

async fn run_audio(
    mut frames: mpsc::Receiver<Vec<f32>>,
    sample_rate: u32,
    token: CancellationToken,
    inner: Arc<Mutex<AudioInner>>,
    sink: Arc<SinkSlot>,
) {
    loop {
        let samples = tokio::select! {
            biased;
            _ = token.cancelled() => break,
            frame = frames.recv() => match frame {
                Some(samples) => samples,
                None => {
                    if end_if_current(&inner, &token) {
                        info!("Microphone stream ended");
                    }
                    break;
                }
            },
        };

        if samples.is_empty() {
            continue;
        }
        let chunk = encode_audio_chunk(&samples, sample_rate);
        if !deliver_if_current(&inner, &token, &sink, chunk) {
            break;
        }
    }
}
