//! Mock collaborators for session and capture tests.
//!
//! - `MockTransport`: records connects, realtime input and tool responses,
//!   can fail or delay connects and emit transport events on demand
//! - `MockMicrophone`: permission gate, scripted frames
//! - `MockDisplay`: permission gate, settable frame, out-of-band end

// Allow dead code in test infrastructure - not every test binary uses every helper
#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{Notify, mpsc};
use tokio_util::sync::CancellationToken;

use waav_live_console::core::capture::{
    CaptureError, CaptureResult, DisplaySource, DisplayStream, FrameGrabber, MediaTrack,
    MicrophoneSource, MicrophoneStream, VideoFrame,
};
use waav_live_console::core::realtime::{
    BaseLiveTransport, ConnectionState, ConnectionStateCallback, GroundingCallback,
    GroundingChunk, LiveClientToolResponse, LiveError, LiveErrorCallback, LiveResult,
    LiveServerToolCall, LiveSessionConfig, RealtimeInputChunk, ToolCallCallback,
    TranscriptCallback, TranscriptEvent, TurnCompleteCallback,
};

/// Poll `condition` every few milliseconds until it holds or two seconds pass.
pub async fn wait_until<F>(mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}

/// Like [`wait_until`] for async conditions.
pub async fn wait_until_async<F, Fut>(mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while tokio::time::Instant::now() < deadline {
        if condition().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition().await
}

// =============================================================================
// Tracks
// =============================================================================

#[derive(Default)]
pub struct MockTrack {
    stopped: AtomicBool,
    stop_calls: AtomicUsize,
}

impl MockTrack {
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    pub fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }
}

impl MediaTrack for MockTrack {
    fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn is_live(&self) -> bool {
        !self.is_stopped()
    }
}

/// Permission prompt the test resolves by hand.
#[derive(Default)]
struct PermissionGate {
    gated: AtomicBool,
    notify: Notify,
}

impl PermissionGate {
    async fn pass(&self) {
        if self.gated.load(Ordering::SeqCst) {
            self.notify.notified().await;
        }
    }
}

// =============================================================================
// Transport
// =============================================================================

#[derive(Default)]
struct TransportShared {
    state: ConnectionState,
    configs: Vec<LiveSessionConfig>,
    disconnects: usize,
    realtime_inputs: Vec<RealtimeInputChunk>,
    /// Connect count at the time each realtime input arrived
    input_sessions: Vec<usize>,
    send_delay: Option<Duration>,
    tool_responses: Vec<LiveClientToolResponse>,
    fail_next_connect: Option<LiveError>,
    connect_delay: Option<Duration>,
    on_state: Option<ConnectionStateCallback>,
    on_transcript: Option<TranscriptCallback>,
    on_tool_call: Option<ToolCallCallback>,
    on_turn_complete: Option<TurnCompleteCallback>,
    on_grounding: Option<GroundingCallback>,
    on_error: Option<LiveErrorCallback>,
}

pub struct MockTransport {
    shared: Arc<Mutex<TransportShared>>,
}

/// Test-side view of a [`MockTransport`].
#[derive(Clone)]
pub struct TransportControl {
    shared: Arc<Mutex<TransportShared>>,
}

impl MockTransport {
    pub fn new() -> (Box<Self>, TransportControl) {
        let shared = Arc::new(Mutex::new(TransportShared::default()));
        (
            Box::new(Self {
                shared: shared.clone(),
            }),
            TransportControl { shared },
        )
    }

    async fn notify_state(&self, state: ConnectionState) {
        let callback = self.shared.lock().on_state.clone();
        if let Some(callback) = callback {
            callback(state).await;
        }
    }
}

#[async_trait]
impl BaseLiveTransport for MockTransport {
    async fn connect(&mut self, config: LiveSessionConfig) -> LiveResult<()> {
        let delay = {
            let mut shared = self.shared.lock();
            shared.configs.push(config);
            shared.state = ConnectionState::Connecting;
            shared.connect_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failure = self.shared.lock().fail_next_connect.take();
        if let Some(error) = failure {
            self.shared.lock().state = ConnectionState::Failed;
            self.notify_state(ConnectionState::Failed).await;
            return Err(error);
        }

        self.shared.lock().state = ConnectionState::Connected;
        self.notify_state(ConnectionState::Connected).await;
        Ok(())
    }

    async fn disconnect(&mut self) -> LiveResult<()> {
        {
            let mut shared = self.shared.lock();
            shared.state = ConnectionState::Disconnected;
            shared.disconnects += 1;
        }
        self.notify_state(ConnectionState::Disconnected).await;
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.shared.lock().state == ConnectionState::Connected
    }

    fn get_connection_state(&self) -> ConnectionState {
        self.shared.lock().state
    }

    async fn send_realtime_input(&mut self, chunks: Vec<RealtimeInputChunk>) -> LiveResult<()> {
        let delay = {
            let shared = self.shared.lock();
            if shared.state != ConnectionState::Connected {
                return Err(LiveError::NotConnected);
            }
            shared.send_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut shared = self.shared.lock();
        if shared.state != ConnectionState::Connected {
            return Err(LiveError::NotConnected);
        }
        let session = shared.configs.len();
        shared
            .input_sessions
            .extend(std::iter::repeat_n(session, chunks.len()));
        shared.realtime_inputs.extend(chunks);
        Ok(())
    }

    async fn send_tool_response(&mut self, response: LiveClientToolResponse) -> LiveResult<()> {
        let mut shared = self.shared.lock();
        if shared.state != ConnectionState::Connected {
            return Err(LiveError::NotConnected);
        }
        shared.tool_responses.push(response);
        Ok(())
    }

    fn on_connection_state(&mut self, callback: ConnectionStateCallback) -> LiveResult<()> {
        self.shared.lock().on_state = Some(callback);
        Ok(())
    }

    fn on_transcript(&mut self, callback: TranscriptCallback) -> LiveResult<()> {
        self.shared.lock().on_transcript = Some(callback);
        Ok(())
    }

    fn on_tool_call(&mut self, callback: ToolCallCallback) -> LiveResult<()> {
        self.shared.lock().on_tool_call = Some(callback);
        Ok(())
    }

    fn on_turn_complete(&mut self, callback: TurnCompleteCallback) -> LiveResult<()> {
        self.shared.lock().on_turn_complete = Some(callback);
        Ok(())
    }

    fn on_grounding(&mut self, callback: GroundingCallback) -> LiveResult<()> {
        self.shared.lock().on_grounding = Some(callback);
        Ok(())
    }

    fn on_error(&mut self, callback: LiveErrorCallback) -> LiveResult<()> {
        self.shared.lock().on_error = Some(callback);
        Ok(())
    }

    fn get_provider_info(&self) -> serde_json::Value {
        serde_json::json!({"provider": "mock"})
    }
}

impl TransportControl {
    pub fn connect_count(&self) -> usize {
        self.shared.lock().configs.len()
    }

    pub fn last_config(&self) -> Option<LiveSessionConfig> {
        self.shared.lock().configs.last().cloned()
    }

    pub fn disconnect_count(&self) -> usize {
        self.shared.lock().disconnects
    }

    pub fn realtime_inputs(&self) -> Vec<RealtimeInputChunk> {
        self.shared.lock().realtime_inputs.clone()
    }

    /// Which connect (1-based) each realtime input was delivered under.
    pub fn realtime_input_sessions(&self) -> Vec<usize> {
        self.shared.lock().input_sessions.clone()
    }

    pub fn tool_responses(&self) -> Vec<LiveClientToolResponse> {
        self.shared.lock().tool_responses.clone()
    }

    pub fn fail_next_connect(&self, error: LiveError) {
        self.shared.lock().fail_next_connect = Some(error);
    }

    pub fn set_connect_delay(&self, delay: Duration) {
        self.shared.lock().connect_delay = Some(delay);
    }

    pub fn set_send_delay(&self, delay: Duration) {
        self.shared.lock().send_delay = Some(delay);
    }

    /// Simulate the endpoint closing the session.
    pub async fn drop_connection(&self) {
        let callback = {
            let mut shared = self.shared.lock();
            shared.state = ConnectionState::Disconnected;
            shared.on_state.clone()
        };
        if let Some(callback) = callback {
            callback(ConnectionState::Disconnected).await;
        }
    }

    /// Report `state` without changing readiness.
    pub async fn emit_state(&self, state: ConnectionState) {
        let callback = self.shared.lock().on_state.clone();
        if let Some(callback) = callback {
            callback(state).await;
        }
    }

    /// Report an error without closing the session.
    pub async fn emit_error(&self, error: LiveError) {
        let callback = self.shared.lock().on_error.clone();
        if let Some(callback) = callback {
            callback(error).await;
        }
    }

    pub async fn emit_tool_call(&self, call: LiveServerToolCall) {
        let callback = self.shared.lock().on_tool_call.clone();
        if let Some(callback) = callback {
            callback(call).await;
        }
    }

    pub async fn emit_transcript(&self, event: TranscriptEvent) {
        let callback = self.shared.lock().on_transcript.clone();
        if let Some(callback) = callback {
            callback(event).await;
        }
    }

    pub async fn emit_turn_complete(&self) {
        let callback = self.shared.lock().on_turn_complete.clone();
        if let Some(callback) = callback {
            callback().await;
        }
    }

    pub async fn emit_grounding(&self, chunks: Vec<GroundingChunk>) {
        let callback = self.shared.lock().on_grounding.clone();
        if let Some(callback) = callback {
            callback(chunks).await;
        }
    }
}

// =============================================================================
// Microphone
// =============================================================================

#[derive(Default)]
struct MicrophoneShared {
    deny: Option<CaptureError>,
    acquires: usize,
    tracks: Vec<Arc<MockTrack>>,
    frames: Option<mpsc::Sender<Vec<f32>>>,
}

#[derive(Clone)]
pub struct MockMicrophone {
    sample_rate: u32,
    gate: Arc<PermissionGate>,
    shared: Arc<Mutex<MicrophoneShared>>,
}

impl MockMicrophone {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            gate: Arc::new(PermissionGate::default()),
            shared: Arc::new(Mutex::new(MicrophoneShared::default())),
        }
    }

    /// Hold every permission request until [`grant`](Self::grant).
    pub fn gated(self) -> Self {
        self.gate.gated.store(true, Ordering::SeqCst);
        self
    }

    /// Resolve one pending permission request.
    pub fn grant(&self) {
        self.gate.notify.notify_one();
    }

    pub fn deny_with(&self, error: Option<CaptureError>) {
        self.shared.lock().deny = error;
    }

    pub fn acquire_count(&self) -> usize {
        self.shared.lock().acquires
    }

    pub fn tracks(&self) -> Vec<Arc<MockTrack>> {
        self.shared.lock().tracks.clone()
    }

    /// Feed a buffer into the most recently acquired stream.
    pub async fn push(&self, samples: Vec<f32>) -> bool {
        let sender = self.shared.lock().frames.clone();
        match sender {
            Some(sender) => sender.send(samples).await.is_ok(),
            None => false,
        }
    }

    /// Close the most recent stream as if the device went away.
    pub fn unplug(&self) {
        self.shared.lock().frames.take();
    }
}

#[async_trait]
impl MicrophoneSource for MockMicrophone {
    async fn acquire(&self) -> CaptureResult<MicrophoneStream> {
        self.shared.lock().acquires += 1;
        self.gate.pass().await;

        let mut shared = self.shared.lock();
        if let Some(error) = shared.deny.clone() {
            return Err(error);
        }

        let (tx, rx) = mpsc::channel(64);
        let track = Arc::new(MockTrack::default());
        shared.frames = Some(tx);
        shared.tracks.push(track.clone());

        Ok(MicrophoneStream {
            sample_rate: self.sample_rate,
            frames: rx,
            track,
        })
    }
}

// =============================================================================
// Display
// =============================================================================

#[derive(Default)]
pub struct MockFrameGrabber {
    frame: Mutex<Option<VideoFrame>>,
    grabs: AtomicUsize,
}

impl MockFrameGrabber {
    pub fn set_frame(&self, frame: Option<VideoFrame>) {
        *self.frame.lock() = frame;
    }

    pub fn grabs(&self) -> usize {
        self.grabs.load(Ordering::SeqCst)
    }
}

impl FrameGrabber for MockFrameGrabber {
    fn current_frame(&self) -> Option<VideoFrame> {
        self.grabs.fetch_add(1, Ordering::SeqCst);
        self.frame.lock().clone()
    }
}

#[derive(Default)]
struct DisplayShared {
    deny: Option<CaptureError>,
    requests: usize,
    tracks: Vec<Arc<MockTrack>>,
    ended: Vec<CancellationToken>,
}

#[derive(Clone)]
pub struct MockDisplay {
    grabber: Arc<MockFrameGrabber>,
    gate: Arc<PermissionGate>,
    shared: Arc<Mutex<DisplayShared>>,
}

impl MockDisplay {
    /// Display showing a solid `width` x `height` frame.
    pub fn new(width: u32, height: u32) -> Self {
        let grabber = Arc::new(MockFrameGrabber::default());
        grabber.set_frame(Some(VideoFrame::solid(width, height, [30, 144, 255, 255])));
        Self {
            grabber,
            gate: Arc::new(PermissionGate::default()),
            shared: Arc::new(Mutex::new(DisplayShared::default())),
        }
    }

    pub fn gated(self) -> Self {
        self.gate.gated.store(true, Ordering::SeqCst);
        self
    }

    pub fn grant(&self) {
        self.gate.notify.notify_one();
    }

    pub fn deny_with(&self, error: Option<CaptureError>) {
        self.shared.lock().deny = error;
    }

    pub fn grabber(&self) -> Arc<MockFrameGrabber> {
        self.grabber.clone()
    }

    pub fn request_count(&self) -> usize {
        self.shared.lock().requests
    }

    pub fn tracks(&self) -> Vec<Arc<MockTrack>> {
        self.shared.lock().tracks.clone()
    }

    /// End the most recent capture from the platform side.
    pub fn end_capture(&self) {
        if let Some(token) = self.shared.lock().ended.last() {
            token.cancel();
        }
    }
}

#[async_trait]
impl DisplaySource for MockDisplay {
    async fn request_display(&self) -> CaptureResult<DisplayStream> {
        self.shared.lock().requests += 1;
        self.gate.pass().await;

        let mut shared = self.shared.lock();
        if let Some(error) = shared.deny.clone() {
            return Err(error);
        }

        let track = Arc::new(MockTrack::default());
        let ended = CancellationToken::new();
        shared.tracks.push(track.clone());
        shared.ended.push(ended.clone());

        Ok(DisplayStream {
            track,
            frames: self.grabber.clone(),
            ended,
        })
    }
}
