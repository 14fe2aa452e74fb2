use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::responder::{AcknowledgeResponder, ToolResponder};
use super::{SessionError, SessionEvent, SessionState, SessionStatus};
use crate::core::capture::{
    AudioCapturePipeline, ChunkSink, DisplaySource, FrameGrabber, MicrophoneSource,
    ScreenCaptureOptions, ScreenCapturePipeline,
};
use crate::core::conversation::{NewTurn, Role, SharedConversationLog};
use crate::core::export::ExportSnapshot;
use crate::core::realtime::{
    BaseLiveTransport, BoxedLiveTransport, ConnectionState, ConnectionStateCallback,
    FunctionResponse, GroundingCallback, GroundingChunk, LiveClientToolResponse, LiveError,
    LiveErrorCallback, LiveResult, LiveServerToolCall, RealtimeInputChunk, ToolCallCallback,
    TranscriptCallback, TranscriptEvent, TranscriptSource, TurnCompleteCallback,
};
use crate::core::tools::FunctionResponseScheduling;
use crate::core::workspace::SharedWorkspace;

/// Controller construction options.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Credential passed to the transport at connect time
    pub api_key: Option<String>,
    pub screen: ScreenCaptureOptions,
}

/// Connect/disconnect state machine over a live transport and two capture
/// pipelines.
///
/// All methods take `&mut self`; run it on one task (see
/// [`SessionHandle`](super::SessionHandle)) so handlers never interleave.
pub struct SessionController {
    transport: Arc<Mutex<BoxedLiveTransport>>,
    workspace: SharedWorkspace,
    log: SharedConversationLog,
    audio: AudioCapturePipeline,
    screen: ScreenCapturePipeline,
    responder: Arc<dyn ToolResponder>,
    api_key: Option<String>,

    state: SessionState,
    muted: bool,
    microphone_unavailable: bool,
    screen_unavailable: bool,
    session_id: Option<String>,

    status_tx: watch::Sender<SessionStatus>,
    /// Bumped on every idle entry; chunks captured under an older value are dropped
    generation: Arc<AtomicU64>,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    events_rx: Option<mpsc::UnboundedReceiver<SessionEvent>>,
    forwarder: CancellationToken,
}

impl SessionController {
    /// Wire the transport callbacks and capture sinks. Must be called inside
    /// a Tokio runtime.
    pub fn new(
        mut transport: BoxedLiveTransport,
        workspace: SharedWorkspace,
        log: SharedConversationLog,
        microphone: Arc<dyn MicrophoneSource>,
        display: Arc<dyn DisplaySource>,
        options: SessionOptions,
    ) -> Result<Self, SessionError> {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        register_transport_callbacks(transport.as_mut(), &events_tx)?;
        let transport = Arc::new(Mutex::new(transport));

        let generation = Arc::new(AtomicU64::new(0));
        let (chunk_tx, chunk_rx) = mpsc::unbounded_channel::<TaggedChunk>();
        let sink_generation = generation.clone();
        let sink: ChunkSink = Arc::new(move |chunk: RealtimeInputChunk| {
            let _ = chunk_tx.send(TaggedChunk {
                generation: sink_generation.load(Ordering::SeqCst),
                chunk,
            });
        });

        let audio = AudioCapturePipeline::new(microphone);
        audio.set_sink(sink.clone());

        let screen = ScreenCapturePipeline::new(display, options.screen);
        screen.set_sink(sink);
        let ended_tx = events_tx.clone();
        screen.on_ended(Arc::new(move || {
            let _ = ended_tx.send(SessionEvent::ScreenEnded);
        }));

        let forwarder = CancellationToken::new();
        tokio::spawn(forward_chunks(
            chunk_rx,
            transport.clone(),
            generation.clone(),
            forwarder.clone(),
        ));

        let (status_tx, _) = watch::channel(SessionStatus::default());

        Ok(Self {
            transport,
            workspace,
            log,
            audio,
            screen,
            responder: Arc::new(AcknowledgeResponder),
            api_key: options.api_key,
            state: SessionState::Idle,
            muted: false,
            microphone_unavailable: false,
            screen_unavailable: false,
            session_id: None,
            status_tx,
            generation,
            events_tx,
            events_rx: Some(events_rx),
            forwarder,
        })
    }

    /// Replace the tool call responder.
    pub fn with_responder(mut self, responder: Arc<dyn ToolResponder>) -> Self {
        self.responder = responder;
        self
    }

    // -------------------------------------------------------------------------
    // Observers
    // -------------------------------------------------------------------------

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn status(&self) -> SessionStatus {
        self.status_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status_tx.subscribe()
    }

    pub fn workspace(&self) -> &SharedWorkspace {
        &self.workspace
    }

    pub fn log(&self) -> &SharedConversationLog {
        &self.log
    }

    /// Frame source of the shared screen, for local preview.
    pub fn screen_preview(&self) -> Option<Arc<dyn FrameGrabber>> {
        self.screen.preview()
    }

    fn publish(&self) {
        self.status_tx.send_replace(SessionStatus {
            state: self.state,
            muted: self.muted,
            capturing_audio: self.audio.is_active(),
            sharing: self.screen.is_sharing(),
            microphone_unavailable: self.microphone_unavailable,
            screen_unavailable: self.screen_unavailable,
            session_id: self.session_id.clone(),
        });
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Open a session from the current settings and enabled tools.
    ///
    /// Ignored unless idle. A failed connect returns to idle and reports the
    /// transport error.
    pub async fn connect(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Idle {
            debug!(state = %self.state, "Connect request ignored");
            return Ok(());
        }

        self.state = SessionState::Connecting;
        self.publish();

        let config = self.workspace.read().session_config(self.api_key.clone());
        info!(
            model = %config.model,
            tools = config.function_declarations.len(),
            "Connecting live session"
        );

        let result = self.transport.lock().await.connect(config).await;
        if let Err(e) = result {
            warn!("Live session connect failed: {}", e);
            self.enter_idle();
            return Err(e.into());
        }

        let session_id = Uuid::new_v4().to_string();
        info!(session_id = %session_id, "Live session connected");
        self.session_id = Some(session_id);
        self.state = SessionState::Connected;
        self.muted = false;
        self.start_microphone();
        self.publish();
        Ok(())
    }

    /// Close the session. Ignored unless connected.
    pub async fn disconnect(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Connected {
            debug!(state = %self.state, "Disconnect request ignored");
            return Ok(());
        }

        self.close_session().await.map_err(Into::into)
    }

    /// Connected -> Disconnecting -> Idle, releasing the transport client.
    async fn close_session(&mut self) -> LiveResult<()> {
        self.state = SessionState::Disconnecting;
        self.screen.stop_sharing();
        self.audio.stop();
        self.publish();

        let result = self.transport.lock().await.disconnect().await;
        if let Err(e) = &result {
            warn!("Live session disconnect reported an error: {}", e);
        }
        self.enter_idle();
        result
    }

    /// Unmute, stop both pipelines and go idle.
    fn enter_idle(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.muted = false;
        self.screen.stop_sharing();
        self.audio.stop();
        let previous = self.state;
        self.state = SessionState::Idle;
        if let Some(session_id) = self.session_id.take() {
            info!(session_id = %session_id, from = %previous, "Live session idle");
        }
        self.publish();
    }

    async fn handle_transport_drop(&mut self) {
        if self.state != SessionState::Connected {
            return;
        }
        if self.transport.lock().await.is_ready() {
            debug!("Ignoring drop notice, transport is still ready");
            return;
        }
        info!(session_id = ?self.session_id, "Transport closed the session");
        // disconnect errors are already logged
        let _ = self.close_session().await;
    }

    // -------------------------------------------------------------------------
    // Controls
    // -------------------------------------------------------------------------

    /// Microphone button: connect when idle, toggle mute when connected.
    pub async fn handle_mic_click(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Idle => self.connect().await,
            SessionState::Connected => self.set_muted(!self.muted),
            _ => {
                debug!(state = %self.state, "Mic action ignored");
                Ok(())
            }
        }
    }

    /// Mute or unmute. Muting stops the microphone; unmuting restarts it.
    pub fn set_muted(&mut self, muted: bool) -> Result<(), SessionError> {
        if self.state != SessionState::Connected {
            return Err(SessionError::NotConnected);
        }
        if self.muted == muted {
            return Ok(());
        }

        self.muted = muted;
        if muted {
            self.audio.stop();
        } else {
            self.start_microphone();
        }
        info!(muted, "Microphone mute changed");
        self.publish();
        Ok(())
    }

    /// Screen share button. Rejected while not connected.
    pub fn toggle_screen_share(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Connected {
            debug!(state = %self.state, "Screen share rejected, session not connected");
            return Err(SessionError::NotConnected);
        }

        if self.screen.is_engaged() {
            self.screen.stop_sharing();
        } else {
            let start = self.screen.start_sharing();
            let events = self.events_tx.clone();
            tokio::spawn(async move {
                let result = start.await;
                let _ = events.send(SessionEvent::ScreenStarted(result));
            });
        }
        self.publish();
        Ok(())
    }

    fn start_microphone(&self) {
        let start = self.audio.start();
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let result = start.await;
            let _ = events.send(SessionEvent::MicrophoneStarted(result));
        });
    }

    pub fn clear_turns(&mut self) {
        self.log.write().clear();
        info!("Conversation log cleared");
    }

    /// Write an export file into `dir`.
    pub fn export(&self, dir: &Path) -> Result<PathBuf, SessionError> {
        let snapshot = ExportSnapshot::capture(&self.workspace.read(), &self.log.read());
        Ok(snapshot.write_to_dir(dir)?)
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    /// Hand the event receiver to the task that will drive this controller.
    pub(crate) fn take_event_receiver(&mut self) -> Option<mpsc::UnboundedReceiver<SessionEvent>> {
        self.events_rx.take()
    }

    /// Handle every event already queued. Returns how many were handled.
    ///
    /// Does nothing once a [`SessionHandle`](super::SessionHandle) owns the
    /// receiver.
    pub async fn process_pending_events(&mut self) -> usize {
        let mut handled = 0;
        while let Some(event) = self.events_rx.as_mut().and_then(|rx| rx.try_recv().ok()) {
            self.handle_event(event).await;
            handled += 1;
        }
        handled
    }

    pub async fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::ConnectionState(state) => {
                debug!(state = %state, "Transport connection state");
                if state.is_down() {
                    self.handle_transport_drop().await;
                }
            }
            SessionEvent::Transcript(event) => {
                let role = match event.source {
                    TranscriptSource::Input => Role::User,
                    TranscriptSource::Output => Role::Agent,
                };
                self.log
                    .write()
                    .fold_transcript(role, &event.text, event.finished);
            }
            SessionEvent::ToolCall(call) => self.handle_tool_call(call).await,
            SessionEvent::TurnComplete => {
                self.log.write().finalize_last_turn();
            }
            SessionEvent::Grounding(chunks) => {
                self.log.write().attach_grounding(chunks);
            }
            SessionEvent::TransportError(e) => {
                warn!("Transport error: {}", e);
                self.handle_transport_drop().await;
            }
            SessionEvent::MicrophoneStarted(result) => {
                match result {
                    Ok(true) => self.microphone_unavailable = false,
                    Ok(false) => {}
                    Err(_) => self.microphone_unavailable = true,
                }
                self.publish();
            }
            SessionEvent::ScreenStarted(result) => {
                match result {
                    Ok(true) => self.screen_unavailable = false,
                    Ok(false) => {}
                    Err(_) => self.screen_unavailable = true,
                }
                self.publish();
            }
            SessionEvent::ScreenEnded => self.publish(),
        }
    }

    /// Log the call, answer every function in it, log the answer.
    async fn handle_tool_call(&mut self, call: LiveServerToolCall) {
        self.log
            .write()
            .add_turn(NewTurn::system("").with_tool_request(call.clone()));

        let mut responses = Vec::with_capacity(call.function_calls.len());
        for function_call in &call.function_calls {
            let response = self.responder.respond(function_call).await;
            let scheduling = self
                .workspace
                .read()
                .tools()
                .get(&function_call.name)
                .and_then(|tool| tool.scheduling)
                .unwrap_or(FunctionResponseScheduling::Interrupt);
            responses.push(FunctionResponse {
                id: function_call.id.clone(),
                name: function_call.name.clone(),
                response,
                scheduling: Some(scheduling),
            });
        }

        let tool_response = LiveClientToolResponse {
            function_responses: Some(responses),
        };
        info!(
            session_id = ?self.session_id,
            calls = call.function_calls.len(),
            "Answering tool call"
        );

        let sent = self
            .transport
            .lock()
            .await
            .send_tool_response(tool_response.clone())
            .await;
        if let Err(e) = sent {
            warn!("Failed to send tool response: {}", e);
        }

        self.log
            .write()
            .add_turn(NewTurn::system("").with_tool_response(tool_response));
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.screen.stop_sharing();
        self.audio.stop();
        self.forwarder.cancel();
    }
}

fn register_transport_callbacks(
    transport: &mut dyn BaseLiveTransport,
    events: &mpsc::UnboundedSender<SessionEvent>,
) -> LiveResult<()> {
    let tx = events.clone();
    let state_callback: ConnectionStateCallback = Arc::new(move |state: ConnectionState| {
        let _ = tx.send(SessionEvent::ConnectionState(state));
        Box::pin(async {}) as Pin<Box<dyn Future<Output = ()> + Send>>
    });
    transport.on_connection_state(state_callback)?;

    let tx = events.clone();
    let transcript_callback: TranscriptCallback = Arc::new(move |event: TranscriptEvent| {
        let _ = tx.send(SessionEvent::Transcript(event));
        Box::pin(async {}) as Pin<Box<dyn Future<Output = ()> + Send>>
    });
    transport.on_transcript(transcript_callback)?;

    let tx = events.clone();
    let tool_call_callback: ToolCallCallback = Arc::new(move |call: LiveServerToolCall| {
        let _ = tx.send(SessionEvent::ToolCall(call));
        Box::pin(async {}) as Pin<Box<dyn Future<Output = ()> + Send>>
    });
    transport.on_tool_call(tool_call_callback)?;

    let tx = events.clone();
    let turn_complete_callback: TurnCompleteCallback = Arc::new(move || {
        let _ = tx.send(SessionEvent::TurnComplete);
        Box::pin(async {}) as Pin<Box<dyn Future<Output = ()> + Send>>
    });
    transport.on_turn_complete(turn_complete_callback)?;

    let tx = events.clone();
    let grounding_callback: GroundingCallback = Arc::new(move |chunks: Vec<GroundingChunk>| {
        let _ = tx.send(SessionEvent::Grounding(chunks));
        Box::pin(async {}) as Pin<Box<dyn Future<Output = ()> + Send>>
    });
    transport.on_grounding(grounding_callback)?;

    let tx = events.clone();
    let error_callback: LiveErrorCallback = Arc::new(move |error: LiveError| {
        let _ = tx.send(SessionEvent::TransportError(error));
        Box::pin(async {}) as Pin<Box<dyn Future<Output = ()> + Send>>
    });
    transport.on_error(error_callback)?;

    Ok(())
}

/// A captured chunk and the session generation it was captured under.
struct TaggedChunk {
    generation: u64,
    chunk: RealtimeInputChunk,
}

/// Drain captured chunks into the transport in arrival order.
async fn forward_chunks(
    mut chunks: mpsc::UnboundedReceiver<TaggedChunk>,
    transport: Arc<Mutex<BoxedLiveTransport>>,
    generation: Arc<AtomicU64>,
    shutdown: CancellationToken,
) {
    loop {
        let TaggedChunk {
            generation: captured_in,
            chunk,
        } = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            chunk = chunks.recv() => match chunk {
                Some(chunk) => chunk,
                None => break,
            },
        };

        let mut transport = transport.lock().await;
        // checked under the transport lock so a teardown cannot slip in between
        if captured_in != generation.load(Ordering::SeqCst) {
            debug!(mime_type = %chunk.mime_type, "Dropping realtime input from an ended session");
            continue;
        }
        if !transport.is_ready() {
            debug!(mime_type = %chunk.mime_type, "Dropping realtime input, transport not ready");
            continue;
        }
        if let Err(e) = transport.send_realtime_input(vec![chunk]).await {
            warn!("Failed to send realtime input: {}", e);
        }
    }
}
