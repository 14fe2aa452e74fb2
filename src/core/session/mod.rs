//! Session control.
//!
//! The [`SessionController`] is the connect/disconnect state machine. It
//! gates both capture pipelines, folds transport events into the
//! conversation log and publishes a [`SessionStatus`] for observers.
//! [`SessionHandle`] runs a controller on its own task and feeds it commands
//! and transport events one at a time.
//!
//! # State machine
//!
//! ```text
//! Idle --connect--> Connecting --ok--> Connected
//!   ^                   |                 |
//!   |                 error       disconnect / drop
//!   |                   |                 v
//!   +-------------------+------------ Disconnecting
//! ```
//!
//! Entering `Idle` always unmutes and stops both pipelines.

mod controller;
mod handle;
mod responder;

pub use controller::{SessionController, SessionOptions};
pub use handle::SessionHandle;
pub use responder::{AcknowledgeResponder, ToolResponder};

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use tokio::sync::oneshot;

use crate::core::capture::CaptureError;
use crate::core::export::ExportError;
use crate::core::realtime::{
    ConnectionState, GroundingChunk, LiveError, LiveServerToolCall, TranscriptEvent,
};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Transport(#[from] LiveError),

    #[error("Session is not connected")]
    NotConnected,

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("Session controller has shut down")]
    ControllerClosed,
}

/// Controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    #[default]
    Idle,
    Connecting,
    Connected,
    Disconnecting,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Connecting => "connecting",
            SessionState::Connected => "connected",
            SessionState::Disconnecting => "disconnecting",
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, SessionState::Connected)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observable session state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub state: SessionState,
    /// Only meaningful while connected; always false otherwise
    pub muted: bool,
    /// Microphone streaming
    pub capturing_audio: bool,
    /// Screen capture held
    pub sharing: bool,
    /// Last microphone request failed
    pub microphone_unavailable: bool,
    /// Last screen capture request failed
    pub screen_unavailable: bool,
    /// Minted on each successful connect
    pub session_id: Option<String>,
}

impl SessionStatus {
    pub fn connected(&self) -> bool {
        self.state.is_connected()
    }

    /// Title of the microphone button.
    pub fn mic_action_label(&self) -> &'static str {
        match (self.state, self.muted) {
            (SessionState::Connected, true) => "Unmute microphone",
            (SessionState::Connected, false) => "Mute microphone",
            _ => "Connect and start microphone",
        }
    }

    /// Title of the screen share button.
    pub fn screen_action_label(&self) -> &'static str {
        if self.sharing {
            "Stop screen share"
        } else {
            "Share screen"
        }
    }
}

/// Events processed by the controller, from the transport or a pipeline.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    ConnectionState(ConnectionState),
    Transcript(TranscriptEvent),
    ToolCall(LiveServerToolCall),
    TurnComplete,
    Grounding(Vec<GroundingChunk>),
    TransportError(LiveError),
    /// A microphone start finished; `Ok(false)` means it was superseded
    MicrophoneStarted(Result<bool, CaptureError>),
    /// A screen share start finished; `Ok(false)` means it was superseded
    ScreenStarted(Result<bool, CaptureError>),
    /// The platform ended the screen capture
    ScreenEnded,
}

/// Requests accepted by [`SessionHandle`].
#[derive(Debug)]
pub enum SessionCommand {
    Connect {
        reply: oneshot::Sender<Result<(), SessionError>>,
    },
    Disconnect {
        reply: oneshot::Sender<Result<(), SessionError>>,
    },
    MicClick {
        /// The sender holds the handle's pending-connect claim
        claimed: bool,
        reply: oneshot::Sender<Result<(), SessionError>>,
    },
    SetMuted {
        muted: bool,
        reply: oneshot::Sender<Result<(), SessionError>>,
    },
    ToggleScreenShare {
        reply: oneshot::Sender<Result<(), SessionError>>,
    },
    ClearTurns {
        reply: oneshot::Sender<Result<(), SessionError>>,
    },
    Export {
        dir: PathBuf,
        reply: oneshot::Sender<Result<PathBuf, SessionError>>,
    },
    Shutdown,
}
