//! Base traits and types for live transports.
//!
//! This module defines the contract the console expects from the streaming
//! client that talks to the remote model endpoint. The console never speaks
//! the wire protocol itself; it drives a transport through this trait and
//! reacts to the events the transport reports back.
//!
//! # Realtime Input
//!
//! Audio is sent as base64 PCM 16-bit little-endian at 16kHz
//! (`audio/pcm;rate=16000`), screen frames as base64 JPEG (`image/jpeg`).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

use super::messages::{
    FunctionDeclaration, GroundingChunk, LiveClientToolResponse, LiveServerToolCall,
    RealtimeInputChunk, TranscriptEvent,
};

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur while driving a live transport.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LiveError {
    /// Connection to the endpoint failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Sending a message over an open connection failed
    #[error("Send failed: {0}")]
    SendFailed(String),

    /// Provider-specific error
    #[error("Provider error: {0}")]
    ProviderError(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Operation timeout
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Not connected
    #[error("Not connected")]
    NotConnected,

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Result type for transport operations.
pub type LiveResult<T> = Result<T, LiveError>;

// =============================================================================
// Configuration Types
// =============================================================================

/// Session parameters handed to the transport at connect time.
///
/// Built from the current settings and a snapshot of the enabled tools; the
/// transport must not hold on to any live reference to either.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveSessionConfig {
    /// API key for authentication
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Model to use
    pub model: String,

    /// Prebuilt voice name for audio output
    #[serde(default)]
    pub voice: Option<String>,

    /// System instruction for the model
    #[serde(default)]
    pub system_instruction: Option<String>,

    /// Function declarations the model may call
    #[serde(default)]
    pub function_declarations: Vec<FunctionDeclaration>,

    /// Response modalities (defaults to audio only)
    #[serde(default)]
    pub response_modalities: Vec<String>,

    /// Ask the endpoint to transcribe the user's audio
    #[serde(default)]
    pub input_audio_transcription: bool,

    /// Ask the endpoint to transcribe its own audio output
    #[serde(default)]
    pub output_audio_transcription: bool,
}

// =============================================================================
// Connection State
// =============================================================================

/// Connection state reported by a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// Not connected to the endpoint
    #[default]
    Disconnected,
    /// Currently connecting
    Connecting,
    /// Connected and ready
    Connected,
    /// Connection failed or was lost
    Failed,
}

impl ConnectionState {
    /// Whether this state means the link to the endpoint is gone.
    pub fn is_down(&self) -> bool {
        matches!(self, ConnectionState::Disconnected | ConnectionState::Failed)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "Disconnected"),
            ConnectionState::Connecting => write!(f, "Connecting"),
            ConnectionState::Connected => write!(f, "Connected"),
            ConnectionState::Failed => write!(f, "Failed"),
        }
    }
}

// =============================================================================
// Callback Types
// =============================================================================

/// Callback type for connection state changes.
pub type ConnectionStateCallback =
    Arc<dyn Fn(ConnectionState) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// Callback type for transcription fragments.
pub type TranscriptCallback =
    Arc<dyn Fn(TranscriptEvent) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// Callback type for tool call requests from the model.
pub type ToolCallCallback =
    Arc<dyn Fn(LiveServerToolCall) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// Callback type for the end of a model turn.
pub type TurnCompleteCallback =
    Arc<dyn Fn() -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// Callback type for grounding metadata attached to a model turn.
pub type GroundingCallback =
    Arc<dyn Fn(Vec<GroundingChunk>) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// Callback type for transport errors.
pub type LiveErrorCallback =
    Arc<dyn Fn(LiveError) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

// =============================================================================
// Base Trait
// =============================================================================

/// Base trait for live transports.
///
/// A transport owns the streaming connection to the remote model. The console
/// connects it with a [`LiveSessionConfig`], pushes realtime input chunks and
/// tool responses through it, and consumes its events through the registered
/// callbacks. Registering a callback replaces any previous one.
///
/// # Example
///
/// ```rust,ignore
/// use waav_live_console::core::realtime::{BaseLiveTransport, LiveSessionConfig};
///
/// transport.on_tool_call(Arc::new(|call| Box::pin(async move {
///     println!("{} function call(s)", call.function_calls.len());
/// })))?;
///
/// transport.connect(LiveSessionConfig {
///     model: "gemini-2.5-flash-native-audio-preview-09-2025".to_string(),
///     ..Default::default()
/// }).await?;
/// ```
#[async_trait]
pub trait BaseLiveTransport: Send + Sync {
    /// Open the session.
    async fn connect(&mut self, config: LiveSessionConfig) -> LiveResult<()>;

    /// Close the session.
    async fn disconnect(&mut self) -> LiveResult<()>;

    /// Check if the transport is connected and ready.
    fn is_ready(&self) -> bool;

    /// Get the current connection state.
    fn get_connection_state(&self) -> ConnectionState;

    // -------------------------------------------------------------------------
    // Outbound
    // -------------------------------------------------------------------------

    /// Send realtime media chunks to the model.
    async fn send_realtime_input(&mut self, chunks: Vec<RealtimeInputChunk>) -> LiveResult<()>;

    /// Reply to a tool call.
    async fn send_tool_response(&mut self, response: LiveClientToolResponse) -> LiveResult<()>;

    // -------------------------------------------------------------------------
    // Callbacks
    // -------------------------------------------------------------------------

    /// Register a callback for connection state changes.
    fn on_connection_state(&mut self, callback: ConnectionStateCallback) -> LiveResult<()>;

    /// Register a callback for transcription fragments.
    fn on_transcript(&mut self, callback: TranscriptCallback) -> LiveResult<()>;

    /// Register a callback for tool call requests.
    fn on_tool_call(&mut self, callback: ToolCallCallback) -> LiveResult<()>;

    /// Register a callback for the end of a model turn.
    fn on_turn_complete(&mut self, callback: TurnCompleteCallback) -> LiveResult<()>;

    /// Register a callback for grounding metadata.
    fn on_grounding(&mut self, callback: GroundingCallback) -> LiveResult<()>;

    /// Register a callback for transport errors.
    fn on_error(&mut self, callback: LiveErrorCallback) -> LiveResult<()>;

    /// Get provider information.
    fn get_provider_info(&self) -> serde_json::Value;
}

/// Boxed trait object for live transports.
pub type BoxedLiveTransport = Box<dyn BaseLiveTransport>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_state_display() {
        assert_eq!(ConnectionState::Connected.to_string(), "Connected");
        assert_eq!(ConnectionState::Disconnected.to_string(), "Disconnected");
        assert_eq!(ConnectionState::Connecting.to_string(), "Connecting");
        assert_eq!(ConnectionState::Failed.to_string(), "Failed");
    }

    #[test]
    fn test_connection_state_is_down() {
        assert!(ConnectionState::Disconnected.is_down());
        assert!(ConnectionState::Failed.is_down());
        assert!(!ConnectionState::Connecting.is_down());
        assert!(!ConnectionState::Connected.is_down());
    }

    #[test]
    fn test_default_session_config() {
        let config = LiveSessionConfig::default();
        assert!(config.api_key.is_none());
        assert!(config.function_declarations.is_empty());
        assert!(!config.input_audio_transcription);
    }

    #[test]
    fn test_session_config_never_serializes_api_key() {
        let config = LiveSessionConfig {
            api_key: Some("secret".to_string()),
            model: "m".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
        assert!(json.contains("\"systemInstruction\""));
    }

    #[test]
    fn test_error_display() {
        let err = LiveError::ConnectionFailed("test".to_string());
        assert!(err.to_string().contains("Connection failed"));

        let err = LiveError::NotConnected;
        assert_eq!(err.to_string(), "Not connected");
    }
}
