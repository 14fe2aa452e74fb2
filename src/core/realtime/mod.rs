//! Live transport module.
//!
//! This module provides the abstractions the console uses to talk to a
//! realtime, bidirectional audio/video model endpoint.
//!
//! # Architecture
//!
//! The realtime module follows the same pattern as the rest of the core:
//! - `BaseLiveTransport` trait for transport abstraction
//! - Callback-based event handling
//! - Wire payloads (`messages`) shared with the conversation log and export
//!
//! The protocol itself lives behind the trait. Concrete transports are
//! supplied by the embedding application.
//!
//! # Realtime Input
//!
//! - Microphone: PCM 16-bit signed little-endian at 16kHz, base64
//! - Screen: JPEG frames, base64
//!
//! # Example
//!
//! ```rust,ignore
//! use waav_live_console::core::realtime::{BaseLiveTransport, RealtimeInputChunk};
//!
//! transport.connect(config).await?;
//! transport
//!     .send_realtime_input(vec![RealtimeInputChunk::audio(base64_pcm)])
//!     .await?;
//! ```

mod base;
mod messages;

pub use base::{
    BaseLiveTransport, BoxedLiveTransport, ConnectionState, ConnectionStateCallback,
    GroundingCallback, LiveError, LiveErrorCallback, LiveResult, LiveSessionConfig,
    ToolCallCallback, TranscriptCallback, TurnCompleteCallback,
};
pub use messages::{
    AUDIO_PCM_MIME_TYPE, FunctionCall, FunctionDeclaration, FunctionResponse, GroundingChunk,
    IMAGE_JPEG_MIME_TYPE, LiveClientToolResponse, LiveServerToolCall, RealtimeInputChunk,
    TranscriptEvent, TranscriptSource, WebSource,
};
