pub mod capture;
pub mod conversation;
pub mod export;
pub mod realtime;
pub mod session;
pub mod templates;
pub mod tools;
pub mod workspace;

// Re-export commonly used types for convenience
pub use realtime::{
    BaseLiveTransport, BoxedLiveTransport, ConnectionState, LiveError, LiveResult,
    LiveSessionConfig, RealtimeInputChunk,
};

pub use tools::{FunctionResponseScheduling, Schema, ToolDeclaration, ToolRegistry, ToolRegistryError};

pub use templates::Template;

pub use workspace::{DEFAULT_LIVE_MODEL, DEFAULT_VOICE, Settings, SharedWorkspace, Workspace};

pub use conversation::{
    ConversationLog, ConversationTurn, NewTurn, Role, SharedConversationLog, TurnUpdate,
};

pub use capture::{
    AudioCapturePipeline, CaptureError, DisplaySource, MicrophoneSource, ScreenCaptureOptions,
    ScreenCapturePipeline,
};

pub use session::{
    AcknowledgeResponder, SessionController, SessionError, SessionHandle, SessionOptions,
    SessionState, SessionStatus, ToolResponder,
};

pub use export::{ExportError, ExportSnapshot, export_filename};
