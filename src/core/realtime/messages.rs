//! Wire payloads exchanged with a live transport.
//!
//! Field names follow the endpoint's camelCase JSON so that tool calls and
//! tool responses can be stored in the conversation log and exported without
//! reshaping.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::tools::{FunctionResponseScheduling, Schema};

/// MIME type of microphone chunks.
pub const AUDIO_PCM_MIME_TYPE: &str = "audio/pcm;rate=16000";

/// MIME type of screen frames.
pub const IMAGE_JPEG_MIME_TYPE: &str = "image/jpeg";

// =============================================================================
// Realtime Input
// =============================================================================

/// One encoded unit of media sent to the model mid-session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeInputChunk {
    /// Content type of `data`
    pub mime_type: String,
    /// Base64 payload
    pub data: String,
}

impl RealtimeInputChunk {
    /// Build an audio chunk from base64 PCM.
    pub fn audio(data: String) -> Self {
        Self {
            mime_type: AUDIO_PCM_MIME_TYPE.to_string(),
            data,
        }
    }

    /// Build an image chunk from base64 JPEG.
    pub fn jpeg(data: String) -> Self {
        Self {
            mime_type: IMAGE_JPEG_MIME_TYPE.to_string(),
            data,
        }
    }

    /// Whether this chunk carries audio.
    pub fn is_audio(&self) -> bool {
        self.mime_type.starts_with("audio/")
    }

    /// Whether this chunk carries an image.
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

// =============================================================================
// Function Declarations
// =============================================================================

/// Function declaration as sent to the model at connect time.
///
/// Console-only fields (`isEnabled`, `scheduling`) are stripped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    /// Function name
    pub name: String,
    /// Function description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Parameter schema
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Schema>,
}

// =============================================================================
// Tool Calls
// =============================================================================

/// A single function invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Call identifier, echoed back in the response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Function name
    pub name: String,
    /// Call arguments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Value>,
}

/// Tool call message from the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveServerToolCall {
    /// Requested invocations, in model order
    #[serde(default)]
    pub function_calls: Vec<FunctionCall>,
}

/// Reply to a single function invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionResponse {
    /// Identifier of the call being answered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Function name
    pub name: String,
    /// Response payload
    pub response: Value,
    /// How the model should take the response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduling: Option<FunctionResponseScheduling>,
}

/// Tool response message sent back to the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveClientToolResponse {
    /// Replies, one per answered call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_responses: Option<Vec<FunctionResponse>>,
}

// =============================================================================
// Transcripts & Grounding
// =============================================================================

/// Which side of the conversation a transcription belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptSource {
    /// Transcription of the user's microphone audio
    Input,
    /// Transcription of the model's audio output
    Output,
}

/// Transcription fragment reported by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEvent {
    /// Input or output transcription
    pub source: TranscriptSource,
    /// Text fragment
    pub text: String,
    /// Whether the endpoint marked this fragment as the end of the utterance
    #[serde(default)]
    pub finished: bool,
}

/// Web source cited by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebSource {
    pub uri: String,
    pub title: String,
}

/// Citation attached to a model turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingChunk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web: Option<WebSource>,
}
