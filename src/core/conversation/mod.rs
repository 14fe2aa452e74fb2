//! Conversation log.
//!
//! Turns are stored in creation order. Only the last turn may be changed
//! after it is appended, and turns are only ever removed all at once.

use parking_lot::RwLock;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::debug;

use super::realtime::{GroundingChunk, LiveClientToolResponse, LiveServerToolCall};
use crate::utils::timestamp::serialize_iso;

#[cfg(test)]
mod tests;

/// Log shared between the session controller and readers such as export.
pub type SharedConversationLog = Arc<RwLock<ConversationLog>>;

/// Who a turn belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Agent,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Agent => "agent",
            Role::System => "system",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the log.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationTurn {
    /// Set once when the turn is appended
    #[serde(serialize_with = "serialize_iso")]
    pub timestamp: OffsetDateTime,
    pub role: Role,
    pub text: String,
    pub is_final: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_use_request: Option<LiveServerToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_use_response: Option<LiveClientToolResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grounding_chunks: Option<Vec<GroundingChunk>>,
}

/// A turn without its timestamp, as passed to [`ConversationLog::add_turn`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewTurn {
    pub role: Role,
    pub text: String,
    pub is_final: bool,
    pub tool_use_request: Option<LiveServerToolCall>,
    pub tool_use_response: Option<LiveClientToolResponse>,
    pub grounding_chunks: Option<Vec<GroundingChunk>>,
}

impl NewTurn {
    pub fn new(role: Role, text: impl Into<String>, is_final: bool) -> Self {
        Self {
            role,
            text: text.into(),
            is_final,
            tool_use_request: None,
            tool_use_response: None,
            grounding_chunks: None,
        }
    }

    pub fn user(text: impl Into<String>, is_final: bool) -> Self {
        Self::new(Role::User, text, is_final)
    }

    pub fn agent(text: impl Into<String>, is_final: bool) -> Self {
        Self::new(Role::Agent, text, is_final)
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, text, true)
    }

    pub fn with_tool_request(mut self, request: LiveServerToolCall) -> Self {
        self.tool_use_request = Some(request);
        self
    }

    pub fn with_tool_response(mut self, response: LiveClientToolResponse) -> Self {
        self.tool_use_response = Some(response);
        self
    }

    pub fn with_grounding(mut self, chunks: Vec<GroundingChunk>) -> Self {
        self.grounding_chunks = Some(chunks);
        self
    }
}

/// Fields to merge into the last turn. `None` leaves a field as it is.
///
/// The optional payloads take `Some(None)` to remove them from the turn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TurnUpdate {
    pub role: Option<Role>,
    pub text: Option<String>,
    pub is_final: Option<bool>,
    pub tool_use_request: Option<Option<LiveServerToolCall>>,
    pub tool_use_response: Option<Option<LiveClientToolResponse>>,
    pub grounding_chunks: Option<Option<Vec<GroundingChunk>>>,
}

impl TurnUpdate {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn finalize() -> Self {
        Self {
            is_final: Some(true),
            ..Default::default()
        }
    }

    fn apply(self, turn: &mut ConversationTurn) {
        if let Some(role) = self.role {
            turn.role = role;
        }
        if let Some(text) = self.text {
            turn.text = text;
        }
        if let Some(is_final) = self.is_final {
            turn.is_final = is_final;
        }
        if let Some(request) = self.tool_use_request {
            turn.tool_use_request = request;
        }
        if let Some(response) = self.tool_use_response {
            turn.tool_use_response = response;
        }
        if let Some(chunks) = self.grounding_chunks {
            turn.grounding_chunks = chunks;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationLog {
    turns: Vec<ConversationTurn>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_shared(self) -> SharedConversationLog {
        Arc::new(RwLock::new(self))
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&ConversationTurn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Append `turn`, stamped with the current instant.
    pub fn add_turn(&mut self, turn: NewTurn) {
        self.turns.push(ConversationTurn {
            timestamp: OffsetDateTime::now_utc(),
            role: turn.role,
            text: turn.text,
            is_final: turn.is_final,
            tool_use_request: turn.tool_use_request,
            tool_use_response: turn.tool_use_response,
            grounding_chunks: turn.grounding_chunks,
        });
    }

    /// Merge `update` into the last turn. Does nothing on an empty log.
    pub fn update_last_turn(&mut self, update: TurnUpdate) {
        match self.turns.last_mut() {
            Some(turn) => update.apply(turn),
            None => debug!("update_last_turn on empty log ignored"),
        }
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Fold a streaming transcription fragment into the log.
    ///
    /// Extends the last turn when it belongs to `role` and is still open,
    /// otherwise starts a new turn.
    pub fn fold_transcript(&mut self, role: Role, fragment: &str, finished: bool) {
        if let Some(last) = self.turns.last_mut()
            && last.role == role
            && !last.is_final
        {
            last.text.push_str(fragment);
            if finished {
                last.is_final = true;
            }
            return;
        }
        self.add_turn(NewTurn::new(role, fragment, finished));
    }

    /// Mark the last turn final.
    pub fn finalize_last_turn(&mut self) {
        self.update_last_turn(TurnUpdate::finalize());
    }

    /// Attach citations to the last turn if it is an agent turn.
    pub fn attach_grounding(&mut self, chunks: Vec<GroundingChunk>) {
        if chunks.is_empty() {
            return;
        }
        match self.turns.last_mut() {
            Some(turn) if turn.role == Role::Agent => {
                turn.grounding_chunks.get_or_insert_with(Vec::new).extend(chunks);
            }
            _ => debug!("Grounding metadata without an agent turn ignored"),
        }
    }
}
