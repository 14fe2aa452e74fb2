//! JSON export of the configuration, tools and conversation.
//!
//! ```json
//! {
//!   "configuration": { "model": "...", "systemPrompt": "..." },
//!   "tools": [ ... ],
//!   "conversation": [ { "timestamp": "2025-03-01T09:30:05.042Z", ... } ]
//! }
//! ```

use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use time::OffsetDateTime;
use tracing::info;

use super::conversation::{ConversationLog, ConversationTurn};
use super::tools::ToolDeclaration;
use super::workspace::Workspace;
use crate::utils::timestamp::to_file_stamp;

/// Prefix of export file names.
pub const EXPORT_FILE_PREFIX: &str = "live-api-logs-";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to serialize export: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to format timestamp: {0}")]
    Timestamp(#[from] time::error::Format),

    #[error("Failed to write export: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportConfiguration {
    pub model: String,
    pub system_prompt: String,
}

/// Point-in-time copy of everything an export contains.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportSnapshot {
    pub configuration: ExportConfiguration,
    pub tools: Vec<ToolDeclaration>,
    pub conversation: Vec<ConversationTurn>,
}

impl ExportSnapshot {
    /// Copy the current state. Neither input is modified.
    pub fn capture(workspace: &Workspace, log: &ConversationLog) -> Self {
        Self {
            configuration: ExportConfiguration {
                model: workspace.settings().model.clone(),
                system_prompt: workspace.settings().system_prompt.clone(),
            },
            tools: workspace.tools().tools().to_vec(),
            conversation: log.turns().to_vec(),
        }
    }

    /// Pretty-printed JSON, two-space indent.
    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the export into `dir` under [`export_filename`] and return the path.
    pub fn write_to_dir(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        let path = dir.join(export_filename(OffsetDateTime::now_utc())?);
        std::fs::write(&path, self.to_json()?)?;
        info!(
            path = %path.display(),
            turns = self.conversation.len(),
            "Conversation exported"
        );
        Ok(path)
    }
}

/// `live-api-logs-<ISO timestamp with ':' and '.' as '-'>.json`
pub fn export_filename(now: OffsetDateTime) -> Result<String, ExportError> {
    Ok(format!("{EXPORT_FILE_PREFIX}{}.json", to_file_stamp(now)?))
}
