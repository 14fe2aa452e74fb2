use serde::{Deserialize, Serialize};
use std::fmt;

use super::schema::Schema;
use crate::core::realtime::FunctionDeclaration;

/// How a tool response is delivered back to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FunctionResponseScheduling {
    /// Endpoint default
    #[default]
    #[serde(rename = "SCHEDULING_UNSPECIFIED")]
    Unspecified,
    /// Add the result to context without prompting a reply
    #[serde(rename = "SILENT")]
    Silent,
    /// Deliver once the model has finished speaking
    #[serde(rename = "WHEN_IDLE")]
    WhenIdle,
    /// Cut into the current model output
    #[serde(rename = "INTERRUPT")]
    Interrupt,
}

impl FunctionResponseScheduling {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unspecified => "SCHEDULING_UNSPECIFIED",
            Self::Silent => "SILENT",
            Self::WhenIdle => "WHEN_IDLE",
            Self::Interrupt => "INTERRUPT",
        }
    }
}

impl fmt::Display for FunctionResponseScheduling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_enabled() -> bool {
    true
}

/// A callable function the model may request mid-conversation.
///
/// Serializes as `{name, description?, parameters?, isEnabled, scheduling?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDeclaration {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Schema>,
    #[serde(default = "default_enabled")]
    pub is_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduling: Option<FunctionResponseScheduling>,
}

impl ToolDeclaration {
    /// Enabled tool with the given parameters and no scheduling override.
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Schema) -> Self {
        Self {
            name: name.into(),
            description: Some(description.into()),
            parameters: Some(parameters),
            is_enabled: true,
            scheduling: None,
        }
    }

    /// Set the response scheduling.
    pub fn with_scheduling(mut self, scheduling: FunctionResponseScheduling) -> Self {
        self.scheduling = Some(scheduling);
        self
    }

    /// Blank tool as created by the add action.
    pub(crate) fn placeholder(name: String) -> Self {
        Self {
            name,
            description: Some(String::new()),
            parameters: Some(Schema::empty_object()),
            is_enabled: true,
            scheduling: Some(FunctionResponseScheduling::Interrupt),
        }
    }

    /// Declaration to hand the model, without console-only fields.
    pub fn to_function_declaration(&self) -> FunctionDeclaration {
        FunctionDeclaration {
            name: self.name.clone(),
            description: self.description.clone(),
            parameters: self.parameters.clone(),
        }
    }
}
