//! Settings, tool registry and active template under one owner.
//!
//! Template switching replaces the tool set, the system prompt and the
//! active template in a single `&mut self` call, so a reader holding the
//! shared lock never sees one without the others.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::realtime::LiveSessionConfig;
use super::templates::Template;
use super::tools::ToolRegistry;

/// Default live model.
pub const DEFAULT_LIVE_MODEL: &str = "gemini-2.5-flash-native-audio-preview-09-2025";

/// Default prebuilt voice.
pub const DEFAULT_VOICE: &str = "Zephyr";

/// Workspace shared between the session controller and its callers.
pub type SharedWorkspace = Arc<RwLock<Workspace>>;

/// Values read at connect time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub system_prompt: String,
    pub model: String,
    pub voice: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            system_prompt: Template::default().system_prompt().to_string(),
            model: DEFAULT_LIVE_MODEL.to_string(),
            voice: DEFAULT_VOICE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Workspace {
    settings: Settings,
    tools: ToolRegistry,
    template: Template,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::with_template(Template::default())
    }
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Workspace booted on `template` with default model and voice.
    pub fn with_template(template: Template) -> Self {
        Self {
            settings: Settings {
                system_prompt: template.system_prompt().to_string(),
                ..Settings::default()
            },
            tools: ToolRegistry::from_tools(template.tools()),
            template,
        }
    }

    pub fn into_shared(self) -> SharedWorkspace {
        Arc::new(RwLock::new(self))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_system_prompt(&mut self, prompt: impl Into<String>) {
        self.settings.system_prompt = prompt.into();
    }

    pub fn set_model(&mut self, model: impl Into<String>) {
        self.settings.model = model.into();
    }

    pub fn set_voice(&mut self, voice: impl Into<String>) {
        self.settings.voice = voice.into();
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn tools_mut(&mut self) -> &mut ToolRegistry {
        &mut self.tools
    }

    /// Currently selected preset.
    pub fn template(&self) -> Template {
        self.template
    }

    /// Install `template`'s tool set and system prompt.
    pub fn select_template(&mut self, template: Template) {
        self.tools.replace_all(template.tools());
        self.settings.system_prompt = template.system_prompt().to_string();
        self.template = template;
        info!(template = %template, tools = self.tools.len(), "Template selected");
    }

    /// Session parameters from the current settings and enabled tools.
    pub fn session_config(&self, api_key: Option<String>) -> LiveSessionConfig {
        LiveSessionConfig {
            api_key,
            model: self.settings.model.clone(),
            voice: Some(self.settings.voice.clone()),
            system_instruction: Some(self.settings.system_prompt.clone()),
            function_declarations: self.tools.enabled_declarations(),
            response_modalities: vec!["AUDIO".to_string()],
            input_audio_transcription: true,
            output_audio_transcription: true,
        }
    }
}
