//! Console configuration.
//!
//! Priority order (highest to lowest):
//! 1. YAML file values
//! 2. Environment variables (actual ENV vars override .env values)
//! 3. .env file values (loaded in main.rs)
//! 4. Default values
//!
//! # Environment variables
//!
//! | Variable                 | Field               |
//! |--------------------------|---------------------|
//! | `LIVE_MODEL`             | `model`             |
//! | `LIVE_VOICE`             | `voice`             |
//! | `LIVE_TEMPLATE`          | `template`          |
//! | `LIVE_SYSTEM_PROMPT`     | `system_prompt`     |
//! | `GEMINI_API_KEY`         | `api_key`           |
//! | `LIVE_EXPORT_DIR`        | `export_dir`        |
//! | `LIVE_FRAME_INTERVAL_MS` | `frame_interval_ms` |
//! | `LIVE_JPEG_QUALITY`      | `jpeg_quality`      |

mod yaml;

pub use yaml::YamlConfig;

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::core::capture::ScreenCaptureOptions;
use crate::core::session::SessionOptions;
use crate::core::templates::Template;
use crate::core::workspace::{DEFAULT_LIVE_MODEL, DEFAULT_VOICE, Workspace};

/// Default screen sampling period.
pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 500;

/// Default JPEG quality (0.6 quality factor).
pub const DEFAULT_JPEG_QUALITY: u8 = 60;

/// Console configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ConsoleConfig {
    pub model: String,
    pub voice: String,
    /// Preset the console boots with
    pub template: Template,
    /// Overrides the template's system prompt when set
    pub system_prompt: Option<String>,
    pub api_key: Option<String>,
    pub export_dir: PathBuf,
    pub frame_interval_ms: u64,
    pub jpeg_quality: u8,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_LIVE_MODEL.to_string(),
            voice: DEFAULT_VOICE.to_string(),
            template: Template::default(),
            system_prompt: None,
            api_key: None,
            export_dir: PathBuf::from("."),
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl ConsoleConfig {
    /// Load configuration from environment variables over defaults.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let config = merge_config(None)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file, with environment variables as base.
    ///
    /// # Example
    /// ```rust,no_run
    /// use waav_live_console::config::ConsoleConfig;
    /// use std::path::PathBuf;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = ConsoleConfig::from_file(&PathBuf::from("console.yaml"))?;
    /// println!("Booting on template {}", config.template);
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let yaml_config = YamlConfig::from_file(path)?;
        let config = merge_config(Some(yaml_config))?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("model must not be empty".to_string());
        }
        if self.frame_interval_ms == 0 {
            return Err("frame_interval_ms must be greater than 0".to_string());
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(format!(
                "jpeg_quality must be between 1 and 100, got {}",
                self.jpeg_quality
            ));
        }
        Ok(())
    }

    /// Initial workspace: the configured template, then prompt, model and voice.
    pub fn workspace(&self) -> Workspace {
        let mut workspace = Workspace::with_template(self.template);
        if let Some(prompt) = &self.system_prompt {
            workspace.set_system_prompt(prompt.clone());
        }
        workspace.set_model(self.model.clone());
        workspace.set_voice(self.voice.clone());
        workspace
    }

    pub fn screen_options(&self) -> ScreenCaptureOptions {
        ScreenCaptureOptions {
            frame_interval: Duration::from_millis(self.frame_interval_ms),
            jpeg_quality: self.jpeg_quality,
        }
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            api_key: self.api_key.clone(),
            screen: self.screen_options(),
        }
    }
}

fn env_string(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_string(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| format!("Invalid {key} '{raw}': {e}")),
        None => Ok(None),
    }
}

/// Environment over defaults, then YAML over both.
fn merge_config(yaml: Option<YamlConfig>) -> Result<ConsoleConfig, Box<dyn std::error::Error>> {
    let mut config = ConsoleConfig::default();

    if let Some(model) = env_string("LIVE_MODEL") {
        config.model = model;
    }
    if let Some(voice) = env_string("LIVE_VOICE") {
        config.voice = voice;
    }
    if let Some(template) = env_parse::<Template>("LIVE_TEMPLATE")? {
        config.template = template;
    }
    if let Some(prompt) = env_string("LIVE_SYSTEM_PROMPT") {
        config.system_prompt = Some(prompt);
    }
    if let Some(key) = env_string("GEMINI_API_KEY") {
        config.api_key = Some(key);
    }
    if let Some(dir) = env_string("LIVE_EXPORT_DIR") {
        config.export_dir = PathBuf::from(dir);
    }
    if let Some(ms) = env_parse::<u64>("LIVE_FRAME_INTERVAL_MS")? {
        config.frame_interval_ms = ms;
    }
    if let Some(quality) = env_parse::<u8>("LIVE_JPEG_QUALITY")? {
        config.jpeg_quality = quality;
    }

    let Some(yaml) = yaml else {
        return Ok(config);
    };

    if let Some(session) = yaml.session {
        if let Some(model) = session.model {
            config.model = model;
        }
        if let Some(voice) = session.voice {
            config.voice = voice;
        }
        if let Some(template) = session.template {
            config.template = template.parse::<Template>()?;
        }
        if let Some(prompt) = session.system_prompt {
            config.system_prompt = Some(prompt);
        }
    }
    if let Some(key) = yaml.providers.and_then(|p| p.api_key) {
        config.api_key = Some(key);
    }
    if let Some(capture) = yaml.capture {
        if let Some(ms) = capture.frame_interval_ms {
            config.frame_interval_ms = ms;
        }
        if let Some(quality) = capture.jpeg_quality {
            config.jpeg_quality = quality;
        }
    }
    if let Some(dir) = yaml.export.and_then(|e| e.dir) {
        config.export_dir = dir;
    }

    Ok(config)
}
