use serde::Deserialize;
use std::path::PathBuf;

/// Complete YAML configuration structure
///
/// All fields are optional to allow partial configuration. Values present in
/// the file override environment variables.
///
/// # Example YAML structure
/// ```yaml
/// session:
///   model: "gemini-2.5-flash-native-audio-preview-09-2025"
///   voice: "Zephyr"
///   template: "navigation-system"
///   system_prompt: "You are a concise navigation assistant."
///
/// providers:
///   api_key: "your-gemini-key"
///
/// capture:
///   frame_interval_ms: 500
///   jpeg_quality: 60
///
/// export:
///   dir: "/var/log/live-console"
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub session: Option<SessionYaml>,
    pub providers: Option<ProvidersYaml>,
    pub capture: Option<CaptureYaml>,
    pub export: Option<ExportYaml>,
}

/// Session defaults from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SessionYaml {
    pub model: Option<String>,
    pub voice: Option<String>,
    pub template: Option<String>,
    pub system_prompt: Option<String>,
}

/// Provider credentials from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ProvidersYaml {
    pub api_key: Option<String>,
}

/// Capture tuning from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct CaptureYaml {
    pub frame_interval_ms: Option<u64>,
    pub jpeg_quality: Option<u8>,
}

/// Export settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ExportYaml {
    pub dir: Option<PathBuf>,
}

impl YamlConfig {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    /// Returns an error if:
    /// - The file cannot be read
    /// - The YAML is malformed
    /// - Fields have invalid types
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;

        let config: YamlConfig = serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse YAML config: {e}"))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_yaml_config_full() {
        let yaml = r#"
session:
  model: "custom-model"
  voice: "Puck"
  template: "customer-support"
  system_prompt: "Be brief."

providers:
  api_key: "yaml-key"

capture:
  frame_interval_ms: 250
  jpeg_quality: 80

export:
  dir: "/tmp/exports"
"#;

        let config: YamlConfig = serde_yaml::from_str(yaml).unwrap();

        let session = config.session.as_ref().unwrap();
        assert_eq!(session.model.as_deref(), Some("custom-model"));
        assert_eq!(session.voice.as_deref(), Some("Puck"));
        assert_eq!(session.template.as_deref(), Some("customer-support"));
        assert_eq!(session.system_prompt.as_deref(), Some("Be brief."));

        assert_eq!(
            config.providers.as_ref().unwrap().api_key.as_deref(),
            Some("yaml-key")
        );

        let capture = config.capture.as_ref().unwrap();
        assert_eq!(capture.frame_interval_ms, Some(250));
        assert_eq!(capture.jpeg_quality, Some(80));

        assert_eq!(
            config.export.as_ref().unwrap().dir,
            Some(PathBuf::from("/tmp/exports"))
        );
    }

    #[test]
    fn test_yaml_config_partial() {
        let yaml = r#"
capture:
  jpeg_quality: 40
"#;

        let config: YamlConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.session.is_none());
        assert!(config.providers.is_none());
        let capture = config.capture.unwrap();
        assert_eq!(capture.jpeg_quality, Some(40));
        assert!(capture.frame_interval_ms.is_none());
    }

    #[test]
    fn test_yaml_config_empty() {
        let config: YamlConfig = serde_yaml::from_str("").unwrap_or_default();
        assert!(config.session.is_none());
        assert!(config.export.is_none());
    }

    #[test]
    fn test_yaml_config_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        fs::write(&path, "session:\n  template: tmbr\n").unwrap();

        let config = YamlConfig::from_file(&path).unwrap();
        assert_eq!(
            config.session.unwrap().template.as_deref(),
            Some("tmbr")
        );
    }

    #[test]
    fn test_yaml_config_file_not_found() {
        let result = YamlConfig::from_file(&PathBuf::from("/nonexistent/config.yaml"));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_yaml_config_invalid_type() {
        let yaml = "capture:\n  jpeg_quality: \"high\"\n";
        assert!(serde_yaml::from_str::<YamlConfig>(yaml).is_err());
    }
}
