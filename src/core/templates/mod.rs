//! Preset templates.
//!
//! A template pairs a system prompt with a tool set. The set of templates is
//! closed; selecting one goes through [`crate::core::Workspace::select_template`]
//! so that tools and prompt change together.

mod toolsets;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::core::tools::ToolDeclaration;

/// Available presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Template {
    CustomerSupport,
    PersonalAssistant,
    NavigationSystem,
    #[default]
    Tmbr,
}

/// Returned when parsing an unknown template name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown template '{0}'. Expected one of: customer-support, personal-assistant, navigation-system, tmbr")]
pub struct UnknownTemplate(pub String);

impl Template {
    pub const ALL: [Template; 4] = [
        Template::CustomerSupport,
        Template::PersonalAssistant,
        Template::NavigationSystem,
        Template::Tmbr,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Template::CustomerSupport => "customer-support",
            Template::PersonalAssistant => "personal-assistant",
            Template::NavigationSystem => "navigation-system",
            Template::Tmbr => "tmbr",
        }
    }

    /// System prompt installed when this template is selected.
    pub fn system_prompt(&self) -> &'static str {
        match self {
            Template::CustomerSupport => {
                "Você é um agente de suporte ao cliente prestativo e amigável. Seja coloquial e conciso."
            }
            Template::PersonalAssistant => {
                "Você é um assistente pessoal prestativo e amigável. Seja proativo e eficiente."
            }
            Template::NavigationSystem => {
                "Você é um assistente de navegação prestativo e amigável. Forneça direções claras e precisas."
            }
            Template::Tmbr => TMBR_PROMPT,
        }
    }

    /// Fresh copy of this template's tool set.
    pub fn tools(&self) -> Vec<ToolDeclaration> {
        match self {
            Template::CustomerSupport => toolsets::customer_support(),
            Template::PersonalAssistant => toolsets::personal_assistant(),
            Template::NavigationSystem => toolsets::navigation_system(),
            Template::Tmbr => toolsets::tmbr(),
        }
    }
}

const TMBR_PROMPT: &str = "Você é Harpy, uma analista técnica que acompanha a tela do usuário em tempo real.\n\n\
- Trate a tela compartilhada como a principal fonte de contexto.\n\
- Use `search_reference` para verificar fatos antes de afirmá-los.\n\
- Use `analyze_data_stream` para resumir dados visíveis e `query_public_api` para consultar plataformas externas.\n\
- `draft_code_snippet` apenas propõe código; nada é executado.\n\n\
Seja rápida, técnica e objetiva. Responda sempre em Português do Brasil.";

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Template {
    type Err = UnknownTemplate;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Template::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownTemplate(s.to_string()))
    }
}
