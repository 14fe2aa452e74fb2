//! Ordered, name-unique collection of tool declarations.

use thiserror::Error;
use tracing::{debug, warn};

use super::declaration::ToolDeclaration;
use crate::core::realtime::FunctionDeclaration;

/// Base name tried by [`ToolRegistry::add`]; collisions get `_1`, `_2`, ...
pub const NEW_TOOL_BASE_NAME: &str = "nova_funcao";

/// Errors returned by registry mutations.
///
/// A failed operation never changes the registry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ToolRegistryError {
    #[error("A tool named '{name}' already exists")]
    NameCollision { name: String },

    #[error("No tool named '{name}'")]
    NotFound { name: String },

    #[error("Invalid tool name: {0}")]
    InvalidName(String),
}

/// Tool declarations in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolRegistry {
    tools: Vec<ToolDeclaration>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a preset list. Later duplicates are dropped.
    pub fn from_tools(tools: Vec<ToolDeclaration>) -> Self {
        let mut registry = Self::new();
        registry.replace_all(tools);
        registry
    }

    pub fn tools(&self) -> &[ToolDeclaration] {
        &self.tools
    }

    pub fn get(&self, name: &str) -> Option<&ToolDeclaration> {
        self.tools.iter().find(|t| t.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Declarations of the enabled tools, in order.
    pub fn enabled_declarations(&self) -> Vec<FunctionDeclaration> {
        self.tools
            .iter()
            .filter(|t| t.is_enabled)
            .map(ToolDeclaration::to_function_declaration)
            .collect()
    }

    /// Flip `isEnabled` on the named tool. Absent names are ignored.
    pub fn toggle(&mut self, name: &str) {
        match self.tools.iter_mut().find(|t| t.name == name) {
            Some(tool) => tool.is_enabled = !tool.is_enabled,
            None => debug!(tool = %name, "Toggle ignored, no such tool"),
        }
    }

    /// Append a blank tool under the first free `nova_funcao[_N]` name.
    ///
    /// Returns the chosen name.
    pub fn add(&mut self) -> String {
        let mut name = NEW_TOOL_BASE_NAME.to_string();
        let mut counter = 1;
        while self.contains(&name) {
            name = format!("{NEW_TOOL_BASE_NAME}_{counter}");
            counter += 1;
        }
        self.tools.push(ToolDeclaration::placeholder(name.clone()));
        name
    }

    /// Delete the named tool. Absent names are ignored.
    pub fn remove(&mut self, name: &str) {
        self.tools.retain(|t| t.name != name);
    }

    /// Replace the tool at `old_name` with `tool`, keeping its position.
    ///
    /// Renaming onto a name held by a different tool is rejected.
    pub fn update(&mut self, old_name: &str, tool: ToolDeclaration) -> Result<(), ToolRegistryError> {
        if tool.name.trim().is_empty() {
            return Err(ToolRegistryError::InvalidName(tool.name));
        }

        if tool.name != old_name && self.contains(&tool.name) {
            warn!(tool = %old_name, new_name = %tool.name, "Tool rename rejected, name already in use");
            return Err(ToolRegistryError::NameCollision { name: tool.name });
        }

        let slot = self
            .tools
            .iter_mut()
            .find(|t| t.name == old_name)
            .ok_or_else(|| ToolRegistryError::NotFound {
                name: old_name.to_string(),
            })?;
        *slot = tool;
        Ok(())
    }

    /// Swap in a whole new tool set.
    pub fn replace_all(&mut self, tools: Vec<ToolDeclaration>) {
        let mut unique: Vec<ToolDeclaration> = Vec::with_capacity(tools.len());
        for tool in tools {
            if unique.iter().any(|t| t.name == tool.name) {
                warn!(tool = %tool.name, "Dropping duplicate tool in bulk replace");
                continue;
            }
            unique.push(tool);
        }
        self.tools = unique;
    }
}
