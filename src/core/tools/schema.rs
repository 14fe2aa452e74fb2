//! Parameter schemas for tool declarations.
//!
//! A schema is a tagged recursive tree keyed on the upper-case `type` field
//! the model endpoint expects (`OBJECT`, `ARRAY`, `STRING`, ...). Optional
//! fields are omitted when absent so a declaration read from JSON serializes
//! back to the same document.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Argument schema of a callable function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum Schema {
    /// Named properties, in declaration order
    #[serde(alias = "object")]
    Object {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        properties: Option<IndexMap<String, Schema>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        required: Option<Vec<String>>,
    },
    /// Homogeneous list
    #[serde(alias = "array")]
    Array {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        items: Box<Schema>,
    },
    /// Free text, or one of a closed set of values when `enum` is present
    #[serde(alias = "string")]
    String {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(
            rename = "enum",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        enum_values: Option<Vec<String>>,
    },
    #[serde(alias = "number")]
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    #[serde(alias = "integer")]
    Integer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    #[serde(alias = "boolean")]
    Boolean {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
}

impl Schema {
    /// Object schema with no properties, the shape given to new tools.
    pub fn empty_object() -> Self {
        Schema::Object {
            description: None,
            properties: Some(IndexMap::new()),
            required: None,
        }
    }

    /// Object schema built from `(name, schema)` pairs.
    pub fn object<I, K>(properties: I, required: &[&str]) -> Self
    where
        I: IntoIterator<Item = (K, Schema)>,
        K: Into<String>,
    {
        Schema::Object {
            description: None,
            properties: Some(properties.into_iter().map(|(k, v)| (k.into(), v)).collect()),
            required: if required.is_empty() {
                None
            } else {
                Some(required.iter().map(|s| s.to_string()).collect())
            },
        }
    }

    pub fn string(description: impl Into<String>) -> Self {
        Schema::String {
            description: Some(description.into()),
            enum_values: None,
        }
    }

    /// String restricted to `values`.
    pub fn enumeration(description: impl Into<String>, values: &[&str]) -> Self {
        Schema::String {
            description: Some(description.into()),
            enum_values: Some(values.iter().map(|s| s.to_string()).collect()),
        }
    }

    pub fn number(description: impl Into<String>) -> Self {
        Schema::Number {
            description: Some(description.into()),
        }
    }

    pub fn integer(description: impl Into<String>) -> Self {
        Schema::Integer {
            description: Some(description.into()),
        }
    }

    pub fn boolean(description: impl Into<String>) -> Self {
        Schema::Boolean {
            description: Some(description.into()),
        }
    }

    pub fn array(description: impl Into<String>, items: Schema) -> Self {
        Schema::Array {
            description: Some(description.into()),
            items: Box::new(items),
        }
    }

    /// Wire name of this node's type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Schema::Object { .. } => "OBJECT",
            Schema::Array { .. } => "ARRAY",
            Schema::String { .. } => "STRING",
            Schema::Number { .. } => "NUMBER",
            Schema::Integer { .. } => "INTEGER",
            Schema::Boolean { .. } => "BOOLEAN",
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Schema::Object { description, .. }
            | Schema::Array { description, .. }
            | Schema::String { description, .. }
            | Schema::Number { description }
            | Schema::Integer { description }
            | Schema::Boolean { description } => description.as_deref(),
        }
    }
}
