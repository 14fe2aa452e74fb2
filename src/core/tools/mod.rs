//! Tool declarations the model may call.
//!
//! - [`Schema`]: tagged recursive parameter schema
//! - [`ToolDeclaration`]: one callable function with console-side flags
//! - [`ToolRegistry`]: the user-editable, name-unique tool list

mod declaration;
mod registry;
mod schema;

pub use declaration::{FunctionResponseScheduling, ToolDeclaration};
pub use registry::{NEW_TOOL_BASE_NAME, ToolRegistry, ToolRegistryError};
pub use schema::Schema;
