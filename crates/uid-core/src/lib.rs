//! Shared types and error taxonomy for the UI designer MCP server.

pub mod error;
pub mod types;

pub use error::DesignerError;
pub use types::{Classification, OperationKind};
