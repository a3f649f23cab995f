//! Error types for code generation.

use thiserror::Error;

use builder_core::TreeError;

/// Result type alias for codegen operations.
pub type Result<T> = std::result::Result<T, CodegenError>;

/// Errors that can occur during code generation.
///
/// Per-node problems (unknown types, dangling template references) are not
/// errors: they become placeholder comments in the output.
#[derive(Error, Debug)]
pub enum CodegenError {
    /// The tree has no root to generate from.
    #[error("Cannot generate code for an empty tree")]
    EmptyTree,

    /// A template's node list does not form a tree.
    #[error("Invalid tree: {0}")]
    InvalidTree(#[from] TreeError),

    /// Invalid generation option.
    #[error("Invalid option '{option}': {message}")]
    InvalidOption { option: &'static str, message: String },

    /// Template rendering error.
    #[error("Template error: {0}")]
    TemplateError(#[from] handlebars::RenderError),

    /// Invalid template.
    #[error("Invalid template: {0}")]
    InvalidTemplate(#[from] handlebars::TemplateError),
}
