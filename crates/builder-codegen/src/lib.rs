//! Jetpack Compose code generation for Compose Builder designs.
//!
//! Output is deterministic: the same tree, templates and options always
//! produce byte-identical files.
//!
//! - [`ComposeGenerator`] renders a screen composable, one composable per
//!   referenced custom component template, and a launcher activity
//! - [`modifiers`] builds ordered `Modifier` chains from layout properties
//! - [`kotlin`] holds literal formatting and the import table

pub mod error;
pub mod generators;
pub mod kotlin;
pub mod modifiers;

pub use error::{CodegenError, Result};
pub use generators::{
    CodeGenerator, ComposeGenerator, GenerateOptions, GeneratedFile, GeneratedProject,
    GenerationMode,
};

use builder_tree::{DesignTree, TemplateRegistry};

/// Generate the screen source with the given options.
pub fn generate_screen(
    tree: &DesignTree,
    templates: &TemplateRegistry,
    options: GenerateOptions,
) -> Result<String> {
    ComposeGenerator::with_options(options)?.generate_screen(tree, templates)
}

/// Generate the full project file set with the given options.
pub fn generate_project(
    tree: &DesignTree,
    templates: &TemplateRegistry,
    options: GenerateOptions,
) -> Result<GeneratedProject> {
    ComposeGenerator::with_options(options)?.generate_project(tree, templates)
}
