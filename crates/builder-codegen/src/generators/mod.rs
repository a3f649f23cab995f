//! Code generators.

mod compose;
mod templates;

pub use compose::{component_function_name, ComposeGenerator};
pub use templates::{indent, to_camel_case, to_pascal_case, TemplateEngine};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use builder_tree::{DesignTree, TemplateRegistry};

use crate::error::{CodegenError, Result};
use crate::kotlin;

/// Common trait for code generators.
pub trait CodeGenerator {
    /// Target framework name.
    fn framework_name(&self) -> &'static str;

    /// Generate the screen source for a design tree.
    fn generate_screen(&self, tree: &DesignTree, templates: &TemplateRegistry) -> Result<String>;

    /// Generate the screen, one file per referenced template, and the
    /// application entry point.
    fn generate_project(
        &self,
        tree: &DesignTree,
        templates: &TemplateRegistry,
    ) -> Result<GeneratedProject>;
}

/// How click handlers are emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GenerationMode {
    /// Self-contained function; handlers are inlined stubs.
    #[default]
    Static,
    /// The function takes `onAction: (String) -> Unit` and handlers call it.
    EventDriven,
}

impl std::str::FromStr for GenerationMode {
    type Err = CodegenError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "static" => Ok(Self::Static),
            "eventdriven" => Ok(Self::EventDriven),
            _ => Err(CodegenError::InvalidOption {
                option: "mode",
                message: format!("unknown generation mode '{s}'"),
            }),
        }
    }
}

/// Options for generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerateOptions {
    pub mode: GenerationMode,
    /// Name of the screen composable.
    pub function_name: String,
    /// Kotlin package of the generated app.
    pub package_name: String,
    /// Emit a `@Preview` function next to each composable.
    pub include_preview: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            mode: GenerationMode::Static,
            function_name: "MainScreen".to_string(),
            package_name: "com.example.app".to_string(),
            include_preview: true,
        }
    }
}

impl GenerateOptions {
    pub fn with_mode(mut self, mode: GenerationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Reject names that would not compile as Kotlin.
    pub fn validate(&self) -> Result<()> {
        if !kotlin::is_identifier(&to_pascal_case(&self.function_name)) {
            return Err(CodegenError::InvalidOption {
                option: "function_name",
                message: format!("'{}' is not a valid Kotlin identifier", self.function_name),
            });
        }
        if !kotlin::is_package_name(&self.package_name) {
            return Err(CodegenError::InvalidOption {
                option: "package_name",
                message: format!("'{}' is not a valid Kotlin package", self.package_name),
            });
        }
        Ok(())
    }

    /// Package directory under `app/src/main/java`.
    pub fn package_path(&self) -> String {
        format!("app/src/main/java/{}", self.package_name.replace('.', "/"))
    }
}

/// Generated project output.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GeneratedProject {
    /// Generated files, in a fixed order.
    pub files: Vec<GeneratedFile>,
    /// Number of placeholder comments emitted for unsupported nodes.
    pub placeholders: usize,
}

impl GeneratedProject {
    /// Files keyed by path.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.files
            .iter()
            .map(|f| (f.path.clone(), f.content.clone()))
            .collect()
    }

    pub fn get(&self, path: &str) -> Option<&GeneratedFile> {
        self.files.iter().find(|f| f.path == path)
    }
}

/// A generated file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedFile {
    /// File path relative to project root.
    pub path: String,
    /// File content.
    pub content: String,
}
