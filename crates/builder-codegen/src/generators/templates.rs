//! Handlebars templates for generated Kotlin files.

use handlebars::{no_escape, Context, Handlebars, Helper, Output, RenderContext, RenderErrorReason};
use serde::Serialize;

use crate::error::{CodegenError, Result};

/// A composable source file: package, imports, function body.
pub const COMPOSABLE_FILE: &str = "composable_file";
/// The launcher activity hosting the screen.
pub const MAIN_ACTIVITY: &str = "main_activity";

const COMPOSABLE_FILE_TEMPLATE: &str = r#"package {{package}}

{{imports}}

{{annotations}}fun {{pascal_case function_name}}({{params}}) {
{{body}}
}
{{preview}}"#;

const MAIN_ACTIVITY_TEMPLATE: &str = r#"package {{package}}

import android.os.Bundle
import androidx.activity.ComponentActivity
import androidx.activity.compose.setContent
import androidx.compose.material3.MaterialTheme
import {{package}}.ui.screens.{{pascal_case function_name}}

class MainActivity : ComponentActivity() {
    override fun onCreate(savedInstanceState: Bundle?) {
        super.onCreate(savedInstanceState)
        setContent {
            MaterialTheme {
{{indent call 16}}
            }
        }
    }
}
"#;

/// Template engine using Handlebars.
///
/// Output is Kotlin, so HTML escaping is disabled.
pub struct TemplateEngine<'a> {
    handlebars: Handlebars<'a>,
}

impl<'a> TemplateEngine<'a> {
    /// Create an engine with the built-in file templates registered.
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(no_escape);
        handlebars.set_strict_mode(true);
        Self::register_helpers(&mut handlebars);

        let mut engine = Self { handlebars };
        engine.register_template(COMPOSABLE_FILE, COMPOSABLE_FILE_TEMPLATE)?;
        engine.register_template(MAIN_ACTIVITY, MAIN_ACTIVITY_TEMPLATE)?;
        Ok(engine)
    }

    /// Register a template.
    pub fn register_template(&mut self, name: &str, template: &str) -> Result<()> {
        self.handlebars
            .register_template_string(name, template)
            .map_err(CodegenError::InvalidTemplate)
    }

    /// Render a registered template.
    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String> {
        self.handlebars
            .render(name, data)
            .map_err(CodegenError::TemplateError)
    }

    fn register_helpers(handlebars: &mut Handlebars) {
        handlebars.register_helper(
            "pascal_case",
            Box::new(
                |h: &Helper, _: &Handlebars, _: &Context, _: &mut RenderContext, out: &mut dyn Output| {
                    let param = h.param(0).and_then(|v| v.value().as_str()).unwrap_or("");
                    out.write(&to_pascal_case(param))?;
                    Ok(())
                },
            ),
        );

        // Indent every non-blank line of a block.
        handlebars.register_helper(
            "indent",
            Box::new(
                |h: &Helper, _: &Handlebars, _: &Context, _: &mut RenderContext, out: &mut dyn Output| {
                    let content = h
                        .param(0)
                        .and_then(|v| v.value().as_str())
                        .ok_or(RenderErrorReason::ParamNotFoundForIndex("indent", 0))?;
                    let spaces = h.param(1).and_then(|v| v.value().as_u64()).unwrap_or(4) as usize;
                    out.write(&indent(content, spaces))?;
                    Ok(())
                },
            ),
        );
    }
}

/// Prefix every non-blank line with `spaces` spaces.
pub fn indent(content: &str, spaces: usize) -> String {
    let pad = " ".repeat(spaces);
    content
        .lines()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("{pad}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Convert to PascalCase.
pub fn to_pascal_case(s: &str) -> String {
    use convert_case::{Case, Casing};
    s.to_case(Case::Pascal)
}

/// Convert to camelCase.
pub fn to_camel_case(s: &str) -> String {
    use convert_case::{Case, Casing};
    s.to_case(Case::Camel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_case_helpers() {
        assert_eq!(to_pascal_case("info card"), "InfoCard");
        assert_eq!(to_camel_case("component-5"), "component5");
    }

    #[test]
    fn test_indent() {
        assert_eq!(indent("a\n\nb", 2), "  a\n\n  b");
    }

    #[test]
    fn test_render_without_escaping() {
        let engine = TemplateEngine::new().unwrap();
        let out = engine
            .render(
                MAIN_ACTIVITY,
                &json!({"package": "com.example.app", "function_name": "main screen", "call": "MainScreen(onAction = {})"}),
            )
            .unwrap();
        assert!(out.contains("import com.example.app.ui.screens.MainScreen"));
        assert!(out.contains("                MainScreen(onAction = {})"));
    }

    #[test]
    fn test_strict_mode_reports_missing_fields() {
        let engine = TemplateEngine::new().unwrap();
        assert!(engine.render(MAIN_ACTIVITY, &json!({"package": "x"})).is_err());
    }
}
