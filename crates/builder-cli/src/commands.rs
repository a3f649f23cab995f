//! Subcommand implementations. Output goes to the given writer; logs go to
//! stderr.

use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::json;
use tracing::{info, warn};

use builder_codegen::{CodeGenerator, ComposeGenerator};
use builder_core::{schema, ComponentType, PropertyValue};
use builder_export::{import_tree, DirectoryConfigStore, Publisher};
use builder_tree::{DesignTree, TemplateRegistry};

use crate::config::{Command, Config};

pub fn run(command: &Command, config: &Config, out: &mut dyn Write) -> Result<()> {
    match command {
        Command::Generate { input, stdout } => generate(input, *stdout, config, out),
        Command::Validate { input } => validate(input, out),
        Command::Publish { input } => publish(input, config, out),
        Command::Schema {
            component_type,
            check,
        } => schema_command(component_type.as_deref(), check, out),
    }
}

/// Read a file, or stdin for `-`.
fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        return Ok(text);
    }
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn load_tree(path: &Path) -> Result<DesignTree> {
    let text = read_input(path)?;
    import_tree(&text).with_context(|| format!("{} is not a valid design", path.display()))
}

pub fn generate(input: &Path, stdout: bool, config: &Config, out: &mut dyn Write) -> Result<()> {
    let tree = load_tree(input)?;
    let templates = TemplateRegistry::new();
    let generator = ComposeGenerator::with_options(config.generate_options())?;

    if stdout {
        let source = generator.generate_screen(&tree, &templates)?;
        out.write_all(source.as_bytes())?;
        return Ok(());
    }

    let project = generator.generate_project(&tree, &templates)?;
    if project.placeholders > 0 {
        warn!(
            count = project.placeholders,
            "some components were emitted as placeholder comments"
        );
    }
    for file in &project.files {
        let path = config.output_dir.join(&file.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, &file.content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        writeln!(out, "{}", path.display())?;
    }
    info!(
        files = project.files.len(),
        output_dir = %config.output_dir.display(),
        framework = generator.framework_name(),
        "project generated"
    );
    Ok(())
}

pub fn validate(input: &Path, out: &mut dyn Write) -> Result<()> {
    let tree = load_tree(input)?;
    let unknown = tree
        .components()
        .filter(|c| matches!(c.component_type, ComponentType::Unknown(_)))
        .count();
    writeln!(
        out,
        "{}: {} components, {} unknown",
        input.display(),
        tree.len(),
        unknown
    )?;
    Ok(())
}

pub fn publish(input: &Path, config: &Config, out: &mut dyn Write) -> Result<()> {
    let tree = load_tree(input)?;
    let store = DirectoryConfigStore::new(&config.store_dir);
    let publisher = Publisher::new(&store, config.credentials.clone());
    let receipt = publisher
        .publish(&tree, &config.remote_key)
        .context("Publish failed")?;
    writeln!(out, "{}", serde_json::to_string_pretty(&receipt)?)?;
    Ok(())
}

pub fn schema_command(
    component_type: Option<&str>,
    checks: &[String],
    out: &mut dyn Write,
) -> Result<()> {
    let Some(name) = component_type else {
        if !checks.is_empty() {
            bail!("--check needs a component type");
        }
        let all: serde_json::Map<_, _> = ComponentType::palette()
            .iter()
            .map(|ty| (ty.as_str().to_string(), describe(ty)))
            .collect();
        writeln!(out, "{}", serde_json::to_string_pretty(&all)?)?;
        return Ok(());
    };

    let ty = ComponentType::from(name);
    if let ComponentType::Unknown(raw) = &ty {
        bail!("Unknown component type '{raw}'");
    }
    if checks.is_empty() {
        writeln!(out, "{}", serde_json::to_string_pretty(&describe(&ty))?)?;
        return Ok(());
    }

    let mut failed = 0;
    for check in checks {
        let (property, raw) = check
            .split_once('=')
            .with_context(|| format!("Expected NAME=VALUE, got '{check}'"))?;
        let value = schema::normalize_value(&ty, property, parse_value(raw));
        match schema::validate_value(&ty, property, &value) {
            Ok(()) => writeln!(out, "{property}: ok")?,
            Err(err) => {
                failed += 1;
                writeln!(out, "{property}: {err}")?;
            }
        }
    }
    if failed > 0 {
        bail!("{failed} of {} values rejected", checks.len());
    }
    Ok(())
}

/// JSON literals keep their type; anything else is a string.
fn parse_value(raw: &str) -> PropertyValue {
    serde_json::from_str::<serde_json::Value>(raw)
        .ok()
        .and_then(|v| PropertyValue::try_from(v).ok())
        .unwrap_or_else(|| PropertyValue::String(raw.to_string()))
}

fn describe(ty: &ComponentType) -> serde_json::Value {
    let properties: Vec<_> = schema::descriptors(ty)
        .into_iter()
        .map(|d| {
            let mut entry = json!({
                "name": d.name,
                "label": d.label,
                "kind": d.kind.name(),
            });
            if let Some(default) = d.default.to_value() {
                entry["default"] = json!(default);
            }
            if !d.choices.is_empty() {
                entry["choices"] = json!(d.choices);
            }
            entry
        })
        .collect();
    json!({
        "container": ty.is_container(),
        "properties": properties,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("16"), PropertyValue::Number(16.0));
        assert_eq!(parse_value("true"), PropertyValue::Boolean(true));
        assert_eq!(parse_value("Bold"), PropertyValue::String("Bold".into()));
        assert_eq!(parse_value("\"16\""), PropertyValue::String("16".into()));
    }

    #[test]
    fn test_schema_checks() {
        let mut out = Vec::new();
        let checks = vec!["fontSize=20sp".to_string(), "fontWeight=Bold".to_string()];
        schema_command(Some("Text"), &checks, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "fontSize: ok\nfontWeight: ok\n");

        let mut out = Vec::new();
        let checks = vec!["fontWeight=Heavy".to_string()];
        assert!(schema_command(Some("Text"), &checks, &mut out).is_err());
        assert!(String::from_utf8(out).unwrap().starts_with("fontWeight: "));
    }

    #[test]
    fn test_schema_unknown_type() {
        let mut out = Vec::new();
        assert!(schema_command(Some("Carousel"), &[], &mut out).is_err());
    }

    #[test]
    fn test_schema_listing() {
        let mut out = Vec::new();
        schema_command(None, &[], &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["Column"]["container"], true);
        assert_eq!(value["Text"]["properties"][0]["name"], "text");
    }
}
