//! Kotlin Compose code generator.
//!
//! Generation is a pure function of the tree, the template registry and the
//! options: the tree is walked depth-first in child order, imports are
//! collected in a sorted set, and nothing depends on hash iteration order.

use std::collections::BTreeSet;

use serde_json::json;
use tracing::{debug, warn};

use builder_core::{schema, ComponentId, ComponentType, DesignComponent, SlotRole};
use builder_tree::{CustomComponentTemplate, DesignTree, TemplateRegistry};

use super::templates::{to_camel_case, to_pascal_case, TemplateEngine, COMPOSABLE_FILE, MAIN_ACTIVITY};
use super::{CodeGenerator, GenerateOptions, GeneratedFile, GeneratedProject, GenerationMode};
use crate::error::{CodegenError, Result};
use crate::kotlin;
use crate::modifiers::{self, modifier_calls, render_chain};

/// Kotlin Compose code generator.
pub struct ComposeGenerator<'a> {
    engine: TemplateEngine<'a>,
    options: GenerateOptions,
}

impl<'a> ComposeGenerator<'a> {
    /// Create a generator with default options.
    pub fn new() -> Result<Self> {
        Self::with_options(GenerateOptions::default())
    }

    /// Create a generator with custom options.
    pub fn with_options(options: GenerateOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            engine: TemplateEngine::new()?,
            options,
        })
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    fn screen_name(&self) -> String {
        to_pascal_case(&self.options.function_name)
    }

    fn screen_package(&self) -> String {
        format!("{}.ui.screens", self.options.package_name)
    }

    fn components_package(&self) -> String {
        format!("{}.ui.components", self.options.package_name)
    }

    fn event_driven(&self) -> bool {
        self.options.mode == GenerationMode::EventDriven
    }

    /// Generate the screen and return it with the ids of the templates it
    /// references.
    fn screen_file<'t>(
        &'t self,
        tree: &'t DesignTree,
        templates: &'t TemplateRegistry,
    ) -> Result<(String, Emitter<'t>)> {
        let root = tree.root().ok_or(CodegenError::EmptyTree)?;
        let mut emitter = Emitter::new(tree, templates, &self.options);
        emitter.emit(root, 1, &Chain::default());

        let name = self.screen_name();
        let params = if self.event_driven() {
            "onAction: (String) -> Unit"
        } else {
            ""
        };
        let preview_args = if self.event_driven() { "onAction = {}" } else { "" };
        let content = self.render_composable(
            &self.screen_package(),
            &name,
            params,
            &mut emitter,
            preview_args,
        )?;
        Ok((content, emitter))
    }

    /// Generate the file for a custom component template.
    fn template_file<'t>(
        &'t self,
        template: &CustomComponentTemplate,
        templates: &'t TemplateRegistry,
        tree: &'t DesignTree,
    ) -> Result<(String, Emitter<'t>)> {
        let mut emitter = Emitter::new(tree, templates, &self.options);
        let root_chain = Chain {
            base: "modifier",
            head: Vec::new(),
            always: true,
        };
        emitter.emit(&template.root_component_id, 1, &root_chain);
        emitter.imports.insert(kotlin::MODIFIER.to_string());

        let mut params = String::from("modifier: Modifier = Modifier");
        if self.event_driven() {
            params.push_str(", onAction: (String) -> Unit = {}");
        }
        let content = self.render_composable(
            &self.components_package(),
            &component_function_name(template),
            &params,
            &mut emitter,
            "",
        )?;
        Ok((content, emitter))
    }

    fn render_composable(
        &self,
        package: &str,
        function_name: &str,
        params: &str,
        emitter: &mut Emitter<'_>,
        preview_args: &str,
    ) -> Result<String> {
        emitter.imports.insert(kotlin::COMPOSABLE.to_string());
        let preview = if self.options.include_preview {
            emitter.imports.insert(kotlin::PREVIEW.to_string());
            format!(
                "\n@Preview(showBackground = true)\n@Composable\nfun {function_name}Preview() {{\n    {function_name}({preview_args})\n}}\n"
            )
        } else {
            String::new()
        };
        let annotations = if emitter.opt_in {
            "@OptIn(ExperimentalMaterial3Api::class)\n@Composable\n"
        } else {
            "@Composable\n"
        };
        let imports = emitter
            .imports
            .iter()
            .map(|i| format!("import {i}"))
            .collect::<Vec<_>>()
            .join("\n");

        self.engine.render(
            COMPOSABLE_FILE,
            &json!({
                "package": package,
                "imports": imports,
                "annotations": annotations,
                "function_name": function_name,
                "params": params,
                "body": emitter.lines.join("\n"),
                "preview": preview,
            }),
        )
    }

    fn main_activity(&self) -> Result<String> {
        let name = self.screen_name();
        let call = if self.event_driven() {
            format!("{name}(onAction = {{ }})")
        } else {
            format!("{name}()")
        };
        self.engine.render(
            MAIN_ACTIVITY,
            &json!({
                "package": self.options.package_name,
                "function_name": name,
                "call": call,
            }),
        )
    }
}

impl CodeGenerator for ComposeGenerator<'_> {
    fn framework_name(&self) -> &'static str {
        "Jetpack Compose"
    }

    fn generate_screen(&self, tree: &DesignTree, templates: &TemplateRegistry) -> Result<String> {
        let (content, emitter) = self.screen_file(tree, templates)?;
        if emitter.placeholders > 0 {
            warn!(count = emitter.placeholders, "screen generated with placeholders");
        }
        Ok(content)
    }

    fn generate_project(
        &self,
        tree: &DesignTree,
        templates: &TemplateRegistry,
    ) -> Result<GeneratedProject> {
        let base = self.options.package_path();
        let mut project = GeneratedProject::default();

        let (screen, emitter) = self.screen_file(tree, templates)?;
        project.placeholders += emitter.placeholders;
        project.files.push(GeneratedFile {
            path: format!("{base}/ui/screens/{}.kt", self.screen_name()),
            content: screen,
        });

        // Templates can reference other templates; generate the closure.
        let mut pending: BTreeSet<String> = emitter.referenced;
        let mut done: BTreeSet<String> = BTreeSet::new();
        while let Some(template_id) = pending.pop_first() {
            if !done.insert(template_id.clone()) {
                continue;
            }
            let Some(template) = templates.get(&template_id) else {
                continue;
            };
            let template_tree = DesignTree::from_components(template.component_tree.iter().cloned())?;
            let (content, emitter) = self.template_file(template, templates, &template_tree)?;
            project.placeholders += emitter.placeholders;
            pending.extend(emitter.referenced.into_iter().filter(|id| !done.contains(id)));
            project.files.push(GeneratedFile {
                path: format!("{base}/ui/components/{}.kt", component_function_name(template)),
                content,
            });
        }

        project.files.push(GeneratedFile {
            path: format!("{base}/MainActivity.kt"),
            content: self.main_activity()?,
        });

        debug!(
            files = project.files.len(),
            placeholders = project.placeholders,
            "compose project generated"
        );
        Ok(project)
    }
}

/// Kotlin function name of a template's composable.
pub fn component_function_name(template: &CustomComponentTemplate) -> String {
    let name = to_pascal_case(&template.name);
    if kotlin::is_identifier(&name) {
        name
    } else {
        format!("Template{}", to_pascal_case(&template.id))
    }
}

/// How a node's modifier chain starts.
#[derive(Debug, Clone)]
struct Chain {
    /// `Modifier`, or `modifier` for a template root.
    base: &'static str,
    /// Calls placed before the node's own modifiers.
    head: Vec<String>,
    /// Pass the base even when the chain is empty.
    always: bool,
}

impl Default for Chain {
    fn default() -> Self {
        Self {
            base: "Modifier",
            head: Vec::new(),
            always: false,
        }
    }
}

/// Walks one tree and accumulates Kotlin source lines.
struct Emitter<'t> {
    tree: &'t DesignTree,
    templates: &'t TemplateRegistry,
    options: &'t GenerateOptions,
    lines: Vec<String>,
    imports: BTreeSet<String>,
    /// Template ids referenced by the emitted code.
    referenced: BTreeSet<String>,
    opt_in: bool,
    placeholders: usize,
}

impl<'t> Emitter<'t> {
    fn new(tree: &'t DesignTree, templates: &'t TemplateRegistry, options: &'t GenerateOptions) -> Self {
        Self {
            tree,
            templates,
            options,
            lines: Vec::new(),
            imports: BTreeSet::new(),
            referenced: BTreeSet::new(),
            opt_in: false,
            placeholders: 0,
        }
    }

    fn line(&mut self, depth: usize, text: impl AsRef<str>) {
        self.lines.push(format!("{}{}", "    ".repeat(depth), text.as_ref()));
    }

    fn uses(&mut self, import: &str) {
        self.imports.insert(import.to_string());
    }

    fn placeholder(&mut self, depth: usize, text: String) {
        warn!(placeholder = %text, "emitting placeholder");
        self.placeholders += 1;
        self.line(depth, format!("// {}", kotlin::comment_text(&text)));
    }

    /// Body of a click handler for `node`.
    fn handler(&self, node: &DesignComponent) -> String {
        let action = node
            .properties
            .get_str("onClickAction")
            .filter(|a| !a.is_empty())
            .unwrap_or(node.id.as_str());
        match self.options.mode {
            GenerationMode::Static => format!("/* action: {} */", kotlin::comment_text(action)),
            GenerationMode::EventDriven => format!("onAction({})", kotlin::string(action)),
        }
    }

    /// `modifier = ...` argument, if the node has any modifiers.
    fn modifier_arg(&mut self, node: &DesignComponent, chain: &Chain) -> Option<String> {
        let click = self.handler(node);
        let calls = modifier_calls(node, &click, &mut self.imports);
        let rendered = match render_chain(chain.base, &chain.head, &calls) {
            Some(rendered) => rendered,
            None if chain.always => chain.base.to_string(),
            None => return None,
        };
        if chain.base == "Modifier" {
            self.uses(kotlin::MODIFIER);
        }
        if !chain.head.is_empty() {
            self.uses(kotlin::LAYOUT);
        }
        Some(format!("modifier = {rendered}"))
    }

    /// A choice property that differs from its default and is one of the
    /// allowed values.
    fn choice<'n>(&self, node: &'n DesignComponent, name: &str) -> Option<&'n str> {
        let value = node.properties.get(name)?;
        if schema::is_default(&node.component_type, name, value) {
            return None;
        }
        if let Err(err) = schema::validate_value(&node.component_type, name, value) {
            warn!(id = %node.id, error = %err, "ignoring invalid property");
            return None;
        }
        value.as_str()
    }

    fn text_of(node: &DesignComponent, name: &str) -> String {
        node.properties
            .get(name)
            .and_then(|v| v.to_text())
            .or_else(|| schema::default_value(&node.component_type, name).and_then(|v| v.to_text()))
            .unwrap_or_default()
    }

    /// Local state variable name derived from the node id.
    fn state_name(node: &DesignComponent, suffix: &str) -> String {
        let words: String = node
            .id
            .as_str()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
            .collect();
        let mut name = to_camel_case(&words);
        if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
            name.insert(0, 'n');
        }
        format!("{name}{suffix}")
    }

    fn emit(&mut self, id: &ComponentId, depth: usize, chain: &Chain) {
        let tree = self.tree;
        let Some(node) = tree.get(id) else {
            self.placeholder(depth, format!("Missing component {id}"));
            return;
        };
        use ComponentType as CT;
        match &node.component_type {
            CT::Text => self.text(node, depth, chain),
            CT::Button => self.button(node, depth, chain),
            CT::Image => self.image(node, depth, chain),
            CT::Icon => self.icon(node, depth, chain),
            CT::TextField => self.text_field(node, depth, chain),
            CT::Switch => self.toggle(node, depth, chain, "Switch"),
            CT::Checkbox => self.toggle(node, depth, chain, "Checkbox"),
            CT::Divider => self.divider(node, depth, chain),
            CT::Spacer => self.spacer(node, depth, chain),
            CT::Column | CT::LazyColumn => {
                let args = self.column_args(node);
                let lazy = node.component_type == CT::LazyColumn;
                if lazy {
                    self.uses(kotlin::LAZY_COLUMN);
                }
                self.container(node, depth, chain, node.component_type.as_str(), args, lazy);
            }
            CT::Row | CT::LazyRow => {
                let args = self.row_args(node);
                let lazy = node.component_type == CT::LazyRow;
                if lazy {
                    self.uses(kotlin::LAZY_ROW);
                }
                self.container(node, depth, chain, node.component_type.as_str(), args, lazy);
            }
            CT::Box => {
                let mut args = Vec::new();
                if let Some(a) = self.choice(node, "contentAlignment") {
                    args.push(format!("contentAlignment = Alignment.{a}"));
                    self.uses(kotlin::ALIGNMENT);
                }
                self.container(node, depth, chain, "Box", args, false);
            }
            CT::Card => {
                let mut args = Vec::new();
                if let Some(e) = modifiers::number(node, "elevation") {
                    args.push(format!(
                        "elevation = CardDefaults.cardElevation(defaultElevation = {})",
                        kotlin::dp(e)
                    ));
                    self.uses(kotlin::DP);
                }
                if let Some(c) = node.properties.get_color("containerColor") {
                    args.push(format!(
                        "colors = CardDefaults.cardColors(containerColor = {})",
                        kotlin::color(c)
                    ));
                    self.uses(kotlin::COLOR);
                }
                self.uses(kotlin::MATERIAL);
                self.container(node, depth, chain, "Card", args, false);
            }
            CT::Scaffold => self.scaffold(node, depth, chain),
            CT::TopAppBar => self.top_app_bar(node, depth, chain),
            CT::BottomAppBar => {
                let mut args = Vec::new();
                if let Some(c) = node.properties.get_color("containerColor") {
                    args.push(format!("containerColor = {}", kotlin::color(c)));
                    self.uses(kotlin::COLOR);
                }
                self.uses(kotlin::MATERIAL);
                self.container(node, depth, chain, "BottomAppBar", args, false);
            }
            CT::Custom => self.custom(node, depth, chain),
            CT::Unknown(tag) => {
                self.placeholder(depth, format!("Unsupported component: {tag} ({})", node.id));
            }
        }
    }

    fn leaf(&mut self, depth: usize, name: &str, args: Vec<String>) {
        self.uses(kotlin::MATERIAL);
        self.line(depth, format!("{name}({})", args.join(", ")));
    }

    fn text(&mut self, node: &DesignComponent, depth: usize, chain: &Chain) {
        let mut args = vec![kotlin::string(&Self::text_of(node, "text"))];
        if let Some(size) = modifiers::number(node, "fontSize") {
            args.push(format!("fontSize = {}", kotlin::sp(size)));
            self.uses(kotlin::SP);
        }
        if let Some(weight) = self.choice(node, "fontWeight") {
            args.push(format!("fontWeight = FontWeight.{weight}"));
            self.uses(kotlin::FONT_WEIGHT);
        }
        if let Some(color) = node.properties.get_color("textColor") {
            args.push(format!("color = {}", kotlin::color(color)));
            self.uses(kotlin::COLOR);
        }
        if let Some(align) = self.choice(node, "textAlign") {
            args.push(format!("textAlign = TextAlign.{align}"));
            self.uses(kotlin::TEXT_ALIGN);
        }
        if let Some(lines) = modifiers::number(node, "maxLines").filter(|n| *n >= 1.0) {
            args.push(format!("maxLines = {}", lines as i64));
        }
        args.extend(self.modifier_arg(node, chain));
        self.leaf(depth, "Text", args);
    }

    fn button(&mut self, node: &DesignComponent, depth: usize, chain: &Chain) {
        let mut args = vec![format!("onClick = {{ {} }}", self.handler(node))];
        if node.properties.get_bool("enabled") == Some(false) {
            args.push("enabled = false".to_string());
        }
        let colors: Vec<String> = ["containerColor", "contentColor"]
            .into_iter()
            .filter_map(|name| {
                node.properties
                    .get_color(name)
                    .map(|c| format!("{name} = {}", kotlin::color(c)))
            })
            .collect();
        if !colors.is_empty() {
            args.push(format!("colors = ButtonDefaults.buttonColors({})", colors.join(", ")));
            self.uses(kotlin::COLOR);
        }
        args.extend(self.modifier_arg(node, chain));
        self.uses(kotlin::MATERIAL);
        self.line(depth, format!("Button({}) {{", args.join(", ")));
        self.line(depth + 1, format!("Text({})", kotlin::string(&Self::text_of(node, "text"))));
        self.line(depth, "}");
    }

    fn image(&mut self, node: &DesignComponent, depth: usize, chain: &Chain) {
        let src = node.properties.get_str("src").unwrap_or_default();
        let description = node
            .properties
            .get_str("contentDescription")
            .filter(|d| !d.is_empty())
            .map_or_else(|| "null".to_string(), kotlin::string);

        let (name, mut args) = if src.starts_with("http://") || src.starts_with("https://") {
            self.uses(kotlin::ASYNC_IMAGE);
            ("AsyncImage", vec![format!("model = {}", kotlin::string(src))])
        } else {
            let resource = if src.is_empty() {
                "placeholder".to_string()
            } else {
                kotlin::resource_name(src)
            };
            self.uses(kotlin::IMAGE);
            self.uses(kotlin::PAINTER_RESOURCE);
            self.uses(&format!("{}.R", self.options.package_name));
            (
                "Image",
                vec![format!("painter = painterResource(id = R.drawable.{resource})")],
            )
        };
        args.push(format!("contentDescription = {description}"));
        if let Some(scale) = self.choice(node, "contentScale") {
            args.push(format!("contentScale = ContentScale.{scale}"));
            self.uses(kotlin::CONTENT_SCALE);
        }
        args.extend(self.modifier_arg(node, chain));
        self.line(depth, format!("{name}({})", args.join(", ")));
    }

    fn icon(&mut self, node: &DesignComponent, depth: usize, chain: &Chain) {
        let icon = node
            .properties
            .get_str("icon")
            .filter(|i| schema::ICONS.contains(i))
            .unwrap_or("Favorite");
        let description = node
            .properties
            .get_str("contentDescription")
            .filter(|d| !d.is_empty())
            .map_or_else(|| "null".to_string(), kotlin::string);
        let mut args = vec![
            format!("imageVector = Icons.Default.{icon}"),
            format!("contentDescription = {description}"),
        ];
        if let Some(tint) = node.properties.get_color("tint") {
            args.push(format!("tint = {}", kotlin::color(tint)));
            self.uses(kotlin::COLOR);
        }
        args.extend(self.modifier_arg(node, chain));
        self.uses(kotlin::ICONS);
        self.uses(kotlin::ICONS_FILLED);
        self.leaf(depth, "Icon", args);
    }

    fn text_field(&mut self, node: &DesignComponent, depth: usize, chain: &Chain) {
        let state = Self::state_name(node, "Text");
        let initial = node.properties.get_str("value").unwrap_or_default();
        self.uses(kotlin::RUNTIME_STATE);
        self.line(
            depth,
            format!("var {state} by remember {{ mutableStateOf({}) }}", kotlin::string(initial)),
        );

        let mut args = vec![
            format!("value = {state}"),
            format!("onValueChange = {{ {state} = it }}"),
        ];
        for slot in ["label", "placeholder"] {
            if let Some(text) = node.properties.get_str(slot).filter(|t| !t.is_empty()) {
                args.push(format!("{slot} = {{ Text({}) }}", kotlin::string(text)));
            }
        }
        if node.properties.get_bool("singleLine") == Some(true) {
            args.push("singleLine = true".to_string());
        }
        args.extend(self.modifier_arg(node, chain));
        self.leaf(depth, "OutlinedTextField", args);
    }

    fn toggle(&mut self, node: &DesignComponent, depth: usize, chain: &Chain, name: &str) {
        let state = Self::state_name(node, "Checked");
        let initial = node.properties.get_bool("checked").unwrap_or(false);
        self.uses(kotlin::RUNTIME_STATE);
        self.line(depth, format!("var {state} by remember {{ mutableStateOf({initial}) }}"));

        let mut args = vec![
            format!("checked = {state}"),
            format!("onCheckedChange = {{ {state} = it }}"),
        ];
        args.extend(self.modifier_arg(node, chain));
        self.leaf(depth, name, args);
    }

    fn divider(&mut self, node: &DesignComponent, depth: usize, chain: &Chain) {
        let vertical = node
            .parent_id
            .as_ref()
            .and_then(|p| self.tree.get(p))
            .is_some_and(|p| p.component_type.is_horizontal());
        let mut args = Vec::new();
        if let Some(t) = modifiers::number(node, "thickness") {
            args.push(format!("thickness = {}", kotlin::dp(t)));
            self.uses(kotlin::DP);
        }
        if let Some(c) = node.properties.get_color("color") {
            args.push(format!("color = {}", kotlin::color(c)));
            self.uses(kotlin::COLOR);
        }
        args.extend(self.modifier_arg(node, chain));
        let name = if vertical { "VerticalDivider" } else { "HorizontalDivider" };
        self.leaf(depth, name, args);
    }

    fn spacer(&mut self, node: &DesignComponent, depth: usize, chain: &Chain) {
        let forced = Chain {
            always: true,
            ..chain.clone()
        };
        let arg = self.modifier_arg(node, &forced).unwrap_or_default();
        self.uses(kotlin::MODIFIER);
        self.uses(kotlin::LAYOUT);
        self.line(depth, format!("Spacer({arg})"));
    }

    fn arrangement(node: &DesignComponent, choice: Option<&str>) -> Option<String> {
        if let Some(spacing) = modifiers::number(node, "spacing").filter(|s| *s > 0.0) {
            return Some(format!("Arrangement.spacedBy({})", kotlin::dp(spacing)));
        }
        choice.map(|c| format!("Arrangement.{c}"))
    }

    fn column_args(&mut self, node: &DesignComponent) -> Vec<String> {
        let mut args = Vec::new();
        let choice = self.choice(node, "verticalArrangement");
        if let Some(arrangement) = Self::arrangement(node, choice) {
            args.push(format!("verticalArrangement = {arrangement}"));
            self.uses(kotlin::DP);
        }
        if let Some(a) = self.choice(node, "horizontalAlignment") {
            args.push(format!("horizontalAlignment = Alignment.{a}"));
            self.uses(kotlin::ALIGNMENT);
        }
        args
    }

    fn row_args(&mut self, node: &DesignComponent) -> Vec<String> {
        let mut args = Vec::new();
        let choice = self.choice(node, "horizontalArrangement");
        if let Some(arrangement) = Self::arrangement(node, choice) {
            args.push(format!("horizontalArrangement = {arrangement}"));
            self.uses(kotlin::DP);
        }
        if let Some(a) = self.choice(node, "verticalAlignment") {
            args.push(format!("verticalAlignment = Alignment.{a}"));
            self.uses(kotlin::ALIGNMENT);
        }
        args
    }

    fn container(
        &mut self,
        node: &DesignComponent,
        depth: usize,
        chain: &Chain,
        name: &str,
        args: Vec<String>,
        lazy: bool,
    ) {
        let mut all: Vec<String> = self.modifier_arg(node, chain).into_iter().collect();
        all.extend(args);
        self.uses(kotlin::LAYOUT);
        if all.is_empty() {
            self.line(depth, format!("{name} {{"));
        } else {
            self.line(depth, format!("{name}({}) {{", all.join(", ")));
        }

        let tree = self.tree;
        for child in tree.children(&node.id) {
            if lazy {
                self.line(depth + 1, "item {");
                self.emit(child, depth + 2, &Chain::default());
                self.line(depth + 1, "}");
            } else {
                self.emit(child, depth + 1, &Chain::default());
            }
        }
        self.line(depth, "}");
    }

    fn scaffold(&mut self, node: &DesignComponent, depth: usize, chain: &Chain) {
        let tree = self.tree;
        let mut top = None;
        let mut bottom = None;
        let mut content = None;
        let mut others = Vec::new();
        for child_id in tree.children(&node.id) {
            let Some(child) = tree.get(child_id) else {
                continue;
            };
            match (child.slot, &child.component_type) {
                (Some(SlotRole::TopBar), _) | (None, ComponentType::TopAppBar) if top.is_none() => {
                    top = Some(child_id)
                }
                (Some(SlotRole::BottomBar), _) | (None, ComponentType::BottomAppBar)
                    if bottom.is_none() =>
                {
                    bottom = Some(child_id)
                }
                (Some(SlotRole::Content), _) if content.is_none() => content = Some(child_id),
                _ => others.push(child_id),
            }
        }

        self.uses(kotlin::MATERIAL);
        let open = self.lines.len();
        self.line(depth, "Scaffold(");
        if let Some(top) = top {
            self.line(depth + 1, "topBar = {");
            self.emit(top, depth + 2, &Chain::default());
            self.line(depth + 1, "},");
        }
        if let Some(bottom) = bottom {
            self.line(depth + 1, "bottomBar = {");
            self.emit(bottom, depth + 2, &Chain::default());
            self.line(depth + 1, "},");
        }
        if let Some(c) = node.properties.get_color("containerColor") {
            self.line(depth + 1, format!("containerColor = {},", kotlin::color(c)));
            self.uses(kotlin::COLOR);
        }
        if let Some(arg) = self.modifier_arg(node, chain) {
            self.line(depth + 1, format!("{arg},"));
        }
        if self.lines.len() == open + 1 {
            self.lines.truncate(open);
            self.line(depth, "Scaffold { innerPadding ->");
        } else {
            self.line(depth, ") { innerPadding ->");
        }

        let inner = Chain {
            head: vec!["padding(innerPadding)".to_string()],
            ..Chain::default()
        };
        match content {
            Some(content) => {
                self.emit(content, depth + 1, &inner);
                for other in others {
                    self.emit(other, depth + 1, &Chain::default());
                }
            }
            None if !others.is_empty() => {
                self.uses(kotlin::MODIFIER);
                self.uses(kotlin::LAYOUT);
                self.line(depth + 1, "Box(modifier = Modifier.padding(innerPadding)) {");
                for other in others {
                    self.emit(other, depth + 2, &Chain::default());
                }
                self.line(depth + 1, "}");
            }
            None => {}
        }
        self.line(depth, "}");
    }

    fn top_app_bar(&mut self, node: &DesignComponent, depth: usize, chain: &Chain) {
        self.opt_in = true;
        self.uses(kotlin::MATERIAL);
        self.line(depth, "TopAppBar(");
        self.line(
            depth + 1,
            format!("title = {{ Text({}) }},", kotlin::string(&Self::text_of(node, "title"))),
        );
        let tree = self.tree;
        let children = tree.children(&node.id);
        if !children.is_empty() {
            self.line(depth + 1, "actions = {");
            for child in children {
                self.emit(child, depth + 2, &Chain::default());
            }
            self.line(depth + 1, "},");
        }
        if let Some(c) = node.properties.get_color("containerColor") {
            self.line(
                depth + 1,
                format!("colors = TopAppBarDefaults.topAppBarColors(containerColor = {}),", kotlin::color(c)),
            );
            self.uses(kotlin::COLOR);
        }
        if let Some(arg) = self.modifier_arg(node, chain) {
            self.line(depth + 1, format!("{arg},"));
        }
        self.line(depth, ")");
    }

    fn custom(&mut self, node: &DesignComponent, depth: usize, chain: &Chain) {
        let Some(template_id) = node.template_id_ref.as_deref() else {
            self.placeholder(depth, format!("Custom component {} has no template", node.id));
            return;
        };
        let templates = self.templates;
        let Some(template) = templates.get(template_id) else {
            self.placeholder(depth, format!("Missing template {template_id} ({})", node.name));
            return;
        };

        let name = component_function_name(template);
        let mut args: Vec<String> = self.modifier_arg(node, chain).into_iter().collect();
        if self.options.mode == GenerationMode::EventDriven {
            args.push("onAction = onAction".to_string());
        }
        self.referenced.insert(template_id.to_string());
        self.uses(&format!("{}.ui.components.{name}", self.options.package_name));
        self.line(depth, format!("{name}({})", args.join(", ")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use builder_core::Properties;

    fn generate(tree: &DesignTree) -> String {
        ComposeGenerator::new()
            .unwrap()
            .generate_screen(tree, &TemplateRegistry::new())
            .unwrap()
    }

    #[test]
    fn test_scaffold_structure() {
        let tree = DesignTree::with_scaffold();
        let code = generate(&tree);
        assert!(code.contains("@OptIn(ExperimentalMaterial3Api::class)"));
        assert!(code.contains("fun MainScreen() {"));
        assert!(code.contains("topBar = {"));
        assert!(code.contains("TopAppBar("));
        assert!(code.contains("title = { Text(\"Title\") },"));
        assert!(code.contains("bottomBar = {"));
        assert!(code.contains(") { innerPadding ->"));
        assert!(code.contains("Column(modifier = Modifier.padding(innerPadding).fillMaxSize()) {"));
    }

    #[test]
    fn test_imports_sorted_and_unique() {
        let mut tree = DesignTree::with_scaffold();
        tree.add(ComponentType::Text, "content", None).unwrap();
        tree.add(ComponentType::Text, "content", None).unwrap();
        let code = generate(&tree);
        let imports: Vec<&str> = code.lines().filter(|l| l.starts_with("import ")).collect();
        let mut sorted = imports.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(imports, sorted);
        assert!(imports.contains(&"import androidx.compose.ui.Modifier"));
    }

    #[test]
    fn test_event_driven_handlers() {
        let mut tree = DesignTree::with_scaffold();
        tree.add_with(
            ComponentType::Button,
            "content",
            None,
            Properties::new().with("text", "Sign in").with("onClickAction", "login"),
        )
        .unwrap();

        let options = GenerateOptions::default().with_mode(GenerationMode::EventDriven);
        let code = ComposeGenerator::with_options(options)
            .unwrap()
            .generate_screen(&tree, &TemplateRegistry::new())
            .unwrap();
        assert!(code.contains("fun MainScreen(onAction: (String) -> Unit) {"));
        assert!(code.contains("Button(onClick = { onAction(\"login\") }) {"));
        assert!(code.contains("Text(\"Sign in\")"));
        assert!(code.contains("MainScreen(onAction = {})"));

        let code = generate(&tree);
        assert!(code.contains("Button(onClick = { /* action: login */ }) {"));
    }

    #[test]
    fn test_unknown_type_placeholder() {
        let mut components: Vec<DesignComponent> =
            DesignTree::with_scaffold().preorder().into_iter().cloned().collect();
        let content = components.iter_mut().find(|c| c.id.as_str() == "content").unwrap();
        content.children.push("x".into());
        components.push(
            DesignComponent::new("x", ComponentType::from("Carousel"), "Carousel").with_parent("content"),
        );
        let tree = DesignTree::from_components(components).unwrap();

        let code = generate(&tree);
        assert!(code.contains("// Unsupported component: Carousel (x)"));
    }

    #[test]
    fn test_missing_template_placeholder() {
        let mut tree = DesignTree::with_scaffold();
        tree.add_template_ref("template-4", "Promo", "content", None).unwrap();
        let code = generate(&tree);
        assert!(code.contains("// Missing template template-4 (Promo)"));
    }

    #[test]
    fn test_string_escaping_in_output() {
        let mut tree = DesignTree::with_scaffold();
        tree.add_with(
            ComponentType::Text,
            "content",
            None,
            Properties::new().with("text", "Price: $5 \"now\""),
        )
        .unwrap();
        let code = generate(&tree);
        assert!(code.contains(r#"Text("Price: \$5 \"now\"")"#));
    }

    #[test]
    fn test_lazy_items_and_state() {
        let mut tree = DesignTree::with_scaffold();
        let list = tree.add(ComponentType::LazyColumn, "content", None).unwrap();
        let switch = tree.add(ComponentType::Switch, &list, None).unwrap();
        let code = generate(&tree);
        assert!(code.contains("LazyColumn {"));
        assert!(code.contains("item {"));
        let state = format!("{}Checked", to_camel_case(&switch.as_str().replace('-', " ")));
        assert!(code.contains(&format!("var {state} by remember {{ mutableStateOf(false) }}")));
        assert!(code.contains(&format!("Switch(checked = {state}, onCheckedChange = {{ {state} = it }})")));
    }

    #[test]
    fn test_empty_tree_is_error() {
        let generator = ComposeGenerator::new().unwrap();
        assert!(matches!(
            generator.generate_screen(&DesignTree::new(), &TemplateRegistry::new()),
            Err(CodegenError::EmptyTree)
        ));
    }

    #[test]
    fn test_invalid_options() {
        let options = GenerateOptions {
            package_name: "com..bad".to_string(),
            ..GenerateOptions::default()
        };
        assert!(matches!(
            ComposeGenerator::with_options(options),
            Err(CodegenError::InvalidOption { option: "package_name", .. })
        ));
    }
}
