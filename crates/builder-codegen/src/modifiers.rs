//! Modifier chain construction.
//!
//! Rules run in a fixed order so the same node always yields the same chain:
//! fill, width, height, padding, clip, background, border, clickable.
//! Absent and default-valued properties contribute nothing.
//!
//! Padding and corner radii are collapsed to the shortest Compose form
//! (uniform, then symmetric, then per side). This is a presentation
//! heuristic: several property combinations map to the same output.

use std::collections::BTreeSet;

use builder_core::{schema, DesignComponent};

use crate::kotlin;

/// Four edge values in Compose order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sides {
    pub start: f64,
    pub top: f64,
    pub end: f64,
    pub bottom: f64,
}

impl Sides {
    fn is_zero(&self) -> bool {
        self.start == 0.0 && self.top == 0.0 && self.end == 0.0 && self.bottom == 0.0
    }

    fn is_uniform(&self) -> bool {
        self.start == self.top && self.top == self.end && self.end == self.bottom
    }
}

/// Four corner radii.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Corners {
    pub top_start: f64,
    pub top_end: f64,
    pub bottom_end: f64,
    pub bottom_start: f64,
}

/// A number that differs from the schema default.
pub(crate) fn number(node: &DesignComponent, name: &str) -> Option<f64> {
    let value = node.properties.get(name)?;
    if schema::is_default(&node.component_type, name, value) {
        return None;
    }
    value.as_number()
}

pub(crate) fn flag(node: &DesignComponent, name: &str) -> bool {
    node.properties.get_bool(name).unwrap_or(false)
}

/// Effective padding: per-side values override the shared `padding`.
pub fn padding(node: &DesignComponent) -> Sides {
    let props = &node.properties;
    let base = props.get_number("padding").unwrap_or(0.0);
    let side = |name: &str| props.get_number(name).unwrap_or(base);
    Sides {
        start: side("paddingStart"),
        top: side("paddingTop"),
        end: side("paddingEnd"),
        bottom: side("paddingBottom"),
    }
}

/// Effective corner radii: per-corner values override `cornerRadius`.
pub fn corners(node: &DesignComponent) -> Corners {
    let props = &node.properties;
    let base = props.get_number("cornerRadius").unwrap_or(0.0);
    let corner = |name: &str| props.get_number(name).unwrap_or(base);
    Corners {
        top_start: corner("cornerRadiusTopStart"),
        top_end: corner("cornerRadiusTopEnd"),
        bottom_end: corner("cornerRadiusBottomEnd"),
        bottom_start: corner("cornerRadiusBottomStart"),
    }
}

/// `padding(...)` call for the given sides, or `None` when all are zero.
pub fn padding_call(sides: Sides) -> Option<String> {
    if sides.is_zero() {
        return None;
    }
    if sides.is_uniform() {
        return Some(format!("padding({})", kotlin::dp(sides.start)));
    }
    let named = |pairs: &[(&str, f64)]| {
        pairs
            .iter()
            .filter(|(_, v)| *v != 0.0)
            .map(|(name, v)| format!("{name} = {}", kotlin::dp(*v)))
            .collect::<Vec<_>>()
            .join(", ")
    };
    if sides.start == sides.end && sides.top == sides.bottom {
        let args = named(&[("horizontal", sides.start), ("vertical", sides.top)]);
        return Some(format!("padding({args})"));
    }
    let args = named(&[
        ("start", sides.start),
        ("top", sides.top),
        ("end", sides.end),
        ("bottom", sides.bottom),
    ]);
    Some(format!("padding({args})"))
}

/// `RoundedCornerShape(...)` for the given radii, or `None` when square.
pub fn shape(c: Corners) -> Option<String> {
    let all = [c.top_start, c.top_end, c.bottom_end, c.bottom_start];
    if all.iter().all(|v| *v == 0.0) {
        return None;
    }
    if all.iter().all(|v| *v == c.top_start) {
        return Some(format!("RoundedCornerShape({})", kotlin::dp(c.top_start)));
    }
    Some(format!(
        "RoundedCornerShape(topStart = {}, topEnd = {}, bottomEnd = {}, bottomStart = {})",
        kotlin::dp(c.top_start),
        kotlin::dp(c.top_end),
        kotlin::dp(c.bottom_end),
        kotlin::dp(c.bottom_start),
    ))
}

/// Build the ordered modifier calls for a node.
///
/// `click` is the body of the click handler, used when `clickable` is set.
pub fn modifier_calls(
    node: &DesignComponent,
    click: &str,
    imports: &mut BTreeSet<String>,
) -> Vec<String> {
    let mut calls = Vec::new();
    let mut uses = |import: &str| {
        imports.insert(import.to_string());
    };

    let fill_size = flag(node, "fillMaxSize");
    let fill_width = fill_size || flag(node, "fillMaxWidth");
    let fill_height = fill_size || flag(node, "fillMaxHeight");
    if fill_size {
        calls.push("fillMaxSize()".to_string());
    } else {
        if fill_width {
            calls.push("fillMaxWidth()".to_string());
        }
        if fill_height {
            calls.push("fillMaxHeight()".to_string());
        }
    }

    if !fill_width {
        if let Some(w) = number(node, "width").filter(|w| *w > 0.0) {
            calls.push(format!("width({})", kotlin::dp(w)));
        }
    }
    if !fill_height {
        if let Some(h) = number(node, "height").filter(|h| *h > 0.0) {
            calls.push(format!("height({})", kotlin::dp(h)));
        }
    }

    if let Some(call) = padding_call(padding(node)) {
        calls.push(call);
    }
    if !calls.is_empty() {
        uses(kotlin::LAYOUT);
        uses(kotlin::DP);
    }

    let shape = shape(corners(node));
    if let Some(shape) = &shape {
        calls.push(format!("clip({shape})"));
        uses(kotlin::CLIP);
        uses(kotlin::ROUNDED_SHAPE);
        uses(kotlin::DP);
    }

    if let Some(bg) = node.properties.get_color("backgroundColor") {
        calls.push(format!("background({})", kotlin::color(bg)));
        uses(kotlin::BACKGROUND);
        uses(kotlin::COLOR);
    }

    if let Some(width) = number(node, "borderWidth").filter(|w| *w > 0.0) {
        let color = node
            .properties
            .get_color("borderColor")
            .unwrap_or(builder_core::Color::BLACK);
        let mut args = vec![kotlin::dp(width), kotlin::color(color)];
        args.extend(shape);
        calls.push(format!("border({})", args.join(", ")));
        uses(kotlin::BORDER);
        uses(kotlin::COLOR);
        uses(kotlin::DP);
    }

    if flag(node, "clickable") {
        calls.push(format!("clickable {{ {click} }}"));
        uses(kotlin::CLICKABLE);
    }

    calls
}

/// Render a chain onto `base` (`Modifier` or a `modifier` parameter).
pub fn render_chain(base: &str, head: &[String], calls: &[String]) -> Option<String> {
    if head.is_empty() && calls.is_empty() {
        return None;
    }
    let mut out = base.to_string();
    for call in head.iter().chain(calls) {
        out.push('.');
        out.push_str(call);
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use builder_core::{ComponentType, Properties};

    fn node(props: Properties) -> DesignComponent {
        DesignComponent::new("n", ComponentType::Column, "N").with_properties(props)
    }

    fn calls(props: Properties) -> Vec<String> {
        modifier_calls(&node(props), "", &mut BTreeSet::new())
    }

    #[test]
    fn test_fill_then_padding() {
        let out = calls(
            Properties::new()
                .with("padding", 16)
                .with("fillMaxWidth", true)
                .with("width", 200),
        );
        assert_eq!(out, vec!["fillMaxWidth()", "padding(16.dp)"]);
    }

    #[test]
    fn test_fill_max_size_suppresses_dimensions() {
        let out = calls(
            Properties::new()
                .with("fillMaxSize", true)
                .with("width", 10)
                .with("height", 10),
        );
        assert_eq!(out, vec!["fillMaxSize()"]);
    }

    #[test]
    fn test_fixed_size() {
        let out = calls(Properties::new().with("width", 120).with("height", 48));
        assert_eq!(out, vec!["width(120.dp)", "height(48.dp)"]);
    }

    #[test]
    fn test_padding_collapse() {
        let uniform = Sides { start: 8.0, top: 8.0, end: 8.0, bottom: 8.0 };
        assert_eq!(padding_call(uniform).as_deref(), Some("padding(8.dp)"));

        let symmetric = Sides { start: 16.0, top: 4.0, end: 16.0, bottom: 4.0 };
        assert_eq!(
            padding_call(symmetric).as_deref(),
            Some("padding(horizontal = 16.dp, vertical = 4.dp)")
        );

        let horizontal_only = Sides { start: 16.0, top: 0.0, end: 16.0, bottom: 0.0 };
        assert_eq!(
            padding_call(horizontal_only).as_deref(),
            Some("padding(horizontal = 16.dp)")
        );

        let mixed = Sides { start: 1.0, top: 2.0, end: 3.0, bottom: 0.0 };
        assert_eq!(
            padding_call(mixed).as_deref(),
            Some("padding(start = 1.dp, top = 2.dp, end = 3.dp)")
        );
    }

    #[test]
    fn test_side_overrides_base_padding() {
        let sides = padding(&node(Properties::new().with("padding", 8).with("paddingTop", 24)));
        assert_eq!(sides, Sides { start: 8.0, top: 24.0, end: 8.0, bottom: 8.0 });
    }

    #[test]
    fn test_corner_collapse() {
        let out = calls(Properties::new().with("cornerRadius", 12));
        assert_eq!(out, vec!["clip(RoundedCornerShape(12.dp))"]);

        let out = calls(Properties::new().with("cornerRadius", 12).with("cornerRadiusBottomEnd", 0));
        assert_eq!(
            out,
            vec!["clip(RoundedCornerShape(topStart = 12.dp, topEnd = 12.dp, bottomEnd = 0.dp, bottomStart = 12.dp))"]
        );
    }

    #[test]
    fn test_appearance_order() {
        let out = modifier_calls(
            &node(
                Properties::new()
                    .with("clickable", true)
                    .with("borderWidth", 1)
                    .with("backgroundColor", builder_core::Color::WHITE)
                    .with("padding", 4),
            ),
            "onAction(\"tap\")",
            &mut BTreeSet::new(),
        );
        assert_eq!(
            out,
            vec![
                "padding(4.dp)",
                "background(Color(0xFFFFFFFF))",
                "border(1.dp, Color(0xFF000000))",
                "clickable { onAction(\"tap\") }",
            ]
        );
    }

    #[test]
    fn test_defaults_emit_nothing() {
        let out = calls(
            Properties::new()
                .with("padding", 0)
                .with("borderWidth", 0)
                .with("clickable", false)
                .with("fillMaxWidth", false),
        );
        assert!(out.is_empty());
        assert_eq!(render_chain("Modifier", &[], &out), None);
    }

    #[test]
    fn test_render_chain_head() {
        let head = vec!["padding(innerPadding)".to_string()];
        let calls = vec!["fillMaxSize()".to_string()];
        assert_eq!(
            render_chain("Modifier", &head, &calls).as_deref(),
            Some("Modifier.padding(innerPadding).fillMaxSize()")
        );
    }
}
