//! Kotlin literal formatting and import names.

use std::sync::OnceLock;

use regex::Regex;

use builder_core::{format_number, Color};

pub const COMPOSABLE: &str = "androidx.compose.runtime.Composable";
pub const RUNTIME_STATE: &str = "androidx.compose.runtime.*";
pub const LAYOUT: &str = "androidx.compose.foundation.layout.*";
pub const LAZY_COLUMN: &str = "androidx.compose.foundation.lazy.LazyColumn";
pub const LAZY_ROW: &str = "androidx.compose.foundation.lazy.LazyRow";
pub const MATERIAL: &str = "androidx.compose.material3.*";
pub const MODIFIER: &str = "androidx.compose.ui.Modifier";
pub const ALIGNMENT: &str = "androidx.compose.ui.Alignment";
pub const COLOR: &str = "androidx.compose.ui.graphics.Color";
pub const DP: &str = "androidx.compose.ui.unit.dp";
pub const SP: &str = "androidx.compose.ui.unit.sp";
pub const FONT_WEIGHT: &str = "androidx.compose.ui.text.font.FontWeight";
pub const TEXT_ALIGN: &str = "androidx.compose.ui.text.style.TextAlign";
pub const CLIP: &str = "androidx.compose.ui.draw.clip";
pub const ROUNDED_SHAPE: &str = "androidx.compose.foundation.shape.RoundedCornerShape";
pub const BACKGROUND: &str = "androidx.compose.foundation.background";
pub const BORDER: &str = "androidx.compose.foundation.border";
pub const CLICKABLE: &str = "androidx.compose.foundation.clickable";
pub const IMAGE: &str = "androidx.compose.foundation.Image";
pub const PAINTER_RESOURCE: &str = "androidx.compose.ui.res.painterResource";
pub const CONTENT_SCALE: &str = "androidx.compose.ui.layout.ContentScale";
pub const ASYNC_IMAGE: &str = "coil.compose.AsyncImage";
pub const ICONS: &str = "androidx.compose.material.icons.Icons";
pub const ICONS_FILLED: &str = "androidx.compose.material.icons.filled.*";
pub const PREVIEW: &str = "androidx.compose.ui.tooling.preview.Preview";

/// Quote and escape a string for a Kotlin string literal.
pub fn string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '$' => out.push_str("\\$"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Text that is safe inside a `/* */` comment.
pub fn comment_text(value: &str) -> String {
    value.replace("*/", "* /").replace('\n', " ")
}

pub fn dp(value: f64) -> String {
    format!("{}.dp", format_number(value))
}

pub fn sp(value: f64) -> String {
    format!("{}.sp", format_number(value))
}

pub fn color(value: Color) -> String {
    value.to_compose()
}

fn identifier_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").ok())
        .as_ref()
}

/// A plain Kotlin identifier.
pub fn is_identifier(value: &str) -> bool {
    identifier_re().is_some_and(|re| re.is_match(value))
}

/// A dotted package name such as `com.example.app`.
pub fn is_package_name(value: &str) -> bool {
    !value.is_empty() && value.split('.').all(is_identifier)
}

/// Turn arbitrary text into a resource name (`ic_launcher`, `hero_image`).
pub fn resource_name(value: &str) -> String {
    let stem = value
        .rsplit('/')
        .next()
        .unwrap_or(value)
        .split('.')
        .next()
        .unwrap_or_default();
    let mut name: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert_str(0, "img_");
    }
    name
}
