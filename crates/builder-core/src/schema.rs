//! Static property schema: editable property descriptors and defaults per
//! component type.
//!
//! The tables here are the single source of truth for both the property
//! editor (what can be edited and how) and the code generator (when a value
//! equals its default and can be omitted).

use crate::errors::SchemaError;
use crate::parse;
use crate::types::{Color, ComponentType, Properties, PropertyValue};

/// Kind of value a property holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Text,
    Number,
    Boolean,
    Color,
    /// One of an enumerated set of strings.
    Choice,
    Object,
}

impl PropertyKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Color => "color",
            Self::Choice => "choice",
            Self::Object => "object",
        }
    }
}

/// Documented default of a property.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultValue {
    /// No default; the property has no effect until set.
    Unset,
    Text(&'static str),
    Number(f64),
    Boolean(bool),
    /// Packed `0xAARRGGBB`.
    Color(u32),
}

impl DefaultValue {
    pub fn to_value(&self) -> Option<PropertyValue> {
        match *self {
            Self::Unset => None,
            Self::Text(s) => Some(PropertyValue::String(s.to_string())),
            Self::Number(n) => Some(PropertyValue::Number(n)),
            Self::Boolean(b) => Some(PropertyValue::Boolean(b)),
            Self::Color(argb) => Some(PropertyValue::Color(Color::from_argb(argb))),
        }
    }

    fn matches(&self, value: &PropertyValue) -> bool {
        match (*self, value) {
            (Self::Unset, _) => false,
            (Self::Text(d), PropertyValue::String(s)) => d == s,
            (Self::Number(d), PropertyValue::Number(n)) => d == *n,
            (Self::Boolean(d), PropertyValue::Boolean(b)) => d == *b,
            (Self::Color(d), other) => other.as_color().is_some_and(|c| c.to_argb() == d),
            _ => false,
        }
    }
}

/// An editable property of a component type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropertyDescriptor {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: PropertyKind,
    pub default: DefaultValue,
    /// Allowed values for [`PropertyKind::Choice`].
    pub choices: &'static [&'static str],
}

const fn prop(
    name: &'static str,
    label: &'static str,
    kind: PropertyKind,
    default: DefaultValue,
) -> PropertyDescriptor {
    PropertyDescriptor {
        name,
        label,
        kind,
        default,
        choices: &[],
    }
}

const fn choice(
    name: &'static str,
    label: &'static str,
    choices: &'static [&'static str],
    default: &'static str,
) -> PropertyDescriptor {
    PropertyDescriptor {
        name,
        label,
        kind: PropertyKind::Choice,
        default: DefaultValue::Text(default),
        choices,
    }
}

use DefaultValue::{Boolean as B, Color as C, Number as N, Text as T, Unset};
use PropertyKind as K;

pub const FONT_WEIGHTS: &[&str] = &["Light", "Normal", "Medium", "SemiBold", "Bold"];
pub const TEXT_ALIGNS: &[&str] = &["Start", "Center", "End"];
pub const CONTENT_SCALES: &[&str] = &["Fit", "Crop", "FillBounds", "Inside"];
pub const VERTICAL_ARRANGEMENTS: &[&str] =
    &["Top", "Center", "Bottom", "SpaceBetween", "SpaceAround", "SpaceEvenly"];
pub const HORIZONTAL_ARRANGEMENTS: &[&str] =
    &["Start", "Center", "End", "SpaceBetween", "SpaceAround", "SpaceEvenly"];
pub const HORIZONTAL_ALIGNMENTS: &[&str] = &["Start", "CenterHorizontally", "End"];
pub const VERTICAL_ALIGNMENTS: &[&str] = &["Top", "CenterVertically", "Bottom"];
pub const BOX_ALIGNMENTS: &[&str] = &[
    "TopStart",
    "TopCenter",
    "TopEnd",
    "CenterStart",
    "Center",
    "CenterEnd",
    "BottomStart",
    "BottomCenter",
    "BottomEnd",
];
pub const ICONS: &[&str] = &[
    "Favorite", "Home", "Settings", "Search", "Person", "Add", "Close", "Menu", "ArrowBack",
    "Share",
];

/// Sizing properties shared by every type.
static SIZE_PROPS: &[PropertyDescriptor] = &[
    prop("width", "Width", K::Number, Unset),
    prop("height", "Height", K::Number, Unset),
    prop("fillMaxWidth", "Fill max width", K::Boolean, B(false)),
    prop("fillMaxHeight", "Fill max height", K::Boolean, B(false)),
    prop("fillMaxSize", "Fill max size", K::Boolean, B(false)),
];

/// Appearance and interaction modifiers shared by visual types.
static MODIFIER_PROPS: &[PropertyDescriptor] = &[
    prop("padding", "Padding", K::Number, N(0.0)),
    prop("paddingStart", "Padding start", K::Number, Unset),
    prop("paddingTop", "Padding top", K::Number, Unset),
    prop("paddingEnd", "Padding end", K::Number, Unset),
    prop("paddingBottom", "Padding bottom", K::Number, Unset),
    prop("backgroundColor", "Background", K::Color, Unset),
    prop("borderWidth", "Border width", K::Number, N(0.0)),
    prop("borderColor", "Border color", K::Color, C(0xFF00_0000)),
    prop("cornerRadius", "Corner radius", K::Number, N(0.0)),
    prop("cornerRadiusTopStart", "Top start radius", K::Number, Unset),
    prop("cornerRadiusTopEnd", "Top end radius", K::Number, Unset),
    prop("cornerRadiusBottomEnd", "Bottom end radius", K::Number, Unset),
    prop("cornerRadiusBottomStart", "Bottom start radius", K::Number, Unset),
    prop("clickable", "Clickable", K::Boolean, B(false)),
    prop("onClickAction", "Click action", K::Text, T("")),
];

static TEXT_PROPS: &[PropertyDescriptor] = &[
    prop("text", "Text", K::Text, T("Text")),
    prop("fontSize", "Font size", K::Number, N(14.0)),
    choice("fontWeight", "Font weight", FONT_WEIGHTS, "Normal"),
    prop("textColor", "Text color", K::Color, Unset),
    choice("textAlign", "Alignment", TEXT_ALIGNS, "Start"),
    prop("maxLines", "Max lines", K::Number, N(0.0)),
];

static BUTTON_PROPS: &[PropertyDescriptor] = &[
    prop("text", "Label", K::Text, T("Button")),
    prop("enabled", "Enabled", K::Boolean, B(true)),
    prop("containerColor", "Container color", K::Color, Unset),
    prop("contentColor", "Content color", K::Color, Unset),
];

static IMAGE_PROPS: &[PropertyDescriptor] = &[
    prop("src", "Source", K::Text, T("")),
    prop("contentDescription", "Description", K::Text, T("")),
    choice("contentScale", "Scale", CONTENT_SCALES, "Fit"),
];

static ICON_PROPS: &[PropertyDescriptor] = &[
    choice("icon", "Icon", ICONS, "Favorite"),
    prop("tint", "Tint", K::Color, Unset),
    prop("contentDescription", "Description", K::Text, T("")),
];

static TEXT_FIELD_PROPS: &[PropertyDescriptor] = &[
    prop("value", "Value", K::Text, T("")),
    prop("label", "Label", K::Text, T("")),
    prop("placeholder", "Placeholder", K::Text, T("")),
    prop("singleLine", "Single line", K::Boolean, B(false)),
];

static TOGGLE_PROPS: &[PropertyDescriptor] = &[prop("checked", "Checked", K::Boolean, B(false))];

static DIVIDER_PROPS: &[PropertyDescriptor] = &[
    prop("thickness", "Thickness", K::Number, N(1.0)),
    prop("color", "Color", K::Color, Unset),
];

static COLUMN_PROPS: &[PropertyDescriptor] = &[
    choice("verticalArrangement", "Vertical arrangement", VERTICAL_ARRANGEMENTS, "Top"),
    choice("horizontalAlignment", "Horizontal alignment", HORIZONTAL_ALIGNMENTS, "Start"),
    prop("spacing", "Spacing", K::Number, N(0.0)),
];

static ROW_PROPS: &[PropertyDescriptor] = &[
    choice("horizontalArrangement", "Horizontal arrangement", HORIZONTAL_ARRANGEMENTS, "Start"),
    choice("verticalAlignment", "Vertical alignment", VERTICAL_ALIGNMENTS, "Top"),
    prop("spacing", "Spacing", K::Number, N(0.0)),
];

static BOX_PROPS: &[PropertyDescriptor] =
    &[choice("contentAlignment", "Content alignment", BOX_ALIGNMENTS, "TopStart")];

static CARD_PROPS: &[PropertyDescriptor] = &[
    prop("elevation", "Elevation", K::Number, N(0.0)),
    prop("containerColor", "Container color", K::Color, Unset),
];

static SCAFFOLD_PROPS: &[PropertyDescriptor] =
    &[prop("containerColor", "Container color", K::Color, Unset)];

static TOP_APP_BAR_PROPS: &[PropertyDescriptor] = &[
    prop("title", "Title", K::Text, T("Title")),
    prop("containerColor", "Container color", K::Color, Unset),
];

fn type_props(ty: &ComponentType) -> &'static [PropertyDescriptor] {
    use ComponentType as CT;
    match ty {
        CT::Text => TEXT_PROPS,
        CT::Button => BUTTON_PROPS,
        CT::Image => IMAGE_PROPS,
        CT::Icon => ICON_PROPS,
        CT::TextField => TEXT_FIELD_PROPS,
        CT::Switch | CT::Checkbox => TOGGLE_PROPS,
        CT::Divider => DIVIDER_PROPS,
        CT::Column | CT::LazyColumn => COLUMN_PROPS,
        CT::Row | CT::LazyRow => ROW_PROPS,
        CT::Box => BOX_PROPS,
        CT::Card => CARD_PROPS,
        CT::Scaffold | CT::BottomAppBar => SCAFFOLD_PROPS,
        CT::TopAppBar => TOP_APP_BAR_PROPS,
        CT::Spacer | CT::Custom | CT::Unknown(_) => &[],
    }
}

/// Ordered editable properties of a type: type-specific ones first, then
/// sizing, then shared modifiers (Spacer only gets sizing).
pub fn descriptors(ty: &ComponentType) -> Vec<&'static PropertyDescriptor> {
    let mut out: Vec<&'static PropertyDescriptor> = type_props(ty).iter().collect();
    match ty {
        ComponentType::Spacer => out.extend(SIZE_PROPS),
        ComponentType::Scaffold => {}
        _ => {
            out.extend(SIZE_PROPS);
            out.extend(MODIFIER_PROPS);
        }
    }
    out
}

/// Look up the descriptor of a property.
pub fn descriptor(ty: &ComponentType, name: &str) -> Option<&'static PropertyDescriptor> {
    type_props(ty)
        .iter()
        .chain(SIZE_PROPS.iter())
        .chain(MODIFIER_PROPS.iter())
        .find(|d| d.name == name)
}

/// Documented default value of a property, if it has one.
pub fn default_value(ty: &ComponentType, name: &str) -> Option<PropertyValue> {
    descriptor(ty, name).and_then(|d| d.default.to_value())
}

/// Properties seeded on a newly created node of `ty`.
pub fn default_properties(ty: &ComponentType) -> Properties {
    type_props(ty)
        .iter()
        .filter_map(|d| d.default.to_value().map(|v| (d.name.to_string(), v)))
        .collect()
}

/// Whether `value` equals the documented default of the property.
pub fn is_default(ty: &ComponentType, name: &str, value: &PropertyValue) -> bool {
    descriptor(ty, name).is_some_and(|d| d.default.matches(value))
}

/// Check a value against its descriptor. Properties without a descriptor are
/// accepted unchanged; the property bag is open-ended.
pub fn validate_value(
    ty: &ComponentType,
    name: &str,
    value: &PropertyValue,
) -> Result<(), SchemaError> {
    let Some(desc) = descriptor(ty, name) else {
        return Ok(());
    };
    let ok = match desc.kind {
        K::Text => matches!(value, PropertyValue::String(_)),
        K::Number => matches!(value, PropertyValue::Number(n) if n.is_finite()),
        K::Boolean => matches!(value, PropertyValue::Boolean(_)),
        K::Color => value.as_color().is_some(),
        K::Object => matches!(value, PropertyValue::Object(_)),
        K::Choice => {
            let Some(s) = value.as_str() else {
                return Err(SchemaError::KindMismatch {
                    property: name.to_string(),
                    expected: desc.kind.name(),
                    found: value.kind_name(),
                });
            };
            if !desc.choices.contains(&s) {
                return Err(SchemaError::InvalidChoice {
                    property: name.to_string(),
                    value: s.to_string(),
                    choices: desc.choices.join(", "),
                });
            }
            true
        }
    };
    if ok {
        Ok(())
    } else {
        Err(SchemaError::KindMismatch {
            property: name.to_string(),
            expected: desc.kind.name(),
            found: value.kind_name(),
        })
    }
}

/// Coerce a loosely typed value to the kind its descriptor expects.
///
/// `"16dp"` becomes `16` for number properties, `"true"` becomes a boolean,
/// color strings become colors on color properties only, and a color value
/// set on a text property goes back to its hex form. Values that cannot be
/// coerced are returned unchanged.
pub fn normalize_value(ty: &ComponentType, name: &str, value: PropertyValue) -> PropertyValue {
    let Some(desc) = descriptor(ty, name) else {
        return value;
    };
    match (desc.kind, value) {
        (K::Number, PropertyValue::String(s)) => match parse::parse_dimension(&s) {
            Some(n) => PropertyValue::Number(n),
            None => PropertyValue::String(s),
        },
        (K::Boolean, PropertyValue::String(s)) => match parse::parse_bool(&s) {
            Some(b) => PropertyValue::Boolean(b),
            None => PropertyValue::String(s),
        },
        (K::Color, PropertyValue::String(s)) => match parse::parse_color(&s) {
            Some(c) => PropertyValue::Color(c),
            None => PropertyValue::String(s),
        },
        (K::Text | K::Choice, PropertyValue::Color(c)) => PropertyValue::String(c.to_hex()),
        (_, other) => other,
    }
}

/// Normalize every entry of a property bag for `ty`.
pub fn normalize_properties(ty: &ComponentType, props: Properties) -> Properties {
    props
        .into_iter()
        .map(|(name, value)| {
            let value = normalize_value(ty, &name, value);
            (name, value)
        })
        .collect()
}
