//! Core value types for the design tree.

use std::borrow::Borrow;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::ValueError;
use crate::parse;

/// Unique identifier for a design component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(pub String);

impl ComponentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric suffix of a counter-allocated id (`component-12` -> 12).
    pub fn counter_suffix(&self) -> Option<u64> {
        self.0.rsplit('-').next().and_then(|s| s.parse().ok())
    }
}

impl From<&str> for ComponentId {
    fn from(s: &str) -> Self {
        ComponentId(s.to_string())
    }
}

impl From<String> for ComponentId {
    fn from(s: String) -> Self {
        ComponentId(s)
    }
}

impl AsRef<str> for ComponentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ComponentId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The closed set of component types the builder understands.
///
/// Tags that are not recognized are kept as [`ComponentType::Unknown`] so a
/// tree produced by a newer editor still loads and generates (with a
/// placeholder for the unknown node).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ComponentType {
    Text,
    Button,
    Image,
    Icon,
    TextField,
    Switch,
    Checkbox,
    Divider,
    Spacer,
    Column,
    Row,
    Box,
    Card,
    LazyColumn,
    LazyRow,
    Scaffold,
    TopAppBar,
    BottomAppBar,
    /// Reference to a custom component template.
    Custom,
    Unknown(String),
}

impl ComponentType {
    /// Types offered in the editor's component library.
    pub fn palette() -> [ComponentType; 15] {
        [
            ComponentType::Text,
            ComponentType::Button,
            ComponentType::Image,
            ComponentType::Icon,
            ComponentType::TextField,
            ComponentType::Switch,
            ComponentType::Checkbox,
            ComponentType::Divider,
            ComponentType::Spacer,
            ComponentType::Column,
            ComponentType::Row,
            ComponentType::Box,
            ComponentType::Card,
            ComponentType::LazyColumn,
            ComponentType::LazyRow,
        ]
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "Text",
            Self::Button => "Button",
            Self::Image => "Image",
            Self::Icon => "Icon",
            Self::TextField => "TextField",
            Self::Switch => "Switch",
            Self::Checkbox => "Checkbox",
            Self::Divider => "Divider",
            Self::Spacer => "Spacer",
            Self::Column => "Column",
            Self::Row => "Row",
            Self::Box => "Box",
            Self::Card => "Card",
            Self::LazyColumn => "LazyColumn",
            Self::LazyRow => "LazyRow",
            Self::Scaffold => "Scaffold",
            Self::TopAppBar => "TopAppBar",
            Self::BottomAppBar => "BottomAppBar",
            Self::Custom => "Custom",
            Self::Unknown(name) => name,
        }
    }

    /// Whether nodes of this type may hold ordered children.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            Self::Column
                | Self::Row
                | Self::Box
                | Self::Card
                | Self::LazyColumn
                | Self::LazyRow
                | Self::Scaffold
                | Self::TopAppBar
                | Self::BottomAppBar
        )
    }

    /// Screen-structure types that only the scaffold itself creates.
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Scaffold | Self::TopAppBar | Self::BottomAppBar)
    }

    /// Whether children are laid out along the horizontal axis.
    pub fn is_horizontal(&self) -> bool {
        matches!(
            self,
            Self::Row | Self::LazyRow | Self::TopAppBar | Self::BottomAppBar
        )
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown(_))
    }
}

impl From<String> for ComponentType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Text" => Self::Text,
            "Button" => Self::Button,
            "Image" => Self::Image,
            "Icon" => Self::Icon,
            "TextField" => Self::TextField,
            "Switch" => Self::Switch,
            "Checkbox" => Self::Checkbox,
            "Divider" => Self::Divider,
            "Spacer" => Self::Spacer,
            "Column" => Self::Column,
            "Row" => Self::Row,
            "Box" => Self::Box,
            "Card" => Self::Card,
            "LazyColumn" => Self::LazyColumn,
            "LazyRow" => Self::LazyRow,
            "Scaffold" => Self::Scaffold,
            "TopAppBar" => Self::TopAppBar,
            "BottomAppBar" => Self::BottomAppBar,
            "Custom" | "CustomComponent" => Self::Custom,
            _ => Self::Unknown(s),
        }
    }
}

impl From<&str> for ComponentType {
    fn from(s: &str) -> Self {
        ComponentType::from(s.to_string())
    }
}

impl From<ComponentType> for String {
    fn from(ty: ComponentType) -> Self {
        match ty {
            ComponentType::Unknown(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed structural role of a reserved slot node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SlotRole {
    /// The screen scaffold at the root of the tree.
    Root,
    TopBar,
    BottomBar,
    /// Primary content container.
    Content,
}

impl SlotRole {
    /// Id the scaffold assigns to this slot.
    pub fn default_id(&self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::TopBar => "top-bar",
            Self::BottomBar => "bottom-bar",
            Self::Content => "content",
        }
    }

    /// Whether a user may place a node of `child` type inside this slot.
    pub fn accepts(&self, child: &ComponentType) -> bool {
        use ComponentType as T;
        match self {
            Self::Root => false,
            Self::TopBar => matches!(
                child,
                T::Text | T::Icon | T::Button | T::Image | T::Row | T::Spacer
            ),
            Self::BottomBar => matches!(
                child,
                T::Text | T::Icon | T::Button | T::Row | T::Column | T::Box | T::Spacer
            ),
            Self::Content => !child.is_structural(),
        }
    }
}

/// An sRGB color with alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create from a packed `0xAARRGGBB` value.
    pub const fn from_argb(argb: u32) -> Self {
        Self {
            a: (argb >> 24) as u8,
            r: (argb >> 16) as u8,
            g: (argb >> 8) as u8,
            b: argb as u8,
        }
    }

    /// Packed `0xAARRGGBB` value.
    pub fn to_argb(&self) -> u32 {
        (self.a as u32) << 24 | (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    /// Create from hex string (`#RGB`, `#RRGGBB`, or web-order `#RRGGBBAA`).
    pub fn from_hex(hex: &str) -> Option<Self> {
        parse::parse_hex_color(hex)
    }

    /// Hex form; alpha is appended only when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }

    /// Kotlin literal, e.g. `Color(0xFF3B82F6)`.
    pub fn to_compose(&self) -> String {
        format!("Color(0x{:08X})", self.to_argb())
    }

    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse::parse_color(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid color: {s}")))
    }
}

/// A tagged property value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "serde_json::Value")]
pub enum PropertyValue {
    String(String),
    Number(f64),
    Boolean(bool),
    Color(Color),
    Array(Vec<PropertyValue>),
    Object(IndexMap<String, PropertyValue>),
}

impl PropertyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Colors are accepted either tagged or as a parseable string.
    pub fn as_color(&self) -> Option<Color> {
        match self {
            PropertyValue::Color(c) => Some(*c),
            PropertyValue::String(s) => parse::parse_color(s),
            _ => None,
        }
    }

    /// Display text for scalar values.
    pub fn to_text(&self) -> Option<String> {
        match self {
            PropertyValue::String(s) => Some(s.clone()),
            PropertyValue::Number(n) => Some(format_number(*n)),
            PropertyValue::Boolean(b) => Some(b.to_string()),
            PropertyValue::Color(c) => Some(c.to_hex()),
            PropertyValue::Array(_) | PropertyValue::Object(_) => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            PropertyValue::String(_) => "string",
            PropertyValue::Number(_) => "number",
            PropertyValue::Boolean(_) => "boolean",
            PropertyValue::Color(_) => "color",
            PropertyValue::Array(_) => "array",
            PropertyValue::Object(_) => "object",
        }
    }
}

impl Serialize for PropertyValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PropertyValue::String(s) => serializer.serialize_str(s),
            PropertyValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    serializer.serialize_i64(*n as i64)
                } else {
                    serializer.serialize_f64(*n)
                }
            }
            PropertyValue::Boolean(b) => serializer.serialize_bool(*b),
            PropertyValue::Color(c) => c.serialize(serializer),
            PropertyValue::Array(items) => items.serialize(serializer),
            PropertyValue::Object(map) => map.serialize(serializer),
        }
    }
}

impl TryFrom<serde_json::Value> for PropertyValue {
    type Error = ValueError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        use serde_json::Value;
        match value {
            Value::Null => Err(ValueError::Null),
            Value::Bool(b) => Ok(PropertyValue::Boolean(b)),
            Value::Number(n) => n
                .as_f64()
                .map(PropertyValue::Number)
                .ok_or_else(|| ValueError::InvalidNumber(n.to_string())),
            // Colors are recognized per property by the schema.
            Value::String(s) => Ok(PropertyValue::String(s)),
            Value::Array(items) => items
                .into_iter()
                .map(PropertyValue::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(PropertyValue::Array),
            Value::Object(map) => {
                let mut out = IndexMap::with_capacity(map.len());
                for (key, value) in map {
                    if value.is_null() {
                        continue;
                    }
                    out.insert(key, PropertyValue::try_from(value)?);
                }
                Ok(PropertyValue::Object(out))
            }
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::String(s)
    }
}

impl From<f64> for PropertyValue {
    fn from(n: f64) -> Self {
        PropertyValue::Number(n)
    }
}

impl From<i32> for PropertyValue {
    fn from(n: i32) -> Self {
        PropertyValue::Number(n as f64)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Boolean(b)
    }
}

impl From<Color> for PropertyValue {
    fn from(c: Color) -> Self {
        PropertyValue::Color(c)
    }
}

/// Format a number without a trailing `.0` for integral values.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// An open-ended, insertion-ordered property bag.
///
/// Null values are dropped on deserialization; a property is either present
/// with a concrete value or absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Properties(IndexMap<String, PropertyValue>);

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.0.get(name)
    }

    pub fn get_number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(PropertyValue::as_number)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(PropertyValue::as_bool)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(PropertyValue::as_str)
    }

    pub fn get_color(&self, name: &str) -> Option<Color> {
        self.get(name).and_then(PropertyValue::as_color)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Option<PropertyValue> {
        self.0.insert(name.into(), value.into())
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<PropertyValue> {
        self.0.shift_remove(name)
    }

    /// Shallow merge: every entry of `other` overwrites the same key here,
    /// all other keys are kept.
    pub fn merge(&mut self, other: Properties) {
        for (name, value) in other.0 {
            self.0.insert(name, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<IndexMap<String, PropertyValue>> for Properties {
    fn from(map: IndexMap<String, PropertyValue>) -> Self {
        Properties(map)
    }
}

impl FromIterator<(String, PropertyValue)> for Properties {
    fn from_iter<I: IntoIterator<Item = (String, PropertyValue)>>(iter: I) -> Self {
        Properties(iter.into_iter().collect())
    }
}

impl IntoIterator for Properties {
    type Item = (String, PropertyValue);
    type IntoIter = indexmap::map::IntoIter<String, PropertyValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'de> Deserialize<'de> for Properties {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = IndexMap::<String, serde_json::Value>::deserialize(deserializer)?;
        let mut props = IndexMap::with_capacity(raw.len());
        for (name, value) in raw {
            if value.is_null() {
                continue;
            }
            let value = PropertyValue::try_from(value).map_err(serde::de::Error::custom)?;
            props.insert(name, value);
        }
        Ok(Properties(props))
    }
}
