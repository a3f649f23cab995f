//! JavaScript-facing data shapes.

use serde::{Deserialize, Serialize};

use builder_core::schema::PropertyDescriptor;
use builder_core::{ComponentId, ComponentType, PropertyValue};
use builder_dnd::DragState;
use builder_export::{AiRequest, AiTask};
use builder_tree::Outcome;

/// One editable property as the property panel sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDescriptorJs {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    pub choices: &'static [&'static str],
    pub default: Option<PropertyValue>,
}

impl From<&PropertyDescriptor> for PropertyDescriptorJs {
    fn from(d: &PropertyDescriptor) -> Self {
        Self {
            name: d.name,
            label: d.label,
            kind: d.kind.name(),
            choices: d.choices,
            default: d.default.to_value(),
        }
    }
}

/// A component library entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaletteEntryJs {
    #[serde(rename = "type")]
    pub component_type: ComponentType,
    pub container: bool,
}

/// Result of releasing a drag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DropResultJs {
    pub outcome: Option<Outcome>,
    pub state: DragState,
}

/// An issued AI request and the ticket its answer must carry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiTicketJs {
    pub ticket: u64,
    pub request: AiRequest,
}

/// What applying an AI answer did.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum AiResultJs {
    SubtreeReplaced { root: ComponentId },
    DesignReplaced { count: usize },
    Code { source: String },
}

/// Arguments for starting an AI request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiBeginJs {
    pub task: AiTask,
    #[serde(default)]
    pub target: Option<ComponentId>,
    #[serde(default)]
    pub instructions: String,
}
