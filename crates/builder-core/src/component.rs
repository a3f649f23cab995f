//! Design tree nodes.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::types::{ComponentId, ComponentType, Properties, PropertyValue, SlotRole};

/// Ordered child id list.
pub type ChildList = SmallVec<[ComponentId; 4]>;

/// A node in the UI tree.
///
/// `parent_id` and `children` are indices maintained by the tree store, not
/// ownership: the store owns every node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignComponent {
    pub id: ComponentId,
    #[serde(rename = "type")]
    pub component_type: ComponentType,
    /// User-facing label, independent of `id`.
    pub name: String,
    #[serde(default)]
    pub properties: Properties,
    #[serde(default, skip_serializing_if = "SmallVec::is_empty")]
    pub children: ChildList,
    #[serde(default)]
    pub parent_id: Option<ComponentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<SlotRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id_ref: Option<String>,
}

impl DesignComponent {
    /// Create a detached node with no properties.
    pub fn new(id: impl Into<ComponentId>, component_type: ComponentType, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            component_type,
            name: name.into(),
            properties: Properties::new(),
            children: ChildList::new(),
            parent_id: None,
            slot: None,
            template_id_ref: None,
        }
    }

    /// Set a property.
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name, value);
        self
    }

    /// Replace the property bag.
    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    /// Mark as a reserved slot.
    pub fn with_slot(mut self, slot: SlotRole) -> Self {
        self.slot = Some(slot);
        self
    }

    pub fn with_parent(mut self, parent: impl Into<ComponentId>) -> Self {
        self.parent_id = Some(parent.into());
        self
    }

    pub fn with_template_ref(mut self, template_id: impl Into<String>) -> Self {
        self.template_id_ref = Some(template_id.into());
        self
    }

    pub fn is_container(&self) -> bool {
        self.component_type.is_container()
    }

    /// Reserved slots cannot be deleted, reparented or dragged.
    pub fn is_reserved_slot(&self) -> bool {
        self.slot.is_some()
    }

    /// Whether a child of `child_type` may be placed under this node.
    pub fn accepts(&self, child_type: &ComponentType) -> bool {
        if !self.is_container() {
            return false;
        }
        match self.slot {
            Some(slot) => slot.accepts(child_type),
            None => !child_type.is_structural(),
        }
    }

    /// Position of `child` in this node's children.
    pub fn child_index(&self, child: &ComponentId) -> Option<usize> {
        self.children.iter().position(|c| c == child)
    }
}
