//! Error types for the builder engine.

use thiserror::Error;

use crate::types::{ComponentId, ComponentType};

/// Top-level error type for the builder engine.
#[derive(Debug, Error)]
pub enum BuilderError {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Drop(#[from] DropError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Structural errors from tree mutations. A mutation that returns one of
/// these has left the tree unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TreeError {
    #[error("Component not found: {id}")]
    NotFound { id: ComponentId },

    #[error("Parent component not found: {id}")]
    ParentNotFound { id: ComponentId },

    #[error("Component {id} ({component_type}) cannot hold children")]
    NotAContainer {
        id: ComponentId,
        component_type: ComponentType,
    },

    #[error("{parent} does not accept a {child_type}")]
    IncompatibleChild {
        parent: ComponentId,
        child_type: ComponentType,
    },

    #[error("Reserved slot {id} cannot be {operation}")]
    ReservedSlot {
        id: ComponentId,
        operation: &'static str,
    },

    #[error("Moving {id} into {target} would make it its own ancestor")]
    CycleDetected {
        id: ComponentId,
        target: ComponentId,
    },

    #[error("Duplicate component id: {id}")]
    DuplicateId { id: ComponentId },

    #[error("Tree is inconsistent: {reason}")]
    Inconsistent { reason: String },

    #[error("Tree has no root component")]
    EmptyTree,

    #[error("Template not found: {template_id}")]
    TemplateNotFound { template_id: String },

    #[error("Invalid template '{template_id}': {reason}")]
    InvalidTemplate { template_id: String, reason: String },
}

/// Errors while reconciling a drag gesture.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DropError {
    #[error("No drag in progress")]
    NotDragging,

    #[error("A drag is already in progress")]
    AlreadyDragging,

    #[error("Pointer is not over a valid drop target")]
    NoTarget,

    #[error("Reserved slot {id} cannot be dragged")]
    SlotNotDraggable { id: ComponentId },

    #[error("Drop rejected: {0}")]
    Rejected(#[from] TreeError),
}

/// Errors while importing tree JSON.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Malformed tree JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Document contains no components")]
    EmptyDocument,

    #[error("Document has {count} top-level components; expected exactly one root")]
    MultipleRoots { count: usize },

    #[error("Component {id} declares parent {declared:?} but is nested under {actual:?}")]
    ParentMismatch {
        id: ComponentId,
        declared: Option<ComponentId>,
        actual: Option<ComponentId>,
    },

    #[error("Component {id} ({component_type}) has children but is not a container")]
    ChildrenOnLeaf {
        id: ComponentId,
        component_type: ComponentType,
    },

    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// Errors from schema validation of property values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("Property '{property}' expects a {expected}, found a {found}")]
    KindMismatch {
        property: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Invalid value '{value}' for '{property}' (expected one of: {choices})")]
    InvalidChoice {
        property: String,
        value: String,
        choices: String,
    },
}

/// Errors converting raw JSON into a property value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueError {
    #[error("null is not a property value")]
    Null,

    #[error("Invalid number: {0}")]
    InvalidNumber(String),
}
