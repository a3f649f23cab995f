//! Nested tree JSON.
//!
//! The external form nests full child objects under `properties.children`:
//!
//! ```json
//! [{"id": "root", "type": "Scaffold", "name": "Screen", "parentId": null,
//!   "properties": {"children": [{"id": "content", "type": "Column", ...}]}}]
//! ```
//!
//! Import also accepts the flat form, where `children` lists bare ids and every
//! node appears at the top level. Either way the result is validated as a
//! whole before anything is handed back, so a failed import has no effect.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use builder_core::{
    schema, ComponentId, ComponentType, DesignComponent, ImportError, Properties, SlotRole,
    TreeError,
};
use builder_tree::{Action, AppState, DesignTree, Outcome};

/// Property key that carries nested children in the external form.
pub const CHILDREN_KEY: &str = "children";

/// Export the whole tree as an array holding the root object.
pub fn export_tree(tree: &DesignTree) -> Value {
    let nodes: Vec<Value> = tree
        .root()
        .map(|root| node_value(tree, root))
        .into_iter()
        .collect();
    Value::Array(nodes)
}

/// Export the subtree rooted at `id` as a single object.
pub fn export_subtree(tree: &DesignTree, id: impl AsRef<str>) -> Result<Value, TreeError> {
    let id = id.as_ref();
    if !tree.contains(id) {
        return Err(TreeError::NotFound { id: id.into() });
    }
    Ok(node_value(tree, &ComponentId::from(id)))
}

/// Pretty-printed tree JSON.
pub fn to_json_string(tree: &DesignTree) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&export_tree(tree))
}

fn node_value(tree: &DesignTree, id: &ComponentId) -> Value {
    let Some(node) = tree.get(id) else {
        return Value::Null;
    };
    let mut properties = match json!(node.properties) {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    if node.is_container() {
        let children = tree.children(id).iter().map(|c| node_value(tree, c)).collect();
        properties.insert(CHILDREN_KEY.to_string(), Value::Array(children));
    }

    let mut object = Map::new();
    object.insert("id".into(), json!(node.id));
    object.insert("type".into(), json!(node.component_type));
    object.insert("name".into(), json!(node.name));
    object.insert("parentId".into(), json!(node.parent_id));
    object.insert("properties".into(), Value::Object(properties));
    if let Some(slot) = node.slot {
        object.insert("slot".into(), json!(slot));
    }
    if let Some(template_id) = &node.template_id_ref {
        object.insert("templateIdRef".into(), json!(template_id));
    }
    Value::Object(object)
}

/// A node as it appears in imported JSON.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNode {
    id: ComponentId,
    #[serde(rename = "type")]
    component_type: ComponentType,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    parent_id: Option<ComponentId>,
    #[serde(default)]
    properties: Map<String, Value>,
    #[serde(default)]
    slot: Option<SlotRole>,
    #[serde(default)]
    template_id_ref: Option<String>,
}

/// Parse tree JSON text into a validated tree.
pub fn import_tree(text: &str) -> Result<DesignTree, ImportError> {
    let value: Value = serde_json::from_str(text)?;
    import_value(value)
}

/// Build a validated tree from parsed tree JSON.
pub fn import_value(value: Value) -> Result<DesignTree, ImportError> {
    let nodes = import_nodes(value)?;
    let tree = DesignTree::from_components(nodes)?;
    info!(count = tree.len(), "tree imported");
    Ok(tree)
}

/// Flatten tree JSON into nodes in document order, root first.
///
/// The node list forms exactly one tree; callers still run it through
/// [`DesignTree::from_components`] for the full invariant check.
pub fn import_nodes(value: Value) -> Result<Vec<DesignComponent>, ImportError> {
    let items = match value {
        Value::Array(items) => items,
        object @ Value::Object(_) => vec![object],
        _ => {
            return Err(ImportError::Tree(TreeError::Inconsistent {
                reason: "expected an array of components".to_string(),
            }))
        }
    };
    if items.is_empty() {
        return Err(ImportError::EmptyDocument);
    }

    let mut nodes = Vec::new();
    for item in items {
        flatten(item, None, &mut nodes)?;
    }

    let roots = nodes.iter().filter(|n| n.parent_id.is_none()).count();
    if roots != 1 {
        return Err(ImportError::MultipleRoots { count: roots });
    }
    // Flat documents may list the root anywhere.
    if let Some(pos) = nodes.iter().position(|n| n.parent_id.is_none()) {
        nodes[..=pos].rotate_right(1);
    }

    infer_slots(&mut nodes);
    debug!(count = nodes.len(), "tree JSON flattened");
    Ok(nodes)
}

/// Append `value` and its nested children to `out` in pre-order.
fn flatten(
    value: Value,
    nested_under: Option<&ComponentId>,
    out: &mut Vec<DesignComponent>,
) -> Result<ComponentId, ImportError> {
    let raw: RawNode = serde_json::from_value(value)?;
    let mut properties = raw.properties;

    let children = match properties.remove(CHILDREN_KEY) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(ImportError::Tree(TreeError::Inconsistent {
                reason: format!("{}: children must be an array", raw.id),
            }))
        }
    };
    if !children.is_empty() && !raw.component_type.is_container() {
        return Err(ImportError::ChildrenOnLeaf {
            id: raw.id,
            component_type: raw.component_type,
        });
    }

    let parent_id = match (nested_under, raw.parent_id) {
        (Some(actual), Some(declared)) if &declared != actual => {
            return Err(ImportError::ParentMismatch {
                id: raw.id,
                declared: Some(declared),
                actual: Some(actual.clone()),
            })
        }
        (Some(actual), _) => Some(actual.clone()),
        (None, declared) => declared,
    };

    let properties: Properties = serde_json::from_value(Value::Object(properties))?;
    let properties = schema::normalize_properties(&raw.component_type, properties);
    let name = raw
        .name
        .unwrap_or_else(|| raw.component_type.to_string());

    let id = raw.id;
    let mut node = DesignComponent::new(id.clone(), raw.component_type, name)
        .with_properties(properties);
    node.parent_id = parent_id;
    node.slot = raw.slot;
    node.template_id_ref = raw.template_id_ref;

    let index = out.len();
    out.push(node);

    let mut child_ids = Vec::with_capacity(children.len());
    for child in children {
        match child {
            Value::String(child_id) => child_ids.push(ComponentId(child_id)),
            object @ Value::Object(_) => child_ids.push(flatten(object, Some(&id), out)?),
            _ => {
                return Err(ImportError::Tree(TreeError::Inconsistent {
                    reason: format!("{id}: child entries must be objects or ids"),
                }))
            }
        }
    }
    out[index].children = child_ids.into_iter().collect();
    Ok(id)
}

/// Documents written without `slot` fields still mark the scaffold slots:
/// a node gets a role when its id is that role's id and it sits where the
/// role belongs.
fn infer_slots(nodes: &mut [DesignComponent]) {
    let types: HashMap<ComponentId, ComponentType> = nodes
        .iter()
        .map(|n| (n.id.clone(), n.component_type.clone()))
        .collect();
    for node in nodes.iter_mut().filter(|n| n.slot.is_none()) {
        let parent_type = node.parent_id.as_ref().and_then(|p| types.get(p));
        let role = match (node.id.as_str(), parent_type, &node.component_type) {
            ("root", None, ComponentType::Scaffold) => Some(SlotRole::Root),
            ("top-bar", Some(ComponentType::Scaffold), _) => Some(SlotRole::TopBar),
            ("bottom-bar", Some(ComponentType::Scaffold), _) => Some(SlotRole::BottomBar),
            ("content", Some(ComponentType::Scaffold), _) => Some(SlotRole::Content),
            _ => None,
        };
        node.slot = role;
    }
}

/// Replace the state's tree with imported JSON. The current tree is kept when
/// the document is invalid.
pub fn load_into(state: &mut AppState, text: &str) -> Result<Outcome, ImportError> {
    let tree = import_tree(text)?;
    let components = tree.preorder().into_iter().cloned().collect();
    Ok(state.dispatch(Action::Overwrite { components })?)
}
