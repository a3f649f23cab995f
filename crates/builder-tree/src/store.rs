//! The design tree store.
//!
//! All nodes are owned by a single [`DesignTree`]; `parent_id` and
//! `children` are bidirectional indices that every mutation keeps in sync.
//! Mutations validate first and only then touch the tree, so an `Err`
//! always means the tree is unchanged.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use tracing::{debug, warn};

use builder_core::schema;
use builder_core::{
    ComponentId, ComponentType, DesignComponent, Properties, SlotRole, TreeError,
};

/// Prefix of counter-allocated ids.
pub const ID_PREFIX: &str = "component";

fn reject(err: TreeError) -> TreeError {
    warn!(error = %err, "tree mutation rejected");
    err
}

/// The in-memory design tree.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignTree {
    /// All nodes, in creation order.
    nodes: IndexMap<ComponentId, DesignComponent>,
    root: Option<ComponentId>,
    /// Counter for generating unique ids.
    next_id: u64,
}

impl Default for DesignTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DesignTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self {
            nodes: IndexMap::new(),
            root: None,
            next_id: 1,
        }
    }

    /// Create a tree holding the default screen scaffold: a root Scaffold
    /// with top bar, content and bottom bar slots.
    pub fn with_scaffold() -> Self {
        let mut tree = Self::new();
        let root_id = ComponentId::from(SlotRole::Root.default_id());
        let slots = [
            (SlotRole::TopBar, ComponentType::TopAppBar, "Top bar"),
            (SlotRole::Content, ComponentType::Column, "Content"),
            (SlotRole::BottomBar, ComponentType::BottomAppBar, "Bottom bar"),
        ];

        let mut root = DesignComponent::new(root_id.clone(), ComponentType::Scaffold, "Screen")
            .with_slot(SlotRole::Root);
        for (role, ty, name) in slots {
            let id = ComponentId::from(role.default_id());
            let mut props = schema::default_properties(&ty);
            if role == SlotRole::Content {
                props.insert("fillMaxSize", true);
            }
            let slot = DesignComponent::new(id.clone(), ty, name)
                .with_properties(props)
                .with_slot(role)
                .with_parent(root_id.clone());
            root.children.push(id.clone());
            tree.nodes.insert(id, slot);
        }
        tree.nodes.insert(root_id.clone(), root);
        tree.root = Some(root_id);
        tree
    }

    /// Build a tree from a flat node list, validating every invariant.
    pub fn from_components(
        components: impl IntoIterator<Item = DesignComponent>,
    ) -> Result<Self, TreeError> {
        let mut nodes = IndexMap::new();
        let mut roots = Vec::new();
        for component in components {
            if component.parent_id.is_none() {
                roots.push(component.id.clone());
            }
            if nodes.contains_key(&component.id) {
                return Err(TreeError::DuplicateId { id: component.id });
            }
            nodes.insert(component.id.clone(), component);
        }

        let root = match roots.len() {
            0 if nodes.is_empty() => return Err(TreeError::EmptyTree),
            0 => {
                return Err(TreeError::Inconsistent {
                    reason: "every component has a parent".to_string(),
                })
            }
            1 => roots.pop(),
            n => {
                return Err(TreeError::Inconsistent {
                    reason: format!("{n} components have no parent"),
                })
            }
        };

        let next_id = nodes
            .keys()
            .filter(|id| id.as_str().starts_with(ID_PREFIX))
            .filter_map(ComponentId::counter_suffix)
            .max()
            .map_or(1, |max| max + 1);

        let tree = Self { nodes, root, next_id };
        tree.validate()?;
        Ok(tree)
    }

    /// Allocate a fresh, unused id.
    pub fn next_id(&mut self) -> ComponentId {
        loop {
            let id = ComponentId(format!("{}-{}", ID_PREFIX, self.next_id));
            self.next_id += 1;
            if !self.nodes.contains_key(&id) {
                return id;
            }
        }
    }

    pub fn root(&self) -> Option<&ComponentId> {
        self.root.as_ref()
    }

    pub fn root_component(&self) -> Option<&DesignComponent> {
        self.root.as_ref().and_then(|id| self.nodes.get(id))
    }

    pub fn get(&self, id: impl AsRef<str>) -> Option<&DesignComponent> {
        self.nodes.get(id.as_ref())
    }

    pub fn contains(&self, id: impl AsRef<str>) -> bool {
        self.nodes.contains_key(id.as_ref())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over all nodes in creation order.
    pub fn components(&self) -> impl Iterator<Item = &DesignComponent> {
        self.nodes.values()
    }

    /// Ordered child ids of a node (empty for leaves and unknown ids).
    pub fn children(&self, id: impl AsRef<str>) -> &[ComponentId] {
        self.nodes
            .get(id.as_ref())
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn parent(&self, id: impl AsRef<str>) -> Option<&ComponentId> {
        self.nodes.get(id.as_ref()).and_then(|n| n.parent_id.as_ref())
    }

    /// Position of a node among its siblings.
    pub fn index_in_parent(&self, id: impl AsRef<str>) -> Option<usize> {
        let node = self.nodes.get(id.as_ref())?;
        let parent = self.nodes.get(node.parent_id.as_ref()?)?;
        parent.child_index(&node.id)
    }

    /// Parent chain from the direct parent up to the root.
    pub fn ancestors(&self, id: impl AsRef<str>) -> Vec<ComponentId> {
        let mut out = Vec::new();
        let mut current = self.parent(id.as_ref()).cloned();
        while let Some(parent) = current {
            // Bounded so a corrupted index cannot loop forever.
            if out.len() > self.nodes.len() {
                break;
            }
            current = self.parent(&parent).cloned();
            out.push(parent);
        }
        out
    }

    /// Whether `ancestor` is a strict ancestor of `node`.
    pub fn is_ancestor(&self, ancestor: impl AsRef<str>, node: impl AsRef<str>) -> bool {
        let ancestor = ancestor.as_ref();
        self.ancestors(node).iter().any(|a| a.as_str() == ancestor)
    }

    /// All transitive descendants of a node, depth-first pre-order, excluding
    /// the node itself.
    pub fn descendants(&self, id: impl AsRef<str>) -> Vec<ComponentId> {
        let mut out = Vec::new();
        let mut stack: Vec<&ComponentId> = self.children(id.as_ref()).iter().rev().collect();
        while let Some(current) = stack.pop() {
            out.push(current.clone());
            stack.extend(self.children(current).iter().rev());
        }
        out
    }

    /// Nodes in depth-first pre-order starting at the root.
    pub fn preorder(&self) -> Vec<&DesignComponent> {
        let Some(root) = self.root.as_ref() else {
            return Vec::new();
        };
        std::iter::once(root.clone())
            .chain(self.descendants(root))
            .filter_map(|id| self.nodes.get(&id))
            .collect()
    }

    /// Clones of a node and its descendants, in pre-order.
    pub fn subtree(&self, id: impl AsRef<str>) -> Result<Vec<DesignComponent>, TreeError> {
        let id = id.as_ref();
        let node = self
            .nodes
            .get(id)
            .ok_or_else(|| TreeError::NotFound { id: id.into() })?;
        let mut out = vec![node.clone()];
        out.extend(
            self.descendants(id)
                .iter()
                .filter_map(|d| self.nodes.get(d))
                .cloned(),
        );
        Ok(out)
    }

    /// Check that a node of `child_type` may be placed under `parent`.
    pub fn can_contain(
        &self,
        parent: impl AsRef<str>,
        child_type: &ComponentType,
    ) -> Result<(), TreeError> {
        let parent = parent.as_ref();
        let node = self
            .nodes
            .get(parent)
            .ok_or_else(|| TreeError::ParentNotFound { id: parent.into() })?;
        if !node.is_container() {
            return Err(TreeError::NotAContainer {
                id: node.id.clone(),
                component_type: node.component_type.clone(),
            });
        }
        if !node.accepts(child_type) {
            return Err(TreeError::IncompatibleChild {
                parent: node.id.clone(),
                child_type: child_type.clone(),
            });
        }
        Ok(())
    }

    /// Add a node of `component_type` with default properties.
    pub fn add(
        &mut self,
        component_type: ComponentType,
        parent: impl AsRef<str>,
        index: Option<usize>,
    ) -> Result<ComponentId, TreeError> {
        self.add_with(component_type, parent, index, Properties::new())
    }

    /// Add a node, merging `overrides` over the type defaults. Overrides are
    /// normalized against the type schema, so loose values such as `"20sp"`
    /// are stored as numbers. Appends when `index` is `None`; out-of-range
    /// indices are clamped.
    pub fn add_with(
        &mut self,
        component_type: ComponentType,
        parent: impl AsRef<str>,
        index: Option<usize>,
        overrides: Properties,
    ) -> Result<ComponentId, TreeError> {
        let parent = parent.as_ref();
        self.can_contain(parent, &component_type).map_err(reject)?;

        let id = self.next_id();
        let mut properties = schema::default_properties(&component_type);
        properties.merge(schema::normalize_properties(&component_type, overrides));
        let name = format!("{} {}", component_type, self.next_id - 1);
        let node = DesignComponent::new(id.clone(), component_type, name)
            .with_properties(properties)
            .with_parent(parent);

        self.attach(node, parent, index);
        debug!(id = %id, parent, "component added");
        Ok(id)
    }

    /// Add a node referencing a custom component template.
    pub fn add_template_ref(
        &mut self,
        template_id: &str,
        name: &str,
        parent: impl AsRef<str>,
        index: Option<usize>,
    ) -> Result<ComponentId, TreeError> {
        let parent = parent.as_ref();
        self.can_contain(parent, &ComponentType::Custom).map_err(reject)?;

        let id = self.next_id();
        let node = DesignComponent::new(id.clone(), ComponentType::Custom, name)
            .with_template_ref(template_id)
            .with_parent(parent);
        self.attach(node, parent, index);
        debug!(id = %id, template_id, "template reference added");
        Ok(id)
    }

    /// Insert `node` into the map and into `parent`'s children. Callers
    /// have validated the parent.
    fn attach(&mut self, node: DesignComponent, parent: &str, index: Option<usize>) {
        let id = node.id.clone();
        self.nodes.insert(id.clone(), node);
        if let Some(parent) = self.nodes.get_mut(parent) {
            let at = index.unwrap_or(parent.children.len()).min(parent.children.len());
            parent.children.insert(at, id);
        }
    }

    /// Graft a prebuilt subtree under `parent`. `nodes[0]` must be the
    /// subtree root; ids must not collide with existing nodes.
    pub fn graft(
        &mut self,
        mut nodes: Vec<DesignComponent>,
        parent: impl AsRef<str>,
        index: Option<usize>,
    ) -> Result<ComponentId, TreeError> {
        let parent = parent.as_ref();
        let Some(root) = nodes.first_mut() else {
            return Err(TreeError::EmptyTree);
        };
        self.can_contain(parent, &root.component_type).map_err(reject)?;
        root.parent_id = Some(parent.into());
        let root_id = root.id.clone();

        let mut seen = HashSet::new();
        for node in &nodes {
            if self.nodes.contains_key(&node.id) || !seen.insert(&node.id) {
                return Err(reject(TreeError::DuplicateId { id: node.id.clone() }));
            }
        }

        let mut nodes = nodes.into_iter();
        if let Some(root) = nodes.next() {
            self.attach(root, parent, index);
        }
        for node in nodes {
            self.nodes.insert(node.id.clone(), node);
        }
        debug!(id = %root_id, parent, "subtree grafted");
        Ok(root_id)
    }

    /// Delete a node and its whole subtree. Returns every removed id, the
    /// node itself first.
    pub fn delete(&mut self, id: impl AsRef<str>) -> Result<Vec<ComponentId>, TreeError> {
        let id = id.as_ref();
        let node = self
            .nodes
            .get(id)
            .ok_or_else(|| reject(TreeError::NotFound { id: id.into() }))?;
        if node.is_reserved_slot() || self.root.as_ref() == Some(&node.id) {
            return Err(reject(TreeError::ReservedSlot {
                id: node.id.clone(),
                operation: "deleted",
            }));
        }

        let mut removed = vec![node.id.clone()];
        removed.extend(self.descendants(id));

        if let Some(parent_id) = node.parent_id.clone() {
            if let Some(parent) = self.nodes.get_mut(&parent_id) {
                parent.children.retain(|c| c.as_str() != id);
            }
        }
        for removed_id in &removed {
            self.nodes.shift_remove(removed_id);
        }
        debug!(id, count = removed.len(), "subtree deleted");
        Ok(removed)
    }

    /// Shallow-merge `properties` into a node's property bag, normalized
    /// against the node's type schema.
    pub fn update(&mut self, id: impl AsRef<str>, mut properties: Properties) -> Result<(), TreeError> {
        let id = id.as_ref();
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| reject(TreeError::NotFound { id: id.into() }))?;
        // Structure only changes through add/move/delete.
        if properties.remove("children").is_some() {
            warn!(id, "ignoring 'children' in property update");
        }
        let properties = schema::normalize_properties(&node.component_type, properties);
        node.properties.merge(properties);
        debug!(id, "properties updated");
        Ok(())
    }

    /// Remove a single property so it falls back to "absent".
    pub fn clear_property(&mut self, id: impl AsRef<str>, name: &str) -> Result<(), TreeError> {
        let id = id.as_ref();
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| reject(TreeError::NotFound { id: id.into() }))?;
        node.properties.remove(name);
        Ok(())
    }

    /// Change a node's user-facing label.
    pub fn rename(&mut self, id: impl AsRef<str>, name: impl Into<String>) -> Result<(), TreeError> {
        let id = id.as_ref();
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| reject(TreeError::NotFound { id: id.into() }))?;
        node.name = name.into();
        Ok(())
    }

    /// Check every precondition of a move without mutating.
    pub fn check_move(&self, id: impl AsRef<str>, new_parent: impl AsRef<str>) -> Result<(), TreeError> {
        let id = id.as_ref();
        let new_parent = new_parent.as_ref();
        let node = self
            .nodes
            .get(id)
            .ok_or_else(|| TreeError::NotFound { id: id.into() })?;
        if node.is_reserved_slot() || node.parent_id.is_none() {
            return Err(TreeError::ReservedSlot {
                id: node.id.clone(),
                operation: "moved",
            });
        }
        self.can_contain(new_parent, &node.component_type)?;
        if id == new_parent || self.is_ancestor(id, new_parent) {
            return Err(TreeError::CycleDetected {
                id: node.id.clone(),
                target: new_parent.into(),
            });
        }
        Ok(())
    }

    /// Move a node under `new_parent` at `index`.
    ///
    /// `index` addresses the new parent's children after the node has been
    /// removed from its old position, so reordering within the same parent
    /// uses final positions. `None` appends. The move is atomic: a rejected
    /// move leaves the tree unchanged.
    pub fn move_component(
        &mut self,
        id: impl AsRef<str>,
        new_parent: impl AsRef<str>,
        index: Option<usize>,
    ) -> Result<(), TreeError> {
        let id = id.as_ref();
        let new_parent = new_parent.as_ref();
        self.check_move(id, new_parent).map_err(reject)?;

        let old_parent = self.parent(id).cloned();
        if let Some(old_parent) = old_parent.and_then(|p| self.nodes.get_mut(&p)) {
            old_parent.children.retain(|c| c.as_str() != id);
        }
        if let Some(node) = self.nodes.get_mut(id) {
            node.parent_id = Some(new_parent.into());
        }
        if let Some(parent) = self.nodes.get_mut(new_parent) {
            let at = index.unwrap_or(parent.children.len()).min(parent.children.len());
            parent.children.insert(at, id.into());
        }
        debug!(id, parent = new_parent, ?index, "component moved");
        Ok(())
    }

    /// Deep-copy a subtree with fresh ids and insert the copy directly after
    /// the original.
    pub fn duplicate(&mut self, id: impl AsRef<str>) -> Result<ComponentId, TreeError> {
        let id = id.as_ref();
        let node = self
            .nodes
            .get(id)
            .ok_or_else(|| reject(TreeError::NotFound { id: id.into() }))?;
        let Some(parent) = node.parent_id.clone().filter(|_| !node.is_reserved_slot()) else {
            return Err(reject(TreeError::ReservedSlot {
                id: node.id.clone(),
                operation: "duplicated",
            }));
        };
        let index = self.index_in_parent(id).map(|i| i + 1);
        let subtree = self.subtree(id)?;
        let copy = reassign_ids(subtree, || self.next_id())?;
        self.graft(copy, parent, index)
    }

    /// Replace the whole tree with a validated node set.
    pub fn overwrite(
        &mut self,
        components: impl IntoIterator<Item = DesignComponent>,
    ) -> Result<(), TreeError> {
        let candidate = Self::from_components(components).map_err(reject)?;
        let next_id = self.next_id.max(candidate.next_id);
        *self = candidate;
        self.next_id = next_id;
        debug!(count = self.nodes.len(), "tree overwritten");
        Ok(())
    }

    /// Check every structural invariant; returns the first violation.
    pub fn validate(&self) -> Result<(), TreeError> {
        let inconsistent =
            |reason: String| -> Result<(), TreeError> { Err(TreeError::Inconsistent { reason }) };

        let Some(root_id) = self.root.as_ref() else {
            return if self.nodes.is_empty() {
                Ok(())
            } else {
                inconsistent("tree has nodes but no root".to_string())
            };
        };
        match self.nodes.get(root_id) {
            None => return inconsistent(format!("root {root_id} does not exist")),
            Some(root) if root.parent_id.is_some() => {
                return inconsistent(format!("root {root_id} has a parent"))
            }
            _ => {}
        }

        for node in self.nodes.values() {
            match &node.parent_id {
                None if &node.id != root_id => {
                    return inconsistent(format!("{} has no parent but is not the root", node.id))
                }
                None => {}
                Some(parent_id) => {
                    let Some(parent) = self.nodes.get(parent_id) else {
                        return inconsistent(format!("{} references missing parent {parent_id}", node.id));
                    };
                    let count = parent.children.iter().filter(|c| *c == &node.id).count();
                    if count != 1 {
                        return inconsistent(format!(
                            "{} appears {count} times in children of {parent_id}",
                            node.id
                        ));
                    }
                }
            }

            if !node.is_container() && !node.children.is_empty() {
                return inconsistent(format!("leaf {} has children", node.id));
            }
            for child_id in &node.children {
                match self.nodes.get(child_id) {
                    None => {
                        return inconsistent(format!("{} lists missing child {child_id}", node.id))
                    }
                    Some(child) if child.parent_id.as_ref() != Some(&node.id) => {
                        return inconsistent(format!(
                            "{child_id} is listed under {} but its parent is {:?}",
                            node.id, child.parent_id
                        ))
                    }
                    _ => {}
                }
            }
        }

        // Every parent chain must reach the root without revisiting a node.
        let mut reaches_root: HashMap<&ComponentId, bool> = HashMap::new();
        reaches_root.insert(root_id, true);
        for id in self.nodes.keys() {
            let mut path = Vec::new();
            let mut current = id;
            let mut visited = HashSet::new();
            while !reaches_root.contains_key(current) {
                if !visited.insert(current) {
                    return Err(TreeError::CycleDetected {
                        id: current.clone(),
                        target: current.clone(),
                    });
                }
                path.push(current);
                match self.nodes.get(current).and_then(|n| n.parent_id.as_ref()) {
                    Some(parent) => current = parent,
                    None => return inconsistent(format!("{current} is detached from the root")),
                }
            }
            for p in path {
                reaches_root.insert(p, true);
            }
        }
        Ok(())
    }
}

/// Copy a subtree (root first, as returned by [`DesignTree::subtree`]) giving
/// every node a fresh id from `alloc`. Parent and child references inside the
/// subtree are rewritten; the root's parent is cleared.
pub fn reassign_ids(
    nodes: Vec<DesignComponent>,
    mut alloc: impl FnMut() -> ComponentId,
) -> Result<Vec<DesignComponent>, TreeError> {
    let mapping: HashMap<ComponentId, ComponentId> =
        nodes.iter().map(|n| (n.id.clone(), alloc())).collect();
    if mapping.len() != nodes.len() {
        let mut seen = HashSet::new();
        let dup = nodes.iter().find(|n| !seen.insert(&n.id)).map(|n| n.id.clone());
        return Err(TreeError::DuplicateId {
            id: dup.unwrap_or_else(|| ComponentId::from("?")),
        });
    }

    let remap = |id: &ComponentId| -> Result<ComponentId, TreeError> {
        mapping.get(id).cloned().ok_or_else(|| TreeError::Inconsistent {
            reason: format!("subtree references {id} outside of itself"),
        })
    };

    nodes
        .into_iter()
        .enumerate()
        .map(|(i, mut node)| -> Result<DesignComponent, TreeError> {
            node.id = remap(&node.id)?;
            node.parent_id = if i == 0 {
                None
            } else {
                node.parent_id.as_ref().map(remap).transpose()?
            };
            node.children = node.children.iter().map(remap).collect::<Result<_, _>>()?;
            node.slot = None;
            Ok(node)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scaffold_with_column() -> (DesignTree, ComponentId) {
        let mut tree = DesignTree::with_scaffold();
        let column = tree.add(ComponentType::Column, "content", None).unwrap();
        (tree, column)
    }

    #[test]
    fn test_scaffold() {
        let tree = DesignTree::with_scaffold();
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.root().map(|r| r.as_str()), Some("root"));
        assert_eq!(
            tree.children("root").iter().map(|c| c.as_str()).collect::<Vec<_>>(),
            ["top-bar", "content", "bottom-bar"]
        );
        assert!(tree.get("content").unwrap().is_reserved_slot());
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_add_merges_defaults() {
        let mut tree = DesignTree::with_scaffold();
        let id = tree
            .add_with(
                ComponentType::Text,
                "content",
                None,
                Properties::new().with("text", "Hi"),
            )
            .unwrap();
        let node = tree.get(&id).unwrap();
        assert_eq!(node.properties.get_str("text"), Some("Hi"));
        assert_eq!(node.properties.get_number("fontSize"), Some(14.0));
        assert_eq!(node.parent_id.as_ref().map(|p| p.as_str()), Some("content"));
        assert_eq!(tree.children("content"), &[id]);
    }

    #[test]
    fn test_add_at_index() {
        let (mut tree, column) = scaffold_with_column();
        let a = tree.add(ComponentType::Text, &column, None).unwrap();
        let b = tree.add(ComponentType::Text, &column, None).unwrap();
        let c = tree.add(ComponentType::Text, &column, Some(1)).unwrap();
        let d = tree.add(ComponentType::Text, &column, Some(99)).unwrap();
        assert_eq!(tree.children(&column), &[a, c, b, d]);
    }

    #[test]
    fn test_add_rejects_invalid_parent() {
        let (mut tree, column) = scaffold_with_column();
        let text = tree.add(ComponentType::Text, &column, None).unwrap();
        let before = tree.clone();

        assert!(matches!(
            tree.add(ComponentType::Text, "missing", None),
            Err(TreeError::ParentNotFound { .. })
        ));
        assert!(matches!(
            tree.add(ComponentType::Text, &text, None),
            Err(TreeError::NotAContainer { .. })
        ));
        assert!(matches!(
            tree.add(ComponentType::Text, "root", None),
            Err(TreeError::IncompatibleChild { .. })
        ));
        assert!(matches!(
            tree.add(ComponentType::LazyColumn, "top-bar", None),
            Err(TreeError::IncompatibleChild { .. })
        ));
        assert_eq!(tree, before);
    }

    #[test]
    fn test_ids_are_monotonic() {
        let mut tree = DesignTree::with_scaffold();
        let a = tree.add(ComponentType::Text, "content", None).unwrap();
        tree.delete(&a).unwrap();
        let b = tree.add(ComponentType::Text, "content", None).unwrap();
        assert_ne!(a, b);
        assert!(b.counter_suffix() > a.counter_suffix());
    }

    #[test]
    fn test_delete_subtree() {
        let (mut tree, column) = scaffold_with_column();
        let row = tree.add(ComponentType::Row, &column, None).unwrap();
        let text = tree.add(ComponentType::Text, &row, None).unwrap();
        let sibling = tree.add(ComponentType::Button, "content", None).unwrap();

        let removed = tree.delete(&column).unwrap();
        assert_eq!(removed, vec![column.clone(), row.clone(), text.clone()]);
        assert!(!tree.contains(&column));
        assert!(!tree.contains(&row));
        assert!(!tree.contains(&text));
        assert_eq!(tree.children("content"), &[sibling]);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_delete_reserved_slot() {
        let mut tree = DesignTree::with_scaffold();
        assert!(matches!(
            tree.delete("content"),
            Err(TreeError::ReservedSlot { .. })
        ));
        assert!(matches!(tree.delete("root"), Err(TreeError::ReservedSlot { .. })));
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn test_update_is_shallow_merge() {
        let mut tree = DesignTree::with_scaffold();
        let id = tree.add(ComponentType::Text, "content", None).unwrap();
        tree.update(&id, Properties::new().with("fontSize", 20)).unwrap();
        let node = tree.get(&id).unwrap();
        assert_eq!(node.properties.get_number("fontSize"), Some(20.0));
        assert_eq!(node.properties.get_str("text"), Some("Text"));
    }

    #[test]
    fn test_add_and_update_normalize_against_schema() {
        let mut tree = DesignTree::with_scaffold();
        let id = tree
            .add_with(
                ComponentType::Text,
                "content",
                None,
                Properties::new().with("text", "#bad").with("fontSize", "20sp"),
            )
            .unwrap();
        let node = tree.get(&id).unwrap();
        assert_eq!(node.properties.get_str("text"), Some("#bad"));
        assert_eq!(node.properties.get_number("fontSize"), Some(20.0));

        tree.update(&id, Properties::new().with("fontSize", "24")).unwrap();
        assert_eq!(tree.get(&id).unwrap().properties.get_number("fontSize"), Some(24.0));
    }

    #[test]
    fn test_update_ignores_children_key() {
        let mut tree = DesignTree::with_scaffold();
        tree.update("content", Properties::new().with("children", "oops")).unwrap();
        assert!(!tree.get("content").unwrap().properties.contains("children"));
    }

    #[test]
    fn test_move_between_parents() {
        let (mut tree, column) = scaffold_with_column();
        let text = tree.add(ComponentType::Text, "content", None).unwrap();
        tree.move_component(&text, &column, None).unwrap();
        assert_eq!(tree.children(&column), &[text.clone()]);
        assert_eq!(tree.children("content"), &[column.clone()]);
        assert_eq!(tree.parent(&text), Some(&column));
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_move_reorders_within_parent() {
        let (mut tree, column) = scaffold_with_column();
        let a = tree.add(ComponentType::Text, &column, None).unwrap();
        let b = tree.add(ComponentType::Text, &column, None).unwrap();
        let c = tree.add(ComponentType::Text, &column, None).unwrap();

        tree.move_component(&a, &column, Some(2)).unwrap();
        assert_eq!(tree.children(&column), &[b.clone(), c.clone(), a.clone()]);

        tree.move_component(&a, &column, Some(0)).unwrap();
        assert_eq!(tree.children(&column), &[a, b, c]);
    }

    #[test]
    fn test_move_cycle_is_atomic() {
        let (mut tree, column) = scaffold_with_column();
        let row = tree.add(ComponentType::Row, &column, None).unwrap();
        let before = tree.clone();

        assert!(matches!(
            tree.move_component(&column, &row, None),
            Err(TreeError::CycleDetected { .. })
        ));
        assert!(matches!(
            tree.move_component(&column, &column, None),
            Err(TreeError::CycleDetected { .. })
        ));
        assert_eq!(tree, before);
    }

    #[test]
    fn test_move_reserved_slot_rejected() {
        let (mut tree, column) = scaffold_with_column();
        let before = tree.clone();
        assert!(matches!(
            tree.move_component("top-bar", &column, None),
            Err(TreeError::ReservedSlot { .. })
        ));
        assert_eq!(tree, before);
    }

    #[test]
    fn test_duplicate() {
        let (mut tree, column) = scaffold_with_column();
        let text = tree
            .add_with(ComponentType::Text, &column, None, Properties::new().with("text", "Hi"))
            .unwrap();
        let after = tree.add(ComponentType::Button, "content", None).unwrap();

        let copy = tree.duplicate(&column).unwrap();
        assert_eq!(tree.children("content"), &[column.clone(), copy.clone(), after]);
        let copied_children = tree.children(&copy).to_vec();
        assert_eq!(copied_children.len(), 1);
        assert_ne!(copied_children[0], text);
        assert_eq!(
            tree.get(&copied_children[0]).unwrap().properties.get_str("text"),
            Some("Hi")
        );
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_from_components_rejects_inconsistent() {
        let root = DesignComponent::new("a", ComponentType::Column, "A");
        let orphan_child = DesignComponent::new("b", ComponentType::Text, "B").with_parent("a");
        let err = DesignTree::from_components(vec![root, orphan_child]).unwrap_err();
        assert!(matches!(err, TreeError::Inconsistent { .. }));
    }

    #[test]
    fn test_from_components_resumes_counter() {
        let mut root = DesignComponent::new("component-7", ComponentType::Column, "A");
        root.children.push("component-9".into());
        let child = DesignComponent::new("component-9", ComponentType::Text, "B")
            .with_parent("component-7");
        let mut tree = DesignTree::from_components(vec![root, child]).unwrap();
        assert_eq!(tree.next_id().as_str(), "component-10");
    }

    #[test]
    fn test_overwrite_failure_keeps_tree() {
        let (mut tree, _) = scaffold_with_column();
        let before = tree.clone();
        let bad = vec![
            DesignComponent::new("x", ComponentType::Column, "X"),
            DesignComponent::new("x", ComponentType::Column, "X"),
        ];
        assert!(tree.overwrite(bad).is_err());
        assert_eq!(tree, before);
    }

    #[test]
    fn test_preorder() {
        let (mut tree, column) = scaffold_with_column();
        let text = tree.add(ComponentType::Text, &column, None).unwrap();
        let ids: Vec<_> = tree.preorder().iter().map(|n| n.id.clone()).collect();
        assert_eq!(
            ids,
            vec![
                ComponentId::from("root"),
                ComponentId::from("top-bar"),
                ComponentId::from("content"),
                column,
                text,
                ComponentId::from("bottom-bar"),
            ]
        );
    }
}
