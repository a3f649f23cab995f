//! Drop-target resolution: pointer position -> hover state -> tree position.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use builder_core::{ComponentId, ComponentType, TreeError};
use builder_tree::DesignTree;

use crate::bounds::{along, CanvasLayout};

/// What the pointer is currently over during a drag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Hover {
    /// Nest inside a container at `index`.
    OverContainer { id: ComponentId, index: usize },
    /// Insert before `id` in its parent.
    OverSiblingTop { id: ComponentId },
    /// Insert after `id` in its parent.
    OverSiblingBottom { id: ComponentId },
}

/// A resolved insertion point.
///
/// `index` addresses the parent's children with the dragged node already
/// removed, matching [`DesignTree::move_component`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropTarget {
    pub parent: ComponentId,
    pub index: usize,
}

/// Where a drag originates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum DragSource {
    /// A palette entry: dropping adds a new node.
    Library(ComponentType),
    /// A custom component template: dropping adds a reference.
    Template(String),
    /// An existing node: dropping moves it.
    Canvas(ComponentId),
}

impl DragSource {
    /// Id of the node being moved, if any.
    pub fn moving(&self) -> Option<&ComponentId> {
        match self {
            Self::Canvas(id) => Some(id),
            _ => None,
        }
    }

    /// Type of the node that would land in the tree.
    pub fn component_type(&self, tree: &DesignTree) -> Option<ComponentType> {
        match self {
            Self::Library(ty) => Some(ty.clone()),
            Self::Template(_) => Some(ComponentType::Custom),
            Self::Canvas(id) => tree.get(id).map(|n| n.component_type.clone()),
        }
    }
}

/// Main axis of a node's children: horizontal for Row-like containers.
fn main_axis_horizontal(tree: &DesignTree, id: &ComponentId) -> bool {
    tree.get(id).is_some_and(|n| n.component_type.is_horizontal())
}

/// Children of `parent` with the dragged node left out.
fn remaining_children<'a>(
    tree: &'a DesignTree,
    parent: &ComponentId,
    exclude: Option<&'a ComponentId>,
) -> impl Iterator<Item = &'a ComponentId> {
    tree.children(parent)
        .iter()
        .filter(move |c| Some(*c) != exclude)
}

/// Insertion index inside `container` from child centers along its main axis.
pub fn insertion_index(
    tree: &DesignTree,
    layout: &CanvasLayout,
    container: &ComponentId,
    point: DVec2,
    exclude: Option<&ComponentId>,
) -> usize {
    let horizontal = main_axis_horizontal(tree, container);
    let pointer = along(point, horizontal);
    remaining_children(tree, container, exclude)
        .enumerate()
        .filter(|(_, child)| {
            layout
                .get(child)
                .is_some_and(|b| along(b.center(), horizontal) < pointer)
        })
        .map(|(i, _)| i + 1)
        .last()
        .unwrap_or(0)
}

/// Resolve the hover state for `point`. The subtree being dragged, if any,
/// is never a target.
pub fn resolve_hover(
    tree: &DesignTree,
    layout: &CanvasLayout,
    point: DVec2,
    exclude: Option<&ComponentId>,
) -> Option<Hover> {
    let hit = layout.hit_test(tree, point, exclude)?;
    let node = tree.get(&hit)?;
    let bounds = layout.get(&hit)?;
    let parent_axis = node
        .parent_id
        .as_ref()
        .map(|p| main_axis_horizontal(tree, p))
        .unwrap_or(false);

    if node.is_container() {
        if !node.is_reserved_slot() && node.parent_id.is_some() {
            let band = bounds.edge_band(parent_axis);
            let offset = along(point, parent_axis) - bounds.start(parent_axis);
            if offset < band {
                return Some(Hover::OverSiblingTop { id: hit });
            }
            if offset > bounds.extent(parent_axis) - band {
                return Some(Hover::OverSiblingBottom { id: hit });
            }
        }
        let index = insertion_index(tree, layout, &hit, point, exclude);
        return Some(Hover::OverContainer { id: hit, index });
    }

    node.parent_id.as_ref()?;
    let midpoint = bounds.start(parent_axis) + bounds.extent(parent_axis) / 2.0;
    if along(point, parent_axis) < midpoint {
        Some(Hover::OverSiblingTop { id: hit })
    } else {
        Some(Hover::OverSiblingBottom { id: hit })
    }
}

impl Hover {
    /// Translate the hover into a parent and insertion index.
    pub fn target(&self, tree: &DesignTree, exclude: Option<&ComponentId>) -> Option<DropTarget> {
        let (sibling, after) = match self {
            Self::OverContainer { id, index } => {
                return Some(DropTarget {
                    parent: id.clone(),
                    index: *index,
                })
            }
            Self::OverSiblingTop { id } => (id, false),
            Self::OverSiblingBottom { id } => (id, true),
        };
        let parent = tree.parent(sibling)?.clone();
        let position = remaining_children(tree, &parent, exclude).position(|c| c == sibling)?;
        Some(DropTarget {
            index: position + usize::from(after),
            parent,
        })
    }
}

/// Re-run the structural checks for dropping `source` at `target`.
pub fn validate_drop(
    tree: &DesignTree,
    source: &DragSource,
    target: &DropTarget,
) -> Result<(), TreeError> {
    match source {
        DragSource::Library(ty) => tree.can_contain(&target.parent, ty),
        DragSource::Template(_) => tree.can_contain(&target.parent, &ComponentType::Custom),
        DragSource::Canvas(id) => tree.check_move(id, &target.parent),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::Bounds;

    /// content (0,0 400x600) holding a Column with three 40px Text rows and
    /// a Row with two 100px Buttons.
    fn fixture() -> (DesignTree, CanvasLayout, Vec<ComponentId>) {
        let mut tree = DesignTree::with_scaffold();
        let column = tree.add(ComponentType::Column, "content", None).unwrap();
        let texts: Vec<_> = (0..3)
            .map(|_| tree.add(ComponentType::Text, &column, None).unwrap())
            .collect();
        let row = tree.add(ComponentType::Row, "content", None).unwrap();
        let b1 = tree.add(ComponentType::Button, &row, None).unwrap();
        let b2 = tree.add(ComponentType::Button, &row, None).unwrap();

        let mut layout = CanvasLayout::new()
            .with("root", Bounds::new(0.0, 0.0, 400.0, 600.0))
            .with("content", Bounds::new(0.0, 0.0, 400.0, 600.0))
            .with(column.clone(), Bounds::new(0.0, 0.0, 400.0, 200.0))
            .with(row.clone(), Bounds::new(0.0, 300.0, 400.0, 60.0))
            .with(b1.clone(), Bounds::new(0.0, 300.0, 100.0, 60.0))
            .with(b2.clone(), Bounds::new(100.0, 300.0, 100.0, 60.0));
        for (i, t) in texts.iter().enumerate() {
            layout.insert(t.clone(), Bounds::new(0.0, 20.0 + 40.0 * i as f64, 400.0, 40.0));
        }

        let mut ids = vec![column, row, b1, b2];
        ids.extend(texts);
        (tree, layout, ids)
    }

    #[test]
    fn test_container_index_from_child_centers() {
        let (tree, layout, ids) = fixture();
        let column = &ids[0];
        // Between the second and third text rows (centers 80 and 120); the
        // column's own area below the rows.
        let hover = resolve_hover(&tree, &layout, DVec2::new(10.0, 180.0), None);
        assert_eq!(
            hover,
            Some(Hover::OverContainer {
                id: column.clone(),
                index: 3
            })
        );
        assert_eq!(insertion_index(&tree, &layout, column, DVec2::new(0.0, 90.0), None), 2);
        assert_eq!(insertion_index(&tree, &layout, column, DVec2::new(0.0, 0.0), None), 0);
    }

    #[test]
    fn test_edge_band_reorders_as_sibling() {
        let (tree, layout, ids) = fixture();
        let row = &ids[1];
        assert_eq!(
            resolve_hover(&tree, &layout, DVec2::new(300.0, 302.0), None),
            Some(Hover::OverSiblingTop { id: row.clone() })
        );
        assert_eq!(
            resolve_hover(&tree, &layout, DVec2::new(300.0, 358.0), None),
            Some(Hover::OverSiblingBottom { id: row.clone() })
        );
        assert!(matches!(
            resolve_hover(&tree, &layout, DVec2::new(300.0, 330.0), None),
            Some(Hover::OverContainer { index: 2, .. })
        ));
    }

    #[test]
    fn test_slot_has_no_edge_band() {
        let (tree, layout, _) = fixture();
        assert!(matches!(
            resolve_hover(&tree, &layout, DVec2::new(300.0, 598.0), None),
            Some(Hover::OverContainer { ref id, index: 2 }) if id.as_str() == "content"
        ));
    }

    #[test]
    fn test_leaf_halves_follow_parent_axis() {
        let (tree, layout, ids) = fixture();
        let (b1, text0) = (&ids[2], &ids[4]);
        // Row is horizontal: split on x.
        assert_eq!(
            resolve_hover(&tree, &layout, DVec2::new(20.0, 330.0), None),
            Some(Hover::OverSiblingTop { id: b1.clone() })
        );
        assert_eq!(
            resolve_hover(&tree, &layout, DVec2::new(80.0, 330.0), None),
            Some(Hover::OverSiblingBottom { id: b1.clone() })
        );
        // Column is vertical: split on y.
        assert_eq!(
            resolve_hover(&tree, &layout, DVec2::new(200.0, 25.0), None),
            Some(Hover::OverSiblingTop { id: text0.clone() })
        );
    }

    #[test]
    fn test_target_adjusts_for_same_parent_move() {
        let (tree, _, ids) = fixture();
        let column = &ids[0];
        let (t0, t2) = (&ids[4], &ids[6]);

        let hover = Hover::OverSiblingBottom { id: t2.clone() };
        assert_eq!(
            hover.target(&tree, Some(t0)),
            Some(DropTarget {
                parent: column.clone(),
                index: 2
            })
        );
        assert_eq!(
            hover.target(&tree, None),
            Some(DropTarget {
                parent: column.clone(),
                index: 3
            })
        );
    }

    #[test]
    fn test_validate_drop() {
        let (tree, _, ids) = fixture();
        let column = &ids[0];
        let into_column = DropTarget {
            parent: column.clone(),
            index: 0,
        };
        assert!(validate_drop(&tree, &DragSource::Library(ComponentType::Text), &into_column).is_ok());
        assert!(matches!(
            validate_drop(&tree, &DragSource::Canvas(column.clone()), &into_column),
            Err(TreeError::CycleDetected { .. })
        ));
        assert!(matches!(
            validate_drop(
                &tree,
                &DragSource::Library(ComponentType::Card),
                &DropTarget {
                    parent: "top-bar".into(),
                    index: 0
                }
            ),
            Err(TreeError::IncompatibleChild { .. })
        ));
    }
}
