//! Property-based invariant tests for the design tree store.
//!
//! Random operation sequences are applied to a scaffolded tree and after
//! every step we check:
//!
//! 1. Parent and children indices agree (`validate` passes).
//! 2. No node is its own ancestor.
//! 3. A rejected mutation leaves the tree unchanged.
//! 4. Delete removes the node and every descendant.
//! 5. Successful moves land the node under the requested parent.

use builder_core::{ComponentId, ComponentType, Properties};
use builder_tree::DesignTree;
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    Add { ty: usize, parent: usize, index: Option<usize> },
    Delete { node: usize },
    Move { node: usize, parent: usize, index: Option<usize> },
    Duplicate { node: usize },
    Update { node: usize, padding: u8 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let index = prop::option::of(0usize..6);
    prop_oneof![
        3 => (any::<usize>(), any::<usize>(), index.clone())
            .prop_map(|(ty, parent, index)| Op::Add { ty, parent, index }),
        1 => any::<usize>().prop_map(|node| Op::Delete { node }),
        3 => (any::<usize>(), any::<usize>(), index)
            .prop_map(|(node, parent, index)| Op::Move { node, parent, index }),
        1 => any::<usize>().prop_map(|node| Op::Duplicate { node }),
        1 => (any::<usize>(), any::<u8>()).prop_map(|(node, padding)| Op::Update { node, padding }),
    ]
}

fn pick(tree: &DesignTree, n: usize) -> ComponentId {
    let nodes = tree.preorder();
    nodes[n % nodes.len()].id.clone()
}

fn assert_acyclic(tree: &DesignTree) -> Result<(), TestCaseError> {
    for node in tree.components() {
        prop_assert!(
            !tree.is_ancestor(&node.id, &node.id),
            "{} is its own ancestor",
            node.id
        );
        prop_assert!(tree.ancestors(&node.id).len() < tree.len());
    }
    Ok(())
}

fn apply(tree: &mut DesignTree, op: &Op) -> Result<(), TestCaseError> {
    let before = tree.clone();
    let rejected = match op {
        Op::Add { ty, parent, index } => {
            let palette = ComponentType::palette();
            let ty = palette[ty % palette.len()].clone();
            let parent = pick(tree, *parent);
            match tree.add(ty, &parent, *index) {
                Ok(id) => {
                    prop_assert_eq!(tree.parent(&id), Some(&parent));
                    false
                }
                Err(_) => true,
            }
        }
        Op::Delete { node } => {
            let id = pick(tree, *node);
            let expected: Vec<ComponentId> = std::iter::once(id.clone())
                .chain(tree.descendants(&id))
                .collect();
            match tree.delete(&id) {
                Ok(removed) => {
                    prop_assert_eq!(&removed, &expected);
                    for gone in &removed {
                        prop_assert!(!tree.contains(gone), "{} survived delete", gone);
                    }
                    prop_assert_eq!(tree.len(), before.len() - removed.len());
                    false
                }
                Err(_) => true,
            }
        }
        Op::Move { node, parent, index } => {
            let id = pick(tree, *node);
            let parent = pick(tree, *parent);
            match tree.move_component(&id, &parent, *index) {
                Ok(()) => {
                    prop_assert_eq!(tree.parent(&id), Some(&parent));
                    prop_assert_eq!(tree.len(), before.len());
                    false
                }
                Err(_) => true,
            }
        }
        Op::Duplicate { node } => {
            let id = pick(tree, *node);
            let size = tree.subtree(&id).map(|s| s.len()).unwrap_or(0);
            match tree.duplicate(&id) {
                Ok(copy) => {
                    prop_assert_eq!(tree.index_in_parent(&copy), tree.index_in_parent(&id).map(|i| i + 1));
                    prop_assert_eq!(tree.len(), before.len() + size);
                    false
                }
                Err(_) => true,
            }
        }
        Op::Update { node, padding } => {
            let id = pick(tree, *node);
            tree.update(&id, Properties::new().with("padding", f64::from(*padding)))
                .map_err(|e| TestCaseError::fail(e.to_string()))?;
            false
        }
    };

    if rejected {
        prop_assert_eq!(&*tree, &before, "rejected {:?} mutated the tree", op);
    }
    Ok(())
}

// ═════════════════════════════════════════════════════════════════════════
// 1-5. Invariants hold across random operation sequences
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn invariants_hold_under_random_ops(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let mut tree = DesignTree::with_scaffold();
        for op in &ops {
            apply(&mut tree, op)?;
            prop_assert!(tree.validate().is_ok(), "invalid after {:?}: {:?}", op, tree.validate());
            assert_acyclic(&tree)?;
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// Reserved slots survive everything
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn reserved_slots_are_permanent(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let mut tree = DesignTree::with_scaffold();
        for op in &ops {
            apply(&mut tree, op)?;
        }
        let top: Vec<&str> = tree.children("root").iter().map(|c| c.as_str()).collect();
        prop_assert_eq!(top, vec!["top-bar", "content", "bottom-bar"]);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// Moving into a descendant is always rejected
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn move_into_descendant_rejected(depth in 1usize..6, index in prop::option::of(0usize..3)) {
        let mut tree = DesignTree::with_scaffold();
        let top = tree.add(ComponentType::Column, "content", None).unwrap();
        let mut leaf = top.clone();
        for _ in 0..depth {
            leaf = tree.add(ComponentType::Box, &leaf, None).unwrap();
        }
        let before = tree.clone();
        prop_assert!(tree.move_component(&top, &leaf, index).is_err());
        prop_assert_eq!(tree, before);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// Export to a flat list and back yields the same tree
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn flat_round_trip(ops in prop::collection::vec(op_strategy(), 1..30)) {
        let mut tree = DesignTree::with_scaffold();
        for op in &ops {
            apply(&mut tree, op)?;
        }
        let flat: Vec<_> = tree.preorder().into_iter().cloned().collect();
        let rebuilt = DesignTree::from_components(flat).unwrap();
        let a: Vec<_> = tree.preorder().into_iter().cloned().collect();
        let b: Vec<_> = rebuilt.preorder().into_iter().cloned().collect();
        prop_assert_eq!(a, b);
    }
}
