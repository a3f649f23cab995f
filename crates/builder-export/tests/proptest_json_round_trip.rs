//! Property-based round trip for tree JSON.
//!
//! Random trees are exported, re-imported, and compared node by node:
//! ids, types, names, parent links, child order and property values must all
//! survive. Import of a mutated document must either fail or yield a tree
//! that passes validation.

use builder_core::{schema, ComponentType, Properties, PropertyValue};
use builder_export::{export_tree, import_tree, import_value, to_json_string};
use builder_tree::DesignTree;
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Step {
    ty: usize,
    parent: usize,
    props: Vec<(usize, Raw)>,
}

#[derive(Debug, Clone)]
enum Raw {
    Text(String),
    Number(i32),
    Flag(bool),
}

const KEYS: &[&str] = &[
    "text",
    "padding",
    "fillMaxWidth",
    "label",
    "spacing",
    "clickable",
    "backgroundColor",
    "tag",
];

fn raw_strategy() -> impl Strategy<Value = Raw> {
    prop_oneof![
        "[a-zA-Z ]{0,12}".prop_map(Raw::Text),
        "#[0-9a-fA-F]{3,8}".prop_map(Raw::Text),
        (0i32..400).prop_map(Raw::Number),
        any::<bool>().prop_map(Raw::Flag),
    ]
}

fn step_strategy() -> impl Strategy<Value = Step> {
    (
        any::<usize>(),
        any::<usize>(),
        prop::collection::vec((0..KEYS.len(), raw_strategy()), 0..4),
    )
        .prop_map(|(ty, parent, props)| Step { ty, parent, props })
}

fn build(steps: &[Step]) -> DesignTree {
    let mut tree = DesignTree::with_scaffold();
    let palette = ComponentType::palette();
    for step in steps {
        let containers: Vec<_> = tree
            .preorder()
            .into_iter()
            .filter(|n| n.is_container())
            .map(|n| n.id.clone())
            .collect();
        let parent = &containers[step.parent % containers.len()];
        let ty = palette[step.ty % palette.len()].clone();
        let props: Properties = step
            .props
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    Raw::Text(s) => PropertyValue::String(s.clone()),
                    Raw::Number(n) => PropertyValue::Number(f64::from(*n)),
                    Raw::Flag(b) => PropertyValue::Boolean(*b),
                };
                (KEYS[*key].to_string(), value)
            })
            .collect();
        let props = schema::normalize_properties(&ty, props);
        // Incompatible placements are rejected; the tree stays valid.
        let _ = tree.add_with(ty, parent, None, props);
    }
    tree
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn round_trip_preserves_tree(steps in prop::collection::vec(step_strategy(), 0..24)) {
        let tree = build(&steps);
        let text = to_json_string(&tree).unwrap();
        let imported = import_tree(&text).unwrap();

        prop_assert!(imported.validate().is_ok());
        prop_assert_eq!(imported.len(), tree.len());
        prop_assert_eq!(imported.preorder(), tree.preorder());
    }

    #[test]
    fn export_is_deterministic(steps in prop::collection::vec(step_strategy(), 0..16)) {
        let tree = build(&steps);
        prop_assert_eq!(export_tree(&tree), export_tree(&tree.clone()));
        let once = to_json_string(&tree).unwrap();
        let twice = to_json_string(&import_tree(&once).unwrap()).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn dropped_subtree_still_imports_or_fails_cleanly(
        steps in prop::collection::vec(step_strategy(), 1..16),
        victim in any::<usize>(),
    ) {
        let tree = build(&steps);
        let mut doc = export_tree(&tree);

        // Remove one nested child object somewhere in the document.
        let content = &mut doc[0]["properties"]["children"][1]["properties"]["children"];
        if let Some(children) = content.as_array_mut() {
            if !children.is_empty() {
                let at = victim % children.len();
                children.remove(at);
            }
        }

        match import_value(doc) {
            Ok(imported) => prop_assert!(imported.validate().is_ok()),
            Err(_) => {}
        }
    }
}
