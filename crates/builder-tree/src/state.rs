//! Application state and the action dispatcher.
//!
//! The editor never mutates the tree directly: every change goes through
//! [`AppState::dispatch`], which applies one [`Action`] and keeps the
//! selection consistent with the tree.

use serde::{Deserialize, Serialize};
use tracing::debug;

use builder_core::{ComponentId, ComponentType, DesignComponent, Properties, TreeError};

use crate::registry::TemplateRegistry;
use crate::store::DesignTree;

/// A single editor action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Action {
    Add {
        component_type: ComponentType,
        parent: ComponentId,
        #[serde(default)]
        index: Option<usize>,
        #[serde(default)]
        properties: Properties,
    },
    Delete {
        id: ComponentId,
    },
    Update {
        id: ComponentId,
        properties: Properties,
    },
    /// Drop one property so the node falls back to the type default.
    ClearProperty {
        id: ComponentId,
        name: String,
    },
    Rename {
        id: ComponentId,
        name: String,
    },
    Move {
        id: ComponentId,
        parent: ComponentId,
        #[serde(default)]
        index: Option<usize>,
    },
    Duplicate {
        id: ComponentId,
    },
    Select {
        #[serde(default)]
        id: Option<ComponentId>,
    },
    Overwrite {
        components: Vec<DesignComponent>,
    },
    CaptureTemplate {
        id: ComponentId,
        name: String,
    },
    AddTemplateReference {
        template_id: String,
        parent: ComponentId,
        #[serde(default)]
        index: Option<usize>,
    },
    InstantiateTemplate {
        id: ComponentId,
    },
}

/// What a successful dispatch did.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Outcome {
    Created { id: ComponentId },
    Removed { ids: Vec<ComponentId> },
    Changed { id: ComponentId },
    Selected { id: Option<ComponentId> },
    Replaced { count: usize },
    TemplateCaptured { template_id: String },
}

/// The editor's whole mutable state.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub tree: DesignTree,
    pub selection: Option<ComponentId>,
    pub templates: TemplateRegistry,
    /// Incremented on every successful dispatch.
    pub revision: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    /// A fresh state holding the default scaffold.
    pub fn new() -> Self {
        Self::with_tree(DesignTree::with_scaffold())
    }

    pub fn with_tree(tree: DesignTree) -> Self {
        Self {
            tree,
            selection: None,
            templates: TemplateRegistry::new(),
            revision: 0,
        }
    }

    pub fn selected(&self) -> Option<&DesignComponent> {
        self.selection.as_ref().and_then(|id| self.tree.get(id))
    }

    /// Apply one action. On error nothing changes, selection included.
    pub fn dispatch(&mut self, action: Action) -> Result<Outcome, TreeError> {
        let outcome = match action {
            Action::Add {
                component_type,
                parent,
                index,
                properties,
            } => {
                let id = self.tree.add_with(component_type, &parent, index, properties)?;
                self.selection = Some(id.clone());
                Outcome::Created { id }
            }
            Action::Delete { id } => {
                let ids = self.tree.delete(&id)?;
                if self.selection.as_ref().is_some_and(|s| ids.contains(s)) {
                    self.selection = None;
                }
                Outcome::Removed { ids }
            }
            Action::Update { id, properties } => {
                self.tree.update(&id, properties)?;
                Outcome::Changed { id }
            }
            Action::ClearProperty { id, name } => {
                self.tree.clear_property(&id, &name)?;
                Outcome::Changed { id }
            }
            Action::Rename { id, name } => {
                self.tree.rename(&id, name)?;
                Outcome::Changed { id }
            }
            Action::Move { id, parent, index } => {
                self.tree.move_component(&id, &parent, index)?;
                Outcome::Changed { id }
            }
            Action::Duplicate { id } => {
                let id = self.tree.duplicate(&id)?;
                self.selection = Some(id.clone());
                Outcome::Created { id }
            }
            Action::Select { id } => {
                if let Some(id) = &id {
                    if !self.tree.contains(id) {
                        return Err(TreeError::NotFound { id: id.clone() });
                    }
                }
                self.selection = id.clone();
                Outcome::Selected { id }
            }
            Action::Overwrite { components } => {
                self.tree.overwrite(components)?;
                if !self.selection.as_ref().is_some_and(|s| self.tree.contains(s)) {
                    self.selection = None;
                }
                Outcome::Replaced {
                    count: self.tree.len(),
                }
            }
            Action::CaptureTemplate { id, name } => {
                let template_id = self.templates.capture(&self.tree, &id, name)?;
                Outcome::TemplateCaptured { template_id }
            }
            Action::AddTemplateReference {
                template_id,
                parent,
                index,
            } => {
                let id = self
                    .templates
                    .add_reference(&mut self.tree, &template_id, &parent, index)?;
                self.selection = Some(id.clone());
                Outcome::Created { id }
            }
            Action::InstantiateTemplate { id } => {
                let root = self.templates.instantiate(&mut self.tree, &id)?;
                if self.selection.as_ref() == Some(&id) {
                    self.selection = Some(root.clone());
                }
                Outcome::Created { id: root }
            }
        };
        self.revision += 1;
        debug!(revision = self.revision, ?outcome, "action applied");
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(state: &mut AppState, ty: ComponentType, parent: &str) -> ComponentId {
        match state
            .dispatch(Action::Add {
                component_type: ty,
                parent: parent.into(),
                index: None,
                properties: Properties::new(),
            })
            .unwrap()
        {
            Outcome::Created { id } => id,
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_add_selects_new_node() {
        let mut state = AppState::new();
        let id = add(&mut state, ComponentType::Text, "content");
        assert_eq!(state.selection.as_ref(), Some(&id));
        assert_eq!(state.revision, 1);
    }

    #[test]
    fn test_delete_clears_selection_in_subtree() {
        let mut state = AppState::new();
        let column = add(&mut state, ComponentType::Column, "content");
        let text = add(&mut state, ComponentType::Text, column.as_str());
        assert_eq!(state.selection.as_ref(), Some(&text));

        state.dispatch(Action::Delete { id: column }).unwrap();
        assert!(state.selection.is_none());
    }

    #[test]
    fn test_delete_keeps_unrelated_selection() {
        let mut state = AppState::new();
        let a = add(&mut state, ComponentType::Text, "content");
        let b = add(&mut state, ComponentType::Text, "content");
        state.dispatch(Action::Select { id: Some(a.clone()) }).unwrap();
        state.dispatch(Action::Delete { id: b }).unwrap();
        assert_eq!(state.selection, Some(a));
    }

    #[test]
    fn test_failed_dispatch_changes_nothing() {
        let mut state = AppState::new();
        let before = state.clone();
        assert!(state
            .dispatch(Action::Delete { id: "content".into() })
            .is_err());
        assert!(state
            .dispatch(Action::Select {
                id: Some("missing".into())
            })
            .is_err());
        assert_eq!(state, before);
    }

    #[test]
    fn test_action_json() {
        let action: Action = serde_json::from_str(
            r#"{"type":"add","componentType":"Text","parent":"content","properties":{"text":"Hi"}}"#,
        )
        .unwrap();
        assert_eq!(
            action,
            Action::Add {
                component_type: ComponentType::Text,
                parent: "content".into(),
                index: None,
                properties: Properties::new().with("text", "Hi"),
            }
        );

        let action: Action =
            serde_json::from_str(r#"{"type":"move","id":"component-2","parent":"top-bar","index":0}"#)
                .unwrap();
        assert!(matches!(action, Action::Move { index: Some(0), .. }));
    }

    #[test]
    fn test_add_normalizes_loose_values() {
        let mut state = AppState::new();
        let action: Action = serde_json::from_str(
            r##"{"type":"add","componentType":"Text","parent":"content","properties":{"text":"#bad","fontSize":"20sp"}}"##,
        )
        .unwrap();
        let Outcome::Created { id } = state.dispatch(action).unwrap() else {
            panic!("expected a created node");
        };
        let node = state.tree.get(&id).unwrap();
        assert_eq!(node.properties.get_str("text"), Some("#bad"));
        assert_eq!(node.properties.get_number("fontSize"), Some(20.0));

        let action: Action = serde_json::from_str(&format!(
            r#"{{"type":"update","id":"{id}","properties":{{"fontSize":"24sp"}}}}"#
        ))
        .unwrap();
        state.dispatch(action).unwrap();
        let node = state.tree.get(&id).unwrap();
        assert_eq!(node.properties.get_number("fontSize"), Some(24.0));
    }

    #[test]
    fn test_clear_property() {
        let mut state = AppState::new();
        let id = add(&mut state, ComponentType::Text, "content");
        state
            .dispatch(Action::Update {
                id: id.clone(),
                properties: Properties::new().with("fontSize", 20),
            })
            .unwrap();

        let action: Action = serde_json::from_str(&format!(
            r#"{{"type":"clearProperty","id":"{id}","name":"fontSize"}}"#
        ))
        .unwrap();
        assert_eq!(
            state.dispatch(action).unwrap(),
            Outcome::Changed { id: id.clone() }
        );
        assert!(!state.tree.get(&id).unwrap().properties.contains("fontSize"));
        assert_eq!(state.revision, 3);

        let before = state.clone();
        assert!(matches!(
            state.dispatch(Action::ClearProperty {
                id: "missing".into(),
                name: "fontSize".into(),
            }),
            Err(TreeError::NotFound { .. })
        ));
        assert_eq!(state, before);
    }

    #[test]
    fn test_overwrite_clears_stale_selection() {
        let mut state = AppState::new();
        add(&mut state, ComponentType::Text, "content");
        let scaffold: Vec<_> = DesignTree::with_scaffold()
            .preorder()
            .into_iter()
            .cloned()
            .collect();
        state.dispatch(Action::Overwrite { components: scaffold }).unwrap();
        assert!(state.selection.is_none());
        assert_eq!(state.tree.len(), 4);
    }
}
