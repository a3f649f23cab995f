//! Custom component templates.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use builder_core::{ComponentId, DesignComponent, TreeError};

use crate::store::{reassign_ids, DesignTree};

/// A named reusable subtree with its own id namespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomComponentTemplate {
    pub id: String,
    pub name: String,
    pub component_tree: Vec<DesignComponent>,
    pub root_component_id: ComponentId,
}

impl CustomComponentTemplate {
    /// Check that the node list forms a single tree rooted at
    /// `root_component_id` with no references outside itself.
    pub fn validate(&self) -> Result<(), TreeError> {
        let invalid = |reason: String| TreeError::InvalidTemplate {
            template_id: self.id.clone(),
            reason,
        };
        let tree = DesignTree::from_components(self.component_tree.iter().cloned())
            .map_err(|e| invalid(e.to_string()))?;
        match tree.root() {
            Some(root) if root == &self.root_component_id => Ok(()),
            Some(root) => Err(invalid(format!(
                "root is {root}, expected {}",
                self.root_component_id
            ))),
            None => Err(invalid("no root component".to_string())),
        }
    }

    /// Template nodes in pre-order from the root.
    pub fn ordered_nodes(&self) -> Result<Vec<DesignComponent>, TreeError> {
        let tree = DesignTree::from_components(self.component_tree.iter().cloned())?;
        tree.subtree(&self.root_component_id)
    }

    /// The template's root node.
    pub fn root(&self) -> Option<&DesignComponent> {
        self.component_tree
            .iter()
            .find(|n| n.id == self.root_component_id)
    }
}

/// Registry of templates, kept in registration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateRegistry {
    templates: IndexMap<String, CustomComponentTemplate>,
    next_id: u64,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self {
            templates: IndexMap::new(),
            next_id: 1,
        }
    }

    /// Register a template, replacing any with the same id.
    pub fn register(&mut self, template: CustomComponentTemplate) -> Result<(), TreeError> {
        template.validate()?;
        debug!(template_id = %template.id, "template registered");
        self.templates.insert(template.id.clone(), template);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&CustomComponentTemplate> {
        self.templates.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.templates.contains_key(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<CustomComponentTemplate> {
        self.templates.shift_remove(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(|s| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &CustomComponentTemplate> {
        self.templates.values()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    fn next_template_id(&mut self) -> String {
        loop {
            let id = format!("template-{}", self.next_id.max(1));
            self.next_id = self.next_id.max(1) + 1;
            if !self.templates.contains_key(&id) {
                return id;
            }
        }
    }

    /// Build and register a template from the subtree rooted at `id`.
    pub fn capture(
        &mut self,
        tree: &DesignTree,
        id: impl AsRef<str>,
        name: impl Into<String>,
    ) -> Result<String, TreeError> {
        let nodes = tree.subtree(id)?;
        let mut counter = 0u64;
        let nodes = reassign_ids(nodes, || {
            counter += 1;
            ComponentId(format!("node-{counter}"))
        })?;
        let root_component_id = nodes
            .first()
            .map(|n| n.id.clone())
            .ok_or(TreeError::EmptyTree)?;

        let template = CustomComponentTemplate {
            id: self.next_template_id(),
            name: name.into(),
            component_tree: nodes,
            root_component_id,
        };
        let template_id = template.id.clone();
        self.register(template)?;
        Ok(template_id)
    }

    /// Add a Custom node referencing `template_id` under `parent`.
    pub fn add_reference(
        &self,
        tree: &mut DesignTree,
        template_id: &str,
        parent: impl AsRef<str>,
        index: Option<usize>,
    ) -> Result<ComponentId, TreeError> {
        let template = self.get(template_id).ok_or_else(|| {
            warn!(template_id, "reference to unknown template rejected");
            TreeError::TemplateNotFound {
                template_id: template_id.to_string(),
            }
        })?;
        tree.add_template_ref(template_id, &template.name, parent, index)
    }

    /// Replace a template reference node with a fresh copy of the template,
    /// at the same position. Returns the id of the copy's root.
    pub fn instantiate(
        &self,
        tree: &mut DesignTree,
        node_id: impl AsRef<str>,
    ) -> Result<ComponentId, TreeError> {
        let node_id = node_id.as_ref();
        let node = tree
            .get(node_id)
            .ok_or_else(|| TreeError::NotFound { id: node_id.into() })?;
        let template_id = node.template_id_ref.clone().ok_or_else(|| TreeError::InvalidTemplate {
            template_id: String::new(),
            reason: format!("{node_id} is not a template reference"),
        })?;
        let template = self.get(&template_id).ok_or_else(|| {
            warn!(%template_id, node_id, "instantiating missing template");
            TreeError::TemplateNotFound {
                template_id: template_id.clone(),
            }
        })?;
        let parent = tree.parent(node_id).cloned().ok_or_else(|| TreeError::ReservedSlot {
            id: node_id.into(),
            operation: "replaced",
        })?;
        let index = tree.index_in_parent(node_id);

        // Work on a copy so a failure half way leaves `tree` untouched.
        let mut candidate = tree.clone();
        let nodes = template.ordered_nodes()?;
        let copy = reassign_ids(nodes, || candidate.next_id())?;
        candidate.delete(node_id)?;
        let root = candidate.graft(copy, &parent, index)?;

        *tree = candidate;
        debug!(%template_id, node_id, root = %root, "template instantiated");
        Ok(root)
    }
}
