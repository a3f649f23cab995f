//! AI flow boundary.
//!
//! The engine never calls a model itself. It builds an [`AiRequest`], hands it
//! to a [`GenerativeBackend`] supplied by the host, and applies the response
//! only after it parses and validates as tree JSON. Responses are applied
//! through [`AppState::dispatch`], the same path as manual edits.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use builder_core::{ComponentId, ImportError, SlotRole, TreeError};
use builder_tree::{reassign_ids, Action, AppState, DesignTree, Outcome};

use crate::error::AiError;
use crate::json;

/// What the model is asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AiTask {
    /// Rewrite a subtree following instructions. Answer: tree JSON.
    ModifySubtree,
    /// Design a whole screen from a prompt. Answer: tree JSON.
    GenerateDesign,
    /// Write Compose code for a subtree. Answer: Kotlin source.
    GenerateCode,
}

/// A request for the external model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiRequest {
    pub task: AiTask,
    pub instructions: String,
    /// JSON text of the subtree the request is about.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtree: Option<String>,
    /// Node the answer will replace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<ComponentId>,
}

impl AiRequest {
    pub fn modify_subtree(
        tree: &DesignTree,
        id: impl AsRef<str>,
        instructions: impl Into<String>,
    ) -> Result<Self, TreeError> {
        let id = id.as_ref();
        let subtree = json::export_subtree(tree, id)?;
        Ok(Self {
            task: AiTask::ModifySubtree,
            instructions: instructions.into(),
            subtree: Some(subtree.to_string()),
            target: Some(id.into()),
        })
    }

    pub fn generate_code(tree: &DesignTree, id: impl AsRef<str>) -> Result<Self, TreeError> {
        let id = id.as_ref();
        let subtree = json::export_subtree(tree, id)?;
        Ok(Self {
            task: AiTask::GenerateCode,
            instructions: String::new(),
            subtree: Some(subtree.to_string()),
            target: Some(id.into()),
        })
    }

    pub fn generate_design(prompt: impl Into<String>) -> Self {
        Self {
            task: AiTask::GenerateDesign,
            instructions: prompt.into(),
            subtree: None,
            target: None,
        }
    }
}

/// The external generative model.
pub trait GenerativeBackend {
    /// Name used in logs and errors.
    fn name(&self) -> &str;

    /// Run a request and return the raw response text.
    fn complete(&self, request: &AiRequest) -> Result<String, AiError>;
}

/// Body of the first fenced code block, or the trimmed text when there is
/// none. The fence's info string (`json`, `kotlin`) is dropped.
pub fn strip_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(start) = trimmed.find("```") else {
        return trimmed;
    };
    let after = &trimmed[start + 3..];
    let body = match after.find('\n') {
        Some(newline) => &after[newline + 1..],
        None => after.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };
    match body.find("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

/// Parse a tree JSON answer into a validated standalone tree.
pub fn parse_tree_response(text: &str) -> Result<DesignTree, AiError> {
    let body = strip_fences(text);
    if body.is_empty() {
        return Err(AiError::EmptyResponse);
    }
    let value = serde_json::from_str(body).map_err(ImportError::from)?;
    Ok(json::import_value(value)?)
}

/// Extract source text from a code answer.
pub fn parse_code_response(text: &str) -> Result<String, AiError> {
    let body = strip_fences(text);
    if body.is_empty() {
        return Err(AiError::EmptyResponse);
    }
    Ok(body.to_string())
}

/// Replace the subtree at `target` with the answer, atomically.
///
/// An ordinary node is swapped for the answer's root at the same index. A
/// slot keeps its identity: its children are replaced, either by the
/// children of an answer that echoes the slot id or by the answer itself.
/// Answer nodes get fresh ids. On error the state is untouched.
pub fn apply_subtree_response(
    state: &mut AppState,
    target: impl AsRef<str>,
    text: &str,
) -> Result<ComponentId, AiError> {
    let target = target.as_ref();
    let incoming = parse_tree_response(text)?;

    let node = state
        .tree
        .get(target)
        .ok_or_else(|| TreeError::NotFound { id: target.into() })?;
    if node.slot == Some(SlotRole::Root) || state.tree.root() == Some(&node.id) {
        return Err(AiError::Tree(TreeError::ReservedSlot {
            id: node.id.clone(),
            operation: "replaced",
        }));
    }

    let mut candidate = state.tree.clone();
    let new_root = if node.is_reserved_slot() {
        refill_slot(&mut candidate, target, &incoming)?;
        ComponentId::from(target)
    } else {
        let parent = state
            .tree
            .parent(target)
            .cloned()
            .ok_or_else(|| TreeError::ParentNotFound { id: target.into() })?;
        let index = state.tree.index_in_parent(target);
        candidate.delete(target)?;
        let nodes = incoming.preorder().into_iter().cloned().collect();
        let copy = reassign_ids(nodes, || candidate.next_id())?;
        candidate.graft(copy, &parent, index)?
    };

    let components = candidate.preorder().into_iter().cloned().collect();
    state.dispatch(Action::Overwrite { components })?;
    state.dispatch(Action::Select {
        id: Some(new_root.clone()),
    })?;
    info!(target, root = %new_root, "AI subtree applied");
    Ok(new_root)
}

fn refill_slot(tree: &mut DesignTree, slot: &str, incoming: &DesignTree) -> Result<(), TreeError> {
    let root = incoming.root_component().ok_or(TreeError::EmptyTree)?;
    let subtrees: Vec<ComponentId> = if root.id.as_str() == slot {
        incoming.children(&root.id).to_vec()
    } else {
        vec![root.id.clone()]
    };

    for child in tree.children(slot).to_vec() {
        tree.delete(&child)?;
    }
    if root.id.as_str() == slot {
        tree.update(slot, root.properties.clone())?;
    }
    for id in subtrees {
        let nodes = incoming.subtree(&id)?;
        let copy = reassign_ids(nodes, || tree.next_id())?;
        tree.graft(copy, slot, None)?;
    }
    Ok(())
}

/// Replace the whole design with the answer.
pub fn apply_design_response(state: &mut AppState, text: &str) -> Result<Outcome, AiError> {
    let tree = parse_tree_response(text)?;
    let components = tree.preorder().into_iter().cloned().collect();
    let outcome = state.dispatch(Action::Overwrite { components })?;
    info!(count = state.tree.len(), "AI design applied");
    Ok(outcome)
}

/// Request ticket. Only the latest ticket's answer is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ticket(pub u64);

/// Tracks in-flight AI requests so a late answer to an abandoned or
/// superseded request is dropped instead of applied.
#[derive(Debug, Clone, Default)]
pub struct AiSession {
    issued: u64,
    pending: Option<Ticket>,
}

impl AiSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request, superseding any pending one.
    pub fn begin(&mut self) -> Ticket {
        self.issued += 1;
        let ticket = Ticket(self.issued);
        if let Some(previous) = self.pending.replace(ticket) {
            debug!(previous = previous.0, ticket = ticket.0, "AI request superseded");
        }
        ticket
    }

    pub fn pending(&self) -> Option<Ticket> {
        self.pending
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.pending == Some(ticket)
    }

    /// Stop waiting for the pending request.
    pub fn abandon(&mut self) {
        if let Some(ticket) = self.pending.take() {
            debug!(ticket = ticket.0, "AI request abandoned");
        }
    }

    /// Accept the answer for `ticket`, closing it.
    pub fn accept(&mut self, ticket: Ticket) -> Result<(), AiError> {
        if self.is_current(ticket) {
            self.pending = None;
            return Ok(());
        }
        warn!(ticket = ticket.0, latest = self.issued, "discarding stale AI response");
        Err(AiError::Stale {
            ticket: ticket.0,
            latest: self.issued,
        })
    }

    /// Run a request to completion on a blocking backend.
    pub fn run(
        &mut self,
        backend: &dyn GenerativeBackend,
        request: &AiRequest,
    ) -> Result<String, AiError> {
        let ticket = self.begin();
        debug!(backend = backend.name(), task = ?request.task, "AI request sent");
        match backend.complete(request) {
            Ok(text) => {
                self.accept(ticket)?;
                Ok(text)
            }
            Err(err) => {
                if self.is_current(ticket) {
                    self.pending = None;
                }
                warn!(backend = backend.name(), error = %err, "AI request failed");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use builder_core::ComponentType;

    struct Canned(&'static str);

    impl GenerativeBackend for Canned {
        fn name(&self) -> &str {
            "canned"
        }

        fn complete(&self, _request: &AiRequest) -> Result<String, AiError> {
            Ok(self.0.to_string())
        }
    }

    struct Failing;

    impl GenerativeBackend for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn complete(&self, _request: &AiRequest) -> Result<String, AiError> {
            Err(AiError::Backend {
                backend: "failing".to_string(),
                message: "timeout".to_string(),
            })
        }
    }

    const CARD_ANSWER: &str = r#"Here you go:
```json
[{"id": "a", "type": "Card", "name": "Promo", "properties": {"children": [
  {"id": "b", "type": "Text", "name": "Title", "properties": {"text": "Sale"}}
]}}]
```"#;

    fn state_with_row() -> (AppState, ComponentId) {
        let mut state = AppState::new();
        let row = state.tree.add(ComponentType::Row, "content", None).unwrap();
        state.tree.add(ComponentType::Text, "content", None).unwrap();
        (state, row)
    }

    #[test]
    fn test_strip_fences() {
        assert_eq!(strip_fences("  [1]  "), "[1]");
        assert_eq!(strip_fences("```json\n[1]\n```"), "[1]");
        assert_eq!(strip_fences("text\n```kotlin\nText(\"a\")\n```\nmore"), "Text(\"a\")");
        assert_eq!(strip_fences("```json [1]```"), "[1]");
    }

    #[test]
    fn test_request_carries_subtree() {
        let (state, row) = state_with_row();
        let request = AiRequest::modify_subtree(&state.tree, &row, "make it blue").unwrap();
        assert_eq!(request.task, AiTask::ModifySubtree);
        assert_eq!(request.target.as_ref(), Some(&row));
        let subtree: serde_json::Value = serde_json::from_str(request.subtree.as_deref().unwrap()).unwrap();
        assert_eq!(subtree["type"], "Row");

        assert!(AiRequest::modify_subtree(&state.tree, "missing", "x").is_err());
    }

    #[test]
    fn test_apply_replaces_in_place() {
        let (mut state, row) = state_with_row();
        let new_root = apply_subtree_response(&mut state, &row, CARD_ANSWER).unwrap();

        assert!(!state.tree.contains(&row));
        assert_eq!(state.tree.children("content")[0], new_root);
        assert_eq!(state.tree.get(&new_root).unwrap().component_type, ComponentType::Card);
        assert_eq!(state.tree.children(&new_root).len(), 1);
        assert_eq!(state.selection.as_ref(), Some(&new_root));
        assert!(state.tree.validate().is_ok());
    }

    #[test]
    fn test_apply_into_slot_keeps_slot() {
        let (mut state, _) = state_with_row();
        let answer = r#"{"id": "content", "type": "Column", "name": "Content",
            "properties": {"padding": 8, "children": [{"id": "x", "type": "Text", "properties": {}}]}}"#;
        let root = apply_subtree_response(&mut state, "content", answer).unwrap();

        assert_eq!(root.as_str(), "content");
        let content = state.tree.get("content").unwrap();
        assert!(content.is_reserved_slot());
        assert_eq!(content.properties.get_number("padding"), Some(8.0));
        assert_eq!(state.tree.children("content").len(), 1);
    }

    #[test]
    fn test_invalid_answer_leaves_state() {
        let (mut state, row) = state_with_row();
        let before = state.clone();

        let err = apply_subtree_response(&mut state, &row, "not json at all").unwrap_err();
        assert!(matches!(err, AiError::Import(_)));
        assert_eq!(state, before);

        let err = apply_subtree_response(&mut state, "root", CARD_ANSWER).unwrap_err();
        assert!(matches!(err, AiError::Tree(TreeError::ReservedSlot { .. })));
        assert_eq!(state, before);

        let err = apply_subtree_response(&mut state, &row, "```json\n```").unwrap_err();
        assert!(matches!(err, AiError::EmptyResponse));
    }

    #[test]
    fn test_incompatible_answer_rejected() {
        let mut state = AppState::new();
        let before = state.clone();
        let answer = r#"[{"id": "s", "type": "Scaffold", "properties": {}}]"#;
        assert!(apply_subtree_response(&mut state, "content", answer).is_err());
        assert_eq!(state, before);
    }

    #[test]
    fn test_apply_design() {
        let mut state = AppState::new();
        let text = json::to_json_string(&DesignTree::with_scaffold()).unwrap();
        let outcome = apply_design_response(&mut state, &text).unwrap();
        assert_eq!(outcome, Outcome::Replaced { count: 4 });
    }

    #[test]
    fn test_session_discards_late_answers() {
        let mut session = AiSession::new();
        let first = session.begin();
        let second = session.begin();
        assert!(matches!(
            session.accept(first),
            Err(AiError::Stale { ticket: 1, latest: 2 })
        ));
        assert!(session.accept(second).is_ok());
        assert_eq!(session.pending(), None);

        let third = session.begin();
        session.abandon();
        assert!(session.accept(third).is_err());
    }

    #[test]
    fn test_session_run() {
        let mut session = AiSession::new();
        let request = AiRequest::generate_design("login form");
        let text = session.run(&Canned("```\n[]\n```"), &request).unwrap();
        assert_eq!(parse_code_response(&text).unwrap(), "[]");

        assert!(matches!(
            session.run(&Failing, &request),
            Err(AiError::Backend { .. })
        ));
        assert_eq!(session.pending(), None);
    }
}
