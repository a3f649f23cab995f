//! The drag session state machine.
//!
//! `Idle -> Dragging -> Dropped | Cancelled`. While dragging, every pointer
//! update re-resolves the hover; only hovers that would pass drop validation
//! are kept, so the editor never shows an indicator for an illegal drop.

use glam::DVec2;
use serde::Serialize;
use tracing::{debug, warn};

use builder_core::{DropError, TreeError};
use builder_tree::{Action, AppState, DesignTree, Outcome};

use crate::bounds::CanvasLayout;
use crate::target::{resolve_hover, validate_drop, DragSource, DropTarget, Hover};

/// Key that aborts a drag.
pub const CANCEL_KEY: &str = "Escape";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        source: DragSource,
        pointer: DVec2,
        hover: Option<Hover>,
    },
    Dropped {
        outcome: Outcome,
    },
    Cancelled,
}

/// One drag gesture at a time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DragSession {
    state: DragState,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Current hover, if dragging over a valid target.
    pub fn hover(&self) -> Option<&Hover> {
        match &self.state {
            DragState::Dragging { hover, .. } => hover.as_ref(),
            _ => None,
        }
    }

    /// Begin a drag. Reserved slots cannot be picked up.
    pub fn start(
        &mut self,
        tree: &DesignTree,
        layout: &CanvasLayout,
        source: DragSource,
        pointer: DVec2,
    ) -> Result<(), DropError> {
        if self.is_dragging() {
            return Err(DropError::AlreadyDragging);
        }
        if let DragSource::Canvas(id) = &source {
            let node = tree
                .get(id)
                .ok_or_else(|| TreeError::NotFound { id: id.clone() })?;
            if node.is_reserved_slot() || node.parent_id.is_none() {
                warn!(id = %id, "drag of reserved slot rejected");
                return Err(DropError::SlotNotDraggable { id: id.clone() });
            }
        }
        debug!(?source, "drag started");
        let hover = valid_hover(tree, layout, &source, pointer);
        self.state = DragState::Dragging {
            source,
            pointer,
            hover,
        };
        Ok(())
    }

    /// Track the pointer and re-resolve the hover.
    pub fn update_pointer(
        &mut self,
        tree: &DesignTree,
        layout: &CanvasLayout,
        point: DVec2,
    ) -> Result<Option<&Hover>, DropError> {
        let DragState::Dragging {
            source,
            pointer,
            hover,
        } = &mut self.state
        else {
            return Err(DropError::NotDragging);
        };
        *pointer = point;
        *hover = valid_hover(tree, layout, source, point);
        Ok(hover.as_ref())
    }

    /// Release the pointer. Commits through the state dispatcher when over a
    /// valid target; otherwise the drag ends as cancelled and `Ok(None)` is
    /// returned with nothing mutated.
    pub fn release(&mut self, app: &mut AppState) -> Result<Option<Outcome>, DropError> {
        let DragState::Dragging { source, hover, .. } = std::mem::take(&mut self.state) else {
            return Err(DropError::NotDragging);
        };
        let exclude = source.moving();
        let Some(target) = hover.and_then(|h| h.target(&app.tree, exclude)) else {
            debug!("drop outside any target");
            self.state = DragState::Cancelled;
            return Ok(None);
        };

        if let Err(err) = validate_drop(&app.tree, &source, &target) {
            warn!(error = %err, "drop rejected");
            self.state = DragState::Cancelled;
            return Err(err.into());
        }

        let action = drop_action(source, target);
        match app.dispatch(action) {
            Ok(outcome) => {
                debug!(?outcome, "drop committed");
                self.state = DragState::Dropped {
                    outcome: outcome.clone(),
                };
                Ok(Some(outcome))
            }
            Err(err) => {
                self.state = DragState::Cancelled;
                Err(err.into())
            }
        }
    }

    /// Abort the drag without mutating anything.
    pub fn cancel(&mut self) -> Result<(), DropError> {
        if !self.is_dragging() {
            return Err(DropError::NotDragging);
        }
        debug!("drag cancelled");
        self.state = DragState::Cancelled;
        Ok(())
    }

    /// Feed a key press; returns true if it cancelled the drag.
    pub fn handle_key(&mut self, key: &str) -> bool {
        key == CANCEL_KEY && self.cancel().is_ok()
    }
}

fn valid_hover(
    tree: &DesignTree,
    layout: &CanvasLayout,
    source: &DragSource,
    point: DVec2,
) -> Option<Hover> {
    let exclude = source.moving();
    let hover = resolve_hover(tree, layout, point, exclude)?;
    let target = hover.target(tree, exclude)?;
    validate_drop(tree, source, &target).ok()?;
    Some(hover)
}

fn drop_action(source: DragSource, target: DropTarget) -> Action {
    let DropTarget { parent, index } = target;
    match source {
        DragSource::Library(component_type) => Action::Add {
            component_type,
            parent,
            index: Some(index),
            properties: Default::default(),
        },
        DragSource::Template(template_id) => Action::AddTemplateReference {
            template_id,
            parent,
            index: Some(index),
        },
        DragSource::Canvas(id) => Action::Move {
            id,
            parent,
            index: Some(index),
        },
    }
}
