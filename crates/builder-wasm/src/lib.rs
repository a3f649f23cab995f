//! WebAssembly bindings for the Compose Builder engine.
//!
//! The browser editor keeps no design state of its own: it forwards actions,
//! pointer events and layout measurements to a [`ComposeBuilder`] and
//! re-renders from what comes back.
//!
//! ## Example
//!
//! ```js
//! import { ComposeBuilder } from 'compose-builder';
//!
//! const builder = new ComposeBuilder();
//!
//! // Add a column to the content slot
//! builder.dispatch({ type: 'add', componentType: 'Column', parent: 'content' });
//!
//! // Report measured bounds, then drag a Text from the library
//! builder.setLayout({ content: { x: 0, y: 56, width: 360, height: 600 } });
//! builder.dragStart({ kind: 'library', value: 'Text' }, 20, 80);
//! builder.dragMove(20, 100);
//! builder.dragEnd();
//!
//! const kotlin = builder.generateCode();
//! ```

use serde::Serialize;
use wasm_bindgen::prelude::*;

use builder_codegen::{CodeGenerator, ComposeGenerator, GenerateOptions};
use builder_core::{
    schema, BuilderError, ComponentId, ComponentType, DropError, PropertyValue, SchemaError,
    TreeError,
};
use builder_dnd::{CanvasLayout, DragSession, DragSource};
use builder_export::ai::{self, AiTask};
use builder_export::{json, AiError, AiRequest, AiSession, Ticket};
use builder_tree::{Action, AppState, Outcome};
use glam::DVec2;

mod types;

pub use types::*;

/// Initialize panic hook for better error messages in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(debug_assertions)]
    console_error_panic_hook::set_once();
}

/// The editor engine.
#[wasm_bindgen]
pub struct ComposeBuilder {
    state: AppState,
    drag: DragSession,
    layout: CanvasLayout,
    ai: AiSession,
    /// Task and target of the pending AI request.
    ai_pending: Option<(Ticket, AiTask, Option<ComponentId>)>,
    options: GenerateOptions,
}

#[wasm_bindgen]
impl ComposeBuilder {
    /// Create an engine holding the default scaffold.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            state: AppState::new(),
            drag: DragSession::new(),
            layout: CanvasLayout::new(),
            ai: AiSession::new(),
            ai_pending: None,
            options: GenerateOptions::default(),
        }
    }

    /// Get the version of the engine.
    #[wasm_bindgen(js_name = version)]
    pub fn version() -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    /// The tree in nested JSON form.
    #[wasm_bindgen(js_name = getTree)]
    pub fn get_tree(&self) -> Result<JsValue, JsError> {
        to_js(&json::export_tree(&self.state.tree))
    }

    /// All nodes, root first, with child id lists.
    #[wasm_bindgen(js_name = getComponents)]
    pub fn get_components(&self) -> Result<JsValue, JsError> {
        to_js(&self.state.tree.preorder())
    }

    /// One node, or `null`.
    #[wasm_bindgen(js_name = getComponent)]
    pub fn get_component(&self, id: &str) -> Result<JsValue, JsError> {
        to_js(&self.state.tree.get(id))
    }

    #[wasm_bindgen(js_name = getSelection)]
    pub fn get_selection(&self) -> Option<String> {
        self.state.selection.as_ref().map(|id| id.to_string())
    }

    /// Incremented on every successful change.
    #[wasm_bindgen]
    pub fn revision(&self) -> f64 {
        self.state.revision as f64
    }

    /// Apply an editor action (`{type: 'add' | 'delete' | ..., ...}`).
    #[wasm_bindgen]
    pub fn dispatch(&mut self, action: JsValue) -> Result<JsValue, JsError> {
        let action: Action = serde_wasm_bindgen::from_value(action)
            .map_err(|e| JsError::new(&format!("Invalid action: {}", e)))?;
        let outcome = self.apply(action).map_err(js_error)?;
        to_js(&outcome)
    }

    #[wasm_bindgen]
    pub fn select(&mut self, id: Option<String>) -> Result<(), JsError> {
        self.apply(Action::Select {
            id: id.map(ComponentId),
        })
        .map(|_| ())
        .map_err(js_error)
    }

    /// Start over with an empty scaffold.
    #[wasm_bindgen]
    pub fn reset(&mut self) {
        *self = Self {
            options: self.options.clone(),
            ..Self::new()
        };
    }

    #[wasm_bindgen(js_name = exportJson)]
    pub fn export_json(&self) -> Result<String, JsError> {
        json::to_json_string(&self.state.tree)
            .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
    }

    /// Replace the design with tree JSON; the current design is kept when
    /// the document is invalid.
    #[wasm_bindgen(js_name = importJson)]
    pub fn import_json(&mut self, text: &str) -> Result<JsValue, JsError> {
        self.ensure_idle().map_err(js_error)?;
        let outcome = json::load_into(&mut self.state, text)
            .map_err(|e| JsError::new(&format!("Import error: {}", e)))?;
        to_js(&outcome)
    }

    /// Replace the design with an already parsed tree document.
    #[wasm_bindgen(js_name = loadTree)]
    pub fn load_tree(&mut self, document: JsValue) -> Result<JsValue, JsError> {
        let value: serde_json::Value = serde_wasm_bindgen::from_value(document)
            .map_err(|e| JsError::new(&format!("Invalid document: {}", e)))?;
        let outcome = self.load_value(value).map_err(js_error)?;
        to_js(&outcome)
    }

    /// Types offered in the component library.
    #[wasm_bindgen]
    pub fn palette(&self) -> Result<JsValue, JsError> {
        let entries: Vec<PaletteEntryJs> = ComponentType::palette()
            .into_iter()
            .map(|ty| PaletteEntryJs {
                container: ty.is_container(),
                component_type: ty,
            })
            .collect();
        to_js(&entries)
    }

    /// Editable properties of a component type.
    #[wasm_bindgen(js_name = propertySchema)]
    pub fn property_schema(&self, component_type: &str) -> Result<JsValue, JsError> {
        to_js(&Self::descriptors(component_type))
    }

    /// Check a property value before it is dispatched.
    #[wasm_bindgen(js_name = validateProperty)]
    pub fn validate_property(
        &self,
        component_type: &str,
        name: &str,
        value: JsValue,
    ) -> Result<(), JsError> {
        let value: PropertyValue = serde_wasm_bindgen::from_value(value)
            .map_err(|e| JsError::new(&format!("Invalid value: {}", e)))?;
        Self::check_property(component_type, name, &value).map_err(js_error)
    }

    /// Replace the measured node bounds (`{id: {x, y, width, height}}`).
    #[wasm_bindgen(js_name = setLayout)]
    pub fn set_layout(&mut self, layout: JsValue) -> Result<(), JsError> {
        self.layout = serde_wasm_bindgen::from_value(layout)
            .map_err(|e| JsError::new(&format!("Invalid layout: {}", e)))?;
        Ok(())
    }

    /// Begin a drag from the library, a template, or the canvas.
    #[wasm_bindgen(js_name = dragStart)]
    pub fn drag_start(&mut self, source: JsValue, x: f64, y: f64) -> Result<(), JsError> {
        let source: DragSource = serde_wasm_bindgen::from_value(source)
            .map_err(|e| JsError::new(&format!("Invalid drag source: {}", e)))?;
        self.start_drag(source, DVec2::new(x, y)).map_err(js_error)
    }

    /// Move the pointer; returns the drop indicator or `null`.
    #[wasm_bindgen(js_name = dragMove)]
    pub fn drag_move(&mut self, x: f64, y: f64) -> Result<JsValue, JsError> {
        let hover = self
            .drag
            .update_pointer(&self.state.tree, &self.layout, DVec2::new(x, y))
            .map_err(js_error)?
            .cloned();
        to_js(&hover)
    }

    /// Release the pointer.
    #[wasm_bindgen(js_name = dragEnd)]
    pub fn drag_end(&mut self) -> Result<JsValue, JsError> {
        let outcome = self.drag.release(&mut self.state).map_err(js_error)?;
        to_js(&DropResultJs {
            outcome,
            state: self.drag.state().clone(),
        })
    }

    #[wasm_bindgen(js_name = dragCancel)]
    pub fn drag_cancel(&mut self) -> Result<(), JsError> {
        self.drag.cancel().map_err(js_error)
    }

    /// Forward a key press; returns true when it cancelled a drag.
    #[wasm_bindgen(js_name = handleKey)]
    pub fn handle_key(&mut self, key: &str) -> bool {
        self.drag.handle_key(key)
    }

    #[wasm_bindgen(js_name = dragState)]
    pub fn drag_state(&self) -> Result<JsValue, JsError> {
        to_js(self.drag.state())
    }

    /// Set generation options (`{mode, functionName, packageName, includePreview}`).
    #[wasm_bindgen(js_name = setGenerateOptions)]
    pub fn set_generate_options(&mut self, options: JsValue) -> Result<(), JsError> {
        let options: GenerateOptions = serde_wasm_bindgen::from_value(options)
            .map_err(|e| JsError::new(&format!("Invalid options: {}", e)))?;
        options
            .validate()
            .map_err(|e| JsError::new(&format!("Invalid options: {}", e)))?;
        self.options = options;
        Ok(())
    }

    /// Kotlin source of the screen.
    #[wasm_bindgen(js_name = generateCode)]
    pub fn generate_code(&self) -> Result<String, JsError> {
        self.generator()?
            .generate_screen(&self.state.tree, &self.state.templates)
            .map_err(|e| JsError::new(&format!("Generation error: {}", e)))
    }

    /// All project files as `{path: content}`.
    #[wasm_bindgen(js_name = generateProject)]
    pub fn generate_project(&self) -> Result<JsValue, JsError> {
        let project = self
            .generator()?
            .generate_project(&self.state.tree, &self.state.templates)
            .map_err(|e| JsError::new(&format!("Generation error: {}", e)))?;
        to_js(&project.to_map())
    }

    #[wasm_bindgen(js_name = getTemplates)]
    pub fn get_templates(&self) -> Result<JsValue, JsError> {
        let templates: Vec<_> = self.state.templates.iter().collect();
        to_js(&templates)
    }

    /// Build an AI request (`{task, target?, instructions}`) and issue a
    /// ticket for its answer. A newer request supersedes older ones.
    #[wasm_bindgen(js_name = aiBegin)]
    pub fn ai_begin(&mut self, args: JsValue) -> Result<JsValue, JsError> {
        let args: AiBeginJs = serde_wasm_bindgen::from_value(args)
            .map_err(|e| JsError::new(&format!("Invalid AI request: {}", e)))?;
        let issued = self
            .begin_ai(args.task, args.target, args.instructions)
            .map_err(js_error)?;
        to_js(&issued)
    }

    /// Apply the answer for `ticket`. Stale answers are rejected.
    #[wasm_bindgen(js_name = aiComplete)]
    pub fn ai_complete(&mut self, ticket: f64, response: &str) -> Result<JsValue, JsError> {
        let result = self
            .complete_ai(Ticket(ticket as u64), response)
            .map_err(js_error)?;
        to_js(&result)
    }

    /// Stop waiting for the pending AI answer.
    #[wasm_bindgen(js_name = aiAbandon)]
    pub fn ai_abandon(&mut self) {
        self.ai.abandon();
        self.ai_pending = None;
    }
}

impl ComposeBuilder {
    /// Apply an action; edits are refused while a drag is in progress.
    pub fn apply(&mut self, action: Action) -> Result<Outcome, DropError> {
        if !matches!(action, Action::Select { .. }) {
            self.ensure_idle()?;
        }
        Ok(self.state.dispatch(action)?)
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn drag(&self) -> &DragSession {
        &self.drag
    }

    pub fn layout_mut(&mut self) -> &mut CanvasLayout {
        &mut self.layout
    }

    pub fn start_drag(&mut self, source: DragSource, pointer: DVec2) -> Result<(), DropError> {
        self.drag.start(&self.state.tree, &self.layout, source, pointer)
    }

    pub fn release_drag(&mut self) -> Result<Option<Outcome>, DropError> {
        self.drag.release(&mut self.state)
    }

    pub fn load_value(&mut self, value: serde_json::Value) -> Result<Outcome, BuilderError> {
        self.ensure_idle()?;
        let tree = json::import_value(value)?;
        let components = tree.preorder().into_iter().cloned().collect();
        Ok(self.state.dispatch(Action::Overwrite { components })?)
    }

    fn ensure_idle(&self) -> Result<(), DropError> {
        if self.drag.is_dragging() {
            return Err(DropError::AlreadyDragging);
        }
        Ok(())
    }

    fn descriptors(component_type: &str) -> Vec<PropertyDescriptorJs> {
        schema::descriptors(&ComponentType::from(component_type))
            .into_iter()
            .map(PropertyDescriptorJs::from)
            .collect()
    }

    fn check_property(
        component_type: &str,
        name: &str,
        value: &PropertyValue,
    ) -> Result<(), SchemaError> {
        schema::validate_value(&ComponentType::from(component_type), name, value)
    }

    fn generator(&self) -> Result<ComposeGenerator<'static>, JsError> {
        ComposeGenerator::with_options(self.options.clone())
            .map_err(|e| JsError::new(&format!("Generator error: {}", e)))
    }

    pub fn begin_ai(
        &mut self,
        task: AiTask,
        target: Option<ComponentId>,
        instructions: String,
    ) -> Result<AiTicketJs, TreeError> {
        let request = match (task, &target) {
            (AiTask::GenerateDesign, _) => AiRequest::generate_design(instructions),
            (AiTask::ModifySubtree, Some(id)) => {
                AiRequest::modify_subtree(&self.state.tree, id, instructions)?
            }
            (AiTask::GenerateCode, Some(id)) => AiRequest::generate_code(&self.state.tree, id)?,
            (_, None) => {
                let root = self.state.tree.root().cloned().ok_or(TreeError::EmptyTree)?;
                return self.begin_ai(task, Some(root), instructions);
            }
        };
        let ticket = self.ai.begin();
        self.ai_pending = Some((ticket, task, target));
        Ok(AiTicketJs {
            ticket: ticket.0,
            request,
        })
    }

    pub fn complete_ai(&mut self, ticket: Ticket, response: &str) -> Result<AiResultJs, AiError> {
        self.ai.accept(ticket)?;
        let Some((_, task, target)) = self.ai_pending.take() else {
            return Err(AiError::Stale {
                ticket: ticket.0,
                latest: ticket.0,
            });
        };
        match (task, target) {
            (AiTask::GenerateCode, _) => Ok(AiResultJs::Code {
                source: ai::parse_code_response(response)?,
            }),
            (AiTask::GenerateDesign, _) => {
                ai::apply_design_response(&mut self.state, response)?;
                Ok(AiResultJs::DesignReplaced {
                    count: self.state.tree.len(),
                })
            }
            (AiTask::ModifySubtree, Some(target)) => Ok(AiResultJs::SubtreeReplaced {
                root: ai::apply_subtree_response(&mut self.state, &target, response)?,
            }),
            (AiTask::ModifySubtree, None) => Err(AiError::Tree(TreeError::EmptyTree)),
        }
    }
}

impl Default for ComposeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsError> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

fn js_error(err: impl std::fmt::Display) -> JsError {
    JsError::new(&err.to_string())
}

/// Get the engine version.
#[wasm_bindgen(js_name = getVersion)]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
