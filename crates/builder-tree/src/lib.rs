//! Design tree store, custom component templates, and editor state.
//!
//! [`DesignTree`] owns every node and enforces the structural invariants;
//! [`TemplateRegistry`] holds reusable subtrees; [`AppState`] is the single
//! mutable state object the editor dispatches [`Action`]s against.

pub mod registry;
pub mod state;
pub mod store;

pub use registry::{CustomComponentTemplate, TemplateRegistry};
pub use state::{Action, AppState, Outcome};
pub use store::{reassign_ids, DesignTree};
