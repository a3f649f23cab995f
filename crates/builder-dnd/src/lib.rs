//! Drag-and-drop reconciliation for the builder canvas.
//!
//! The presentation layer reports node bounds ([`CanvasLayout`]) and pointer
//! positions; this crate turns them into a hover indicator and, on release,
//! a validated tree mutation dispatched through [`builder_tree::AppState`].

pub mod bounds;
pub mod session;
pub mod target;

pub use bounds::{Bounds, CanvasLayout};
pub use session::{DragSession, DragState};
pub use target::{resolve_hover, validate_drop, DragSource, DropTarget, Hover};
