//! Core types, property schema, and utilities for the Compose Builder engine.
//!
//! This crate provides the foundational types used across all other builder crates:
//! - Component identifiers, component types, and reserved slot roles
//! - Tagged property values and property bags
//! - The static property schema (editable descriptors and defaults)
//! - Value literal parsers for loosely typed input
//! - Error types

pub mod component;
pub mod errors;
pub mod parse;
pub mod schema;
pub mod types;

pub use component::*;
pub use errors::*;
pub use types::*;
