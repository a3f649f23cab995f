//! Data boundaries of the Compose Builder engine.
//!
//! - [`json`]: nested tree JSON export and validated import
//! - [`ai`]: requests to an external generative model and atomic application
//!   of its answers
//! - [`remote`]: publishing the tree JSON to a key/value config store

pub mod ai;
pub mod error;
pub mod json;
pub mod remote;

pub use ai::{AiRequest, AiSession, AiTask, GenerativeBackend, Ticket};
pub use error::{AiError, RemoteError};
pub use json::{export_subtree, export_tree, import_tree, import_value, load_into, to_json_string};
pub use remote::{
    DirectoryConfigStore, MemoryConfigStore, PublishReceipt, Publisher, RemoteConfigStore,
    ServerCredentials,
};
