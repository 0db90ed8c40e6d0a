//! tagtree-core: labeled tree model, path-copy editing and canonical export
//!
//! This crate focuses on a small, well-factored surface:
//! - Node model (leaf / interior / unclassified) addressed by index paths
//! - Pure edit operations returning new trees with structural sharing
//! - Canonical JSON document export and re-import
//! - Session holder, file-backed tree store and layered settings for callers
//!
pub mod config;
pub mod editor;
pub mod error;
pub mod export;
pub mod model;
pub mod session;
pub mod store;

pub use editor::{ChildTemplate, add_child, add_child_with, rename, set_data};
pub use error::{ConfigError, DocumentError, EditError, StoreError};
pub use export::{Document, export, from_json, import, to_json, to_json_pretty, tree_from_json};
pub use model::{Node, NodeKind, NodePath, Tree, lookup, starter_tree};
pub use session::Session;
pub use store::{StoredTree, TreeStore};
