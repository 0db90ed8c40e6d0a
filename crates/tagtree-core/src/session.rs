use tracing::{info, warn};

use crate::editor::{self, ChildTemplate};
use crate::error::{DocumentError, EditError};
use crate::export::{self, Document};
use crate::model::{NodePath, Tree};

/// Holds the caller's current tree and applies edits to it.
///
/// A rejected edit leaves the current value untouched. Only the latest
/// snapshot is kept.
#[derive(Debug, Clone)]
pub struct Session {
    current: Tree,
    child: ChildTemplate,
}

impl Session {
    pub fn new(tree: Tree) -> Self {
        Self {
            current: tree,
            child: ChildTemplate::default(),
        }
    }

    /// Seeds from `doc`, or from `starter()` when no document is supplied.
    /// `starter` is only called in the latter case.
    pub fn open(
        doc: Option<&Document>,
        starter: impl FnOnce() -> Tree,
    ) -> Result<Self, DocumentError> {
        let tree = match doc {
            Some(d) => export::import(d)?,
            None => {
                info!("no document supplied, using starter tree");
                starter()
            }
        };
        Ok(Self::new(tree))
    }

    pub fn with_child_template(mut self, child: ChildTemplate) -> Self {
        self.child = child;
        self
    }

    pub fn tree(&self) -> &Tree {
        &self.current
    }

    pub fn rename(&mut self, path: &NodePath, name: &str) -> Result<(), EditError> {
        let next = editor::rename(&self.current, path, name);
        self.commit(next)
    }

    pub fn set_data(&mut self, path: &NodePath, value: &str) -> Result<(), EditError> {
        let next = editor::set_data(&self.current, path, value);
        self.commit(next)
    }

    pub fn add_child(&mut self, path: &NodePath) -> Result<(), EditError> {
        let next = editor::add_child_with(&self.current, path, &self.child);
        self.commit(next)
    }

    pub fn export(&self) -> Document {
        export::export(&self.current)
    }

    fn commit(&mut self, next: Result<Tree, EditError>) -> Result<(), EditError> {
        match next {
            Ok(tree) => {
                self.current = tree;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "edit rejected");
                Err(e)
            }
        }
    }
}
