// Path-copy editing over `Tree` values.
// Every operation takes the current root and a `NodePath` and returns a new
// root. Only the nodes on the root-to-target spine are rebuilt; all other
// subtrees are shared with the input via `Arc`.
//
// Destructive conversions are intentional and silent:
// - `set_data` with a value on an interior node drops its children.
// - `add_child` on a leaf drops its data.
// Nothing here can recover what was dropped.
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::EditError;
use crate::model::{Node, NodePath, Tree};

/// Name and value given to children created by [`add_child`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChildTemplate {
    pub name: String,
    pub data: String,
}

impl Default for ChildTemplate {
    fn default() -> Self {
        Self {
            name: "New Child".into(),
            data: "Data".into(),
        }
    }
}

impl ChildTemplate {
    fn build(&self) -> Tree {
        Arc::new(Node::leaf(self.name.clone(), self.data.clone()))
    }
}

/// Renames the node at `path`. The name is stored trimmed and must not be
/// blank.
pub fn rename(root: &Tree, path: &NodePath, new_name: &str) -> Result<Tree, EditError> {
    let name = new_name.trim();
    if name.is_empty() {
        return Err(EditError::InvalidName);
    }
    debug!(%path, name, "rename");
    rebuild_spine(root, path, 0, |node| node.with_name(name))
}

/// Turns the node at `path` into a leaf holding `value`, discarding any
/// children.
///
/// An empty value only clears data: a leaf becomes unclassified and an
/// interior keeps its children.
pub fn set_data(root: &Tree, path: &NodePath, value: &str) -> Result<Tree, EditError> {
    debug!(%path, len = value.len(), "set data");
    rebuild_spine(root, path, 0, |node| match node {
        Node::Interior { .. } if value.is_empty() => node.clone(),
        _ if value.is_empty() => Node::unclassified(node.name()),
        _ => Node::leaf(node.name(), value),
    })
}

/// Appends a default child to the node at `path`, see [`add_child_with`].
pub fn add_child(root: &Tree, path: &NodePath) -> Result<Tree, EditError> {
    add_child_with(root, path, &ChildTemplate::default())
}

/// Appends a child built from `template` to the node at `path`.
///
/// A leaf becomes an interior whose only child is the new one; its data is
/// lost. An unclassified node is treated as an empty interior.
pub fn add_child_with(
    root: &Tree,
    path: &NodePath,
    template: &ChildTemplate,
) -> Result<Tree, EditError> {
    debug!(%path, child = %template.name, "add child");
    rebuild_spine(root, path, 0, |node| {
        let children = match node {
            Node::Interior { children, .. } => {
                let mut next = Vec::with_capacity(children.len() + 1);
                next.extend(children.iter().cloned());
                next.push(template.build());
                next
            }
            Node::Leaf { .. } | Node::Unclassified { .. } => vec![template.build()],
        };
        Node::Interior {
            name: node.name().to_string(),
            children,
        }
    })
}

fn rebuild_spine<F>(node: &Tree, path: &NodePath, level: usize, edit: F) -> Result<Tree, EditError>
where
    F: FnOnce(&Node) -> Node,
{
    let Some(&index) = path.indices().get(level) else {
        return Ok(Arc::new(edit(node)));
    };
    let invalid = || EditError::InvalidPath {
        path: path.clone(),
        level,
        index,
    };
    let Node::Interior { name, children } = node.as_ref() else {
        return Err(invalid());
    };
    let child = children.get(index).ok_or_else(invalid)?;
    let replaced = rebuild_spine(child, path, level + 1, edit)?;
    let mut next = children.clone();
    next[index] = replaced;
    Ok(Arc::new(Node::Interior {
        name: name.clone(),
        children: next,
    }))
}
