use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::DocumentError;
use crate::model::{Node, NodePath, Tree};

/// Canonical external form of a tree: `{name, children?, data?}`.
///
/// Well-formed documents never carry both `children` and `data`. Empty
/// values are omitted on output and accepted (as if absent) on input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Document>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl Document {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: None,
            data: None,
        }
    }
}

/// Serializes `node` and its subtree in preorder, dropping empty fields.
///
/// Unclassified nodes and childless interiors both come out as `{name}`, so
/// an unclassified node re-imports as an empty interior.
pub fn export(node: &Node) -> Document {
    let children = match node.children() {
        [] => None,
        kids => Some(kids.iter().map(|c| export(c)).collect()),
    };
    let data = node.data().filter(|d| !d.is_empty()).map(str::to_string);
    Document {
        name: node.name().to_string(),
        children,
        data,
    }
}

/// Rebuilds a tree from a document.
///
/// Non-empty `children` make an interior, otherwise non-empty `data` makes a
/// leaf, otherwise the node is an interior with no children.
pub fn import(doc: &Document) -> Result<Tree, DocumentError> {
    fn build(doc: &Document, path: &NodePath) -> Result<Tree, DocumentError> {
        if doc.name.trim().is_empty() {
            return Err(DocumentError::EmptyName { path: path.clone() });
        }
        let kids = doc.children.as_deref().unwrap_or_default();
        let data = doc.data.as_deref().unwrap_or_default();
        let node = match (kids.is_empty(), data.is_empty()) {
            (false, false) => {
                return Err(DocumentError::ConflictingPayload { path: path.clone() });
            }
            (false, true) => Node::Interior {
                name: doc.name.clone(),
                children: kids
                    .iter()
                    .enumerate()
                    .map(|(i, c)| build(c, &path.child(i)))
                    .collect::<Result<_, _>>()?,
            },
            (true, false) => Node::leaf(doc.name.clone(), data),
            (true, true) => Node::Interior {
                name: doc.name.clone(),
                children: Vec::new(),
            },
        };
        Ok(Arc::new(node))
    }
    build(doc, &NodePath::root())
}

/// Compact JSON, the form handed to persistence.
pub fn to_json(doc: &Document) -> Result<String, serde_json::Error> {
    serde_json::to_string(doc)
}

pub fn to_json_pretty(doc: &Document) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(doc)
}

pub fn from_json(s: &str) -> Result<Document, DocumentError> {
    Ok(serde_json::from_str(s)?)
}

/// Parses and imports in one step.
pub fn tree_from_json(s: &str) -> Result<Tree, DocumentError> {
    import(&from_json(s)?)
}
