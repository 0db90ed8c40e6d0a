use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// A tree is a shared root node. Edits return a new root and reuse every
/// subtree off the edited spine.
pub type Tree = Arc<Node>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Leaf,
    Interior,
    Unclassified,
}

/// A labeled node holding either a scalar or an ordered list of children.
///
/// `Unclassified` is the transitional state left by clearing a leaf's data;
/// it is exported as a bare name and re-imported as an empty interior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Leaf { name: String, data: String },
    Interior { name: String, children: Vec<Tree> },
    Unclassified { name: String },
}

impl Node {
    pub fn leaf(name: impl Into<String>, data: impl Into<String>) -> Self {
        Node::Leaf {
            name: name.into(),
            data: data.into(),
        }
    }

    pub fn interior(name: impl Into<String>, children: Vec<Node>) -> Self {
        Node::Interior {
            name: name.into(),
            children: children.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn unclassified(name: impl Into<String>) -> Self {
        Node::Unclassified { name: name.into() }
    }

    pub fn name(&self) -> &str {
        match self {
            Node::Leaf { name, .. } | Node::Interior { name, .. } | Node::Unclassified { name } => {
                name
            }
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Leaf { .. } => NodeKind::Leaf,
            Node::Interior { .. } => NodeKind::Interior,
            Node::Unclassified { .. } => NodeKind::Unclassified,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    pub fn is_interior(&self) -> bool {
        matches!(self, Node::Interior { .. })
    }

    pub fn is_unclassified(&self) -> bool {
        matches!(self, Node::Unclassified { .. })
    }

    pub fn data(&self) -> Option<&str> {
        match self {
            Node::Leaf { data, .. } => Some(data),
            _ => None,
        }
    }

    /// Children of an interior node; empty for the other kinds.
    pub fn children(&self) -> &[Tree] {
        match self {
            Node::Interior { children, .. } => children,
            _ => &[],
        }
    }

    /// Same node under a different name. Children are shared, not copied.
    pub fn with_name(&self, new_name: impl Into<String>) -> Node {
        let name = new_name.into();
        match self {
            Node::Leaf { data, .. } => Node::Leaf {
                name,
                data: data.clone(),
            },
            Node::Interior { children, .. } => Node::Interior {
                name,
                children: children.clone(),
            },
            Node::Unclassified { .. } => Node::Unclassified { name },
        }
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(|c| c.node_count()).sum::<usize>()
    }

    /// Length of the longest root-to-node chain, counting nodes.
    pub fn depth(&self) -> usize {
        1 + self.children().iter().map(|c| c.depth()).max().unwrap_or(0)
    }

    /// Checks that every name in the subtree is non-blank. Returns the path
    /// of the first offending node in preorder.
    pub fn validate(&self) -> Result<(), NodePath> {
        fn walk(node: &Node, path: &mut NodePath) -> Result<(), NodePath> {
            if node.name().trim().is_empty() {
                return Err(path.clone());
            }
            for (i, child) in node.children().iter().enumerate() {
                path.push(i);
                walk(child, path)?;
                path.pop();
            }
            Ok(())
        }
        walk(self, &mut NodePath::root())
    }
}

/// Resolves `path` from `root`, or `None` when some index is out of range.
pub fn lookup<'a>(root: &'a Tree, path: &NodePath) -> Option<&'a Tree> {
    let mut cur = root;
    for &i in path.indices() {
        cur = cur.children().get(i)?;
    }
    Some(cur)
}

/// Built-in tree used to seed a brand-new document when nothing is loaded.
pub fn starter_tree() -> Tree {
    Arc::new(Node::interior(
        "root",
        vec![
            Node::interior(
                "child1",
                vec![
                    Node::leaf("child1-child1", "c1-c1 Hello"),
                    Node::leaf("child1-child2", "c1-c2 JS"),
                ],
            ),
            Node::leaf("child2", "c2 World"),
        ],
    ))
}

/// Zero-based child indices from the root. The empty path is the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn child(&self, index: usize) -> Self {
        let mut v = self.0.clone();
        v.push(index);
        Self(v)
    }

    pub fn parent(&self) -> Option<Self> {
        let (_, head) = self.0.split_last()?;
        Some(Self(head.to_vec()))
    }

    fn push(&mut self, index: usize) {
        self.0.push(index);
    }

    fn pop(&mut self) {
        self.0.pop();
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(v: Vec<usize>) -> Self {
        Self(v)
    }
}

impl From<&[usize]> for NodePath {
    fn from(v: &[usize]) -> Self {
        Self(v.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for NodePath {
    fn from(v: [usize; N]) -> Self {
        Self(v.to_vec())
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for i in &self.0 {
            write!(f, "/{}", i)?;
        }
        Ok(())
    }
}

/// Accepts `/0/2`, `0/2` and `0.2`; `""` and `/` are the root.
impl FromStr for NodePath {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let body = s.strip_prefix('/').unwrap_or(s);
        if body.is_empty() {
            return Ok(Self::root());
        }
        body.split(['/', '.'])
            .map(|tok| {
                tok.parse::<usize>()
                    .map_err(|_| format!("bad path segment {:?} in {:?}", tok, s))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}
