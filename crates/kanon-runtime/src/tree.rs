//! Concrete parse trees.
//!
//! Nodes live in an append-only arena and refer to each other by index, so a
//! node's parent back-reference is a plain non-owning id rather than an
//! aliasing pointer. Parent links exist for diagnostics only; traversal
//! always follows the owned child lists.

use std::fmt;

/// Index of a node within its [`ParseTree`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NodeID {
    raw: usize,
}

impl NodeID {
    const fn new(raw: usize) -> Self {
        Self { raw }
    }
}

impl fmt::Display for NodeID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.raw, f)
    }
}

#[derive(Debug)]
pub struct Node {
    label: String,
    children: Vec<NodeID>,
    parent: Option<NodeID>,
    terminal: bool,
}

impl Node {
    /// Terminal text for leaves, nonterminal name for reduction nodes.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn children(&self) -> &[NodeID] {
        &self.children
    }

    /// Whether this node was pushed by a shift. A reduction node may also be
    /// childless (an ε-production), so this is not the same as having no
    /// children.
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// The node this one was reduced into, if any. Diagnostics only.
    pub fn parent(&self) -> Option<NodeID> {
        self.parent
    }
}

#[derive(Debug, Default)]
pub struct ParseTree {
    nodes: Vec<Node>,
    root: Option<NodeID>,
}

impl ParseTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, id: NodeID) -> &Node {
        &self.nodes[id.raw]
    }

    pub fn root(&self) -> Option<NodeID> {
        self.root
    }

    /// Append a leaf node for a consumed terminal.
    pub fn leaf(&mut self, label: &str) -> NodeID {
        let id = NodeID::new(self.nodes.len());
        self.nodes.push(Node {
            label: label.to_owned(),
            children: vec![],
            parent: None,
            terminal: true,
        });
        id
    }

    /// Append a reduction node adopting `children` in order.
    pub fn branch(&mut self, label: &str, children: Vec<NodeID>) -> NodeID {
        let id = NodeID::new(self.nodes.len());
        for &child in &children {
            self.nodes[child.raw].parent = Some(id);
        }
        self.nodes.push(Node {
            label: label.to_owned(),
            children,
            parent: None,
            terminal: false,
        });
        id
    }

    pub(crate) fn set_root(&mut self, id: NodeID) {
        self.root = Some(id);
    }

    /// Leaf labels in left-to-right order; for an accepted parse these are
    /// exactly the consumed terminal texts.
    pub fn leaves(&self) -> Vec<&str> {
        let mut out = vec![];
        if let Some(root) = self.root {
            self.collect_leaves(root, &mut out);
        }
        out
    }

    fn collect_leaves<'a>(&'a self, id: NodeID, out: &mut Vec<&'a str>) {
        let node = self.node(id);
        if node.terminal {
            out.push(node.label());
            return;
        }
        for &child in &node.children {
            self.collect_leaves(child, out);
        }
    }

    /// Render the tree below `root` in the classic sideways layout.
    pub fn display(&self) -> impl fmt::Display + '_ {
        DisplayTree { tree: self }
    }

    fn fmt_node(&self, f: &mut fmt::Formatter<'_>, id: NodeID, prefix: &str) -> fmt::Result {
        let node = self.node(id);
        writeln!(f, "-+= {}", node.label)?;
        let last = node.children.len().saturating_sub(1);
        for (i, &child) in node.children.iter().enumerate() {
            if i == last {
                write!(f, "{} \\", prefix)?;
                self.fmt_node(f, child, &format!("{}  ", prefix))?;
            } else {
                write!(f, "{} |", prefix)?;
                self.fmt_node(f, child, &format!("{} |", prefix))?;
            }
        }
        Ok(())
    }
}

struct DisplayTree<'t> {
    tree: &'t ParseTree,
}

impl fmt::Display for DisplayTree<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tree.root {
            Some(root) => self.tree.fmt_node(f, root, ""),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_links() {
        let mut tree = ParseTree::new();
        let a = tree.leaf("a");
        let b = tree.leaf("b");
        let top = tree.branch("S", vec![a, b]);
        tree.set_root(top);

        assert_eq!(tree.node(a).parent(), Some(top));
        assert_eq!(tree.node(b).parent(), Some(top));
        assert_eq!(tree.node(top).parent(), None);
        assert_eq!(tree.leaves(), ["a", "b"]);
    }

    #[test]
    fn render_nested() {
        let mut tree = ParseTree::new();
        let x = tree.leaf("x");
        let inner = tree.branch("A", vec![x]);
        let y = tree.leaf("y");
        let top = tree.branch("S", vec![inner, y]);
        tree.set_root(top);

        let rendered = tree.display().to_string();
        assert_eq!(rendered, "-+= S\n |-+= A\n | \\-+= x\n \\-+= y\n");
    }
}
