//! Widget tree
//!
//! Nodes live in an arena owned by `Document` and refer to each other by
//! `NodeId`. The Document node is always `NodeId(0)`; everything else hangs
//! below it through doubly linked sibling chains.

use crate::geometry::NodeBox;
use crate::style::Style;

/// Index of a node inside its `Document`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    /// `<?xml ...?>`, synthesized when the source has none
    Declaration,
    Element,
    Text,
    CData,
    Comment,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    /// Value of the `id` attribute
    pub id: String,
    pub name: String,
    /// Tag name for elements, literal content for text, CDATA and comments
    pub tag: String,
    /// Editable text content
    pub value: Vec<char>,
    pub frame: NodeBox,
    pub style: Style,

    pub parent: Option<NodeId>,
    pub first_child: Option<NodeId>,
    pub last_child: Option<NodeId>,
    pub prev_sibling: Option<NodeId>,
    pub next_sibling: Option<NodeId>,

    /// Nesting level while the tree is being built
    pub depth: usize,
}

impl Node {
    pub fn new(kind: NodeKind, tag: impl Into<String>) -> Self {
        Self {
            kind,
            id: String::new(),
            name: String::new(),
            tag: tag.into(),
            value: Vec::new(),
            frame: NodeBox::default(),
            style: Style::default(),
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
            depth: 0,
        }
    }

    pub fn element(tag: impl Into<String>, style: Style) -> Self {
        Self { style, ..Node::new(NodeKind::Element, tag) }
    }

    pub fn value_string(&self) -> String {
        self.value.iter().collect()
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub const ROOT: NodeId = NodeId(0);

    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Document, "")],
        }
    }

    pub fn root(&self) -> NodeId {
        Self::ROOT
    }

    /// Stores a detached node and returns its id. Link it with `add_child`
    /// or `add_sibling`.
    pub fn insert(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Appends `child` as the new last child of `parent`.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        let last = self.nodes[parent.0].last_child;
        {
            let n = &mut self.nodes[child.0];
            n.parent = Some(parent);
            n.next_sibling = None;
            n.prev_sibling = last;
        }
        match last {
            Some(last) => self.nodes[last.0].next_sibling = Some(child),
            None => self.nodes[parent.0].first_child = Some(child),
        }
        self.nodes[parent.0].last_child = Some(child);
    }

    /// Appends `node` at the end of the sibling chain that `anchor` belongs
    /// to. This is not necessarily right after `anchor`: if `anchor` already
    /// has later siblings, `node` goes after the last of them.
    pub fn add_sibling(&mut self, anchor: NodeId, node: NodeId) {
        let mut last = anchor;
        while let Some(next) = self.nodes[last.0].next_sibling {
            last = next;
        }
        let parent = self.nodes[last.0].parent;
        {
            let n = &mut self.nodes[node.0];
            n.parent = parent;
            n.prev_sibling = Some(last);
            n.next_sibling = None;
        }
        self.nodes[last.0].next_sibling = Some(node);
        if let Some(parent) = parent {
            self.nodes[parent.0].last_child = Some(node);
        }
    }

    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            doc: self,
            next: self.nodes[id.0].first_child,
        }
    }

    /// Every node in document order, starting with the Document itself.
    pub fn flatten(&self) -> Vec<NodeId> {
        self.flatten_from(Self::ROOT)
    }

    /// `start` and all of its descendants in document order.
    pub fn flatten_from(&self, start: NodeId) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            out.push(id);
            let first = stack.len();
            stack.extend(self.children(id));
            stack[first..].reverse();
        }
        out
    }

    /// Finds the descendant of `root` under the point.
    ///
    /// At every level all direct children are checked in document order
    /// before descending into any of them, and the first match wins. When two
    /// siblings overlap, the earlier one is returned even though the later
    /// one is painted on top. `root` itself is never returned.
    pub fn hit_test(&self, root: NodeId, x: f32, y: f32) -> Option<NodeId> {
        if let Some(hit) = self.children(root).find(|&c| self.nodes[c.0].frame.contains(x, y)) {
            return Some(hit);
        }
        self.children(root).find_map(|c| self.hit_test(c, x, y))
    }

    /// The root container: first element below the Document node.
    pub fn window(&self) -> Option<NodeId> {
        self.children(Self::ROOT)
            .find(|&c| self.nodes[c.0].kind == NodeKind::Element)
    }

    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        (0..self.nodes.len())
            .map(NodeId)
            .find(|&n| self.nodes[n.0].id == id)
    }
}

pub struct Children<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.doc.node(current).next_sibling;
        Some(current)
    }
}
