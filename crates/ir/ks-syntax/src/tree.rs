//! Immutable syntax tree

use crate::kind::{Modifiers, Role, SyntaxKind};
use ks_intern::Name;
use ks_span::{FileId, FileSpan, Span, TextOffset};
use la_arena::{Arena, Idx};

/// Identifier of a node within its tree
pub type NodeId = Idx<SyntaxNode>;

/// A single node of the tree
#[derive(Debug, Clone)]
pub struct SyntaxNode {
    pub kind: SyntaxKind,
    /// Slot occupied in the parent
    pub role: Role,
    pub span: Span,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Identifier carried by declarations and simple names
    pub name: Option<Name>,
    pub modifiers: Modifiers,
}

/// A parsed file. Never mutated after [`crate::SyntaxTreeBuilder::finish`].
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    pub(crate) file: FileId,
    pub(crate) nodes: Arena<SyntaxNode>,
    pub(crate) root: NodeId,
}

impl SyntaxTree {
    pub fn file(&self) -> FileId {
        self.file
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id]
    }

    pub fn kind(&self, id: NodeId) -> SyntaxKind {
        self.nodes[id].kind
    }

    pub fn role(&self, id: NodeId) -> Role {
        self.nodes[id].role
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id].span
    }

    pub fn file_span(&self, id: NodeId) -> FileSpan {
        FileSpan::new(self.file, self.nodes[id].span)
    }

    pub fn name(&self, id: NodeId) -> Option<Name> {
        self.nodes[id].name
    }

    pub fn modifiers(&self, id: NodeId) -> Modifiers {
        self.nodes[id].modifiers
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    /// First child occupying `role`
    pub fn child_with_role(&self, id: NodeId, role: Role) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&child| self.role(child) == role)
    }

    pub fn children_with_role(&self, id: NodeId, role: Role) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(move |&child| self.role(child) == role)
    }

    pub fn children_of_kind(
        &self,
        id: NodeId,
        kind: SyntaxKind,
    ) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(move |&child| self.kind(child) == kind)
    }

    /// The node itself followed by its ancestors up to the root
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: Some(id),
        }
    }

    /// Nearest ancestor (excluding the node itself) matching `predicate`
    pub fn enclosing(
        &self,
        id: NodeId,
        predicate: impl Fn(SyntaxKind) -> bool,
    ) -> Option<NodeId> {
        self.ancestors(id)
            .skip(1)
            .find(|&ancestor| predicate(self.kind(ancestor)))
    }

    /// Whether `ancestor` is `id` or one of its ancestors
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> bool {
        self.ancestors(id).any(|node| node == ancestor)
    }

    /// Pre-order traversal of the subtree rooted at `id`
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            stack: vec![id],
        }
    }

    /// Deepest node whose span contains `offset`; the root when nothing deeper does.
    pub fn innermost_node_at(&self, offset: TextOffset) -> NodeId {
        let mut current = self.root;
        'descend: loop {
            for &child in self.children(current) {
                if self.span(child).contains(offset) {
                    current = child;
                    continue 'descend;
                }
            }
            return current;
        }
    }

    /// Index of `id` among its siblings
    pub fn sibling_index(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&child| child == id)
    }
}

/// Iterator over a node and its ancestors
pub struct Ancestors<'tree> {
    tree: &'tree SyntaxTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

/// Pre-order iterator over a subtree
pub struct Descendants<'tree> {
    tree: &'tree SyntaxTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(current).iter().rev().copied());
        Some(current)
    }
}
