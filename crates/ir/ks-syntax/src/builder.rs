//! Incremental construction of a [`SyntaxTree`]

use crate::error::SyntaxError;
use crate::kind::{Modifiers, Role, SyntaxKind};
use crate::tree::{NodeId, SyntaxNode, SyntaxTree};
use ks_intern::Name;
use ks_span::{FileId, Span, TextOffset};
use la_arena::Arena;

/// Builds a tree node by node, assigning synthetic spans.
///
/// Every `open` or `leaf` consumes one offset for its start and every `close`
/// or `leaf` one offset for its end, so a node's start offset belongs to the
/// node itself and to none of its children. Siblings never overlap.
#[derive(Debug)]
pub struct SyntaxTreeBuilder {
    file: FileId,
    nodes: Arena<SyntaxNode>,
    stack: Vec<NodeId>,
    root: Option<NodeId>,
    cursor: TextOffset,
}

impl SyntaxTreeBuilder {
    pub fn new(file: FileId) -> Self {
        Self {
            file,
            nodes: Arena::new(),
            stack: Vec::new(),
            root: None,
            cursor: 0,
        }
    }

    /// Open a node; it becomes the parent of subsequently added nodes until closed.
    pub fn open(&mut self, kind: SyntaxKind, role: Role, name: Option<Name>) -> NodeId {
        let start = self.bump();
        let id = self.push(kind, role, name, Span::empty_at(start));
        self.stack.push(id);
        id
    }

    /// Add a childless node
    pub fn leaf(&mut self, kind: SyntaxKind, role: Role, name: Option<Name>) -> NodeId {
        let start = self.bump();
        let end = self.bump();
        self.push(kind, role, name, Span::new(start, end))
    }

    /// Close the innermost open node and return it
    ///
    /// # Errors
    ///
    /// Returns `SyntaxError::UnbalancedClose` when no node is open.
    pub fn close(&mut self) -> Result<NodeId, SyntaxError> {
        let id = self.stack.pop().ok_or(SyntaxError::UnbalancedClose)?;
        let end = self.bump();
        self.nodes[id].span.end = end;
        Ok(id)
    }

    /// Set modifiers on an already created node
    pub fn set_modifiers(&mut self, id: NodeId, modifiers: Modifiers) {
        self.nodes[id].modifiers |= modifiers;
    }

    /// Start offset of a node, available before it is closed
    pub fn start_of(&self, id: NodeId) -> TextOffset {
        self.nodes[id].span.start
    }

    /// The node currently receiving children
    pub fn current(&self) -> Option<NodeId> {
        self.stack.last().copied()
    }

    /// Finish the tree
    ///
    /// # Errors
    ///
    /// Returns an error if nodes are still open or no node was ever added.
    pub fn finish(self) -> Result<SyntaxTree, SyntaxError> {
        if let Some(&open) = self.stack.last() {
            return Err(SyntaxError::UnclosedNode {
                kind: self.nodes[open].kind,
                depth: self.stack.len(),
            });
        }
        let root = self.root.ok_or(SyntaxError::EmptyTree)?;
        Ok(SyntaxTree {
            file: self.file,
            nodes: self.nodes,
            root,
        })
    }

    fn bump(&mut self) -> TextOffset {
        let offset = self.cursor;
        self.cursor += 1;
        offset
    }

    fn push(&mut self, kind: SyntaxKind, role: Role, name: Option<Name>, span: Span) -> NodeId {
        let parent = self.stack.last().copied();
        let id = self.nodes.alloc(SyntaxNode {
            kind,
            role,
            span,
            parent,
            children: Vec::new(),
            name,
            modifiers: Modifiers::empty(),
        });
        match parent {
            Some(parent) => self.nodes[parent].children.push(id),
            None => {
                if self.root.is_none() {
                    self.root = Some(id);
                }
            }
        }
        id
    }
}
