//! Syntax tree consumed by scope construction
//!
//! The tree is produced by the parser and never changes afterwards. Scope
//! construction only needs node kinds, the slot (role) each child occupies,
//! spans for position queries and the identifier carried by declarations, so
//! that is all a node stores.

mod builder;
mod error;
mod kind;
mod tree;

pub use builder::SyntaxTreeBuilder;
pub use error::SyntaxError;
pub use kind::{Modifiers, Role, SyntaxKind};
pub use tree::{Ancestors, Descendants, NodeId, SyntaxNode, SyntaxTree};
