//! Errors raised while building a syntax tree

use crate::kind::SyntaxKind;

/// Misuse of [`crate::SyntaxTreeBuilder`]
#[derive(Debug, Clone, thiserror::Error)]
pub enum SyntaxError {
    /// `finish` was called with nodes still open
    #[error("{depth} node(s) still open, innermost is {kind:?}")]
    UnclosedNode {
        /// Kind of the innermost open node
        kind: SyntaxKind,
        /// Number of open nodes
        depth: usize,
    },

    /// `close` was called with no open node
    #[error("close without a matching open")]
    UnbalancedClose,

    /// No node was added
    #[error("syntax tree has no root")]
    EmptyTree,
}
