//! Read-only inputs shared by every scope operation

use crate::config::ScopeConfig;
use ks_intern::Interner;
use ks_span::FileSpan;
use ks_symbols::{AccessContext, AssemblyId, SymbolId, SymbolTable};
use ks_syntax::SyntaxTree;

/// The program a chain was built for.
///
/// Scope nodes only hold syntax and symbol ids; every operation that needs to
/// look at the program takes a context.
#[derive(Debug, Clone, Copy)]
pub struct ScopeContext<'a> {
    pub tree: &'a SyntaxTree,
    pub symbols: &'a SymbolTable,
    pub interner: &'a Interner,
    pub config: &'a ScopeConfig,
}

impl<'a> ScopeContext<'a> {
    pub fn new(
        tree: &'a SyntaxTree,
        symbols: &'a SymbolTable,
        interner: &'a Interner,
        config: &'a ScopeConfig,
    ) -> Self {
        Self {
            tree,
            symbols,
            interner,
            config,
        }
    }

    pub fn source_assembly(&self) -> AssemblyId {
        AssemblyId(self.config.source_assembly)
    }

    /// Access from code of the compiled assembly, optionally inside a type
    pub fn access_from(&self, within_type: Option<SymbolId>) -> AccessContext {
        AccessContext {
            assembly: self.source_assembly(),
            within_type,
        }
    }

    /// Where `symbol` is declared, falling back to its declaring node and
    /// then to the whole file
    pub fn span_of(&self, symbol: SymbolId) -> FileSpan {
        let declared = self.symbols.symbol(symbol);
        declared
            .declared_at
            .or_else(|| declared.declaring_node.map(|node| self.tree.file_span(node)))
            .unwrap_or_else(|| self.tree.file_span(self.tree.root()))
    }
}
