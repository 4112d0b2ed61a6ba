//! Compilation driver and high-level APIs
//!
//! [`Compilation`] owns a program together with everything scope queries
//! need: the interner, the settings, the chain factory and a pool of lookup
//! accumulators. Tools ask it what is visible at a position, what a name
//! resolves to, and which declarations conflict.

use anyhow::{Context, Result};
use ks_intern::{Interner, Name};
use ks_scope::{
    DiagnosticBag, LookupOptions, LookupResultPool, ScopeConfig, ScopeContext, ScopeFactory,
    ScopeRef, ScopeUsage, validate_imports,
};
use ks_span::TextOffset;
use ks_symbols::{Program, SymbolId, SymbolKind};
use ks_syntax::{NodeId, SyntaxKind};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// A program and its scope machinery
#[derive(Debug)]
pub struct Compilation {
    program: Program,
    interner: Interner,
    config: ScopeConfig,
    factory: ScopeFactory,
    pool: LookupResultPool,
}

impl Compilation {
    pub fn new(program: Program, interner: Interner, config: ScopeConfig) -> Self {
        let factory = ScopeFactory::new(config.cache_capacity);
        let pool = LookupResultPool::new(config.pool_retained);
        Self {
            program,
            interner,
            config,
            factory,
            pool,
        }
    }

    /// Inputs for operations on chains of this compilation
    pub fn context(&self) -> ScopeContext<'_> {
        ScopeContext::new(
            &self.program.tree,
            &self.program.symbols,
            &self.interner,
            &self.config,
        )
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    pub fn config(&self) -> &ScopeConfig {
        &self.config
    }

    pub fn factory(&self) -> &ScopeFactory {
        &self.factory
    }

    pub fn pool(&self) -> &LookupResultPool {
        &self.pool
    }

    /// Chain in effect at `position`
    pub fn scope_at(&self, position: TextOffset) -> ScopeRef {
        self.factory.chain_at(self.context(), position)
    }

    /// Chain in effect inside `node`
    pub fn scope_for(&self, node: NodeId) -> ScopeRef {
        self.factory
            .chain_for_node(self.context(), node, ScopeUsage::Normal)
    }

    /// The declaration `text` names at `position`, if the name resolves to
    /// exactly one viable symbol
    pub fn resolve(&self, position: TextOffset, text: &str, options: LookupOptions) -> Option<SymbolId> {
        let ctx = self.context();
        let name = self.interner.get(text)?;
        let scope = self.scope_at(position);
        let mut result = self.pool.acquire();
        scope.lookup_with_fallback(ctx, &mut result, name, 0, options);
        let symbol = result.single_symbol().filter(|_| result.is_single_viable());
        debug!(text, ?symbol, kind = ?result.kind(), "resolved");
        symbol
    }

    /// Names visible at `position`, innermost first
    pub fn visible_names(&self, position: TextOffset) -> Vec<Name> {
        self.scope_at(position)
            .enumerate_visible(self.context(), LookupOptions::empty())
            .names()
            .collect()
    }

    /// Report conflicting declarations and import directives of the whole
    /// program
    pub fn check_declarations(&self) -> DiagnosticBag {
        let ctx = self.context();
        let tree = &self.program.tree;
        let symbols = &self.program.symbols;
        let mut diagnostics = DiagnosticBag::new();

        for node in tree.descendants(tree.root()) {
            if matches!(
                tree.kind(node),
                SyntaxKind::CompilationUnit | SyntaxKind::NamespaceDeclaration
            ) {
                validate_imports(ctx, node, &mut diagnostics);
            }
        }

        for (symbol, declared) in symbols.iter() {
            let checked = declared.kind.is_local_like() || declared.kind == SymbolKind::TypeParameter;
            let Some(node) = declared.declaring_node.filter(|_| checked) else {
                continue;
            };
            // A local function's own scope holds its parameters; its name
            // belongs to the enclosing statement list.
            let defined_in = match declared.kind {
                SymbolKind::LocalFunction => tree.parent(node).unwrap_or(node),
                _ => node,
            };
            self.scope_for(defined_in)
                .ensure_single_definition(ctx, symbol, &mut diagnostics);
        }

        info!(count = diagnostics.len(), "declarations checked");
        diagnostics
    }
}

/// Parse scope settings from TOML text
///
/// # Errors
///
/// Fails when the text is not valid TOML or a setting has the wrong type.
pub fn parse_config(text: &str) -> Result<ScopeConfig> {
    toml::from_str(text).context("Failed to parse scope configuration")
}

/// Load scope settings from a TOML file; missing settings keep their defaults
///
/// # Errors
///
/// Fails when the file cannot be read or parsed.
pub fn load_config(path: &Path) -> Result<ScopeConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read scope configuration: {}", path.display()))?;
    let config = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse scope configuration: {}", path.display()))?;
    debug!(path = %path.display(), ?config, "loaded scope configuration");
    Ok(config)
}
