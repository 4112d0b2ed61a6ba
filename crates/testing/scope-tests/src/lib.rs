//! Shared helpers for scope resolution integration tests

use ks_driver::Compilation;
use ks_intern::Interner;
use ks_scope::{LookupResult, Scope, ScopeConfig};
use ks_span::FileId;
use ks_symbols::{ProgramBuilder, SymbolKind};
use std::sync::Once;
use tracing_subscriber::EnvFilter;

/// Install a test-friendly subscriber once per process.
///
/// Output is controlled with `RUST_LOG`, e.g. `RUST_LOG=ks_scope=trace`.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        // Another harness may have installed a subscriber already.
        if let Err(error) = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init()
        {
            tracing::debug!(%error, "keeping the installed subscriber");
        }
    });
}

/// A builder for a fresh program in file 0
pub fn program_builder() -> (ProgramBuilder, Interner) {
    init_tracing();
    let interner = Interner::new();
    (ProgramBuilder::new(interner.clone(), FileId(0)), interner)
}

/// Finish `builder` into a compilation with default settings
///
/// # Panics
///
/// If declarations other than the compilation unit are still open.
pub fn compile(builder: ProgramBuilder, interner: Interner) -> Compilation {
    compile_with(builder, interner, ScopeConfig::default())
}

/// Finish `builder` into a compilation with `config`
///
/// # Panics
///
/// If declarations other than the compilation unit are still open.
#[allow(clippy::unwrap_used, reason = "test fixtures are built correctly or not at all")]
pub fn compile_with(builder: ProgramBuilder, interner: Interner, config: ScopeConfig) -> Compilation {
    Compilation::new(builder.finish().unwrap(), interner, config)
}

/// Close `count` open nodes
///
/// # Panics
///
/// If fewer nodes are open.
#[allow(clippy::unwrap_used, reason = "test fixtures are built correctly or not at all")]
pub fn close(builder: &mut ProgramBuilder, count: usize) {
    for _ in 0..count {
        builder.close().unwrap();
    }
}

/// Kind labels of a chain, innermost first
pub fn chain_labels(scope: &Scope) -> Vec<&'static str> {
    scope.chain().map(|node| node.kind().label()).collect()
}

/// One line per chain node, for snapshots
pub fn describe_chain(scope: &Scope) -> String {
    let mut out = String::new();
    for node in scope.chain() {
        let flags: Vec<&str> = node.flags().iter_names().map(|(name, _)| name).collect();
        out.push_str(node.kind().label());
        if !flags.is_empty() {
            out.push(' ');
            out.push_str(&flags.join(" | "));
        }
        out.push('\n');
    }
    out
}

/// `Kind: name (symbol kind), ...`, for snapshots
pub fn describe_result(compilation: &Compilation, result: &LookupResult) -> String {
    let symbols = &compilation.program().symbols;
    let candidates: Vec<String> = result
        .symbols()
        .iter()
        .map(|&symbol| {
            let declared = symbols.symbol(symbol);
            format!(
                "{} ({})",
                compilation.interner().resolve(&declared.name),
                kind_label(declared.kind)
            )
        })
        .collect();
    if candidates.is_empty() {
        format!("{:?}", result.kind())
    } else {
        format!("{:?}: {}", result.kind(), candidates.join(", "))
    }
}

fn kind_label(kind: SymbolKind) -> &'static str {
    match kind {
        SymbolKind::Namespace => "namespace",
        SymbolKind::NamedType(_) => "type",
        SymbolKind::Method(_) => "method",
        SymbolKind::Property => "property",
        SymbolKind::Field => "field",
        SymbolKind::Event => "event",
        SymbolKind::Local => "local",
        SymbolKind::Parameter => "parameter",
        SymbolKind::TypeParameter => "type parameter",
        SymbolKind::Label => "label",
        SymbolKind::RangeVariable => "range variable",
        SymbolKind::LocalFunction => "local function",
        SymbolKind::Alias => "alias",
        SymbolKind::ExternAlias => "extern alias",
    }
}
