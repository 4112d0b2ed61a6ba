//! Lexical scopes and name lookup
//!
//! A position in a program is described by a chain of [`Scope`] nodes, the
//! innermost first. Each node owns one declaration space (the locals of a
//! block, the parameters of a member, the members of a type, the directives
//! of a namespace body, ...) and answers lookups from that space only. The
//! chain walk in [`Scope::lookup`] combines the answers through the
//! [`LookupResult`] algebra: the nearest viable declaration wins and
//! ambiguities are preserved.
//!
//! [`ScopeFactory`] builds chains from syntax and caches them. Chains are
//! immutable apart from write-once caches, so they can be shared freely
//! between threads.
//!
//! # Examples
//!
//! ```rust
//! use ks_intern::Interner;
//! use ks_scope::{LookupOptions, ScopeConfig, ScopeContext, ScopeFactory, ScopeUsage};
//! use ks_span::FileId;
//! use ks_symbols::{MethodKind, ProgramBuilder, TypeKind};
//! use ks_syntax::{Role, SyntaxKind};
//!
//! let interner = Interner::new();
//! let mut builder = ProgramBuilder::new(interner.clone(), FileId(0));
//! builder.open_type("Point", TypeKind::Struct);
//! builder.open_method("Scale", MethodKind::Ordinary);
//! let factor = builder.parameter("factor");
//! let body = builder.open(SyntaxKind::Block, Role::Body);
//! for _ in 0..3 {
//!     builder.close().unwrap();
//! }
//! let program = builder.finish().unwrap();
//!
//! let config = ScopeConfig::default();
//! let ctx = ScopeContext::new(&program.tree, &program.symbols, &interner, &config);
//! let factory = ScopeFactory::new(config.cache_capacity);
//! let chain = factory.chain_for_node(ctx, body, ScopeUsage::Normal);
//!
//! let found = chain.lookup(ctx, interner.intern("factor"), 0, LookupOptions::empty());
//! assert_eq!(found.single_symbol(), Some(factor));
//! ```

#![allow(
    clippy::multiple_inherent_impl,
    reason = "Scope operations live next to the machinery they use: chain walks, conflict checks and per-kind dispatch"
)]

mod chain;
mod collector;
mod config;
mod conflict;
mod context;
mod declarations;
mod error;
mod factory;
mod invariant;
mod kinds;
mod lazy;
mod namespace;
mod options;
mod pool;
mod result;
mod scope;
mod viability;

pub use chain::ExtensionMethodGroup;
pub use collector::LookupSymbolsInfo;
pub use config::ScopeConfig;
pub use context::ScopeContext;
pub use error::{DiagnosticBag, DiagnosticSink, LookupDiagnostic, ScopeDiagnostic, suggest_names};
pub use factory::{ScopeFactory, ScopeUsage};
pub use kinds::validate_imports;
pub use lazy::ComputeOnce;
pub use namespace::{DeclaredNamespace, ImportNamespace, RangeVariable, RangeVariableMap};
pub use options::{BinderFlags, LookupOptions};
pub use pool::{LookupResultPool, PooledLookupResult};
pub use result::{LookupResult, LookupResultKind, SingleLookupResult};
pub use scope::{Scope, ScopeKind, ScopeRef};
pub use viability::{LookupRequest, can_add_lookup_symbol_info, check_viability};

pub use ks_lifetime::{Lifetime, SafeContext};
