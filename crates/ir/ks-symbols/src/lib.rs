//! Resolved symbols consumed by scope construction and lookup
//!
//! The symbol table is produced by declaration processing and is read-only
//! afterwards. It answers the questions lookup asks of a symbol: its name,
//! kind, arity, container, accessibility and the syntax that declared it.
//!
//! [`ProgramBuilder`] builds a syntax tree and its symbol table side by side,
//! which is how tests and tools without a front end construct programs.

mod builder;
mod symbol;
mod table;

pub use builder::{Program, ProgramBuilder};
pub use symbol::{
    Accessibility, AssemblyId, MethodKind, Symbol, SymbolId, SymbolKind, TypeKind,
};
pub use table::{AccessContext, SymbolTable};
