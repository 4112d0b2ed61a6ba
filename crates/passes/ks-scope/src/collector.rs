//! Collected names for "what is visible here" queries

use indexmap::IndexMap;
use ks_intern::Name;
use ks_symbols::SymbolId;
use rustc_hash::{FxBuildHasher, FxHashSet};
use smallvec::SmallVec;

/// Names visible from a scope and the symbols behind them, innermost first.
///
/// Unlike a lookup, enumeration does not stop at the first scope declaring a
/// name: outer symbols of the same name are kept after inner ones.
#[derive(Debug, Clone, Default)]
pub struct LookupSymbolsInfo {
    entries: IndexMap<Name, SmallVec<[SymbolId; 2]>, FxBuildHasher>,
    masked: FxHashSet<Name>,
}

impl LookupSymbolsInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: Name, symbol: SymbolId) {
        let symbols = self.entries.entry(name).or_default();
        if !symbols.contains(&symbol) {
            symbols.push(symbol);
        }
    }

    /// Distinct names, in the order they were first seen
    pub fn names(&self) -> impl Iterator<Item = Name> + '_ {
        self.entries.keys().copied()
    }

    pub fn symbols(&self, name: Name) -> &[SymbolId] {
        self.entries.get(&name).map_or(&[], |found| found.as_slice())
    }

    pub fn contains(&self, name: Name) -> bool {
        self.entries.contains_key(&name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Name, &[SymbolId])> + '_ {
        self.entries
            .iter()
            .map(|(&name, symbols)| (name, symbols.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hide `name` from outer class type parameters
    pub(crate) fn mask_type_parameter(&mut self, name: Name) {
        self.masked.insert(name);
    }

    pub(crate) fn is_type_parameter_masked(&self, name: Name) -> bool {
        self.masked.contains(&name)
    }
}
