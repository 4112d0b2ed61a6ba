//! Declaration spaces owned by scope nodes

use indexmap::IndexMap;
use ks_intern::{Interner, Name};
use ks_symbols::{SymbolId, SymbolKind, SymbolTable};
use rustc_hash::FxBuildHasher;
use smallvec::SmallVec;

type NameMap<T> = IndexMap<Name, T, FxBuildHasher>;

/// Symbols declared directly by one scope node, in declaration order.
///
/// Labels live apart from every other declaration: a label never hides a
/// local and a local never hides a label.
#[derive(Debug, Clone, Default)]
pub struct DeclaredNamespace {
    values: NameMap<SmallVec<[SymbolId; 1]>>,
    labels: NameMap<SmallVec<[SymbolId; 1]>>,
}

impl DeclaredNamespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from symbols, sorting labels into the label space
    pub fn from_symbols(symbols: &SymbolTable, declared: impl IntoIterator<Item = SymbolId>) -> Self {
        let mut namespace = Self::new();
        for id in declared {
            namespace.insert(symbols, id);
        }
        namespace
    }

    pub fn insert(&mut self, symbols: &SymbolTable, id: SymbolId) {
        let symbol = symbols.symbol(id);
        let space = if symbol.kind == SymbolKind::Label {
            &mut self.labels
        } else {
            &mut self.values
        };
        space.entry(symbol.name).or_default().push(id);
    }

    pub fn values(&self, name: Name) -> &[SymbolId] {
        self.values.get(&name).map_or(&[], |found| found.as_slice())
    }

    pub fn labels(&self, name: Name) -> &[SymbolId] {
        self.labels.get(&name).map_or(&[], |found| found.as_slice())
    }

    /// Every non-label declaration, in order
    pub fn all_values(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.values.values().flatten().copied()
    }

    pub fn all_labels(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.labels.values().flatten().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.labels.is_empty()
    }
}

/// Using directives and aliases of one compilation unit or namespace body
#[derive(Debug, Clone, Default)]
pub struct ImportNamespace {
    aliases: NameMap<SmallVec<[SymbolId; 1]>>,
    using_namespaces: Vec<SymbolId>,
    using_statics: Vec<SymbolId>,
}

impl ImportNamespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an extern alias or using alias symbol
    pub fn add_alias(&mut self, name: Name, alias: SymbolId) {
        self.aliases.entry(name).or_default().push(alias);
    }

    pub fn add_using_namespace(&mut self, namespace: SymbolId) {
        if !self.using_namespaces.contains(&namespace) {
            self.using_namespaces.push(namespace);
        }
    }

    pub fn add_using_static(&mut self, ty: SymbolId) {
        if !self.using_statics.contains(&ty) {
            self.using_statics.push(ty);
        }
    }

    pub fn aliases(&self, name: Name) -> &[SymbolId] {
        self.aliases.get(&name).map_or(&[], |found| found.as_slice())
    }

    pub fn all_aliases(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.aliases.values().flatten().copied()
    }

    pub fn using_namespaces(&self) -> &[SymbolId] {
        &self.using_namespaces
    }

    pub fn using_statics(&self) -> &[SymbolId] {
        &self.using_statics
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty() && self.using_namespaces.is_empty() && self.using_statics.is_empty()
    }
}

/// A visible range variable and how the rewritten query reaches it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeVariable {
    pub symbol: SymbolId,
    /// Member accesses from the lambda parameter to the variable, outermost
    /// transparent identifier first and the variable's own name last
    pub path: SmallVec<[Name; 2]>,
}

/// Range variables visible at one point of a query expression.
///
/// Every variable added to a non-empty map wraps the existing ones in a new
/// transparent identifier, mirroring how the query rewrite nests anonymous
/// tuples.
#[derive(Debug, Clone, Default)]
pub struct RangeVariableMap {
    variables: NameMap<RangeVariable>,
    transparent_identifiers: u32,
}

impl RangeVariableMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `symbol` visible under `name`
    pub fn add(&mut self, interner: &Interner, name: Name, symbol: SymbolId) {
        if self.variables.is_empty() {
            self.variables.insert(
                name,
                RangeVariable {
                    symbol,
                    path: SmallVec::from_slice(&[name]),
                },
            );
            return;
        }

        let transparent = interner.intern(&format!(
            "<>h__TransparentIdentifier{}",
            self.transparent_identifiers
        ));
        self.transparent_identifiers += 1;
        for variable in self.variables.values_mut() {
            variable.path.insert(0, transparent);
        }
        self.variables.insert(
            name,
            RangeVariable {
                symbol,
                path: SmallVec::from_slice(&[transparent, name]),
            },
        );
    }

    /// Forget every variable, as a query continuation does
    pub fn reset(&mut self) {
        self.variables.clear();
    }

    pub fn get(&self, name: Name) -> Option<&RangeVariable> {
        self.variables.get(&name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Name, &RangeVariable)> + '_ {
        self.variables.iter().map(|(&name, variable)| (name, variable))
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}
