//! Ranked lookup results and their merge algebra

use crate::error::LookupDiagnostic;
use ks_symbols::SymbolId;
use smallvec::SmallVec;

/// How good a lookup outcome is, from worst to best.
///
/// The declaration order is the rank order; merges compare kinds with `>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum LookupResultKind {
    #[default]
    Empty,
    NotATypeOrNamespace,
    NotAnAttributeType,
    WrongArity,
    NotCreatable,
    Inaccessible,
    NotReferencable,
    NotAValue,
    NotAVariable,
    NotInvocable,
    NotLabel,
    StaticInstanceMismatch,
    OverloadResolutionFailure,
    Ambiguous,
    MemberGroup,
    Viable,
}

/// Outcome of checking one candidate symbol
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SingleLookupResult {
    pub kind: LookupResultKind,
    pub symbol: Option<SymbolId>,
    pub diagnostic: Option<LookupDiagnostic>,
    /// The candidate declares type parameters
    pub generic: bool,
}

impl SingleLookupResult {
    pub fn new(
        kind: LookupResultKind,
        symbol: SymbolId,
        diagnostic: Option<LookupDiagnostic>,
    ) -> Self {
        Self {
            kind,
            symbol: Some(symbol),
            diagnostic,
            generic: false,
        }
    }

    pub fn good(symbol: SymbolId) -> Self {
        Self::new(LookupResultKind::Viable, symbol, None)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_generic(mut self, generic: bool) -> Self {
        self.generic = generic;
        self
    }

    pub fn is_viable(&self) -> bool {
        self.kind == LookupResultKind::Viable
    }
}

/// Accumulator of lookup candidates.
///
/// A result holds the best kind seen so far, the symbols that achieved it and,
/// for non-viable results looked up with diagnostics on, why they failed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LookupResult {
    kind: LookupResultKind,
    symbols: SmallVec<[SymbolId; 2]>,
    diagnostic: Option<LookupDiagnostic>,
    generic: bool,
}

impl LookupResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// An ambiguous outcome between several symbols
    pub fn ambiguous(
        symbols: impl IntoIterator<Item = SymbolId>,
        diagnostic: Option<LookupDiagnostic>,
    ) -> Self {
        Self {
            kind: LookupResultKind::Ambiguous,
            symbols: symbols.into_iter().collect(),
            diagnostic,
            generic: false,
        }
    }

    pub fn kind(&self) -> LookupResultKind {
        self.kind
    }

    pub fn symbols(&self) -> &[SymbolId] {
        &self.symbols
    }

    pub fn diagnostic(&self) -> Option<&LookupDiagnostic> {
        self.diagnostic.as_ref()
    }

    /// Nothing was found and nothing was recorded
    pub fn is_clear(&self) -> bool {
        self.kind == LookupResultKind::Empty && self.symbols.is_empty() && self.diagnostic.is_none()
    }

    /// At least one viable symbol; lookup stops here
    pub fn is_multi_viable(&self) -> bool {
        self.kind == LookupResultKind::Viable
    }

    pub fn is_single_viable(&self) -> bool {
        self.kind == LookupResultKind::Viable && self.symbols.len() == 1
    }

    /// The only symbol, if there is exactly one
    pub fn single_symbol(&self) -> Option<SymbolId> {
        match self.symbols.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.kind = LookupResultKind::Empty;
        self.symbols.clear();
        self.diagnostic = None;
        self.generic = false;
    }

    pub fn set_from(&mut self, single: SingleLookupResult) {
        self.kind = single.kind;
        self.symbols.clear();
        self.symbols.extend(single.symbol);
        self.diagnostic = single.diagnostic;
        self.generic = single.generic;
    }

    pub fn set_from_result(&mut self, other: &LookupResult) {
        self.kind = other.kind;
        self.symbols.clone_from(&other.symbols);
        self.diagnostic.clone_from(&other.diagnostic);
        self.generic = other.generic;
    }

    /// Keep whichever of the two is strictly better; ties keep `self`
    pub fn merge_prioritized(&mut self, other: &LookupResult) {
        if other.kind > self.kind {
            self.set_from_result(other);
        }
    }

    pub fn merge_prioritized_single(&mut self, other: SingleLookupResult) {
        if other.kind > self.kind {
            self.set_from(other);
        }
    }

    /// Merge candidates of equal standing.
    ///
    /// A better kind replaces the accumulator. Equal viable results are
    /// unioned so ambiguity is kept. Between two wrong-arity results a generic
    /// candidate replaces a non-generic one. Any other tie keeps `self`, so the
    /// operation is not commutative.
    pub fn merge_equal(&mut self, other: &LookupResult) {
        if other.kind > self.kind {
            self.set_from_result(other);
        } else if other.kind == self.kind {
            match self.kind {
                LookupResultKind::Viable => {
                    for &symbol in &other.symbols {
                        if !self.symbols.contains(&symbol) {
                            self.symbols.push(symbol);
                        }
                    }
                }
                LookupResultKind::WrongArity if other.generic && !self.generic => {
                    self.set_from_result(other);
                }
                _ => {}
            }
        }
    }

    pub fn merge_equal_single(&mut self, other: SingleLookupResult) {
        if other.kind > self.kind {
            self.set_from(other);
        } else if other.kind == self.kind {
            match self.kind {
                LookupResultKind::Viable => {
                    if let Some(symbol) = other.symbol {
                        if !self.symbols.contains(&symbol) {
                            self.symbols.push(symbol);
                        }
                    }
                }
                LookupResultKind::WrongArity if other.generic && !self.generic => {
                    self.set_from(other);
                }
                _ => {}
            }
        }
    }
}

impl From<SingleLookupResult> for LookupResult {
    fn from(single: SingleLookupResult) -> Self {
        let mut result = Self::new();
        result.set_from(single);
        result
    }
}
