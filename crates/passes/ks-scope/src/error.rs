//! Diagnostics produced by lookup and declaration checks
//!
//! Note: the fields of these enums are consumed by miette's
//! `#[derive(Diagnostic)]` and the `thiserror` messages.

use crate::context::ScopeContext;
use crate::options::LookupOptions;
use crate::scope::Scope;
use ks_intern::Name;
use ks_span::FileSpan;
use ks_symbols::SymbolId;
use miette::Diagnostic;
use std::mem;
use thiserror::Error;

/// Why a candidate symbol was not viable.
///
/// Attached to a lookup result only when the lookup ran with diagnostics on.
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum LookupDiagnostic {
    /// Symbol exists but is not accessible from the lookup site
    #[error("member is inaccessible due to its protection level")]
    #[diagnostic(code(scope::bad_access))]
    BadAccess {
        /// Inaccessible symbol
        symbol: SymbolId,
    },

    /// Protected instance member accessed through a receiver of the wrong type
    #[error("cannot access protected member through this qualifier")]
    #[diagnostic(code(scope::bad_protected_access))]
    BadProtectedAccess {
        /// Inaccessible symbol
        symbol: SymbolId,
    },

    /// Generic symbol used with the wrong number of type arguments
    #[error("using the generic symbol requires {expected} type arguments")]
    #[diagnostic(code(scope::bad_arity))]
    BadArity {
        /// Generic symbol
        symbol: SymbolId,
        /// Declared arity
        expected: u32,
    },

    /// Non-generic type or method used with type arguments
    #[error("the non-generic symbol cannot be used with type arguments")]
    #[diagnostic(code(scope::has_no_type_vars))]
    HasNoTypeVars {
        /// Non-generic symbol
        symbol: SymbolId,
    },

    /// Type arguments on a symbol that can never take them
    #[error("symbol cannot be used with type arguments")]
    #[diagnostic(code(scope::type_args_not_allowed))]
    TypeArgsNotAllowed {
        /// Referenced symbol
        symbol: SymbolId,
    },

    /// Accessor or operator referenced by its reserved name
    #[error("operator or accessor cannot be referenced directly")]
    #[diagnostic(code(scope::special_method))]
    SpecialMethod {
        /// Special symbol
        symbol: SymbolId,
    },

    /// Static context needs an instance member
    #[error("an object reference is required for the non-static member")]
    #[diagnostic(code(scope::object_required))]
    ObjectRequired {
        /// Static symbol
        symbol: SymbolId,
    },

    /// Instance member found where a static one is required
    #[error("static member cannot be accessed with an instance reference")]
    #[diagnostic(code(scope::object_prohibited))]
    ObjectProhibited {
        /// Instance symbol
        symbol: SymbolId,
    },

    /// Name found, but it is not a label
    #[error("no such label within the scope of the goto statement")]
    #[diagnostic(code(scope::label_not_found))]
    LabelNotFound {
        /// Name that was looked up
        name: Name,
    },

    /// Member found where an invocable member is required
    #[error("non-invocable member cannot be used like a method")]
    #[diagnostic(code(scope::not_invocable))]
    NotInvocable {
        /// Member
        symbol: SymbolId,
    },

    /// Namespace used where something else is required
    #[error("namespace is used like a variable")]
    #[diagnostic(code(scope::bad_symbol_kind))]
    BadSymbolKind {
        /// Namespace symbol
        symbol: SymbolId,
    },

    /// Symbol used where a type or namespace is required
    #[error("symbol is not a type or namespace")]
    #[diagnostic(code(scope::not_a_type_or_namespace))]
    NotATypeOrNamespace {
        /// Referenced symbol
        symbol: SymbolId,
    },

    /// Type used as an attribute without deriving from the attribute base
    #[error("type is not an attribute class")]
    #[diagnostic(code(scope::not_an_attribute_class))]
    NotAnAttributeClass {
        /// Referenced type
        symbol: SymbolId,
    },

    /// Abstract class used as an attribute
    #[error("cannot apply an abstract attribute class")]
    #[diagnostic(code(scope::abstract_attribute_class))]
    AbstractAttributeClass {
        /// Referenced type
        symbol: SymbolId,
    },

    /// Generic type used as an attribute
    #[error("attribute class cannot be generic")]
    #[diagnostic(code(scope::generic_attribute))]
    AttributeCantBeGeneric {
        /// Referenced type
        symbol: SymbolId,
    },

    /// Attribute name matches both `Name` and `NameAttribute`
    #[error("attribute name is ambiguous between two attribute classes")]
    #[diagnostic(
        code(scope::ambiguous_attribute),
        help("use a verbatim identifier or the full name with the `Attribute` suffix")
    )]
    AmbiguousAttribute {
        /// Attribute class without suffix
        first: SymbolId,
        /// Attribute class with suffix
        second: SymbolId,
    },

    /// A namespace member and a using alias share a name
    #[error("namespace contains a definition conflicting with an alias")]
    #[diagnostic(code(scope::alias_conflicts_with_member))]
    AliasConflictsWithMember {
        /// Using alias
        alias: SymbolId,
        /// Namespace member
        member: SymbolId,
    },
}

impl LookupDiagnostic {
    /// The message with symbol and label names spelled out
    #[must_use]
    pub fn render(&self, ctx: ScopeContext<'_>) -> String {
        let named = |symbol: SymbolId| ctx.interner.resolve(&ctx.symbols.name(symbol));
        match *self {
            Self::BadAccess { symbol } => {
                format!("`{}` is inaccessible due to its protection level", named(symbol))
            }
            Self::BadProtectedAccess { symbol } => format!(
                "cannot access protected member `{}` through this qualifier",
                named(symbol)
            ),
            Self::BadArity { symbol, expected } => format!(
                "using the generic `{}` requires {expected} type arguments",
                named(symbol)
            ),
            Self::HasNoTypeVars { symbol } => format!(
                "the non-generic `{}` cannot be used with type arguments",
                named(symbol)
            ),
            Self::TypeArgsNotAllowed { symbol } => {
                format!("`{}` cannot be used with type arguments", named(symbol))
            }
            Self::SpecialMethod { symbol } => {
                format!("`{}` cannot be referenced directly", named(symbol))
            }
            Self::ObjectRequired { symbol } => {
                format!("an object reference is required for `{}`", named(symbol))
            }
            Self::ObjectProhibited { symbol } => format!(
                "`{}` cannot be accessed with an instance reference",
                named(symbol)
            ),
            Self::LabelNotFound { name } => format!(
                "no such label `{}` within the scope of the goto statement",
                ctx.interner.resolve(&name)
            ),
            Self::NotInvocable { symbol } => format!(
                "non-invocable member `{}` cannot be used like a method",
                named(symbol)
            ),
            Self::BadSymbolKind { symbol } => {
                format!("`{}` is a namespace but is used like a variable", named(symbol))
            }
            Self::NotATypeOrNamespace { symbol } => {
                format!("`{}` is not a type or namespace", named(symbol))
            }
            Self::NotAnAttributeClass { symbol } => {
                format!("`{}` is not an attribute class", named(symbol))
            }
            Self::AbstractAttributeClass { symbol } => {
                format!("cannot apply attribute class `{}` because it is abstract", named(symbol))
            }
            Self::AttributeCantBeGeneric { symbol } => {
                format!("attribute class `{}` cannot be generic", named(symbol))
            }
            Self::AmbiguousAttribute { first, second } => format!(
                "`{}` is ambiguous between `{}` and `{}`",
                named(first),
                named(first),
                named(second)
            ),
            Self::AliasConflictsWithMember { alias, .. } => format!(
                "namespace contains a definition conflicting with alias `{}`",
                named(alias)
            ),
        }
    }
}

/// A located diagnostic reported through a [`DiagnosticSink`]
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum ScopeDiagnostic {
    /// Two locals of the same name in one local scope
    #[error("a local variable of this name is already defined in this scope")]
    #[diagnostic(code(scope::local_duplicate))]
    LocalDuplicate {
        /// Duplicated name
        name: Name,
        /// Earlier declaration
        existing: SymbolId,
        /// New declaration
        at: FileSpan,
    },

    /// A local hides a local or parameter of an enclosing scope of the same member
    #[error("a local or parameter cannot be declared in this scope because its name is used in an enclosing local scope")]
    #[diagnostic(code(scope::local_illegally_overrides))]
    LocalIllegallyOverrides {
        /// Hidden name
        name: Name,
        /// Enclosing declaration
        existing: SymbolId,
        /// New declaration
        at: FileSpan,
    },

    /// A local or parameter has the name of a type parameter
    #[error("a parameter, local variable or local function cannot have the same name as a method type parameter")]
    #[diagnostic(code(scope::local_same_name_as_type_parameter))]
    LocalSameNameAsTypeParameter {
        /// Shared name
        name: Name,
        /// Type parameter
        type_parameter: SymbolId,
        /// New declaration
        at: FileSpan,
    },

    /// Two range variables of one query share a name
    #[error("the range variable has already been declared")]
    #[diagnostic(code(scope::duplicate_range_variable))]
    DuplicateRangeVariable {
        /// Duplicated name
        name: Name,
        /// New declaration
        at: FileSpan,
    },

    /// A range variable has the name of an enclosing declaration
    #[error("the range variable conflicts with a previous declaration")]
    #[diagnostic(code(scope::range_variable_conflict))]
    RangeVariableConflict {
        /// Shared name
        name: Name,
        /// Earlier declaration
        existing: SymbolId,
        /// New declaration
        at: FileSpan,
    },

    /// Two labels of one scope share a name
    #[error("the label is a duplicate")]
    #[diagnostic(code(scope::duplicate_label))]
    DuplicateLabel {
        /// Duplicated label
        name: Name,
        /// New declaration
        at: FileSpan,
    },

    /// A label hides a label of an enclosing scope
    #[error("the label shadows another label by the same name in a contained scope")]
    #[diagnostic(code(scope::label_shadowed))]
    LabelShadowed {
        /// Shadowing label
        name: Name,
        /// New declaration
        at: FileSpan,
    },

    /// Two aliases of one import list share a name
    #[error("the using alias appeared previously in this namespace")]
    #[diagnostic(code(scope::duplicate_alias))]
    DuplicateAlias {
        /// Duplicated alias
        name: Name,
        /// Second directive
        at: FileSpan,
    },

    /// An alias and a member of the enclosing namespace share a name
    #[error("namespace contains a definition conflicting with an alias")]
    #[diagnostic(code(scope::alias_conflicts_with_member))]
    AliasConflictsWithMember {
        /// Alias name
        name: Name,
        /// Conflicting member
        member: SymbolId,
        /// Alias directive
        at: FileSpan,
    },

    /// A lookup failure surfaced at a use site
    #[error("{info}")]
    #[diagnostic(code(scope::lookup))]
    Lookup {
        /// Why lookup failed
        #[diagnostic_source]
        info: LookupDiagnostic,
        /// Use site
        at: FileSpan,
    },
}

impl ScopeDiagnostic {
    /// Returns the primary source location for this diagnostic.
    #[must_use]
    pub fn span(&self) -> FileSpan {
        match self {
            Self::LocalDuplicate { at, .. }
            | Self::LocalIllegallyOverrides { at, .. }
            | Self::LocalSameNameAsTypeParameter { at, .. }
            | Self::DuplicateRangeVariable { at, .. }
            | Self::RangeVariableConflict { at, .. }
            | Self::DuplicateLabel { at, .. }
            | Self::LabelShadowed { at, .. }
            | Self::DuplicateAlias { at, .. }
            | Self::AliasConflictsWithMember { at, .. }
            | Self::Lookup { at, .. } => *at,
        }
    }

    /// The message with names spelled out
    #[must_use]
    pub fn render(&self, ctx: ScopeContext<'_>) -> String {
        let name = match *self {
            Self::Lookup { ref info, .. } => return info.render(ctx),
            Self::LocalDuplicate { name, .. }
            | Self::LocalIllegallyOverrides { name, .. }
            | Self::LocalSameNameAsTypeParameter { name, .. }
            | Self::DuplicateRangeVariable { name, .. }
            | Self::RangeVariableConflict { name, .. }
            | Self::DuplicateLabel { name, .. }
            | Self::LabelShadowed { name, .. }
            | Self::DuplicateAlias { name, .. }
            | Self::AliasConflictsWithMember { name, .. } => name,
        };
        format!("`{}`: {self}", ctx.interner.resolve(&name))
    }

    /// Stable diagnostic code, such as `scope::local_duplicate`
    #[must_use]
    pub fn code_str(&self) -> String {
        self.code().map(|code| code.to_string()).unwrap_or_default()
    }
}

/// Receives diagnostics as they are produced
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: ScopeDiagnostic);
}

impl DiagnosticSink for Vec<ScopeDiagnostic> {
    fn report(&mut self, diagnostic: ScopeDiagnostic) {
        self.push(diagnostic);
    }
}

/// Accumulating sink
#[derive(Debug, Clone, Default)]
pub struct DiagnosticBag {
    diagnostics: Vec<ScopeDiagnostic>,
}

impl DiagnosticBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScopeDiagnostic> + '_ {
        self.diagnostics.iter()
    }

    /// Codes of all diagnostics, in report order
    pub fn codes(&self) -> Vec<String> {
        self.diagnostics.iter().map(ScopeDiagnostic::code_str).collect()
    }

    pub fn into_vec(self) -> Vec<ScopeDiagnostic> {
        self.diagnostics
    }
}

impl DiagnosticSink for DiagnosticBag {
    fn report(&mut self, diagnostic: ScopeDiagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

/// Names visible from `scope` that are close to `name`, for "did you mean" help.
///
/// At most three names within an edit distance of three are returned, closest first.
pub fn suggest_names(ctx: ScopeContext<'_>, scope: &Scope, name: Name) -> Vec<Name> {
    let target = ctx.interner.resolve(&name);
    let visible = scope.enumerate_visible(ctx, LookupOptions::empty());
    let mut suggestions: Vec<(Name, usize)> = visible
        .names()
        .filter(|&candidate| candidate != name)
        .map(|candidate| {
            let distance = levenshtein_distance(target, ctx.interner.resolve(&candidate));
            (candidate, distance)
        })
        .filter(|(_, distance)| *distance <= 3)
        .collect();

    suggestions.sort_by_key(|(_, distance)| *distance);
    suggestions
        .into_iter()
        .take(3)
        .map(|(candidate, _)| candidate)
        .collect()
}

/// Compute Levenshtein distance between two strings
fn levenshtein_distance(source: &str, target: &str) -> usize {
    let source: Vec<char> = source.chars().collect();
    let target: Vec<char> = target.chars().collect();

    if source.is_empty() {
        return target.len();
    }
    if target.is_empty() {
        return source.len();
    }

    let mut previous: Vec<usize> = (0..=target.len()).collect();
    let mut current = vec![0; target.len() + 1];

    for (idx, source_char) in source.iter().enumerate() {
        current[0] = idx + 1;
        for (jdx, target_char) in target.iter().enumerate() {
            let cost = usize::from(source_char != target_char);
            current[jdx + 1] = (previous[jdx + 1] + 1)
                .min(current[jdx] + 1)
                .min(previous[jdx] + cost);
        }
        mem::swap(&mut previous, &mut current);
    }

    previous[target.len()]
}
