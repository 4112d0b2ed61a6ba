//! Whether a candidate symbol is usable for a lookup

use crate::context::ScopeContext;
use crate::error::LookupDiagnostic;
use crate::options::{BinderFlags, LookupOptions};
use crate::result::{LookupResultKind, SingleLookupResult};
use crate::scope::{Scope, ScopeKind};
use ks_symbols::{AccessContext, SymbolId, SymbolKind};

/// Everything about the lookup site that viability depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupRequest {
    /// Number of type arguments written at the use site
    pub arity: u32,
    pub options: LookupOptions,
    pub access: AccessContext,
    /// Receiver type for protected access checks
    pub through_type: Option<SymbolId>,
    /// Documentation references see every member
    pub in_cref: bool,
    /// Record why candidates fail
    pub diagnose: bool,
}

impl LookupRequest {
    /// A request issued from `requester`, the innermost scope of the lookup
    pub fn new(
        ctx: ScopeContext<'_>,
        requester: &Scope,
        arity: u32,
        options: LookupOptions,
        diagnose: bool,
    ) -> Self {
        Self {
            arity,
            options,
            access: ctx.access_from(enclosing_type(requester)),
            through_type: None,
            in_cref: requester.flags().contains(BinderFlags::IN_CREF),
            diagnose,
        }
    }

    #[must_use]
    pub fn with_diagnose(mut self, diagnose: bool) -> Self {
        self.diagnose = diagnose;
        self
    }

    #[must_use]
    pub fn with_through_type(mut self, through_type: Option<SymbolId>) -> Self {
        self.through_type = through_type;
        self
    }
}

/// Innermost type whose members are in scope
fn enclosing_type(scope: &Scope) -> Option<SymbolId> {
    scope.chain().find_map(|link| match *link.kind() {
        ScopeKind::Type { ty, .. } => Some(ty),
        _ => None,
    })
}

/// Check one candidate.
///
/// Checks run in a fixed order and the first failure decides the kind:
/// arity, referencability, type-or-namespace, invocability, accessibility,
/// instance/static, namespace, label. Checks apply to the alias target while
/// the result keeps the alias.
pub fn check_viability(
    ctx: ScopeContext<'_>,
    symbol: SymbolId,
    request: &LookupRequest,
) -> SingleLookupResult {
    let symbols = ctx.symbols;
    let unwrapped_id = symbols.unwrap_alias(symbol);
    let unwrapped = symbols.symbol(unwrapped_id);
    let options = request.options;
    let diagnose = |diagnostic: LookupDiagnostic| request.diagnose.then_some(diagnostic);
    let generic = symbols.symbol(symbol).is_generic();

    if let Some(diagnostic) = wrong_arity(ctx, symbol, request) {
        return SingleLookupResult::new(LookupResultKind::WrongArity, symbol, diagnostic)
            .with_generic(generic);
    }
    if !request.in_cref && unwrapped.special_name {
        return SingleLookupResult::new(
            LookupResultKind::NotReferencable,
            symbol,
            diagnose(LookupDiagnostic::SpecialMethod {
                symbol: unwrapped_id,
            }),
        );
    }
    if options.contains(LookupOptions::NAMESPACES_OR_TYPES_ONLY)
        && !unwrapped.kind.is_namespace_or_type()
    {
        return SingleLookupResult::new(
            LookupResultKind::NotATypeOrNamespace,
            symbol,
            diagnose(LookupDiagnostic::NotATypeOrNamespace {
                symbol: unwrapped_id,
            }),
        );
    }
    if options.contains(LookupOptions::MUST_BE_INVOCABLE_IF_MEMBER)
        && is_non_invocable_member(ctx, unwrapped_id)
    {
        return SingleLookupResult::new(
            LookupResultKind::NotInvocable,
            symbol,
            diagnose(LookupDiagnostic::NotInvocable {
                symbol: unwrapped_id,
            }),
        );
    }
    if !request.in_cref {
        let through = refine_through_type(options, request.through_type);
        if !symbols.is_accessible(unwrapped_id, request.access, through) {
            let diagnostic = if through.is_some()
                && symbols.is_accessible(unwrapped_id, request.access, None)
            {
                LookupDiagnostic::BadProtectedAccess {
                    symbol: unwrapped_id,
                }
            } else {
                LookupDiagnostic::BadAccess {
                    symbol: unwrapped_id,
                }
            };
            return SingleLookupResult::new(
                LookupResultKind::Inaccessible,
                symbol,
                diagnose(diagnostic),
            );
        }
    }
    if options.contains(LookupOptions::MUST_BE_INSTANCE) && !unwrapped.is_instance_member() {
        return SingleLookupResult::new(
            LookupResultKind::StaticInstanceMismatch,
            symbol,
            diagnose(LookupDiagnostic::ObjectRequired {
                symbol: unwrapped_id,
            }),
        );
    }
    if options.contains(LookupOptions::MUST_NOT_BE_INSTANCE) && unwrapped.is_instance_member() {
        return SingleLookupResult::new(
            LookupResultKind::StaticInstanceMismatch,
            symbol,
            diagnose(LookupDiagnostic::ObjectProhibited {
                symbol: unwrapped_id,
            }),
        );
    }
    if options.contains(LookupOptions::MUST_NOT_BE_NAMESPACE) && unwrapped.kind.is_namespace() {
        return SingleLookupResult::new(
            LookupResultKind::NotATypeOrNamespace,
            symbol,
            diagnose(LookupDiagnostic::BadSymbolKind {
                symbol: unwrapped_id,
            }),
        );
    }
    if options.contains(LookupOptions::LABELS_ONLY) && unwrapped.kind != SymbolKind::Label {
        return SingleLookupResult::new(
            LookupResultKind::NotLabel,
            symbol,
            diagnose(LookupDiagnostic::LabelNotFound {
                name: unwrapped.name,
            }),
        );
    }
    SingleLookupResult::good(symbol)
}

/// `Some` when the arity written at the use site does not fit `symbol`; the
/// inner value is the diagnostic when diagnosing.
fn wrong_arity(
    ctx: ScopeContext<'_>,
    symbol: SymbolId,
    request: &LookupRequest,
) -> Option<Option<LookupDiagnostic>> {
    let declared = ctx.symbols.symbol(symbol);
    let arity = request.arity;
    let options = request.options;
    let diagnostic = |diagnostic: LookupDiagnostic| request.diagnose.then_some(diagnostic);
    let arity_diagnostic = || {
        if declared.arity == 0 {
            diagnostic(LookupDiagnostic::HasNoTypeVars { symbol })
        } else {
            diagnostic(LookupDiagnostic::BadArity {
                symbol,
                expected: declared.arity,
            })
        }
    };

    match declared.kind {
        SymbolKind::NamedType(_) => {
            let checked =
                arity != 0 || !options.contains(LookupOptions::ALL_NAMED_TYPES_ON_ARITY_ZERO);
            let mismatch = declared.arity != arity
                || (options.is_attribute_type_lookup() && arity != 0);
            (checked && mismatch).then(arity_diagnostic)
        }
        SymbolKind::Method(_) | SymbolKind::LocalFunction => {
            let checked = arity != 0 || !options.contains(LookupOptions::ALL_METHODS_ON_ARITY_ZERO);
            (checked && declared.arity != arity).then(arity_diagnostic)
        }
        _ => (arity != 0).then(|| diagnostic(LookupDiagnostic::TypeArgsNotAllowed { symbol })),
    }
}

/// Members that cannot be invoked; locals and parameters are never members
fn is_non_invocable_member(ctx: ScopeContext<'_>, symbol: SymbolId) -> bool {
    let declared = ctx.symbols.symbol(symbol);
    match declared.kind {
        SymbolKind::Method(_) | SymbolKind::Field | SymbolKind::Property | SymbolKind::Event => {
            !declared.is_invocable()
        }
        _ => false,
    }
}

fn refine_through_type(options: LookupOptions, through_type: Option<SymbolId>) -> Option<SymbolId> {
    if options.contains(LookupOptions::USE_BASE_REFERENCE_ACCESSIBILITY) {
        None
    } else {
        through_type
    }
}

/// Enumeration counterpart of [`check_viability`]: whether `symbol`, already
/// unwrapped from any alias, belongs in a "names in scope" listing.
///
/// Arity and referencability are not checked; listings show every name.
pub fn can_add_lookup_symbol_info(
    ctx: ScopeContext<'_>,
    symbol: SymbolId,
    request: &LookupRequest,
) -> bool {
    let symbols = ctx.symbols;
    let declared = symbols.symbol(symbol);
    let options = request.options;

    if options.contains(LookupOptions::NAMESPACES_OR_TYPES_ONLY)
        && !declared.kind.is_namespace_or_type()
    {
        return false;
    }
    if options.contains(LookupOptions::MUST_BE_INVOCABLE_IF_MEMBER)
        && is_non_invocable_member(ctx, symbol)
    {
        return false;
    }
    if !request.in_cref
        && !symbols.is_accessible(
            symbol,
            request.access,
            refine_through_type(options, request.through_type),
        )
    {
        return false;
    }
    if options.contains(LookupOptions::MUST_BE_INSTANCE) && !declared.is_instance_member() {
        return false;
    }
    if options.contains(LookupOptions::MUST_NOT_BE_INSTANCE) && declared.is_instance_member() {
        return false;
    }
    if options.contains(LookupOptions::MUST_NOT_BE_NAMESPACE) && declared.kind.is_namespace() {
        return false;
    }
    if options.contains(LookupOptions::LABELS_ONLY) && declared.kind != SymbolKind::Label {
        return false;
    }
    true
}

/// Whether `symbol` is a non-generic class deriving from the attribute base.
///
/// Deciding between `Name` and `NameAttribute` only looks at this; the
/// chosen spelling is then checked with [`check_attribute_type`].
pub(crate) fn is_attribute_class(ctx: ScopeContext<'_>, symbol: SymbolId) -> bool {
    let declared = ctx.symbols.symbol(symbol);
    matches!(declared.kind, SymbolKind::NamedType(_))
        && !declared.is_generic()
        && ctx.symbols.is_attribute_type(symbol)
}

/// Whether a type found by attribute lookup may be applied as an attribute.
///
/// `Err` carries the kind-specific diagnostic when diagnosing.
pub(crate) fn check_attribute_type(
    ctx: ScopeContext<'_>,
    symbol: SymbolId,
    diagnose: bool,
) -> Result<(), Option<LookupDiagnostic>> {
    let declared = ctx.symbols.symbol(symbol);
    if matches!(declared.kind, SymbolKind::NamedType(_)) {
        if declared.is_generic() {
            return Err(diagnose.then_some(LookupDiagnostic::AttributeCantBeGeneric { symbol }));
        }
        if ctx.symbols.is_attribute_type(symbol) {
            if declared.is_abstract {
                return Err(diagnose.then_some(LookupDiagnostic::AbstractAttributeClass { symbol }));
            }
            return Ok(());
        }
    }
    Err(diagnose.then_some(LookupDiagnostic::NotAnAttributeClass { symbol }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScopeConfig;
    use ks_intern::Interner;
    use ks_span::FileId;
    use ks_symbols::{Accessibility, MethodKind, Program, ProgramBuilder, TypeKind};
    use ks_syntax::{Role, SyntaxKind};

    struct Fixture {
        interner: Interner,
        program: Program,
        config: ScopeConfig,
        derived: SymbolId,
        other: SymbolId,
        shared: SymbolId,
        hidden: SymbolId,
        counter: SymbolId,
        value: SymbolId,
        describe: SymbolId,
        convert: SymbolId,
        operator: SymbolId,
        label: SymbolId,
    }

    impl Fixture {
        fn ctx(&self) -> ScopeContext<'_> {
            ScopeContext::new(
                &self.program.tree,
                &self.program.symbols,
                &self.interner,
                &self.config,
            )
        }

        fn check(
            &self,
            symbol: SymbolId,
            options: LookupOptions,
            update: impl FnOnce(&mut LookupRequest),
        ) -> SingleLookupResult {
            let ctx = self.ctx();
            let mut request = LookupRequest {
                arity: 0,
                options,
                access: ctx.access_from(None),
                through_type: None,
                in_cref: false,
                diagnose: true,
            };
            update(&mut request);
            check_viability(ctx, symbol, &request)
        }
    }

    /// `Base` with one member per failure, and `Derived`, `Other` deriving from it
    fn fixture() -> Fixture {
        let interner = Interner::new();
        let mut builder = ProgramBuilder::new(interner.clone(), FileId(0));
        let (_, base) = builder.open_type("Base", TypeKind::Class);
        let shared = builder.field("shared");
        let hidden = builder.field("hidden");
        let counter = builder.field("counter");
        builder.make_static(counter);
        let value = builder.field("value");
        let (_, describe) = builder.open_method("Describe", MethodKind::Ordinary);
        builder.open(SyntaxKind::Block, Role::Body);
        let label = builder.label("done");
        builder.close().unwrap();
        builder.close().unwrap();
        let (_, convert) = builder.open_method("Convert", MethodKind::Ordinary);
        builder.type_parameter("T");
        builder.close().unwrap();
        let (_, operator) = builder.open_method("op_Addition", MethodKind::Operator);
        builder.close().unwrap();
        builder.close().unwrap();
        let (_, derived) = builder.open_type("Derived", TypeKind::Class);
        builder.close().unwrap();
        let (_, other) = builder.open_type("Other", TypeKind::Class);
        builder.close().unwrap();

        let symbols = builder.symbols_mut();
        symbols.symbol_mut(shared).accessibility = Accessibility::Protected;
        symbols.symbol_mut(hidden).accessibility = Accessibility::Private;
        symbols.symbol_mut(convert).accessibility = Accessibility::Private;
        symbols.symbol_mut(derived).base_type = Some(base);
        symbols.symbol_mut(other).base_type = Some(base);

        Fixture {
            interner,
            program: builder.finish().unwrap(),
            config: ScopeConfig::default(),
            derived,
            other,
            shared,
            hidden,
            counter,
            value,
            describe,
            convert,
            operator,
            label,
        }
    }

    #[test]
    fn test_special_names_are_referencable_only_in_cref() {
        let fixture = fixture();
        let outside = fixture.check(fixture.operator, LookupOptions::empty(), |_| {});
        assert_eq!(outside.kind, LookupResultKind::NotReferencable);
        assert_eq!(
            outside.diagnostic,
            Some(LookupDiagnostic::SpecialMethod {
                symbol: fixture.operator
            })
        );

        let in_cref = fixture.check(fixture.operator, LookupOptions::empty(), |request| {
            request.in_cref = true;
        });
        assert!(in_cref.is_viable());
    }

    #[test]
    fn test_invocable_lookup_rejects_plain_fields() {
        let fixture = fixture();
        let options = LookupOptions::MUST_BE_INVOCABLE_IF_MEMBER;
        let field = fixture.check(fixture.value, options, |_| {});
        assert_eq!(field.kind, LookupResultKind::NotInvocable);
        assert_eq!(
            field.diagnostic,
            Some(LookupDiagnostic::NotInvocable {
                symbol: fixture.value
            })
        );
        assert!(fixture.check(fixture.describe, options, |_| {}).is_viable());
    }

    #[test]
    fn test_static_instance_mismatch_both_ways() {
        let fixture = fixture();
        let needs_instance = fixture.check(fixture.counter, LookupOptions::MUST_BE_INSTANCE, |_| {});
        assert_eq!(needs_instance.kind, LookupResultKind::StaticInstanceMismatch);
        assert_eq!(
            needs_instance.diagnostic,
            Some(LookupDiagnostic::ObjectRequired {
                symbol: fixture.counter
            })
        );

        let needs_static = fixture.check(fixture.value, LookupOptions::MUST_NOT_BE_INSTANCE, |_| {});
        assert_eq!(needs_static.kind, LookupResultKind::StaticInstanceMismatch);
        assert_eq!(
            needs_static.diagnostic,
            Some(LookupDiagnostic::ObjectProhibited {
                symbol: fixture.value
            })
        );

        assert!(fixture.check(fixture.value, LookupOptions::MUST_BE_INSTANCE, |_| {}).is_viable());
        assert!(fixture.check(fixture.counter, LookupOptions::MUST_NOT_BE_INSTANCE, |_| {}).is_viable());
    }

    #[test]
    fn test_label_lookup_rejects_other_symbols() {
        let fixture = fixture();
        let field = fixture.check(fixture.value, LookupOptions::LABELS_ONLY, |_| {});
        assert_eq!(field.kind, LookupResultKind::NotLabel);
        assert_eq!(
            field.diagnostic,
            Some(LookupDiagnostic::LabelNotFound {
                name: fixture.interner.intern("value")
            })
        );
        assert!(fixture.check(fixture.label, LookupOptions::LABELS_ONLY, |_| {}).is_viable());
    }

    #[test]
    fn test_protected_access_depends_on_the_receiver() {
        let fixture = fixture();
        let within_derived = |request: &mut LookupRequest| {
            request.access = fixture.ctx().access_from(Some(fixture.derived));
        };

        let through_other = fixture.check(fixture.shared, LookupOptions::empty(), |request| {
            within_derived(request);
            request.through_type = Some(fixture.other);
        });
        assert_eq!(through_other.kind, LookupResultKind::Inaccessible);
        assert_eq!(
            through_other.diagnostic,
            Some(LookupDiagnostic::BadProtectedAccess {
                symbol: fixture.shared
            })
        );

        let through_derived = fixture.check(fixture.shared, LookupOptions::empty(), |request| {
            within_derived(request);
            request.through_type = Some(fixture.derived);
        });
        assert!(through_derived.is_viable());

        let base_reference = fixture.check(
            fixture.shared,
            LookupOptions::USE_BASE_REFERENCE_ACCESSIBILITY,
            |request| {
                within_derived(request);
                request.through_type = Some(fixture.other);
            },
        );
        assert!(base_reference.is_viable());

        let private = fixture.check(fixture.hidden, LookupOptions::empty(), |request| {
            within_derived(request);
            request.through_type = Some(fixture.other);
        });
        assert_eq!(private.kind, LookupResultKind::Inaccessible);
        assert_eq!(
            private.diagnostic,
            Some(LookupDiagnostic::BadAccess {
                symbol: fixture.hidden
            })
        );
    }

    #[test]
    fn test_arity_is_checked_before_accessibility() {
        let fixture = fixture();
        let without_arguments = fixture.check(fixture.convert, LookupOptions::empty(), |_| {});
        assert_eq!(without_arguments.kind, LookupResultKind::WrongArity);
        assert_eq!(
            without_arguments.diagnostic,
            Some(LookupDiagnostic::BadArity {
                symbol: fixture.convert,
                expected: 1
            })
        );

        let with_arguments = fixture.check(fixture.convert, LookupOptions::empty(), |request| {
            request.arity = 1;
        });
        assert_eq!(with_arguments.kind, LookupResultKind::Inaccessible);
    }

    #[test]
    fn test_silent_checks_carry_no_diagnostic() {
        let fixture = fixture();
        let silent = fixture.check(fixture.hidden, LookupOptions::empty(), |request| {
            request.diagnose = false;
        });
        assert_eq!(silent.kind, LookupResultKind::Inaccessible);
        assert_eq!(silent.diagnostic, None);
    }
}
