//! Nodes whose declarations are locals, parameters, labels or type parameters

use crate::collector::LookupSymbolsInfo;
use crate::context::ScopeContext;
use crate::namespace::DeclaredNamespace;
use crate::options::LookupOptions;
use crate::result::LookupResult;
use crate::scope::ScopeKind;
use crate::viability::{can_add_lookup_symbol_info, check_viability, LookupRequest};
use ks_intern::Name;
use ks_symbols::SymbolId;

pub(super) fn lookup(
    ctx: ScopeContext<'_>,
    kind: &ScopeKind,
    declared: &DeclaredNamespace,
    result: &mut LookupResult,
    name: Name,
    request: &LookupRequest,
) {
    if !considered(kind, request.options) {
        return;
    }
    for &candidate in candidates(declared, name, request.options) {
        result.merge_equal_single(check_viability(ctx, candidate, request));
    }
}

pub(super) fn enumerate(
    ctx: ScopeContext<'_>,
    kind: &ScopeKind,
    declared: &DeclaredNamespace,
    info: &mut LookupSymbolsInfo,
    request: &LookupRequest,
) {
    if !considered(kind, request.options) {
        return;
    }
    let symbols: Box<dyn Iterator<Item = SymbolId> + '_> =
        if request.options.contains(LookupOptions::LABELS_ONLY) {
            Box::new(declared.all_labels())
        } else {
            Box::new(declared.all_values())
        };

    for symbol in symbols {
        let name = ctx.symbols.name(symbol);
        match kind {
            // Method type parameters hide class type parameters of the same name.
            ScopeKind::MethodTypeParameters { .. } => info.mask_type_parameter(name),
            ScopeKind::ClassTypeParameters { .. } if info.is_type_parameter_masked(name) => {
                continue;
            }
            _ => {}
        }
        if can_add_lookup_symbol_info(ctx, symbol, request) {
            info.add(name, symbol);
        }
    }
}

fn considered(kind: &ScopeKind, options: LookupOptions) -> bool {
    if !options.can_consider_locals() {
        return false;
    }
    if kind.is_type_parameter_scope() && !options.can_consider_types() {
        return false;
    }
    !(matches!(kind, ScopeKind::MethodTypeParameters { .. })
        && options.contains(LookupOptions::MUST_NOT_BE_METHOD_TYPE_PARAMETER))
}

fn candidates(declared: &DeclaredNamespace, name: Name, options: LookupOptions) -> &[SymbolId] {
    if options.contains(LookupOptions::LABELS_ONLY) {
        declared.labels(name)
    } else {
        declared.values(name)
    }
}
