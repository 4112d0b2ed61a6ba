//! Range variables of a query clause

use crate::collector::LookupSymbolsInfo;
use crate::context::ScopeContext;
use crate::namespace::RangeVariableMap;
use crate::options::LookupOptions;
use crate::result::LookupResult;
use crate::viability::{can_add_lookup_symbol_info, check_viability, LookupRequest};
use ks_intern::Name;

fn considered(options: LookupOptions) -> bool {
    options.can_consider_locals() && !options.contains(LookupOptions::LABELS_ONLY)
}

pub(super) fn lookup(
    ctx: ScopeContext<'_>,
    variables: &RangeVariableMap,
    result: &mut LookupResult,
    name: Name,
    request: &LookupRequest,
) {
    if !considered(request.options) {
        return;
    }
    if let Some(variable) = variables.get(name) {
        result.merge_equal_single(check_viability(ctx, variable.symbol, request));
    }
}

pub(super) fn enumerate(
    ctx: ScopeContext<'_>,
    variables: &RangeVariableMap,
    info: &mut LookupSymbolsInfo,
    request: &LookupRequest,
) {
    if !considered(request.options) {
        return;
    }
    for (name, variable) in variables.iter() {
        if can_add_lookup_symbol_info(ctx, variable.symbol, request) {
            info.add(name, variable.symbol);
        }
    }
}
