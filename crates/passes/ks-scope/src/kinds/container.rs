//! Members of namespaces and types

use crate::collector::LookupSymbolsInfo;
use crate::context::ScopeContext;
use crate::error::LookupDiagnostic;
use crate::options::LookupOptions;
use crate::result::{LookupResult, SingleLookupResult};
use crate::scope::{Scope, ScopeKind};
use crate::viability::{can_add_lookup_symbol_info, check_viability, LookupRequest};
use ks_intern::Name;
use ks_symbols::{SymbolId, SymbolKind, TypeKind};

pub(super) fn lookup_in_namespace(
    ctx: ScopeContext<'_>,
    scope: &Scope,
    namespace: SymbolId,
    result: &mut LookupResult,
    name: Name,
    request: &LookupRequest,
) {
    if !request.options.can_consider_members() {
        return;
    }
    for &member in ctx.symbols.members(namespace, name) {
        result.merge_equal_single(check_viability(ctx, member, request));
    }
    if !result.is_multi_viable() {
        return;
    }

    // A member sharing its name with an alias of the same declaration is
    // demoted so the alias, found next, decides the lookup.
    let Some(alias) = paired_alias(ctx, scope, name) else {
        return;
    };
    let members: Vec<SymbolId> = result.symbols().to_vec();
    let Some(&member) = members.first() else {
        return;
    };
    let diagnostic = request
        .diagnose
        .then_some(LookupDiagnostic::AliasConflictsWithMember { alias, member });
    *result = LookupResult::ambiguous(members, diagnostic);
}

/// An alias named `name` in the imports of the declaration a namespace node
/// was built for
fn paired_alias(ctx: ScopeContext<'_>, scope: &Scope, name: Name) -> Option<SymbolId> {
    let ScopeKind::Namespace { declaration, .. } = *scope.kind() else {
        return None;
    };
    let imports = scope.next()?;
    match *imports.kind() {
        ScopeKind::Imports { declaration: paired } if paired == declaration => {
            imports.import_namespace(ctx).aliases(name).first().copied()
        }
        _ => None,
    }
}

/// Members of a namespace, type or type parameter, without the alias
/// pairing a namespace scope adds
pub(crate) fn lookup_members(
    ctx: ScopeContext<'_>,
    container: SymbolId,
    result: &mut LookupResult,
    name: Name,
    request: &LookupRequest,
) {
    if ctx.symbols.kind(container).is_namespace() {
        if request.options.can_consider_members() {
            members_without_inheritance(ctx, container, result, name, request);
        }
    } else {
        lookup_in_type(ctx, container, result, name, request);
    }
}

/// Members of `ty` and of everything it inherits from
pub(crate) fn lookup_in_type(
    ctx: ScopeContext<'_>,
    ty: SymbolId,
    result: &mut LookupResult,
    name: Name,
    request: &LookupRequest,
) {
    if !request.options.can_consider_members() {
        return;
    }
    let mut found = LookupResult::new();
    let declared = ctx.symbols.symbol(ty);
    if declared.kind == SymbolKind::TypeParameter {
        lookup_in_type_parameter(ctx, ty, &mut found, name, request);
    } else if declared.is_interface() {
        lookup_in_interface(ctx, ty, &mut found, name, request);
    } else {
        lookup_in_class(ctx, Some(ty), &mut found, name, request);
    }
    result.merge_equal(&found);
}

/// Walk the base class chain. The most derived level with a viable member
/// wins; a viable method group keeps collecting overloads from base levels
/// and any other viable member hides everything below it.
fn lookup_in_class(
    ctx: ScopeContext<'_>,
    ty: Option<SymbolId>,
    result: &mut LookupResult,
    name: Name,
    request: &LookupRequest,
) {
    let Some(ty) = ty else {
        return;
    };
    let mut level = LookupResult::new();
    for level_type in ctx.symbols.base_types(ty) {
        level.clear();
        members_without_inheritance(ctx, level_type, &mut level, name, request);
        merge_hiding(ctx, result, &level);

        let level_hides_methods = level.is_multi_viable() && !first_is_method(ctx, &level);
        if result.is_multi_viable() && (level_hides_methods || !first_is_method(ctx, result)) {
            break;
        }
    }
}

/// The interface itself, then every base interface once, derived first
fn lookup_in_interface(
    ctx: ScopeContext<'_>,
    interface: SymbolId,
    result: &mut LookupResult,
    name: Name,
    request: &LookupRequest,
) {
    members_without_inheritance(ctx, interface, result, name, request);
    let bases = ctx.symbols.all_interfaces(interface);
    lookup_in_interfaces(ctx, &bases, result, name, request);
}

/// Members reachable through the constraints: the effective base class,
/// then the effective interfaces
fn lookup_in_type_parameter(
    ctx: ScopeContext<'_>,
    type_parameter: SymbolId,
    result: &mut LookupResult,
    name: Name,
    request: &LookupRequest,
) {
    if request.options.contains(LookupOptions::NAMESPACES_OR_TYPES_ONLY) {
        return;
    }
    let symbols = ctx.symbols;
    lookup_in_class(ctx, symbols.effective_base_class(type_parameter), result, name, request);
    let interfaces = symbols.effective_interfaces(type_parameter);
    lookup_in_interfaces(ctx, &interfaces, result, name, request);
}

fn lookup_in_interfaces(
    ctx: ScopeContext<'_>,
    interfaces: &[SymbolId],
    result: &mut LookupResult,
    name: Name,
    request: &LookupRequest,
) {
    let mut level = LookupResult::new();
    for &interface in interfaces {
        level.clear();
        members_without_inheritance(ctx, interface, &mut level, name, request);
        merge_hiding(ctx, result, &level);
    }
}

/// Members declared directly in `container`
fn members_without_inheritance(
    ctx: ScopeContext<'_>,
    container: SymbolId,
    result: &mut LookupResult,
    name: Name,
    request: &LookupRequest,
) {
    for &member in ctx.symbols.members(container, name) {
        result.merge_equal_single(check_viability(ctx, member, request));
    }
}

/// Merge the members of a less derived level into `hiding`.
///
/// When both sides are viable, a hidden candidate survives only if no hiding
/// candidate hides it. Otherwise the better of the two results is kept.
fn merge_hiding(ctx: ScopeContext<'_>, hiding: &mut LookupResult, hidden: &LookupResult) {
    if !(hiding.is_multi_viable() && hidden.is_multi_viable()) {
        hiding.merge_prioritized(hidden);
        return;
    }
    let hiding_symbols: Vec<SymbolId> = hiding.symbols().to_vec();
    for &candidate in hidden.symbols() {
        let is_hidden = hiding_symbols
            .iter()
            .any(|&hider| hides(ctx, hider, candidate));
        if !is_hidden {
            hiding.merge_equal_single(SingleLookupResult::good(candidate));
        }
    }
}

/// Non-methods hide everything and methods hide non-methods. A member of an
/// interface only hides members of the interfaces it inherits from.
fn hides(ctx: ScopeContext<'_>, hider: SymbolId, candidate: SymbolId) -> bool {
    let symbols = ctx.symbols;
    let hider_container = symbols.symbol(hider).container;
    if let Some(interface) = hider_container.filter(|&ty| symbols.symbol(ty).is_interface()) {
        let related = symbols
            .symbol(candidate)
            .container
            .is_some_and(|base| symbols.inherits_from(interface, base));
        if !related {
            return false;
        }
    }
    !symbols.kind(hider).is_method() || !symbols.kind(candidate).is_method()
}

fn first_is_method(ctx: ScopeContext<'_>, result: &LookupResult) -> bool {
    result
        .symbols()
        .first()
        .is_some_and(|&symbol| ctx.symbols.kind(symbol).is_method())
}

pub(super) fn enumerate_namespace(
    ctx: ScopeContext<'_>,
    namespace: SymbolId,
    info: &mut LookupSymbolsInfo,
    request: &LookupRequest,
) {
    if !request.options.can_consider_members() {
        return;
    }
    add_members(ctx, namespace, info, request);
}

pub(super) fn enumerate_type(
    ctx: ScopeContext<'_>,
    ty: SymbolId,
    info: &mut LookupSymbolsInfo,
    request: &LookupRequest,
) {
    if !request.options.can_consider_members() {
        return;
    }
    let symbols = ctx.symbols;
    let (class, interfaces) = match symbols.kind(ty) {
        SymbolKind::TypeParameter => (
            symbols.effective_base_class(ty),
            symbols.effective_interfaces(ty),
        ),
        _ if symbols.symbol(ty).is_interface() => (Some(ty), symbols.all_interfaces(ty)),
        _ => (Some(ty), Vec::new()),
    };
    let levels = class
        .into_iter()
        .flat_map(|start| symbols.base_types(start))
        .chain(interfaces);
    for level_type in levels {
        add_members(ctx, level_type, info, request);
    }
}

fn add_members(
    ctx: ScopeContext<'_>,
    container: SymbolId,
    info: &mut LookupSymbolsInfo,
    request: &LookupRequest,
) {
    for &member in ctx.symbols.members_of(container) {
        if can_add_lookup_symbol_info(ctx, member, request) {
            info.add(ctx.symbols.name(member), member);
        }
    }
}

/// Static classes of a namespace, where extension methods are declared
pub(crate) fn static_classes<'a>(
    ctx: ScopeContext<'a>,
    namespace: SymbolId,
) -> impl Iterator<Item = SymbolId> + 'a {
    ctx.symbols
        .members_of(namespace)
        .iter()
        .copied()
        .filter(move |&member| is_static_class(ctx, member))
}

pub(crate) fn is_static_class(ctx: ScopeContext<'_>, ty: SymbolId) -> bool {
    let declared = ctx.symbols.symbol(ty);
    match declared.kind {
        SymbolKind::NamedType(TypeKind::StaticClass) => true,
        SymbolKind::NamedType(TypeKind::Class) => declared.is_static,
        _ => false,
    }
}

/// Extension methods named `name` declared in `class`, checked for viability
pub(crate) fn extension_methods_in(
    ctx: ScopeContext<'_>,
    class: SymbolId,
    name: Name,
    request: &LookupRequest,
    out: &mut Vec<SymbolId>,
) {
    for &member in ctx.symbols.members(class, name) {
        let declared = ctx.symbols.symbol(member);
        if declared.is_extension
            && matches!(declared.kind, SymbolKind::Method(_))
            && check_viability(ctx, member, request).is_viable()
            && !out.contains(&member)
        {
            out.push(member);
        }
    }
}
