//! Extern aliases, using aliases and using directives

use super::container::{extension_methods_in, is_static_class, static_classes};
use crate::collector::LookupSymbolsInfo;
use crate::context::ScopeContext;
use crate::error::{DiagnosticSink, ScopeDiagnostic};
use crate::namespace::ImportNamespace;
use crate::options::LookupOptions;
use crate::result::LookupResult;
use crate::viability::{can_add_lookup_symbol_info, check_viability, LookupRequest};
use ks_intern::Name;
use ks_symbols::{SymbolId, SymbolKind};
use ks_syntax::{NodeId, SyntaxKind};
use tracing::debug;

/// Collect the directives written directly in a compilation unit or namespace body
pub(crate) fn import_namespace(ctx: ScopeContext<'_>, declaration: NodeId) -> ImportNamespace {
    let tree = ctx.tree;
    let symbols = ctx.symbols;
    let mut imports = ImportNamespace::new();
    for &directive in tree.children(declaration) {
        match tree.kind(directive) {
            SyntaxKind::ExternAliasDirective | SyntaxKind::UsingAliasDirective => {
                if let Some(alias) = symbols.declared_symbol(directive) {
                    imports.add_alias(symbols.name(alias), alias);
                }
            }
            SyntaxKind::UsingNamespaceDirective => {
                if let Some(target) = symbols.import_target(directive) {
                    imports.add_using_namespace(target);
                }
            }
            SyntaxKind::UsingStaticDirective => {
                if let Some(target) = symbols.import_target(directive) {
                    imports.add_using_static(target);
                }
            }
            _ => {}
        }
    }
    imports
}

/// Aliases first; imported types and static members only if no alias is viable
pub(super) fn lookup(
    ctx: ScopeContext<'_>,
    imports: &ImportNamespace,
    result: &mut LookupResult,
    name: Name,
    request: &LookupRequest,
) {
    let options = request.options;
    if options.contains(LookupOptions::LABELS_ONLY) {
        return;
    }
    for &alias in imports.aliases(name) {
        result.merge_equal_single(check_viability(ctx, alias, request));
    }
    if result.is_multi_viable() || options.contains(LookupOptions::NAMESPACE_ALIASES_ONLY) {
        return;
    }

    let symbols = ctx.symbols;
    let mut imported = LookupResult::new();
    for &namespace in imports.using_namespaces() {
        // Using a namespace imports its types, never its nested namespaces.
        for &member in symbols.members(namespace, name) {
            if symbols.kind(member).is_type() {
                imported.merge_equal_single(check_viability(ctx, member, request));
            }
        }
    }
    for &ty in imports.using_statics() {
        for &member in symbols.members(ty, name) {
            if is_statically_imported(ctx, member) {
                imported.merge_equal_single(check_viability(ctx, member, request));
            }
        }
    }
    result.merge_equal(&imported);
}

/// Nested types and static members, except extension methods, which are only
/// reachable through extension method lookup
fn is_statically_imported(ctx: ScopeContext<'_>, member: SymbolId) -> bool {
    let declared = ctx.symbols.symbol(member);
    if declared.is_extension {
        return false;
    }
    declared.kind.is_type() || (declared.kind.has_instance_state() && declared.is_static)
}

pub(super) fn enumerate(
    ctx: ScopeContext<'_>,
    imports: &ImportNamespace,
    info: &mut LookupSymbolsInfo,
    request: &LookupRequest,
) {
    let options = request.options;
    if options.contains(LookupOptions::LABELS_ONLY) {
        return;
    }
    let symbols = ctx.symbols;
    for alias in imports.all_aliases() {
        if can_add_lookup_symbol_info(ctx, symbols.unwrap_alias(alias), request) {
            info.add(symbols.name(alias), alias);
        }
    }
    if options.contains(LookupOptions::NAMESPACE_ALIASES_ONLY) {
        return;
    }
    for &namespace in imports.using_namespaces() {
        for &member in symbols.members_of(namespace) {
            if symbols.kind(member).is_type() && can_add_lookup_symbol_info(ctx, member, request) {
                info.add(symbols.name(member), member);
            }
        }
    }
    for &ty in imports.using_statics() {
        for &member in symbols.members_of(ty) {
            if is_statically_imported(ctx, member) && can_add_lookup_symbol_info(ctx, member, request)
            {
                info.add(symbols.name(member), member);
            }
        }
    }
}

/// Extension methods brought in by using directives
pub(crate) fn extension_methods(
    ctx: ScopeContext<'_>,
    imports: &ImportNamespace,
    name: Name,
    request: &LookupRequest,
    out: &mut Vec<SymbolId>,
) {
    for &namespace in imports.using_namespaces() {
        for class in static_classes(ctx, namespace) {
            extension_methods_in(ctx, class, name, request, out);
        }
    }
    for &ty in imports.using_statics() {
        if is_static_class(ctx, ty) {
            extension_methods_in(ctx, ty, name, request, out);
        }
    }
}

/// Report aliases declared twice in `declaration` and aliases that share a
/// name with a member of the namespace `declaration` declares.
///
/// Returns true if anything was reported.
pub fn validate_imports(
    ctx: ScopeContext<'_>,
    declaration: NodeId,
    sink: &mut impl DiagnosticSink,
) -> bool {
    let symbols = ctx.symbols;
    let imports = import_namespace(ctx, declaration);
    let namespace = symbols
        .declared_symbol(declaration)
        .filter(|&symbol| symbols.kind(symbol) == SymbolKind::Namespace);
    let mut reported = false;

    let mut names: Vec<Name> = imports.all_aliases().map(|alias| symbols.name(alias)).collect();
    names.dedup();
    for name in names {
        let aliases = imports.aliases(name);
        for &duplicate in aliases.iter().skip(1) {
            debug!(alias = ?duplicate, "duplicate alias");
            sink.report(ScopeDiagnostic::DuplicateAlias {
                name,
                at: ctx.span_of(duplicate),
            });
            reported = true;
        }

        let Some(&alias) = aliases.first() else {
            continue;
        };
        let member = namespace.and_then(|namespace| symbols.members(namespace, name).first());
        if let Some(&member) = member {
            debug!(?alias, ?member, "alias conflicts with namespace member");
            sink.report(ScopeDiagnostic::AliasConflictsWithMember {
                name,
                member,
                at: ctx.span_of(alias),
            });
            reported = true;
        }
    }
    reported
}
