//! Walking a chain from the innermost node outwards

use crate::collector::LookupSymbolsInfo;
use crate::context::ScopeContext;
use crate::error::LookupDiagnostic;
use crate::invariant::invariant_violation;
use crate::kinds::imports;
use crate::kinds::container::{self, extension_methods_in, static_classes};
use crate::options::LookupOptions;
use crate::result::{LookupResult, LookupResultKind, SingleLookupResult};
use crate::scope::{Scope, ScopeKind};
use crate::viability::{check_attribute_type, is_attribute_class, LookupRequest};
use ks_intern::Name;
use ks_lifetime::SafeContext;
use ks_symbols::{SymbolId, SymbolKind};
use ks_syntax::{NodeId, Role, SyntaxKind};
use rustc_hash::FxHashSet;
use tracing::trace;

/// Extension methods contributed by one scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionMethodGroup {
    /// Declaration whose members or directives supplied the methods
    pub declaration: NodeId,
    pub methods: Vec<SymbolId>,
}

impl Scope {
    /// Look up `name` as written here with `arity` type arguments.
    ///
    /// Diagnostics are only collected when the outcome is a failure.
    pub fn lookup(
        &self,
        ctx: ScopeContext<'_>,
        name: Name,
        arity: u32,
        options: LookupOptions,
    ) -> LookupResult {
        let mut result = LookupResult::new();
        self.lookup_with_fallback(ctx, &mut result, name, arity, options);
        result
    }

    /// Look up without diagnostics, repeating with diagnostics if the outcome
    /// is neither viable nor empty
    pub fn lookup_with_fallback(
        &self,
        ctx: ScopeContext<'_>,
        result: &mut LookupResult,
        name: Name,
        arity: u32,
        options: LookupOptions,
    ) {
        self.lookup_symbols(ctx, result, name, arity, options, false);
        if !matches!(
            result.kind(),
            LookupResultKind::Viable | LookupResultKind::Empty
        ) {
            result.clear();
            self.lookup_symbols(ctx, result, name, arity, options, true);
        }
    }

    /// Walk the chain for `name`, stopping at the first node that makes the
    /// result viable. Returns the node the first candidates came from.
    pub fn lookup_symbols(
        &self,
        ctx: ScopeContext<'_>,
        result: &mut LookupResult,
        name: Name,
        arity: u32,
        options: LookupOptions,
        diagnose: bool,
    ) -> Option<&Scope> {
        debug_assert!(options.are_valid(), "invalid lookup options {options:?}");
        let request = LookupRequest::new(ctx, self, arity, options, diagnose);
        if options.is_attribute_type_lookup() {
            self.lookup_attribute_type(ctx, result, name, &request)
        } else {
            self.walk_lookup(ctx, result, name, &request)
        }
    }

    fn walk_lookup(
        &self,
        ctx: ScopeContext<'_>,
        result: &mut LookupResult,
        name: Name,
        request: &LookupRequest,
    ) -> Option<&Scope> {
        let mut found_in = None;
        let mut scratch = LookupResult::new();
        for scope in self.chain() {
            if found_in.is_none() {
                scope.lookup_own_namespace(ctx, result, name, request);
                if !result.is_clear() {
                    found_in = Some(scope);
                }
            } else {
                scratch.clear();
                scope.lookup_own_namespace(ctx, &mut scratch, name, request);
                result.merge_equal(&scratch);
            }
            trace!(scope = scope.kind().label(), kind = ?result.kind(), "lookup step");
            if result.is_multi_viable() {
                break;
            }
        }
        found_in
    }

    /// Members named `name` of `owner` as seen from here, as in
    /// `receiver.name`. `owner` is a namespace, a named type or a type
    /// parameter; members of types include everything they inherit.
    pub fn lookup_members(
        &self,
        ctx: ScopeContext<'_>,
        owner: SymbolId,
        name: Name,
        arity: u32,
        options: LookupOptions,
    ) -> LookupResult {
        let through_type = match ctx.symbols.kind(owner) {
            SymbolKind::NamedType(_) => Some(owner),
            SymbolKind::TypeParameter => ctx.symbols.effective_base_class(owner),
            _ => None,
        };
        let request =
            LookupRequest::new(ctx, self, arity, options, false).with_through_type(through_type);
        let mut result = LookupResult::new();
        container::lookup_members(ctx, owner, &mut result, name, &request);
        if !matches!(
            result.kind(),
            LookupResultKind::Viable | LookupResultKind::Empty
        ) {
            result.clear();
            let request = request.with_diagnose(true);
            container::lookup_members(ctx, owner, &mut result, name, &request);
        }
        result
    }

    /// `[Name]` resolves to `Name` or `NameAttribute`, whichever is an
    /// attribute class; both being one is an ambiguity
    fn lookup_attribute_type(
        &self,
        ctx: ScopeContext<'_>,
        result: &mut LookupResult,
        name: Name,
        request: &LookupRequest,
    ) -> Option<&Scope> {
        let mut plain = LookupResult::new();
        let plain_scope = self.walk_lookup(ctx, &mut plain, name, request);
        let plain_is_attribute = is_single_viable_attribute(ctx, &plain);

        if request.options.is_verbatim_attribute_lookup() {
            demote_non_attribute(ctx, &mut plain, request.diagnose);
            result.set_from_result(&plain);
            return plain_scope;
        }

        // A spelling nothing has interned names no declaration.
        let mut suffixed = LookupResult::new();
        let suffixed_scope = ctx
            .interner
            .get(&format!("{}Attribute", ctx.interner.resolve(&name)))
            .and_then(|suffixed_name| {
                self.walk_lookup(ctx, &mut suffixed, suffixed_name, request)
            });
        let suffixed_is_attribute = is_single_viable_attribute(ctx, &suffixed);

        match (plain_is_attribute, suffixed_is_attribute) {
            (true, true) => {
                let first = plain.single_symbol();
                let second = suffixed.single_symbol();
                let diagnostic = match (first, second) {
                    (Some(first), Some(second)) if request.diagnose => {
                        Some(LookupDiagnostic::AmbiguousAttribute { first, second })
                    }
                    _ => None,
                };
                *result = LookupResult::ambiguous(first.into_iter().chain(second), diagnostic);
                plain_scope
            }
            (true, false) => {
                demote_non_attribute(ctx, &mut plain, request.diagnose);
                result.set_from_result(&plain);
                plain_scope
            }
            (false, true) => {
                demote_non_attribute(ctx, &mut suffixed, request.diagnose);
                result.set_from_result(&suffixed);
                suffixed_scope
            }
            (false, false) => {
                demote_non_attribute(ctx, &mut plain, request.diagnose);
                demote_non_attribute(ctx, &mut suffixed, request.diagnose);
                let scope = if suffixed.kind() > plain.kind() {
                    suffixed_scope
                } else {
                    plain_scope
                };
                plain.merge_prioritized(&suffixed);
                result.set_from_result(&plain);
                scope
            }
        }
    }

    /// Every name visible from here that passes `options`, innermost first
    pub fn enumerate_visible(
        &self,
        ctx: ScopeContext<'_>,
        options: LookupOptions,
    ) -> LookupSymbolsInfo {
        let request = LookupRequest::new(ctx, self, 0, options, false);
        let mut info = LookupSymbolsInfo::new();
        for scope in self.chain() {
            scope.enumerate_own_namespace(ctx, &mut info, &request);
        }
        info
    }

    /// Candidate extension methods named `name`, one group per contributing
    /// scope, innermost first
    pub fn lookup_extension_methods(
        &self,
        ctx: ScopeContext<'_>,
        name: Name,
        arity: u32,
        options: LookupOptions,
    ) -> Vec<ExtensionMethodGroup> {
        let request = LookupRequest::new(ctx, self, arity, options, false);
        let mut groups = Vec::new();
        for scope in self.chain() {
            let mut methods = Vec::new();
            let declaration = match *scope.kind() {
                ScopeKind::Namespace {
                    namespace,
                    declaration,
                } => {
                    for class in static_classes(ctx, namespace) {
                        extension_methods_in(ctx, class, name, &request, &mut methods);
                    }
                    declaration
                }
                ScopeKind::Imports { declaration } => {
                    imports::extension_methods(
                        ctx,
                        scope.import_namespace(ctx),
                        name,
                        &request,
                        &mut methods,
                    );
                    declaration
                }
                _ => continue,
            };
            if !methods.is_empty() {
                trace!(scope = scope.kind().label(), count = methods.len(), "extension methods");
                groups.push(ExtensionMethodGroup {
                    declaration,
                    methods,
                });
            }
        }
        groups
    }

    // Structural queries

    /// Locals declared by the scope built for `node`.
    ///
    /// # Panics
    ///
    /// If no scope of this chain was built for `node`.
    pub fn declared_locals_for(&self, ctx: ScopeContext<'_>, node: NodeId) -> Vec<SymbolId> {
        for scope in self.chain() {
            let kind = scope.kind();
            let owns_locals = kind.is_local_scope() || kind.is_function_boundary();
            if owns_locals && kind.designator() == Some(node) {
                return scope
                    .declared_namespace(ctx)
                    .all_values()
                    .filter(|&symbol| ctx.symbols.kind(symbol) == SymbolKind::Local)
                    .collect();
            }
        }
        invariant_violation("no scope in the chain declares locals for the node")
    }

    /// Statement a `break` here leaves; `None` outside any loop or switch of
    /// the current function.
    ///
    /// # Panics
    ///
    /// If the chain has no function boundary.
    pub fn break_target(&self) -> Option<NodeId> {
        self.find_in_function(|kind| match *kind {
            ScopeKind::Loop { node } | ScopeKind::Switch { node } => Some(node),
            _ => None,
        })
    }

    /// Loop a `continue` here resumes.
    ///
    /// # Panics
    ///
    /// If the chain has no function boundary.
    pub fn continue_target(&self) -> Option<NodeId> {
        self.find_in_function(|kind| match *kind {
            ScopeKind::Loop { node } => Some(node),
            _ => None,
        })
    }

    /// Switch statement targeted by `goto case` here.
    ///
    /// # Panics
    ///
    /// If the chain has no function boundary.
    pub fn enclosing_switch(&self) -> Option<NodeId> {
        self.find_in_function(|kind| match *kind {
            ScopeKind::Switch { node } => Some(node),
            _ => None,
        })
    }

    fn find_in_function(&self, found: impl Fn(&ScopeKind) -> Option<NodeId>) -> Option<NodeId> {
        for scope in self.chain() {
            let kind = scope.kind();
            if let Some(node) = found(kind) {
                return Some(node);
            }
            if kind.is_function_boundary() {
                return None;
            }
            if kind.is_container() {
                break;
            }
        }
        invariant_violation("statement query outside of a function body")
    }

    /// Locals that enclosing `using`, `lock` and `fixed` statements hold
    ///
    /// Outside any such statement the set is empty and cached on `self`.
    pub fn locked_or_disposed_variables(&self, ctx: ScopeContext<'_>) -> &FxHashSet<SymbolId> {
        let resource = self
            .chain()
            .find(|scope| matches!(scope.kind(), ScopeKind::Resource { .. }))
            .unwrap_or(self);
        resource
            .locked_or_disposed_cache()
            .get_or_compute(|| resource.compute_locked_or_disposed(ctx))
    }

    fn compute_locked_or_disposed(&self, ctx: ScopeContext<'_>) -> FxHashSet<SymbolId> {
        let ScopeKind::Resource { node } = *self.kind() else {
            return FxHashSet::default();
        };
        let outer = self.next().map(|next| next.locked_or_disposed_variables(ctx));
        let mut held: FxHashSet<SymbolId> = outer.cloned().unwrap_or_default();

        held.extend(
            self.declared_namespace(ctx)
                .all_values()
                .filter(|&symbol| ctx.symbols.kind(symbol) == SymbolKind::Local),
        );

        let tree = ctx.tree;
        for &child in tree.children(node) {
            let is_header = matches!(tree.role(child), Role::Expression | Role::Resource);
            if !is_header || tree.kind(child) != SyntaxKind::IdentifierName {
                continue;
            }
            let (Some(name), Some(next)) = (tree.name(child), self.next()) else {
                continue;
            };
            let found = next.lookup(ctx, name, 0, LookupOptions::empty());
            if let Some(symbol) = found.single_symbol() {
                if found.is_single_viable() && ctx.symbols.kind(symbol) == SymbolKind::Local {
                    held.insert(symbol);
                }
            }
        }
        held
    }

    /// Escape scope of a value declared here: the current method narrowed once
    /// per enclosing local scope, or the calling method outside any function
    pub fn local_scope_depth(&self) -> SafeContext {
        let mut locals = 0;
        for scope in self.chain() {
            let kind = scope.kind();
            if kind.is_function_boundary() {
                return SafeContext::from_depth(SafeContext::CURRENT_METHOD.depth() + locals);
            }
            if kind.is_local_scope() {
                locals += 1;
            }
        }
        SafeContext::CALLING_METHOD
    }

    /// Member accesses reaching range variable `name` from the innermost
    /// query clause
    pub fn range_variable_path(&self, name: Name) -> Option<&[Name]> {
        self.chain().find_map(|scope| match scope.kind() {
            ScopeKind::Query { variables, .. } => Some(variables),
            _ => None,
        })?
        .get(name)
        .map(|variable| variable.path.as_slice())
    }
}

fn is_single_viable_attribute(ctx: ScopeContext<'_>, result: &LookupResult) -> bool {
    match result.single_symbol() {
        Some(symbol) if result.is_single_viable() => {
            is_attribute_class(ctx, ctx.symbols.unwrap_alias(symbol))
        }
        _ => false,
    }
}

/// A viable type that cannot be applied as an attribute becomes
/// `NotAnAttributeType`
fn demote_non_attribute(ctx: ScopeContext<'_>, result: &mut LookupResult, diagnose: bool) {
    let Some(symbol) = result.single_symbol() else {
        return;
    };
    if !result.is_single_viable() {
        return;
    }
    if let Err(diagnostic) = check_attribute_type(ctx, ctx.symbols.unwrap_alias(symbol), diagnose) {
        result.set_from(SingleLookupResult::new(
            LookupResultKind::NotAnAttributeType,
            symbol,
            diagnostic,
        ));
    }
}
