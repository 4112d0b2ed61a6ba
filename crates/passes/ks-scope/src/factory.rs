//! Building scope chains from syntax positions

use crate::context::ScopeContext;
use crate::invariant::invariant_violation;
use crate::namespace::RangeVariableMap;
use crate::options::BinderFlags;
use crate::scope::{Scope, ScopeKind, ScopeRef};
use dashmap::DashMap;
use ks_span::TextOffset;
use ks_symbols::SymbolId;
use ks_syntax::{Modifiers, NodeId, Role, SyntaxKind};
use parking_lot::Mutex;
use rustc_hash::{FxBuildHasher, FxHashMap};
use std::sync::Arc;
use tracing::debug;

/// How a chain will be used; attribute arguments bound early see a reduced
/// context, so they get chains of their own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScopeUsage {
    #[default]
    Normal,
    EarlyAttribute,
}

/// Chains for every node of one member body, keyed by node
type MemberScopeMap = FxHashMap<NodeId, ScopeRef>;

/// Builds and caches the scope chains of one syntax tree.
///
/// Chains are immutable and shared, so a chain handed out earlier stays valid
/// after it is evicted; eviction only costs a rebuild.
#[derive(Debug)]
pub struct ScopeFactory {
    root: ScopeRef,
    cache: DashMap<(NodeId, ScopeUsage), ScopeRef, FxBuildHasher>,
    member_maps: DashMap<NodeId, Arc<MemberScopeMap>, FxBuildHasher>,
    capacity: usize,
    /// Held while a chain is admitted to `cache`; lookups never take it
    admission: Mutex<()>,
}

/// Scopes a node adds for its contents
struct Entered {
    /// Context of the node's body
    body: ScopeRef,
    /// Context of signature slots: base list, type parameters, return type
    signature: ScopeRef,
}

impl Entered {
    fn same(scope: ScopeRef) -> Self {
        Self {
            signature: Arc::clone(&scope),
            body: scope,
        }
    }
}

impl ScopeFactory {
    /// A factory caching at most `capacity` chains
    pub fn new(capacity: usize) -> Self {
        Self {
            root: Scope::root(),
            cache: DashMap::with_hasher(FxBuildHasher),
            member_maps: DashMap::with_hasher(FxBuildHasher),
            capacity,
            admission: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &ScopeRef {
        &self.root
    }

    /// Chain in effect at `position`
    #[tracing::instrument(level = "debug", skip(self, ctx))]
    pub fn chain_at(&self, ctx: ScopeContext<'_>, position: TextOffset) -> ScopeRef {
        let node = ctx.tree.innermost_node_at(position);
        self.chain_for_node(ctx, node, ScopeUsage::Normal)
    }

    /// Chain in effect inside `node`, including the scopes `node` itself opens
    #[tracing::instrument(level = "debug", skip(self, ctx))]
    pub fn chain_for_node(
        &self,
        ctx: ScopeContext<'_>,
        node: NodeId,
        usage: ScopeUsage,
    ) -> ScopeRef {
        if let Some(cached) = self.cache.get(&(node, usage)) {
            debug!("chain cache hit");
            return Arc::clone(cached.value());
        }
        debug!("chain cache miss");

        let member = (usage == ScopeUsage::Normal)
            .then(|| {
                ctx.tree
                    .ancestors(node)
                    .find(|&ancestor| ctx.tree.kind(ancestor).is_member_with_body())
            })
            .flatten();
        let chain = match member {
            Some(member) => {
                let map = self.member_map(ctx, member);
                match map.get(&node) {
                    Some(chain) => Arc::clone(chain),
                    None => invariant_violation("member scope map is missing a node of its body"),
                }
            }
            None => {
                let outside = self.context_outside(ctx, node, usage);
                enter(ctx, node, &outside, usage).body
            }
        };
        self.remember(node, usage, &chain);
        chain
    }

    /// Number of chains currently cached
    pub fn cached_chains(&self) -> usize {
        self.cache.len()
    }

    /// Forget every cached chain and member map
    pub fn clear(&self) {
        self.cache.clear();
        self.member_maps.clear();
    }

    /// Cache `chain`, evicting arbitrary entries to stay within capacity.
    ///
    /// Admissions are serialized, so the bound holds with concurrent callers.
    fn remember(&self, node: NodeId, usage: ScopeUsage, chain: &ScopeRef) {
        if self.capacity == 0 {
            return;
        }
        let key = (node, usage);
        let _admission = self.admission.lock();
        if !self.cache.contains_key(&key) {
            while self.cache.len() >= self.capacity {
                // The iterator holds a shard lock; it must be gone before removal.
                let Some(victim) = self.cache.iter().next().map(|entry| *entry.key()) else {
                    break;
                };
                self.cache.remove(&victim);
                debug!(?victim, "chain cache eviction");
            }
        }
        self.cache.insert(key, Arc::clone(chain));
    }

    fn member_map(&self, ctx: ScopeContext<'_>, member: NodeId) -> Arc<MemberScopeMap> {
        if let Some(map) = self.member_maps.get(&member) {
            return Arc::clone(map.value());
        }

        let tree = ctx.tree;
        let mut map = MemberScopeMap::default();
        let mut pending = vec![(member, self.context_outside(ctx, member, ScopeUsage::Normal))];
        while let Some((node, outside)) = pending.pop() {
            let entered = enter(ctx, node, &outside, ScopeUsage::Normal);
            for &child in tree.children(node) {
                pending.push((child, child_context(ctx, node, child, &entered, &outside)));
            }
            map.insert(node, entered.body);
        }
        debug!(?member, nodes = map.len(), "member scope map built");

        let map = Arc::new(map);
        // A concurrent build of the same member may have won; either map is
        // equivalent, keep the first.
        Arc::clone(
            self.member_maps
                .entry(member)
                .or_insert_with(|| Arc::clone(&map))
                .value(),
        )
    }

    /// Context the scopes of `node` are built on
    fn context_outside(&self, ctx: ScopeContext<'_>, node: NodeId, usage: ScopeUsage) -> ScopeRef {
        let mut path: Vec<NodeId> = ctx.tree.ancestors(node).collect();
        path.reverse();
        let mut context = Arc::clone(&self.root);
        for pair in path.windows(2) {
            let &[parent, child] = pair else {
                continue;
            };
            let entered = enter(ctx, parent, &context, usage);
            context = child_context(ctx, parent, child, &entered, &context);
        }
        context
    }
}

impl Default for ScopeFactory {
    fn default() -> Self {
        Self::new(4096)
    }
}

fn declared_symbol(ctx: ScopeContext<'_>, node: NodeId) -> SymbolId {
    match ctx.symbols.declared_symbol(node) {
        Some(symbol) => symbol,
        None => invariant_violation("declaration node without a declared symbol"),
    }
}

fn unsafe_if_marked(ctx: ScopeContext<'_>, node: NodeId, outside: &ScopeRef) -> ScopeRef {
    if ctx.tree.modifiers(node).contains(Modifiers::UNSAFE) {
        outside.with_additional_flags(BinderFlags::UNSAFE_REGION)
    } else {
        Arc::clone(outside)
    }
}

/// Scopes `node` opens on top of `outside`
fn enter(ctx: ScopeContext<'_>, node: NodeId, outside: &ScopeRef, usage: ScopeUsage) -> Entered {
    let tree = ctx.tree;
    let symbols = ctx.symbols;
    let kind = tree.kind(node);

    let embedded = tree.role(node).is_embedded_slot() && kind.is_statement() && kind != SyntaxKind::Block;
    let outside = if embedded {
        Scope::new(ScopeKind::Embedded { node }, outside)
    } else {
        Arc::clone(outside)
    };

    match kind {
        SyntaxKind::CompilationUnit | SyntaxKind::NamespaceDeclaration => {
            let namespace = declared_symbol(ctx, node);
            let imports = Scope::new(ScopeKind::Imports { declaration: node }, &outside);
            Entered::same(Scope::new(
                ScopeKind::Namespace {
                    namespace,
                    declaration: node,
                },
                &imports,
            ))
        }
        SyntaxKind::TypeDeclaration => {
            let ty = declared_symbol(ctx, node);
            let mut scope = unsafe_if_marked(ctx, node, &outside);
            if symbols.symbol(ty).arity > 0 {
                scope = Scope::new(ScopeKind::ClassTypeParameters { ty }, &scope);
            }
            let signature = Arc::clone(&scope);
            if !symbols.parameters_of(ty).is_empty() {
                scope = Scope::new(ScopeKind::PrimaryConstructor { ty }, &scope);
            }
            Entered {
                body: Scope::new(ScopeKind::Type { ty }, &scope),
                signature,
            }
        }
        SyntaxKind::MethodDeclaration
        | SyntaxKind::ConstructorDeclaration
        | SyntaxKind::OperatorDeclaration
        | SyntaxKind::AccessorDeclaration => {
            let member = declared_symbol(ctx, node);
            let mut scope = unsafe_if_marked(ctx, node, &outside);
            if !symbols.type_parameters_of(member).is_empty() {
                scope = Scope::new(ScopeKind::MethodTypeParameters { method: member }, &scope);
            }
            Entered {
                body: Scope::new(
                    ScopeKind::Parameters {
                        member,
                        declaration: node,
                    },
                    &scope,
                ),
                signature: scope,
            }
        }
        SyntaxKind::FieldDeclaration => {
            let scope = outside.with_additional_flags(BinderFlags::FIELD_INITIALIZER);
            match symbols.declared_symbol(node) {
                Some(member) => Entered::same(Scope::new(
                    ScopeKind::Parameters {
                        member,
                        declaration: node,
                    },
                    &scope,
                )),
                None => Entered::same(scope),
            }
        }
        SyntaxKind::Block => Entered::same(Scope::new(ScopeKind::Block { node }, &outside)),
        SyntaxKind::CatchClause => Entered::same(Scope::new(ScopeKind::Catch { node }, &outside)),
        SyntaxKind::SwitchStatement => {
            Entered::same(Scope::new(ScopeKind::Switch { node }, &outside))
        }
        SyntaxKind::SwitchSection => {
            Entered::same(Scope::new(ScopeKind::SwitchSection { node }, &outside))
        }
        SyntaxKind::SwitchExpressionArm => {
            Entered::same(Scope::new(ScopeKind::SwitchArm { node }, &outside))
        }
        SyntaxKind::LambdaExpression => {
            let lambda = declared_symbol(ctx, node);
            Entered::same(Scope::new(ScopeKind::Lambda { lambda, node }, &outside))
        }
        SyntaxKind::LocalFunctionStatement => {
            let function = declared_symbol(ctx, node);
            let scope = unsafe_if_marked(ctx, node, &outside);
            Entered::same(Scope::new(ScopeKind::LocalFunction { function, node }, &scope))
        }
        SyntaxKind::UnsafeStatement => {
            Entered::same(outside.with_additional_flags(BinderFlags::UNSAFE_REGION))
        }
        SyntaxKind::CheckedStatement | SyntaxKind::CheckedExpression => {
            Entered::same(outside.with_flags(outside.flags().with_overflow_checks(true)))
        }
        SyntaxKind::UncheckedStatement | SyntaxKind::UncheckedExpression => {
            Entered::same(outside.with_flags(outside.flags().with_overflow_checks(false)))
        }
        SyntaxKind::FinallyClause => {
            Entered::same(outside.with_additional_flags(BinderFlags::IN_FINALLY_BLOCK))
        }
        SyntaxKind::AttributeList => {
            let mut flags = BinderFlags::ATTRIBUTE_ARGUMENTS;
            if usage == ScopeUsage::EarlyAttribute {
                flags |= BinderFlags::EARLY_ATTRIBUTE_BINDING;
            }
            Entered::same(outside.with_additional_flags(flags))
        }
        SyntaxKind::DocumentationCref => {
            let scope = outside.with_additional_flags(BinderFlags::IN_CREF);
            Entered::same(Scope::new(ScopeKind::CrefTypeParameters { cref: node }, &scope))
        }
        kind if kind.is_loop() => Entered::same(Scope::new(ScopeKind::Loop { node }, &outside)),
        kind if kind.is_resource_statement() => {
            Entered::same(Scope::new(ScopeKind::Resource { node }, &outside))
        }
        kind if kind.is_query_clause() => Entered {
            body: Scope::new(
                ScopeKind::Query {
                    clause: node,
                    variables: Arc::new(range_variables_before(ctx, node)),
                },
                &outside,
            ),
            // The source of a join sees none of the query's variables.
            signature: outside,
        },
        _ => Entered::same(outside),
    }
}

/// Context a child of `parent` is built on, given the scopes `parent` opened
fn child_context(
    ctx: ScopeContext<'_>,
    parent: NodeId,
    child: NodeId,
    entered: &Entered,
    outside: &ScopeRef,
) -> ScopeRef {
    let tree = ctx.tree;
    let parent_kind = tree.kind(parent);
    let role = tree.role(child);

    match (parent_kind, role) {
        // Attributes of a type are bound where the type is declared.
        (SyntaxKind::TypeDeclaration, Role::AttributeList) => Arc::clone(outside),
        (SyntaxKind::JoinClause, Role::Expression) => Arc::clone(&entered.signature),
        (SyntaxKind::JoinClause, Role::InnerKey) => {
            let mut variables = RangeVariableMap::new();
            if let Some(variable) = ctx.symbols.declared_symbol(parent) {
                variables.add(ctx.interner, ctx.symbols.name(variable), variable);
            }
            Scope::new(
                ScopeKind::Query {
                    clause: parent,
                    variables: Arc::new(variables),
                },
                &entered.signature,
            )
        }
        (kind, role) if role.is_signature_slot() && !kind.is_query_clause() => {
            Arc::clone(&entered.signature)
        }
        (SyntaxKind::CatchClause, Role::Filter) => entered
            .body
            .with_additional_flags(BinderFlags::IN_CATCH_FILTER),
        (SyntaxKind::CatchClause, Role::Body) => {
            entered.body.with_additional_flags(BinderFlags::IN_CATCH_BLOCK)
        }
        (SyntaxKind::Parameter, Role::Initializer) => entered
            .body
            .with_additional_flags(BinderFlags::PARAMETER_DEFAULT_VALUE),
        (SyntaxKind::ConditionalAccessExpression, Role::WhenNotNull) => {
            let receiver = tree.child_with_role(parent, Role::Receiver).unwrap_or(parent);
            entered.body.with_conditional_receiver(receiver)
        }
        _ => Arc::clone(&entered.body),
    }
}

/// Range variables declared by the clauses before `clause` in its query
fn range_variables_before(ctx: ScopeContext<'_>, clause: NodeId) -> RangeVariableMap {
    let tree = ctx.tree;
    let mut variables = RangeVariableMap::new();
    let Some(query) = tree.parent(clause) else {
        return variables;
    };
    for &sibling in tree.children(query) {
        if sibling == clause {
            break;
        }
        let kind = tree.kind(sibling);
        if !kind.is_query_clause() {
            continue;
        }
        if kind == SyntaxKind::QueryContinuation {
            variables.reset();
        }
        if let Some(variable) = ctx.symbols.declared_symbol(sibling) {
            variables.add(ctx.interner, ctx.symbols.name(variable), variable);
        }
    }
    variables
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScopeConfig;
    use ks_intern::Interner;
    use ks_span::FileId;
    use ks_symbols::{MethodKind, ProgramBuilder, TypeKind};

    fn labels(chain: &Scope) -> Vec<&'static str> {
        chain.chain().map(|scope| scope.kind().label()).collect()
    }

    #[test]
    fn test_method_body_chain() {
        let interner = Interner::new();
        let mut builder = ProgramBuilder::new(interner.clone(), FileId(0));
        builder.open_type("C", TypeKind::Class);
        builder.open_method("M", MethodKind::Ordinary);
        builder.type_parameter("T");
        let body = builder.open(SyntaxKind::Block, Role::Body);
        let statement = builder.open(SyntaxKind::ExpressionStatement, Role::None);
        for _ in 0..4 {
            builder.close().unwrap();
        }
        let program = builder.finish().unwrap();
        let config = ScopeConfig::default();
        let ctx = ScopeContext::new(&program.tree, &program.symbols, &interner, &config);

        let factory = ScopeFactory::new(16);
        let chain = factory.chain_for_node(ctx, statement, ScopeUsage::Normal);
        assert_eq!(
            labels(&chain),
            [
                "block",
                "parameters",
                "method-type-parameters",
                "type",
                "namespace",
                "imports",
                "root"
            ]
        );
        let block = factory.chain_for_node(ctx, body, ScopeUsage::Normal);
        assert!(Arc::ptr_eq(&chain, &block));
    }

    #[test]
    fn test_cache_hits_return_the_same_chain() {
        let interner = Interner::new();
        let mut builder = ProgramBuilder::new(interner.clone(), FileId(0));
        let (type_node, _) = builder.open_type("C", TypeKind::Class);
        builder.close().unwrap();
        let program = builder.finish().unwrap();
        let config = ScopeConfig::default();
        let ctx = ScopeContext::new(&program.tree, &program.symbols, &interner, &config);

        let factory = ScopeFactory::new(16);
        let first = factory.chain_for_node(ctx, type_node, ScopeUsage::Normal);
        let second = factory.chain_for_node(ctx, type_node, ScopeUsage::Normal);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(factory.cached_chains(), 1);
    }

    #[test]
    fn test_cache_is_bounded() {
        let interner = Interner::new();
        let mut builder = ProgramBuilder::new(interner.clone(), FileId(0));
        let mut types = Vec::new();
        for name in ["A", "B", "C", "D"] {
            types.push(builder.open_type(name, TypeKind::Class).0);
            builder.close().unwrap();
        }
        let program = builder.finish().unwrap();
        let config = ScopeConfig::default();
        let ctx = ScopeContext::new(&program.tree, &program.symbols, &interner, &config);

        let factory = ScopeFactory::new(2);
        for &node in &types {
            factory.chain_for_node(ctx, node, ScopeUsage::Normal);
        }
        assert_eq!(factory.cached_chains(), 2);
    }

    #[test]
    fn test_catch_clause_flags() {
        let interner = Interner::new();
        let mut builder = ProgramBuilder::new(interner.clone(), FileId(0));
        builder.open_type("C", TypeKind::Class);
        builder.open_method("M", MethodKind::Ordinary);
        builder.open(SyntaxKind::Block, Role::Body);
        builder.open(SyntaxKind::TryStatement, Role::None);
        builder.open_catch(Some("error"));
        let filter = builder.leaf(SyntaxKind::OtherExpression, Role::Filter);
        let handler = builder.open(SyntaxKind::Block, Role::Body);
        for _ in 0..6 {
            builder.close().unwrap();
        }
        let program = builder.finish().unwrap();
        let config = ScopeConfig::default();
        let ctx = ScopeContext::new(&program.tree, &program.symbols, &interner, &config);

        let factory = ScopeFactory::default();
        let filter_chain = factory.chain_for_node(ctx, filter, ScopeUsage::Normal);
        assert!(filter_chain.flags().contains(BinderFlags::IN_CATCH_FILTER));
        let handler_chain = factory.chain_for_node(ctx, handler, ScopeUsage::Normal);
        assert!(handler_chain.flags().contains(BinderFlags::IN_CATCH_BLOCK));
        assert!(!handler_chain.flags().contains(BinderFlags::IN_CATCH_FILTER));
    }

    #[test]
    fn test_early_attribute_chains_are_separate() {
        let interner = Interner::new();
        let mut builder = ProgramBuilder::new(interner.clone(), FileId(0));
        builder.open_type("C", TypeKind::Class);
        let list = builder.open(SyntaxKind::AttributeList, Role::AttributeList);
        for _ in 0..2 {
            builder.close().unwrap();
        }
        let program = builder.finish().unwrap();
        let config = ScopeConfig::default();
        let ctx = ScopeContext::new(&program.tree, &program.symbols, &interner, &config);

        let factory = ScopeFactory::default();
        let normal = factory.chain_for_node(ctx, list, ScopeUsage::Normal);
        let early = factory.chain_for_node(ctx, list, ScopeUsage::EarlyAttribute);
        assert!(!normal.flags().contains(BinderFlags::EARLY_ATTRIBUTE_BINDING));
        assert!(early.flags().contains(BinderFlags::EARLY_ATTRIBUTE_BINDING));
        // Type attributes do not see the type's members.
        assert_eq!(labels(&normal)[1], "namespace");
    }
}
