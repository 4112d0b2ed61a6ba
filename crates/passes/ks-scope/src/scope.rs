//! Scope nodes and the chains they form

use crate::conflict;
use crate::context::ScopeContext;
use crate::declarations;
use crate::kinds;
use crate::lazy::ComputeOnce;
use crate::namespace::{DeclaredNamespace, ImportNamespace, RangeVariableMap};
use crate::options::BinderFlags;
use ks_symbols::SymbolId;
use ks_syntax::NodeId;
use rustc_hash::FxHashSet;
use std::fmt;
use std::iter;
use std::sync::Arc;

/// Shared handle to a scope node; chains share their outer links
pub type ScopeRef = Arc<Scope>;

/// What a scope node declares and how it answers lookups
#[derive(Debug, Clone)]
pub enum ScopeKind {
    /// End of every chain
    Root,
    /// Using directives and aliases of a compilation unit or namespace body
    Imports { declaration: NodeId },
    /// Members of a namespace, paired with the imports of `declaration`
    Namespace {
        namespace: SymbolId,
        declaration: NodeId,
    },
    /// Members of a type and its base types
    Type { ty: SymbolId },
    PrimaryConstructor { ty: SymbolId },
    ClassTypeParameters { ty: SymbolId },
    MethodTypeParameters { method: SymbolId },
    /// Type parameters introduced by a documentation reference
    CrefTypeParameters { cref: NodeId },
    /// Parameters of a member and variables of its expression body
    Parameters {
        member: SymbolId,
        declaration: NodeId,
    },
    Block { node: NodeId },
    /// A non-block statement in a body or else slot
    Embedded { node: NodeId },
    Loop { node: NodeId },
    /// `using`, `lock` and `fixed` statements
    Resource { node: NodeId },
    Catch { node: NodeId },
    Switch { node: NodeId },
    SwitchSection { node: NodeId },
    SwitchArm { node: NodeId },
    Lambda { lambda: SymbolId, node: NodeId },
    LocalFunction { function: SymbolId, node: NodeId },
    /// Range variables visible in one query clause
    Query {
        clause: NodeId,
        variables: Arc<RangeVariableMap>,
    },
    /// Declares nothing; carries changed flags, member or receiver
    Adjusted,
}

impl ScopeKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Imports { .. } => "imports",
            Self::Namespace { .. } => "namespace",
            Self::Type { .. } => "type",
            Self::PrimaryConstructor { .. } => "primary-constructor",
            Self::ClassTypeParameters { .. } => "class-type-parameters",
            Self::MethodTypeParameters { .. } => "method-type-parameters",
            Self::CrefTypeParameters { .. } => "cref-type-parameters",
            Self::Parameters { .. } => "parameters",
            Self::Block { .. } => "block",
            Self::Embedded { .. } => "embedded",
            Self::Loop { .. } => "loop",
            Self::Resource { .. } => "resource",
            Self::Catch { .. } => "catch",
            Self::Switch { .. } => "switch",
            Self::SwitchSection { .. } => "switch-section",
            Self::SwitchArm { .. } => "switch-arm",
            Self::Lambda { .. } => "lambda",
            Self::LocalFunction { .. } => "local-function",
            Self::Query { .. } => "query",
            Self::Adjusted => "adjusted",
        }
    }

    /// The syntax node whose declarations this scope owns
    pub fn designator(&self) -> Option<NodeId> {
        match *self {
            Self::Imports { declaration }
            | Self::Namespace { declaration, .. }
            | Self::Parameters { declaration, .. } => Some(declaration),
            Self::CrefTypeParameters { cref } => Some(cref),
            Self::Block { node }
            | Self::Embedded { node }
            | Self::Loop { node }
            | Self::Resource { node }
            | Self::Catch { node }
            | Self::Switch { node }
            | Self::SwitchSection { node }
            | Self::SwitchArm { node }
            | Self::Lambda { node, .. }
            | Self::LocalFunction { node, .. } => Some(node),
            Self::Query { clause, .. } => Some(clause),
            Self::Root
            | Self::Type { .. }
            | Self::PrimaryConstructor { .. }
            | Self::ClassTypeParameters { .. }
            | Self::MethodTypeParameters { .. }
            | Self::Adjusted => None,
        }
    }

    /// Scopes of statement bodies, which own locals and labels
    pub fn is_local_scope(&self) -> bool {
        matches!(
            self,
            Self::Block { .. }
                | Self::Embedded { .. }
                | Self::Loop { .. }
                | Self::Resource { .. }
                | Self::Catch { .. }
                | Self::Switch { .. }
                | Self::SwitchSection { .. }
                | Self::SwitchArm { .. }
        )
    }

    /// Parameters of a member, lambda or local function
    pub fn is_function_boundary(&self) -> bool {
        matches!(
            self,
            Self::Parameters { .. } | Self::Lambda { .. } | Self::LocalFunction { .. }
        )
    }

    /// Scopes whose declarations are type parameters
    pub fn is_type_parameter_scope(&self) -> bool {
        matches!(
            self,
            Self::ClassTypeParameters { .. }
                | Self::MethodTypeParameters { .. }
                | Self::CrefTypeParameters { .. }
        )
    }

    /// Scopes that lie outside every member body
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            Self::Root | Self::Imports { .. } | Self::Namespace { .. } | Self::Type { .. }
        )
    }

    fn member(&self) -> Option<SymbolId> {
        match *self {
            Self::Namespace { namespace, .. } => Some(namespace),
            Self::Type { ty } => Some(ty),
            Self::MethodTypeParameters { method } => Some(method),
            Self::Parameters { member, .. } => Some(member),
            Self::Lambda { lambda, .. } => Some(lambda),
            Self::LocalFunction { function, .. } => Some(function),
            _ => None,
        }
    }
}

/// One link of a scope chain.
///
/// A node answers lookups from its own declarations only; walking outwards is
/// the chain's business. Apart from write-once caches a node never changes
/// after construction, so chains are freely shared across threads.
pub struct Scope {
    kind: ScopeKind,
    next: Option<ScopeRef>,
    flags: BinderFlags,
    containing_member: Option<SymbolId>,
    conditional_receiver: Option<NodeId>,
    declared: ComputeOnce<DeclaredNamespace>,
    imports: ComputeOnce<ImportNamespace>,
    locked_or_disposed: ComputeOnce<FxHashSet<SymbolId>>,
}

impl Scope {
    /// The chain terminator
    pub fn root() -> ScopeRef {
        Arc::new(Self::with_parts(
            ScopeKind::Root,
            None,
            BinderFlags::empty(),
            None,
            None,
        ))
    }

    /// A node of `kind` inside `next`, inheriting its context
    pub fn new(kind: ScopeKind, next: &ScopeRef) -> ScopeRef {
        let containing_member = kind.member().or(next.containing_member);
        Arc::new(Self::with_parts(
            kind,
            Some(Arc::clone(next)),
            next.flags,
            containing_member,
            next.conditional_receiver,
        ))
    }

    fn with_parts(
        kind: ScopeKind,
        next: Option<ScopeRef>,
        flags: BinderFlags,
        containing_member: Option<SymbolId>,
        conditional_receiver: Option<NodeId>,
    ) -> Self {
        Self {
            kind,
            next,
            flags,
            containing_member,
            conditional_receiver,
            declared: ComputeOnce::new(),
            imports: ComputeOnce::new(),
            locked_or_disposed: ComputeOnce::new(),
        }
    }

    /// Same chain with `flags` added
    pub fn with_additional_flags(self: &Arc<Self>, flags: BinderFlags) -> ScopeRef {
        self.with_flags(self.flags | flags)
    }

    /// Same chain with exactly `flags`
    pub fn with_flags(self: &Arc<Self>, flags: BinderFlags) -> ScopeRef {
        if flags == self.flags {
            return Arc::clone(self);
        }
        Arc::new(Self::with_parts(
            ScopeKind::Adjusted,
            Some(Arc::clone(self)),
            flags,
            self.containing_member,
            self.conditional_receiver,
        ))
    }

    pub fn with_containing_member(self: &Arc<Self>, member: SymbolId) -> ScopeRef {
        if self.containing_member == Some(member) {
            return Arc::clone(self);
        }
        Arc::new(Self::with_parts(
            ScopeKind::Adjusted,
            Some(Arc::clone(self)),
            self.flags,
            Some(member),
            self.conditional_receiver,
        ))
    }

    /// Same chain inside the `?.` access whose receiver is `receiver`
    pub fn with_conditional_receiver(self: &Arc<Self>, receiver: NodeId) -> ScopeRef {
        Arc::new(Self::with_parts(
            ScopeKind::Adjusted,
            Some(Arc::clone(self)),
            self.flags,
            self.containing_member,
            Some(receiver),
        ))
    }

    pub fn kind(&self) -> &ScopeKind {
        &self.kind
    }

    pub fn next(&self) -> Option<&ScopeRef> {
        self.next.as_ref()
    }

    pub fn flags(&self) -> BinderFlags {
        self.flags
    }

    pub fn is_root(&self) -> bool {
        matches!(self.kind, ScopeKind::Root)
    }

    /// This node followed by every outer node, root last
    pub fn chain(&self) -> impl Iterator<Item = &Scope> + '_ {
        iter::successors(Some(self), |scope| scope.next.as_deref())
    }

    /// Number of nodes up to and including the root
    pub fn depth(&self) -> usize {
        self.chain().count()
    }

    /// Declarations owned by this node, computed on first use
    pub fn declared_namespace(&self, ctx: ScopeContext<'_>) -> &DeclaredNamespace {
        self.declared.get_or_compute(|| {
            let mut declared = declarations::declared_symbols(ctx, &self.kind);
            if self.kind.is_local_scope() {
                if let Some(outer) = self.next() {
                    // Rejected declarations are never found.
                    declared.retain(|&symbol| !conflict::overrides_parameter(ctx, outer, symbol));
                }
            }
            DeclaredNamespace::from_symbols(ctx.symbols, declared)
        })
    }

    /// Directives owned by an imports node; empty for every other kind
    pub fn import_namespace(&self, ctx: ScopeContext<'_>) -> &ImportNamespace {
        self.imports.get_or_compute(|| match self.kind {
            ScopeKind::Imports { declaration } => kinds::imports::import_namespace(ctx, declaration),
            _ => ImportNamespace::new(),
        })
    }

    /// Locals locked or disposed by enclosing resource statements
    pub(crate) fn locked_or_disposed_cache(&self) -> &ComputeOnce<FxHashSet<SymbolId>> {
        &self.locked_or_disposed
    }

    /// Innermost member, function or container this node is part of
    pub fn containing_member(&self) -> Option<SymbolId> {
        self.containing_member
    }

    /// Receiver of the innermost enclosing `?.` access, if any
    pub fn conditional_receiver(&self) -> Option<NodeId> {
        self.conditional_receiver
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kinds: Vec<&'static str> = self.chain().map(|scope| scope.kind.label()).collect();
        formatter
            .debug_struct("Scope")
            .field("chain", &kinds)
            .field("flags", &self.flags)
            .finish()
    }
}
