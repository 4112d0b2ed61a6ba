//! Symbol table and accessibility

use crate::symbol::{Accessibility, AssemblyId, Symbol, SymbolId, SymbolKind};
use ks_intern::Name;
use ks_syntax::NodeId;
use la_arena::Arena;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use std::iter;

/// Where an access happens, for accessibility checks
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct AccessContext {
    /// Assembly being compiled
    pub assembly: AssemblyId,
    /// Innermost type enclosing the access, if any
    pub within_type: Option<SymbolId>,
}

/// All symbols of a program with the indexes lookup needs
#[derive(Debug, Clone)]
pub struct SymbolTable {
    symbols: Arena<Symbol>,
    global_namespace: SymbolId,
    members: FxHashMap<(SymbolId, Name), SmallVec<[SymbolId; 1]>>,
    members_in_order: FxHashMap<SymbolId, Vec<SymbolId>>,
    type_parameters: FxHashMap<SymbolId, Vec<SymbolId>>,
    parameters: FxHashMap<SymbolId, Vec<SymbolId>>,
    declared: FxHashMap<NodeId, SymbolId>,
    import_targets: FxHashMap<NodeId, SymbolId>,
}

impl SymbolTable {
    /// Create a table holding only the global namespace, named `global_name`
    pub fn new(global_name: Name) -> Self {
        let mut symbols = Arena::new();
        let global_namespace = symbols.alloc(Symbol::new(global_name, SymbolKind::Namespace, None));
        Self {
            symbols,
            global_namespace,
            members: FxHashMap::default(),
            members_in_order: FxHashMap::default(),
            type_parameters: FxHashMap::default(),
            parameters: FxHashMap::default(),
            declared: FxHashMap::default(),
            import_targets: FxHashMap::default(),
        }
    }

    pub fn global_namespace(&self) -> SymbolId {
        self.global_namespace
    }

    /// Register a symbol and index it by container, kind and declaring node
    pub fn add(&mut self, symbol: Symbol) -> SymbolId {
        let kind = symbol.kind;
        let name = symbol.name;
        let container = symbol.container;
        let node = symbol.declaring_node;
        let id = self.symbols.alloc(symbol);

        if let Some(container) = container {
            match kind {
                SymbolKind::TypeParameter => {
                    self.type_parameters.entry(container).or_default().push(id);
                }
                SymbolKind::Parameter => {
                    self.parameters.entry(container).or_default().push(id);
                }
                _ if kind.is_member() => {
                    self.members.entry((container, name)).or_default().push(id);
                    self.members_in_order.entry(container).or_default().push(id);
                }
                _ => {}
            }
        }
        if let Some(node) = node {
            self.declared.insert(node, id);
        }
        id
    }

    /// Associate a declaration with a symbol it does not create, as each
    /// declaration of a namespace does
    pub fn set_declared_symbol(&mut self, node: NodeId, symbol: SymbolId) {
        self.declared.insert(node, symbol);
    }

    /// Record the namespace or type a using directive refers to
    pub fn set_import_target(&mut self, directive: NodeId, target: SymbolId) {
        self.import_targets.insert(directive, target);
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id]
    }

    pub fn symbol_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id]
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> + '_ {
        self.symbols.iter()
    }

    pub fn name(&self, id: SymbolId) -> Name {
        self.symbols[id].name
    }

    pub fn kind(&self, id: SymbolId) -> SymbolKind {
        self.symbols[id].kind
    }

    /// Members of `container` named `name`, in declaration order
    pub fn members(&self, container: SymbolId, name: Name) -> &[SymbolId] {
        self.members
            .get(&(container, name))
            .map_or(&[], |found| found.as_slice())
    }

    /// All members of `container`, in declaration order
    pub fn members_of(&self, container: SymbolId) -> &[SymbolId] {
        self.members_in_order
            .get(&container)
            .map_or(&[], Vec::as_slice)
    }

    pub fn type_parameters_of(&self, owner: SymbolId) -> &[SymbolId] {
        self.type_parameters.get(&owner).map_or(&[], Vec::as_slice)
    }

    pub fn parameters_of(&self, owner: SymbolId) -> &[SymbolId] {
        self.parameters.get(&owner).map_or(&[], Vec::as_slice)
    }

    /// Symbol declared by a syntax node
    pub fn declared_symbol(&self, node: NodeId) -> Option<SymbolId> {
        self.declared.get(&node).copied()
    }

    /// Namespace or type named by a using directive
    pub fn import_target(&self, directive: NodeId) -> Option<SymbolId> {
        self.import_targets.get(&directive).copied()
    }

    /// Follow an alias to its target; any other symbol is returned as is
    pub fn unwrap_alias(&self, id: SymbolId) -> SymbolId {
        let symbol = &self.symbols[id];
        match (symbol.kind, symbol.alias_target) {
            (SymbolKind::Alias | SymbolKind::ExternAlias, Some(target)) => target,
            _ => id,
        }
    }

    /// Nearest named type containing `id`, excluding `id` itself
    pub fn containing_type(&self, id: SymbolId) -> Option<SymbolId> {
        let mut current = self.symbols[id].container;
        while let Some(candidate) = current {
            if matches!(self.symbols[candidate].kind, SymbolKind::NamedType(_)) {
                return Some(candidate);
            }
            current = self.symbols[candidate].container;
        }
        None
    }

    /// `ty` followed by its base classes, most derived first
    pub fn base_types(&self, ty: SymbolId) -> impl Iterator<Item = SymbolId> + '_ {
        iter::successors(Some(ty), |&current| self.symbols[current].base_type)
    }

    /// Whether `ty` is `base` or derives from it
    pub fn is_derived_from(&self, ty: SymbolId, base: SymbolId) -> bool {
        self.base_types(ty).any(|candidate| candidate == base)
    }

    /// Every interface `ty` implements or extends, directly or through other
    /// interfaces, each once. An interface comes before its own bases.
    pub fn all_interfaces(&self, ty: SymbolId) -> Vec<SymbolId> {
        let mut visited = FxHashSet::default();
        let mut ordered = Vec::new();
        for &interface in self.symbols[ty].interfaces.iter().rev() {
            self.collect_interfaces(interface, &mut visited, &mut ordered);
        }
        ordered.reverse();
        ordered
    }

    /// Bases are pushed before the interface itself; the caller reverses
    fn collect_interfaces(
        &self,
        interface: SymbolId,
        visited: &mut FxHashSet<SymbolId>,
        ordered: &mut Vec<SymbolId>,
    ) {
        if !self.symbols[interface].is_interface() || !visited.insert(interface) {
            return;
        }
        for &base in self.symbols[interface].interfaces.iter().rev() {
            self.collect_interfaces(base, visited, ordered);
        }
        ordered.push(interface);
    }

    /// Whether `derived` inherits from `base` through its base classes or,
    /// when `base` is an interface, through its interfaces. A type does not
    /// inherit from itself.
    pub fn inherits_from(&self, derived: SymbolId, base: SymbolId) -> bool {
        self.base_types(derived).skip(1).any(|candidate| candidate == base)
            || (self.symbols[base].is_interface() && self.all_interfaces(derived).contains(&base))
    }

    /// Class constraint of a type parameter, also reached through type
    /// parameters it is constrained to
    pub fn effective_base_class(&self, type_parameter: SymbolId) -> Option<SymbolId> {
        let mut visited = FxHashSet::default();
        let mut pending = vec![type_parameter];
        while let Some(current) = pending.pop() {
            if !visited.insert(current) {
                continue;
            }
            for &constraint in &self.symbols[current].constraints {
                match self.symbols[constraint].kind {
                    SymbolKind::TypeParameter => pending.push(constraint),
                    SymbolKind::NamedType(_) if !self.symbols[constraint].is_interface() => {
                        return Some(constraint);
                    }
                    _ => {}
                }
            }
        }
        None
    }

    /// Interface constraints of a type parameter with all their bases, also
    /// reached through type parameters it is constrained to
    pub fn effective_interfaces(&self, type_parameter: SymbolId) -> Vec<SymbolId> {
        let mut visited_parameters = FxHashSet::default();
        let mut pending = vec![type_parameter];
        let mut interfaces = Vec::new();
        while let Some(current) = pending.pop() {
            if !visited_parameters.insert(current) {
                continue;
            }
            for &constraint in &self.symbols[current].constraints {
                let declared = &self.symbols[constraint];
                if declared.kind == SymbolKind::TypeParameter {
                    pending.push(constraint);
                } else if declared.is_interface() {
                    let closure = iter::once(constraint).chain(self.all_interfaces(constraint));
                    for interface in closure {
                        if !interfaces.contains(&interface) {
                            interfaces.push(interface);
                        }
                    }
                }
            }
        }
        interfaces
    }

    /// Whether `ty` is `outer` or nested, at any depth, inside it
    pub fn is_nested_in(&self, ty: SymbolId, outer: SymbolId) -> bool {
        iter::successors(Some(ty), |&current| self.containing_type(current))
            .any(|candidate| candidate == outer)
    }

    /// Whether a named type derives from the attribute base class
    pub fn is_attribute_type(&self, ty: SymbolId) -> bool {
        matches!(self.symbols[ty].kind, SymbolKind::NamedType(_))
            && self
                .base_types(ty)
                .any(|candidate| self.symbols[candidate].is_attribute_base)
    }

    /// Whether `id` may be referenced from `context`.
    ///
    /// `through_type` is the type of the receiver of a member access, used to
    /// restrict protected instance access to receivers derived from the
    /// accessing type.
    pub fn is_accessible(
        &self,
        id: SymbolId,
        context: AccessContext,
        through_type: Option<SymbolId>,
    ) -> bool {
        let symbol = &self.symbols[id];
        match symbol.kind {
            SymbolKind::NamedType(_)
            | SymbolKind::Method(_)
            | SymbolKind::Property
            | SymbolKind::Field
            | SymbolKind::Event => {}
            // Namespaces are always public; everything else is lexically scoped.
            _ => return true,
        }

        let container_type = symbol
            .container
            .filter(|&container| matches!(self.symbols[container].kind, SymbolKind::NamedType(_)));

        let Some(container_type) = container_type else {
            // Top-level types are either public or internal.
            return match symbol.accessibility {
                Accessibility::Public | Accessibility::ProtectedInternal => true,
                _ => symbol.assembly == context.assembly,
            };
        };

        if !self.is_accessible(container_type, context, None) {
            return false;
        }

        let same_assembly = symbol.assembly == context.assembly;
        match symbol.accessibility {
            Accessibility::Public => true,
            Accessibility::Internal => same_assembly,
            Accessibility::Private => context
                .within_type
                .is_some_and(|within| self.is_nested_in(within, container_type)),
            Accessibility::Protected => {
                self.is_protected_accessible(symbol, container_type, context, through_type)
            }
            Accessibility::ProtectedInternal => {
                same_assembly
                    || self.is_protected_accessible(symbol, container_type, context, through_type)
            }
            Accessibility::PrivateProtected => {
                same_assembly
                    && self.is_protected_accessible(symbol, container_type, context, through_type)
            }
        }
    }

    fn is_protected_accessible(
        &self,
        symbol: &Symbol,
        container_type: SymbolId,
        context: AccessContext,
        through_type: Option<SymbolId>,
    ) -> bool {
        let Some(within) = context.within_type else {
            return false;
        };
        iter::successors(Some(within), |&current| self.containing_type(current)).any(
            |enclosing| {
                self.is_derived_from(enclosing, container_type)
                    && (!symbol.is_instance_member()
                        || through_type
                            .is_none_or(|through| self.is_derived_from(through, enclosing)))
            },
        )
    }
}
