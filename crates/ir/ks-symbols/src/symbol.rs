//! Symbol definitions

use ks_intern::Name;
use ks_span::FileSpan;
use ks_syntax::NodeId;
use la_arena::Idx;

/// Identifier of a symbol in a [`crate::SymbolTable`]
pub type SymbolId = Idx<Symbol>;

/// The assembly a symbol was compiled into
#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct AssemblyId(pub u32);

/// Declared accessibility, most permissive first
#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq)]
pub enum Accessibility {
    #[default]
    Public,
    ProtectedInternal,
    Internal,
    Protected,
    PrivateProtected,
    Private,
}

#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub enum TypeKind {
    Class,
    Struct,
    Interface,
    Enum,
    Delegate,
    StaticClass,
}

#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub enum MethodKind {
    Ordinary,
    Constructor,
    Operator,
    Accessor,
    Lambda,
}

#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub enum SymbolKind {
    Namespace,
    NamedType(TypeKind),
    Method(MethodKind),
    Property,
    Field,
    Event,
    Local,
    Parameter,
    TypeParameter,
    Label,
    RangeVariable,
    LocalFunction,
    Alias,
    ExternAlias,
}

impl SymbolKind {
    pub const fn is_namespace(self) -> bool {
        matches!(self, Self::Namespace)
    }

    pub const fn is_type(self) -> bool {
        matches!(self, Self::NamedType(_) | Self::TypeParameter)
    }

    pub const fn is_namespace_or_type(self) -> bool {
        self.is_namespace() || self.is_type()
    }

    pub const fn is_method(self) -> bool {
        matches!(self, Self::Method(_) | Self::LocalFunction)
    }

    /// Symbols that live in a type or namespace member list
    pub const fn is_member(self) -> bool {
        matches!(
            self,
            Self::Namespace
                | Self::NamedType(_)
                | Self::Method(
                    MethodKind::Ordinary
                        | MethodKind::Constructor
                        | MethodKind::Operator
                        | MethodKind::Accessor
                )
                | Self::Property
                | Self::Field
                | Self::Event
        )
    }

    /// Kinds that can be instance or static
    pub const fn has_instance_state(self) -> bool {
        matches!(
            self,
            Self::Method(_) | Self::Property | Self::Field | Self::Event
        )
    }

    /// Locals, parameters and the other symbols declared inside a member body
    pub const fn is_local_like(self) -> bool {
        matches!(
            self,
            Self::Local
                | Self::Parameter
                | Self::Label
                | Self::RangeVariable
                | Self::LocalFunction
        )
    }
}

/// A declared entity
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: Name,
    pub kind: SymbolKind,
    pub accessibility: Accessibility,
    pub is_static: bool,
    /// Number of type parameters
    pub arity: u32,
    pub container: Option<SymbolId>,
    pub assembly: AssemblyId,
    /// Syntax that declares the symbol, when it comes from source
    pub declaring_node: Option<NodeId>,
    pub declared_at: Option<FileSpan>,
    /// Direct base class of a named type
    pub base_type: Option<SymbolId>,
    /// Interfaces a named type declares it implements or extends
    pub interfaces: Vec<SymbolId>,
    /// Constraint types of a type parameter
    pub constraints: Vec<SymbolId>,
    /// Target of an alias or extern alias
    pub alias_target: Option<SymbolId>,
    pub is_extension: bool,
    pub is_abstract: bool,
    /// Compiler-reserved name (accessors, operators) that cannot be referenced directly
    pub special_name: bool,
    /// Field, property or event whose type is a delegate
    pub delegate_typed: bool,
    /// Marks the root attribute base class
    pub is_attribute_base: bool,
}

impl Symbol {
    pub fn new(name: Name, kind: SymbolKind, container: Option<SymbolId>) -> Self {
        Self {
            name,
            kind,
            accessibility: Accessibility::Public,
            is_static: false,
            arity: 0,
            container,
            assembly: AssemblyId::default(),
            declaring_node: None,
            declared_at: None,
            base_type: None,
            interfaces: Vec::new(),
            constraints: Vec::new(),
            alias_target: None,
            is_extension: false,
            is_abstract: false,
            special_name: false,
            delegate_typed: false,
            is_attribute_base: false,
        }
    }

    #[must_use]
    pub fn with_accessibility(mut self, accessibility: Accessibility) -> Self {
        self.accessibility = accessibility;
        self
    }

    #[must_use]
    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    #[must_use]
    pub fn with_arity(mut self, arity: u32) -> Self {
        self.arity = arity;
        self
    }

    #[must_use]
    pub fn with_assembly(mut self, assembly: AssemblyId) -> Self {
        self.assembly = assembly;
        self
    }

    #[must_use]
    pub fn with_declaration(mut self, node: NodeId, at: FileSpan) -> Self {
        self.declaring_node = Some(node);
        self.declared_at = Some(at);
        self
    }

    #[must_use]
    pub fn with_base_type(mut self, base: SymbolId) -> Self {
        self.base_type = Some(base);
        self
    }

    #[must_use]
    pub fn with_interfaces(mut self, interfaces: impl IntoIterator<Item = SymbolId>) -> Self {
        self.interfaces = interfaces.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_alias_target(mut self, target: SymbolId) -> Self {
        self.alias_target = Some(target);
        self
    }

    pub fn is_interface(&self) -> bool {
        self.kind == SymbolKind::NamedType(TypeKind::Interface)
    }

    pub fn is_generic(&self) -> bool {
        self.arity > 0
    }

    /// Instance members of types; locals and types are never instance members
    pub fn is_instance_member(&self) -> bool {
        self.kind.has_instance_state() && !self.is_static
    }

    /// Methods, and delegate-typed fields, properties and events
    pub fn is_invocable(&self) -> bool {
        match self.kind {
            SymbolKind::Method(_) | SymbolKind::LocalFunction => true,
            SymbolKind::Field | SymbolKind::Property | SymbolKind::Event => self.delegate_typed,
            _ => false,
        }
    }
}
