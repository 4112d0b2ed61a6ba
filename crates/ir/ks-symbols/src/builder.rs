//! Builds a syntax tree and its symbol table together

use crate::symbol::{AssemblyId, MethodKind, Symbol, SymbolId, SymbolKind, TypeKind};
use crate::table::SymbolTable;
use ks_intern::{Interner, Name};
use ks_span::{FileId, FileSpan, Span};
use ks_syntax::{Modifiers, NodeId, Role, SyntaxError, SyntaxKind, SyntaxTree, SyntaxTreeBuilder};

/// A finished tree and the symbols it declares
#[derive(Debug, Clone)]
pub struct Program {
    pub tree: SyntaxTree,
    pub symbols: SymbolTable,
}

/// Declares symbols while it builds syntax.
///
/// Declarations opened with `open_*` become the container of symbols declared
/// until they are closed. Every node, declaration or not, is closed with
/// [`close`](Self::close).
#[derive(Debug)]
pub struct ProgramBuilder {
    interner: Interner,
    syntax: SyntaxTreeBuilder,
    symbols: SymbolTable,
    containers: Vec<(NodeId, SymbolId)>,
    file: FileId,
    assembly: AssemblyId,
}

impl ProgramBuilder {
    /// Start a program whose compilation unit is already open
    pub fn new(interner: Interner, file: FileId) -> Self {
        let mut syntax = SyntaxTreeBuilder::new(file);
        let mut symbols = SymbolTable::new(interner.intern("<global>"));
        let unit = syntax.open(SyntaxKind::CompilationUnit, Role::None, None);
        let global = symbols.global_namespace();
        symbols.set_declared_symbol(unit, global);
        Self {
            interner,
            syntax,
            symbols,
            containers: vec![(unit, global)],
            file,
            assembly: AssemblyId::default(),
        }
    }

    /// Assembly assigned to symbols declared from here on
    #[must_use]
    pub fn with_assembly(mut self, assembly: AssemblyId) -> Self {
        self.assembly = assembly;
        self
    }

    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    pub fn name(&self, text: &str) -> Name {
        self.interner.intern(text)
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn symbols_mut(&mut self) -> &mut SymbolTable {
        &mut self.symbols
    }

    pub fn global_namespace(&self) -> SymbolId {
        self.symbols.global_namespace()
    }

    /// Symbol that receives declarations right now
    pub fn container(&self) -> SymbolId {
        self.containers
            .last()
            .map_or_else(|| self.symbols.global_namespace(), |&(_, symbol)| symbol)
    }

    /// Innermost open node
    pub fn current(&self) -> Option<NodeId> {
        self.syntax.current()
    }

    // Plain syntax

    pub fn open(&mut self, kind: SyntaxKind, role: Role) -> NodeId {
        self.syntax.open(kind, role, None)
    }

    pub fn leaf(&mut self, kind: SyntaxKind, role: Role) -> NodeId {
        self.syntax.leaf(kind, role, None)
    }

    /// A simple name reference
    pub fn identifier(&mut self, role: Role, text: &str) -> NodeId {
        let name = self.name(text);
        self.syntax.leaf(SyntaxKind::IdentifierName, role, Some(name))
    }

    pub fn set_modifiers(&mut self, node: NodeId, modifiers: Modifiers) {
        self.syntax.set_modifiers(node, modifiers);
        if let Some(symbol) = self.symbols.declared_symbol(node) {
            self.symbols.symbol_mut(symbol).is_abstract = modifiers.contains(Modifiers::ABSTRACT);
        }
    }

    /// Close the innermost open node, ending its declaration if it has one
    ///
    /// # Errors
    ///
    /// Fails when no node is open.
    pub fn close(&mut self) -> Result<NodeId, SyntaxError> {
        let node = self.syntax.close()?;
        if self.containers.last().is_some_and(|&(open, _)| open == node) {
            self.containers.pop();
        }
        Ok(node)
    }

    /// Close the compilation unit and finish the program
    ///
    /// # Errors
    ///
    /// Fails when declarations other than the compilation unit are still open.
    pub fn finish(mut self) -> Result<Program, SyntaxError> {
        if self.containers.len() == 1 {
            self.close()?;
        }
        Ok(Program {
            tree: self.syntax.finish()?,
            symbols: self.symbols,
        })
    }

    // Declarations

    /// Open a namespace declaration, reusing the namespace symbol when the
    /// container already has one of that name.
    pub fn open_namespace(&mut self, text: &str) -> (NodeId, SymbolId) {
        let name = self.name(text);
        let node = self
            .syntax
            .open(SyntaxKind::NamespaceDeclaration, Role::Member, Some(name));
        let symbol = self.namespace_symbol(self.container(), name);
        self.symbols.set_declared_symbol(node, symbol);
        self.containers.push((node, symbol));
        (node, symbol)
    }

    /// Open a type declaration
    pub fn open_type(&mut self, text: &str, kind: TypeKind) -> (NodeId, SymbolId) {
        let (node, symbol) = self.open_declaration(
            SyntaxKind::TypeDeclaration,
            Role::Member,
            text,
            SymbolKind::NamedType(kind),
        );
        if kind == TypeKind::StaticClass {
            self.symbols.symbol_mut(symbol).is_static = true;
            self.syntax.set_modifiers(node, Modifiers::STATIC);
        }
        (node, symbol)
    }

    /// Open a method, constructor or operator declaration
    pub fn open_method(&mut self, text: &str, kind: MethodKind) -> (NodeId, SymbolId) {
        let syntax_kind = match kind {
            MethodKind::Constructor => SyntaxKind::ConstructorDeclaration,
            MethodKind::Operator => SyntaxKind::OperatorDeclaration,
            MethodKind::Accessor => SyntaxKind::AccessorDeclaration,
            MethodKind::Ordinary | MethodKind::Lambda => SyntaxKind::MethodDeclaration,
        };
        let (node, symbol) =
            self.open_declaration(syntax_kind, Role::Member, text, SymbolKind::Method(kind));
        if matches!(kind, MethodKind::Operator | MethodKind::Accessor) {
            self.symbols.symbol_mut(symbol).special_name = true;
        }
        (node, symbol)
    }

    /// Open a field declaration; an initializer may follow before closing
    pub fn open_field(&mut self, text: &str) -> (NodeId, SymbolId) {
        self.open_declaration(SyntaxKind::FieldDeclaration, Role::Member, text, SymbolKind::Field)
    }

    /// A field without initializer
    pub fn field(&mut self, text: &str) -> SymbolId {
        self.member_leaf(SyntaxKind::FieldDeclaration, text, SymbolKind::Field)
    }

    pub fn property(&mut self, text: &str) -> SymbolId {
        self.member_leaf(SyntaxKind::PropertyDeclaration, text, SymbolKind::Property)
    }

    /// Mark a declared symbol static, on both the symbol and its syntax
    pub fn make_static(&mut self, symbol: SymbolId) {
        let declaration = self.symbols.symbol_mut(symbol);
        declaration.is_static = true;
        if let Some(node) = declaration.declaring_node {
            self.syntax.set_modifiers(node, Modifiers::STATIC);
        }
    }

    /// Record that `ty` implements, or for an interface extends, `interface`
    pub fn implement(&mut self, ty: SymbolId, interface: SymbolId) {
        let interfaces = &mut self.symbols.symbol_mut(ty).interfaces;
        if !interfaces.contains(&interface) {
            interfaces.push(interface);
        }
    }

    /// Add a `where` constraint to a type parameter
    pub fn constrain(&mut self, type_parameter: SymbolId, constraint: SymbolId) {
        self.symbols
            .symbol_mut(type_parameter)
            .constraints
            .push(constraint);
    }

    /// A type parameter of the current declaration; bumps its arity
    pub fn type_parameter(&mut self, text: &str) -> SymbolId {
        let owner = self.container();
        let symbol = self.declare_leaf(
            SyntaxKind::TypeParameter,
            Role::TypeParameter,
            text,
            SymbolKind::TypeParameter,
        );
        self.symbols.symbol_mut(owner).arity += 1;
        symbol
    }

    /// A parameter of the current method, lambda, local function or primary constructor
    pub fn parameter(&mut self, text: &str) -> SymbolId {
        self.declare_leaf(SyntaxKind::Parameter, Role::Parameter, text, SymbolKind::Parameter)
    }

    /// Open a parameter so a default value can be added
    pub fn open_parameter(&mut self, text: &str) -> (NodeId, SymbolId) {
        let name = self.name(text);
        let node = self.syntax.open(SyntaxKind::Parameter, Role::Parameter, Some(name));
        let symbol = self.declare(node, name, SymbolKind::Parameter);
        (node, symbol)
    }

    /// Open a lambda; it owns the parameters declared until it is closed
    pub fn open_lambda(&mut self, role: Role) -> (NodeId, SymbolId) {
        let name = self.name("<lambda>");
        let node = self.syntax.open(SyntaxKind::LambdaExpression, role, None);
        let symbol = self.declare(node, name, SymbolKind::Method(MethodKind::Lambda));
        self.containers.push((node, symbol));
        (node, symbol)
    }

    pub fn open_local_function(&mut self, text: &str) -> (NodeId, SymbolId) {
        self.open_declaration(
            SyntaxKind::LocalFunctionStatement,
            Role::None,
            text,
            SymbolKind::LocalFunction,
        )
    }

    /// `var text;` as a statement of the current block
    pub fn local(&mut self, text: &str) -> SymbolId {
        let declaration = self.syntax.open(SyntaxKind::LocalDeclaration, Role::None, None);
        let symbol = self.declarator(text);
        self.finish_node(declaration);
        symbol
    }

    /// Open a local declaration statement; add declarators, then close
    pub fn open_local_declaration(&mut self, role: Role) -> NodeId {
        self.syntax.open(SyntaxKind::LocalDeclaration, role, None)
    }

    /// A variable declarator inside the current local declaration
    pub fn declarator(&mut self, text: &str) -> SymbolId {
        self.declare_leaf(
            SyntaxKind::VariableDeclarator,
            Role::None,
            text,
            SymbolKind::Local,
        )
    }

    /// Open a variable declarator so an initializer can follow
    pub fn open_declarator(&mut self, text: &str) -> (NodeId, SymbolId) {
        let name = self.name(text);
        let node = self
            .syntax
            .open(SyntaxKind::VariableDeclarator, Role::None, Some(name));
        let symbol = self.declare(node, name, SymbolKind::Local);
        (node, symbol)
    }

    /// A pattern or `out` variable designation
    pub fn designation(&mut self, text: &str) -> SymbolId {
        self.declare_leaf(
            SyntaxKind::SingleVariableDesignation,
            Role::None,
            text,
            SymbolKind::Local,
        )
    }

    /// `text: ;` as a statement of the current block
    pub fn label(&mut self, text: &str) -> SymbolId {
        let (node, symbol) = self.open_label(text);
        self.syntax.leaf(SyntaxKind::EmptyStatement, Role::None, None);
        self.finish_node(node);
        symbol
    }

    /// Open a labeled statement; its inner statement follows
    pub fn open_label(&mut self, text: &str) -> (NodeId, SymbolId) {
        let name = self.name(text);
        let node = self
            .syntax
            .open(SyntaxKind::LabeledStatement, Role::None, Some(name));
        let symbol = self.declare(node, name, SymbolKind::Label);
        (node, symbol)
    }

    /// Open a `foreach` with its iteration variable already declared
    pub fn open_foreach(&mut self, role: Role, variable: &str) -> (NodeId, SymbolId) {
        let node = self.syntax.open(SyntaxKind::ForEachStatement, role, None);
        let symbol = self.declare_leaf(
            SyntaxKind::VariableDeclarator,
            Role::Initializer,
            variable,
            SymbolKind::Local,
        );
        (node, symbol)
    }

    /// Open a catch clause, optionally declaring the exception variable
    pub fn open_catch(&mut self, variable: Option<&str>) -> (NodeId, Option<SymbolId>) {
        let node = self.syntax.open(SyntaxKind::CatchClause, Role::None, None);
        let symbol = variable.map(|text| {
            self.declare_leaf(
                SyntaxKind::CatchDeclaration,
                Role::None,
                text,
                SymbolKind::Local,
            )
        });
        (node, symbol)
    }

    /// Open a query clause, declaring a range variable when one is named
    pub fn open_clause(
        &mut self,
        kind: SyntaxKind,
        variable: Option<&str>,
    ) -> (NodeId, Option<SymbolId>) {
        let name = variable.map(|text| self.name(text));
        let node = self.syntax.open(kind, Role::None, name);
        let symbol = name.map(|name| self.declare(node, name, SymbolKind::RangeVariable));
        (node, symbol)
    }

    // Imports

    pub fn using_namespace(&mut self, target: SymbolId) -> NodeId {
        let node = self
            .syntax
            .leaf(SyntaxKind::UsingNamespaceDirective, Role::None, None);
        self.symbols.set_import_target(node, target);
        node
    }

    pub fn using_static(&mut self, target: SymbolId) -> NodeId {
        let node = self
            .syntax
            .leaf(SyntaxKind::UsingStaticDirective, Role::None, None);
        self.symbols.set_import_target(node, target);
        node
    }

    pub fn using_alias(&mut self, text: &str, target: SymbolId) -> SymbolId {
        self.alias(SyntaxKind::UsingAliasDirective, SymbolKind::Alias, text, target)
    }

    pub fn extern_alias(&mut self, text: &str, target: SymbolId) -> SymbolId {
        self.alias(
            SyntaxKind::ExternAliasDirective,
            SymbolKind::ExternAlias,
            text,
            target,
        )
    }

    // Symbols without syntax

    /// Find or create the namespace `name` inside `container`
    pub fn namespace_symbol(&mut self, container: SymbolId, name: Name) -> SymbolId {
        let existing = self
            .symbols
            .members(container, name)
            .iter()
            .copied()
            .find(|&member| self.symbols.kind(member).is_namespace());
        existing.unwrap_or_else(|| {
            self.symbols.add(
                Symbol::new(name, SymbolKind::Namespace, Some(container))
                    .with_assembly(self.assembly),
            )
        })
    }

    /// A referenced symbol that has no syntax in this program
    pub fn external(&mut self, container: SymbolId, text: &str, kind: SymbolKind) -> SymbolId {
        let name = self.name(text);
        self.symbols
            .add(Symbol::new(name, kind, Some(container)).with_assembly(self.assembly))
    }

    fn open_declaration(
        &mut self,
        kind: SyntaxKind,
        role: Role,
        text: &str,
        symbol_kind: SymbolKind,
    ) -> (NodeId, SymbolId) {
        let name = self.name(text);
        let node = self.syntax.open(kind, role, Some(name));
        let symbol = self.declare(node, name, symbol_kind);
        self.containers.push((node, symbol));
        (node, symbol)
    }

    fn member_leaf(&mut self, kind: SyntaxKind, text: &str, symbol_kind: SymbolKind) -> SymbolId {
        self.declare_leaf(kind, Role::Member, text, symbol_kind)
    }

    fn declare_leaf(
        &mut self,
        kind: SyntaxKind,
        role: Role,
        text: &str,
        symbol_kind: SymbolKind,
    ) -> SymbolId {
        let name = self.name(text);
        let node = self.syntax.leaf(kind, role, Some(name));
        self.declare(node, name, symbol_kind)
    }

    fn alias(
        &mut self,
        kind: SyntaxKind,
        symbol_kind: SymbolKind,
        text: &str,
        target: SymbolId,
    ) -> SymbolId {
        let name = self.name(text);
        let node = self.syntax.leaf(kind, Role::None, Some(name));
        self.symbols.set_import_target(node, target);
        let symbol = Symbol::new(name, symbol_kind, Some(self.container()))
            .with_alias_target(target)
            .with_assembly(self.assembly);
        let symbol = self.located(symbol, node);
        self.symbols.add(symbol)
    }

    fn declare(&mut self, node: NodeId, name: Name, kind: SymbolKind) -> SymbolId {
        let symbol = Symbol::new(name, kind, Some(self.container())).with_assembly(self.assembly);
        let symbol = self.located(symbol, node);
        self.symbols.add(symbol)
    }

    fn located(&self, symbol: Symbol, node: NodeId) -> Symbol {
        // Spans of open nodes are finalized on close; the start is enough to locate them.
        let at = FileSpan::new(self.file, Span::empty_at(self.syntax.start_of(node)));
        symbol.with_declaration(node, at)
    }

    fn finish_node(&mut self, expected: NodeId) {
        // The node was opened just above, so the close cannot be unbalanced.
        if self.syntax.current() == Some(expected) {
            if let Ok(closed) = self.close() {
                debug_assert_eq!(closed, expected);
            }
        }
    }
}
