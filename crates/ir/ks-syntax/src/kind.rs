//! Node kinds, child roles and declaration modifiers

use bitflags::bitflags;

/// Kind of a syntax node.
///
/// Only the distinctions that matter for scope construction are kept; any
/// other expression or statement is represented by the `Other*` kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    // Top level
    CompilationUnit,
    NamespaceDeclaration,
    ExternAliasDirective,
    UsingAliasDirective,
    UsingNamespaceDirective,
    UsingStaticDirective,

    // Declarations
    TypeDeclaration,
    BaseList,
    TypeParameter,
    MethodDeclaration,
    ConstructorDeclaration,
    OperatorDeclaration,
    PropertyDeclaration,
    AccessorDeclaration,
    FieldDeclaration,
    Parameter,
    TypeReference,
    AttributeList,
    Attribute,
    DocumentationCref,

    // Statements
    Block,
    LocalDeclaration,
    VariableDeclarator,
    LocalFunctionStatement,
    LabeledStatement,
    ExpressionStatement,
    ReturnStatement,
    IfStatement,
    WhileStatement,
    DoStatement,
    ForStatement,
    ForEachStatement,
    UsingStatement,
    LockStatement,
    FixedStatement,
    TryStatement,
    CatchClause,
    CatchDeclaration,
    FinallyClause,
    SwitchStatement,
    SwitchSection,
    CaseLabel,
    BreakStatement,
    ContinueStatement,
    GotoStatement,
    UnsafeStatement,
    CheckedStatement,
    UncheckedStatement,
    EmptyStatement,

    // Expressions
    SwitchExpression,
    SwitchExpressionArm,
    LambdaExpression,
    QueryExpression,
    FromClause,
    LetClause,
    WhereClause,
    JoinClause,
    OrderByClause,
    SelectClause,
    GroupClause,
    QueryContinuation,
    ConditionalAccessExpression,
    CheckedExpression,
    UncheckedExpression,
    IsPatternExpression,
    SingleVariableDesignation,
    IdentifierName,
    InvocationExpression,
    MemberAccessExpression,
    LiteralExpression,
    OtherExpression,
}

impl SyntaxKind {
    pub const fn is_statement(self) -> bool {
        matches!(
            self,
            Self::Block
                | Self::LocalDeclaration
                | Self::LocalFunctionStatement
                | Self::LabeledStatement
                | Self::ExpressionStatement
                | Self::ReturnStatement
                | Self::IfStatement
                | Self::WhileStatement
                | Self::DoStatement
                | Self::ForStatement
                | Self::ForEachStatement
                | Self::UsingStatement
                | Self::LockStatement
                | Self::FixedStatement
                | Self::TryStatement
                | Self::SwitchStatement
                | Self::BreakStatement
                | Self::ContinueStatement
                | Self::GotoStatement
                | Self::UnsafeStatement
                | Self::CheckedStatement
                | Self::UncheckedStatement
                | Self::EmptyStatement
        )
    }

    pub const fn is_loop(self) -> bool {
        matches!(
            self,
            Self::WhileStatement | Self::DoStatement | Self::ForStatement | Self::ForEachStatement
        )
    }

    pub const fn is_resource_statement(self) -> bool {
        matches!(
            self,
            Self::UsingStatement | Self::LockStatement | Self::FixedStatement
        )
    }

    pub const fn is_query_clause(self) -> bool {
        matches!(
            self,
            Self::FromClause
                | Self::LetClause
                | Self::WhereClause
                | Self::JoinClause
                | Self::OrderByClause
                | Self::SelectClause
                | Self::GroupClause
                | Self::QueryContinuation
        )
    }

    /// Declarations whose body is bound as one unit (a "member body").
    pub const fn is_member_with_body(self) -> bool {
        matches!(
            self,
            Self::MethodDeclaration
                | Self::ConstructorDeclaration
                | Self::OperatorDeclaration
                | Self::AccessorDeclaration
                | Self::FieldDeclaration
        )
    }

    /// Directives that may appear in a compilation unit or namespace body.
    pub const fn is_import_directive(self) -> bool {
        matches!(
            self,
            Self::ExternAliasDirective
                | Self::UsingAliasDirective
                | Self::UsingNamespaceDirective
                | Self::UsingStaticDirective
        )
    }

    /// Nested functions get their own parameter scope and are excluded from
    /// the declarations of the enclosing block.
    pub const fn is_nested_function(self) -> bool {
        matches!(self, Self::LambdaExpression | Self::LocalFunctionStatement)
    }
}

/// The slot a child occupies in its parent.
///
/// Roles let the scope factory tell a loop header from a loop body, or a base
/// list from a type body, without depending on child order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Role {
    #[default]
    None,
    Condition,
    Body,
    Else,
    Initializer,
    Incrementor,
    Resource,
    Expression,
    Filter,
    Label,
    WhenClause,
    BaseList,
    TypeParameter,
    Parameter,
    ReturnType,
    AttributeList,
    Receiver,
    WhenNotNull,
    /// Key of the joined sequence in a join clause
    InnerKey,
    Member,
}

impl Role {
    /// Slots that hold an embedded statement of a compound statement
    pub const fn is_embedded_slot(self) -> bool {
        matches!(self, Self::Body | Self::Else)
    }

    /// Slots of a declaration that are bound outside the declaration's body
    pub const fn is_signature_slot(self) -> bool {
        matches!(
            self,
            Self::BaseList | Self::TypeParameter | Self::ReturnType | Self::AttributeList
        )
    }
}

bitflags! {
    /// Declaration modifiers relevant to scope construction
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u16 {
        const STATIC = 1 << 0;
        const UNSAFE = 1 << 1;
        const ASYNC = 1 << 2;
        const ABSTRACT = 1 << 3;
        const READONLY = 1 << 4;
        const REF = 1 << 5;
        const SCOPED = 1 << 6;
        const PARTIAL = 1 << 7;
    }
}
