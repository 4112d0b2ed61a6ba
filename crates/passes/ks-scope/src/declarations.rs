//! Which declarations each scope node owns.
//!
//! Every declaration belongs to exactly one scope node. Variables declared
//! inside expressions (`out var x`, `is T x`) belong to the innermost
//! statement-level scope around the expression, except inside nested
//! functions, query clauses and switch-expression arms, which own theirs.

use crate::context::ScopeContext;
use crate::scope::ScopeKind;
use ks_symbols::SymbolId;
use ks_syntax::{NodeId, Role, SyntaxKind};

/// Declarations owned by a node of `kind`, in declaration order
pub(crate) fn declared_symbols(ctx: ScopeContext<'_>, kind: &ScopeKind) -> Vec<SymbolId> {
    let symbols = ctx.symbols;
    let tree = ctx.tree;
    let mut declared = Vec::new();

    match *kind {
        ScopeKind::ClassTypeParameters { ty } => {
            declared.extend_from_slice(symbols.type_parameters_of(ty));
        }
        ScopeKind::MethodTypeParameters { method } => {
            declared.extend_from_slice(symbols.type_parameters_of(method));
        }
        ScopeKind::CrefTypeParameters { cref } => {
            declared.extend(
                tree.children_with_role(cref, Role::TypeParameter)
                    .filter_map(|child| symbols.declared_symbol(child)),
            );
        }
        ScopeKind::PrimaryConstructor { ty } => {
            declared.extend_from_slice(symbols.parameters_of(ty));
        }
        ScopeKind::Parameters {
            member,
            declaration,
        } => {
            declared.extend_from_slice(symbols.parameters_of(member));
            expression_body_variables(ctx, declaration, &mut declared);
        }
        ScopeKind::Lambda { lambda, node } => {
            declared.extend_from_slice(symbols.parameters_of(lambda));
            expression_body_variables(ctx, node, &mut declared);
        }
        ScopeKind::LocalFunction { function, node } => {
            declared.extend_from_slice(symbols.type_parameters_of(function));
            declared.extend_from_slice(symbols.parameters_of(function));
            expression_body_variables(ctx, node, &mut declared);
        }
        ScopeKind::Block { node } => {
            for &statement in tree.children(node) {
                statement_declarations(ctx, statement, &mut declared);
            }
        }
        ScopeKind::Embedded { node } => statement_declarations(ctx, node, &mut declared),
        ScopeKind::Loop { node }
        | ScopeKind::Resource { node }
        | ScopeKind::Catch { node }
        | ScopeKind::SwitchSection { node } => header_declarations(ctx, node, &mut declared),
        ScopeKind::Switch { node } => {
            header_declarations(ctx, node, &mut declared);
            for section in tree.children_of_kind(node, SyntaxKind::SwitchSection) {
                for &statement in tree.children(section) {
                    if tree.kind(statement).is_statement() {
                        statement_declarations(ctx, statement, &mut declared);
                    }
                }
            }
        }
        ScopeKind::SwitchArm { node } => expression_variables(ctx, node, &mut declared),
        ScopeKind::Root
        | ScopeKind::Imports { .. }
        | ScopeKind::Namespace { .. }
        | ScopeKind::Type { .. }
        | ScopeKind::Query { .. }
        | ScopeKind::Adjusted => {}
    }
    declared
}

/// Declarations a statement contributes to the statement list it appears in
fn statement_declarations(ctx: ScopeContext<'_>, statement: NodeId, out: &mut Vec<SymbolId>) {
    let tree = ctx.tree;
    match tree.kind(statement) {
        SyntaxKind::LocalFunctionStatement => out.extend(ctx.symbols.declared_symbol(statement)),
        SyntaxKind::LabeledStatement => {
            out.extend(ctx.symbols.declared_symbol(statement));
            for &inner in tree.children(statement) {
                if tree.kind(inner).is_statement() {
                    statement_declarations(ctx, inner, out);
                }
            }
        }
        // Condition variables stay in scope after the `if`.
        SyntaxKind::IfStatement => {
            if let Some(condition) = tree.child_with_role(statement, Role::Condition) {
                expression_variables(ctx, condition, out);
            }
        }
        SyntaxKind::LocalDeclaration
        | SyntaxKind::ExpressionStatement
        | SyntaxKind::ReturnStatement
        | SyntaxKind::GotoStatement
        | SyntaxKind::BreakStatement
        | SyntaxKind::ContinueStatement
        | SyntaxKind::EmptyStatement => expression_variables(ctx, statement, out),
        _ => {}
    }
}

/// Declarations in the header of a compound statement: everything except its
/// embedded statements and nested statement lists
fn header_declarations(ctx: ScopeContext<'_>, node: NodeId, out: &mut Vec<SymbolId>) {
    let tree = ctx.tree;
    for &child in tree.children(node) {
        let kind = tree.kind(child);
        let role = tree.role(child);
        if role.is_embedded_slot() || kind == SyntaxKind::SwitchSection {
            continue;
        }
        // `for` initializers and `using` declarations are statements in a header slot.
        if kind.is_statement() && !matches!(role, Role::Initializer | Role::Resource) {
            continue;
        }
        expression_variables(ctx, child, out);
    }
}

/// Variables of an expression body and of constructor or field initializers
fn expression_body_variables(ctx: ScopeContext<'_>, declaration: NodeId, out: &mut Vec<SymbolId>) {
    let tree = ctx.tree;
    for &child in tree.children(declaration) {
        let is_expression_body =
            tree.role(child) == Role::Body && tree.kind(child) != SyntaxKind::Block;
        if is_expression_body || tree.role(child) == Role::Initializer {
            expression_variables(ctx, child, out);
        }
    }
}

/// Variables declared in `root` and its descendants, in source order, without
/// entering nodes that own their declarations
pub(crate) fn expression_variables(ctx: ScopeContext<'_>, root: NodeId, out: &mut Vec<SymbolId>) {
    let tree = ctx.tree;
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        let kind = tree.kind(node);
        if node != root && owns_declarations(kind) {
            continue;
        }
        if matches!(
            kind,
            SyntaxKind::SingleVariableDesignation
                | SyntaxKind::VariableDeclarator
                | SyntaxKind::CatchDeclaration
        ) {
            out.extend(ctx.symbols.declared_symbol(node));
        }
        stack.extend(tree.children(node).iter().rev().copied());
    }
}

fn owns_declarations(kind: SyntaxKind) -> bool {
    kind.is_nested_function()
        || kind.is_statement()
        || matches!(
            kind,
            SyntaxKind::QueryExpression | SyntaxKind::SwitchExpressionArm
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScopeConfig;
    use ks_intern::Interner;
    use ks_span::FileId;
    use ks_symbols::{MethodKind, Program, ProgramBuilder, TypeKind};

    fn names(program: &Program, interner: &Interner, declared: &[SymbolId]) -> Vec<String> {
        declared
            .iter()
            .map(|&id| interner.resolve(&program.symbols.name(id)).to_owned())
            .collect()
    }

    #[test]
    fn test_block_excludes_nested_functions_and_blocks() {
        let interner = Interner::new();
        let mut builder = ProgramBuilder::new(interner.clone(), FileId(0));
        builder.open_type("C", TypeKind::Class);
        builder.open_method("M", MethodKind::Ordinary);
        let block = builder.open(SyntaxKind::Block, Role::Body);
        builder.local("a");
        builder.open(SyntaxKind::ExpressionStatement, Role::None);
        builder.open_lambda(Role::None);
        builder.parameter("p");
        builder.designation("hidden");
        builder.close().unwrap();
        builder.designation("b");
        builder.close().unwrap();
        builder.open(SyntaxKind::Block, Role::None);
        builder.local("inner");
        builder.close().unwrap();
        builder.open_local_function("helper");
        builder.close().unwrap();
        builder.label("done");
        builder.close().unwrap();
        builder.close().unwrap();
        builder.close().unwrap();
        let program = builder.finish().unwrap();

        let config = ScopeConfig::default();
        let ctx = ScopeContext::new(&program.tree, &program.symbols, &interner, &config);
        let declared = declared_symbols(ctx, &ScopeKind::Block { node: block });
        assert_eq!(names(&program, &interner, &declared), ["a", "b", "helper", "done"]);
    }

    #[test]
    fn test_loop_header_excludes_body() {
        let interner = Interner::new();
        let mut builder = ProgramBuilder::new(interner.clone(), FileId(0));
        builder.open_type("C", TypeKind::Class);
        builder.open_method("M", MethodKind::Ordinary);
        builder.open(SyntaxKind::Block, Role::Body);
        let for_loop = builder.open(SyntaxKind::ForStatement, Role::None);
        builder.open_local_declaration(Role::Initializer);
        builder.declarator("i");
        builder.close().unwrap();
        builder.open(SyntaxKind::IsPatternExpression, Role::Condition);
        builder.designation("limit");
        builder.close().unwrap();
        builder.open(SyntaxKind::Block, Role::Body);
        builder.local("body");
        builder.close().unwrap();
        builder.close().unwrap();
        builder.close().unwrap();
        builder.close().unwrap();
        builder.close().unwrap();
        let program = builder.finish().unwrap();

        let config = ScopeConfig::default();
        let ctx = ScopeContext::new(&program.tree, &program.symbols, &interner, &config);
        let declared = declared_symbols(ctx, &ScopeKind::Loop { node: for_loop });
        assert_eq!(names(&program, &interner, &declared), ["i", "limit"]);
    }
}
