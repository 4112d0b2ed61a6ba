//! Declaration conflicts found by `check_declarations`

use ks_scope::{ScopeConfig, ScopeDiagnostic};
use ks_symbols::{MethodKind, SymbolKind, TypeKind};
use ks_syntax::{Role, SyntaxKind};
use scope_tests::{close, compile, compile_with, program_builder};

#[test]
fn test_duplicate_label_in_one_block() {
    let (mut builder, interner) = program_builder();
    builder.open_type("C", TypeKind::Class);
    builder.open_method("M", MethodKind::Ordinary);
    builder.open(SyntaxKind::Block, Role::Body);
    builder.label("done");
    let second = builder.label("done");
    close(&mut builder, 3);
    let compilation = compile(builder, interner);

    let diagnostics = compilation.check_declarations().into_vec();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0],
        ScopeDiagnostic::DuplicateLabel {
            name: compilation.interner().intern("done"),
            at: compilation.context().span_of(second),
        }
    );
}

#[test]
fn test_label_shadowed_by_nested_block() {
    let (mut builder, interner) = program_builder();
    builder.open_type("C", TypeKind::Class);
    builder.open_method("M", MethodKind::Ordinary);
    builder.open(SyntaxKind::Block, Role::Body);
    builder.label("retry");
    builder.open(SyntaxKind::Block, Role::None);
    builder.label("retry");
    close(&mut builder, 4);
    let compilation = compile(builder, interner);

    assert_eq!(
        compilation.check_declarations().codes(),
        ["scope::label_shadowed"]
    );
}

#[test]
fn test_labels_and_locals_do_not_conflict() {
    let (mut builder, interner) = program_builder();
    builder.open_type("C", TypeKind::Class);
    builder.open_method("M", MethodKind::Ordinary);
    builder.open(SyntaxKind::Block, Role::Body);
    builder.local("next");
    builder.label("next");
    close(&mut builder, 3);
    let compilation = compile(builder, interner);

    assert!(compilation.check_declarations().is_empty());
}

#[test]
fn test_duplicate_range_variable() {
    let (mut builder, interner) = program_builder();
    builder.open_type("C", TypeKind::Class);
    builder.open_method("M", MethodKind::Ordinary);
    builder.open(SyntaxKind::Block, Role::Body);
    builder.open(SyntaxKind::ExpressionStatement, Role::None);
    builder.open(SyntaxKind::QueryExpression, Role::Expression);
    builder.open_clause(SyntaxKind::FromClause, Some("x"));
    close(&mut builder, 1);
    builder.open_clause(SyntaxKind::FromClause, Some("x"));
    close(&mut builder, 6);
    let compilation = compile(builder, interner);

    assert_eq!(
        compilation.check_declarations().codes(),
        ["scope::duplicate_range_variable"]
    );
}

#[test]
fn test_range_variable_conflicts_with_local() {
    let (mut builder, interner) = program_builder();
    builder.open_type("C", TypeKind::Class);
    builder.open_method("M", MethodKind::Ordinary);
    builder.open(SyntaxKind::Block, Role::Body);
    let local = builder.local("x");
    builder.open(SyntaxKind::ExpressionStatement, Role::None);
    builder.open(SyntaxKind::QueryExpression, Role::Expression);
    let (_, range) = builder.open_clause(SyntaxKind::FromClause, Some("x"));
    close(&mut builder, 6);
    let compilation = compile(builder, interner);

    let diagnostics = compilation.check_declarations().into_vec();
    let expected = ScopeDiagnostic::RangeVariableConflict {
        name: compilation.interner().intern("x"),
        existing: local,
        at: compilation.context().span_of(range.unwrap()),
    };
    assert_eq!(diagnostics, [expected]);
}

fn lambda_reusing_local_name() -> (ks_symbols::ProgramBuilder, ks_intern::Interner) {
    let (mut builder, interner) = program_builder();
    builder.open_type("C", TypeKind::Class);
    builder.open_method("M", MethodKind::Ordinary);
    builder.open(SyntaxKind::Block, Role::Body);
    builder.local("value");
    builder.open(SyntaxKind::ExpressionStatement, Role::None);
    builder.open_lambda(Role::Expression);
    builder.parameter("value");
    builder.leaf(SyntaxKind::OtherExpression, Role::Body);
    close(&mut builder, 5);
    (builder, interner)
}

#[test]
fn test_lambda_parameter_may_reuse_enclosing_name() {
    let (builder, interner) = lambda_reusing_local_name();
    let compilation = compile(builder, interner);
    assert!(compilation.check_declarations().is_empty());
}

#[test]
fn test_lambda_parameter_conflicts_when_shadowing_is_disallowed() {
    let (builder, interner) = lambda_reusing_local_name();
    let config = ScopeConfig {
        allow_nested_function_shadowing: false,
        ..ScopeConfig::default()
    };
    let compilation = compile_with(builder, interner, config);
    assert_eq!(
        compilation.check_declarations().codes(),
        ["scope::local_illegally_overrides"]
    );
}

#[test]
fn test_local_named_like_method_type_parameter() {
    let (mut builder, interner) = program_builder();
    builder.open_type("C", TypeKind::Class);
    builder.open_method("M", MethodKind::Ordinary);
    let type_parameter = builder.type_parameter("T");
    builder.open(SyntaxKind::Block, Role::Body);
    let local = builder.local("T");
    close(&mut builder, 3);
    let compilation = compile(builder, interner);

    let diagnostics = compilation.check_declarations().into_vec();
    let expected = ScopeDiagnostic::LocalSameNameAsTypeParameter {
        name: compilation.interner().intern("T"),
        type_parameter,
        at: compilation.context().span_of(local),
    };
    assert_eq!(diagnostics, [expected]);
}

#[test]
fn test_duplicate_alias_in_compilation_unit() {
    let (mut builder, interner) = program_builder();
    let global = builder.global_namespace();
    let first = builder.external(global, "First", SymbolKind::Namespace);
    let second = builder.external(global, "Second", SymbolKind::Namespace);
    builder.using_alias("Io", first);
    builder.using_alias("Io", second);
    let compilation = compile(builder, interner);

    assert_eq!(
        compilation.check_declarations().codes(),
        ["scope::duplicate_alias"]
    );
}

#[test]
fn test_locals_of_different_members_do_not_conflict() {
    let (mut builder, interner) = program_builder();
    builder.open_type("C", TypeKind::Class);
    builder.open_method("First", MethodKind::Ordinary);
    builder.open(SyntaxKind::Block, Role::Body);
    builder.local("item");
    close(&mut builder, 2);
    builder.open_method("Second", MethodKind::Ordinary);
    builder.parameter("item");
    builder.open(SyntaxKind::Block, Role::Body);
    builder.local("count");
    close(&mut builder, 3);
    let compilation = compile(builder, interner);

    assert!(compilation.check_declarations().is_empty());
}
