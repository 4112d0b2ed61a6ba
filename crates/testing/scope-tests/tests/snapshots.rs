//! Whole-chain snapshots for a deeply nested position

use expect_test::expect;
use ks_scope::LookupOptions;
use ks_symbols::{MethodKind, TypeKind};
use ks_syntax::{Modifiers, Role, SyntaxKind};
use scope_tests::{close, compile, describe_chain, describe_result, program_builder};

#[test]
fn test_nested_lambda_in_checked_catch_block() {
    let (mut builder, interner) = program_builder();
    builder.open_type("C", TypeKind::Class);
    let (method, _) = builder.open_method("M", MethodKind::Ordinary);
    builder.set_modifiers(method, Modifiers::UNSAFE);
    builder.parameter("p");
    builder.open(SyntaxKind::Block, Role::Body);
    builder.open(SyntaxKind::TryStatement, Role::None);
    builder.open(SyntaxKind::Block, Role::Body);
    close(&mut builder, 1);
    builder.open_catch(Some("e"));
    builder.open(SyntaxKind::Block, Role::Body);
    builder.open(SyntaxKind::CheckedStatement, Role::None);
    builder.open(SyntaxKind::ExpressionStatement, Role::None);
    builder.open_lambda(Role::Expression);
    builder.parameter("value");
    let position = builder.leaf(SyntaxKind::OtherExpression, Role::Body);
    close(&mut builder, 9);
    let compilation = compile(builder, interner);
    let scope = compilation.scope_for(position);

    expect![[r#"
        lambda UNSAFE_REGION | IN_CATCH_BLOCK | CHECKED_REGION
        adjusted UNSAFE_REGION | IN_CATCH_BLOCK | CHECKED_REGION
        block UNSAFE_REGION | IN_CATCH_BLOCK
        adjusted UNSAFE_REGION | IN_CATCH_BLOCK
        catch UNSAFE_REGION
        block UNSAFE_REGION
        parameters UNSAFE_REGION
        adjusted UNSAFE_REGION
        type
        namespace
        imports
        root
    "#]]
    .assert_eq(&describe_chain(&scope));

    let lookups: Vec<String> = ["value", "e", "p", "M", "missing"]
        .iter()
        .map(|text| {
            let name = compilation.interner().intern(text);
            let found = scope.lookup(compilation.context(), name, 0, LookupOptions::empty());
            describe_result(&compilation, &found)
        })
        .collect();
    expect![[r#"
        Viable: value (parameter)
        Viable: e (local)
        Viable: p (parameter)
        Viable: M (method)
        Empty
    "#]]
    .assert_eq(&(lookups.join("\n") + "\n"));
}

#[test]
fn test_generic_type_with_primary_constructor() {
    let (mut builder, interner) = program_builder();
    builder.open_namespace("Shapes");
    builder.open_type("Pair", TypeKind::Struct);
    builder.type_parameter("T");
    builder.parameter("first");
    builder.open_method("Swap", MethodKind::Ordinary);
    builder.type_parameter("U");
    let body = builder.open(SyntaxKind::Block, Role::Body);
    close(&mut builder, 4);
    let compilation = compile(builder, interner);
    let scope = compilation.scope_for(body);

    expect![[r#"
        block
        parameters
        method-type-parameters
        type
        primary-constructor
        class-type-parameters
        namespace
        imports
        namespace
        imports
        root
    "#]]
    .assert_eq(&describe_chain(&scope));

    let lookups: Vec<String> = ["U", "first", "T", "Pair", "Shapes"]
        .iter()
        .map(|text| {
            let name = compilation.interner().intern(text);
            let found = scope.lookup(compilation.context(), name, 0, LookupOptions::empty());
            describe_result(&compilation, &found)
        })
        .collect();
    expect![[r#"
        Viable: U (type parameter)
        Viable: first (parameter)
        Viable: T (type parameter)
        WrongArity: Pair (type)
        Viable: Shapes (namespace)
    "#]]
    .assert_eq(&(lookups.join("\n") + "\n"));
}
