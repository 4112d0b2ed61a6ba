//! Jump targets, held resources and contextual flags

use ks_scope::{BinderFlags, LookupOptions, SafeContext};
use ks_symbols::{MethodKind, ProgramBuilder, TypeKind};
use ks_syntax::{Role, SyntaxKind};
use scope_tests::{chain_labels, close, compile, program_builder};

/// Opens `C.M` and its body block
fn open_body(builder: &mut ProgramBuilder) {
    builder.open_type("C", TypeKind::Class);
    builder.open_method("M", MethodKind::Ordinary);
    builder.open(SyntaxKind::Block, Role::Body);
}

#[test]
fn test_break_in_switch_inside_loop() {
    let (mut builder, interner) = program_builder();
    open_body(&mut builder);
    let loop_node = builder.open(SyntaxKind::WhileStatement, Role::None);
    builder.leaf(SyntaxKind::OtherExpression, Role::Condition);
    builder.open(SyntaxKind::Block, Role::Body);
    let switch = builder.open(SyntaxKind::SwitchStatement, Role::None);
    builder.leaf(SyntaxKind::OtherExpression, Role::Expression);
    builder.open(SyntaxKind::SwitchSection, Role::None);
    let jump = builder.leaf(SyntaxKind::BreakStatement, Role::None);
    close(&mut builder, 7);
    let compilation = compile(builder, interner);
    let scope = compilation.scope_for(jump);

    assert_eq!(scope.break_target(), Some(switch));
    assert_eq!(scope.continue_target(), Some(loop_node));
    assert_eq!(scope.enclosing_switch(), Some(switch));
}

#[test]
fn test_jump_targets_stop_at_lambdas() {
    let (mut builder, interner) = program_builder();
    open_body(&mut builder);
    builder.open(SyntaxKind::WhileStatement, Role::None);
    builder.open(SyntaxKind::Block, Role::Body);
    builder.open(SyntaxKind::ExpressionStatement, Role::None);
    builder.open_lambda(Role::Expression);
    let body = builder.open(SyntaxKind::Block, Role::Body);
    close(&mut builder, 8);
    let compilation = compile(builder, interner);
    let scope = compilation.scope_for(body);

    assert_eq!(scope.break_target(), None);
    assert_eq!(scope.continue_target(), None);
    assert_eq!(scope.local_scope_depth(), SafeContext::CURRENT_METHOD.narrower());
}

#[test]
fn test_lock_holds_the_locked_local() {
    let (mut builder, interner) = program_builder();
    open_body(&mut builder);
    let gate = builder.local("gate");
    builder.open(SyntaxKind::LockStatement, Role::None);
    builder.identifier(Role::Expression, "gate");
    builder.open(SyntaxKind::Block, Role::Body);
    let inside = builder.leaf(SyntaxKind::ExpressionStatement, Role::None);
    close(&mut builder, 5);
    let compilation = compile(builder, interner);
    let ctx = compilation.context();

    let held = compilation.scope_for(inside).locked_or_disposed_variables(ctx).clone();
    assert!(held.contains(&gate));
    assert_eq!(held.len(), 1);
}

#[test]
fn test_using_declaration_is_disposed_and_declared() {
    let (mut builder, interner) = program_builder();
    open_body(&mut builder);
    let using = builder.open(SyntaxKind::UsingStatement, Role::None);
    builder.open_local_declaration(Role::Resource);
    let stream = builder.declarator("stream");
    close(&mut builder, 1);
    builder.open(SyntaxKind::Block, Role::Body);
    let inside = builder.leaf(SyntaxKind::ExpressionStatement, Role::None);
    close(&mut builder, 5);
    let compilation = compile(builder, interner);
    let ctx = compilation.context();
    let scope = compilation.scope_for(inside);

    assert!(scope.locked_or_disposed_variables(ctx).contains(&stream));
    assert_eq!(scope.declared_locals_for(ctx, using), [stream]);
    let found = scope.lookup(
        ctx,
        compilation.interner().intern("stream"),
        0,
        LookupOptions::empty(),
    );
    assert_eq!(found.single_symbol(), Some(stream));
}

#[test]
fn test_nothing_is_held_outside_resource_statements() {
    let (mut builder, interner) = program_builder();
    open_body(&mut builder);
    let statement = builder.leaf(SyntaxKind::ExpressionStatement, Role::None);
    close(&mut builder, 3);
    let compilation = compile(builder, interner);

    assert!(compilation
        .scope_for(statement)
        .locked_or_disposed_variables(compilation.context())
        .is_empty());
}

#[test]
fn test_if_condition_variable_outlives_the_if() {
    let (mut builder, interner) = program_builder();
    open_body(&mut builder);
    builder.open(SyntaxKind::IfStatement, Role::None);
    builder.open(SyntaxKind::IsPatternExpression, Role::Condition);
    let matched = builder.designation("matched");
    close(&mut builder, 1);
    builder.leaf(SyntaxKind::ExpressionStatement, Role::Body);
    close(&mut builder, 1);
    let after = builder.leaf(SyntaxKind::ExpressionStatement, Role::None);
    close(&mut builder, 3);
    let compilation = compile(builder, interner);

    let found = compilation.scope_for(after).lookup(
        compilation.context(),
        compilation.interner().intern("matched"),
        0,
        LookupOptions::empty(),
    );
    assert_eq!(found.single_symbol(), Some(matched));
}

#[test]
fn test_embedded_statement_gets_its_own_scope() {
    let (mut builder, interner) = program_builder();
    open_body(&mut builder);
    builder.open(SyntaxKind::IfStatement, Role::None);
    builder.leaf(SyntaxKind::OtherExpression, Role::Condition);
    let embedded = builder.open_local_declaration(Role::Body);
    let hidden = builder.declarator("hidden");
    close(&mut builder, 2);
    let after = builder.leaf(SyntaxKind::ExpressionStatement, Role::None);
    close(&mut builder, 3);
    let compilation = compile(builder, interner);
    let ctx = compilation.context();
    let name = compilation.interner().intern("hidden");

    let inside = compilation.scope_for(embedded);
    assert_eq!(chain_labels(&inside)[0], "embedded");
    assert_eq!(
        inside.lookup(ctx, name, 0, LookupOptions::empty()).single_symbol(),
        Some(hidden)
    );
    assert!(compilation
        .scope_for(after)
        .lookup(ctx, name, 0, LookupOptions::empty())
        .is_clear());
}

#[test]
fn test_contextual_flags() {
    let (mut builder, interner) = program_builder();
    builder.open_type("C", TypeKind::Class);
    builder.open_field("cache");
    let field_value = builder.leaf(SyntaxKind::OtherExpression, Role::Initializer);
    close(&mut builder, 1);
    builder.open_method("M", MethodKind::Ordinary);
    builder.open_parameter("retries");
    let default_value = builder.leaf(SyntaxKind::LiteralExpression, Role::Initializer);
    close(&mut builder, 1);
    builder.open(SyntaxKind::Block, Role::Body);
    builder.open(SyntaxKind::TryStatement, Role::None);
    builder.open(SyntaxKind::Block, Role::Body);
    close(&mut builder, 1);
    builder.open(SyntaxKind::FinallyClause, Role::None);
    builder.open(SyntaxKind::Block, Role::Body);
    let cleanup = builder.leaf(SyntaxKind::ExpressionStatement, Role::None);
    close(&mut builder, 6);
    let compilation = compile(builder, interner);

    assert!(compilation
        .scope_for(field_value)
        .flags()
        .contains(BinderFlags::FIELD_INITIALIZER));
    assert!(compilation
        .scope_for(default_value)
        .flags()
        .contains(BinderFlags::PARAMETER_DEFAULT_VALUE));
    let finally = compilation.scope_for(cleanup);
    assert!(finally.flags().contains(BinderFlags::IN_FINALLY_BLOCK));
    assert!(!finally.flags().contains(BinderFlags::PARAMETER_DEFAULT_VALUE));
}

#[test]
fn test_conditional_access_records_its_receiver() {
    let (mut builder, interner) = program_builder();
    open_body(&mut builder);
    builder.open(SyntaxKind::ExpressionStatement, Role::None);
    builder.open(SyntaxKind::ConditionalAccessExpression, Role::Expression);
    let receiver = builder.identifier(Role::Receiver, "order");
    let access = builder.leaf(SyntaxKind::MemberAccessExpression, Role::WhenNotNull);
    close(&mut builder, 5);
    let compilation = compile(builder, interner);

    assert_eq!(
        compilation.scope_for(access).conditional_receiver(),
        Some(receiver)
    );
    assert_eq!(compilation.scope_for(receiver).conditional_receiver(), None);
}
