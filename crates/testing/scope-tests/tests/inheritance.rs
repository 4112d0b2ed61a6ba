//! Member lookup through base interfaces and type parameter constraints

use ks_scope::{LookupOptions, LookupResultKind};
use ks_symbols::{MethodKind, ProgramBuilder, SymbolId, TypeKind};
use ks_syntax::{Role, SyntaxKind};
use scope_tests::{close, compile, program_builder};

/// An interface extending `bases`, declaring a `Value` property when `value` is set
fn interface(
    builder: &mut ProgramBuilder,
    name: &str,
    bases: &[SymbolId],
    value: bool,
) -> (SymbolId, Option<SymbolId>) {
    let (_, ty) = builder.open_type(name, TypeKind::Interface);
    for &base in bases {
        builder.implement(ty, base);
    }
    let property = value.then(|| builder.property("Value"));
    close(builder, 1);
    (ty, property)
}

#[test]
fn test_derived_interface_member_hides_base_member() {
    let (mut builder, interner) = program_builder();
    let (root, _) = interface(&mut builder, "IRoot", &[], true);
    let (_, derived_ty) = builder.open_type("IDerived", TypeKind::Interface);
    builder.implement(derived_ty, root);
    let derived_value = builder.property("Value");
    builder.open_method("Describe", MethodKind::Ordinary);
    let body = builder.open(SyntaxKind::Block, Role::Body);
    close(&mut builder, 3);
    let compilation = compile(builder, interner);
    let ctx = compilation.context();
    let value = compilation.interner().intern("Value");
    let scope = compilation.scope_for(body);

    let from_body = scope.lookup(ctx, value, 0, LookupOptions::empty());
    assert!(from_body.is_single_viable());
    assert_eq!(from_body.single_symbol(), Some(derived_value));

    let as_member = scope.lookup_members(ctx, derived_ty, value, 0, LookupOptions::empty());
    assert_eq!(as_member.symbols(), [derived_value]);
}

#[test]
fn test_unrelated_base_interfaces_keep_both_members() {
    let (mut builder, interner) = program_builder();
    let (left, left_value) = interface(&mut builder, "ILeft", &[], true);
    let (right, right_value) = interface(&mut builder, "IRight", &[], true);
    let (both, _) = interface(&mut builder, "IBoth", &[left, right], false);
    let anchor = builder.leaf(SyntaxKind::OtherExpression, Role::None);
    let compilation = compile(builder, interner);
    let ctx = compilation.context();

    let found = compilation.scope_for(anchor).lookup_members(
        ctx,
        both,
        compilation.interner().intern("Value"),
        0,
        LookupOptions::empty(),
    );
    assert_eq!(found.kind(), LookupResultKind::Viable);
    assert!(!found.is_single_viable());
    assert_eq!(found.symbols().len(), 2);
    assert!(found.symbols().contains(&left_value.unwrap()));
    assert!(found.symbols().contains(&right_value.unwrap()));
}

#[test]
fn test_diamond_reaches_the_shared_base_once() {
    let (mut builder, interner) = program_builder();
    let (root, root_value) = interface(&mut builder, "IRoot", &[], true);
    let (left, _) = interface(&mut builder, "ILeft", &[root], false);
    let (right, _) = interface(&mut builder, "IRight", &[root], false);
    let (both, _) = interface(&mut builder, "IBoth", &[left, right], false);
    let anchor = builder.leaf(SyntaxKind::OtherExpression, Role::None);
    let compilation = compile(builder, interner);
    let ctx = compilation.context();

    let found = compilation.scope_for(anchor).lookup_members(
        ctx,
        both,
        compilation.interner().intern("Value"),
        0,
        LookupOptions::empty(),
    );
    assert!(found.is_single_viable());
    assert_eq!(found.single_symbol(), root_value);
}

#[test]
fn test_diamond_member_redeclared_on_one_side_hides_the_base() {
    let (mut builder, interner) = program_builder();
    let (root, _) = interface(&mut builder, "IRoot", &[], true);
    let (left, left_value) = interface(&mut builder, "ILeft", &[root], true);
    let (right, _) = interface(&mut builder, "IRight", &[root], false);
    let (both, _) = interface(&mut builder, "IBoth", &[left, right], false);
    let anchor = builder.leaf(SyntaxKind::OtherExpression, Role::None);
    let compilation = compile(builder, interner);
    let ctx = compilation.context();

    let found = compilation.scope_for(anchor).lookup_members(
        ctx,
        both,
        compilation.interner().intern("Value"),
        0,
        LookupOptions::empty(),
    );
    assert!(found.is_single_viable());
    assert_eq!(found.single_symbol(), left_value);
}

#[test]
fn test_type_parameter_members_come_from_constraints() {
    let (mut builder, interner) = program_builder();
    let (_, base) = builder.open_type("Base", TypeKind::Class);
    let count = builder.field("Count");
    close(&mut builder, 1);
    let (root, root_value) = interface(&mut builder, "IRoot", &[], true);
    let (left, _) = interface(&mut builder, "ILeft", &[root], false);
    let (right, _) = interface(&mut builder, "IRight", &[root], false);

    builder.open_type("Holder", TypeKind::Class);
    builder.open_method("Use", MethodKind::Ordinary);
    let item = builder.type_parameter("TItem");
    builder.constrain(item, base);
    builder.constrain(item, left);
    builder.constrain(item, right);
    let body = builder.open(SyntaxKind::Block, Role::Body);
    close(&mut builder, 3);
    let compilation = compile(builder, interner);
    let ctx = compilation.context();
    let scope = compilation.scope_for(body);
    let member = |text: &str, options: LookupOptions| {
        scope.lookup_members(ctx, item, compilation.interner().intern(text), 0, options)
    };

    assert_eq!(
        member("Count", LookupOptions::empty()).single_symbol(),
        Some(count)
    );
    let value = member("Value", LookupOptions::empty());
    assert!(value.is_single_viable());
    assert_eq!(value.single_symbol(), root_value);
    assert!(member("Missing", LookupOptions::empty()).is_clear());
    assert!(member("Count", LookupOptions::NAMESPACES_OR_TYPES_ONLY).is_clear());
}

#[test]
fn test_class_method_group_collects_base_overloads() {
    let (mut builder, interner) = program_builder();
    let (_, base) = builder.open_type("Base", TypeKind::Class);
    let (_, base_run) = builder.open_method("Run", MethodKind::Ordinary);
    close(&mut builder, 2);
    let (_, derived) = builder.open_type("Derived", TypeKind::Class);
    builder.symbols_mut().symbol_mut(derived).base_type = Some(base);
    let (_, derived_run) = builder.open_method("Run", MethodKind::Ordinary);
    close(&mut builder, 2);
    let anchor = builder.leaf(SyntaxKind::OtherExpression, Role::None);
    let compilation = compile(builder, interner);

    let found = compilation.scope_for(anchor).lookup_members(
        compilation.context(),
        derived,
        compilation.interner().intern("Run"),
        0,
        LookupOptions::empty(),
    );
    assert_eq!(found.symbols(), [derived_run, base_run]);
}
