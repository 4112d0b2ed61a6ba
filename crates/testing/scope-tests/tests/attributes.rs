//! Attribute name lookup and attribute binding contexts

use ks_driver::Compilation;
use ks_scope::{BinderFlags, LookupDiagnostic, LookupOptions, LookupResultKind, ScopeUsage};
use ks_symbols::{MethodKind, SymbolId, TypeKind};
use ks_syntax::{Modifiers, NodeId, Role, SyntaxKind};
use scope_tests::{chain_labels, close, compile, program_builder};

struct Fixture {
    compilation: Compilation,
    /// Attribute list of `Model`
    type_attributes: NodeId,
    /// Attribute list of `Model.Save`
    method_attributes: NodeId,
    serializable: SymbolId,
    widget: SymbolId,
    /// Abstract attribute class `MarkerAttribute`
    marker: SymbolId,
}

fn fixture() -> Fixture {
    let (mut builder, interner) = program_builder();
    let (_, base) = builder.open_type("Attribute", TypeKind::Class);
    close(&mut builder, 1);
    builder.symbols_mut().symbol_mut(base).is_attribute_base = true;
    let (_, serializable) = builder.open_type("SerializableAttribute", TypeKind::Class);
    close(&mut builder, 1);
    builder.symbols_mut().symbol_mut(serializable).base_type = Some(base);
    let (_, widget) = builder.open_type("Widget", TypeKind::Class);
    close(&mut builder, 1);
    let (marker_node, marker) = builder.open_type("MarkerAttribute", TypeKind::Class);
    builder.set_modifiers(marker_node, Modifiers::ABSTRACT);
    close(&mut builder, 1);
    builder.symbols_mut().symbol_mut(marker).base_type = Some(base);

    builder.open_type("Model", TypeKind::Class);
    let type_attributes = builder.open(SyntaxKind::AttributeList, Role::AttributeList);
    close(&mut builder, 1);
    builder.open_method("Save", MethodKind::Ordinary);
    let method_attributes = builder.open(SyntaxKind::AttributeList, Role::AttributeList);
    close(&mut builder, 3);

    Fixture {
        compilation: compile(builder, interner),
        type_attributes,
        method_attributes,
        serializable,
        widget,
        marker,
    }
}

#[test]
fn test_suffix_is_added_when_needed() {
    let fixture = fixture();
    let compilation = &fixture.compilation;
    let found = compilation.scope_for(fixture.type_attributes).lookup(
        compilation.context(),
        compilation.interner().intern("Serializable"),
        0,
        LookupOptions::ATTRIBUTE_TYPE_ONLY,
    );
    assert!(found.is_single_viable());
    assert_eq!(found.single_symbol(), Some(fixture.serializable));
}

#[test]
fn test_full_name_is_accepted_verbatim() {
    let fixture = fixture();
    let compilation = &fixture.compilation;
    let found = compilation.scope_for(fixture.type_attributes).lookup(
        compilation.context(),
        compilation.interner().intern("SerializableAttribute"),
        0,
        LookupOptions::ATTRIBUTE_TYPE_ONLY | LookupOptions::VERBATIM_ATTRIBUTE_NAME,
    );
    assert_eq!(found.single_symbol(), Some(fixture.serializable));
}

#[test]
fn test_non_attribute_class_is_rejected() {
    let fixture = fixture();
    let compilation = &fixture.compilation;
    let found = compilation.scope_for(fixture.type_attributes).lookup(
        compilation.context(),
        compilation.interner().intern("Widget"),
        0,
        LookupOptions::ATTRIBUTE_TYPE_ONLY,
    );
    assert_eq!(found.kind(), LookupResultKind::NotAnAttributeType);
    assert_eq!(
        found.diagnostic(),
        Some(&LookupDiagnostic::NotAnAttributeClass {
            symbol: fixture.widget
        })
    );
}

#[test]
fn test_abstract_attribute_class_is_rejected() {
    let fixture = fixture();
    let compilation = &fixture.compilation;
    let found = compilation.scope_for(fixture.type_attributes).lookup(
        compilation.context(),
        compilation.interner().intern("Marker"),
        0,
        LookupOptions::ATTRIBUTE_TYPE_ONLY,
    );
    assert_eq!(found.kind(), LookupResultKind::NotAnAttributeType);
    assert_eq!(found.single_symbol(), Some(fixture.marker));
    assert_eq!(
        found.diagnostic(),
        Some(&LookupDiagnostic::AbstractAttributeClass {
            symbol: fixture.marker
        })
    );
}

#[test]
fn test_unknown_suffixed_spelling_is_not_interned() {
    let fixture = fixture();
    let compilation = &fixture.compilation;
    let interner = compilation.interner();
    let name = interner.intern("Unknown");
    let before = interner.len();
    let found = compilation.scope_for(fixture.type_attributes).lookup(
        compilation.context(),
        name,
        0,
        LookupOptions::ATTRIBUTE_TYPE_ONLY,
    );
    assert!(found.is_clear());
    assert_eq!(interner.len(), before);
    assert!(interner.get("UnknownAttribute").is_none());
}

#[test]
fn test_type_attributes_bind_outside_the_type() {
    let fixture = fixture();
    let compilation = &fixture.compilation;
    let on_type = compilation.scope_for(fixture.type_attributes);
    assert_eq!(chain_labels(&on_type), ["adjusted", "namespace", "imports", "root"]);
    assert!(on_type.flags().contains(BinderFlags::ATTRIBUTE_ARGUMENTS));

    let on_method = compilation.scope_for(fixture.method_attributes);
    assert!(chain_labels(&on_method).contains(&"type"));
}

#[test]
fn test_early_binding_gets_its_own_flags() {
    let fixture = fixture();
    let compilation = &fixture.compilation;
    let ctx = compilation.context();
    let factory = compilation.factory();

    let normal = factory.chain_for_node(ctx, fixture.method_attributes, ScopeUsage::Normal);
    let early = factory.chain_for_node(ctx, fixture.method_attributes, ScopeUsage::EarlyAttribute);
    assert!(!normal.flags().contains(BinderFlags::EARLY_ATTRIBUTE_BINDING));
    assert!(early.flags().contains(BinderFlags::EARLY_ATTRIBUTE_BINDING));
    assert!(early.flags().contains(BinderFlags::ATTRIBUTE_ARGUMENTS));
    assert_eq!(chain_labels(&normal), chain_labels(&early));
}
