use pretty_assertions::assert_eq;

use super::*;
use crate::ir::{Type, Value};
use crate::scope::Binding;

#[test]
fn test_root_exists_with_empty_name() {
    let table = NamespaceTable::new();
    assert_eq!(table.lookup(""), Some(NamespaceId::ROOT));
    assert!(table.get(NamespaceId::ROOT).is_root());
}

#[test]
fn test_same_name_shares_one_namespace() {
    let mut table = NamespaceTable::new();
    let first = table.get_or_create("io");
    let second = table.get_or_create("io");
    assert_eq!(first, second);
    table.add_function(first, "print", "io_print");
    table.add_function(second, "read", "io_read");
    assert_eq!(table.function(first, "print"), Some("io_print"));
    assert_eq!(table.function(first, "read"), Some("io_read"));
    assert_eq!(table.get(first).parent, Some(NamespaceId::ROOT));
}

#[test]
fn test_qualified_lookup_returns_ir_name() {
    let mut table = NamespaceTable::new();
    let io = table.get_or_create("io");
    table.add_function(io, "printf", "printf");
    assert_eq!(table.function(io, "printf"), Some("printf"));
    assert_eq!(table.function(io, "puts"), None);
    assert_eq!(table.function(NamespaceId::ROOT, "printf"), None);
}

#[test]
fn test_first_registration_wins() {
    let mut table = NamespaceTable::new();
    table.add_function(NamespaceId::ROOT, "f", "f");
    table.add_function(NamespaceId::ROOT, "f", "other");
    assert_eq!(table.function(NamespaceId::ROOT, "f"), Some("f"));
}

#[test]
fn test_mangling() {
    let mut table = NamespaceTable::new();
    let math = table.get_or_create("math");
    assert_eq!(table.mangle(math, "sqrt"), "math_sqrt");
    assert_eq!(table.mangle(NamespaceId::ROOT, "main"), "main");
    let entry = table.get_or_create("main");
    assert_eq!(table.mangle(entry, "main"), "main");
    assert_eq!(table.mangle(entry, "helper"), "main_helper");
    assert_eq!(table.name(math), "math");
}

#[test]
fn test_types_are_recorded_per_namespace() {
    let mut table = NamespaceTable::new();
    let geo = table.get_or_create("geo");
    table.add_type(geo, "Point");
    assert_eq!(table.get(geo).type_name("Point"), Some("Point"));
    assert_eq!(table.get(NamespaceId::ROOT).type_name("Point"), None);
}

#[test]
fn test_globals_are_scoped_to_their_namespace() {
    let mut table = NamespaceTable::new();
    let cfg = table.get_or_create("cfg");
    let limit = Symbol {
        binding: Binding::Value(Value::const_int(7, Type::I64)),
        is_const: true,
    };
    table.add_global(cfg, "limit", limit.clone());
    assert_eq!(table.get(cfg).global("limit"), Some(&limit));
    assert_eq!(table.get(NamespaceId::ROOT).global("limit"), None);
}
