use crate::{Interner, Location, Name, Symbol};

#[test]
fn intern_deduplicates() {
    let mut interner = Interner::new();

    let a = interner.intern("point");
    let b = interner.intern("point");
    let c = interner.intern("line");

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(interner.len(), 2);
}

#[test]
fn identifiers_fold_case() {
    let mut interner = Interner::new();

    let upper = interner.intern_ident("Colored_Point");
    let lower = interner.intern_ident("colored_point");

    assert_eq!(upper, lower);
    assert_eq!(interner.resolve(upper), "colored_point");
}

#[test]
fn verbatim_interning_keeps_case() {
    let mut interner = Interner::new();

    let file = interner.intern("Geometry.exp");
    let ident = interner.intern_ident("Geometry.exp");

    assert_ne!(file, ident);
    assert_eq!(interner.resolve(file), "Geometry.exp");
}

#[test]
fn get_ident_does_not_intern() {
    let mut interner = Interner::new();
    let name = interner.intern_ident("point");

    assert_eq!(interner.get_ident("POINT"), Some(name));
    assert_eq!(interner.get_ident("line"), None);
    assert_eq!(interner.len(), 1);
}

#[test]
fn try_resolve_rejects_foreign_handles() {
    let mut interner = Interner::new();
    let name = interner.intern("x");

    assert_eq!(interner.try_resolve(name), Some("x"));

    let empty = Interner::new();
    assert!(empty.is_empty());
    assert_eq!(empty.try_resolve(name), None);
}

#[test]
fn location_renders_file_and_line() {
    let mut interner = Interner::new();
    let file = interner.intern("geometry.exp");
    let loc = Location::new(file, 12);

    insta::assert_snapshot!(loc.render(&interner), @"geometry.exp:12");
}

#[test]
fn symbols_compare_by_name_and_location() {
    let mut interner = Interner::new();
    let file = interner.intern("a.exp");
    let name: Name = interner.intern_ident("x");

    let a = Symbol::new(name, Location::new(file, 1));
    let b = Symbol::new(name, Location::new(file, 2));

    assert_eq!(a.name, b.name);
    assert_ne!(a, b);
}
