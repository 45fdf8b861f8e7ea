use super::*;

#[test]
fn root_holds_builtins() {
    let model = Model::for_test();
    let root = model.root();
    let b = model.builtins();

    let sqrt = model.interner().get_ident("SQRT").unwrap();
    let Some(Decl::Scope(sqrt)) = model.lookup(root, sqrt, KindSet::FUNCTION) else {
        panic!("sqrt is not a built-in function");
    };
    assert_eq!(model.algorithm(sqrt).unwrap().params.len(), 1);
    assert_eq!(model.algorithm(sqrt).unwrap().return_type, Some(b.real));

    let insert = model.interner().get_ident("insert").unwrap();
    assert!(model.lookup(root, insert, KindSet::PROCEDURE).is_some());

    let pi = model.interner().get_ident("pi").unwrap();
    assert!(model.find_variable(root, pi).is_some());

    assert!(model[b.bad].status.is_failed());
    assert!(model[b.integer].status.is_resolved());
    assert!(model[root].status.is_resolved());
}

#[test]
fn identifiers_are_case_insensitive() {
    let mut model = Model::for_test();
    let a = model.symbol("Point", 1);
    let b = model.symbol("POINT", 2);
    assert_eq!(a.name, b.name);
    assert_ne!(a.loc, b.loc);
    assert_eq!(model.name(a.name), "point");
}

#[test]
fn duplicate_declaration_is_recorded() {
    let mut model = Model::for_test();
    let s = model.symbol("s", 1);
    let schema = model.add_schema(s);
    let first = model.symbol("point", 2);
    let first = model.add_entity(schema, first);
    let second = model.symbol("point", 5);
    model.add_entity(schema, second);

    let name = model[first].symbol.name;
    assert_eq!(model[schema].dict.get(&name), Some(&Decl::Scope(first)));
    assert_eq!(model.duplicates.len(), 1);
    assert_eq!(model.duplicates[0].1.loc.line, 5);
}

#[test]
fn zero_and_one_are_shared() {
    let mut model = Model::for_test();
    let a = model.int(0, 1);
    let b = model.int(0, 7);
    let c = model.int(1, 2);
    let d = model.int(2, 2);

    assert_eq!(a, b);
    assert_eq!(a, model.builtins().zero);
    assert_eq!(c, model.builtins().one);
    assert_ne!(d, a);
    assert!(!model[d].status.is_done());
}

#[test]
fn entity_has_implicit_type() {
    let mut model = Model::for_test();
    let s = model.symbol("s", 1);
    let schema = model.add_schema(s);
    let point = model.symbol("point", 2);
    let entity = model.add_entity(schema, point);

    let ty = model.entity(entity).unwrap().ty;
    assert_eq!(model.entity_of_type(ty), Some(entity));
    assert_eq!(model.decl_kind(Decl::Scope(entity)), Some(DeclKind::Entity));
    assert_eq!(model[entity].parent, Some(schema));
}

#[test]
fn enumeration_items_live_in_enum_namespace() {
    let mut model = Model::for_test();
    let s = model.symbol("s", 1);
    let schema = model.add_schema(s);
    let colour = model.symbol("colour", 2);
    let red = model.symbol("red", 2);
    let green = model.symbol("green", 2);
    let ty = model.declare_enumeration(schema, colour, &[red, green]);

    assert!(!model[schema].dict.contains_key(&red.name));
    let item = model.lookup_enum_item(schema, red.name).unwrap();
    assert!(matches!(model[item].kind, ExprKind::EnumItem { ty: t } if t == ty));
    let Some(TypeBody::Enumeration(items)) = model.body(ty) else {
        panic!("not an enumeration");
    };
    assert_eq!(items.len(), 2);
}

#[test]
fn type_ref_is_a_bare_name() {
    let mut model = Model::for_test();
    let s = model.symbol("s", 1);
    let schema = model.add_schema(s);
    let ty = model.ty(schema, "length", 3);

    assert!(model[ty].reference);
    assert!(model[ty].head.is_none());
    assert!(model[ty].body.is_none());
    assert_eq!(model[ty].scope, schema);
}

#[test]
fn block_scopes_own_their_variable() {
    let mut model = Model::for_test();
    let s = model.symbol("s", 1);
    let schema = model.add_schema(s);
    let f = model.symbol("f", 2);
    let integer = model.ty(schema, "integer", 2);
    let func = model.add_function(schema, f, integer);

    let one = model.int(1, 3);
    let ten = model.int(10, 3);
    let i = model.symbol("i", 3);
    let inc = model.increment(func, i, one, ten, None);
    let ScopeData::Increment(data) = &model[inc].data else {
        panic!("not an increment scope");
    };
    let var = data.var;
    assert_eq!(model[var].owner, inc);
    assert_eq!(model[var].ty, model.builtins().integer);
    assert_eq!(model[inc].kind(), None);
    assert!(!model[func].dict.contains_key(&i.name));

    let src = model.ident("items", 4);
    let cond = model.ident("x", 4);
    let x = model.symbol("x", 4);
    let query = model.query(func, x, src, cond);
    let ExprKind::Query { scope, .. } = model[query].kind else {
        panic!("not a query");
    };
    let ScopeData::Query { var } = model[scope].data else {
        panic!("not a query scope");
    };
    assert_eq!(model[scope].dict.get(&x.name), Some(&Decl::Var(var)));
}

#[test]
fn abstract_flag_survives_resolution() {
    let mut model = Model::for_test();
    let s = model.symbol("s", 1);
    let schema = model.add_schema(s);
    let name = model.symbol("shape", 2);
    let shape = model.add_entity(schema, name);
    model.set_abstract(shape);
    let name = model.symbol("circle", 3);
    let circle = model.add_entity(schema, name);
    let sup = model.symbol("shape", 3);
    model.add_supertype(circle, sup);

    model.expect_valid();
    assert!(model.entity(shape).unwrap().is_abstract);
    assert!(!model.entity(circle).unwrap().is_abstract);
}
