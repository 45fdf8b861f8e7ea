use crate::model::{Decl, KindSet, Model, ScopeId, Status};

fn schema(model: &mut Model, name: &str, line: u32) -> ScopeId {
    let name = model.symbol(name, line);
    model.add_schema(name)
}

fn entity(model: &mut Model, scope: ScopeId, name: &str, line: u32) -> ScopeId {
    let name = model.symbol(name, line);
    model.add_entity(scope, name)
}

#[test]
fn use_with_alias_binds_same_entity() {
    let mut model = Model::for_test();
    let s1 = schema(&mut model, "s1", 1);
    let point = entity(&mut model, s1, "point", 2);
    let s2 = schema(&mut model, "s2", 4);
    let from = model.symbol("s1", 5);
    let old = model.symbol("point", 5);
    let alias = model.symbol("pt", 5);
    let rename = model.add_use(s2, from, old, Some(alias));

    model.expect_valid();

    assert_eq!(model[rename].status, Status::Resolved);
    assert_eq!(model[rename].target, Some(Decl::Scope(point)));
    assert_eq!(
        model.lookup(s2, alias.name, KindSet::ENTITY),
        model.lookup(s1, old.name, KindSet::ENTITY)
    );
    // Only the alias is visible.
    assert_eq!(model.lookup(s2, old.name, KindSet::ENTITY), None);
}

#[test]
fn use_of_a_use_follows_the_chain() {
    let mut model = Model::for_test();
    let s1 = schema(&mut model, "s1", 1);
    let point = entity(&mut model, s1, "point", 2);
    // Declared before the schema it imports from.
    let s3 = schema(&mut model, "s3", 3);
    let from = model.symbol("s2", 4);
    let old = model.symbol("pt", 4);
    let outer = model.add_reference(s3, from, old, None);
    let s2 = schema(&mut model, "s2", 6);
    let from = model.symbol("s1", 7);
    let old = model.symbol("point", 7);
    let alias = model.symbol("pt", 7);
    let inner = model.add_use(s2, from, old, Some(alias));

    model.expect_valid();

    assert_eq!(model[inner].status, Status::Resolved);
    assert_eq!(model[outer].target, Some(Decl::Scope(point)));
    assert_eq!(
        model.lookup(s3, alias.name, KindSet::ENTITY),
        Some(Decl::Scope(point))
    );
    assert_eq!(model.lookup(s2, alias.name, KindSet::ANY), Some(Decl::Scope(point)));
}

#[test]
fn import_through_whole_schema_interface() {
    let mut model = Model::for_test();
    let s1 = schema(&mut model, "s1", 1);
    let point = entity(&mut model, s1, "point", 2);
    let s2 = schema(&mut model, "s2", 3);
    let from = model.symbol("s1", 4);
    model.use_schema(s2, from);
    let s3 = schema(&mut model, "s3", 5);
    let from = model.symbol("s2", 6);
    let old = model.symbol("point", 6);
    let rename = model.add_use(s3, from, old, None);

    model.expect_valid();

    assert_eq!(model[rename].target, Some(Decl::Scope(point)));
}

#[test]
fn import_cycle_is_reported_once() {
    let mut model = Model::for_test();
    let s1 = schema(&mut model, "s1", 1);
    let from = model.symbol("s2", 2);
    let old = model.symbol("x", 2);
    let first = model.add_use(s1, from, old, None);
    let s2 = schema(&mut model, "s2", 5);
    let from = model.symbol("s1", 6);
    let old = model.symbol("x", 6);
    let second = model.add_use(s2, from, old, None);

    insta::assert_snapshot!(model.expect_invalid(), @"test.exp:2: error: circularity: definition of `x` references itself");
    assert_eq!(model[first].status, Status::Failed);
    assert_eq!(model[second].status, Status::Failed);
    assert_eq!(model.lookup(s1, old.name, KindSet::ANY), None);
}

#[test]
fn undefined_schema() {
    let mut model = Model::for_test();
    let s = schema(&mut model, "s", 1);
    let from = model.symbol("nowhere", 2);
    model.use_schema(s, from);
    let from = model.symbol("nowhere", 3);
    let old = model.symbol("thing", 3);
    let rename = model.add_reference(s, from, old, None);

    insta::assert_snapshot!(model.expect_invalid(), @r"
    test.exp:2: error: reference to undefined schema `nowhere`
    test.exp:3: error: reference to undefined schema `nowhere`
    ");
    assert!(model[s].status.is_failed());
    assert_eq!(model[rename].status, Status::Failed);
}

#[test]
fn undefined_object_in_schema() {
    let mut model = Model::for_test();
    let s1 = schema(&mut model, "s1", 1);
    entity(&mut model, s1, "point", 2);
    let s2 = schema(&mut model, "s2", 4);
    let from = model.symbol("s1", 5);
    let old = model.symbol("ghost", 5);
    model.add_use(s2, from, old, None);

    insta::assert_snapshot!(model.expect_invalid(), @"test.exp:5: error: `ghost` is not defined in schema `s1`");
}

#[test]
fn alias_colliding_with_local_declaration() {
    let mut model = Model::for_test();
    let s1 = schema(&mut model, "s1", 1);
    entity(&mut model, s1, "point", 2);
    let s2 = schema(&mut model, "s2", 4);
    let local = entity(&mut model, s2, "pt", 5);
    let from = model.symbol("s1", 6);
    let old = model.symbol("point", 6);
    let alias = model.symbol("pt", 6);
    let rename = model.add_use(s2, from, old, Some(alias));

    insta::assert_snapshot!(model.expect_invalid(), @"test.exp:6: error: `pt` is already declared in this scope");
    assert_eq!(model[rename].status, Status::Failed);
    assert!(model[s2].status.is_failed());
    assert_eq!(
        model.lookup(s2, alias.name, KindSet::ENTITY),
        Some(Decl::Scope(local))
    );
}

#[test]
fn same_object_imported_twice() {
    let mut model = Model::for_test();
    let s1 = schema(&mut model, "s1", 1);
    entity(&mut model, s1, "point", 2);
    let s2 = schema(&mut model, "s2", 4);
    for line in [5, 6] {
        let from = model.symbol("s1", line);
        let old = model.symbol("point", line);
        model.add_use(s2, from, old, None);
    }

    model.expect_valid();
    assert!(!model[s2].status.is_failed());
}

#[test]
fn duplicate_declaration_reported_first() {
    let mut model = Model::for_test();
    let s = schema(&mut model, "s", 1);
    entity(&mut model, s, "point", 2);
    entity(&mut model, s, "POINT", 8);

    insta::assert_snapshot!(model.expect_invalid(), @"test.exp:8: error: `point` is already declared in this scope");
    assert!(model[s].status.is_failed());
}
