use crate::model::{Model, ScopeId, TypeId};
use crate::{ResolverBuilder, WarningClass};

fn schema(model: &mut Model) -> ScopeId {
    let name = model.symbol("loops", 1);
    model.add_schema(name)
}

fn entity(model: &mut Model, schema: ScopeId, name: &str, line: u32, sup: &str) -> ScopeId {
    let name = model.symbol(name, line);
    let id = model.add_entity(schema, name);
    let sup = model.symbol(sup, line);
    model.add_supertype(id, sup);
    id
}

fn select(model: &mut Model, schema: ScopeId, name: &str, line: u32, members: &[&str]) -> TypeId {
    let name = model.symbol(name, line);
    let members = members
        .iter()
        .map(|member| model.ty(schema, member, line))
        .collect();
    model.declare_select(schema, name, members)
}

#[test]
fn subtype_cycle_reports_each_entry_point() {
    let mut model = Model::for_test();
    let s = schema(&mut model);
    let a = entity(&mut model, s, "a", 2, "b");
    let b = entity(&mut model, s, "b", 3, "a");

    insta::assert_snapshot!(model.expect_invalid(), @r"
    test.exp:2: error: entity `a` is a subtype of itself
      test.exp:3: via supertype entity `b`
    test.exp:3: error: entity `b` is a subtype of itself
      test.exp:2: via supertype entity `a`
    ");
    assert!(model[a].status.is_failed());
    assert!(model[b].status.is_failed());
}

#[test]
fn entity_that_is_its_own_supertype() {
    let mut model = Model::for_test();
    let s = schema(&mut model);
    let a = entity(&mut model, s, "a", 2, "a");

    insta::assert_snapshot!(model.expect_invalid(), @"test.exp:2: error: entity `a` is a subtype of itself");
    assert_eq!(model.entity(a).unwrap().inheritance, Some(0));
}

#[test]
fn subtype_cycle_check_can_be_disabled() {
    let mut model = Model::for_test();
    let s = schema(&mut model);
    let a = entity(&mut model, s, "a", 2, "b");
    entity(&mut model, s, "b", 3, "a");

    let builder = ResolverBuilder::new()
        .disable_warning("circular_subtype")
        .unwrap();
    let resolution = model.expect_resolution_with(builder);
    assert!(resolution.diagnostics.is_empty());
    assert!(!model[a].status.is_failed());
}

#[test]
fn select_cycle_terminates_and_is_reported() {
    let mut model = Model::for_test();
    let s = schema(&mut model);
    let first = select(&mut model, s, "first", 2, &["second", "point"]);
    let second = select(&mut model, s, "second", 3, &["first"]);
    let name = model.symbol("point", 4);
    model.add_entity(s, name);

    insta::assert_snapshot!(model.expect_invalid(), @r"
    test.exp:2: error: select type `first` selects itself
      test.exp:3: via select type `second`
    test.exp:3: error: select type `second` selects itself
      test.exp:2: via select type `first`
    ");
    assert!(model[first].status.is_failed());
    assert!(model[second].status.is_failed());
}

#[test]
fn select_cycle_left_resolved_when_disabled() {
    let mut model = Model::for_test();
    let s = schema(&mut model);
    let first = select(&mut model, s, "first", 2, &["second"]);
    let second = select(&mut model, s, "second", 3, &["first"]);

    let builder = ResolverBuilder::new().with_disabled_warning(WarningClass::CircularSelect);
    let resolution = model.expect_resolution_with(builder);
    assert!(resolution.diagnostics.is_empty());
    assert!(model[first].status.is_resolved());
    assert!(model[second].status.is_resolved());
}

#[test]
fn shared_member_is_not_a_cycle() {
    let mut model = Model::for_test();
    let s = schema(&mut model);
    let leaf = select(&mut model, s, "leaf", 2, &["point"]);
    let left = select(&mut model, s, "left", 3, &["leaf"]);
    select(&mut model, s, "top", 4, &["left", "leaf"]);
    let name = model.symbol("point", 5);
    model.add_entity(s, name);

    model.expect_valid();
    assert!(model[leaf].status.is_resolved());
    assert!(model[left].status.is_resolved());
}
