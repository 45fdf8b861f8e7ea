use crate::model::{
    Binding, CaseItem, Decl, ExprId, ExprKind, Literal, Logical, Model, Operator, ScopeData,
    ScopeId, Status, StmtId, StmtKind, VarFlags, VarId,
};
use crate::{ResolverBuilder, WarningClass};

struct Fixture {
    model: Model,
    schema: ScopeId,
}

impl Fixture {
    fn new() -> Self {
        let mut model = Model::for_test();
        let name = model.symbol("s", 1);
        let schema = model.add_schema(name);
        Self { model, schema }
    }

    fn procedure(&mut self, name: &str, line: u32) -> ScopeId {
        let name = self.model.symbol(name, line);
        self.model.add_procedure(self.schema, name)
    }

    fn local(&mut self, scope: ScopeId, name: &str, ty: &str, line: u32) -> VarId {
        let name = self.model.symbol(name, line);
        let ty = self.model.ty(scope, ty, line);
        self.model.add_local(scope, name, ty, None)
    }

    fn entity(&mut self, name: &str, line: u32, supertypes: &[&str]) -> ScopeId {
        let name = self.model.symbol(name, line);
        let id = self.model.add_entity(self.schema, name);
        for sup in supertypes {
            let sup = self.model.symbol(sup, line);
            self.model.add_supertype(id, sup);
        }
        id
    }

    fn stmt(&mut self, keyword: &str, kind: StmtKind, line: u32) -> StmtId {
        let at = self.model.symbol(keyword, line);
        self.model.stmt(at, kind)
    }

    fn assign(&mut self, lhs: &str, rhs: ExprId, line: u32) -> StmtId {
        let lhs = self.model.ident(lhs, line);
        self.stmt(":=", StmtKind::Assign { lhs, rhs }, line)
    }

    fn call(&mut self, name: &str, args: Vec<ExprId>, line: u32) -> StmtId {
        self.stmt(name, StmtKind::ProcCall { args, target: None }, line)
    }

    fn binary(&mut self, op: Operator, lhs: ExprId, rhs: ExprId, line: u32) -> ExprId {
        let at = self.model.symbol(op.token(), line);
        self.model.binary(at, op, lhs, rhs)
    }

    fn logical(&mut self, value: Logical, line: u32) -> ExprId {
        let at = self.model.symbol("true", line);
        self.model.literal(at, Literal::Logical(value))
    }
}

#[test]
fn case_label_that_cannot_match_is_dropped() {
    let mut f = Fixture::new();
    let p = f.procedure("p", 2);
    f.local(p, "x", "integer", 3);

    let selector = f.model.ident("x", 4);
    let one = f.model.int(1, 5);
    let two = f.model.int(2, 5);
    let first = f.assign("x", two, 5);
    let ghost = f.model.ident("ghost", 6);
    let unreached = f.model.ident("nowhere", 6);
    let second = f.assign("x", unreached, 6);
    let otherwise = f.stmt("skip", StmtKind::Skip, 7);
    let case = f.stmt(
        "case",
        StmtKind::Case {
            selector,
            items: vec![
                CaseItem {
                    labels: vec![one],
                    action: first,
                },
                CaseItem {
                    labels: vec![ghost],
                    action: second,
                },
            ],
            otherwise: Some(otherwise),
        },
        4,
    );
    f.model.set_body(p, vec![case]);

    let resolution = f.model.expect_valid();
    insta::assert_snapshot!(resolution.diagnostics.render(f.model.interner()), @"test.exp:6: warning: CASE label `ghost` cannot be matched, ignoring its statements");
    assert_eq!(f.model.expr_status(two), Status::Resolved);
    assert_eq!(f.model.expr_status(unreached), Status::Unresolved);
}

#[test]
fn case_label_warning_can_be_disabled() {
    let mut f = Fixture::new();
    let p = f.procedure("p", 2);
    f.local(p, "x", "integer", 3);
    let selector = f.model.ident("x", 4);
    let ghost = f.model.ident("ghost", 5);
    let action = f.stmt("skip", StmtKind::Skip, 5);
    let case = f.stmt(
        "case",
        StmtKind::Case {
            selector,
            items: vec![CaseItem {
                labels: vec![ghost],
                action,
            }],
            otherwise: None,
        },
        4,
    );
    f.model.set_body(p, vec![case]);

    let builder = ResolverBuilder::new().with_disabled_warning(WarningClass::InvalidCase);
    let resolution = f.model.expect_resolution_with(builder);
    assert!(resolution.diagnostics.is_empty());
}

#[test]
fn invariant_condition_skips_dead_branch() {
    let build = || {
        let mut f = Fixture::new();
        let p = f.procedure("p", 2);
        f.local(p, "x", "integer", 2);
        let test = f.logical(Logical::True, 3);
        let two = f.model.int(2, 4);
        let then = f.assign("x", two, 4);
        let ghost = f.model.ident("ghost", 5);
        let otherwise = f.assign("x", ghost, 5);
        let stmt = f.stmt(
            "if",
            StmtKind::If {
                test,
                then: vec![then],
                otherwise: vec![otherwise],
            },
            3,
        );
        f.model.set_body(p, vec![stmt]);
        f
    };

    let mut f = build();
    let resolution = f.model.expect_valid();
    insta::assert_snapshot!(resolution.diagnostics.render(f.model.interner()), @"test.exp:3: warning: IF condition is always TRUE, ignoring the branch that is never taken");

    let mut f = build();
    let builder = ResolverBuilder::new().with_disabled_warning(WarningClass::InvariantCondition);
    let resolution = f.model.expect_resolution_with(builder);
    insta::assert_snapshot!(resolution.diagnostics.render(f.model.interner()), @"test.exp:5: error: reference to undefined object `ghost`");
}

#[test]
fn loop_variable_is_scoped_to_the_loop() {
    let mut f = Fixture::new();
    let p = f.procedure("p", 2);
    f.local(p, "n", "integer", 2);
    f.local(p, "total", "integer", 2);

    let start = f.model.int(1, 3);
    let end = f.model.ident("n", 3);
    let step = f.model.int(2, 3);
    let var = f.model.symbol("i", 3);
    let increment = f.model.increment(p, var, start, end, Some(step));
    let i = f.model.ident("i", 3);
    let ten = f.model.int(10, 3);
    let while_expr = f.binary(Operator::Less, i, ten, 3);

    let total = f.model.ident("total", 4);
    let inner = f.model.ident("i", 4);
    let sum = f.binary(Operator::Plus, total, inner, 4);
    let body = f.assign("total", sum, 4);
    let repeat = f.stmt(
        "repeat",
        StmtKind::Loop {
            increment: Some(increment),
            while_expr: Some(while_expr),
            until_expr: None,
            body: vec![body],
        },
        3,
    );
    let outside = f.model.ident("i", 5);
    let after = f.assign("total", outside, 5);
    f.model.set_body(p, vec![repeat, after]);

    insta::assert_snapshot!(f.model.expect_invalid(), @"test.exp:5: error: reference to undefined object `i`");
    let ScopeData::Increment(inc) = &f.model[increment].data else {
        panic!("not an increment scope");
    };
    let var = inc.var;
    assert_eq!(f.model[var].status, Status::Resolved);
    assert_eq!(f.model.var_type_name(var), "integer");
    assert!(matches!(
        f.model[inner].kind,
        ExprKind::Identifier { target: Some(Binding::Decl(Decl::Var(v))) } if v == var
    ));
    assert_eq!(f.model.expr_type_name(sum), Some("integer"));
}

#[test]
fn procedure_call_targets() {
    let mut f = Fixture::new();
    let q = f.procedure("q", 2);
    let name = f.model.symbol("f", 3);
    let ret = f.model.ty(f.schema, "integer", 3);
    f.model.add_function(f.schema, name, ret);
    let p = f.procedure("p", 4);

    let args = vec![f.model.int(2, 5)];
    let ok = f.call("Q", args, 5);
    let args = vec![f.model.int(2, 6)];
    let missing = f.call("nope", args, 6);
    let not_proc = f.call("f", Vec::new(), 7);
    let args = vec![f.model.int(2, 8), f.model.int(3, 8)];
    let builtin = f.call("remove", args, 8);
    f.model.set_body(p, vec![ok, missing, not_proc, builtin]);

    insta::assert_snapshot!(f.model.expect_invalid(), @r"
    test.exp:6: error: no such procedure as `nope`
    test.exp:7: error: `f` is used as a procedure call but is not defined as one (line 3)
    ");
    assert!(matches!(f.model[ok].kind, StmtKind::ProcCall { target: Some(t), .. } if t == q));
    assert!(matches!(
        f.model[builtin].kind,
        StmtKind::ProcCall {
            target: Some(_),
            ..
        }
    ));
    assert!(matches!(
        f.model[missing].kind,
        StmtKind::ProcCall { target: None, .. }
    ));
}

#[test]
fn alias_variable_takes_expression_type() {
    let mut f = Fixture::new();
    let point = f.entity("point", 2, &[]);
    let name = f.model.symbol("x", 3);
    let real = f.model.ty(point, "real", 3);
    let x = f.model.add_attribute(point, name, real);
    let p = f.procedure("move", 4);
    f.local(p, "pt", "point", 5);

    let owner = f.model.ident("pt", 6);
    let member = f.model.ident("x", 6);
    let target = f.binary(Operator::Dot, owner, member, 6);
    let at = f.model.symbol("2.0", 7);
    let value = f.model.literal(at, Literal::Real(2.0));
    let assign = f.assign("v", value, 7);
    let at = f.model.symbol("alias", 6);
    let var = f.model.symbol("v", 6);
    let alias = f.model.alias_stmt(p, at, var, target, vec![assign]);
    f.model.set_body(p, vec![alias]);

    f.model.expect_valid();
    let StmtKind::Alias { scope, .. } = f.model[alias].kind else {
        panic!("not an alias statement");
    };
    let ScopeData::Alias { var } = f.model[scope].data else {
        panic!("not an alias scope");
    };
    assert_eq!(f.model[var].status, Status::Resolved);
    assert_eq!(f.model[var].ty, f.model[x].ty);
    let StmtKind::Assign { lhs, .. } = f.model[assign].kind else {
        panic!("not an assignment");
    };
    assert!(matches!(
        f.model[lhs].kind,
        ExprKind::Identifier { target: Some(Binding::Decl(Decl::Var(v))) } if v == var
    ));
}

#[test]
fn redeclared_and_overloaded_attributes() {
    let mut f = Fixture::new();
    let a = f.entity("a", 2, &[]);
    let name = f.model.symbol("x", 3);
    let real = f.model.ty(a, "real", 3);
    f.model.add_attribute(a, name, real);

    let redeclare = |f: &mut Fixture, entity: ScopeId, sup: &str, attr: &str, line: u32| {
        let sup = f.model.symbol(sup, line);
        let name = f.model.symbol(attr, line);
        let ty = f.model.ty(entity, "integer", line);
        f.model.redeclare_attribute(entity, sup, name, ty)
    };

    let b = f.entity("b", 4, &["a"]);
    let narrowed = redeclare(&mut f, b, "a", "x", 5);
    let c = f.entity("c", 6, &["a"]);
    let name = f.model.symbol("x", 7);
    let real = f.model.ty(c, "real", 7);
    let repeated = f.model.add_attribute(c, name, real);
    let d = f.entity("d", 8, &["a"]);
    redeclare(&mut f, d, "ghost", "y", 9);
    let e = f.entity("e", 10, &["a"]);
    redeclare(&mut f, e, "a", "z", 11);

    insta::assert_snapshot!(f.model.expect_invalid(), @r"
    test.exp:7: error: attribute `x` already inherited via supertype `a`
    test.exp:9: error: no such supertype `ghost` for redeclaration of attribute `y`
    test.exp:11: error: redeclared attribute `z` not declared in supertype `a`
    ");
    assert_eq!(f.model[narrowed].status, Status::Resolved);
    assert!(f.model[b].status.is_resolved());
    assert_eq!(f.model[repeated].status, Status::Failed);
    for entity in [c, d, e] {
        assert!(f.model[entity].status.is_failed());
    }
}

#[test]
fn domain_rules_must_refer_to_self() {
    let mut f = Fixture::new();
    let name = f.model.symbol("positive", 2);
    let integer = f.model.ty(f.schema, "integer", 2);
    let positive = f.model.declare_alias(f.schema, name, integer);
    let at = f.model.symbol("self", 3);
    let this = f.model.self_ref(at);
    let zero = f.model.int(0, 3);
    let check = f.binary(Operator::Greater, this, zero, 3);
    let label = f.model.symbol("wr1", 3);
    f.model.add_type_where(positive, label, check);

    let name = f.model.symbol("weird", 4);
    let integer = f.model.ty(f.schema, "integer", 4);
    let weird = f.model.declare_alias(f.schema, name, integer);
    let one = f.model.int(1, 5);
    let zero = f.model.int(0, 5);
    let constant = f.binary(Operator::Greater, one, zero, 5);
    let label = f.model.symbol("wr2", 5);
    f.model.add_type_where(weird, label, constant);

    let e = f.entity("e", 6, &[]);
    let name = f.model.symbol("n", 7);
    let integer = f.model.ty(e, "integer", 7);
    let flags = VarFlags {
        attribute: true,
        ..VarFlags::default()
    };
    f.model.add_attribute_with(e, name, integer, flags);
    let n = f.model.ident("n", 8);
    let zero = f.model.int(0, 8);
    let attr_check = f.binary(Operator::Greater, n, zero, 8);
    let label = f.model.symbol("wr3", 8);
    f.model.add_where(e, label, attr_check);

    let name = f.model.symbol("r", 9);
    let rule = f.model.add_rule(f.schema, name);
    let one = f.model.int(1, 10);
    let zero = f.model.int(0, 10);
    let global = f.binary(Operator::Greater, one, zero, 10);
    let label = f.model.symbol("wr4", 10);
    f.model.add_where(rule, label, global);

    insta::assert_snapshot!(f.model.expect_diagnostics(), @"test.exp:5: warning: domain rule `wr2` must refer to SELF or an attribute");
    assert_eq!(f.model[positive].wheres[0].status, Status::Resolved);
    assert_eq!(f.model[this].return_type, Some(positive));
    assert_eq!(f.model[weird].wheres[0].status, Status::Failed);
    assert_eq!(f.model.entity(e).unwrap().wheres[0].status, Status::Resolved);
    let ScopeData::Rule(data) = &f.model[rule].data else {
        panic!("not a rule");
    };
    assert_eq!(data.wheres[0].status, Status::Resolved);
}

#[test]
fn rule_with_failed_expression_fails() {
    let mut f = Fixture::new();
    let e = f.entity("e", 2, &[]);
    let at = f.model.symbol("self", 3);
    let this = f.model.self_ref(at);
    let ghost = f.model.ident("ghost", 3);
    let check = f.binary(Operator::Equal, this, ghost, 3);
    let label = f.model.symbol("wr1", 3);
    f.model.add_where(e, label, check);

    insta::assert_snapshot!(f.model.expect_invalid(), @"test.exp:3: error: reference to undefined object `ghost`");
    assert_eq!(f.model.entity(e).unwrap().wheres[0].status, Status::Failed);
}
