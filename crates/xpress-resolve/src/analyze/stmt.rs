//! Expression pass: statements, domain rules, and the walk over every
//! declaration that owns expressions.

use xpress_core::Symbol;

use super::{Ctx, Expected, Resolver};
use crate::diagnostics::DiagnosticKind;
use crate::model::{
    CaseItem, Decl, DeclKind, ExprId, ExprKind, KindSet, Literal, Logical, ScopeData, ScopeId,
    Status, StmtId, StmtKind, TypeBody, TypeId, VarId, Where,
};

/// Owner of a list of domain rules.
#[derive(Debug, Clone, Copy)]
enum RuleOwner {
    /// Entity or global rule.
    Scope(ScopeId),
    Type(TypeId),
}

impl Resolver<'_> {
    pub(super) fn resolve_expressions(&mut self) {
        for schema in self.schemas() {
            self.expressions_in(schema);
            self.settle_scope(schema);
        }
    }

    fn expressions_in(&mut self, scope: ScopeId) {
        let name = self.model[scope].symbol.name;
        log::trace!("expressions: scope `{}`", self.model.name(name));
        let ctx = Ctx::new(scope);

        for decl in self.local_decls(scope) {
            let failed = match decl {
                Decl::Scope(id) => {
                    match self.scope_kind(id) {
                        _ if self.settled_before(id) => {}
                        Some(DeclKind::Entity) => self.entity_expressions(id),
                        Some(DeclKind::Function | DeclKind::Procedure) => {
                            self.expressions_in(id);
                            let body = self
                                .model
                                .algorithm(id)
                                .map(|alg| alg.body.clone())
                                .unwrap_or_default();
                            self.resolve_stmts(&body, Ctx::new(id));
                            self.settle_scope(id);
                        }
                        Some(DeclKind::Rule) => self.rule_expressions(id),
                        Some(DeclKind::Schema) => self.expressions_in(id),
                        _ => {}
                    }
                    self.model[id].status.is_failed()
                }
                Decl::Var(var) => self.var_expressions(var, ctx),
                Decl::Type(ty) => {
                    self.type_expressions(ty);
                    self.model[ty].status.is_failed()
                }
                Decl::Rename(_) => false,
            };
            if failed {
                self.fail_scope(scope);
            }
        }
    }

    /// Constant, parameter or local. Returns true on failure.
    fn var_expressions(&mut self, var: VarId, ctx: Ctx) -> bool {
        let ty = self.model[var].ty;
        self.type_expressions(ty);
        if let Some(init) = self.model[var].initializer {
            self.resolve_expr(init, ctx, Expected::Type(ty));
            if self.expr_failed(init) {
                self.model[var].status = Status::Failed;
            }
        }
        let status = &mut self.model[var].status;
        if !status.is_failed() {
            *status = Status::Resolved;
        }
        status.is_failed()
    }

    fn rule_expressions(&mut self, rule: ScopeId) {
        self.expressions_in(rule);
        let body = match &self.model[rule].data {
            ScopeData::Rule(data) => data.body.clone(),
            _ => Vec::new(),
        };
        let ctx = Ctx::new(rule);
        self.resolve_stmts(&body, ctx);
        self.resolve_wheres(RuleOwner::Scope(rule), ctx, false);
        self.settle_scope(rule);
    }

    /// Attribute checks, initializers and domain rules of an entity.
    fn entity_expressions(&mut self, entity: ScopeId) {
        let Some(data) = self.model.entity(entity) else {
            return;
        };
        let ctx = Ctx::new(entity).with_self(data.ty);
        let attributes = data.attributes.clone();

        let mut failed = false;
        for attr in attributes {
            if !self.model[attr].status.is_done() {
                match self.model[attr].redeclares {
                    Some(sup) => self.check_redeclaration(entity, attr, sup),
                    None => self.check_overloaded(entity, attr),
                }
            }
            failed |= self.var_expressions(attr, ctx);
        }
        self.resolve_wheres(RuleOwner::Scope(entity), ctx, true);

        if failed {
            self.fail_scope(entity);
        } else {
            self.settle_scope(entity);
        }
    }

    /// `SELF\sup.attr : ty;` must name a proper supertype that declares
    /// `attr` itself.
    fn check_redeclaration(&mut self, entity: ScopeId, attr: VarId, sup: Symbol) {
        let name = self.model[attr].name;
        let found = self
            .model
            .find_inherited_entity(entity, sup.name)
            .filter(|found| *found != entity);
        let Some(found) = found else {
            self.diag
                .report(DiagnosticKind::RedeclNoSuchSupertype, sup.loc)
                .arg(self.model.name(sup.name))
                .arg(self.model.name(name.name))
                .emit();
            self.model[attr].status = Status::Failed;
            return;
        };
        if self.model.local_attribute(found, name.name).is_none() {
            self.diag
                .report(DiagnosticKind::RedeclNoSuchAttribute, name.loc)
                .arg(self.model.name(name.name))
                .arg(self.model.name(sup.name))
                .emit();
            self.model[attr].status = Status::Failed;
        }
    }

    /// A new attribute must not repeat a name it already inherits.
    fn check_overloaded(&mut self, entity: ScopeId, attr: VarId) {
        let name = self.model[attr].name;
        let supertypes = self
            .model
            .entity(entity)
            .map(|data| data.supertypes.clone())
            .unwrap_or_default();
        for sup in supertypes {
            if self.model.find_inherited_attribute(sup, name.name).is_none() {
                continue;
            }
            let sup_name = self.model[sup].symbol.name;
            self.diag
                .report(DiagnosticKind::OverloadedAttribute, name.loc)
                .arg(self.model.name(name.name))
                .arg(self.model.name(sup_name))
                .emit();
            self.model[attr].status = Status::Failed;
        }
    }

    /// Domain rules, bounds and precision of a type and of the types it is
    /// built from. Stops at a type defined elsewhere.
    fn type_expressions(&mut self, ty: TypeId) {
        let mut visited = Vec::new();
        let mut current = Some(ty);
        while let Some(t) = current.take() {
            if visited.contains(&t) {
                break;
            }
            visited.push(t);

            let ctx = Ctx::new(self.model[t].scope).with_self(t);
            self.resolve_wheres(RuleOwner::Type(t), ctx, true);
            if self.model[t].head.is_some() {
                break;
            }
            match self.model.body(t).cloned() {
                Some(TypeBody::Aggregate {
                    base, lower, upper, ..
                }) => {
                    for bound in [lower, upper].into_iter().flatten() {
                        self.resolve_expr(bound, ctx, Expected::DontCare);
                    }
                    current = Some(base);
                }
                Some(TypeBody::Basic {
                    precision: Some(precision),
                    ..
                }) => self.resolve_expr(precision, ctx, Expected::DontCare),
                _ => {}
            }
        }
    }

    /// Resolve domain rules not yet done. With `need_self`, a rule that never
    /// touches SELF or an attribute fails.
    fn resolve_wheres(&mut self, owner: RuleOwner, ctx: Ctx, need_self: bool) {
        let count = self.wheres(owner).len();
        for i in 0..count {
            let rule = &self.wheres(owner)[i];
            if rule.status.is_done() {
                continue;
            }
            let (label, expr) = (rule.label, rule.expr);

            let outer = std::mem::replace(&mut self.self_seen, false);
            self.resolve_expr(expr, ctx, Expected::DontCare);
            let seen = std::mem::replace(&mut self.self_seen, outer);

            let status = if need_self && !seen {
                self.diag
                    .report(DiagnosticKind::MissingSelf, label.loc)
                    .arg(self.model.name(label.name))
                    .emit();
                Status::Failed
            } else if self.expr_failed(expr) {
                Status::Failed
            } else {
                Status::Resolved
            };
            if let Some(rule) = self.wheres_mut(owner).get_mut(i) {
                rule.status = status;
            }
        }
    }

    fn wheres(&self, owner: RuleOwner) -> &[Where] {
        match owner {
            RuleOwner::Type(ty) => &self.model[ty].wheres,
            RuleOwner::Scope(scope) => match &self.model[scope].data {
                ScopeData::Entity(data) => &data.wheres,
                ScopeData::Rule(data) => &data.wheres,
                _ => &[],
            },
        }
    }

    fn wheres_mut(&mut self, owner: RuleOwner) -> &mut [Where] {
        match owner {
            RuleOwner::Type(ty) => &mut self.model[ty].wheres,
            RuleOwner::Scope(scope) => match &mut self.model[scope].data {
                ScopeData::Entity(data) => &mut data.wheres,
                ScopeData::Rule(data) => &mut data.wheres,
                _ => &mut [],
            },
        }
    }

    pub(super) fn resolve_stmts(&mut self, stmts: &[StmtId], ctx: Ctx) {
        for stmt in stmts {
            self.resolve_stmt(*stmt, ctx);
        }
    }

    fn resolve_stmt(&mut self, id: StmtId, ctx: Ctx) {
        if !self.enter_recursion() {
            return;
        }
        match self.model[id].kind.clone() {
            StmtKind::Alias { scope, body } => self.resolve_alias_stmt(scope, &body, ctx),
            StmtKind::Assign { lhs, rhs } => {
                self.resolve_expr(lhs, ctx, Expected::DontCare);
                let expected = match self.model[lhs].return_type {
                    Some(ty) if !self.expr_failed(lhs) => Expected::Type(ty),
                    _ => Expected::DontCare,
                };
                self.resolve_expr(rhs, ctx, expected);
            }
            StmtKind::Case {
                selector,
                items,
                otherwise,
            } => self.resolve_case(selector, &items, otherwise, ctx),
            StmtKind::Compound(body) => self.resolve_stmts(&body, ctx),
            StmtKind::If {
                test,
                then,
                otherwise,
            } => self.resolve_if(test, &then, &otherwise, ctx),
            StmtKind::ProcCall { args, .. } => self.resolve_proc_call(id, &args, ctx),
            StmtKind::Loop {
                increment,
                while_expr,
                until_expr,
                body,
            } => {
                let mut inner = ctx;
                if let Some(increment) = increment {
                    // Bounds are evaluated before the loop variable exists.
                    if let ScopeData::Increment(inc) = self.model[increment].data.clone() {
                        for bound in [Some(inc.start), Some(inc.end), inc.step]
                            .into_iter()
                            .flatten()
                        {
                            self.resolve_expr(bound, ctx, Expected::DontCare);
                        }
                        self.model[inc.var].status = Status::Resolved;
                    }
                    inner = ctx.in_scope(increment);
                }
                for cond in [while_expr, until_expr].into_iter().flatten() {
                    self.resolve_expr(cond, inner, Expected::DontCare);
                }
                self.resolve_stmts(&body, inner);
            }
            StmtKind::Return(value) => {
                if let Some(value) = value {
                    self.resolve_expr(value, ctx, Expected::DontCare);
                }
            }
            StmtKind::Skip | StmtKind::Escape => {}
        }
        self.exit_recursion();
    }

    /// The alias variable takes the type of the expression it stands for.
    fn resolve_alias_stmt(&mut self, scope: ScopeId, body: &[StmtId], ctx: Ctx) {
        let ScopeData::Alias { var } = self.model[scope].data else {
            return;
        };
        if let Some(init) = self.model[var].initializer {
            self.resolve_expr(init, ctx, Expected::DontCare);
            if self.expr_failed(init) {
                self.model[var].status = Status::Failed;
                return;
            }
            let bad = self.model.builtins().bad;
            self.model[var].ty = self.model[init].return_type.unwrap_or(bad);
        }
        self.model[var].status = Status::Resolved;
        self.resolve_stmts(body, ctx.in_scope(scope));
    }

    /// Labels that cannot be resolved against the selector are dropped with
    /// a warning. An item with no usable label is never resolved.
    fn resolve_case(
        &mut self,
        selector: ExprId,
        items: &[CaseItem],
        otherwise: Option<StmtId>,
        ctx: Ctx,
    ) {
        self.resolve_expr(selector, ctx, Expected::DontCare);
        let expected = match self.model[selector].return_type {
            Some(ty) if !self.expr_failed(selector) => Expected::Type(ty),
            _ => Expected::Unknown,
        };

        for item in items {
            let mut usable = 0;
            for label in &item.labels {
                let mark = self.diag.len();
                self.resolve_expr(*label, ctx, expected);
                if self.model[*label].status.is_resolved() {
                    usable += 1;
                    continue;
                }
                self.diag.truncate(mark);
                let symbol = self.model[*label].symbol;
                self.diag
                    .report(DiagnosticKind::CaseSkipLabel, symbol.loc)
                    .arg(self.model.name(symbol.name))
                    .emit();
            }
            if usable > 0 {
                self.resolve_stmt(item.action, ctx);
            }
        }
        if let Some(otherwise) = otherwise {
            self.resolve_stmt(otherwise, ctx);
        }
    }

    fn resolve_if(&mut self, test: ExprId, then: &[StmtId], otherwise: &[StmtId], ctx: Ctx) {
        self.resolve_expr(test, ctx, Expected::DontCare);
        let constant = self.constant_condition(test);
        match constant {
            Some(value) if self.diag.is_enabled(DiagnosticKind::InvariantCondition) => {
                let loc = self.model[test].symbol.loc;
                self.diag
                    .report(DiagnosticKind::InvariantCondition, loc)
                    .arg(if value { "TRUE" } else { "FALSE" })
                    .emit();
                self.resolve_stmts(if value { then } else { otherwise }, ctx);
            }
            _ => {
                self.resolve_stmts(then, ctx);
                self.resolve_stmts(otherwise, ctx);
            }
        }
    }

    /// The value of a condition written as a TRUE or FALSE literal.
    fn constant_condition(&self, test: ExprId) -> Option<bool> {
        match &self.model[test].kind {
            ExprKind::Literal(Literal::Boolean(value)) => Some(*value),
            ExprKind::Literal(Literal::Logical(Logical::True)) => Some(true),
            ExprKind::Literal(Literal::Logical(Logical::False)) => Some(false),
            _ => None,
        }
    }

    fn resolve_proc_call(&mut self, id: StmtId, args: &[ExprId], ctx: Ctx) {
        let symbol = self.model[id].symbol;
        match self.model.lookup(ctx.scope, symbol.name, KindSet::PROCEDURE) {
            Some(Decl::Scope(proc)) => {
                if let StmtKind::ProcCall { target, .. } = &mut self.model[id].kind {
                    *target = Some(proc);
                }
            }
            _ => match self.model.lookup(ctx.scope, symbol.name, KindSet::ANY) {
                Some(other) => {
                    let line = self.model.decl_symbol(other).loc.line;
                    self.diag
                        .report(DiagnosticKind::ExpectedProc, symbol.loc)
                        .arg(self.model.name(symbol.name))
                        .arg(line)
                        .emit();
                }
                None => {
                    self.diag
                        .report(DiagnosticKind::NoSuchProcedure, symbol.loc)
                        .arg(self.model.name(symbol.name))
                        .emit();
                }
            },
        }
        for arg in args {
            self.resolve_expr(*arg, ctx, Expected::DontCare);
        }
    }
}
