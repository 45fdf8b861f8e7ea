//! Expression resolution.
//!
//! Binds identifiers and calls, types every expression node, and records
//! whether SELF was touched so domain rules can be checked for it.

use super::Resolver;
use super::ops;
use crate::diagnostics::DiagnosticKind;
use crate::model::{
    Binding, Decl, DeclKind, ExprId, ExprKind, KindSet, Literal, ScopeData, ScopeId, Status,
    TypeBody, TypeId,
};

/// Type the surrounding construct wants from an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Expected {
    /// Nothing is known yet. An identifier that cannot be bound is left
    /// unresolved instead of reported.
    Unknown,
    /// Any type will do.
    DontCare,
    Type(TypeId),
}

/// Where an expression is resolved.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Ctx {
    pub(crate) scope: ScopeId,
    /// What SELF stands for: the entity's type inside an entity, the type
    /// itself inside a type's domain rules.
    pub(crate) self_type: Option<TypeId>,
}

impl Ctx {
    pub(crate) fn new(scope: ScopeId) -> Self {
        Self {
            scope,
            self_type: None,
        }
    }

    pub(crate) fn with_self(self, ty: TypeId) -> Self {
        Self {
            self_type: Some(ty),
            ..self
        }
    }

    pub(crate) fn in_scope(self, scope: ScopeId) -> Self {
        Self { scope, ..self }
    }
}

impl Resolver<'_> {
    pub(crate) fn resolve_expr(&mut self, id: ExprId, ctx: Ctx, expected: Expected) {
        if self.model[id].status.is_done() {
            return;
        }
        if !self.enter_recursion() {
            return;
        }

        match self.model[id].kind.clone() {
            ExprKind::Literal(literal) => {
                let ty = self.literal_type(&literal);
                self.settle_expr(id, ty);
            }
            ExprKind::Identifier { .. } => self.resolve_identifier(id, ctx, expected),
            ExprKind::Call { args, .. } => self.resolve_call(id, &args, ctx, expected),
            ExprKind::Aggregate(elements) => {
                let mut failed = false;
                for element in elements {
                    self.resolve_expr(element, ctx, Expected::DontCare);
                    failed |= self.expr_failed(element);
                }
                if failed {
                    self.fail_expr(id);
                } else {
                    self.settle_expr(id, self.model.builtins().aggregate);
                }
            }
            ExprKind::Op { op, operands } => match ops::resolver(op)(self, id, &operands, ctx) {
                Some(ty) => self.settle_expr(id, ty),
                None => self.fail_expr(id),
            },
            ExprKind::Query {
                scope,
                source,
                condition,
            } => self.resolve_query(id, scope, source, condition, ctx),
            ExprKind::SelfRef => match ctx.self_type {
                Some(ty) => {
                    self.self_seen = true;
                    self.settle_expr(id, ty);
                }
                None => {
                    let loc = self.model[id].symbol.loc;
                    self.diag.report(DiagnosticKind::SelfIsUnknown, loc).emit();
                    self.fail_expr(id);
                }
            },
            ExprKind::EnumItem { ty } => self.settle_expr(id, ty),
        }

        self.exit_recursion();
    }

    fn literal_type(&self, literal: &Literal) -> TypeId {
        let builtins = self.model.builtins();
        match literal {
            Literal::Integer(_) => builtins.integer,
            Literal::Real(_) => builtins.real,
            Literal::String(_) => builtins.string,
            Literal::Binary(_) => builtins.binary,
            Literal::Boolean(_) => builtins.boolean,
            Literal::Logical(_) => builtins.logical,
            Literal::Indeterminate => builtins.generic,
        }
    }

    /// Variables first, then any declaration, then enumeration items.
    fn resolve_identifier(&mut self, id: ExprId, ctx: Ctx, expected: Expected) {
        let symbol = self.model[id].symbol;

        if let Some(var) = self.model.find_variable(ctx.scope, symbol.name) {
            if self.model[var].flags.attribute {
                self.self_seen = true;
            }
            self.bind(id, Binding::Decl(Decl::Var(var)));
            self.settle_expr(id, self.model[var].ty);
            return;
        }

        if let Some(decl) = self.model.lookup(ctx.scope, symbol.name, KindSet::ANY) {
            self.bind(id, Binding::Decl(decl));
            match (decl, self.model.decl_kind(decl)) {
                (Decl::Scope(entity), Some(DeclKind::Entity)) => {
                    if let Some(ty) = self.model.entity(entity).map(|data| data.ty) {
                        self.settle_expr(id, ty);
                    }
                }
                (Decl::Type(ty), _) => self.settle_expr(id, ty),
                (Decl::Var(var), _) => self.settle_expr(id, self.model[var].ty),
                // A function without arguments may be written without
                // parentheses.
                (Decl::Scope(func), Some(DeclKind::Function)) => {
                    let Some(alg) = self.model.algorithm(func) else {
                        self.fail_expr(id);
                        return;
                    };
                    let params = alg.params.len();
                    let ret = alg.return_type.unwrap_or(self.model.builtins().generic);
                    if params != 0 {
                        self.diag
                            .report(DiagnosticKind::WrongArgCount, symbol.loc)
                            .arg(self.model.name(symbol.name))
                            .arg(0)
                            .arg(params)
                            .emit();
                        self.fail_expr(id);
                    } else {
                        self.settle_expr(id, ret);
                    }
                }
                (_, kind) => {
                    let kind = kind.map_or("declaration", |k| k.describe());
                    self.diag
                        .report(DiagnosticKind::UnexpectedReference, symbol.loc)
                        .arg(self.model.name(symbol.name))
                        .arg(kind)
                        .emit();
                    self.fail_expr(id);
                }
            }
            return;
        }

        if let Some(item) = self.model.lookup_enum_item(ctx.scope, symbol.name) {
            self.bind(id, Binding::EnumItem(item));
            let ty = match self.model[item].kind {
                ExprKind::EnumItem { ty } => ty,
                _ => self.model.builtins().generic,
            };
            self.settle_expr(id, ty);
            return;
        }

        if expected != Expected::Unknown {
            self.diag
                .report(DiagnosticKind::Undefined, symbol.loc)
                .arg(self.model.name(symbol.name))
                .emit();
            self.fail_expr(id);
        }
    }

    /// Function call or entity constructor.
    fn resolve_call(&mut self, id: ExprId, args: &[ExprId], ctx: Ctx, expected: Expected) {
        let symbol = self.model[id].symbol;
        let mask = KindSet::FUNCTION.union(KindSet::ENTITY);
        let Some(Decl::Scope(callee)) = self.model.lookup(ctx.scope, symbol.name, mask) else {
            let kind = if self.model.lookup(ctx.scope, symbol.name, KindSet::ANY).is_some() {
                DiagnosticKind::FuncallNotAFunction
            } else {
                DiagnosticKind::UndefinedFunc
            };
            self.diag
                .report(kind, symbol.loc)
                .arg(self.model.name(symbol.name))
                .emit();
            self.fail_expr(id);
            return;
        };
        if let ExprKind::Call { target, .. } = &mut self.model[id].kind {
            *target = Some(callee);
        }

        let builtins = self.model.builtins().clone();
        let mut return_type;
        let mut checked = 0;
        if let Some(entity) = self.model.entity(callee) {
            return_type = entity.ty;
        } else {
            let (params, ret) = match self.model.algorithm(callee) {
                Some(alg) => (alg.params.len(), alg.return_type),
                None => (args.len(), None),
            };
            return_type = ret.unwrap_or(builtins.generic);
            if args.len() != params {
                self.diag
                    .report(DiagnosticKind::WrongArgCount, symbol.loc)
                    .arg(self.model.name(symbol.name))
                    .arg(args.len())
                    .arg(params)
                    .emit();
            }
            // NVL(a, b) has the type of its arguments, which must agree
            // with what the caller wants.
            if callee == builtins.nvl {
                for arg in args.iter().take(2) {
                    self.resolve_expr(*arg, ctx, expected);
                }
                checked = args.len().min(2);
                if let Some(first) = args.first()
                    && let Some(ty) = self.model[*first].return_type
                {
                    return_type = ty;
                }
            }
            if callee == builtins.usedin {
                return_type = builtins.bag_of_generic;
            }
        }

        let mut failed = false;
        for (i, arg) in args.iter().enumerate() {
            if i >= checked {
                self.resolve_expr(*arg, ctx, Expected::DontCare);
            }
            failed |= self.expr_failed(*arg);
        }
        if failed {
            self.fail_expr(id);
        } else {
            self.settle_expr(id, return_type);
        }
    }

    /// `QUERY(var <* source | condition)`: `var` takes the element type of
    /// the source aggregate.
    fn resolve_query(
        &mut self,
        id: ExprId,
        scope: ScopeId,
        source: ExprId,
        condition: ExprId,
        ctx: Ctx,
    ) {
        self.resolve_expr(source, ctx, Expected::DontCare);
        if self.expr_failed(source) {
            self.fail_expr(id);
            return;
        }
        let runtime = self.model.builtins().runtime;
        let source_type = self.model[source].return_type.unwrap_or(runtime);

        let element = match self.model.body(source_type) {
            Some(TypeBody::Aggregate { base, .. }) => Some(*base),
            Some(TypeBody::Select(_)) => self.model.common_aggregate_base(source_type),
            Some(TypeBody::Runtime | TypeBody::Generic { .. }) => Some(runtime),
            _ => None,
        };
        let Some(element) = element else {
            let loc = self.model[source].symbol.loc;
            self.diag
                .report(DiagnosticKind::QueryRequiresAggregate, loc)
                .emit();
            self.fail_expr(id);
            return;
        };

        if let ScopeData::Query { var } = self.model[scope].data {
            self.model[var].ty = element;
            self.model[var].status = Status::Resolved;
        }
        self.resolve_expr(condition, ctx.in_scope(scope), Expected::DontCare);
        if self.expr_failed(condition) {
            self.fail_expr(id);
        } else {
            self.settle_expr(id, source_type);
        }
    }

    pub(super) fn bind(&mut self, id: ExprId, binding: Binding) {
        if let ExprKind::Identifier { target } = &mut self.model[id].kind {
            *target = Some(binding);
        }
    }

    pub(super) fn settle_expr(&mut self, id: ExprId, ty: TypeId) {
        let expr = &mut self.model[id];
        expr.return_type = Some(ty);
        expr.status = Status::Resolved;
    }

    pub(super) fn fail_expr(&mut self, id: ExprId) {
        self.model[id].status = Status::Failed;
    }

    pub(super) fn expr_failed(&self, id: ExprId) -> bool {
        self.model[id].status.is_failed()
    }
}
