//! Operator typing.
//!
//! One resolver per operator code, looked up by the operator's discriminant.
//! A resolver returns the type of the operation, or None when it fails.

use xpress_core::Name;

use super::{Ctx, Expected, Resolver};
use crate::diagnostics::DiagnosticKind;
use crate::model::{BasicKind, Binding, Decl, ExprId, Operator, TypeBody, TypeId, VarId};

pub(super) type OpResolver = fn(&mut Resolver<'_>, ExprId, &[ExprId], Ctx) -> Option<TypeId>;

const TABLE: [OpResolver; Operator::COUNT] = [
    arithmetic, // Plus
    arithmetic, // Minus
    arithmetic, // Times
    real_div,   // RealDiv
    int_div,    // IntDiv
    int_div,    // Mod
    arithmetic, // Exp
    unary,      // Negate
    unary,      // Identity
    logical,    // Not
    logical,    // And
    logical,    // Or
    logical,    // Xor
    logical,    // Equal
    logical,    // NotEqual
    logical,    // Less
    logical,    // Greater
    logical,    // LessEqual
    logical,    // GreaterEqual
    logical,    // InstEqual
    logical,    // InstNotEqual
    logical,    // In
    logical,    // Like
    dot,
    group,
    index,
    subcomponent,
    concat,
];

pub(super) fn resolver(op: Operator) -> OpResolver {
    TABLE[op as usize]
}

/// Resolve every operand. None if any of them failed.
fn operand_types(r: &mut Resolver<'_>, operands: &[ExprId], ctx: Ctx) -> Option<Vec<TypeId>> {
    let mut failed = false;
    for operand in operands {
        r.resolve_expr(*operand, ctx, Expected::DontCare);
        failed |= r.expr_failed(*operand);
    }
    if failed {
        return None;
    }
    let runtime = r.model.builtins().runtime;
    Some(
        operands
            .iter()
            .map(|operand| r.model[*operand].return_type.unwrap_or(runtime))
            .collect(),
    )
}

fn numeric_rank(kind: BasicKind) -> Option<u8> {
    match kind {
        BasicKind::Integer => Some(0),
        BasicKind::Real => Some(1),
        BasicKind::Number => Some(2),
        _ => None,
    }
}

fn basic_kind(r: &Resolver<'_>, ty: TypeId) -> Option<BasicKind> {
    match r.model.body(ty)? {
        TypeBody::Basic { kind, .. } => Some(*kind),
        _ => None,
    }
}

/// INTEGER < REAL < NUMBER. Anything else keeps the left operand's type.
fn arithmetic(r: &mut Resolver<'_>, _: ExprId, operands: &[ExprId], ctx: Ctx) -> Option<TypeId> {
    let types = operand_types(r, operands, ctx)?;
    let lhs = *types.first()?;
    let Some(rhs) = types.get(1).copied() else {
        return Some(lhs);
    };
    let ranks = (
        basic_kind(r, lhs).and_then(numeric_rank),
        basic_kind(r, rhs).and_then(numeric_rank),
    );
    match ranks {
        (Some(a), Some(b)) if b > a => Some(rhs),
        _ => Some(lhs),
    }
}

fn real_div(r: &mut Resolver<'_>, _: ExprId, operands: &[ExprId], ctx: Ctx) -> Option<TypeId> {
    operand_types(r, operands, ctx)?;
    Some(r.model.builtins().real)
}

fn int_div(r: &mut Resolver<'_>, _: ExprId, operands: &[ExprId], ctx: Ctx) -> Option<TypeId> {
    operand_types(r, operands, ctx)?;
    Some(r.model.builtins().integer)
}

fn unary(r: &mut Resolver<'_>, _: ExprId, operands: &[ExprId], ctx: Ctx) -> Option<TypeId> {
    operand_types(r, operands, ctx)?.first().copied()
}

fn logical(r: &mut Resolver<'_>, _: ExprId, operands: &[ExprId], ctx: Ctx) -> Option<TypeId> {
    operand_types(r, operands, ctx)?;
    Some(r.model.builtins().logical)
}

/// `a || b` builds a complex entity instance of the left operand's type.
fn concat(r: &mut Resolver<'_>, _: ExprId, operands: &[ExprId], ctx: Ctx) -> Option<TypeId> {
    operand_types(r, operands, ctx)?.first().copied()
}

/// `owner.member`. The member is a name, not an expression of its own scope.
fn dot(r: &mut Resolver<'_>, _: ExprId, operands: &[ExprId], ctx: Ctx) -> Option<TypeId> {
    let &[owner, member] = operands else {
        return None;
    };
    let owner_type = operand_types(r, &[owner], ctx)?[0];
    let name = r.model[member].symbol.name;
    let runtime = r.model.builtins().runtime;

    let ty = match r.model.body(owner_type).cloned() {
        Some(TypeBody::Entity(entity)) => {
            let found = r.model.inherited_attributes(entity, name);
            attribute_member(r, member, name, &found)?
        }
        Some(TypeBody::Select(_)) => {
            let mut found = Vec::new();
            for entity in r.model.select_entities(owner_type) {
                if let Some(var) = r.model.find_inherited_attribute(entity, name)
                    && !found.contains(&var)
                {
                    found.push(var);
                }
            }
            attribute_member(r, member, name, &found)?
        }
        Some(TypeBody::Enumeration(items)) => {
            let Some(item) = items
                .iter()
                .copied()
                .find(|item| r.model[*item].symbol.name == name)
            else {
                return undefined_attribute(r, member, name);
            };
            r.bind(member, Binding::EnumItem(item));
            owner_type
        }
        Some(TypeBody::Generic { .. } | TypeBody::Runtime) | None => runtime,
        Some(TypeBody::Basic { .. } | TypeBody::Aggregate { .. }) => {
            return undefined_attribute(r, member, name);
        }
    };
    r.settle_expr(member, ty);
    Some(ty)
}

/// Bind `member` to the first of the attributes found for it.
fn attribute_member(
    r: &mut Resolver<'_>,
    member: ExprId,
    name: Name,
    found: &[VarId],
) -> Option<TypeId> {
    let Some(&var) = found.first() else {
        return undefined_attribute(r, member, name);
    };
    if found.len() > 1 {
        let loc = r.model[member].symbol.loc;
        r.diag
            .report(DiagnosticKind::AmbiguousAttribute, loc)
            .arg(r.model.name(name))
            .emit();
    }
    r.bind(member, Binding::Decl(Decl::Var(var)));
    Some(r.model[var].ty)
}

fn undefined_attribute(r: &mut Resolver<'_>, member: ExprId, name: Name) -> Option<TypeId> {
    let loc = r.model[member].symbol.loc;
    r.diag
        .report(DiagnosticKind::UndefinedAttribute, loc)
        .arg(r.model.name(name))
        .emit();
    r.fail_expr(member);
    None
}

/// `owner\group`: view `owner` as its supertype `group`.
fn group(r: &mut Resolver<'_>, _: ExprId, operands: &[ExprId], ctx: Ctx) -> Option<TypeId> {
    let &[owner, member] = operands else {
        return None;
    };
    let owner_type = operand_types(r, &[owner], ctx)?[0];
    let name = r.model[member].symbol.name;
    let runtime = r.model.builtins().runtime;

    let candidates = match r.model.body(owner_type).cloned() {
        Some(TypeBody::Entity(entity)) => vec![entity],
        Some(TypeBody::Select(_)) => r.model.select_entities(owner_type),
        Some(TypeBody::Generic { .. } | TypeBody::Runtime) | None => {
            r.settle_expr(member, runtime);
            return Some(runtime);
        }
        _ => Vec::new(),
    };
    let mut found = Vec::new();
    for entity in candidates {
        if let Some(sup) = r.model.find_inherited_entity(entity, name)
            && !found.contains(&sup)
        {
            found.push(sup);
        }
    }

    let loc = r.model[member].symbol.loc;
    let Some(&sup) = found.first() else {
        let owner_name = r.model[owner_type].symbol.name;
        r.diag
            .report(DiagnosticKind::GroupNoSuchEntity, loc)
            .arg(r.model.name(name))
            .arg(r.model.name(owner_name))
            .emit();
        r.fail_expr(member);
        return None;
    };
    if found.len() > 1 {
        r.diag
            .report(DiagnosticKind::AmbiguousGroup, loc)
            .arg(r.model.name(name))
            .emit();
    }
    let ty = r.model.entity(sup).map_or(runtime, |data| data.ty);
    r.bind(member, Binding::Decl(Decl::Scope(sup)));
    r.settle_expr(member, ty);
    Some(ty)
}

/// What indexing into a value of type `ty` yields, if it can be indexed.
fn element_type(r: &Resolver<'_>, ty: TypeId) -> Option<TypeId> {
    let runtime = r.model.builtins().runtime;
    match r.model.body(ty) {
        Some(TypeBody::Aggregate { base, .. }) => Some(*base),
        Some(TypeBody::Select(_)) => r.model.common_aggregate_base(ty),
        Some(TypeBody::Basic {
            kind: BasicKind::String | BasicKind::Binary,
            ..
        }) => Some(ty),
        Some(TypeBody::Generic { .. } | TypeBody::Runtime) | None => Some(runtime),
        _ => None,
    }
}

fn indexing_illegal(r: &mut Resolver<'_>, operand: ExprId) -> Option<TypeId> {
    let symbol = r.model[operand].symbol;
    r.diag
        .report(DiagnosticKind::IndexingIllegal, symbol.loc)
        .arg(r.model.name(symbol.name))
        .emit();
    None
}

/// `a[i]`
fn index(r: &mut Resolver<'_>, _: ExprId, operands: &[ExprId], ctx: Ctx) -> Option<TypeId> {
    let types = operand_types(r, operands, ctx)?;
    let (&operand, &ty) = operands.first().zip(types.first())?;
    match element_type(r, ty) {
        Some(element) => Some(element),
        None => indexing_illegal(r, operand),
    }
}

/// `a[i:j]` keeps the type of `a`.
fn subcomponent(r: &mut Resolver<'_>, _: ExprId, operands: &[ExprId], ctx: Ctx) -> Option<TypeId> {
    let types = operand_types(r, operands, ctx)?;
    let (&operand, &ty) = operands.first().zip(types.first())?;
    match element_type(r, ty) {
        Some(element) if element == r.model.builtins().runtime => Some(element),
        Some(_) => Some(ty),
        None => indexing_illegal(r, operand),
    }
}
