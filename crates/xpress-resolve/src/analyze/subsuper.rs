//! Supertype and subtype pass.
//!
//! Binds `SUBTYPE OF` names and the leaves of `SUPERTYPE OF` expressions to
//! entities. Links are made symmetric: naming B as supertype of A also puts
//! A among B's subtypes.

use xpress_core::Symbol;

use super::Resolver;
use crate::diagnostics::DiagnosticKind;
use crate::model::{Decl, DeclKind, KindSet, ScopeId, SubtypeExpr};

impl Resolver<'_> {
    pub(super) fn resolve_subsupers(&mut self) {
        for schema in self.schemas() {
            self.subsupers_in(schema);
        }
    }

    fn subsupers_in(&mut self, scope: ScopeId) {
        for decl in self.local_decls(scope) {
            let Decl::Scope(id) = decl else {
                continue;
            };
            match self.scope_kind(id) {
                Some(DeclKind::Entity) if self.settled_before(id) => {}
                Some(DeclKind::Entity) => {
                    self.resolve_supertypes(id);
                    self.resolve_subtypes(id);
                    if self.model[id].status.is_failed() {
                        self.fail_scope(scope);
                    }
                }
                Some(DeclKind::Function | DeclKind::Procedure | DeclKind::Rule) => {
                    self.subsupers_in(id);
                }
                _ => {}
            }
        }
    }

    fn resolve_supertypes(&mut self, entity: ScopeId) {
        let Some(data) = self.model.entity(entity) else {
            return;
        };
        let symbols = data.supertype_symbols.clone();
        let parent = self.model[entity].parent.unwrap_or(self.model.root());
        let mut supertypes = Vec::with_capacity(symbols.len());

        for symbol in symbols {
            match self.model.lookup(parent, symbol.name, KindSet::ENTITY) {
                Some(Decl::Scope(sup)) => {
                    if !supertypes.contains(&sup) {
                        supertypes.push(sup);
                    }
                    if self.model[sup].status.is_failed() {
                        self.fail_scope(entity);
                    }
                    if let Some(sup_data) = self.model.entity_mut(sup)
                        && !sup_data.subtypes.contains(&entity)
                    {
                        sup_data.subtypes.push(entity);
                    }
                }
                _ => {
                    self.report_unresolved_link(entity, parent, symbol, true);
                    self.fail_scope(entity);
                }
            }
        }

        if let Some(data) = self.model.entity_mut(entity) {
            data.supertypes = supertypes;
        }
    }

    fn resolve_subtypes(&mut self, entity: ScopeId) {
        let Some(data) = self.model.entity_mut(entity) else {
            return;
        };
        let Some(mut expr) = data.subtype_expr.take() else {
            return;
        };
        let mut subtypes = std::mem::take(&mut data.subtypes);
        let parent = self.model[entity].parent.unwrap_or(self.model.root());

        let ok = self.resolve_subtype_expr(entity, parent, &mut expr, &mut subtypes);

        if let Some(data) = self.model.entity_mut(entity) {
            data.subtype_expr = Some(expr);
            data.subtypes = subtypes;
        }
        if !ok {
            self.fail_scope(entity);
        }
    }

    /// Bind every leaf and collect the named entities into `flat`. A bad
    /// leaf does not stop its siblings from being bound.
    fn resolve_subtype_expr(
        &mut self,
        entity: ScopeId,
        parent: ScopeId,
        expr: &mut SubtypeExpr,
        flat: &mut Vec<ScopeId>,
    ) -> bool {
        match expr {
            SubtypeExpr::And(lhs, rhs) | SubtypeExpr::AndOr(lhs, rhs) => {
                let lhs = self.resolve_subtype_expr(entity, parent, lhs, flat);
                let rhs = self.resolve_subtype_expr(entity, parent, rhs, flat);
                lhs && rhs
            }
            SubtypeExpr::OneOf(items) => {
                let mut ok = true;
                for item in items {
                    ok &= self.resolve_subtype_expr(entity, parent, item, flat);
                }
                ok
            }
            SubtypeExpr::Ref { symbol, target } => {
                match self.model.lookup(parent, symbol.name, KindSet::ENTITY) {
                    Some(Decl::Scope(sub)) => {
                        *target = Some(sub);
                        if !flat.contains(&sub) {
                            flat.push(sub);
                        }
                        true
                    }
                    _ => {
                        self.report_unresolved_link(entity, parent, *symbol, false);
                        false
                    }
                }
            }
        }
    }

    /// A supertype or subtype name that is missing, or names something other
    /// than an entity.
    fn report_unresolved_link(
        &mut self,
        entity: ScopeId,
        parent: ScopeId,
        symbol: Symbol,
        supertype: bool,
    ) {
        if let Some(other) = self.model.lookup(parent, symbol.name, KindSet::ANY) {
            let kind = if supertype {
                DiagnosticKind::SupertypeResolve
            } else {
                DiagnosticKind::SubtypeResolve
            };
            let line = self.model.decl_symbol(other).loc.line;
            self.diag
                .report(kind, symbol.loc)
                .arg(self.model.name(symbol.name))
                .arg(line)
                .emit();
            return;
        }
        let kind = if supertype {
            DiagnosticKind::UnknownSupertype
        } else {
            DiagnosticKind::UnknownSubtype
        };
        let entity_name = self.model[entity].symbol.name;
        self.diag
            .report(kind, symbol.loc)
            .arg(self.model.name(symbol.name))
            .arg(self.model.name(entity_name))
            .emit();
    }
}
