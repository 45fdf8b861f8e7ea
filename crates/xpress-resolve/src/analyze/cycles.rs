//! Cycle sweeps over resolved links.
//!
//! An entity reachable from itself through subtype links, or a select type
//! reachable from itself through select members, is reported once with the
//! path that closes the loop. Nodes are marked with the current generation
//! so every node is visited at most once per sweep.

use super::Resolver;
use crate::diagnostics::DiagnosticKind;
use crate::model::{BodyId, ScopeId, Status, TypeBody, TypeId};

impl Resolver<'_> {
    pub(super) fn check_subsuper_cycles(&mut self, entity: ScopeId) {
        let generation = self.next_generation();
        let mut path = Vec::new();
        if !self.subsuper_path(entity, entity, generation, &mut path) {
            return;
        }

        let symbol = self.model[entity].symbol;
        let mut report = self
            .diag
            .report(DiagnosticKind::SubsuperLoop, symbol.loc)
            .arg(self.model.name(symbol.name));
        for hop in path.iter().rev() {
            let hop = self.model[*hop].symbol;
            report = report.related_to(
                format!("via supertype entity `{}`", self.model.name(hop.name)),
                hop.loc,
            );
        }
        report.emit();
        self.fail_scope(entity);
    }

    /// Whether `origin` is among the transitive subtypes of `current`.
    /// On success `path` holds the hops, innermost first.
    fn subsuper_path(
        &mut self,
        origin: ScopeId,
        current: ScopeId,
        generation: u32,
        path: &mut Vec<ScopeId>,
    ) -> bool {
        if !self.enter_recursion() {
            return false;
        }
        let subtypes = self
            .model
            .entity(current)
            .map(|data| data.subtypes.clone())
            .unwrap_or_default();

        let mut found = false;
        for sub in subtypes {
            if sub == origin {
                found = true;
                break;
            }
            if self.model[sub].search_id == generation {
                continue;
            }
            self.model[sub].search_id = generation;
            if self.subsuper_path(origin, sub, generation, path) {
                path.push(sub);
                found = true;
                break;
            }
        }
        self.exit_recursion();
        found
    }

    pub(super) fn check_select_cycles(&mut self, ty: TypeId) {
        if self.model[ty].status.is_failed() {
            return;
        }
        let Some(body) = self.model[ty].body else {
            return;
        };
        if !matches!(self.model[body], TypeBody::Select(_)) {
            return;
        }

        let generation = self.next_generation();
        let mut path = Vec::new();
        if !self.select_path(body, ty, generation, &mut path) {
            return;
        }

        let symbol = self.model[ty].symbol;
        let mut report = self
            .diag
            .report(DiagnosticKind::SelectLoop, symbol.loc)
            .arg(self.model.name(symbol.name));
        for hop in path.iter().rev() {
            let hop = self.model[*hop].symbol;
            report = report.related_to(
                format!("via select type `{}`", self.model.name(hop.name)),
                hop.loc,
            );
        }
        report.emit();
        self.model[ty].status = Status::Failed;
    }

    /// Whether a select with body `origin` is reachable from the members of
    /// `current`.
    fn select_path(
        &mut self,
        origin: BodyId,
        current: TypeId,
        generation: u32,
        path: &mut Vec<TypeId>,
    ) -> bool {
        let members = match self.model.body(current) {
            Some(TypeBody::Select(members)) => members.clone(),
            _ => return false,
        };
        if !self.enter_recursion() {
            return false;
        }

        let mut found = false;
        for member in members {
            let Some(body) = self.model[member].body else {
                continue;
            };
            if !matches!(self.model[body], TypeBody::Select(_)) {
                continue;
            }
            if body == origin {
                found = true;
                break;
            }
            if self.model[member].search_id == generation {
                continue;
            }
            self.model[member].search_id = generation;
            if self.select_path(origin, member, generation, path) {
                path.push(member);
                found = true;
                break;
            }
        }
        self.exit_recursion();
        found
    }
}
