//! Resolution passes.
//!
//! Each pass walks every schema and works on one concern:
//! - imports: USE and REFERENCE bindings between schemas
//! - subsuper: entity supertype and subtype links
//! - types: type references, inherited attribute counts, cycle sweeps
//! - expressions and statements: operators, calls, domain rules
//!
//! Later passes rely on what earlier passes bound but never undo it.
//! Resolution inside a pass is demand driven: a node reached before its
//! own turn is resolved on the spot, and `Status` keeps each node from
//! being worked on twice.

mod cycles;
mod expr;
mod imports;
mod ops;
mod stmt;
mod subsuper;
mod symbol_table;
mod types;

#[cfg(test)]
mod cycles_tests;
#[cfg(test)]
mod imports_tests;
#[cfg(test)]
mod stmt_tests;

pub(crate) use expr::{Ctx, Expected};

use crate::Error;
use crate::diagnostics::Diagnostics;
use crate::model::{Decl, DeclKind, Model, ScopeData, ScopeId, Status};
use crate::resolver::{Pass, PassSummary};

pub(crate) struct Resolver<'m> {
    pub(crate) model: &'m mut Model,
    pub(crate) diag: Diagnostics,
    /// Scopes already resolved or failed when this run started. Their
    /// checks ran, and reported, in an earlier resolution.
    settled: Vec<bool>,
    /// Set when an expression touches SELF or an attribute of SELF.
    self_seen: bool,
    depth: u32,
    recursion_limit: u32,
    fatal_error: Option<Error>,
}

impl<'m> Resolver<'m> {
    pub(crate) fn new(model: &'m mut Model, diag: Diagnostics, recursion_limit: u32) -> Self {
        let settled = model.scopes.iter().map(|s| s.status.is_done()).collect();
        Self {
            model,
            diag,
            settled,
            self_seen: false,
            depth: 0,
            recursion_limit,
            fatal_error: None,
        }
    }

    pub(crate) fn into_diagnostics(self) -> Diagnostics {
        self.diag
    }

    /// Run one pass over every schema.
    pub(crate) fn run(&mut self, pass: Pass) -> Result<PassSummary, Error> {
        let errors = self.diag.error_count();
        let warnings = self.diag.warning_count();
        log::debug!("{} pass: start", pass.name());

        match pass {
            Pass::Imports => self.resolve_imports(),
            Pass::SubSupers => self.resolve_subsupers(),
            Pass::Types => self.resolve_types(),
            Pass::Expressions => self.resolve_expressions(),
        }

        if let Some(err) = self.fatal_error.take() {
            log::debug!("{} pass: aborted: {err}", pass.name());
            return Err(err);
        }

        let (resolved, failed) = self.tally(pass);
        let summary = PassSummary {
            pass,
            resolved,
            failed,
            errors: self.diag.error_count() - errors,
            warnings: self.diag.warning_count() - warnings,
        };
        log::debug!(
            "{} pass: {} resolved, {} failed, {} errors, {} warnings",
            pass.name(),
            summary.resolved,
            summary.failed,
            summary.errors,
            summary.warnings
        );
        Ok(summary)
    }

    /// Resolved and failed counts over the nodes a pass is responsible for.
    fn tally(&self, pass: Pass) -> (usize, usize) {
        let root = self.model.root();
        let statuses: Vec<Status> = match pass {
            Pass::Imports => self.model.renames.iter().map(|r| r.status).collect(),
            Pass::SubSupers => self
                .model
                .scopes
                .iter()
                .filter(|s| matches!(s.data, ScopeData::Entity(_)))
                .map(|s| s.status)
                .collect(),
            Pass::Types => self
                .model
                .types
                .iter()
                .filter(|t| t.scope != root)
                .map(|t| t.status)
                .collect(),
            Pass::Expressions => self.model.exprs.iter().map(|e| e.status).collect(),
        };
        let resolved = statuses.iter().filter(|s| s.is_resolved()).count();
        let failed = statuses.iter().filter(|s| s.is_failed()).count();
        (resolved, failed)
    }

    fn enter_recursion(&mut self) -> bool {
        if self.fatal_error.is_some() {
            return false;
        }
        if self.depth >= self.recursion_limit {
            self.fatal_error = Some(Error::RecursionLimitExceeded);
            return false;
        }
        self.depth += 1;
        true
    }

    fn exit_recursion(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Fresh stamp for a graph search.
    fn next_generation(&mut self) -> u32 {
        self.model.generation += 1;
        self.model.generation
    }

    fn settled_before(&self, scope: ScopeId) -> bool {
        self.settled.get(scope.index()).copied().unwrap_or(false)
    }

    /// Schemas in declaration order.
    fn schemas(&self) -> Vec<ScopeId> {
        let root = self.model.root();
        self.model[root]
            .dict
            .values()
            .filter_map(|decl| match decl {
                Decl::Scope(id) if self.model[*id].is_schema() => Some(*id),
                _ => None,
            })
            .collect()
    }

    /// Declarations made in `scope` itself, imports excluded.
    fn local_decls(&self, scope: ScopeId) -> Vec<Decl> {
        self.model[scope]
            .dict
            .values()
            .filter(|decl| !matches!(decl, Decl::Rename(_)))
            .copied()
            .collect()
    }

    fn scope_kind(&self, scope: ScopeId) -> Option<DeclKind> {
        self.model[scope].kind()
    }

    fn fail_scope(&mut self, scope: ScopeId) {
        self.model[scope].status = Status::Failed;
    }

    /// Mark `scope` resolved unless something already failed it.
    fn settle_scope(&mut self, scope: ScopeId) {
        let status = &mut self.model[scope].status;
        if !status.is_failed() {
            *status = Status::Resolved;
        }
    }
}
