//! Import pass.
//!
//! Binds every `USE FROM` and `REFERENCE FROM` item to the declaration it
//! names, following chains of imports through other schemas. A resolved
//! import is entered into the importing schema's dictionary under its alias.

use xpress_core::{Name, Symbol};

use super::Resolver;
use crate::diagnostics::DiagnosticKind;
use crate::model::{Decl, KindSet, RenameId, ScopeId, Status};

/// Outcome of searching a schema for an exported name.
enum Export {
    Found(Decl),
    Missing,
    /// An import on the way failed and has been reported already.
    Broken,
}

impl Resolver<'_> {
    pub(super) fn resolve_imports(&mut self) {
        self.report_duplicates();
        for schema in self.schemas() {
            let name = self.model[schema].symbol.name;
            log::trace!("imports: schema `{}`", self.model.name(name));
            self.resolve_interfaces(schema);
            let renames = self
                .model
                .schema(schema)
                .map(|data| data.renames.clone())
                .unwrap_or_default();
            for rename in renames {
                self.resolve_rename(rename);
            }
        }
    }

    fn report_duplicates(&mut self) {
        let duplicates = std::mem::take(&mut self.model.duplicates);
        for (scope, symbol) in duplicates {
            self.diag
                .report(DiagnosticKind::DuplicateDeclaration, symbol.loc)
                .arg(self.model.name(symbol.name))
                .emit();
            self.fail_scope(scope);
        }
    }

    fn resolve_interfaces(&mut self, schema: ScopeId) {
        let count = self.model.schema(schema).map_or(0, |data| data.interfaces.len());
        for i in 0..count {
            let Some(data) = self.model.schema(schema) else {
                return;
            };
            let interface = &data.interfaces[i];
            if interface.status.is_done() {
                continue;
            }
            let from = interface.schema;
            let target = self.lookup_schema(from.name);
            if target.is_none() {
                self.diag
                    .report(DiagnosticKind::UndefinedSchema, from.loc)
                    .arg(self.model.name(from.name))
                    .emit();
                self.fail_scope(schema);
            }
            if let Some(data) = self.model.schema_mut(schema) {
                let interface = &mut data.interfaces[i];
                interface.target = target;
                interface.status = match target {
                    Some(_) => Status::Resolved,
                    None => Status::Failed,
                };
            }
        }
    }

    fn lookup_schema(&self, name: Name) -> Option<ScopeId> {
        let root = self.model.root();
        match self.model.lookup(root, name, KindSet::SCHEMA)? {
            Decl::Scope(id) => Some(id),
            _ => None,
        }
    }

    fn resolve_rename(&mut self, id: RenameId) {
        let rename = &self.model[id];
        match rename.status {
            Status::Resolved | Status::Failed => return,
            Status::InProgress => {
                let new = rename.new;
                self.diag
                    .report(DiagnosticKind::CircularReference, new.loc)
                    .arg(self.model.name(new.name))
                    .emit();
                self.model[id].status = Status::Failed;
                return;
            }
            Status::Unresolved => {}
        }

        let (from, old, new, owner) = (rename.schema, rename.old, rename.new, rename.owner);
        let Some(source) = self.lookup_schema(from.name) else {
            self.diag
                .report(DiagnosticKind::UndefinedSchema, from.loc)
                .arg(self.model.name(from.name))
                .emit();
            self.model[id].status = Status::Failed;
            return;
        };

        if !self.enter_recursion() {
            return;
        }
        self.model[id].status = Status::InProgress;
        let generation = self.next_generation();
        let export = self.find_export(source, old.name, generation);
        self.exit_recursion();

        if self.model[id].status.is_failed() {
            return;
        }
        match export {
            Export::Found(target) => {
                self.model[id].target = Some(target);
                self.register_rename(id, owner, new, target);
            }
            Export::Missing => {
                self.diag
                    .report(DiagnosticKind::UndefinedObjectInSchema, old.loc)
                    .arg(self.model.name(old.name))
                    .arg(self.model.name(from.name))
                    .emit();
                self.model[id].status = Status::Failed;
            }
            Export::Broken => self.model[id].status = Status::Failed,
        }
    }

    /// What `schema` exports as `name`: its own declarations, then its
    /// imports by alias, then schemas it imports whole.
    fn find_export(&mut self, schema: ScopeId, name: Name, generation: u32) -> Export {
        if self.model[schema].search_id == generation {
            return Export::Missing;
        }
        self.model[schema].search_id = generation;

        if let Some(decl) = self.model.dict_entry(schema, name) {
            return Export::Found(decl);
        }

        let renames = self
            .model
            .schema(schema)
            .map(|data| data.renames.clone())
            .unwrap_or_default();
        for rename in renames {
            if self.model[rename].new.name != name {
                continue;
            }
            self.resolve_rename(rename);
            let rename = &self.model[rename];
            return match (rename.status, rename.target) {
                (Status::Resolved, Some(target)) => Export::Found(target),
                _ => Export::Broken,
            };
        }

        for target in self.model.interface_targets(schema) {
            if !self.enter_recursion() {
                return Export::Broken;
            }
            let export = self.find_export(target, name, generation);
            self.exit_recursion();
            if !matches!(export, Export::Missing) {
                return export;
            }
        }
        Export::Missing
    }

    /// Enter a resolved import into the importing schema's dictionary.
    fn register_rename(&mut self, id: RenameId, owner: ScopeId, new: Symbol, target: Decl) {
        let existing = self.model[owner].dict.get(&new.name).copied();
        match existing {
            None => {
                self.model[owner].dict.insert(new.name, Decl::Rename(id));
                self.model[id].status = Status::Resolved;
            }
            // The same object imported twice.
            Some(decl) if self.model.unwrap_rename(decl) == Some(target) => {
                self.model[id].status = Status::Resolved;
            }
            Some(_) => {
                self.diag
                    .report(DiagnosticKind::DuplicateDeclaration, new.loc)
                    .arg(self.model.name(new.name))
                    .emit();
                self.model[id].status = Status::Failed;
                self.fail_scope(owner);
            }
        }
    }
}
