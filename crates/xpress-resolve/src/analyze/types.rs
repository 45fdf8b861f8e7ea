//! Type pass.
//!
//! Binds type names to declarations and gives every alias the body of the
//! type it renames. Also binds inverse and UNIQUE attribute references,
//! checks supertype lists against subtype expressions, and counts inherited
//! attributes.

use xpress_core::Symbol;

use super::Resolver;
use crate::diagnostics::{DiagnosticKind, WarningClass};
use crate::model::{
    BodyId, Decl, DeclKind, KindSet, Model, ScopeData, ScopeId, Status, TypeBody, TypeId, VarId,
};

impl Resolver<'_> {
    pub(super) fn resolve_types(&mut self) {
        for schema in self.schemas() {
            self.types_in(schema);
        }
    }

    fn types_in(&mut self, scope: ScopeId) {
        let name = self.model[scope].symbol.name;
        log::trace!("types: scope `{}`", self.model.name(name));
        for decl in self.local_decls(scope) {
            let failed = match decl {
                Decl::Type(ty) => {
                    self.resolve_type(ty);
                    if self.diag.is_enabled(WarningClass::CircularSelect.kind()) {
                        self.check_select_cycles(ty);
                    }
                    self.model[ty].status.is_failed()
                }
                Decl::Var(var) => self.resolve_var_type(var),
                Decl::Scope(id) => {
                    match self.scope_kind(id) {
                        Some(DeclKind::Entity) if self.settled_before(id) => {}
                        Some(DeclKind::Entity) => self.entity_types(id),
                        Some(
                            DeclKind::Schema
                            | DeclKind::Function
                            | DeclKind::Procedure
                            | DeclKind::Rule,
                        ) => self.types_in(id),
                        _ => {}
                    }
                    self.model[id].status.is_failed()
                }
                Decl::Rename(_) => false,
            };
            if failed {
                self.fail_scope(scope);
            }
        }

        // Return types are written outside the function body.
        if let ScopeData::Function(alg) = &self.model[scope].data
            && let Some(ret) = alg.return_type
        {
            let ret = self.resolve_type(ret);
            let failed = self.model[ret].status.is_failed();
            if let ScopeData::Function(alg) = &mut self.model[scope].data {
                alg.return_type = Some(ret);
            }
            if failed {
                self.fail_scope(scope);
            }
        }
    }

    fn entity_types(&mut self, entity: ScopeId) {
        if let Some(ty) = self.model.entity(entity).map(|data| data.ty) {
            self.resolve_type(ty);
        }
        self.check_missing_supertypes(entity);

        let attributes = self
            .model
            .entity(entity)
            .map(|data| data.attributes.clone())
            .unwrap_or_default();
        let mut failed = false;
        for attr in attributes {
            failed |= self.resolve_attribute_types(attr);
        }
        failed |= self.resolve_unique_rules(entity);

        if self.model.entity(entity).is_some_and(|data| data.inheritance.is_none()) {
            self.calculate_inheritance(entity);
        }
        if self.diag.is_enabled(WarningClass::CircularSubtype.kind()) {
            self.check_subsuper_cycles(entity);
        }
        if failed {
            self.fail_scope(entity);
        }
    }

    /// Resolve a type node and return the type to use in its place.
    ///
    /// A bare name stands for the type it is bound to, so the caller should
    /// store the returned id wherever `id` was referenced from.
    pub(super) fn resolve_type(&mut self, id: TypeId) -> TypeId {
        match self.model[id].status {
            Status::Resolved | Status::Failed => return self.model.settled(id),
            // A select or aggregate reached again through its own members is
            // left for the select cycle sweep.
            Status::InProgress if self.model[id].body.is_some() => return id,
            Status::InProgress => {
                let symbol = self.model[id].symbol;
                self.diag
                    .report(DiagnosticKind::CircularReference, symbol.loc)
                    .arg(self.model.name(symbol.name))
                    .emit();
                self.model[id].status = Status::Failed;
                return id;
            }
            Status::Unresolved => {}
        }
        if !self.enter_recursion() {
            return id;
        }

        let (body, head) = (self.model[id].body, self.model[id].head);
        let result = if let Some(body) = body {
            self.resolve_body(id, body);
            id
        } else if let Some(head) = head {
            self.resolve_alias(id, head);
            id
        } else {
            self.resolve_reference(id)
        };

        self.exit_recursion();
        result
    }

    fn resolve_body(&mut self, id: TypeId, body: BodyId) {
        self.model[id].status = Status::InProgress;
        let failed = match self.model[body].clone() {
            TypeBody::Aggregate { base, .. } => {
                let base = self.resolve_type(base);
                if let TypeBody::Aggregate { base: slot, .. } = &mut self.model[body] {
                    *slot = base;
                }
                self.model[base].status.is_failed()
            }
            TypeBody::Select(members) => {
                let mut failed = false;
                let mut resolved = Vec::with_capacity(members.len());
                for member in members {
                    let member = self.resolve_type(member);
                    failed |= self.model[member].status.is_failed();
                    resolved.push(member);
                }
                self.model[body] = TypeBody::Select(resolved);
                failed
            }
            _ => false,
        };
        self.finish_type(id, failed);
    }

    /// `TYPE t = head;` shares the body of `head`.
    fn resolve_alias(&mut self, id: TypeId, head: TypeId) {
        self.model[id].status = Status::InProgress;
        let head = self.resolve_type(head);
        self.model[id].head = Some(head);
        if self.model[head].status.is_failed() {
            self.finish_type(id, true);
            return;
        }

        let mut failed = false;
        if self.diag.is_enabled(DiagnosticKind::TypeIsEntity)
            && let Some(entity) = self.model.entity_of_type(head)
        {
            let symbol = self.model[id].symbol;
            let entity_name = self.model[entity].symbol.name;
            self.diag
                .report(DiagnosticKind::TypeIsEntity, symbol.loc)
                .arg(self.model.name(entity_name))
                .emit();
            failed = true;
        }
        self.model[id].body = self.model[head].body;
        self.finish_type(id, failed);
    }

    /// A bare type name. Entities stand for their implicit type.
    fn resolve_reference(&mut self, id: TypeId) -> TypeId {
        let symbol = self.model[id].symbol;
        let scope = self.model[id].scope;
        self.model[id].status = Status::InProgress;

        let mask = KindSet::ANY.without(KindSet::VARIABLE);
        let target = match self.model.lookup(scope, symbol.name, mask) {
            None => {
                self.diag
                    .report(DiagnosticKind::UndefinedType, symbol.loc)
                    .arg(self.model.name(symbol.name))
                    .emit();
                self.model.builtins().bad
            }
            Some(Decl::Type(target)) => self.resolve_type(target),
            Some(Decl::Scope(entity)) if self.model.entity(entity).is_some() => {
                let ty = self.model.entity(entity).map_or(id, |data| data.ty);
                self.resolve_type(ty)
            }
            Some(other) => {
                let kind = self.model.decl_kind(other).map_or("declaration", |k| k.describe());
                self.diag
                    .report(DiagnosticKind::NotAType, symbol.loc)
                    .arg(self.model.name(symbol.name))
                    .arg(kind)
                    .emit();
                self.model[id].status = Status::Failed;
                return id;
            }
        };

        self.model[id].head = Some(target);
        let failed = self.model[target].status.is_failed();
        self.finish_type(id, failed);
        target
    }

    fn finish_type(&mut self, id: TypeId, failed: bool) {
        let status = &mut self.model[id].status;
        *status = if failed || status.is_failed() {
            Status::Failed
        } else {
            Status::Resolved
        };
    }

    /// Resolve the declared type of a variable. Returns true on failure.
    fn resolve_var_type(&mut self, var: VarId) -> bool {
        let ty = self.resolve_type(self.model[var].ty);
        self.model[var].ty = ty;
        let failed = self.model[ty].status.is_failed();
        if failed {
            self.model[var].status = Status::Failed;
        }
        failed
    }

    /// Attribute type, and for an inverse attribute the attribute it
    /// inverts. Returns true on failure. A bad inverse is reported but only
    /// fails the attribute when its type or the inverted attribute failed.
    fn resolve_attribute_types(&mut self, attr: VarId) -> bool {
        let mut failed = self.resolve_var_type(attr);
        let Some(inverse) = self.model[attr].inverse.clone() else {
            return failed;
        };
        if inverse.target.is_some() {
            return failed;
        }

        let mut ty = self.model[attr].ty;
        if let Some(TypeBody::Aggregate { base, .. }) = self.model.body(ty) {
            ty = *base;
        }
        let name = self.model[attr].name;
        match self.model.entity_of_type(ty) {
            None => {
                self.diag
                    .report(DiagnosticKind::InverseBadEntity, name.loc)
                    .arg(self.model.name(name.name))
                    .emit();
            }
            Some(entity) => match self
                .model
                .find_inherited_attribute(entity, inverse.attribute.name)
            {
                Some(target) => {
                    if let Some(inverse) = &mut self.model[attr].inverse {
                        inverse.target = Some(target);
                    }
                    failed |= self.model[target].status.is_failed();
                }
                None => {
                    let entity_name = self.model[entity].symbol.name;
                    self.diag
                        .report(DiagnosticKind::InverseBadAttribute, inverse.attribute.loc)
                        .arg(self.model.name(inverse.attribute.name))
                        .arg(self.model.name(entity_name))
                        .emit();
                }
            },
        }
        if failed {
            self.model[attr].status = Status::Failed;
        }
        failed
    }

    /// Bind UNIQUE attribute references. Returns true on failure.
    fn resolve_unique_rules(&mut self, entity: ScopeId) -> bool {
        let Some(data) = self.model.entity_mut(entity) else {
            return false;
        };
        let mut rules = std::mem::take(&mut data.unique);
        let mut failed = false;
        for rule in &mut rules {
            for attr in &mut rule.attrs {
                if attr.target.is_some() {
                    continue;
                }
                match self.resolve_attr_ref(entity, attr.entity, attr.attribute) {
                    Some(var) => {
                        attr.target = Some(var);
                        if self.model[var].owner == entity {
                            self.model[var].flags.unique = true;
                        }
                    }
                    None => failed = true,
                }
            }
        }
        if let Some(data) = self.model.entity_mut(entity) {
            data.unique = rules;
        }
        failed
    }

    /// `attr` or `SELF\group.attr` as written in a UNIQUE clause.
    fn resolve_attr_ref(
        &mut self,
        entity: ScopeId,
        group: Option<Symbol>,
        attribute: Symbol,
    ) -> Option<VarId> {
        let owner = match group {
            Some(group) => {
                let Some(sup) = self.model.find_inherited_entity(entity, group.name) else {
                    let entity_name = self.model[entity].symbol.name;
                    self.diag
                        .report(DiagnosticKind::UnknownSupertype, group.loc)
                        .arg(self.model.name(group.name))
                        .arg(self.model.name(entity_name))
                        .emit();
                    return None;
                };
                if let Some(var) = self.model.local_attribute(sup, attribute.name) {
                    return Some(var);
                }
                sup
            }
            None => {
                if let Some(var) = self.model.find_inherited_attribute(entity, attribute.name) {
                    return Some(var);
                }
                entity
            }
        };
        let owner_name = self.model[owner].symbol.name;
        self.diag
            .report(DiagnosticKind::UnknownAttrInEntity, attribute.loc)
            .arg(self.model.name(attribute.name))
            .arg(self.model.name(owner_name))
            .emit();
        None
    }

    /// Every subtype listed in `SUPERTYPE OF` must name this entity back.
    fn check_missing_supertypes(&mut self, entity: ScopeId) {
        let subtypes = self
            .model
            .entity(entity)
            .map(|data| data.subtypes.clone())
            .unwrap_or_default();
        for sub in subtypes {
            let names_back = self
                .model
                .entity(sub)
                .is_some_and(|data| data.supertypes.contains(&entity));
            if names_back {
                continue;
            }
            let symbol = self.model[sub].symbol;
            let entity_name = self.model[entity].symbol.name;
            self.diag
                .report(DiagnosticKind::MissingSupertype, symbol.loc)
                .arg(self.model.name(entity_name))
                .arg(self.model.name(symbol.name))
                .emit();
            self.fail_scope(sub);
        }
    }

    /// Inherited attribute count: the sizes of all supertypes, each being
    /// its own inherited count plus its own attributes.
    fn calculate_inheritance(&mut self, entity: ScopeId) {
        if !self.enter_recursion() {
            return;
        }
        let Some(data) = self.model.entity_mut(entity) else {
            self.exit_recursion();
            return;
        };
        data.inheritance = Some(0);
        let supertypes = data.supertypes.clone();

        let mut total = 0;
        for sup in supertypes {
            if self.model.entity(sup).is_some_and(|data| data.inheritance.is_none()) {
                self.calculate_inheritance(sup);
            }
            total += self.model.entity_size(sup);
        }
        if let Some(data) = self.model.entity_mut(entity) {
            data.inheritance = Some(total);
        }
        self.exit_recursion();
    }
}

impl Model {
    /// What a resolved type node stands for: the target of a bare name,
    /// the node itself otherwise.
    pub fn settled(&self, id: TypeId) -> TypeId {
        let ty = &self[id];
        match (ty.reference, ty.head) {
            (true, Some(target)) => target,
            _ => id,
        }
    }

    /// Two type nodes naming the same type.
    pub fn same_type(&self, a: TypeId, b: TypeId) -> bool {
        a == b || (self[a].body.is_some() && self[a].body == self[b].body)
    }

    /// The element type shared by every member of a select, through nested
    /// selects. None unless all members are aggregates of one base type.
    pub fn common_aggregate_base(&self, select: TypeId) -> Option<TypeId> {
        let mut base = None;
        let mut visited = Vec::new();
        if self.collect_aggregate_base(select, &mut base, &mut visited) {
            base
        } else {
            None
        }
    }

    fn collect_aggregate_base(
        &self,
        ty: TypeId,
        base: &mut Option<TypeId>,
        visited: &mut Vec<BodyId>,
    ) -> bool {
        let Some(body) = self[ty].body else {
            return false;
        };
        if visited.contains(&body) {
            return true;
        }
        visited.push(body);
        let TypeBody::Select(members) = &self[body] else {
            return false;
        };
        for member in members {
            match self.body(*member) {
                Some(TypeBody::Select(_)) => {
                    if !self.collect_aggregate_base(*member, base, visited) {
                        return false;
                    }
                }
                Some(TypeBody::Aggregate { base: element, .. }) => match base {
                    Some(existing) if !self.same_type(*existing, *element) => return false,
                    Some(_) => {}
                    None => *base = Some(*element),
                },
                _ => return false,
            }
        }
        true
    }
}
