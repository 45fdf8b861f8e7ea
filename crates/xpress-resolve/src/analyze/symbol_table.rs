//! Name lookup.
//!
//! Ordinary lookup walks the scope chain outward. At a schema it also looks
//! through every schema imported whole. Enumeration items live in a separate
//! namespace and are only found by `lookup_enum_item`.

use xpress_core::Name;

use crate::model::{
    BodyId, Decl, ExprId, KindSet, Model, ScopeData, ScopeId, TypeBody, TypeId, VarId,
};

impl Model {
    /// The nearest declaration of `name` visible from `scope` whose kind is
    /// in `mask`. Imported names are returned as what they stand for.
    pub fn lookup(&self, scope: ScopeId, name: Name, mask: KindSet) -> Option<Decl> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if let Some(decl) = self.lookup_local(id, name, mask) {
                return Some(decl);
            }
            current = self[id].parent;
        }
        None
    }

    fn lookup_local(&self, scope: ScopeId, name: Name, mask: KindSet) -> Option<Decl> {
        if let Some(decl) = self.dict_entry(scope, name)
            && self.matches(decl, mask)
        {
            return Some(decl);
        }
        if self[scope].is_schema() {
            return self.lookup_interfaced(scope, name, mask);
        }
        None
    }

    /// Dictionary entry of `scope` for `name`, with a resolved import
    /// replaced by its target. Unresolved imports are invisible.
    pub fn dict_entry(&self, scope: ScopeId, name: Name) -> Option<Decl> {
        let decl = *self[scope].dict.get(&name)?;
        self.unwrap_rename(decl)
    }

    pub fn unwrap_rename(&self, decl: Decl) -> Option<Decl> {
        match decl {
            Decl::Rename(id) => self[id].target,
            decl => Some(decl),
        }
    }

    fn matches(&self, decl: Decl, mask: KindSet) -> bool {
        self.decl_kind(decl).is_some_and(|kind| mask.contains(kind))
    }

    /// Search the schemas `schema` imports whole, depth first.
    fn lookup_interfaced(&self, schema: ScopeId, name: Name, mask: KindSet) -> Option<Decl> {
        let mut visited = vec![schema];
        let mut stack: Vec<ScopeId> = self.interface_targets(schema);
        stack.reverse();
        while let Some(id) = stack.pop() {
            if visited.contains(&id) {
                continue;
            }
            visited.push(id);
            if let Some(decl) = self.dict_entry(id, name)
                && self.matches(decl, mask)
            {
                return Some(decl);
            }
            stack.extend(self.interface_targets(id).into_iter().rev());
        }
        None
    }

    /// Resolved targets of `USE FROM s;` and `REFERENCE FROM s;`.
    pub fn interface_targets(&self, schema: ScopeId) -> Vec<ScopeId> {
        self.schema(schema)
            .map(|data| data.interfaces.iter().filter_map(|i| i.target).collect())
            .unwrap_or_default()
    }

    /// Variable lookup. Inside an entity, attributes inherited from
    /// supertypes are visible too.
    pub fn find_variable(&self, scope: ScopeId, name: Name) -> Option<VarId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let found = match self[id].data {
                ScopeData::Entity(_) => self.find_inherited_attribute(id, name),
                _ => match self.lookup_local(id, name, KindSet::VARIABLE) {
                    Some(Decl::Var(var)) => Some(var),
                    _ => None,
                },
            };
            if found.is_some() {
                return found;
            }
            current = self[id].parent;
        }
        None
    }

    /// Enumeration item named `name`, searched outward up to and including
    /// the enclosing schema.
    pub fn lookup_enum_item(&self, scope: ScopeId, name: Name) -> Option<ExprId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if let Some(item) = self[id].enum_tags.get(&name) {
                return Some(*item);
            }
            if self[id].is_schema() {
                break;
            }
            current = self[id].parent;
        }
        None
    }

    /// First attribute named `name` in `entity` or its supertypes.
    pub fn find_inherited_attribute(&self, entity: ScopeId, name: Name) -> Option<VarId> {
        self.inherited_attributes(entity, name).into_iter().next()
    }

    /// Every distinct attribute named `name` visible in `entity`.
    ///
    /// An entity declaring the name hides its supertypes' declarations. More
    /// than one result means two unrelated supertypes both declare it.
    pub fn inherited_attributes(&self, entity: ScopeId, name: Name) -> Vec<VarId> {
        let mut found = Vec::new();
        let mut visited = Vec::new();
        let mut stack = vec![entity];
        while let Some(id) = stack.pop() {
            if visited.contains(&id) {
                continue;
            }
            visited.push(id);
            if let Some(Decl::Var(var)) = self[id].dict.get(&name) {
                if !found.contains(var) {
                    found.push(*var);
                }
                continue;
            }
            if let Some(data) = self.entity(id) {
                stack.extend(data.supertypes.iter().rev());
            }
        }
        found
    }

    /// `entity` itself or one of its supertypes, transitively, named `name`.
    pub fn find_inherited_entity(&self, entity: ScopeId, name: Name) -> Option<ScopeId> {
        let mut visited = Vec::new();
        let mut stack = vec![entity];
        while let Some(id) = stack.pop() {
            if visited.contains(&id) {
                continue;
            }
            visited.push(id);
            if self[id].symbol.name == name {
                return Some(id);
            }
            if let Some(data) = self.entity(id) {
                stack.extend(data.supertypes.iter().rev());
            }
        }
        None
    }

    /// Attribute declared by `entity` itself.
    pub fn local_attribute(&self, entity: ScopeId, name: Name) -> Option<VarId> {
        match self[entity].dict.get(&name) {
            Some(Decl::Var(var)) if self.entity(entity).is_some() => Some(*var),
            _ => None,
        }
    }

    /// Inherited plus own attribute count.
    pub fn entity_size(&self, entity: ScopeId) -> usize {
        self.entity(entity)
            .map(|data| data.inheritance.unwrap_or(0) + data.attributes.len())
            .unwrap_or(0)
    }

    /// Entities a select type can stand for, through nested selects.
    pub fn select_entities(&self, select: TypeId) -> Vec<ScopeId> {
        let mut entities = Vec::new();
        let mut visited: Vec<BodyId> = Vec::new();
        let mut stack = vec![select];
        while let Some(ty) = stack.pop() {
            let Some(body) = self[ty].body else {
                continue;
            };
            if visited.contains(&body) {
                continue;
            }
            visited.push(body);
            match &self[body] {
                TypeBody::Select(members) => stack.extend(members.iter().rev()),
                TypeBody::Entity(entity) if !entities.contains(entity) => entities.push(*entity),
                _ => {}
            }
        }
        entities
    }
}
