//! The declaration graph the resolver works on.
//!
//! Every node lives in an arena owned by `Model` and is addressed by a typed
//! index. Cross references start out as `Symbol`s written by the parser and
//! are replaced by ids as the passes bind them. Nothing is ever removed.

mod build;
mod builtins;
mod expr;
mod ids;
mod scope;
mod stmt;
mod types;

#[cfg(test)]
mod mod_tests;

use std::ops::{Index, IndexMut};

use xpress_core::{Interner, Location, Name, Symbol};

pub use builtins::Builtins;
pub use expr::{Binding, Expr, ExprKind, Literal, Logical, Operator};
pub use ids::{BodyId, ExprId, RenameId, ScopeId, StmtId, TypeId, VarId};
pub use scope::{
    Algorithm, Decl, DeclKind, EntityData, ImportKind, Increment, Interface, Inverse, KindSet,
    QualifiedAttr, Rename, RuleData, SchemaData, Scope, ScopeData, Status, SubtypeExpr,
    UniqueRule, VarFlags, Variable, Where,
};
pub use stmt::{CaseItem, Stmt, StmtKind};
pub use types::{AggregateKind, BasicKind, Type, TypeBody};

#[derive(Debug, Clone)]
pub struct Model {
    interner: Interner,
    /// File new symbols are attributed to.
    file: Name,
    pub(crate) scopes: Vec<Scope>,
    pub(crate) types: Vec<Type>,
    pub(crate) bodies: Vec<TypeBody>,
    pub(crate) vars: Vec<Variable>,
    pub(crate) exprs: Vec<Expr>,
    pub(crate) stmts: Vec<Stmt>,
    pub(crate) renames: Vec<Rename>,
    root: ScopeId,
    builtins: Builtins,
    /// Declarations that collided with an earlier one in the same scope.
    /// Emptied once reported.
    pub(crate) duplicates: Vec<(ScopeId, Symbol)>,
    /// Last stamp handed out for `search_id` marks. Lives with the marks so
    /// a later resolution never reuses one.
    pub(crate) generation: u32,
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl Model {
    /// An empty graph holding only the root scope and the built-in
    /// declarations.
    pub fn new() -> Self {
        let mut interner = Interner::new();
        let file = interner.intern("<builtin>");
        let root_symbol = Symbol::new(interner.intern_ident("express"), Location::new(file, 0));

        let mut model = Self {
            interner,
            file,
            scopes: Vec::new(),
            types: Vec::new(),
            bodies: Vec::new(),
            vars: Vec::new(),
            exprs: Vec::new(),
            stmts: Vec::new(),
            renames: Vec::new(),
            root: ScopeId::from_index(0),
            builtins: Builtins::default(),
            duplicates: Vec::new(),
            generation: 0,
        };
        model.root = model.alloc_scope(root_symbol, None, ScopeData::Express);
        model.builtins = builtins::install(&mut model);
        model
    }

    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    pub fn interner_mut(&mut self) -> &mut Interner {
        &mut self.interner
    }

    pub fn root(&self) -> ScopeId {
        self.root
    }

    pub fn builtins(&self) -> &Builtins {
        &self.builtins
    }

    /// Attribute symbols created from now on to `path`.
    pub fn set_file(&mut self, path: &str) {
        self.file = self.interner.intern(path);
    }

    /// Create an identifier symbol in the current file.
    pub fn symbol(&mut self, text: &str, line: u32) -> Symbol {
        let name = self.interner.intern_ident(text);
        Symbol::new(name, Location::new(self.file, line))
    }

    pub fn name(&self, name: Name) -> &str {
        self.interner.resolve(name)
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    pub fn entity(&self, id: ScopeId) -> Option<&EntityData> {
        match &self[id].data {
            ScopeData::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    pub(crate) fn entity_mut(&mut self, id: ScopeId) -> Option<&mut EntityData> {
        match &mut self[id].data {
            ScopeData::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    pub fn schema(&self, id: ScopeId) -> Option<&SchemaData> {
        match &self[id].data {
            ScopeData::Schema(schema) => Some(schema),
            _ => None,
        }
    }

    pub(crate) fn schema_mut(&mut self, id: ScopeId) -> Option<&mut SchemaData> {
        match &mut self[id].data {
            ScopeData::Schema(schema) => Some(schema),
            _ => None,
        }
    }

    pub fn algorithm(&self, id: ScopeId) -> Option<&Algorithm> {
        match &self[id].data {
            ScopeData::Function(alg) | ScopeData::Procedure(alg) => Some(alg),
            _ => None,
        }
    }

    pub fn body(&self, ty: TypeId) -> Option<&TypeBody> {
        self[ty].body.map(|body| &self[body])
    }

    /// The entity a type stands for, if it is an entity's implicit type.
    pub fn entity_of_type(&self, ty: TypeId) -> Option<ScopeId> {
        match self.body(ty)? {
            TypeBody::Entity(entity) => Some(*entity),
            _ => None,
        }
    }

    pub fn decl_kind(&self, decl: Decl) -> Option<DeclKind> {
        match decl {
            Decl::Scope(id) => self[id].kind(),
            Decl::Type(_) => Some(DeclKind::Type),
            Decl::Var(_) => Some(DeclKind::Variable),
            Decl::Rename(id) => self[id].target.and_then(|target| self.decl_kind(target)),
        }
    }

    pub fn decl_symbol(&self, decl: Decl) -> Symbol {
        match decl {
            Decl::Scope(id) => self[id].symbol,
            Decl::Type(id) => self[id].symbol,
            Decl::Var(id) => self[id].name,
            Decl::Rename(id) => self[id].new,
        }
    }
}

macro_rules! arena_index {
    ($($id:ty => $field:ident: $node:ty;)*) => {
        $(
            impl Index<$id> for Model {
                type Output = $node;

                #[inline]
                fn index(&self, id: $id) -> &$node {
                    &self.$field[id.index()]
                }
            }

            impl IndexMut<$id> for Model {
                #[inline]
                fn index_mut(&mut self, id: $id) -> &mut $node {
                    &mut self.$field[id.index()]
                }
            }
        )*
    };
}

arena_index! {
    ScopeId => scopes: Scope;
    TypeId => types: Type;
    BodyId => bodies: TypeBody;
    VarId => vars: Variable;
    ExprId => exprs: Expr;
    StmtId => stmts: Stmt;
    RenameId => renames: Rename;
}
