//! Construction API.
//!
//! This is the boundary with the parser: it creates declarations with every
//! cross reference left as a `Symbol`, and records which names each scope
//! declares. Nothing here resolves anything.

use indexmap::IndexMap;
use xpress_core::{Name, Symbol};

use super::*;

impl Model {
    pub(crate) fn alloc_scope(
        &mut self,
        symbol: Symbol,
        parent: Option<ScopeId>,
        data: ScopeData,
    ) -> ScopeId {
        let id = ScopeId::from_index(self.scopes.len());
        self.scopes.push(Scope {
            symbol,
            parent,
            dict: IndexMap::new(),
            enum_tags: IndexMap::new(),
            status: Status::Unresolved,
            search_id: 0,
            data,
        });
        id
    }

    pub(crate) fn alloc_type(
        &mut self,
        scope: ScopeId,
        symbol: Symbol,
        head: Option<TypeId>,
        body: Option<TypeBody>,
    ) -> TypeId {
        let body = body.map(|body| {
            let id = BodyId::from_index(self.bodies.len());
            self.bodies.push(body);
            id
        });
        let id = TypeId::from_index(self.types.len());
        self.types.push(Type {
            symbol,
            scope,
            head,
            body,
            wheres: Vec::new(),
            status: Status::Unresolved,
            search_id: 0,
            reference: false,
        });
        id
    }

    pub(crate) fn alloc_var(
        &mut self,
        owner: ScopeId,
        name: Symbol,
        ty: TypeId,
        flags: VarFlags,
    ) -> VarId {
        let id = VarId::from_index(self.vars.len());
        self.vars.push(Variable {
            name,
            owner,
            ty,
            initializer: None,
            flags,
            inverse: None,
            redeclares: None,
            status: Status::Unresolved,
        });
        id
    }

    pub(crate) fn alloc_expr(&mut self, symbol: Symbol, kind: ExprKind) -> ExprId {
        let id = ExprId::from_index(self.exprs.len());
        self.exprs.push(Expr {
            symbol,
            kind,
            return_type: None,
            status: Status::Unresolved,
        });
        id
    }

    /// Bind `symbol` in `scope`. A second binding of the same name is kept
    /// out of the dictionary and reported when resolution starts.
    pub(crate) fn declare(&mut self, scope: ScopeId, symbol: Symbol, decl: Decl) {
        if self[scope].dict.contains_key(&symbol.name) {
            self.duplicates.push((scope, symbol));
        } else {
            self[scope].dict.insert(symbol.name, decl);
        }
    }

    fn child_scope(&mut self, parent: ScopeId, symbol: Symbol, data: ScopeData) -> ScopeId {
        let id = self.alloc_scope(symbol, Some(parent), data);
        self.declare(parent, symbol, Decl::Scope(id));
        id
    }

    // Schemas and imports

    pub fn add_schema(&mut self, name: Symbol) -> ScopeId {
        let root = self.root();
        self.child_scope(root, name, ScopeData::Schema(SchemaData::default()))
    }

    /// `USE FROM from (old AS alias);`
    pub fn add_use(
        &mut self,
        schema: ScopeId,
        from: Symbol,
        old: Symbol,
        alias: Option<Symbol>,
    ) -> RenameId {
        self.add_rename(schema, ImportKind::Use, from, old, alias)
    }

    /// `REFERENCE FROM from (old AS alias);`
    pub fn add_reference(
        &mut self,
        schema: ScopeId,
        from: Symbol,
        old: Symbol,
        alias: Option<Symbol>,
    ) -> RenameId {
        self.add_rename(schema, ImportKind::Reference, from, old, alias)
    }

    fn add_rename(
        &mut self,
        schema: ScopeId,
        kind: ImportKind,
        from: Symbol,
        old: Symbol,
        alias: Option<Symbol>,
    ) -> RenameId {
        let id = RenameId::from_index(self.renames.len());
        self.renames.push(Rename {
            kind,
            schema: from,
            old,
            new: alias.unwrap_or(old),
            owner: schema,
            status: Status::Unresolved,
            target: None,
        });
        if let ScopeData::Schema(data) = &mut self[schema].data {
            data.renames.push(id);
        }
        id
    }

    /// `USE FROM from;`
    pub fn use_schema(&mut self, schema: ScopeId, from: Symbol) {
        self.add_interface(schema, ImportKind::Use, from);
    }

    /// `REFERENCE FROM from;`
    pub fn reference_schema(&mut self, schema: ScopeId, from: Symbol) {
        self.add_interface(schema, ImportKind::Reference, from);
    }

    fn add_interface(&mut self, schema: ScopeId, kind: ImportKind, from: Symbol) {
        if let ScopeData::Schema(data) = &mut self[schema].data {
            data.interfaces.push(Interface {
                kind,
                schema: from,
                target: None,
                status: Status::Unresolved,
            });
        }
    }

    // Entities

    pub fn add_entity(&mut self, scope: ScopeId, name: Symbol) -> ScopeId {
        let id = ScopeId::from_index(self.scopes.len());
        let ty = self.alloc_type(scope, name, None, Some(TypeBody::Entity(id)));
        let data = EntityData {
            ty,
            is_abstract: false,
            supertype_symbols: Vec::new(),
            supertypes: Vec::new(),
            subtype_expr: None,
            subtypes: Vec::new(),
            attributes: Vec::new(),
            unique: Vec::new(),
            wheres: Vec::new(),
            inheritance: None,
        };
        self.child_scope(scope, name, ScopeData::Entity(data))
    }

    pub fn set_abstract(&mut self, entity: ScopeId) {
        if let Some(data) = self.entity_mut(entity) {
            data.is_abstract = true;
        }
    }

    /// One name of `SUBTYPE OF (...)`.
    pub fn add_supertype(&mut self, entity: ScopeId, name: Symbol) {
        if let Some(data) = self.entity_mut(entity) {
            data.supertype_symbols.push(name);
        }
    }

    /// `SUPERTYPE OF (...)`.
    pub fn set_subtype_expr(&mut self, entity: ScopeId, expr: SubtypeExpr) {
        if let Some(data) = self.entity_mut(entity) {
            data.subtype_expr = Some(expr);
        }
    }

    /// Explicit attribute `name : ty;`.
    pub fn add_attribute(&mut self, entity: ScopeId, name: Symbol, ty: TypeId) -> VarId {
        self.add_attribute_with(entity, name, ty, VarFlags::default())
    }

    pub fn add_attribute_with(
        &mut self,
        entity: ScopeId,
        name: Symbol,
        ty: TypeId,
        flags: VarFlags,
    ) -> VarId {
        let id = self.alloc_var(entity, name, ty, flags);
        self.declare(entity, name, Decl::Var(id));
        if let Some(data) = self.entity_mut(entity) {
            data.attributes.push(id);
        }
        id
    }

    /// Derived attribute `name : ty := expr;`.
    pub fn add_derived(
        &mut self,
        entity: ScopeId,
        name: Symbol,
        ty: TypeId,
        expr: ExprId,
    ) -> VarId {
        let id = self.add_attribute(entity, name, ty);
        self[id].initializer = Some(expr);
        id
    }

    /// Inverse attribute `name : ty FOR inverted;`.
    pub fn add_inverse(
        &mut self,
        entity: ScopeId,
        name: Symbol,
        ty: TypeId,
        inverted: Symbol,
    ) -> VarId {
        let id = self.add_attribute(entity, name, ty);
        self[id].inverse = Some(Inverse {
            attribute: inverted,
            target: None,
        });
        id
    }

    /// `SELF\supertype.name : ty;`
    pub fn redeclare_attribute(
        &mut self,
        entity: ScopeId,
        supertype: Symbol,
        name: Symbol,
        ty: TypeId,
    ) -> VarId {
        let id = self.add_attribute(entity, name, ty);
        self[id].redeclares = Some(supertype);
        id
    }

    /// `label : a, SELF\s.b;` where each attribute may name a supertype.
    pub fn add_unique(
        &mut self,
        entity: ScopeId,
        label: Symbol,
        attrs: Vec<(Option<Symbol>, Symbol)>,
    ) {
        let attrs = attrs
            .into_iter()
            .map(|(entity, attribute)| QualifiedAttr {
                entity,
                attribute,
                target: None,
            })
            .collect();
        if let Some(data) = self.entity_mut(entity) {
            data.unique.push(UniqueRule { label, attrs });
        }
    }

    /// Domain rule of an entity or a global rule.
    pub fn add_where(&mut self, scope: ScopeId, label: Symbol, expr: ExprId) {
        let rule = Where {
            label,
            expr,
            status: Status::Unresolved,
        };
        match &mut self[scope].data {
            ScopeData::Entity(data) => data.wheres.push(rule),
            ScopeData::Rule(data) => data.wheres.push(rule),
            _ => {}
        }
    }

    /// Domain rule of a defined type.
    pub fn add_type_where(&mut self, ty: TypeId, label: Symbol, expr: ExprId) {
        self[ty].wheres.push(Where {
            label,
            expr,
            status: Status::Unresolved,
        });
    }

    // Algorithms

    pub fn add_function(&mut self, scope: ScopeId, name: Symbol, return_type: TypeId) -> ScopeId {
        let alg = Algorithm {
            return_type: Some(return_type),
            ..Algorithm::default()
        };
        self.child_scope(scope, name, ScopeData::Function(alg))
    }

    pub fn add_procedure(&mut self, scope: ScopeId, name: Symbol) -> ScopeId {
        self.child_scope(scope, name, ScopeData::Procedure(Algorithm::default()))
    }

    pub fn add_rule(&mut self, scope: ScopeId, name: Symbol) -> ScopeId {
        self.child_scope(scope, name, ScopeData::Rule(RuleData::default()))
    }

    pub fn add_parameter(&mut self, alg: ScopeId, name: Symbol, ty: TypeId) -> VarId {
        let flags = VarFlags {
            parameter: true,
            ..VarFlags::default()
        };
        let id = self.alloc_var(alg, name, ty, flags);
        self.declare(alg, name, Decl::Var(id));
        if let ScopeData::Function(data) | ScopeData::Procedure(data) = &mut self[alg].data {
            data.params.push(id);
        }
        id
    }

    /// `LOCAL name : ty := init; END_LOCAL;`
    pub fn add_local(
        &mut self,
        scope: ScopeId,
        name: Symbol,
        ty: TypeId,
        init: Option<ExprId>,
    ) -> VarId {
        let id = self.alloc_var(scope, name, ty, VarFlags::default());
        self[id].initializer = init;
        self.declare(scope, name, Decl::Var(id));
        id
    }

    /// `CONSTANT name : ty := value; END_CONSTANT;`
    pub fn add_constant(
        &mut self,
        scope: ScopeId,
        name: Symbol,
        ty: TypeId,
        value: ExprId,
    ) -> VarId {
        let flags = VarFlags {
            constant: true,
            ..VarFlags::default()
        };
        let id = self.alloc_var(scope, name, ty, flags);
        self[id].initializer = Some(value);
        self.declare(scope, name, Decl::Var(id));
        id
    }

    /// Statement list of a function, procedure or rule.
    pub fn set_body(&mut self, scope: ScopeId, body: Vec<StmtId>) {
        match &mut self[scope].data {
            ScopeData::Function(data) | ScopeData::Procedure(data) => data.body = body,
            ScopeData::Rule(data) => data.body = body,
            _ => {}
        }
    }

    // Types

    /// A bare type name written in `scope`.
    pub fn type_ref(&mut self, scope: ScopeId, name: Symbol) -> TypeId {
        let id = self.alloc_type(scope, name, None, None);
        self[id].reference = true;
        id
    }

    /// `TYPE name = head;`
    pub fn declare_alias(&mut self, scope: ScopeId, name: Symbol, head: TypeId) -> TypeId {
        let id = self.alloc_type(scope, name, Some(head), None);
        self.declare(scope, name, Decl::Type(id));
        id
    }

    /// `TYPE name = SELECT (members);`
    pub fn declare_select(
        &mut self,
        scope: ScopeId,
        name: Symbol,
        members: Vec<TypeId>,
    ) -> TypeId {
        let id = self.alloc_type(scope, name, None, Some(TypeBody::Select(members)));
        self.declare(scope, name, Decl::Type(id));
        id
    }

    /// `TYPE name = ENUMERATION OF (items);`
    ///
    /// Each item becomes an expression node registered in the scope's
    /// enumeration namespace.
    pub fn declare_enumeration(
        &mut self,
        scope: ScopeId,
        name: Symbol,
        items: &[Symbol],
    ) -> TypeId {
        let id = self.alloc_type(scope, name, None, None);
        let exprs: Vec<ExprId> = items
            .iter()
            .map(|item| self.alloc_expr(*item, ExprKind::EnumItem { ty: id }))
            .collect();
        for (item, expr) in items.iter().zip(&exprs) {
            self[scope].enum_tags.entry(item.name).or_insert(*expr);
        }
        let body = BodyId::from_index(self.bodies.len());
        self.bodies.push(TypeBody::Enumeration(exprs));
        self[id].body = Some(body);
        self.declare(scope, name, Decl::Type(id));
        id
    }

    /// `TYPE name = <aggregate or basic type>;`
    pub fn declare_structural(
        &mut self,
        scope: ScopeId,
        name: Symbol,
        body: TypeBody,
    ) -> TypeId {
        let id = self.alloc_type(scope, name, None, Some(body));
        self.declare(scope, name, Decl::Type(id));
        id
    }

    /// Anonymous aggregate such as `SET [1:?] OF point`.
    pub fn aggregate(
        &mut self,
        scope: ScopeId,
        at: Symbol,
        kind: AggregateKind,
        base: TypeId,
        bounds: Option<(ExprId, Option<ExprId>)>,
    ) -> TypeId {
        let (lower, upper) = match bounds {
            Some((lower, upper)) => (Some(lower), upper),
            None => (None, None),
        };
        let body = TypeBody::Aggregate {
            kind,
            base,
            lower,
            upper,
            tag: None,
        };
        self.alloc_type(scope, at, None, Some(body))
    }

    /// Anonymous basic type with a width or precision, such as `STRING(8)`.
    pub fn basic(
        &mut self,
        scope: ScopeId,
        at: Symbol,
        kind: BasicKind,
        precision: Option<ExprId>,
    ) -> TypeId {
        self.alloc_type(scope, at, None, Some(TypeBody::Basic { kind, precision }))
    }

    /// `GENERIC` or `GENERIC:tag` in a parameter list.
    pub fn generic(&mut self, scope: ScopeId, at: Symbol, tag: Option<Name>) -> TypeId {
        self.alloc_type(scope, at, None, Some(TypeBody::Generic { tag }))
    }

    // Expressions

    /// A literal. Integer 0 and 1 return the shared singleton nodes.
    pub fn literal(&mut self, at: Symbol, value: Literal) -> ExprId {
        match value {
            Literal::Integer(0) => self.builtins().zero,
            Literal::Integer(1) => self.builtins().one,
            value => self.alloc_expr(at, ExprKind::Literal(value)),
        }
    }

    pub fn identifier(&mut self, name: Symbol) -> ExprId {
        self.alloc_expr(name, ExprKind::Identifier { target: None })
    }

    pub fn call(&mut self, callee: Symbol, args: Vec<ExprId>) -> ExprId {
        self.alloc_expr(callee, ExprKind::Call { args, target: None })
    }

    /// `[a, b, c]`
    pub fn aggregate_init(&mut self, at: Symbol, elements: Vec<ExprId>) -> ExprId {
        self.alloc_expr(at, ExprKind::Aggregate(elements))
    }

    pub fn op(&mut self, at: Symbol, op: Operator, operands: Vec<ExprId>) -> ExprId {
        debug_assert_eq!(operands.len(), op.arity(), "operand count for {op:?}");
        self.alloc_expr(at, ExprKind::Op { op, operands })
    }

    pub fn unary(&mut self, at: Symbol, op: Operator, operand: ExprId) -> ExprId {
        self.op(at, op, vec![operand])
    }

    pub fn binary(&mut self, at: Symbol, op: Operator, lhs: ExprId, rhs: ExprId) -> ExprId {
        self.op(at, op, vec![lhs, rhs])
    }

    pub fn self_ref(&mut self, at: Symbol) -> ExprId {
        self.alloc_expr(at, ExprKind::SelfRef)
    }

    /// `QUERY(var <* source | condition)` written in `scope`.
    pub fn query(
        &mut self,
        scope: ScopeId,
        var: Symbol,
        source: ExprId,
        condition: ExprId,
    ) -> ExprId {
        let placeholder = self.builtins().generic;
        let query_scope = self.alloc_scope(var, Some(scope), ScopeData::Query {
            var: VarId::default(),
        });
        let var_id = self.alloc_var(query_scope, var, placeholder, VarFlags::default());
        self[query_scope].data = ScopeData::Query { var: var_id };
        self.declare(query_scope, var, Decl::Var(var_id));
        self.alloc_expr(
            var,
            ExprKind::Query {
                scope: query_scope,
                source,
                condition,
            },
        )
    }

    // Statements

    pub fn stmt(&mut self, at: Symbol, kind: StmtKind) -> StmtId {
        let id = StmtId::from_index(self.stmts.len());
        self.stmts.push(Stmt { symbol: at, kind });
        id
    }

    /// `ALIAS var FOR expr; body END_ALIAS;` written in `scope`.
    pub fn alias_stmt(
        &mut self,
        scope: ScopeId,
        at: Symbol,
        var: Symbol,
        expr: ExprId,
        body: Vec<StmtId>,
    ) -> StmtId {
        let placeholder = self.builtins().generic;
        let alias_scope = self.alloc_scope(var, Some(scope), ScopeData::Alias {
            var: VarId::default(),
        });
        let var_id = self.alloc_var(alias_scope, var, placeholder, VarFlags::default());
        self[var_id].initializer = Some(expr);
        self[alias_scope].data = ScopeData::Alias { var: var_id };
        self.declare(alias_scope, var, Decl::Var(var_id));
        self.stmt(
            at,
            StmtKind::Alias {
                scope: alias_scope,
                body,
            },
        )
    }

    /// Loop control `var := start TO end BY step` for a loop written in
    /// `scope`. Pass the result as the loop's `increment`.
    pub fn increment(
        &mut self,
        scope: ScopeId,
        var: Symbol,
        start: ExprId,
        end: ExprId,
        step: Option<ExprId>,
    ) -> ScopeId {
        let integer = self.builtins().integer;
        let inc_scope = self.alloc_scope(
            var,
            Some(scope),
            ScopeData::Increment(Increment {
                var: VarId::default(),
                start,
                end,
                step,
            }),
        );
        let var_id = self.alloc_var(inc_scope, var, integer, VarFlags::default());
        if let ScopeData::Increment(inc) = &mut self[inc_scope].data {
            inc.var = var_id;
        }
        self.declare(inc_scope, var, Decl::Var(var_id));
        inc_scope
    }
}
