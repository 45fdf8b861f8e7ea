//! Declarations every schema can see: the implicit EXPRESS scope.

use xpress_core::Symbol;

use super::*;

/// Handles to built-in nodes the resolver refers to directly.
#[derive(Debug, Clone, Default)]
pub struct Builtins {
    pub integer: TypeId,
    pub real: TypeId,
    pub number: TypeId,
    pub string: TypeId,
    pub binary: TypeId,
    pub boolean: TypeId,
    pub logical: TypeId,
    pub generic: TypeId,
    /// `AGGREGATE OF GENERIC`, the type of aggregate initializers.
    pub aggregate: TypeId,
    /// `BAG OF GENERIC`, the type of `USEDIN`.
    pub bag_of_generic: TypeId,
    pub runtime: TypeId,
    /// Installed in place of undefined type names.
    pub bad: TypeId,
    pub zero: ExprId,
    pub one: ExprId,
    pub nvl: ScopeId,
    pub usedin: ScopeId,
}

const BASIC_TYPES: &[(&str, BasicKind)] = &[
    ("integer", BasicKind::Integer),
    ("real", BasicKind::Real),
    ("number", BasicKind::Number),
    ("string", BasicKind::String),
    ("binary", BasicKind::Binary),
    ("boolean", BasicKind::Boolean),
    ("logical", BasicKind::Logical),
];

/// Return type of a built-in function.
#[derive(Clone, Copy)]
enum Returns {
    Basic(BasicKind),
    Generic,
    Aggregate,
    BagOfGeneric,
}

const FUNCTIONS: &[(&str, usize, Returns)] = &[
    ("abs", 1, Returns::Basic(BasicKind::Number)),
    ("acos", 1, Returns::Basic(BasicKind::Real)),
    ("asin", 1, Returns::Basic(BasicKind::Real)),
    ("atan", 2, Returns::Basic(BasicKind::Real)),
    ("blength", 1, Returns::Basic(BasicKind::Integer)),
    ("cos", 1, Returns::Basic(BasicKind::Real)),
    ("exists", 1, Returns::Basic(BasicKind::Boolean)),
    ("exp", 1, Returns::Basic(BasicKind::Real)),
    ("format", 2, Returns::Basic(BasicKind::String)),
    ("hibound", 1, Returns::Basic(BasicKind::Integer)),
    ("hiindex", 1, Returns::Basic(BasicKind::Integer)),
    ("length", 1, Returns::Basic(BasicKind::Integer)),
    ("lobound", 1, Returns::Basic(BasicKind::Integer)),
    ("log", 1, Returns::Basic(BasicKind::Real)),
    ("log2", 1, Returns::Basic(BasicKind::Real)),
    ("log10", 1, Returns::Basic(BasicKind::Real)),
    ("loindex", 1, Returns::Basic(BasicKind::Integer)),
    ("nvl", 2, Returns::Generic),
    ("odd", 1, Returns::Basic(BasicKind::Logical)),
    ("rolesof", 1, Returns::Aggregate),
    ("sin", 1, Returns::Basic(BasicKind::Real)),
    ("sizeof", 1, Returns::Basic(BasicKind::Integer)),
    ("sqrt", 1, Returns::Basic(BasicKind::Real)),
    ("tan", 1, Returns::Basic(BasicKind::Real)),
    ("typeof", 1, Returns::Aggregate),
    ("usedin", 2, Returns::BagOfGeneric),
    ("value", 1, Returns::Basic(BasicKind::Number)),
    ("value_in", 2, Returns::Basic(BasicKind::Logical)),
    ("value_unique", 1, Returns::Basic(BasicKind::Logical)),
];

const PROCEDURES: &[(&str, usize)] = &[("insert", 3), ("remove", 2)];

const CONSTANTS: &[&str] = &["pi", "const_e"];

pub(super) fn install(model: &mut Model) -> Builtins {
    let root = model.root();
    let mut b = Builtins::default();

    for &(name, kind) in BASIC_TYPES {
        let symbol = model.symbol(name, 0);
        let id = resolved_type(
            model,
            symbol,
            TypeBody::Basic {
                kind,
                precision: None,
            },
        );
        model.declare(root, symbol, Decl::Type(id));
        match kind {
            BasicKind::Integer => b.integer = id,
            BasicKind::Real => b.real = id,
            BasicKind::Number => b.number = id,
            BasicKind::String => b.string = id,
            BasicKind::Binary => b.binary = id,
            BasicKind::Boolean => b.boolean = id,
            BasicKind::Logical => b.logical = id,
        }
    }

    let generic = model.symbol("generic", 0);
    b.generic = resolved_type(model, generic, TypeBody::Generic { tag: None });
    model.declare(root, generic, Decl::Type(b.generic));

    let aggregate = model.symbol("aggregate", 0);
    b.aggregate = resolved_type(
        model,
        aggregate,
        TypeBody::Aggregate {
            kind: AggregateKind::Aggregate,
            base: b.generic,
            lower: None,
            upper: None,
            tag: None,
        },
    );
    let bag = model.symbol("bag", 0);
    b.bag_of_generic = resolved_type(
        model,
        bag,
        TypeBody::Aggregate {
            kind: AggregateKind::Bag,
            base: b.generic,
            lower: None,
            upper: None,
            tag: None,
        },
    );
    let runtime = model.symbol("<runtime>", 0);
    b.runtime = resolved_type(model, runtime, TypeBody::Runtime);

    let bad = model.symbol("<bad>", 0);
    b.bad = model.alloc_type(root, bad, None, None);
    model[b.bad].status = Status::Failed;

    let zero = model.symbol("0", 0);
    b.zero = resolved_literal(model, zero, 0, b.integer);
    let one = model.symbol("1", 0);
    b.one = resolved_literal(model, one, 1, b.integer);

    for &(name, arity, returns) in FUNCTIONS {
        let return_type = match returns {
            Returns::Basic(kind) => b.basic(kind),
            Returns::Generic => b.generic,
            Returns::Aggregate => b.aggregate,
            Returns::BagOfGeneric => b.bag_of_generic,
        };
        let symbol = model.symbol(name, 0);
        let id = model.add_function(root, symbol, return_type);
        add_params(model, id, arity, b.generic);
        model[id].status = Status::Resolved;
        match name {
            "nvl" => b.nvl = id,
            "usedin" => b.usedin = id,
            _ => {}
        }
    }

    for &(name, arity) in PROCEDURES {
        let symbol = model.symbol(name, 0);
        let id = model.add_procedure(root, symbol);
        add_params(model, id, arity, b.generic);
        model[id].status = Status::Resolved;
    }

    for &name in CONSTANTS {
        let symbol = model.symbol(name, 0);
        let flags = VarFlags {
            constant: true,
            ..VarFlags::default()
        };
        let id = model.alloc_var(root, symbol, b.real, flags);
        model[id].status = Status::Resolved;
        model.declare(root, symbol, Decl::Var(id));
    }

    model[root].status = Status::Resolved;
    b
}

fn resolved_type(model: &mut Model, symbol: Symbol, body: TypeBody) -> TypeId {
    let root = model.root();
    let id = model.alloc_type(root, symbol, None, Some(body));
    model[id].status = Status::Resolved;
    id
}

fn resolved_literal(model: &mut Model, symbol: Symbol, value: i64, integer: TypeId) -> ExprId {
    let id = model.alloc_expr(symbol, ExprKind::Literal(Literal::Integer(value)));
    model[id].return_type = Some(integer);
    model[id].status = Status::Resolved;
    id
}

fn add_params(model: &mut Model, alg: ScopeId, arity: usize, generic: TypeId) {
    for i in 1..=arity {
        let symbol = model.symbol(&format!("arg{i}"), 0);
        let id = model.add_parameter(alg, symbol, generic);
        model[id].status = Status::Resolved;
    }
}

impl Builtins {
    /// The built-in type for a basic kind.
    pub fn basic(&self, kind: BasicKind) -> TypeId {
        match kind {
            BasicKind::Integer => self.integer,
            BasicKind::Real => self.real,
            BasicKind::Number => self.number,
            BasicKind::String => self.string,
            BasicKind::Binary => self.binary,
            BasicKind::Boolean => self.boolean,
            BasicKind::Logical => self.logical,
        }
    }
}
