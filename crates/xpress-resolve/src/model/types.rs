use xpress_core::{Name, Symbol};

use super::{BodyId, ExprId, ScopeId, Status, TypeId, Where};

/// A type declaration or reference.
///
/// Exactly one shape applies at a time: a structural `body`, an alias
/// `head`, or neither (a bare name waiting for lookup).
#[derive(Debug, Clone)]
pub struct Type {
    pub symbol: Symbol,
    /// Scope the name was written in.
    pub scope: ScopeId,
    pub head: Option<TypeId>,
    pub body: Option<BodyId>,
    pub wheres: Vec<Where>,
    pub status: Status,
    pub search_id: u32,
    /// A bare name written at a use site. Once resolved, `head` holds the
    /// type it stands for.
    pub reference: bool,
}

#[derive(Debug, Clone)]
pub enum TypeBody {
    Basic {
        kind: BasicKind,
        precision: Option<ExprId>,
    },
    Aggregate {
        kind: AggregateKind,
        base: TypeId,
        lower: Option<ExprId>,
        upper: Option<ExprId>,
        tag: Option<Name>,
    },
    Select(Vec<TypeId>),
    Enumeration(Vec<ExprId>),
    Entity(ScopeId),
    Generic {
        tag: Option<Name>,
    },
    /// Values whose type is only known when the schema is used.
    Runtime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasicKind {
    Integer,
    Real,
    Number,
    String,
    Binary,
    Boolean,
    Logical,
}

impl BasicKind {
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Real | Self::Number)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateKind {
    Aggregate,
    Array,
    Bag,
    List,
    Set,
}
