use super::{Decl, ExprId, ScopeId, Status, TypeId};
use xpress_core::Symbol;

#[derive(Debug, Clone)]
pub struct Expr {
    /// Name for identifiers and calls, the operator or literal text otherwise.
    pub symbol: Symbol,
    pub kind: ExprKind,
    pub return_type: Option<TypeId>,
    pub status: Status,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Literal(Literal),
    Identifier {
        target: Option<Binding>,
    },
    /// Function call or entity constructor. The callee name is the symbol.
    Call {
        args: Vec<ExprId>,
        target: Option<ScopeId>,
    },
    /// `[a, b, c]`
    Aggregate(Vec<ExprId>),
    Op {
        op: Operator,
        operands: Vec<ExprId>,
    },
    /// `QUERY(var <* source | condition)`. The scope owns `var`.
    Query {
        scope: ScopeId,
        source: ExprId,
        condition: ExprId,
    },
    SelfRef,
    /// An item of an enumeration type.
    EnumItem {
        ty: TypeId,
    },
}

/// What an identifier was bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Decl(Decl),
    EnumItem(ExprId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer(i64),
    Real(f64),
    String(String),
    Binary(String),
    Boolean(bool),
    Logical(Logical),
    /// `?`
    Indeterminate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Logical {
    False,
    True,
    Unknown,
}

/// Operator codes. The discriminant indexes the resolver's operator table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Plus,
    Minus,
    Times,
    RealDiv,
    IntDiv,
    Mod,
    Exp,
    Negate,
    Identity,
    Not,
    And,
    Or,
    Xor,
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    InstEqual,
    InstNotEqual,
    In,
    Like,
    /// `a.b`
    Dot,
    /// `a\b`
    Group,
    /// `a[i]`
    Index,
    /// `a[i:j]`
    Subcomponent,
    /// `a || b`, complex entity instance construction.
    Concat,
}

impl Operator {
    pub const COUNT: usize = Operator::Concat as usize + 1;

    pub fn arity(self) -> usize {
        match self {
            Self::Negate | Self::Identity | Self::Not => 1,
            Self::Subcomponent => 3,
            _ => 2,
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            Self::Plus | Self::Identity => "+",
            Self::Minus | Self::Negate => "-",
            Self::Times => "*",
            Self::RealDiv => "/",
            Self::IntDiv => "DIV",
            Self::Mod => "MOD",
            Self::Exp => "**",
            Self::Not => "NOT",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Xor => "XOR",
            Self::Equal => "=",
            Self::NotEqual => "<>",
            Self::Less => "<",
            Self::Greater => ">",
            Self::LessEqual => "<=",
            Self::GreaterEqual => ">=",
            Self::InstEqual => ":=:",
            Self::InstNotEqual => ":<>:",
            Self::In => "IN",
            Self::Like => "LIKE",
            Self::Dot => ".",
            Self::Group => "\\",
            Self::Index => "[]",
            Self::Subcomponent => "[:]",
            Self::Concat => "||",
        }
    }
}
