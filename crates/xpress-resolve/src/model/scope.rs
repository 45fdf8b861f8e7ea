use indexmap::IndexMap;
use xpress_core::{Name, Symbol};

use super::{ExprId, RenameId, ScopeId, StmtId, TypeId, VarId};

/// Resolution state of a node.
///
/// Re-entering a node that is `InProgress` is how cycles are detected.
/// Nodes that are `Resolved` or `Failed` are never walked again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Unresolved,
    InProgress,
    Resolved,
    Failed,
}

impl Status {
    pub fn is_failed(self) -> bool {
        self == Status::Failed
    }

    pub fn is_resolved(self) -> bool {
        self == Status::Resolved
    }

    pub fn is_done(self) -> bool {
        matches!(self, Status::Resolved | Status::Failed)
    }
}

/// What a dictionary entry points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decl {
    Scope(ScopeId),
    Type(TypeId),
    Var(VarId),
    /// An imported name. Only present once the rename is resolved.
    Rename(RenameId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Variable,
    Type,
    Entity,
    Function,
    Procedure,
    Rule,
    Schema,
}

impl DeclKind {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Variable => "variable",
            Self::Type => "type",
            Self::Entity => "entity",
            Self::Function => "function",
            Self::Procedure => "procedure",
            Self::Rule => "rule",
            Self::Schema => "schema",
        }
    }
}

/// Lookup mask over declaration kinds.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct KindSet(u16);

impl KindSet {
    pub const EMPTY: Self = Self(0);
    pub const VARIABLE: Self = Self::single(DeclKind::Variable);
    pub const TYPE: Self = Self::single(DeclKind::Type);
    pub const ENTITY: Self = Self::single(DeclKind::Entity);
    pub const FUNCTION: Self = Self::single(DeclKind::Function);
    pub const PROCEDURE: Self = Self::single(DeclKind::Procedure);
    pub const RULE: Self = Self::single(DeclKind::Rule);
    pub const SCHEMA: Self = Self::single(DeclKind::Schema);
    pub const ANY: Self = Self(0x7f);

    #[inline]
    pub const fn single(kind: DeclKind) -> Self {
        Self(1 << kind as u16)
    }

    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[inline]
    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    #[inline]
    pub const fn contains(self, kind: DeclKind) -> bool {
        self.0 & (1 << kind as u16) != 0
    }
}

impl std::fmt::Debug for KindSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const KINDS: [DeclKind; 7] = [
            DeclKind::Variable,
            DeclKind::Type,
            DeclKind::Entity,
            DeclKind::Function,
            DeclKind::Procedure,
            DeclKind::Rule,
            DeclKind::Schema,
        ];
        f.debug_set()
            .entries(KINDS.iter().filter(|k| self.contains(**k)))
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Scope {
    pub symbol: Symbol,
    pub parent: Option<ScopeId>,
    pub dict: IndexMap<Name, Decl>,
    /// Enumeration items declared here. Only reachable through the
    /// enumeration walk, never through ordinary lookup.
    pub enum_tags: IndexMap<Name, ExprId>,
    pub status: Status,
    pub search_id: u32,
    pub data: ScopeData,
}

#[derive(Debug, Clone)]
pub enum ScopeData {
    Express,
    Schema(SchemaData),
    Entity(EntityData),
    Function(Algorithm),
    Procedure(Algorithm),
    Rule(RuleData),
    Query { var: VarId },
    Increment(Increment),
    Alias { var: VarId },
}

impl Scope {
    /// Kind used for lookup masks. Block scopes are never dictionary
    /// entries and have none.
    pub fn kind(&self) -> Option<DeclKind> {
        match self.data {
            ScopeData::Schema(_) => Some(DeclKind::Schema),
            ScopeData::Entity(_) => Some(DeclKind::Entity),
            ScopeData::Function(_) => Some(DeclKind::Function),
            ScopeData::Procedure(_) => Some(DeclKind::Procedure),
            ScopeData::Rule(_) => Some(DeclKind::Rule),
            ScopeData::Express
            | ScopeData::Query { .. }
            | ScopeData::Increment(_)
            | ScopeData::Alias { .. } => None,
        }
    }

    pub fn is_schema(&self) -> bool {
        matches!(self.data, ScopeData::Schema(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    Use,
    Reference,
}

#[derive(Debug, Clone, Default)]
pub struct SchemaData {
    pub renames: Vec<RenameId>,
    /// Whole-schema imports, `USE FROM s;` and `REFERENCE FROM s;`.
    pub interfaces: Vec<Interface>,
}

#[derive(Debug, Clone)]
pub struct Interface {
    pub kind: ImportKind,
    pub schema: Symbol,
    pub target: Option<ScopeId>,
    pub status: Status,
}

#[derive(Debug, Clone)]
pub struct Rename {
    pub kind: ImportKind,
    /// Schema the name is imported from.
    pub schema: Symbol,
    pub old: Symbol,
    /// The alias, or `old` when there is none.
    pub new: Symbol,
    pub owner: ScopeId,
    pub status: Status,
    pub target: Option<Decl>,
}

#[derive(Debug, Clone)]
pub struct EntityData {
    /// The implicit type named by the entity.
    pub ty: TypeId,
    pub is_abstract: bool,
    pub supertype_symbols: Vec<Symbol>,
    pub supertypes: Vec<ScopeId>,
    pub subtype_expr: Option<SubtypeExpr>,
    /// Declared subtypes plus every entity that names this one as supertype.
    pub subtypes: Vec<ScopeId>,
    pub attributes: Vec<VarId>,
    pub unique: Vec<UniqueRule>,
    pub wheres: Vec<Where>,
    /// Number of inherited attributes, once computed.
    pub inheritance: Option<usize>,
}

/// `SUPERTYPE OF (...)` expression.
#[derive(Debug, Clone)]
pub enum SubtypeExpr {
    Ref {
        symbol: Symbol,
        target: Option<ScopeId>,
    },
    And(Box<SubtypeExpr>, Box<SubtypeExpr>),
    AndOr(Box<SubtypeExpr>, Box<SubtypeExpr>),
    OneOf(Vec<SubtypeExpr>),
}

#[derive(Debug, Clone)]
pub struct UniqueRule {
    pub label: Symbol,
    pub attrs: Vec<QualifiedAttr>,
}

/// `attr` or `SELF\supertype.attr` inside a UNIQUE clause.
#[derive(Debug, Clone)]
pub struct QualifiedAttr {
    pub entity: Option<Symbol>,
    pub attribute: Symbol,
    pub target: Option<VarId>,
}

#[derive(Debug, Clone)]
pub struct Where {
    pub label: Symbol,
    pub expr: ExprId,
    pub status: Status,
}

/// Function or procedure.
#[derive(Debug, Clone, Default)]
pub struct Algorithm {
    pub params: Vec<VarId>,
    /// Functions only.
    pub return_type: Option<TypeId>,
    pub body: Vec<StmtId>,
}

#[derive(Debug, Clone, Default)]
pub struct RuleData {
    pub body: Vec<StmtId>,
    pub wheres: Vec<Where>,
}

/// Control of `REPEAT var := start TO end BY step`.
#[derive(Debug, Clone)]
pub struct Increment {
    pub var: VarId,
    pub start: ExprId,
    pub end: ExprId,
    pub step: Option<ExprId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VarFlags {
    pub optional: bool,
    pub unique: bool,
    /// Set by the parser on variables that stand for an attribute of SELF.
    pub attribute: bool,
    pub parameter: bool,
    pub constant: bool,
}

#[derive(Debug, Clone)]
pub struct Variable {
    pub name: Symbol,
    pub owner: ScopeId,
    pub ty: TypeId,
    pub initializer: Option<ExprId>,
    pub flags: VarFlags,
    pub inverse: Option<Inverse>,
    /// Supertype named by `SELF\supertype.attr : ...` redeclarations.
    pub redeclares: Option<Symbol>,
    pub status: Status,
}

#[derive(Debug, Clone)]
pub struct Inverse {
    pub attribute: Symbol,
    pub target: Option<VarId>,
}
