use std::str::FromStr;

use xpress_core::Location;

use crate::Error;

/// Everything the resolver can complain about.
///
/// Grouped by the taxonomy the passes use: missing names, names of the
/// wrong kind, cycles, structural misuse, and soft mismatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticKind {
    // Name not found in any visible scope
    Undefined,
    UndefinedAttribute,
    UndefinedType,
    UndefinedSchema,
    UndefinedFunc,
    UndefinedObjectInSchema,
    UnknownSupertype,
    UnknownSubtype,
    UnknownAttrInEntity,
    NoSuchProcedure,
    GroupNoSuchEntity,
    DuplicateDeclaration,

    // Name found, but not of an acceptable kind
    SupertypeResolve,
    SubtypeResolve,
    NotAType,
    FuncallNotAFunction,
    ExpectedProc,
    UnexpectedReference,

    // Cycles
    CircularReference,
    SubsuperLoop,
    SelectLoop,

    // Structural misuse
    TypeIsEntity,
    QueryRequiresAggregate,
    SelfIsUnknown,
    InverseBadEntity,
    InverseBadAttribute,
    MissingSupertype,
    OverloadedAttribute,
    RedeclNoSuchAttribute,
    RedeclNoSuchSupertype,
    IndexingIllegal,

    // Soft mismatches, resolution continues with best-effort typing
    WrongArgCount,
    AmbiguousAttribute,
    AmbiguousGroup,
    MissingSelf,
    CaseSkipLabel,
    InvariantCondition,
}

impl DiagnosticKind {
    pub fn default_severity(&self) -> Severity {
        match self {
            Self::WrongArgCount
            | Self::AmbiguousAttribute
            | Self::AmbiguousGroup
            | Self::MissingSelf
            | Self::CaseSkipLabel
            | Self::InvariantCondition => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Message template. Each `{}` is filled by the next reported argument.
    pub fn template(&self) -> &'static str {
        match self {
            Self::Undefined => "reference to undefined object `{}`",
            Self::UndefinedAttribute => "reference to undefined attribute `{}`",
            Self::UndefinedType => "reference to undefined type `{}`",
            Self::UndefinedSchema => "reference to undefined schema `{}`",
            Self::UndefinedFunc => "function `{}` is not defined",
            Self::UndefinedObjectInSchema => "`{}` is not defined in schema `{}`",
            Self::UnknownSupertype => "unknown supertype `{}` for entity `{}`",
            Self::UnknownSubtype => "unknown subtype `{}` for entity `{}`",
            Self::UnknownAttrInEntity => "unknown attribute `{}` in entity `{}`",
            Self::NoSuchProcedure => "no such procedure as `{}`",
            Self::GroupNoSuchEntity => "`{}` is not a supertype of `{}`",
            Self::DuplicateDeclaration => "`{}` is already declared in this scope",

            Self::SupertypeResolve => "supertype `{}` is not an entity (line {})",
            Self::SubtypeResolve => "subtype `{}` resolves to a non-entity (line {})",
            Self::NotAType => "expected a type or entity, but `{}` is a {}",
            Self::FuncallNotAFunction => "call of `{}` which is not a function",
            Self::ExpectedProc => {
                "`{}` is used as a procedure call but is not defined as one (line {})"
            }
            Self::UnexpectedReference => "`{}` is a {} and cannot be used as a value",

            Self::CircularReference => "circularity: definition of `{}` references itself",
            Self::SubsuperLoop => "entity `{}` is a subtype of itself",
            Self::SelectLoop => "select type `{}` selects itself",

            Self::TypeIsEntity => "entity `{}` is not acceptable as an underlying type",
            Self::QueryRequiresAggregate => "query source must be an aggregate",
            Self::SelfIsUnknown => "SELF is not within an entity or type declaration",
            Self::InverseBadEntity => "inverse attribute `{}` does not refer to an entity",
            Self::InverseBadAttribute => "unknown attribute `{}` in entity `{}` in inverse",
            Self::MissingSupertype => {
                "entity `{}` missing from supertype list of subtype `{}`"
            }
            Self::OverloadedAttribute => "attribute `{}` already inherited via supertype `{}`",
            Self::RedeclNoSuchAttribute => {
                "redeclared attribute `{}` not declared in supertype `{}`"
            }
            Self::RedeclNoSuchSupertype => {
                "no such supertype `{}` for redeclaration of attribute `{}`"
            }
            Self::IndexingIllegal => "`{}` is not an aggregate, string or binary",

            Self::WrongArgCount => "call to `{}` uses {} arguments, but expected {}",
            Self::AmbiguousAttribute => "ambiguous attribute reference `{}`",
            Self::AmbiguousGroup => "ambiguous group reference `{}`",
            Self::MissingSelf => "domain rule `{}` must refer to SELF or an attribute",
            Self::CaseSkipLabel => "CASE label `{}` cannot be matched, ignoring its statements",
            Self::InvariantCondition => {
                "IF condition is always {}, ignoring the branch that is never taken"
            }
        }
    }

    /// Render the template, substituting `args` in order. Missing arguments
    /// render as `?`.
    pub fn message(&self, args: &[String]) -> String {
        let mut pieces = self.template().split("{}");
        let mut out = String::from(pieces.next().unwrap_or_default());
        let mut args = args.iter();
        for piece in pieces {
            out.push_str(args.next().map(String::as_str).unwrap_or("?"));
            out.push_str(piece);
        }
        out
    }

    #[inline]
    pub(crate) fn bit(self) -> u64 {
        1 << (self as u8)
    }
}

/// Named diagnostic classes a caller may switch off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningClass {
    CircularSubtype,
    CircularSelect,
    EntityAsType,
    InvariantCondition,
    InvalidCase,
}

impl WarningClass {
    pub const ALL: [WarningClass; 5] = [
        Self::CircularSubtype,
        Self::CircularSelect,
        Self::EntityAsType,
        Self::InvariantCondition,
        Self::InvalidCase,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::CircularSubtype => "circular_subtype",
            Self::CircularSelect => "circular_select",
            Self::EntityAsType => "entity_as_type",
            Self::InvariantCondition => "invariant_condition",
            Self::InvalidCase => "invalid_case",
        }
    }

    pub fn kind(&self) -> DiagnosticKind {
        match self {
            Self::CircularSubtype => DiagnosticKind::SubsuperLoop,
            Self::CircularSelect => DiagnosticKind::SelectLoop,
            Self::EntityAsType => DiagnosticKind::TypeIsEntity,
            Self::InvariantCondition => DiagnosticKind::InvariantCondition,
            Self::InvalidCase => DiagnosticKind::CaseSkipLabel,
        }
    }
}

impl FromStr for WarningClass {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|class| class.name() == s)
            .ok_or_else(|| Error::UnknownWarning(s.to_owned()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A secondary location attached to a diagnostic, such as one hop of a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedInfo {
    pub(crate) loc: Location,
    pub(crate) message: String,
}

impl RelatedInfo {
    pub fn new(loc: Location, message: impl Into<String>) -> Self {
        Self {
            loc,
            message: message.into(),
        }
    }

    pub fn location(&self) -> Location {
        self.loc
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub(crate) kind: DiagnosticKind,
    pub(crate) loc: Location,
    /// Format arguments, in template order.
    pub(crate) args: Vec<String>,
    pub(crate) related: Vec<RelatedInfo>,
}

impl DiagnosticMessage {
    pub(crate) fn new(kind: DiagnosticKind, loc: Location) -> Self {
        Self {
            kind,
            loc,
            args: Vec::new(),
            related: Vec::new(),
        }
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn location(&self) -> Location {
        self.loc
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn related(&self) -> &[RelatedInfo] {
        &self.related
    }

    pub fn severity(&self) -> Severity {
        self.kind.default_severity()
    }

    pub fn message(&self) -> String {
        self.kind.message(&self.args)
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity() == Severity::Warning
    }
}
