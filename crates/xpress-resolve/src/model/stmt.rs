use super::{ExprId, ScopeId, StmtId};
use xpress_core::Symbol;

#[derive(Debug, Clone)]
pub struct Stmt {
    /// Keyword position, or the procedure name for calls.
    pub symbol: Symbol,
    pub kind: StmtKind,
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    /// `ALIAS v FOR expr; ... END_ALIAS;` The scope owns `v`.
    Alias {
        scope: ScopeId,
        body: Vec<StmtId>,
    },
    Assign {
        lhs: ExprId,
        rhs: ExprId,
    },
    Case {
        selector: ExprId,
        items: Vec<CaseItem>,
        otherwise: Option<StmtId>,
    },
    Compound(Vec<StmtId>),
    If {
        test: ExprId,
        then: Vec<StmtId>,
        otherwise: Vec<StmtId>,
    },
    ProcCall {
        args: Vec<ExprId>,
        target: Option<ScopeId>,
    },
    Loop {
        increment: Option<ScopeId>,
        while_expr: Option<ExprId>,
        until_expr: Option<ExprId>,
        body: Vec<StmtId>,
    },
    Return(Option<ExprId>),
    Skip,
    Escape,
}

#[derive(Debug, Clone)]
pub struct CaseItem {
    pub labels: Vec<ExprId>,
    pub action: StmtId,
}
