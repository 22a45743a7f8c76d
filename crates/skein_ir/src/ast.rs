//!
//!
use std::rc::Rc;

use skein_syntax::Span;

pub type Name = Rc<str>;

#[derive(Clone, Debug, PartialEq)]
/// A compiled top-level unit.
pub struct Program {
    pub body: Box<[Stmt]>,
    pub scope: ScopeInfo,
}

/// Declarations hoisted to the top of a function or program body.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScopeInfo {
    pub vars: Box<[Name]>,
    pub functions: Box<[Rc<FunctionNode>]>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FunctionNode {
    pub name: Option<Name>,
    pub params: Box<[Name]>,
    pub body: Box<[Stmt]>,
    pub scope: ScopeInfo,
    pub span: Span,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VarKind {
    Var,
    Let,
    Const,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VarDeclarator {
    pub name: Name,
    pub init: Option<Expr>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VarDecl {
    pub kind: VarKind,
    pub decls: Box<[VarDeclarator]>,
}

#[derive(Clone, Debug, PartialEq)]
///
pub enum Stmt {
    Expr(Expr),
    Var(VarDecl),
    /// Hoisted; evaluating the statement itself does nothing.
    Function(Rc<FunctionNode>),
    Return(Option<Expr>, Span),
    If(Box<IfStmt>),
    While(Box<WhileStmt>),
    DoWhile(Box<WhileStmt>),
    For(Box<ForStmt>),
    ForIn(Box<ForInStmt>),
    Break(Span),
    Continue(Span),
    Throw(Expr, Span),
    Try(Box<TryStmt>),
    Block(Box<[Stmt]>),
    Empty,
    Error(Span),
}

#[derive(Clone, Debug, PartialEq)]
pub struct IfStmt {
    pub cond: Expr,
    pub then_branch: Stmt,
    pub else_branch: Option<Stmt>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WhileStmt {
    pub cond: Expr,
    pub body: Stmt,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ForInit {
    Var(VarDecl),
    Expr(Expr),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ForStmt {
    pub init: Option<ForInit>,
    pub test: Option<Expr>,
    pub update: Option<Expr>,
    pub body: Stmt,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ForInStmt {
    pub decl: Option<VarKind>,
    pub name: Name,
    pub object: Expr,
    pub body: Stmt,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CatchClause {
    pub param: Option<Name>,
    pub body: Box<[Stmt]>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TryStmt {
    pub block: Box<[Stmt]>,
    pub catch: Option<CatchClause>,
    pub finally: Option<Box<[Stmt]>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Number(f64),
    Str(Name),
    Bool(bool),
    Null,
    Ident(Name),
    This,
    Array(Box<[Expr]>),
    Object(Box<[PropInit]>),
    Function(Rc<FunctionNode>),
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    Update {
        op: UpdateOp,
        prefix: bool,
        target: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Assign {
        op: AssignOp,
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Conditional {
        test: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    Member {
        object: Box<Expr>,
        property: Name,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Box<[Expr]>,
    },
    New {
        callee: Box<Expr>,
        args: Box<[Expr]>,
    },
    Sequence(Box<[Expr]>),
    Error,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PropInit {
    pub key: Name,
    pub value: Expr,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
    Plus,
    BitNot,
    Typeof,
    Void,
    Delete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateOp {
    Inc,
    Dec,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    UShr,
    Eq,
    Ne,
    StrictEq,
    StrictNe,
    Lt,
    Gt,
    Le,
    Ge,
    In,
    Instanceof,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignOp {
    Set,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    UShr,
}

impl AssignOp {
    /// The binary operator a compound assignment applies, `None` for plain `=`.
    pub fn binary(self) -> Option<BinaryOp> {
        Some(match self {
            AssignOp::Set => return None,
            AssignOp::Add => BinaryOp::Add,
            AssignOp::Sub => BinaryOp::Sub,
            AssignOp::Mul => BinaryOp::Mul,
            AssignOp::Div => BinaryOp::Div,
            AssignOp::Mod => BinaryOp::Mod,
            AssignOp::BitAnd => BinaryOp::BitAnd,
            AssignOp::BitOr => BinaryOp::BitOr,
            AssignOp::BitXor => BinaryOp::BitXor,
            AssignOp::Shl => BinaryOp::Shl,
            AssignOp::Shr => BinaryOp::Shr,
            AssignOp::UShr => BinaryOp::UShr,
        })
    }
}
