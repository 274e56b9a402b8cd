//! Syntax tree for SMPL programs.
//!
//! Every node carries a [`Span`]. Literal nodes keep their raw source text;
//! turning that text into a runtime value is the evaluator's job, and the
//! [`NodeId`] on those nodes lets it memoize the result. List literals carry
//! an id too, since the evaluator reuses one list per node. Function bodies are
//! reference counted so closures can hold on to them after the tree that
//! produced them is gone.

use std::rc::Rc;

use crate::Span;

/// Identity of a syntax node that carries evaluator-side state.
///
/// Ids are unique within one parsed [`Program`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

// ══════════════════════════════════════════════════════════════════════════════
// Top Level
// ══════════════════════════════════════════════════════════════════════════════

/// A complete SMPL program: a sequence of statements run in the global scope.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

/// `{ stmts... }`
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

/// A spanned identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Statements
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `expr;`
    Expr(ExprStmt),
    /// `name = expr;`
    Assign(AssignStmt),
    /// `target.name = expr;`
    PropAssign(PropAssignStmt),
    /// `fn name(params) { body }`
    FnDef(FnDef),
    /// `if (cond) stmt [else stmt]`
    If(IfStmt),
    /// `while (cond) stmt`
    While(WhileStmt),
    /// `for (init; test; increment) stmt`
    For(ForStmt),
    /// `break;`
    Break(Span),
    /// `continue;`
    Continue(Span),
    /// `return [expr];`
    Return(ReturnStmt),
    /// `write expr;`
    Write(WriteStmt),
    /// `{ stmts... }`
    Block(Block),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Expr(s) => s.span,
            Stmt::Assign(s) => s.span,
            Stmt::PropAssign(s) => s.span,
            Stmt::FnDef(s) => s.span,
            Stmt::If(s) => s.span,
            Stmt::While(s) => s.span,
            Stmt::For(s) => s.span,
            Stmt::Break(span) | Stmt::Continue(span) => *span,
            Stmt::Return(s) => s.span,
            Stmt::Write(s) => s.span,
            Stmt::Block(b) => b.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprStmt {
    pub expr: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignStmt {
    pub name: Ident,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropAssignStmt {
    pub target: Expr,
    pub property: Ident,
    pub value: Expr,
    pub span: Span,
}

/// Parameters and body of a function, shared by every closure built from it.
#[derive(Debug, Clone, PartialEq)]
pub struct FnDecl {
    pub params: Vec<String>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FnDef {
    pub id: NodeId,
    pub name: Ident,
    pub decl: Rc<FnDecl>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_branch: Box<Stmt>,
    pub else_branch: Option<Box<Stmt>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Box<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub init: Box<Stmt>,
    pub test: Expr,
    pub increment: Box<Stmt>,
    pub body: Box<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WriteStmt {
    pub value: Expr,
    pub span: Span,
}

// ══════════════════════════════════════════════════════════════════════════════
// Expressions
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    // ── Literals ──────────────────────────────────────────────────
    /// Integer literal, raw text such as `42`, `0x2A` or `0o60`.
    Int { id: NodeId, raw: String },
    /// Float literal, raw text such as `1.5` or `2e10`.
    Float { id: NodeId, raw: String },
    /// String literal, raw text including the surrounding quotes.
    Str { id: NodeId, raw: String },
    Bool(bool),
    Null,
    /// `[a, b, c]`. Each node owns one list that is refilled on every
    /// evaluation.
    List { id: NodeId, items: Vec<Expr> },
    /// `new { name: value, ... }`
    New(Vec<NewProp>),

    // ── Names & access ────────────────────────────────────────────
    Identifier(String),
    /// `target.name`
    Property { target: Box<Expr>, name: Ident },
    /// `callee(args)`
    Call { callee: Box<Expr>, args: Vec<Expr> },
    /// `fn (params) { body }`
    Lambda { decl: Rc<FnDecl> },

    // ── Operators ─────────────────────────────────────────────────
    Binary {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
    },
    Unary { op: UnaryOp, operand: Box<Expr> },
    /// `and` / `or`, evaluated lazily.
    Logical {
        left: Box<Expr>,
        op: LogicalOp,
        right: Box<Expr>,
    },
    /// `left ? right`
    NullCoalesce { left: Box<Expr>, right: Box<Expr> },
}

/// One `name: value` member of an object literal.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProp {
    pub name: Ident,
    pub value: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    NotEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
            BinOp::Eq => "==",
            BinOp::NotEq => "!=",
            BinOp::Less => "<",
            BinOp::LessEq => "<=",
            BinOp::Greater => ">",
            BinOp::GreaterEq => ">=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    Plus,
    Minus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOp {
    And,
    Or,
}
