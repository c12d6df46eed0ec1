use super::Stmt;

/// A part of a string template: either a literal chunk or an embedded
/// expression. See spec.md §4.2/SPEC_FULL.md §G.1: `${...}` segments are
/// parsed into their own expressions and concatenated with the stringify
/// rule used by binary `+`.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplatePart {
    Lit(String),
    Expr(Box<Expr>),
}

/// Expression AST nodes (spec.md §3).
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Str(String),
    StringTemplate(Vec<TemplatePart>),
    Bool(bool),
    Null,
    Ident(String),
    Binary {
        op: String,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: String,
        operand: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Member {
        object: Box<Expr>,
        property: String,
    },
    SafeMember {
        object: Box<Expr>,
        property: String,
    },
    Elvis {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Array(Vec<Expr>),
    Object(Vec<(String, Expr)>),
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    Function {
        params: Vec<String>,
        body: Vec<Stmt>,
    },
}
