//! Module defining the untyped AST.
//!
//! Every node is a `{kind, children, value}` triple and is immutable after
//! parsing. The `value` payload carries whatever scalar the node kind needs:
//! an operator symbol, an identifier, a parsed number, a parameter list for
//! functions, or the scrutinee head for `match`.

use crate::{Identifier, ImmutableString};
use std::fmt;

/// The kind of an AST node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AstKind {
    Number,
    Str,
    Regex,
    Name,
    Table,
    Pair,
    Fn,
    FnDynamic,
    Call,
    Kwarg,
    If,
    Elif,
    Else,
    While,
    For,
    Block,
    Match,
    Opt,
    Try,
    Return,
    Break,
    Continue,
    Op,
    PreOp,
    SufOp,
}

/// One declared parameter of a function literal.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: Identifier,
    /// Default expression, evaluated eagerly at definition time.
    pub default: Option<Ast>,
    /// A rest parameter (`name...`) collecting surplus positional arguments.
    pub rest: bool,
}

/// The scrutinee head of a `match` expression: the matched expression plus
/// the optional `as` binder.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchHead {
    pub scrutinee: Ast,
    pub binder: Option<Identifier>,
}

/// The scalar payload of an AST node.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AstPayload {
    #[default]
    None,
    /// A parsed numeric literal.
    Number(f64),
    /// An operator symbol, identifier or string fragment.
    Str(ImmutableString),
    /// The parameter list of a `Fn`/`FnDynamic` node.
    Params(Vec<ParamSpec>),
    /// The scrutinee of a `Match` node.
    Match(Box<MatchHead>),
}

impl AstPayload {
    /// The payload as a string slice, if it is one.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// An AST node.
#[derive(Debug, Clone, PartialEq)]
pub struct Ast {
    pub kind: AstKind,
    pub children: Vec<Ast>,
    pub value: AstPayload,
}

impl Ast {
    #[inline]
    #[must_use]
    pub fn new(kind: AstKind, children: Vec<Ast>, value: AstPayload) -> Self {
        Self {
            kind,
            children,
            value,
        }
    }

    /// A node with no payload.
    #[inline]
    #[must_use]
    pub fn bare(kind: AstKind, children: Vec<Ast>) -> Self {
        Self::new(kind, children, AstPayload::None)
    }

    /// A node whose payload is a string (operator symbol or identifier).
    #[inline]
    #[must_use]
    pub fn with_str(kind: AstKind, children: Vec<Ast>, value: impl Into<ImmutableString>) -> Self {
        Self::new(kind, children, AstPayload::Str(value.into()))
    }

    /// The payload string of this node (operator symbol or identifier).
    #[inline]
    #[must_use]
    pub fn op(&self) -> &str {
        self.value.as_str().unwrap_or("")
    }

    fn render(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        for _ in 0..indent {
            f.write_str("    ")?;
        }
        write!(f, "{:?}", self.kind)?;
        match &self.value {
            AstPayload::None => (),
            AstPayload::Number(n) => write!(f, " {}", n)?,
            AstPayload::Str(s) => write!(f, " {}", s)?,
            AstPayload::Params(params) => {
                let names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
                write!(f, " [{}]", names.join(", "))?;
            }
            AstPayload::Match(head) => {
                write!(f, " <scrutinee>")?;
                if let Some(binder) = &head.binder {
                    write!(f, " as {}", binder)?;
                }
            }
        }
        writeln!(f)?;
        if let AstPayload::Match(head) = &self.value {
            head.scrutinee.render(f, indent + 1)?;
        }
        for child in &self.children {
            child.render(f, indent + 1)?;
        }
        Ok(())
    }
}

/// Renders the node as an indented tree, one node per line. This is what the
/// REPL's `:ast` directive prints.
impl fmt::Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, 0)
    }
}
