//! Errors produced while turning source text into an AST.
//!
//! Only the lexer and parser fail through host `Result`s. Once evaluation
//! starts, failures travel as `Error` *values* through the evaluator (see
//! [`Value::Error`][crate::Value]) so that scripts can intercept them with
//! `try … catch`.

use thiserror::Error;

/// A fatal error encountered before evaluation: an unknown character or an
/// unexpected token. Both abort the current script at the driver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    /// A character no lexer rule recognizes.
    #[error("Lexical Error at line {line}, column {col}:\n{message}")]
    Lexical {
        message: String,
        line: usize,
        col: usize,
    },

    /// An unexpected token, or a parser that made no progress.
    #[error("Syntax Error at line {line}, column {col}:\n{message}")]
    Syntax {
        message: String,
        line: usize,
        col: usize,
    },
}

impl ScriptError {
    /// Source line the error points at (1-based).
    #[must_use]
    pub fn line(&self) -> usize {
        match self {
            Self::Lexical { line, .. } | Self::Syntax { line, .. } => *line,
        }
    }

    /// Source column the error points at (1-based).
    #[must_use]
    pub fn col(&self) -> usize {
        match self {
            Self::Lexical { col, .. } | Self::Syntax { col, .. } => *col,
        }
    }
}
