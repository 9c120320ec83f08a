//! # Teeny — a tiny expression-oriented scripting language
//!
//! Teeny is a small dynamically-typed scripting language with first-class
//! tables, closures, pattern matching, structured error values, string
//! interpolation and a pipe operator.
//!
//! The crate ships the whole pipeline: a lexer with interpolated strings and
//! regex literals, a Pratt expression parser, a tree-walking evaluator over a
//! tagged [`Value`] model, a lexical [`Env`] chain, and the standard global
//! environment (`math`, `fs`, `json`, `http`, `os`, `time`, `sql`, module
//! import, …). The `teeny` binary adds a file runner, an interactive REPL and
//! a package installer on top.
//!
//! # A Quick Example
//!
//! ```
//! use teeny::Engine;
//!
//! fn main() -> Result<(), teeny::ScriptError> {
//!     let engine = Engine::new();
//!
//!     let result = engine.eval("for i in 1 .. 3 { i * i }")?;
//!     assert_eq!(result.to_string(), "[1, 4, 9]");
//!
//!     Ok(())
//! }
//! ```
//!
//! Runtime failures are *values*, not host errors: every operator or builtin
//! that fails produces an `Error(type, value)` which short-circuits
//! evaluation until a `try … catch` converts it into an inert error value.

mod ast;
mod engine;
mod env;
mod error;
mod fn_call;
mod immutable_string;
mod matcher;
mod module;
pub mod packages;
mod parse;
mod processor;
mod token;
mod value;

/// The system smart string type, inlining short strings on the stack.
pub type SmartString = smartstring::SmartString<smartstring::LazyCompact>;

/// A reference-counted shared value.
pub type Shared<T> = std::rc::Rc<T>;

/// An inline-allocated vector sized for the common small cases (call
/// arguments, parameter lists).
pub(crate) type StaticVec<T> = smallvec::SmallVec<[T; 4]>;

/// An identifier in a script: a variable name, parameter name or string key.
pub type Identifier = ImmutableString;

pub use ast::{Ast, AstKind, AstPayload, MatchHead, ParamSpec};
pub use engine::Engine;
pub use env::{Env, EnvRef};
pub use error::ScriptError;
pub use fn_call::{FnCallArgs, NativeCallContext};
pub use immutable_string::ImmutableString;
pub use parse::parse;
pub use processor::process;
pub use token::{tokenize, Token, TokenKind};
pub use value::{Bubble, BubbleKind, Closure, ErrorValue, NativeFunction, Table, TableRef, Value};
