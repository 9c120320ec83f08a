//! Post-parse processing.
//!
//! A structural walk over the freshly parsed tree, reserved for desugaring
//! rewrites. Earlier revisions folded member compound-assignments here; those
//! now live in the evaluator's assignment arm, so the walk is an identity
//! rebuild.

use crate::ast::Ast;

/// Process a parsed tree before evaluation.
#[must_use]
pub fn process(ast: Ast) -> Ast {
    let Ast {
        kind,
        children,
        value,
    } = ast;
    let children = children.into_iter().map(process).collect();
    Ast {
        kind,
        children,
        value,
    }
}
