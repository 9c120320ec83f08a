//! Module implementing the pattern matcher behind `match`.
//!
//! Patterns are ordinary AST fragments, evaluated lazily against the
//! scrutinee: `_` matches anything, literals match by equality, a table
//! pattern matches a table whose entries are a superset of the pattern's,
//! and anything that evaluates to a callable is used as a predicate.
//! `||`, `&&` and `!` compose patterns logically.

use crate::ast::{Ast, AstKind};
use crate::fn_call::call_with;
use crate::{Engine, EnvRef, Value};

/// Try a pattern against a value. `Err` carries a propagating `Error` raised
/// while evaluating a pattern sub-expression.
pub(crate) fn match_pattern(
    engine: &Engine,
    pattern: &Ast,
    value: &Value,
    env: &EnvRef,
) -> Result<bool, Value> {
    match pattern.kind {
        AstKind::Name if pattern.op() == "_" => Ok(true),

        AstKind::Op if pattern.op() == "||" => {
            Ok(match_pattern(engine, &pattern.children[0], value, env)?
                || match_pattern(engine, &pattern.children[1], value, env)?)
        }
        AstKind::Op if pattern.op() == "&&" => {
            Ok(match_pattern(engine, &pattern.children[0], value, env)?
                && match_pattern(engine, &pattern.children[1], value, env)?)
        }
        AstKind::PreOp if pattern.op() == "!" => {
            Ok(!match_pattern(engine, &pattern.children[0], value, env)?)
        }

        AstKind::Table => match_table(engine, pattern, value, env),

        // Everything else evaluates: callables act as predicates, other
        // values as structural matchers.
        _ => {
            let evaluated = engine.eval_expr(pattern, env, None);
            if evaluated.is_error() {
                return Err(evaluated);
            }
            match &evaluated {
                Value::Underscore => Ok(true),
                Value::Closure(_) | Value::Native(_) => {
                    let verdict = call_with(engine, env, &evaluated, vec![value.clone()]);
                    if verdict.is_error() {
                        return Err(verdict);
                    }
                    Ok(verdict.truthy())
                }
                _ => Ok(evaluated.equals(value)),
            }
        }
    }
}

/// A table pattern matches a table containing at least the pattern's entries,
/// each matching recursively. Named pairs check their key, bare elements
/// check successive integer keys.
fn match_table(
    engine: &Engine,
    pattern: &Ast,
    value: &Value,
    env: &EnvRef,
) -> Result<bool, Value> {
    let Value::Table(table) = value else {
        return Ok(false);
    };

    let mut position = 0i64;
    for entry in &pattern.children {
        let (key, sub_pattern) = match entry.kind {
            AstKind::Pair => {
                let key_node = &entry.children[0];
                let key = match key_node.kind {
                    AstKind::Name => Value::string(key_node.op()),
                    _ => {
                        let key = engine.eval_expr(key_node, env, None);
                        if key.is_error() {
                            return Err(key);
                        }
                        key
                    }
                };
                (key, &entry.children[1])
            }
            _ => {
                let key = Value::Number(position as f64);
                position += 1;
                (key, entry)
            }
        };

        let Some(found) = table.borrow().raw_get(&key) else {
            return Ok(false);
        };
        if !match_pattern(engine, sub_pattern, &found, env)? {
            return Ok(false);
        }
    }
    Ok(true)
}
