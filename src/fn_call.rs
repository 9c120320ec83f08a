//! Module implementing the call-site machinery.
//!
//! Argument gathering honors, in source order: `name = expr` keyword
//! arguments, `... expr` spreads (integer keys become positionals, string
//! keys become keywords), and `_` placeholders that consume a pending piped
//! value. A piped value nobody consumed is inserted at position 0.

use crate::ast::{Ast, AstKind};
use crate::engine::KEYWORD_THIS;
use crate::env::Env;
use crate::value::{Closure, Table, TableRef};
use crate::{Engine, EnvRef, Identifier, ImmutableString, Shared, StaticVec, Value};

/// Context handed to every native function: the engine (module cache, base
/// path, nested evaluation) and the environment of the call site.
#[derive(Clone, Copy)]
pub struct NativeCallContext<'a> {
    pub engine: &'a Engine,
    pub env: &'a EnvRef,
}

/// Gathered call arguments.
#[derive(Debug, Default)]
pub struct FnCallArgs {
    pub args: StaticVec<Value>,
    pub kwargs: StaticVec<(Identifier, Value)>,
}

impl FnCallArgs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_args(args: Vec<Value>) -> Self {
        Self {
            args: args.into(),
            kwargs: StaticVec::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.args.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Positional argument by index, `Nil` when absent.
    #[must_use]
    pub fn value(&self, index: usize) -> Value {
        self.args.get(index).cloned().unwrap_or(Value::Nil)
    }

    /// A keyword argument by name.
    #[must_use]
    pub fn kwarg(&self, name: &str) -> Option<Value> {
        self.kwargs
            .iter()
            .find(|(k, _)| k.as_str() == name)
            .map(|(_, v)| v.clone())
    }

    #[must_use]
    pub fn number(&self, index: usize) -> Option<f64> {
        self.args.get(index).and_then(Value::as_number)
    }

    /// A number that may be omitted (but not mistyped).
    #[must_use]
    pub fn number_or(&self, index: usize, default: f64) -> Option<f64> {
        match self.args.get(index) {
            None => Some(default),
            Some(v) => v.as_number(),
        }
    }

    #[must_use]
    pub fn string(&self, index: usize) -> Option<ImmutableString> {
        self.args.get(index).and_then(|v| v.as_str().cloned())
    }

    #[must_use]
    pub fn table(&self, index: usize) -> Option<TableRef> {
        self.args.get(index).and_then(|v| v.as_table().cloned())
    }
}

/// Evaluate a `Call` node.
pub(crate) fn eval_call(
    engine: &Engine,
    ast: &Ast,
    env: &EnvRef,
    mut pipe: Option<Value>,
) -> Value {
    let callee = engine.eval_expr(&ast.children[0], env, None);
    if callee.interrupts() {
        return callee;
    }

    let mut call_args = FnCallArgs::new();
    for arg in &ast.children[1..] {
        match arg.kind {
            AstKind::Kwarg => {
                let value = engine.eval_expr(&arg.children[0], env, None);
                if value.interrupts() {
                    return value;
                }
                call_args.kwargs.push((arg.op().into(), value));
            }
            AstKind::PreOp if arg.op() == "..." => {
                let spread = engine.eval_expr(&arg.children[0], env, None);
                if spread.interrupts() {
                    return spread;
                }
                let Value::Table(table) = spread else {
                    return Value::runtime_error("spread a non-Table value");
                };
                for (key, value) in table.borrow().iter() {
                    match key {
                        Value::Number(_) => call_args.args.push(value.clone()),
                        Value::Str(name) => call_args.kwargs.push((name.clone(), value.clone())),
                        _ => (),
                    }
                }
            }
            AstKind::Name if arg.op() == "_" && pipe.is_some() => {
                call_args.args.push(pipe.take().expect("pipe is some"));
            }
            _ => {
                let value = engine.eval_expr(arg, env, None);
                if value.interrupts() {
                    return value;
                }
                call_args.args.push(value);
            }
        }
    }

    // A piped value never consumed through `_` lands in front.
    if let Some(piped) = pipe.take() {
        call_args.args.insert(0, piped);
    }

    call_value(engine, env, &callee, call_args)
}

/// Call any callable value: script closure, native function, or a table with
/// a `_call_` member.
pub(crate) fn call_value(
    engine: &Engine,
    env: &EnvRef,
    callee: &Value,
    mut args: FnCallArgs,
) -> Value {
    match callee {
        Value::Closure(closure) => call_closure(engine, callee, closure, args),
        Value::Native(native) => native.call(NativeCallContext { engine, env }, &mut args),
        Value::Table(table) => {
            let target = table.borrow().raw_get(&Value::string("_call_"));
            match target {
                Some(f) if f.is_callable() => call_value(engine, env, &f, args),
                _ => Value::runtime_error("call a non-Closure value"),
            }
        }
        _ => Value::runtime_error("call a non-Closure value"),
    }
}

/// Invoke a script closure: fresh child environment, defaults first, then
/// positionals up to the declared arity, then keywords, then `this`.
fn call_closure(
    engine: &Engine,
    callee: &Value,
    closure: &Shared<Closure>,
    args: FnCallArgs,
) -> Value {
    let call_env = Env::with_outer(closure.env.clone());

    {
        let mut frame = call_env.borrow_mut();
        for (name, value) in &closure.defaults {
            frame.define(name.clone(), value.clone());
        }

        let mut at = 0;
        for param in &closure.params {
            if param.rest {
                let rest: Vec<Value> = args.args.get(at..).unwrap_or(&[]).to_vec();
                at = args.args.len();
                frame.define(param.name.clone(), Table::from_list(rest));
            } else if at < args.args.len() {
                frame.define(param.name.clone(), args.args[at].clone());
                at += 1;
            }
        }

        for (name, value) in &args.kwargs {
            frame.define(name.clone(), value.clone());
        }

        frame.define(KEYWORD_THIS, callee.clone());
    }

    let mut last = Value::Nil;
    for expr in closure.body.iter() {
        let result = engine.eval_expr(expr, &call_env, None);
        match result {
            Value::Error(_) => return result,
            Value::Bubble(ref bubble) if bubble.kind == crate::BubbleKind::Return => {
                return bubble.value.clone();
            }
            Value::Bubble(_) => return result,
            _ => last = result,
        }
    }
    last
}

/// Call a callable with plain positional arguments — the path used by
/// builtins that invoke user callbacks (`map`, `filter`, match predicates,
/// `benchmark.measure`, …).
pub(crate) fn call_with(engine: &Engine, env: &EnvRef, callee: &Value, args: Vec<Value>) -> Value {
    call_value(engine, env, callee, FnCallArgs::from_args(args))
}
