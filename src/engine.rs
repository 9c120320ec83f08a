//! Module defining the [`Engine`] and the recursive evaluator.
//!
//! Evaluation is strict and left-to-right in every AST form. There is no
//! host-level exception flow for language errors: every arm checks each
//! sub-result for a propagating `Error` or a `Bubble` and returns it
//! unchanged — that check *is* the interpreter's calling convention.

use crate::ast::{Ast, AstKind, AstPayload};
use crate::env::Env;
use crate::fn_call::{call_with, eval_call};
use crate::matcher::match_pattern;
use crate::parse::parse;
use crate::processor::process;
use crate::token::tokenize;
use crate::value::{new_id, Bubble, BubbleKind, Closure, Table};
use crate::{EnvRef, ImmutableString, ScriptError, Shared, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;

/// The name a module binds its public value to.
pub const KEYWORD_EXPORT: &str = "export";
/// The receiver binding inside a closure body.
pub const KEYWORD_THIS: &str = "this";
/// Prefix of the binding a custom infix operator resolves to.
pub const CUSTOM_INFIX_PREFIX: &str = "infix_";

/// The Teeny evaluation engine.
///
/// The engine owns everything that outlives a single evaluation: the base
/// path for relative file access, the script arguments, and the module cache
/// keyed by absolute path. Global environments are created per run with
/// [`Engine::new_env`] and seeded by the [packages][crate::packages].
///
/// # Example
///
/// ```
/// use teeny::Engine;
///
/// let engine = Engine::new();
/// assert_eq!(engine.eval("1 + 2").unwrap().to_string(), "3");
/// ```
pub struct Engine {
    base_path: RefCell<PathBuf>,
    argv: RefCell<Vec<ImmutableString>>,
    pub(crate) modules: RefCell<HashMap<PathBuf, Value>>,
    global_lib_path: PathBuf,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Create an engine rooted at the current directory.
    #[must_use]
    pub fn new() -> Self {
        let home_lib = std::env::var_os("HOME")
            .map(PathBuf::from)
            .map(|home| home.join(".teeny").join("lib"))
            .unwrap_or_else(|| PathBuf::from("lib"));
        Self {
            base_path: RefCell::new(std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))),
            argv: RefCell::new(Vec::new()),
            modules: RefCell::new(HashMap::new()),
            global_lib_path: home_lib,
        }
    }

    /// Directory relative file access and module resolution start from —
    /// normally the directory of the running script.
    #[must_use]
    pub fn base_path(&self) -> PathBuf {
        self.base_path.borrow().clone()
    }

    pub fn set_base_path(&self, path: impl Into<PathBuf>) {
        *self.base_path.borrow_mut() = path.into();
    }

    /// The global package directory searched by `import`.
    #[must_use]
    pub fn global_lib_path(&self) -> &PathBuf {
        &self.global_lib_path
    }

    /// Script arguments exposed as the `argv` global.
    #[must_use]
    pub fn argv(&self) -> Vec<ImmutableString> {
        self.argv.borrow().clone()
    }

    pub fn set_argv(&self, argv: Vec<ImmutableString>) {
        *self.argv.borrow_mut() = argv;
    }

    /// A fresh global environment seeded with the standard globals.
    #[must_use]
    pub fn new_env(&self) -> EnvRef {
        crate::packages::seed_global(self)
    }

    /// Evaluate a source string in a fresh global environment and return the
    /// last value. Runtime `Error` values are returned in the `Ok` branch —
    /// they are language values, not host errors.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError`] for lexical and syntax errors.
    pub fn eval(&self, src: &str) -> Result<Value, ScriptError> {
        let env = self.new_env();
        self.eval_with_env(&env, src)
    }

    /// Evaluate a source string against a caller-owned environment (the REPL
    /// and module loading go through here).
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError`] for lexical and syntax errors.
    pub fn eval_with_env(&self, env: &EnvRef, src: &str) -> Result<Value, ScriptError> {
        let tokens = tokenize(src)?;
        let mut pos = 0;
        let mut last = Value::Nil;

        while pos < tokens.len() {
            // Trailing separators are not a statement.
            if tokens[pos].kind == crate::TokenKind::SemiColon {
                pos += 1;
                continue;
            }
            let (ast, next) = parse(&tokens, pos, 0)?;
            if next == pos {
                return Err(ScriptError::Syntax {
                    message: "parser made no progress".into(),
                    line: tokens[pos].line,
                    col: tokens[pos].col,
                });
            }
            pos = next;

            let result = self.eval_expr(&process(ast), env, None);
            match result {
                Value::Error(_) => return Ok(result),
                // A leftover bubble at the top level surfaces as its value.
                Value::Bubble(bubble) => last = bubble.value.clone(),
                _ => last = result,
            }
        }
        Ok(last)
    }

    /// Evaluate one already-parsed node.
    #[must_use]
    pub fn eval_ast(&self, ast: &Ast, env: &EnvRef) -> Value {
        self.eval_expr(ast, env, None)
    }

    /// The recursive evaluator. `pipe` carries a pending `|>` value into the
    /// right-hand side of a pipe until a call consumes it.
    pub(crate) fn eval_expr(&self, ast: &Ast, env: &EnvRef, pipe: Option<Value>) -> Value {
        match ast.kind {
            AstKind::Number => match &ast.value {
                AstPayload::Number(n) => Value::Number(*n),
                _ => Value::Number(0.0),
            },
            AstKind::Str => self.eval_string(ast, env),
            AstKind::Regex => Value::Regex(ast.op().into()),
            AstKind::Name => match ast.op() {
                "nil" => Value::Nil,
                "_" => Value::Underscore,
                name => match env.borrow().read(name) {
                    Some(value) => value,
                    None => Value::runtime_error("read from non-existing variable"),
                },
            },
            AstKind::Table => self.eval_table(ast, env),
            AstKind::Fn | AstKind::FnDynamic => self.eval_fn(ast, env),
            AstKind::Call => eval_call(self, ast, env, pipe),
            AstKind::If => self.eval_if(ast, env),
            AstKind::While => self.eval_while(ast, env),
            AstKind::For => self.eval_for(ast, env),
            AstKind::Block => self.eval_block(ast, env),
            AstKind::Match => self.eval_match(ast, env),
            AstKind::Try => self.eval_try(ast, env),
            AstKind::Return => self.eval_jump(ast, env, BubbleKind::Return),
            AstKind::Break => self.eval_jump(ast, env, BubbleKind::Break),
            AstKind::Continue => self.eval_jump(ast, env, BubbleKind::Continue),
            AstKind::Op => self.eval_op(ast, env, pipe),
            AstKind::PreOp => self.eval_prefix(ast, env),
            AstKind::SufOp => self.eval_suffix(ast, env),
            AstKind::Pair | AstKind::Kwarg | AstKind::Opt | AstKind::Elif | AstKind::Else => {
                Value::runtime_error("misplaced expression form")
            }
        }
    }

    /// A `Str` node with a scalar payload is a literal; otherwise its
    /// children render in order and concatenate.
    fn eval_string(&self, ast: &Ast, env: &EnvRef) -> Value {
        if let AstPayload::Str(text) = &ast.value {
            return Value::Str(text.clone());
        }
        let mut out = String::new();
        for part in &ast.children {
            let value = self.eval_expr(part, env, None);
            if value.interrupts() {
                return value;
            }
            out.push_str(&value.to_string());
        }
        Value::string(out)
    }

    fn eval_table(&self, ast: &Ast, env: &EnvRef) -> Value {
        let mut table = Table::new();
        for child in &ast.children {
            match child.kind {
                AstKind::Pair => {
                    let key = match child.children[0].kind {
                        AstKind::Name => Value::string(child.children[0].op()),
                        _ => {
                            let key = self.eval_expr(&child.children[0], env, None);
                            if key.interrupts() {
                                return key;
                            }
                            key
                        }
                    };
                    let value = self.eval_expr(&child.children[1], env, None);
                    if value.interrupts() {
                        return value;
                    }
                    table.define(key, value);
                }
                AstKind::PreOp if child.op() == "..." => {
                    let spread = self.eval_expr(&child.children[0], env, None);
                    if spread.interrupts() {
                        return spread;
                    }
                    let Value::Table(other) = spread else {
                        return Value::runtime_error("spread a non-Table value");
                    };
                    for (key, value) in other.borrow().iter() {
                        match key {
                            Value::Number(_) => table.append(value.clone()),
                            _ => table.define(key.clone(), value.clone()),
                        }
                    }
                }
                _ => {
                    let value = self.eval_expr(child, env, None);
                    if value.interrupts() {
                        return value;
                    }
                    table.append(value);
                }
            }
        }
        Value::Table(Shared::new(RefCell::new(table)))
    }

    /// Closure construction. Defaults are evaluated eagerly here; plain
    /// closures keep the live defining chain while `@`-dynamic ones take a
    /// snapshot, so later writes in the defining scope stay invisible to
    /// them.
    fn eval_fn(&self, ast: &Ast, env: &EnvRef) -> Value {
        let AstPayload::Params(params) = &ast.value else {
            return Value::runtime_error("malformed function literal");
        };

        let mut defaults = Vec::new();
        for param in params {
            if let Some(default) = &param.default {
                let value = self.eval_expr(default, env, None);
                if value.interrupts() {
                    return value;
                }
                defaults.push((param.name.clone(), value));
            }
        }

        let is_dynamic = ast.kind == AstKind::FnDynamic;
        let captured = if is_dynamic {
            Env::snapshot(env)
        } else {
            env.clone()
        };

        Value::Closure(Shared::new(Closure {
            params: params.clone(),
            defaults,
            body: Shared::new(ast.children.clone()),
            env: captured,
            is_dynamic,
            id: new_id(),
        }))
    }

    fn eval_if(&self, ast: &Ast, env: &EnvRef) -> Value {
        let guard = self.eval_expr(&ast.children[0], env, None);
        if guard.interrupts() {
            return guard;
        }
        if guard.truthy() {
            return self.eval_expr(&ast.children[1], env, None);
        }
        for branch in &ast.children[2..] {
            match branch.kind {
                AstKind::Elif => {
                    let guard = self.eval_expr(&branch.children[0], env, None);
                    if guard.interrupts() {
                        return guard;
                    }
                    if guard.truthy() {
                        return self.eval_expr(&branch.children[1], env, None);
                    }
                }
                AstKind::Else => return self.eval_expr(&branch.children[0], env, None),
                _ => (),
            }
        }
        Value::Nil
    }

    fn eval_while(&self, ast: &Ast, env: &EnvRef) -> Value {
        let mut last = Value::Nil;
        loop {
            let guard = self.eval_expr(&ast.children[0], env, None);
            if guard.interrupts() {
                return guard;
            }
            if !guard.truthy() {
                break;
            }
            let result = self.eval_expr(&ast.children[1], env, None);
            match result {
                Value::Error(_) => return result,
                Value::Bubble(bubble) => match bubble.kind {
                    BubbleKind::Break => {
                        last = bubble.value.clone();
                        break;
                    }
                    BubbleKind::Continue => last = bubble.value.clone(),
                    BubbleKind::Return => return Value::Bubble(bubble),
                },
                _ => last = result,
            }
        }
        last
    }

    /// `for binder in iterable body` — drives the table's `_iter_` protocol:
    /// calling `_iter_` yields a zero-argument function producing successive
    /// keys until nil; each key's value is bound in a fresh scope and the
    /// body results collect into the loop's result table.
    fn eval_for(&self, ast: &Ast, env: &EnvRef) -> Value {
        let iterable = self.eval_expr(&ast.children[1], env, None);
        if iterable.interrupts() {
            return iterable;
        }
        if !matches!(iterable, Value::Table(_)) {
            return Value::runtime_error("iterate non-Table");
        }

        let iter_fn = iterable.get_member(&Value::string("_iter_"));
        if !iter_fn.is_callable() {
            return Value::runtime_error("iterate non-Table");
        }
        let iterator = call_with(self, env, &iter_fn, vec![]);
        if iterator.is_error() {
            return iterator;
        }
        if !iterator.is_callable() {
            return Value::runtime_error("iterate non-Table");
        }

        let mut results = Table::new();
        loop {
            let key = call_with(self, env, &iterator, vec![]);
            if key.is_error() {
                return key;
            }
            if matches!(key, Value::Nil) {
                break;
            }
            let item = iterable.get_member(&key);

            let loop_env = Env::with_outer(env.clone());
            let bound = self.assign_variable(&ast.children[0], item, &loop_env, true);
            if bound.is_error() {
                return bound;
            }

            let result = self.eval_expr(&ast.children[2], &loop_env, None);
            match result {
                Value::Error(_) => return result,
                Value::Bubble(bubble) => match bubble.kind {
                    BubbleKind::Break => {
                        results.append(bubble.value.clone());
                        break;
                    }
                    BubbleKind::Continue => results.append(bubble.value.clone()),
                    BubbleKind::Return => return Value::Bubble(bubble),
                },
                _ => results.append(result),
            }
        }
        Value::Table(Shared::new(RefCell::new(results)))
    }

    fn eval_block(&self, ast: &Ast, env: &EnvRef) -> Value {
        let block_env = Env::with_outer(env.clone());
        let mut last = Value::Nil;
        for child in &ast.children {
            let result = self.eval_expr(child, &block_env, None);
            if result.interrupts() {
                return result;
            }
            last = result;
        }
        last
    }

    fn eval_match(&self, ast: &Ast, env: &EnvRef) -> Value {
        let AstPayload::Match(head) = &ast.value else {
            return Value::runtime_error("malformed match expression");
        };
        let scrutinee = self.eval_expr(&head.scrutinee, env, None);
        if scrutinee.interrupts() {
            return scrutinee;
        }

        let match_env = Env::with_outer(env.clone());
        if let Some(binder) = &head.binder {
            match_env.borrow_mut().define(binder.clone(), scrutinee.clone());
        }

        for arm in &ast.children {
            match match_pattern(self, &arm.children[0], &scrutinee, &match_env) {
                Err(error) => return error,
                Ok(true) => return self.eval_expr(&arm.children[1], &match_env, None),
                Ok(false) => (),
            }
        }
        Value::Nil
    }

    /// `try e catch h` — converts a propagating `Error` from `e` into an
    /// inert `ValError` and hands it to the handler.
    fn eval_try(&self, ast: &Ast, env: &EnvRef) -> Value {
        let result = self.eval_expr(&ast.children[0], env, None);
        let Value::Error(error) = result else {
            return result;
        };

        let handler = self.eval_expr(&ast.children[1], env, None);
        if handler.interrupts() {
            return handler;
        }
        if !handler.is_callable() {
            return Value::runtime_error("uncallable catch expression");
        }
        call_with(
            self,
            env,
            &handler,
            vec![Value::val_error(error.typ.clone(), error.value.clone())],
        )
    }

    fn eval_jump(&self, ast: &Ast, env: &EnvRef, kind: BubbleKind) -> Value {
        let value = match ast.children.first() {
            Some(child) => {
                let value = self.eval_expr(child, env, None);
                if value.interrupts() {
                    return value;
                }
                value
            }
            None => Value::Nil,
        };
        Value::Bubble(Shared::new(Bubble { kind, value }))
    }

    fn eval_op(&self, ast: &Ast, env: &EnvRef, pipe: Option<Value>) -> Value {
        let op = ast.op().to_string();
        match op.as_str() {
            ":=" => self.eval_assignment(&ast.children[0], &ast.children[1], env, true),
            "=" => self.eval_assignment(&ast.children[0], &ast.children[1], env, false),
            "?=" => self.eval_soft_assignment(&ast.children[0], &ast.children[1], env),
            "+=" | "-=" | "*=" | "/=" | "%=" => {
                self.eval_compound_assignment(&op[..1], &ast.children[0], &ast.children[1], env)
            }
            "|>" => self.eval_pipe(&ast.children[0], &ast.children[1], env),
            "&&" => {
                let lhs = self.eval_expr(&ast.children[0], env, None);
                if lhs.interrupts() {
                    return lhs;
                }
                if !lhs.truthy() {
                    return Value::Number(0.0);
                }
                let rhs = self.eval_expr(&ast.children[1], env, None);
                if rhs.interrupts() {
                    return rhs;
                }
                Value::Number(if rhs.truthy() { 1.0 } else { 0.0 })
            }
            "||" => {
                let lhs = self.eval_expr(&ast.children[0], env, None);
                if lhs.interrupts() {
                    return lhs;
                }
                if lhs.truthy() {
                    return Value::Number(1.0);
                }
                let rhs = self.eval_expr(&ast.children[1], env, None);
                if rhs.interrupts() {
                    return rhs;
                }
                Value::Number(if rhs.truthy() { 1.0 } else { 0.0 })
            }
            "??" => {
                let lhs = self.eval_expr(&ast.children[0], env, None);
                if lhs.interrupts() {
                    return lhs;
                }
                if matches!(lhs, Value::Nil) {
                    self.eval_expr(&ast.children[1], env, None)
                } else {
                    lhs
                }
            }
            "?:" => {
                let lhs = self.eval_expr(&ast.children[0], env, None);
                if lhs.interrupts() {
                    return lhs;
                }
                if lhs.truthy() {
                    lhs
                } else {
                    self.eval_expr(&ast.children[1], env, None)
                }
            }
            "." => {
                let lhs = self.eval_expr(&ast.children[0], env, None);
                if lhs.interrupts() {
                    return lhs;
                }
                match ast.children[1].kind {
                    AstKind::Name | AstKind::Str => {
                        lhs.get_member(&Value::string(ast.children[1].op()))
                    }
                    _ => Value::runtime_error("invalid member access"),
                }
            }
            "[]" => {
                let lhs = self.eval_expr(&ast.children[0], env, None);
                if lhs.interrupts() {
                    return lhs;
                }
                let index = self.eval_expr(&ast.children[1], env, None);
                if index.interrupts() {
                    return index;
                }
                lhs.get_member(&index)
            }
            "+" | "-" | "*" | "/" | "%" | ".." | "==" | "!=" | ">" | ">=" | "<" | "<=" | "=~" => {
                let lhs = self.eval_expr(&ast.children[0], env, None);
                if lhs.interrupts() {
                    return lhs;
                }
                let rhs = self.eval_expr(&ast.children[1], env, None);
                if rhs.interrupts() {
                    return rhs;
                }
                binary_op(&op, &lhs, &rhs)
            }
            // A custom infix operator resolves `infix_<name>` at the call
            // site and applies it to both operands.
            name => {
                let lhs = self.eval_expr(&ast.children[0], env, None);
                if lhs.interrupts() {
                    return lhs;
                }
                let rhs = self.eval_expr(&ast.children[1], env, None);
                if rhs.interrupts() {
                    return rhs;
                }
                let target = format!("{}{}", CUSTOM_INFIX_PREFIX, name);
                match env.borrow().read(&target) {
                    Some(f) if f.is_callable() => call_with(self, env, &f, vec![lhs, rhs]),
                    Some(_) => Value::runtime_error("call a non-Closure value"),
                    None => Value::runtime_error("read from non-existing variable"),
                }
            }
        }
    }

    fn eval_pipe(&self, lhs: &Ast, rhs: &Ast, env: &EnvRef) -> Value {
        let piped = self.eval_expr(lhs, env, None);
        if piped.interrupts() {
            return piped;
        }
        if rhs.kind == AstKind::Call {
            return self.eval_expr(rhs, env, Some(piped));
        }
        // `x |> f` pipes into a bare callable.
        let callee = self.eval_expr(rhs, env, None);
        if callee.interrupts() {
            return callee;
        }
        if callee.is_callable() {
            call_with(self, env, &callee, vec![piped])
        } else {
            Value::runtime_error("pipe into a non-Closure value")
        }
    }

    fn eval_assignment(&self, lhs: &Ast, rhs: &Ast, env: &EnvRef, declare: bool) -> Value {
        let value = self.eval_expr(rhs, env, None);
        if value.interrupts() {
            return value;
        }
        let outcome = self.assign_variable(lhs, value.clone(), env, declare);
        if outcome.is_error() {
            return outcome;
        }
        value
    }

    /// `?=` — assign only when the current value is nil or missing.
    fn eval_soft_assignment(&self, lhs: &Ast, rhs: &Ast, env: &EnvRef) -> Value {
        let current = self.eval_expr(lhs, env, None);
        let vacant = matches!(current, Value::Nil | Value::Error(_));
        if !vacant {
            return current;
        }
        let value = self.eval_expr(rhs, env, None);
        if value.interrupts() {
            return value;
        }
        let outcome = self.assign_variable(lhs, value.clone(), env, false);
        if outcome.is_error() {
            let outcome = self.assign_variable(lhs, value.clone(), env, true);
            if outcome.is_error() {
                return outcome;
            }
        }
        value
    }

    fn eval_compound_assignment(&self, op: &str, lhs: &Ast, rhs: &Ast, env: &EnvRef) -> Value {
        let current = self.eval_expr(lhs, env, None);
        if current.interrupts() {
            return current;
        }
        let operand = self.eval_expr(rhs, env, None);
        if operand.interrupts() {
            return operand;
        }
        let combined = binary_op(op, &current, &operand);
        if combined.interrupts() {
            return combined;
        }
        let outcome = self.assign_variable(lhs, combined.clone(), env, false);
        if outcome.is_error() {
            return outcome;
        }
        combined
    }

    /// Bind a value to an assignment target: a name, a member access, or a
    /// table pattern (named keys first, remaining children positionally).
    /// Returns `Nil` on success or a propagating `Error`.
    pub(crate) fn assign_variable(
        &self,
        lhs: &Ast,
        value: Value,
        env: &EnvRef,
        declare: bool,
    ) -> Value {
        match lhs.kind {
            AstKind::Name => {
                if declare {
                    env.borrow_mut().define(lhs.op(), value);
                } else if !env.borrow_mut().write(lhs.op(), value) {
                    return Value::runtime_error("assign to non-existing variable");
                }
                Value::Nil
            }
            AstKind::Op if lhs.op() == "." => {
                let key = match lhs.children[1].kind {
                    AstKind::Name | AstKind::Str => Value::string(lhs.children[1].op()),
                    _ => return Value::runtime_error("invalid member access"),
                };
                self.assign_member(&lhs.children[0], key, value, env, declare)
            }
            AstKind::Op if lhs.op() == "[]" => {
                let key = self.eval_expr(&lhs.children[1], env, None);
                if key.interrupts() {
                    return key;
                }
                self.assign_member(&lhs.children[0], key, value, env, declare)
            }
            AstKind::Table => {
                let mut position = 0i64;
                for child in &lhs.children {
                    let outcome = match child.kind {
                        AstKind::Pair => {
                            let key = Value::string(child.children[0].op());
                            self.assign_variable(
                                &child.children[1],
                                value.get_member(&key),
                                env,
                                declare,
                            )
                        }
                        AstKind::Name
                            if !matches!(
                                value.get_member(&Value::string(child.op())),
                                Value::Nil
                            ) =>
                        {
                            let named = value.get_member(&Value::string(child.op()));
                            self.assign_variable(child, named, env, declare)
                        }
                        _ => {
                            let item = value.get_member(&Value::Number(position as f64));
                            position += 1;
                            self.assign_variable(child, item, env, declare)
                        }
                    };
                    if outcome.is_error() {
                        return outcome;
                    }
                }
                Value::Nil
            }
            _ => Value::runtime_error("invalid assignment target"),
        }
    }

    fn assign_member(
        &self,
        object: &Ast,
        key: Value,
        value: Value,
        env: &EnvRef,
        declare: bool,
    ) -> Value {
        let target = self.eval_expr(object, env, None);
        if target.interrupts() {
            return target;
        }
        match &target {
            Value::Table(table) => {
                if declare {
                    table.borrow_mut().define(key, value);
                } else if !table.borrow_mut().set(&key, value) {
                    return Value::runtime_error("setting non-existing property");
                }
                Value::Nil
            }
            // Strings are copy-on-write: an index write rebuilds the string
            // and stores it back through the variable, when there is one.
            Value::Str(s) if object.kind == AstKind::Name => {
                let (Value::Number(index), Value::Str(replacement)) = (&key, &value) else {
                    return Value::runtime_error("index string with non-Number");
                };
                let mut chars: Vec<char> = s.chars().collect();
                let at = *index as usize;
                if at >= chars.len() {
                    return Value::runtime_error("index string with non-Number");
                }
                let replacement: Vec<char> = replacement.chars().collect();
                chars.splice(at..at + 1, replacement);
                let rebuilt: ImmutableString = chars.into_iter().collect();
                if !env.borrow_mut().write(object.op(), Value::Str(rebuilt)) {
                    return Value::runtime_error("assign to non-existing variable");
                }
                Value::Nil
            }
            _ => Value::runtime_error("set a property on a non-Table value"),
        }
    }

    fn eval_prefix(&self, ast: &Ast, env: &EnvRef) -> Value {
        let operand = self.eval_expr(&ast.children[0], env, None);
        if operand.interrupts() {
            return operand;
        }
        match ast.op() {
            "+" => operand,
            "-" => match operand {
                Value::Number(n) => Value::Number(-n),
                _ => Value::runtime_error("calculate negative for non-Number"),
            },
            "!" => Value::Number(if operand.truthy() { 0.0 } else { 1.0 }),
            "..." => Value::runtime_error("spread outside a call or table"),
            _ => Value::runtime_error("unknown prefix operator"),
        }
    }

    fn eval_suffix(&self, ast: &Ast, env: &EnvRef) -> Value {
        let operand = self.eval_expr(&ast.children[0], env, None);
        if operand.interrupts() {
            return operand;
        }
        match ast.op() {
            "!" => match operand {
                Value::Number(n) if n >= 0.0 => {
                    let mut product = 1.0;
                    let mut k = 2.0;
                    while k <= n.trunc() {
                        product *= k;
                        k += 1.0;
                    }
                    Value::Number(product)
                }
                _ => Value::runtime_error("calculate factorial for non-Number"),
            },
            _ => Value::runtime_error("unknown suffix operator"),
        }
    }
}

/// Pairwise dispatch for the binary operators on two already-evaluated
/// values.
pub(crate) fn binary_op(op: &str, lhs: &Value, rhs: &Value) -> Value {
    match op {
        "+" => match (lhs, rhs) {
            (Value::Number(a), Value::Number(b)) => Value::Number(a + b),
            (Value::Str(a), Value::Str(b)) => Value::Str(a.concat(b)),
            (Value::Table(a), Value::Table(b)) => add_tables(a, b),
            (Value::Number(_), _) => Value::runtime_error("add a non-Number to a Number"),
            (Value::Str(_), _) => Value::runtime_error("add a non-String to a String"),
            (Value::Table(_), _) => Value::runtime_error("add a non-Table to a Table"),
            _ => Value::runtime_error("add a non-Number to a Number"),
        },
        "-" => match (lhs, rhs) {
            (Value::Number(a), Value::Number(b)) => Value::Number(a - b),
            _ => Value::runtime_error("minus a non-Number from a Number"),
        },
        "*" => match (lhs, rhs) {
            (Value::Number(a), Value::Number(b)) => Value::Number(a * b),
            (Value::Str(a), Value::Number(b)) => {
                Value::string(a.repeat((*b).max(0.0) as usize))
            }
            _ => Value::runtime_error("multiply a non-Number with a Number"),
        },
        "/" => match (lhs, rhs) {
            (Value::Number(_), Value::Number(b)) if *b == 0.0 => {
                Value::runtime_error("divide by zero")
            }
            (Value::Number(a), Value::Number(b)) => Value::Number(a / b),
            _ => Value::runtime_error("divide a non-Number from a Number"),
        },
        "%" => match (lhs, rhs) {
            (Value::Number(_), Value::Number(b)) if *b == 0.0 => {
                Value::runtime_error("divide by zero")
            }
            // Remainder takes the sign of the divisor.
            (Value::Number(a), Value::Number(b)) => Value::Number(((a % b) + b) % b),
            _ => Value::runtime_error("mod a non-Number from a Number"),
        },
        ".." => match (lhs, rhs) {
            (Value::Number(a), Value::Number(b)) => {
                let (from, to) = (*a as i64, *b as i64);
                let mut range = Table::new();
                let mut at = from;
                while at <= to {
                    range.append(Value::Number(at as f64));
                    at += 1;
                }
                Value::Table(Shared::new(RefCell::new(range)))
            }
            _ => Value::runtime_error("build a range from non-Numbers"),
        },
        "==" => Value::Number(if lhs.equals(rhs) { 1.0 } else { 0.0 }),
        "!=" => Value::Number(if lhs.equals(rhs) { 0.0 } else { 1.0 }),
        ">" | ">=" | "<" | "<=" => compare(op, lhs, rhs),
        "=~" => regex_match(lhs, rhs),
        _ => Value::runtime_error("unknown operator"),
    }
}

fn compare(op: &str, lhs: &Value, rhs: &Value) -> Value {
    let ordering = match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
        (Value::Str(a), Value::Str(b)) => a.as_str().partial_cmp(b.as_str()),
        (Value::Number(_), _) => {
            return Value::runtime_error("compare between non-Number and Number")
        }
        (Value::Str(_), _) => {
            return Value::runtime_error("compare between non-String and String")
        }
        _ => return Value::runtime_error("compare between non-Number and Number"),
    };
    let Some(ordering) = ordering else {
        return Value::Number(0.0);
    };
    let holds = match op {
        ">" => ordering.is_gt(),
        ">=" => ordering.is_ge(),
        "<" => ordering.is_lt(),
        "<=" => ordering.is_le(),
        _ => false,
    };
    Value::Number(if holds { 1.0 } else { 0.0 })
}

/// `str =~ regex` — the pattern compiles lazily, on first use at the match
/// site.
fn regex_match(lhs: &Value, rhs: &Value) -> Value {
    let Value::Str(text) = lhs else {
        return Value::runtime_error("match a non-String against a regex");
    };
    let pattern = match rhs {
        Value::Regex(p) | Value::Str(p) => p,
        _ => return Value::runtime_error("match against a non-Regex value"),
    };
    match regex::Regex::new(pattern.as_str()) {
        Ok(compiled) => Value::Number(if compiled.is_match(text.as_str()) {
            1.0
        } else {
            0.0
        }),
        Err(error) => Value::error("Regex Error", error.to_string()),
    }
}

fn add_tables(a: &crate::TableRef, b: &crate::TableRef) -> Value {
    let mut merged = Table::new();
    for value in a.borrow().list_part() {
        merged.append(value);
    }
    for value in b.borrow().list_part() {
        merged.append(value);
    }
    for (key, value) in a.borrow().map_part() {
        merged.define(key, value);
    }
    for (key, value) in b.borrow().map_part() {
        merged.define(key, value);
    }
    Value::Table(Shared::new(RefCell::new(merged)))
}
