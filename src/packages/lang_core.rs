//! Core language builtins: I/O, conversions, the `error` constructor table,
//! module helpers and the `func` combinators.

use super::{native, table_of};
use crate::engine::KEYWORD_EXPORT;
use crate::env::Env;
use crate::fn_call::call_with;
use crate::module;
use crate::value::Table;
use crate::{Engine, Value};
use std::io::Write;

/// Seed the core globals into a fresh global frame.
pub(crate) fn register(engine: &Engine, frame: &mut Env) {
    frame.define("print", native(|_, args| print_values(&args.args, false)));
    frame.define("println", native(|_, args| print_values(&args.args, true)));
    frame.define(
        "input",
        native(|_, args| {
            if let Some(prompt) = args.args.first() {
                print!("{}", prompt);
                let _ = std::io::stdout().flush();
            }
            let mut line = String::new();
            match std::io::stdin().read_line(&mut line) {
                Ok(_) => {
                    while line.ends_with('\n') || line.ends_with('\r') {
                        line.pop();
                    }
                    Value::string(line)
                }
                Err(error) => Value::error("IOError", error.to_string()),
            }
        }),
    );

    frame.define(KEYWORD_EXPORT, Table::new_value());
    frame.define("argv", Table::from_list(engine.argv().into_iter().map(Value::Str)));

    frame.define(
        "import",
        native(|ctx, args| match args.string(0) {
            Some(name) => module::import(ctx.engine, &name),
            None => Value::runtime_error("import a non-String module name"),
        }),
    );
    frame.define(
        "importRaw",
        native(|ctx, args| match args.string(0) {
            Some(name) => module::import_raw(ctx.engine, &name),
            None => Value::runtime_error("import a non-String module name"),
        }),
    );
    // The original wrapped the host language's own module system here; this
    // runtime has none to wrap.
    frame.define(
        "importPython",
        native(|_, _| Value::error("Import Error", "python interop is not available")),
    );
    frame.define(
        "mix",
        native(|ctx, args| {
            let Some(table) = args.table(0) else {
                return Value::runtime_error("mix a non-Table value");
            };
            let mut frame = ctx.env.borrow_mut();
            for (key, value) in table.borrow().iter() {
                if let Value::Str(name) = key {
                    frame.define(name.clone(), value.clone());
                }
            }
            Value::Nil
        }),
    );
    frame.define(
        "include",
        native(|ctx, args| {
            let Some(name) = args.string(0) else {
                return Value::runtime_error("import a non-String module name");
            };
            let imported = module::import(ctx.engine, &name);
            if imported.is_error() {
                return imported;
            }
            let Value::Table(table) = &imported else {
                return imported;
            };
            let mut frame = ctx.env.borrow_mut();
            for (key, value) in table.borrow().iter() {
                if let Value::Str(name) = key {
                    frame.define(name.clone(), value.clone());
                }
            }
            Value::Nil
        }),
    );

    frame.define(
        "range",
        native(|_, args| {
            let (Some(from), Some(to)) = (args.number(0), args.number(1)) else {
                return Value::runtime_error("build a range from non-Numbers");
            };
            let Some(step) = args.number_or(2, 1.0) else {
                return Value::runtime_error("build a range from non-Numbers");
            };
            let (from, to, step) = (from as i64, to as i64, step as i64);
            if step == 0 {
                return Value::runtime_error("range step must not be zero");
            }
            let mut out = Vec::new();
            let mut at = from;
            while (step > 0 && at < to) || (step < 0 && at > to) {
                out.push(Value::Number(at as f64));
                at += step;
            }
            Table::from_list(out)
        }),
    );

    frame.define("error", error_table());

    frame.define(
        "type",
        native(|_, args| Value::string(args.value(0).type_name())),
    );
    frame.define("copy", native(|_, args| args.value(0).deep_copy()));
    frame.define(
        "string",
        native(|_, args| Value::string(args.value(0).to_string())),
    );
    frame.define("number", native(|_, args| args.value(0).to_number()));
    frame.define(
        "bool",
        native(|_, args| Value::Number(if args.value(0).truthy() { 1.0 } else { 0.0 })),
    );
    frame.define(
        "table",
        native(|_, args| {
            let mut table = Table::new();
            for (name, value) in &args.kwargs {
                table.define(Value::Str(name.clone()), value.clone());
            }
            for value in &args.args {
                table.append(value.clone());
            }
            Value::Table(crate::Shared::new(std::cell::RefCell::new(table)))
        }),
    );
    frame.define(
        "eval",
        native(|ctx, args| {
            let Some(source) = args.string(0) else {
                return Value::runtime_error("eval a non-String value");
            };
            match ctx.engine.eval(&source) {
                Ok(value) => value,
                Err(error @ crate::ScriptError::Lexical { .. }) => {
                    Value::error("Lexical Error", error.to_string())
                }
                Err(error) => Value::error("Syntax Error", error.to_string()),
            }
        }),
    );

    frame.define(
        "func",
        table_of([(
            "compose",
            native(|_, args| {
                let fns: Vec<Value> = args.args.to_vec();
                if fns.iter().any(|f| !f.is_callable()) {
                    return Value::runtime_error("compose a non-Closure value");
                }
                native(move |ctx, inner| {
                    let mut current: Vec<Value> = inner.args.to_vec();
                    let mut result = Value::Nil;
                    for f in fns.iter().rev() {
                        result = call_with(ctx.engine, ctx.env, f, current);
                        if result.is_error() {
                            return result;
                        }
                        current = vec![result.clone()];
                    }
                    result
                })
            }),
        )]),
    );
}

/// The `error` global: calling it builds an inert `ValError`; `raise` builds
/// a propagating `Error`; `panic` promotes a caught error back into a
/// propagating one.
fn error_table() -> Value {
    table_of([
        (
            "_call_",
            native(|_, args| {
                Value::val_error(args.value(0).to_string(), args.value(1).to_string())
            }),
        ),
        (
            "raise",
            native(|_, args| {
                Value::error(args.value(0).to_string(), args.value(1).to_string())
            }),
        ),
        (
            "panic",
            native(|_, args| match args.value(0) {
                Value::ValError(e) | Value::Error(e) => {
                    Value::error(e.typ.clone(), e.value.clone())
                }
                _ => Value::runtime_error("panic a non-Error value"),
            }),
        ),
    ])
}

fn print_values(values: &[Value], newline: bool) -> Value {
    let mut out = std::io::stdout();
    for value in values {
        if write!(out, "{}", value).is_err() {
            return Value::error("IOError", "write to stdout failed");
        }
    }
    if newline {
        let _ = writeln!(out);
    }
    let _ = out.flush();
    Value::Nil
}
