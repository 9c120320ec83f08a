//! The `fs` package. All paths resolve relative to the engine's base path —
//! the directory of the running script.

use super::{native, positional_or_kwarg, table_of};
use crate::value::Table;
use crate::{Engine, FnCallArgs, Value};
use std::fs;
use std::path::PathBuf;

fn resolve(engine: &Engine, relative: &str) -> PathBuf {
    engine.base_path().join(relative)
}

fn io_error(error: impl ToString) -> Value {
    Value::error("IOError", error.to_string())
}

/// The truthiness of an optional `append` argument (positional or keyword).
fn append_flag(args: &FnCallArgs, index: usize) -> bool {
    positional_or_kwarg(args, index, "append").is_some_and(|v| v.truthy())
}

fn write_text(path: PathBuf, content: &str, append: bool) -> Value {
    let outcome = if append {
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .and_then(|mut f| std::io::Write::write_all(&mut f, content.as_bytes()))
    } else {
        fs::write(&path, content)
    };
    match outcome {
        Ok(()) => Value::Nil,
        Err(error) => io_error(error),
    }
}

/// `fs.readJson` — shared with the `json` package's `read` alias.
pub(crate) fn native_read_json() -> Value {
    native(|ctx, args| {
        let Some(path) = args.string(0) else {
            return Value::runtime_error("expected a String path");
        };
        match fs::read_to_string(resolve(ctx.engine, &path)) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(parsed) => Value::from_json(&parsed),
                Err(error) => Value::error("JsonError", error.to_string()),
            },
            Err(error) => io_error(error),
        }
    })
}

/// `fs.writeJson` — shared with the `json` package's `write` alias.
pub(crate) fn native_write_json() -> Value {
    native(|ctx, args| {
        let Some(path) = args.string(0) else {
            return Value::runtime_error("expected a String path");
        };
        let content = args.value(1);
        let encoded = match serde_json::to_string(&content.to_json()) {
            Ok(encoded) => encoded,
            Err(error) => return Value::error("JsonError", error.to_string()),
        };
        let outcome = write_text(resolve(ctx.engine, &path), &encoded, append_flag(args, 2));
        if outcome.is_error() {
            return outcome;
        }
        content
    })
}

/// Build the `fs` table.
pub(crate) fn package() -> Value {
    table_of([
        (
            "readText",
            native(|ctx, args| {
                let Some(path) = args.string(0) else {
                    return Value::runtime_error("expected a String path");
                };
                match fs::read_to_string(resolve(ctx.engine, &path)) {
                    Ok(text) => Value::string(text),
                    Err(error) => io_error(error),
                }
            }),
        ),
        (
            "writeText",
            native(|ctx, args| {
                let Some(path) = args.string(0) else {
                    return Value::runtime_error("expected a String path");
                };
                let content = args.value(1);
                let outcome = write_text(
                    resolve(ctx.engine, &path),
                    &content.to_string(),
                    append_flag(args, 2),
                );
                if outcome.is_error() {
                    return outcome;
                }
                content
            }),
        ),
        ("readJson", native_read_json()),
        ("writeJson", native_write_json()),
        (
            "readLines",
            native(|ctx, args| {
                let Some(path) = args.string(0) else {
                    return Value::runtime_error("expected a String path");
                };
                match fs::read_to_string(resolve(ctx.engine, &path)) {
                    Ok(text) => Table::from_list(text.lines().map(Value::string)),
                    Err(error) => io_error(error),
                }
            }),
        ),
        (
            "writeLines",
            native(|ctx, args| {
                let Some(path) = args.string(0) else {
                    return Value::runtime_error("expected a String path");
                };
                let content = args.value(1);
                let Value::Table(table) = &content else {
                    return Value::runtime_error("write lines from a non-Table value");
                };
                let lines: Vec<String> =
                    table.borrow().list_part().iter().map(Value::to_string).collect();
                let outcome = write_text(
                    resolve(ctx.engine, &path),
                    &lines.join("\n"),
                    append_flag(args, 2),
                );
                if outcome.is_error() {
                    return outcome;
                }
                content
            }),
        ),
        (
            "exists",
            native(|ctx, args| match args.string(0) {
                Some(path) => Value::Number(if resolve(ctx.engine, &path).exists() {
                    1.0
                } else {
                    0.0
                }),
                None => Value::runtime_error("expected a String path"),
            }),
        ),
        (
            "listDir",
            native(|ctx, args| {
                let Some(path) = args.string(0) else {
                    return Value::runtime_error("expected a String path");
                };
                match list_dir(resolve(ctx.engine, &path)) {
                    Ok(names) => Table::from_list(names.into_iter().map(Value::string)),
                    Err(error) => io_error(error),
                }
            }),
        ),
        (
            "isFile",
            native(|ctx, args| match args.string(0) {
                Some(path) => Value::Number(if resolve(ctx.engine, &path).is_file() {
                    1.0
                } else {
                    0.0
                }),
                None => Value::runtime_error("expected a String path"),
            }),
        ),
        (
            "isDir",
            native(|ctx, args| match args.string(0) {
                Some(path) => Value::Number(if resolve(ctx.engine, &path).is_dir() {
                    1.0
                } else {
                    0.0
                }),
                None => Value::runtime_error("expected a String path"),
            }),
        ),
        (
            "copy",
            native(|ctx, args| {
                let (Some(from), Some(to)) = (args.string(0), args.string(1)) else {
                    return Value::runtime_error("expected String paths");
                };
                match fs::copy(resolve(ctx.engine, &from), resolve(ctx.engine, &to)) {
                    Ok(_) => Value::Nil,
                    Err(error) => io_error(error),
                }
            }),
        ),
        (
            "move",
            native(|ctx, args| {
                let (Some(from), Some(to)) = (args.string(0), args.string(1)) else {
                    return Value::runtime_error("expected String paths");
                };
                match fs::rename(resolve(ctx.engine, &from), resolve(ctx.engine, &to)) {
                    Ok(()) => Value::Nil,
                    Err(error) => io_error(error),
                }
            }),
        ),
        (
            "join",
            native(|_, args| {
                let Some(table) = args.table(0) else {
                    return Value::runtime_error("join a non-Table value");
                };
                let mut path = PathBuf::new();
                for part in table.borrow().list_part() {
                    path.push(part.to_string());
                }
                Value::string(path.to_string_lossy().into_owned())
            }),
        ),
        (
            "mkdir",
            native(|ctx, args| match args.string(0) {
                Some(path) => match fs::create_dir_all(resolve(ctx.engine, &path)) {
                    Ok(()) => Value::Nil,
                    Err(error) => io_error(error),
                },
                None => Value::runtime_error("expected a String path"),
            }),
        ),
        (
            "rmdir",
            native(|ctx, args| match args.string(0) {
                Some(path) => match fs::remove_dir_all(resolve(ctx.engine, &path)) {
                    Ok(()) => Value::Nil,
                    Err(error) => io_error(error),
                },
                None => Value::runtime_error("expected a String path"),
            }),
        ),
        (
            "fileSize",
            native(|ctx, args| match args.string(0) {
                Some(path) => match fs::metadata(resolve(ctx.engine, &path)) {
                    Ok(meta) => Value::Number(meta.len() as f64),
                    Err(error) => io_error(error),
                },
                None => Value::runtime_error("expected a String path"),
            }),
        ),
        (
            "findFiles",
            native(|ctx, args| {
                let Some(path) = args.string(0) else {
                    return Value::runtime_error("expected a String path");
                };
                let check = args.value(1);
                let names = match list_dir(resolve(ctx.engine, &path)) {
                    Ok(names) => names,
                    Err(error) => return io_error(error),
                };
                let mut out = Table::new();
                for name in names {
                    let keep = if check.is_callable() {
                        let verdict = crate::fn_call::call_with(
                            ctx.engine,
                            ctx.env,
                            &check,
                            vec![Value::string(name.as_str())],
                        );
                        if verdict.is_error() {
                            return verdict;
                        }
                        verdict.truthy()
                    } else {
                        true
                    };
                    if keep {
                        out.append(Value::string(name));
                    }
                }
                Value::Table(crate::Shared::new(std::cell::RefCell::new(out)))
            }),
        ),
    ])
}

/// Directory entries by name, sorted for deterministic iteration order.
fn list_dir(path: PathBuf) -> std::io::Result<Vec<String>> {
    let mut names: Vec<String> = fs::read_dir(path)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    Ok(names)
}
