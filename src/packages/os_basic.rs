//! The `os` package: platform name, subprocess execution, and the
//! line-oriented `.env` store backing `getEnv`/`setEnv`.

use super::{native, table_of};
use crate::{Engine, Value};
use std::path::PathBuf;
use std::process::Command;

fn env_path(engine: &Engine) -> PathBuf {
    engine.base_path().join(".env")
}

/// Run a command line, returning its captured stdout.
fn run_command(command: &str) -> Value {
    let mut parts = command.split_whitespace();
    let Some(program) = parts.next() else {
        return Value::error("OSError", "empty command");
    };
    match Command::new(program).args(parts).output() {
        Ok(output) => Value::string(String::from_utf8_lossy(&output.stdout).into_owned()),
        Err(error) => Value::error("OSError", error.to_string()),
    }
}

/// Parse one `.env` line into `(key, value)`; values may be quoted.
fn parse_line(line: &str) -> Option<(String, String)> {
    let (key, value) = line.split_once('=')?;
    let value = value.trim();
    let value = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
        .unwrap_or(value);
    Some((key.trim().to_string(), value.to_string()))
}

/// Build the `os` table.
pub(crate) fn package() -> Value {
    let run = || {
        native(|_, args| match args.string(0) {
            Some(command) => run_command(&command),
            None => Value::runtime_error("run a non-String command"),
        })
    };

    table_of([
        (
            "platform",
            native(|_, _| Value::string(std::env::consts::OS)),
        ),
        ("run", run()),
        ("shell", run()),
        (
            "getEnv",
            native(|ctx, args| {
                let Some(name) = args.string(0) else {
                    return Value::runtime_error("expected a String name");
                };
                let Ok(text) = std::fs::read_to_string(env_path(ctx.engine)) else {
                    return Value::Nil;
                };
                for line in text.lines() {
                    if let Some((key, value)) = parse_line(line) {
                        if key == name.as_str() {
                            return Value::string(value);
                        }
                    }
                }
                Value::Nil
            }),
        ),
        (
            "setEnv",
            native(|ctx, args| {
                let (Some(name), Some(value)) = (args.string(0), args.string(1)) else {
                    return Value::runtime_error("expected String name and value");
                };
                let path = env_path(ctx.engine);
                let text = std::fs::read_to_string(&path).unwrap_or_default();

                let mut lines: Vec<String> = Vec::new();
                let mut replaced = false;
                for line in text.lines() {
                    match parse_line(line) {
                        Some((key, _)) if key == name.as_str() => {
                            lines.push(format!("{} = \"{}\"", key, value));
                            replaced = true;
                        }
                        Some((key, existing)) => {
                            lines.push(format!("{} = \"{}\"", key, existing));
                        }
                        None => lines.push(line.to_string()),
                    }
                }
                if !replaced {
                    lines.push(format!("{} = \"{}\"", name, value));
                }

                match std::fs::write(&path, lines.join("\n") + "\n") {
                    Ok(()) => Value::Nil,
                    Err(error) => Value::error("IOError", error.to_string()),
                }
            }),
        ),
    ])
}
