//! The interactive shell.
//!
//! Input accumulates across lines until every bracket balances (quotes are
//! tracked so brackets inside strings do not count). Directives start with
//! `:` and never reach the evaluator.

use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::time::Instant;
use teeny::{parse, tokenize, Engine, EnvRef, Value};

const CYAN: &str = "\x1b[36m";
const YELLOW: &str = "\x1b[33m";
const MAGENTA: &str = "\x1b[35;1m";
const DIM: &str = "\x1b[90m";
const RESET: &str = "\x1b[0m";

const PROMPT: &str = "\x1b[36mteeny>\x1b[0m ";
const CONTINUE_PROMPT: &str = "\x1b[36m...>  \x1b[0m ";

pub fn run() -> Result<()> {
    println!("{}Teeny{}  —  Tiny Expression Language", MAGENTA, RESET);
    println!("Type {}:help{} for help.", CYAN, RESET);

    let engine = Engine::new();
    let mut env = engine.new_env();
    let mut editor = DefaultEditor::new()?;

    loop {
        let mut source = match editor.readline(PROMPT) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(error) => return Err(error.into()),
        };
        while !brackets_balanced(&source) {
            match editor.readline(CONTINUE_PROMPT) {
                Ok(more) => {
                    source.push('\n');
                    source.push_str(&more);
                }
                Err(_) => break,
            }
        }
        if source.trim().is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(&source);

        let line = source.trim().to_string();
        match line.as_str() {
            ":exit" => break,
            ":reload" => {
                env = engine.new_env();
                continue;
            }
            ":help" => {
                print_help();
                continue;
            }
            ":env" => {
                let frame = env.borrow();
                println!("Environment({} bindings)", frame.len());
                let mut names: Vec<_> = frame.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
                names.sort_by(|(a, _), (b, _)| a.as_str().cmp(b.as_str()));
                for (name, value) in names {
                    println!("{}: {}", name, value.type_name());
                }
                continue;
            }
            _ => (),
        }

        if let Some(rest) = line.strip_prefix(":time") {
            let started = Instant::now();
            eval_and_print(&engine, &env, rest.trim());
            println!("Time:  {} s", started.elapsed().as_secs_f64());
        } else if let Some(rest) = line.strip_prefix(":ast") {
            print_ast(rest.trim());
        } else if let Some(rest) = line.strip_prefix(":?") {
            let name = rest.trim();
            match env.borrow().read(name) {
                Some(value) => println!("{}: {} = {}", name, value.type_name(), value),
                None => println!("{}: not defined", name),
            }
        } else {
            eval_and_print(&engine, &env, &line);
        }
    }
    Ok(())
}

fn eval_and_print(engine: &Engine, env: &EnvRef, source: &str) {
    match engine.eval_with_env(env, source) {
        Ok(Value::Nil) => (),
        Ok(value) => println!("{}", value),
        Err(error) => println!("{}", error),
    }
}

/// Parse without evaluating and print the statement trees.
fn print_ast(source: &str) {
    let tokens = match tokenize(source) {
        Ok(tokens) => tokens,
        Err(error) => {
            println!("{}", error);
            return;
        }
    };
    let mut pos = 0;
    while pos < tokens.len() {
        match parse(&tokens, pos, 0) {
            Ok((ast, next)) if next > pos => {
                print!("{}", ast);
                pos = next;
            }
            Ok(_) => break,
            Err(error) => {
                println!("{}", error);
                break;
            }
        }
    }
}

/// All brackets closed and properly nested, ignoring any inside string
/// quotes. Nesting is tracked as one stack across all three bracket kinds,
/// so `( [ )` is not mistaken for balanced input. A closer that does not
/// match the innermost opener makes the input complete as well — the parser
/// gets to report the mismatch instead of the prompt waiting for a line
/// that can never fix it.
fn brackets_balanced(source: &str) -> bool {
    let mut open = Vec::new();
    let mut in_double = false;
    let mut in_single = false;
    for c in source.chars() {
        match c {
            '"' if !in_single => in_double = !in_double,
            '\'' if !in_double => in_single = !in_single,
            _ if in_double || in_single => (),
            '(' | '[' | '{' => open.push(c),
            ')' | ']' | '}' => {
                let opener = match c {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                if open.pop() != Some(opener) {
                    return true;
                }
            }
            _ => (),
        }
    }
    open.is_empty()
}

#[cfg(test)]
mod tests {
    use super::brackets_balanced;

    #[test]
    fn test_balance_tracks_nesting_across_kinds() {
        assert!(brackets_balanced("f(x)[1] + { 2 }"));
        assert!(!brackets_balanced("for i in 1 .. 3 {"));
        assert!(!brackets_balanced("[a, (b"));
        // Mismatched kinds are complete: the parser reports them.
        assert!(brackets_balanced("( [ )"));
        assert!(brackets_balanced("f(])"));
    }

    #[test]
    fn test_balance_ignores_brackets_in_strings() {
        assert!(brackets_balanced(r#"print("(((")"#));
        assert!(!brackets_balanced(r#"print(")))""#));
        assert!(brackets_balanced("'['"));
    }
}

fn print_help() {
    println!("{}Teeny REPL commands:{}", MAGENTA, RESET);
    let rows = [
        (":help", "", "Show this message"),
        (":exit", "", "Exit the REPL"),
        (":env", "", "List all variables in the environment"),
        (":reload", "", "Reset to a fresh global environment"),
        (":?", "<name>", "Inspect a variable (type and value)"),
        (":time", "<expr>", "Evaluate <expr> and show execution time"),
        (":ast", "<expr>", "Show parsed AST for <expr> (does not execute)"),
    ];
    for (command, argument, description) in rows {
        println!(
            "    {}{}{} {}{:<10}{} {}{}{}",
            CYAN, command, RESET, YELLOW, argument, RESET, DIM, description, RESET
        );
    }
}
