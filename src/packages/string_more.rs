//! String methods, resolved through member access on string values.
//!
//! Indexing and slicing are character-based, and `slice(l, r)` is inclusive
//! of both ends.

use super::native;
use crate::value::Table;
use crate::{ImmutableString, Value};

/// Resolve a method on a string receiver. The returned native is bound to
/// the receiver it was looked up on.
pub(crate) fn method(receiver: &ImmutableString, name: &str) -> Option<Value> {
    let recv = receiver.clone();
    Some(match name {
        "len" => native(move |_, _| Value::Number(recv.chars().count() as f64)),
        "slice" => native(move |_, args| {
            let (Some(from), Some(to)) = (args.number(0), args.number(1)) else {
                return Value::runtime_error("slice with non-Number bounds");
            };
            Value::string(slice_inclusive(&recv, from as i64, to as i64))
        }),
        "find" => native(move |_, args| {
            let Some(needle) = args.string(0) else {
                return Value::runtime_error("find a non-String value");
            };
            match recv.find(needle.as_str()) {
                Some(byte_at) => Value::Number(recv[..byte_at].chars().count() as f64),
                None => Value::Number(-1.0),
            }
        }),
        "upper" => native(move |_, _| Value::string(recv.to_uppercase())),
        "lower" => native(move |_, _| Value::string(recv.to_lowercase())),
        "cap" => native(move |_, _| {
            let mut chars = recv.chars();
            match chars.next() {
                Some(first) => Value::string(
                    first.to_uppercase().collect::<String>() + chars.as_str().to_lowercase().as_str(),
                ),
                None => Value::string(""),
            }
        }),
        "trim" => native(move |_, _| Value::string(recv.trim())),
        "split" => native(move |_, args| {
            let Some(separator) = args.string(0) else {
                return Value::runtime_error("split with a non-String separator");
            };
            if separator.is_empty() {
                return Value::runtime_error("split with an empty separator");
            }
            Table::from_list(
                recv.split(separator.as_str())
                    .map(|part| Value::string(part)),
            )
        }),
        "join" => native(move |_, args| {
            let Some(table) = args.table(0) else {
                return Value::runtime_error("join a non-Table value");
            };
            let parts: Vec<String> = table
                .borrow()
                .list_part()
                .iter()
                .map(Value::to_string)
                .collect();
            Value::string(parts.join(recv.as_str()))
        }),
        "format" => native(move |_, args| {
            let Some(table) = args.table(0) else {
                return Value::runtime_error("format with a non-Table value");
            };
            format_with(&recv, &table)
        }),
        _ => return None,
    })
}

/// Character slice with Python-style negative indices, inclusive on both
/// ends.
fn slice_inclusive(s: &ImmutableString, from: i64, to: i64) -> String {
    let chars: Vec<char> = s.chars().collect();
    let len = chars.len() as i64;
    let normalize = |at: i64| if at < 0 { at + len } else { at };
    let from = normalize(from).max(0);
    let to = normalize(to).min(len - 1);
    if from > to {
        return String::new();
    }
    chars[from as usize..=to as usize].iter().collect()
}

/// `"…{}…{name}…".format(table)` — `{}` takes the next value of the table's
/// array part, `{name}` takes the entry at a string key, `{{`/`}}` are
/// literal braces.
fn format_with(template: &ImmutableString, table: &crate::TableRef) -> Value {
    let list = table.borrow().list_part();
    let mut positional = list.iter();
    let mut out = String::new();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(c) => name.push(c),
                        None => {
                            return Value::runtime_error("unterminated format placeholder")
                        }
                    }
                }
                let value = if name.is_empty() {
                    match positional.next() {
                        Some(value) => value.clone(),
                        None => {
                            return Value::runtime_error("missing positional format argument")
                        }
                    }
                } else {
                    match table.borrow().raw_get(&Value::string(name.as_str())) {
                        Some(value) => value,
                        None => {
                            return Value::runtime_error("missing named format argument")
                        }
                    }
                };
                out.push_str(&value.to_string());
            }
            _ => out.push(c),
        }
    }
    Value::string(out)
}
