//! The `json` package: encode/decode between values and JSON text, plus the
//! original's aliases (`stringnify`/`parse`) and file shortcuts.

use super::{native, table_of};
use crate::Value;

/// Build the `json` table.
pub(crate) fn package() -> Value {
    let encode = || {
        native(|_, args| match serde_json::to_string(&args.value(0).to_json()) {
            Ok(encoded) => Value::string(encoded),
            Err(error) => Value::error("JsonError", error.to_string()),
        })
    };
    let decode = || {
        native(|_, args| {
            let Some(text) = args.string(0) else {
                return Value::runtime_error("decode a non-String value");
            };
            match serde_json::from_str::<serde_json::Value>(&text) {
                Ok(parsed) => Value::from_json(&parsed),
                Err(error) => Value::error("JsonError", error.to_string()),
            }
        })
    };

    table_of([
        ("encode", encode()),
        ("stringnify", encode()),
        ("decode", decode()),
        ("parse", decode()),
        ("read", super::fs_basic::native_read_json()),
        ("write", super::fs_basic::native_write_json()),
    ])
}
