//! The `sql` package — a process-wide SQLite handle.
//!
//! `sql.init(path)` opens the connection; `sql.execute(query)` reuses it
//! until the process exits. Row-producing statements come back as one
//! newline-joined string of row tuples.

use super::{native, table_of};
use crate::Value;
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use std::cell::RefCell;

thread_local! {
    static CONNECTION: RefCell<Option<Connection>> = const { RefCell::new(None) };
}

fn sql_error(error: impl ToString) -> Value {
    Value::error("SQLError", error.to_string())
}

fn render_field(field: ValueRef<'_>) -> String {
    match field {
        ValueRef::Null => "None".to_string(),
        ValueRef::Integer(n) => n.to_string(),
        ValueRef::Real(n) => n.to_string(),
        ValueRef::Text(text) => format!("'{}'", String::from_utf8_lossy(text)),
        ValueRef::Blob(blob) => format!("<blob {} bytes>", blob.len()),
    }
}

fn execute(query: &str) -> Value {
    CONNECTION.with(|slot| {
        let connection = slot.borrow();
        let Some(connection) = connection.as_ref() else {
            return sql_error("sql.init was not called");
        };

        let mut statement = match connection.prepare(query) {
            Ok(statement) => statement,
            Err(error) => return sql_error(error),
        };
        let columns = statement.column_count();

        if columns == 0 {
            return match statement.execute([]) {
                Ok(_) => Value::string(""),
                Err(error) => sql_error(error),
            };
        }

        let mut rows = match statement.query([]) {
            Ok(rows) => rows,
            Err(error) => return sql_error(error),
        };
        let mut lines = Vec::new();
        loop {
            match rows.next() {
                Ok(Some(row)) => {
                    let mut fields = Vec::with_capacity(columns);
                    for index in 0..columns {
                        match row.get_ref(index) {
                            Ok(field) => fields.push(render_field(field)),
                            Err(error) => return sql_error(error),
                        }
                    }
                    lines.push(format!("({})", fields.join(", ")));
                }
                Ok(None) => break,
                Err(error) => return sql_error(error),
            }
        }
        Value::string(lines.join("\n"))
    })
}

/// Build the `sql` table.
pub(crate) fn package() -> Value {
    table_of([
        (
            "init",
            native(|ctx, args| {
                let Some(path) = args.string(0) else {
                    return Value::runtime_error("expected a String path");
                };
                match Connection::open(ctx.engine.base_path().join(path.as_str())) {
                    Ok(connection) => {
                        CONNECTION.with(|slot| *slot.borrow_mut() = Some(connection));
                        Value::Nil
                    }
                    Err(error) => sql_error(error),
                }
            }),
        ),
        (
            "execute",
            native(|_, args| match args.string(0) {
                Some(query) => execute(&query),
                None => Value::runtime_error("expected a String query"),
            }),
        ),
    ])
}
