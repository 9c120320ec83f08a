//! Module containing all built-in packages.
//!
//! Each package file builds one area of the standard global environment —
//! a table of native functions, or the per-type method tables consulted by
//! member access. [`seed_global`] wires them all into a fresh environment.

pub mod fs_basic;
pub mod http_client;
pub mod json_basic;
pub mod lang_core;
pub mod math_basic;
pub mod os_basic;
pub mod sql_basic;
pub mod string_more;
pub mod table_basic;
pub mod time_basic;

use crate::env::Env;
use crate::value::{NativeFunction, Table};
use crate::{Engine, EnvRef, FnCallArgs, NativeCallContext, Shared, Value};
use std::cell::RefCell;

/// Build a fresh global environment with every standard global seeded.
pub(crate) fn seed_global(engine: &Engine) -> EnvRef {
    let env = Env::new_ref();
    {
        let mut frame = env.borrow_mut();
        lang_core::register(engine, &mut frame);
        frame.define("math", math_basic::package());
        frame.define("fs", fs_basic::package());
        frame.define("json", json_basic::package());
        frame.define("http", http_client::package());
        frame.define("os", os_basic::package());
        frame.define("time", time_basic::time_package());
        frame.define("benchmark", time_basic::benchmark_package());
        frame.define("sql", sql_basic::package());
    }
    env
}

/// Wrap a closure into a native function value.
pub(crate) fn native(
    f: impl Fn(NativeCallContext<'_>, &mut FnCallArgs) -> Value + 'static,
) -> Value {
    Value::Native(NativeFunction::new(f))
}

/// Build a table value out of `(name, value)` entries.
pub(crate) fn table_of(entries: impl IntoIterator<Item = (&'static str, Value)>) -> Value {
    let mut table = Table::new();
    for (name, value) in entries {
        table.define(Value::string(name), value);
    }
    Value::Table(Shared::new(RefCell::new(table)))
}

/// An argument that may be passed positionally or by keyword.
pub(crate) fn positional_or_kwarg(args: &FnCallArgs, index: usize, name: &str) -> Option<Value> {
    args.args
        .get(index)
        .cloned()
        .or_else(|| args.kwarg(name))
}
