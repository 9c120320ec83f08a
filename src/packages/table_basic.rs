//! Table methods, resolved through member access on table values.
//!
//! These are the metatable bindings every table answers to when a key is
//! absent from its direct payload: sequence operations, the statistics
//! helpers, and the `_iter_` protocol driving `for` loops.

use super::native;
use crate::fn_call::call_with;
use crate::value::Table;
use crate::{Shared, Value};
use std::cell::{Cell, RefCell};

/// Resolve a method on a table receiver. The returned native is bound to the
/// receiver it was looked up on.
pub(crate) fn method(receiver: &Value, name: &str) -> Option<Value> {
    let recv = receiver.clone();
    Some(match name {
        "push" => native(move |_, args| {
            let value = args.value(0);
            table_ref(&recv).borrow_mut().append(value.clone());
            value
        }),
        "keys" => native(move |_, _| {
            let keys: Vec<Value> = table_ref(&recv)
                .borrow()
                .iter()
                .map(|(k, _)| k.clone())
                .collect();
            Table::from_list(keys)
        }),
        "values" => native(move |_, _| {
            let values: Vec<Value> = table_ref(&recv)
                .borrow()
                .iter()
                .map(|(_, v)| v.clone())
                .collect();
            Table::from_list(values)
        }),
        "pairs" => native(move |_, _| {
            let pairs: Vec<Value> = table_ref(&recv)
                .borrow()
                .iter()
                .map(|(k, v)| Table::from_list([k.clone(), v.clone()]))
                .collect();
            Table::from_list(pairs)
        }),
        "map" => native(move |ctx, args| {
            let mapper = args.value(0);
            let entries: Vec<(Value, Value)> = table_ref(&recv)
                .borrow()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            let mut out = Table::new();
            for (key, value) in entries {
                let mapped = call_with(ctx.engine, ctx.env, &mapper, vec![value, key.clone()]);
                if mapped.is_error() {
                    return mapped;
                }
                out.define(key, mapped);
            }
            Value::Table(Shared::new(RefCell::new(out)))
        }),
        "filter" => native(move |ctx, args| {
            let predicate = args.value(0);
            let table = table_ref(&recv);
            let list = table.borrow().list_part();
            let map = table.borrow().map_part();

            let mut out = Table::new();
            for (position, value) in list.into_iter().enumerate() {
                let keep = call_with(
                    ctx.engine,
                    ctx.env,
                    &predicate,
                    vec![value.clone(), Value::Number(position as f64)],
                );
                if keep.is_error() {
                    return keep;
                }
                if keep.truthy() {
                    out.append(value);
                }
            }
            for (key, value) in map {
                let keep = call_with(
                    ctx.engine,
                    ctx.env,
                    &predicate,
                    vec![value.clone(), key.clone()],
                );
                if keep.is_error() {
                    return keep;
                }
                if keep.truthy() {
                    out.define(key, value);
                }
            }
            Value::Table(Shared::new(RefCell::new(out)))
        }),
        // Associative entries keep their keys; the array part is re-appended
        // in natural order.
        "sort" => native(move |_, _| {
            let table = table_ref(&recv);
            let mut list = table.borrow().list_part();
            list.sort_by(|a, b| a.cmp_natural(b));

            let mut out = Table::new();
            for (key, value) in table.borrow().map_part() {
                out.define(key, value);
            }
            for value in list {
                out.append(value);
            }
            Value::Table(Shared::new(RefCell::new(out)))
        }),
        "sum" => native(move |_, _| sum_list(&table_ref(&recv).borrow().list_part())),
        "mean" => native(move |_, _| mean_list(&table_ref(&recv).borrow().list_part())),
        "median" => native(move |_, _| median_list(&table_ref(&recv).borrow().list_part())),
        "stdev" => native(move |_, _| stdev_list(&table_ref(&recv).borrow().list_part())),
        "describe" => native(move |_, _| {
            let list = table_ref(&recv).borrow().list_part();
            let mut out = Table::new();
            for (name, value) in [
                ("sum", sum_list(&list)),
                ("mean", mean_list(&list)),
                ("median", median_list(&list)),
                ("stdev", stdev_list(&list)),
            ] {
                if value.is_error() {
                    return value;
                }
                out.define(Value::string(name), value);
            }
            Value::Table(Shared::new(RefCell::new(out)))
        }),
        "has" => native(move |_, args| {
            let key = args.value(0);
            let present = !matches!(recv.get_member(&key), Value::Nil);
            Value::Number(if present { 1.0 } else { 0.0 })
        }),
        // The default iteration protocol: a fresh cursor over the integer
        // keys 0..size, yielding nil when exhausted.
        "_iter_" => native(move |_, _| {
            let end = table_ref(&recv).borrow().size();
            let cursor = Shared::new(Cell::new(0i64));
            native(move |_, _| {
                let at = cursor.get();
                if at < end {
                    cursor.set(at + 1);
                    Value::Number(at as f64)
                } else {
                    Value::Nil
                }
            })
        }),
        _ => return None,
    })
}

fn table_ref(value: &Value) -> &crate::TableRef {
    value.as_table().expect("receiver is a table")
}

fn sum_list(list: &[Value]) -> Value {
    let mut total = 0.0;
    for value in list {
        match value.as_number() {
            Some(n) => total += n,
            None => return Value::runtime_error("add a non-Number to a Number"),
        }
    }
    Value::Number(total)
}

fn mean_list(list: &[Value]) -> Value {
    if list.is_empty() {
        return Value::runtime_error("divide by zero");
    }
    match sum_list(list) {
        Value::Number(total) => Value::Number(total / list.len() as f64),
        error => error,
    }
}

fn median_list(list: &[Value]) -> Value {
    if list.is_empty() {
        return Value::runtime_error("divide by zero");
    }
    let mut sorted = list.to_vec();
    sorted.sort_by(|a, b| a.cmp_natural(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid].clone()
    } else {
        match (sorted[mid - 1].as_number(), sorted[mid].as_number()) {
            (Some(a), Some(b)) => Value::Number((a + b) / 2.0),
            _ => Value::runtime_error("add a non-Number to a Number"),
        }
    }
}

/// Population standard deviation.
fn stdev_list(list: &[Value]) -> Value {
    let mean = match mean_list(list) {
        Value::Number(mean) => mean,
        error => return error,
    };
    let mut squared = 0.0;
    for value in list {
        match value.as_number() {
            Some(n) => squared += (n - mean) * (n - mean),
            None => return Value::runtime_error("add a non-Number to a Number"),
        }
    }
    Value::Number((squared / list.len() as f64).sqrt())
}
