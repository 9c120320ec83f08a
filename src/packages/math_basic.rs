//! The `math` package: constants, float functions, randomness and the
//! comparison helpers usable as first-class predicates.

use super::{native, table_of};
use crate::engine::binary_op;
use crate::value::Table;
use crate::Value;
use rand::Rng;

macro_rules! fn_1 {
    ($f:expr) => {
        native(move |_, args| match args.number(0) {
            Some(x) => Value::Number($f(x)),
            None => Value::runtime_error("expected a Number argument"),
        })
    };
}

macro_rules! fn_2 {
    ($f:expr) => {
        native(move |_, args| match (args.number(0), args.number(1)) {
            (Some(x), Some(y)) => Value::Number($f(x, y)),
            _ => Value::runtime_error("expected Number arguments"),
        })
    };
}

macro_rules! cmp_fn {
    ($op:expr) => {
        native(move |_, args| binary_op($op, &args.value(0), &args.value(1)))
    };
}

/// Build the `math` table.
pub(crate) fn package() -> Value {
    table_of([
        ("pi", Value::Number(std::f64::consts::PI)),
        ("e", Value::Number(std::f64::consts::E)),
        ("tau", Value::Number(std::f64::consts::TAU)),
        ("abs", fn_1!(f64::abs)),
        ("floor", fn_1!(f64::floor)),
        ("ceil", fn_1!(f64::ceil)),
        ("round", fn_1!(f64::round)),
        ("trunc", fn_1!(f64::trunc)),
        ("min", cmp_pick(false)),
        ("max", cmp_pick(true)),
        ("sign", fn_1!(|x: f64| 1.0_f64.copysign(x))),
        ("sin", fn_1!(f64::sin)),
        ("cos", fn_1!(f64::cos)),
        ("tan", fn_1!(f64::tan)),
        ("asin", fn_1!(f64::asin)),
        ("acos", fn_1!(f64::acos)),
        ("atan", fn_1!(f64::atan)),
        ("atan2", fn_2!(f64::atan2)),
        ("degrees", fn_1!(f64::to_degrees)),
        ("radians", fn_1!(f64::to_radians)),
        ("exp", fn_1!(f64::exp)),
        ("pow", fn_2!(f64::powf)),
        (
            "log",
            native(|_, args| {
                let Some(x) = args.number(0) else {
                    return Value::runtime_error("expected a Number argument");
                };
                match args.number_or(1, std::f64::consts::E) {
                    Some(base) => Value::Number(x.log(base)),
                    None => Value::runtime_error("expected a Number argument"),
                }
            }),
        ),
        ("log10", fn_1!(f64::log10)),
        ("log2", fn_1!(f64::log2)),
        (
            "hypot",
            native(|_, args| {
                let mut sum = 0.0;
                for value in &args.args {
                    match value.as_number() {
                        Some(n) => sum += n * n,
                        None => return Value::runtime_error("expected Number arguments"),
                    }
                }
                Value::Number(sum.sqrt())
            }),
        ),
        (
            "random",
            native(|_, _| Value::Number(rand::rng().random::<f64>())),
        ),
        (
            "uniform",
            native(|_, args| match (args.number(0), args.number(1)) {
                (Some(a), Some(b)) if a <= b => {
                    Value::Number(rand::rng().random_range(a..=b))
                }
                (Some(_), Some(_)) => Value::runtime_error("empty uniform range"),
                _ => Value::runtime_error("expected Number arguments"),
            }),
        ),
        (
            "randint",
            native(|_, args| match (args.number(0), args.number(1)) {
                (Some(a), Some(b)) if (a as i64) <= (b as i64) => {
                    Value::Number(rand::rng().random_range(a as i64..=b as i64) as f64)
                }
                (Some(_), Some(_)) => Value::runtime_error("empty randint range"),
                _ => Value::runtime_error("expected Number arguments"),
            }),
        ),
        (
            "clamp",
            native(|_, args| {
                match (args.number(0), args.number(1), args.number(2)) {
                    (Some(x), Some(low), Some(high)) => Value::Number(x.max(low).min(high)),
                    _ => Value::runtime_error("expected Number arguments"),
                }
            }),
        ),
        ("lerp", native(|_, args| {
            match (args.number(0), args.number(1), args.number(2)) {
                (Some(a), Some(b), Some(t)) => Value::Number(a + (b - a) * t),
                _ => Value::runtime_error("expected Number arguments"),
            }
        })),
        ("eq", cmp_fn!("==")),
        ("lt", cmp_fn!("<")),
        ("gt", cmp_fn!(">")),
        ("le", cmp_fn!("<=")),
        ("ge", cmp_fn!(">=")),
        ("neq", cmp_fn!("!=")),
    ])
}

/// `min`/`max` over two values, comparing the way `<` does so strings work
/// too.
fn cmp_pick(take_greater: bool) -> Value {
    native(move |_, args| {
        let (a, b) = (args.value(0), args.value(1));
        let verdict = binary_op("<", &a, &b);
        if verdict.is_error() {
            return verdict;
        }
        let a_smaller = verdict.truthy();
        if a_smaller == take_greater {
            b
        } else {
            a
        }
    })
}

/// Methods available on number values through member access.
pub(crate) fn number_method(receiver: f64, name: &str) -> Option<Value> {
    match name {
        // `n.times()` — the integers 0..n as a table.
        "times" => Some(native(move |_, _| {
            let mut out = Table::new();
            let mut at = 0;
            while at < receiver as i64 {
                out.append(Value::Number(at as f64));
                at += 1;
            }
            Value::Table(crate::Shared::new(std::cell::RefCell::new(out)))
        })),
        _ => None,
    }
}
