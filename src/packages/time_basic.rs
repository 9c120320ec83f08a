//! The `time` and `benchmark` packages. Sleeping blocks the caller; there is
//! no scheduling of any kind in the runtime.

use super::{native, table_of};
use crate::fn_call::call_with;
use crate::value::Table;
use crate::{Shared, Value};
use std::cell::RefCell;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Build the `time` table.
pub(crate) fn time_package() -> Value {
    table_of([
        (
            "now",
            native(|_, _| {
                let seconds = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_secs_f64())
                    .unwrap_or(0.0);
                Value::Number(seconds)
            }),
        ),
        (
            "sleep",
            native(|_, args| match args.number(0) {
                Some(seconds) if seconds >= 0.0 => {
                    std::thread::sleep(Duration::from_secs_f64(seconds));
                    Value::Nil
                }
                _ => Value::runtime_error("sleep a non-Number duration"),
            }),
        ),
    ])
}

/// Build the `benchmark` table.
pub(crate) fn benchmark_package() -> Value {
    table_of([
        (
            "measure",
            native(|ctx, args| {
                let f = args.value(0);
                let started = Instant::now();
                let result = call_with(ctx.engine, ctx.env, &f, vec![]);
                if result.is_error() {
                    return result;
                }
                Value::Number(started.elapsed().as_secs_f64())
            }),
        ),
        (
            "measureMul",
            native(|ctx, args| {
                let f = args.value(0);
                let Some(runs) = args.number(1) else {
                    return Value::runtime_error("expected a Number of runs");
                };
                let runs = runs as i64;
                if runs <= 0 {
                    return Value::runtime_error("expected a positive Number of runs");
                }

                let mut samples = Vec::with_capacity(runs as usize);
                for _ in 0..runs {
                    let started = Instant::now();
                    let result = call_with(ctx.engine, ctx.env, &f, vec![]);
                    if result.is_error() {
                        return result;
                    }
                    samples.push(started.elapsed().as_secs_f64());
                }

                let mean = samples.iter().sum::<f64>() / samples.len() as f64;
                let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
                let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);

                let mut out = Table::new();
                out.define(Value::string("mean"), Value::Number(mean));
                out.define(Value::string("min"), Value::Number(min));
                out.define(Value::string("max"), Value::Number(max));
                Value::Table(Shared::new(RefCell::new(out)))
            }),
        ),
    ])
}
