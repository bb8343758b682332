// Copyright 2026 the Sia Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Workloads shared by the `sia` benchmarks.

use sia::builtins::Date;
use sia::program::{Program, add_to, is_bigger, mul, program, push, sin, slot, var, while_};
use sia::value::{Custom, Map, Value};

/// An array of `rows` records with repeated keys and a few repeated values.
#[must_use]
pub fn records(rows: usize) -> Value {
    let statuses = ["active", "idle", "closed"];
    let items = (0..rows)
        .map(|i| {
            let mut row = Map::new();
            row.insert("id".into(), Value::Int(i as i64));
            row.insert("name".into(), Value::String(format!("user-{i}")));
            row.insert("status".into(), statuses[i % statuses.len()].into());
            row.insert("score".into(), Value::Float(i as f64 * 0.5));
            row.insert(
                "seen".into(),
                Value::Custom(Custom::new(Date {
                    millis: 1.7e12 + i as f64,
                })),
            );
            Value::Object(row)
        })
        .collect();
    Value::Array(items)
}

/// `rows` distinct strings; nothing dedups.
#[must_use]
pub fn distinct_strings(rows: usize) -> Value {
    Value::Array((0..rows).map(|i| Value::String(format!("s{i:08}"))).collect())
}

/// Pushes `curr * sin(curr)` for `curr` in `0, step, 2 * step, ...` below `end`.
#[must_use]
pub fn wave(step: i64, end: i64) -> Program {
    program([
        var("curr", 0),
        var("step", step),
        var("end", end),
        while_(
            is_bigger(slot("end"), slot("curr")),
            [
                push(mul(slot("curr"), sin(slot("curr")))),
                add_to(slot("curr"), slot("step")),
            ],
        ),
    ])
}
