// Copyright 2026 the Sia Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Disassembler example.
//!
//! Run with:
//! `cargo run -p sia --example disasm`

use sia::Encoder;
use sia::builtins::Set;
use sia::disasm::disassemble;
use sia::program::{
    Item, add_to, is_bigger, mul, program, push, sia_array, sin, slot, var, while_,
};
use sia::value::{Custom, Value};

fn main() {
    let data: Value = [
        ("greeting", Value::from("hello")),
        ("again", Value::from("hello")),
        ("set", Value::Custom(Custom::new(Set(vec![1.into(), 2.into()])))),
    ]
    .into_iter()
    .collect();

    // curr * sin(curr) for curr in 0, 3, 6, ... below 10.
    let wave = program([
        var("curr", 0),
        var("step", 3),
        var("end", 10),
        while_(
            is_bigger(slot("end"), slot("curr")),
            [
                push(mul(slot("curr"), sin(slot("curr")))),
                add_to(slot("curr"), slot("step")),
            ],
        ),
    ]);

    let item = sia_array([Item::Value(data), wave.into()]);
    let bytes = Encoder::default().serialize_item(&item).unwrap();
    print!("{}", disassemble(&bytes));
    println!("{:?}", sia::deserialize(&bytes).unwrap());
}
