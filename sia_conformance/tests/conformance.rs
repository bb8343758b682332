// Copyright 2026 the Sia Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![allow(missing_docs, reason = "integration test crate")]

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use sia::builtins::{Date, RegExp, Set};
use sia::decoder::{DecodeError, DecoderConfig, StreamStatus};
use sia::disasm::disassemble;
use sia::encoder::{EncodeError, EncoderConfig, SinkError};
use sia::format::{BufferOverflow, FormatError, Growth};
use sia::program::{
    Item, Program, add_to, exit, if_, is_bigger, jump, label, line, mul, program, push, sia_array,
    sin, slot, var, while_,
};
use sia::registry::Registry;
use sia::tag::Tag;
use sia::value::{Custom, Map, Value};
use sia::vm::{Limits, Trap};
use sia::{Decoder, Encoder};

fn encode(v: &Value) -> Vec<u8> {
    Encoder::default().serialize(v).unwrap()
}

fn decode(bytes: &[u8]) -> Result<Value, DecodeError> {
    Decoder::default().deserialize(bytes)
}

fn round_trip(v: &Value) {
    let bytes = encode(v);
    assert_eq!(decode(&bytes).as_ref(), Ok(v), "bytes: {bytes:02x?}");
}

fn run_item(item: &Item) -> Value {
    let bytes = Encoder::default().serialize_item(item).unwrap();
    decode(&bytes).unwrap()
}

fn expected_wave() -> Value {
    Value::Array(
        (0..100)
            .step_by(3)
            .map(|x| {
                let x = f64::from(x);
                Value::Float(x * x.sin())
            })
            .collect(),
    )
}

fn while_wave() -> Program {
    program([
        var("curr", 0),
        var("step", 3),
        var("end", 100),
        while_(
            is_bigger(slot("end"), slot("curr")),
            [
                push(mul(slot("curr"), sin(slot("curr")))),
                add_to(slot("curr"), slot("step")),
            ],
        ),
    ])
}

fn jump_wave() -> Program {
    program([
        var("curr", 0),
        var("step", 3),
        var("end", 99),
        line("loop", if_(is_bigger(slot("curr"), slot("end")), [exit()])),
        push(mul(slot("curr"), sin(slot("curr")))),
        add_to(slot("curr"), slot("step")),
        jump(label("loop")),
    ])
}

#[test]
fn golden_object_bytes() {
    let v: Value = [
        ("a", Value::Int(1)),
        ("b", Value::Array(vec![Value::Bool(true), "a".into()])),
    ]
    .into_iter()
    .collect();
    let expected: &[u8] = &[
        0x27, // object_start
        0x11, 1, b'a', // str8 "a" -> #0
        0x02, 1, // uint8 1 -> #1
        0x11, 1, b'b', // str8 "b" -> #2
        0x22, 2, // array8 len=2
        0x1F, // true -> #3
        0x18, 0, // ref8 #0
        0x26, // array_end -> #4
        0x29, // object_end -> #5
        0xFF, // end
    ];
    let bytes = encode(&v);
    assert_eq!(bytes, expected);
    assert_eq!(decode(&bytes), Ok(v));
}

#[test]
fn golden_primitive_bytes() {
    assert_eq!(encode(&Value::Null), [0x00, 0xFF]);
    assert_eq!(encode(&Value::Undefined), [0x01, 0xFF]);
    assert_eq!(encode(&Value::Bool(false)), [0x20, 0xFF]);
    let mut float = vec![0x10];
    float.extend_from_slice(&1.5_f64.to_le_bytes());
    float.push(0xFF);
    assert_eq!(encode(&Value::Float(1.5)), float);
    assert_eq!(encode(&Value::Int(-256)), [0x0A, 0x00, 0x01, 0xFF]);
}

#[test]
fn repeated_primitives_are_written_once() {
    let strings = encode(&Value::Array(vec!["same".into(), "same".into()]));
    assert_eq!(
        strings,
        [0x22, 2, 0x11, 4, b's', b'a', b'm', b'e', 0x18, 0, 0x26, 0xFF]
    );

    let floats = encode(&Value::Array(vec![2.5.into(), 2.5.into()]));
    let mut expected = vec![0x22, 2, 0x10];
    expected.extend_from_slice(&2.5_f64.to_le_bytes());
    expected.extend_from_slice(&[0x18, 0, 0x26, 0xFF]);
    assert_eq!(floats, expected);

    round_trip(&Value::Array(vec!["same".into(), "same".into()]));
    round_trip(&Value::Array(vec![2.5.into(), 2.5.into()]));
}

#[test]
fn integer_width_boundaries() {
    let cases: &[(i64, Tag)] = &[
        (0, Tag::UInt8),
        (255, Tag::UInt8),
        (256, Tag::UInt16),
        (65535, Tag::UInt16),
        (65536, Tag::UInt24),
        (1 << 48, Tag::UIntN),
        (i64::MAX, Tag::UIntN),
        (-1, Tag::Int8),
        (-256, Tag::Int16),
        (-65536, Tag::Int24),
        (i64::MIN, Tag::IntN),
    ];
    for (v, tag) in cases {
        let bytes = encode(&Value::Int(*v));
        assert_eq!(bytes[0], tag.byte(), "{v}");
        round_trip(&Value::Int(*v));
    }
}

#[test]
fn string_length_boundaries() {
    let cases: &[(usize, Tag)] = &[
        (0, Tag::Str8),
        (255, Tag::Str8),
        (256, Tag::Str16),
        (65535, Tag::Str16),
        (65536, Tag::Str32),
    ];
    for (len, tag) in cases {
        let v = Value::String("x".repeat(*len));
        let bytes = encode(&v);
        assert_eq!(bytes[0], tag.byte(), "{len}");
        round_trip(&v);
    }
    round_trip(&Value::from("héllo ✓"));
}

#[test]
fn byte_strings() {
    for len in [0_usize, 255, 256, 70_000] {
        let v = Value::Bytes((0..len).map(|i| (i % 251) as u8).collect());
        round_trip(&v);
    }
    // Equal byte strings are not interned.
    let v = Value::Array(vec![Value::Bytes(vec![1]), Value::Bytes(vec![1])]);
    assert_eq!(encode(&v), [0x22, 2, 0x15, 1, 1, 0x15, 1, 1, 0x26, 0xFF]);
}

#[test]
fn deep_nesting() {
    let mut v = Value::from("leaf");
    for i in 0..128 {
        v = if i % 2 == 0 {
            Value::Array(vec![v, Value::Int(i)])
        } else {
            [("inner", v)].into_iter().collect()
        };
    }
    round_trip(&v);
}

fn wide_object(keys: usize) -> Value {
    let mut map = Map::new();
    for i in 0..keys {
        let k = format!("k{i}");
        map.insert(k.clone(), Value::String(k));
    }
    Value::Object(map)
}

fn has_tag(bytes: &[u8], tag: Tag) -> bool {
    disassemble(bytes).lines().iter().any(|l| l.tag == tag)
}

#[test]
fn wide_objects_use_wider_refs() {
    let small = wide_object(0x1200);
    let bytes = encode(&small);
    assert!(has_tag(&bytes, Tag::Ref16));
    assert!(!has_tag(&bytes, Tag::Ref24));
    assert_eq!(decode(&bytes), Ok(small));

    let large = wide_object(0x12000);
    let bytes = encode(&large);
    assert!(has_tag(&bytes, Tag::Ref24));
    assert_eq!(decode(&bytes), Ok(large));
}

#[test]
fn repeated_keys_overwrite_in_place() {
    // object_start "a" 1 "b" 2 ref(a) 3 object_end
    let bytes = [
        0x27, 0x11, 1, b'a', 0x02, 1, 0x11, 1, b'b', 0x02, 2, 0x18, 0, 0x02, 3, 0x29, 0xFF,
    ];
    let v = decode(&bytes).unwrap();
    let Value::Object(map) = &v else {
        panic!("expected an object, got {v:?}");
    };
    let keys: Vec<&str> = map.keys().map(String::as_str).collect();
    assert_eq!(keys, ["a", "b"]);
    assert_eq!(map["a"], Value::Int(3));
}

#[test]
fn builtin_extensions_round_trip() {
    let date = Value::Custom(Custom::new(Date {
        millis: 1_700_000_000_000.0,
    }));
    let re = Value::Custom(Custom::new(RegExp {
        source: "a+b".into(),
        flags: "gi".into(),
    }));
    let set = Value::Custom(Custom::new(Set(vec![
        1.into(),
        "two".into(),
        date.clone(),
    ])));
    round_trip(&date);
    round_trip(&re);
    round_trip(&set);
    round_trip(&Value::Array(vec![
        date.clone(),
        re,
        set,
        date,
        "two".into(),
    ]));
}

#[derive(Debug, PartialEq)]
struct Point {
    x: i64,
    y: i64,
}

fn point_registry() -> Arc<Registry> {
    let mut r = Registry::with_builtins();
    r.register::<Point, _, _>(
        7,
        |p| vec![Value::Int(p.x), Value::Int(p.y)],
        |args| match args.as_slice() {
            [Value::Int(x), Value::Int(y)] => Some(Point { x: *x, y: *y }),
            _ => None,
        },
    )
    .unwrap();
    Arc::new(r)
}

#[test]
fn user_registered_types() {
    let registry = point_registry();
    let mut enc = Encoder::new(EncoderConfig {
        registry: Arc::clone(&registry),
        ..EncoderConfig::default()
    });
    let mut dec = Decoder::new(DecoderConfig {
        registry,
        ..DecoderConfig::default()
    });
    let v: Value = [("p", Value::Custom(Custom::new(Point { x: 3, y: -4 })))]
        .into_iter()
        .collect();
    let bytes = enc.serialize(&v).unwrap();
    assert_eq!(dec.deserialize(&bytes), Ok(v));

    // The default registry does not know code 7.
    assert_eq!(
        decode(&bytes),
        Err(DecodeError::UnknownConstructor { code: 7 })
    );
}

#[derive(Debug, PartialEq)]
struct Person {
    name: String,
    born: f64,
}

fn person_registry() -> Arc<Registry> {
    let mut r = Registry::with_builtins();
    // The date argument is built fresh on every call.
    r.register::<Person, _, _>(
        8,
        |p| {
            vec![
                Value::from(p.name.as_str()),
                Value::Custom(Custom::new(Date { millis: p.born })),
            ]
        },
        |args| match args.as_slice() {
            [Value::String(name), Value::Custom(born)] => {
                born.downcast_ref::<Date>().map(|d| Person {
                    name: name.clone(),
                    born: d.millis,
                })
            }
            _ => None,
        },
    )
    .unwrap();
    Arc::new(r)
}

#[test]
fn constructor_args_with_fresh_customs() {
    let registry = person_registry();
    let mut enc = Encoder::new(EncoderConfig {
        registry: Arc::clone(&registry),
        ..EncoderConfig::default()
    });
    let mut dec = Decoder::new(DecoderConfig {
        registry,
        ..DecoderConfig::default()
    });
    let person = |name: &str, born: f64| {
        Value::Custom(Custom::new(Person {
            name: name.to_string(),
            born,
        }))
    };
    let shared = person("ada", 1.0);
    let v = Value::Array(vec![
        person("ada", 0.0),
        person("ada", 1.0),
        person("bob", 2.0),
        person("bob", 3.0),
        shared.clone(),
        shared,
    ]);
    let bytes = enc.serialize(&v).unwrap();
    assert_eq!(dec.deserialize(&bytes), Ok(v));
}

#[test]
fn while_program_computes_wave() {
    assert_eq!(run_item(&Item::Program(while_wave())), expected_wave());
}

#[test]
fn jump_program_computes_wave() {
    assert_eq!(run_item(&Item::Program(jump_wave())), expected_wave());
}

#[test]
fn program_results_feed_containers() {
    let item = sia_array([
        Item::Value("before".into()),
        while_wave().into(),
        Item::Value("before".into()),
    ]);
    assert_eq!(
        run_item(&item),
        Value::Array(vec!["before".into(), expected_wave(), "before".into()])
    );
}

#[test]
fn programs_widen_the_address_space() {
    let mut items: Vec<Item> = (0..300).map(|i| Item::Value(format!("s{i}").into())).collect();
    items.push(program([var("x", "s299"), slot("x")]).into());
    let item = Item::Array(items);
    let bytes = Encoder::default().serialize_item(&item).unwrap();
    assert!(has_tag(&bytes, Tag::Address));

    let Value::Array(out) = decode(&bytes).unwrap() else {
        panic!("expected an array");
    };
    assert_eq!(out.len(), 301);
    assert_eq!(out[300], Value::from("s299"));
}

#[test]
fn program_traps_surface_as_decode_errors() {
    let p = program([var("s", "text"), mul(slot("s"), 2)]);
    let bytes = Encoder::default().serialize_item(&Item::Program(p)).unwrap();
    let err = decode(&bytes).unwrap_err();
    let DecodeError::Trap(info) = &err else {
        panic!("expected a trap, got {err:?}");
    };
    assert!(matches!(info.trap, Trap::TypeMismatch { instr: Tag::Mul, .. }));
}

#[test]
fn fuel_bounds_runaway_programs() {
    let p = program([var("t", true), while_(slot("t"), [var("x", 1)])]);
    let bytes = Encoder::default().serialize_item(&Item::Program(p)).unwrap();
    let mut dec = Decoder::new(DecoderConfig {
        limits: Limits {
            fuel: 1_000,
            ..Limits::default()
        },
        ..DecoderConfig::default()
    });
    let err = dec.deserialize(&bytes).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::Trap(ref info) if info.trap == Trap::FuelExceeded
    ));
}

fn stream_through(item: &Item, n: usize) -> Value {
    let ended = Rc::new(RefCell::new(None));
    let mut dec = Decoder::default();
    let seen = Rc::clone(&ended);
    dec.set_on_end(move |v| *seen.borrow_mut() = Some(v.clone()));

    let mut enc = Encoder::new(EncoderConfig {
        chunk_blocks: n,
        ..EncoderConfig::default()
    });
    let mut chunks = 0;
    enc.serialize_item_streaming(item, &mut |chunk: &[u8]| -> Result<(), SinkError> {
        chunks += 1;
        dec.deserialize_blocks(chunk, n)?;
        Ok(())
    })
    .unwrap();
    assert!(chunks > 0);

    let result = dec.take_result().unwrap();
    assert_eq!(ended.borrow().as_ref(), Some(&result));
    result
}

#[test]
fn streaming_matches_whole_decode() {
    let data: Value = [
        ("name", Value::from("stream")),
        ("again", Value::from("stream")),
        ("when", Value::Custom(Custom::new(Date { millis: 12.0 }))),
        ("nums", Value::Array((0..40).map(Value::Int).collect())),
    ]
    .into_iter()
    .collect();
    let item = sia_array([Item::Value(data), while_wave().into()]);
    let whole = run_item(&item);
    for n in [1, 2, 3, 7, 64] {
        assert_eq!(stream_through(&item, n), whole, "chunk size {n}");
    }
}

#[test]
fn streaming_crosses_address_widening() {
    let mut items: Vec<Item> = (0..300).map(|i| Item::Value(format!("w{i}").into())).collect();
    items.push(Item::Value("w299".into()));
    items.push(
        program([
            var("x", "w299"),
            var("n", 2),
            push(slot("x")),
            push(mul(slot("n"), 3)),
        ])
        .into(),
    );
    let item = Item::Array(items);
    let bytes = Encoder::default().serialize_item(&item).unwrap();
    assert!(has_tag(&bytes, Tag::Address));

    let whole = run_item(&item);
    let Value::Array(out) = &whole else {
        panic!("expected an array, got {whole:?}");
    };
    assert_eq!(out.len(), 302);
    assert_eq!(out[300], Value::from("w299"));
    assert_eq!(
        out[301],
        Value::Array(vec!["w299".into(), 6.0.into()])
    );
    for n in [1, 2, 5, 255, 1024] {
        assert_eq!(stream_through(&item, n), whole, "chunk size {n}");
    }
}

#[test]
fn streaming_holds_partial_tags() {
    let bytes = encode(&Value::Array(vec!["split".into(), Value::Int(70_000)]));
    let mut dec = Decoder::default();
    for b in &bytes[..bytes.len() - 1] {
        assert_eq!(dec.deserialize_blocks(&[*b], 16), Ok(StreamStatus::Pending));
    }
    assert_eq!(
        dec.deserialize_blocks(&bytes[bytes.len() - 1..], 16),
        Ok(StreamStatus::Ended)
    );
    assert_eq!(
        dec.take_result(),
        Some(Value::Array(vec!["split".into(), Value::Int(70_000)]))
    );
    assert_eq!(
        dec.deserialize_blocks(&[0xFF], 1),
        Err(DecodeError::AlreadyEnded)
    );
}

#[test]
fn unsupported_tag() {
    let err = decode(&[0x30]).unwrap_err();
    assert_eq!(err, DecodeError::UnsupportedType { tag: 0x30 });
    assert_eq!(err.to_string(), "Unsupported type: 48");
}

#[test]
fn unregistered_custom_value() {
    #[derive(Debug, PartialEq)]
    struct Unknown;
    let err = Encoder::default()
        .serialize(&Value::Array(vec![Value::Custom(Custom::new(Unknown))]))
        .unwrap_err();
    assert!(matches!(err, EncodeError::UnsupportedValue { .. }));
}

#[test]
fn ref_out_of_bounds() {
    assert_eq!(
        decode(&[0x02, 1, 0x18, 5, 0xFF]),
        Err(DecodeError::RefOutOfBounds { index: 5, len: 1 })
    );
}

#[test]
fn unknown_constructor_code() {
    // uint8 9 -> #0, array8 0 / array_end -> #1, constructor #0 #1
    let bytes = [0x02, 9, 0x22, 0, 0x26, 0x2A, 0, 1, 0xFF];
    let err = decode(&bytes).unwrap_err();
    assert_eq!(err, DecodeError::UnknownConstructor { code: 9 });
    assert_eq!(err.to_string(), "Constructor 9 is unknown");
}

#[test]
fn truncated_streams() {
    let bytes = encode(&Value::from("hello"));
    assert_eq!(
        decode(&bytes[..bytes.len() - 3]),
        Err(DecodeError::Format(FormatError::UnexpectedEof))
    );
    assert_eq!(decode(&[]), Err(DecodeError::Format(FormatError::UnexpectedEof)));
}

#[test]
fn fixed_buffer_overflow() {
    let mut enc = Encoder::new(EncoderConfig {
        initial_capacity: 8,
        growth: Growth::Fixed,
        ..EncoderConfig::default()
    });
    let err = enc
        .serialize(&Value::Array(vec!["0123456789".into()]))
        .unwrap_err();
    assert_eq!(
        err,
        EncodeError::BufferOverflow(BufferOverflow {
            capacity: 8,
            needed: 14,
        })
    );
}
