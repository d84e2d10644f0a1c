#![no_main]
use std::cell::RefCell;

use arbitrary::Unstructured;
use jsonbind::ParserOptions;
use libfuzzer_sys::{fuzz_mutator, fuzz_target, fuzzer_mutate};
use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};
use serde_json::Value;

const HEADER: usize = 5; // 1 flag byte + 4-byte depth seed

/// Nesting the generator stops adding containers at.
const MAX_NESTING: usize = 200;

thread_local! {
    static RNG: RefCell<SmallRng> = RefCell::new(SmallRng::from_os_rng());
}

static WS_TABLE: &[u8] = b" \t\n\r";

/// Few enough keys that objects repeat them; `\u0061` is a second spelling
/// of `a`.
static KEYS: &[&str] = &["a", "b", "id", r"\u0061", "", "x y"];

fn with_rng<F, R>(f: F) -> R
where
    F: FnOnce(&mut SmallRng) -> R,
{
    RNG.with(|cell| f(&mut cell.borrow_mut()))
}

fn mutator(data: &mut [u8], size: usize, max_size: usize, seed: u32) -> usize {
    if max_size < HEADER || (size >= HEADER && !seed.is_multiple_of(10)) {
        return fuzzer_mutate(data, size, max_size);
    }

    let (flags, depth_seed, entropy) = with_rng(|rng| {
        let len = rng.random_range(16..=4096);
        let entropy: Vec<u8> = (0..len).map(|_| rng.random::<u8>()).collect();
        (rng.next_u32() as u8 & 0x03, rng.next_u32(), entropy)
    });
    data[0] = flags;
    data[1..HEADER].copy_from_slice(&depth_seed.to_le_bytes());

    // Running out of entropy leaves a truncated document, which is still a
    // useful input.
    let mut doc = Vec::new();
    let _ = write_document(&mut Unstructured::new(&entropy), &mut doc);

    let len = doc.len().min(max_size - HEADER);
    data[HEADER..HEADER + len].copy_from_slice(&doc[..len]);
    HEADER + len
}

fuzz_mutator!(|data: &mut [u8], size: usize, max_size: usize, seed: u32| {
    mutator(data, size, max_size, seed)
});

fn write_document(u: &mut Unstructured<'_>, out: &mut Vec<u8>) -> arbitrary::Result<()> {
    write_whitespace(u, out)?;
    write_value(u, out, 0)?;
    write_whitespace(u, out)
}

fn write_whitespace(u: &mut Unstructured<'_>, out: &mut Vec<u8>) -> arbitrary::Result<()> {
    for _ in 0..u.int_in_range(0..=2)? {
        out.push(*u.choose(WS_TABLE)?);
    }
    Ok(())
}

fn write_value(u: &mut Unstructured<'_>, out: &mut Vec<u8>, depth: usize) -> arbitrary::Result<()> {
    let top = if depth >= MAX_NESTING { 4 } else { 8 };
    match u.int_in_range(0..=top)? {
        0 => out.extend_from_slice(b"null"),
        1 => out.extend_from_slice(if u.arbitrary()? { b"true".as_slice() } else { b"false" }),
        2 => write_number(u, out)?,
        3 | 4 => write_string(u, out)?,
        5 => {
            let levels = u.int_in_range(1..=64)?;
            out.resize(out.len() + levels, b'[');
            write_value(u, out, depth + levels)?;
            out.resize(out.len() + levels, b']');
        }
        6 => {
            out.push(b'[');
            for i in 0..u.int_in_range(0..=4)? {
                if i > 0 {
                    out.push(b',');
                }
                write_whitespace(u, out)?;
                write_value(u, out, depth + 1)?;
                write_whitespace(u, out)?;
            }
            out.push(b']');
        }
        _ => {
            out.push(b'{');
            for i in 0..u.int_in_range(0..=4)? {
                if i > 0 {
                    out.push(b',');
                }
                write_whitespace(u, out)?;
                out.push(b'"');
                out.extend_from_slice(u.choose(KEYS)?.as_bytes());
                out.extend_from_slice(b"\":");
                write_whitespace(u, out)?;
                write_value(u, out, depth + 1)?;
            }
            out.push(b'}');
        }
    }
    Ok(())
}

/// Numbers with long lexemes, leading zeros and extreme exponents.
fn write_number(u: &mut Unstructured<'_>, out: &mut Vec<u8>) -> arbitrary::Result<()> {
    fn digits(u: &mut Unstructured<'_>, out: &mut Vec<u8>, max: usize) -> arbitrary::Result<()> {
        for _ in 0..u.int_in_range(1..=max)? {
            out.push(b'0' + u.int_in_range(0..=9)?);
        }
        Ok(())
    }

    if u.arbitrary()? {
        out.push(b'-');
    }
    digits(u, out, 40)?;
    if u.arbitrary()? {
        out.push(b'.');
        digits(u, out, 40)?;
    }
    if u.arbitrary()? {
        out.push(*u.choose(b"eE")?);
        if u.arbitrary()? {
            out.push(*u.choose(b"+-")?);
        }
        digits(u, out, 4)?;
    }
    Ok(())
}

/// Strings mixing raw UTF-8 with every escape form, including surrogate
/// pairs and the occasional lone surrogate.
fn write_string(u: &mut Unstructured<'_>, out: &mut Vec<u8>) -> arbitrary::Result<()> {
    out.push(b'"');
    for _ in 0..u.int_in_range(0..=8)? {
        match u.int_in_range(0..=5)? {
            0 => out.push(u.int_in_range(b'a'..=b'z')?),
            1 => {
                let c: char = u.arbitrary()?;
                match c {
                    '"' | '\\' | '\0'..='\u{1f}' => out.push(b'_'),
                    c => out.extend_from_slice(c.encode_utf8(&mut [0; 4]).as_bytes()),
                }
            }
            2 => {
                out.push(b'\\');
                out.push(*u.choose(b"\"\\/bfnrt")?);
            }
            3 => {
                let unit = u.int_in_range(0..=0xD7FF_u16)?;
                out.extend_from_slice(format!("\\u{unit:04x}").as_bytes());
            }
            4 => {
                let c = u.int_in_range(0x1_0000..=0x10_FFFF_u32)? - 0x1_0000;
                let (high, low) = (0xD800 + (c >> 10), 0xDC00 + (c & 0x3FF));
                out.extend_from_slice(format!("\\u{high:04X}\\u{low:04X}").as_bytes());
            }
            _ => {
                let unit = u.int_in_range(0xD800..=0xDFFF_u16)?;
                out.extend_from_slice(format!("\\u{unit:04X}").as_bytes());
            }
        }
    }
    out.push(b'"');
    Ok(())
}

/// Structural equality with floats allowed to differ in the last place.
fn same(ours: &Value, theirs: &Value) -> bool {
    match (ours, theirs) {
        (Value::Number(a), Value::Number(b)) if a.is_f64() || b.is_f64() => {
            match (a.as_f64(), b.as_f64()) {
                (Some(a), Some(b)) => {
                    let diff = (a - b).abs();
                    diff <= f64::EPSILON * a.abs().max(b.abs()) || diff <= f64::MIN_POSITIVE
                }
                _ => false,
            }
        }
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(a, b)| same(a, b))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .zip(b)
                    .all(|((ka, va), (kb, vb))| ka == kb && same(va, vb))
        }
        _ => ours == theirs,
    }
}

fn parser(data: &[u8]) {
    if data.len() < HEADER {
        return;
    }

    let flags = data[0];
    let depth_seed = u32::from_le_bytes([data[1], data[2], data[3], data[4]]) as usize;
    let input = &data[HEADER..];

    let options = ParserOptions {
        ignore_nulls: flags & 1 != 0,
        max_depth: (flags & 2 != 0).then_some(depth_seed % 64),
    };
    let ours = jsonbind::parse_with_options(input, options);

    // Whatever we accept must survive rendering.
    if let Ok(value) = &ours {
        let rendered = value.to_json_bytes();
        let reparsed = jsonbind::parse_with_options(&rendered, options);
        assert_eq!(reparsed.as_ref(), Ok(value), "render/parse mismatch");
    }

    // With default options, everything serde_json accepts we accept too, with
    // the same content.
    if flags & 3 == 0 {
        if let Ok(theirs) = serde_json::from_slice::<Value>(input) {
            let value = ours.expect("serde_json accepted input that jsonbind rejected");
            let ours = serde_json::to_value(&value).unwrap();
            assert!(same(&ours, &theirs), "{ours} != {theirs}");
        }
    }
}

fuzz_target!(|data: &[u8]| parser(data));
