#![no_main]
use std::cell::RefCell;

use arbitrary::Arbitrary;
use flatjson::{Document, ErrorCode, Token, count_tokens, parse, parse_into};
use libfuzzer_sys::{fuzz_mutator, fuzz_target, fuzzer_mutate};
use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};
use serde_json::{Map, Value};

const HEADER: usize = 1; // flags

thread_local! {
    static RNG: RefCell<SmallRng> = RefCell::new(SmallRng::from_os_rng());
}

static WS_TABLE: &[&[u8]] = &[b" ", b"\t", b"\n", b"\r"];

fn with_rng<F, R>(f: F) -> R
where
    F: FnOnce(&mut SmallRng) -> R,
{
    RNG.with(|cell| f(&mut cell.borrow_mut()))
}

/// Mostly lets libFuzzer mutate, but every tenth run replaces the input with
/// a valid document produced by `serde_json`, so deep structures get reached.
fn mutator(data: &mut [u8], size: usize, max_size: usize, seed: u32) -> usize {
    if size < HEADER || seed.is_multiple_of(10) {
        data[0] = with_rng(|rng| rng.next_u32() as u8);

        let limit = max_size - HEADER;
        let mut written = HEADER;
        written += append_whitespace(&mut data[written..], limit);
        written += append_value(&mut data[written..], size.max(16), max_size - written);
        written += append_whitespace(&mut data[written..], max_size - written);
        written
    } else {
        fuzzer_mutate(data, size, max_size)
    }
}

fn append_whitespace(buf: &mut [u8], limit: usize) -> usize {
    with_rng(|rng| {
        if limit == 0 {
            return 0;
        }
        let n = rng.random_range(0..=limit.min(4));
        for b in &mut buf[..n] {
            *b = WS_TABLE[rng.random_range(0..WS_TABLE.len())][0];
        }
        n
    })
}

fn append_value(data: &mut [u8], size: usize, limit: usize) -> usize {
    let value = loop {
        let s = with_rng(|rng| rng.random_range(size / 2..size * 2));
        let bytes: Vec<u8> = with_rng(|rng| (0..s).map(|_| rng.random::<u8>()).collect());
        if let Ok(value) = ArbitraryValue::arbitrary(&mut arbitrary::Unstructured::new(&bytes)) {
            break value;
        }
    };

    let serialized = serde_json::to_vec(&value.0).expect("Failed to serialize arbitrary value");

    // A cut-off document is still a useful input: it must come back Incomplete.
    let len = serialized.len().min(limit);
    data[..len].copy_from_slice(&serialized[..len]);
    len
}

fuzz_mutator!(|data: &mut [u8], size: usize, max_size: usize, seed: u32| {
    mutator(data, size, max_size, seed)
});

#[derive(Debug)]
struct ArbitraryValue(Value);

impl<'a> Arbitrary<'a> for ArbitraryValue {
    fn arbitrary(u: &mut arbitrary::Unstructured<'_>) -> arbitrary::Result<Self> {
        let value = match u.choose_index(21)? {
            0 => Value::Null,
            1 => Value::Bool(u.arbitrary()?),
            2 => {
                let n: f64 = u.arbitrary()?;
                Value::Number(
                    serde_json::Number::from_f64(n).ok_or(arbitrary::Error::IncorrectFormat)?,
                )
            }
            3 => Value::Number(serde_json::Number::from(u.arbitrary::<i64>()?)),
            4..=10 => Value::String(u.arbitrary()?),
            11..=15 => {
                let elems: Vec<ArbitraryValue> = u.arbitrary()?;
                Value::Array(elems.into_iter().map(|v| v.0).collect())
            }
            16..=20 => {
                let m: Vec<(String, ArbitraryValue)> = u.arbitrary()?;
                Value::Object(Map::from_iter(m.into_iter().map(|(k, v)| (k, v.0))))
            }
            _ => Err(arbitrary::Error::IncorrectFormat)?,
        };
        Ok(ArbitraryValue(value))
    }
}

fn check(data: &[u8]) {
    let Some((&flags, src)) = data.split_first() else {
        return;
    };

    let doc = parse(src);
    let counted = count_tokens(src);

    match (&counted, doc.parse_error()) {
        (Ok(count), None) => assert_eq!(*count, doc.token_count()),
        (Ok(_), Some(err)) => assert!(err.code.is_capacity(), "{err}"),
        (Err(a), Some(b)) => assert_eq!(a, b),
        (Err(err), None) => panic!("count failed with {err} but parse succeeded"),
    }

    // Everything serde_json accepts must load, unless a field width is hit.
    // flatjson additionally accepts `0x` numbers, which serde_json rejects.
    if serde_json::from_slice::<Value>(src).is_ok() {
        if let Some(err) = doc.parse_error() {
            assert!(err.code.is_capacity(), "serde_json accepted, flatjson failed: {err}");
        }
    }

    if !doc.is_valid() {
        return;
    }
    doc.assert_well_formed();

    // A dump at any indent re-parses to the same shape.
    let indent = usize::from(flags & 0x7);
    let dumped = doc.dump(indent);
    assert_eq!(dumped.len(), doc.dump_len(indent));
    let reparsed = parse(dumped.as_bytes());
    assert!(reparsed.is_valid(), "{:?}", reparsed.parse_error());
    assert_eq!(reparsed.token_count(), doc.token_count());
    assert_eq!(reparsed.dump(0), doc.dump(0));

    // Single-pass loading into reserved slots agrees with the two-pass load.
    let count = doc.token_count();
    if flags & 0x8 != 0 {
        let mut reserved = Document::with_capacity(count);
        assert_eq!(reserved.load(src), Ok(()));
        assert_eq!(reserved.tokens(), doc.tokens());

        if count > 1 {
            let mut short = vec![Token::default(); count - 1];
            assert_eq!(parse_into(src, &mut short).unwrap_err().code, ErrorCode::NoFreeTokens);
        }
    }

    // Every child is reachable by both walks.
    if doc.is_object() {
        for key in doc.keys() {
            assert!(doc.contains(key));
        }
    } else if doc.is_array() {
        for (i, child) in doc.children().enumerate() {
            assert_eq!(doc.at_index(i).unwrap().tokens(), child.tokens());
        }
    }
}

fuzz_target!(|data: &[u8]| check(data));
