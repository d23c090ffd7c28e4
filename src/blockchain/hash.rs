use std::io;

use serde::Serialize;
use serde_json::ser::Formatter;
use sha2::{Digest, Sha256};

use super::Block;

/// Hex-encoded SHA-256 of the block's canonical JSON form.
pub fn hash_block(block: &Block) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_json(block));
    hex::encode(hasher.finalize())
}

/// Canonical JSON bytes of any serializable value: object keys sorted at
/// every level, `", "` / `": "` separators, non-ASCII escaped as `\uXXXX`
/// and floats laid out like Python's `repr`. This is byte-for-byte what
/// `json.dumps(value, sort_keys=True)` emits, so nodes in other runtimes
/// agree on hashes.
pub fn canonical_json<T: Serialize>(value: &T) -> Vec<u8> {
    // serde_json::Map is BTreeMap-backed, so going through Value sorts keys
    let value = serde_json::to_value(value).expect("value must be representable as JSON");
    let mut out = Vec::with_capacity(128);
    let mut ser = serde_json::Serializer::with_formatter(&mut out, CanonicalFormatter);
    value
        .serialize(&mut ser)
        .expect("writing JSON into a Vec cannot fail");
    out
}

struct CanonicalFormatter;

impl Formatter for CanonicalFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_f64<W>(&mut self, writer: &mut W, value: f64) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(python_float_repr(value).as_bytes())
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if fragment.is_ascii() {
            return writer.write_all(fragment.as_bytes());
        }
        let mut units = [0u16; 2];
        for ch in fragment.chars() {
            if ch.is_ascii() {
                writer.write_all(&[ch as u8])?;
            } else {
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }
}

/// Shortest round-trip digits, positioned the way Python's `repr` does:
/// fixed notation for decimal exponents in `-4..16`, otherwise `d.ddde±XX`.
fn python_float_repr(value: f64) -> String {
    let sci = format!("{value:e}");
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let Ok(exp) = exp.parse::<i32>() else {
        return sci;
    };
    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    if (-4..16).contains(&exp) {
        if exp < 0 {
            let zeros = "0".repeat((-exp - 1) as usize);
            return format!("{sign}0.{zeros}{digits}");
        }
        let point = exp as usize + 1;
        if digits.len() <= point {
            let zeros = "0".repeat(point - digits.len());
            format!("{sign}{digits}{zeros}.0")
        } else {
            format!("{sign}{}.{}", &digits[..point], &digits[point..])
        }
    } else {
        let exp_sign = if exp < 0 { '-' } else { '+' };
        let mantissa = if digits.len() == 1 {
            digits
        } else {
            format!("{}.{}", &digits[..1], &digits[1..])
        };
        format!("{sign}{mantissa}e{exp_sign}{:02}", exp.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::Transaction;

    fn fixed_genesis() -> Block {
        Block {
            index: 1,
            timestamp: 1_700_000_000.5,
            transactions: Vec::new(),
            proof: 100,
            previous_hash: "1".into(),
        }
    }

    #[test]
    fn canonical_json_sorts_keys_and_spaces_separators() {
        let json = canonical_json(&fixed_genesis());
        assert_eq!(
            String::from_utf8(json).unwrap(),
            r#"{"index": 1, "previous_hash": "1", "proof": 100, "timestamp": 1700000000.5, "transactions": []}"#
        );
    }

    #[test]
    fn hash_matches_known_vector() {
        assert_eq!(
            hash_block(&fixed_genesis()),
            "7dd0b05c7a6aafba30a3d6c7102d235385a934972e4c066bcea9f6adcbae98f2"
        );
    }

    #[test]
    fn transaction_digest_matches_known_vector() {
        let tx = Transaction::new("0", "Alice", 1);
        let digest = hex::encode(Sha256::digest(canonical_json(&tx)));
        assert_eq!(
            digest,
            "79376043869ddc89a95ab3985d97a64b4e6ccac5477846e6032695a6e41139e8"
        );
    }

    #[test]
    fn hash_is_deterministic_and_hex() {
        let b = fixed_genesis();
        let h = hash_block(&b);
        assert_eq!(h, hash_block(&b.clone()));
        assert_eq!(h.len(), 64);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn field_declaration_order_does_not_matter() {
        #[derive(Serialize)]
        struct Shuffled<'a> {
            transactions: &'a [Transaction],
            previous_hash: &'a str,
            timestamp: f64,
            proof: u64,
            index: u64,
        }

        let b = Block {
            transactions: vec![Transaction::new("0", "Alice", 1)],
            ..fixed_genesis()
        };
        let shuffled = Shuffled {
            transactions: &b.transactions,
            previous_hash: &b.previous_hash,
            timestamp: b.timestamp,
            proof: b.proof,
            index: b.index,
        };
        assert_eq!(canonical_json(&b), canonical_json(&shuffled));
    }

    #[test]
    fn floats_use_python_repr_layout() {
        let v = serde_json::json!({
            "amount": 0.00001,
            "b": 1e16,
            "c": 1.5,
            "d": -2.5e-7,
            "e": 1e15,
            "f": 0.0001,
            "g": 1.7e308,
        });
        assert_eq!(
            String::from_utf8(canonical_json(&v)).unwrap(),
            r#"{"amount": 1e-05, "b": 1e+16, "c": 1.5, "d": -2.5e-07, "e": 1000000000000000.0, "f": 0.0001, "g": 1.7e+308}"#
        );
    }

    #[test]
    fn float_repr_edge_cases() {
        assert_eq!(python_float_repr(0.0), "0.0");
        assert_eq!(python_float_repr(-0.0), "-0.0");
        assert_eq!(python_float_repr(100.0), "100.0");
        assert_eq!(python_float_repr(0.1), "0.1");
        assert_eq!(python_float_repr(1_700_000_000.5), "1700000000.5");
        assert_eq!(python_float_repr(123456789012345678.0), "1.2345678901234568e+17");
        assert_eq!(python_float_repr(5e-324), "5e-324");
    }

    #[test]
    fn non_ascii_is_escaped() {
        let v = serde_json::json!({ "b": "é", "a": [1, 2], "c": "😀" });
        assert_eq!(
            String::from_utf8(canonical_json(&v)).unwrap(),
            r#"{"a": [1, 2], "b": "\u00e9", "c": "\ud83d\ude00"}"#
        );
    }
}
