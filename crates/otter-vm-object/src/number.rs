//! Pure numeric conversions
//!
//! Everything here is total and side-effect free: `Number::toString`,
//! `StringToNumber`, the integer wrap rules used by typed-array element
//! kinds and array-index canonicalization. Conversions that may call back
//! into user code live in [`crate::conversion`].

use num_bigint::{BigInt, Sign};
use num_traits::{FromPrimitive, ToPrimitive};
use smallvec::SmallVec;

const TWO_POW_32: f64 = 4_294_967_296.0;

/// Largest integer index a `PropertyKey::Index` may carry (2^32 - 2).
pub const MAX_ARRAY_INDEX: u32 = u32::MAX - 1;

/// 2^53 - 1
pub const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

// ---------------------------------------------------------------------------
// Number::toString
// ---------------------------------------------------------------------------

/// `Number::toString(x)` with radix 10.
pub fn number_to_string(x: f64) -> String {
    if x.is_nan() {
        return "NaN".to_string();
    }
    if x == 0.0 {
        return "0".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if x.fract() == 0.0 && x.abs() <= MAX_SAFE_INTEGER {
        let mut buf = itoa::Buffer::new();
        return buf.format(x as i64).to_string();
    }

    let mut out = String::new();
    if x < 0.0 {
        out.push('-');
    }
    let (digits, n) = shortest_digits(x.abs());
    let k = digits.len() as i32;
    let digit_str = |range: std::ops::Range<usize>| {
        digits[range].iter().map(|d| *d as char).collect::<String>()
    };

    if k <= n && n <= 21 {
        out.push_str(&digit_str(0..digits.len()));
        out.extend(std::iter::repeat_n('0', (n - k) as usize));
    } else if 0 < n && n <= 21 {
        out.push_str(&digit_str(0..n as usize));
        out.push('.');
        out.push_str(&digit_str(n as usize..digits.len()));
    } else if -6 < n && n <= 0 {
        out.push_str("0.");
        out.extend(std::iter::repeat_n('0', (-n) as usize));
        out.push_str(&digit_str(0..digits.len()));
    } else {
        let e = n - 1;
        out.push(digits[0] as char);
        if k > 1 {
            out.push('.');
            out.push_str(&digit_str(1..digits.len()));
        }
        out.push('e');
        out.push(if e >= 0 { '+' } else { '-' });
        let mut buf = itoa::Buffer::new();
        out.push_str(buf.format(e.unsigned_abs()));
    }
    out
}

/// `Number::toString(x, radix)` for radix 2..=36.
///
/// Non-decimal fractions are emitted digit by digit, at most 52 of them.
pub fn number_to_radix_string(x: f64, radix: u32) -> String {
    if radix == 10 || !x.is_finite() {
        return number_to_string(x);
    }
    let mut out = String::new();
    if x < 0.0 {
        out.push('-');
    }
    let x = x.abs();
    let int_part = x.trunc();
    out.push_str(&BigInt::from_f64(int_part).map_or_else(|| "0".to_string(), |b| b.to_str_radix(radix)));

    let mut frac = x - int_part;
    if frac > 0.0 {
        out.push('.');
        let mut count = 0;
        while frac > 0.0 && count < 52 {
            frac *= f64::from(radix);
            let digit = frac.trunc();
            frac -= digit;
            out.push(char::from_digit(digit as u32, radix).unwrap_or('0'));
            count += 1;
        }
    }
    out
}

/// Shortest round-trip decimal digits of a positive finite `v`, and the
/// exponent `n` such that `v = 0.d1d2...dk * 10^n`.
fn shortest_digits(v: f64) -> (SmallVec<[u8; 24]>, i32) {
    let mut buf = ryu::Buffer::new();
    let formatted = buf.format_finite(v);
    let (mantissa, exp) = match formatted.find('e') {
        Some(i) => (
            &formatted[..i],
            formatted[i + 1..].parse::<i32>().unwrap_or(0),
        ),
        None => (formatted, 0),
    };

    let mut digits: SmallVec<[u8; 24]> = SmallVec::new();
    let mut point = None;
    for b in mantissa.bytes() {
        if b == b'.' {
            point = Some(digits.len());
        } else {
            digits.push(b);
        }
    }
    let int_len = point.unwrap_or(digits.len()) as i32;
    let leading = digits.iter().take_while(|d| **d == b'0').count();
    digits.drain(..leading);
    while digits.last() == Some(&b'0') {
        digits.pop();
    }
    (digits, int_len - leading as i32 + exp)
}

// ---------------------------------------------------------------------------
// StringToNumber
// ---------------------------------------------------------------------------

/// `StrWhiteSpaceChar`: WhiteSpace plus LineTerminator.
pub fn is_str_whitespace(unit: u16) -> bool {
    matches!(
        unit,
        0x09 | 0x0A
            | 0x0B
            | 0x0C
            | 0x0D
            | 0x20
            | 0xA0
            | 0x1680
            | 0x2000..=0x200A
            | 0x2028
            | 0x2029
            | 0x202F
            | 0x205F
            | 0x3000
            | 0xFEFF
    )
}

/// `StringToNumber`: NaN on anything outside `StringNumericLiteral`.
pub fn string_to_number(units: &[u16]) -> f64 {
    let start = units.iter().position(|u| !is_str_whitespace(*u));
    let Some(start) = start else {
        return 0.0;
    };
    let end = units
        .iter()
        .rposition(|u| !is_str_whitespace(*u))
        .map_or(start, |i| i + 1);

    let mut text = String::with_capacity(end - start);
    for unit in &units[start..end] {
        if *unit > 0x7F {
            return f64::NAN;
        }
        text.push(*unit as u8 as char);
    }

    let bytes = text.as_bytes();
    if bytes.len() > 2 && bytes[0] == b'0' {
        let radix = match bytes[1] {
            b'x' | b'X' => Some(16),
            b'o' | b'O' => Some(8),
            b'b' | b'B' => Some(2),
            _ => None,
        };
        if let Some(radix) = radix {
            return parse_non_decimal(&bytes[2..], radix);
        }
    }

    let (negative, unsigned) = match bytes.first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text.as_str()),
    };
    if unsigned == "Infinity" {
        return if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }
    if !is_unsigned_decimal_literal(unsigned.as_bytes()) {
        return f64::NAN;
    }
    text.parse::<f64>().unwrap_or(f64::NAN)
}

fn parse_non_decimal(digits: &[u8], radix: u32) -> f64 {
    if digits.is_empty() || !digits.iter().all(|d| (*d as char).is_digit(radix)) {
        return f64::NAN;
    }
    BigInt::parse_bytes(digits, radix)
        .and_then(|b| b.to_f64())
        .unwrap_or(f64::NAN)
}

/// `StrUnsignedDecimalLiteral` without the `Infinity` alternative.
fn is_unsigned_decimal_literal(bytes: &[u8]) -> bool {
    let mut i = 0;
    let int_digits = count_digits(&bytes[i..]);
    i += int_digits;
    let mut frac_digits = 0;
    if bytes.get(i) == Some(&b'.') {
        i += 1;
        frac_digits = count_digits(&bytes[i..]);
        i += frac_digits;
    }
    if int_digits + frac_digits == 0 {
        return false;
    }
    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        i += 1;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let exp_digits = count_digits(&bytes[i..]);
        if exp_digits == 0 {
            return false;
        }
        i += exp_digits;
    }
    i == bytes.len()
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

// ---------------------------------------------------------------------------
// Integer conversions
// ---------------------------------------------------------------------------

/// `ToIntegerOrInfinity` applied to an already-converted number.
pub fn to_integer_or_infinity(n: f64) -> f64 {
    if n.is_nan() || n == 0.0 {
        0.0
    } else if n.is_infinite() {
        n
    } else {
        // trunc() keeps -0 for (-1, 0); callers expect +0.
        n.trunc() + 0.0
    }
}

/// Truncate and reduce modulo 2^bits into `[0, 2^bits)`.
fn modulo_pow2(n: f64, bits: u32) -> f64 {
    if !n.is_finite() || n == 0.0 {
        return 0.0;
    }
    let modulus = 2f64.powi(bits as i32);
    let r = n.trunc() % modulus;
    if r < 0.0 { r + modulus } else { r + 0.0 }
}

/// `ToInt32`
pub fn to_int32(n: f64) -> i32 {
    let m = modulo_pow2(n, 32);
    if m >= TWO_POW_32 / 2.0 {
        (m - TWO_POW_32) as i32
    } else {
        m as i32
    }
}

/// `ToUint32`
pub fn to_uint32(n: f64) -> u32 {
    modulo_pow2(n, 32) as u32
}

/// `ToInt16`
pub fn to_int16(n: f64) -> i16 {
    modulo_pow2(n, 16) as u16 as i16
}

/// `ToUint16`
pub fn to_uint16(n: f64) -> u16 {
    modulo_pow2(n, 16) as u16
}

/// `ToInt8`
pub fn to_int8(n: f64) -> i8 {
    modulo_pow2(n, 8) as u8 as i8
}

/// `ToUint8`
pub fn to_uint8(n: f64) -> u8 {
    modulo_pow2(n, 8) as u8
}

/// `ToUint8Clamp`: clamp to `[0, 255]`, rounding half to even.
pub fn to_uint8_clamp(n: f64) -> u8 {
    if n.is_nan() || n <= 0.0 {
        return 0;
    }
    if n >= 255.0 {
        return 255;
    }
    let f = n.floor();
    if f + 0.5 < n {
        return (f + 1.0) as u8;
    }
    if n < f + 0.5 {
        return f as u8;
    }
    if f as u8 % 2 == 0 { f as u8 } else { f as u8 + 1 }
}

/// `BigInt` reduced modulo 2^64, as raw bits.
pub fn bigint_to_u64_wrapping(b: &BigInt) -> u64 {
    let modulus = BigInt::from(1u128 << 64);
    let mut r = b % &modulus;
    if r.sign() == Sign::Minus {
        r += &modulus;
    }
    r.to_u64().unwrap_or(0)
}

/// `ToBigInt64` on an already-converted BigInt
pub fn bigint_to_i64_wrapping(b: &BigInt) -> i64 {
    bigint_to_u64_wrapping(b) as i64
}

// ---------------------------------------------------------------------------
// Array indices
// ---------------------------------------------------------------------------

/// Parse a canonical array index: decimal digits, no leading zero (except
/// `"0"` itself), value at most 2^32 - 2.
pub fn parse_array_index(units: &[u16]) -> Option<u32> {
    if units.is_empty() || units.len() > 10 {
        return None;
    }
    if units.len() > 1 && units[0] == u16::from(b'0') {
        return None;
    }
    let mut value: u64 = 0;
    for unit in units {
        let digit = unit.checked_sub(u16::from(b'0')).filter(|d| *d <= 9)?;
        value = value * 10 + u64::from(digit);
    }
    if value <= u64::from(MAX_ARRAY_INDEX) {
        Some(value as u32)
    } else {
        None
    }
}

/// The array index a number denotes, if it is one (`-0` denotes index 0).
pub fn number_to_array_index(n: f64) -> Option<u32> {
    if n >= 0.0 && n <= f64::from(MAX_ARRAY_INDEX) && n.fract() == 0.0 {
        Some(n as u32)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16(s: &str) -> Vec<u16> {
        s.encode_utf16().collect()
    }

    #[test]
    fn test_number_to_radix_string() {
        assert_eq!(number_to_radix_string(255.0, 16), "ff");
        assert_eq!(number_to_radix_string(-10.0, 2), "-1010");
        assert_eq!(number_to_radix_string(2.25, 4), "2.1");
        assert_eq!(number_to_radix_string(0.5, 2), "0.1");
        assert_eq!(number_to_radix_string(f64::NAN, 2), "NaN");
        assert_eq!(number_to_radix_string(1.5, 10), "1.5");
    }

    #[test]
    fn test_number_to_string_integers() {
        assert_eq!(number_to_string(0.0), "0");
        assert_eq!(number_to_string(-0.0), "0");
        assert_eq!(number_to_string(42.0), "42");
        assert_eq!(number_to_string(-7.0), "-7");
        assert_eq!(number_to_string(1e20), "100000000000000000000");
        assert_eq!(number_to_string(1e21), "1e+21");
    }

    #[test]
    fn test_number_to_string_fractions() {
        assert_eq!(number_to_string(0.1), "0.1");
        assert_eq!(number_to_string(1.5), "1.5");
        assert_eq!(number_to_string(0.000001), "0.000001");
        assert_eq!(number_to_string(1e-7), "1e-7");
        assert_eq!(number_to_string(1.5e-7), "1.5e-7");
        assert_eq!(number_to_string(123.456), "123.456");
        assert_eq!(number_to_string(1.2345e25), "1.2345e+25");
    }

    #[test]
    fn test_number_to_string_special() {
        assert_eq!(number_to_string(f64::NAN), "NaN");
        assert_eq!(number_to_string(f64::INFINITY), "Infinity");
        assert_eq!(number_to_string(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn test_string_to_number() {
        assert_eq!(string_to_number(&utf16("")), 0.0);
        assert_eq!(string_to_number(&utf16("  \n\t ")), 0.0);
        assert_eq!(string_to_number(&utf16(" 42 ")), 42.0);
        assert_eq!(string_to_number(&utf16("-1.5e3")), -1500.0);
        assert_eq!(string_to_number(&utf16(".5")), 0.5);
        assert_eq!(string_to_number(&utf16("5.")), 5.0);
        assert_eq!(string_to_number(&utf16("0x1F")), 31.0);
        assert_eq!(string_to_number(&utf16("0b101")), 5.0);
        assert_eq!(string_to_number(&utf16("0o17")), 15.0);
        assert_eq!(string_to_number(&utf16("-Infinity")), f64::NEG_INFINITY);
        assert!(string_to_number(&utf16("\u{FEFF}7\u{2028}")) == 7.0);
    }

    #[test]
    fn test_string_to_number_rejects() {
        for bad in ["abc", "1_000", "0x", "-0x10", "1e", "inf", "NaN", ".", "1 2", "0x1_0"] {
            assert!(string_to_number(&utf16(bad)).is_nan(), "{bad}");
        }
    }

    #[test]
    fn test_int32_wraparound() {
        assert_eq!(to_int32(2147483648.0), -2147483648);
        assert_eq!(to_int32(4294967296.0), 0);
        assert_eq!(to_int32(-1.0), -1);
        assert_eq!(to_int32(f64::NAN), 0);
        assert_eq!(to_int32(1e20), 1661992960);
        assert_eq!(to_uint32(-1.0), 4294967295);
        assert_eq!(to_uint32(3.9), 3);
    }

    #[test]
    fn test_small_wraps() {
        assert_eq!(to_uint8(256.0), 0);
        assert_eq!(to_uint8(-1.0), 255);
        assert_eq!(to_int8(128.0), -128);
        assert_eq!(to_int8(255.0), -1);
        assert_eq!(to_int16(32768.0), -32768);
        assert_eq!(to_uint16(65537.0), 1);
        assert_eq!(to_uint8(-0.5), 0);
    }

    #[test]
    fn test_uint8_clamp() {
        assert_eq!(to_uint8_clamp(300.0), 255);
        assert_eq!(to_uint8_clamp(-5.0), 0);
        assert_eq!(to_uint8_clamp(0.5), 0);
        assert_eq!(to_uint8_clamp(1.5), 2);
        assert_eq!(to_uint8_clamp(2.5), 2);
        assert_eq!(to_uint8_clamp(2.6), 3);
        assert_eq!(to_uint8_clamp(f64::NAN), 0);
        assert_eq!(to_uint8_clamp(f64::INFINITY), 255);
    }

    #[test]
    fn test_bigint_wrapping() {
        assert_eq!(bigint_to_i64_wrapping(&BigInt::from(-1)), -1);
        assert_eq!(bigint_to_u64_wrapping(&BigInt::from(-1)), u64::MAX);
        let big = BigInt::from(1u128 << 64) + 5;
        assert_eq!(bigint_to_u64_wrapping(&big), 5);
        let half = BigInt::from(1u128 << 63);
        assert_eq!(bigint_to_i64_wrapping(&half), i64::MIN);
    }

    #[test]
    fn test_array_index_parsing() {
        assert_eq!(parse_array_index(&utf16("0")), Some(0));
        assert_eq!(parse_array_index(&utf16("4294967294")), Some(4294967294));
        assert_eq!(parse_array_index(&utf16("4294967295")), None);
        assert_eq!(parse_array_index(&utf16("01")), None);
        assert_eq!(parse_array_index(&utf16("-0")), None);
        assert_eq!(parse_array_index(&utf16("1.0")), None);
        assert_eq!(parse_array_index(&utf16("")), None);
        assert_eq!(number_to_array_index(-0.0), Some(0));
        assert_eq!(number_to_array_index(1.5), None);
        assert_eq!(number_to_array_index(4294967295.0), None);
    }
}
