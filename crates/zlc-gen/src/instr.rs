//! Wire-format helpers for IFJcode24 text.

use std::fmt::Write;

/// Escapes a string for a `string@` literal.
///
/// The wire format forbids raw whitespace and control bytes, `#` and
/// `\`; each is emitted as a `\DDD` decimal triple. Everything else
/// passes through unchanged.
pub fn escape_string(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if c <= ' ' || c == '#' || c == '\\' {
            let _ = write!(out, "\\{:03}", c as u32);
        } else {
            out.push(c);
        }
    }
    out
}

/// Formats a float in C `%a` hexadecimal-significand form, which
/// round-trips exactly through the target interpreter.
///
/// Examples: `1.0` → `0x1p+0`, `2.5` → `0x1.4p+1`, `0.0` → `0x0p+0`.
pub fn hex_float(value: f64) -> String {
    if value == 0.0 {
        return if value.is_sign_negative() {
            "-0x0p+0".to_string()
        } else {
            "0x0p+0".to_string()
        };
    }

    let bits = value.to_bits();
    let sign = if bits >> 63 == 1 { "-" } else { "" };
    let exp_bits = ((bits >> 52) & 0x7ff) as i64;
    let mantissa = bits & 0x000f_ffff_ffff_ffff;

    // Subnormals have no implicit leading 1 and a fixed exponent.
    let (lead, exponent) = if exp_bits == 0 {
        (0u8, -1022i64)
    } else {
        (1u8, exp_bits - 1023)
    };

    if mantissa == 0 {
        return format!("{}0x{}p{:+}", sign, lead, exponent);
    }

    let mut digits = format!("{:013x}", mantissa);
    while digits.len() > 1 && digits.ends_with('0') {
        digits.pop();
    }
    format!("{}0x{}.{}p{:+}", sign, lead, digits, exponent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_replaces_forbidden_bytes() {
        assert_eq!(escape_string("a b"), "a\\032b");
        assert_eq!(escape_string("#"), "\\035");
        assert_eq!(escape_string("\\"), "\\092");
        assert_eq!(escape_string("\n"), "\\010");
        assert_eq!(escape_string("\t"), "\\009");
    }

    #[test]
    fn test_escape_passes_plain_text() {
        assert_eq!(escape_string("Hello"), "Hello");
        assert_eq!(escape_string(""), "");
        assert_eq!(escape_string("a+b=c"), "a+b=c");
    }

    #[test]
    fn test_escape_mixed() {
        assert_eq!(escape_string("Hello world\n"), "Hello\\032world\\010");
    }

    #[test]
    fn test_hex_float_powers_of_two() {
        assert_eq!(hex_float(1.0), "0x1p+0");
        assert_eq!(hex_float(2.0), "0x1p+1");
        assert_eq!(hex_float(0.5), "0x1p-1");
        assert_eq!(hex_float(0.0), "0x0p+0");
    }

    #[test]
    fn test_hex_float_with_fraction() {
        assert_eq!(hex_float(2.5), "0x1.4p+1");
        assert_eq!(hex_float(1.5), "0x1.8p+0");
        assert_eq!(hex_float(-1.5), "-0x1.8p+0");
        assert_eq!(hex_float(3.0), "0x1.8p+1");
    }

    #[test]
    fn test_hex_float_round_trips() {
        // The mantissa digits plus exponent reconstruct the value.
        for value in [3.14, 1e10, 2.5e-3, 123456.789, 0.1] {
            let text = hex_float(value);
            let parsed = parse_hex_float(&text);
            assert_eq!(parsed, value, "round trip failed for {}", text);
        }
    }

    /// Minimal %a parser for the round-trip test.
    fn parse_hex_float(text: &str) -> f64 {
        let (sign, rest) = match text.strip_prefix('-') {
            Some(rest) => (-1.0, rest),
            None => (1.0, text),
        };
        let rest = rest.strip_prefix("0x").expect("missing 0x prefix");
        let (mantissa_text, exp_text) = rest.split_once('p').expect("missing exponent");
        let exponent: i32 = exp_text.parse().expect("bad exponent");
        let (int_part, frac_part) = match mantissa_text.split_once('.') {
            Some((i, f)) => (i, f),
            None => (mantissa_text, ""),
        };
        let mut mantissa = u64::from_str_radix(int_part, 16).expect("bad digits") as f64;
        let mut scale = 1.0 / 16.0;
        for digit in frac_part.chars() {
            mantissa += digit.to_digit(16).expect("bad hex digit") as f64 * scale;
            scale /= 16.0;
        }
        sign * mantissa * 2f64.powi(exponent)
    }
}
