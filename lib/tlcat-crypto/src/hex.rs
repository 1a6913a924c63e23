// Copyright 2026 - developers of the `tlcat` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::fmt::Write;

/// Represent a sequence of bytes as a lowercase hexadecimal string.
pub fn to_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .fold(String::with_capacity(bytes.len() * 2), |mut result, b| {
            // Writing into a `String` cannot fail.
            let _ = write!(result, "{:02x}", b);
            result
        })
}

/// Convert a hexadecimal string into a sequence of bytes.
///
/// An optional `0x` prefix is allowed, and so are the `:` and whitespace
/// separators found in key dumps such as `openssl rsa -text` output.
///
/// # Examples
///
/// ```
/// use tlcat_crypto::hex::from_hex;
///
/// assert_eq!(from_hex("0x0100ff"), Some(vec![1, 0, 255]));
/// assert_eq!(from_hex("01:00:\n    ff"), Some(vec![1, 0, 255]));
/// assert_eq!(from_hex("abc"), None);
/// ```
pub fn from_hex(hex: &str) -> Option<Vec<u8>> {
    fn hex_to_decimal(hex_digit: u8) -> Option<u8> {
        Some(match hex_digit {
            b'0'..=b'9' => hex_digit - b'0',
            b'a'..=b'f' => hex_digit - b'a' + 0xa,
            b'A'..=b'F' => hex_digit - b'A' + 0xa,
            _ => return None,
        })
    }

    let hex = hex.trim();
    let hex = hex
        .strip_prefix("0x")
        .or_else(|| hex.strip_prefix("0X"))
        .unwrap_or(hex);

    let digits = hex
        .bytes()
        .filter(|&b| b != b':' && !b.is_ascii_whitespace())
        .map(hex_to_decimal)
        .collect::<Option<Vec<_>>>()?;

    if digits.len() % 2 != 0 {
        return None;
    }

    Some(digits.chunks_exact(2).map(|pair| pair[0] * 0x10 + pair[1]).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip() {
        let bytes = (0..=255).collect::<Vec<u8>>();
        assert_eq!(from_hex(&to_hex(&bytes)), Some(bytes));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(from_hex("zz"), None);
        assert_eq!(from_hex("0"), None);
        assert_eq!(from_hex(""), Some(Vec::new()));
    }
}
