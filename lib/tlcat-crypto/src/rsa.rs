// Copyright 2026 - developers of the `tlcat` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::error::Error;
use std::fmt;

use num_bigint::BigUint;
use sha1::{Digest, Sha1};
use tlcat_codec::Serializable;

use crate::hex;

/// The exponent nearly every RSA key uses, `0x010001`.
pub const DEFAULT_EXPONENT: u32 = 65537;

/// The reasons why a [`PublicKey`] cannot be built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyError {
    /// The modulus or exponent is not valid hexadecimal.
    InvalidHex,

    /// The modulus or exponent is not a valid decimal number.
    InvalidDecimal,

    /// The modulus or exponent is zero (or empty).
    Zero,
}

impl Error for KeyError {}

impl fmt::Display for KeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidHex => write!(f, "invalid hexadecimal key component"),
            Self::InvalidDecimal => write!(f, "invalid decimal key component"),
            Self::Zero => write!(f, "key components must not be zero"),
        }
    }
}

/// Calculates the fingerprint of an RSA public key, given the big-endian
/// bytes of its modulus and exponent.
///
/// Both are serialized as TL `bytes`, and the last 8 bytes of the SHA-1
/// of the result are returned in reverse order.
pub fn fingerprint(modulus: &[u8], exponent: &[u8]) -> [u8; 8] {
    let mut buffer = Vec::with_capacity(modulus.len() + exponent.len() + 8);
    modulus.serialize(&mut buffer);
    exponent.serialize(&mut buffer);

    let sha = {
        let mut hasher = Sha1::new();
        hasher.update(&buffer);
        hasher.finalize()
    };

    let mut result = [0u8; 8];
    result.copy_from_slice(&sha[12..20]);
    result.reverse();
    result
}

/// An RSA public key, as used by servers during the handshake.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey {
    n: BigUint,
    e: BigUint,
}

impl PublicKey {
    fn new(n: BigUint, e: BigUint) -> Result<Self, KeyError> {
        let zero = BigUint::default();
        if n == zero || e == zero {
            return Err(KeyError::Zero);
        }
        Ok(Self { n, e })
    }

    /// Builds a key from the big-endian bytes of its modulus and exponent.
    pub fn from_bytes(modulus: &[u8], exponent: &[u8]) -> Result<Self, KeyError> {
        Self::new(
            BigUint::from_bytes_be(modulus),
            BigUint::from_bytes_be(exponent),
        )
    }

    /// Builds a key from the hexadecimal representation of its modulus and
    /// exponent. See [`hex::from_hex`] for the accepted formats.
    pub fn from_hex(modulus: &str, exponent: &str) -> Result<Self, KeyError> {
        let n = hex::from_hex(modulus).ok_or(KeyError::InvalidHex)?;
        let e = hex::from_hex(exponent).ok_or(KeyError::InvalidHex)?;
        Self::from_bytes(&n, &e)
    }

    /// Builds a key from the decimal representation of its modulus and
    /// exponent.
    pub fn from_decimal(modulus: &str, exponent: &str) -> Result<Self, KeyError> {
        let parse = |digits: &str| {
            BigUint::parse_bytes(digits.trim().as_bytes(), 10).ok_or(KeyError::InvalidDecimal)
        };
        Self::new(parse(modulus)?, parse(exponent)?)
    }

    pub fn modulus(&self) -> &BigUint {
        &self.n
    }

    pub fn exponent(&self) -> &BigUint {
        &self.e
    }

    /// The fingerprint of this key, computed over the minimal big-endian
    /// representation of the modulus and exponent.
    pub fn fingerprint(&self) -> [u8; 8] {
        fingerprint(&self.n.to_bytes_be(), &self.e.to_bytes_be())
    }

    /// The fingerprint as the signed integer that is sent over the wire,
    /// such as in `resPQ.server_public_key_fingerprints`.
    pub fn fingerprint_id(&self) -> i64 {
        i64::from_be_bytes(self.fingerprint())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-bit RSA key 0x{}",
            self.n.bits(),
            hex::to_hex(&self.fingerprint())
        )
    }
}
