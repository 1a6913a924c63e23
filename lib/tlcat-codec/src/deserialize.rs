// Copyright 2026 - developers of the `tlcat` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use crate::errors::DecodeError;
use crate::{RawVec, BOOL_FALSE_ID, BOOL_TRUE_ID, TRUE_ID, VECTOR_ID};

pub type Result<T> = std::result::Result<T, DecodeError>;

/// A read position over an in-memory buffer.
///
/// Every read is bounds-checked, and reading past the end fails with
/// [`DecodeError::Truncated`] without moving the position.
#[derive(Clone, Debug)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn from_slice(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// The amount of bytes consumed so far.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// The amount of bytes left to read.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub(crate) fn rewind(&mut self, pos: usize) {
        debug_assert!(pos <= self.buf.len());
        self.pos = pos;
    }

    pub fn read_byte(&mut self) -> Result<u8> {
        let byte = *self.buf.get(self.pos).ok_or(DecodeError::Truncated)?;
        self.pos += 1;
        Ok(byte)
    }

    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        buf.copy_from_slice(self.read_slice(buf.len())?);
        Ok(())
    }

    /// Borrows the next `len` bytes from the underlying buffer.
    pub fn read_slice(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(DecodeError::Truncated);
        }
        let slice = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    /// Discards the next `len` bytes without looking at them.
    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.read_slice(len).map(drop)
    }
}

/// This trait allows for data serialized according to the
/// [Binary Data Serialization] to be deserialized into concrete instances.
///
/// [Binary Data Serialization]: https://core.telegram.org/mtproto/serialize
pub trait Deserializable {
    /// Deserializes an instance of the type from a given buffer.
    fn deserialize(buf: &mut Cursor) -> Result<Self>
    where
        Self: std::marker::Sized;

    /// Convenience function to deserialize an instance from a given buffer.
    ///
    /// # Examples
    ///
    /// ```
    /// use tlcat_codec::Deserializable;
    ///
    /// assert_eq!(bool::from_bytes(&[0x37, 0x97, 0x79, 0xbc]).unwrap(), false);
    /// ```
    fn from_bytes(buf: &[u8]) -> Result<Self>
    where
        Self: std::marker::Sized,
    {
        Self::deserialize(&mut Cursor::from_slice(buf))
    }
}

impl Deserializable for bool {
    /// Deserializes a boolean according to the following definitions:
    ///
    /// * `boolFalse#bc799737 = Bool;` deserializes into `false`.
    /// * `boolTrue#997275b5 = Bool;` deserializes into `true`.
    /// * `true#3fedd339 = True;` is also accepted as `true`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tlcat_codec::Deserializable;
    ///
    /// assert_eq!(bool::from_bytes(&[0xb5, 0x75, 0x72, 0x99]).unwrap(), true);
    /// assert_eq!(bool::from_bytes(&[0x37, 0x97, 0x79, 0xbc]).unwrap(), false);
    /// ```
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        let id = u32::deserialize(buf)?;
        match id {
            BOOL_TRUE_ID | TRUE_ID => Ok(true),
            BOOL_FALSE_ID => Ok(false),
            _ => Err(DecodeError::UnexpectedConstructor {
                expected: "Bool".into(),
                id,
            }),
        }
    }
}

impl Deserializable for i32 {
    /// Deserializes a 32-bit signed integer according to the following
    /// definition:
    ///
    /// * `int ? = Int;`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tlcat_codec::Deserializable;
    ///
    /// assert_eq!(i32::from_bytes(&[0x01, 0x00, 0x00, 0x00]).unwrap(), 1i32);
    /// assert_eq!(i32::from_bytes(&[0xff, 0xff, 0xff, 0xff]).unwrap(), -1i32);
    /// assert_eq!(i32::from_bytes(&[0x00, 0x00, 0x00, 0x80]).unwrap(), i32::MIN);
    /// ```
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        let mut buffer = [0u8; 4];
        buf.read_exact(&mut buffer)?;
        Ok(Self::from_le_bytes(buffer))
    }
}

impl Deserializable for u32 {
    /// Deserializes a 32-bit unsigned integer, which is how constructor
    /// identifiers and flags are read.
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        let mut buffer = [0u8; 4];
        buf.read_exact(&mut buffer)?;
        Ok(Self::from_le_bytes(buffer))
    }
}

impl Deserializable for i64 {
    /// Deserializes a 64-bit signed integer according to the following
    /// definition:
    ///
    /// * `long ? = Long;`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tlcat_codec::Deserializable;
    ///
    /// assert_eq!(i64::from_bytes(&[0x1, 0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0x0]).unwrap(), 1i64);
    /// assert_eq!(i64::from_bytes(&[0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x7f]).unwrap(), i64::MAX);
    /// ```
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        let mut buffer = [0u8; 8];
        buf.read_exact(&mut buffer)?;
        Ok(Self::from_le_bytes(buffer))
    }
}

impl Deserializable for [u8; 16] {
    /// Deserializes the 128-bit integer according to the following
    /// definition:
    ///
    /// * `int128 4*[ int ] = Int128;`.
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        let mut buffer = [0u8; 16];
        buf.read_exact(&mut buffer)?;
        Ok(buffer)
    }
}

impl Deserializable for [u8; 32] {
    /// Deserializes the 256-bit integer according to the following
    /// definition:
    ///
    /// * `int256 8*[ int ] = Int256;`.
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        let mut buffer = [0u8; 32];
        buf.read_exact(&mut buffer)?;
        Ok(buffer)
    }
}

impl Deserializable for f64 {
    /// Deserializes a 64-bit floating point according to the
    /// following definition:
    ///
    /// * `double ? = Double;`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tlcat_codec::Deserializable;
    ///
    /// assert_eq!(f64::from_bytes(&[0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0xf8, 0x3f]).unwrap(), 1.5f64);
    /// assert_eq!(f64::from_bytes(&[0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0xf0, 0xff]).unwrap(), f64::NEG_INFINITY);
    /// ```
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        let mut buffer = [0u8; 8];
        buf.read_exact(&mut buffer)?;
        Ok(Self::from_le_bytes(buffer))
    }
}

/// Reads a vector length and makes sure that many elements, of at least
/// `min_size` bytes each, can still be present in the buffer.
pub(crate) fn read_vector_len(buf: &mut Cursor, min_size: usize) -> Result<usize> {
    let len = u32::deserialize(buf)? as usize;
    let remaining = buf.remaining();
    if len.saturating_mul(min_size) > remaining {
        return Err(DecodeError::MalformedLength {
            declared: len,
            remaining,
        });
    }
    Ok(len)
}

impl<T: Deserializable> Deserializable for Vec<T> {
    /// Deserializes a vector of deserializable items according to the
    /// following definition:
    ///
    /// * `vector#1cb5c415 {t:Type} # [ t ] = Vector t;`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tlcat_codec::Deserializable;
    ///
    /// assert_eq!(Vec::<i32>::from_bytes(&[0x15, 0xc4, 0xb5, 0x1c, 0x0, 0x0, 0x0, 0x0]).unwrap(), Vec::new());
    /// assert_eq!(Vec::<i32>::from_bytes(&[0x15, 0xc4, 0xb5, 0x1c, 0x1, 0x0, 0x0, 0x0, 0x7f, 0x0, 0x0, 0x0]).unwrap(),
    ///            vec![0x7f_i32]);
    /// ```
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        let id = u32::deserialize(buf)?;
        if id != VECTOR_ID {
            return Err(DecodeError::UnexpectedConstructor {
                expected: "Vector".into(),
                id,
            });
        }
        Ok(RawVec::<T>::deserialize(buf)?.0)
    }
}

impl<T: Deserializable> Deserializable for RawVec<T> {
    /// Deserializes a bare vector, which lacks the leading constructor.
    ///
    /// # Examples
    ///
    /// ```
    /// use tlcat_codec::{RawVec, Deserializable};
    ///
    /// assert_eq!(RawVec::<i32>::from_bytes(&[0x1, 0x0, 0x0, 0x0, 0x7f, 0x0, 0x0, 0x0]).unwrap().0, vec![0x7f_i32]);
    /// ```
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        // Every element occupies at least a single byte.
        let len = read_vector_len(buf, 1)?;
        (0..len)
            .map(|_| T::deserialize(buf))
            .collect::<Result<Vec<T>>>()
            .map(Self)
    }
}

impl Deserializable for String {
    /// Deserializes a UTF-8 string according to the following definition:
    ///
    /// * `string ? = String;`.
    ///
    /// Invalid UTF-8 sequences are replaced, use `Vec<u8>` to read the
    /// exact bytes instead.
    ///
    /// # Examples
    ///
    /// ```
    /// use tlcat_codec::Deserializable;
    ///
    /// assert_eq!(String::from_bytes(&[0x03, b'H', b'i', b'!']).unwrap(), "Hi!");
    /// assert_eq!(String::from_bytes(&[0x05, b'H', b'e', b'l', b'l', b'o', 0, 0]).unwrap(), "Hello");
    /// ```
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        Ok(String::from_utf8_lossy(&Vec::<u8>::deserialize(buf)?).into())
    }
}

impl Deserializable for Vec<u8> {
    /// Deserializes a vector of bytes as a byte-string according to the
    /// following definition:
    ///
    /// * `string ? = String;`.
    ///
    /// Lengths below 254 take a single byte. Longer ones are marked with
    /// `0xfe` and followed by the length in three little-endian bytes. The
    /// data is then padded with up to three bytes to a multiple of four.
    ///
    /// # Examples
    ///
    /// ```
    /// use tlcat_codec::Deserializable;
    ///
    /// assert_eq!(Vec::<u8>::from_bytes(&[0x00, 0x00, 0x00, 0x00]).unwrap(), Vec::new());
    /// assert_eq!(Vec::<u8>::from_bytes(&[0x01, 0x7f, 0x00, 0x00]).unwrap(), vec![0x7f_u8]);
    /// ```
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        let first_byte = buf.read_byte()?;
        let (len, header_len) = match first_byte {
            254 => {
                let mut buffer = [0u8; 3];
                buf.read_exact(&mut buffer)?;
                let len = (buffer[0] as usize)
                    | ((buffer[1] as usize) << 8)
                    | ((buffer[2] as usize) << 16);
                (len, 4)
            }
            255 => {
                return Err(DecodeError::MalformedLength {
                    declared: 255,
                    remaining: buf.remaining(),
                })
            }
            len => (len as usize, 1),
        };

        let result = buf.read_slice(len)?.to_vec();
        // The padding content is irrelevant, only its length matters.
        buf.skip((4 - (header_len + len) % 4) % 4)?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string_bytes(data: &[u8], prefix: &[u8], suffix: &[u8]) -> Vec<u8> {
        let mut tmp = prefix.to_vec();
        tmp.extend(data);
        tmp.extend(suffix);
        tmp
    }

    #[test]
    fn read_long_string() {
        let data = vec![b'a'; 273];
        let bytes = string_bytes(&data, &[0xfe, 0x11, 0x01, 0x00], &[0x00, 0x00, 0x00]);
        let mut cursor = Cursor::from_slice(&bytes);
        assert_eq!(Vec::<u8>::deserialize(&mut cursor).unwrap(), data);
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn padding_is_not_validated() {
        let bytes = [0x02, b'H', b'i', 0xaa];
        assert_eq!(Vec::<u8>::from_bytes(&bytes).unwrap(), b"Hi");
    }

    #[test]
    fn missing_padding_is_truncated() {
        assert_eq!(
            Vec::<u8>::from_bytes(&[0x02, b'H', b'i']),
            Err(DecodeError::Truncated)
        );
    }

    #[test]
    fn declared_length_past_end_is_truncated() {
        assert_eq!(
            Vec::<u8>::from_bytes(&[0x09, b'a', b'b', b'c']),
            Err(DecodeError::Truncated)
        );
        assert_eq!(
            Vec::<u8>::from_bytes(&[0xfe, 0x00, 0x01, 0x00, 0x00, 0x00]),
            Err(DecodeError::Truncated)
        );
    }

    #[test]
    fn reserved_length_byte() {
        assert!(matches!(
            Vec::<u8>::from_bytes(&[0xff, 0x00, 0x00, 0x00]),
            Err(DecodeError::MalformedLength { declared: 255, .. })
        ));
    }

    #[test]
    fn failed_read_keeps_position() {
        let bytes = [0x01, 0x02];
        let mut cursor = Cursor::from_slice(&bytes);
        assert_eq!(i32::deserialize(&mut cursor), Err(DecodeError::Truncated));
        assert_eq!(cursor.pos(), 0);
    }

    #[test]
    fn impossible_vector_count() {
        let bytes = [0x15, 0xc4, 0xb5, 0x1c, 0xff, 0xff, 0xff, 0x7f];
        assert!(matches!(
            Vec::<i64>::from_bytes(&bytes),
            Err(DecodeError::MalformedLength { .. })
        ));
    }

    #[test]
    fn bool_rejects_other_constructors() {
        assert_eq!(
            bool::from_bytes(&[0x15, 0xc4, 0xb5, 0x1c]),
            Err(DecodeError::UnexpectedConstructor {
                expected: "Bool".into(),
                id: VECTOR_ID
            })
        );
        assert_eq!(bool::from_bytes(&[0x39, 0xd3, 0xed, 0x3f]), Ok(true));
    }
}
