// Copyright 2026 - developers of the `tlcat` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use crate::{RawVec, BOOL_FALSE_ID, BOOL_TRUE_ID, VECTOR_ID};

/// This trait allows for concrete instances to be serialized into
/// binary data as specified by the [Binary Data Serialization].
///
/// [Binary Data Serialization]: https://core.telegram.org/mtproto/serialize
pub trait Serializable {
    /// Serializes the instance into the given buffer.
    fn serialize(&self, buf: &mut impl Extend<u8>);

    /// Convenience function to serialize the object into a new buffer
    /// and return its bytes. It is more efficient to reuse a buffer with
    /// [`Serializable::serialize`].
    fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = Vec::new();
        self.serialize(&mut buffer);
        buffer
    }
}

impl Serializable for bool {
    /// Serializes the boolean according to the following definitions:
    ///
    /// * `false` is serialized as `boolFalse#bc799737 = Bool;`.
    /// * `true` is serialized as `boolTrue#997275b5 = Bool;`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tlcat_codec::Serializable;
    ///
    /// assert_eq!(true.to_bytes(), [0xb5, 0x75, 0x72, 0x99]);
    /// assert_eq!(false.to_bytes(), [0x37, 0x97, 0x79, 0xbc]);
    /// ```
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        let id = if *self { BOOL_TRUE_ID } else { BOOL_FALSE_ID };
        id.serialize(buf)
    }
}

impl Serializable for i32 {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        buf.extend(self.to_le_bytes())
    }
}

impl Serializable for u32 {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        buf.extend(self.to_le_bytes())
    }
}

impl Serializable for i64 {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        buf.extend(self.to_le_bytes())
    }
}

impl Serializable for f64 {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        buf.extend(self.to_le_bytes())
    }
}

impl Serializable for [u8; 16] {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        buf.extend(self.iter().copied())
    }
}

impl Serializable for [u8; 32] {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        buf.extend(self.iter().copied())
    }
}

impl<T: Serializable> Serializable for Vec<T> {
    /// Serializes a boxed vector, with its `vector#1cb5c415` constructor.
    ///
    /// # Examples
    ///
    /// ```
    /// use tlcat_codec::Serializable;
    ///
    /// assert_eq!(vec![0x7f_i32].to_bytes(),
    ///            [0x15, 0xc4, 0xb5, 0x1c, 0x1, 0x0, 0x0, 0x0, 0x7f, 0x0, 0x0, 0x0]);
    /// ```
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        VECTOR_ID.serialize(buf);
        (self.len() as i32).serialize(buf);
        self.iter().for_each(|x| x.serialize(buf));
    }
}

impl<T: Serializable> Serializable for RawVec<T> {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        (self.0.len() as i32).serialize(buf);
        self.0.iter().for_each(|x| x.serialize(buf));
    }
}

impl Serializable for String {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.as_bytes().serialize(buf)
    }
}

impl Serializable for str {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.as_bytes().serialize(buf)
    }
}

/// The longest byte string whose length fits in the 3-byte prefix.
pub(crate) const MAX_BYTES_LEN: usize = (1 << 24) - 1;

impl Serializable for Vec<u8> {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self[..].serialize(buf)
    }
}

impl Serializable for [u8] {
    /// Serializes a byte-string, prefixed with its length and padded to a
    /// multiple of four bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// use tlcat_codec::Serializable;
    ///
    /// assert_eq!(b"Hi"[..].to_bytes(), [0x02, b'H', b'i', 0x00]);
    /// assert_eq!(b""[..].to_bytes(), [0x00, 0x00, 0x00, 0x00]);
    /// assert_eq!(vec![0u8; 254].to_bytes().len(), 4 + 254 + 2);
    /// ```
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        let len = self.len();
        let header_len = if len <= 253 {
            buf.extend([len as u8]);
            1
        } else {
            debug_assert!(len <= MAX_BYTES_LEN, "byte-strings cannot exceed 16 MiB");
            buf.extend([
                254,
                (len & 0xff) as u8,
                ((len >> 8) & 0xff) as u8,
                ((len >> 16) & 0xff) as u8,
            ]);
            4
        };
        let padding = (4 - (header_len + len) % 4) % 4;

        buf.extend(self.iter().copied());
        buf.extend(std::iter::repeat(0).take(padding));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Deserializable;

    #[test]
    fn byte_string_boundaries() {
        for len in [0usize, 1, 2, 3, 4, 253, 254, 255, 256, 65536] {
            let data = (0..len).map(|i| i as u8).collect::<Vec<_>>();
            let bytes = data.to_bytes();
            assert_eq!(bytes.len() % 4, 0, "length {} is not aligned", len);
            if len < 254 {
                assert_eq!(bytes[0] as usize, len);
            } else {
                assert_eq!(bytes[0], 254);
                let declared =
                    bytes[1] as usize | (bytes[2] as usize) << 8 | (bytes[3] as usize) << 16;
                assert_eq!(declared, len);
            }
            assert_eq!(Vec::<u8>::from_bytes(&bytes).unwrap(), data);
        }
    }

    #[test]
    fn bare_vector_has_no_constructor() {
        assert_eq!(
            RawVec(vec![1i64]).to_bytes(),
            [1, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0]
        );
    }
}
