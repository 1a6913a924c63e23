// Copyright 2026 - developers of the `tlcat` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::{debug, trace, warn};

use crate::deserialize::{read_vector_len, Cursor, Deserializable};
use crate::errors::{DecodeError, EncodeError};
use crate::schema::{Category, Constructor, FieldType, Schema};
use crate::serialize::{Serializable, MAX_BYTES_LEN};
use crate::value::{Field, Object, TlValue};
use crate::{BOOL_FALSE_ID, BOOL_TRUE_ID, GZIP_PACKED_ID, NULL_ID, VECTOR_ID};

/// The default nesting limit for objects and vectors.
const DEFAULT_MAX_DEPTH: usize = 64;

/// The default limit for the size of a decompressed `gzip_packed` object.
const DEFAULT_MAX_UNPACKED_LEN: usize = 64 * 1024 * 1024;

type DecodeResult<T> = Result<T, DecodeError>;
type EncodeResult<T> = Result<T, EncodeError>;

/// A builder to configure [`Codec`] instances.
///
/// Use the [`Codec::build`] method to create builder instances.
pub struct CodecBuilder {
    schema: Schema,
    max_depth: usize,
    unpack_gzip: bool,
    max_unpacked_len: usize,
}

/// Reads and writes [`TlValue`]s following the layouts of a [`Schema`].
///
/// Decoding never returns partial values. When it fails, the input cursor
/// is left exactly where it was.
pub struct Codec {
    schema: Schema,
    max_depth: usize,
    unpack_gzip: bool,
    max_unpacked_len: usize,
}

impl CodecBuilder {
    /// Configures how deeply objects and vectors may be nested before the
    /// input is rejected with [`DecodeError::TooDeep`].
    ///
    /// The default value is 64.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Whether `gzip_packed` objects should be decompressed and replaced
    /// by the value they contain.
    ///
    /// When disabled, they are only understood if the schema itself has a
    /// definition for them.
    ///
    /// The default value is `true`.
    pub fn unpack_gzip(mut self, unpack_gzip: bool) -> Self {
        self.unpack_gzip = unpack_gzip;
        self
    }

    /// Configures how many bytes a single `gzip_packed` object may expand
    /// to before the input is rejected with [`DecodeError::UnpackedTooLarge`].
    ///
    /// The default value is 64 MiB.
    pub fn max_unpacked_len(mut self, max_unpacked_len: usize) -> Self {
        self.max_unpacked_len = max_unpacked_len;
        self
    }

    /// Finishes the builder and returns the `Codec` instance with all
    /// the configuration changes applied.
    pub fn finish(self) -> Codec {
        Codec {
            schema: self.schema,
            max_depth: self.max_depth,
            unpack_gzip: self.unpack_gzip,
            max_unpacked_len: self.max_unpacked_len,
        }
    }
}

impl Codec {
    /// Start building a new `Codec` instance.
    pub fn build(schema: Schema) -> CodecBuilder {
        CodecBuilder {
            schema,
            max_depth: DEFAULT_MAX_DEPTH,
            unpack_gzip: true,
            max_unpacked_len: DEFAULT_MAX_UNPACKED_LEN,
        }
    }

    /// Creates a new instance with default settings.
    pub fn new(schema: Schema) -> Self {
        Self::build(schema).finish()
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Decodes a single boxed value from the start of the buffer. Any data
    /// after it is ignored.
    pub fn decode(&self, buf: &[u8]) -> DecodeResult<TlValue> {
        self.decode_from(&mut Cursor::from_slice(buf))
    }

    /// Decodes a single boxed value, leaving the cursor right after it.
    ///
    /// On failure, the cursor is left where it was.
    pub fn decode_from(&self, buf: &mut Cursor) -> DecodeResult<TlValue> {
        atomically(buf, |buf| self.read_boxed(buf, None, 0))
    }

    /// Decodes a single boxed value which must span the whole buffer.
    pub fn decode_exact(&self, buf: &[u8]) -> DecodeResult<TlValue> {
        let mut cursor = Cursor::from_slice(buf);
        let value = self.decode_from(&mut cursor)?;
        match cursor.remaining() {
            0 => Ok(value),
            count => Err(DecodeError::TrailingBytes { count }),
        }
    }

    /// Decodes a value of a known type from the start of the buffer, such
    /// as a bare `int` or a `Vector<long>`.
    pub fn decode_as(&self, buf: &[u8], ty: &FieldType) -> DecodeResult<TlValue> {
        self.decode_as_from(&mut Cursor::from_slice(buf), ty)
    }

    /// Like [`Codec::decode_as`], but reading from a cursor.
    pub fn decode_as_from(&self, buf: &mut Cursor, ty: &FieldType) -> DecodeResult<TlValue> {
        atomically(buf, |buf| self.read_field(buf, ty, 0))
    }

    /// Encodes a boxed value, the way [`Codec::decode`] reads it back:
    /// objects, booleans, vectors and `null` with their constructor
    /// identifier.
    ///
    /// The elements of vectors are written boxed too. Scalars have no
    /// constructor, so they (and vectors of them) must be written with
    /// [`Codec::encode_as`] instead.
    pub fn encode(&self, value: &TlValue) -> EncodeResult<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_boxed(value, &mut buf)?;
        Ok(buf)
    }

    /// Encodes a value as the given type demands it.
    pub fn encode_as(&self, value: &TlValue, ty: &FieldType) -> EncodeResult<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_field(value, ty, &mut buf)?;
        Ok(buf)
    }

    /// Encodes a boxed value and wraps it inside a `gzip_packed` object.
    pub fn encode_packed(&self, value: &TlValue) -> EncodeResult<Vec<u8>> {
        let mut unpacked = Vec::new();
        self.write_boxed(value, &mut unpacked)?;

        let compression_failed =
            |e: std::io::Error| EncodeError::unencodable(format!("compression failed: {}", e));
        let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
        encoder.write_all(&unpacked).map_err(compression_failed)?;
        let packed = encoder.finish().map_err(compression_failed)?;
        check_bytes_len(&packed)?;

        let mut buf = Vec::with_capacity(packed.len() + 8);
        GZIP_PACKED_ID.serialize(&mut buf);
        packed.serialize(&mut buf);
        Ok(buf)
    }

    fn check_depth(&self, depth: usize) -> DecodeResult<()> {
        if depth >= self.max_depth {
            Err(DecodeError::TooDeep {
                limit: self.max_depth,
            })
        } else {
            Ok(())
        }
    }

    /// Reads a constructor identifier and whatever it introduces. If
    /// `expected` is present, schema constructors must belong to that type.
    fn read_boxed(
        &self,
        buf: &mut Cursor,
        expected: Option<&str>,
        depth: usize,
    ) -> DecodeResult<TlValue> {
        self.check_depth(depth)?;

        let id = u32::deserialize(buf)?;
        match id {
            BOOL_TRUE_ID => Ok(TlValue::Bool(true)),
            BOOL_FALSE_ID => Ok(TlValue::Bool(false)),
            NULL_ID => Ok(TlValue::Nothing),
            VECTOR_ID => self.read_elements(buf, &FieldType::Boxed(None), depth + 1),
            GZIP_PACKED_ID if self.unpack_gzip => {
                let unpacked = gunzip(&Vec::<u8>::deserialize(buf)?, self.max_unpacked_len)?;
                debug!("unpacked gzip_packed object into {} bytes", unpacked.len());

                let mut inner = Cursor::from_slice(&unpacked);
                let value = self.read_boxed(&mut inner, expected, depth + 1)?;
                if inner.remaining() != 0 {
                    warn!(
                        "ignoring {} bytes after the packed value",
                        inner.remaining()
                    );
                }
                Ok(value)
            }
            _ => {
                let constructor = self
                    .schema
                    .get(id)
                    .ok_or(DecodeError::UnknownConstructor { id })?;

                if let Some(expected) = expected {
                    if constructor.category == Category::Types && constructor.ty != expected {
                        return Err(DecodeError::UnexpectedConstructor {
                            expected: expected.into(),
                            id,
                        });
                    }
                }

                self.read_object(buf, constructor, depth + 1)
            }
        }
    }

    fn read_elements(
        &self,
        buf: &mut Cursor,
        ty: &FieldType,
        depth: usize,
    ) -> DecodeResult<TlValue> {
        self.check_depth(depth)?;

        let len = read_vector_len(buf, min_size(ty).max(1))?;
        let mut items = Vec::with_capacity(len);
        for _ in 0..len {
            items.push(self.read_field(buf, ty, depth)?);
        }
        Ok(TlValue::Vector(items))
    }

    /// Reads the parameters of a constructor whose identifier was already
    /// consumed (or that is bare).
    fn read_object(
        &self,
        buf: &mut Cursor,
        constructor: &Constructor,
        depth: usize,
    ) -> DecodeResult<TlValue> {
        self.check_depth(depth)?;
        trace!("reading {}#{:08x}", constructor.name, constructor.id);

        let mut flags = Vec::<(&str, u32)>::new();
        let mut fields = Vec::with_capacity(constructor.params.len());
        for param in constructor.params.iter() {
            let present = param.flag.as_ref().map_or(true, |flag| {
                flags
                    .iter()
                    .find(|(name, _)| *name == flag.name)
                    .map_or(false, |(_, value)| value & flag_bit(flag.index) != 0)
            });

            let value = if !present {
                TlValue::Nothing
            } else if param.ty == FieldType::Flags {
                let value = u32::deserialize(buf)?;
                flags.push((param.name.as_str(), value));
                TlValue::Int(value as i32)
            } else {
                self.read_field(buf, &param.ty, depth)?
            };

            fields.push(Field {
                name: param.name.clone(),
                value,
            });
        }

        Ok(TlValue::Object(Object {
            id: constructor.id,
            name: constructor.name.clone(),
            fields,
        }))
    }

    fn read_field(&self, buf: &mut Cursor, ty: &FieldType, depth: usize) -> DecodeResult<TlValue> {
        Ok(match ty {
            FieldType::Int | FieldType::Flags => TlValue::Int(i32::deserialize(buf)?),
            FieldType::Long => TlValue::Long(i64::deserialize(buf)?),
            FieldType::Int128 => TlValue::Int128(<[u8; 16]>::deserialize(buf)?),
            FieldType::Int256 => TlValue::Int256(<[u8; 32]>::deserialize(buf)?),
            FieldType::Double => TlValue::Double(f64::deserialize(buf)?),
            FieldType::Bool => TlValue::Bool(bool::deserialize(buf)?),
            FieldType::True => TlValue::Bool(true),
            FieldType::Bytes => TlValue::Bytes(Vec::<u8>::deserialize(buf)?),
            FieldType::String => match String::from_utf8(Vec::<u8>::deserialize(buf)?) {
                Ok(string) => TlValue::String(string),
                Err(e) => TlValue::Bytes(e.into_bytes()),
            },
            FieldType::Vector(inner) => {
                let id = u32::deserialize(buf)?;
                if id != VECTOR_ID {
                    return Err(DecodeError::UnexpectedConstructor {
                        expected: "Vector".into(),
                        id,
                    });
                }
                self.read_elements(buf, inner, depth + 1)?
            }
            FieldType::BareVector(inner) => self.read_elements(buf, inner, depth + 1)?,
            FieldType::Boxed(expected) => self.read_boxed(buf, expected.as_deref(), depth)?,
            FieldType::Bare(id) => {
                let constructor = self
                    .schema
                    .get(*id)
                    .ok_or(DecodeError::UnknownConstructor { id: *id })?;
                self.read_object(buf, constructor, depth + 1)?
            }
        })
    }

    fn write_boxed(&self, value: &TlValue, buf: &mut Vec<u8>) -> EncodeResult<()> {
        match value {
            TlValue::Bool(x) => x.serialize(buf),
            TlValue::Nothing => NULL_ID.serialize(buf),
            TlValue::Vector(items) => {
                VECTOR_ID.serialize(buf);
                (items.len() as i32).serialize(buf);
                for item in items {
                    self.write_boxed(item, buf)?;
                }
            }
            TlValue::Object(object) => {
                let constructor = self.constructor_of(object)?;
                constructor.id.serialize(buf);
                self.write_object(object, constructor, buf)?;
            }
            _ => {
                return Err(EncodeError::unencodable(format!(
                    "{} has no constructor and cannot be boxed, use encode_as",
                    value.kind()
                )))
            }
        }
        Ok(())
    }

    fn constructor_of(&self, object: &Object) -> EncodeResult<&Constructor> {
        self.schema.get(object.id).ok_or_else(|| {
            EncodeError::unencodable(format!(
                "constructor {:08x} ({}) is not in the schema",
                object.id, object.name
            ))
        })
    }

    /// Writes the parameters of an object, computing the flags words from
    /// which conditional fields are present. Bits that no parameter uses are
    /// kept from the stored flags value.
    fn write_object(
        &self,
        object: &Object,
        constructor: &Constructor,
        buf: &mut Vec<u8>,
    ) -> EncodeResult<()> {
        if object.fields.len() != constructor.params.len()
            || object
                .fields
                .iter()
                .zip(constructor.params.iter())
                .any(|(field, param)| field.name != param.name)
        {
            return Err(EncodeError::unencodable(format!(
                "fields of {} do not match its constructor",
                object.name
            )));
        }

        let mut flags = Vec::<(&str, u32)>::new();
        for (field, param) in object.fields.iter().zip(constructor.params.iter()) {
            if param.ty == FieldType::Flags {
                let stored = match field.value {
                    TlValue::Int(x) => x as u32,
                    TlValue::Nothing => 0,
                    ref other => {
                        return Err(EncodeError::unencodable(format!(
                            "flags field {} holds {}",
                            param.name,
                            other.kind()
                        )))
                    }
                };
                let used = constructor
                    .params
                    .iter()
                    .filter_map(|p| p.flag.as_ref())
                    .filter(|flag| flag.name == param.name)
                    .fold(0u32, |mask, flag| mask | flag_bit(flag.index));
                flags.push((param.name.as_str(), stored & !used));
            } else if let Some(flag) = &param.flag {
                if is_present(&field.value, &param.ty) {
                    if let Some((_, value)) = flags.iter_mut().find(|(name, _)| *name == flag.name)
                    {
                        *value |= flag_bit(flag.index);
                    }
                }
            }
        }

        // The flags must describe exactly the fields written, which fails when
        // a bit is shared by present and absent fields or cannot be set.
        for (field, param) in object.fields.iter().zip(constructor.params.iter()) {
            let flag = match &param.flag {
                Some(flag) if param.ty != FieldType::Flags => flag,
                _ => continue,
            };
            let set = flags
                .iter()
                .find(|(name, _)| *name == flag.name)
                .map_or(false, |(_, value)| value & flag_bit(flag.index) != 0);

            if set != is_present(&field.value, &param.ty) {
                return Err(EncodeError::unencodable(format!(
                    "{}.{} is {} but {} says otherwise",
                    object.name,
                    param.name,
                    if set { "absent" } else { "present" },
                    flag
                )));
            }
        }

        for (field, param) in object.fields.iter().zip(constructor.params.iter()) {
            if param.ty == FieldType::Flags {
                let value = flags
                    .iter()
                    .find(|(name, _)| *name == param.name)
                    .map_or(0, |(_, value)| *value);
                value.serialize(buf);
            } else if param.flag.is_none() || is_present(&field.value, &param.ty) {
                self.write_field(&field.value, &param.ty, buf)
                    .map_err(|e| match e {
                        EncodeError::UnencodableValue { reason } => EncodeError::unencodable(
                            format!("{}.{}: {}", object.name, param.name, reason),
                        ),
                    })?;
            }
        }
        Ok(())
    }

    fn write_field(&self, value: &TlValue, ty: &FieldType, buf: &mut Vec<u8>) -> EncodeResult<()> {
        match (ty, value) {
            (FieldType::Int | FieldType::Flags, TlValue::Int(x)) => x.serialize(buf),
            (FieldType::Long, TlValue::Long(x)) => x.serialize(buf),
            (FieldType::Int128, TlValue::Int128(x)) => x.serialize(buf),
            (FieldType::Int256, TlValue::Int256(x)) => x.serialize(buf),
            (FieldType::Double, TlValue::Double(x)) => x.serialize(buf),
            (FieldType::Bool, TlValue::Bool(x)) => x.serialize(buf),
            (FieldType::True, TlValue::Bool(true)) => {}
            (FieldType::Bytes | FieldType::String, TlValue::Bytes(x)) => {
                check_bytes_len(x)?;
                x.serialize(buf)
            }
            (FieldType::Bytes | FieldType::String, TlValue::String(x)) => {
                check_bytes_len(x.as_bytes())?;
                x.serialize(buf)
            }
            (FieldType::Vector(inner), TlValue::Vector(items)) => {
                VECTOR_ID.serialize(buf);
                self.write_elements(items, inner, buf)?;
            }
            (FieldType::BareVector(inner), TlValue::Vector(items)) => {
                self.write_elements(items, inner, buf)?;
            }
            (FieldType::Boxed(_), _) => self.write_boxed(value, buf)?,
            (FieldType::Bare(id), TlValue::Object(object)) if object.id == *id => {
                let constructor = self.constructor_of(object)?;
                self.write_object(object, constructor, buf)?;
            }
            _ => {
                return Err(EncodeError::unencodable(format!(
                    "cannot write {} as {}",
                    value.kind(),
                    ty
                )))
            }
        }
        Ok(())
    }

    fn write_elements(
        &self,
        items: &[TlValue],
        ty: &FieldType,
        buf: &mut Vec<u8>,
    ) -> EncodeResult<()> {
        (items.len() as i32).serialize(buf);
        items
            .iter()
            .try_for_each(|item| self.write_field(item, ty, buf))
    }
}

/// Runs a read, restoring the cursor position if it fails.
fn atomically<T>(
    buf: &mut Cursor,
    read: impl FnOnce(&mut Cursor) -> DecodeResult<T>,
) -> DecodeResult<T> {
    let start = buf.pos();
    let result = read(buf);
    if result.is_err() {
        buf.rewind(start);
    }
    result
}

/// The mask of a flag bit, or zero if the index does not fit in the word
/// (such a flag can never be set).
fn flag_bit(index: u32) -> u32 {
    1u32.checked_shl(index).unwrap_or(0)
}

fn check_bytes_len(bytes: &[u8]) -> EncodeResult<()> {
    if bytes.len() > MAX_BYTES_LEN {
        Err(EncodeError::unencodable(format!(
            "byte string of {} bytes exceeds the {} bytes a length prefix can hold",
            bytes.len(),
            MAX_BYTES_LEN
        )))
    } else {
        Ok(())
    }
}

/// Whether a conditional field should be written (and its bit set).
fn is_present(value: &TlValue, ty: &FieldType) -> bool {
    match (ty, value) {
        (_, TlValue::Nothing) => false,
        (FieldType::True, TlValue::Bool(x)) => *x,
        _ => true,
    }
}

/// The least amount of bytes a single value of the given type occupies.
fn min_size(ty: &FieldType) -> usize {
    match ty {
        FieldType::True | FieldType::Bare(_) => 0,
        FieldType::Long | FieldType::Double => 8,
        FieldType::Int128 => 16,
        FieldType::Int256 => 32,
        FieldType::Vector(_) => 8,
        _ => 4,
    }
}

fn gunzip(packed: &[u8], limit: usize) -> DecodeResult<Vec<u8>> {
    let mut unpacked = Vec::new();
    GzDecoder::new(packed)
        .take((limit as u64).saturating_add(1))
        .read_to_end(&mut unpacked)
        .map_err(|_| DecodeError::Decompression)?;

    if unpacked.len() > limit {
        return Err(DecodeError::UnpackedTooLarge { limit });
    }
    Ok(unpacked)
}
