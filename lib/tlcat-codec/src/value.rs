// Copyright 2026 - developers of the `tlcat` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::fmt::{self, Write};

/// A decoded [Type Language] entity.
///
/// Values carry no type information beyond their variant, which is why
/// writing them back is driven by the [`Schema`](crate::Schema) too.
///
/// [Type Language]: https://core.telegram.org/mtproto/TL
#[derive(Clone, Debug, PartialEq)]
pub enum TlValue {
    /// `int`, and also the raw value of `#` flags fields.
    Int(i32),
    /// `long`.
    Long(i64),
    /// `int128`, in wire (little-endian) order.
    Int128([u8; 16]),
    /// `int256`, in wire (little-endian) order.
    Int256([u8; 32]),
    /// `Bool`, or a set `true` flag.
    Bool(bool),
    /// `double`.
    Double(f64),
    /// `bytes`, or a `string` that is not valid UTF-8.
    Bytes(Vec<u8>),
    /// `string`.
    String(String),
    /// `Vector<T>` or its bare `vector<T>` form.
    Vector(Vec<TlValue>),
    /// An instance of a schema constructor.
    Object(Object),
    /// An absent conditional field, or the `null` constructor.
    Nothing,
}

/// A named field of an [`Object`].
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub name: String,
    pub value: TlValue,
}

/// An instance of a constructor, with its fields in declaration order.
#[derive(Clone, Debug, PartialEq)]
pub struct Object {
    /// The constructor identifier.
    pub id: u32,

    /// The full name of the constructor, including its namespace.
    pub name: String,

    /// Every parameter of the constructor, including flags fields and
    /// conditional fields that were absent (as [`TlValue::Nothing`]).
    pub fields: Vec<Field>,
}

impl Object {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Builder-style helper to append a field.
    pub fn with(mut self, name: impl Into<String>, value: TlValue) -> Self {
        self.fields.push(Field {
            name: name.into(),
            value,
        });
        self
    }

    /// Looks up the value of the field with the given name.
    pub fn get(&self, name: &str) -> Option<&TlValue> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| &field.value)
    }
}

impl From<Object> for TlValue {
    fn from(object: Object) -> Self {
        Self::Object(object)
    }
}

impl TlValue {
    pub fn as_int(&self) -> Option<i32> {
        match *self {
            Self::Int(x) => Some(x),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match *self {
            Self::Long(x) => Some(x),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Self::Bool(x) => Some(x),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match *self {
            Self::Double(x) => Some(x),
            _ => None,
        }
    }

    /// The raw bytes of either a `bytes` or a `string` value.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(x) => Some(x),
            Self::String(x) => Some(x.as_bytes()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(x) => Some(x),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<&[TlValue]> {
        match self {
            Self::Vector(x) => Some(x),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(x) => Some(x),
            _ => None,
        }
    }

    /// Looks up a field, if this value is an object.
    pub fn get(&self, name: &str) -> Option<&TlValue> {
        self.as_object().and_then(|object| object.get(name))
    }

    pub fn is_nothing(&self) -> bool {
        matches!(self, Self::Nothing)
    }

    /// A short name for the variant, used when reporting mismatches.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Long(_) => "long",
            Self::Int128(_) => "int128",
            Self::Int256(_) => "int256",
            Self::Bool(_) => "Bool",
            Self::Double(_) => "double",
            Self::Bytes(_) => "bytes",
            Self::String(_) => "string",
            Self::Vector(_) => "Vector",
            Self::Object(_) => "Object",
            Self::Nothing => "null",
        }
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        const INDENT: &str = "    ";

        match self {
            Self::Int(x) => write!(f, "{}", x),
            Self::Long(x) => write!(f, "{}", x),
            Self::Int128(x) => write_hex(f, x),
            Self::Int256(x) => write_hex(f, x),
            Self::Bool(x) => write!(f, "{}", x),
            Self::Double(x) => write!(f, "{:?}", x),
            Self::Bytes(x) => {
                write!(f, "bytes[{}] ", x.len())?;
                write_hex(f, x)
            }
            Self::String(x) => write!(f, "{:?}", x),
            Self::Nothing => f.write_str("null"),
            Self::Vector(items) if items.is_empty() => f.write_str("[]"),
            Self::Vector(items) => {
                f.write_str("[\n")?;
                for item in items {
                    write!(f, "{}", INDENT.repeat(depth + 1))?;
                    item.fmt_indented(f, depth + 1)?;
                    f.write_char('\n')?;
                }
                write!(f, "{}]", INDENT.repeat(depth))
            }
            Self::Object(object) => {
                write!(f, "{}#{:08x} {{", object.name, object.id)?;
                if object.fields.is_empty() {
                    return f.write_char('}');
                }
                f.write_char('\n')?;
                for field in object.fields.iter() {
                    write!(f, "{}{}: ", INDENT.repeat(depth + 1), field.name)?;
                    field.value.fmt_indented(f, depth + 1)?;
                    f.write_char('\n')?;
                }
                write!(f, "{}}}", INDENT.repeat(depth))
            }
        }
    }
}

fn write_hex(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    f.write_str("0x")?;
    bytes.iter().try_for_each(|b| write!(f, "{:02x}", b))
}

impl fmt::Display for TlValue {
    /// Renders the value as an indented tree, one field per line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}
