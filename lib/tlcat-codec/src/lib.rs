// Copyright 2026 - developers of the `tlcat` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! This library reads and writes values in Telegram's [Type Language]
//! binary format without any generated code: the layout of every object
//! is looked up at runtime in a [`Schema`].
//!
//! There are two levels to it:
//!
//! * The [`Serializable`] and [`Deserializable`] traits, implemented for
//!   the primitive types (`int`, `long`, `bytes`, `Vector`, …). These are
//!   useful when the type of the data is known statically.
//!
//! * The [`Codec`], which walks a [`Schema`] to turn arbitrary boxed data
//!   into a [`TlValue`] tree and back.
//!
//! # Examples
//!
//! ```
//! use tlcat_codec::{Codec, Schema, TlValue};
//!
//! let schema = Schema::from_tl("point#5a7c4e2b x:int y:int = Point;").unwrap();
//! let codec = Codec::new(schema);
//!
//! let bytes = [0x2b, 0x4e, 0x7c, 0x5a, 1, 0, 0, 0, 2, 0, 0, 0];
//! let value = codec.decode(&bytes).unwrap();
//! assert_eq!(value.get("y"), Some(&TlValue::Int(2)));
//! assert_eq!(codec.encode(&value).unwrap(), bytes);
//! ```
//!
//! [Type Language]: https://core.telegram.org/mtproto/TL
mod codec;
mod deserialize;
pub mod errors;
mod schema;
mod serialize;
mod value;

pub use codec::{Codec, CodecBuilder};
pub use deserialize::{Cursor, Deserializable};
pub use errors::{DecodeError, EncodeError, SchemaError};
pub use schema::{Category, Constructor, FieldType, Flag, Param, Schema};
pub use serialize::Serializable;
pub use value::{Field, Object, TlValue};

/// `boolTrue#997275b5 = Bool;`
#[allow(clippy::unreadable_literal)]
pub const BOOL_TRUE_ID: u32 = 0x997275b5;

/// `boolFalse#bc799737 = Bool;`
#[allow(clippy::unreadable_literal)]
pub const BOOL_FALSE_ID: u32 = 0xbc799737;

/// `true#3fedd339 = True;`, also accepted in place of `boolTrue`.
#[allow(clippy::unreadable_literal)]
pub const TRUE_ID: u32 = 0x3fedd339;

/// `vector#1cb5c415 {t:Type} # [ t ] = Vector t;`
#[allow(clippy::unreadable_literal)]
pub const VECTOR_ID: u32 = 0x1cb5c415;

/// `null#56730bcc = Null;`
#[allow(clippy::unreadable_literal)]
pub const NULL_ID: u32 = 0x56730bcc;

/// `gzip_packed#3072cfa1 packed_data:bytes = Object;`
#[allow(clippy::unreadable_literal)]
pub const GZIP_PACKED_ID: u32 = 0x3072cfa1;

/// This struct represents the concrete type of a vector, that is,
/// `vector` as opposed to the type `Vector`. It is serialized without
/// the leading constructor identifier.
#[derive(Clone, Debug, PartialEq)]
pub struct RawVec<T>(pub Vec<T>);
