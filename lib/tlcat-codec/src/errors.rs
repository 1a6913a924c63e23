// Copyright 2026 - developers of the `tlcat` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Errors that can occur when reading or writing values, and when loading
//! a [`Schema`] from its textual definitions.
//!
//! [`Schema`]: crate::Schema
use std::error::Error;
use std::fmt;
use std::num::ParseIntError;

/// The reasons why reading a value out of a buffer can fail.
///
/// None of these are recoverable by retrying with the same input: the
/// decoding either fully succeeds, or fails without producing a value.
#[derive(Clone, Debug, PartialEq)]
pub enum DecodeError {
    /// The end of the buffer was reached earlier than anticipated, which
    /// implies there is not enough data to complete the deserialization.
    Truncated,

    /// The constructor identifier is not present in the schema, so there
    /// is no way to know how the rest of the object looks like.
    UnknownConstructor {
        /// The unknown constructor identifier.
        id: u32,
    },

    /// A constructor was found, but not the one the declared type demands
    /// (e.g. reading a `Bool` and finding something else).
    UnexpectedConstructor {
        /// The name of the type that was expected.
        expected: String,

        /// The constructor identifier that was found instead.
        id: u32,
    },

    /// A length prefix or element count can never be satisfied.
    MalformedLength {
        /// The length that was declared.
        declared: usize,

        /// How many bytes were left in the buffer at that point.
        remaining: usize,
    },

    /// Values were nested deeper than the configured limit.
    TooDeep {
        /// The limit that was exceeded.
        limit: usize,
    },

    /// A complete value was read, but the buffer still had data left.
    TrailingBytes {
        /// How many bytes were left unread.
        count: usize,
    },

    /// A `gzip_packed` object could not be decompressed.
    Decompression,

    /// A `gzip_packed` object expanded past the configured limit.
    UnpackedTooLarge {
        /// The limit that was exceeded, in bytes.
        limit: usize,
    },
}

impl Error for DecodeError {}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated => write!(f, "unexpected end of data"),
            Self::UnknownConstructor { id } => write!(f, "unknown constructor: {:08x}", id),
            Self::UnexpectedConstructor { expected, id } => {
                write!(f, "unexpected constructor {:08x} for {}", id, expected)
            }
            Self::MalformedLength {
                declared,
                remaining,
            } => write!(
                f,
                "malformed length: {} declared with {} bytes remaining",
                declared, remaining
            ),
            Self::TooDeep { limit } => write!(f, "values nested deeper than {}", limit),
            Self::TrailingBytes { count } => write!(f, "{} trailing bytes after value", count),
            Self::Decompression => write!(f, "failed to decompress packed object"),
            Self::UnpackedTooLarge { limit } => {
                write!(f, "packed object expands past {} bytes", limit)
            }
        }
    }
}

/// The reason why a value could not be written.
#[derive(Clone, Debug, PartialEq)]
pub enum EncodeError {
    /// The value cannot be represented with the type it has to be written
    /// as, or with the constructor it claims to be.
    UnencodableValue {
        /// Human-readable explanation of the mismatch.
        reason: String,
    },
}

impl EncodeError {
    pub(crate) fn unencodable(reason: impl Into<String>) -> Self {
        Self::UnencodableValue {
            reason: reason.into(),
        }
    }
}

impl Error for EncodeError {}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnencodableValue { reason } => write!(f, "unencodable value: {}", reason),
        }
    }
}

/// Represents a failure when parsing a single schema definition.
#[derive(Clone, Debug, PartialEq)]
pub enum SchemaError {
    /// The definition is empty.
    Empty,

    /// The identifier from this definition is malformed.
    InvalidId(ParseIntError),

    /// Some parameter of this definition is malformed.
    InvalidParam {
        /// The offending parameter, as written.
        param: String,
    },

    /// A parameter depends on a flags field that was not declared before it.
    MissingFlags {
        /// The name of the flags field that is missing.
        name: String,
    },

    /// A parameter references a generic type that was never declared.
    MissingGeneric {
        /// The name of the generic.
        name: String,
    },

    /// The name information is missing from the definition.
    MissingName,

    /// The type information is missing from the definition.
    MissingType,

    /// The definition describes a built-in type and cannot be used as a
    /// constructor (e.g. `int ? = Int`).
    NotImplemented,

    /// The file contained an unknown separator (such as `---foo---`).
    UnknownSeparator,

    /// A bare type (`%T` or a lower-case name) does not match exactly one
    /// known constructor.
    UnresolvedBareType {
        /// The bare type as written.
        name: String,
    },
}

impl Error for SchemaError {}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty definition"),
            Self::InvalidId(e) => write!(f, "invalid constructor id: {}", e),
            Self::InvalidParam { param } => write!(f, "invalid parameter: {}", param),
            Self::MissingFlags { name } => write!(f, "flags field {} is not declared", name),
            Self::MissingGeneric { name } => write!(f, "generic {} is not declared", name),
            Self::MissingName => write!(f, "definition has no name"),
            Self::MissingType => write!(f, "definition has no type"),
            Self::NotImplemented => write!(f, "built-in definitions cannot be loaded"),
            Self::UnknownSeparator => write!(f, "unknown separator"),
            Self::UnresolvedBareType { name } => {
                write!(f, "bare type {} does not name a single constructor", name)
            }
        }
    }
}
