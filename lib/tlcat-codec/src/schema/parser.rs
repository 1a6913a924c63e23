// Copyright 2026 - developers of the `tlcat` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Textual form of [Type Language] definitions, before the types they
//! mention are resolved into [`FieldType`](super::FieldType)s.
//!
//! [Type Language]: https://core.telegram.org/mtproto/TL
use std::str::FromStr;

use crc32fast::Hasher;

use super::{Category, Flag};
use crate::errors::SchemaError;

const DEFINITION_SEP: &str = ";";
const FUNCTIONS_SEP: &str = "---functions---";
const TYPES_SEP: &str = "---types---";

/// A type as written in a definition, such as `%ns.Type<!X>`.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TypeRef {
    /// The full name, including any namespace.
    pub name: String,

    /// Whether the type was prefixed with `%`.
    pub percent: bool,

    /// Whether the type was prefixed with `!`.
    pub generic_ref: bool,

    pub generic_arg: Option<Box<TypeRef>>,
}

impl TypeRef {
    /// Lower-case names refer to a single constructor rather than a type.
    pub fn is_bare_name(&self) -> bool {
        self.name
            .rsplit('.')
            .next()
            .and_then(|name| name.chars().next())
            .map_or(false, |c| c.is_ascii_lowercase())
    }
}

impl FromStr for TypeRef {
    type Err = SchemaError;

    fn from_str(ty: &str) -> Result<Self, Self::Err> {
        let invalid = || SchemaError::InvalidParam { param: ty.into() };

        let (rest, generic_ref) = match ty.strip_prefix('!') {
            Some(rest) => (rest, true),
            None => (ty, false),
        };
        let (rest, percent) = match rest.strip_prefix('%') {
            Some(rest) => (rest, true),
            None => (rest, false),
        };

        let (name, generic_arg) = if let Some(pos) = rest.find('<') {
            let arg = rest[pos + 1..].strip_suffix('>').ok_or_else(invalid)?;
            (&rest[..pos], Some(Box::new(arg.parse()?)))
        } else {
            (rest, None)
        };

        if name.is_empty() || name.split('.').any(str::is_empty) || name.contains('>') {
            return Err(invalid());
        }

        Ok(Self {
            name: name.into(),
            percent,
            generic_ref,
            generic_arg,
        })
    }
}

/// A single parameter, before resolution.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum ParamDef {
    /// `name:#`.
    Flags { name: String },

    /// `name:type` or `name:flags.N?type`.
    Normal {
        name: String,
        ty: TypeRef,
        flag: Option<Flag>,
    },
}

/// A parsed definition such as `user#1 flags:# id:long name:flags.0?string = User`.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Definition {
    /// The full name, including any namespace.
    pub name: String,

    /// The explicit identifier, or the one inferred from the text.
    pub id: u32,

    /// Generic types declared with `{X:Type}`.
    pub generics: Vec<String>,

    pub params: Vec<ParamDef>,

    /// The full name of the resulting type, without generic arguments.
    pub ty: String,

    pub category: Category,
}

fn parse_flag(flag: &str) -> Option<Flag> {
    let (name, index) = flag.split_once('.')?;
    if name.is_empty() {
        return None;
    }
    Some(Flag {
        name: name.into(),
        index: index.parse().ok().filter(|&i: &u32| i < 32)?,
    })
}

impl FromStr for Definition {
    type Err = SchemaError;

    /// Parses a single definition, which must not include the trailing `;`.
    fn from_str(definition: &str) -> Result<Self, Self::Err> {
        let definition = definition.split_whitespace().collect::<Vec<_>>().join(" ");
        if definition.is_empty() {
            return Err(SchemaError::Empty);
        }

        let (left, ty) = definition
            .split_once('=')
            .map(|(left, ty)| (left.trim(), ty.trim()))
            .ok_or(SchemaError::MissingType)?;

        // `= Vector t` and the like only appear in built-in definitions.
        if ty.contains(' ') {
            return Err(SchemaError::NotImplemented);
        }
        let ty = ty
            .parse::<TypeRef>()
            .map_err(|_| SchemaError::MissingType)?
            .name;

        let (head, middle) = left.split_once(' ').unwrap_or((left, ""));
        let (name, id) = match head.split_once('#') {
            Some((name, id)) => (name, Some(id)),
            None => (head, None),
        };
        if name.is_empty() || name.split('.').any(str::is_empty) {
            return Err(SchemaError::MissingName);
        }

        let id = match id {
            Some(id) => u32::from_str_radix(id, 16).map_err(SchemaError::InvalidId)?,
            None => infer_id(&definition),
        };

        let mut generics = Vec::new();
        let mut flag_fields = Vec::new();
        let mut params = Vec::new();
        for param in middle.split_whitespace() {
            let invalid = || SchemaError::InvalidParam {
                param: param.into(),
            };

            if let Some(def) = param.strip_prefix('{') {
                let generic = def.strip_suffix(":Type}").ok_or_else(invalid)?;
                generics.push(generic.to_string());
                continue;
            }

            let (name, ty) = param.split_once(':').ok_or(SchemaError::NotImplemented)?;
            if name.is_empty() || ty.is_empty() {
                return Err(invalid());
            }

            if ty == "#" {
                flag_fields.push(name.to_string());
                params.push(ParamDef::Flags { name: name.into() });
                continue;
            }

            let (flag, ty) = match ty.split_once('?') {
                Some((flag, ty)) => (Some(parse_flag(flag).ok_or_else(invalid)?), ty),
                None => (None, ty),
            };
            if let Some(flag) = &flag {
                if !flag_fields.contains(&flag.name) {
                    return Err(SchemaError::MissingFlags {
                        name: flag.name.clone(),
                    });
                }
            }

            let ty = ty.parse::<TypeRef>()?;
            if ty.generic_ref && !generics.contains(&ty.name) {
                return Err(SchemaError::MissingGeneric { name: ty.name });
            }

            params.push(ParamDef::Normal {
                name: name.into(),
                ty,
                flag,
            });
        }

        Ok(Self {
            name: name.into(),
            id,
            generics,
            params,
            ty: ty.into(),
            category: Category::Types,
        })
    }
}

/// Removes all single-line comments from the contents.
pub(crate) fn remove_tl_comments(contents: &str) -> String {
    contents
        .lines()
        .map(|line| match line.find("//") {
            Some(pos) => &line[..pos],
            None => line,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Infers the identifier for a definition, which is the CRC32 of its
/// normalized text.
pub(crate) fn infer_id(definition: &str) -> u32 {
    let mut representation = definition
        .replace(":bytes ", ":string ")
        .replace("?bytes ", "?string ")
        .replace('<', " ")
        .replace('>', "")
        .replace('{', "")
        .replace('}', "");

    // `name:flags.N?true` parameters do not take part.
    while let Some(pos) = representation.find("?true") {
        let space = representation[..pos].rfind(' ').unwrap_or(0);
        representation.replace_range(space..pos + "?true".len(), "");
    }

    let mut hasher = Hasher::new();
    hasher.update(representation.as_bytes());
    hasher.finalize()
}

/// Splits a file full of definitions, keeping track of which category
/// each one belongs to.
pub(crate) struct DefinitionIter {
    contents: String,
    index: usize,
    category: Category,
}

impl DefinitionIter {
    pub(crate) fn new(contents: &str) -> Self {
        Self {
            contents: remove_tl_comments(contents),
            index: 0,
            category: Category::Types,
        }
    }
}

impl Iterator for DefinitionIter {
    /// The text of the definition alongside its parsed form.
    type Item = (String, Result<Definition, SchemaError>);

    fn next(&mut self) -> Option<Self::Item> {
        let mut definition = loop {
            if self.index >= self.contents.len() {
                return None;
            }
            let end = match self.contents[self.index..].find(DEFINITION_SEP) {
                Some(end) => self.index + end,
                None => self.contents.len(),
            };

            let definition = self.contents[self.index..end].trim().to_string();
            self.index = end + DEFINITION_SEP.len();
            if !definition.is_empty() {
                break definition;
            }
        };

        // Separators precede the definition they apply to.
        while definition.starts_with("---") {
            let rest = if let Some(rest) = definition.strip_prefix(FUNCTIONS_SEP) {
                self.category = Category::Functions;
                rest
            } else if let Some(rest) = definition.strip_prefix(TYPES_SEP) {
                self.category = Category::Types;
                rest
            } else {
                return Some((definition, Err(SchemaError::UnknownSeparator)));
            };
            definition = rest.trim().to_string();
        }

        let parsed = definition.parse::<Definition>().map(|mut d| {
            d.category = self.category;
            d
        });
        Some((definition, parsed))
    }
}
