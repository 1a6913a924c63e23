// Copyright 2026 - developers of the `tlcat` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The layout of every known constructor, keyed by its identifier.
//!
//! A [`Schema`] can be assembled by hand with [`Schema::insert`], or loaded
//! from the same textual [Type Language] definitions Telegram publishes
//! (`mtproto.tl`, `api.tl`) with [`Schema::from_tl`].
//!
//! [Type Language]: https://core.telegram.org/mtproto/TL
mod parser;

use std::collections::HashMap;
use std::fmt;

use log::{debug, warn};

use crate::errors::SchemaError;
use parser::{Definition, DefinitionIter, ParamDef, TypeRef};

/// The category to which a definition belongs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    /// The default category, a definition represents a type.
    Types,

    /// A definition represents a callable function.
    Functions,
}

/// Data attached to parameters conditional on flags.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Flag {
    /// The name of the `#` field containing the flags.
    pub name: String,

    /// The bit index for the flag inside the flags field.
    pub index: u32,
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.name, self.index)
    }
}

/// How a single field is laid out on the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldType {
    Int,
    Long,
    Int128,
    Int256,
    Double,
    /// Boxed `Bool`, either `boolTrue` or `boolFalse`.
    Bool,
    /// `true`, which occupies no space and only makes sense behind a flag.
    True,
    Bytes,
    String,
    /// `#`, a bitmask gating the presence of later fields.
    Flags,
    /// `Vector<T>`, with the `vector` constructor in front.
    Vector(Box<FieldType>),
    /// `vector<T>` or `%Vector<T>`, only the length and the elements.
    BareVector(Box<FieldType>),
    /// Any constructor, prefixed by its identifier. When the type name is
    /// known, the constructor found must belong to it.
    Boxed(Option<String>),
    /// The given constructor, without its identifier in front.
    Bare(u32),
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => f.write_str("int"),
            Self::Long => f.write_str("long"),
            Self::Int128 => f.write_str("int128"),
            Self::Int256 => f.write_str("int256"),
            Self::Double => f.write_str("double"),
            Self::Bool => f.write_str("Bool"),
            Self::True => f.write_str("true"),
            Self::Bytes => f.write_str("bytes"),
            Self::String => f.write_str("string"),
            Self::Flags => f.write_str("#"),
            Self::Vector(inner) => write!(f, "Vector<{}>", inner),
            Self::BareVector(inner) => write!(f, "vector<{}>", inner),
            Self::Boxed(Some(name)) => f.write_str(name),
            Self::Boxed(None) => f.write_str("Object"),
            Self::Bare(id) => write!(f, "%{:08x}", id),
        }
    }
}

/// A single parameter of a constructor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub ty: FieldType,
    /// If this parameter is only present sometimes, the flag upon which
    /// its presence depends.
    pub flag: Option<Flag>,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            flag: None,
        }
    }

    /// A parameter present only when `flags` has the bit `index` set.
    pub fn conditional(
        name: impl Into<String>,
        ty: FieldType,
        flags: impl Into<String>,
        index: u32,
    ) -> Self {
        Self {
            name: name.into(),
            ty,
            flag: Some(Flag {
                name: flags.into(),
                index,
            }),
        }
    }
}

/// The layout of a single constructor (or function).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Constructor {
    pub id: u32,
    /// The full name, including any namespace.
    pub name: String,
    /// The full name of the type this constructor belongs to.
    pub ty: String,
    pub category: Category,
    pub params: Vec<Param>,
}

impl Constructor {
    pub fn new(id: u32, name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ty: ty.into(),
            category: Category::Types,
            params: Vec::new(),
        }
    }

    /// Builder-style helper to append a parameter.
    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }
}

/// A mapping from constructor identifier to its layout.
#[derive(Clone, Debug, Default)]
pub struct Schema {
    constructors: HashMap<u32, Constructor>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every definition found in the given [Type Language] text.
    ///
    /// Built-in definitions such as `int ? = Int;` are skipped. Any other
    /// malformed definition fails the whole load.
    ///
    /// # Examples
    ///
    /// ```
    /// use tlcat_codec::Schema;
    ///
    /// let schema = Schema::from_tl("
    ///     int ? = Int;
    ///     resPQ#05162463 nonce:int128 server_nonce:int128 pq:bytes
    ///         server_public_key_fingerprints:Vector<long> = ResPQ;
    /// ").unwrap();
    ///
    /// assert_eq!(schema.get(0x05162463).unwrap().name, "resPQ");
    /// ```
    ///
    /// [Type Language]: https://core.telegram.org/mtproto/TL
    pub fn from_tl(contents: &str) -> Result<Self, SchemaError> {
        let mut schema = Self::new();
        schema.extend_tl(contents)?;
        Ok(schema)
    }

    /// Like [`Schema::from_tl`], but adds to an existing schema. Bare types
    /// may refer to constructors that were loaded earlier.
    pub fn extend_tl(&mut self, contents: &str) -> Result<(), SchemaError> {
        let mut definitions = Vec::new();
        for (text, definition) in DefinitionIter::new(contents) {
            match definition {
                Ok(definition) => definitions.push(definition),
                Err(SchemaError::NotImplemented) => {
                    debug!("skipping built-in definition: {}", text);
                }
                Err(e) => {
                    warn!("failed to parse definition {:?}: {}", text, e);
                    return Err(e);
                }
            }
        }

        let resolver = Resolver::new(self, &definitions);
        let constructors = definitions
            .iter()
            .map(|definition| resolver.constructor(definition))
            .collect::<Result<Vec<_>, _>>()?;

        debug!("loaded {} definitions", constructors.len());
        constructors.into_iter().for_each(|c| {
            self.insert(c);
        });
        Ok(())
    }

    /// Registers a constructor, returning the one it replaced, if any.
    pub fn insert(&mut self, constructor: Constructor) -> Option<Constructor> {
        let replaced = self.constructors.insert(constructor.id, constructor);
        if let Some(old) = &replaced {
            warn!("constructor {:08x} ({}) was redefined", old.id, old.name);
        }
        replaced
    }

    pub fn get(&self, id: u32) -> Option<&Constructor> {
        self.constructors.get(&id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Constructor> {
        self.constructors.values().find(|c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Constructor> {
        self.constructors.values()
    }
}

/// Turns the types written in definitions into [`FieldType`]s, looking up
/// bare references among both the new definitions and the known schema.
struct Resolver {
    by_name: HashMap<String, u32>,
    by_type: HashMap<String, Vec<u32>>,
}

impl Resolver {
    fn new(schema: &Schema, definitions: &[Definition]) -> Self {
        let mut by_name = HashMap::new();
        let mut by_type = HashMap::<String, Vec<u32>>::new();

        let known = schema
            .iter()
            .map(|c| (c.id, &c.name, &c.ty, c.category))
            .chain(
                definitions
                    .iter()
                    .map(|d| (d.id, &d.name, &d.ty, d.category)),
            );
        for (id, name, ty, category) in known {
            by_name.insert(name.clone(), id);
            if category == Category::Types {
                let ids = by_type.entry(ty.clone()).or_default();
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }

        Self { by_name, by_type }
    }

    fn constructor(&self, definition: &Definition) -> Result<Constructor, SchemaError> {
        let params = definition
            .params
            .iter()
            .map(|param| match param {
                ParamDef::Flags { name } => Ok(Param::new(name.clone(), FieldType::Flags)),
                ParamDef::Normal { name, ty, flag } => Ok(Param {
                    name: name.clone(),
                    ty: self.field_type(ty, &definition.generics)?,
                    flag: flag.clone(),
                }),
            })
            .collect::<Result<Vec<_>, SchemaError>>()?;

        Ok(Constructor {
            id: definition.id,
            name: definition.name.clone(),
            ty: definition.ty.clone(),
            category: definition.category,
            params,
        })
    }

    fn field_type(&self, ty: &TypeRef, generics: &[String]) -> Result<FieldType, SchemaError> {
        if ty.generic_ref || generics.contains(&ty.name) {
            return Ok(FieldType::Boxed(None));
        }

        let inner = || match &ty.generic_arg {
            Some(arg) => self.field_type(arg, generics).map(Box::new),
            None => Err(SchemaError::InvalidParam {
                param: ty.name.clone(),
            }),
        };

        Ok(match ty.name.as_str() {
            "int" => FieldType::Int,
            "long" => FieldType::Long,
            "int128" => FieldType::Int128,
            "int256" => FieldType::Int256,
            "double" => FieldType::Double,
            "bytes" => FieldType::Bytes,
            "string" => FieldType::String,
            "Bool" => FieldType::Bool,
            "true" => FieldType::True,
            "Object" => FieldType::Boxed(None),
            "Vector" if ty.percent => FieldType::BareVector(inner()?),
            "Vector" => FieldType::Vector(inner()?),
            "vector" => FieldType::BareVector(inner()?),
            _ if ty.percent => FieldType::Bare(self.single_of_type(&ty.name)?),
            _ if ty.is_bare_name() => FieldType::Bare(
                *self
                    .by_name
                    .get(&ty.name)
                    .ok_or_else(|| SchemaError::UnresolvedBareType {
                        name: ty.name.clone(),
                    })?,
            ),
            _ => FieldType::Boxed(Some(ty.name.clone())),
        })
    }

    fn single_of_type(&self, ty: &str) -> Result<u32, SchemaError> {
        match self.by_type.get(ty).map(Vec::as_slice) {
            Some(&[id]) => Ok(id),
            _ => Err(SchemaError::UnresolvedBareType {
                name: format!("%{}", ty),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MTPROTO: &str = "
        resPQ#05162463 nonce:int128 server_nonce:int128 pq:bytes server_public_key_fingerprints:Vector<long> = ResPQ;
        msg_container#73f1f8dc messages:vector<%Message> = MessageContainer;
        message msg_id:long seqno:int bytes:int body:Object = Message;
        future_salts#ae500895 req_msg_id:long now:int salts:vector<future_salt> = FutureSalts;
        future_salt#0949d9dc valid_since:int valid_until:int salt:long = FutureSalt;
        ---functions---
        req_pq_multi#be7e8ef1 nonce:int128 = ResPQ;
        invokeWithLayer#da9b0d0d {X:Type} layer:int query:!X = X;
    ";

    #[test]
    fn load_mtproto_subset() {
        let schema = Schema::from_tl(MTPROTO).unwrap();
        assert_eq!(schema.len(), 7);

        let res_pq = schema.get(0x05162463).unwrap();
        assert_eq!(res_pq.ty, "ResPQ");
        assert_eq!(
            res_pq.params[3].ty,
            FieldType::Vector(Box::new(FieldType::Long))
        );

        let message = schema.find_by_name("message").unwrap();
        assert_eq!(message.params[3].ty, FieldType::Boxed(None));

        let container = schema.get(0x73f1f8dc).unwrap();
        assert_eq!(
            container.params[0].ty,
            FieldType::BareVector(Box::new(FieldType::Bare(message.id)))
        );

        let salts = schema.get(0xae500895).unwrap();
        assert_eq!(
            salts.params[2].ty,
            FieldType::BareVector(Box::new(FieldType::Bare(0x0949d9dc)))
        );

        let invoke = schema.get(0xda9b0d0d).unwrap();
        assert_eq!(invoke.category, Category::Functions);
        assert_eq!(invoke.params[1].ty, FieldType::Boxed(None));
    }

    #[test]
    fn conditional_fields() {
        let schema = Schema::from_tl(
            "user#1 flags:# bot:flags.0?true name:flags.1?string = User;",
        )
        .unwrap();
        let user = schema.get(1).unwrap();
        assert_eq!(user.params[0].ty, FieldType::Flags);
        assert_eq!(user.params[1].ty, FieldType::True);
        assert_eq!(
            user.params[2].flag,
            Some(Flag {
                name: "flags".into(),
                index: 1
            })
        );
    }

    #[test]
    fn bare_types_may_refer_to_earlier_loads() {
        let mut schema = Schema::from_tl("point#1 x:int y:int = Point;").unwrap();
        schema
            .extend_tl("line#2 a:%Point b:point = Line;")
            .unwrap();
        let line = schema.get(2).unwrap();
        assert_eq!(line.params[0].ty, FieldType::Bare(1));
        assert_eq!(line.params[1].ty, FieldType::Bare(1));
    }

    #[test]
    fn unresolved_bare_type() {
        assert_eq!(
            Schema::from_tl("a#1 b:%Missing = A;").unwrap_err(),
            SchemaError::UnresolvedBareType {
                name: "%Missing".into()
            }
        );
        assert_eq!(
            Schema::from_tl("a#1 x:int = A; b#2 x:long = A; c#3 v:%A = C;").unwrap_err(),
            SchemaError::UnresolvedBareType { name: "%A".into() }
        );
    }

    #[test]
    fn vector_needs_argument() {
        assert!(matches!(
            Schema::from_tl("a#1 b:Vector = A;"),
            Err(SchemaError::InvalidParam { .. })
        ));
    }

    #[test]
    fn redefinition_replaces() {
        let mut schema = Schema::new();
        assert!(schema.insert(Constructor::new(1, "a", "A")).is_none());
        let old = schema.insert(Constructor::new(1, "b", "B")).unwrap();
        assert_eq!(old.name, "a");
        assert_eq!(schema.get(1).unwrap().name, "b");
    }
}
