//! The flattened output of a conversion.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, warn};

/// Field name (verbatim from source) to its descriptor.
pub type FieldMap = IndexMap<String, TypeDescriptor>;

/// How a single type is represented in the output.
///
/// Serializes untagged: a literal is a JSON string, alternatives are an
/// array of strings, and a nested shape is an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TypeDescriptor {
    /// Verbatim source text of a primitive, reference or other type.
    Literal(String),
    /// Verbatim source text of each union or intersection member, in order.
    Alternatives(Vec<String>),
    /// An object literal on the right-hand side of an alias.
    Nested(FieldMap),
}

impl TypeDescriptor {
    /// Empty descriptors are never written into a field map.
    pub fn is_empty(&self) -> bool {
        match self {
            TypeDescriptor::Literal(text) => text.is_empty(),
            TypeDescriptor::Alternatives(texts) => texts.is_empty(),
            TypeDescriptor::Nested(_) => false,
        }
    }

    pub fn as_literal(&self) -> Option<&str> {
        match self {
            TypeDescriptor::Literal(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_alternatives(&self) -> Option<&[String]> {
        match self {
            TypeDescriptor::Alternatives(texts) => Some(texts),
            _ => None,
        }
    }

    pub fn as_nested(&self) -> Option<&FieldMap> {
        match self {
            TypeDescriptor::Nested(fields) => Some(fields),
            _ => None,
        }
    }
}

impl From<&str> for TypeDescriptor {
    fn from(text: &str) -> Self {
        TypeDescriptor::Literal(text.to_string())
    }
}

/// What a declaration name maps to: an object shape or a single descriptor,
/// never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Declaration {
    Fields(FieldMap),
    Type(TypeDescriptor),
}

impl Declaration {
    pub fn as_fields(&self) -> Option<&FieldMap> {
        match self {
            Declaration::Fields(fields) => Some(fields),
            Declaration::Type(_) => None,
        }
    }

    pub fn as_type(&self) -> Option<&TypeDescriptor> {
        match self {
            Declaration::Type(descriptor) => Some(descriptor),
            Declaration::Fields(_) => None,
        }
    }
}

/// Lowercased declaration name to its [`Declaration`], in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OutputShape {
    declarations: IndexMap<String, Declaration>,
}

impl OutputShape {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Declaration> {
        self.declarations.get(name)
    }

    /// Field map stored under `name`, if the declaration is an object shape.
    pub fn fields(&self, name: &str) -> Option<&FieldMap> {
        self.get(name).and_then(Declaration::as_fields)
    }

    /// Descriptor stored under `name`, if the declaration is not an object shape.
    pub fn descriptor(&self, name: &str) -> Option<&TypeDescriptor> {
        self.get(name).and_then(Declaration::as_type)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.declarations.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.declarations.keys().map(String::as_str)
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Declaration> {
        self.declarations.iter()
    }

    /// Merge `fields` into the map under `name`; later keys win. A
    /// descriptor stored under the same name is replaced by a fresh map.
    pub(crate) fn merge_fields(&mut self, name: &str, fields: FieldMap) {
        match self.declarations.get_mut(name) {
            Some(Declaration::Fields(target)) => {
                for (key, descriptor) in fields {
                    if target.insert(key, descriptor).is_some() {
                        debug!(declaration = name, "field redeclared");
                    }
                }
            }
            previous => {
                if let Some(Declaration::Type(previous)) = previous {
                    warn!(declaration = name, ?previous, "object shape replaces earlier type");
                }
                self.declarations
                    .insert(name.to_string(), Declaration::Fields(fields));
            }
        }
    }

    /// Store `descriptor` under `name`, overwriting whatever was there.
    pub(crate) fn assign(&mut self, name: &str, descriptor: TypeDescriptor) {
        let previous = self
            .declarations
            .insert(name.to_string(), Declaration::Type(descriptor));
        if let Some(Declaration::Fields(fields)) = previous {
            warn!(
                declaration = name,
                fields = fields.len(),
                "type alias overwrites earlier object shape"
            );
        }
    }
}

impl<'a> IntoIterator for &'a OutputShape {
    type Item = (&'a String, &'a Declaration);
    type IntoIter = indexmap::map::Iter<'a, String, Declaration>;

    fn into_iter(self) -> Self::IntoIter {
        self.declarations.iter()
    }
}
