//! Shape extraction: how a declared type becomes a [`TypeDescriptor`].

use tracing::trace;
use tyshape_syntax::{Member, MemberKind, PropertySignature, SourceFile, TypeKind, TypeNode};

use crate::shape::{FieldMap, TypeDescriptor};

/// Where a type appears. Only an object literal at the top of an alias is
/// unpacked into a nested shape; everywhere else it stays verbatim text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// The right-hand side of a type alias.
    TopLevel,
    /// The annotation of a property.
    Field,
}

/// Describe `ty`.
///
/// Union and intersection members are kept as their verbatim text and not
/// decomposed further, so both encode as [`TypeDescriptor::Alternatives`].
pub fn descriptor(file: &SourceFile, ty: &TypeNode, position: Position) -> TypeDescriptor {
    match &ty.kind {
        TypeKind::Union(members) | TypeKind::Intersection(members) => {
            TypeDescriptor::Alternatives(
                members
                    .iter()
                    .map(|member| file.text_of(member.span).to_string())
                    .collect(),
            )
        }
        TypeKind::Reference(_) => TypeDescriptor::Literal(file.text_of(ty.span).to_string()),
        TypeKind::TypeLiteral(members) if position == Position::TopLevel => {
            TypeDescriptor::Nested(fields(file, members))
        }
        _ => TypeDescriptor::Literal(file.text_of(ty.span).to_string()),
    }
}

/// The field map of an interface body or object literal type. Only property
/// signatures contribute.
pub fn fields(file: &SourceFile, members: &[Member]) -> FieldMap {
    let mut map = FieldMap::new();
    for member in members {
        let MemberKind::Property(prop) = &member.kind else {
            continue;
        };
        if let Some((key, value)) = field_entry(file, prop) {
            trace!(field = %key, "field");
            map.insert(key, value);
        }
    }
    map
}

/// The key and descriptor for one property, or `None` when the property has
/// no name text, no annotation, or an empty descriptor.
pub fn field_entry(file: &SourceFile, prop: &PropertySignature) -> Option<(String, TypeDescriptor)> {
    let name = file.text_of(prop.name.span);
    if name.is_empty() {
        return None;
    }
    let ty = prop.ty.as_ref()?;

    let value = descriptor(file, ty, Position::Field);
    if value.is_empty() {
        trace!(field = name, "empty descriptor skipped");
        return None;
    }
    Some((name.to_string(), value))
}
