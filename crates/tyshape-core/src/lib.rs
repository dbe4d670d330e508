//! Flatten TypeScript type aliases and interfaces into plain nested shapes.
//!
//! ```
//! let shape = tyshape_core::convert("interface User { id: number; status: 'on' | 'off' }");
//! let user = shape.fields("user").unwrap();
//! assert_eq!(user["id"].as_literal(), Some("number"));
//! assert_eq!(user["status"].as_alternatives().map(|alts| alts.len()), Some(2));
//! ```
//!
//! Conversion never fails. Malformed members are dropped, unknown type forms
//! are kept as their source text, and parse errors are available through
//! [`convert_with_diagnostics`].

mod extract;
mod shape;
mod walker;

use tracing::{debug, instrument};
use tyshape_syntax::{ParseError, SourceFile};

pub use extract::{descriptor, field_entry, fields, Position};
pub use shape::{Declaration, FieldMap, OutputShape, TypeDescriptor};

/// A conversion together with the parse errors that were skipped over.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub shape: OutputShape,
    pub errors: Vec<ParseError>,
}

/// Convert declaration source text into its [`OutputShape`].
pub fn convert(source: &str) -> OutputShape {
    convert_with_diagnostics(source).shape
}

/// Like [`convert`], also returning the parse errors.
#[instrument(skip_all, fields(bytes = source.len()))]
pub fn convert_with_diagnostics(source: &str) -> Conversion {
    let parsed = tyshape_syntax::parse(source);
    if parsed.has_errors() {
        debug!(errors = parsed.errors.len(), "source parsed with errors");
    }

    let shape = extract(&parsed.file);
    debug!(declarations = shape.len(), "conversion finished");
    Conversion {
        shape,
        errors: parsed.errors,
    }
}

/// Walk an already parsed file.
pub fn extract(file: &SourceFile) -> OutputShape {
    walker::Walker::new(file).walk()
}
