use tracing::debug;
use tyshape_syntax::{Interface, Node, SourceFile, StatementKind, TypeAlias};

use crate::extract::{self, Position};
use crate::shape::{OutputShape, TypeDescriptor};

/// Pre-order walk over a parsed file that fills an [`OutputShape`].
///
/// Every node is visited once, parent before children, so declarations
/// nested in namespaces and modules are found as well.
pub(crate) struct Walker<'a> {
    file: &'a SourceFile,
    shape: OutputShape,
}

impl<'a> Walker<'a> {
    pub(crate) fn new(file: &'a SourceFile) -> Self {
        Self {
            file,
            shape: OutputShape::new(),
        }
    }

    pub(crate) fn walk(mut self) -> OutputShape {
        let mut stack = vec![Node::SourceFile(self.file)];
        while let Some(node) = stack.pop() {
            self.visit(node);
            // Reversed so the leftmost child is visited next.
            stack.extend(node.children().into_iter().rev());
        }
        self.shape
    }

    fn visit(&mut self, node: Node<'a>) {
        let Node::Statement(stmt) = node else {
            return;
        };
        match &stmt.kind {
            StatementKind::TypeAlias(alias) => self.visit_type_alias(alias),
            StatementKind::Interface(iface) => self.visit_interface(iface),
            _ => {}
        }
    }

    fn visit_type_alias(&mut self, alias: &TypeAlias) {
        let name = alias.name.name.to_lowercase();
        debug!(declaration = %name, "type alias");

        match extract::descriptor(self.file, &alias.ty, Position::TopLevel) {
            TypeDescriptor::Nested(fields) => self.shape.merge_fields(&name, fields),
            descriptor => self.shape.assign(&name, descriptor),
        }
    }

    fn visit_interface(&mut self, iface: &Interface) {
        let name = iface.name.name.to_lowercase();
        debug!(declaration = %name, members = iface.members.len(), "interface");

        let fields = extract::fields(self.file, &iface.members);
        self.shape.merge_fields(&name, fields);
    }
}
