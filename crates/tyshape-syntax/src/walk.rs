//! A uniform view over the syntax tree.
//!
//! [`Node`] lets a consumer walk every statement, member and type node the
//! same way, in source order, without matching on each AST type itself.

use crate::ast::*;

/// The kind of a [`Node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    SourceFile,
    // statements
    TypeAlias,
    Interface,
    Namespace,
    Function,
    Class,
    Variable,
    Enum,
    Export,
    Block,
    // members
    PropertySignature,
    MethodSignature,
    CallSignature,
    ConstructSignature,
    IndexSignature,
    TypeParameter,
    Parameter,
    // types
    KeywordType,
    LiteralType,
    TypeReference,
    UnionType,
    IntersectionType,
    TypeLiteral,
    ArrayType,
    TupleType,
    FunctionType,
    ParenthesizedType,
    TypeQuery,
    TypeOperator,
    IndexedAccessType,
    ConditionalType,
    MappedType,
    InferType,
    TypePredicate,
    ThisType,
}

/// A borrowed node of any syntactic category.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    SourceFile(&'a SourceFile),
    Statement(&'a Statement),
    Member(&'a Member),
    Type(&'a TypeNode),
    TypeParam(&'a TypeParam),
    Param(&'a Param),
}

impl<'a> Node<'a> {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::SourceFile(_) => NodeKind::SourceFile,
            Node::Statement(stmt) => match &stmt.kind {
                StatementKind::TypeAlias(_) => NodeKind::TypeAlias,
                StatementKind::Interface(_) => NodeKind::Interface,
                StatementKind::Namespace(_) => NodeKind::Namespace,
                StatementKind::Function(_) => NodeKind::Function,
                StatementKind::Class(_) => NodeKind::Class,
                StatementKind::Variable(_) => NodeKind::Variable,
                StatementKind::Enum(_) => NodeKind::Enum,
                StatementKind::Export(_) => NodeKind::Export,
                StatementKind::Block(_) => NodeKind::Block,
            },
            Node::Member(member) => match &member.kind {
                MemberKind::Property(_) => NodeKind::PropertySignature,
                MemberKind::Method(_) => NodeKind::MethodSignature,
                MemberKind::Call(_) => NodeKind::CallSignature,
                MemberKind::Construct(_) => NodeKind::ConstructSignature,
                MemberKind::Index(_) => NodeKind::IndexSignature,
            },
            Node::Type(ty) => match &ty.kind {
                TypeKind::Keyword(_) => NodeKind::KeywordType,
                TypeKind::Literal(_) => NodeKind::LiteralType,
                TypeKind::Reference(_) => NodeKind::TypeReference,
                TypeKind::Union(_) => NodeKind::UnionType,
                TypeKind::Intersection(_) => NodeKind::IntersectionType,
                TypeKind::TypeLiteral(_) => NodeKind::TypeLiteral,
                TypeKind::Array(_) => NodeKind::ArrayType,
                TypeKind::Tuple(_) => NodeKind::TupleType,
                TypeKind::Function(_) => NodeKind::FunctionType,
                TypeKind::Parenthesized(_) => NodeKind::ParenthesizedType,
                TypeKind::Query(_) => NodeKind::TypeQuery,
                TypeKind::Operator { .. } => NodeKind::TypeOperator,
                TypeKind::IndexedAccess { .. } => NodeKind::IndexedAccessType,
                TypeKind::Conditional { .. } => NodeKind::ConditionalType,
                TypeKind::Mapped(_) => NodeKind::MappedType,
                TypeKind::Infer(_) => NodeKind::InferType,
                TypeKind::Predicate { .. } => NodeKind::TypePredicate,
                TypeKind::This => NodeKind::ThisType,
            },
            Node::TypeParam(_) => NodeKind::TypeParameter,
            Node::Param(_) => NodeKind::Parameter,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Node::SourceFile(file) => Span::new(0, file.text.len()),
            Node::Statement(stmt) => stmt.span,
            Node::Member(member) => member.span,
            Node::Type(ty) => ty.span,
            Node::TypeParam(param) => param.span,
            Node::Param(param) => param.span,
        }
    }

    /// The declared name of a statement, if it has one.
    pub fn name(&self) -> Option<&'a Ident> {
        let Node::Statement(stmt) = self else {
            return None;
        };
        match &stmt.kind {
            StatementKind::TypeAlias(alias) => Some(&alias.name),
            StatementKind::Interface(iface) => Some(&iface.name),
            StatementKind::Namespace(ns) => Some(&ns.name),
            StatementKind::Function(func) => Some(&func.name),
            StatementKind::Class(class) => class.name.as_ref(),
            StatementKind::Enum(e) => Some(&e.name),
            StatementKind::Variable(_)
            | StatementKind::Export(_)
            | StatementKind::Block(_) => None,
        }
    }

    /// Direct children in source order.
    pub fn children(&self) -> Vec<Node<'a>> {
        let mut out = Vec::new();
        match *self {
            Node::SourceFile(file) => out.extend(file.statements.iter().map(Node::Statement)),
            Node::Statement(stmt) => statement_children(stmt, &mut out),
            Node::Member(member) => member_children(member, &mut out),
            Node::Type(ty) => type_children(ty, &mut out),
            Node::TypeParam(param) => {
                out.extend(param.constraint.iter().map(Node::Type));
                out.extend(param.default.iter().map(Node::Type));
            }
            Node::Param(param) => out.extend(param.ty.iter().map(Node::Type)),
        }
        out
    }

    pub fn is_type_alias(&self) -> bool {
        self.kind() == NodeKind::TypeAlias
    }

    pub fn is_interface(&self) -> bool {
        self.kind() == NodeKind::Interface
    }

    pub fn is_property_signature(&self) -> bool {
        self.kind() == NodeKind::PropertySignature
    }

    pub fn is_union(&self) -> bool {
        self.kind() == NodeKind::UnionType
    }

    pub fn is_intersection(&self) -> bool {
        self.kind() == NodeKind::IntersectionType
    }

    pub fn is_type_reference(&self) -> bool {
        self.kind() == NodeKind::TypeReference
    }

    pub fn is_type_literal(&self) -> bool {
        self.kind() == NodeKind::TypeLiteral
    }
}

fn statement_children<'a>(stmt: &'a Statement, out: &mut Vec<Node<'a>>) {
    match &stmt.kind {
        StatementKind::TypeAlias(alias) => {
            out.extend(alias.type_params.iter().map(Node::TypeParam));
            out.push(Node::Type(&alias.ty));
        }
        StatementKind::Interface(iface) => {
            out.extend(iface.type_params.iter().map(Node::TypeParam));
            out.extend(iface.extends.iter().map(Node::Type));
            out.extend(iface.members.iter().map(Node::Member));
        }
        StatementKind::Namespace(ns) => out.extend(ns.body.iter().map(Node::Statement)),
        StatementKind::Function(func) => {
            signature_children(&func.signature, out);
            out.extend(func.body.iter().map(Node::Statement));
        }
        StatementKind::Class(class) => {
            out.extend(class.type_params.iter().map(Node::TypeParam));
            out.extend(class.extends.iter().map(Node::Type));
            out.extend(class.implements.iter().map(Node::Type));
            out.extend(class.members.iter().map(Node::Member));
        }
        StatementKind::Variable(var) => out.extend(
            var.declarators
                .iter()
                .filter_map(|d| d.ty.as_ref())
                .map(Node::Type),
        ),
        StatementKind::Block(body) => out.extend(body.iter().map(Node::Statement)),
        StatementKind::Enum(_) | StatementKind::Export(_) => {}
    }
}

fn member_children<'a>(member: &'a Member, out: &mut Vec<Node<'a>>) {
    match &member.kind {
        MemberKind::Property(prop) => out.extend(prop.ty.iter().map(Node::Type)),
        MemberKind::Method(method) => {
            signature_children(&method.signature, out);
            out.extend(method.body.iter().map(Node::Statement));
        }
        MemberKind::Call(sig) | MemberKind::Construct(sig) => signature_children(sig, out),
        MemberKind::Index(index) => {
            out.push(Node::Param(&index.key));
            out.extend(index.value_type.iter().map(Node::Type));
        }
    }
}

fn signature_children<'a>(sig: &'a Signature, out: &mut Vec<Node<'a>>) {
    out.extend(sig.type_params.iter().map(Node::TypeParam));
    out.extend(sig.params.iter().map(Node::Param));
    if let Some(ret) = &sig.return_type {
        out.push(Node::Type(ret));
    }
}

fn type_children<'a>(ty: &'a TypeNode, out: &mut Vec<Node<'a>>) {
    match &ty.kind {
        TypeKind::Reference(reference) => out.extend(reference.type_args.iter().map(Node::Type)),
        TypeKind::Union(types) | TypeKind::Intersection(types) => {
            out.extend(types.iter().map(Node::Type))
        }
        TypeKind::TypeLiteral(members) => out.extend(members.iter().map(Node::Member)),
        TypeKind::Array(elem) | TypeKind::Parenthesized(elem) => out.push(Node::Type(elem)),
        TypeKind::Tuple(elements) => out.extend(elements.iter().map(|el| Node::Type(&el.ty))),
        TypeKind::Function(func) => signature_children(&func.signature, out),
        TypeKind::Operator { ty, .. } => out.push(Node::Type(ty)),
        TypeKind::IndexedAccess { object, index } => {
            out.push(Node::Type(object));
            out.push(Node::Type(index));
        }
        TypeKind::Conditional {
            check,
            extends,
            true_type,
            false_type,
        } => {
            out.push(Node::Type(check));
            out.push(Node::Type(extends));
            out.push(Node::Type(true_type));
            out.push(Node::Type(false_type));
        }
        TypeKind::Mapped(mapped) => {
            out.push(Node::Type(&mapped.constraint));
            out.extend(mapped.name_type.iter().map(Node::Type));
            out.extend(mapped.value_type.iter().map(Node::Type));
        }
        TypeKind::Predicate { ty: Some(ty), .. } => out.push(Node::Type(ty)),
        TypeKind::Keyword(_)
        | TypeKind::Literal(_)
        | TypeKind::Query(_)
        | TypeKind::Infer(_)
        | TypeKind::Predicate { ty: None, .. }
        | TypeKind::This => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn preorder<'a>(node: Node<'a>, out: &mut Vec<NodeKind>) {
        out.push(node.kind());
        for child in node.children() {
            preorder(child, out);
        }
    }

    #[test]
    fn test_preorder_visits_nested_declarations() {
        let parsed = parse("namespace A { interface B { c: string | number } }");
        let mut kinds = Vec::new();
        preorder(Node::SourceFile(&parsed.file), &mut kinds);
        assert_eq!(
            kinds,
            vec![
                NodeKind::SourceFile,
                NodeKind::Namespace,
                NodeKind::Interface,
                NodeKind::PropertySignature,
                NodeKind::UnionType,
                NodeKind::KeywordType,
                NodeKind::KeywordType,
            ]
        );
    }

    #[test]
    fn test_children_in_source_order() {
        let parsed = parse("type Pair<T> = { first: T; second: Array<T> };");
        let root = Node::SourceFile(&parsed.file);
        let alias = root.children()[0];
        assert!(alias.is_type_alias());
        assert_eq!(alias.name().map(|n| n.name.as_str()), Some("Pair"));

        let children = alias.children();
        assert_eq!(children[0].kind(), NodeKind::TypeParameter);
        assert!(children[1].is_type_literal());

        let members = children[1].children();
        assert!(members.iter().all(|m| m.is_property_signature()));
        let texts: Vec<&str> = members
            .iter()
            .map(|m| parsed.file.text_of(m.span()))
            .collect();
        assert_eq!(texts, vec!["first: T", "second: Array<T>"]);
        assert!(members[1].children()[0].is_type_reference());
    }

    #[test]
    fn test_predicates() {
        let parsed = parse("type X = A & B;\ninterface Y {}");
        let stmts = Node::SourceFile(&parsed.file).children();
        assert!(stmts[0].children()[0].is_intersection());
        assert!(!stmts[0].children()[0].is_union());
        assert!(stmts[1].is_interface());
        assert!(stmts[1].children().is_empty());
    }

    #[test]
    fn test_function_and_method_bodies_are_children() {
        let parsed = parse(
            "function f(x: number) { type Inner = string; }
             class C { m() { if (ok) { interface Deep {} } } }",
        );
        let stmts = Node::SourceFile(&parsed.file).children();

        let func = stmts[0].children();
        assert_eq!(func[0].kind(), NodeKind::Parameter);
        assert!(func[1].is_type_alias());

        let method = stmts[1].children()[0];
        assert_eq!(method.kind(), NodeKind::MethodSignature);
        let block = method.children()[0];
        assert_eq!(block.kind(), NodeKind::Block);
        assert!(block.children()[0].is_interface());
    }
}
