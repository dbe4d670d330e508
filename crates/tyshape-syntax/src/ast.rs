//! Syntax tree for TypeScript type declarations.
//!
//! Every node records the byte range it was parsed from, so callers can
//! always get back at the verbatim source text with [`SourceFile::text_of`].

use std::fmt;
use std::ops::Range;

/// A byte range in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// The smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// An identifier with its source span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

/// A parsed source text and its top-level statements.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub text: String,
    pub statements: Vec<Statement>,
}

impl SourceFile {
    /// Verbatim source text covered by `span`.
    ///
    /// Out-of-range or non-boundary spans yield an empty string.
    pub fn text_of(&self, span: Span) -> &str {
        self.text.get(span.range()).unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub kind: StatementKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatementKind {
    TypeAlias(TypeAlias),
    Interface(Interface),
    /// `namespace`, `module "x"` and `declare global` blocks.
    Namespace(Namespace),
    Function(Function),
    Class(Class),
    Variable(Variable),
    Enum(Enum),
    Export(Export),
    /// A `{ ... }` block inside a function or method body.
    Block(Vec<Statement>),
}

/// `type Name<T> = Type;`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAlias {
    pub name: Ident,
    pub type_params: Vec<TypeParam>,
    pub ty: TypeNode,
}

/// `interface Name<T> extends Base { members }`
#[derive(Debug, Clone, PartialEq)]
pub struct Interface {
    pub name: Ident,
    pub type_params: Vec<TypeParam>,
    pub extends: Vec<TypeNode>,
    pub members: Vec<Member>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Namespace {
    pub name: Ident,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: Ident,
    pub signature: Signature,
    /// Statements of the body; empty for a bare signature.
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Class {
    pub name: Option<Ident>,
    pub type_params: Vec<TypeParam>,
    pub extends: Option<TypeNode>,
    pub implements: Vec<TypeNode>,
    pub members: Vec<Member>,
}

/// `declare const a: A, b: B;`
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub declarators: Vec<Declarator>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declarator {
    pub name: Ident,
    pub ty: Option<TypeNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enum {
    pub name: Ident,
    pub members: Vec<Ident>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Export {
    /// `export = name;`
    Equals(Ident),
    /// `export default name;`
    Default(Ident),
    /// `export { a, b as c };`
    Named(Vec<Ident>),
}

/// A generic type parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeParam {
    pub name: Ident,
    pub constraint: Option<TypeNode>,
    pub default: Option<TypeNode>,
    pub span: Span,
}

/// A function or method parameter. Destructuring patterns keep their
/// source text as the name.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Ident,
    pub ty: Option<TypeNode>,
    pub optional: bool,
    pub rest: bool,
    pub span: Span,
}

/// Parameters and return type shared by functions, methods and signatures.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub type_params: Vec<TypeParam>,
    pub params: Vec<Param>,
    pub return_type: Option<Box<TypeNode>>,
}

/// A member of an interface, object literal type or class body.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub kind: MemberKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MemberKind {
    /// `name?: Type;`
    Property(PropertySignature),
    /// `name?<T>(params): Type;`
    Method(MethodSignature),
    /// `(params): Type;`
    Call(Signature),
    /// `new (params): Type;`
    Construct(Signature),
    /// `[key: string]: Type;`
    Index(IndexSignature),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertySignature {
    pub name: PropertyName,
    pub optional: bool,
    pub readonly: bool,
    /// Absent when the member is written without an annotation (`name;`).
    pub ty: Option<TypeNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodSignature {
    pub name: PropertyName,
    pub optional: bool,
    pub signature: Signature,
    /// Body statements of a class method.
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexSignature {
    pub key: Param,
    pub value_type: Option<TypeNode>,
    pub readonly: bool,
}

/// The name of a property or method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyName {
    pub kind: PropertyNameKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyNameKind {
    /// A bare identifier or keyword.
    Ident(String),
    /// A quoted name, unescaped.
    String(String),
    Number(String),
    /// `[Symbol.iterator]`; the span includes the brackets.
    Computed,
    /// `#secret`
    Private(String),
}

/// A type expression.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeNode {
    pub kind: TypeKind,
    pub span: Span,
}

impl TypeNode {
    pub fn new(kind: TypeKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    /// `string`, `number`, `null`, ...
    Keyword(Primitive),
    /// `"GET"`, `42`, `-1`, `true`, `` `id-${string}` ``
    Literal(LiteralType),
    /// `Status`, `Promise<T>`, `NodeJS.Timeout`, `import("x").Y`
    Reference(TypeReference),
    /// `A | B | C`
    Union(Vec<TypeNode>),
    /// `A & B & C`
    Intersection(Vec<TypeNode>),
    /// `{ key: Type; other?: Type }`
    TypeLiteral(Vec<Member>),
    /// `T[]`
    Array(Box<TypeNode>),
    /// `[T, U?, ...V[]]`
    Tuple(Vec<TupleElement>),
    /// `(a: T) => R` and `new (a: T) => R`
    Function(Box<FunctionType>),
    /// `(T)`
    Parenthesized(Box<TypeNode>),
    /// `typeof value`
    Query(String),
    /// `keyof T`, `readonly T[]`, `unique symbol`
    Operator {
        op: TypeOperator,
        ty: Box<TypeNode>,
    },
    /// `T[K]`
    IndexedAccess {
        object: Box<TypeNode>,
        index: Box<TypeNode>,
    },
    /// `T extends U ? X : Y`
    Conditional {
        check: Box<TypeNode>,
        extends: Box<TypeNode>,
        true_type: Box<TypeNode>,
        false_type: Box<TypeNode>,
    },
    /// `{ [K in keyof T]?: T[K] }`
    Mapped(Box<MappedType>),
    /// `infer U`
    Infer(Ident),
    /// `x is string`, `asserts x`
    Predicate {
        subject: Ident,
        ty: Option<Box<TypeNode>>,
    },
    This,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    String,
    Number,
    Boolean,
    Void,
    Null,
    Undefined,
    Any,
    Unknown,
    Never,
    Object,
    Symbol,
    BigInt,
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Primitive::String => "string",
            Primitive::Number => "number",
            Primitive::Boolean => "boolean",
            Primitive::Void => "void",
            Primitive::Null => "null",
            Primitive::Undefined => "undefined",
            Primitive::Any => "any",
            Primitive::Unknown => "unknown",
            Primitive::Never => "never",
            Primitive::Object => "object",
            Primitive::Symbol => "symbol",
            Primitive::BigInt => "bigint",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralType {
    String(String),
    /// Keeps the sign, e.g. `-1`.
    Number(String),
    Boolean(bool),
    /// Raw text between the backticks.
    Template(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeReference {
    /// Dotted name as written, e.g. `NodeJS.Timeout`.
    pub name: String,
    pub type_args: Vec<TypeNode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeOperator {
    Keyof,
    Readonly,
    Unique,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TupleElement {
    pub ty: TypeNode,
    pub name: Option<Ident>,
    pub optional: bool,
    pub rest: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionType {
    pub is_constructor: bool,
    pub signature: Signature,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MappedType {
    pub key: Ident,
    pub constraint: TypeNode,
    /// `as` clause: `[K in keyof T as Uppercase<K>]`
    pub name_type: Option<TypeNode>,
    pub value_type: Option<TypeNode>,
    pub readonly: Option<MappedModifier>,
    pub optional: Option<MappedModifier>,
}

/// A `+`/`-`/bare modifier in a mapped type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappedModifier {
    Add,
    Remove,
    Preserve,
}
