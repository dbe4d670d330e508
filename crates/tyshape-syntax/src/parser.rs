//! Error-tolerant recursive descent parser for TypeScript declarations.
//!
//! The parser never gives up on a file: a statement or member that cannot be
//! parsed is recorded as a [`ParseError`] and skipped, and parsing resumes at
//! the next synchronisation point.

use thiserror::Error;
use tracing::trace;

use crate::ast::*;
use crate::lexer::{Keyword, Lexer, Token, TokenKind};

/// A parse error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parse error at {}: {message}", .span.start)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// The tree for a source text together with everything that was skipped.
#[derive(Debug, Clone)]
pub struct Parsed {
    pub file: SourceFile,
    pub errors: Vec<ParseError>,
}

impl Parsed {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Parse source text into a [`SourceFile`]. Never fails; see [`Parsed::errors`].
pub fn parse(src: &str) -> Parsed {
    let mut parser = Parser::new(src);
    let statements = parser.parse_statements(false);
    Parsed {
        file: SourceFile {
            text: src.to_string(),
            statements,
        },
        errors: parser.errors,
    }
}

/// Keywords that may still name a type, parameter or declaration.
fn is_contextual(kw: Keyword) -> bool {
    matches!(
        kw,
        Keyword::Type
            | Keyword::Namespace
            | Keyword::Module
            | Keyword::Declare
            | Keyword::Abstract
            | Keyword::Readonly
            | Keyword::Keyof
            | Keyword::Unique
            | Keyword::Infer
            | Keyword::As
            | Keyword::Is
            | Keyword::Asserts
            | Keyword::From
            | Keyword::Out
            | Keyword::Static
            | Keyword::Public
            | Keyword::Private
            | Keyword::Protected
            | Keyword::String
            | Keyword::Number
            | Keyword::Boolean
            | Keyword::Any
            | Keyword::Unknown
            | Keyword::Never
            | Keyword::Object
            | Keyword::Symbol
            | Keyword::BigInt
            | Keyword::Undefined
    )
}

fn ident_text(kind: &TokenKind) -> Option<String> {
    match kind {
        TokenKind::Ident(name) => Some(name.clone()),
        TokenKind::Keyword(kw) if is_contextual(*kw) => Some(kw.as_str().to_string()),
        _ => None,
    }
}

/// Keywords that can open a declaration statement.
fn starts_statement(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Keyword(
            Keyword::Export
                | Keyword::Declare
                | Keyword::Interface
                | Keyword::Type
                | Keyword::Namespace
                | Keyword::Module
                | Keyword::Function
                | Keyword::Class
                | Keyword::Abstract
                | Keyword::Const
                | Keyword::Let
                | Keyword::Var
                | Keyword::Enum
                | Keyword::Import
        )
    )
}

fn primitive(kw: Keyword) -> Option<Primitive> {
    let prim = match kw {
        Keyword::String => Primitive::String,
        Keyword::Number => Primitive::Number,
        Keyword::Boolean => Primitive::Boolean,
        Keyword::Void => Primitive::Void,
        Keyword::Null => Primitive::Null,
        Keyword::Undefined => Primitive::Undefined,
        Keyword::Any => Primitive::Any,
        Keyword::Unknown => Primitive::Unknown,
        Keyword::Never => Primitive::Never,
        Keyword::Object => Primitive::Object,
        Keyword::Symbol => Primitive::Symbol,
        Keyword::BigInt => Primitive::BigInt,
        _ => return None,
    };
    Some(prim)
}

/// Nesting limit for statements and types; deeper input is reported and skipped.
pub const MAX_NESTING: usize = 64;

struct Parser<'src> {
    src: &'src str,
    tokens: Vec<Token>,
    pos: usize,
    /// End offset of the last consumed token.
    last_end: usize,
    /// Statements and types currently open.
    depth: usize,
    errors: Vec<ParseError>,
}

impl<'src> Parser<'src> {
    fn new(src: &'src str) -> Self {
        let tokens = Lexer::new(src).tokenize();
        Self {
            src,
            tokens,
            pos: 0,
            last_end: 0,
            depth: 0,
            errors: Vec::new(),
        }
    }

    // ---------------------------------------------------------------------
    // Token plumbing
    // ---------------------------------------------------------------------

    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> &TokenKind {
        &self.current().kind
    }

    fn peek_nth(&self, n: usize) -> &TokenKind {
        let idx = (self.pos + n).min(self.tokens.len() - 1);
        &self.tokens[idx].kind
    }

    fn start(&self) -> usize {
        self.current().start
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.last_end.max(start))
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
            self.last_end = token.end;
        }
        token
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek(), TokenKind::Eof)
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek() == kind
    }

    fn check_kw(&self, kw: Keyword) -> bool {
        self.peek().is_keyword(kw)
    }

    fn matches(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn matches_kw(&mut self, kw: Keyword) -> bool {
        if self.check_kw(kw) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        let token = self.current();
        ParseError {
            message: message.into(),
            span: Span::new(token.start, token.end),
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error(format!("expected {:?}, found {:?}", kind, self.peek())))
        }
    }

    fn expect_kw(&mut self, kw: Keyword) -> ParseResult<Token> {
        if self.check_kw(kw) {
            Ok(self.advance())
        } else {
            Err(self.error(format!("expected `{kw}`, found {:?}", self.peek())))
        }
    }

    fn expect_ident(&mut self) -> ParseResult<Ident> {
        match ident_text(self.peek()) {
            Some(name) => {
                let token = self.advance();
                Ok(Ident {
                    name,
                    span: Span::new(token.start, token.end),
                })
            }
            None => Err(self.error(format!("expected identifier, found {:?}", self.peek()))),
        }
    }

    fn is_ident_like(&self, n: usize) -> bool {
        ident_text(self.peek_nth(n)).is_some()
    }

    /// True when a line break separates the current token from the previous one.
    fn newline_before(&self) -> bool {
        if self.pos == 0 {
            return true;
        }
        let prev = &self.tokens[self.pos - 1];
        self.src
            .get(prev.end..self.current().start)
            .is_some_and(|gap| gap.contains('\n'))
    }

    /// Consume a bracketed group starting at the current opener, nested
    /// groups of the same kind included.
    fn skip_group(&mut self, open: TokenKind, close: TokenKind) {
        let mut depth = 0usize;
        loop {
            if self.at_eof() {
                return;
            }
            let token = self.advance();
            if token.kind == open {
                depth += 1;
            } else if token.kind == close {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return;
                }
            }
        }
    }

    /// Skip tokens until a `;` (consumed), an unmatched closer (left in
    /// place), or, at statement level, a new declaration on a fresh line.
    fn synchronize(&mut self, stop_at_comma: bool) {
        let mut depth = 0usize;
        loop {
            match self.peek() {
                TokenKind::Eof => return,
                TokenKind::LBrace | TokenKind::LParen | TokenKind::LBracket => depth += 1,
                TokenKind::RBrace | TokenKind::RParen | TokenKind::RBracket => {
                    if depth == 0 {
                        if self.check(&TokenKind::RBrace) {
                            return;
                        }
                    } else {
                        depth -= 1;
                        if depth == 0 && self.check(&TokenKind::RBrace) && !stop_at_comma {
                            self.advance();
                            return;
                        }
                    }
                }
                TokenKind::Semicolon if depth == 0 => {
                    self.advance();
                    return;
                }
                TokenKind::Comma if depth == 0 && stop_at_comma => {
                    self.advance();
                    return;
                }
                kind if depth == 0 && !stop_at_comma && starts_statement(kind) => {
                    if self.newline_before() {
                        return;
                    }
                }
                _ => {}
            }
            self.advance();
        }
    }

    fn recover(&mut self, error: ParseError, start_pos: usize, in_members: bool) {
        trace!(error = %error, "recovering");
        self.errors.push(error);
        if self.pos == start_pos {
            if self.check(&TokenKind::LBrace) {
                self.skip_group(TokenKind::LBrace, TokenKind::RBrace);
                return;
            }
            self.advance();
        }
        self.synchronize(in_members);
    }

    /// Run `parse` one nesting level deeper, failing past [`MAX_NESTING`].
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        if self.depth >= MAX_NESTING {
            return Err(self.error(format!("nesting deeper than {MAX_NESTING} levels")));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    // ---------------------------------------------------------------------
    // Statements
    // ---------------------------------------------------------------------

    /// Parse statements until EOF, or until the closing `}` of a block body.
    fn parse_statements(&mut self, in_block: bool) -> Vec<Statement> {
        let mut statements = Vec::new();
        loop {
            if self.at_eof() || (in_block && self.check(&TokenKind::RBrace)) {
                break;
            }
            if let TokenKind::TripleSlashRef(_) = self.peek() {
                self.advance();
                continue;
            }
            let start_pos = self.pos;
            match self.parse_statement() {
                Ok(Some(stmt)) => statements.push(stmt),
                Ok(None) => {}
                Err(err) => self.recover(err, start_pos, false),
            }
        }
        statements
    }

    fn parse_statement(&mut self) -> ParseResult<Option<Statement>> {
        self.nested(Self::parse_statement_at_depth)
    }

    fn parse_statement_at_depth(&mut self) -> ParseResult<Option<Statement>> {
        let start = self.start();
        self.skip_decorators();

        let mut exported = false;
        loop {
            match self.peek() {
                TokenKind::Keyword(Keyword::Export) => {
                    exported = true;
                    self.advance();
                }
                TokenKind::Keyword(Keyword::Declare) if !self.next_is_punctuation() => {
                    self.advance();
                }
                _ => break,
            }
        }

        if exported {
            if let Some(export) = self.parse_export_clause()? {
                return Ok(Some(Statement {
                    kind: StatementKind::Export(export),
                    span: self.span_from(start),
                }));
            }
            if self.at_eof() || self.check(&TokenKind::Semicolon) {
                return Ok(None);
            }
        }

        let kind = match self.peek().clone() {
            TokenKind::Keyword(Keyword::Type) if self.is_ident_like(1) => {
                StatementKind::TypeAlias(self.parse_type_alias()?)
            }
            TokenKind::Keyword(Keyword::Interface) => {
                StatementKind::Interface(self.parse_interface()?)
            }
            TokenKind::Keyword(Keyword::Namespace | Keyword::Module) => {
                StatementKind::Namespace(self.parse_namespace()?)
            }
            TokenKind::Ident(name) if name == "global" && self.peek_nth(1) == &TokenKind::LBrace => {
                StatementKind::Namespace(self.parse_namespace()?)
            }
            TokenKind::Keyword(Keyword::Function)
                if self.is_ident_like(1) || self.peek_nth(1) == &TokenKind::Star =>
            {
                StatementKind::Function(self.parse_function()?)
            }
            TokenKind::Keyword(Keyword::Abstract)
                if self.peek_nth(1).is_keyword(Keyword::Class) =>
            {
                self.advance();
                StatementKind::Class(self.parse_class()?)
            }
            TokenKind::Keyword(Keyword::Class) => StatementKind::Class(self.parse_class()?),
            TokenKind::Keyword(Keyword::Const) if self.peek_nth(1).is_keyword(Keyword::Enum) => {
                self.advance();
                StatementKind::Enum(self.parse_enum()?)
            }
            TokenKind::Keyword(Keyword::Enum) => StatementKind::Enum(self.parse_enum()?),
            TokenKind::Keyword(Keyword::Const | Keyword::Let | Keyword::Var) => {
                StatementKind::Variable(self.parse_variable()?)
            }
            TokenKind::Keyword(Keyword::Import) => {
                self.advance();
                self.synchronize(false);
                return Ok(None);
            }
            TokenKind::Semicolon | TokenKind::Eof => {
                self.advance();
                return Ok(None);
            }
            TokenKind::LBrace if !exported => StatementKind::Block(self.parse_block("block")),
            _ if exported => return Err(self.error("expected a declaration after `export`")),
            _ => {
                // Not a declaration: skip it.
                self.advance();
                return Ok(None);
            }
        };

        Ok(Some(Statement {
            kind,
            span: self.span_from(start),
        }))
    }

    fn next_is_punctuation(&self) -> bool {
        !matches!(
            self.peek_nth(1),
            TokenKind::Ident(_) | TokenKind::Keyword(_) | TokenKind::StringLiteral(_)
        )
    }

    fn skip_decorators(&mut self) {
        while self.matches(&TokenKind::At) {
            // @name.path(args)
            while self.is_ident_like(0) || self.check(&TokenKind::Dot) {
                self.advance();
            }
            if self.check(&TokenKind::LParen) {
                self.skip_group(TokenKind::LParen, TokenKind::RParen);
            }
        }
    }

    /// The export forms that are not followed by a declaration.
    fn parse_export_clause(&mut self) -> ParseResult<Option<Export>> {
        if self.matches(&TokenKind::Eq) {
            let name = self.expect_ident()?;
            self.matches(&TokenKind::Semicolon);
            return Ok(Some(Export::Equals(name)));
        }
        if self.check_kw(Keyword::Default) {
            self.advance();
            let declaration_follows = matches!(
                self.peek(),
                TokenKind::Keyword(
                    Keyword::Interface | Keyword::Class | Keyword::Function | Keyword::Abstract
                )
            );
            if declaration_follows {
                return Ok(None);
            }
            let name = self.expect_ident()?;
            self.matches(&TokenKind::Semicolon);
            return Ok(Some(Export::Default(name)));
        }
        if self.check_kw(Keyword::Type) && self.peek_nth(1) == &TokenKind::LBrace {
            self.advance();
        }
        if self.check(&TokenKind::LBrace) {
            return Ok(Some(Export::Named(self.parse_named_exports()?)));
        }
        if matches!(
            self.peek(),
            TokenKind::Star | TokenKind::Keyword(Keyword::Import | Keyword::As)
        ) {
            // `export * from "x"`, `export import A = B`, `export as namespace X`
            self.synchronize(false);
            return Ok(Some(Export::Named(Vec::new())));
        }
        Ok(None)
    }

    fn parse_named_exports(&mut self) -> ParseResult<Vec<Ident>> {
        self.expect(&TokenKind::LBrace)?;
        let mut names = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_eof() {
            if self.check_kw(Keyword::Type) && self.is_ident_like(1) {
                self.advance();
            }
            let name = match self.peek() {
                TokenKind::Keyword(Keyword::Default) => {
                    let token = self.advance();
                    Ident {
                        name: "default".to_string(),
                        span: Span::new(token.start, token.end),
                    }
                }
                _ => self.expect_ident()?,
            };
            if self.matches_kw(Keyword::As) {
                self.advance();
            }
            names.push(name);
            if !self.matches(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RBrace)?;
        if self.matches_kw(Keyword::From) {
            self.advance();
        }
        self.matches(&TokenKind::Semicolon);
        Ok(names)
    }

    fn parse_type_alias(&mut self) -> ParseResult<TypeAlias> {
        self.expect_kw(Keyword::Type)?;
        let name = self.expect_ident()?;
        let type_params = self.parse_type_params()?;
        self.expect(&TokenKind::Eq)?;
        let ty = self.parse_type()?;
        self.matches(&TokenKind::Semicolon);
        Ok(TypeAlias {
            name,
            type_params,
            ty,
        })
    }

    fn parse_interface(&mut self) -> ParseResult<Interface> {
        self.expect_kw(Keyword::Interface)?;
        let name = self.expect_ident()?;
        let type_params = self.parse_type_params()?;

        let mut extends = Vec::new();
        if self.matches_kw(Keyword::Extends) {
            loop {
                extends.push(self.parse_type()?);
                if !self.matches(&TokenKind::Comma) {
                    break;
                }
            }
        }

        let members = self.parse_members(false)?;
        Ok(Interface {
            name,
            type_params,
            extends,
            members,
        })
    }

    fn parse_namespace(&mut self) -> ParseResult<Namespace> {
        // `namespace`, `module` or the `global` identifier
        let keyword = self.advance();

        let name = match self.peek().clone() {
            TokenKind::LBrace if matches!(keyword.kind, TokenKind::Ident(_)) => Ident {
                name: "global".to_string(),
                span: Span::new(keyword.start, keyword.end),
            },
            TokenKind::StringLiteral(value) => {
                let token = self.advance();
                Ident {
                    name: value,
                    span: Span::new(token.start, token.end),
                }
            }
            _ => {
                let first = self.expect_ident()?;
                let mut name = first.name;
                while self.check(&TokenKind::Dot) && self.is_ident_like(1) {
                    self.advance();
                    name.push('.');
                    name.push_str(&self.expect_ident()?.name);
                }
                Ident {
                    name,
                    span: self.span_from(first.span.start),
                }
            }
        };

        // `declare module "x";` has no body.
        if !self.matches(&TokenKind::LBrace) {
            self.matches(&TokenKind::Semicolon);
            return Ok(Namespace {
                name,
                body: Vec::new(),
            });
        }

        let body = self.parse_block_body(&format!("`{}`", name.name));
        Ok(Namespace { name, body })
    }

    /// A `{ ... }` statement block, starting at the `{`.
    fn parse_block(&mut self, what: &str) -> Vec<Statement> {
        self.advance();
        self.parse_block_body(what)
    }

    /// Statements up to and including the closing `}`.
    fn parse_block_body(&mut self, what: &str) -> Vec<Statement> {
        let body = self.parse_statements(true);
        if !self.matches(&TokenKind::RBrace) {
            let err = self.error(format!("expected `}}` to close {what}"));
            self.errors.push(err);
        }
        body
    }

    fn parse_function(&mut self) -> ParseResult<Function> {
        self.expect_kw(Keyword::Function)?;
        self.matches(&TokenKind::Star);
        let name = self.expect_ident()?;
        let signature = self.parse_signature()?;
        let body = if self.check(&TokenKind::LBrace) {
            self.parse_block(&format!("body of `{}`", name.name))
        } else {
            Vec::new()
        };
        self.matches(&TokenKind::Semicolon);
        Ok(Function {
            name,
            signature,
            body,
        })
    }

    fn parse_class(&mut self) -> ParseResult<Class> {
        self.expect_kw(Keyword::Class)?;
        let name = if self.is_ident_like(0) && !self.check_kw(Keyword::Implements) {
            Some(self.expect_ident()?)
        } else {
            None
        };
        let type_params = self.parse_type_params()?;

        let extends = if self.matches_kw(Keyword::Extends) {
            Some(self.parse_type()?)
        } else {
            None
        };

        let mut implements = Vec::new();
        if self.matches_kw(Keyword::Implements) {
            loop {
                implements.push(self.parse_type()?);
                if !self.matches(&TokenKind::Comma) {
                    break;
                }
            }
        }

        let members = self.parse_members(true)?;
        Ok(Class {
            name,
            type_params,
            extends,
            implements,
            members,
        })
    }

    fn parse_variable(&mut self) -> ParseResult<Variable> {
        // const / let / var
        self.advance();

        let mut declarators = Vec::new();
        loop {
            let name = self.parse_binding_name()?;
            self.matches(&TokenKind::Bang);
            let ty = if self.matches(&TokenKind::Colon) {
                Some(self.parse_type()?)
            } else {
                None
            };
            if self.matches(&TokenKind::Eq) {
                self.skip_initializer();
            }
            declarators.push(Declarator { name, ty });
            if !self.matches(&TokenKind::Comma) {
                break;
            }
        }
        self.matches(&TokenKind::Semicolon);
        Ok(Variable { declarators })
    }

    fn parse_enum(&mut self) -> ParseResult<Enum> {
        self.expect_kw(Keyword::Enum)?;
        let name = self.expect_ident()?;
        self.expect(&TokenKind::LBrace)?;

        let mut members = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_eof() {
            let member = self.parse_property_name()?;
            let text = match member.kind {
                PropertyNameKind::Ident(s)
                | PropertyNameKind::String(s)
                | PropertyNameKind::Number(s)
                | PropertyNameKind::Private(s) => s,
                PropertyNameKind::Computed => self.src[member.span.range()].to_string(),
            };
            members.push(Ident {
                name: text,
                span: member.span,
            });
            if self.matches(&TokenKind::Eq) {
                self.skip_initializer();
            }
            if !self.matches(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(Enum { name, members })
    }

    /// Skip an initializer expression up to the next `,`, `;` or closer at
    /// depth zero.
    fn skip_initializer(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.peek() {
                TokenKind::Eof => return,
                TokenKind::LBrace | TokenKind::LParen | TokenKind::LBracket => depth += 1,
                TokenKind::RBrace | TokenKind::RParen | TokenKind::RBracket => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                }
                TokenKind::Comma | TokenKind::Semicolon if depth == 0 => return,
                _ => {}
            }
            self.advance();
        }
    }

    // ---------------------------------------------------------------------
    // Members
    // ---------------------------------------------------------------------

    /// Parse a `{ ... }` member list of an interface, object type or class.
    fn parse_members(&mut self, in_class: bool) -> ParseResult<Vec<Member>> {
        self.expect(&TokenKind::LBrace)?;
        let mut members = Vec::new();

        while !self.check(&TokenKind::RBrace) && !self.at_eof() {
            let start_pos = self.pos;
            match self.parse_member(in_class) {
                Ok(Some(member)) => members.push(member),
                Ok(None) => {}
                Err(err) => self.recover(err, start_pos, true),
            }
        }

        if !self.matches(&TokenKind::RBrace) {
            let err = self.error("expected `}` to close member list");
            self.errors.push(err);
        }
        Ok(members)
    }

    /// Check if the current modifier-like word is actually a modifier.
    /// `readonly: boolean` names a property; `readonly name: string` does not.
    fn is_modifier_not_property(&self) -> bool {
        !matches!(
            self.peek_nth(1),
            TokenKind::Colon
                | TokenKind::Question
                | TokenKind::Bang
                | TokenKind::LParen
                | TokenKind::LAngle
                | TokenKind::Semicolon
                | TokenKind::Comma
                | TokenKind::Eq
                | TokenKind::RBrace
                | TokenKind::Eof
        )
    }

    fn parse_member(&mut self, in_class: bool) -> ParseResult<Option<Member>> {
        if self.matches(&TokenKind::Semicolon) || self.matches(&TokenKind::Comma) {
            return Ok(None);
        }
        if in_class {
            self.skip_decorators();
        }
        let start = self.start();

        let mut readonly = false;
        loop {
            match self.peek() {
                TokenKind::Keyword(Keyword::Readonly) if self.is_modifier_not_property() => {
                    readonly = true;
                    self.advance();
                }
                TokenKind::Keyword(kw)
                    if in_class && kw.is_member_modifier() && self.is_modifier_not_property() =>
                {
                    self.advance();
                }
                TokenKind::Ident(word)
                    if matches!(word.as_str(), "get" | "set" | "accessor" | "override")
                        && self.is_modifier_not_property() =>
                {
                    self.advance();
                }
                _ => break,
            }
        }

        let mut kind = if self.check(&TokenKind::LBracket) && self.is_index_signature() {
            MemberKind::Index(self.parse_index_signature(readonly)?)
        } else if self.check(&TokenKind::LParen) || self.check(&TokenKind::LAngle) {
            MemberKind::Call(self.parse_signature()?)
        } else if self.check_kw(Keyword::New)
            && matches!(self.peek_nth(1), TokenKind::LParen | TokenKind::LAngle)
        {
            self.advance();
            MemberKind::Construct(self.parse_signature()?)
        } else {
            let name = self.parse_property_name()?;
            let optional = self.matches(&TokenKind::Question);
            self.matches(&TokenKind::Bang);

            if self.check(&TokenKind::LParen) || self.check(&TokenKind::LAngle) {
                MemberKind::Method(MethodSignature {
                    name,
                    optional,
                    signature: self.parse_signature()?,
                    body: Vec::new(),
                })
            } else {
                let ty = if self.matches(&TokenKind::Colon) {
                    Some(self.parse_type()?)
                } else {
                    None
                };
                if in_class && self.matches(&TokenKind::Eq) {
                    self.skip_initializer();
                }
                MemberKind::Property(PropertySignature {
                    name,
                    optional,
                    readonly,
                    ty,
                })
            }
        };

        let has_body = in_class && self.check(&TokenKind::LBrace);
        if has_body {
            let body = self.parse_block("method body");
            if let MemberKind::Method(method) = &mut kind {
                method.body = body;
            }
        }
        let span = self.span_from(start);
        if !(self.matches(&TokenKind::Semicolon) || self.matches(&TokenKind::Comma))
            && !has_body
            && !self.check(&TokenKind::RBrace)
            && !self.at_eof()
            && !self.newline_before()
        {
            let err = self.error(format!("expected `;` after member, found {:?}", self.peek()));
            self.errors.push(err);
        }

        Ok(Some(Member { kind, span }))
    }

    /// `[key: T]` as opposed to a computed name like `[Symbol.iterator]`.
    fn is_index_signature(&self) -> bool {
        matches!(self.peek_nth(1), TokenKind::Ident(_) | TokenKind::Keyword(_))
            && self.peek_nth(2) == &TokenKind::Colon
    }

    fn parse_index_signature(&mut self, readonly: bool) -> ParseResult<IndexSignature> {
        self.expect(&TokenKind::LBracket)?;
        let key_start = self.start();
        let key_name = self.parse_binding_name()?;
        self.expect(&TokenKind::Colon)?;
        let key_type = self.parse_type()?;
        let key = Param {
            name: key_name,
            ty: Some(key_type),
            optional: false,
            rest: false,
            span: self.span_from(key_start),
        };
        self.expect(&TokenKind::RBracket)?;
        self.matches(&TokenKind::Question);
        let value_type = if self.matches(&TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        Ok(IndexSignature {
            key,
            value_type,
            readonly,
        })
    }

    /// Accept any identifier, keyword, string, number or computed name.
    fn parse_property_name(&mut self) -> ParseResult<PropertyName> {
        let start = self.start();
        let kind = match self.peek().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                PropertyNameKind::Ident(name)
            }
            TokenKind::Keyword(kw) => {
                self.advance();
                PropertyNameKind::Ident(kw.as_str().to_string())
            }
            TokenKind::StringLiteral(value) => {
                self.advance();
                PropertyNameKind::String(value)
            }
            TokenKind::NumberLiteral(value) => {
                self.advance();
                PropertyNameKind::Number(value)
            }
            TokenKind::LBracket => {
                self.skip_group(TokenKind::LBracket, TokenKind::RBracket);
                PropertyNameKind::Computed
            }
            TokenKind::Hash if self.is_ident_like(1) => {
                self.advance();
                let ident = self.expect_ident()?;
                PropertyNameKind::Private(ident.name)
            }
            _ => {
                return Err(self.error(format!(
                    "expected property name, found {:?}",
                    self.peek()
                )))
            }
        };
        Ok(PropertyName {
            kind,
            span: self.span_from(start),
        })
    }

    // ---------------------------------------------------------------------
    // Signatures
    // ---------------------------------------------------------------------

    fn parse_signature(&mut self) -> ParseResult<Signature> {
        let type_params = self.parse_type_params()?;
        let params = self.parse_params()?;
        let return_type = if self.matches(&TokenKind::Colon) {
            Some(Box::new(self.parse_return_type()?))
        } else {
            None
        };
        Ok(Signature {
            type_params,
            params,
            return_type,
        })
    }

    fn parse_type_params(&mut self) -> ParseResult<Vec<TypeParam>> {
        if !self.matches(&TokenKind::LAngle) {
            return Ok(Vec::new());
        }

        let mut params = Vec::new();
        while !self.check(&TokenKind::RAngle) && !self.at_eof() {
            let start = self.start();
            // Variance and const modifiers
            while matches!(
                self.peek(),
                TokenKind::Keyword(Keyword::In | Keyword::Out | Keyword::Const)
            ) && self.is_ident_like(1)
            {
                self.advance();
            }

            let name = self.expect_ident()?;
            let constraint = if self.matches_kw(Keyword::Extends) {
                Some(self.parse_type()?)
            } else {
                None
            };
            let default = if self.matches(&TokenKind::Eq) {
                Some(self.parse_type()?)
            } else {
                None
            };

            params.push(TypeParam {
                name,
                constraint,
                default,
                span: self.span_from(start),
            });

            if !self.matches(&TokenKind::Comma) {
                break;
            }
        }

        self.expect(&TokenKind::RAngle)?;
        Ok(params)
    }

    /// A parameter or variable name, including destructuring patterns.
    fn parse_binding_name(&mut self) -> ParseResult<Ident> {
        let start = self.start();
        match self.peek() {
            TokenKind::LBrace => self.skip_group(TokenKind::LBrace, TokenKind::RBrace),
            TokenKind::LBracket => self.skip_group(TokenKind::LBracket, TokenKind::RBracket),
            // `this` and reserved words used as parameter names
            TokenKind::Keyword(_) => {
                self.advance();
            }
            _ => return self.expect_ident(),
        }
        let span = self.span_from(start);
        Ok(Ident {
            name: self.src[span.range()].to_string(),
            span,
        })
    }

    fn parse_params(&mut self) -> ParseResult<Vec<Param>> {
        self.expect(&TokenKind::LParen)?;

        let mut params = Vec::new();
        while !self.check(&TokenKind::RParen) && !self.at_eof() {
            self.skip_decorators();
            while let TokenKind::Keyword(kw) = self.peek() {
                if kw.is_member_modifier() && self.is_modifier_not_property() {
                    self.advance();
                } else {
                    break;
                }
            }

            let start = self.start();
            let rest = self.matches(&TokenKind::DotDotDot);
            let name = self.parse_binding_name()?;
            let optional = self.matches(&TokenKind::Question);
            let ty = if self.matches(&TokenKind::Colon) {
                Some(self.parse_type()?)
            } else {
                None
            };
            if self.matches(&TokenKind::Eq) {
                self.skip_initializer();
            }

            params.push(Param {
                name,
                ty,
                optional,
                rest,
                span: self.span_from(start),
            });

            if !self.matches(&TokenKind::Comma) {
                break;
            }
        }

        self.expect(&TokenKind::RParen)?;
        Ok(params)
    }

    /// A return type, which may be a type predicate.
    fn parse_return_type(&mut self) -> ParseResult<TypeNode> {
        let start = self.start();
        let asserts = self.check_kw(Keyword::Asserts)
            && (self.is_ident_like(1) || self.peek_nth(1).is_keyword(Keyword::This));
        if asserts {
            self.advance();
        }

        let subject_is_name = self.is_ident_like(0) || self.check_kw(Keyword::This);
        if subject_is_name && (asserts || self.peek_nth(1).is_keyword(Keyword::Is)) {
            let subject = self.parse_binding_name()?;
            let ty = if self.matches_kw(Keyword::Is) {
                Some(Box::new(self.parse_type()?))
            } else {
                None
            };
            return Ok(TypeNode::new(
                TypeKind::Predicate { subject, ty },
                self.span_from(start),
            ));
        }

        self.parse_type()
    }

    // ---------------------------------------------------------------------
    // Types
    // ---------------------------------------------------------------------

    fn parse_type(&mut self) -> ParseResult<TypeNode> {
        self.parse_type_inner(true)
    }

    fn parse_type_inner(&mut self, allow_conditional: bool) -> ParseResult<TypeNode> {
        let check = self.parse_union_type()?;
        if !allow_conditional || !self.check_kw(Keyword::Extends) {
            return Ok(check);
        }

        self.advance();
        let extends = self.parse_type_inner(false)?;
        self.expect(&TokenKind::Question)?;
        let true_type = self.parse_type()?;
        self.expect(&TokenKind::Colon)?;
        let false_type = self.parse_type()?;

        let span = self.span_from(check.span.start);
        Ok(TypeNode::new(
            TypeKind::Conditional {
                check: Box::new(check),
                extends: Box::new(extends),
                true_type: Box::new(true_type),
                false_type: Box::new(false_type),
            },
            span,
        ))
    }

    fn parse_union_type(&mut self) -> ParseResult<TypeNode> {
        let start = self.start();
        let leading = self.matches(&TokenKind::Pipe);
        let first = self.parse_intersection_type()?;
        if !leading && !self.check(&TokenKind::Pipe) {
            return Ok(first);
        }

        let mut types = vec![first];
        while self.matches(&TokenKind::Pipe) {
            types.push(self.parse_intersection_type()?);
        }
        Ok(TypeNode::new(TypeKind::Union(types), self.span_from(start)))
    }

    fn parse_intersection_type(&mut self) -> ParseResult<TypeNode> {
        let start = self.start();
        let leading = self.matches(&TokenKind::Amp);
        let first = self.parse_type_operator()?;
        if !leading && !self.check(&TokenKind::Amp) {
            return Ok(first);
        }

        let mut types = vec![first];
        while self.matches(&TokenKind::Amp) {
            types.push(self.parse_type_operator()?);
        }
        Ok(TypeNode::new(
            TypeKind::Intersection(types),
            self.span_from(start),
        ))
    }

    fn parse_type_operator(&mut self) -> ParseResult<TypeNode> {
        self.nested(Self::parse_type_operator_at_depth)
    }

    fn parse_type_operator_at_depth(&mut self) -> ParseResult<TypeNode> {
        let start = self.start();
        let op = match self.peek() {
            TokenKind::Keyword(Keyword::Keyof) => Some(TypeOperator::Keyof),
            TokenKind::Keyword(Keyword::Unique) => Some(TypeOperator::Unique),
            TokenKind::Keyword(Keyword::Readonly) => Some(TypeOperator::Readonly),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let ty = self.parse_type_operator()?;
            return Ok(TypeNode::new(
                TypeKind::Operator {
                    op,
                    ty: Box::new(ty),
                },
                self.span_from(start),
            ));
        }

        if self.matches_kw(Keyword::Infer) {
            let name = self.expect_ident()?;
            return Ok(TypeNode::new(TypeKind::Infer(name), self.span_from(start)));
        }

        self.parse_postfix_type()
    }

    fn parse_postfix_type(&mut self) -> ParseResult<TypeNode> {
        let mut ty = self.parse_primary_type()?;

        while self.check(&TokenKind::LBracket) && !self.newline_before() {
            let start = ty.span.start;
            self.advance();
            if self.matches(&TokenKind::RBracket) {
                ty = TypeNode::new(TypeKind::Array(Box::new(ty)), self.span_from(start));
                continue;
            }
            let index = self.parse_type()?;
            self.expect(&TokenKind::RBracket)?;
            ty = TypeNode::new(
                TypeKind::IndexedAccess {
                    object: Box::new(ty),
                    index: Box::new(index),
                },
                self.span_from(start),
            );
        }

        Ok(ty)
    }

    fn parse_primary_type(&mut self) -> ParseResult<TypeNode> {
        let start = self.start();
        let prim = match self.peek() {
            TokenKind::Keyword(kw) if self.peek_nth(1) != &TokenKind::Dot => primitive(*kw),
            _ => None,
        };
        if let Some(prim) = prim {
            self.advance();
            return Ok(TypeNode::new(TypeKind::Keyword(prim), self.span_from(start)));
        }

        let kind = match self.peek().clone() {
            TokenKind::Keyword(Keyword::True) => {
                self.advance();
                TypeKind::Literal(LiteralType::Boolean(true))
            }
            TokenKind::Keyword(Keyword::False) => {
                self.advance();
                TypeKind::Literal(LiteralType::Boolean(false))
            }
            TokenKind::StringLiteral(value) => {
                self.advance();
                TypeKind::Literal(LiteralType::String(value))
            }
            TokenKind::NumberLiteral(value) => {
                self.advance();
                TypeKind::Literal(LiteralType::Number(value))
            }
            TokenKind::Minus => {
                self.advance();
                match self.peek().clone() {
                    TokenKind::NumberLiteral(value) => {
                        self.advance();
                        TypeKind::Literal(LiteralType::Number(format!("-{value}")))
                    }
                    _ => return Err(self.error("expected number after `-` in type")),
                }
            }
            TokenKind::TemplateLiteral(raw) => {
                self.advance();
                TypeKind::Literal(LiteralType::Template(raw))
            }
            TokenKind::Keyword(Keyword::This) => {
                self.advance();
                TypeKind::This
            }
            TokenKind::Keyword(Keyword::Typeof) => {
                self.advance();
                let name = if self.check_kw(Keyword::Import) {
                    self.parse_import_type_name()?
                } else {
                    self.parse_entity_name()?
                };
                if self.check(&TokenKind::LAngle) && !self.newline_before() {
                    self.parse_type_args()?;
                }
                TypeKind::Query(name)
            }
            TokenKind::Keyword(Keyword::Import) => {
                let name = self.parse_import_type_name()?;
                let type_args = self.parse_optional_type_args()?;
                TypeKind::Reference(TypeReference { name, type_args })
            }
            TokenKind::LParen if self.is_start_of_function_type() => {
                return self.parse_function_type(false)
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_type()?;
                self.expect(&TokenKind::RParen)?;
                TypeKind::Parenthesized(Box::new(inner))
            }
            TokenKind::LAngle => return self.parse_function_type(false),
            TokenKind::Keyword(Keyword::New | Keyword::Abstract) => {
                if self.matches_kw(Keyword::Abstract) && !self.check_kw(Keyword::New) {
                    return Err(self.error("expected `new` after `abstract` in type"));
                }
                self.advance();
                let mut ctor = self.parse_function_type(true)?;
                ctor.span.start = start;
                return Ok(ctor);
            }
            TokenKind::LBrace if self.is_start_of_mapped_type() => {
                TypeKind::Mapped(Box::new(self.parse_mapped_type()?))
            }
            TokenKind::LBrace => TypeKind::TypeLiteral(self.parse_members(false)?),
            TokenKind::LBracket => TypeKind::Tuple(self.parse_tuple_elements()?),
            _ if self.is_ident_like(0) => {
                let name = self.parse_entity_name()?;
                let type_args = self.parse_optional_type_args()?;
                TypeKind::Reference(TypeReference { name, type_args })
            }
            other => {
                return Err(self.error(format!("unexpected token in type position: {other:?}")))
            }
        };
        Ok(TypeNode::new(kind, self.span_from(start)))
    }

    /// `A.B.C`, with keywords allowed after a dot.
    fn parse_entity_name(&mut self) -> ParseResult<String> {
        let mut name = match self.peek().clone() {
            TokenKind::Keyword(kw) if primitive(kw).is_some() || kw == Keyword::This => {
                self.advance();
                kw.as_str().to_string()
            }
            _ => self.expect_ident()?.name,
        };
        while self.check(&TokenKind::Dot) {
            self.advance();
            match self.peek().clone() {
                TokenKind::Ident(part) => name.push_str(&format!(".{part}")),
                TokenKind::Keyword(kw) => name.push_str(&format!(".{kw}")),
                _ => return Err(self.error("expected name after `.`")),
            }
            self.advance();
        }
        Ok(name)
    }

    /// `import("module").Name`, kept as written.
    fn parse_import_type_name(&mut self) -> ParseResult<String> {
        let start = self.start();
        self.expect_kw(Keyword::Import)?;
        self.expect(&TokenKind::LParen)?;
        match self.peek() {
            TokenKind::StringLiteral(_) => {
                self.advance();
            }
            _ => return Err(self.error("expected module specifier in `import(...)`")),
        }
        self.expect(&TokenKind::RParen)?;
        if self.matches(&TokenKind::Dot) {
            self.parse_entity_name()?;
        }
        Ok(self.src[self.span_from(start).range()].to_string())
    }

    fn parse_optional_type_args(&mut self) -> ParseResult<Vec<TypeNode>> {
        if self.check(&TokenKind::LAngle) && !self.newline_before() {
            self.parse_type_args()
        } else {
            Ok(Vec::new())
        }
    }

    fn parse_type_args(&mut self) -> ParseResult<Vec<TypeNode>> {
        self.expect(&TokenKind::LAngle)?;
        let mut args = Vec::new();
        while !self.check(&TokenKind::RAngle) && !self.at_eof() {
            args.push(self.parse_type()?);
            if !self.matches(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RAngle)?;
        Ok(args)
    }

    /// At `(`: a function type if the matching `)` is followed by `=>`.
    fn is_start_of_function_type(&self) -> bool {
        let mut depth = 0usize;
        let mut idx = self.pos;
        while idx < self.tokens.len() {
            match self.tokens[idx].kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        return matches!(
                            self.tokens.get(idx + 1).map(|t| &t.kind),
                            Some(TokenKind::Arrow)
                        );
                    }
                }
                TokenKind::Eof => return false,
                _ => {}
            }
            idx += 1;
        }
        false
    }

    /// Parses `<T>(params) => R`; the caller has consumed any `new`.
    fn parse_function_type(&mut self, is_constructor: bool) -> ParseResult<TypeNode> {
        let start = self.start();
        let type_params = self.parse_type_params()?;
        let params = self.parse_params()?;
        self.expect(&TokenKind::Arrow)?;
        let return_type = self.parse_return_type()?;

        Ok(TypeNode::new(
            TypeKind::Function(Box::new(FunctionType {
                is_constructor,
                signature: Signature {
                    type_params,
                    params,
                    return_type: Some(Box::new(return_type)),
                },
            })),
            self.span_from(start),
        ))
    }

    /// At `{`: `{ [K in ...` with optional `readonly`, `+readonly` or `-readonly`.
    fn is_start_of_mapped_type(&self) -> bool {
        let mut n = 1;
        if matches!(self.peek_nth(n), TokenKind::Plus | TokenKind::Minus) {
            if !self.peek_nth(n + 1).is_keyword(Keyword::Readonly) {
                return false;
            }
            n += 1;
        }
        if self.peek_nth(n).is_keyword(Keyword::Readonly) {
            n += 1;
        }
        self.peek_nth(n) == &TokenKind::LBracket
            && self.is_ident_like(n + 1)
            && self.peek_nth(n + 2).is_keyword(Keyword::In)
    }

    fn parse_mapped_modifier(&mut self, target: &TokenKind) -> Option<MappedModifier> {
        let modifier = match self.peek() {
            TokenKind::Plus if self.peek_nth(1) == target => MappedModifier::Add,
            TokenKind::Minus if self.peek_nth(1) == target => MappedModifier::Remove,
            kind if kind == target => {
                self.advance();
                return Some(MappedModifier::Preserve);
            }
            _ => return None,
        };
        self.advance();
        self.advance();
        Some(modifier)
    }

    fn parse_mapped_type(&mut self) -> ParseResult<MappedType> {
        self.expect(&TokenKind::LBrace)?;
        let readonly = self.parse_mapped_modifier(&TokenKind::Keyword(Keyword::Readonly));

        self.expect(&TokenKind::LBracket)?;
        let key = self.expect_ident()?;
        self.expect_kw(Keyword::In)?;
        let constraint = self.parse_type()?;
        let name_type = if self.matches_kw(Keyword::As) {
            Some(self.parse_type()?)
        } else {
            None
        };
        self.expect(&TokenKind::RBracket)?;

        let optional = self.parse_mapped_modifier(&TokenKind::Question);
        let value_type = if self.matches(&TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        if !self.matches(&TokenKind::Semicolon) {
            self.matches(&TokenKind::Comma);
        }
        self.expect(&TokenKind::RBrace)?;

        Ok(MappedType {
            key,
            constraint,
            name_type,
            value_type,
            readonly,
            optional,
        })
    }

    fn parse_tuple_elements(&mut self) -> ParseResult<Vec<TupleElement>> {
        self.expect(&TokenKind::LBracket)?;

        let mut elements = Vec::new();
        while !self.check(&TokenKind::RBracket) && !self.at_eof() {
            let rest = self.matches(&TokenKind::DotDotDot);

            let labelled = (self.is_ident_like(0) || matches!(self.peek(), TokenKind::Keyword(_)))
                && (self.peek_nth(1) == &TokenKind::Colon
                    || (self.peek_nth(1) == &TokenKind::Question
                        && self.peek_nth(2) == &TokenKind::Colon));

            let (name, mut optional, ty) = if labelled {
                let name = self.parse_binding_name()?;
                let optional = self.matches(&TokenKind::Question);
                self.expect(&TokenKind::Colon)?;
                (Some(name), optional, self.parse_type()?)
            } else {
                (None, false, self.parse_type()?)
            };
            optional |= self.matches(&TokenKind::Question);

            elements.push(TupleElement {
                ty,
                name,
                optional,
                rest,
            });

            if !self.matches(&TokenKind::Comma) {
                break;
            }
        }

        self.expect(&TokenKind::RBracket)?;
        Ok(elements)
    }
}
