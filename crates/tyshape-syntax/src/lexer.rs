//! Lexer for TypeScript type declarations.

use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

/// Reserved and contextual words the parser cares about.
///
/// Every keyword is still accepted as a property name, so the parser can
/// always recover the original spelling through [`Keyword::as_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Declare,
    Function,
    Interface,
    Class,
    Type,
    Namespace,
    Module,
    Export,
    Import,
    Const,
    Let,
    Var,
    Enum,
    Readonly,
    Extends,
    Implements,
    New,
    Typeof,
    Keyof,
    Unique,
    Infer,
    As,
    Is,
    Asserts,
    From,
    Default,
    Static,
    Public,
    Private,
    Protected,
    Abstract,
    In,
    Out,
    This,

    // Primitive type keywords
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
    True,
    False,
}

impl Keyword {
    pub fn lookup(word: &str) -> Option<Self> {
        let kw = match word {
            "declare" => Keyword::Declare,
            "function" => Keyword::Function,
            "interface" => Keyword::Interface,
            "class" => Keyword::Class,
            "type" => Keyword::Type,
            "namespace" => Keyword::Namespace,
            "module" => Keyword::Module,
            "export" => Keyword::Export,
            "import" => Keyword::Import,
            "const" => Keyword::Const,
            "let" => Keyword::Let,
            "var" => Keyword::Var,
            "enum" => Keyword::Enum,
            "readonly" => Keyword::Readonly,
            "extends" => Keyword::Extends,
            "implements" => Keyword::Implements,
            "new" => Keyword::New,
            "typeof" => Keyword::Typeof,
            "keyof" => Keyword::Keyof,
            "unique" => Keyword::Unique,
            "infer" => Keyword::Infer,
            "as" => Keyword::As,
            "is" => Keyword::Is,
            "asserts" => Keyword::Asserts,
            "from" => Keyword::From,
            "default" => Keyword::Default,
            "static" => Keyword::Static,
            "public" => Keyword::Public,
            "private" => Keyword::Private,
            "protected" => Keyword::Protected,
            "abstract" => Keyword::Abstract,
            "in" => Keyword::In,
            "out" => Keyword::Out,
            "this" => Keyword::This,
            "string" => Keyword::String,
            "number" => Keyword::Number,
            "boolean" => Keyword::Boolean,
            "void" => Keyword::Void,
            "null" => Keyword::Null,
            "undefined" => Keyword::Undefined,
            "any" => Keyword::Any,
            "unknown" => Keyword::Unknown,
            "never" => Keyword::Never,
            "object" => Keyword::Object,
            "symbol" => Keyword::Symbol,
            "bigint" => Keyword::BigInt,
            "true" => Keyword::True,
            "false" => Keyword::False,
            _ => return None,
        };
        Some(kw)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Declare => "declare",
            Keyword::Function => "function",
            Keyword::Interface => "interface",
            Keyword::Class => "class",
            Keyword::Type => "type",
            Keyword::Namespace => "namespace",
            Keyword::Module => "module",
            Keyword::Export => "export",
            Keyword::Import => "import",
            Keyword::Const => "const",
            Keyword::Let => "let",
            Keyword::Var => "var",
            Keyword::Enum => "enum",
            Keyword::Readonly => "readonly",
            Keyword::Extends => "extends",
            Keyword::Implements => "implements",
            Keyword::New => "new",
            Keyword::Typeof => "typeof",
            Keyword::Keyof => "keyof",
            Keyword::Unique => "unique",
            Keyword::Infer => "infer",
            Keyword::As => "as",
            Keyword::Is => "is",
            Keyword::Asserts => "asserts",
            Keyword::From => "from",
            Keyword::Default => "default",
            Keyword::Static => "static",
            Keyword::Public => "public",
            Keyword::Private => "private",
            Keyword::Protected => "protected",
            Keyword::Abstract => "abstract",
            Keyword::In => "in",
            Keyword::Out => "out",
            Keyword::This => "this",
            Keyword::String => "string",
            Keyword::Number => "number",
            Keyword::Boolean => "boolean",
            Keyword::Void => "void",
            Keyword::Null => "null",
            Keyword::Undefined => "undefined",
            Keyword::Any => "any",
            Keyword::Unknown => "unknown",
            Keyword::Never => "never",
            Keyword::Object => "object",
            Keyword::Symbol => "symbol",
            Keyword::BigInt => "bigint",
            Keyword::True => "true",
            Keyword::False => "false",
        }
    }

    /// Modifiers that may precede a class member name.
    pub fn is_member_modifier(self) -> bool {
        matches!(
            self,
            Keyword::Public
                | Keyword::Private
                | Keyword::Protected
                | Keyword::Static
                | Keyword::Readonly
                | Keyword::Abstract
                | Keyword::Declare
        )
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token kinds for TypeScript declarations.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    Keyword(Keyword),
    /// Unescaped contents of a quoted string.
    StringLiteral(String),
    NumberLiteral(String),
    /// Raw text between the backticks of a template literal.
    TemplateLiteral(String),

    // Punctuation
    LParen,    // (
    RParen,    // )
    LBrace,    // {
    RBrace,    // }
    LBracket,  // [
    RBracket,  // ]
    LAngle,    // <
    RAngle,    // >
    Comma,     // ,
    Semicolon, // ;
    Colon,     // :
    Dot,       // .
    DotDotDot, // ...
    Question,  // ?
    Pipe,      // |
    Amp,       // &
    Arrow,     // =>
    Eq,        // =
    Plus,      // +
    Minus,     // -
    Star,      // *
    Slash,     // /
    Bang,      // !
    At,        // @
    Hash,      // #

    /// `/// <reference path="..." />`, stored as `path:...` or `types:...`.
    TripleSlashRef(String),
    Eof,
}

impl TokenKind {
    pub fn is_keyword(&self, kw: Keyword) -> bool {
        matches!(self, TokenKind::Keyword(k) if *k == kw)
    }
}

/// A token with its kind and byte range.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn new(kind: TokenKind, start: usize, end: usize) -> Self {
        Self { kind, start, end }
    }
}

/// Lexer for TypeScript declarations.
pub struct Lexer<'src> {
    src: &'src str,
    chars: Peekable<CharIndices<'src>>,
    pos: usize,
}

impl<'src> Lexer<'src> {
    pub fn new(src: &'src str) -> Self {
        Self {
            src,
            chars: src.char_indices().peekable(),
            pos: 0,
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn advance(&mut self) -> Option<char> {
        let (pos, ch) = self.chars.next()?;
        self.pos = pos + ch.len_utf8();
        Some(ch)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn skip_line_comment(&mut self) {
        while self.peek().is_some_and(|ch| ch != '\n') {
            self.advance();
        }
    }

    fn skip_block_comment(&mut self) {
        loop {
            match self.advance() {
                Some('*') if self.eat('/') => break,
                None => break,
                _ => {}
            }
        }
    }

    fn read_string(&mut self, quote: char) -> String {
        let mut s = String::new();
        loop {
            match self.advance() {
                Some('\\') => match self.advance() {
                    Some('n') => s.push('\n'),
                    Some('t') => s.push('\t'),
                    Some('r') => s.push('\r'),
                    Some(escaped @ ('\\' | '"' | '\'' | '`')) => s.push(escaped),
                    Some(other) => {
                        s.push('\\');
                        s.push(other);
                    }
                    None => break,
                },
                Some(c) if c == quote => break,
                // Unterminated string; stop at the line end.
                Some('\n') | None => break,
                Some(c) => s.push(c),
            }
        }
        s
    }

    /// Reads up to the closing backtick, skipping over `${ ... }` holes so a
    /// backtick inside a substitution does not end the literal.
    fn read_template(&mut self) -> String {
        let start = self.pos;
        let mut depth = 0usize;
        let end;
        loop {
            match self.advance() {
                Some('\\') => {
                    self.advance();
                }
                Some('$') if depth == 0 && self.eat('{') => depth += 1,
                Some('{') if depth > 0 => depth += 1,
                Some('}') if depth > 0 => depth -= 1,
                Some('`') if depth == 0 => {
                    end = self.pos - 1;
                    break;
                }
                Some(_) => {}
                None => {
                    end = self.pos;
                    break;
                }
            }
        }
        self.src[start..end].to_string()
    }

    fn read_number(&mut self, first: char) -> String {
        let mut s = String::from(first);
        while let Some(ch) = self.peek() {
            let exponent_sign =
                matches!(ch, '-' | '+') && matches!(s.chars().last(), Some('e' | 'E'));
            if ch.is_ascii_alphanumeric() || ch == '.' || ch == '_' || exponent_sign {
                s.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        s
    }

    fn read_ident(&mut self, first: char) -> String {
        let mut s = String::from(first);
        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() || ch == '_' || ch == '$' {
                s.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        s
    }

    fn read_triple_slash_ref(&mut self) -> Option<String> {
        let start = self.pos;
        self.skip_line_comment();
        let content = self.src[start..self.pos].trim();

        if !content.starts_with("<reference") {
            return None;
        }
        for attr in ["path", "types", "lib"] {
            let needle = format!("{attr}=\"");
            if let Some(idx) = content.find(&needle) {
                let rest = &content[idx + needle.len()..];
                let value = rest.split('"').next()?;
                return Some(format!("{attr}:{value}"));
            }
        }
        None
    }

    pub fn next_token(&mut self) -> Token {
        loop {
            self.skip_whitespace();

            let start = self.pos;
            let ch = match self.advance() {
                Some(c) => c,
                None => return Token::new(TokenKind::Eof, start, start),
            };

            let kind = match ch {
                '(' => TokenKind::LParen,
                ')' => TokenKind::RParen,
                '{' => TokenKind::LBrace,
                '}' => TokenKind::RBrace,
                '[' => TokenKind::LBracket,
                ']' => TokenKind::RBracket,
                '<' => TokenKind::LAngle,
                '>' => TokenKind::RAngle,
                ',' => TokenKind::Comma,
                ';' => TokenKind::Semicolon,
                ':' => TokenKind::Colon,
                '?' => TokenKind::Question,
                '|' => TokenKind::Pipe,
                '&' => TokenKind::Amp,
                '+' => TokenKind::Plus,
                '-' => TokenKind::Minus,
                '*' => TokenKind::Star,
                '!' => TokenKind::Bang,
                '@' => TokenKind::At,
                '#' => TokenKind::Hash,
                '.' => {
                    if self.peek() == Some('.') {
                        self.advance();
                        if self.eat('.') {
                            TokenKind::DotDotDot
                        } else {
                            TokenKind::Dot
                        }
                    } else if self.peek().is_some_and(|c| c.is_ascii_digit()) {
                        TokenKind::NumberLiteral(self.read_number('.'))
                    } else {
                        TokenKind::Dot
                    }
                }
                '=' => {
                    if self.eat('>') {
                        TokenKind::Arrow
                    } else {
                        TokenKind::Eq
                    }
                }
                '/' => {
                    if self.eat('/') {
                        if self.eat('/') {
                            match self.read_triple_slash_ref() {
                                Some(reference) => TokenKind::TripleSlashRef(reference),
                                None => continue,
                            }
                        } else {
                            self.skip_line_comment();
                            continue;
                        }
                    } else if self.eat('*') {
                        self.skip_block_comment();
                        continue;
                    } else {
                        TokenKind::Slash
                    }
                }
                '"' | '\'' => TokenKind::StringLiteral(self.read_string(ch)),
                '`' => TokenKind::TemplateLiteral(self.read_template()),
                c if c.is_ascii_digit() => TokenKind::NumberLiteral(self.read_number(c)),
                c if c.is_alphabetic() || c == '_' || c == '$' => {
                    let word = self.read_ident(c);
                    match Keyword::lookup(&word) {
                        Some(kw) => TokenKind::Keyword(kw),
                        None => TokenKind::Ident(word),
                    }
                }
                _ => continue,
            };

            return Token::new(kind, start, self.pos);
        }
    }

    /// Collect all tokens, ending with a single `Eof`.
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src).tokenize().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_type_alias_tokens() {
        let tokens = kinds("type Status = \"active\" | 'inactive';");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Keyword(Keyword::Type),
                TokenKind::Ident("Status".to_string()),
                TokenKind::Eq,
                TokenKind::StringLiteral("active".to_string()),
                TokenKind::Pipe,
                TokenKind::StringLiteral("inactive".to_string()),
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_interface_tokens() {
        let tokens = kinds("interface Foo<T> extends Bar { x: string; }");
        assert_eq!(tokens[0], TokenKind::Keyword(Keyword::Interface));
        assert_eq!(tokens[1], TokenKind::Ident("Foo".to_string()));
        assert_eq!(tokens[2], TokenKind::LAngle);
        assert_eq!(tokens[4], TokenKind::RAngle);
        assert_eq!(tokens[5], TokenKind::Keyword(Keyword::Extends));
        assert_eq!(tokens[10], TokenKind::Keyword(Keyword::String));
    }

    #[test]
    fn test_spans_cover_raw_text() {
        let src = "  winner: \"home\"";
        let tokens = Lexer::new(src).tokenize();
        assert_eq!(&src[tokens[0].start..tokens[0].end], "winner");
        assert_eq!(&src[tokens[2].start..tokens[2].end], "\"home\"");
    }

    #[test]
    fn test_comments_are_skipped() {
        let tokens = kinds("// line\n/* block\n */ id /** doc */ : number");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Ident("id".to_string()),
                TokenKind::Colon,
                TokenKind::Keyword(Keyword::Number),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_arrow_and_rest() {
        let tokens = kinds("(...args: string[]) => void");
        assert_eq!(tokens[0], TokenKind::LParen);
        assert_eq!(tokens[1], TokenKind::DotDotDot);
        assert_eq!(tokens[8], TokenKind::Arrow);
        assert_eq!(tokens[9], TokenKind::Keyword(Keyword::Void));
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("1.5e-3 0x1F")[..2],
            [
                TokenKind::NumberLiteral("1.5e-3".to_string()),
                TokenKind::NumberLiteral("0x1F".to_string()),
            ]
        );
        // A minus between numbers is not swallowed into the literal.
        assert_eq!(
            kinds("1-2")[..3],
            [
                TokenKind::NumberLiteral("1".to_string()),
                TokenKind::Minus,
                TokenKind::NumberLiteral("2".to_string()),
            ]
        );
    }

    #[test]
    fn test_template_literal_with_substitution() {
        let src = "`on${Capitalize<`x${string}`>}Change` ;";
        let tokens = Lexer::new(src).tokenize();
        assert_eq!(
            tokens[0].kind,
            TokenKind::TemplateLiteral("on${Capitalize<`x${string}`>}Change".to_string())
        );
        assert_eq!(tokens[1].kind, TokenKind::Semicolon);
    }

    #[test]
    fn test_triple_slash_reference() {
        let src = "/// <reference types=\"node\" />\ndeclare const x: number;";
        let tokens = kinds(src);
        assert_eq!(tokens[0], TokenKind::TripleSlashRef("types:node".to_string()));
        assert_eq!(tokens[1], TokenKind::Keyword(Keyword::Declare));
    }

    #[test]
    fn test_keyword_round_trip_spelling() {
        for word in ["readonly", "keyof", "bigint", "asserts"] {
            let kw = Keyword::lookup(word).unwrap();
            assert_eq!(kw.as_str(), word);
        }
        assert!(Keyword::lookup("Status").is_none());
    }
}
