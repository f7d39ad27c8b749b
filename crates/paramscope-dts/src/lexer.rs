//! Lexer for TypeScript declaration files.

use std::iter::Peekable;
use std::ops::Range;
use std::str::CharIndices;

/// A span in the source file, represented as a byte range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub range: Range<usize>,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { range: start..end }
    }

    pub fn start(&self) -> usize {
        self.range.start
    }

    pub fn end(&self) -> usize {
        self.range.end
    }
}

/// Reserved and contextual words of the declaration grammar.
///
/// All of them are valid property names, so the parser can turn any keyword
/// back into an identifier through [`Keyword::as_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
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
    Readonly,
    Extends,
    Implements,
    New,
    Typeof,
    Keyof,
    Infer,
    As,
    Is,
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
    True,
    False,
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
}

impl Keyword {
    const ALL: &'static [Keyword] = &[
        Keyword::Declare,
        Keyword::Function,
        Keyword::Interface,
        Keyword::Class,
        Keyword::Type,
        Keyword::Namespace,
        Keyword::Module,
        Keyword::Export,
        Keyword::Import,
        Keyword::Const,
        Keyword::Let,
        Keyword::Var,
        Keyword::Readonly,
        Keyword::Extends,
        Keyword::Implements,
        Keyword::New,
        Keyword::Typeof,
        Keyword::Keyof,
        Keyword::Infer,
        Keyword::As,
        Keyword::Is,
        Keyword::From,
        Keyword::Default,
        Keyword::Static,
        Keyword::Public,
        Keyword::Private,
        Keyword::Protected,
        Keyword::Abstract,
        Keyword::In,
        Keyword::Out,
        Keyword::This,
        Keyword::True,
        Keyword::False,
        Keyword::String,
        Keyword::Number,
        Keyword::Boolean,
        Keyword::Void,
        Keyword::Null,
        Keyword::Undefined,
        Keyword::Any,
        Keyword::Unknown,
        Keyword::Never,
        Keyword::Object,
        Keyword::Symbol,
        Keyword::BigInt,
    ];

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
            Keyword::Readonly => "readonly",
            Keyword::Extends => "extends",
            Keyword::Implements => "implements",
            Keyword::New => "new",
            Keyword::Typeof => "typeof",
            Keyword::Keyof => "keyof",
            Keyword::Infer => "infer",
            Keyword::As => "as",
            Keyword::Is => "is",
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
            Keyword::True => "true",
            Keyword::False => "false",
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
        }
    }

    pub fn lookup(word: &str) -> Option<Keyword> {
        Self::ALL.iter().copied().find(|kw| kw.as_str() == word)
    }

    /// Keywords that may also name a declaration or a type (`type`, `module`, ...).
    pub fn is_contextual(self) -> bool {
        matches!(
            self,
            Keyword::Type
                | Keyword::Module
                | Keyword::Namespace
                | Keyword::Default
                | Keyword::From
                | Keyword::As
                | Keyword::Is
                | Keyword::In
                | Keyword::Out
                | Keyword::Declare
                | Keyword::Abstract
                | Keyword::Readonly
                | Keyword::Infer
                | Keyword::Keyof
        )
    }
}

/// Token kinds for TypeScript declaration files.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    StringLiteral(String),
    NumberLiteral(String),
    Keyword(Keyword),

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
    Backtick,  // `

    /// `/// <reference path="..." />` or `/// <reference types="..." />`
    TripleSlashRef(String),
    Eof,
}

impl TokenKind {
    pub fn is_keyword(&self, kw: Keyword) -> bool {
        matches!(self, TokenKind::Keyword(k) if *k == kw)
    }
}

/// A token with its kind and position.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, start: usize, end: usize) -> Self {
        Self {
            kind,
            span: Span::new(start, end),
        }
    }
}

/// Lexer for TypeScript declaration files.
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

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(ch) = self.peek() {
            if !pred(ch) {
                break;
            }
            self.advance();
        }
    }

    fn skip_block_comment(&mut self) {
        loop {
            match self.advance() {
                Some('*') if self.peek() == Some('/') => {
                    self.advance();
                    break;
                }
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
                    Some(c @ ('\\' | '"' | '\'')) => s.push(c),
                    Some(other) => {
                        s.push('\\');
                        s.push(other);
                    }
                    None => break,
                },
                Some(c) if c == quote => break,
                Some(c) => s.push(c),
                None => break,
            }
        }
        s
    }

    fn read_number(&mut self, start: usize) -> String {
        let mut prev = '0';
        while let Some(ch) = self.peek() {
            // A sign only continues a number right after an exponent marker.
            let sign_ok = matches!(ch, '-' | '+') && matches!(prev, 'e' | 'E');
            if ch.is_ascii_alphanumeric() || ch == '.' || ch == '_' || sign_ok {
                prev = ch;
                self.advance();
            } else {
                break;
            }
        }
        self.src[start..self.pos].to_string()
    }

    fn read_word(&mut self, start: usize) -> &'src str {
        let src = self.src;
        self.eat_while(|ch| ch.is_alphanumeric() || ch == '_' || ch == '$');
        &src[start..self.pos]
    }

    /// Reads the rest of a `///` line; returns `kind:value` for reference directives.
    fn read_triple_slash_ref(&mut self) -> Option<String> {
        let start = self.pos;
        self.eat_while(|ch| ch != '\n');
        let content = self.src[start..self.pos].trim_start();
        if !content.starts_with("<reference") {
            return None;
        }
        ["path", "types", "lib"].iter().find_map(|attr| {
            let needle = format!("{attr}=\"");
            let at = content.find(&needle)?;
            let rest = &content[at + needle.len()..];
            let end = rest.find('"')?;
            Some(format!("{attr}:{}", &rest[..end]))
        })
    }

    pub fn next_token(&mut self) -> Token {
        loop {
            self.eat_while(char::is_whitespace);

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
                '`' => TokenKind::Backtick,
                '.' => {
                    if self.src[self.pos..].starts_with("..") {
                        self.advance();
                        self.advance();
                        TokenKind::DotDotDot
                    } else {
                        TokenKind::Dot
                    }
                }
                '=' => {
                    if self.peek() == Some('>') {
                        self.advance();
                        TokenKind::Arrow
                    } else {
                        TokenKind::Eq
                    }
                }
                '/' => match self.peek() {
                    Some('/') => {
                        self.advance();
                        if self.peek() == Some('/') {
                            self.advance();
                            match self.read_triple_slash_ref() {
                                Some(reference) => TokenKind::TripleSlashRef(reference),
                                None => continue,
                            }
                        } else {
                            self.eat_while(|ch| ch != '\n');
                            continue;
                        }
                    }
                    Some('*') => {
                        self.advance();
                        self.skip_block_comment();
                        continue;
                    }
                    _ => TokenKind::Slash,
                },
                '"' | '\'' => TokenKind::StringLiteral(self.read_string(ch)),
                c if c.is_ascii_digit() => TokenKind::NumberLiteral(self.read_number(start)),
                c if c.is_alphabetic() || c == '_' || c == '$' => {
                    let word = self.read_word(start);
                    match Keyword::lookup(word) {
                        Some(kw) => TokenKind::Keyword(kw),
                        None => TokenKind::Ident(word.to_string()),
                    }
                }
                // Decorators, `!` and other punctuation never matter in declarations.
                _ => continue,
            };

            return Token::new(kind, start, self.pos);
        }
    }

    /// Collect all tokens into a vector, ending with a single `Eof` token.
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
    fn test_class_with_constructor() {
        let kinds = kinds("export class BoxGeometry { constructor(width?: number); }");

        assert_eq!(kinds[0], TokenKind::Keyword(Keyword::Export));
        assert_eq!(kinds[1], TokenKind::Keyword(Keyword::Class));
        assert_eq!(kinds[2], TokenKind::Ident("BoxGeometry".to_string()));
        assert_eq!(kinds[3], TokenKind::LBrace);
        assert_eq!(kinds[4], TokenKind::Ident("constructor".to_string()));
        assert_eq!(kinds[5], TokenKind::LParen);
        assert_eq!(kinds[6], TokenKind::Ident("width".to_string()));
        assert_eq!(kinds[7], TokenKind::Question);
        assert_eq!(kinds[8], TokenKind::Colon);
        assert_eq!(kinds[9], TokenKind::Keyword(Keyword::Number));
    }

    #[test]
    fn test_union_type() {
        let kinds = kinds("Color | string | number");

        assert_eq!(kinds[0], TokenKind::Ident("Color".to_string()));
        assert_eq!(kinds[1], TokenKind::Pipe);
        assert_eq!(kinds[2], TokenKind::Keyword(Keyword::String));
        assert_eq!(kinds[3], TokenKind::Pipe);
        assert_eq!(kinds[4], TokenKind::Keyword(Keyword::Number));
        assert_eq!(kinds[5], TokenKind::Eof);
    }

    #[test]
    fn test_comments_are_skipped() {
        let src = r#"
            /**
             * Docs for the parameters interface.
             */
            // line comment
            interface A {}
        "#;
        let kinds = kinds(src);

        assert_eq!(kinds[0], TokenKind::Keyword(Keyword::Interface));
        assert_eq!(kinds[1], TokenKind::Ident("A".to_string()));
    }

    #[test]
    fn test_triple_slash_reference() {
        let src = r#"/// <reference types="node" />
declare function foo(): void;"#;
        let kinds = kinds(src);

        assert_eq!(kinds[0], TokenKind::TripleSlashRef("types:node".to_string()));
        assert_eq!(kinds[1], TokenKind::Keyword(Keyword::Declare));
    }

    #[test]
    fn test_spans_cover_source_text() {
        let src = "export * from './MeshBasicMaterial';";
        let tokens = Lexer::new(src).tokenize();

        assert_eq!(&src[tokens[0].span.range.clone()], "export");
        assert_eq!(tokens[1].kind, TokenKind::Star);
        assert_eq!(tokens[2].kind, TokenKind::Keyword(Keyword::From));
        assert_eq!(
            tokens[3].kind,
            TokenKind::StringLiteral("./MeshBasicMaterial".to_string())
        );
        assert_eq!(&src[tokens[3].span.range.clone()], "'./MeshBasicMaterial'");
    }

    #[test]
    fn test_number_literals_stop_at_operators() {
        let kinds = kinds("1e-3 | 2-3");

        assert_eq!(kinds[0], TokenKind::NumberLiteral("1e-3".to_string()));
        assert_eq!(kinds[1], TokenKind::Pipe);
        assert_eq!(kinds[2], TokenKind::NumberLiteral("2".to_string()));
        assert_eq!(kinds[3], TokenKind::Minus);
        assert_eq!(kinds[4], TokenKind::NumberLiteral("3".to_string()));
    }

    #[test]
    fn test_keywords_round_trip_through_lookup() {
        for kw in Keyword::ALL {
            assert_eq!(Keyword::lookup(kw.as_str()), Some(*kw));
        }
        assert_eq!(Keyword::lookup("constructor"), None);
    }
}
