//! Parser for TypeScript declaration files.

use crate::ast::*;
use crate::lexer::{Keyword, Lexer, Span, Token, TokenKind};

/// A parse error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("parse error at byte {}: {message}", .span.range.start)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Parse a .d.ts source string into a DtsFile.
pub fn parse(src: &str) -> ParseResult<DtsFile> {
    let mut parser = Parser::new(src);
    parser.parse_file()
}

/// Parser for TypeScript declaration files.
struct Parser<'src> {
    tokens: Vec<Token>,
    pos: usize,
    src: &'src str,
}

impl<'src> Parser<'src> {
    fn new(src: &'src str) -> Self {
        let tokens = Lexer::new(src).tokenize();
        Self {
            tokens,
            pos: 0,
            src,
        }
    }

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

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(kind)
    }

    fn check_kw(&self, kw: Keyword) -> bool {
        self.peek().is_keyword(kw)
    }

    fn check_ident(&self, word: &str) -> bool {
        matches!(self.peek(), TokenKind::Ident(name) if name == word)
    }

    fn at_end(&self) -> bool {
        self.check(&TokenKind::Eof)
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

    fn error<T>(&self, message: impl Into<String>) -> ParseResult<T> {
        Err(ParseError {
            message: message.into(),
            span: self.current().span.clone(),
        })
    }

    fn expect(&mut self, kind: &TokenKind) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            self.error(format!("expected {:?}, found {:?}", kind, self.peek()))
        }
    }

    fn expect_kw(&mut self, kw: Keyword) -> ParseResult<Token> {
        if self.check_kw(kw) {
            Ok(self.advance())
        } else {
            self.error(format!("expected `{}`, found {:?}", kw.as_str(), self.peek()))
        }
    }

    /// An identifier, or a contextual keyword used as one.
    fn expect_ident(&mut self) -> ParseResult<String> {
        match self.peek().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name)
            }
            TokenKind::Keyword(kw) if kw.is_contextual() || kw == Keyword::This => {
                self.advance();
                Ok(kw.as_str().to_string())
            }
            other => self.error(format!("expected identifier, found {other:?}")),
        }
    }

    /// `A` or `A.B.C`.
    fn expect_qualified_name(&mut self) -> ParseResult<String> {
        let mut name = self.expect_ident()?;
        while self.check(&TokenKind::Dot) {
            self.advance();
            name.push('.');
            name.push_str(&self.expect_property_name()?);
        }
        Ok(name)
    }

    /// Property names accept any identifier, keyword, or string/number literal.
    fn expect_property_name(&mut self) -> ParseResult<String> {
        match self.peek().clone() {
            TokenKind::Ident(name) | TokenKind::StringLiteral(name) | TokenKind::NumberLiteral(name) => {
                self.advance();
                Ok(name)
            }
            TokenKind::Keyword(kw) => {
                self.advance();
                Ok(kw.as_str().to_string())
            }
            TokenKind::LBracket => self.computed_property_name(),
            other => self.error(format!("expected property name, found {other:?}")),
        }
    }

    fn is_property_name_start(&self) -> bool {
        matches!(
            self.peek(),
            TokenKind::Ident(_)
                | TokenKind::StringLiteral(_)
                | TokenKind::NumberLiteral(_)
                | TokenKind::Keyword(_)
                | TokenKind::LBracket
        )
    }

    /// `[Symbol.iterator]` and similar keys, kept as their source text.
    fn computed_property_name(&mut self) -> ParseResult<String> {
        let open = self.expect(&TokenKind::LBracket)?;
        let mut depth = 1usize;
        while depth > 0 {
            match self.advance().kind {
                TokenKind::LBracket => depth += 1,
                TokenKind::RBracket => depth -= 1,
                TokenKind::Eof => return self.error("unterminated computed property name"),
                _ => {}
            }
        }
        let end = self.tokens[self.pos - 1].span.end();
        Ok(self.src[open.span.start()..end].to_string())
    }

    /// Index of the token closing the group opened at `open_idx`.
    fn matching_close(&self, open_idx: usize) -> Option<usize> {
        let mut depth = 0usize;
        for (idx, token) in self.tokens.iter().enumerate().skip(open_idx) {
            match token.kind {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Some(idx);
                    }
                }
                TokenKind::Eof => return None,
                _ => {}
            }
        }
        None
    }

    fn skip_balanced_braces(&mut self) {
        if let Some(close) = self.matching_close(self.pos) {
            self.pos = close;
            self.advance();
        }
    }

    /// Check if a modifier-like word is actually a member name.
    ///
    /// `readonly: boolean` names a property; `readonly name: string` is a
    /// modifier. Followed by `:`, `?`, `(`, `<`, `;` or `,` the word is a name.
    fn is_modifier_not_property(&self) -> bool {
        !matches!(
            self.peek_nth(1),
            TokenKind::Colon
                | TokenKind::Question
                | TokenKind::LParen
                | TokenKind::LAngle
                | TokenKind::Semicolon
                | TokenKind::Comma
                | TokenKind::RBrace
        )
    }

    /// Declarations carry no bodies, but `constructor() {}` is tolerated.
    fn skip_body_or_semicolon(&mut self) {
        if self.check(&TokenKind::LBrace) {
            self.skip_balanced_braces();
        } else {
            self.matches(&TokenKind::Semicolon);
        }
    }

    fn skip_member_terminator(&mut self) {
        if !self.matches(&TokenKind::Semicolon) {
            self.matches(&TokenKind::Comma);
        }
    }

    fn parse_file(&mut self) -> ParseResult<DtsFile> {
        let mut items = Vec::new();

        while !self.at_end() {
            if let TokenKind::TripleSlashRef(_) = self.peek() {
                self.advance();
                continue;
            }

            if let Some(item) = self.parse_item()? {
                items.push(item);
            }
        }

        Ok(DtsFile { items })
    }

    fn parse_item(&mut self) -> ParseResult<Option<DtsItem>> {
        let mut exported = false;
        let mut is_abstract = false;

        loop {
            match self.peek() {
                TokenKind::Keyword(Keyword::Export) => {
                    exported = true;
                    self.advance();
                }
                TokenKind::Keyword(Keyword::Declare) => {
                    self.advance();
                }
                TokenKind::Keyword(Keyword::Abstract)
                    if self.peek_nth(1).is_keyword(Keyword::Class) =>
                {
                    is_abstract = true;
                    self.advance();
                }
                // `export default class ..` exports the declaration itself.
                TokenKind::Keyword(Keyword::Default)
                    if exported
                        && matches!(
                            self.peek_nth(1),
                            TokenKind::Keyword(
                                Keyword::Class
                                    | Keyword::Interface
                                    | Keyword::Function
                                    | Keyword::Abstract
                            )
                        ) =>
                {
                    self.advance();
                }
                _ => break,
            }
        }

        if exported {
            if self.check_kw(Keyword::As) {
                // `export as namespace THREE;` only affects global script usage.
                self.skip_until_semicolon();
                return Ok(None);
            }
            if let Some(export) = self.parse_export_statement()? {
                return Ok(Some(DtsItem::Export(export)));
            }
        }

        match self.peek().clone() {
            TokenKind::Keyword(Keyword::Function) => {
                Ok(Some(DtsItem::Function(self.parse_function(exported)?)))
            }
            TokenKind::Keyword(Keyword::Interface) => {
                Ok(Some(DtsItem::Interface(self.parse_interface(exported)?)))
            }
            TokenKind::Keyword(Keyword::Class) => Ok(Some(DtsItem::Class(
                self.parse_class(exported, is_abstract)?,
            ))),
            TokenKind::Keyword(Keyword::Type)
                if matches!(self.peek_nth(1), TokenKind::Ident(_)) =>
            {
                Ok(Some(DtsItem::TypeAlias(self.parse_type_alias(exported)?)))
            }
            TokenKind::Keyword(Keyword::Const)
                if matches!(self.peek_nth(1), TokenKind::Ident(name) if name == "enum") =>
            {
                self.advance();
                self.skip_enum();
                Ok(None)
            }
            TokenKind::Keyword(Keyword::Const | Keyword::Let | Keyword::Var) => {
                Ok(Some(DtsItem::Variable(self.parse_variable(exported)?)))
            }
            TokenKind::Keyword(Keyword::Namespace) => {
                Ok(Some(DtsItem::Namespace(self.parse_namespace(exported)?)))
            }
            TokenKind::Ident(name) if name == "global" && self.peek_nth(1) == &TokenKind::LBrace => {
                Ok(Some(DtsItem::Namespace(self.parse_namespace(exported)?)))
            }
            TokenKind::Ident(name) if name == "enum" => {
                self.skip_enum();
                Ok(None)
            }
            TokenKind::Keyword(Keyword::Module) => Ok(Some(DtsItem::Module(self.parse_module()?))),
            TokenKind::Keyword(Keyword::Import) => {
                self.skip_until_semicolon();
                Ok(None)
            }
            _ => {
                // Stray semicolons, statements, and anything else a declaration file
                // may carry but this grammar does not model.
                self.advance();
                Ok(None)
            }
        }
    }

    /// Export forms that are not a declaration: `export =`, `export default name`,
    /// `export * from` and `export { .. }`.
    fn parse_export_statement(&mut self) -> ParseResult<Option<DtsExport>> {
        if self.matches(&TokenKind::Eq) {
            let name = self.expect_qualified_name()?;
            self.matches(&TokenKind::Semicolon);
            return Ok(Some(DtsExport::Equals(name)));
        }

        if self.matches_kw(Keyword::Default) {
            let name = self.expect_qualified_name()?;
            self.matches(&TokenKind::Semicolon);
            return Ok(Some(DtsExport::Default(name)));
        }

        if self.check(&TokenKind::Star) {
            return self.parse_export_all().map(Some);
        }

        if self.check_kw(Keyword::Type) && self.peek_nth(1) == &TokenKind::LBrace {
            self.advance();
        }
        if self.check(&TokenKind::LBrace) {
            return self.parse_named_exports().map(Some);
        }

        Ok(None)
    }

    fn skip_until_semicolon(&mut self) {
        while !self.check(&TokenKind::Semicolon) && !self.at_end() {
            self.advance();
        }
        self.matches(&TokenKind::Semicolon);
    }

    fn skip_enum(&mut self) {
        while !self.check(&TokenKind::LBrace) && !self.at_end() {
            self.advance();
        }
        self.skip_balanced_braces();
    }

    fn expect_module_specifier(&mut self) -> ParseResult<String> {
        match self.peek().clone() {
            TokenKind::StringLiteral(s) => {
                self.advance();
                Ok(s)
            }
            other => self.error(format!("expected module specifier, found {other:?}")),
        }
    }

    fn parse_export_all(&mut self) -> ParseResult<DtsExport> {
        self.expect(&TokenKind::Star)?;
        if self.matches_kw(Keyword::As) {
            self.expect_ident()?;
        }
        self.expect_kw(Keyword::From)?;
        let module = self.expect_module_specifier()?;
        self.matches(&TokenKind::Semicolon);
        Ok(DtsExport::All(module))
    }

    fn parse_named_exports(&mut self) -> ParseResult<DtsExport> {
        self.expect(&TokenKind::LBrace)?;
        let mut names = Vec::new();

        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            if self.check_kw(Keyword::Type) && self.is_modifier_not_property() {
                self.advance();
            }
            let name = self.expect_property_name()?;
            let alias = if self.matches_kw(Keyword::As) {
                Some(self.expect_property_name()?)
            } else {
                None
            };
            names.push((name, alias));

            if !self.matches(&TokenKind::Comma) {
                break;
            }
        }

        self.expect(&TokenKind::RBrace)?;
        let from = if self.matches_kw(Keyword::From) {
            Some(self.expect_module_specifier()?)
        } else {
            None
        };
        self.matches(&TokenKind::Semicolon);
        Ok(DtsExport::Named { names, from })
    }

    fn parse_return_annotation(&mut self) -> ParseResult<Option<DtsType>> {
        if self.matches(&TokenKind::Colon) {
            Ok(Some(self.parse_type()?))
        } else {
            Ok(None)
        }
    }

    fn parse_function(&mut self, exported: bool) -> ParseResult<DtsFunction> {
        self.expect_kw(Keyword::Function)?;
        let name = self.expect_ident()?;
        let type_params = self.parse_type_params()?;
        let params = self.parse_params()?;
        let return_type = self.parse_return_annotation()?;
        self.matches(&TokenKind::Semicolon);

        Ok(DtsFunction {
            name,
            exported,
            type_params,
            params,
            return_type,
        })
    }

    fn parse_interface(&mut self, exported: bool) -> ParseResult<DtsInterface> {
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

        let members = self.parse_interface_body()?;

        Ok(DtsInterface {
            name,
            exported,
            type_params,
            extends,
            members,
        })
    }

    fn parse_interface_body(&mut self) -> ParseResult<Vec<InterfaceMember>> {
        self.expect(&TokenKind::LBrace)?;
        let mut members = Vec::new();

        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            if let Some(member) = self.parse_interface_member()? {
                members.push(member);
            }
        }

        self.expect(&TokenKind::RBrace)?;
        Ok(members)
    }

    fn is_index_signature(&self) -> bool {
        self.check(&TokenKind::LBracket)
            && matches!(self.peek_nth(1), TokenKind::Ident(_) | TokenKind::Keyword(_))
            && self.peek_nth(2) == &TokenKind::Colon
    }

    fn parse_interface_member(&mut self) -> ParseResult<Option<InterfaceMember>> {
        let readonly = self.check_kw(Keyword::Readonly) && self.is_modifier_not_property();
        if readonly {
            self.advance();
        }
        self.skip_accessor_keyword();

        if self.is_index_signature() {
            let sig = self.parse_index_signature(readonly)?;
            return Ok(Some(InterfaceMember::IndexSignature(sig)));
        }

        if self.check(&TokenKind::LParen) || self.check(&TokenKind::LAngle) {
            let type_params = self.parse_type_params()?;
            let params = self.parse_params()?;
            let return_type = self.parse_return_annotation()?;
            self.skip_member_terminator();
            return Ok(Some(InterfaceMember::CallSignature(CallSignature {
                type_params,
                params,
                return_type,
            })));
        }

        if self.check_kw(Keyword::New) && self.is_modifier_not_property() {
            self.advance();
            let type_params = self.parse_type_params()?;
            let params = self.parse_params()?;
            let return_type = self.parse_return_annotation()?;
            self.skip_member_terminator();
            return Ok(Some(InterfaceMember::ConstructSignature(
                ConstructSignature {
                    type_params,
                    params,
                    return_type,
                },
            )));
        }

        if !self.is_property_name_start() {
            self.advance();
            return Ok(None);
        }
        let name = self.expect_property_name()?;
        let optional = self.matches(&TokenKind::Question);

        if self.check(&TokenKind::LParen) || self.check(&TokenKind::LAngle) {
            let type_params = self.parse_type_params()?;
            let params = self.parse_params()?;
            let return_type = self.parse_return_annotation()?;
            self.skip_member_terminator();
            return Ok(Some(InterfaceMember::Method(MethodMember {
                name,
                type_params,
                params,
                return_type,
                optional,
            })));
        }

        self.expect(&TokenKind::Colon)?;
        let ty = self.parse_type()?;
        self.skip_member_terminator();

        Ok(Some(InterfaceMember::Property(PropertyMember {
            name,
            ty,
            optional,
            readonly,
        })))
    }

    /// `get`/`set` accessor prefixes; the accessor is then read as a method.
    fn skip_accessor_keyword(&mut self) {
        if (self.check_ident("get") || self.check_ident("set")) && self.is_modifier_not_property() {
            self.advance();
        }
    }

    fn parse_index_signature(&mut self, readonly: bool) -> ParseResult<IndexSignature> {
        self.expect(&TokenKind::LBracket)?;
        let key_name = self.expect_property_name()?;
        self.expect(&TokenKind::Colon)?;
        let key_type = self.parse_type()?;
        self.expect(&TokenKind::RBracket)?;
        self.matches(&TokenKind::Question);
        self.expect(&TokenKind::Colon)?;
        let value_type = self.parse_type()?;
        self.skip_member_terminator();

        Ok(IndexSignature {
            key_name,
            key_type,
            value_type,
            readonly,
        })
    }

    fn parse_class(&mut self, exported: bool, is_abstract: bool) -> ParseResult<DtsClass> {
        self.expect_kw(Keyword::Class)?;
        let name = self.expect_ident()?;
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

        let members = self.parse_class_body()?;

        Ok(DtsClass {
            name,
            exported,
            is_abstract,
            type_params,
            extends,
            implements,
            members,
        })
    }

    fn parse_class_body(&mut self) -> ParseResult<Vec<ClassMember>> {
        self.expect(&TokenKind::LBrace)?;
        let mut members = Vec::new();

        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            if let Some(member) = self.parse_class_member()? {
                members.push(member);
            }
        }

        self.expect(&TokenKind::RBrace)?;
        Ok(members)
    }

    fn parse_constructor(&mut self) -> ParseResult<ClassMember> {
        let type_params = self.parse_type_params()?;
        let params = self.parse_params()?;
        let return_type = self.parse_return_annotation()?;
        self.skip_body_or_semicolon();
        Ok(ClassMember::Constructor(ConstructSignature {
            type_params,
            params,
            return_type,
        }))
    }

    fn parse_class_member(&mut self) -> ParseResult<Option<ClassMember>> {
        let mut visibility = Visibility::Public;
        let mut is_static = false;
        let mut readonly = false;

        loop {
            if !self.is_modifier_not_property() {
                break;
            }
            match self.peek() {
                TokenKind::Keyword(Keyword::Public) => visibility = Visibility::Public,
                TokenKind::Keyword(Keyword::Private) => visibility = Visibility::Private,
                TokenKind::Keyword(Keyword::Protected) => visibility = Visibility::Protected,
                TokenKind::Keyword(Keyword::Static) => is_static = true,
                TokenKind::Keyword(Keyword::Readonly) => readonly = true,
                TokenKind::Keyword(Keyword::Abstract | Keyword::Declare) => {}
                TokenKind::Ident(word) if word == "override" || word == "accessor" => {}
                _ => break,
            }
            self.advance();
        }
        self.skip_accessor_keyword();

        let opens_signature = matches!(self.peek_nth(1), TokenKind::LParen | TokenKind::LAngle);
        if self.check_ident("constructor") && opens_signature {
            self.advance();
            return self.parse_constructor().map(Some);
        }
        if self.check_kw(Keyword::New) && opens_signature {
            self.advance();
            return self.parse_constructor().map(Some);
        }
        if self.check(&TokenKind::LParen) {
            return self.parse_constructor().map(Some);
        }

        if self.is_index_signature() {
            let sig = self.parse_index_signature(readonly)?;
            return Ok(Some(ClassMember::IndexSignature(sig)));
        }

        if !self.is_property_name_start() {
            self.advance();
            return Ok(None);
        }
        let name = self.expect_property_name()?;
        let optional = self.matches(&TokenKind::Question);

        if self.check(&TokenKind::LParen) || self.check(&TokenKind::LAngle) {
            let type_params = self.parse_type_params()?;
            let params = self.parse_params()?;
            let return_type = self.parse_return_annotation()?;
            self.skip_body_or_semicolon();
            return Ok(Some(ClassMember::Method(ClassMethod {
                name,
                type_params,
                params,
                return_type,
                is_static,
                visibility,
            })));
        }

        let ty = self.parse_return_annotation()?;
        self.matches(&TokenKind::Semicolon);

        Ok(Some(ClassMember::Property(ClassProperty {
            name,
            ty,
            optional,
            readonly,
            is_static,
            visibility,
        })))
    }

    fn parse_type_alias(&mut self, exported: bool) -> ParseResult<DtsTypeAlias> {
        self.expect_kw(Keyword::Type)?;
        let name = self.expect_ident()?;
        let type_params = self.parse_type_params()?;
        self.expect(&TokenKind::Eq)?;
        let ty = self.parse_type()?;
        self.matches(&TokenKind::Semicolon);

        Ok(DtsTypeAlias {
            name,
            exported,
            type_params,
            ty,
        })
    }

    fn parse_variable(&mut self, exported: bool) -> ParseResult<DtsVariable> {
        let is_const = self.matches_kw(Keyword::Const);
        if !is_const && !self.matches_kw(Keyword::Let) {
            self.expect_kw(Keyword::Var)?;
        }

        let name = self.expect_property_name()?;
        let ty = match self.parse_return_annotation()? {
            Some(ty) => ty,
            None => DtsType::Primitive(Primitive::Any),
        };
        // `declare const a: A, b: B;` keeps the first binding only.
        self.skip_until_semicolon();

        Ok(DtsVariable {
            name,
            exported,
            ty,
            is_const,
        })
    }

    fn parse_namespace(&mut self, exported: bool) -> ParseResult<DtsNamespace> {
        if !self.matches_kw(Keyword::Namespace) {
            // `declare global { .. }`
            self.advance();
        }
        let name = if self.check(&TokenKind::LBrace) {
            "global".to_string()
        } else {
            self.expect_qualified_name()?
        };

        let items = self.parse_block_items()?;
        Ok(DtsNamespace {
            name,
            exported,
            items,
        })
    }

    fn parse_module(&mut self) -> ParseResult<DtsModule> {
        self.expect_kw(Keyword::Module)?;

        let name = match self.peek().clone() {
            TokenKind::StringLiteral(s) => {
                self.advance();
                s
            }
            TokenKind::Ident(_) => self.expect_qualified_name()?,
            _ => return self.error("expected module name"),
        };

        if !self.check(&TokenKind::LBrace) {
            // `declare module "foo";` shorthand ambient module
            self.matches(&TokenKind::Semicolon);
            return Ok(DtsModule {
                name,
                items: Vec::new(),
            });
        }

        let items = self.parse_block_items()?;
        Ok(DtsModule { name, items })
    }

    fn parse_block_items(&mut self) -> ParseResult<Vec<DtsItem>> {
        self.expect(&TokenKind::LBrace)?;

        let mut items = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            if let Some(item) = self.parse_item()? {
                items.push(item);
            }
        }

        self.expect(&TokenKind::RBrace)?;
        Ok(items)
    }

    fn parse_type_params(&mut self) -> ParseResult<Vec<TypeParam>> {
        if !self.matches(&TokenKind::LAngle) {
            return Ok(Vec::new());
        }

        let mut params = Vec::new();
        loop {
            // Variance and const modifiers
            while (self.check_kw(Keyword::In) || self.check_kw(Keyword::Out) || self.check_kw(Keyword::Const))
                && matches!(self.peek_nth(1), TokenKind::Ident(_) | TokenKind::Keyword(_))
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
            });

            if !self.matches(&TokenKind::Comma) || self.check(&TokenKind::RAngle) {
                break;
            }
        }

        self.expect(&TokenKind::RAngle)?;
        Ok(params)
    }

    fn parse_params(&mut self) -> ParseResult<Vec<Param>> {
        self.expect(&TokenKind::LParen)?;

        let mut params = Vec::new();
        while !self.check(&TokenKind::RParen) && !self.at_end() {
            // `this` parameters only constrain the receiver.
            if self.check_kw(Keyword::This) && self.peek_nth(1) == &TokenKind::Colon {
                self.advance();
                self.advance();
                self.parse_type()?;
                if !self.matches(&TokenKind::Comma) {
                    break;
                }
                continue;
            }

            // Parameter properties: `constructor(public x: number)`
            while matches!(
                self.peek(),
                TokenKind::Keyword(
                    Keyword::Public | Keyword::Private | Keyword::Protected | Keyword::Readonly
                )
            ) && self.is_modifier_not_property()
            {
                self.advance();
            }

            let rest = self.matches(&TokenKind::DotDotDot);

            let name = if self.check(&TokenKind::LBrace) || self.check(&TokenKind::LBracket) {
                self.destructuring_pattern()?
            } else {
                self.expect_property_name()?
            };
            let optional = self.matches(&TokenKind::Question);

            let ty = self.parse_return_annotation()?;

            params.push(Param {
                name,
                ty,
                optional,
                rest,
            });

            if !self.matches(&TokenKind::Comma) {
                break;
            }
        }

        self.expect(&TokenKind::RParen)?;
        Ok(params)
    }

    /// `{ a, b }` or `[a, b]` binding patterns, kept as their source text.
    fn destructuring_pattern(&mut self) -> ParseResult<String> {
        let start = self.current().span.start();
        let close = match self.matching_close(self.pos) {
            Some(close) => close,
            None => return self.error("unterminated binding pattern"),
        };
        let end = self.tokens[close].span.end();
        self.pos = close;
        self.advance();
        Ok(self.src[start..end].to_string())
    }

    fn parse_type(&mut self) -> ParseResult<DtsType> {
        self.parse_union_type()
    }

    fn parse_union_type(&mut self) -> ParseResult<DtsType> {
        // Leading pipe: `type A = | B | C`
        self.matches(&TokenKind::Pipe);

        let mut types = vec![self.parse_intersection_type()?];

        while self.matches(&TokenKind::Pipe) {
            types.push(self.parse_intersection_type()?);
        }

        if types.len() == 1 {
            Ok(types.remove(0))
        } else {
            Ok(DtsType::Union(types))
        }
    }

    fn parse_intersection_type(&mut self) -> ParseResult<DtsType> {
        self.matches(&TokenKind::Amp);

        let mut types = vec![self.parse_postfix_type()?];

        while self.matches(&TokenKind::Amp) {
            types.push(self.parse_postfix_type()?);
        }

        if types.len() == 1 {
            Ok(types.remove(0))
        } else {
            Ok(DtsType::Intersection(types))
        }
    }

    fn parse_postfix_type(&mut self) -> ParseResult<DtsType> {
        let mut ty = self.parse_primary_type()?;

        while self.check(&TokenKind::LBracket) {
            self.advance();
            if self.matches(&TokenKind::RBracket) {
                ty = DtsType::Array(Box::new(ty));
                continue;
            }
            let index = self.parse_type()?;
            self.expect(&TokenKind::RBracket)?;
            ty = DtsType::IndexAccess {
                object: Box::new(ty),
                index: Box::new(index),
            };
        }

        Ok(ty)
    }

    fn parse_primary_type(&mut self) -> ParseResult<DtsType> {
        match self.peek().clone() {
            TokenKind::Keyword(kw) => self.parse_keyword_type(kw),

            TokenKind::StringLiteral(s) => {
                self.advance();
                Ok(DtsType::StringLiteral(s))
            }

            TokenKind::NumberLiteral(n) => {
                self.advance();
                Ok(DtsType::NumberLiteral(n))
            }

            TokenKind::Minus => {
                self.advance();
                match self.peek().clone() {
                    TokenKind::NumberLiteral(n) => {
                        self.advance();
                        Ok(DtsType::NumberLiteral(format!("-{n}")))
                    }
                    other => self.error(format!("expected number after `-`, found {other:?}")),
                }
            }

            TokenKind::LParen => self.parse_paren_or_function_type(),

            TokenKind::LBrace => self.parse_object_type(),

            TokenKind::LBracket => self.parse_tuple_type(),

            TokenKind::LAngle => self.parse_function_type(Vec::new()),

            TokenKind::Backtick => self.parse_template_literal_type(),

            TokenKind::Ident(word) if word == "unique" && self.peek_nth(1).is_keyword(Keyword::Symbol) => {
                self.advance();
                self.advance();
                Ok(DtsType::Primitive(Primitive::Symbol))
            }

            TokenKind::Ident(word)
                if word == "asserts" && matches!(self.peek_nth(1), TokenKind::Ident(_) | TokenKind::Keyword(Keyword::This)) =>
            {
                self.advance();
                self.parse_primary_type()
            }

            TokenKind::Ident(_) => {
                let name = self.expect_qualified_name()?;
                self.parse_named_type(name)
            }

            other => self.error(format!("unexpected token in type position: {other:?}")),
        }
    }

    fn parse_keyword_type(&mut self, kw: Keyword) -> ParseResult<DtsType> {
        if let Some(primitive) = Primitive::from_keyword(kw.as_str()) {
            self.advance();
            return Ok(DtsType::Primitive(primitive));
        }

        match kw {
            Keyword::True | Keyword::False => {
                self.advance();
                Ok(DtsType::BooleanLiteral(kw == Keyword::True))
            }
            Keyword::Typeof => {
                self.advance();
                let name = if self.check_kw(Keyword::Import) {
                    self.parse_import_type_name()?
                } else {
                    self.expect_qualified_name()?
                };
                Ok(DtsType::TypeOf(name))
            }
            Keyword::Keyof => {
                self.advance();
                let ty = self.parse_postfix_type()?;
                Ok(DtsType::KeyOf(Box::new(ty)))
            }
            Keyword::Readonly => {
                // `readonly T[]` only restricts mutation; the shape is `T[]`.
                self.advance();
                self.parse_postfix_type()
            }
            Keyword::Infer => {
                self.advance();
                let name = self.expect_ident()?;
                if self.matches_kw(Keyword::Extends) {
                    self.parse_postfix_type()?;
                }
                Ok(DtsType::Infer(name))
            }
            Keyword::This => {
                self.advance();
                if self.matches_kw(Keyword::Is) {
                    self.parse_type()?;
                    return Ok(DtsType::Primitive(Primitive::Boolean));
                }
                Ok(DtsType::This)
            }
            Keyword::New => {
                self.advance();
                let type_params = self.parse_type_params()?;
                self.parse_function_type(type_params)
            }
            Keyword::Abstract if self.peek_nth(1).is_keyword(Keyword::New) => {
                self.advance();
                self.parse_keyword_type(Keyword::New)
            }
            Keyword::Import => {
                let name = self.parse_import_type_name()?;
                self.parse_named_type(name)
            }
            kw if kw.is_contextual() => {
                let name = self.expect_qualified_name()?;
                self.parse_named_type(name)
            }
            _ => self.error(format!("unexpected keyword in type position: `{}`", kw.as_str())),
        }
    }

    /// `import("module").Name` becomes the qualified reference `Name`.
    fn parse_import_type_name(&mut self) -> ParseResult<String> {
        self.expect_kw(Keyword::Import)?;
        self.expect(&TokenKind::LParen)?;
        let module = self.expect_module_specifier()?;
        self.expect(&TokenKind::RParen)?;
        if !self.matches(&TokenKind::Dot) {
            return Ok(module);
        }
        let mut name = self.expect_property_name()?;
        while self.matches(&TokenKind::Dot) {
            name.push('.');
            name.push_str(&self.expect_property_name()?);
        }
        Ok(name)
    }

    fn parse_named_type(&mut self, name: String) -> ParseResult<DtsType> {
        let type_args = if self.check(&TokenKind::LAngle) {
            self.parse_type_args()?
        } else {
            Vec::new()
        };

        // Type predicate: `value is Foo`
        if type_args.is_empty() && self.matches_kw(Keyword::Is) {
            self.parse_type()?;
            return Ok(DtsType::Primitive(Primitive::Boolean));
        }

        // Conditional type: `T extends U ? X : Y`
        if self.check_kw(Keyword::Extends) {
            self.advance();
            let extends = self.parse_postfix_type()?;
            self.expect(&TokenKind::Question)?;
            let true_type = self.parse_type()?;
            self.expect(&TokenKind::Colon)?;
            let false_type = self.parse_type()?;

            return Ok(DtsType::Conditional {
                check: Box::new(DtsType::Named { name, type_args }),
                extends: Box::new(extends),
                true_type: Box::new(true_type),
                false_type: Box::new(false_type),
            });
        }

        Ok(DtsType::Named { name, type_args })
    }

    fn parse_type_args(&mut self) -> ParseResult<Vec<DtsType>> {
        self.expect(&TokenKind::LAngle)?;
        let mut args = Vec::new();

        while !self.check(&TokenKind::RAngle) && !self.at_end() {
            args.push(self.parse_type()?);
            if !self.matches(&TokenKind::Comma) {
                break;
            }
        }

        self.expect(&TokenKind::RAngle)?;
        Ok(args)
    }

    /// `(` opens either a parenthesized type or an arrow-function parameter list.
    /// The token after the matching `)` decides: `=>` means a function type.
    fn parse_paren_or_function_type(&mut self) -> ParseResult<DtsType> {
        let is_function = self
            .matching_close(self.pos)
            .is_some_and(|close| self.tokens.get(close + 1).map(|t| &t.kind) == Some(&TokenKind::Arrow));

        if is_function {
            return self.parse_function_type(Vec::new());
        }

        self.expect(&TokenKind::LParen)?;
        let inner = self.parse_type()?;
        self.expect(&TokenKind::RParen)?;
        Ok(DtsType::Parenthesized(Box::new(inner)))
    }

    fn parse_function_type(&mut self, mut type_params: Vec<TypeParam>) -> ParseResult<DtsType> {
        if self.check(&TokenKind::LAngle) {
            type_params = self.parse_type_params()?;
        }
        let params = self.parse_params()?;
        self.expect(&TokenKind::Arrow)?;
        let return_type = self.parse_type()?;

        Ok(DtsType::Function(Box::new(FunctionType {
            type_params,
            params,
            return_type: Box::new(return_type),
        })))
    }

    fn parse_template_literal_type(&mut self) -> ParseResult<DtsType> {
        let open = self.expect(&TokenKind::Backtick)?;
        while !self.check(&TokenKind::Backtick) {
            if self.at_end() {
                return self.error("unterminated template literal type");
            }
            self.advance();
        }
        let close = self.advance();
        Ok(DtsType::TemplateLiteral(
            self.src[open.span.start()..close.span.end()].to_string(),
        ))
    }

    fn parse_object_type(&mut self) -> ParseResult<DtsType> {
        self.expect(&TokenKind::LBrace)?;

        // Mapped type: `{ [K in keyof T]: T[K] }`, possibly with a readonly modifier
        let bracket_at = match self.peek() {
            TokenKind::LBracket => Some(0),
            TokenKind::Plus | TokenKind::Minus | TokenKind::Keyword(Keyword::Readonly) => {
                [1, 2].into_iter().find(|n| self.peek_nth(*n) == &TokenKind::LBracket)
            }
            _ => None,
        };
        if let Some(offset) = bracket_at {
            if self.peek_nth(offset + 2).is_keyword(Keyword::In) {
                return self.parse_mapped_type();
            }
        }

        let mut members = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            if let Some(member) = self.parse_object_member()? {
                members.push(member);
            }
        }

        self.expect(&TokenKind::RBrace)?;
        Ok(DtsType::Object(members))
    }

    fn parse_object_member(&mut self) -> ParseResult<Option<ObjectMember>> {
        // Object literal types share the interface member grammar.
        let member = match self.parse_interface_member()? {
            Some(member) => member,
            None => return Ok(None),
        };

        let member = match member {
            InterfaceMember::Property(p) => ObjectMember::Property {
                name: p.name,
                ty: p.ty,
                optional: p.optional,
                readonly: p.readonly,
            },
            InterfaceMember::Method(m) => ObjectMember::Method {
                name: m.name,
                type_params: m.type_params,
                params: m.params,
                return_type: m.return_type,
                optional: m.optional,
            },
            InterfaceMember::CallSignature(sig) => ObjectMember::CallSignature(sig),
            InterfaceMember::ConstructSignature(sig) => ObjectMember::ConstructSignature(sig),
            InterfaceMember::IndexSignature(sig) => ObjectMember::IndexSignature(sig),
        };
        Ok(Some(member))
    }

    fn parse_mapped_modifier(&mut self, target: &TokenKind) -> ParseResult<Option<MappedModifier>> {
        if self.peek() == target {
            self.advance();
            return Ok(Some(MappedModifier::Preserve));
        }
        let modifier = match self.peek() {
            TokenKind::Plus => MappedModifier::Add,
            TokenKind::Minus => MappedModifier::Remove,
            _ => return Ok(None),
        };
        self.advance();
        if self.peek() != target {
            return self.error(format!("expected {target:?} after mapped modifier"));
        }
        self.advance();
        Ok(Some(modifier))
    }

    fn parse_mapped_type(&mut self) -> ParseResult<DtsType> {
        // The opening brace is consumed; parse `[K in C]: V }`.
        let readonly = self.parse_mapped_modifier(&TokenKind::Keyword(Keyword::Readonly))?;

        self.expect(&TokenKind::LBracket)?;
        let key_name = self.expect_ident()?;
        self.expect_kw(Keyword::In)?;
        let key_constraint = self.parse_type()?;
        if self.matches_kw(Keyword::As) {
            self.parse_type()?;
        }
        self.expect(&TokenKind::RBracket)?;

        let optional = self.parse_mapped_modifier(&TokenKind::Question)?;

        self.expect(&TokenKind::Colon)?;
        let value_type = self.parse_type()?;
        self.matches(&TokenKind::Semicolon);
        self.expect(&TokenKind::RBrace)?;

        Ok(DtsType::Mapped {
            key_name,
            key_constraint: Box::new(key_constraint),
            value_type: Box::new(value_type),
            readonly,
            optional,
        })
    }

    fn parse_tuple_type(&mut self) -> ParseResult<DtsType> {
        self.expect(&TokenKind::LBracket)?;

        let mut elements = Vec::new();
        while !self.check(&TokenKind::RBracket) && !self.at_end() {
            let rest = self.matches(&TokenKind::DotDotDot);

            let labeled = matches!(self.peek(), TokenKind::Ident(_) | TokenKind::Keyword(_))
                && matches!(self.peek_nth(1), TokenKind::Colon)
                || matches!(self.peek(), TokenKind::Ident(_) | TokenKind::Keyword(_))
                    && matches!(self.peek_nth(1), TokenKind::Question)
                    && matches!(self.peek_nth(2), TokenKind::Colon);

            let (name, optional, ty) = if labeled {
                let n = self.expect_property_name()?;
                let opt = self.matches(&TokenKind::Question);
                self.expect(&TokenKind::Colon)?;
                (Some(n), opt, self.parse_type()?)
            } else {
                let ty = self.parse_type()?;
                let opt = self.matches(&TokenKind::Question);
                (None, opt, ty)
            };

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
        Ok(DtsType::Tuple(elements))
    }
}
