use std::collections::{BTreeSet, HashSet};
use std::hash::BuildHasher;
use std::mem;

use tracing::debug;

use crate::{
    ast::{Arg, Query, Statement, Token, TokenKind},
    error::{ParseError, QueryError},
    lexer::Lexer,
};

/// Validates and optionally expands projection entries.
///
/// A plain field resolves to itself, a preset to its field list, and an
/// unknown name to an error.
pub trait FieldResolver {
    fn resolve_field(&self, name: &str) -> Result<Vec<String>, QueryError>;
}

/// Decides which operation names the parser accepts.
pub trait OperationValidator {
    fn is_known_operation(&self, name: &str) -> bool;
}

impl<S: BuildHasher> OperationValidator for HashSet<String, S> {
    fn is_known_operation(&self, name: &str) -> bool {
        self.contains(name)
    }
}

impl OperationValidator for BTreeSet<String> {
    fn is_known_operation(&self, name: &str) -> bool {
        self.contains(name)
    }
}

/// Parser behaviour switches. The default accepts any operation and passes
/// projection identifiers through untouched.
#[derive(Clone, Copy, Default)]
pub struct ParserConfig<'a> {
    pub operations: Option<&'a dyn OperationValidator>,
    pub field_resolver: Option<&'a dyn FieldResolver>,
}

/// Parse `input` into a [`Query`].
pub fn parse(input: &str, config: &ParserConfig<'_>) -> Result<Query, ParseError> {
    let query = Parser::new(Lexer::new(input))?
        .with_config(*config)
        .parse_query()?;
    debug!(statements = query.statements.len(), "parsed query");
    Ok(query)
}

/// Recursive-descent parser over a fully lexed token stream.
///
/// The whole input is tokenized up front, so a lexical error anywhere in it
/// is reported ahead of any syntax error.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    tokens: std::vec::IntoIter<Token>,
    current_token: Token,
    config: ParserConfig<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(mut lexer: Lexer<'a>) -> Result<Self, ParseError> {
        let mut tokens = lexer.tokenize()?.into_iter();
        let current_token = tokens.next().unwrap_or(Token {
            kind: TokenKind::Eof,
            offset: lexer.input().len(),
        });
        Ok(Parser {
            lexer,
            tokens,
            current_token,
            config: ParserConfig::default(),
        })
    }

    pub fn with_config(mut self, config: ParserConfig<'a>) -> Self {
        self.config = config;
        self
    }

    /// Move to the next token, returning the one that was current. The
    /// trailing `Eof` repeats once the stream is exhausted.
    fn advance(&mut self) -> Token {
        let next = self
            .tokens
            .next()
            .unwrap_or_else(|| self.current_token.clone());
        mem::replace(&mut self.current_token, next)
    }

    fn expect(&mut self, expected: TokenKind) -> Result<Token, ParseError> {
        if !self.check(&expected) {
            let what = expected.describe();
            return Err(self
                .error_at_current(format!("expected {}", what))
                .with_expected(what));
        }
        Ok(self.advance())
    }

    fn check(&self, kind: &TokenKind) -> bool {
        mem::discriminant(&self.current_token.kind) == mem::discriminant(kind)
    }

    fn error_at_current(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(message, self.lexer.position_at(self.current_token.offset))
            .with_got(self.current_token.kind.text())
    }

    fn skip_semicolons(&mut self) {
        while self.check(&TokenKind::Semicolon) {
            self.advance();
        }
    }

    /// query = statement (";" statement)* ";"*
    pub fn parse_query(mut self) -> Result<Query, ParseError> {
        self.skip_semicolons();
        if self.check(&TokenKind::Eof) {
            return Err(self.error_at_current("empty query"));
        }

        let mut statements = Vec::new();
        loop {
            statements.push(self.parse_statement()?);

            match self.current_token.kind {
                TokenKind::Semicolon => {
                    self.skip_semicolons();
                    if self.check(&TokenKind::Eof) {
                        break;
                    }
                }
                TokenKind::Eof => break,
                _ => {
                    return Err(self
                        .error_at_current("expected ';' or end of input")
                        .with_expected("';' or end of input"));
                }
            }
        }

        Ok(Query { statements })
    }

    /// statement = operation "(" args? ")" projection?
    fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        let TokenKind::Identifier(operation) = &self.current_token.kind else {
            return Err(self
                .error_at_current("expected operation name")
                .with_expected("identifier"));
        };
        let operation = operation.clone();
        let pos = self.lexer.position_at(self.current_token.offset);

        if let Some(ops) = self.config.operations
            && !ops.is_known_operation(&operation)
        {
            return Err(
                ParseError::new(format!("unknown operation {:?}", operation), pos)
                    .with_got(operation),
            );
        }
        self.advance();

        self.expect(TokenKind::LParen)?;
        let args = if self.check(&TokenKind::RParen) {
            Vec::new()
        } else {
            self.parse_args()?
        };
        self.expect(TokenKind::RParen)?;

        let fields = if self.check(&TokenKind::LBrace) {
            self.parse_projection()?
        } else {
            Vec::new()
        };

        Ok(Statement {
            operation,
            args,
            fields,
            pos,
        })
    }

    fn parse_args(&mut self) -> Result<Vec<Arg>, ParseError> {
        let mut args = vec![self.parse_arg()?];
        while self.check(&TokenKind::Comma) {
            self.advance();
            args.push(self.parse_arg()?);
        }
        Ok(args)
    }

    /// arg = identifier "=" value | value
    fn parse_arg(&mut self) -> Result<Arg, ParseError> {
        let pos = self.lexer.position_at(self.current_token.offset);
        let first = match &self.current_token.kind {
            TokenKind::Identifier(s) | TokenKind::String(s) => s.clone(),
            _ => {
                return Err(self
                    .error_at_current("expected argument")
                    .with_expected("identifier or string"));
            }
        };
        self.advance();

        if !self.check(&TokenKind::Equals) {
            return Ok(Arg {
                key: None,
                value: first,
                pos,
            });
        }
        self.advance();

        let value = match &self.current_token.kind {
            TokenKind::Identifier(s) | TokenKind::String(s) => s.clone(),
            _ => {
                return Err(self
                    .error_at_current("expected value after '='")
                    .with_expected("identifier or string"));
            }
        };
        self.advance();

        Ok(Arg {
            key: Some(first),
            value,
            pos,
        })
    }

    /// projection = "{" identifier* "}"
    fn parse_projection(&mut self) -> Result<Vec<String>, ParseError> {
        self.advance(); // '{'

        let mut fields = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.check(&TokenKind::Eof) {
            let TokenKind::Identifier(name) = &self.current_token.kind else {
                return Err(self
                    .error_at_current("expected field name")
                    .with_expected("identifier"));
            };
            let name = name.clone();

            match self.config.field_resolver {
                Some(resolver) => match resolver.resolve_field(&name) {
                    Ok(resolved) => fields.extend(resolved),
                    Err(_) => {
                        return Err(ParseError::new(
                            format!("unknown field {:?}", name),
                            self.lexer.position_at(self.current_token.offset),
                        )
                        .with_got(name));
                    }
                },
                None => fields.push(name),
            }
            self.advance();
        }
        self.expect(TokenKind::RBrace)?;

        let mut seen = HashSet::new();
        fields.retain(|f| seen.insert(f.clone()));
        Ok(fields)
    }
}
