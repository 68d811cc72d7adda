use serde::Serialize;

use crate::ast::{Token, TokenKind};
use crate::error::ParseError;

/// A location in the query text.
///
/// `line` and `column` are 1-based; `column` counts bytes from the start of
/// the line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

pub struct Lexer<'a> {
    input: &'a str,
    position: usize,
    line_starts: Vec<usize>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(
                input
                    .bytes()
                    .enumerate()
                    .filter(|&(_, b)| b == b'\n')
                    .map(|(i, _)| i + 1),
            )
            .collect();
        Lexer {
            input,
            position: 0,
            line_starts,
        }
    }

    pub fn input(&self) -> &'a str {
        self.input
    }

    /// Convert a byte offset into a line/column position.
    pub fn position_at(&self, offset: usize) -> Position {
        let line = self.line_starts.partition_point(|&start| start <= offset);
        let line_start = self.line_starts[line.saturating_sub(1)];
        Position {
            offset,
            line: line.max(1),
            column: offset.saturating_sub(line_start) + 1,
        }
    }

    fn current_byte(&self) -> Option<u8> {
        self.input.as_bytes().get(self.position).copied()
    }

    fn peek_byte(&self, offset: usize) -> Option<u8> {
        self.input.as_bytes().get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.current_byte() {
            self.advance();
        }
    }

    fn read_identifier(&mut self) -> String {
        let start = self.position;
        while self.current_byte().is_some_and(is_ident_char) {
            self.advance();
        }
        self.input[start..self.position].to_string()
    }

    fn read_string(&mut self) -> Result<String, ParseError> {
        let start = self.position;
        self.advance(); // opening quote

        let mut result = String::new();
        let mut chunk_start = self.position;
        while let Some(b) = self.current_byte() {
            match b {
                b'"' => {
                    result.push_str(&self.input[chunk_start..self.position]);
                    self.advance();
                    return Ok(result);
                }
                b'\\' if self.peek_byte(1).is_some() => {
                    result.push_str(&self.input[chunk_start..self.position]);
                    match self.peek_byte(1) {
                        Some(b'"') => result.push('"'),
                        Some(b'\\') => result.push('\\'),
                        Some(b'n') => result.push('\n'),
                        Some(b'r') => result.push('\r'),
                        Some(b't') => result.push('\t'),
                        // Unknown escapes are kept as written.
                        _ => {
                            chunk_start = self.position;
                            self.advance();
                            continue;
                        }
                    }
                    self.position += 2;
                    chunk_start = self.position;
                }
                _ => self.advance(),
            }
        }

        Err(ParseError::new("unterminated string literal", self.position_at(start))
            .with_got(&self.input[start..]))
    }

    pub fn next_token(&mut self) -> Result<Token, ParseError> {
        self.skip_whitespace();

        let offset = self.position;
        let punct = |kind| Token { kind, offset };

        let Some(b) = self.current_byte() else {
            return Ok(punct(TokenKind::Eof));
        };

        let kind = match b {
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'{' => TokenKind::LBrace,
            b'}' => TokenKind::RBrace,
            b'=' => TokenKind::Equals,
            b',' => TokenKind::Comma,
            b';' => TokenKind::Semicolon,
            b'"' => {
                let s = self.read_string()?;
                return Ok(Token {
                    kind: TokenKind::String(s),
                    offset,
                });
            }
            b if is_ident_start(b) => {
                let ident = self.read_identifier();
                return Ok(Token {
                    kind: TokenKind::Identifier(ident),
                    offset,
                });
            }
            _ => {
                let ch = self.input[offset..].chars().next().unwrap_or('\u{FFFD}');
                return Err(ParseError::new(
                    format!("unexpected character {:?}", ch.to_string()),
                    self.position_at(offset),
                )
                .with_got(ch.to_string()));
            }
        };

        self.advance();
        Ok(punct(kind))
    }

    /// Lex the whole input, including the trailing [`TokenKind::Eof`].
    pub fn tokenize(&mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn is_ident_char(b: u8) -> bool {
    is_ident_start(b) || b == b'-'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_punctuation() {
        assert_eq!(
            kinds("(){}=,;"),
            vec![
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::Equals,
                TokenKind::Comma,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_identifiers_may_start_with_digit() {
        assert_eq!(
            kinds("T1 42 task-1 _x"),
            vec![
                TokenKind::Identifier("T1".to_string()),
                TokenKind::Identifier("42".to_string()),
                TokenKind::Identifier("task-1".to_string()),
                TokenKind::Identifier("_x".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_hyphen_cannot_start_identifier() {
        let err = Lexer::new("-x").tokenize().unwrap_err();
        assert_eq!(err.message, "unexpected character \"-\"");
        assert_eq!(err.got.as_deref(), Some("-"));
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            kinds(r#""a\"b\\c\nd\te\rf\qg""#),
            vec![
                TokenKind::String("a\"b\\c\nd\te\rf\\qg".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_unterminated_string_reports_opening_quote() {
        let err = Lexer::new("get(\n  \"abc").tokenize().unwrap_err();
        assert_eq!(err.message, "unterminated string literal");
        assert_eq!((err.pos.line, err.pos.column), (2, 3));
        assert_eq!(err.got.as_deref(), Some("\"abc"));
    }

    #[test]
    fn test_trailing_backslash_is_unterminated() {
        assert!(Lexer::new("\"abc\\").tokenize().is_err());
    }

    #[test]
    fn test_position_tracking() {
        let lexer = Lexer::new("a\nbc\n\nd");
        assert_eq!(lexer.position_at(0), Position { offset: 0, line: 1, column: 1 });
        assert_eq!(lexer.position_at(3), Position { offset: 3, line: 2, column: 2 });
        assert_eq!(lexer.position_at(6), Position { offset: 6, line: 4, column: 1 });
    }

    #[test]
    fn test_non_ascii_is_unexpected() {
        let err = Lexer::new("é").tokenize().unwrap_err();
        assert_eq!(err.got.as_deref(), Some("é"));
    }

    #[test]
    fn test_empty_and_whitespace_input() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
        assert_eq!(kinds(" \t\r\n "), vec![TokenKind::Eof]);
    }
}
