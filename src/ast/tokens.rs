/// Token kinds produced by the [`Lexer`](crate::lexer::Lexer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Bare word made of ASCII letters, digits, `_` and `-`
    ///
    /// The first character may be a digit but not a hyphen, so IDs like
    /// `T1` and `42` lex as identifiers.
    ///
    /// # Examples
    /// ```text
    /// list
    /// task-1
    /// sort_name
    /// ```
    Identifier(String),

    /// Double-quoted string with escapes already applied
    ///
    /// Supported escapes: `\"`, `\\`, `\n`, `\r`, `\t`. Any other escape
    /// is kept verbatim, backslash included.
    ///
    /// # Examples
    /// ```text
    /// "Fix login bug"
    /// "say \"hi\""
    /// ```
    String(String),

    /// `(`
    LParen,

    /// `)`
    RParen,

    /// `{` opening a field projection
    LBrace,

    /// `}`
    RBrace,

    /// `=` between an argument key and its value
    Equals,

    /// `,` between arguments
    Comma,

    /// `;` between batch statements
    Semicolon,

    /// End of input
    Eof,
}

impl TokenKind {
    /// Human-readable name used in "expected ..." diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Identifier(_) => "identifier",
            TokenKind::String(_) => "string",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::Equals => "'='",
            TokenKind::Comma => "','",
            TokenKind::Semicolon => "';'",
            TokenKind::Eof => "end of input",
        }
    }

    /// The token as it would be reported in a "got ..." diagnostic.
    pub fn text(&self) -> &str {
        match self {
            TokenKind::Identifier(s) | TokenKind::String(s) => s,
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Equals => "=",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::Eof => "end of input",
        }
    }
}

/// A token together with the byte offset where it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}
