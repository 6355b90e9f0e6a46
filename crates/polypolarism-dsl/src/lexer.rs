//! Lexer for schema strings.

use logos::Logos;

use crate::error::ParseError;
use crate::token::TokenKind;

/// A token with the byte offset it starts at.
#[derive(Debug, Clone)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// Byte offset into the input.
    pub offset: usize,
}

/// Tokenize a schema string.
pub fn lex(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut lexer = TokenKind::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(kind) => tokens.push(Token {
                kind,
                offset: span.start,
            }),
            Err(()) => {
                return Err(ParseError::InvalidCharacter {
                    found: lexer.slice().to_string(),
                    offset: span.start,
                })
            }
        }
    }

    Ok(tokens)
}
