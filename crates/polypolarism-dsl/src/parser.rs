//! Recursive descent parser for schema strings.
//!
//! ```text
//! schema := '{' (field (',' field)*)? '}'
//! field  := ident ':' type
//! type   := (primitive | 'List' '[' type ']' | 'Struct' '{' fields '}') '?'?
//! ```

use std::collections::BTreeMap;

use indexmap::IndexMap;
use polypolarism_types::{DataType, FrameType};

use crate::error::ParseError;
use crate::lexer::{lex, Token};
use crate::token::TokenKind;

/// Parse a schema string such as `{id: Int64, name: Utf8?}`.
pub fn parse_schema(input: &str) -> Result<FrameType, ParseError> {
    let mut parser = Parser::new(lex(input.trim())?);
    let columns = parser.parse_schema()?;
    parser.expect_end()?;
    Ok(FrameType::new(columns))
}

/// Parse a single type such as `List[Int64]?`.
pub fn parse_type(input: &str) -> Result<DataType, ParseError> {
    let mut parser = Parser::new(lex(input.trim())?);
    let ty = parser.parse_type()?;
    parser.expect_end()?;
    Ok(ty)
}

/// Resolve a primitive type keyword.
fn primitive(name: &str) -> Option<DataType> {
    let ty = match name {
        "Int64" => DataType::Int64,
        "Int32" => DataType::Int32,
        "UInt32" => DataType::UInt32,
        "UInt64" => DataType::UInt64,
        "Float32" => DataType::Float32,
        "Float64" => DataType::Float64,
        "Utf8" | "String" => DataType::Utf8,
        "Boolean" => DataType::Boolean,
        "Date" => DataType::Date,
        "Datetime" => DataType::Datetime(None),
        "Duration" => DataType::Duration,
        "Categorical" => DataType::Categorical,
        _ => return None,
    };
    Some(ty)
}

/// The parser state.
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn parse_schema(&mut self) -> Result<IndexMap<String, DataType>, ParseError> {
        self.expect(TokenKind::LBrace)?;
        let columns = self.parse_fields()?;
        self.expect(TokenKind::RBrace)?;
        Ok(columns)
    }

    /// Parse `name: type` pairs up to, not including, the closing brace.
    fn parse_fields(&mut self) -> Result<IndexMap<String, DataType>, ParseError> {
        let mut fields = IndexMap::new();
        if self.check(TokenKind::RBrace) {
            return Ok(fields);
        }

        loop {
            let name = self.expect_ident("field name")?;
            self.expect(TokenKind::Colon)?;
            let ty = self.parse_type()?;
            fields.insert(name, ty);

            if !self.check_and_advance(TokenKind::Comma) {
                break;
            }
        }

        Ok(fields)
    }

    fn parse_type(&mut self) -> Result<DataType, ParseError> {
        let offset = self.offset();
        let name = self.expect_ident("type")?;

        let ty = match name.as_str() {
            "List" if self.check(TokenKind::LBracket) => {
                self.advance();
                let inner = self.parse_type()?;
                self.expect(TokenKind::RBracket)?;
                inner.list_of()
            }
            "Struct" if self.check(TokenKind::LBrace) => {
                self.advance();
                let fields: BTreeMap<String, DataType> = self.parse_fields()?.into_iter().collect();
                self.expect(TokenKind::RBrace)?;
                DataType::Struct(fields)
            }
            other => primitive(other).ok_or_else(|| ParseError::UnknownType {
                name: other.to_string(),
                offset,
            })?,
        };

        if self.check_and_advance(TokenKind::Question) {
            return Ok(ty.nullable());
        }
        Ok(ty)
    }

    fn expect_end(&self) -> Result<(), ParseError> {
        match self.peek() {
            None => Ok(()),
            Some(token) => Err(ParseError::TrailingInput {
                found: token.kind.to_string(),
                offset: token.offset,
            }),
        }
    }

    // Helper methods

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn offset(&self) -> usize {
        self.peek().map(|t| t.offset).unwrap_or_default()
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        self.pos += 1;
        token
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek()
            .map(|t| std::mem::discriminant(&t.kind) == std::mem::discriminant(&kind))
            .unwrap_or(false)
    }

    fn check_and_advance(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.check(kind.clone()) {
            Ok(self.advance())
        } else {
            match self.peek() {
                Some(token) => Err(ParseError::unexpected_token(
                    token.offset,
                    format!("'{}'", kind),
                    token.kind.to_string(),
                )),
                None => Err(ParseError::unexpected_eof(format!("'{}'", kind))),
            }
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<String, ParseError> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Ident(name),
                ..
            }) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            Some(token) => Err(ParseError::unexpected_token(
                token.offset,
                what,
                token.kind.to_string(),
            )),
            None => Err(ParseError::unexpected_eof(what)),
        }
    }
}
