//! Hand-rolled error types for lexing and parsing, mirroring
//! `vm_translator::command::VmParseError`'s shape.

use std::fmt;

use crate::token::Token;

#[derive(Debug)]
pub enum LexError {
    UnterminatedString,
    UnterminatedComment,
    IntegerConstantOutOfRange(String),
}

impl std::error::Error for LexError {}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::UnterminatedString => write!(f, "unterminated string constant"),
            Self::UnterminatedComment => write!(f, "unterminated block comment"),
            Self::IntegerConstantOutOfRange(lexeme) => {
                write!(f, "integer constant out of range (0-{}): {lexeme}", u16::MAX)
            }
        }
    }
}

#[derive(Debug)]
pub enum ParseError {
    UnexpectedEof { expected: &'static str },
    UnexpectedToken { expected: &'static str, got: Token },
    Lex(LexError),
}

impl std::error::Error for ParseError {}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::UnexpectedEof { expected } => write!(f, "expected {expected}, found end of input"),
            Self::UnexpectedToken { expected, got } => {
                write!(f, "expected {expected}, found {got:?}")
            }
            Self::Lex(e) => write!(f, "{e}"),
        }
    }
}

impl From<LexError> for ParseError {
    fn from(e: LexError) -> Self {
        Self::Lex(e)
    }
}
