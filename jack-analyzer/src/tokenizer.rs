//! Cooperative character stream and tokenizer.
//!
//! Grounded in the original `Tokenizer`/`CharacterStream` pair: the stream
//! exposes one character of lookahead over (current line, index) and treats
//! end-of-line as an implicit `\n`, so the tokenizer never special-cases line
//! boundaries.

use crate::error::LexError;
use crate::token::{Keyword, Token};

const SYMBOL_CHARS: &[char] = &[
    '{', '}', '(', ')', '[', ']', '.', ',', ';', '+', '-', '*', '/', '&', '|', '<', '>', '=', '~',
];

#[derive(Debug)]
struct CharacterStream {
    lines: Vec<String>,
    line_idx: usize,
    char_idx: usize,
}

impl CharacterStream {
    fn new(source: &str) -> Self {
        Self {
            lines: source.lines().map(str::to_string).collect(),
            line_idx: 0,
            char_idx: 0,
        }
    }

    fn has_more_chars(&self) -> bool {
        self.line_idx < self.lines.len()
    }

    fn current_line_len(&self) -> usize {
        self.lines[self.line_idx].chars().count()
    }

    fn peek_next_char(&self) -> char {
        if self.char_idx == self.current_line_len() {
            '\n'
        } else {
            self.lines[self.line_idx].chars().nth(self.char_idx).unwrap()
        }
    }

    fn get_next_char(&mut self) -> char {
        if self.char_idx == self.current_line_len() {
            self.line_idx += 1;
            self.char_idx = 0;
            '\n'
        } else {
            let c = self.lines[self.line_idx].chars().nth(self.char_idx).unwrap();
            self.char_idx += 1;
            c
        }
    }

    /// Consumes characters until `terminator` has just been read, returning
    /// everything read before it (the terminator itself is discarded).
    fn consume_through(&mut self, terminator: &str) -> Result<String, LexError> {
        let mut found = String::new();
        while self.has_more_chars() {
            found.push(self.get_next_char());
            if found.ends_with(terminator) {
                return Ok(found[..found.len() - terminator.len()].to_string());
            }
        }
        Err(if terminator == "\"" {
            LexError::UnterminatedString
        } else {
            LexError::UnterminatedComment
        })
    }
}

#[derive(Debug)]
pub struct Tokenizer {
    stream: CharacterStream,
    next_token: Option<Token>,
}

impl Tokenizer {
    pub fn new(source: &str) -> Result<Self, LexError> {
        let mut tokenizer = Self {
            stream: CharacterStream::new(source),
            next_token: None,
        };
        tokenizer.advance()?;
        Ok(tokenizer)
    }

    pub fn peek(&self) -> Option<&Token> {
        self.next_token.as_ref()
    }

    /// Computes the next token, possibly consuming many characters (skipped
    /// whitespace and comments never surface as tokens).
    pub fn advance(&mut self) -> Result<(), LexError> {
        self.next_token = None;
        let mut lexeme = String::new();

        while self.next_token.is_none() && self.stream.has_more_chars() {
            let c = self.stream.get_next_char();

            if c == ' ' || c == '\n' || c == '\r' || c == '\t' {
                continue;
            }

            if c == '/' && self.stream.peek_next_char() == '/' {
                self.stream.consume_through("\n").ok();
                continue;
            }

            if c == '/' && self.stream.peek_next_char() == '*' {
                self.stream.get_next_char();
                self.stream.consume_through("*/")?;
                continue;
            }

            if c == '"' {
                let value = self.stream.consume_through("\"")?;
                self.next_token = Some(Token::StringConst(value));
                return Ok(());
            }

            if SYMBOL_CHARS.contains(&c) {
                self.next_token = Some(Token::Symbol(c));
                return Ok(());
            }

            lexeme.push(c);
            let peeked = self.stream.peek_next_char();
            if matches!(peeked, ' ' | '\t' | '\r' | '\n') || SYMBOL_CHARS.contains(&peeked) {
                self.next_token = Some(classify(&lexeme)?);
            }
        }

        Ok(())
    }
}

fn classify(lexeme: &str) -> Result<Token, LexError> {
    if let Some(keyword) = Keyword::lookup(lexeme) {
        Ok(Token::Keyword(keyword))
    } else if lexeme.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        lexeme
            .parse()
            .map(Token::IntConst)
            .map_err(|_| LexError::IntegerConstantOutOfRange(lexeme.to_string()))
    } else {
        Ok(Token::Identifier(lexeme.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens_of(source: &str) -> Vec<Token> {
        let mut tokenizer = Tokenizer::new(source).unwrap();
        let mut tokens = Vec::new();
        while let Some(token) = tokenizer.peek().cloned() {
            tokens.push(token);
            tokenizer.advance().unwrap();
        }
        tokens
    }

    #[test]
    fn tokenizes_class_declaration() {
        let tokens = tokens_of("class X { static int y; }");
        assert_eq!(
            tokens,
            vec![
                Token::Keyword(Keyword::Class),
                Token::Identifier("X".to_string()),
                Token::Symbol('{'),
                Token::Keyword(Keyword::Static),
                Token::Keyword(Keyword::Int),
                Token::Identifier("y".to_string()),
                Token::Symbol(';'),
                Token::Symbol('}'),
            ]
        );
    }

    #[test]
    fn skips_line_and_block_comments() {
        let tokens = tokens_of("// a comment\nlet x = 1; /** block\ncomment */ let y = 2;");
        assert_eq!(tokens.len(), 10);
    }

    #[test]
    fn reads_string_constants() {
        let tokens = tokens_of(r#"let s = "hello world";"#);
        assert_eq!(tokens[3], Token::StringConst("hello world".to_string()));
    }

    #[test]
    fn reads_integer_constants() {
        let tokens = tokens_of("let x = 42;");
        assert_eq!(tokens[3], Token::IntConst(42));
    }

    #[test]
    fn reports_out_of_range_integer_constant() {
        let err = Tokenizer::new("99999;").unwrap_err();
        assert!(matches!(err, LexError::IntegerConstantOutOfRange(lexeme) if lexeme == "99999"));
    }

    #[test]
    fn reports_unterminated_string() {
        let err = Tokenizer::new("\"never closes").unwrap_err();
        assert!(matches!(err, LexError::UnterminatedString));
    }

    #[test]
    fn reports_unterminated_block_comment() {
        let err = Tokenizer::new("/* never closes").unwrap_err();
        assert!(matches!(err, LexError::UnterminatedComment));
    }
}
