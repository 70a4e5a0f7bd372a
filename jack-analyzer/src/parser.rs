//! Recursive-descent parser over the Jack grammar.
//!
//! Grounded in `CompilationEngine` from the original syntax analyzer: each
//! production method emits a start tag, consumes tokens per the grammar
//! (failing fast on a mismatched peek), then emits an end tag. The C++
//! original threads an output `vector<string>*` through every call; this
//! version keeps that buffer as a field on `Parser` instead.

use crate::error::ParseError;
use crate::token::{Keyword, Token};
use crate::tokenizer::Tokenizer;

const TYPE_KEYWORDS: &[Keyword] = &[Keyword::Int, Keyword::Char, Keyword::Boolean];
const CLASS_VAR_KEYWORDS: &[Keyword] = &[Keyword::Static, Keyword::Field];
const SUBROUTINE_KEYWORDS: &[Keyword] = &[Keyword::Constructor, Keyword::Function, Keyword::Method];
const STATEMENT_KEYWORDS: &[Keyword] =
    &[Keyword::If, Keyword::Let, Keyword::While, Keyword::Do, Keyword::Return];
const KEYWORD_CONSTANTS: &[Keyword] = &[Keyword::True, Keyword::False, Keyword::Null, Keyword::This];
const OPERATOR_CHARS: &[char] = &['+', '-', '*', '/', '&', '|', '<', '>', '='];
const UNARY_OP_CHARS: &[char] = &['-', '~'];

pub struct Parser {
    tokenizer: Tokenizer,
    output: Vec<String>,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self, ParseError> {
        Ok(Self {
            tokenizer: Tokenizer::new(source)?,
            output: Vec::new(),
        })
    }

    /// Parses a single Jack class and returns the flat parse-tree text.
    pub fn parse_class(mut self) -> Result<Vec<String>, ParseError> {
        self.compile_class()?;
        Ok(self.output)
    }

    fn peek(&self) -> Result<&Token, ParseError> {
        self.tokenizer.peek().ok_or(ParseError::UnexpectedEof { expected: "token" })
    }

    fn peek_is_keyword(&self, keywords: &[Keyword]) -> bool {
        matches!(self.tokenizer.peek(), Some(Token::Keyword(k)) if keywords.contains(k))
    }

    fn peek_is_symbol(&self, symbols: &[char]) -> bool {
        matches!(self.tokenizer.peek(), Some(Token::Symbol(c)) if symbols.contains(c))
    }

    fn peek_is_type(&self) -> bool {
        self.peek_is_keyword(TYPE_KEYWORDS) || matches!(self.tokenizer.peek(), Some(Token::Identifier(_)))
    }

    fn advance_emitting(&mut self, token: Token) -> Result<(), ParseError> {
        self.output.push(token.to_xml_line());
        self.tokenizer.advance()?;
        Ok(())
    }

    fn consume_keyword(&mut self, allowed: &[Keyword]) -> Result<(), ParseError> {
        let token = self.peek()?.clone();
        match &token {
            Token::Keyword(k) if allowed.contains(k) => self.advance_emitting(token),
            _ => Err(ParseError::UnexpectedToken { expected: "keyword", got: token }),
        }
    }

    fn consume_identifier(&mut self) -> Result<(), ParseError> {
        let token = self.peek()?.clone();
        match &token {
            Token::Identifier(_) => self.advance_emitting(token),
            _ => Err(ParseError::UnexpectedToken { expected: "identifier", got: token }),
        }
    }

    fn consume_symbol(&mut self, allowed: &[char]) -> Result<(), ParseError> {
        let token = self.peek()?.clone();
        match &token {
            Token::Symbol(c) if allowed.contains(c) => self.advance_emitting(token),
            _ => Err(ParseError::UnexpectedToken { expected: "symbol", got: token }),
        }
    }

    fn consume_int_const(&mut self) -> Result<(), ParseError> {
        let token = self.peek()?.clone();
        match &token {
            Token::IntConst(_) => self.advance_emitting(token),
            _ => Err(ParseError::UnexpectedToken { expected: "integer constant", got: token }),
        }
    }

    fn consume_string_const(&mut self) -> Result<(), ParseError> {
        let token = self.peek()?.clone();
        match &token {
            Token::StringConst(_) => self.advance_emitting(token),
            _ => Err(ParseError::UnexpectedToken { expected: "string constant", got: token }),
        }
    }

    fn push_start(&mut self, tag: &str) {
        self.output.push(format!("<{tag}>"));
    }

    fn push_end(&mut self, tag: &str) {
        self.output.push(format!("</{tag}>"));
    }

    fn compile_type(&mut self) -> Result<(), ParseError> {
        if self.peek_is_keyword(TYPE_KEYWORDS) {
            self.consume_keyword(TYPE_KEYWORDS)
        } else {
            self.consume_identifier()
        }
    }

    fn compile_class(&mut self) -> Result<(), ParseError> {
        self.push_start("class");
        self.consume_keyword(&[Keyword::Class])?;
        self.consume_identifier()?;
        self.consume_symbol(&['{'])?;
        self.compile_class_var_decls()?;
        self.compile_subroutine_decls()?;
        self.consume_symbol(&['}'])?;
        self.push_end("class");
        Ok(())
    }

    fn compile_class_var_decls(&mut self) -> Result<(), ParseError> {
        while self.peek_is_keyword(CLASS_VAR_KEYWORDS) {
            self.push_start("classVarDec");
            self.consume_keyword(CLASS_VAR_KEYWORDS)?;
            self.compile_type()?;
            self.consume_identifier()?;
            while self.peek_is_symbol(&[',']) {
                self.consume_symbol(&[','])?;
                self.consume_identifier()?;
            }
            self.consume_symbol(&[';'])?;
            self.push_end("classVarDec");
        }
        Ok(())
    }

    fn compile_subroutine_decls(&mut self) -> Result<(), ParseError> {
        while self.peek_is_keyword(SUBROUTINE_KEYWORDS) {
            self.push_start("subroutineDec");
            self.consume_keyword(SUBROUTINE_KEYWORDS)?;

            if self.peek_is_type() {
                self.compile_type()?;
            } else {
                self.consume_keyword(&[Keyword::Void])?;
            }

            self.consume_identifier()?;
            self.consume_symbol(&['('])?;
            self.compile_parameter_list()?;
            self.consume_symbol(&[')'])?;
            self.compile_subroutine_body()?;
            self.push_end("subroutineDec");
        }
        Ok(())
    }

    fn compile_parameter_list(&mut self) -> Result<(), ParseError> {
        self.push_start("parameterList");
        while self.peek_is_type() {
            self.compile_type()?;
            self.consume_identifier()?;
            if self.peek_is_symbol(&[',']) {
                self.consume_symbol(&[','])?;
            }
        }
        self.push_end("parameterList");
        Ok(())
    }

    fn compile_subroutine_body(&mut self) -> Result<(), ParseError> {
        self.push_start("subroutineBody");
        self.consume_symbol(&['{'])?;
        self.compile_var_decls()?;
        self.compile_statements()?;
        self.consume_symbol(&['}'])?;
        self.push_end("subroutineBody");
        Ok(())
    }

    fn compile_var_decls(&mut self) -> Result<(), ParseError> {
        while self.peek_is_keyword(&[Keyword::Var]) {
            self.push_start("varDec");
            self.consume_keyword(&[Keyword::Var])?;
            self.compile_type()?;
            self.consume_identifier()?;
            while self.peek_is_symbol(&[',']) {
                self.consume_symbol(&[','])?;
                self.consume_identifier()?;
            }
            self.consume_symbol(&[';'])?;
            self.push_end("varDec");
        }
        Ok(())
    }

    fn compile_statements(&mut self) -> Result<(), ParseError> {
        self.push_start("statements");
        while self.peek_is_keyword(STATEMENT_KEYWORDS) {
            let Token::Keyword(keyword) = self.peek()?.clone() else {
                unreachable!("peek_is_keyword guarantees a keyword token")
            };
            match keyword {
                Keyword::If => self.compile_if_statement()?,
                Keyword::While => self.compile_while_statement()?,
                Keyword::Let => self.compile_let_statement()?,
                Keyword::Do => self.compile_do_statement()?,
                Keyword::Return => self.compile_return_statement()?,
                _ => unreachable!("STATEMENT_KEYWORDS only contains the five handled above"),
            }
        }
        self.push_end("statements");
        Ok(())
    }

    fn compile_if_statement(&mut self) -> Result<(), ParseError> {
        self.push_start("ifStatement");
        self.consume_keyword(&[Keyword::If])?;
        self.consume_symbol(&['('])?;
        self.compile_expression()?;
        self.consume_symbol(&[')'])?;
        self.consume_symbol(&['{'])?;
        self.compile_statements()?;
        self.consume_symbol(&['}'])?;
        if self.peek_is_keyword(&[Keyword::Else]) {
            self.consume_keyword(&[Keyword::Else])?;
            self.consume_symbol(&['{'])?;
            self.compile_statements()?;
            self.consume_symbol(&['}'])?;
        }
        self.push_end("ifStatement");
        Ok(())
    }

    fn compile_while_statement(&mut self) -> Result<(), ParseError> {
        self.push_start("whileStatement");
        self.consume_keyword(&[Keyword::While])?;
        self.consume_symbol(&['('])?;
        self.compile_expression()?;
        self.consume_symbol(&[')'])?;
        self.consume_symbol(&['{'])?;
        self.compile_statements()?;
        self.consume_symbol(&['}'])?;
        self.push_end("whileStatement");
        Ok(())
    }

    fn compile_let_statement(&mut self) -> Result<(), ParseError> {
        self.push_start("letStatement");
        self.consume_keyword(&[Keyword::Let])?;
        self.consume_identifier()?;
        if self.peek_is_symbol(&['[']) {
            self.consume_symbol(&['['])?;
            self.compile_expression()?;
            self.consume_symbol(&[']'])?;
        }
        self.consume_symbol(&['='])?;
        self.compile_expression()?;
        self.consume_symbol(&[';'])?;
        self.push_end("letStatement");
        Ok(())
    }

    fn compile_do_statement(&mut self) -> Result<(), ParseError> {
        self.push_start("doStatement");
        self.consume_keyword(&[Keyword::Do])?;
        self.compile_subroutine_call()?;
        self.consume_symbol(&[';'])?;
        self.push_end("doStatement");
        Ok(())
    }

    fn compile_return_statement(&mut self) -> Result<(), ParseError> {
        self.push_start("returnStatement");
        self.consume_keyword(&[Keyword::Return])?;
        if !self.peek_is_symbol(&[';']) {
            self.compile_expression()?;
        }
        self.consume_symbol(&[';'])?;
        self.push_end("returnStatement");
        Ok(())
    }

    fn compile_expression(&mut self) -> Result<(), ParseError> {
        self.push_start("expression");
        self.compile_term()?;
        while self.peek_is_symbol(OPERATOR_CHARS) {
            self.consume_symbol(OPERATOR_CHARS)?;
            self.compile_term()?;
        }
        self.push_end("expression");
        Ok(())
    }

    fn compile_term(&mut self) -> Result<(), ParseError> {
        self.push_start("term");
        let token = self.peek()?.clone();
        match token {
            Token::IntConst(_) => self.consume_int_const()?,
            Token::StringConst(_) => self.consume_string_const()?,
            Token::Keyword(k) if KEYWORD_CONSTANTS.contains(&k) => self.consume_keyword(KEYWORD_CONSTANTS)?,
            Token::Symbol(c) if UNARY_OP_CHARS.contains(&c) => {
                self.consume_symbol(UNARY_OP_CHARS)?;
                self.compile_term()?;
            }
            Token::Symbol('(') => {
                self.consume_symbol(&['('])?;
                self.compile_expression()?;
                self.consume_symbol(&[')'])?;
            }
            Token::Identifier(_) => {
                self.consume_identifier()?;
                if self.peek_is_symbol(&['(', '.']) {
                    self.compile_subroutine_call_tail()?;
                } else if self.peek_is_symbol(&['[']) {
                    self.consume_symbol(&['['])?;
                    self.compile_expression()?;
                    self.consume_symbol(&[']'])?;
                }
            }
            other => return Err(ParseError::UnexpectedToken { expected: "term", got: other }),
        }
        self.push_end("term");
        Ok(())
    }

    /// `subroutineCall` with the leading identifier already consumed by `compile_term`.
    fn compile_subroutine_call_tail(&mut self) -> Result<(), ParseError> {
        if self.peek_is_symbol(&['.']) {
            self.consume_symbol(&['.'])?;
            self.consume_identifier()?;
        }
        self.consume_symbol(&['('])?;
        self.compile_expression_list()?;
        self.consume_symbol(&[')'])?;
        Ok(())
    }

    fn compile_subroutine_call(&mut self) -> Result<(), ParseError> {
        self.consume_identifier()?;
        self.compile_subroutine_call_tail()
    }

    fn compile_expression_list(&mut self) -> Result<(), ParseError> {
        self.push_start("expressionList");
        if !self.peek_is_symbol(&[')']) {
            self.compile_expression()?;
            while self.peek_is_symbol(&[',']) {
                self.consume_symbol(&[','])?;
                self.compile_expression()?;
            }
        }
        self.push_end("expressionList");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_class() {
        let lines = Parser::new("class X { static int y; }").unwrap().parse_class().unwrap();
        assert_eq!(
            lines,
            vec![
                "<class>",
                "<keyword> class </keyword>",
                "<identifier> X </identifier>",
                "<symbol> { </symbol>",
                "<classVarDec>",
                "<keyword> static </keyword>",
                "<keyword> int </keyword>",
                "<identifier> y </identifier>",
                "<symbol> ; </symbol>",
                "</classVarDec>",
                "<symbol> } </symbol>",
                "</class>",
            ]
        );
    }

    #[test]
    fn parses_subroutine_with_statements() {
        let source = "class Main {\n\
            function void main() {\n\
              var int x;\n\
              let x = 1 + 2;\n\
              if (x) {\n\
                do Output.printInt(x);\n\
              } else {\n\
                return;\n\
              }\n\
              while (x) {\n\
                let x = x;\n\
              }\n\
              return;\n\
            }\n\
          }";
        let lines = Parser::new(source).unwrap().parse_class().unwrap();
        assert!(lines.contains(&"<subroutineDec>".to_string()));
        assert!(lines.contains(&"<ifStatement>".to_string()));
        assert!(lines.contains(&"<whileStatement>".to_string()));
        assert!(lines.contains(&"<doStatement>".to_string()));
        assert!(lines.contains(&"<returnStatement>".to_string()));
        assert_eq!(lines.first().unwrap(), "<class>");
        assert_eq!(lines.last().unwrap(), "</class>");
    }

    #[test]
    fn parses_array_index_and_method_call_terms() {
        let source = "class Main {\n\
            function void main() {\n\
              let x = a[1];\n\
              do obj.run(1, 2);\n\
              return x + (1 * 2);\n\
            }\n\
          }";
        let lines = Parser::new(source).unwrap().parse_class().unwrap();
        assert!(lines.contains(&"<expressionList>".to_string()));
        assert!(lines.contains(&"<symbol> [ </symbol>".to_string()));
        assert!(lines.contains(&"<symbol> . </symbol>".to_string()));
    }

    #[test]
    fn rejects_grammar_violation() {
        let err = Parser::new("class 5 {}").unwrap().parse_class().unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { expected: "identifier", .. }));
    }
}
