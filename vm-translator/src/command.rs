//! VM command model and line parser.
//!
//! Mirrors the shape of `assembler::parser::CommandType`: a tagged variant per
//! command kind instead of a stringly-typed `arg1()`/`arg2()` pair, so a caller
//! can never ask for an operand a command doesn't have.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Local,
    Argument,
    This,
    That,
    Constant,
    Static,
    Pointer,
    Temp,
}

impl Segment {
    fn from_str(s: &str) -> Option<Self> {
        match s {
            "local" => Some(Self::Local),
            "argument" => Some(Self::Argument),
            "this" => Some(Self::This),
            "that" => Some(Self::That),
            "constant" => Some(Self::Constant),
            "static" => Some(Self::Static),
            "pointer" => Some(Self::Pointer),
            "temp" => Some(Self::Temp),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VmCommand {
    Add,
    Sub,
    Neg,
    And,
    Or,
    Not,
    Eq,
    Gt,
    Lt,
    Push(Segment, u16),
    Pop(Segment, u16),
    Label(String),
    Goto(String),
    IfGoto(String),
    Function(String, u16),
    Call(String, u16),
    Return,
}

#[derive(Debug)]
pub enum VmParseError {
    UnknownCommand(String),
    UnknownSegment(String),
    MissingOperand(&'static str),
    InvalidInteger(String),
}

impl std::error::Error for VmParseError {}

impl fmt::Display for VmParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::UnknownCommand(cmd) => write!(f, "unknown VM command: {cmd}"),
            Self::UnknownSegment(seg) => write!(f, "unknown memory segment: {seg}"),
            Self::MissingOperand(what) => write!(f, "missing operand: {what}"),
            Self::InvalidInteger(text) => write!(f, "expected a non-negative integer, got: {text}"),
        }
    }
}

/// Strips a trailing `//` comment and surrounding whitespace from a raw source line.
fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(pos) => line[..pos].trim(),
        None => line.trim(),
    }
}

fn parse_u16(token: &str) -> Result<u16, VmParseError> {
    token
        .parse()
        .map_err(|_| VmParseError::InvalidInteger(token.to_string()))
}

/// Parses a single line of VM source into at most one command.
///
/// Returns `Ok(None)` for blank lines and whole-line comments.
pub fn parse_line(line: &str) -> Result<Option<VmCommand>, VmParseError> {
    let trimmed = strip_comment(line);
    if trimmed.is_empty() {
        return Ok(None);
    }

    let mut tokens = trimmed.split_whitespace();
    let keyword = tokens.next().expect("non-empty line has a first token");

    let command = match keyword {
        "add" => VmCommand::Add,
        "sub" => VmCommand::Sub,
        "neg" => VmCommand::Neg,
        "and" => VmCommand::And,
        "or" => VmCommand::Or,
        "not" => VmCommand::Not,
        "eq" => VmCommand::Eq,
        "gt" => VmCommand::Gt,
        "lt" => VmCommand::Lt,
        "return" => VmCommand::Return,
        "label" => VmCommand::Label(require_ident(tokens.next(), "label name")?),
        "goto" => VmCommand::Goto(require_ident(tokens.next(), "goto target")?),
        "if-goto" => VmCommand::IfGoto(require_ident(tokens.next(), "if-goto target")?),
        "push" | "pop" => {
            let segment_name = tokens.next().ok_or(VmParseError::MissingOperand("segment"))?;
            let segment = Segment::from_str(segment_name)
                .ok_or_else(|| VmParseError::UnknownSegment(segment_name.to_string()))?;
            let index_text = tokens.next().ok_or(VmParseError::MissingOperand("index"))?;
            let index = parse_u16(index_text)?;
            if keyword == "push" {
                VmCommand::Push(segment, index)
            } else {
                VmCommand::Pop(segment, index)
            }
        }
        "function" => {
            let name = require_ident(tokens.next(), "function name")?;
            let n_locals = parse_u16(tokens.next().ok_or(VmParseError::MissingOperand("nLocals"))?)?;
            VmCommand::Function(name, n_locals)
        }
        "call" => {
            let name = require_ident(tokens.next(), "callee name")?;
            let n_args = parse_u16(tokens.next().ok_or(VmParseError::MissingOperand("nArgs"))?)?;
            VmCommand::Call(name, n_args)
        }
        other => return Err(VmParseError::UnknownCommand(other.to_string())),
    };

    Ok(Some(command))
}

fn require_ident(token: Option<&str>, what: &'static str) -> Result<String, VmParseError> {
    token
        .map(str::to_string)
        .ok_or(VmParseError::MissingOperand(what))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nullary_commands() {
        assert_eq!(parse_line("add").unwrap(), Some(VmCommand::Add));
        assert_eq!(parse_line("  eq  ").unwrap(), Some(VmCommand::Eq));
        assert_eq!(parse_line("return").unwrap(), Some(VmCommand::Return));
    }

    #[test]
    fn skips_blank_and_comment_lines() {
        assert_eq!(parse_line("").unwrap(), None);
        assert_eq!(parse_line("   ").unwrap(), None);
        assert_eq!(parse_line("// a comment").unwrap(), None);
        assert_eq!(
            parse_line("push constant 7 // comment").unwrap(),
            Some(VmCommand::Push(Segment::Constant, 7))
        );
    }

    #[test]
    fn parses_memory_access() {
        assert_eq!(
            parse_line("push local 3").unwrap(),
            Some(VmCommand::Push(Segment::Local, 3))
        );
        assert_eq!(
            parse_line("pop static 0").unwrap(),
            Some(VmCommand::Pop(Segment::Static, 0))
        );
    }

    #[test]
    fn parses_control_flow_and_functions() {
        assert_eq!(
            parse_line("label LOOP").unwrap(),
            Some(VmCommand::Label("LOOP".to_string()))
        );
        assert_eq!(
            parse_line("if-goto LOOP").unwrap(),
            Some(VmCommand::IfGoto("LOOP".to_string()))
        );
        assert_eq!(
            parse_line("function Sys.init 0").unwrap(),
            Some(VmCommand::Function("Sys.init".to_string(), 0))
        );
        assert_eq!(
            parse_line("call Math.multiply 2").unwrap(),
            Some(VmCommand::Call("Math.multiply".to_string(), 2))
        );
    }

    #[test]
    fn rejects_unknown_segment() {
        let err = parse_line("push frame 0").unwrap_err();
        assert!(matches!(err, VmParseError::UnknownSegment(_)));
    }

    #[test]
    fn rejects_unknown_command() {
        let err = parse_line("frobnicate").unwrap_err();
        assert!(matches!(err, VmParseError::UnknownCommand(_)));
    }

    #[test]
    fn rejects_non_integer_index() {
        let err = parse_line("push constant x").unwrap_err();
        assert!(matches!(err, VmParseError::InvalidInteger(_)));
    }

    #[test]
    fn rejects_missing_operand() {
        let err = parse_line("push constant").unwrap_err();
        assert!(matches!(err, VmParseError::MissingOperand(_)));
    }
}
