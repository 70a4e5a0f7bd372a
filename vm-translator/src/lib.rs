//! Hack VM translator (`Nand2Tetris` Projects 7-8).
//!
//! Translates the stack-based VM intermediate language into Hack assembly.
//!
//! # Architecture
//! - [`command`]: VM command model and line parser
//! - [`instruction`]: Assembly instruction model
//! - [`generator`]: Translates `VmCommand`s into `AsmInstruction`s, including the
//!   full function call/return convention and program bootstrap

pub mod command;
pub mod generator;
pub mod instruction;
