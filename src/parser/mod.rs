//! Parser module for building an Abstract Syntax Tree (AST).
//!
//! This module contains the parser that transforms a stream of tokens
//! into an Abstract Syntax Tree. It uses a Pratt parser for expressions
//! with proper operator precedence and handles:
//!
//! - Top-level definitions (config block, globals, functions, rules)
//! - Statement parsing (variable declarations, control flow, score)
//! - Expression parsing (binary ops, function calls, literals)
//! - Type parsing for type annotations
//! - Board coordinate literals and ranges
//!
//! The parser uses NUD (null denotation) and LED (left denotation) functions
//! for expression parsing with binding power for precedence handling.

pub mod expr;
pub mod lookups;
pub mod parser;
pub mod stmt;
pub mod types;

#[cfg(test)]
mod tests;
