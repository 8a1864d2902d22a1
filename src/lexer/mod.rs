//! Lexical analysis module for the compiler.
//!
//! This module contains the lexer (tokenizer) that converts Chespel source
//! into a stream of tokens for parsing. It handles:
//!
//! - Tokenization of source code using an ordered table of regex patterns
//! - Recognition of keywords, type names, identifiers and literals
//! - Board coordinate literals (`$e4`, `$r3`, `$a1..$h1`, ...)
//! - Line tracking for error reporting
//! - Comments and whitespace handling

pub mod lexer;
pub mod tokens;
