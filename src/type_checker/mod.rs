//! Type checking and semantic analysis module.
//!
//! This module performs semantic analysis on the syntax tree. Types are not
//! written into the tree; they are collected in a [`type_table::TypeTable`]
//! indexed by expression id. The analysis:
//!
//! - Validates the config block against the option table
//! - Registers builtins, function headers, globals and rules
//! - Verifies type correctness of expressions and statements
//! - Resolves overloaded calls and records the chosen header per call site
//! - Reports unreachable code, missing returns and unused bindings
//!
//! A second stage, [`inference`], resolves the element type of empty and
//! generic arrays once the program is known to be error free.

pub mod builtins;
pub mod config;
pub mod inference;
pub mod symbol_table;
pub mod type_checker;
pub mod type_table;

#[cfg(test)]
mod tests;
