//! Code generation module for the compiler.
//!
//! This module lowers a checked and inferred program to the C++ source the
//! chess engine compiles into its evaluation function. It handles:
//!
//! - Layout of the generated file and the phase aggregates
//! - Lowering of statements, including literal hoisting and `forall` loops
//! - Lowering of expressions to the engine's helper calls
//! - Names and type spellings of the engine runtime

pub mod compiler;
pub mod expr;
pub mod stdlib;
pub mod stmt;
