//! Error types and error handling for the compiler.
//!
//! This module defines the error types used throughout the compilation
//! process. It includes:
//!
//! - Error structures with source position information
//! - Specific error variants grouped by diagnostic kind
//! - The line-ordered diagnostics collector used by the checker
//! - Helpful error messages and suggestions

pub mod diagnostics;
pub mod errors;
