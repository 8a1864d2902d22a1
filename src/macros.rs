//! Utility macros for the compiler.
//!
//! This module defines helper macros used throughout the compiler:
//!
//! - `MK_TOKEN!` - Creates a Token instance
//! - `MK_DEFAULT_HANDLER!` - Creates a lexer handler for fixed-text tokens
//! - `MK_MATCH_HANDLER!` - Creates a lexer handler that keeps the matched text
//!
//! These macros reduce boilerplate in the lexer implementation.

/// Creates a Token instance.
///
/// # Arguments
///
/// * `$kind` - The TokenKind
/// * `$value` - The token's string value
/// * `$span` - The source span
///
/// # Example
///
/// ```ignore
/// let token = MK_TOKEN!(TokenKind::Number, "42".to_string(), span);
/// ```
#[macro_export]
macro_rules! MK_TOKEN {
    ($kind:expr, $value:expr, $span:expr) => {
        Token {
            kind: $kind,
            value: $value,
            span: $span,
        }
    };
}

/// Creates a lexer handler for single-token patterns with fixed text.
///
/// Generates a handler function that creates a token with the given kind
/// and advances the lexer position by the token's length.
///
/// # Example
///
/// ```ignore
/// RegexPattern {
///     regex: Regex::new("^:=").unwrap(),
///     handler: MK_DEFAULT_HANDLER!(TokenKind::Assignment, ":="),
/// }
/// ```
#[macro_export]
macro_rules! MK_DEFAULT_HANDLER {
    ($kind:expr, $value:literal) => {
        |lexer: &mut Lexer, _regex: &Regex| {
            lexer.push(MK_TOKEN!(
                $kind,
                String::from($value),
                Span {
                    start: Position(lexer.line, Rc::clone(&lexer.file)),
                    end: Position(lexer.line, Rc::clone(&lexer.file))
                }
            ));
            lexer.advance_n($value.len());
        }
    };
}

/// Creates a lexer handler that stores whatever the pattern matched as the
/// token value. Used for numbers and board coordinate literals.
#[macro_export]
macro_rules! MK_MATCH_HANDLER {
    ($kind:expr) => {
        |lexer: &mut Lexer, regex: &Regex| {
            let matched = regex
                .find(lexer.remainder())
                .map(|found| found.as_str().to_string())
                .unwrap_or_default();

            lexer.push(MK_TOKEN!(
                $kind,
                matched.clone(),
                Span {
                    start: Position(lexer.line, Rc::clone(&lexer.file)),
                    end: Position(lexer.line, Rc::clone(&lexer.file))
                }
            ));
            lexer.advance_n(matched.len());
        }
    };
}
