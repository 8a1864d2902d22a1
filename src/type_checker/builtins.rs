use lazy_static::lazy_static;
use regex::Regex;

use crate::{ast::types::Type, errors::errors::ErrorImpl};

/// Signatures of the functions the engine runtime provides.
pub const PREDEFINED_FUNCTIONS: &str = include_str!("../../std/predefined_functions.txt");

lazy_static! {
    static ref HEADER_PATTERN: Regex =
        Regex::new(r"^\s*(\S+)\s+([A-Za-z_][A-Za-z0-9_]*)\s*\(\s*(\S*)\s*\)\s*$").unwrap();
}

#[derive(Debug, Clone, PartialEq)]
pub struct Builtin {
    pub name: String,
    pub return_type: Type,
    pub params: Vec<Type>,
}

/// Parses `<returnType> <name>(<paramType>)` lines, skipping blanks and `#`
/// comments.
pub fn parse_builtins(source: &str) -> Result<Vec<Builtin>, ErrorImpl> {
    let mut builtins = vec![];

    for (index, text) in source.lines().enumerate() {
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let malformed = || ErrorImpl::MalformedBuiltin {
            line: index as u32 + 1,
            text: String::from(text),
        };

        let captures = HEADER_PATTERN.captures(trimmed).ok_or_else(malformed)?;
        let return_type = Type::parse_resource(&captures[1]).ok_or_else(malformed)?;
        let params = match &captures[3] {
            "" => vec![],
            param => vec![Type::parse_resource(param).ok_or_else(malformed)?],
        };

        builtins.push(Builtin {
            name: String::from(&captures[2]),
            return_type,
            params,
        });
    }

    Ok(builtins)
}

pub fn predefined_functions() -> Result<Vec<Builtin>, ErrorImpl> {
    parse_builtins(PREDEFINED_FUNCTIONS)
}
