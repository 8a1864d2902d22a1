//! Type parsing implementation.
//!
//! This module handles parsing of type annotations. Chespel types are a
//! keyword (`num`, `cell`, ...) followed by any number of `[]` suffixes.
//!
//! Similar to expression parsing, it uses NUD/LED handlers with
//! binding powers, so `num[][]` parses as an array of arrays.

use std::collections::HashMap;

use crate::{
    ast::types::Type,
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::{lookups::BindingPower, parser::Parser};

/// Type alias for type null denotation handler functions.
pub type TypeNUDHandler = fn(&mut Parser) -> Result<Type, Error>;

/// Type alias for type left denotation handler functions.
pub type TypeLEDHandler = fn(&mut Parser, Type, BindingPower) -> Result<Type, Error>;

/// Type alias for type NUD lookup table.
pub type TypeNUDLookup = HashMap<TokenKind, TypeNUDHandler>;

/// Type alias for type LED lookup table.
pub type TypeLEDLookup = HashMap<TokenKind, TypeLEDHandler>;

/// Type alias for type binding power lookup table.
pub type TypeBPLookup = HashMap<TokenKind, BindingPower>;

/// Initializes the type parsing lookup tables.
pub fn create_token_type_lookups(parser: &mut Parser) {
    for kind in [
        TokenKind::Void,
        TokenKind::Num,
        TokenKind::Bool,
        TokenKind::StringType,
        TokenKind::Piece,
        TokenKind::Cell,
        TokenKind::Row,
        TokenKind::Rank,
        TokenKind::File,
        TokenKind::Player,
    ] {
        parser.type_nud(kind, parse_keyword_type);
    }
    parser.type_led(TokenKind::OpenBracket, BindingPower::Call, parse_array_type);
}

pub fn parse_keyword_type(parser: &mut Parser) -> Result<Type, Error> {
    let ty = match parser.current_token_kind() {
        TokenKind::Void => Type::Void,
        TokenKind::Num => Type::Num,
        TokenKind::Bool => Type::Bool,
        TokenKind::StringType => Type::String,
        TokenKind::Piece => Type::Piece,
        TokenKind::Cell => Type::Cell,
        TokenKind::Row => Type::Row,
        TokenKind::Rank => Type::Rank,
        TokenKind::File => Type::File,
        TokenKind::Player => Type::Player,
        _ => return Err(parser.unexpected("expected a type")),
    };
    parser.advance();

    Ok(ty)
}

pub fn parse_array_type(
    parser: &mut Parser,
    left: Type,
    _bp: BindingPower,
) -> Result<Type, Error> {
    parser.expect(TokenKind::OpenBracket)?;
    parser.expect(TokenKind::CloseBracket)?;

    Ok(Type::array_of(left))
}

pub fn parse_type(parser: &mut Parser, bp: BindingPower) -> Result<Type, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let nud = match parser.get_type_nud_lookup().get(&token_kind) {
        Some(nud) => *nud,
        None => {
            return Err(Error::new(
                ErrorImpl::UnexpectedTokenDetailed {
                    token: parser.current_token().value.clone(),
                    message: String::from("expected a type"),
                },
                parser.get_position(),
            ))
        }
    };

    let mut left = nud(parser)?;

    // While LED and current BP is less than BP of current token, continue parsing lhs
    while let Some(binding_power) = parser
        .get_type_bp_lookup()
        .get(&parser.current_token_kind())
        .copied()
        .filter(|binding_power| *binding_power > bp)
    {
        let led = match parser.get_type_led_lookup().get(&parser.current_token_kind()) {
            Some(led) => *led,
            None => break,
        };

        left = led(parser, left, binding_power)?;
    }

    Ok(left)
}

/// Parses a type that can hold a value, rejecting `void` anywhere inside it.
pub fn parse_value_type(parser: &mut Parser) -> Result<Type, Error> {
    let position = parser.get_position();
    let ty = parse_type(parser, BindingPower::Default)?;

    if ty.contains_void() {
        return Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: String::from("void"),
                message: String::from("void is only allowed as a function return type"),
            },
            position,
        ));
    }

    Ok(ty)
}
