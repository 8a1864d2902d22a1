use crate::{
    ast::ast::{BinaryOp, BoardCollection, Expr, ExprKind, Literal, PlayerLiteral, UnaryOp},
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
};

use super::{lookups::BindingPower, parser::Parser};

fn make_expr(parser: &mut Parser, kind: ExprKind, line: u32) -> Expr {
    Expr {
        id: parser.advance_id(),
        kind,
        line,
    }
}

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<Expr, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let nud = match parser.get_nud_lookup().get(&token_kind) {
        Some(nud) => *nud,
        None => return Err(Error::new(ErrorImpl::UnexpectedToken { token: parser.current_token().value.clone() }, parser.get_position())),
    };

    let mut left = nud(parser)?;

    // While LED and current BP is less than BP of current token, continue parsing lhs
    while *parser.get_bp_lookup().get(&parser.current_token_kind()).unwrap_or(&BindingPower::Default) > bp {
        let token_kind = parser.current_token_kind();
        let (led, binding_power) = match (parser.get_led_lookup().get(&token_kind), parser.get_bp_lookup().get(&token_kind)) {
            (Some(led), Some(binding_power)) => (*led, *binding_power),
            _ => return Err(Error::new(ErrorImpl::UnexpectedToken { token: parser.current_token().value.clone() }, parser.get_position())),
        };

        left = led(parser, left, binding_power)?;
    }

    Ok(left)
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let token = parser.current_token().clone();

    let kind = match token.kind {
        TokenKind::Number => match token.value.parse::<f64>() {
            Ok(value) => ExprKind::Literal(Literal::Number(value)),
            Err(_) => return Err(Error::new(ErrorImpl::NumberParseError { token: token.value.clone() }, parser.get_position())),
        },
        TokenKind::String => ExprKind::Literal(Literal::String(token.value.clone())),
        TokenKind::True => ExprKind::Literal(Literal::Boolean(true)),
        TokenKind::False => ExprKind::Literal(Literal::Boolean(false)),
        TokenKind::SelfPlayer => ExprKind::Literal(Literal::Player(PlayerLiteral::SelfPlayer)),
        TokenKind::Rival => ExprKind::Literal(Literal::Player(PlayerLiteral::Rival)),
        TokenKind::PieceLiteral => ExprKind::Literal(Literal::Pieces(token.value.clone())),
        TokenKind::BoardLiteral => {
            let collection = match token.value.as_str() {
                "cells" => BoardCollection::Cells,
                "rows" => BoardCollection::Rows,
                "ranks" => BoardCollection::Ranks,
                _ => BoardCollection::Files,
            };
            ExprKind::Literal(Literal::Board(collection))
        }
        TokenKind::Identifier => ExprKind::Identifier(token.value.clone()),
        _ => return Err(Error::new(ErrorImpl::UnexpectedToken { token: token.value.clone() }, parser.get_position())),
    };

    parser.advance();
    Ok(make_expr(parser, kind, token.line()))
}

/// Column letter `a`..`h` as 1..8.
fn file_number(letter: char) -> u8 {
    (letter as u8).saturating_sub(b'a') + 1
}

fn digit(character: char) -> u8 {
    character.to_digit(10).unwrap_or(0) as u8
}

/// Splits `$x..$y` into the two halves without their `$`.
fn range_bounds(text: &str) -> (&str, &str) {
    let (from, to) = text.split_once("..").unwrap_or((text, text));
    (from.trim_start_matches('$'), to.trim_start_matches('$'))
}

fn last_char(text: &str) -> char {
    text.chars().last().unwrap_or('0')
}

pub fn parse_board_literal_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let token = parser.advance().clone();
    let text = token.value.as_str();
    let body = text.trim_start_matches('$');

    let literal = match token.kind {
        TokenKind::CellLiteral => Literal::Cell(String::from(body)),
        TokenKind::RowLiteral => Literal::Row(digit(last_char(body))),
        TokenKind::RankLiteral => Literal::Rank(digit(last_char(body))),
        TokenKind::FileLiteral => Literal::File(file_number(body.chars().next().unwrap_or('a'))),
        TokenKind::CellRange => {
            let (from, to) = range_bounds(text);
            Literal::CellRange(String::from(from), String::from(to))
        }
        TokenKind::RowRange => {
            let (from, to) = range_bounds(text);
            Literal::RowRange(digit(last_char(from)), digit(last_char(to)))
        }
        TokenKind::RankRange => {
            let (from, to) = range_bounds(text);
            Literal::RankRange(digit(last_char(from)), digit(last_char(to)))
        }
        TokenKind::FileRange => {
            let (from, to) = range_bounds(text);
            Literal::FileRange(
                file_number(from.chars().next().unwrap_or('a')),
                file_number(to.chars().next().unwrap_or('a')),
            )
        }
        _ => return Err(Error::new(ErrorImpl::UnexpectedToken { token: token.value.clone() }, token.span.start.clone())),
    };

    Ok(make_expr(parser, ExprKind::Literal(literal), token.line()))
}

/// `row(p)`: a type keyword is only an expression when it is called.
pub fn parse_keyword_callee_expr(parser: &mut Parser) -> Result<Expr, Error> {
    if parser.peek_kind() != TokenKind::OpenParen {
        return Err(parser.unexpected("a type name can only be used here as a function call"));
    }

    let token = parser.advance().clone();
    Ok(make_expr(parser, ExprKind::Identifier(token.value.clone()), token.line()))
}

fn binary_operator(token: &Token) -> Result<BinaryOp, Error> {
    let operator = match token.kind {
        TokenKind::Or => BinaryOp::Or,
        TokenKind::And => BinaryOp::And,
        TokenKind::Equals => BinaryOp::Equal,
        TokenKind::NotEquals => BinaryOp::NotEqual,
        TokenKind::Less => BinaryOp::Less,
        TokenKind::LessEquals => BinaryOp::LessEqual,
        TokenKind::Greater => BinaryOp::Greater,
        TokenKind::GreaterEquals => BinaryOp::GreaterEqual,
        TokenKind::In => BinaryOp::In,
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Dash => BinaryOp::Subtract,
        TokenKind::Star => BinaryOp::Multiply,
        TokenKind::Slash => BinaryOp::Divide,
        TokenKind::PlusPlus => BinaryOp::Concat,
        _ => return Err(Error::new(ErrorImpl::UnexpectedToken { token: token.value.clone() }, token.span.start.clone())),
    };

    Ok(operator)
}

pub fn parse_binary_expr(parser: &mut Parser, left: Expr, bp: BindingPower) -> Result<Expr, Error> {
    let operator_token = parser.advance().clone();
    let operator = binary_operator(&operator_token)?;

    let right = parse_expr(parser, bp)?;
    let line = left.line;

    Ok(make_expr(parser, ExprKind::Binary { operator, left: Box::new(left), right: Box::new(right) }, line))
}

pub fn parse_prefix_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let operator_token = parser.advance().clone();

    let (operator, bp) = match operator_token.kind {
        TokenKind::Not => (UnaryOp::Not, BindingPower::And),
        TokenKind::Plus => (UnaryOp::Absolute, BindingPower::Unary),
        _ => (UnaryOp::Negate, BindingPower::Unary),
    };
    let operand = parse_expr(parser, bp)?;

    Ok(make_expr(parser, ExprKind::Unary { operator, operand: Box::new(operand) }, operator_token.line()))
}

pub fn parse_grouping_expr(parser: &mut Parser) -> Result<Expr, Error> {
    parser.advance();
    let expr = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;

    Ok(expr)
}

pub fn parse_list_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let line = parser.advance().line();

    if parser.current_token_kind() == TokenKind::CloseBracket {
        parser.advance();
        return Ok(make_expr(parser, ExprKind::EmptyList, line));
    }

    let mut elements = vec![parse_expr(parser, BindingPower::Default)?];
    while parser.current_token_kind() == TokenKind::Comma {
        parser.advance();
        elements.push(parse_expr(parser, BindingPower::Default)?);
    }

    parser.expect(TokenKind::CloseBracket)?;

    Ok(make_expr(parser, ExprKind::List(elements), line))
}

pub fn parse_call_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    let name = match left.kind {
        ExprKind::Identifier(name) => name,
        _ => return Err(parser.unexpected("only named functions can be called")),
    };
    parser.advance();

    let mut arguments = vec![];

    if parser.current_token_kind() != TokenKind::CloseParen {
        arguments.push(parse_expr(parser, BindingPower::Default)?);
        while parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
            arguments.push(parse_expr(parser, BindingPower::Default)?);
        }
    }

    parser.expect(TokenKind::CloseParen)?;

    Ok(make_expr(parser, ExprKind::Call { name, arguments }, left.line))
}

pub fn parse_index_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    parser.advance();
    let index = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseBracket)?;
    let line = left.line;

    Ok(make_expr(parser, ExprKind::Index { base: Box::new(left), index: Box::new(index) }, line))
}

pub fn parse_member_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    parser.advance();

    let token = parser.current_token().clone();
    if token.kind != TokenKind::Identifier && !token.kind.is_callable_keyword() {
        return Err(parser.unexpected("expected a function name after '.'"));
    }
    parser.advance();
    let line = left.line;

    Ok(make_expr(parser, ExprKind::FieldAccess { base: Box::new(left), field: token.value }, line))
}
