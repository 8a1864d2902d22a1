use std::collections::HashMap;

use crate::{ast::ast::{Expr, Stmt}, errors::errors::Error, lexer::tokens::TokenKind};

use super::{expr::*, parser::Parser, stmt::*};

#[derive(PartialEq, PartialOrd, Clone, Copy, Debug)]
pub enum BindingPower {
    Default,
    Or,
    And,
    Relational,
    Additive,
    Multiplicative,
    Unary,
    Call,
    Member,
    Primary
}

pub type StmtHandler = fn(&mut Parser) -> Result<Stmt, Error>;
pub type NUDHandler = fn(&mut Parser) -> Result<Expr, Error>;
pub type LEDHandler = fn(&mut Parser, Expr, BindingPower) -> Result<Expr, Error>;

pub fn create_token_lookups(parser: &mut Parser) {
    // Logical
    parser.led(TokenKind::Or, BindingPower::Or, parse_binary_expr);
    parser.led(TokenKind::And, BindingPower::And, parse_binary_expr);

    // Relational
    parser.led(TokenKind::Less, BindingPower::Relational, parse_binary_expr);
    parser.led(TokenKind::LessEquals, BindingPower::Relational, parse_binary_expr);
    parser.led(TokenKind::Greater, BindingPower::Relational, parse_binary_expr);
    parser.led(TokenKind::GreaterEquals, BindingPower::Relational, parse_binary_expr);
    parser.led(TokenKind::Equals, BindingPower::Relational, parse_binary_expr);
    parser.led(TokenKind::NotEquals, BindingPower::Relational, parse_binary_expr);
    parser.led(TokenKind::In, BindingPower::Relational, parse_binary_expr);

    // Additive and multiplicative
    parser.led(TokenKind::Plus, BindingPower::Additive, parse_binary_expr);
    parser.led(TokenKind::Dash, BindingPower::Additive, parse_binary_expr);
    parser.led(TokenKind::PlusPlus, BindingPower::Additive, parse_binary_expr);
    parser.led(TokenKind::Star, BindingPower::Multiplicative, parse_binary_expr);
    parser.led(TokenKind::Slash, BindingPower::Multiplicative, parse_binary_expr);

    parser.led(TokenKind::OpenParen, BindingPower::Call, parse_call_expr);
    parser.led(TokenKind::OpenBracket, BindingPower::Call, parse_index_expr);

    // Member
    parser.led(TokenKind::Dot, BindingPower::Member, parse_member_expr);

    // Literals and symbols
    parser.nud(TokenKind::Number, parse_primary_expr);
    parser.nud(TokenKind::String, parse_primary_expr);
    parser.nud(TokenKind::True, parse_primary_expr);
    parser.nud(TokenKind::False, parse_primary_expr);
    parser.nud(TokenKind::Identifier, parse_primary_expr);
    parser.nud(TokenKind::SelfPlayer, parse_primary_expr);
    parser.nud(TokenKind::Rival, parse_primary_expr);
    parser.nud(TokenKind::BoardLiteral, parse_primary_expr);
    parser.nud(TokenKind::PieceLiteral, parse_primary_expr);
    parser.nud(TokenKind::CellLiteral, parse_board_literal_expr);
    parser.nud(TokenKind::RowLiteral, parse_board_literal_expr);
    parser.nud(TokenKind::RankLiteral, parse_board_literal_expr);
    parser.nud(TokenKind::FileLiteral, parse_board_literal_expr);
    parser.nud(TokenKind::CellRange, parse_board_literal_expr);
    parser.nud(TokenKind::RowRange, parse_board_literal_expr);
    parser.nud(TokenKind::RankRange, parse_board_literal_expr);
    parser.nud(TokenKind::FileRange, parse_board_literal_expr);

    // Builtins sharing a name with a type keyword, e.g. `row(p)`
    parser.nud(TokenKind::Piece, parse_keyword_callee_expr);
    parser.nud(TokenKind::Cell, parse_keyword_callee_expr);
    parser.nud(TokenKind::Row, parse_keyword_callee_expr);
    parser.nud(TokenKind::Rank, parse_keyword_callee_expr);
    parser.nud(TokenKind::File, parse_keyword_callee_expr);
    parser.nud(TokenKind::Player, parse_keyword_callee_expr);

    parser.nud(TokenKind::Dash, parse_prefix_expr);
    parser.nud(TokenKind::Plus, parse_prefix_expr);
    parser.nud(TokenKind::Not, parse_prefix_expr);
    parser.nud(TokenKind::OpenParen, parse_grouping_expr);
    parser.nud(TokenKind::OpenBracket, parse_list_expr);

    // Statements
    parser.stmt(TokenKind::If, parse_if_stmt);
    parser.stmt(TokenKind::While, parse_while_stmt);
    parser.stmt(TokenKind::Forall, parse_forall_stmt);
    parser.stmt(TokenKind::Return, parse_return_stmt);
    parser.stmt(TokenKind::Score, parse_score_stmt);
    parser.stmt(TokenKind::Num, parse_var_decl_stmt);
    parser.stmt(TokenKind::Bool, parse_var_decl_stmt);
    parser.stmt(TokenKind::StringType, parse_var_decl_stmt);
    parser.stmt(TokenKind::Piece, parse_var_decl_stmt);
    parser.stmt(TokenKind::Cell, parse_var_decl_stmt);
    parser.stmt(TokenKind::Row, parse_var_decl_stmt);
    parser.stmt(TokenKind::Rank, parse_var_decl_stmt);
    parser.stmt(TokenKind::File, parse_var_decl_stmt);
    parser.stmt(TokenKind::Player, parse_var_decl_stmt);
}

// Lookup tables inside parser struct, so it's easier
pub type StmtLookup = HashMap<TokenKind, StmtHandler>;
pub type NUDLookup = HashMap<TokenKind, NUDHandler>;
pub type LEDLookup = HashMap<TokenKind, LEDHandler>;
pub type BPLookup = HashMap<TokenKind, BindingPower>;
