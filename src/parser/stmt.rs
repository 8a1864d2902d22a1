use crate::{
    ast::ast::{
        ConfigEntry, ConfigValue, Definition, Expr, ExprKind, FunctionDef, GlobalDef, Param,
        RuleDef, RuleOptionTag, Stmt, VarDeclarator,
    },
    ast::types::Type,
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    parser::{expr::parse_expr, lookups::BindingPower},
};

use super::{
    parser::Parser,
    types::{parse_type, parse_value_type},
};

pub fn parse_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let kind = parser.current_token_kind();

    // `row(p);` starts with a type keyword but is a call
    let keyword_call = kind.is_callable_keyword() && parser.peek_kind() == TokenKind::OpenParen;

    if !keyword_call {
        if let Some(handler) = parser.get_stmt_lookup().get(&kind).copied() {
            return handler(parser);
        }
    }

    if kind == TokenKind::Identifier && parser.peek_kind() == TokenKind::Assignment {
        return parse_assign_stmt(parser);
    }

    let call = parse_expr(parser, BindingPower::Default)?;
    if !matches!(call.kind, ExprKind::Call { .. } | ExprKind::FieldAccess { .. }) {
        return Err(parser.unexpected("only calls can be used as statements"));
    }
    parser.expect(TokenKind::Semicolon)?;

    let line = call.line;
    Ok(Stmt::Call { call, line })
}

fn parse_assign_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let target = parse_expr(parser, BindingPower::Primary)?;
    let line = target.line;

    parser.expect(TokenKind::Assignment)?;
    let value = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::Semicolon)?;

    Ok(Stmt::Assign { target, value, line })
}

/// Parses `{ stmt* }`.
pub fn parse_block(parser: &mut Parser) -> Result<Vec<Stmt>, Error> {
    parser.expect(TokenKind::OpenCurly)?;

    let mut body = vec![];
    while parser.has_tokens() && parser.current_token_kind() != TokenKind::CloseCurly {
        body.push(parse_stmt(parser)?);
    }

    parser.expect(TokenKind::CloseCurly)?;

    Ok(body)
}

pub fn parse_var_decl_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let line = parser.current_token().line();
    let ty = parse_value_type(parser)?;

    let mut declarators = vec![];
    loop {
        let error = Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: parser.current_token().value.clone(),
                message: String::from("expected identifier during variable declaration"),
            },
            parser.get_position(),
        );
        let name_token = parser.expect_error(TokenKind::Identifier, Some(error))?;

        let value = if parser.current_token_kind() == TokenKind::Assignment {
            parser.advance();
            Some(parse_expr(parser, BindingPower::Default)?)
        } else {
            None
        };

        declarators.push(VarDeclarator {
            name: name_token.value.clone(),
            value,
            line: name_token.line(),
        });

        if parser.current_token_kind() != TokenKind::Comma {
            break;
        }
        parser.advance();
    }

    parser.expect(TokenKind::Semicolon)?;

    Ok(Stmt::VarDecl { ty, declarators, line })
}

pub fn parse_if_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let line = parser.advance().line();

    let condition = parse_expr(parser, BindingPower::Default)?;
    let then_body = parse_block(parser)?;

    let else_body = if parser.current_token_kind() == TokenKind::Else {
        parser.advance();
        if parser.current_token_kind() == TokenKind::If {
            Some(vec![parse_if_stmt(parser)?])
        } else {
            Some(parse_block(parser)?)
        }
    } else {
        None
    };

    Ok(Stmt::If {
        condition,
        then_body,
        else_body,
        line,
    })
}

pub fn parse_while_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let line = parser.advance().line();

    let condition = parse_expr(parser, BindingPower::Default)?;
    let body = parse_block(parser)?;

    Ok(Stmt::While { condition, body, line })
}

pub fn parse_forall_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let line = parser.advance().line();

    parser.expect(TokenKind::OpenParen)?;
    let variable = parser.expect(TokenKind::Identifier)?.value;
    parser.expect(TokenKind::In)?;
    let source = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;

    let body = parse_block(parser)?;

    Ok(Stmt::Forall {
        variable,
        source,
        body,
        line,
    })
}

pub fn parse_return_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let line = parser.advance().line();

    let value = if parser.current_token_kind() == TokenKind::Semicolon {
        None
    } else {
        Some(parse_expr(parser, BindingPower::Default)?)
    };
    parser.expect(TokenKind::Semicolon)?;

    Ok(Stmt::Return { value, line })
}

pub fn parse_score_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let line = parser.advance().line();

    let value = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::Semicolon)?;

    Ok(Stmt::Score { value, line })
}

/// Parses `config { name := literal; ... }`.
pub fn parse_config_block(parser: &mut Parser) -> Result<Vec<ConfigEntry>, Error> {
    parser.expect(TokenKind::Config)?;
    parser.expect(TokenKind::OpenCurly)?;

    let mut entries = vec![];
    while parser.has_tokens() && parser.current_token_kind() != TokenKind::CloseCurly {
        let name_token = parser.expect(TokenKind::Identifier)?;
        parser.expect(TokenKind::Assignment)?;

        let value = match parser.current_token_kind() {
            TokenKind::True => {
                parser.advance();
                ConfigValue::Bool(true)
            }
            TokenKind::False => {
                parser.advance();
                ConfigValue::Bool(false)
            }
            TokenKind::Dash | TokenKind::Number => {
                let negative = parser.current_token_kind() == TokenKind::Dash;
                if negative {
                    parser.advance();
                }
                let number = parser.expect(TokenKind::Number)?;
                let value = number.value.parse::<f64>().map_err(|_| {
                    Error::new(
                        ErrorImpl::NumberParseError { token: number.value.clone() },
                        number.span.start.clone(),
                    )
                })?;
                ConfigValue::Num(if negative { -value } else { value })
            }
            _ => return Err(parser.unexpected("config values must be numbers or booleans")),
        };

        parser.expect(TokenKind::Semicolon)?;

        entries.push(ConfigEntry {
            name: name_token.value.clone(),
            value,
            line: name_token.line(),
        });
    }

    parser.expect(TokenKind::CloseCurly)?;

    Ok(entries)
}

pub fn parse_definition(parser: &mut Parser) -> Result<Definition, Error> {
    if parser.current_token_kind() == TokenKind::Rule {
        return parse_rule_definition(parser);
    }

    let position = parser.get_position();
    let line = position.0;
    let ty = parse_type(parser, BindingPower::Default)?;

    let error = Error::new(
        ErrorImpl::UnexpectedTokenDetailed {
            token: parser.current_token().value.clone(),
            message: String::from("expected a global or function name"),
        },
        parser.get_position(),
    );
    let name = parser.expect_error(TokenKind::Identifier, Some(error))?.value;

    if parser.current_token_kind() == TokenKind::OpenParen {
        return parse_function_definition(parser, ty, name, line);
    }

    if ty.contains_void() {
        return Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: String::from("void"),
                message: String::from("void is only allowed as a function return type"),
            },
            position,
        ));
    }

    parser.expect(TokenKind::Assignment)?;
    let value = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::Semicolon)?;

    Ok(Definition::Global(GlobalDef { ty, name, value, line }))
}

fn parse_param(parser: &mut Parser) -> Result<Param, Error> {
    let line = parser.current_token().line();

    let mut by_reference = false;
    if parser.current_token_kind() == TokenKind::Ampersand {
        parser.advance();
        by_reference = true;
    }

    let ty = parse_value_type(parser)?;

    if parser.current_token_kind() == TokenKind::Ampersand {
        parser.advance();
        by_reference = true;
    }

    let name = parser.expect(TokenKind::Identifier)?.value;

    Ok(Param {
        ty,
        name,
        by_reference,
        line,
    })
}

fn parse_function_definition(
    parser: &mut Parser,
    return_type: Type,
    name: String,
    line: u32,
) -> Result<Definition, Error> {
    parser.expect(TokenKind::OpenParen)?;

    let mut params = vec![];
    if parser.current_token_kind() != TokenKind::CloseParen {
        params.push(parse_param(parser)?);
        while parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
            params.push(parse_param(parser)?);
        }
    }
    parser.expect(TokenKind::CloseParen)?;

    let body = parse_block(parser)?;

    Ok(Definition::Function(FunctionDef {
        return_type,
        name,
        params,
        body,
        line,
    }))
}

fn parse_rule_definition(parser: &mut Parser) -> Result<Definition, Error> {
    let line = parser.advance().line();
    let name = parser.expect(TokenKind::Identifier)?.value;

    let mut options = vec![];
    if parser.current_token_kind() == TokenKind::OpenParen {
        parser.advance();
        loop {
            let tag = parser.expect(TokenKind::Identifier)?;
            options.push(RuleOptionTag {
                name: tag.value.clone(),
                line: tag.line(),
            });

            if parser.current_token_kind() != TokenKind::Comma {
                break;
            }
            parser.advance();
        }
        parser.expect(TokenKind::CloseParen)?;
    }

    let guard: Option<Expr> = if parser.current_token_kind() == TokenKind::Doif {
        parser.advance();
        Some(parse_expr(parser, BindingPower::Default)?)
    } else {
        None
    };

    let body = parse_block(parser)?;

    Ok(Definition::Rule(RuleDef {
        name,
        options,
        guard,
        body,
        line,
    }))
}
