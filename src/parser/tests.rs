//! Unit tests for the parser module.
//!
//! This module contains tests for parsing various language constructs including:
//! - Config blocks, globals, functions and rules
//! - Statements and control flow
//! - Expressions and operator precedence
//! - Board literals
//! - Syntax errors

use std::rc::Rc;

use super::parser::parse;
use crate::{
    ast::{
        ast::{
            BinaryOp, ConfigValue, Definition, ExprKind, Literal, Program, Stmt, UnaryOp,
        },
        types::Type,
    },
    errors::errors::Error,
    lexer::lexer::tokenize,
};

fn parse_source(source: &str) -> Result<Program, Error> {
    let tokens = tokenize(source.to_string(), Some("test.chp".to_string())).unwrap();
    let (_, result) = parse(tokens, Rc::new("test.chp".to_string()));
    result
}

fn global_value(source: &str) -> ExprKind {
    let program = parse_source(source).unwrap();
    let kind = program.globals().next().unwrap().value.kind.clone();
    kind
}

#[test]
fn test_parse_global() {
    let program = parse_source("num x := 3 + 4;").unwrap();
    let global = program.globals().next().unwrap();

    assert_eq!(global.name, "x");
    assert_eq!(global.ty, Type::Num);
    assert!(matches!(
        global.value.kind,
        ExprKind::Binary { operator: BinaryOp::Add, .. }
    ));
}

#[test]
fn test_parse_config_block() {
    let program =
        parse_source("config { centipawn_value := -2; debug := true; }").unwrap();

    assert_eq!(program.config.len(), 2);
    assert_eq!(program.config[0].name, "centipawn_value");
    assert_eq!(program.config[0].value, ConfigValue::Num(-2.0));
    assert_eq!(program.config[1].value, ConfigValue::Bool(true));
}

#[test]
fn test_parse_function_with_reference_params() {
    let program = parse_source("void f(&num a, cell[] &b, bool c) { a := 1; }").unwrap();
    let function = program.functions().next().unwrap();

    assert_eq!(function.return_type, Type::Void);
    assert_eq!(function.params.len(), 3);
    assert!(function.params[0].by_reference);
    assert!(function.params[1].by_reference);
    assert_eq!(function.params[1].ty, Type::array_of(Type::Cell));
    assert!(!function.params[2].by_reference);
}

#[test]
fn test_parse_rule_with_options_and_guard() {
    let source = "rule R (midgame, sym) doif (castled(self)) { score 5; }";
    let program = parse_source(source).unwrap();
    let rule = program.rules().next().unwrap();

    assert_eq!(rule.name, "R");
    let tags: Vec<&str> = rule.options.iter().map(|tag| tag.name.as_str()).collect();
    assert_eq!(tags, vec!["midgame", "sym"]);
    assert!(rule.guard.is_some());
    assert!(matches!(rule.body[0], Stmt::Score { .. }));
}

#[test]
fn test_parse_statements() {
    let source = r#"
        rule R {
            num a, b := 2;
            a := b * 2;
            if (a > 3) { score a; } else if (a < 0) { score 0; } else { return; }
            while a > 0 { a := a - 1; }
            forall (p in spawns) { score value(p); }
            fill(a);
        }
    "#;
    let program = parse_source(source).unwrap();
    let body = &program.rules().next().unwrap().body;

    assert_eq!(body.len(), 6);
    match &body[0] {
        Stmt::VarDecl { declarators, .. } => {
            assert_eq!(declarators.len(), 2);
            assert!(declarators[0].value.is_none());
            assert!(declarators[1].value.is_some());
        }
        other => panic!("expected a declaration, got {:?}", other),
    }
    assert!(matches!(body[1], Stmt::Assign { .. }));
    match &body[2] {
        Stmt::If { else_body: Some(else_body), .. } => {
            assert!(matches!(else_body[0], Stmt::If { .. }));
        }
        other => panic!("expected an if, got {:?}", other),
    }
    assert!(matches!(body[3], Stmt::While { .. }));
    assert!(matches!(body[4], Stmt::Forall { ref variable, .. } if variable == "p"));
    assert!(matches!(body[5], Stmt::Call { .. }));
}

#[test]
fn test_parse_line_numbers() {
    let program = parse_source("num a := 1;\n\nbool b := true;").unwrap();
    let lines: Vec<u32> = program.globals().map(|global| global.line).collect();

    assert_eq!(lines, vec![1, 3]);
}

#[test]
fn test_parse_precedence() {
    match global_value("num x := 1 + 2 * 3;") {
        ExprKind::Binary { operator: BinaryOp::Add, right, .. } => {
            assert!(matches!(right.kind, ExprKind::Binary { operator: BinaryOp::Multiply, .. }));
        }
        other => panic!("unexpected expression {:?}", other),
    }

    match global_value("bool x := not a and b or c;") {
        ExprKind::Binary { operator: BinaryOp::Or, left, .. } => match left.kind {
            ExprKind::Binary { operator: BinaryOp::And, left, .. } => {
                assert!(matches!(left.kind, ExprKind::Unary { operator: UnaryOp::Not, .. }));
            }
            other => panic!("unexpected expression {:?}", other),
        },
        other => panic!("unexpected expression {:?}", other),
    }

    match global_value("num x := -a - b;") {
        ExprKind::Binary { operator: BinaryOp::Subtract, left, .. } => {
            assert!(matches!(left.kind, ExprKind::Unary { operator: UnaryOp::Negate, .. }));
        }
        other => panic!("unexpected expression {:?}", other),
    }
}

#[test]
fn test_parse_member_and_keyword_calls() {
    match global_value("row x := p.row;") {
        ExprKind::FieldAccess { field, .. } => assert_eq!(field, "row"),
        other => panic!("unexpected expression {:?}", other),
    }

    match global_value("row x := row(p);") {
        ExprKind::Call { name, arguments } => {
            assert_eq!(name, "row");
            assert_eq!(arguments.len(), 1);
        }
        other => panic!("unexpected expression {:?}", other),
    }
}

#[test]
fn test_parse_board_literals() {
    assert!(matches!(
        global_value("cell x := $e4;"),
        ExprKind::Literal(Literal::Cell(ref cell)) if cell == "e4"
    ));
    assert!(matches!(global_value("row x := $3;"), ExprKind::Literal(Literal::Row(3))));
    assert!(matches!(global_value("rank x := $r7;"), ExprKind::Literal(Literal::Rank(7))));
    assert!(matches!(global_value("file x := $e;"), ExprKind::Literal(Literal::File(5))));
    assert!(matches!(
        global_value("file[] x := $a..$d;"),
        ExprKind::Literal(Literal::FileRange(1, 4))
    ));
    assert!(matches!(
        global_value("rank[] x := $r1..$r4;"),
        ExprKind::Literal(Literal::RankRange(1, 4))
    ));
}

#[test]
fn test_parse_lists_and_index() {
    assert!(matches!(global_value("num[] x := [];"), ExprKind::EmptyList));
    assert!(matches!(global_value("num[] x := [1, 2, 3];"), ExprKind::List(ref items) if items.len() == 3));
    assert!(matches!(global_value("num x := a[0];"), ExprKind::Index { .. }));
}

#[test]
fn test_parse_expression_ids_are_dense() {
    let program = parse_source("num x := 1 + 2; num y := x;").unwrap();

    assert_eq!(program.expr_count, 4);
    let mut ids: Vec<usize> = program.globals().map(|global| global.value.id).collect();
    ids.sort();
    assert_eq!(ids, vec![2, 3]);
}

#[test]
fn test_parse_void_global_rejected() {
    assert!(parse_source("void x := 1;").is_err());
}

#[test]
fn test_parse_void_variable_rejected() {
    assert!(parse_source("rule R { void x; score 1; }").is_err());
}

#[test]
fn test_parse_missing_semicolon() {
    assert!(parse_source("num x := 1").is_err());
}

#[test]
fn test_parse_expression_statement_must_be_call() {
    assert!(parse_source("rule R { 1 + 2; }").is_err());
}

#[test]
fn test_parse_bare_type_keyword_rejected() {
    assert!(parse_source("num x := row;").is_err());
}
