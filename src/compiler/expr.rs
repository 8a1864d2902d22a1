use std::collections::HashSet;

use crate::{
    ast::{
        ast::{BinaryOp, Expr, ExprKind, Literal, UnaryOp},
        types::Type,
    },
    errors::errors::{Error, ErrorImpl},
};

use super::{
    compiler::Compiler,
    stdlib::{
        board_collection, builtin_name, escape_string, format_number, function_name, player,
        variable_name,
    },
};

/// Generates the C++ text of an expression.
///
/// List literals cannot be written inline in C++98, so each one is hoisted
/// into a `_lit_N` vector. The declarations and `push_back` calls are appended
/// to `prelude`, which the caller must emit before the statement that uses
/// the returned text. Inner literals are hoisted before the outer ones.
///
/// # Arguments
///
/// * `compiler` - The compiler instance
/// * `expr` - The expression to generate
/// * `prelude` - Receives the statements the expression depends on
pub fn gen_expression(
    compiler: &mut Compiler,
    expr: &Expr,
    prelude: &mut Vec<String>,
) -> Result<String, Error> {
    match &expr.kind {
        ExprKind::Literal(literal) => Ok(gen_literal(literal)),
        ExprKind::Identifier(name) => Ok(variable_name(name)),
        ExprKind::Binary {
            operator,
            left,
            right,
        } => {
            let left_code = gen_expression(compiler, left, prelude)?;
            let right_code = gen_expression(compiler, right, prelude)?;

            let compares_arrays = matches!(compiler.type_of(left.id), Type::Array(_))
                && matches!(compiler.type_of(right.id), Type::Array(_));

            let code = match operator {
                BinaryOp::In => format!("in_expr({}, {})", left_code, right_code),
                BinaryOp::Concat => format!("concat({}, {})", left_code, right_code),
                BinaryOp::Equal if compares_arrays => {
                    format!("array_equality({}, {})", left_code, right_code)
                }
                BinaryOp::NotEqual if compares_arrays => {
                    format!("!array_equality({}, {})", left_code, right_code)
                }
                _ => format!("({} {} {})", left_code, operator.symbol(), right_code),
            };

            Ok(code)
        }
        ExprKind::Unary { operator, operand } => {
            let operand_code = gen_expression(compiler, operand, prelude)?;

            Ok(match operator {
                UnaryOp::Not => format!("!({})", operand_code),
                UnaryOp::Negate => format!("-({})", operand_code),
                UnaryOp::Absolute => format!("abs({})", operand_code),
            })
        }
        ExprKind::Call { name, arguments } => {
            let mut codes = vec![];
            for argument in arguments {
                codes.push(gen_expression(compiler, argument, prelude)?);
            }

            let callee = callee_name(compiler, expr, name)?;
            Ok(format!("{}({})", callee, codes.join(", ")))
        }
        ExprKind::FieldAccess { base, field } => {
            let base_code = gen_expression(compiler, base, prelude)?;
            let callee = callee_name(compiler, expr, field)?;
            Ok(format!("{}({})", callee, base_code))
        }
        ExprKind::Index { base, index } => {
            let base_code = gen_expression(compiler, base, prelude)?;
            let index_code = gen_expression(compiler, index, prelude)?;
            Ok(format!("access_array({}, {})", base_code, index_code))
        }
        ExprKind::List(elements) => {
            let mut codes = vec![];
            for element in elements {
                codes.push(gen_expression(compiler, element, prelude)?);
            }

            let name = hoist_list(compiler, expr, prelude)?;
            for code in codes {
                prelude.push(format!("{}.push_back({});", name, code));
            }

            Ok(name)
        }
        ExprKind::EmptyList => hoist_list(compiler, expr, prelude),
    }
}

fn hoist_list(compiler: &mut Compiler, expr: &Expr, prelude: &mut Vec<String>) -> Result<String, Error> {
    let ty = compiler.type_code(&compiler.type_of(expr.id), expr.line)?;
    let name = compiler.next_temp("_lit");
    prelude.push(format!("{} {};", ty, name));
    Ok(name)
}

/// `func_len` for builtins, the mangled user name otherwise.
fn callee_name(compiler: &Compiler, expr: &Expr, name: &str) -> Result<String, Error> {
    match compiler.analysis.calls.get(&expr.id) {
        Some(header) if header.is_builtin => Ok(builtin_name(name)),
        Some(header) => Ok(function_name(name, &header.params)),
        None => Err(Error::new(
            ErrorImpl::MissingCallResolution {
                function: String::from(name),
            },
            compiler.position(expr.line),
        )),
    }
}

fn gen_literal(literal: &Literal) -> String {
    match literal {
        Literal::Number(value) => format_number(*value),
        Literal::Boolean(value) => value.to_string(),
        Literal::String(value) => escape_string(value),
        Literal::Cell(cell) => format!("get_cell(\"{}\")", cell),
        Literal::Row(row) => format!("get_row({})", row),
        Literal::Rank(rank) => format!("get_rank({})", rank),
        Literal::File(file) => format!("get_file({})", file),
        Literal::CellRange(from, to) => format!("get_rang_cell(\"{}\", \"{}\")", from, to),
        Literal::RowRange(from, to) => format!("get_rang_row({}, {})", from, to),
        Literal::RankRange(from, to) => format!("get_rang_rank({}, {})", from, to),
        Literal::FileRange(from, to) => format!("get_rang_file({}, {})", from, to),
        Literal::Board(collection) => String::from(board_collection(*collection)),
        Literal::Pieces(collection) => format!("{}()", collection),
        Literal::Player(side) => String::from(player(*side)),
    }
}

/// Whether evaluating `expr` calls a function defined in the program.
pub fn calls_user_function(compiler: &Compiler, expr: &Expr) -> bool {
    let user_call = || {
        compiler
            .analysis
            .calls
            .get(&expr.id)
            .map(|header| !header.is_builtin)
            .unwrap_or(false)
    };

    match &expr.kind {
        ExprKind::Literal(_) | ExprKind::Identifier(_) | ExprKind::EmptyList => false,
        ExprKind::Binary { left, right, .. } => {
            calls_user_function(compiler, left) || calls_user_function(compiler, right)
        }
        ExprKind::Unary { operand, .. } => calls_user_function(compiler, operand),
        ExprKind::Call { arguments, .. } => {
            user_call() || arguments.iter().any(|argument| calls_user_function(compiler, argument))
        }
        ExprKind::FieldAccess { base, .. } => user_call() || calls_user_function(compiler, base),
        ExprKind::Index { base, index } => {
            calls_user_function(compiler, base) || calls_user_function(compiler, index)
        }
        ExprKind::List(elements) => elements
            .iter()
            .any(|element| calls_user_function(compiler, element)),
    }
}

/// Whether `expr` reads any of the variables in `names`.
pub fn reads_any(expr: &Expr, names: &HashSet<String>) -> bool {
    match &expr.kind {
        ExprKind::Identifier(name) => names.contains(name),
        ExprKind::Literal(_) | ExprKind::EmptyList => false,
        ExprKind::Binary { left, right, .. } => reads_any(left, names) || reads_any(right, names),
        ExprKind::Unary { operand, .. } => reads_any(operand, names),
        ExprKind::Call { arguments, .. } => arguments.iter().any(|argument| reads_any(argument, names)),
        ExprKind::FieldAccess { base, .. } => reads_any(base, names),
        ExprKind::Index { base, index } => reads_any(base, names) || reads_any(index, names),
        ExprKind::List(elements) => elements.iter().any(|element| reads_any(element, names)),
    }
}
