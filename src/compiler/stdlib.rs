//! Names and spellings of the C++ runtime the generated file links against.
//!
//! The engine ships `predefined_functions.h` / `.tcc`, which provide the
//! `func_*` builtins, the literal constructors (`get_cell`, `get_rang_row`,
//! `spawns`, ...) and the helpers the lowerings rely on (`in_expr`,
//! `array_equality`, `access_array`, `concat`, `reset`, `invert_players`).

use crate::{
    ast::{
        ast::{BoardCollection, PlayerLiteral},
        types::Type,
    },
    errors::errors::ErrorImpl,
};

use super::compiler::Compiler;

pub const INCLUDES: [&str; 3] = [
    "#include \"generated_eval.h\"",
    "#include \"predefined_functions.h\"",
    "#include \"predefined_functions.tcc\"",
];

pub const NAMESPACE: &str = "using namespace std;";

/// Converts a resolved type to its C++ spelling.
///
/// # Errors
///
/// Returns `UnresolvedType` for the inference sentinels, which must never
/// reach this point.
pub fn type_code(ty: &Type) -> Result<String, ErrorImpl> {
    match ty {
        Type::Array(element) => {
            let element = type_code(element)?;
            // `> >`: nested templates must not close with `>>`
            let spacing = if element.ends_with('>') { " " } else { "" };
            Ok(format!("vector<{}{}>", element, spacing))
        }
        Type::Bool => Ok(String::from("bool")),
        Type::String => Ok(String::from("string")),
        Type::Void => Ok(String::from("void")),
        Type::Generic | Type::GenericArray | Type::EmptyArray => Err(ErrorImpl::UnresolvedType {
            type_: ty.to_string(),
        }),
        _ => Ok(String::from("int")),
    }
}

/// Initializer for a declaration without a value. Vectors are
/// default-constructed, so they get none.
pub fn default_value(ty: &Type) -> Option<&'static str> {
    match ty {
        Type::Array(_) => None,
        Type::Bool => Some("false"),
        Type::String => Some("\"\""),
        _ => Some("0"),
    }
}

fn type_mangle(ty: &Type) -> String {
    match ty {
        Type::Array(element) => format!("vec_{}", type_mangle(element)),
        Type::Void => String::from("void"),
        Type::Bool => String::from("bool"),
        Type::Num => String::from("num"),
        Type::String => String::from("string"),
        Type::Piece => String::from("piece"),
        Type::Cell => String::from("cell"),
        Type::Row => String::from("row"),
        Type::Rank => String::from("rank"),
        Type::File => String::from("file"),
        Type::Player => String::from("player"),
        Type::GenericArray | Type::EmptyArray | Type::Generic => String::from("generic"),
    }
}

/// `fn_f__num_cell` for `f(num, cell)`; `fn_f` without parameters.
///
/// Chespel overloads on types that all become `int` in C++, so the
/// parameter list is folded into the name.
pub fn function_name(name: &str, params: &[Type]) -> String {
    if params.is_empty() {
        return format!("fn_{}", name);
    }

    let mangled: Vec<String> = params.iter().map(type_mangle).collect();
    format!("fn_{}__{}", name, mangled.join("_"))
}

/// Chespel variables, parameters and globals all live under `var_`, so they
/// never clash with the runtime, the generated helpers or C++ keywords.
pub fn variable_name(name: &str) -> String {
    format!("var_{}", name)
}

pub fn builtin_name(name: &str) -> String {
    format!("func_{}", name)
}

pub fn rule_name(name: &str) -> String {
    format!("rule_{}", name)
}

/// Integral values print without a decimal point.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

pub fn escape_string(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    escaped.push('"');
    for ch in value.chars() {
        match ch {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            _ => escaped.push(ch),
        }
    }
    escaped.push('"');
    escaped
}

pub fn board_collection(collection: BoardCollection) -> &'static str {
    match collection {
        BoardCollection::Cells => "cells()",
        BoardCollection::Rows => "rows()",
        BoardCollection::Ranks => "ranks()",
        BoardCollection::Files => "files()",
    }
}

pub fn player(player: PlayerLiteral) -> &'static str {
    match player {
        PlayerLiteral::SelfPlayer => "self()",
        PlayerLiteral::Rival => "rival()",
    }
}

/// Emits the include block that opens every generated file.
pub fn gen_includes(compiler: &mut Compiler) {
    for include in INCLUDES {
        compiler.emit(include);
    }
    compiler.emit(NAMESPACE);
}
