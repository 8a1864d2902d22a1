//! Unit tests for semantic analysis and array type inference.

use std::{collections::BTreeSet, rc::Rc};

use super::{
    builtins::{parse_builtins, predefined_functions},
    config::ConfigOptions,
    inference::infer,
    symbol_table::{Header, Phase, RuleOptions, SymbolTable},
    type_checker::{type_check, Analysis},
};
use crate::{
    ast::{
        ast::{ConfigEntry, ConfigValue, ExprKind, Program, Stmt},
        types::Type,
    },
    errors::{diagnostics::Diagnostics, errors::ErrorImpl},
    lexer::lexer::tokenize,
    parser::parser::parse,
};

fn parse_program(source: &str) -> Program {
    let tokens = tokenize(source.to_string(), Some("test.chp".to_string())).unwrap();
    let (_, result) = parse(tokens, Rc::new("test.chp".to_string()));
    result.unwrap()
}

fn analyze(source: &str) -> (Program, Analysis, Diagnostics) {
    let program = parse_program(source);
    let mut diagnostics = Diagnostics::new();
    let analysis = type_check(&program, &mut diagnostics);
    (program, analysis, diagnostics)
}

fn errors(diagnostics: &Diagnostics) -> Vec<ErrorImpl> {
    diagnostics
        .errors()
        .iter()
        .map(|diagnostic| diagnostic.error.get_internal_error().clone())
        .collect()
}

fn warnings(diagnostics: &Diagnostics) -> Vec<ErrorImpl> {
    diagnostics
        .warnings()
        .iter()
        .map(|diagnostic| diagnostic.error.get_internal_error().clone())
        .collect()
}

fn table() -> SymbolTable {
    SymbolTable::new(Rc::new("test.chp".to_string()))
}

#[test]
fn test_scope_lookup_marks_used() {
    let mut symbols = table();
    symbols.push_scope();
    symbols.declare_variable("a", Type::Num, 1).unwrap();
    symbols.declare_variable("b", Type::Bool, 2).unwrap();

    assert_eq!(symbols.lookup_variable("a"), Some(Type::Num));
    assert_eq!(symbols.lookup_variable("missing"), None);

    let unused = symbols.pop_scope().unwrap();
    assert_eq!(unused, vec![("b".to_string(), 2)]);
}

#[test]
fn test_scope_redeclaration_and_shadowing() {
    let mut symbols = table();
    symbols.push_scope();
    symbols.declare_variable("a", Type::Num, 1).unwrap();

    let error = symbols.declare_variable("a", Type::Bool, 2).unwrap_err();
    assert!(matches!(
        error.get_internal_error(),
        ErrorImpl::VariableAlreadyDeclared { .. }
    ));

    symbols.push_scope();
    symbols.declare_variable("a", Type::Cell, 3).unwrap();
    assert_eq!(symbols.scope_depth(), 2);
    assert_eq!(symbols.lookup_variable("a"), Some(Type::Cell));
    symbols.pop_scope().unwrap();

    assert_eq!(symbols.lookup_variable("a"), Some(Type::Num));
}

#[test]
fn test_unused_sorted_by_line_then_name() {
    let mut symbols = table();
    symbols.push_scope();
    symbols.declare_variable("z", Type::Num, 1).unwrap();
    symbols.declare_variable("b", Type::Num, 2).unwrap();
    symbols.declare_variable("a", Type::Num, 2).unwrap();

    let unused = symbols.pop_scope().unwrap();
    assert_eq!(
        unused,
        vec![
            ("z".to_string(), 1),
            ("a".to_string(), 2),
            ("b".to_string(), 2),
        ]
    );
}

#[test]
fn test_pop_without_scope_is_internal_error() {
    let mut symbols = table();
    let error = symbols.pop_scope().unwrap_err();
    assert_eq!(error.get_internal_error(), &ErrorImpl::NoActiveScope);
}

#[test]
fn test_globals_visible_after_scopes() {
    let mut symbols = table();
    symbols.define_global("g", Type::Num, 1).unwrap();
    symbols.push_scope();

    assert_eq!(symbols.lookup_variable("g"), Some(Type::Num));
    assert!(symbols.get_global("g").unwrap().used);
    assert!(symbols.unused_globals().is_empty());
    assert!(symbols.define_global("g", Type::Num, 2).is_err());
}

#[test]
fn test_overload_resolution() {
    let mut symbols = table();
    symbols
        .define_function("f", Type::Bool, Header::new(vec![Type::Num], vec![false]), 1)
        .unwrap();
    symbols
        .define_function("f", Type::Bool, Header::new(vec![Type::String], vec![false]), 2)
        .unwrap();
    assert_eq!(symbols.get_function("f").unwrap().headers.len(), 2);

    let resolved = symbols.resolve_call("f", &[Type::Num], 3).unwrap();
    assert_eq!(resolved.return_type, Type::Bool);
    assert_eq!(resolved.header.params, vec![Type::Num]);

    let error = symbols.resolve_call("f", &[Type::Generic], 4).unwrap_err();
    match error.get_internal_error() {
        ErrorImpl::AmbiguousCall { candidates, .. } => {
            assert!(candidates.contains("f(NUM)"));
            assert!(candidates.contains("f(STRING)"));
        }
        other => panic!("expected an ambiguous call, got {:?}", other),
    }
}

#[test]
fn test_overload_resolution_failures() {
    let mut symbols = table();
    symbols
        .define_function("f", Type::Bool, Header::new(vec![Type::Num], vec![false]), 1)
        .unwrap();

    let error = symbols.resolve_call("g", &[], 2).unwrap_err();
    assert!(matches!(error.get_internal_error(), ErrorImpl::FunctionNotDeclared { .. }));

    let error = symbols.resolve_call("f", &[Type::Cell], 2).unwrap_err();
    match error.get_internal_error() {
        ErrorImpl::NoMatchingHeader { call, candidates, .. } => {
            assert_eq!(call, "f(CELL)");
            assert_eq!(candidates, "f(NUM)");
        }
        other => panic!("expected no matching header, got {:?}", other),
    }
}

#[test]
fn test_header_conflicts() {
    let mut symbols = table();
    symbols
        .define_function("f", Type::Num, Header::new(vec![Type::Num], vec![false]), 1)
        .unwrap();

    // Reference flags alone do not make a new overload
    let error = symbols
        .define_function("f", Type::Num, Header::new(vec![Type::Num], vec![true]), 2)
        .unwrap_err();
    assert!(matches!(error.get_internal_error(), ErrorImpl::FunctionAlreadyDeclared { .. }));

    let error = symbols
        .define_function("f", Type::Bool, Header::new(vec![Type::Cell], vec![false]), 3)
        .unwrap_err();
    assert!(matches!(error.get_internal_error(), ErrorImpl::ReturnTypeConflict { .. }));
}

#[test]
fn test_rule_options_default_to_every_phase() {
    let options = RuleOptions::new(BTreeSet::new(), true);
    assert!(Phase::ALL.iter().all(|phase| options.runs_in(*phase)));
    assert!(options.symmetric);

    let options = RuleOptions::new([Phase::Midgame].into_iter().collect(), false);
    assert!(options.runs_in(Phase::Midgame));
    assert!(!options.runs_in(Phase::Opening));
}

#[test]
fn test_config_options() {
    let mut config = ConfigOptions::new();
    let names: Vec<&str> = config.options().map(|option| option.name).collect();
    assert_eq!(names, vec!["centipawn_value", "debug", "default_PStables"]);

    config
        .set(&ConfigEntry {
            name: "centipawn_value".to_string(),
            value: ConfigValue::Num(3.0),
            line: 1,
        })
        .unwrap();
    assert_eq!(config.get("centipawn_value").unwrap().value, ConfigValue::Num(3.0));

    let error = config
        .set(&ConfigEntry {
            name: "debug".to_string(),
            value: ConfigValue::Num(1.0),
            line: 2,
        })
        .unwrap_err();
    assert!(matches!(error, ErrorImpl::ConfigOptionTypeError { .. }));

    let error = config
        .set(&ConfigEntry {
            name: "verbose".to_string(),
            value: ConfigValue::Bool(true),
            line: 3,
        })
        .unwrap_err();
    assert_eq!(error.to_string(), "Undefined config option: 'verbose'");
}

#[test]
fn test_predefined_functions_resource() {
    let builtins = predefined_functions().unwrap();
    assert_eq!(builtins.len(), 15);

    let len = builtins.iter().find(|builtin| builtin.name == "len").unwrap();
    assert_eq!(len.return_type, Type::Num);
    assert_eq!(len.params, vec![Type::GenericArray]);

    let covered = builtins.iter().find(|builtin| builtin.name == "coveredBy").unwrap();
    assert_eq!(covered.return_type, Type::array_of(Type::Piece));
}

#[test]
fn test_malformed_builtin() {
    let error = parse_builtins("# comment\n\nnum value(piece)\nnum broken piece\n").unwrap_err();
    assert_eq!(
        error,
        ErrorImpl::MalformedBuiltin {
            line: 4,
            text: "num broken piece".to_string(),
        }
    );
}

#[test]
fn test_global_initializer_type() {
    let (program, analysis, diagnostics) = analyze("num x := 3 + 4;");

    assert!(!diagnostics.has_errors());
    let global = program.globals().next().unwrap();
    assert_eq!(analysis.types.type_of(global.value.id), Type::Num);
    assert_eq!(
        warnings(&diagnostics),
        vec![ErrorImpl::UnusedGlobal { global: "x".to_string() }]
    );

    let (_, _, diagnostics) = analyze("num x := 3 + 4;\nrule R { score x; }");
    assert!(!diagnostics.has_errors());
    assert!(!diagnostics.has_warnings());
}

#[test]
fn test_global_type_mismatch() {
    let (_, _, diagnostics) = analyze("bool x := 3;\nrule R { if (x) { score 1; } }");
    assert_eq!(
        errors(&diagnostics),
        vec![ErrorImpl::GlobalTypeMismatch {
            global: "x".to_string(),
            declared: "BOOL".to_string(),
            received: "NUM".to_string(),
        }]
    );
}

#[test]
fn test_global_initializer_can_call_functions() {
    let source = "num total := twice(2);\nnum twice(num n) { return n * 2; }\nrule R { score total; }";
    let (_, _, diagnostics) = analyze(source);
    assert!(!diagnostics.has_errors());
}

#[test]
fn test_void_function_without_reference() {
    let (_, _, diagnostics) = analyze("void bad(num x) { x := x + 1; }");
    assert!(!diagnostics.has_errors());
    assert_eq!(
        warnings(&diagnostics),
        vec![ErrorImpl::VoidWithoutReference { function: "bad".to_string() }]
    );

    let (_, _, diagnostics) = analyze("void ok(&num x) { x := x + 1; }");
    assert!(!diagnostics.has_errors());
    assert!(!diagnostics.has_warnings());
}

#[test]
fn test_return_type_mismatch() {
    let (_, _, diagnostics) = analyze("bool f() { return 3; }");
    let found = errors(&diagnostics);

    assert_eq!(found.len(), 1);
    let message = diagnostics.errors()[0].error.to_string();
    assert!(message.contains("BOOL"));
    assert!(message.contains("NUM"));
    assert!(matches!(found[0], ErrorImpl::ReturnTypeMismatch { .. }));
}

#[test]
fn test_missing_return_and_unreachable() {
    let source = r#"
        num f(num a) {
            if (a > 0) { return 1; }
        }
        num g(num a) {
            if (a > 0) { return 1; } else { return 2; }
            a := 3;
        }
        num h(num a) {
            return a;
            a := 1;
        }
    "#;
    let (_, _, diagnostics) = analyze(source);

    assert!(!diagnostics.has_errors());
    assert_eq!(
        warnings(&diagnostics),
        vec![
            ErrorImpl::MissingReturn,
            ErrorImpl::UnreachableAfterIfElse,
            ErrorImpl::UnreachableAfterReturn,
        ]
    );
}

#[test]
fn test_score_rules() {
    let (_, _, diagnostics) = analyze("rule R { num a := 1; }");
    assert!(errors(&diagnostics).contains(&ErrorImpl::NoScoreInRule { rule: "R".to_string() }));

    let (_, _, diagnostics) = analyze("num f() { score 1; return 1; }");
    assert_eq!(errors(&diagnostics), vec![ErrorImpl::ScoreInFunction]);

    let (_, _, diagnostics) = analyze("rule R { score true; }");
    assert_eq!(
        errors(&diagnostics),
        vec![ErrorImpl::ScoreNotNum { received: "BOOL".to_string() }]
    );
}

#[test]
fn test_rule_options_and_guard() {
    let source = "rule R (midgame, midgame, fast) doif (3) { score 1; }\nrule R { score 2; }";
    let (_, _, diagnostics) = analyze(source);
    let found = errors(&diagnostics);

    assert!(found.contains(&ErrorImpl::RepeatedRuleOption { option: "midgame".to_string() }));
    assert!(found.contains(&ErrorImpl::UnknownRuleOption { option: "fast".to_string() }));
    assert!(found.contains(&ErrorImpl::GuardNotBool {
        rule: "R".to_string(),
        received: "NUM".to_string(),
    }));
    assert!(found.contains(&ErrorImpl::RuleAlreadyDeclared { rule: "R".to_string() }));
}

#[test]
fn test_rule_registration() {
    let (_, analysis, diagnostics) = analyze("rule R (sym, endgame) { score 1; }");
    assert!(!diagnostics.has_errors());

    let rule = analysis.symbols.get_rule("R").unwrap();
    assert!(rule.options.symmetric);
    assert_eq!(
        rule.options.phases,
        [Phase::Endgame].into_iter().collect::<BTreeSet<Phase>>()
    );
}

#[test]
fn test_reference_argument_must_be_variable() {
    let source = "void inc(&num x) { x := x + 1; }\nrule R { num a := 0; inc(a); inc(a + 1); score a; }";
    let (_, _, diagnostics) = analyze(source);

    assert_eq!(
        errors(&diagnostics),
        vec![ErrorImpl::ReferenceArgument {
            function: "inc".to_string(),
            position: 1,
        }]
    );
}

#[test]
fn test_field_access_resolves_builtins() {
    let source = "rule R { forall (p in spawns) { if (p.row == $2) { score p.value; } } }";
    let (program, analysis, diagnostics) = analyze(source);

    assert!(!diagnostics.has_errors());
    let rule = program.rules().next().unwrap();
    match &rule.body[0] {
        Stmt::Forall { source, .. } => {
            assert_eq!(analysis.types.type_of(source.id), Type::array_of(Type::Piece));
        }
        other => panic!("expected a forall, got {:?}", other),
    }
    assert!(analysis.calls.values().all(|header| header.is_builtin));
}

#[test]
fn test_undeclared_names() {
    let (_, _, diagnostics) = analyze("rule R { score missing + nothing(1); }");
    let found = errors(&diagnostics);

    assert!(found.contains(&ErrorImpl::VariableNotDeclared { variable: "missing".to_string() }));
    assert!(found.contains(&ErrorImpl::FunctionNotDeclared { function: "nothing".to_string() }));
}

#[test]
fn test_generic_stops_cascading_errors() {
    // The undeclared variable is reported once; its uses type as GENERIC.
    let (_, _, diagnostics) = analyze("rule R { num a := missing * 2 + 1; score a; }");
    assert_eq!(
        errors(&diagnostics),
        vec![ErrorImpl::VariableNotDeclared { variable: "missing".to_string() }]
    );
}

#[test]
fn test_list_literals() {
    let (_, _, diagnostics) = analyze("rule R { num[] a := [1, true]; score len(a); }");
    assert_eq!(
        errors(&diagnostics),
        vec![ErrorImpl::ListElementMismatch {
            expected: "NUM".to_string(),
            received: "BOOL".to_string(),
        }]
    );

    let (_, _, diagnostics) = analyze("rule R { num[][] a := [[], [1]]; score len(a); }");
    assert!(!diagnostics.has_errors());
}

#[test]
fn test_unused_variables_in_nested_scopes() {
    let source = "rule R {\n  num a := 1;\n  if (true) { num b := 2; }\n  score 1;\n}";
    let (_, _, diagnostics) = analyze(source);

    assert_eq!(
        warnings(&diagnostics),
        vec![
            ErrorImpl::UnusedVariable { variable: "a".to_string() },
            ErrorImpl::UnusedVariable { variable: "b".to_string() },
        ]
    );
}

#[test]
fn test_config_errors_are_reported() {
    let (_, analysis, diagnostics) =
        analyze("config { centipawn_value := 2; debug := 4; speed := 1; }\nrule R { score 1; }");

    assert_eq!(diagnostics.error_count(), 2);
    assert_eq!(
        analysis.config.get("centipawn_value").unwrap().value,
        ConfigValue::Num(2.0)
    );

    // The option is an `int` constant, so fractions are rejected
    let (_, analysis, diagnostics) =
        analyze("config { centipawn_value := 1.5; }\nrule R { score 1; }");
    assert_eq!(
        errors(&diagnostics),
        vec![ErrorImpl::ConfigOptionTypeError {
            option: "centipawn_value".to_string(),
            expected: "NUM (integer)".to_string(),
        }]
    );
    assert_eq!(
        analysis.config.get("centipawn_value").unwrap().value,
        ConfigValue::Num(1.0)
    );
}

#[test]
fn test_analysis_is_deterministic() {
    let source = "num g := 1;\nnum h := 2;\nvoid f(num a) { num b; num c; }\nrule R { num d; score missing; }";

    let render = || {
        let (_, _, diagnostics) = analyze(source);
        (diagnostics.render_errors(), diagnostics.render_warnings())
    };

    assert_eq!(render(), render());
}

#[test]
fn test_place_in_rendered_diagnostics() {
    let (_, _, diagnostics) = analyze("bool f() {\n  return 3;\n}");
    let rendered = diagnostics.errors()[0].render();

    assert!(rendered.starts_with("Error (test.chp, line 2): "));
    assert!(rendered.ends_with("\n ** in Function: f, line 1"));
}

fn infer_source(source: &str) -> (Program, Analysis, Diagnostics) {
    let (program, mut analysis, mut diagnostics) = analyze(source);
    assert!(!diagnostics.has_errors(), "{}", diagnostics.render_errors());
    infer(&program, &mut analysis, &mut diagnostics);
    (program, analysis, diagnostics)
}

#[test]
fn test_infer_empty_array_from_declaration() {
    let source = "rule R { num[] a := []; a := [1, 2, 3]; forall (y in a) { score y; } }";
    let (program, analysis, diagnostics) = infer_source(source);

    assert!(!diagnostics.has_errors());
    let rule = program.rules().next().unwrap();
    match &rule.body[0] {
        Stmt::VarDecl { declarators, .. } => {
            let empty = declarators[0].value.as_ref().unwrap();
            assert_eq!(analysis.types.type_of(empty.id), Type::array_of(Type::Num));
        }
        other => panic!("expected a declaration, got {:?}", other),
    }
}

#[test]
fn test_infer_nested_empty_array() {
    let (program, analysis, diagnostics) = infer_source("num[][] g := [[], [1]];\nrule R { score len(g); }");

    assert!(!diagnostics.has_errors());
    let global = program.globals().next().unwrap();
    match &global.value.kind {
        ExprKind::List(elements) => {
            assert_eq!(analysis.types.type_of(elements[0].id), Type::array_of(Type::Num));
        }
        other => panic!("expected a list, got {:?}", other),
    }
}

#[test]
fn test_infer_through_concat_and_membership() {
    let source = "rule R { cell[] a := [$e4]; if ($e4 in (a ++ [])) { score 1; } }";
    let (_, _, diagnostics) = infer_source(source);

    assert!(!diagnostics.has_errors());
}

#[test]
fn test_infer_unresolved_forall_source() {
    let (_, _, diagnostics) = infer_source("rule R { forall (y in []) { } score 1; }");
    let found = errors(&diagnostics);

    assert!(found.contains(&ErrorImpl::UnresolvedForallSource { variable: "y".to_string() }));
    assert!(found.contains(&ErrorImpl::UnresolvedEmptyArray));
}

#[test]
fn test_infer_unresolved_generic_argument() {
    let (_, _, diagnostics) = infer_source("rule R { score len([]); }");
    assert_eq!(errors(&diagnostics), vec![ErrorImpl::UnresolvedEmptyArray]);
}
