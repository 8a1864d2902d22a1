//! Integration tests for end-to-end compilation.
//!
//! These tests verify that the complete compilation pipeline works correctly
//! from Chespel source through parsing, checking, inference and C++
//! generation, and that output files are only written for clean programs.

use std::{fs, path::Path, process::Command};

use chespel::{
    compile_source, errors::errors::ErrorImpl, parse_source, write_output, Stage,
};
use tempfile::tempdir;

const EVALUATION: &str = r#"
config {
    centipawn_value := 100;
}

num PAWN_BONUS := 5;
cell[] CENTER := [$d4, $d5, $e4, $e5];

num centered(piece p) {
    if (p.cell in CENTER) {
        return 1;
    }
    return 0;
}

void bump(&num total, num amount) {
    total := total + amount;
}

rule CenterControl (opening, midgame, sym) {
    num total := 0;
    forall (p in spawns) {
        bump(total, centered(p) * PAWN_BONUS);
    }
    score total;
}

rule Material (sym) {
    num total := 0;
    forall (p in spieces) {
        total := total + p.value;
    }
    score total;
}

rule KingSafety (endgame) doif self.castled {
    score 10;
}
"#;

fn errors(source: &str) -> Vec<ErrorImpl> {
    let compilation = compile_source(source, "eval.chp").unwrap();
    compilation
        .diagnostics()
        .errors()
        .iter()
        .map(|diagnostic| diagnostic.error.get_internal_error().clone())
        .collect()
}

/// Body lines of the C++ function opened by `header`.
fn body(output: &str, header: &str) -> Vec<String> {
    let opening = format!("{} {{", header);
    output
        .lines()
        .skip_while(|line| *line != opening)
        .skip(1)
        .take_while(|line| *line != "}")
        .map(|line| line.trim().to_string())
        .collect()
}

#[test]
fn test_compile_evaluation() {
    let compilation = compile_source(EVALUATION, "eval.chp").unwrap();
    assert_eq!(
        compilation.stage(),
        Stage::Generated,
        "{}",
        compilation.diagnostics().render_errors()
    );
    assert!(!compilation.diagnostics().has_warnings());

    let output = compilation.output().unwrap();
    assert!(output.contains("const int centipawn_value = 100;"));
    assert!(output.contains("int var_PAWN_BONUS = 5;"));
    assert!(output.contains("vector<int> var_CENTER;"));
    assert!(output.contains("int fn_centered__piece(int var_p);"));
    assert!(output.contains("void fn_bump__num_num(int& var_total, int var_amount);"));
    assert!(output.contains("if (in_expr(func_cell(var_p), var_CENTER)) {"));
    assert!(output.contains("fn_bump__num_num(var_total, (fn_centered__piece(var_p) * var_PAWN_BONUS));"));
    assert!(output.contains("if (!(func_castled(self()))) return 0;"));

    assert_eq!(
        body(output, "long int opn_eval()"),
        vec![
            "long int score = 0;",
            "score += rule_CenterControl();",
            "score += rule_Material();",
            "reset();",
            "invert_players();",
            "score -= rule_CenterControl();",
            "score -= rule_Material();",
            "return score;",
        ]
    );
    assert_eq!(
        body(output, "long int end_eval()"),
        vec![
            "long int score = 0;",
            "score += rule_Material();",
            "score += rule_KingSafety();",
            "reset();",
            "invert_players();",
            "score -= rule_Material();",
            "return score;",
        ]
    );
}

#[test]
fn test_rule_aggregation() {
    let compilation = compile_source("rule R (midgame) { score 5; }\nrule S (sym) { score 10; }", "eval.chp").unwrap();
    let output = compilation.output().unwrap();

    let mid = body(output, "long int mid_eval()");
    assert!(mid.contains(&"score += rule_R();".to_string()));

    for phase in ["long int opn_eval()", "long int mid_eval()", "long int end_eval()"] {
        let lines = body(output, phase);
        assert!(lines.contains(&"score += rule_S();".to_string()));

        let inversion = lines.iter().position(|line| line == "invert_players();").unwrap();
        let subtraction = lines.iter().position(|line| line == "score -= rule_S();").unwrap();
        assert!(inversion < subtraction);
    }

    assert!(!body(output, "long int opn_eval()").contains(&"score += rule_R();".to_string()));
    assert!(!body(output, "long int end_eval()").contains(&"score += rule_R();".to_string()));
}

#[test]
fn test_empty_array_inference() {
    let source = "rule R { num[] a := []; a := [1, 2, 3]; forall (y in a) { score y; } }";
    let compilation = compile_source(source, "eval.chp").unwrap();

    assert_eq!(compilation.stage(), Stage::Generated);
    assert!(compilation.output().unwrap().contains("vector<int> _lit_0;\n    vector<int> var_a = _lit_0;"));
}

#[test]
fn test_type_error_stops_compilation() {
    let compilation = compile_source("bool f() { return 3; }", "eval.chp").unwrap();

    assert_eq!(compilation.stage(), Stage::Failed);
    assert!(compilation.output().is_none());

    let rendered = compilation.diagnostics().render_errors();
    assert!(rendered.contains("BOOL"));
    assert!(rendered.contains("NUM"));
    assert!(rendered.ends_with("1 errors detected. The program has not been compiled.\n"));
}

#[test]
fn test_missing_score_is_fatal() {
    assert_eq!(
        errors("rule R { num a := 1; a := a + 1; }"),
        vec![ErrorImpl::NoScoreInRule { rule: "R".to_string() }]
    );
}

#[test]
fn test_unresolved_array_is_fatal() {
    let compilation = compile_source("rule R { score len([]); }", "eval.chp").unwrap();

    assert_eq!(compilation.stage(), Stage::Failed);
    assert_eq!(
        compilation.diagnostics().errors()[0].error.get_internal_error(),
        &ErrorImpl::UnresolvedEmptyArray
    );
}

#[test]
fn test_warnings_do_not_block_generation() {
    let compilation = compile_source("num unused := 1;\nrule R { score 1; }", "eval.chp").unwrap();

    assert_eq!(compilation.stage(), Stage::Generated);
    assert_eq!(compilation.diagnostics().warning_count(), 1);
}

#[test]
fn test_syntax_error_is_returned() {
    let error = parse_source("rule R { score 1 }", "eval.chp").unwrap_err();
    assert_eq!(error.get_position().0, 1);
}

#[test]
fn test_analysis_is_repeatable() {
    let source = "num g := 1;\nvoid f(num a) { num b; }\nrule R { num c; score missing; }";

    let first = compile_source(source, "eval.chp").unwrap();
    let second = compile_source(source, "eval.chp").unwrap();

    assert_eq!(
        first.diagnostics().render_errors(),
        second.diagnostics().render_errors()
    );
    assert_eq!(
        first.diagnostics().render_warnings(),
        second.diagnostics().render_warnings()
    );
}

#[test]
fn test_write_output_replaces_file() {
    let directory = tempdir().unwrap();
    let path = directory.path().join("generated_eval.cpp");

    fs::write(&path, "old").unwrap();
    write_output(&path, "new").unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    // Only the output itself is left behind
    assert_eq!(fs::read_dir(directory.path()).unwrap().count(), 1);
}

#[test]
fn test_write_output_failure_leaves_nothing() {
    let directory = tempdir().unwrap();
    let path = directory.path().join("missing").join("generated_eval.cpp");

    assert!(write_output(&path, "text").is_err());
    assert!(!path.exists());
}

fn chespel(directory: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_chespel"))
        .current_dir(directory)
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn test_cli_writes_output_on_success() {
    let directory = tempdir().unwrap();
    fs::write(directory.path().join("eval.chp"), EVALUATION).unwrap();

    let result = chespel(directory.path(), &["-o", "engine", "eval.chp"]);

    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));
    let output = fs::read_to_string(directory.path().join("engine.cpp")).unwrap();
    assert!(output.starts_with("#include \"generated_eval.h\"\n"));
}

#[test]
fn test_cli_writes_nothing_on_failure() {
    let directory = tempdir().unwrap();
    fs::write(directory.path().join("eval.chp"), "bool f() { return 3; }").unwrap();

    let result = chespel(directory.path(), &["eval.chp"]);

    assert_eq!(result.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&result.stderr).contains("errors detected"));
    assert!(!directory.path().join("generated_eval.cpp").exists());
}

#[test]
fn test_cli_check_only_and_tree_dump() {
    let directory = tempdir().unwrap();
    fs::write(directory.path().join("eval.chp"), "rule R { score 1; }").unwrap();

    let result = chespel(directory.path(), &["-nocomp", "-ast", "tree.txt", "eval.chp"]);

    assert!(result.status.success());
    assert!(!directory.path().join("generated_eval.cpp").exists());
    let tree = fs::read_to_string(directory.path().join("tree.txt")).unwrap();
    assert!(tree.contains("Rule("));
}

#[test]
fn test_cli_syntax_error() {
    let directory = tempdir().unwrap();
    fs::write(directory.path().join("eval.chp"), "rule R {\n  score 1\n}").unwrap();

    let result = chespel(directory.path(), &["eval.chp"]);

    assert_eq!(result.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("-> eval.chp"));
    assert!(stderr.contains("3 | }"));
}
