//! Main compiler module.
//!
//! This module contains the core Compiler structure and lays out the
//! generated C++ file: includes, config constants, globals, forward
//! declarations, the preamble, function and rule bodies, and the three
//! phase aggregates the engine calls.

use std::{collections::HashSet, rc::Rc};

use tracing::{debug, info, instrument};

use crate::{
    ast::{
        ast::{ConfigValue, ExprId, FunctionDef, Program, RuleDef},
        types::Type,
    },
    errors::errors::Error,
    type_checker::{symbol_table::Phase, type_checker::Analysis},
    Position,
};

use super::{
    expr::{calls_user_function, gen_expression, reads_any},
    stdlib::{format_number, function_name, gen_includes, rule_name, type_code, variable_name},
    stmt::gen_block,
};

const INDENT: &str = "    ";

/// The main compiler structure that holds the state of the compilation process.
///
/// The compiler only reads the program and the analysis results; all it owns
/// is the text being produced and the counter used to name temporaries.
pub struct Compiler<'a> {
    /// The checked and inferred program being compiled
    pub program: &'a Program,
    /// Types, resolved calls and config produced by the analysis stages
    pub analysis: &'a Analysis,
    /// Whether the body being generated belongs to a rule
    pub in_rule: bool,

    temp_counter: usize,
    indent: usize,
    lines: Vec<String>,
}

impl<'a> Compiler<'a> {
    /// Creates a new Compiler instance.
    ///
    /// # Arguments
    ///
    /// * `program` - The program to compile
    /// * `analysis` - The analysis of `program`, with every array type inferred
    pub fn new(program: &'a Program, analysis: &'a Analysis) -> Self {
        Compiler {
            program,
            analysis,
            in_rule: false,
            temp_counter: 0,
            indent: 0,
            lines: vec![],
        }
    }

    /// Appends one line at the current indentation.
    pub fn emit(&mut self, line: impl AsRef<str>) {
        let line = line.as_ref();
        if line.is_empty() {
            self.lines.push(String::new());
        } else {
            self.lines.push(format!("{}{}", INDENT.repeat(self.indent), line));
        }
    }

    pub fn emit_all(&mut self, lines: Vec<String>) {
        for line in lines {
            self.emit(line);
        }
    }

    pub fn indent(&mut self) {
        self.indent += 1;
    }

    pub fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    /// Returns a fresh `<prefix>_N` name. Numbering is shared by every
    /// prefix, so no two temporaries of a file collide.
    pub fn next_temp(&mut self, prefix: &str) -> String {
        let name = format!("{}_{}", prefix, self.temp_counter);
        self.temp_counter += 1;
        name
    }

    pub fn position(&self, line: u32) -> Position {
        Position(line, Rc::clone(&self.program.file))
    }

    pub fn type_of(&self, id: ExprId) -> Type {
        self.analysis.types.type_of(id)
    }

    /// C++ spelling of `ty`, reporting sentinels at `line`.
    pub fn type_code(&self, ty: &Type, line: u32) -> Result<String, Error> {
        type_code(ty).map_err(|error| Error::new(error, self.position(line)))
    }

    fn finish(self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }

    fn gen_configs(&mut self) {
        self.emit("// Configs");

        let config = &self.analysis.config;
        let constants: Vec<String> = config
            .options()
            .map(|option| {
                let value = match option.value {
                    ConfigValue::Num(value) => format_number(value),
                    ConfigValue::Bool(value) => value.to_string(),
                };
                format!("const {} {} = {};", option.c_type, option.name, value)
            })
            .collect();

        for constant in constants {
            self.emit(constant);
        }
    }

    /// Emits the global declarations and returns the statements that belong
    /// in `preamble()`.
    ///
    /// An initializer stays on its declaration unless it needs hoisted
    /// temporaries, calls a user function (not declared yet) or reads a
    /// global that is itself only assigned in the preamble. Static
    /// initialization runs before `preamble()`, so such a read would see the
    /// default value.
    fn gen_globals(&mut self) -> Result<Vec<String>, Error> {
        self.emit("// Globals");

        let program = self.program;
        let mut preamble = vec![];
        let mut deferred = HashSet::new();

        for global in program.globals() {
            let ty = self.type_code(&global.ty, global.line)?;
            let name = variable_name(&global.name);
            let mut prelude = vec![];
            let value = gen_expression(self, &global.value, &mut prelude)?;

            if prelude.is_empty()
                && !calls_user_function(self, &global.value)
                && !reads_any(&global.value, &deferred)
            {
                self.emit(format!("{} {} = {};", ty, name, value));
            } else {
                debug!(global = %global.name, "Deferring global initializer to the preamble");
                self.emit(format!("{} {};", ty, name));
                preamble.extend(prelude);
                preamble.push(format!("{} = {};", name, value));
                deferred.insert(global.name.clone());
            }
        }

        Ok(preamble)
    }

    fn function_signature(&self, function: &FunctionDef) -> Result<String, Error> {
        let return_type = self.type_code(&function.return_type, function.line)?;
        let param_types: Vec<Type> = function.params.iter().map(|param| param.ty.clone()).collect();

        let mut params = vec![];
        for param in &function.params {
            let ty = self.type_code(&param.ty, param.line)?;
            let reference = if param.by_reference { "&" } else { "" };
            params.push(format!("{}{} {}", ty, reference, variable_name(&param.name)));
        }

        Ok(format!(
            "{} {}({})",
            return_type,
            function_name(&function.name, &param_types),
            params.join(", ")
        ))
    }

    fn gen_headers(&mut self) -> Result<(), Error> {
        let program = self.program;

        self.emit("// Functions Headers");
        for function in program.functions() {
            let signature = self.function_signature(function)?;
            self.emit(format!("{};", signature));
        }

        self.emit("");
        self.emit("// Rules Headers");
        for rule in program.rules() {
            self.emit(format!("long int {}();", rule_name(&rule.name)));
        }

        Ok(())
    }

    fn gen_preamble(&mut self, preamble: Vec<String>) {
        self.emit("void preamble() {");
        self.indent();
        self.emit_all(preamble);
        self.dedent();
        self.emit("}");
    }

    fn gen_function(&mut self, function: &FunctionDef) -> Result<(), Error> {
        debug!(function = %function.name, "Generating function");
        let signature = self.function_signature(function)?;

        self.in_rule = false;
        self.emit(format!("{} {{", signature));
        self.indent();
        gen_block(self, &function.body)?;
        self.dedent();
        self.emit("}");

        Ok(())
    }

    fn gen_rule(&mut self, rule: &RuleDef) -> Result<(), Error> {
        debug!(rule = %rule.name, "Generating rule");

        self.in_rule = true;
        self.emit(format!("long int {}() {{", rule_name(&rule.name)));
        self.indent();

        if let Some(guard) = &rule.guard {
            let mut prelude = vec![];
            let condition = gen_expression(self, guard, &mut prelude)?;
            self.emit_all(prelude);
            self.emit(format!("if (!({})) return 0;", condition));
        }

        gen_block(self, &rule.body)?;
        self.emit("return 0;");
        self.dedent();
        self.emit("}");

        Ok(())
    }

    /// Sums every rule of `phase`, then subtracts the symmetric ones as seen
    /// from the rival's side.
    fn gen_phase(&mut self, phase: Phase) {
        let rules = self.analysis.symbols.rules();
        let active: Vec<String> = rules
            .iter()
            .filter(|rule| rule.options.runs_in(phase))
            .map(|rule| rule_name(&rule.name))
            .collect();
        let symmetric: Vec<String> = rules
            .iter()
            .filter(|rule| rule.options.runs_in(phase) && rule.options.symmetric)
            .map(|rule| rule_name(&rule.name))
            .collect();

        self.emit(format!("long int {}() {{", phase_function(phase)));
        self.indent();
        self.emit("long int score = 0;");
        for rule in &active {
            self.emit(format!("score += {}();", rule));
        }
        self.emit("reset();");

        if !symmetric.is_empty() {
            self.emit("invert_players();");
            for rule in &symmetric {
                self.emit(format!("score -= {}();", rule));
            }
        }

        self.emit("return score;");
        self.dedent();
        self.emit("}");
    }

    fn compile(&mut self) -> Result<(), Error> {
        let program = self.program;

        gen_includes(self);
        self.emit("");
        self.gen_configs();
        self.emit("");
        let preamble = self.gen_globals()?;
        self.emit("");
        self.gen_headers()?;
        self.emit("");
        self.gen_preamble(preamble);

        for function in program.functions() {
            self.emit("");
            self.gen_function(function)?;
        }
        for rule in program.rules() {
            self.emit("");
            self.gen_rule(rule)?;
        }

        for phase in Phase::ALL {
            self.emit("");
            self.gen_phase(phase);
        }

        Ok(())
    }
}

pub fn phase_function(phase: Phase) -> &'static str {
    match phase {
        Phase::Opening => "opn_eval",
        Phase::Midgame => "mid_eval",
        Phase::Endgame => "end_eval",
    }
}

/// Generates the C++ translation of `program`.
///
/// The program must have passed analysis and inference without errors; any
/// remaining sentinel type or unresolved call is reported as an internal
/// error.
///
/// # Arguments
///
/// * `program` - The program to compile
/// * `analysis` - The analysis of `program` after inference
///
/// # Returns
///
/// The complete text of the output file.
#[instrument(skip_all, fields(file = %program.file))]
pub fn compile(program: &Program, analysis: &Analysis) -> Result<String, Error> {
    let mut compiler = Compiler::new(program, analysis);
    compiler.compile()?;

    let output = compiler.finish();
    info!(bytes = output.len(), "Code generation finished");
    Ok(output)
}
