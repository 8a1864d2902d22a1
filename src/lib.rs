#![allow(clippy::module_inception)]

use std::{
    fs, io,
    path::{Path, PathBuf},
    rc::Rc,
};

use tracing::{info, instrument, warn};

use crate::{
    ast::ast::Program,
    errors::{
        diagnostics::Diagnostics,
        errors::{Error, ErrorTip},
    },
    type_checker::type_checker::Analysis,
};

pub mod ast;
pub mod compiler;
pub mod errors;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod type_checker;

extern crate regex;

/// A 1-based source line and the file it belongs to.
#[derive(Debug, Clone)]
pub struct Position(pub u32, pub Rc<String>);

#[derive(Debug, Clone)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

/// Where a compilation is in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Parsed,
    Checked,
    Inferred,
    Generated,
    Failed,
}

/// One source file on its way to C++.
///
/// Each transition only runs from the stage before it; called at any other
/// time it does nothing. `Generated` and `Failed` are terminal.
#[derive(Debug)]
pub struct Compilation {
    program: Program,
    analysis: Option<Analysis>,
    diagnostics: Diagnostics,
    output: Option<String>,
    stage: Stage,
}

impl Compilation {
    pub fn new(program: Program) -> Self {
        Compilation {
            program,
            analysis: None,
            diagnostics: Diagnostics::new(),
            output: None,
            stage: Stage::Parsed,
        }
    }

    /// Semantic analysis. Any error moves the compilation to `Failed`.
    pub fn check(&mut self) -> Stage {
        if self.stage == Stage::Parsed {
            let analysis = type_checker::type_checker::type_check(&self.program, &mut self.diagnostics);
            self.analysis = Some(analysis);
            self.stage = self.next_or_failed(Stage::Checked);
        }
        self.stage
    }

    /// Array type inference, once the program checked cleanly.
    pub fn infer(&mut self) -> Stage {
        if self.stage == Stage::Checked {
            if let Some(analysis) = self.analysis.as_mut() {
                type_checker::inference::infer(&self.program, analysis, &mut self.diagnostics);
            }
            self.stage = self.next_or_failed(Stage::Inferred);
        }
        self.stage
    }

    /// Generates the C++ text. A generation error is an internal defect; it is
    /// filed with the other diagnostics.
    pub fn generate(&mut self) -> Stage {
        if self.stage != Stage::Inferred {
            return self.stage;
        }

        let result = match &self.analysis {
            Some(analysis) => compiler::compiler::compile(&self.program, analysis),
            None => return self.stage,
        };

        match result {
            Ok(output) => {
                self.output = Some(output);
                self.stage = Stage::Generated;
            }
            Err(error) => {
                self.diagnostics.add(error, None);
                self.stage = Stage::Failed;
            }
        }
        self.stage
    }

    /// Runs every remaining stage, stopping at the first failure.
    #[instrument(skip_all, fields(file = %self.program.file))]
    pub fn run(&mut self) -> Stage {
        self.check();
        self.infer();
        self.generate();

        info!(stage = ?self.stage, "Compilation finished");
        self.stage
    }

    fn next_or_failed(&self, next: Stage) -> Stage {
        if self.diagnostics.has_errors() {
            Stage::Failed
        } else {
            next
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn analysis(&self) -> Option<&Analysis> {
        self.analysis.as_ref()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }
}

/// Tokenizes and parses `source`. Syntax errors are fatal and returned
/// directly.
pub fn parse_source(source: &str, file: &str) -> Result<Compilation, Error> {
    let tokens = lexer::lexer::tokenize(String::from(source), Some(String::from(file)))?;
    let (_, program) = parser::parser::parse(tokens, Rc::new(String::from(file)));
    Ok(Compilation::new(program?))
}

/// Runs the whole pipeline over `source`.
pub fn compile_source(source: &str, file: &str) -> Result<Compilation, Error> {
    let mut compilation = parse_source(source, file)?;
    compilation.run();
    Ok(compilation)
}

/// Writes `contents` next to `path` first and renames it into place, so
/// `path` never holds a half-written file.
pub fn write_output(path: &Path, contents: &str) -> io::Result<()> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| String::from("output"));
    let temporary = path.with_file_name(format!(".{}.tmp", file_name));

    let result = fs::write(&temporary, contents).and_then(|_| fs::rename(&temporary, path));
    if let Err(error) = &result {
        warn!(path = %path.display(), %error, "Could not write output");
        let _ = fs::remove_file(&temporary);
    }
    result
}

/// The `line`th line of `source` (1-based), if there is one.
pub fn get_line(source: &str, line: u32) -> Option<&str> {
    if line == 0 {
        return None;
    }
    source.lines().nth(line as usize - 1)
}

/// Renders a fatal error together with the source line it points at.
pub fn format_error(error: &Error, source: &str, file: &Path) -> String {
    /*
        Error: UnexpectedToken (Unexpected token: `}`, did you miss a semicolon?)
        -> eval.chp
           |
        20 | num a := 3
    */

    let mut text = match error.get_tip() {
        ErrorTip::None => format!("Error: {}\n", error.get_error_name()),
        tip => format!("Error: {} ({})\n", error.get_error_name(), tip),
    };
    text.push_str(&format!("-> {}\n", file.as_os_str().to_string_lossy()));

    let line = error.get_position().0;
    match get_line(source, line) {
        Some(line_text) => {
            let line_string = line.to_string();
            let padding = line_string.len() + 2;
            text.push_str(&format!("{:>padding$}\n", "|"));
            text.push_str(&format!("{} | {}\n", line_string, line_text.trim()));
        }
        None => text.push_str(&format!("{}\n", error)),
    }

    text
}

pub fn display_error(error: &Error, source: &str, file: PathBuf) {
    eprint!("{}", format_error(error, source, &file));
}
