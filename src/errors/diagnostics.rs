//! Line-ordered collection of errors and warnings.
//!
//! The checker never stops at the first problem: every diagnostic goes into a
//! [`Diagnostics`] sink, and the pipeline decides afterwards whether to continue.

use super::errors::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub error: Error,
    /// Enclosing definition, e.g. `Function: f, line 3`.
    pub place: Option<String>,
}

impl Diagnostic {
    pub fn line(&self) -> u32 {
        self.error.get_position().0
    }

    pub fn render(&self) -> String {
        let label = match self.severity {
            Severity::Error => "Error",
            Severity::Warning => "Warning",
        };
        let position = self.error.get_position();

        let mut text = format!("{} ({}, line {}): {}.", label, position.1, position.0, self.error);
        if let Some(place) = &self.place {
            text.push_str(&format!("\n ** in {}", place));
        }
        text
    }
}

#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics::default()
    }

    /// Files the error under errors or warnings depending on its variant.
    pub fn add(&mut self, error: Error, place: Option<String>) {
        if error.is_warning() {
            self.warnings.push(Diagnostic {
                severity: Severity::Warning,
                error,
                place,
            });
        } else {
            self.errors.push(Diagnostic {
                severity: Severity::Error,
                error,
                place,
            });
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Errors sorted by line; insertion order is kept within a line.
    pub fn errors(&self) -> Vec<&Diagnostic> {
        sorted(&self.errors)
    }

    pub fn warnings(&self) -> Vec<&Diagnostic> {
        sorted(&self.warnings)
    }

    pub fn render_errors(&self) -> String {
        let mut text = String::new();
        for diagnostic in self.errors() {
            text.push_str(&diagnostic.render());
            text.push('\n');
        }
        text.push_str(&format!(
            "{} errors detected. The program has not been compiled.\n",
            self.errors.len()
        ));
        text
    }

    pub fn render_warnings(&self) -> String {
        let mut text = String::new();
        for diagnostic in self.warnings() {
            text.push_str(&diagnostic.render());
            text.push('\n');
        }
        text.push_str(&format!("{} warnings detected.\n", self.warnings.len()));
        text
    }
}

fn sorted(diagnostics: &[Diagnostic]) -> Vec<&Diagnostic> {
    let mut sorted: Vec<&Diagnostic> = diagnostics.iter().collect();
    sorted.sort_by_key(|diagnostic| diagnostic.line());
    sorted
}
