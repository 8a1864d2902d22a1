use std::{
    collections::{BTreeSet, HashMap},
    fmt::Display,
    rc::Rc,
};

use crate::{
    ast::types::Type,
    errors::errors::{Error, ErrorImpl},
    Position,
};

/// A named value: a local variable, a parameter or a global.
#[derive(Debug, Clone)]
pub struct Binding {
    pub ty: Type,
    pub line: u32,
    pub used: bool,
}

/// One lexical scope of the scope stack.
#[derive(Debug, Default)]
pub struct Environment {
    pub variable_lookup: HashMap<String, Binding>,
}

impl Environment {
    pub fn new() -> Self {
        Environment::default()
    }

    pub fn declare_variable(
        &mut self,
        variable_name: String,
        variable_type: Type,
        current_position: Position,
    ) -> Result<(), Error> {
        if self.variable_lookup.contains_key(&variable_name) {
            Err(Error::new(
                ErrorImpl::VariableAlreadyDeclared { variable: variable_name },
                current_position,
            ))
        } else {
            self.variable_lookup.insert(
                variable_name,
                Binding {
                    ty: variable_type,
                    line: current_position.0,
                    used: false,
                },
            );
            Ok(())
        }
    }

    /// Never-used bindings as `(name, line)`, ordered by line then name.
    pub fn unused(&self) -> Vec<(String, u32)> {
        unused_bindings(&self.variable_lookup)
    }
}

fn unused_bindings(lookup: &HashMap<String, Binding>) -> Vec<(String, u32)> {
    let mut unused: Vec<(String, u32)> = lookup
        .iter()
        .filter(|(_, binding)| !binding.used)
        .map(|(name, binding)| (name.clone(), binding.line))
        .collect();
    unused.sort_by(|(left_name, left_line), (right_name, right_line)| {
        left_line.cmp(right_line).then_with(|| left_name.cmp(right_name))
    });
    unused
}

/// One signature of a (possibly overloaded) function.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub params: Vec<Type>,
    pub by_reference: Vec<bool>,
    pub is_builtin: bool,
}

impl Header {
    pub fn new(params: Vec<Type>, by_reference: Vec<bool>) -> Self {
        Header {
            params,
            by_reference,
            is_builtin: false,
        }
    }

    pub fn builtin(params: Vec<Type>) -> Self {
        let by_reference = vec![false; params.len()];
        Header {
            params,
            by_reference,
            is_builtin: true,
        }
    }

    /// Two headers clash when their parameter types are identical; reference
    /// flags do not tell overloads apart.
    pub fn conflicts_with(&self, other: &Header) -> bool {
        self.params == other.params
    }

    pub fn accepts(&self, arguments: &[Type]) -> bool {
        self.params.len() == arguments.len()
            && self
                .params
                .iter()
                .zip(arguments)
                .all(|(param, argument)| param.equals(argument))
    }
}

impl Display for Header {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let params: Vec<String> = self
            .params
            .iter()
            .zip(&self.by_reference)
            .map(|(ty, by_reference)| {
                if *by_reference {
                    format!("&{}", ty)
                } else {
                    ty.to_string()
                }
            })
            .collect();
        write!(f, "({})", params.join(", "))
    }
}

#[derive(Debug, Clone)]
pub struct FunctionDefinition {
    pub name: String,
    pub return_type: Type,
    pub headers: Vec<Header>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Opening,
    Midgame,
    Endgame,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Opening, Phase::Midgame, Phase::Endgame];

    pub fn from_tag(tag: &str) -> Option<Phase> {
        match tag {
            "opening" => Some(Phase::Opening),
            "midgame" => Some(Phase::Midgame),
            "endgame" => Some(Phase::Endgame),
            _ => None,
        }
    }
}

impl Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Opening => write!(f, "opening"),
            Phase::Midgame => write!(f, "midgame"),
            Phase::Endgame => write!(f, "endgame"),
        }
    }
}

/// Normalized rule options: a rule without phase tags runs in every phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOptions {
    pub phases: BTreeSet<Phase>,
    pub symmetric: bool,
}

impl RuleOptions {
    pub fn new(phases: BTreeSet<Phase>, symmetric: bool) -> Self {
        let phases = if phases.is_empty() {
            Phase::ALL.into_iter().collect()
        } else {
            phases
        };

        RuleOptions { phases, symmetric }
    }

    pub fn runs_in(&self, phase: Phase) -> bool {
        self.phases.contains(&phase)
    }
}

#[derive(Debug, Clone)]
pub struct RuleDefinition {
    pub name: String,
    pub options: RuleOptions,
    pub line: u32,
}

/// Outcome of overload resolution for one call site.
#[derive(Debug, Clone)]
pub struct ResolvedCall {
    pub return_type: Type,
    pub header: Header,
}

/// Scope stack plus the global, function and rule registries.
#[derive(Debug)]
pub struct SymbolTable {
    file: Rc<String>,
    scopes: Vec<Environment>,
    globals: HashMap<String, Binding>,
    functions: HashMap<String, FunctionDefinition>,
    rules: Vec<RuleDefinition>,
}

impl SymbolTable {
    pub fn new(file: Rc<String>) -> Self {
        SymbolTable {
            file,
            scopes: vec![],
            globals: HashMap::new(),
            functions: HashMap::new(),
            rules: vec![],
        }
    }

    fn position(&self, line: u32) -> Position {
        Position(line, Rc::clone(&self.file))
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(Environment::new());
    }

    /// Pops the innermost scope and returns its unused bindings.
    pub fn pop_scope(&mut self) -> Result<Vec<(String, u32)>, Error> {
        match self.scopes.pop() {
            Some(environment) => Ok(environment.unused()),
            None => Err(Error::new(ErrorImpl::NoActiveScope, self.position(0))),
        }
    }

    pub fn scope_depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn declare_variable(&mut self, name: &str, ty: Type, line: u32) -> Result<(), Error> {
        let position = self.position(line);
        match self.scopes.last_mut() {
            Some(environment) => environment.declare_variable(String::from(name), ty, position),
            None => Err(Error::new(ErrorImpl::NoActiveScope, position)),
        }
    }

    /// Walks the scopes innermost first, then the globals. A hit marks the
    /// binding as used.
    pub fn lookup_variable(&mut self, name: &str) -> Option<Type> {
        for environment in self.scopes.iter_mut().rev() {
            if let Some(binding) = environment.variable_lookup.get_mut(name) {
                binding.used = true;
                return Some(binding.ty.clone());
            }
        }

        self.globals.get_mut(name).map(|binding| {
            binding.used = true;
            binding.ty.clone()
        })
    }

    pub fn define_global(&mut self, name: &str, ty: Type, line: u32) -> Result<(), Error> {
        if self.globals.contains_key(name) {
            return Err(Error::new(
                ErrorImpl::GlobalAlreadyDeclared { global: String::from(name) },
                self.position(line),
            ));
        }

        self.globals.insert(
            String::from(name),
            Binding {
                ty,
                line,
                used: false,
            },
        );
        Ok(())
    }

    pub fn get_global(&self, name: &str) -> Option<&Binding> {
        self.globals.get(name)
    }

    pub fn unused_globals(&self) -> Vec<(String, u32)> {
        unused_bindings(&self.globals)
    }

    pub fn define_function(
        &mut self,
        name: &str,
        return_type: Type,
        header: Header,
        line: u32,
    ) -> Result<(), Error> {
        let position = self.position(line);

        match self.functions.get_mut(name) {
            None => {
                self.functions.insert(
                    String::from(name),
                    FunctionDefinition {
                        name: String::from(name),
                        return_type,
                        headers: vec![header],
                    },
                );
                Ok(())
            }
            Some(function) => {
                if function.return_type != return_type {
                    return Err(Error::new(
                        ErrorImpl::ReturnTypeConflict {
                            function: String::from(name),
                            previous: function.return_type.to_string(),
                            received: return_type.to_string(),
                        },
                        position,
                    ));
                }

                if function.headers.iter().any(|existing| existing.conflicts_with(&header)) {
                    return Err(Error::new(
                        ErrorImpl::FunctionAlreadyDeclared {
                            function: String::from(name),
                            header: header.to_string(),
                        },
                        position,
                    ));
                }

                function.headers.push(header);
                Ok(())
            }
        }
    }

    pub fn get_function(&self, name: &str) -> Option<&FunctionDefinition> {
        self.functions.get(name)
    }

    /// Picks the single header of `name` whose parameters unify with
    /// `arguments`. No match and several matches are both errors.
    pub fn resolve_call(
        &self,
        name: &str,
        arguments: &[Type],
        line: u32,
    ) -> Result<ResolvedCall, Error> {
        let position = self.position(line);

        let function = match self.functions.get(name) {
            Some(function) => function,
            None => {
                return Err(Error::new(
                    ErrorImpl::FunctionNotDeclared { function: String::from(name) },
                    position,
                ))
            }
        };

        let call = format!(
            "{}({})",
            name,
            arguments
                .iter()
                .map(|argument| argument.to_string())
                .collect::<Vec<String>>()
                .join(", ")
        );
        let candidates: Vec<&Header> = function
            .headers
            .iter()
            .filter(|header| header.accepts(arguments))
            .collect();

        match candidates.as_slice() {
            [header] => Ok(ResolvedCall {
                return_type: function.return_type.clone(),
                header: (*header).clone(),
            }),
            [] => Err(Error::new(
                ErrorImpl::NoMatchingHeader {
                    function: String::from(name),
                    call,
                    candidates: list_headers(name, function.headers.iter()),
                },
                position,
            )),
            _ => Err(Error::new(
                ErrorImpl::AmbiguousCall {
                    call,
                    candidates: list_headers(name, candidates.into_iter()),
                },
                position,
            )),
        }
    }

    pub fn define_rule(&mut self, name: &str, options: RuleOptions, line: u32) -> Result<(), Error> {
        if self.rules.iter().any(|rule| rule.name == name) {
            return Err(Error::new(
                ErrorImpl::RuleAlreadyDeclared { rule: String::from(name) },
                self.position(line),
            ));
        }

        self.rules.push(RuleDefinition {
            name: String::from(name),
            options,
            line,
        });
        Ok(())
    }

    pub fn get_rule(&self, name: &str) -> Option<&RuleDefinition> {
        self.rules.iter().find(|rule| rule.name == name)
    }

    /// Rules in declaration order.
    pub fn rules(&self) -> &[RuleDefinition] {
        &self.rules
    }
}

fn list_headers<'a>(name: &str, headers: impl Iterator<Item = &'a Header>) -> String {
    headers
        .map(|header| format!("{}{}", name, header))
        .collect::<Vec<String>>()
        .join(", ")
}
