use std::fmt::Display;

use thiserror::Error;

use crate::Position;

#[derive(Debug, Clone)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

/// The diagnostic family an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Syntax,
    Definition,
    Type,
    Scope,
    AmbiguousCall,
    ControlFlow,
    UnusedBinding,
    Inference,
    Internal,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_internal_error(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn is_warning(&self) -> bool {
        matches!(
            self.internal_error,
            ErrorImpl::UnreachableAfterReturn
                | ErrorImpl::UnreachableAfterIfElse
                | ErrorImpl::MissingReturn
                | ErrorImpl::VoidWithoutReference { .. }
                | ErrorImpl::UnusedVariable { .. }
                | ErrorImpl::UnusedGlobal { .. }
        )
    }

    pub fn get_kind(&self) -> ErrorKind {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. }
            | ErrorImpl::UnexpectedToken { .. }
            | ErrorImpl::UnexpectedTokenDetailed { .. }
            | ErrorImpl::NumberParseError { .. } => ErrorKind::Syntax,
            ErrorImpl::VariableAlreadyDeclared { .. }
            | ErrorImpl::GlobalAlreadyDeclared { .. }
            | ErrorImpl::FunctionAlreadyDeclared { .. }
            | ErrorImpl::ReturnTypeConflict { .. }
            | ErrorImpl::RuleAlreadyDeclared { .. }
            | ErrorImpl::RepeatedRuleOption { .. }
            | ErrorImpl::UnknownRuleOption { .. }
            | ErrorImpl::UnknownConfigOption { .. } => ErrorKind::Definition,
            ErrorImpl::ConfigOptionTypeError { .. }
            | ErrorImpl::GlobalTypeMismatch { .. }
            | ErrorImpl::AssignmentTypeMismatch { .. }
            | ErrorImpl::ReturnTypeMismatch { .. }
            | ErrorImpl::ConditionNotBool { .. }
            | ErrorImpl::GuardNotBool { .. }
            | ErrorImpl::ScoreNotNum { .. }
            | ErrorImpl::OperatorTypeError { .. }
            | ErrorImpl::IndexNotNum { .. }
            | ErrorImpl::ListElementMismatch { .. }
            | ErrorImpl::VoidListElement
            | ErrorImpl::ForallSourceNotArray { .. }
            | ErrorImpl::NoMatchingHeader { .. }
            | ErrorImpl::ReferenceArgument { .. } => ErrorKind::Type,
            ErrorImpl::VariableNotDeclared { .. } | ErrorImpl::FunctionNotDeclared { .. } => {
                ErrorKind::Scope
            }
            ErrorImpl::AmbiguousCall { .. } => ErrorKind::AmbiguousCall,
            ErrorImpl::ScoreInFunction
            | ErrorImpl::NoScoreInRule { .. }
            | ErrorImpl::UnreachableAfterReturn
            | ErrorImpl::UnreachableAfterIfElse
            | ErrorImpl::MissingReturn
            | ErrorImpl::VoidWithoutReference { .. } => ErrorKind::ControlFlow,
            ErrorImpl::UnusedVariable { .. } | ErrorImpl::UnusedGlobal { .. } => {
                ErrorKind::UnusedBinding
            }
            ErrorImpl::UnresolvedForallSource { .. } | ErrorImpl::UnresolvedEmptyArray => {
                ErrorKind::Inference
            }
            ErrorImpl::InferenceConflict { .. }
            | ErrorImpl::UnresolvedType { .. }
            | ErrorImpl::MissingCallResolution { .. }
            | ErrorImpl::NoActiveScope
            | ErrorImpl::MalformedBuiltin { .. } => ErrorKind::Internal,
        }
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::VariableAlreadyDeclared { .. } => "VariableAlreadyDeclared",
            ErrorImpl::GlobalAlreadyDeclared { .. } => "GlobalAlreadyDeclared",
            ErrorImpl::FunctionAlreadyDeclared { .. } => "FunctionAlreadyDeclared",
            ErrorImpl::ReturnTypeConflict { .. } => "ReturnTypeConflict",
            ErrorImpl::RuleAlreadyDeclared { .. } => "RuleAlreadyDeclared",
            ErrorImpl::RepeatedRuleOption { .. } => "RepeatedRuleOption",
            ErrorImpl::UnknownRuleOption { .. } => "UnknownRuleOption",
            ErrorImpl::UnknownConfigOption { .. } => "UnknownConfigOption",
            ErrorImpl::ConfigOptionTypeError { .. } => "ConfigOptionTypeError",
            ErrorImpl::GlobalTypeMismatch { .. } => "GlobalTypeMismatch",
            ErrorImpl::AssignmentTypeMismatch { .. } => "AssignmentTypeMismatch",
            ErrorImpl::ReturnTypeMismatch { .. } => "ReturnTypeMismatch",
            ErrorImpl::ConditionNotBool { .. } => "ConditionNotBool",
            ErrorImpl::GuardNotBool { .. } => "GuardNotBool",
            ErrorImpl::ScoreNotNum { .. } => "ScoreNotNum",
            ErrorImpl::OperatorTypeError { .. } => "OperatorTypeError",
            ErrorImpl::IndexNotNum { .. } => "IndexNotNum",
            ErrorImpl::ListElementMismatch { .. } => "ListElementMismatch",
            ErrorImpl::VoidListElement => "VoidListElement",
            ErrorImpl::ForallSourceNotArray { .. } => "ForallSourceNotArray",
            ErrorImpl::NoMatchingHeader { .. } => "NoMatchingHeader",
            ErrorImpl::ReferenceArgument { .. } => "ReferenceArgument",
            ErrorImpl::VariableNotDeclared { .. } => "VariableNotDeclared",
            ErrorImpl::FunctionNotDeclared { .. } => "FunctionNotDeclared",
            ErrorImpl::AmbiguousCall { .. } => "AmbiguousCall",
            ErrorImpl::ScoreInFunction => "ScoreInFunction",
            ErrorImpl::NoScoreInRule { .. } => "NoScoreInRule",
            ErrorImpl::UnreachableAfterReturn => "UnreachableAfterReturn",
            ErrorImpl::UnreachableAfterIfElse => "UnreachableAfterIfElse",
            ErrorImpl::MissingReturn => "MissingReturn",
            ErrorImpl::VoidWithoutReference { .. } => "VoidWithoutReference",
            ErrorImpl::UnusedVariable { .. } => "UnusedVariable",
            ErrorImpl::UnusedGlobal { .. } => "UnusedGlobal",
            ErrorImpl::UnresolvedForallSource { .. } => "UnresolvedForallSource",
            ErrorImpl::UnresolvedEmptyArray => "UnresolvedEmptyArray",
            ErrorImpl::InferenceConflict { .. } => "InferenceConflict",
            ErrorImpl::UnresolvedType { .. } => "UnresolvedType",
            ErrorImpl::MissingCallResolution { .. } => "MissingCallResolution",
            ErrorImpl::NoActiveScope => "NoActiveScope",
            ErrorImpl::MalformedBuiltin { .. } => "MalformedBuiltin",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnexpectedToken { token } => ErrorTip::Suggestion(format!(
                "Unexpected token: `{}`, did you miss a semicolon?",
                token
            )),
            ErrorImpl::UnexpectedTokenDetailed { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::NumberParseError { token } => {
                ErrorTip::Suggestion(format!("Invalid number: `{}`", token))
            }
            ErrorImpl::VoidWithoutReference { .. } => ErrorTip::Suggestion(String::from(
                "Mark a parameter with `&` so the function can change it",
            )),
            ErrorImpl::AmbiguousCall { .. } | ErrorImpl::UnresolvedEmptyArray => {
                ErrorTip::Suggestion(String::from(
                    "Store the empty array in a typed variable before using it",
                ))
            }
            ErrorImpl::UnresolvedForallSource { .. } => ErrorTip::Suggestion(String::from(
                "Iterate over a typed variable instead of a bare `[]`",
            )),
            ErrorImpl::NoScoreInRule { .. } => {
                ErrorTip::Suggestion(String::from("Add a `score <expression>;` statement"))
            }
            ErrorImpl::ReferenceArgument { .. } => ErrorTip::Suggestion(String::from(
                "Pass a variable, not an expression",
            )),
            _ => ErrorTip::None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.internal_error)
    }
}

impl std::error::Error for Error {}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    // Front end
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },

    // Definitions
    #[error("Variable '{variable}' already defined")]
    VariableAlreadyDeclared { variable: String },
    #[error("Global '{global}' already defined")]
    GlobalAlreadyDeclared { global: String },
    #[error("Function '{function}' already defined with header {header}")]
    FunctionAlreadyDeclared { function: String, header: String },
    #[error("Function '{function}' returns {previous} in a previous header but {received} here")]
    ReturnTypeConflict {
        function: String,
        previous: String,
        received: String,
    },
    #[error("Rule '{rule}' already defined")]
    RuleAlreadyDeclared { rule: String },
    #[error("Option {option} repeated in the header of the rule")]
    RepeatedRuleOption { option: String },
    #[error("Unknown rule option '{option}'")]
    UnknownRuleOption { option: String },
    #[error("Undefined config option: '{option}'")]
    UnknownConfigOption { option: String },

    // Types
    #[error("Value of option '{option}' is not of the expected type {expected}")]
    ConfigOptionTypeError { option: String, expected: String },
    #[error("Global {global} is declared as {declared} but its expression is of type {received}")]
    GlobalTypeMismatch {
        global: String,
        declared: String,
        received: String,
    },
    #[error("Assignment type {received} is not of expected type {expected}")]
    AssignmentTypeMismatch { expected: String, received: String },
    #[error("Return of {definition} is declared as {expected} but expression in return statement is of type {received}")]
    ReturnTypeMismatch {
        definition: String,
        expected: String,
        received: String,
    },
    #[error("Expected BOOL in {statement} condition but found {received} instead")]
    ConditionNotBool { statement: String, received: String },
    #[error("Guard of rule '{rule}' is {received} instead of BOOL")]
    GuardNotBool { rule: String, received: String },
    #[error("Expected NUM in score but found {received} instead")]
    ScoreNotNum { received: String },
    #[error("{message}")]
    OperatorTypeError { message: String },
    #[error("The position of the array must be a NUM, but it's {received} instead")]
    IndexNotNum { received: String },
    #[error("Elements of the list aren't of the same type: {expected} and {received}")]
    ListElementMismatch { expected: String, received: String },
    #[error("VOID cannot be inside an array")]
    VoidListElement,
    #[error("Cannot iterate over {received}, an array was expected")]
    ForallSourceNotArray { received: String },
    #[error("No header of '{function}' matches the call {call}; declared headers: {candidates}")]
    NoMatchingHeader {
        function: String,
        call: String,
        candidates: String,
    },
    #[error("Argument {position} of '{function}' is passed by reference and must be a variable")]
    ReferenceArgument { function: String, position: usize },

    // Scope
    #[error("Variable '{variable}' not defined")]
    VariableNotDeclared { variable: String },
    #[error("Function '{function}' not defined")]
    FunctionNotDeclared { function: String },
    #[error("Call {call} is ambiguous; matching headers: {candidates}")]
    AmbiguousCall { call: String, candidates: String },

    // Control flow
    #[error("score statement in a function")]
    ScoreInFunction,
    #[error("No score statement in rule '{rule}'")]
    NoScoreInRule { rule: String },
    #[error("Unreachable instructions after return statement")]
    UnreachableAfterReturn,
    #[error("Unreachable instructions after if/else statement")]
    UnreachableAfterIfElse,
    #[error("Return statement not reached through every possible branch")]
    MissingReturn,
    #[error("void function '{function}' without parameters by reference")]
    VoidWithoutReference { function: String },

    // Unused bindings
    #[error("Variable '{variable}' defined but never used")]
    UnusedVariable { variable: String },
    #[error("Global '{global}' defined but never used")]
    UnusedGlobal { global: String },

    // Inference
    #[error("Cannot infer the type of loop variable '{variable}': the iterated array has no known element type")]
    UnresolvedForallSource { variable: String },
    #[error("Cannot infer the element type of an empty array")]
    UnresolvedEmptyArray,

    // Internal
    #[error("internal error: inferred types {expected} and {received} disagree")]
    InferenceConflict { expected: String, received: String },
    #[error("internal error: type {type_} reached code generation")]
    UnresolvedType { type_: String },
    #[error("internal error: call to '{function}' was never resolved")]
    MissingCallResolution { function: String },
    #[error("internal error: no scope is open")]
    NoActiveScope,
    #[error("malformed predefined function on line {line}: {text:?}")]
    MalformedBuiltin { line: u32, text: String },
}
