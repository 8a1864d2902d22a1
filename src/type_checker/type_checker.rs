use std::{
    collections::{BTreeSet, HashMap, HashSet},
    fmt::Display,
    rc::Rc,
};

use tracing::{debug, info, instrument};

use crate::{
    ast::{
        ast::{
            BinaryOp, BoardCollection, Expr, ExprId, ExprKind, FunctionDef, GlobalDef, Literal,
            Program, RuleDef, Stmt, UnaryOp,
        },
        types::{Type, TypeError},
    },
    errors::{
        diagnostics::Diagnostics,
        errors::{Error, ErrorImpl},
    },
    Position,
};

use super::{
    builtins::predefined_functions,
    config::ConfigOptions,
    symbol_table::{Header, Phase, RuleOptions, SymbolTable},
    type_table::TypeTable,
};

/// Everything the later stages need from semantic analysis.
#[derive(Debug)]
pub struct Analysis {
    pub symbols: SymbolTable,
    pub types: TypeTable,
    /// Header chosen by overload resolution, per call or field-access site.
    pub calls: HashMap<ExprId, Header>,
    pub config: ConfigOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionKind {
    Global,
    Function,
    Rule,
}

impl Display for DefinitionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DefinitionKind::Global => write!(f, "Global"),
            DefinitionKind::Function => write!(f, "Function"),
            DefinitionKind::Rule => write!(f, "Rule"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionContext {
    pub kind: DefinitionKind,
    pub name: String,
    pub line: u32,
}

/// Where a diagnostic happens: the current line and the enclosing definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    pub line: u32,
    pub definition: Option<Rc<DefinitionContext>>,
}

impl Context {
    pub fn top_level(line: u32) -> Self {
        Context {
            line,
            definition: None,
        }
    }

    pub fn definition(kind: DefinitionKind, name: &str, line: u32) -> Self {
        Context {
            line,
            definition: Some(Rc::new(DefinitionContext {
                kind,
                name: String::from(name),
                line,
            })),
        }
    }

    /// Same definition, different line.
    pub fn at(&self, line: u32) -> Context {
        Context {
            line,
            definition: self.definition.clone(),
        }
    }

    /// `Function: f, line 3`
    pub fn place(&self) -> Option<String> {
        self.definition
            .as_ref()
            .map(|definition| format!("{}: {}, line {}", definition.kind, definition.name, definition.line))
    }
}

pub struct TypeChecker<'a> {
    file: Rc<String>,
    symbols: SymbolTable,
    types: TypeTable,
    calls: HashMap<ExprId, Header>,
    config: ConfigOptions,
    diagnostics: &'a mut Diagnostics,
}

impl<'a> TypeChecker<'a> {
    pub fn new(program: &Program, diagnostics: &'a mut Diagnostics) -> Self {
        TypeChecker {
            file: Rc::clone(&program.file),
            symbols: SymbolTable::new(Rc::clone(&program.file)),
            types: TypeTable::new(program.expr_count),
            calls: HashMap::new(),
            config: ConfigOptions::new(),
            diagnostics,
        }
    }

    fn error(&mut self, error: ErrorImpl, ctx: &Context) {
        let error = Error::new(error, Position(ctx.line, Rc::clone(&self.file)));
        self.diagnostics.add(error, ctx.place());
    }

    fn report(&mut self, error: Error, ctx: &Context) {
        self.diagnostics.add(error, ctx.place());
    }

    fn finish(self) -> Analysis {
        Analysis {
            symbols: self.symbols,
            types: self.types,
            calls: self.calls,
            config: self.config,
        }
    }

    fn check_config(&mut self, program: &Program) {
        for entry in &program.config {
            if let Err(error) = self.config.set(entry) {
                self.error(error, &Context::top_level(entry.line));
            }
        }
    }

    fn load_builtins(&mut self) {
        let builtins = match predefined_functions() {
            Ok(builtins) => builtins,
            Err(error) => {
                self.error(error, &Context::top_level(0));
                return;
            }
        };

        for builtin in builtins {
            let header = Header::builtin(builtin.params);
            if let Err(error) =
                self.symbols
                    .define_function(&builtin.name, builtin.return_type, header, 0)
            {
                self.report(error, &Context::top_level(0));
            }
        }
    }

    fn register_function(&mut self, function: &FunctionDef) {
        let ctx = Context::definition(DefinitionKind::Function, &function.name, function.line);
        let header = Header::new(
            function.params.iter().map(|param| param.ty.clone()).collect(),
            function.params.iter().map(|param| param.by_reference).collect(),
        );

        if let Err(error) = self.symbols.define_function(
            &function.name,
            function.return_type.clone(),
            header,
            function.line,
        ) {
            self.report(error, &ctx);
        }
    }

    fn check_global(&mut self, global: &GlobalDef) {
        debug!(global = %global.name, "Checking global");
        let ctx = Context::definition(DefinitionKind::Global, &global.name, global.line);

        let value_type = self.type_expr(&global.value, ctx.clone());
        if !global.ty.equals(&value_type) {
            self.error(
                ErrorImpl::GlobalTypeMismatch {
                    global: global.name.clone(),
                    declared: global.ty.to_string(),
                    received: value_type.to_string(),
                },
                &ctx,
            );
        }

        if let Err(error) = self.symbols.define_global(&global.name, global.ty.clone(), global.line) {
            self.report(error, &ctx);
        }
    }

    fn check_function(&mut self, function: &FunctionDef) {
        debug!(function = %function.name, "Checking function body");
        let ctx = Context::definition(DefinitionKind::Function, &function.name, function.line);

        self.symbols.push_scope();
        for param in &function.params {
            if let Err(error) = self.symbols.declare_variable(&param.name, param.ty.clone(), param.line) {
                self.report(error, &ctx.at(param.line));
            }
        }

        self.type_stmts(&function.body, ctx.clone());

        let label = format!("function '{}'", function.name);
        self.check_return_types(&function.body, &function.return_type, &label, &ctx);
        self.check_no_score(&function.body, &ctx);

        if function.return_type == Type::Void {
            if !function.params.iter().any(|param| param.by_reference) {
                self.error(
                    ErrorImpl::VoidWithoutReference { function: function.name.clone() },
                    &ctx,
                );
            }
        } else if !always_returns(&function.body) {
            self.error(ErrorImpl::MissingReturn, &ctx);
        }

        self.check_unreachable(&function.body, &ctx);
        self.close_scope(&ctx);
    }

    fn rule_options(&mut self, rule: &RuleDef, ctx: &Context) -> RuleOptions {
        let mut seen = HashSet::new();
        let mut phases = BTreeSet::new();
        let mut symmetric = false;

        for tag in &rule.options {
            let tag_ctx = ctx.at(tag.line);
            if !seen.insert(tag.name.as_str()) {
                self.error(ErrorImpl::RepeatedRuleOption { option: tag.name.clone() }, &tag_ctx);
                continue;
            }

            if tag.name == "sym" {
                symmetric = true;
            } else if let Some(phase) = Phase::from_tag(&tag.name) {
                phases.insert(phase);
            } else {
                self.error(ErrorImpl::UnknownRuleOption { option: tag.name.clone() }, &tag_ctx);
            }
        }

        RuleOptions::new(phases, symmetric)
    }

    fn check_rule(&mut self, rule: &RuleDef) {
        debug!(rule = %rule.name, "Checking rule");
        let ctx = Context::definition(DefinitionKind::Rule, &rule.name, rule.line);

        let options = self.rule_options(rule, &ctx);
        if let Err(error) = self.symbols.define_rule(&rule.name, options, rule.line) {
            self.report(error, &ctx);
        }

        if let Some(guard) = &rule.guard {
            let guard_type = self.type_expr(guard, ctx.at(guard.line));
            if !guard_type.is_bool() {
                self.error(
                    ErrorImpl::GuardNotBool {
                        rule: rule.name.clone(),
                        received: guard_type.to_string(),
                    },
                    &ctx.at(guard.line),
                );
            }
        }

        self.symbols.push_scope();
        self.type_stmts(&rule.body, ctx.clone());

        let label = format!("rule '{}'", rule.name);
        self.check_return_types(&rule.body, &Type::Void, &label, &ctx);
        if !contains_score(&rule.body) {
            self.error(ErrorImpl::NoScoreInRule { rule: rule.name.clone() }, &ctx);
        }
        self.check_unreachable(&rule.body, &ctx);
        self.close_scope(&ctx);
    }

    fn check_unused_globals(&mut self) {
        for (global, line) in self.symbols.unused_globals() {
            self.error(ErrorImpl::UnusedGlobal { global }, &Context::top_level(line));
        }
    }

    /// Pops the innermost scope, warning about the bindings nobody read.
    fn close_scope(&mut self, ctx: &Context) {
        match self.symbols.pop_scope() {
            Ok(unused) => {
                for (variable, line) in unused {
                    self.error(ErrorImpl::UnusedVariable { variable }, &ctx.at(line));
                }
            }
            Err(error) => self.report(error, ctx),
        }
    }

    fn type_stmts(&mut self, stmts: &[Stmt], ctx: Context) {
        for stmt in stmts {
            self.type_stmt(stmt, ctx.at(stmt.line()));
        }
    }

    fn type_scoped_stmts(&mut self, stmts: &[Stmt], ctx: Context) {
        self.symbols.push_scope();
        self.type_stmts(stmts, ctx.clone());
        self.close_scope(&ctx);
    }

    fn type_condition(&mut self, condition: &Expr, statement: &str, ctx: Context) {
        let condition_type = self.type_expr(condition, ctx.clone());
        if !condition_type.is_bool() {
            self.error(
                ErrorImpl::ConditionNotBool {
                    statement: String::from(statement),
                    received: condition_type.to_string(),
                },
                &ctx,
            );
        }
    }

    fn type_stmt(&mut self, stmt: &Stmt, ctx: Context) {
        match stmt {
            Stmt::VarDecl { ty, declarators, .. } => {
                for declarator in declarators {
                    if let Some(value) = &declarator.value {
                        let value_type = self.type_expr(value, ctx.at(declarator.line));
                        if !ty.equals(&value_type) {
                            self.error(
                                ErrorImpl::AssignmentTypeMismatch {
                                    expected: ty.to_string(),
                                    received: value_type.to_string(),
                                },
                                &ctx.at(declarator.line),
                            );
                        }
                    }

                    if let Err(error) =
                        self.symbols.declare_variable(&declarator.name, ty.clone(), declarator.line)
                    {
                        self.report(error, &ctx.at(declarator.line));
                    }
                }
            }
            Stmt::Assign { target, value, .. } => {
                let target_type = self.type_expr(target, ctx.clone());
                let value_type = self.type_expr(value, ctx.clone());

                if !target_type.equals(&value_type) {
                    self.error(
                        ErrorImpl::AssignmentTypeMismatch {
                            expected: target_type.to_string(),
                            received: value_type.to_string(),
                        },
                        &ctx,
                    );
                }
            }
            Stmt::If {
                condition,
                then_body,
                else_body,
                ..
            } => {
                self.type_condition(condition, "if", ctx.clone());
                self.type_scoped_stmts(then_body, ctx.clone());
                if let Some(else_body) = else_body {
                    self.type_scoped_stmts(else_body, ctx);
                }
            }
            Stmt::While { condition, body, .. } => {
                self.type_condition(condition, "while", ctx.clone());
                self.type_scoped_stmts(body, ctx);
            }
            Stmt::Forall {
                variable,
                source,
                body,
                line,
            } => {
                let source_type = self.type_expr(source, ctx.clone());
                let element_type = match source_type.element_type() {
                    Ok(element_type) => element_type,
                    Err(_) => {
                        self.error(
                            ErrorImpl::ForallSourceNotArray { received: source_type.to_string() },
                            &ctx,
                        );
                        Type::Generic
                    }
                };

                self.symbols.push_scope();
                if let Err(error) = self.symbols.declare_variable(variable, element_type, *line) {
                    self.report(error, &ctx);
                }
                self.type_stmts(body, ctx.clone());
                self.close_scope(&ctx);
            }
            Stmt::Return { value, .. } => {
                if let Some(value) = value {
                    self.type_expr(value, ctx);
                }
            }
            Stmt::Score { value, .. } => {
                let score_type = self.type_expr(value, ctx.clone());
                if !score_type.is_num() {
                    self.error(ErrorImpl::ScoreNotNum { received: score_type.to_string() }, &ctx);
                }
            }
            Stmt::Call { call, .. } => {
                self.type_expr(call, ctx);
            }
        }
    }

    /// Types an expression once; later calls read the recorded type.
    pub fn type_expr(&mut self, expr: &Expr, ctx: Context) -> Type {
        if let Some(ty) = self.types.get(expr.id) {
            return ty.clone();
        }

        let ctx = ctx.at(expr.line);
        let ty = self.compute_expr_type(expr, ctx);
        self.types.record(expr.id, ty.clone());
        ty
    }

    fn compute_expr_type(&mut self, expr: &Expr, ctx: Context) -> Type {
        match &expr.kind {
            ExprKind::Literal(literal) => literal_type(literal),
            ExprKind::Identifier(name) => match self.symbols.lookup_variable(name) {
                Some(ty) => ty,
                None => {
                    self.error(ErrorImpl::VariableNotDeclared { variable: name.clone() }, &ctx);
                    Type::Generic
                }
            },
            ExprKind::Binary {
                operator,
                left,
                right,
            } => {
                let left_type = self.type_expr(left, ctx.clone());
                let right_type = self.type_expr(right, ctx.clone());

                let result = match operator {
                    BinaryOp::Or | BinaryOp::And => left_type.check_type_bool_op(&right_type),
                    BinaryOp::Equal | BinaryOp::NotEqual => left_type.check_type_equality(&right_type),
                    BinaryOp::Less
                    | BinaryOp::LessEqual
                    | BinaryOp::Greater
                    | BinaryOp::GreaterEqual => left_type.check_type_order(&right_type),
                    BinaryOp::Add | BinaryOp::Subtract | BinaryOp::Multiply | BinaryOp::Divide => {
                        left_type.check_type_arithmetic(&right_type)
                    }
                    BinaryOp::In => left_type.check_type_in(&right_type),
                    BinaryOp::Concat => left_type.check_type_concat(&right_type),
                };

                self.operator_result(result, &ctx)
            }
            ExprKind::Unary { operator, operand } => {
                let operand_type = self.type_expr(operand, ctx.clone());
                let result = match operator {
                    UnaryOp::Not => operand_type.check_type_unary_bool(),
                    UnaryOp::Negate | UnaryOp::Absolute => operand_type.check_type_unary_arithmetic(),
                };

                self.operator_result(result, &ctx)
            }
            ExprKind::Call { name, arguments } => {
                let argument_refs: Vec<&Expr> = arguments.iter().collect();
                self.type_call(expr.id, name, &argument_refs, ctx)
            }
            ExprKind::FieldAccess { base, field } => {
                self.type_call(expr.id, field, &[base.as_ref()], ctx)
            }
            ExprKind::Index { base, index } => {
                let base_type = self.type_expr(base, ctx.clone());
                let index_type = self.type_expr(index, ctx.clone());

                if !index_type.is_num() {
                    self.error(ErrorImpl::IndexNotNum { received: index_type.to_string() }, &ctx);
                }

                let element = base_type.element_type();
                self.operator_result(element, &ctx)
            }
            ExprKind::List(elements) => {
                let mut merged = Type::Generic;

                for element in elements {
                    let element_type = self.type_expr(element, ctx.clone());
                    if element_type == Type::Void {
                        self.error(ErrorImpl::VoidListElement, &ctx);
                    } else if !merged.equals(&element_type) {
                        self.error(
                            ErrorImpl::ListElementMismatch {
                                expected: merged.to_string(),
                                received: element_type.to_string(),
                            },
                            &ctx,
                        );
                    } else {
                        merged = merged.merge_types(&element_type);
                    }
                }

                Type::array_of(merged)
            }
            ExprKind::EmptyList => Type::EmptyArray,
        }
    }

    fn operator_result(
        &mut self,
        result: Result<Type, TypeError>,
        ctx: &Context,
    ) -> Type {
        match result {
            Ok(ty) => ty,
            Err(error) => {
                self.error(ErrorImpl::OperatorTypeError { message: error.message }, ctx);
                Type::Generic
            }
        }
    }

    fn type_call(&mut self, id: ExprId, name: &str, arguments: &[&Expr], ctx: Context) -> Type {
        let argument_types: Vec<Type> = arguments
            .iter()
            .map(|argument| self.type_expr(argument, ctx.clone()))
            .collect();

        let resolved = match self.symbols.resolve_call(name, &argument_types, ctx.line) {
            Ok(resolved) => resolved,
            Err(error) => {
                self.report(error, &ctx);
                return Type::Generic;
            }
        };

        for (index, (argument, by_reference)) in
            arguments.iter().zip(&resolved.header.by_reference).enumerate()
        {
            if *by_reference && !matches!(argument.kind, ExprKind::Identifier(_)) {
                self.error(
                    ErrorImpl::ReferenceArgument {
                        function: String::from(name),
                        position: index + 1,
                    },
                    &ctx,
                );
            }
        }

        self.calls.insert(id, resolved.header);
        resolved.return_type
    }

    fn check_return_types(&mut self, stmts: &[Stmt], expected: &Type, label: &str, ctx: &Context) {
        for stmt in stmts {
            match stmt {
                Stmt::Return { value, line } => {
                    let received = match value {
                        Some(value) => self.types.type_of(value.id),
                        None => Type::Void,
                    };

                    if !expected.equals(&received) {
                        self.error(
                            ErrorImpl::ReturnTypeMismatch {
                                definition: String::from(label),
                                expected: expected.to_string(),
                                received: received.to_string(),
                            },
                            &ctx.at(*line),
                        );
                    }
                }
                Stmt::While { body, .. } | Stmt::Forall { body, .. } => {
                    self.check_return_types(body, expected, label, ctx);
                }
                Stmt::If {
                    then_body,
                    else_body,
                    ..
                } => {
                    self.check_return_types(then_body, expected, label, ctx);
                    if let Some(else_body) = else_body {
                        self.check_return_types(else_body, expected, label, ctx);
                    }
                }
                _ => {}
            }
        }
    }

    fn check_no_score(&mut self, stmts: &[Stmt], ctx: &Context) {
        for stmt in stmts {
            match stmt {
                Stmt::Score { line, .. } => self.error(ErrorImpl::ScoreInFunction, &ctx.at(*line)),
                Stmt::While { body, .. } | Stmt::Forall { body, .. } => self.check_no_score(body, ctx),
                Stmt::If {
                    then_body,
                    else_body,
                    ..
                } => {
                    self.check_no_score(then_body, ctx);
                    if let Some(else_body) = else_body {
                        self.check_no_score(else_body, ctx);
                    }
                }
                _ => {}
            }
        }
    }

    /// Warns about statements following a guaranteed return. The last
    /// statement of a block never triggers a warning itself.
    fn check_unreachable(&mut self, stmts: &[Stmt], ctx: &Context) {
        for (index, stmt) in stmts.iter().enumerate() {
            let is_last = index + 1 == stmts.len();

            match stmt {
                Stmt::Return { line, .. } if !is_last => {
                    self.error(ErrorImpl::UnreachableAfterReturn, &ctx.at(*line));
                }
                Stmt::While { body, .. } | Stmt::Forall { body, .. } => {
                    self.check_unreachable(body, ctx);
                }
                Stmt::If {
                    then_body,
                    else_body,
                    line,
                    ..
                } => {
                    self.check_unreachable(then_body, ctx);
                    if let Some(else_body) = else_body {
                        self.check_unreachable(else_body, ctx);
                        if !is_last && always_returns(then_body) && always_returns(else_body) {
                            self.error(ErrorImpl::UnreachableAfterIfElse, &ctx.at(*line));
                        }
                    }
                }
                _ => {}
            }
        }
    }
}

fn literal_type(literal: &Literal) -> Type {
    match literal {
        Literal::Number(_) => Type::Num,
        Literal::Boolean(_) => Type::Bool,
        Literal::String(_) => Type::String,
        Literal::Cell(_) => Type::Cell,
        Literal::Row(_) => Type::Row,
        Literal::Rank(_) => Type::Rank,
        Literal::File(_) => Type::File,
        Literal::CellRange(_, _) => Type::array_of(Type::Cell),
        Literal::RowRange(_, _) => Type::array_of(Type::Row),
        Literal::RankRange(_, _) => Type::array_of(Type::Rank),
        Literal::FileRange(_, _) => Type::array_of(Type::File),
        Literal::Board(collection) => Type::array_of(match collection {
            BoardCollection::Cells => Type::Cell,
            BoardCollection::Rows => Type::Row,
            BoardCollection::Ranks => Type::Rank,
            BoardCollection::Files => Type::File,
        }),
        Literal::Pieces(_) => Type::array_of(Type::Piece),
        Literal::Player(_) => Type::Player,
    }
}

/// A block returns on every path when it contains a `return`, or an
/// `if`/`else` whose branches both do. Loops never count.
pub fn always_returns(stmts: &[Stmt]) -> bool {
    stmts.iter().any(|stmt| match stmt {
        Stmt::Return { .. } => true,
        Stmt::If {
            then_body,
            else_body: Some(else_body),
            ..
        } => always_returns(then_body) && always_returns(else_body),
        _ => false,
    })
}

pub fn contains_score(stmts: &[Stmt]) -> bool {
    stmts.iter().any(|stmt| match stmt {
        Stmt::Score { .. } => true,
        Stmt::While { body, .. } | Stmt::Forall { body, .. } => contains_score(body),
        Stmt::If {
            then_body,
            else_body,
            ..
        } => {
            contains_score(then_body)
                || else_body.as_ref().map(|body| contains_score(body)).unwrap_or(false)
        }
        _ => false,
    })
}

/// Runs every analysis pass over `program`, filing problems into
/// `diagnostics`. The returned tables are only meaningful when no error was
/// reported.
#[instrument(skip_all, fields(file = %program.file))]
pub fn type_check(program: &Program, diagnostics: &mut Diagnostics) -> Analysis {
    let mut type_checker = TypeChecker::new(program, diagnostics);

    type_checker.check_config(program);
    type_checker.load_builtins();

    // Headers first, so global initializers can call user functions
    for function in program.functions() {
        type_checker.register_function(function);
    }
    for global in program.globals() {
        type_checker.check_global(global);
    }
    for function in program.functions() {
        type_checker.check_function(function);
    }
    for rule in program.rules() {
        type_checker.check_rule(rule);
    }
    type_checker.check_unused_globals();

    info!(
        errors = type_checker.diagnostics.error_count(),
        warnings = type_checker.diagnostics.warning_count(),
        "Semantic analysis finished"
    );

    type_checker.finish()
}
