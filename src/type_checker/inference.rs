//! Resolution of array types the analyzer could not pin down.
//!
//! `[]` is typed `EMPTY_ARRAY` by the analyzer and builtins such as `len`
//! take a `GENERIC_ARRAY`. Once the program is known to be error free, every
//! expression becomes a unification slot, every use site contributes a
//! constraint, and the solved types are written back into the type table.

use std::{collections::HashMap, rc::Rc};

use tracing::{debug, info, instrument};

use crate::{
    ast::{
        ast::{BinaryOp, Expr, ExprId, ExprKind, Program, Stmt},
        types::Type,
    },
    errors::{
        diagnostics::Diagnostics,
        errors::{Error, ErrorImpl},
    },
    Position,
};

use super::type_checker::{Analysis, Context, DefinitionKind};

type Slot = usize;

#[derive(Debug, Clone, PartialEq)]
enum Constraint {
    /// The slot has (at least) this type.
    Fixed(Slot, Type),
    /// Both slots have the same type.
    Equal(Slot, Slot),
    /// `element` is the element type of `array`.
    Element { array: Slot, element: Slot },
}

/// A `forall` whose source must end up with a concrete element type.
struct ForallSource {
    source: ExprId,
    variable: String,
    ctx: Context,
}

/// An `[]` literal that must end up with a concrete type.
struct EmptyList {
    id: ExprId,
    ctx: Context,
}

struct Collector<'a> {
    analysis: &'a Analysis,
    constraints: Vec<Constraint>,
    next_slot: Slot,
    /// Names in scope; `Some` for loop variables, `None` for anything that
    /// shadows one.
    scopes: Vec<HashMap<String, Option<Slot>>>,
    forall_sources: Vec<ForallSource>,
    empty_lists: Vec<EmptyList>,
}

impl<'a> Collector<'a> {
    fn new(analysis: &'a Analysis, expr_count: usize) -> Self {
        Collector {
            analysis,
            constraints: vec![],
            next_slot: expr_count,
            scopes: vec![],
            forall_sources: vec![],
            empty_lists: vec![],
        }
    }

    fn new_slot(&mut self) -> Slot {
        let slot = self.next_slot;
        self.next_slot += 1;
        slot
    }

    fn bind(&mut self, name: &str, slot: Option<Slot>) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(String::from(name), slot);
        }
    }

    fn loop_variable(&self, name: &str) -> Option<Slot> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name).copied())
            .flatten()
    }

    fn type_of(&self, id: ExprId) -> Type {
        self.analysis.types.type_of(id)
    }

    fn collect(&mut self, program: &Program) {
        for global in program.globals() {
            let ctx = Context::definition(DefinitionKind::Global, &global.name, global.line);
            self.constraints.push(Constraint::Fixed(global.value.id, global.ty.clone()));
            self.visit_expr(&global.value, &ctx);
        }

        for function in program.functions() {
            let ctx = Context::definition(DefinitionKind::Function, &function.name, function.line);
            self.scopes.push(HashMap::new());
            for param in &function.params {
                self.bind(&param.name, None);
            }
            self.visit_block(&function.body, &function.return_type, &ctx);
            self.scopes.pop();
        }

        for rule in program.rules() {
            let ctx = Context::definition(DefinitionKind::Rule, &rule.name, rule.line);
            self.scopes.push(HashMap::new());
            if let Some(guard) = &rule.guard {
                self.visit_expr(guard, &ctx);
            }
            self.visit_block(&rule.body, &Type::Void, &ctx);
            self.scopes.pop();
        }
    }

    fn visit_scoped_block(&mut self, stmts: &[Stmt], return_type: &Type, ctx: &Context) {
        self.scopes.push(HashMap::new());
        self.visit_block(stmts, return_type, ctx);
        self.scopes.pop();
    }

    fn visit_block(&mut self, stmts: &[Stmt], return_type: &Type, ctx: &Context) {
        for stmt in stmts {
            self.visit_stmt(stmt, return_type, &ctx.at(stmt.line()));
        }
    }

    fn visit_stmt(&mut self, stmt: &Stmt, return_type: &Type, ctx: &Context) {
        match stmt {
            Stmt::VarDecl { ty, declarators, .. } => {
                for declarator in declarators {
                    if let Some(value) = &declarator.value {
                        self.constraints.push(Constraint::Fixed(value.id, ty.clone()));
                        self.visit_expr(value, ctx);
                    }
                    self.bind(&declarator.name, None);
                }
            }
            Stmt::Assign { target, value, .. } => {
                self.visit_expr(target, ctx);
                self.visit_expr(value, ctx);
                self.constraints.push(Constraint::Equal(target.id, value.id));
            }
            Stmt::If {
                condition,
                then_body,
                else_body,
                ..
            } => {
                self.visit_expr(condition, ctx);
                self.visit_scoped_block(then_body, return_type, ctx);
                if let Some(else_body) = else_body {
                    self.visit_scoped_block(else_body, return_type, ctx);
                }
            }
            Stmt::While { condition, body, .. } => {
                self.visit_expr(condition, ctx);
                self.visit_scoped_block(body, return_type, ctx);
            }
            Stmt::Forall {
                variable,
                source,
                body,
                ..
            } => {
                self.visit_expr(source, ctx);

                let slot = self.new_slot();
                self.constraints.push(Constraint::Element {
                    array: source.id,
                    element: slot,
                });
                self.forall_sources.push(ForallSource {
                    source: source.id,
                    variable: variable.clone(),
                    ctx: ctx.clone(),
                });

                self.scopes.push(HashMap::new());
                self.bind(variable, Some(slot));
                self.visit_block(body, return_type, ctx);
                self.scopes.pop();
            }
            Stmt::Return { value, .. } => {
                if let Some(value) = value {
                    self.constraints.push(Constraint::Fixed(value.id, return_type.clone()));
                    self.visit_expr(value, ctx);
                }
            }
            Stmt::Score { value, .. } => {
                self.constraints.push(Constraint::Fixed(value.id, Type::Num));
                self.visit_expr(value, ctx);
            }
            Stmt::Call { call, .. } => self.visit_expr(call, ctx),
        }
    }

    fn visit_expr(&mut self, expr: &Expr, ctx: &Context) {
        let ctx = ctx.at(expr.line);

        match &expr.kind {
            ExprKind::Literal(_) => {}
            ExprKind::Identifier(name) => {
                if let Some(slot) = self.loop_variable(name) {
                    self.constraints.push(Constraint::Equal(expr.id, slot));
                }
            }
            ExprKind::Binary {
                operator,
                left,
                right,
            } => {
                self.visit_expr(left, &ctx);
                self.visit_expr(right, &ctx);

                match operator {
                    BinaryOp::Equal | BinaryOp::NotEqual => {
                        if is_array_type(&self.type_of(left.id)) && is_array_type(&self.type_of(right.id)) {
                            self.constraints.push(Constraint::Equal(left.id, right.id));
                        }
                    }
                    BinaryOp::In => self.constraints.push(Constraint::Element {
                        array: right.id,
                        element: left.id,
                    }),
                    BinaryOp::Concat => {
                        if is_array_type(&self.type_of(expr.id)) {
                            self.constraints.push(Constraint::Equal(left.id, expr.id));
                            self.constraints.push(Constraint::Equal(right.id, expr.id));
                        }
                    }
                    _ => {}
                }
            }
            ExprKind::Unary { operand, .. } => self.visit_expr(operand, &ctx),
            ExprKind::Call { arguments, .. } => {
                for argument in arguments {
                    self.visit_expr(argument, &ctx);
                }
                self.fix_arguments(expr.id, arguments.iter());
            }
            ExprKind::FieldAccess { base, .. } => {
                self.visit_expr(base, &ctx);
                self.fix_arguments(expr.id, std::iter::once(base.as_ref()));
            }
            ExprKind::Index { base, index } => {
                self.visit_expr(base, &ctx);
                self.visit_expr(index, &ctx);
                self.constraints.push(Constraint::Fixed(index.id, Type::Num));
                self.constraints.push(Constraint::Element {
                    array: base.id,
                    element: expr.id,
                });
            }
            ExprKind::List(elements) => {
                for element in elements {
                    self.visit_expr(element, &ctx);
                    self.constraints.push(Constraint::Element {
                        array: expr.id,
                        element: element.id,
                    });
                }
            }
            ExprKind::EmptyList => self.empty_lists.push(EmptyList { id: expr.id, ctx }),
        }
    }

    fn fix_arguments<'e>(&mut self, call: ExprId, arguments: impl Iterator<Item = &'e Expr>) {
        let analysis = self.analysis;
        let header = match analysis.calls.get(&call) {
            Some(header) => header,
            None => return,
        };

        for (argument, param) in arguments.zip(&header.params) {
            self.constraints.push(Constraint::Fixed(argument.id, param.clone()));
        }
    }
}

fn is_array_type(ty: &Type) -> bool {
    matches!(ty, Type::Array(_) | Type::GenericArray | Type::EmptyArray)
}

/// Union-find over slots; each class root carries the merged class type.
#[derive(Debug)]
struct Unifier {
    parent: Vec<Slot>,
    types: Vec<Type>,
}

impl Unifier {
    fn new(initial: Vec<Type>) -> Self {
        Unifier {
            parent: (0..initial.len()).collect(),
            types: initial,
        }
    }

    fn find(&mut self, slot: Slot) -> Slot {
        let mut root = slot;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        let mut current = slot;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }

        root
    }

    fn type_of(&mut self, slot: Slot) -> Type {
        let root = self.find(slot);
        self.types[root].clone()
    }

    /// Narrows the class of `slot` to `ty`. Returns whether anything changed.
    fn fix(&mut self, slot: Slot, ty: &Type) -> Result<bool, ErrorImpl> {
        let root = self.find(slot);
        let current = &self.types[root];

        if !current.equals(ty) {
            return Err(ErrorImpl::InferenceConflict {
                expected: current.to_string(),
                received: ty.to_string(),
            });
        }

        let merged = current.merge_types(ty);
        let changed = merged != *current;
        self.types[root] = merged;
        Ok(changed)
    }

    fn union(&mut self, left: Slot, right: Slot) -> Result<(), ErrorImpl> {
        let left_root = self.find(left);
        let right_root = self.find(right);
        if left_root == right_root {
            return Ok(());
        }

        let right_type = self.types[right_root].clone();
        self.fix(left_root, &right_type)?;
        self.parent[right_root] = left_root;
        Ok(())
    }

    fn solve_element(&mut self, array: Slot, element: Slot) -> Result<bool, ErrorImpl> {
        let array_type = self.type_of(array);
        let element_type = self.type_of(element);

        let mut changed = self.fix(array, &Type::array_of(element_type))?;
        if let Ok(known_element) = array_type.element_type() {
            changed |= self.fix(element, &known_element)?;
        }

        Ok(changed)
    }

    fn solve(&mut self, constraints: &[Constraint]) -> Result<(), ErrorImpl> {
        let mut elements = vec![];

        for constraint in constraints {
            match constraint {
                Constraint::Fixed(slot, ty) => {
                    self.fix(*slot, ty)?;
                }
                Constraint::Equal(left, right) => self.union(*left, *right)?,
                Constraint::Element { array, element } => elements.push((*array, *element)),
            }
        }

        // Merging only ever makes types more specific, so this terminates
        loop {
            let mut changed = false;
            for (array, element) in &elements {
                changed |= self.solve_element(*array, *element)?;
            }
            if !changed {
                return Ok(());
            }
        }
    }
}

/// Resolves every sentinel array type left in `analysis.types`.
///
/// Must only run on a program without errors. Unresolvable `[]` literals and
/// `forall` sources are reported to `diagnostics`.
#[instrument(skip_all, fields(file = %program.file))]
pub fn infer(program: &Program, analysis: &mut Analysis, diagnostics: &mut Diagnostics) {
    let expr_count = program.expr_count.max(analysis.types.len());

    let (constraints, slot_count, forall_sources, empty_lists) = {
        let mut collector = Collector::new(analysis, expr_count);
        collector.collect(program);
        (
            collector.constraints,
            collector.next_slot,
            collector.forall_sources,
            collector.empty_lists,
        )
    };
    debug!(constraints = constraints.len(), slots = slot_count, "Collected constraints");

    let mut initial: Vec<Type> = (0..expr_count).map(|id| analysis.types.type_of(id)).collect();
    initial.resize(slot_count, Type::Generic);

    let mut unifier = Unifier::new(initial);
    if let Err(error) = unifier.solve(&constraints) {
        diagnostics.add(Error::new(error, Position(0, Rc::clone(&program.file))), None);
        return;
    }

    for id in 0..expr_count {
        if analysis.types.get(id).is_some() {
            let resolved = unifier.type_of(id);
            analysis.types.resolve(id, resolved);
        }
    }

    for forall in forall_sources {
        if !analysis.types.type_of(forall.source).is_resolved() {
            diagnostics.add(
                Error::new(
                    ErrorImpl::UnresolvedForallSource { variable: forall.variable },
                    Position(forall.ctx.line, Rc::clone(&program.file)),
                ),
                forall.ctx.place(),
            );
        }
    }

    for empty_list in empty_lists {
        if !analysis.types.type_of(empty_list.id).is_resolved() {
            diagnostics.add(
                Error::new(
                    ErrorImpl::UnresolvedEmptyArray,
                    Position(empty_list.ctx.line, Rc::clone(&program.file)),
                ),
                empty_list.ctx.place(),
            );
        }
    }

    info!(errors = diagnostics.error_count(), "Array type inference finished");
}
