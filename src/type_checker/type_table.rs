use crate::ast::{ast::ExprId, types::Type};

/// Types of every expression of a program, indexed by [`ExprId`].
///
/// The analyzer records each expression once; the inferencer later replaces
/// sentinel types through [`TypeTable::resolve`].
#[derive(Debug, Clone, Default)]
pub struct TypeTable {
    types: Vec<Option<Type>>,
}

impl TypeTable {
    pub fn new(expr_count: usize) -> Self {
        TypeTable {
            types: vec![None; expr_count],
        }
    }

    pub fn get(&self, id: ExprId) -> Option<&Type> {
        self.types.get(id).and_then(|ty| ty.as_ref())
    }

    /// The recorded type, or `Generic` for expressions never typed.
    pub fn type_of(&self, id: ExprId) -> Type {
        self.get(id).cloned().unwrap_or(Type::Generic)
    }

    /// Records the type of an expression unless it already has one.
    pub fn record(&mut self, id: ExprId, ty: Type) {
        if id >= self.types.len() {
            self.types.resize(id + 1, None);
        }
        if self.types[id].is_none() {
            self.types[id] = Some(ty);
        }
    }

    pub fn resolve(&mut self, id: ExprId, ty: Type) {
        if id >= self.types.len() {
            self.types.resize(id + 1, None);
        }
        self.types[id] = Some(ty);
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
