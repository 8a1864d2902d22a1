use std::rc::Rc;

use super::types::Type;

/// Index of an expression node, dense from zero within one program.
pub type ExprId = usize;

#[derive(Debug, Clone)]
pub struct Program {
    pub file: Rc<String>,
    pub config: Vec<ConfigEntry>,
    pub definitions: Vec<Definition>,
    /// Number of expression ids handed out by the parser.
    pub expr_count: usize,
}

impl Program {
    pub fn globals(&self) -> impl Iterator<Item = &GlobalDef> {
        self.definitions.iter().filter_map(|definition| match definition {
            Definition::Global(global) => Some(global),
            _ => None,
        })
    }

    pub fn functions(&self) -> impl Iterator<Item = &FunctionDef> {
        self.definitions.iter().filter_map(|definition| match definition {
            Definition::Function(function) => Some(function),
            _ => None,
        })
    }

    pub fn rules(&self) -> impl Iterator<Item = &RuleDef> {
        self.definitions.iter().filter_map(|definition| match definition {
            Definition::Rule(rule) => Some(rule),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Num(f64),
    Bool(bool),
}

#[derive(Debug, Clone)]
pub struct ConfigEntry {
    pub name: String,
    pub value: ConfigValue,
    pub line: u32,
}

#[derive(Debug, Clone)]
pub enum Definition {
    Global(GlobalDef),
    Function(FunctionDef),
    Rule(RuleDef),
}

#[derive(Debug, Clone)]
pub struct GlobalDef {
    pub ty: Type,
    pub name: String,
    pub value: Expr,
    pub line: u32,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub ty: Type,
    pub name: String,
    pub by_reference: bool,
    pub line: u32,
}

#[derive(Debug, Clone)]
pub struct FunctionDef {
    pub return_type: Type,
    pub name: String,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
    pub line: u32,
}

#[derive(Debug, Clone)]
pub struct RuleOptionTag {
    pub name: String,
    pub line: u32,
}

#[derive(Debug, Clone)]
pub struct RuleDef {
    pub name: String,
    pub options: Vec<RuleOptionTag>,
    pub guard: Option<Expr>,
    pub body: Vec<Stmt>,
    pub line: u32,
}

#[derive(Debug, Clone)]
pub struct VarDeclarator {
    pub name: String,
    pub value: Option<Expr>,
    pub line: u32,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    VarDecl {
        ty: Type,
        declarators: Vec<VarDeclarator>,
        line: u32,
    },
    Assign {
        /// Always an `ExprKind::Identifier`.
        target: Expr,
        value: Expr,
        line: u32,
    },
    If {
        condition: Expr,
        then_body: Vec<Stmt>,
        else_body: Option<Vec<Stmt>>,
        line: u32,
    },
    While {
        condition: Expr,
        body: Vec<Stmt>,
        line: u32,
    },
    Forall {
        variable: String,
        source: Expr,
        body: Vec<Stmt>,
        line: u32,
    },
    Return {
        value: Option<Expr>,
        line: u32,
    },
    Score {
        value: Expr,
        line: u32,
    },
    /// A call evaluated for its effect on by-reference arguments.
    Call {
        call: Expr,
        line: u32,
    },
}

impl Stmt {
    pub fn line(&self) -> u32 {
        match self {
            Stmt::VarDecl { line, .. }
            | Stmt::Assign { line, .. }
            | Stmt::If { line, .. }
            | Stmt::While { line, .. }
            | Stmt::Forall { line, .. }
            | Stmt::Return { line, .. }
            | Stmt::Score { line, .. }
            | Stmt::Call { line, .. } => *line,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Expr {
    pub id: ExprId,
    pub kind: ExprKind,
    pub line: u32,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Literal(Literal),
    Identifier(String),
    Binary {
        operator: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        operator: UnaryOp,
        operand: Box<Expr>,
    },
    Call {
        name: String,
        arguments: Vec<Expr>,
    },
    /// `base.field`, sugar for `field(base)`.
    FieldAccess {
        base: Box<Expr>,
        field: String,
    },
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
    },
    /// Non-empty list literal.
    List(Vec<Expr>),
    /// The literal `[]`.
    EmptyList,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    Boolean(bool),
    String(String),
    /// `$e4`, stored as `"e4"`.
    Cell(String),
    Row(u8),
    Rank(u8),
    /// Files are numbered from 1 (`a`) to 8 (`h`).
    File(u8),
    CellRange(String, String),
    RowRange(u8, u8),
    RankRange(u8, u8),
    FileRange(u8, u8),
    Board(BoardCollection),
    /// `spawns`, `rqueens`, ...
    Pieces(String),
    Player(PlayerLiteral),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardCollection {
    Cells,
    Rows,
    Ranks,
    Files,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerLiteral {
    SelfPlayer,
    Rival,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    In,
    Add,
    Subtract,
    Multiply,
    Divide,
    Concat,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::In => "in",
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Concat => "++",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Negate,
    /// Unary `+`, the absolute value.
    Absolute,
}
