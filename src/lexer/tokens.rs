use lazy_static::lazy_static;
use std::{collections::HashMap, fmt::Display};

use crate::Span;

pub const PIECE_COLLECTIONS: [&str; 7] = [
    "pieces", "pawns", "bishops", "rooks", "knights", "kings", "queens",
];

lazy_static! {
    pub static ref RESERVED_LOOKUP: HashMap<String, TokenKind> = {
        let mut map = HashMap::new();
        map.insert(String::from("config"), TokenKind::Config);
        map.insert(String::from("rule"), TokenKind::Rule);
        map.insert(String::from("doif"), TokenKind::Doif);
        map.insert(String::from("if"), TokenKind::If);
        map.insert(String::from("else"), TokenKind::Else);
        map.insert(String::from("while"), TokenKind::While);
        map.insert(String::from("forall"), TokenKind::Forall);
        map.insert(String::from("in"), TokenKind::In);
        map.insert(String::from("return"), TokenKind::Return);
        map.insert(String::from("score"), TokenKind::Score);
        map.insert(String::from("and"), TokenKind::And);
        map.insert(String::from("or"), TokenKind::Or);
        map.insert(String::from("not"), TokenKind::Not);
        map.insert(String::from("true"), TokenKind::True);
        map.insert(String::from("false"), TokenKind::False);
        map.insert(String::from("self"), TokenKind::SelfPlayer);
        map.insert(String::from("rival"), TokenKind::Rival);

        map.insert(String::from("void"), TokenKind::Void);
        map.insert(String::from("num"), TokenKind::Num);
        map.insert(String::from("bool"), TokenKind::Bool);
        map.insert(String::from("string"), TokenKind::StringType);
        map.insert(String::from("piece"), TokenKind::Piece);
        map.insert(String::from("cell"), TokenKind::Cell);
        map.insert(String::from("row"), TokenKind::Row);
        map.insert(String::from("rank"), TokenKind::Rank);
        map.insert(String::from("file"), TokenKind::File);
        map.insert(String::from("player"), TokenKind::Player);

        for board in ["cells", "rows", "ranks", "files"] {
            map.insert(String::from(board), TokenKind::BoardLiteral);
        }
        for side in ["s", "r"] {
            for collection in PIECE_COLLECTIONS {
                map.insert(format!("{}{}", side, collection), TokenKind::PieceLiteral);
            }
        }
        map
    };
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    EOF,
    Number,
    String,
    Identifier,

    // Board literals
    CellLiteral,  // $e4
    RowLiteral,   // $3
    RankLiteral,  // $r3
    FileLiteral,  // $e
    CellRange,    // $a1..$h1
    RowRange,     // $1..$4
    RankRange,    // $r1..$r4
    FileRange,    // $a..$d
    BoardLiteral, // cells, rows, ranks, files
    PieceLiteral, // spawns, rqueens, ...

    OpenBracket,
    CloseBracket,
    OpenCurly,
    CloseCurly,
    OpenParen,
    CloseParen,

    Assignment, // :=
    Equals,     // ==
    NotEquals,  // !=

    Less,
    LessEquals,
    Greater,
    GreaterEquals,

    Dot,
    Semicolon,
    Comma,
    Ampersand,

    PlusPlus,
    Plus,
    Dash,
    Slash,
    Star,

    // Reserved
    Config,
    Rule,
    Doif,
    If,
    Else,
    While,
    Forall,
    In,
    Return,
    Score,
    And,
    Or,
    Not,
    True,
    False,
    SelfPlayer,
    Rival,

    // Types
    Void,
    Num,
    Bool,
    StringType,
    Piece,
    Cell,
    Row,
    Rank,
    File,
    Player,
}

impl TokenKind {
    /// Type keywords that double as builtin function names (`row(p)`, `p.file`).
    pub fn is_callable_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Piece
                | TokenKind::Cell
                | TokenKind::Row
                | TokenKind::Rank
                | TokenKind::File
                | TokenKind::Player
        )
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub span: Span,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Token {{\nkind: {},\nvalue: {}}}", self.kind, self.value)
    }
}

impl Token {
    pub fn line(&self) -> u32 {
        self.span.start.0
    }
}
