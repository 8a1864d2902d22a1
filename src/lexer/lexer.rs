use std::rc::Rc;

use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    errors::errors::{Error, ErrorImpl},
    Position, Span, MK_DEFAULT_HANDLER, MK_MATCH_HANDLER, MK_TOKEN,
};

use super::tokens::{Token, TokenKind, RESERVED_LOOKUP};

pub type RegexHandler = fn(&mut Lexer, &Regex);

pub struct RegexPattern {
    regex: Regex,
    handler: RegexHandler,
}

lazy_static! {
    /// Tried in order; the first pattern matching at the cursor wins.
    static ref PATTERNS: Vec<RegexPattern> = vec![
        RegexPattern { regex: Regex::new(r"^\s+").unwrap(), handler: skip_handler },
        RegexPattern { regex: Regex::new(r"^//[^\n]*").unwrap(), handler: skip_handler },
        RegexPattern { regex: Regex::new(r"^/\*(?s:.)*?\*/").unwrap(), handler: skip_handler },
        RegexPattern { regex: Regex::new(r"^\$[a-h][1-8]\.\.\$[a-h][1-8]").unwrap(), handler: MK_MATCH_HANDLER!(TokenKind::CellRange) },
        RegexPattern { regex: Regex::new(r"^\$r[1-8]\.\.\$r[1-8]").unwrap(), handler: MK_MATCH_HANDLER!(TokenKind::RankRange) },
        RegexPattern { regex: Regex::new(r"^\$[1-8]\.\.\$[1-8]").unwrap(), handler: MK_MATCH_HANDLER!(TokenKind::RowRange) },
        RegexPattern { regex: Regex::new(r"^\$[a-h]\.\.\$[a-h]").unwrap(), handler: MK_MATCH_HANDLER!(TokenKind::FileRange) },
        RegexPattern { regex: Regex::new(r"^\$[a-h][1-8]").unwrap(), handler: MK_MATCH_HANDLER!(TokenKind::CellLiteral) },
        RegexPattern { regex: Regex::new(r"^\$r[1-8]").unwrap(), handler: MK_MATCH_HANDLER!(TokenKind::RankLiteral) },
        RegexPattern { regex: Regex::new(r"^\$[1-8]").unwrap(), handler: MK_MATCH_HANDLER!(TokenKind::RowLiteral) },
        RegexPattern { regex: Regex::new(r"^\$[a-h]").unwrap(), handler: MK_MATCH_HANDLER!(TokenKind::FileLiteral) },
        RegexPattern { regex: Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*").unwrap(), handler: symbol_handler },
        RegexPattern { regex: Regex::new(r"^[0-9]+(\.[0-9]+)?").unwrap(), handler: MK_MATCH_HANDLER!(TokenKind::Number) },
        RegexPattern { regex: Regex::new(r#"^"(?:[^"\\]|\\.)*""#).unwrap(), handler: string_handler },
        RegexPattern { regex: Regex::new(r"^\[").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::OpenBracket, "[") },
        RegexPattern { regex: Regex::new(r"^\]").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::CloseBracket, "]") },
        RegexPattern { regex: Regex::new(r"^\{").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::OpenCurly, "{") },
        RegexPattern { regex: Regex::new(r"^\}").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::CloseCurly, "}") },
        RegexPattern { regex: Regex::new(r"^\(").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::OpenParen, "(") },
        RegexPattern { regex: Regex::new(r"^\)").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::CloseParen, ")") },
        RegexPattern { regex: Regex::new(r"^:=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Assignment, ":=") },
        RegexPattern { regex: Regex::new(r"^==").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Equals, "==") },
        RegexPattern { regex: Regex::new(r"^!=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::NotEquals, "!=") },
        RegexPattern { regex: Regex::new(r"^<=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::LessEquals, "<=") },
        RegexPattern { regex: Regex::new(r"^<").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Less, "<") },
        RegexPattern { regex: Regex::new(r"^>=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::GreaterEquals, ">=") },
        RegexPattern { regex: Regex::new(r"^>").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Greater, ">") },
        RegexPattern { regex: Regex::new(r"^\+\+").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::PlusPlus, "++") },
        RegexPattern { regex: Regex::new(r"^\+").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Plus, "+") },
        RegexPattern { regex: Regex::new(r"^-").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Dash, "-") },
        RegexPattern { regex: Regex::new(r"^\*").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Star, "*") },
        RegexPattern { regex: Regex::new(r"^/").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Slash, "/") },
        RegexPattern { regex: Regex::new(r"^&").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Ampersand, "&") },
        RegexPattern { regex: Regex::new(r"^\.").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Dot, ".") },
        RegexPattern { regex: Regex::new(r"^;").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Semicolon, ";") },
        RegexPattern { regex: Regex::new(r"^,").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Comma, ",") },
    ];
}

pub struct Lexer {
    tokens: Vec<Token>,
    source: String,
    pos: usize,
    /// 1-based line of `pos`.
    line: u32,
    file: Rc<String>,
}

impl Lexer {
    pub fn new(source: String, file: Option<String>) -> Lexer {
        let file_name = if let Some(file) = file {
            Rc::new(file)
        } else {
            Rc::new(String::from("shell"))
        };

        Lexer {
            pos: 0,
            line: 1,
            tokens: vec![],
            source,
            file: file_name,
        }
    }

    /// Moves the cursor forward, keeping the line counter in step.
    pub fn advance_n(&mut self, n: usize) {
        let end = (self.pos + n).min(self.source.len());
        self.line += self.source[self.pos..end].matches('\n').count() as u32;
        self.pos = end;
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn at(&self) -> char {
        self.remainder().chars().next().unwrap_or('\0')
    }

    pub fn remainder(&self) -> &str {
        &self.source[self.pos..]
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn position(&self) -> Position {
        Position(self.line, Rc::clone(&self.file))
    }
}

fn skip_handler(lexer: &mut Lexer, regex: &Regex) {
    let matched = regex.find(lexer.remainder()).map(|found| found.end()).unwrap_or(1);
    lexer.advance_n(matched);
}

fn string_handler(lexer: &mut Lexer, regex: &Regex) {
    let literal = match regex.find(lexer.remainder()) {
        Some(found) => found.as_str().to_string(),
        None => return,
    };
    let start = lexer.position();

    let mut result = String::new();
    let mut chars = literal[1..literal.len() - 1].chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(next_ch) = chars.peek() {
                match next_ch {
                    'n' => {
                        result.push('\n');
                        chars.next();
                    }
                    't' => {
                        result.push('\t');
                        chars.next();
                    }
                    '\\' => {
                        result.push('\\');
                        chars.next();
                    }
                    '"' => {
                        result.push('"');
                        chars.next();
                    }
                    _ => {
                        result.push(ch); // Keep the backslash
                    }
                }
            } else {
                result.push(ch);
            }
        } else {
            result.push(ch);
        }
    }

    lexer.advance_n(literal.len());
    lexer.push(MK_TOKEN!(TokenKind::String, result, Span { start, end: lexer.position() }));
}

fn symbol_handler(lexer: &mut Lexer, regex: &Regex) {
    let value = match regex.find(lexer.remainder()) {
        Some(found) => found.as_str().to_string(),
        None => return,
    };
    let kind = RESERVED_LOOKUP.get(&value).copied().unwrap_or(TokenKind::Identifier);

    lexer.push(MK_TOKEN!(kind, value.clone(), Span { start: lexer.position(), end: lexer.position() }));
    lexer.advance_n(value.len());
}

pub fn tokenize(source: String, file: Option<String>) -> Result<Vec<Token>, Error> {
    let mut lex = Lexer::new(source, file);

    while !lex.at_eof() {
        let pattern = PATTERNS
            .iter()
            .find(|pattern| pattern.regex.is_match(lex.remainder()));

        match pattern {
            Some(pattern) => (pattern.handler)(&mut lex, &pattern.regex),
            None => {
                return Err(Error::new(
                    ErrorImpl::UnrecognisedToken { token: lex.at().to_string() },
                    lex.position(),
                ))
            }
        }
    }

    lex.push(MK_TOKEN!(TokenKind::EOF, String::from("EOF"), Span { start: lex.position(), end: lex.position() }));
    Ok(lex.tokens)
}
