//! The row-filter predicate language: a small pandas-`query`-style boolean
//! expression grammar over column names.
//!
//! ```text
//! expr       := or
//! or         := and ( ("or" | "|") and )*
//! and        := unary ( ("and" | "&") unary )*
//! unary      := ("not" | "~") unary | comparison
//! comparison := operand ( ("==" | "!=" | "<" | "<=" | ">" | ">=") operand )?
//! operand    := identifier | number | string | true | false | "(" expr ")"
//! ```
//!
//! Semantics: identifiers resolve to column values per row; numeric
//! comparisons are by value, string comparisons lexical, boolean comparisons
//! equality-only. Any comparison touching a missing cell is false, and a
//! missing cell in a logical context counts as false.

use facets_common::{Result, error::Error};

use crate::table::Table;
use crate::value::Value;

/// Evaluates `predicate` against every row of `table`, returning the keep
/// mask. Unknown identifiers fail with an unknown-column error; malformed
/// syntax fails with a query error.
pub fn evaluate(table: &Table, predicate: &str) -> Result<Vec<bool>> {
    let tokens = tokenize(predicate)?;
    let expr = Parser::new(table, tokens).parse()?;
    (0..table.row_count())
        .map(|row| {
            let value = eval(&expr, table, row)?;
            as_condition(&value)
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Ident(String),
    Number(f64),
    Str(String),
    True,
    False,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Not,
    LParen,
    RParen,
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    pos: usize,
}

fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();
    while let Some(&(pos, ch)) = chars.peek() {
        match ch {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token {
                    kind: TokenKind::LParen,
                    pos,
                });
            }
            ')' => {
                chars.next();
                tokens.push(Token {
                    kind: TokenKind::RParen,
                    pos,
                });
            }
            '&' => {
                chars.next();
                tokens.push(Token {
                    kind: TokenKind::And,
                    pos,
                });
            }
            '|' => {
                chars.next();
                tokens.push(Token {
                    kind: TokenKind::Or,
                    pos,
                });
            }
            '~' => {
                chars.next();
                tokens.push(Token {
                    kind: TokenKind::Not,
                    pos,
                });
            }
            '=' => {
                chars.next();
                match chars.peek() {
                    Some(&(_, '=')) => {
                        chars.next();
                        tokens.push(Token {
                            kind: TokenKind::Eq,
                            pos,
                        });
                    }
                    _ => {
                        return Err(Error::query(format!(
                            "expected '==' at offset {pos} (single '=' is not a comparison)"
                        )));
                    }
                }
            }
            '!' => {
                chars.next();
                match chars.peek() {
                    Some(&(_, '=')) => {
                        chars.next();
                        tokens.push(Token {
                            kind: TokenKind::Ne,
                            pos,
                        });
                    }
                    _ => return Err(Error::query(format!("expected '!=' at offset {pos}"))),
                }
            }
            '<' => {
                chars.next();
                let kind = if matches!(chars.peek(), Some(&(_, '='))) {
                    chars.next();
                    TokenKind::Le
                } else {
                    TokenKind::Lt
                };
                tokens.push(Token { kind, pos });
            }
            '>' => {
                chars.next();
                let kind = if matches!(chars.peek(), Some(&(_, '='))) {
                    chars.next();
                    TokenKind::Ge
                } else {
                    TokenKind::Gt
                };
                tokens.push(Token { kind, pos });
            }
            '\'' | '"' => {
                let quote = ch;
                chars.next();
                let mut text = String::new();
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    if c == quote {
                        closed = true;
                        break;
                    }
                    text.push(c);
                }
                if !closed {
                    return Err(Error::query(format!(
                        "unterminated string starting at offset {pos}"
                    )));
                }
                tokens.push(Token {
                    kind: TokenKind::Str(text),
                    pos,
                });
            }
            c if c.is_ascii_digit() || c == '.' || c == '-' => {
                let mut text = String::new();
                text.push(c);
                chars.next();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_ascii_digit() || c == '.' || c == 'e' || c == 'E' || c == '+' || c == '-'
                    {
                        // Sign characters only continue a number right after an
                        // exponent marker.
                        if (c == '+' || c == '-')
                            && !matches!(text.chars().last(), Some('e') | Some('E'))
                        {
                            break;
                        }
                        text.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value = text.parse::<f64>().map_err(|_| {
                    Error::query(format!("invalid number '{text}' at offset {pos}"))
                })?;
                tokens.push(Token {
                    kind: TokenKind::Number(value),
                    pos,
                });
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut text = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' {
                        text.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let kind = match text.as_str() {
                    "and" => TokenKind::And,
                    "or" => TokenKind::Or,
                    "not" => TokenKind::Not,
                    "true" => TokenKind::True,
                    "false" => TokenKind::False,
                    _ => TokenKind::Ident(text),
                };
                tokens.push(Token { kind, pos });
            }
            c => {
                return Err(Error::query(format!(
                    "unexpected character '{c}' at offset {pos}"
                )));
            }
        }
    }
    Ok(tokens)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug)]
enum Expr {
    Column(usize),
    Literal(Value),
    Compare {
        op: CmpOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
}

struct Parser<'a> {
    table: &'a Table,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(table: &'a Table, tokens: Vec<Token>) -> Parser<'a> {
        Parser {
            table,
            tokens,
            pos: 0,
        }
    }

    fn parse(mut self) -> Result<Expr> {
        if self.tokens.is_empty() {
            return Err(Error::query("empty predicate"));
        }
        let expr = self.parse_or()?;
        if let Some(token) = self.peek() {
            return Err(Error::query(format!(
                "unexpected trailing token at offset {}",
                token.pos
            )));
        }
        Ok(expr)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek().is_some_and(|t| t.kind == *kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_or(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_and()?;
        while self.eat(&TokenKind::Or) {
            let rhs = self.parse_and()?;
            lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_unary()?;
        while self.eat(&TokenKind::And) {
            let rhs = self.parse_unary()?;
            lhs = Expr::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        if self.eat(&TokenKind::Not) {
            let inner = self.parse_unary()?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr> {
        let lhs = self.parse_operand()?;
        let op = match self.peek().map(|t| &t.kind) {
            Some(TokenKind::Eq) => Some(CmpOp::Eq),
            Some(TokenKind::Ne) => Some(CmpOp::Ne),
            Some(TokenKind::Lt) => Some(CmpOp::Lt),
            Some(TokenKind::Le) => Some(CmpOp::Le),
            Some(TokenKind::Gt) => Some(CmpOp::Gt),
            Some(TokenKind::Ge) => Some(CmpOp::Ge),
            _ => None,
        };
        let Some(op) = op else {
            return Ok(lhs);
        };
        self.pos += 1;
        let rhs = self.parse_operand()?;
        Ok(Expr::Compare {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    fn parse_operand(&mut self) -> Result<Expr> {
        let Some(token) = self.advance() else {
            return Err(Error::query("unexpected end of predicate"));
        };
        match token.kind {
            TokenKind::Ident(name) => {
                let index = self
                    .table
                    .columns()
                    .iter()
                    .position(|c| c.name == name)
                    .ok_or_else(|| Error::unknown_column(&name))?;
                Ok(Expr::Column(index))
            }
            TokenKind::Number(value) => Ok(Expr::Literal(Value::Number(value))),
            TokenKind::Str(value) => Ok(Expr::Literal(Value::Text(value))),
            TokenKind::True => Ok(Expr::Literal(Value::Bool(true))),
            TokenKind::False => Ok(Expr::Literal(Value::Bool(false))),
            TokenKind::LParen => {
                let expr = self.parse_or()?;
                if !self.eat(&TokenKind::RParen) {
                    return Err(Error::query(format!(
                        "expected ')' for group starting at offset {}",
                        token.pos
                    )));
                }
                Ok(expr)
            }
            _ => Err(Error::query(format!(
                "unexpected token at offset {}",
                token.pos
            ))),
        }
    }
}

fn eval(expr: &Expr, table: &Table, row: usize) -> Result<Value> {
    match expr {
        Expr::Column(index) => Ok(table.columns()[*index].values[row].clone()),
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Compare { op, lhs, rhs } => {
            let lhs = eval(lhs, table, row)?;
            let rhs = eval(rhs, table, row)?;
            Ok(Value::Bool(compare(*op, &lhs, &rhs)))
        }
        Expr::And(lhs, rhs) => {
            let lhs = as_condition(&eval(lhs, table, row)?)?;
            if !lhs {
                return Ok(Value::Bool(false));
            }
            let rhs = as_condition(&eval(rhs, table, row)?)?;
            Ok(Value::Bool(rhs))
        }
        Expr::Or(lhs, rhs) => {
            let lhs = as_condition(&eval(lhs, table, row)?)?;
            if lhs {
                return Ok(Value::Bool(true));
            }
            let rhs = as_condition(&eval(rhs, table, row)?)?;
            Ok(Value::Bool(rhs))
        }
        Expr::Not(inner) => {
            let inner = as_condition(&eval(inner, table, row)?)?;
            Ok(Value::Bool(!inner))
        }
    }
}

/// A value usable in a boolean context: booleans stand for themselves and a
/// missing cell counts as false; anything else is a type error.
fn as_condition(value: &Value) -> Result<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Missing => Ok(false),
        _ => Err(Error::query(
            "filter predicate must be a boolean expression",
        )),
    }
}

/// Comparisons touching a missing cell are false; mismatched kinds are only
/// ever unequal.
fn compare(op: CmpOp, lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::Missing, _) | (_, Value::Missing) => false,
        (Value::Number(a), Value::Number(b)) => match op {
            CmpOp::Eq => a == b,
            CmpOp::Ne => a != b,
            CmpOp::Lt => a < b,
            CmpOp::Le => a <= b,
            CmpOp::Gt => a > b,
            CmpOp::Ge => a >= b,
        },
        (Value::Text(a), Value::Text(b)) => match op {
            CmpOp::Eq => a == b,
            CmpOp::Ne => a != b,
            CmpOp::Lt => a < b,
            CmpOp::Le => a <= b,
            CmpOp::Gt => a > b,
            CmpOp::Ge => a >= b,
        },
        (Value::Bool(a), Value::Bool(b)) => match op {
            CmpOp::Eq => a == b,
            CmpOp::Ne => a != b,
            _ => false,
        },
        _ => matches!(op, CmpOp::Ne),
    }
}
