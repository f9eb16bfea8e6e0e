//! Whitelisted arithmetic expressions over a solved trajectory.
//!
//! Grammar:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('-' | '+') unary | power
//! power   := primary (('^' | '**') unary)?
//! primary := number | name | name '(' expr (',' expr)* ')' | '(' expr ')'
//! ```
//!
//! Names resolve to `x1`..`x5` and `t` only. Functions are a fixed set:
//! `abs`, `sqrt`, `exp`, `ln`, `sin`, `cos`, `min(a, b)`, `max(a, b)`,
//! `clip(x, lo, hi)` and `g(a, b)` (numerical gradient of `b` with respect to
//! `a`). Anything else is rejected when the expression is parsed.

use hv_core::{StateIndex, gradient};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExprError {
    #[error("Parse error at {position}: {message}")]
    Parse { message: String, position: usize },

    #[error("Undefined name '{name}' (expected x1..x5 or t)")]
    UndefinedName { name: String },

    #[error("Unknown function '{name}'")]
    UnknownFunction { name: String },

    #[error("Function '{func}' takes {expected} argument(s), got {got}")]
    Arity {
        func: &'static str,
        expected: usize,
        got: usize,
    },
}

pub type ExprResult<T> = Result<T, ExprError>;

/// Symbol an expression may reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Var {
    Time,
    State(StateIndex),
}

impl Var {
    fn resolve(name: &str) -> ExprResult<Self> {
        if name == "t" {
            return Ok(Var::Time);
        }
        StateIndex::from_symbol(name)
            .map(Var::State)
            .map_err(|_| ExprError::UndefinedName {
                name: name.to_string(),
            })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Func {
    Abs,
    Sqrt,
    Exp,
    Ln,
    Sin,
    Cos,
    Min,
    Max,
    Clip,
    Gradient,
}

impl Func {
    fn resolve(name: &str) -> ExprResult<Self> {
        Ok(match name {
            "abs" => Func::Abs,
            "sqrt" => Func::Sqrt,
            "exp" => Func::Exp,
            "ln" => Func::Ln,
            "sin" => Func::Sin,
            "cos" => Func::Cos,
            "min" => Func::Min,
            "max" => Func::Max,
            "clip" => Func::Clip,
            "g" => Func::Gradient,
            _ => {
                return Err(ExprError::UnknownFunction {
                    name: name.to_string(),
                });
            }
        })
    }

    fn name(self) -> &'static str {
        match self {
            Func::Abs => "abs",
            Func::Sqrt => "sqrt",
            Func::Exp => "exp",
            Func::Ln => "ln",
            Func::Sin => "sin",
            Func::Cos => "cos",
            Func::Min => "min",
            Func::Max => "max",
            Func::Clip => "clip",
            Func::Gradient => "g",
        }
    }

    fn arity(self) -> usize {
        match self {
            Func::Min | Func::Max | Func::Gradient => 2,
            Func::Clip => 3,
            _ => 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinOp {
    fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            BinOp::Add => a + b,
            BinOp::Sub => a - b,
            BinOp::Mul => a * b,
            BinOp::Div => a / b,
            BinOp::Pow => a.powf(b),
        }
    }
}

/// Parsed expression tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Num(f64),
    Var(Var),
    Neg(Box<Expr>),
    Bin(BinOp, Box<Expr>, Box<Expr>),
    Call(Func, Vec<Expr>),
}

/// Columns an expression is evaluated against. All columns share one length.
pub trait Columns {
    fn len(&self) -> usize;
    fn column(&self, var: Var) -> &[f64];
}

impl Expr {
    pub fn parse(src: &str) -> ExprResult<Self> {
        let tokens = tokenize(src)?;
        let mut parser = Parser { tokens, pos: 0 };
        let expr = parser.expr()?;
        match parser.peek() {
            None => Ok(expr),
            Some(tok) => Err(ExprError::Parse {
                message: format!("unexpected {}", tok.kind.describe()),
                position: tok.at,
            }),
        }
    }

    /// Evaluate element-wise over `cols`.
    pub fn eval<C: Columns + ?Sized>(&self, cols: &C) -> Vec<f64> {
        let n = cols.len();
        match self {
            Expr::Num(v) => vec![*v; n],
            Expr::Var(var) => cols.column(*var).to_vec(),
            Expr::Neg(inner) => inner.eval(cols).into_iter().map(|v| -v).collect(),
            Expr::Bin(op, lhs, rhs) => {
                let a = lhs.eval(cols);
                let b = rhs.eval(cols);
                a.iter().zip(&b).map(|(x, y)| op.apply(*x, *y)).collect()
            }
            Expr::Call(func, args) => {
                let vals: Vec<Vec<f64>> = args.iter().map(|a| a.eval(cols)).collect();
                call(*func, &vals)
            }
        }
    }
}

fn call(func: Func, args: &[Vec<f64>]) -> Vec<f64> {
    let map1 = |f: fn(f64) -> f64| -> Vec<f64> { args[0].iter().map(|v| f(*v)).collect() };
    match func {
        Func::Abs => map1(f64::abs),
        Func::Sqrt => map1(f64::sqrt),
        Func::Exp => map1(f64::exp),
        Func::Ln => map1(f64::ln),
        Func::Sin => map1(f64::sin),
        Func::Cos => map1(f64::cos),
        Func::Min => args[0].iter().zip(&args[1]).map(|(a, b)| a.min(*b)).collect(),
        Func::Max => args[0].iter().zip(&args[1]).map(|(a, b)| a.max(*b)).collect(),
        Func::Clip => args[0]
            .iter()
            .zip(args[1].iter().zip(&args[2]))
            .map(|(x, (lo, hi))| x.max(*lo).min(*hi))
            .collect(),
        Func::Gradient => gradient(&args[0], &args[1]),
    }
}

#[derive(Clone, Debug, PartialEq)]
enum TokenKind {
    Num(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
    Comma,
}

impl TokenKind {
    fn describe(&self) -> String {
        match self {
            TokenKind::Num(v) => format!("number {v}"),
            TokenKind::Ident(s) => format!("name '{s}'"),
            TokenKind::Plus => "'+'".into(),
            TokenKind::Minus => "'-'".into(),
            TokenKind::Star => "'*'".into(),
            TokenKind::Slash => "'/'".into(),
            TokenKind::Caret => "'^'".into(),
            TokenKind::LParen => "'('".into(),
            TokenKind::RParen => "')'".into(),
            TokenKind::Comma => "','".into(),
        }
    }
}

#[derive(Clone, Debug)]
struct Token {
    kind: TokenKind,
    at: usize,
}

fn tokenize(src: &str) -> ExprResult<Vec<Token>> {
    let bytes = src.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i] as char;
        let at = i;
        let kind = match c {
            ' ' | '\t' | '\n' | '\r' => {
                i += 1;
                continue;
            }
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' if bytes.get(i + 1) == Some(&b'*') => {
                i += 1;
                TokenKind::Caret
            }
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '^' => TokenKind::Caret,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ',' => TokenKind::Comma,
            c if c.is_ascii_digit() || c == '.' => {
                let end = scan_number(bytes, i);
                let text = &src[i..end];
                let v = text.parse::<f64>().map_err(|_| ExprError::Parse {
                    message: format!("invalid number '{text}'"),
                    position: at,
                })?;
                i = end;
                out.push(Token {
                    kind: TokenKind::Num(v),
                    at,
                });
                continue;
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut end = i;
                while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_') {
                    end += 1;
                }
                out.push(Token {
                    kind: TokenKind::Ident(src[i..end].to_string()),
                    at,
                });
                i = end;
                continue;
            }
            other => {
                return Err(ExprError::Parse {
                    message: format!("unexpected character '{other}'"),
                    position: at,
                });
            }
        };
        out.push(Token { kind, at });
        i += 1;
    }
    Ok(out)
}

/// End of a decimal literal with optional exponent.
fn scan_number(bytes: &[u8], start: usize) -> usize {
    let mut end = start;
    while end < bytes.len() && (bytes[end].is_ascii_digit() || bytes[end] == b'.') {
        end += 1;
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp = end + 1;
        if exp < bytes.len() && (bytes[exp] == b'+' || bytes[exp] == b'-') {
            exp += 1;
        }
        if exp < bytes.len() && bytes[exp].is_ascii_digit() {
            while exp < bytes.len() && bytes[exp].is_ascii_digit() {
                exp += 1;
            }
            end = exp;
        }
    }
    end
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek().is_some_and(|t| &t.kind == kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn end_position(&self) -> usize {
        self.tokens.last().map_or(0, |t| t.at + 1)
    }

    fn expect(&mut self, kind: TokenKind) -> ExprResult<()> {
        if self.eat(&kind) {
            return Ok(());
        }
        let (found, position) = match self.peek() {
            Some(t) => (t.kind.describe(), t.at),
            None => ("end of input".to_string(), self.end_position()),
        };
        Err(ExprError::Parse {
            message: format!("expected {}, found {found}", kind.describe()),
            position,
        })
    }

    fn expr(&mut self) -> ExprResult<Expr> {
        let mut lhs = self.term()?;
        loop {
            let op = if self.eat(&TokenKind::Plus) {
                BinOp::Add
            } else if self.eat(&TokenKind::Minus) {
                BinOp::Sub
            } else {
                return Ok(lhs);
            };
            let rhs = self.term()?;
            lhs = Expr::Bin(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn term(&mut self) -> ExprResult<Expr> {
        let mut lhs = self.unary()?;
        loop {
            let op = if self.eat(&TokenKind::Star) {
                BinOp::Mul
            } else if self.eat(&TokenKind::Slash) {
                BinOp::Div
            } else {
                return Ok(lhs);
            };
            let rhs = self.unary()?;
            lhs = Expr::Bin(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn unary(&mut self) -> ExprResult<Expr> {
        if self.eat(&TokenKind::Minus) {
            return Ok(Expr::Neg(Box::new(self.unary()?)));
        }
        if self.eat(&TokenKind::Plus) {
            return self.unary();
        }
        self.power()
    }

    fn power(&mut self) -> ExprResult<Expr> {
        let base = self.primary()?;
        if self.eat(&TokenKind::Caret) {
            // right associative: the exponent is itself a unary
            let exp = self.unary()?;
            return Ok(Expr::Bin(BinOp::Pow, Box::new(base), Box::new(exp)));
        }
        Ok(base)
    }

    fn primary(&mut self) -> ExprResult<Expr> {
        let Some(tok) = self.peek().cloned() else {
            return Err(ExprError::Parse {
                message: "unexpected end of input".into(),
                position: self.end_position(),
            });
        };
        self.pos += 1;
        match tok.kind {
            TokenKind::Num(v) => Ok(Expr::Num(v)),
            TokenKind::Ident(name) => {
                if self.eat(&TokenKind::LParen) {
                    let func = Func::resolve(&name)?;
                    let args = self.args()?;
                    if args.len() != func.arity() {
                        return Err(ExprError::Arity {
                            func: func.name(),
                            expected: func.arity(),
                            got: args.len(),
                        });
                    }
                    Ok(Expr::Call(func, args))
                } else {
                    Ok(Expr::Var(Var::resolve(&name)?))
                }
            }
            TokenKind::LParen => {
                let inner = self.expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            other => Err(ExprError::Parse {
                message: format!("unexpected {}", other.describe()),
                position: tok.at,
            }),
        }
    }

    fn args(&mut self) -> ExprResult<Vec<Expr>> {
        let mut args = Vec::new();
        if self.eat(&TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.expr()?);
            if self.eat(&TokenKind::Comma) {
                continue;
            }
            self.expect(TokenKind::RParen)?;
            return Ok(args);
        }
    }
}
