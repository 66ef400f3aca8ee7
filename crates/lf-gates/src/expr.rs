//! Sandboxed expression language for user-supplied node functions.
//!
//! A node may carry a small pure expression instead of a catalog operator.
//! The language has numbers, the inputs (`in0`, `in1`, …, `x` for `in0`,
//! `n` for the input count), arithmetic, comparisons, `&&`/`||`/`!`, the
//! ternary `?:` and a fixed set of pure built-ins. There is no assignment,
//! looping or I/O, and both source length and nesting depth are bounded, so
//! evaluation always terminates.
//!
//! ```
//! use lf_gates::CompiledExpr;
//!
//! let expr = CompiledExpr::compile("in0 > 0.5 && in1 < 0.5 ? 1 : 0").unwrap();
//! assert_eq!(expr.evaluate(&[0.9, 0.1]).unwrap(), 1.0);
//! ```

use lf_core::{Real, from_bool, truthy};

use crate::error::{GateError, GateResult};

const MAX_SOURCE_LEN: usize = 1024;
const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(Real),
    Ident(String),
    Op(&'static str),
    LParen,
    RParen,
    Comma,
    Question,
    Colon,
}

fn tokenize(src: &str) -> GateResult<Vec<Token>> {
    let chars: Vec<char> = src.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c.is_ascii_digit() || c == '.' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            let text: String = chars[start..i].iter().collect();
            let value = text
                .parse::<Real>()
                .map_err(|_| GateError::expression(format!("invalid number '{text}'")))?;
            tokens.push(Token::Num(value));
            continue;
        }

        if c.is_ascii_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            tokens.push(Token::Ident(chars[start..i].iter().collect()));
            continue;
        }

        let next = chars.get(i + 1).copied();
        let two = match (c, next) {
            ('<', Some('=')) => Some("<="),
            ('>', Some('=')) => Some(">="),
            ('=', Some('=')) => Some("=="),
            ('!', Some('=')) => Some("!="),
            ('&', Some('&')) => Some("&&"),
            ('|', Some('|')) => Some("||"),
            _ => None,
        };
        if let Some(op) = two {
            tokens.push(Token::Op(op));
            i += 2;
            continue;
        }

        let token = match c {
            '+' => Token::Op("+"),
            '-' => Token::Op("-"),
            '*' => Token::Op("*"),
            '/' => Token::Op("/"),
            '%' => Token::Op("%"),
            '^' => Token::Op("^"),
            '<' => Token::Op("<"),
            '>' => Token::Op(">"),
            '!' => Token::Op("!"),
            '(' => Token::LParen,
            ')' => Token::RParen,
            ',' => Token::Comma,
            '?' => Token::Question,
            ':' => Token::Colon,
            other => {
                return Err(GateError::expression(format!(
                    "unexpected character '{other}'"
                )));
            }
        };
        tokens.push(token);
        i += 1;
    }

    Ok(tokens)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Builtin {
    Min,
    Max,
    Abs,
    Floor,
    Ceil,
    Round,
    Sqrt,
    Clamp,
    Sum,
    Avg,
}

impl Builtin {
    fn lookup(name: &str) -> Option<Self> {
        Some(match name {
            "min" => Self::Min,
            "max" => Self::Max,
            "abs" => Self::Abs,
            "floor" => Self::Floor,
            "ceil" => Self::Ceil,
            "round" => Self::Round,
            "sqrt" => Self::Sqrt,
            "clamp" => Self::Clamp,
            "sum" => Self::Sum,
            "avg" => Self::Avg,
            _ => return None,
        })
    }

    /// Exact argument count, or `None` for variadic functions.
    fn arity(self) -> Option<usize> {
        match self {
            Self::Abs | Self::Floor | Self::Ceil | Self::Round | Self::Sqrt => Some(1),
            Self::Clamp => Some(3),
            Self::Min | Self::Max | Self::Sum | Self::Avg => None,
        }
    }

    fn apply(self, args: &[Real]) -> GateResult<Real> {
        Ok(match self {
            Self::Min => args.iter().copied().reduce(Real::min).unwrap_or(0.0),
            Self::Max => args.iter().copied().reduce(Real::max).unwrap_or(0.0),
            Self::Sum => args.iter().sum(),
            Self::Avg => {
                if args.is_empty() {
                    0.0
                } else {
                    args.iter().sum::<Real>() / args.len() as Real
                }
            }
            Self::Abs => args[0].abs(),
            Self::Floor => args[0].floor(),
            Self::Ceil => args[0].ceil(),
            Self::Round => args[0].round(),
            Self::Sqrt => args[0].sqrt(),
            Self::Clamp => {
                let (v, lo, hi) = (args[0], args[1], args[2]);
                if lo.is_nan() || hi.is_nan() || lo > hi {
                    return Err(GateError::expression(format!(
                        "clamp bounds out of order: {lo} > {hi}"
                    )));
                }
                v.max(lo).min(hi)
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Num(Real),
    Input(usize),
    Count,
    Neg(Box<Node>),
    Not(Box<Node>),
    Binary(BinOp, Box<Node>, Box<Node>),
    Cond(Box<Node>, Box<Node>, Box<Node>),
    Call(Builtin, Vec<Node>),
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_op(&self) -> Option<&'static str> {
        match self.peek() {
            Some(Token::Op(op)) => Some(*op),
            _ => None,
        }
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expect(&mut self, want: Token, what: &str) -> GateResult<()> {
        match self.advance() {
            Some(t) if t == want => Ok(()),
            _ => Err(GateError::expression(format!("expected {what}"))),
        }
    }

    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> GateResult<T>) -> GateResult<T> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(GateError::expression(format!(
                "expression nested deeper than {MAX_DEPTH} levels"
            )));
        }
        let out = f(self);
        self.depth -= 1;
        out
    }

    fn expr(&mut self) -> GateResult<Node> {
        self.nested(Self::ternary)
    }

    fn ternary(&mut self) -> GateResult<Node> {
        let cond = self.or()?;
        if self.peek() != Some(&Token::Question) {
            return Ok(cond);
        }
        self.advance();
        let then = self.expr()?;
        self.expect(Token::Colon, "':' in conditional")?;
        let otherwise = self.expr()?;
        Ok(Node::Cond(Box::new(cond), Box::new(then), Box::new(otherwise)))
    }

    fn or(&mut self) -> GateResult<Node> {
        let mut left = self.and()?;
        while self.peek_op() == Some("||") {
            self.advance();
            let right = self.and()?;
            left = Node::Binary(BinOp::Or, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and(&mut self) -> GateResult<Node> {
        let mut left = self.comparison()?;
        while self.peek_op() == Some("&&") {
            self.advance();
            let right = self.comparison()?;
            left = Node::Binary(BinOp::And, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn comparison(&mut self) -> GateResult<Node> {
        let left = self.additive()?;
        let op = match self.peek_op() {
            Some("<") => BinOp::Lt,
            Some("<=") => BinOp::Le,
            Some(">") => BinOp::Gt,
            Some(">=") => BinOp::Ge,
            Some("==") => BinOp::Eq,
            Some("!=") => BinOp::Ne,
            _ => return Ok(left),
        };
        self.advance();
        let right = self.additive()?;
        Ok(Node::Binary(op, Box::new(left), Box::new(right)))
    }

    fn additive(&mut self) -> GateResult<Node> {
        let mut left = self.multiplicative()?;
        loop {
            let op = match self.peek_op() {
                Some("+") => BinOp::Add,
                Some("-") => BinOp::Sub,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.multiplicative()?;
            left = Node::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn multiplicative(&mut self) -> GateResult<Node> {
        let mut left = self.unary()?;
        loop {
            let op = match self.peek_op() {
                Some("*") => BinOp::Mul,
                Some("/") => BinOp::Div,
                Some("%") => BinOp::Rem,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.unary()?;
            left = Node::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn unary(&mut self) -> GateResult<Node> {
        match self.peek_op() {
            Some("-") => {
                self.advance();
                let inner = self.nested(Self::unary)?;
                Ok(Node::Neg(Box::new(inner)))
            }
            Some("!") => {
                self.advance();
                let inner = self.nested(Self::unary)?;
                Ok(Node::Not(Box::new(inner)))
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> GateResult<Node> {
        let base = self.primary()?;
        if self.peek_op() != Some("^") {
            return Ok(base);
        }
        self.advance();
        // Right associative: 2^3^2 == 2^(3^2).
        let exponent = self.nested(Self::unary)?;
        Ok(Node::Binary(BinOp::Pow, Box::new(base), Box::new(exponent)))
    }

    fn primary(&mut self) -> GateResult<Node> {
        match self.advance() {
            Some(Token::Num(v)) => Ok(Node::Num(v)),
            Some(Token::LParen) => {
                let inner = self.expr()?;
                self.expect(Token::RParen, "')'")?;
                Ok(inner)
            }
            Some(Token::Ident(name)) => {
                if self.peek() == Some(&Token::LParen) {
                    return self.call(&name);
                }
                match name.as_str() {
                    "true" => Ok(Node::Num(1.0)),
                    "false" => Ok(Node::Num(0.0)),
                    "x" => Ok(Node::Input(0)),
                    "n" => Ok(Node::Count),
                    _ => name
                        .strip_prefix("in")
                        .and_then(|digits| digits.parse::<usize>().ok())
                        .map(Node::Input)
                        .ok_or_else(|| {
                            GateError::expression(format!("unknown identifier '{name}'"))
                        }),
                }
            }
            Some(other) => Err(GateError::expression(format!(
                "unexpected token {other:?}"
            ))),
            None => Err(GateError::expression("unexpected end of expression")),
        }
    }

    fn call(&mut self, name: &str) -> GateResult<Node> {
        let builtin = Builtin::lookup(name)
            .ok_or_else(|| GateError::expression(format!("unknown function '{name}'")))?;
        self.expect(Token::LParen, "'('")?;

        let mut args = Vec::new();
        if self.peek() == Some(&Token::RParen) {
            self.advance();
        } else {
            loop {
                args.push(self.expr()?);
                match self.advance() {
                    Some(Token::Comma) => continue,
                    Some(Token::RParen) => break,
                    _ => return Err(GateError::expression("expected ',' or ')'")),
                }
            }
        }

        if let Some(arity) = builtin.arity() {
            if args.len() != arity {
                return Err(GateError::expression(format!(
                    "{name}() takes {arity} argument(s), got {}",
                    args.len()
                )));
            }
        }
        Ok(Node::Call(builtin, args))
    }
}

fn eval(node: &Node, inputs: &[Real]) -> GateResult<Real> {
    match node {
        Node::Num(v) => Ok(*v),
        Node::Input(i) => inputs.get(*i).copied().ok_or_else(|| {
            GateError::expression(format!(
                "input in{i} not provided ({} available)",
                inputs.len()
            ))
        }),
        Node::Count => Ok(inputs.len() as Real),
        Node::Neg(inner) => Ok(-eval(inner, inputs)?),
        Node::Not(inner) => Ok(from_bool(!truthy(eval(inner, inputs)?))),
        Node::Cond(cond, then, otherwise) => {
            if truthy(eval(cond, inputs)?) {
                eval(then, inputs)
            } else {
                eval(otherwise, inputs)
            }
        }
        Node::Binary(BinOp::And, a, b) => {
            Ok(from_bool(truthy(eval(a, inputs)?) && truthy(eval(b, inputs)?)))
        }
        Node::Binary(BinOp::Or, a, b) => {
            Ok(from_bool(truthy(eval(a, inputs)?) || truthy(eval(b, inputs)?)))
        }
        Node::Binary(op, a, b) => {
            let (l, r) = (eval(a, inputs)?, eval(b, inputs)?);
            Ok(match op {
                BinOp::Add => l + r,
                BinOp::Sub => l - r,
                BinOp::Mul => l * r,
                BinOp::Div => l / r,
                BinOp::Rem => l % r,
                BinOp::Pow => l.powf(r),
                BinOp::Lt => from_bool(l < r),
                BinOp::Le => from_bool(l <= r),
                BinOp::Gt => from_bool(l > r),
                BinOp::Ge => from_bool(l >= r),
                BinOp::Eq => from_bool(l == r),
                BinOp::Ne => from_bool(l != r),
                BinOp::And | BinOp::Or => unreachable!("short-circuit operators handled above"),
            })
        }
        Node::Call(builtin, args) => {
            let values = if args.is_empty() {
                inputs.to_vec()
            } else {
                args.iter()
                    .map(|arg| eval(arg, inputs))
                    .collect::<GateResult<Vec<_>>>()?
            };
            builtin.apply(&values)
        }
    }
}

/// A parsed, ready-to-run custom function.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledExpr {
    source: String,
    root: Node,
}

impl CompiledExpr {
    pub fn compile(source: &str) -> GateResult<Self> {
        if source.len() > MAX_SOURCE_LEN {
            return Err(GateError::expression(format!(
                "expression longer than {MAX_SOURCE_LEN} bytes"
            )));
        }
        if source.trim().is_empty() {
            return Err(GateError::expression("empty expression"));
        }

        let mut parser = Parser {
            tokens: tokenize(source)?,
            pos: 0,
            depth: 0,
        };
        let root = parser.expr()?;
        if let Some(extra) = parser.peek() {
            return Err(GateError::expression(format!(
                "unexpected trailing token {extra:?}"
            )));
        }

        Ok(Self {
            source: source.to_string(),
            root,
        })
    }

    /// Run against the node inputs. Non-finite results are errors.
    pub fn evaluate(&self, inputs: &[Real]) -> GateResult<Real> {
        let value = eval(&self.root, inputs)?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(GateError::expression(format!(
                "'{}' produced non-finite value {value}",
                self.source
            )))
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}
