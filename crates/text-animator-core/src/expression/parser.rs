//! Lexer and recursive-descent parser for amount expressions.
//!
//! Precedence, loosest first: `?:`, `||`, `&&`, `== !=`, `< <= > >=`,
//! `+ -`, `* / %`, unary `- + !`.

use super::ast::{BinaryOp, Expr, Function, UnaryOp, Variable};
use crate::error::ExpressionError;

/// Bounds that keep parsing and evaluation cheap enough to run per unit per
/// frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpressionLimits {
    pub max_source_len: usize,
    pub max_depth: usize,
    pub max_nodes: usize,
    /// Node visits allowed per evaluation.
    pub step_budget: usize,
}

impl Default for ExpressionLimits {
    fn default() -> Self {
        Self {
            max_source_len: 4096,
            max_depth: 64,
            max_nodes: 1024,
            step_budget: 4096,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Op(&'static str),
    End,
}

const TWO_CHAR_OPS: [&str; 6] = ["<=", ">=", "==", "!=", "&&", "||"];
const ONE_CHAR_OPS: [&str; 13] = ["+", "-", "*", "/", "%", "<", ">", "!", "?", ":", "(", ")", ","];

fn tokenize(src: &str) -> Result<Vec<(Token, usize)>, ExpressionError> {
    let bytes = src.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let c = bytes[pos];
        if c.is_ascii_whitespace() {
            pos += 1;
            continue;
        }

        let start = pos;
        if c.is_ascii_digit() || (c == b'.' && bytes.get(pos + 1).is_some_and(u8::is_ascii_digit)) {
            while pos < bytes.len() && (bytes[pos].is_ascii_digit() || bytes[pos] == b'.') {
                pos += 1;
            }
            if pos < bytes.len() && (bytes[pos] == b'e' || bytes[pos] == b'E') {
                let mut exp = pos + 1;
                if exp < bytes.len() && (bytes[exp] == b'+' || bytes[exp] == b'-') {
                    exp += 1;
                }
                if exp < bytes.len() && bytes[exp].is_ascii_digit() {
                    pos = exp;
                    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                        pos += 1;
                    }
                }
            }
            let text = &src[start..pos];
            let value = text
                .parse::<f64>()
                .map_err(|_| ExpressionError::parse(start, format!("invalid number `{text}`")))?;
            tokens.push((Token::Number(value), start));
            continue;
        }

        if c.is_ascii_alphabetic() || c == b'_' {
            while pos < bytes.len() {
                let b = bytes[pos];
                let dotted = b == b'.' && bytes.get(pos + 1).is_some_and(|n| n.is_ascii_alphabetic());
                if b.is_ascii_alphanumeric() || b == b'_' || dotted {
                    pos += 1;
                } else {
                    break;
                }
            }
            tokens.push((Token::Ident(src[start..pos].to_string()), start));
            continue;
        }

        let rest = &src[pos..];
        if let Some(op) = TWO_CHAR_OPS.iter().copied().find(|op| rest.starts_with(op)) {
            tokens.push((Token::Op(op), start));
            pos += 2;
            continue;
        }
        if let Some(op) = ONE_CHAR_OPS.iter().copied().find(|op| rest.starts_with(op)) {
            tokens.push((Token::Op(op), start));
            pos += 1;
            continue;
        }

        let ch = rest.chars().next().unwrap_or('?');
        return Err(ExpressionError::parse(start, format!("unexpected character `{ch}`")));
    }

    tokens.push((Token::End, src.len()));
    Ok(tokens)
}

struct Parser<'a> {
    tokens: Vec<(Token, usize)>,
    pos: usize,
    depth: usize,
    nodes: usize,
    limits: &'a ExpressionLimits,
}

impl Parser<'_> {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)].0
    }

    fn offset(&self) -> usize {
        self.tokens[self.pos.min(self.tokens.len() - 1)].1
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, op: &str) -> bool {
        if matches!(self.peek(), Token::Op(o) if *o == op) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, op: &str) -> Result<(), ExpressionError> {
        if self.eat(op) {
            Ok(())
        } else {
            Err(self.error(format!("expected `{op}`")))
        }
    }

    fn error(&self, message: impl Into<String>) -> ExpressionError {
        ExpressionError::parse(self.offset(), message)
    }

    fn node(&mut self, expr: Expr) -> Result<Expr, ExpressionError> {
        self.nodes += 1;
        if self.nodes > self.limits.max_nodes {
            return Err(self.error(format!(
                "expression is larger than {} nodes",
                self.limits.max_nodes
            )));
        }
        Ok(expr)
    }

    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ExpressionError>,
    ) -> Result<T, ExpressionError> {
        self.depth += 1;
        if self.depth > self.limits.max_depth {
            return Err(self.error(format!(
                "expression nests deeper than {} levels",
                self.limits.max_depth
            )));
        }
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn expression(&mut self) -> Result<Expr, ExpressionError> {
        self.nested(Self::ternary)
    }

    fn ternary(&mut self) -> Result<Expr, ExpressionError> {
        let cond = self.binary(0)?;
        if !self.eat("?") {
            return Ok(cond);
        }
        let then = self.expression()?;
        self.expect(":")?;
        let otherwise = self.expression()?;
        self.node(Expr::Ternary(
            Box::new(cond),
            Box::new(then),
            Box::new(otherwise),
        ))
    }

    /// Left-associative binary levels, `level` 0 being `||`.
    fn binary(&mut self, level: usize) -> Result<Expr, ExpressionError> {
        const LEVELS: [&[(&str, BinaryOp)]; 6] = [
            &[("||", BinaryOp::Or)],
            &[("&&", BinaryOp::And)],
            &[("==", BinaryOp::Eq), ("!=", BinaryOp::Ne)],
            &[
                ("<=", BinaryOp::Le),
                (">=", BinaryOp::Ge),
                ("<", BinaryOp::Lt),
                (">", BinaryOp::Gt),
            ],
            &[("+", BinaryOp::Add), ("-", BinaryOp::Sub)],
            &[("*", BinaryOp::Mul), ("/", BinaryOp::Div), ("%", BinaryOp::Rem)],
        ];

        if level == LEVELS.len() {
            return self.unary();
        }

        let mut lhs = self.binary(level + 1)?;
        loop {
            let Some(op) = LEVELS[level]
                .iter()
                .find(|(sym, _)| matches!(self.peek(), Token::Op(o) if o == sym))
                .map(|(_, op)| *op)
            else {
                return Ok(lhs);
            };
            self.advance();
            let rhs = self.binary(level + 1)?;
            lhs = self.node(Expr::Binary(op, Box::new(lhs), Box::new(rhs)))?;
        }
    }

    fn unary(&mut self) -> Result<Expr, ExpressionError> {
        let op = if self.eat("-") {
            UnaryOp::Neg
        } else if self.eat("+") {
            UnaryOp::Plus
        } else if self.eat("!") {
            UnaryOp::Not
        } else {
            return self.primary();
        };
        let inner = self.nested(Self::unary)?;
        self.node(Expr::Unary(op, Box::new(inner)))
    }

    fn primary(&mut self) -> Result<Expr, ExpressionError> {
        let offset = self.offset();
        match self.advance() {
            Token::Number(n) => self.node(Expr::Number(n)),
            Token::Op("(") => {
                let inner = self.expression()?;
                self.expect(")")?;
                Ok(inner)
            }
            Token::Ident(name) => {
                if self.eat("(") {
                    let func = Function::from_name(&name).ok_or_else(|| {
                        ExpressionError::parse(offset, format!("unknown function `{name}`"))
                    })?;
                    let mut args = Vec::with_capacity(func.arity());
                    if !self.eat(")") {
                        loop {
                            args.push(self.expression()?);
                            if self.eat(")") {
                                break;
                            }
                            self.expect(",")?;
                        }
                    }
                    if args.len() != func.arity() {
                        return Err(ExpressionError::parse(
                            offset,
                            format!(
                                "`{name}` takes {} argument(s), got {}",
                                func.arity(),
                                args.len()
                            ),
                        ));
                    }
                    self.node(Expr::Call(func, args))
                } else {
                    let var = Variable::from_name(&name).ok_or_else(|| {
                        ExpressionError::parse(offset, format!("unknown variable `{name}`"))
                    })?;
                    self.node(Expr::Var(var))
                }
            }
            Token::End => Err(ExpressionError::parse(offset, "unexpected end of expression")),
            Token::Op(op) => Err(ExpressionError::parse(offset, format!("unexpected `{op}`"))),
        }
    }
}

/// Parses `src` into an AST, returning it with its node count.
pub fn parse(src: &str, limits: &ExpressionLimits) -> Result<(Expr, usize), ExpressionError> {
    if src.len() > limits.max_source_len {
        return Err(ExpressionError::parse(
            limits.max_source_len,
            format!("expression is longer than {} bytes", limits.max_source_len),
        ));
    }

    let mut parser = Parser {
        tokens: tokenize(src)?,
        pos: 0,
        depth: 0,
        nodes: 0,
        limits,
    };
    let expr = parser.expression()?;
    if *parser.peek() != Token::End {
        return Err(parser.error("unexpected trailing input"));
    }
    Ok((expr, parser.nodes))
}
