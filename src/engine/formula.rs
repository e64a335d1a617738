//! Restricted arithmetic formulas over a single variable, `avg`.
//!
//! Grammar (whitespace ignored):
//!
//! ```text
//! expr    := term (("+" | "-") term)*
//! term    := unary (("*" | "/") unary)*
//! unary   := ("+" | "-") unary | power
//! power   := primary (("**" | "^") unary)?
//! primary := NUMBER | "avg" | "(" expr ")"
//! ```
//!
//! Exponentiation is right-associative and binds tighter than a leading
//! minus, so `-avg ** 2` is `-(avg ** 2)`. There are no functions and no
//! identifiers other than `avg`; anything else is rejected while parsing.
//! Nesting beyond [`MAX_DEPTH`] is rejected too.

use std::fmt;

/// The only identifier a formula may reference.
pub const AVG: &str = "avg";

/// Nesting limit for parentheses, signs, exponents and operator chains.
pub const MAX_DEPTH: usize = 64;

/// Formula failure: what went wrong, and in which formula.
#[derive(Debug, Clone, PartialEq)]
pub struct FormulaError {
    pub formula: String,
    pub kind: FormulaErrorKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormulaErrorKind {
    Empty,
    UnexpectedChar { ch: char, offset: usize },
    InvalidNumber(String),
    UnknownIdentifier(String),
    UnexpectedToken { offset: usize },
    UnexpectedEnd,
    UnclosedParen,
    TrailingInput { offset: usize },
    DivisionByZero,
    NonFinite,
    TooDeep,
}

impl fmt::Display for FormulaErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormulaErrorKind::Empty => f.write_str("formula is empty"),
            FormulaErrorKind::UnexpectedChar { ch, offset } => {
                write!(f, "unsupported character '{ch}' at offset {offset}")
            }
            FormulaErrorKind::InvalidNumber(raw) => write!(f, "invalid number '{raw}'"),
            FormulaErrorKind::UnknownIdentifier(name) => {
                write!(f, "unknown identifier '{name}' (only '{AVG}' is allowed)")
            }
            FormulaErrorKind::UnexpectedToken { offset } => {
                write!(f, "unexpected token at offset {offset}")
            }
            FormulaErrorKind::UnexpectedEnd => f.write_str("unexpected end of formula"),
            FormulaErrorKind::UnclosedParen => f.write_str("missing ')'"),
            FormulaErrorKind::TrailingInput { offset } => {
                write!(f, "unexpected trailing input at offset {offset}")
            }
            FormulaErrorKind::DivisionByZero => f.write_str("division by zero"),
            FormulaErrorKind::NonFinite => f.write_str("result is not a finite number"),
            FormulaErrorKind::TooDeep => {
                write!(f, "formula nests deeper than {MAX_DEPTH} levels")
            }
        }
    }
}

impl fmt::Display for FormulaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "formula '{}': {}", self.formula, self.kind)
    }
}

impl std::error::Error for FormulaError {}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Avg,
    Plus,
    Minus,
    Star,
    Slash,
    Pow,
    LParen,
    RParen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Number(f64),
    Avg,
    Negate(Box<Expr>),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

/// A parsed formula, ready to evaluate for any average.
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    source: String,
    expr: Expr,
}

impl Formula {
    pub fn parse(source: &str) -> Result<Self, FormulaError> {
        let fail = |kind| FormulaError {
            formula: source.to_string(),
            kind,
        };
        let tokens = tokenize(source).map_err(fail)?;
        let expr = Parser::new(tokens).parse().map_err(fail)?;
        Ok(Self {
            source: source.to_string(),
            expr,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluate with `avg` bound to `avg`.
    pub fn eval(&self, avg: f64) -> Result<f64, FormulaError> {
        eval(&self.expr, avg).map_err(|kind| FormulaError {
            formula: self.source.clone(),
            kind,
        })
    }
}

/// Parse and evaluate in one step.
pub fn evaluate_formula(source: &str, avg: f64) -> Result<f64, FormulaError> {
    Formula::parse(source)?.eval(avg)
}

fn tokenize(source: &str) -> Result<Vec<(usize, Token)>, FormulaErrorKind> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut idx = 0;
    while idx < bytes.len() {
        let b = bytes[idx];
        let start = idx;
        let token = match b {
            b' ' | b'\t' | b'\r' | b'\n' => {
                idx += 1;
                continue;
            }
            b'+' => Token::Plus,
            b'-' => Token::Minus,
            b'*' if bytes.get(idx + 1) == Some(&b'*') => {
                idx += 1;
                Token::Pow
            }
            b'*' => Token::Star,
            b'/' => Token::Slash,
            b'^' => Token::Pow,
            b'(' => Token::LParen,
            b')' => Token::RParen,
            _ if b.is_ascii_digit() || b == b'.' => {
                idx = scan_number(bytes, idx);
                let raw = &source[start..idx];
                let value = raw
                    .parse::<f64>()
                    .map_err(|_| FormulaErrorKind::InvalidNumber(raw.to_string()))?;
                tokens.push((start, Token::Number(value)));
                continue;
            }
            _ if b.is_ascii_alphabetic() || b == b'_' => {
                while idx < bytes.len() && (bytes[idx].is_ascii_alphanumeric() || bytes[idx] == b'_')
                {
                    idx += 1;
                }
                let name = &source[start..idx];
                if name != AVG {
                    return Err(FormulaErrorKind::UnknownIdentifier(name.to_string()));
                }
                tokens.push((start, Token::Avg));
                continue;
            }
            _ => {
                let ch = source[start..].chars().next().unwrap_or('?');
                return Err(FormulaErrorKind::UnexpectedChar { ch, offset: start });
            }
        };
        tokens.push((start, token));
        idx += 1;
    }
    if tokens.is_empty() {
        return Err(FormulaErrorKind::Empty);
    }
    Ok(tokens)
}

/// End offset of a numeric literal starting at `start` (digits, one dot,
/// optional signed exponent).
fn scan_number(bytes: &[u8], start: usize) -> usize {
    let mut idx = start;
    while idx < bytes.len() && (bytes[idx].is_ascii_digit() || bytes[idx] == b'.') {
        idx += 1;
    }
    if idx < bytes.len() && matches!(bytes[idx], b'e' | b'E') {
        let mut exp = idx + 1;
        if exp < bytes.len() && matches!(bytes[exp], b'+' | b'-') {
            exp += 1;
        }
        if exp < bytes.len() && bytes[exp].is_ascii_digit() {
            while exp < bytes.len() && bytes[exp].is_ascii_digit() {
                exp += 1;
            }
            idx = exp;
        }
    }
    idx
}

struct Parser {
    tokens: Vec<(usize, Token)>,
    index: usize,
    depth: usize,
}

impl Parser {
    fn new(tokens: Vec<(usize, Token)>) -> Self {
        Self {
            tokens,
            index: 0,
            depth: 0,
        }
    }

    /// Bounds the expression tree depth so evaluation cannot exhaust the stack.
    fn descend(&mut self) -> Result<(), FormulaErrorKind> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(FormulaErrorKind::TooDeep);
        }
        Ok(())
    }

    fn parse(mut self) -> Result<Expr, FormulaErrorKind> {
        let expr = self.parse_add_sub()?;
        if let Some((offset, _)) = self.tokens.get(self.index) {
            return Err(FormulaErrorKind::TrailingInput { offset: *offset });
        }
        Ok(expr)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index).map(|(_, token)| token)
    }

    fn consume(&mut self) -> Option<(usize, Token)> {
        let token = self.tokens.get(self.index).cloned();
        if token.is_some() {
            self.index += 1;
        }
        token
    }

    // Each extra operand of a chain deepens the left-leaning tree.
    fn parse_add_sub(&mut self) -> Result<Expr, FormulaErrorKind> {
        let start = self.depth;
        let mut expr = self.parse_mul_div()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Subtract,
                _ => break,
            };
            let _ = self.consume();
            self.descend()?;
            let rhs = self.parse_mul_div()?;
            expr = binary(op, expr, rhs);
        }
        self.depth = start;
        Ok(expr)
    }

    fn parse_mul_div(&mut self) -> Result<Expr, FormulaErrorKind> {
        let start = self.depth;
        let mut expr = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Multiply,
                Some(Token::Slash) => BinaryOp::Divide,
                _ => break,
            };
            let _ = self.consume();
            self.descend()?;
            let rhs = self.parse_unary()?;
            expr = binary(op, expr, rhs);
        }
        self.depth = start;
        Ok(expr)
    }

    // Every nesting path (sign, exponent, parenthesis) passes through here.
    fn parse_unary(&mut self) -> Result<Expr, FormulaErrorKind> {
        let start = self.depth;
        self.descend()?;
        let expr = match self.peek() {
            Some(Token::Minus) => {
                let _ = self.consume();
                Expr::Negate(Box::new(self.parse_unary()?))
            }
            Some(Token::Plus) => {
                let _ = self.consume();
                self.parse_unary()?
            }
            _ => self.parse_power()?,
        };
        self.depth = start;
        Ok(expr)
    }

    fn parse_power(&mut self) -> Result<Expr, FormulaErrorKind> {
        let base = self.parse_primary()?;
        if matches!(self.peek(), Some(Token::Pow)) {
            let _ = self.consume();
            let exponent = self.parse_unary()?;
            return Ok(binary(BinaryOp::Power, base, exponent));
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<Expr, FormulaErrorKind> {
        match self.consume() {
            Some((_, Token::Number(value))) => Ok(Expr::Number(value)),
            Some((_, Token::Avg)) => Ok(Expr::Avg),
            Some((_, Token::LParen)) => {
                let expr = self.parse_add_sub()?;
                match self.consume() {
                    Some((_, Token::RParen)) => Ok(expr),
                    Some((offset, _)) => Err(FormulaErrorKind::UnexpectedToken { offset }),
                    None => Err(FormulaErrorKind::UnclosedParen),
                }
            }
            Some((offset, _)) => Err(FormulaErrorKind::UnexpectedToken { offset }),
            None => Err(FormulaErrorKind::UnexpectedEnd),
        }
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

fn eval(expr: &Expr, avg: f64) -> Result<f64, FormulaErrorKind> {
    let value = match expr {
        Expr::Number(value) => *value,
        Expr::Avg => avg,
        Expr::Negate(inner) => -eval(inner, avg)?,
        Expr::Binary { op, left, right } => {
            let lhs = eval(left, avg)?;
            let rhs = eval(right, avg)?;
            match op {
                BinaryOp::Add => lhs + rhs,
                BinaryOp::Subtract => lhs - rhs,
                BinaryOp::Multiply => lhs * rhs,
                BinaryOp::Divide => {
                    if rhs == 0.0 {
                        return Err(FormulaErrorKind::DivisionByZero);
                    }
                    lhs / rhs
                }
                BinaryOp::Power => {
                    if lhs == 0.0 && rhs < 0.0 {
                        return Err(FormulaErrorKind::DivisionByZero);
                    }
                    lhs.powf(rhs)
                }
            }
        }
    };
    if value.is_finite() {
        Ok(value)
    } else {
        Err(FormulaErrorKind::NonFinite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        let diff = (actual - expected).abs();
        assert!(diff <= 1e-12, "expected {expected}, got {actual}");
    }

    fn kind(source: &str, avg: f64) -> FormulaErrorKind {
        evaluate_formula(source, avg).expect_err("should fail").kind
    }

    #[test]
    fn evaluates_linear_formula() {
        assert_close(evaluate_formula("avg * 0.1", 50.0).unwrap(), 5.0);
        assert_close(evaluate_formula("0.02 * avg + 0.5", 100.0).unwrap(), 2.5);
    }

    #[test]
    fn honors_precedence_and_parentheses() {
        assert_close(evaluate_formula("1 + 2 * 3", 0.0).unwrap(), 7.0);
        assert_close(evaluate_formula("(1 + 2) * 3", 0.0).unwrap(), 9.0);
        assert_close(evaluate_formula("avg - 1 - 1", 5.0).unwrap(), 3.0);
        assert_close(evaluate_formula("12 / 2 / 3", 0.0).unwrap(), 2.0);
    }

    #[test]
    fn power_is_right_associative_and_binds_tighter_than_minus() {
        assert_close(evaluate_formula("2 ** 3 ** 2", 0.0).unwrap(), 512.0);
        assert_close(evaluate_formula("-avg ** 2", 3.0).unwrap(), -9.0);
        assert_close(evaluate_formula("avg ^ 0.5", 16.0).unwrap(), 4.0);
        assert_close(evaluate_formula("2 ** -1", 0.0).unwrap(), 0.5);
    }

    #[test]
    fn parses_scientific_literals() {
        assert_close(evaluate_formula("1.5e-2 * avg", 100.0).unwrap(), 1.5);
        assert_close(evaluate_formula(".5 * avg", 4.0).unwrap(), 2.0);
        assert_close(evaluate_formula("2E+1", 0.0).unwrap(), 20.0);
    }

    #[test]
    fn unary_signs() {
        assert_close(evaluate_formula("--avg", 2.0).unwrap(), 2.0);
        assert_close(evaluate_formula("+avg * -1", 2.0).unwrap(), -2.0);
    }

    #[test]
    fn parsed_formula_is_reusable() {
        let formula = Formula::parse("0.1 * avg").expect("parse");
        assert_eq!(formula.source(), "0.1 * avg");
        assert_close(formula.eval(10.0).unwrap(), 1.0);
        assert_close(formula.eval(20.0).unwrap(), 2.0);
    }

    #[test]
    fn rejects_unknown_identifiers() {
        assert_eq!(
            kind("avg * unknown_var", 1.0),
            FormulaErrorKind::UnknownIdentifier("unknown_var".to_string())
        );
        assert_eq!(
            kind("__import__", 1.0),
            FormulaErrorKind::UnknownIdentifier("__import__".to_string())
        );
        assert_eq!(
            kind("abs(avg)", 1.0),
            FormulaErrorKind::UnknownIdentifier("abs".to_string())
        );
        assert_eq!(
            kind("Avg", 1.0),
            FormulaErrorKind::UnknownIdentifier("Avg".to_string())
        );
    }

    #[test]
    fn rejects_malformed_expressions() {
        assert_eq!(kind("", 1.0), FormulaErrorKind::Empty);
        assert_eq!(kind("   ", 1.0), FormulaErrorKind::Empty);
        assert_eq!(kind("avg *", 1.0), FormulaErrorKind::UnexpectedEnd);
        assert_eq!(kind("(avg + 1", 1.0), FormulaErrorKind::UnclosedParen);
        assert_eq!(kind("avg 2", 1.0), FormulaErrorKind::TrailingInput { offset: 4 });
        assert_eq!(kind(")", 1.0), FormulaErrorKind::UnexpectedToken { offset: 0 });
        assert_eq!(
            kind("avg; 1", 1.0),
            FormulaErrorKind::UnexpectedChar { ch: ';', offset: 3 }
        );
        assert_eq!(
            kind("1.2.3", 1.0),
            FormulaErrorKind::InvalidNumber("1.2.3".to_string())
        );
    }

    #[test]
    fn rejects_division_by_zero_and_non_finite() {
        assert_eq!(kind("1 / avg", 0.0), FormulaErrorKind::DivisionByZero);
        assert_eq!(kind("avg ** -1", 0.0), FormulaErrorKind::DivisionByZero);
        assert_eq!(kind("avg ** 0.5", -4.0), FormulaErrorKind::NonFinite);
        assert_eq!(kind("10 ** 400", 0.0), FormulaErrorKind::NonFinite);
    }

    #[test]
    fn error_message_names_formula_and_identifier() {
        let err = evaluate_formula("avg * unknown_var", 1.0).expect_err("unknown");
        let message = err.to_string();
        assert!(message.contains("avg * unknown_var"));
        assert!(message.contains("'unknown_var'"));
    }

    #[test]
    fn deep_nesting_is_an_error_not_a_crash() {
        let parens = format!("{}avg{}", "(".repeat(10_000), ")".repeat(10_000));
        assert_eq!(kind(&parens, 1.0), FormulaErrorKind::TooDeep);
        let signs = format!("{}avg", "-".repeat(10_000));
        assert_eq!(kind(&signs, 1.0), FormulaErrorKind::TooDeep);
        let powers = format!("{}2", "2 ** ".repeat(10_000));
        assert_eq!(kind(&powers, 1.0), FormulaErrorKind::TooDeep);
        let chain = format!("{}1", "avg + ".repeat(10_000));
        assert_eq!(kind(&chain, 1.0), FormulaErrorKind::TooDeep);
    }

    #[test]
    fn moderate_nesting_still_evaluates() {
        let parens = format!("{}avg * 2{}", "(".repeat(40), ")".repeat(40));
        assert_close(evaluate_formula(&parens, 3.0).expect("nested"), 6.0);
        let chain = format!("{}1", "1 + ".repeat(20));
        assert_close(evaluate_formula(&chain, 0.0).expect("chain"), 21.0);
    }
}
