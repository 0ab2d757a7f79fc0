//! # TDB expressions
//!
//! Temperature-dependent expressions as they appear in FUNCTION and PARAMETER
//! commands of a thermodynamic database, e.g.
//! `-7770.458+130.485235*T-24.112392*T*LN(T)+52478*T**(-1)` or `+GHSERCU#+12964.736`.
//!
//! Grammar (precedence from low to high):
//! ```text
//! expr  := term (('+' | '-') term)*
//! term  := unary (('*' | '/') unary)*
//! unary := ('+' | '-') unary | power
//! power := atom ('**' unary)?
//! atom  := number | 'T' | 'P' | name | FN '(' expr ')' | '(' expr ')'
//! ```
//! `FN` is one of `LN`, `LOG` (natural logarithm) or `EXP`. Any other bare name is a
//! reference to a FUNCTION, resolved when the expression is evaluated.
use std::fmt;

/// parsed expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum TdbExpr {
    Const(f64),
    T,
    P,
    /// reference to a named FUNCTION
    Ref(String),
    Ln(Box<TdbExpr>),
    Exp(Box<TdbExpr>),
    Neg(Box<TdbExpr>),
    Add(Box<TdbExpr>, Box<TdbExpr>),
    Sub(Box<TdbExpr>, Box<TdbExpr>),
    Mul(Box<TdbExpr>, Box<TdbExpr>),
    Div(Box<TdbExpr>, Box<TdbExpr>),
    Pow(Box<TdbExpr>, Box<TdbExpr>),
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Power,
    LParen,
    RParen,
}

/// error produced while parsing an expression; carries a human readable reason
#[derive(Debug, Clone, PartialEq)]
pub struct ExprError(pub String);

impl fmt::Display for ExprError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ExprError {}

fn tokenize(text: &str) -> Result<Vec<Token>, ExprError> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' => {
                if i + 1 < chars.len() && chars[i + 1] == '*' {
                    tokens.push(Token::Power);
                    i += 2;
                } else {
                    tokens.push(Token::Star);
                    i += 1;
                }
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                // exponent part: E, optional sign, digits
                if i < chars.len() && (chars[i] == 'E' || chars[i] == 'e') {
                    let mut j = i + 1;
                    if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                        j += 1;
                    }
                    if j < chars.len() && chars[j].is_ascii_digit() {
                        while j < chars.len() && chars[j].is_ascii_digit() {
                            j += 1;
                        }
                        i = j;
                    }
                }
                let literal: String = chars[start..i].iter().collect();
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| ExprError(format!("invalid number '{}'", literal)))?;
                tokens.push(Token::Num(value));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let name: String = chars[start..i].iter().collect();
                // function references may carry a trailing '#'
                if i < chars.len() && chars[i] == '#' {
                    i += 1;
                }
                tokens.push(Token::Ident(name.to_uppercase()));
            }
            other => return Err(ExprError(format!("unexpected character '{}'", other))),
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expect(&mut self, expected: Token) -> Result<(), ExprError> {
        match self.next() {
            Some(ref t) if *t == expected => Ok(()),
            Some(t) => Err(ExprError(format!("expected {:?}, found {:?}", expected, t))),
            None => Err(ExprError(format!("expected {:?}, found end of input", expected))),
        }
    }

    fn expr(&mut self) -> Result<TdbExpr, ExprError> {
        let mut lhs = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.pos += 1;
                    let rhs = self.term()?;
                    lhs = TdbExpr::Add(Box::new(lhs), Box::new(rhs));
                }
                Some(Token::Minus) => {
                    self.pos += 1;
                    let rhs = self.term()?;
                    lhs = TdbExpr::Sub(Box::new(lhs), Box::new(rhs));
                }
                _ => return Ok(lhs),
            }
        }
    }

    fn term(&mut self) -> Result<TdbExpr, ExprError> {
        let mut lhs = self.unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.pos += 1;
                    let rhs = self.unary()?;
                    lhs = TdbExpr::Mul(Box::new(lhs), Box::new(rhs));
                }
                Some(Token::Slash) => {
                    self.pos += 1;
                    let rhs = self.unary()?;
                    lhs = TdbExpr::Div(Box::new(lhs), Box::new(rhs));
                }
                _ => return Ok(lhs),
            }
        }
    }

    fn unary(&mut self) -> Result<TdbExpr, ExprError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                Ok(TdbExpr::Neg(Box::new(self.unary()?)))
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<TdbExpr, ExprError> {
        let base = self.atom()?;
        if let Some(Token::Power) = self.peek() {
            self.pos += 1;
            let exponent = self.unary()?;
            return Ok(TdbExpr::Pow(Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<TdbExpr, ExprError> {
        match self.next() {
            Some(Token::Num(v)) => Ok(TdbExpr::Const(v)),
            Some(Token::LParen) => {
                let inner = self.expr()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Some(Token::Ident(name)) => {
                if let Some(Token::LParen) = self.peek() {
                    self.pos += 1;
                    let arg = self.expr()?;
                    self.expect(Token::RParen)?;
                    return match name.as_str() {
                        "LN" | "LOG" => Ok(TdbExpr::Ln(Box::new(arg))),
                        "EXP" => Ok(TdbExpr::Exp(Box::new(arg))),
                        _ => Err(ExprError(format!("unknown function '{}'", name))),
                    };
                }
                match name.as_str() {
                    "T" => Ok(TdbExpr::T),
                    "P" => Ok(TdbExpr::P),
                    _ => Ok(TdbExpr::Ref(name)),
                }
            }
            Some(t) => Err(ExprError(format!("unexpected token {:?}", t))),
            None => Err(ExprError("unexpected end of expression".to_string())),
        }
    }
}

impl TdbExpr {
    /// parses one expression (a single temperature segment, without the range limits)
    pub fn parse(text: &str) -> Result<TdbExpr, ExprError> {
        let tokens = tokenize(text)?;
        if tokens.is_empty() {
            return Err(ExprError("empty expression".to_string()));
        }
        let mut parser = Parser { tokens, pos: 0 };
        let expr = parser.expr()?;
        if parser.pos < parser.tokens.len() {
            return Err(ExprError(format!(
                "trailing input after expression: {:?}",
                &parser.tokens[parser.pos..]
            )));
        }
        Ok(expr)
    }

    /// evaluates the expression at (T, P); `resolve` supplies the values of referenced functions
    pub fn eval<E>(
        &self,
        T: f64,
        P: f64,
        resolve: &mut dyn FnMut(&str) -> Result<f64, E>,
    ) -> Result<f64, E> {
        let value = match self {
            TdbExpr::Const(v) => *v,
            TdbExpr::T => T,
            TdbExpr::P => P,
            TdbExpr::Ref(name) => resolve(name)?,
            TdbExpr::Ln(a) => a.eval(T, P, resolve)?.ln(),
            TdbExpr::Exp(a) => a.eval(T, P, resolve)?.exp(),
            TdbExpr::Neg(a) => -a.eval(T, P, resolve)?,
            TdbExpr::Add(a, b) => a.eval(T, P, resolve)? + b.eval(T, P, resolve)?,
            TdbExpr::Sub(a, b) => a.eval(T, P, resolve)? - b.eval(T, P, resolve)?,
            TdbExpr::Mul(a, b) => a.eval(T, P, resolve)? * b.eval(T, P, resolve)?,
            TdbExpr::Div(a, b) => a.eval(T, P, resolve)? / b.eval(T, P, resolve)?,
            TdbExpr::Pow(a, b) => {
                let base = a.eval(T, P, resolve)?;
                let exponent = b.eval(T, P, resolve)?;
                if exponent.fract() == 0.0 && exponent.abs() < i32::MAX as f64 {
                    base.powi(exponent as i32)
                } else {
                    base.powf(exponent)
                }
            }
        };
        Ok(value)
    }

    /// names of all functions referenced by the expression
    pub fn references(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references(&self, out: &mut Vec<String>) {
        match self {
            TdbExpr::Ref(name) => {
                if !out.contains(name) {
                    out.push(name.clone());
                }
            }
            TdbExpr::Ln(a) | TdbExpr::Exp(a) | TdbExpr::Neg(a) => a.collect_references(out),
            TdbExpr::Add(a, b)
            | TdbExpr::Sub(a, b)
            | TdbExpr::Mul(a, b)
            | TdbExpr::Div(a, b)
            | TdbExpr::Pow(a, b) => {
                a.collect_references(out);
                b.collect_references(out);
            }
            TdbExpr::Const(_) | TdbExpr::T | TdbExpr::P => {}
        }
    }
}

/// one temperature segment of a piecewise expression
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub T_low: f64,
    pub T_high: f64,
    pub expr: TdbExpr,
}

/// temperature-piecewise expression: `T_low expr; T_high Y expr; ... T_high N ref`
#[derive(Debug, Clone, PartialEq)]
pub struct Piecewise {
    pub segments: Vec<Segment>,
    /// reference tag after the closing `N`, if any
    pub reference: Option<String>,
}

impl Piecewise {
    /// parses the body that follows a FUNCTION name or a PARAMETER header
    pub fn parse(body: &str) -> Result<Piecewise, ExprError> {
        let parts: Vec<&str> = body.split(';').collect();
        if parts.len() < 2 {
            return Err(ExprError(format!(
                "missing ';' and upper temperature limit in '{}'",
                body.trim()
            )));
        }
        let (low, first_expr) = split_leading_number(parts[0])?;
        let mut T_low = low;
        let mut current = TdbExpr::parse(first_expr)?;
        let mut segments = Vec::new();
        let mut reference = None;
        for (idx, part) in parts.iter().enumerate().skip(1) {
            let (T_high, rest) = split_leading_number(part)?;
            segments.push(Segment {
                T_low,
                T_high,
                expr: current.clone(),
            });
            let rest = rest.trim();
            let (flag, tail) = match rest.split_once(char::is_whitespace) {
                Some((flag, tail)) => (flag, tail.trim()),
                None => (rest, ""),
            };
            match flag {
                "Y" => {
                    if idx + 1 == parts.len() {
                        return Err(ExprError(
                            "'Y' continuation without a following segment".to_string(),
                        ));
                    }
                    current = TdbExpr::parse(tail)?;
                    T_low = T_high;
                }
                "N" | "" => {
                    if idx + 1 != parts.len() {
                        return Err(ExprError(
                            "segments found after the closing 'N'".to_string(),
                        ));
                    }
                    if !tail.is_empty() {
                        reference = Some(tail.to_string());
                    }
                }
                other => {
                    return Err(ExprError(format!(
                        "expected 'Y' or 'N' after upper limit, found '{}'",
                        other
                    )));
                }
            }
        }
        Ok(Piecewise {
            segments,
            reference,
        })
    }

    /// index of the segment valid at T: `[T_low, T_high)`, the last segment is closed
    pub fn segment_at(&self, T: f64) -> Option<&Segment> {
        let last = self.segments.len().checked_sub(1)?;
        self.segments.iter().enumerate().find_map(|(i, s)| {
            let inside = T >= s.T_low && (T < s.T_high || (i == last && T <= s.T_high));
            inside.then_some(s)
        })
    }

    /// evaluates at (T, P); NaN outside every temperature range
    pub fn eval<E>(
        &self,
        T: f64,
        P: f64,
        resolve: &mut dyn FnMut(&str) -> Result<f64, E>,
    ) -> Result<f64, E> {
        match self.segment_at(T) {
            Some(segment) => segment.expr.eval(T, P, resolve),
            None => Ok(f64::NAN),
        }
    }

    pub fn references(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for s in &self.segments {
            for r in s.expr.references() {
                if !out.contains(&r) {
                    out.push(r);
                }
            }
        }
        out
    }
}

fn split_leading_number(text: &str) -> Result<(f64, &str), ExprError> {
    let text = text.trim();
    let (head, tail) = match text.split_once(char::is_whitespace) {
        Some((head, tail)) => (head, tail),
        None => (text, ""),
    };
    let value = head
        .parse::<f64>()
        .map_err(|_| ExprError(format!("expected temperature limit, found '{}'", head)))?;
    Ok((value, tail))
}
