//! Recursive descent parser for conditional expressions
//!
//! Precedence, lowest first: `||`, `&&`, comparisons, `!`, primaries.

use anyhow::{anyhow, Result};

use crate::bundle::BundlePath;
use crate::expression::ast::Expression;
use crate::expression::tokenizer::{tokenize, Token};
use crate::expression::validator::{ExpressionIssue, MAX_DEPTH};
use serde_json::Value;

/// Parse a binary operator level (OR, AND)
///
/// Finds every operator position at the current nesting level, splits the token
/// stream, parses each part, and folds the parts left to right. The fold nests
/// one level per operand, so long chains count against `MAX_DEPTH`.
fn parse_binary_operator<F, C>(
    tokens: &[Token],
    op: &Token,
    depth: usize,
    parse_next: F,
    combine: C,
) -> Result<Expression>
where
    F: Fn(&[Token]) -> Result<Expression>,
    C: Fn(Expression, Expression) -> Expression,
{
    let positions = find_operators(tokens, op);

    if positions.is_empty() {
        return parse_next(tokens);
    }
    if depth + positions.len() > MAX_DEPTH {
        return Err(ExpressionIssue::too_deep().into());
    }

    let mut parts = Vec::new();
    let mut start = 0;
    for pos in positions {
        if pos == start {
            return Err(anyhow!("Missing operand before {:?}", op));
        }
        parts.push(parse_next(&tokens[start..pos])?);
        start = pos + 1;
    }
    if start >= tokens.len() {
        return Err(anyhow!("Missing operand after {:?}", op));
    }
    parts.push(parse_next(&tokens[start..])?);

    parts
        .into_iter()
        .reduce(combine)
        .ok_or_else(|| anyhow!("Empty expression"))
}

/// Positions of `op` outside any parentheses
fn find_operators(tokens: &[Token], op: &Token) -> Vec<usize> {
    let mut positions = Vec::new();
    let mut paren_depth = 0i32;

    for (i, token) in tokens.iter().enumerate() {
        match token {
            Token::LeftParen => paren_depth += 1,
            Token::RightParen => paren_depth -= 1,
            _ if paren_depth == 0 && token == op => positions.push(i),
            _ => {}
        }
    }

    positions
}

/// Index of the right paren matching the left paren at `start`
fn find_matching_paren(tokens: &[Token], start: usize) -> Result<usize> {
    if start >= tokens.len() || tokens[start] != Token::LeftParen {
        return Err(anyhow!("Expected left paren at position {}", start));
    }

    let mut depth = 0;
    for (i, token) in tokens.iter().enumerate().skip(start) {
        match token {
            Token::LeftParen => depth += 1,
            Token::RightParen => {
                depth -= 1;
                if depth == 0 {
                    return Ok(i);
                }
            }
            _ => {}
        }
    }

    Err(anyhow!("Mismatched parentheses"))
}

fn is_comparison(token: &Token) -> bool {
    matches!(
        token,
        Token::Equal
            | Token::NotEqual
            | Token::Greater
            | Token::Less
            | Token::GreaterEqual
            | Token::LessEqual
    )
}

#[derive(Debug, Default, Clone)]
pub struct ExpressionParser;

impl ExpressionParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a conditional expression
    pub fn parse(&self, expr: &str) -> Result<Expression> {
        let tokens = tokenize(expr)?;
        if tokens.is_empty() {
            return Err(anyhow!("Empty expression"));
        }
        self.parse_or(&tokens, 0)
    }

    fn parse_or(&self, tokens: &[Token], depth: usize) -> Result<Expression> {
        if depth > MAX_DEPTH {
            return Err(ExpressionIssue::too_deep().into());
        }
        parse_binary_operator(
            tokens,
            &Token::Or,
            depth,
            |tokens| self.parse_and(tokens, depth),
            |left, right| Expression::Or(Box::new(left), Box::new(right)),
        )
    }

    fn parse_and(&self, tokens: &[Token], depth: usize) -> Result<Expression> {
        parse_binary_operator(
            tokens,
            &Token::And,
            depth,
            |tokens| self.parse_comparison(tokens, depth),
            |left, right| Expression::And(Box::new(left), Box::new(right)),
        )
    }

    fn parse_comparison(&self, tokens: &[Token], depth: usize) -> Result<Expression> {
        if tokens.is_empty() {
            return Err(anyhow!("Empty comparison expression"));
        }

        let mut op_pos = None;
        let mut paren_depth = 0i32;
        for (i, token) in tokens.iter().enumerate() {
            match token {
                Token::LeftParen => paren_depth += 1,
                Token::RightParen => paren_depth -= 1,
                t if paren_depth == 0 && is_comparison(t) => {
                    if op_pos.is_some() {
                        return Err(anyhow!("Chained comparisons need parentheses"));
                    }
                    op_pos = Some(i);
                }
                _ => {}
            }
        }

        let Some(pos) = op_pos else {
            return self.parse_unary(tokens, depth);
        };

        let left_tokens = &tokens[..pos];
        let right_tokens = &tokens[pos + 1..];
        if left_tokens.is_empty() || right_tokens.is_empty() {
            return Err(anyhow!("Invalid comparison expression"));
        }

        let left = Box::new(self.parse_unary(left_tokens, depth + 1)?);
        let right = Box::new(self.parse_unary(right_tokens, depth + 1)?);

        Ok(match &tokens[pos] {
            Token::Equal => Expression::Equal(left, right),
            Token::NotEqual => Expression::NotEqual(left, right),
            Token::Greater => Expression::GreaterThan(left, right),
            Token::Less => Expression::LessThan(left, right),
            Token::GreaterEqual => Expression::GreaterEqual(left, right),
            Token::LessEqual => Expression::LessEqual(left, right),
            other => return Err(anyhow!("Unexpected operator: {:?}", other)),
        })
    }

    fn parse_unary(&self, tokens: &[Token], depth: usize) -> Result<Expression> {
        if depth > MAX_DEPTH {
            return Err(ExpressionIssue::too_deep().into());
        }
        match tokens.first() {
            None => Err(anyhow!("Expected expression")),
            Some(Token::Not) => Ok(Expression::Not(Box::new(
                self.parse_unary(&tokens[1..], depth + 1)?,
            ))),
            Some(Token::LeftParen) => {
                let end = find_matching_paren(tokens, 0)?;
                if end + 1 != tokens.len() {
                    return Err(anyhow!("Unexpected tokens after ')'"));
                }
                if end == 1 {
                    return Err(anyhow!("Empty parentheses"));
                }
                self.parse_or(&tokens[1..end], depth + 1)
            }
            Some(_) => self.parse_primary(tokens, depth),
        }
    }

    /// Literals, paths and helper calls
    fn parse_primary(&self, tokens: &[Token], depth: usize) -> Result<Expression> {
        let expr = match &tokens[0] {
            Token::Number(n) => Expression::Literal(
                serde_json::Number::from_f64(*n)
                    .map(Value::Number)
                    .unwrap_or(Value::Null),
            ),
            Token::String(s) => Expression::Literal(Value::String(s.clone())),
            Token::Boolean(b) => Expression::Literal(Value::Bool(*b)),
            Token::Null | Token::Undefined => Expression::Literal(Value::Null),
            Token::Identifier(name) if tokens.get(1) == Some(&Token::LeftParen) => {
                let end = find_matching_paren(tokens, 1)?;
                if end + 1 != tokens.len() {
                    return Err(anyhow!("Unexpected tokens after call to '{}'", name));
                }
                return self.parse_call(name, &tokens[2..end], depth + 1);
            }
            Token::Identifier(name) => Expression::Path(self.parse_path(name)?),
            other => return Err(anyhow!("Unexpected token: {:?}", other)),
        };

        if tokens.len() > 1 {
            return Err(anyhow!("Unexpected token: {:?}", tokens[1]));
        }
        Ok(expr)
    }

    fn parse_call(&self, name: &str, arg_tokens: &[Token], depth: usize) -> Result<Expression> {
        let mut args = Vec::new();

        // Method syntax: the receiver becomes the first argument
        let function = match name.rsplit_once('.') {
            Some((receiver, method)) if !method.is_empty() => {
                args.push(Expression::Path(self.parse_path(receiver)?));
                method.to_string()
            }
            _ => name.to_string(),
        };

        if !arg_tokens.is_empty() {
            let commas = find_operators(arg_tokens, &Token::Comma);
            let mut start = 0;
            for pos in commas.into_iter().chain(std::iter::once(arg_tokens.len())) {
                if pos == start {
                    return Err(anyhow!("Empty argument in call to '{}'", function));
                }
                args.push(self.parse_or(&arg_tokens[start..pos], depth)?);
                start = pos + 1;
            }
        }

        Ok(Expression::Call(function, args))
    }

    fn parse_path(&self, path: &str) -> Result<BundlePath> {
        BundlePath::parse(path).map_err(|e| anyhow!("Invalid path '{}': {}", path, e))
    }
}
