//! Lexical analysis for conditional expressions
//!
//! Converts JavaScript-like predicate strings into tokens. Pure, no side effects.
//!
//! - **`tokenize()`**: main loop over characters
//! - **`parse_operator()`**: operators with lookahead (`===`, `!==`, `>=`, `&&`, ...)
//! - **`parse_string()`**: quoted literals with backslash escapes
//! - **`parse_number()`**: numeric literals
//! - **`parse_identifier()`**: paths such as `draftData.mother.address[0]`

use anyhow::{anyhow, Result};
use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    Number(f64),
    String(String),
    Boolean(bool),
    Null,
    Undefined,
    Identifier(String),

    // Operators
    Equal,
    NotEqual,
    Greater,
    Less,
    GreaterEqual,
    LessEqual,
    And,
    Or,
    Not,

    // Punctuation
    LeftParen,
    RightParen,
    Comma,
}

/// Parse operator tokens (`!`, `!=`, `!==`, `==`, `===`, `>`, `>=`, `<`, `<=`, `&&`, `||`)
fn parse_operator(ch: char, chars: &mut Peekable<Chars>) -> Result<Token> {
    chars.next();
    let token = match ch {
        '!' => {
            if chars.peek() == Some(&'=') {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                }
                Token::NotEqual
            } else {
                Token::Not
            }
        }
        '=' => {
            if chars.peek() != Some(&'=') {
                return Err(anyhow!("Assignment is not allowed, use == or ==="));
            }
            chars.next();
            if chars.peek() == Some(&'=') {
                chars.next();
            }
            Token::Equal
        }
        '>' => {
            if chars.peek() == Some(&'=') {
                chars.next();
                Token::GreaterEqual
            } else {
                Token::Greater
            }
        }
        '<' => {
            if chars.peek() == Some(&'=') {
                chars.next();
                Token::LessEqual
            } else {
                Token::Less
            }
        }
        '&' => {
            if chars.peek() == Some(&'&') {
                chars.next();
                Token::And
            } else {
                return Err(anyhow!("Expected && but got single &"));
            }
        }
        '|' => {
            if chars.peek() == Some(&'|') {
                chars.next();
                Token::Or
            } else {
                return Err(anyhow!("Expected || but got single |"));
            }
        }
        other => return Err(anyhow!("Unexpected operator character '{}'", other)),
    };
    Ok(token)
}

/// Parse a quoted string literal. The opening quote was consumed by the caller.
fn parse_string(quote: char, chars: &mut Peekable<Chars>) -> Result<String> {
    let mut string = String::new();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                Some(escaped) => string.push(escaped),
                None => break,
            },
            c if c == quote => return Ok(string),
            c => string.push(c),
        }
    }
    Err(anyhow!("Unterminated string literal"))
}

fn parse_number(chars: &mut Peekable<Chars>) -> Result<f64> {
    let mut num_str = String::new();
    while let Some(&ch) = chars.peek() {
        if ch.is_ascii_digit() || ch == '.' || (ch == '-' && num_str.is_empty()) {
            num_str.push(ch);
            chars.next();
        } else {
            break;
        }
    }
    num_str
        .parse::<f64>()
        .map_err(|_| anyhow!("Invalid number: {}", num_str))
}

fn parse_keyword_or_identifier(ident: String) -> Token {
    match ident.as_str() {
        "true" => Token::Boolean(true),
        "false" => Token::Boolean(false),
        "null" => Token::Null,
        "undefined" => Token::Undefined,
        _ => Token::Identifier(ident),
    }
}

/// Collect identifier characters, including `.` separators and `[n]` indices
fn parse_identifier(chars: &mut Peekable<Chars>) -> String {
    let mut ident = String::new();
    while let Some(&ch) = chars.peek() {
        if ch.is_alphanumeric() || ch == '_' || ch == '$' || ch == '.' || ch == '[' || ch == ']'
        {
            ident.push(ch);
            chars.next();
        } else {
            break;
        }
    }
    ident
}

/// Tokenize an expression string
///
/// ```
/// use regform::expression::tokenizer::tokenize;
///
/// let tokens = tokenize("values.country !== 'FAR'").unwrap();
/// assert_eq!(tokens.len(), 3);
/// ```
pub fn tokenize(expr: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = expr.chars().peekable();

    while let Some(&ch) = chars.peek() {
        match ch {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                tokens.push(Token::LeftParen);
                chars.next();
            }
            ')' => {
                tokens.push(Token::RightParen);
                chars.next();
            }
            ',' => {
                tokens.push(Token::Comma);
                chars.next();
            }
            '!' | '=' | '>' | '<' | '&' | '|' => {
                tokens.push(parse_operator(ch, &mut chars)?);
            }
            '"' | '\'' => {
                chars.next();
                tokens.push(Token::String(parse_string(ch, &mut chars)?));
            }
            '0'..='9' | '-' => {
                tokens.push(Token::Number(parse_number(&mut chars)?));
            }
            _ if ch.is_alphabetic() || ch == '_' || ch == '$' => {
                let ident = parse_identifier(&mut chars);
                tokens.push(parse_keyword_or_identifier(ident));
            }
            other => return Err(anyhow!("Unexpected character '{}'", other)),
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_strict_equality() {
        let tokens = tokenize("values.informant === 'MOTHER'").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Identifier("values.informant".to_string()),
                Token::Equal,
                Token::String("MOTHER".to_string()),
            ]
        );
    }

    #[test]
    fn test_tokenize_strict_inequality() {
        assert_eq!(tokenize("!==").unwrap(), vec![Token::NotEqual]);
        assert_eq!(tokenize("!=").unwrap(), vec![Token::NotEqual]);
    }

    #[test]
    fn test_tokenize_guard_idiom() {
        let tokens = tokenize("!draftData || !draftData.registration").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Not,
                Token::Identifier("draftData".to_string()),
                Token::Or,
                Token::Not,
                Token::Identifier("draftData.registration".to_string()),
            ]
        );
    }

    #[test]
    fn test_tokenize_helper_call() {
        let tokens = tokenize("isDefaultCountry(values.countryPermanent)").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Identifier("isDefaultCountry".to_string()),
                Token::LeftParen,
                Token::Identifier("values.countryPermanent".to_string()),
                Token::RightParen,
            ]
        );
    }

    #[test]
    fn test_tokenize_indexed_path() {
        let tokens = tokenize("draftData.mother.address[0]").unwrap();
        assert_eq!(
            tokens,
            vec![Token::Identifier("draftData.mother.address[0]".to_string())]
        );
    }

    #[test]
    fn test_tokenize_literals() {
        let tokens = tokenize("true false null undefined -2.5 \"it\\'s\"").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Boolean(true),
                Token::Boolean(false),
                Token::Null,
                Token::Undefined,
                Token::Number(-2.5),
                Token::String("it's".to_string()),
            ]
        );
    }

    #[test]
    fn test_tokenize_error_single_ampersand() {
        let err = tokenize("a & b").unwrap_err();
        assert!(err.to_string().contains("Expected && but got single &"));
    }

    #[test]
    fn test_tokenize_error_assignment() {
        assert!(tokenize("values.x = 'A'").is_err());
    }

    #[test]
    fn test_tokenize_error_unterminated_string() {
        assert!(tokenize("values.x === 'A").is_err());
    }

    #[test]
    fn test_tokenize_error_unexpected_character() {
        assert!(tokenize("values.x ? 1 : 2").is_err());
    }
}
