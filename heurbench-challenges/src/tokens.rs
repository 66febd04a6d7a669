//! Whitespace tokenizer shared by the instance parsers.
//!
//! Instance files wrap long tables across physical lines at arbitrary points, so the
//! parsers read a flat token stream and accumulate values until a declared count is met.
use crate::ParseError;

pub struct Tokens<'a> {
    tokens: Vec<&'a str>,
    consumed: usize,
}

impl<'a> Tokens<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            tokens: text.split_whitespace().collect(),
            consumed: 0,
        }
    }

    /// Number of tokens handed out so far.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Number of tokens not yet handed out.
    pub fn remaining(&self) -> usize {
        self.tokens.len() - self.consumed
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    pub fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.consumed).copied()
    }

    /// Fails unless at least `count` tokens are left. Tables sized from a declared count
    /// go through this before anything is allocated for them.
    pub fn require(&self, count: usize, context: &str) -> Result<(), ParseError> {
        if count > self.remaining() {
            return Err(ParseError::MissingTokens {
                context: context.to_string(),
                expected: count,
                found: self.remaining(),
            });
        }
        Ok(())
    }

    pub fn next_token(&mut self, context: &str) -> Result<&'a str, ParseError> {
        self.require(1, context)?;
        let token = self.tokens[self.consumed];
        self.consumed += 1;
        Ok(token)
    }

    pub fn next_f64(&mut self, context: &str) -> Result<f64, ParseError> {
        let token = self.next_token(context)?;
        parse_f64(token, context)
    }

    pub fn next_usize(&mut self, context: &str) -> Result<usize, ParseError> {
        let token = self.next_token(context)?;
        parse_usize(token, context)
    }

    /// Reads exactly `count` numbers, however many lines they span.
    pub fn take_f64s(&mut self, count: usize, context: &str) -> Result<Vec<f64>, ParseError> {
        self.take(count, context)?
            .iter()
            .map(|token| parse_f64(token, context))
            .collect()
    }

    pub fn take_usizes(&mut self, count: usize, context: &str) -> Result<Vec<usize>, ParseError> {
        self.take(count, context)?
            .iter()
            .map(|token| parse_usize(token, context))
            .collect()
    }

    fn take(&mut self, count: usize, context: &str) -> Result<&[&'a str], ParseError> {
        self.require(count, context)?;
        let start = self.consumed;
        self.consumed += count;
        Ok(&self.tokens[start..self.consumed])
    }
}

pub fn parse_f64(token: &str, context: &str) -> Result<f64, ParseError> {
    match token.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ParseError::InvalidToken {
            context: context.to_string(),
            token: token.to_string(),
        }),
    }
}

/// Counts and ids occasionally appear as `12.0`; any integral, non-negative value is accepted.
pub fn parse_usize(token: &str, context: &str) -> Result<usize, ParseError> {
    if let Ok(value) = token.parse::<usize>() {
        return Ok(value);
    }
    match token.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 && value.fract() == 0.0 => {
            Ok(value as usize)
        }
        _ => Err(ParseError::InvalidToken {
            context: context.to_string(),
            token: token.to_string(),
        }),
    }
}

/// Lines that carry at least one token, trimmed.
pub fn non_blank_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}
