//! Path expressions over JSON documents
//!
//! A small query language used by the provider adapters to pull fields out
//! of raw provider responses:
//!
//! - `a.b.c` walks object fields
//! - `a[0]` indexes an array (negative indices count from the end)
//! - `a[].b` projects `b` over every element of `a`
//! - `*.b` projects `b` over every value of an object
//!
//! Missing data is never an error. A path that runs off the document yields
//! `None`, and a projection over a missing array yields an empty array.
//! Only malformed expression text produces a [`PathError`].

use crate::error::PathError;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Field(String),
    Index(i64),
    Project,
    Wildcard,
}

impl Segment {
    fn is_projection(&self) -> bool {
        matches!(self, Segment::Project | Segment::Wildcard)
    }
}

/// A compiled path expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPath {
    expression: String,
    segments: Vec<Segment>,
}

impl JsonPath {
    /// Compile an expression, rejecting malformed syntax
    pub fn compile(expression: &str) -> Result<Self, PathError> {
        let segments = Parser::new(expression).parse()?;
        Ok(Self {
            expression: expression.to_string(),
            segments,
        })
    }

    /// The source text of the expression
    pub fn as_str(&self) -> &str {
        &self.expression
    }

    /// Evaluate against a document; `None` when the path does not resolve
    pub fn search(&self, document: &Value) -> Option<Value> {
        evaluate(document, &self.segments).filter(|v| !v.is_null())
    }
}

impl FromStr for JsonPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::compile(s)
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression)
    }
}

/// Compile `expression` and evaluate it against `document` in one step
pub fn extract(document: &Value, expression: &str) -> Result<Option<Value>, PathError> {
    Ok(JsonPath::compile(expression)?.search(document))
}

fn evaluate(value: &Value, segments: &[Segment]) -> Option<Value> {
    let Some((segment, rest)) = segments.split_first() else {
        return Some(value.clone());
    };

    match segment {
        Segment::Field(name) => match value.as_object()?.get(name) {
            Some(child) => evaluate(child, rest),
            None if rest.first().is_some_and(Segment::is_projection) => {
                Some(Value::Array(Vec::new()))
            }
            None => None,
        },
        Segment::Index(index) => {
            let items = value.as_array()?;
            let position = if *index < 0 {
                items.len().checked_sub(index.unsigned_abs() as usize)?
            } else {
                usize::try_from(*index).ok()?
            };
            evaluate(items.get(position)?, rest)
        }
        Segment::Project => match value {
            Value::Null => Some(Value::Array(Vec::new())),
            Value::Array(items) => Some(project(items.iter(), rest)),
            _ => None,
        },
        Segment::Wildcard => match value {
            Value::Null => Some(Value::Array(Vec::new())),
            Value::Object(map) => Some(project(map.values(), rest)),
            _ => None,
        },
    }
}

fn project<'a>(items: impl Iterator<Item = &'a Value>, rest: &[Segment]) -> Value {
    let nested = rest.iter().any(Segment::is_projection);
    let mut out = Vec::new();
    for item in items {
        match evaluate(item, rest) {
            None | Some(Value::Null) => {}
            Some(Value::Array(inner)) if nested => out.extend(inner),
            Some(v) => out.push(v),
        }
    }
    Value::Array(out)
}

struct Parser<'a> {
    expression: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(expression: &'a str) -> Self {
        Self {
            expression,
            bytes: expression.as_bytes(),
            pos: 0,
        }
    }

    fn error(&self, reason: impl Into<String>) -> PathError {
        PathError::InvalidPathExpression {
            expression: self.expression.to_string(),
            position: self.pos,
            reason: reason.into(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn parse(mut self) -> Result<Vec<Segment>, PathError> {
        if self.bytes.is_empty() {
            return Err(self.error("empty expression"));
        }

        let mut segments = Vec::new();
        // A leading bracket applies directly to the document root
        let mut expect_name = self.peek() != Some(b'[');

        while let Some(c) = self.peek() {
            if expect_name {
                segments.push(self.name()?);
                expect_name = false;
                continue;
            }
            match c {
                b'.' => {
                    self.pos += 1;
                    expect_name = true;
                }
                b'[' => segments.push(self.bracket()?),
                _ => return Err(self.error(format!("unexpected character {:?}", c as char))),
            }
        }

        if expect_name {
            return Err(self.error("expected a field name after '.'"));
        }
        Ok(segments)
    }

    fn name(&mut self) -> Result<Segment, PathError> {
        match self.peek() {
            Some(b'*') => {
                self.pos += 1;
                Ok(Segment::Wildcard)
            }
            Some(c) if c.is_ascii_alphabetic() || c == b'_' => {
                let start = self.pos;
                while self
                    .peek()
                    .is_some_and(|c| c.is_ascii_alphanumeric() || c == b'_')
                {
                    self.pos += 1;
                }
                Ok(Segment::Field(self.expression[start..self.pos].to_string()))
            }
            Some(_) => Err(self.error("expected a field name or '*'")),
            None => Err(self.error("expected a field name after '.'")),
        }
    }

    fn bracket(&mut self) -> Result<Segment, PathError> {
        self.pos += 1; // '['
        let segment = match self.peek() {
            Some(b']') => Segment::Project,
            Some(b'*') => {
                self.pos += 1;
                Segment::Project
            }
            Some(c) if c == b'-' || c.is_ascii_digit() => {
                let start = self.pos;
                self.pos += 1;
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.pos += 1;
                }
                let digits = &self.expression[start..self.pos];
                let index = digits
                    .parse::<i64>()
                    .map_err(|_| self.error(format!("invalid array index {digits:?}")))?;
                Segment::Index(index)
            }
            Some(_) => return Err(self.error("expected an index, '*' or ']'")),
            None => return Err(self.error("unclosed '['")),
        };

        match self.peek() {
            Some(b']') => {
                self.pos += 1;
                Ok(segment)
            }
            _ => Err(self.error("expected ']'")),
        }
    }
}
