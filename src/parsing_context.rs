//! Raw JSON syntax → typed [`Expression`] trees.
//!
//! A [`ParsingContext`] lives for exactly one parse call. It tracks where in
//! the syntax tree it currently is (so errors carry a key like `[2].style`)
//! and collects every error. Operator parsers return `None` after recording
//! an error; callers just propagate the `None` with `?`.
use std::fmt;

use serde_json::Value as JsonValue;

use crate::error::{ParseError, ParseErrors};
use crate::expression::{self, Assertion, Expression, Literal};
use crate::types::{Type, check_subtype};
use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// `[i]`: an operand position
    Index(usize),
    /// `[i].name`: a field of the options object at position `i`
    Field(usize, String),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Index(i) => write!(f, "[{i}]"),
            PathSegment::Field(i, name) => write!(f, "[{i}].{name}"),
        }
    }
}

#[derive(Debug, Default)]
pub struct ParsingContext {
    path: Vec<PathSegment>,
    errors: Vec<ParseError>,
}

/// Parses a whole expression. `expected` constrains the root's type, if given.
pub fn parse_expression(json: &JsonValue, expected: Option<Type>) -> Result<Expression, ParseErrors> {
    let mut ctx = ParsingContext::new();
    let parsed = ctx.parse_here(json, expected);
    match parsed {
        Some(expr) if ctx.errors.is_empty() => Ok(expr),
        Some(_) => Err(ParseErrors(ctx.errors)),
        None => {
            if ctx.errors.is_empty() {
                ctx.error::<()>("Could not parse expression.");
            }
            Err(ParseErrors(ctx.errors))
        }
    }
}

impl ParsingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current position, e.g. `[1][2].locale`. Empty at the root.
    pub fn key(&self) -> String {
        self.path.iter().map(ToString::to_string).collect()
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Parses the operand at position `index` of the current array.
    pub fn parse(&mut self, json: &JsonValue, index: usize, expected: Option<Type>) -> Option<Expression> {
        self.parse_at(json, PathSegment::Index(index), expected)
    }

    /// Parses `field` of the options object found at position `index`.
    pub fn parse_option(
        &mut self,
        json: &JsonValue,
        index: usize,
        field: &str,
        expected: Option<Type>,
    ) -> Option<Expression> {
        self.parse_at(json, PathSegment::Field(index, field.to_string()), expected)
    }

    fn parse_at(&mut self, json: &JsonValue, segment: PathSegment, expected: Option<Type>) -> Option<Expression> {
        self.path.push(segment);
        let parsed = self.parse_here(json, expected);
        self.path.pop();
        parsed
    }

    /// Records an error at the current position. Always returns `None`.
    pub fn error<T>(&mut self, message: impl Into<String>) -> Option<T> {
        let error = ParseError { key: self.key(), message: message.into() };
        log::debug!("parse error: {error}");
        self.errors.push(error);
        None
    }

    fn parse_here(&mut self, json: &JsonValue, expected: Option<Type>) -> Option<Expression> {
        let parsed = match json {
            JsonValue::Array(items) => self.parse_operator(items)?,
            JsonValue::Object(_) => {
                return self.error(r#"Bare objects invalid. Use ["literal", {...}] instead."#);
            }
            scalar => Expression::Literal(Literal::new(Value::from_json(scalar))),
        };
        self.enforce(parsed, expected)
    }

    fn parse_operator(&mut self, items: &[JsonValue]) -> Option<Expression> {
        let Some(head) = items.first() else {
            return self.error(
                r#"Expected an array with at least one element. If you wanted a literal array, use ["literal", []]."#,
            );
        };
        let Some(op) = head.as_str() else {
            return self.error(format!(
                r#"Expression name must be a string, but found {} instead. If you wanted a literal array, use ["literal", [...]]."#,
                Value::from_json(head).type_of(),
            ));
        };
        let Some(parse) = expression::definition(op) else {
            return self.error(format!(
                r#"Unknown expression "{op}". If you wanted a literal array, use ["literal", [...]]."#
            ));
        };
        parse(items, self)
    }

    // `value`-typed children get a runtime assertion instead of a static error.
    fn enforce(&mut self, parsed: Expression, expected: Option<Type>) -> Option<Expression> {
        let Some(expected) = expected else {
            return Some(parsed);
        };
        let found = parsed.ty();
        if found == Type::Value && expected.is_assertable() {
            return Some(Expression::Assertion(Assertion::new(expected, parsed)));
        }
        if let Some(message) = check_subtype(expected, found) {
            return self.error(message);
        }
        Some(parsed)
    }
}
