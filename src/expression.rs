//! Typed expression tree.
//!
//! Every node kind is a variant of [`Expression`]; the five operations every
//! node supports (`ty`, `evaluate`, `each_child`, `possible_outputs`,
//! `serialize`) dispatch with an exhaustive `match`, so adding a kind means
//! the compiler points at every place that needs to learn about it.
//!
//! Trees are immutable once parsed and own their children outright.
pub mod assertion;
pub mod get;
pub mod literal;
pub mod number_format;

use serde_json::Value as JsonValue;

use crate::error::{EvaluationError, EvaluationResult};
use crate::evaluation_context::EvaluationContext;
use crate::parsing_context::ParsingContext;
use crate::types::Type;
use crate::value::Value;

pub use assertion::Assertion;
pub use get::Get;
pub use literal::Literal;
pub use number_format::NumberFormat;

/// Signature shared by every operator's parser. `args[0]` is the operator name.
pub type ParseFn = fn(&[JsonValue], &mut ParsingContext) -> Option<Expression>;

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Literal),
    Get(Get),
    Assertion(Assertion),
    NumberFormat(NumberFormat),
}

/// Maps an operator name to its parser.
pub fn definition(name: &str) -> Option<ParseFn> {
    match name {
        literal::NAME => Some(Literal::parse),
        get::NAME => Some(Get::parse),
        "string" | "number" | "boolean" => Some(Assertion::parse),
        number_format::NAME => Some(NumberFormat::parse),
        _ => None,
    }
}

impl Expression {
    pub fn ty(&self) -> Type {
        match self {
            Expression::Literal(e) => e.ty(),
            Expression::Get(_) => Type::Value,
            Expression::Assertion(e) => e.ty(),
            Expression::NumberFormat(_) => Type::String,
        }
    }

    pub fn evaluate(&self, ctx: &EvaluationContext) -> EvaluationResult<Value> {
        match self {
            Expression::Literal(e) => Ok(e.value().clone()),
            Expression::Get(e) => e.evaluate(ctx),
            Expression::Assertion(e) => e.evaluate(ctx),
            Expression::NumberFormat(e) => e.evaluate(ctx),
        }
    }

    /// Visits direct children in a fixed, documented order per node kind.
    pub fn each_child<'a>(&'a self, mut f: impl FnMut(&'a Expression)) {
        match self {
            Expression::Literal(_) => {}
            Expression::Get(e) => f(e.key()),
            Expression::Assertion(e) => f(e.input()),
            Expression::NumberFormat(e) => e.each_child(&mut f),
        }
    }

    pub fn children(&self) -> Vec<&Expression> {
        let mut out = Vec::new();
        self.each_child(|c| out.push(c));
        out
    }

    /// Values this expression may produce; `None` means "not statically known".
    pub fn possible_outputs(&self) -> Vec<Option<Value>> {
        match self {
            Expression::Literal(e) => vec![Some(e.value().clone())],
            Expression::Get(_) => vec![None],
            Expression::Assertion(e) => e.input().possible_outputs(),
            Expression::NumberFormat(e) => e.possible_outputs(),
        }
    }

    /// Canonical JSON syntax. Parsing it again yields an equal tree.
    pub fn serialize(&self) -> JsonValue {
        match self {
            Expression::Literal(e) => e.serialize(),
            Expression::Get(e) => e.serialize(),
            Expression::Assertion(e) => e.serialize(),
            Expression::NumberFormat(e) => e.serialize(),
        }
    }

    /// True when every possible output is known, i.e. a constant folder may evaluate it once.
    pub fn is_constant(&self) -> bool {
        self.possible_outputs().iter().all(Option::is_some)
    }
}

pub(crate) fn expect_number(v: Value) -> EvaluationResult<f64> {
    match v {
        Value::Number(n) => Ok(n),
        other => Err(EvaluationError::TypeMismatch { expected: Type::Number, found: other.type_of() }),
    }
}

pub(crate) fn expect_string(v: Value) -> EvaluationResult<String> {
    match v {
        Value::String(s) => Ok(s),
        other => Err(EvaluationError::TypeMismatch { expected: Type::String, found: other.type_of() }),
    }
}
