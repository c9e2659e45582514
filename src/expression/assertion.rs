use serde_json::{Value as JsonValue, json};

use super::Expression;
use crate::error::{EvaluationError, EvaluationResult};
use crate::evaluation_context::EvaluationContext;
use crate::parsing_context::ParsingContext;
use crate::types::Type;
use crate::value::Value;

/// `["string" | "number" | "boolean", input]`: narrows a `value` to a primitive at runtime.
///
/// The parsing context also inserts one implicitly when a `value`-typed child
/// sits where a primitive is expected.
#[derive(Debug, Clone, PartialEq)]
pub struct Assertion {
    ty: Type,
    input: Box<Expression>,
}

impl Assertion {
    pub fn new(ty: Type, input: Expression) -> Self {
        debug_assert!(ty.is_assertable());
        Self { ty, input: Box::new(input) }
    }

    pub fn ty(&self) -> Type {
        self.ty
    }

    pub fn input(&self) -> &Expression {
        &self.input
    }

    pub fn parse(args: &[JsonValue], ctx: &mut ParsingContext) -> Option<Expression> {
        let ty = match args.first().and_then(JsonValue::as_str) {
            Some("string") => Type::String,
            Some("number") => Type::Number,
            Some("boolean") => Type::Boolean,
            _ => return ctx.error("Unknown assertion type."),
        };
        if args.len() != 2 {
            return ctx.error(format!(
                "Expected 1 argument, but found {} instead.",
                args.len().saturating_sub(1),
            ));
        }
        let input = ctx.parse(&args[1], 1, Some(Type::Value))?;
        Some(Expression::Assertion(Assertion::new(ty, input)))
    }

    pub fn evaluate(&self, ctx: &EvaluationContext) -> EvaluationResult<Value> {
        let value = self.input.evaluate(ctx)?;
        if value.type_of() != self.ty {
            return Err(EvaluationError::TypeMismatch { expected: self.ty, found: value.type_of() });
        }
        Ok(value)
    }

    pub fn serialize(&self) -> JsonValue {
        json!([self.ty.name(), self.input.serialize()])
    }
}
