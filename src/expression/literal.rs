use serde_json::{Value as JsonValue, json};

use super::Expression;
use crate::parsing_context::ParsingContext;
use crate::types::Type;
use crate::value::Value;

pub const NAME: &str = "literal";

/// A constant. Bare JSON scalars parse to this, as does `["literal", v]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    ty: Type,
    value: Value,
}

impl Literal {
    pub fn new(value: Value) -> Self {
        Self { ty: value.type_of(), value }
    }

    pub fn ty(&self) -> Type {
        self.ty
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn parse(args: &[JsonValue], ctx: &mut ParsingContext) -> Option<Expression> {
        if args.len() != 2 {
            return ctx.error(format!(
                "'literal' expression requires exactly one argument, but found {} instead.",
                args.len().saturating_sub(1),
            ));
        }
        Some(Expression::Literal(Literal::new(Value::from_json(&args[1]))))
    }

    // Arrays and objects need the wrapper, or they would read back as operators / bare objects.
    pub fn serialize(&self) -> JsonValue {
        match &self.value {
            Value::Array(_) | Value::Object(_) => json!([NAME, self.value.to_json()]),
            other => other.to_json(),
        }
    }
}
