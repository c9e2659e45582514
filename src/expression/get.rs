use serde_json::{Value as JsonValue, json};

use super::{Expression, expect_string};
use crate::error::EvaluationResult;
use crate::evaluation_context::EvaluationContext;
use crate::parsing_context::ParsingContext;
use crate::types::Type;
use crate::value::Value;

pub const NAME: &str = "get";

/// `["get", key]`: reads a feature property. Missing properties evaluate to `null`.
#[derive(Debug, Clone, PartialEq)]
pub struct Get {
    key: Box<Expression>,
}

impl Get {
    pub fn key(&self) -> &Expression {
        &self.key
    }

    pub fn parse(args: &[JsonValue], ctx: &mut ParsingContext) -> Option<Expression> {
        if args.len() != 2 {
            return ctx.error(format!(
                "Expected 1 argument, but found {} instead.",
                args.len().saturating_sub(1),
            ));
        }
        let key = ctx.parse(&args[1], 1, Some(Type::String))?;
        Some(Expression::Get(Get { key: Box::new(key) }))
    }

    pub fn evaluate(&self, ctx: &EvaluationContext) -> EvaluationResult<Value> {
        let key = expect_string(self.key.evaluate(ctx)?)?;
        Ok(ctx.property(&key).cloned().unwrap_or(Value::Null))
    }

    pub fn serialize(&self) -> JsonValue {
        json!([NAME, self.key.serialize()])
    }
}

#[cfg(test)]
mod tests {
    use crate::evaluation_context::EvaluationContext;
    use crate::parsing_context::parse_expression;
    use crate::value::Value;
    use serde_json::json;

    #[test]
    fn reads_properties_and_defaults_to_null() {
        let ctx = EvaluationContext::default().with_json_properties(&json!({"name": "Oslo"}));
        let hit = parse_expression(&json!(["get", "name"]), None).unwrap();
        assert_eq!(hit.evaluate(&ctx).unwrap(), Value::from("Oslo"));
        let miss = parse_expression(&json!(["get", "population"]), None).unwrap();
        assert_eq!(miss.evaluate(&ctx).unwrap(), Value::Null);
    }

    #[test]
    fn key_must_be_a_string() {
        let errors = parse_expression(&json!(["get", 3]), None).unwrap_err();
        assert_eq!(errors.0[0].key, "[1]");
        assert_eq!(errors.0[0].message, "Expected string but found number instead.");
    }
}
