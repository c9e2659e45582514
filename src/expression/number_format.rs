//! `["number-format", number, { style?, locale?, currency? }]`
//!
//! Turns a number into a locale-aware string through the evaluation
//! context's [`NumberFormatProvider`](crate::locale::NumberFormatProvider).
//! Style, locale and currency are ordinary expressions, so invalid
//! combinations (currency style without a code, say) only show up when
//! evaluating, as a [`FormattingError`](crate::error::FormattingError).
use serde_json::{Map, Value as JsonValue, json};

use super::{Expression, expect_number, expect_string, literal};
use crate::error::EvaluationResult;
use crate::evaluation_context::EvaluationContext;
use crate::locale::FormatOptions;
use crate::parsing_context::ParsingContext;
use crate::types::Type;
use crate::value::{Value, is_truthy};

pub const NAME: &str = "number-format";

const DEFAULT_STYLE: &str = "decimal";
const OPTIONS_INDEX: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct NumberFormat {
    number: Box<Expression>,
    style: Box<Expression>,
    locale: Option<Box<Expression>>,   // BCP-47 tag
    currency: Option<Box<Expression>>, // ISO-4217 code
}

impl NumberFormat {
    pub fn number(&self) -> &Expression {
        &self.number
    }

    pub fn style(&self) -> &Expression {
        &self.style
    }

    pub fn locale(&self) -> Option<&Expression> {
        self.locale.as_deref()
    }

    pub fn currency(&self) -> Option<&Expression> {
        self.currency.as_deref()
    }

    pub fn parse(args: &[JsonValue], ctx: &mut ParsingContext) -> Option<Expression> {
        if args.len() != 3 {
            return ctx.error("Expected two arguments.");
        }

        let number = ctx.parse(&args[1], 1, Some(Type::Number))?;

        let Some(options) = args[OPTIONS_INDEX].as_object() else {
            return ctx.error("NumberFormat options argument must be an object.");
        };

        let default_style = JsonValue::from(DEFAULT_STYLE);
        let style = ctx.parse_option(
            options.get("style").unwrap_or(&default_style),
            OPTIONS_INDEX,
            "style",
            Some(Type::String),
        )?;

        let locale = match options.get("locale") {
            Some(raw) if is_truthy(raw) => {
                Some(ctx.parse_option(raw, OPTIONS_INDEX, "locale", Some(Type::String))?)
            }
            _ => None,
        };

        let currency = match options.get("currency") {
            Some(raw) if is_truthy(raw) => {
                Some(ctx.parse_option(raw, OPTIONS_INDEX, "currency", Some(Type::String))?)
            }
            _ => None,
        };

        // other option keys are ignored

        Some(Expression::NumberFormat(NumberFormat {
            number: Box::new(number),
            style: Box::new(style),
            locale: locale.map(Box::new),
            currency: currency.map(Box::new),
        }))
    }

    pub fn evaluate(&self, ctx: &EvaluationContext) -> EvaluationResult<Value> {
        let number = expect_number(self.number.evaluate(ctx)?)?;
        let style = expect_string(self.style.evaluate(ctx)?)?;
        let locales = match &self.locale {
            Some(locale) => vec![expect_string(locale.evaluate(ctx)?)?],
            None => Vec::new(),
        };
        let currency = match &self.currency {
            Some(currency) => Some(expect_string(currency.evaluate(ctx)?)?),
            None => None,
        };

        log::trace!("number-format {number} locales={locales:?} style={style} currency={currency:?}");

        let formatter = ctx.formatter().construct(&locales, &FormatOptions { style, currency })?;
        Ok(Value::String(formatter.format(number)))
    }

    pub fn each_child<'a>(&'a self, f: &mut dyn FnMut(&'a Expression)) {
        f(self.number());
        f(self.style());
        if let Some(locale) = self.locale() {
            f(locale);
        }
        if let Some(currency) = self.currency() {
            f(currency);
        }
    }

    /// Never constant: the output depends on locale data this pass does not consult.
    pub fn possible_outputs(&self) -> Vec<Option<Value>> {
        vec![None]
    }

    pub fn serialize(&self) -> JsonValue {
        let mut options = Map::new();
        options.insert("style".to_string(), self.style.serialize());
        if let Some(locale) = &self.locale {
            options.insert("locale".to_string(), serialize_optional(locale));
        }
        if let Some(currency) = &self.currency {
            options.insert("currency".to_string(), serialize_optional(currency));
        }
        json!([NAME, self.number.serialize(), options])
    }
}

// A falsy bare value would be dropped on re-parse, so it keeps an explicit wrapper.
fn serialize_optional(operand: &Expression) -> JsonValue {
    let serialized = operand.serialize();
    if is_truthy(&serialized) {
        serialized
    } else {
        json!([literal::NAME, serialized])
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use crate::error::{EvaluationError, FormattingError};
    use crate::evaluation_context::EvaluationContext;
    use crate::expression::Expression;
    use crate::locale::{FormatOptions, NumberFormatProvider, NumberFormatter};
    use crate::parsing_context::parse_expression;
    use crate::types::Type;
    use crate::value::Value;

    /// Echoes everything it was constructed with, so tests can see exactly what reached the formatter.
    struct EchoFormat;

    struct Echo {
        locales: Vec<String>,
        options: FormatOptions,
    }

    impl NumberFormatProvider for EchoFormat {
        fn construct(
            &self,
            locales: &[String],
            options: &FormatOptions,
        ) -> Result<Box<dyn NumberFormatter>, FormattingError> {
            Ok(Box::new(Echo { locales: locales.to_vec(), options: options.clone() }))
        }
    }

    impl NumberFormatter for Echo {
        fn format(&self, number: f64) -> String {
            format!(
                "{number}|{}|{}|{}",
                self.options.style,
                self.locales.join(","),
                self.options.currency.as_deref().unwrap_or("-"),
            )
        }
    }

    fn echo_ctx() -> EvaluationContext {
        EvaluationContext::new(Arc::new(EchoFormat))
    }

    fn parse(json: serde_json::Value) -> Expression {
        parse_expression(&json, None).unwrap()
    }

    fn as_number_format(e: &Expression) -> &super::NumberFormat {
        match e {
            Expression::NumberFormat(nf) => nf,
            other => panic!("expected number-format, got {other:?}"),
        }
    }

    #[test]
    fn style_defaults_to_decimal() {
        let e = parse(json!(["number-format", 1234.5, {}]));
        assert_eq!(e.ty(), Type::String);
        assert_eq!(e.evaluate(&echo_ctx()).unwrap(), Value::from("1234.5|decimal||-"));
        assert_eq!(e.evaluate(&EvaluationContext::default()).unwrap(), Value::from("1,234.5"));
    }

    #[test]
    fn fixed_scenarios_under_the_bundled_engine() {
        let ctx = EvaluationContext::default();
        let percent = parse(json!(["number-format", 0.42, {"style": "percent"}]));
        assert_eq!(percent.evaluate(&ctx).unwrap(), Value::from("42%"));

        let currency = parse(json!(["number-format", 5, {"style": "currency", "currency": "USD", "locale": "en-US"}]));
        assert_eq!(currency.evaluate(&ctx).unwrap(), Value::from("$5.00"));
    }

    #[test]
    fn operands_are_forwarded_to_the_formatter() {
        let e = parse(json!(["number-format", ["get", "n"], {
            "style": ["get", "style"],
            "locale": ["get", "loc"],
            "currency": "EUR"
        }]));
        let ctx = echo_ctx().with_json_properties(&json!({"n": 7, "style": "currency", "loc": "de-DE"}));
        assert_eq!(e.evaluate(&ctx).unwrap(), Value::from("7|currency|de-DE|EUR"));
    }

    #[test]
    fn falsy_optional_operands_are_left_unset() {
        let e = parse(json!(["number-format", 1, {"locale": "", "currency": null, "precision": 4}]));
        let nf = as_number_format(&e);
        assert!(nf.locale().is_none());
        assert!(nf.currency().is_none());
        assert_eq!(e.serialize(), json!(["number-format", 1, {"style": "decimal"}]));
    }

    #[test]
    fn wrong_arity_records_one_error() {
        for bad in [json!(["number-format", 1]), json!(["number-format", 1, {}, {}])] {
            let errors = parse_expression(&bad, None).unwrap_err();
            assert_eq!(errors.len(), 1);
            assert_eq!(errors.0[0].message, "Expected two arguments.");
            assert_eq!(errors.0[0].key, "");
        }
    }

    #[test]
    fn options_must_be_an_object() {
        for bad in [json!(["number-format", 1, ["style", "percent"]]), json!(["number-format", 1, "percent"])] {
            let errors = parse_expression(&bad, None).unwrap_err();
            assert_eq!(errors.len(), 1);
            assert_eq!(errors.0[0].message, "NumberFormat options argument must be an object.");
        }
    }

    #[test]
    fn operand_type_errors_are_not_duplicated() {
        let errors = parse_expression(&json!(["number-format", "12", {}]), None).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.0[0].key, "[1]");
        assert_eq!(errors.0[0].message, "Expected number but found string instead.");

        let errors = parse_expression(&json!(["number-format", 12, {"locale": 5}]), None).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.0[0].key, "[2].locale");

        let errors = parse_expression(&json!(["number-format", 12, {"style": null}]), None).unwrap_err();
        assert_eq!(errors.0[0].key, "[2].style");
        assert_eq!(errors.0[0].message, "Expected string but found null instead.");
    }

    #[test]
    fn each_child_counts_and_order() {
        let cases = [
            (json!({}), 2),
            (json!({"locale": "fr"}), 3),
            (json!({"currency": "EUR"}), 3),
            (json!({"locale": "fr", "currency": "EUR"}), 4),
        ];
        for (options, expected) in cases {
            let e = parse(json!(["number-format", 3, options]));
            let children = e.children();
            assert_eq!(children.len(), expected);
            assert_eq!(children[0].serialize(), json!(3));
            assert_eq!(children[1].serialize(), json!("decimal"));
        }

        let e = parse(json!(["number-format", 3, {"currency": "EUR", "locale": "fr"}]));
        let order: Vec<_> = e.children().iter().map(|c| c.serialize()).collect();
        assert_eq!(order, vec![json!(3), json!("decimal"), json!("fr"), json!("EUR")]);
    }

    #[test]
    fn possible_outputs_are_always_unknown() {
        let e = parse(json!(["number-format", 5, {"style": "currency", "currency": "USD", "locale": "en-US"}]));
        assert_eq!(e.possible_outputs(), vec![None]);
        assert!(!e.is_constant());
        assert!(e.children().iter().all(|c| c.is_constant()));
    }

    #[test]
    fn serialization_round_trips_byte_identically() {
        let e = parse(json!(["number-format", 5, {"currency": "USD", "locale": "en-US", "style": "currency"}]));
        let first = serde_json::to_string(&e.serialize()).unwrap();
        assert_eq!(first, r#"["number-format",5,{"style":"currency","locale":"en-US","currency":"USD"}]"#);

        let reparsed = parse(e.serialize());
        assert_eq!(reparsed, e);
        let second = serde_json::to_string(&reparsed.serialize()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_literal_options_survive_a_round_trip() {
        let e = parse(json!(["number-format", 1, {"locale": ["literal", ""], "currency": ["literal", ""]}]));
        assert_eq!(e.children().len(), 4);
        assert_eq!(
            e.serialize(),
            json!(["number-format", 1, {"style": "decimal", "locale": ["literal", ""], "currency": ["literal", ""]}]),
        );

        let reparsed = parse(e.serialize());
        assert_eq!(reparsed, e);
        assert_eq!(reparsed.children().len(), 4);
        assert_eq!(
            reparsed.evaluate(&EvaluationContext::default()),
            Err(EvaluationError::Formatting(FormattingError::InvalidLocale(String::new()))),
        );
    }

    #[test]
    fn invalid_combinations_fail_only_at_evaluation() {
        let ctx = EvaluationContext::default();
        let no_currency = parse(json!(["number-format", 5, {"style": "currency"}]));
        assert_eq!(
            no_currency.evaluate(&ctx),
            Err(EvaluationError::Formatting(FormattingError::MissingCurrency)),
        );

        let bad_style = parse(json!(["number-format", 5, {"style": "scientific"}]));
        assert_eq!(
            bad_style.evaluate(&ctx),
            Err(EvaluationError::Formatting(FormattingError::InvalidStyle("scientific".into()))),
        );
    }

    #[test]
    fn decimal_and_percent_never_fail_for_numbers() {
        let ctx = EvaluationContext::default();
        for style in ["decimal", "percent"] {
            for n in [0.0, -0.0, 1e-9, 0.5, -17.25, 1e15, 123456789.987654, f64::MAX, f64::NAN, f64::INFINITY] {
                let e = parse(json!(["number-format", ["get", "n"], {"style": style}]));
                let ctx = ctx.clone().with_properties([("n".to_string(), Value::Number(n))].into_iter().collect());
                let out = e.evaluate(&ctx).unwrap();
                assert!(!out.as_str().unwrap().is_empty(), "{style} {n}");
            }
        }
    }
}
