use std::sync::Arc;
use std::thread;

use serde_json::{Value as JsonValue, json};
use style_expr::locale::{
    BasicFormatterConfig, BasicNumberFormat, FormatOptions, FormatStyle, NumberFormatProvider, NumberFormatter,
};
use style_expr::{EvaluationContext, Expression, FormattingError, Type, Value, parse_expression};

/// A fixed "test locale": no grouping, comma decimal, style tag in brackets.
struct TestLocale;

struct TestFormatter {
    style: FormatStyle,
    currency: Option<String>,
}

impl NumberFormatProvider for TestLocale {
    fn construct(
        &self,
        _locales: &[String],
        options: &FormatOptions,
    ) -> Result<Box<dyn NumberFormatter>, FormattingError> {
        let style: FormatStyle = options.style.parse()?;
        if style == FormatStyle::Currency && options.currency.is_none() {
            return Err(FormattingError::MissingCurrency);
        }
        Ok(Box::new(TestFormatter { style, currency: options.currency.clone() }))
    }
}

impl NumberFormatter for TestFormatter {
    fn format(&self, number: f64) -> String {
        let body = format!("{number}").replace('.', ",");
        match self.style {
            FormatStyle::Decimal => format!("[d]{body}"),
            FormatStyle::Percent => format!("[p]{}", number * 100.0),
            FormatStyle::Currency => format!("[c]{body} {}", self.currency.as_deref().unwrap_or_default()),
        }
    }
}

fn compile(syntax: JsonValue) -> Expression {
    parse_expression(&syntax, Some(Type::String)).expect("expression should compile")
}

#[test]
fn decimal_default_under_injected_engine() {
    let expr = compile(json!(["number-format", 1234.5, {}]));
    let ctx = EvaluationContext::new(Arc::new(TestLocale));
    assert_eq!(expr.evaluate(&ctx).unwrap(), Value::from("[d]1234,5"));
}

#[test]
fn documented_scenarios_under_bundled_engine() {
    let ctx = EvaluationContext::default();
    let cases = [
        (json!(["number-format", 1234.5, {}]), "1,234.5"),
        (json!(["number-format", 0.42, {"style": "percent"}]), "42%"),
        (json!(["number-format", 5, {"style": "currency", "currency": "USD", "locale": "en-US"}]), "$5.00"),
    ];
    for (syntax, expected) in cases {
        let expr = compile(syntax.clone());
        assert_eq!(expr.evaluate(&ctx).unwrap(), Value::from(expected), "{syntax}");
    }
}

#[test]
fn default_locale_comes_from_config() {
    let provider = BasicNumberFormat::new(BasicFormatterConfig { default_locale: "de-DE".into() });
    let ctx = EvaluationContext::new(Arc::new(provider));
    let expr = compile(json!(["number-format", 1234.5, {}]));
    assert_eq!(expr.evaluate(&ctx).unwrap(), Value::from("1.234,5"));

    let explicit = compile(json!(["number-format", 1234.5, {"locale": "en-US"}]));
    assert_eq!(explicit.evaluate(&ctx).unwrap(), Value::from("1,234.5"));
}

#[test]
fn per_feature_values_drive_the_format() {
    let expr = compile(json!(["number-format", ["get", "price"], {
        "style": "currency",
        "currency": ["get", "currency"],
        "locale": ["get", "locale"]
    }]));
    let base = EvaluationContext::default();

    let us = base.clone().with_json_properties(&json!({"price": 19.99, "currency": "USD", "locale": "en-US"}));
    assert_eq!(expr.evaluate(&us).unwrap(), Value::from("$19.99"));

    let de = base.clone().with_json_properties(&json!({"price": 19.99, "currency": "EUR", "locale": "de-DE"}));
    assert_eq!(expr.evaluate(&de).unwrap(), Value::from("19,99\u{a0}€"));

    // a missing currency is only discovered now, per feature
    let missing = base.with_json_properties(&json!({"price": 19.99, "locale": "en-US"}));
    assert!(expr.evaluate(&missing).is_err());
}

#[test]
fn round_trip_is_stable() {
    let original = compile(json!(["number-format", ["get", "n"], {
        "currency": "USD",
        "locale": "en-US",
        "style": "currency",
        "unknown-option": true
    }]));
    let first = serde_json::to_string(&original.serialize()).unwrap();
    let reparsed = compile(serde_json::from_str(&first).unwrap());
    let second = serde_json::to_string(&reparsed.serialize()).unwrap();
    assert_eq!(first, second);
    assert_eq!(original, reparsed);
    assert!(!first.contains("unknown-option"));
}

#[test]
fn concurrent_evaluation_of_one_tree() {
    let expr = Arc::new(compile(json!(["number-format", ["get", "n"], {"style": "percent"}])));
    let base = EvaluationContext::default();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let expr = Arc::clone(&expr);
            let ctx = base.clone().with_json_properties(&json!({"n": i as f64 / 100.0}));
            thread::spawn(move || expr.evaluate(&ctx).unwrap())
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), Value::String(format!("{i}%")));
    }
}
