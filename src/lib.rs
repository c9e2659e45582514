//! A typed JSON expression language for styling rules, centred on the
//! `number-format` operator.
//!
//! ```
//! use serde_json::json;
//! use style_expr::{EvaluationContext, Value, parse_expression};
//!
//! let expr = parse_expression(&json!(["number-format", 0.42, {"style": "percent"}]), None).unwrap();
//! assert_eq!(expr.evaluate(&EvaluationContext::default()).unwrap(), Value::from("42%"));
//! ```
pub mod error;
pub mod evaluation_context;
pub mod expression;
pub mod locale;
pub mod parsing_context;
pub mod path_de;
pub mod types;
pub mod value;

pub use error::{EvaluationError, FormattingError, ParseError, ParseErrors};
pub use evaluation_context::EvaluationContext;
pub use expression::Expression;
pub use parsing_context::{ParsingContext, parse_expression};
pub use types::Type;
pub use value::Value;
