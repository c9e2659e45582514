use thiserror::Error;

use crate::types::Type;

/// One diagnostic recorded by the parsing context, keyed by its position in the syntax tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}{message}", key_prefix(.key))]
pub struct ParseError {
    /// e.g. `[2].style` or `[1][1]`; empty at the root
    pub key: String,
    pub message: String,
}

/// Everything a failed root parse collected. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", join_lines(.0))]
pub struct ParseErrors(pub Vec<ParseError>);

impl ParseErrors {
    pub fn iter(&self) -> impl Iterator<Item = &ParseError> {
        self.0.iter()
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn key_prefix(key: &str) -> String {
    if key.is_empty() { String::new() } else { format!("{key}: ") }
}

fn join_lines(errors: &[ParseError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n")
}

/// Rejections from a number formatter. Only ever raised while evaluating.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormattingError {
    #[error("Value {0} out of range for number format options property style")]
    InvalidStyle(String),
    #[error("Currency code is required with currency style.")]
    MissingCurrency,
    #[error("Invalid currency code : {0}")]
    InvalidCurrency(String),
    #[error("Incorrect locale information provided: {0}")]
    InvalidLocale(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluationError {
    #[error("Expected value to be of type {expected}, but found {found} instead.")]
    TypeMismatch { expected: Type, found: Type },
    #[error(transparent)]
    Formatting(#[from] FormattingError),
}

pub type EvaluationResult<T> = Result<T, EvaluationError>;
