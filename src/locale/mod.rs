//! Locale-aware number formatting behind a narrow seam.
//!
//! `number-format` only ever sees the two traits below. The bundled
//! [`BasicNumberFormat`] engine is small and deterministic; hosts with real
//! CLDR data plug in their own provider.
mod basic;
mod data;

use std::str::FromStr;

use crate::error::FormattingError;

pub use basic::{BasicFormatterConfig, BasicNumberFormat};

/// The options bag handed to a provider. `style` is passed through unvalidated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormatOptions {
    pub style: String,
    pub currency: Option<String>,
}

/// Builds formatters. Shared across threads by every evaluation context that holds it.
pub trait NumberFormatProvider: Send + Sync {
    /// `locales` empty means "use the provider's default locale".
    fn construct(
        &self,
        locales: &[String],
        options: &FormatOptions,
    ) -> Result<Box<dyn NumberFormatter>, FormattingError>;
}

pub trait NumberFormatter {
    fn format(&self, number: f64) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatStyle {
    Decimal,
    Percent,
    Currency,
}

impl FromStr for FormatStyle {
    type Err = FormattingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "decimal" => Ok(FormatStyle::Decimal),
            "percent" => Ok(FormatStyle::Percent),
            "currency" => Ok(FormatStyle::Currency),
            other => Err(FormattingError::InvalidStyle(other.to_string())),
        }
    }
}
