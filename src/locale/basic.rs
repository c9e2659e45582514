use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::data::{self, CurrencyPlacement, LocaleData};
use super::{FormatOptions, FormatStyle, NumberFormatProvider, NumberFormatter};
use crate::error::FormattingError;

// language[-script][-region][-variant]*[-extension]*[-x-private], enough to reject garbage
// without a full BCP-47 grammar
static LOCALE_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^(?P<lang>[A-Za-z]{2,3}|[A-Za-z]{5,8})",
        r"(?:-[A-Za-z]{4})?",
        r"(?:-(?P<region>[A-Za-z]{2}|[0-9]{3}))?",
        r"(?:-(?:[A-Za-z0-9]{5,8}|[0-9][A-Za-z0-9]{3}))*",
        r"(?:-[0-9A-WY-Za-wy-z](?:-[A-Za-z0-9]{2,8})+)*",
        r"(?:-[xX](?:-[A-Za-z0-9]{1,8})+)?$",
    ))
    .expect("locale tag pattern")
});

static CURRENCY_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]{3}$").expect("currency code pattern"));

const DECIMAL_MAX_FRACTION: usize = 3;
const FALLBACK_LOCALE: &str = "en-US";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicFormatterConfig {
    /// Used when an expression supplies no locale, or none of the requested ones is known.
    pub default_locale: String,
}

impl Default for BasicFormatterConfig {
    fn default() -> Self {
        Self { default_locale: FALLBACK_LOCALE.to_string() }
    }
}

/// Deterministic table-driven formatter following `Intl.NumberFormat` defaults.
#[derive(Debug, Clone, Default)]
pub struct BasicNumberFormat {
    config: BasicFormatterConfig,
}

impl BasicNumberFormat {
    pub fn new(config: BasicFormatterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BasicFormatterConfig {
        &self.config
    }

    fn resolve_locale(&self, locales: &[String]) -> Result<&'static LocaleData, FormattingError> {
        // every requested tag is validated, even ones after the first match
        let mut parsed = Vec::with_capacity(locales.len());
        for tag in locales {
            parsed.push(parse_tag(tag).ok_or_else(|| FormattingError::InvalidLocale(tag.clone()))?);
        }
        if let Some(hit) = parsed.iter().find_map(|(lang, region)| data::lookup(lang, region.as_deref())) {
            return Ok(hit);
        }
        let default = parse_tag(&self.config.default_locale)
            .and_then(|(lang, region)| data::lookup(&lang, region.as_deref()));
        match default {
            Some(hit) => Ok(hit),
            None => {
                log::warn!("default locale {:?} has no data, using {FALLBACK_LOCALE}", self.config.default_locale);
                Ok(&data::LOCALES[0])
            }
        }
    }
}

fn parse_tag(tag: &str) -> Option<(String, Option<String>)> {
    let caps = LOCALE_TAG.captures(tag)?;
    let lang = caps.name("lang")?.as_str().to_string();
    let region = caps.name("region").map(|m| m.as_str().to_string());
    Some((lang, region))
}

impl NumberFormatProvider for BasicNumberFormat {
    fn construct(
        &self,
        locales: &[String],
        options: &FormatOptions,
    ) -> Result<Box<dyn NumberFormatter>, FormattingError> {
        let locale = self.resolve_locale(locales)?;
        let style: FormatStyle = options.style.parse()?;

        let currency = match &options.currency {
            Some(code) if !CURRENCY_CODE.is_match(code) => {
                return Err(FormattingError::InvalidCurrency(code.clone()));
            }
            Some(code) => Some(data::currency(&code.to_ascii_uppercase())),
            None => None,
        };

        let (min_fraction, max_fraction, currency) = match style {
            FormatStyle::Decimal => (0, DECIMAL_MAX_FRACTION, None),
            FormatStyle::Percent => (0, 0, None),
            FormatStyle::Currency => {
                let currency = currency.ok_or(FormattingError::MissingCurrency)?;
                (currency.minor_digits, currency.minor_digits, Some(currency.symbol))
            }
        };

        log::debug!(
            "basic formatter: {}-{} style={style:?} fraction={min_fraction}..={max_fraction}",
            locale.language,
            locale.region.unwrap_or("?"),
        );

        Ok(Box::new(BasicFormatter { locale, style, currency, min_fraction, max_fraction }))
    }
}

struct BasicFormatter {
    locale: &'static LocaleData,
    style: FormatStyle,
    currency: Option<String>,
    min_fraction: usize,
    max_fraction: usize,
}

impl NumberFormatter for BasicFormatter {
    fn format(&self, number: f64) -> String {
        let negative = !number.is_nan() && number.is_sign_negative();
        let scaled = match self.style {
            FormatStyle::Percent => number * 100.0,
            _ => number,
        };

        let body = if scaled.is_nan() {
            "NaN".to_string()
        } else if scaled.is_infinite() {
            "∞".to_string()
        } else {
            self.digits(scaled.abs())
        };

        let mut out = String::new();
        if negative {
            out.push('-');
        }
        match (self.style, &self.currency) {
            (FormatStyle::Currency, Some(symbol)) => match self.locale.currency {
                CurrencyPlacement::Prefix { spacer } => {
                    out.push_str(symbol);
                    if symbol.chars().last().is_some_and(char::is_alphabetic) {
                        out.push_str(spacer);
                    }
                    out.push_str(&body);
                }
                CurrencyPlacement::Suffix { spacer } => {
                    out.push_str(&body);
                    out.push_str(spacer);
                    out.push_str(symbol);
                }
            },
            (FormatStyle::Percent, _) => {
                out.push_str(&body);
                out.push_str(self.locale.percent_suffix);
            }
            _ => out.push_str(&body),
        }
        out
    }
}

impl BasicFormatter {
    fn digits(&self, abs: f64) -> String {
        let (int_part, frac_part) = round_half_expand(abs, self.min_fraction, self.max_fraction);
        let mut out = group_integer(&int_part, self.locale.group, self.locale.min_grouping_digits);
        if !frac_part.is_empty() {
            out.push_str(self.locale.decimal);
            out.push_str(&frac_part);
        }
        out
    }
}

/// Rounds a non-negative finite value to `max_fraction` digits, half away from zero,
/// then trims trailing zeros down to `min_fraction`.
///
/// Rounding starts from the shortest decimal that reads back as `abs` (what `Display`
/// prints), not from its exact binary expansion, so `1.0005` rounds up to `1.001`.
fn round_half_expand(abs: f64, min_fraction: usize, max_fraction: usize) -> (String, String) {
    let text = format!("{abs}");
    let (int_text, frac_text) = text.split_once('.').unwrap_or((text.as_str(), ""));

    let mut digits: Vec<u8> = int_text.bytes().chain(frac_text.bytes()).map(|b| b - b'0').collect();
    let mut int_len = int_text.len();
    let keep = int_len + max_fraction;
    let round_up = digits.get(keep).is_some_and(|d| *d >= 5);
    digits.resize(keep, 0);

    if round_up {
        let mut i = keep;
        loop {
            if i == 0 {
                digits.insert(0, 1);
                int_len += 1;
                break;
            }
            i -= 1;
            if digits[i] == 9 {
                digits[i] = 0;
            } else {
                digits[i] += 1;
                break;
            }
        }
    }

    let to_text = |ds: &[u8]| ds.iter().map(|d| char::from(b'0' + d)).collect::<String>();
    let int_part = to_text(&digits[..int_len]);
    let mut frac_part = to_text(&digits[int_len..]);
    while frac_part.len() > min_fraction && frac_part.ends_with('0') {
        frac_part.pop();
    }
    (int_part, frac_part)
}

fn group_integer(int_part: &str, separator: &str, min_grouping_digits: usize) -> String {
    if int_part.len() < 3 + min_grouping_digits {
        return int_part.to_string();
    }
    let head = int_part.len() % 3;
    let mut out = String::with_capacity(int_part.len() + int_part.len() / 3 * separator.len());
    out.push_str(&int_part[..head]);
    for (i, chunk) in int_part.as_bytes()[head..].chunks(3).enumerate() {
        if head > 0 || i > 0 {
            out.push_str(separator);
        }
        // ascii digits only
        out.push_str(std::str::from_utf8(chunk).unwrap_or_default());
    }
    out
}
