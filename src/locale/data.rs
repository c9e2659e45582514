// Symbol tables for the bundled engine: a small slice of CLDR.

#[derive(Debug, PartialEq, Eq)]
pub(super) struct LocaleData {
    pub language: &'static str,
    pub region: Option<&'static str>,
    pub decimal: &'static str,
    pub group: &'static str,
    pub min_grouping_digits: usize,
    pub percent_suffix: &'static str,
    pub currency: CurrencyPlacement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum CurrencyPlacement {
    /// `$5.00`; the spacer is only used when the symbol ends in a letter (`CHF 5.00`)
    Prefix { spacer: &'static str },
    /// `5,00 €`
    Suffix { spacer: &'static str },
}

const NBSP: &str = "\u{a0}";
const NNBSP: &str = "\u{202f}";

// First entry per language is what a bare language tag (or an unknown region) resolves to.
pub(super) static LOCALES: &[LocaleData] = &[
    LocaleData {
        language: "en", region: Some("US"), decimal: ".", group: ",", min_grouping_digits: 1,
        percent_suffix: "%", currency: CurrencyPlacement::Prefix { spacer: NBSP },
    },
    LocaleData {
        language: "en", region: Some("GB"), decimal: ".", group: ",", min_grouping_digits: 1,
        percent_suffix: "%", currency: CurrencyPlacement::Prefix { spacer: NBSP },
    },
    LocaleData {
        language: "de", region: Some("DE"), decimal: ",", group: ".", min_grouping_digits: 1,
        percent_suffix: "\u{a0}%", currency: CurrencyPlacement::Suffix { spacer: NBSP },
    },
    LocaleData {
        language: "de", region: Some("CH"), decimal: ".", group: "’", min_grouping_digits: 1,
        percent_suffix: "%", currency: CurrencyPlacement::Prefix { spacer: NBSP },
    },
    LocaleData {
        language: "fr", region: Some("FR"), decimal: ",", group: NNBSP, min_grouping_digits: 1,
        percent_suffix: "\u{202f}%", currency: CurrencyPlacement::Suffix { spacer: NBSP },
    },
    LocaleData {
        language: "es", region: Some("ES"), decimal: ",", group: ".", min_grouping_digits: 2,
        percent_suffix: "\u{a0}%", currency: CurrencyPlacement::Suffix { spacer: NBSP },
    },
    LocaleData {
        language: "it", region: Some("IT"), decimal: ",", group: ".", min_grouping_digits: 1,
        percent_suffix: "%", currency: CurrencyPlacement::Suffix { spacer: NBSP },
    },
    LocaleData {
        language: "ja", region: Some("JP"), decimal: ".", group: ",", min_grouping_digits: 1,
        percent_suffix: "%", currency: CurrencyPlacement::Prefix { spacer: NBSP },
    },
    LocaleData {
        language: "pt", region: Some("BR"), decimal: ",", group: ".", min_grouping_digits: 1,
        percent_suffix: "%", currency: CurrencyPlacement::Prefix { spacer: NBSP },
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct CurrencyData {
    pub symbol: String,
    pub minor_digits: usize,
}

// (ISO-4217 code, symbol, minor units)
static CURRENCIES: &[(&str, &str, usize)] = &[
    ("USD", "$", 2),
    ("EUR", "€", 2),
    ("GBP", "£", 2),
    ("JPY", "¥", 0),
    ("CNY", "CN¥", 2),
    ("KRW", "₩", 0),
    ("INR", "₹", 2),
    ("BRL", "R$", 2),
    ("CAD", "CA$", 2),
    ("AUD", "A$", 2),
    ("MXN", "MX$", 2),
    ("CHF", "CHF", 2),
    ("SEK", "SEK", 2),
    ("KWD", "KWD", 3),
    ("BHD", "BHD", 3),
];

/// Expects an already validated, upper-cased code. Unknown codes display as themselves.
pub(super) fn currency(code: &str) -> CurrencyData {
    CURRENCIES
        .iter()
        .find(|(c, _, _)| *c == code)
        .map(|(_, symbol, minor_digits)| CurrencyData { symbol: symbol.to_string(), minor_digits: *minor_digits })
        .unwrap_or_else(|| CurrencyData { symbol: code.to_string(), minor_digits: 2 })
}

/// Exact language+region first, then the language's primary entry.
pub(super) fn lookup(language: &str, region: Option<&str>) -> Option<&'static LocaleData> {
    let language = language.to_ascii_lowercase();
    let lang = language.as_str();
    let same_language = move || LOCALES.iter().filter(move |l| l.language == lang);
    if let Some(region) = region {
        let region = region.to_ascii_uppercase();
        if let Some(hit) = same_language().find(|l| l.region == Some(region.as_str())) {
            return Some(hit);
        }
    }
    same_language().next()
}
