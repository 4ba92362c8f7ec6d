//! The currencies a user can choose from and how amounts are displayed in each.

use std::{fmt::Display, str::FromStr, sync::OnceLock};

use numfmt::{Formatter, Precision};

use crate::Error;

/// A currency supported by the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Currency {
    /// United States dollar, the default.
    #[default]
    Usd,
    /// Euro.
    Eur,
    /// Japanese yen.
    Jpy,
    /// Pound sterling.
    Gbp,
    /// Peruvian sol.
    Pen,
}

/// Every supported currency, in the order they are shown to the user.
pub const CURRENCIES: [Currency; 5] = [
    Currency::Usd,
    Currency::Eur,
    Currency::Jpy,
    Currency::Gbp,
    Currency::Pen,
];

/// Where the currency symbol goes and which characters separate digit groups
/// and decimals.
struct Locale {
    name: &'static str,
    group_separator: char,
    decimal_separator: char,
    symbol_first: bool,
}

const EN_US: Locale = Locale {
    name: "en-US",
    group_separator: ',',
    decimal_separator: '.',
    symbol_first: true,
};

const EN_GB: Locale = Locale {
    name: "en-GB",
    ..EN_US
};

const JA_JP: Locale = Locale {
    name: "ja-JP",
    ..EN_US
};

const DE_DE: Locale = Locale {
    name: "de-DE",
    group_separator: '.',
    decimal_separator: ',',
    symbol_first: false,
};

const ES_ES: Locale = Locale {
    name: "es-ES",
    ..DE_DE
};

static LOCALES: [Locale; 5] = [EN_US, EN_GB, JA_JP, DE_DE, ES_ES];

/// The formatting rules for the locale named `name`, falling back to "en-US".
fn locale_rules(name: &str) -> &'static Locale {
    LOCALES
        .iter()
        .find(|locale| locale.name == name)
        .unwrap_or(&EN_US)
}

impl Currency {
    /// The ISO 4217 code, e.g. "USD".
    pub fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Jpy => "JPY",
            Currency::Gbp => "GBP",
            Currency::Pen => "PEN",
        }
    }

    /// The label shown in the currency picker.
    pub fn label(self) -> &'static str {
        match self {
            Currency::Usd => "$ Dollar",
            Currency::Eur => "€ Euro",
            Currency::Jpy => "¥ Yen",
            Currency::Gbp => "£ Pound",
            Currency::Pen => "S Sol",
        }
    }

    /// The BCP 47 locale used to format amounts in this currency.
    pub fn locale(self) -> &'static str {
        match self {
            Currency::Usd => "en-US",
            Currency::Eur => "de-DE",
            Currency::Jpy => "ja-JP",
            Currency::Gbp => "en-GB",
            Currency::Pen => "es-ES",
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Jpy => "¥",
            Currency::Gbp => "£",
            Currency::Pen => "PEN",
        }
    }

    fn decimal_places(self) -> u32 {
        match self {
            Currency::Jpy => 0,
            _ => 2,
        }
    }

    /// Format `amount` for display, e.g. "$1,234.50" or "1.234,50 €".
    pub fn format(self, amount: f64) -> String {
        let locale = locale_rules(self.locale());
        let decimal_places = self.decimal_places();
        let scale = 10_i64.pow(decimal_places);

        let minor_units = (amount.abs() * scale as f64).round() as i64;
        let whole = minor_units / scale;
        let fraction = minor_units % scale;

        let mut number = group_digits(whole);
        if locale.group_separator != ',' {
            number = number.replace(',', &locale.group_separator.to_string());
        }
        if decimal_places > 0 {
            number = format!(
                "{number}{}{fraction:0width$}",
                locale.decimal_separator,
                width = decimal_places as usize
            );
        }

        let sign = if amount < 0.0 && minor_units != 0 {
            "-"
        } else {
            ""
        };

        if locale.symbol_first {
            format!("{sign}{}{number}", self.symbol())
        } else {
            format!("{sign}{number} {}", self.symbol())
        }
    }
}

/// Insert a comma between every group of three digits.
fn group_digits(whole: i64) -> String {
    static FORMATTER: OnceLock<Option<Formatter>> = OnceLock::new();

    let formatter = FORMATTER.get_or_init(|| {
        Formatter::new()
            .separator(',')
            .map(|formatter| formatter.precision(Precision::Decimals(0)))
            .ok()
    });

    match formatter {
        // Zero is hardcoded as "0" by numfmt so it needs no special casing here.
        Some(formatter) => formatter.fmt_string(whole as f64),
        None => whole.to_string(),
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = Error;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        CURRENCIES
            .into_iter()
            .find(|currency| currency.code() == code)
            .ok_or_else(|| Error::UnknownCurrency(code.to_owned()))
    }
}

#[cfg(test)]
mod currency_tests {
    use std::str::FromStr;

    use crate::Error;

    use super::{CURRENCIES, Currency, locale_rules};

    #[test]
    fn parses_known_codes() {
        assert_eq!(Currency::from_str("EUR"), Ok(Currency::Eur));
        assert_eq!(Currency::from_str("PEN"), Ok(Currency::Pen));
    }

    #[test]
    fn rejects_unknown_code() {
        assert_eq!(
            Currency::from_str("BTC"),
            Err(Error::UnknownCurrency("BTC".to_owned()))
        );
    }

    #[test]
    fn default_is_usd() {
        assert_eq!(Currency::default().code(), "USD");
    }

    #[test]
    fn formats_dollars() {
        assert_eq!(Currency::Usd.format(1234.5), "$1,234.50");
        assert_eq!(Currency::Usd.format(0.0), "$0.00");
        assert_eq!(Currency::Usd.format(-12.3), "-$12.30");
    }

    #[test]
    fn formats_euros_with_trailing_symbol() {
        assert_eq!(Currency::Eur.format(1234.5), "1.234,50 €");
    }

    #[test]
    fn formats_yen_without_decimals() {
        assert_eq!(Currency::Jpy.format(1234.5), "¥1,235");
    }

    #[test]
    fn formats_sol_and_pound() {
        assert_eq!(Currency::Pen.format(19.99), "19,99 PEN");
        assert_eq!(Currency::Gbp.format(1_000_000.0), "£1,000,000.00");
    }

    #[test]
    fn labels_and_locales() {
        assert_eq!(Currency::Jpy.label(), "¥ Yen");
        assert_eq!(Currency::Pen.locale(), "es-ES");
    }

    #[test]
    fn every_currency_locale_has_formatting_rules() {
        for currency in CURRENCIES {
            assert_eq!(locale_rules(currency.locale()).name, currency.locale());
        }
    }

    #[test]
    fn unknown_locale_formats_like_en_us() {
        assert_eq!(locale_rules("fr-FR").name, "en-US");
    }
}
