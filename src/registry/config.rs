//! Classifier configuration.
//!
//! Holds the vocabularies the structural matcher relies on: which `unit`
//! values denote a currency, a temperature, a distance or a volume, and the
//! patterns used to recognize emails and phone numbers. The built-in
//! defaults cover the units the provider documents; a YAML file can extend
//! or replace them when the provider starts emitting new ones.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const DEFAULT_CURRENCIES: &[&str] = &[
    "$", "€", "£", "¥", "₹", "₩", "₽", "cent", "AED", "AUD", "BGN", "BRL", "BTC", "CAD",
    "CHF", "CNY", "CZK", "DKK", "EGP", "EUR", "GBP", "HKD", "HRK", "IDR", "ILS", "INR",
    "JPY", "KRW", "KWD", "MXN", "MYR", "NOK", "NZD", "PLN", "PTS", "QAR", "RON", "RUB",
    "SAR", "SEK", "SGD", "THB", "TRY", "TWD", "UAH", "USD", "VND", "ZAR",
];

const DEFAULT_TEMPERATURE_UNITS: &[&str] = &["celsius", "fahrenheit", "kelvin", "degree"];

const DEFAULT_DISTANCE_UNITS: &[&str] = &[
    "kilometre", "kilometer", "metre", "meter", "centimetre", "centimeter", "millimetre",
    "millimeter", "mile", "yard", "foot", "feet", "inch",
];

const DEFAULT_VOLUME_UNITS: &[&str] = &[
    "litre", "liter", "millilitre", "milliliter", "centilitre", "centiliter", "hectolitre",
    "hectoliter", "gallon",
];

const DEFAULT_EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";
const DEFAULT_PHONE_PATTERN: &str = r"^\+?[0-9][0-9 ().\-]*[0-9]$";
const DEFAULT_PHONE_MIN_DIGITS: usize = 6;

/// Vocabularies and patterns used by [`EntityRegistry`](crate::EntityRegistry).
///
/// Unit and currency names are compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// When loading from a file, add the listed units to the built-in ones
    /// instead of replacing them
    pub extend_defaults: bool,
    pub currencies: Vec<String>,
    pub temperature_units: Vec<String>,
    pub distance_units: Vec<String>,
    pub volume_units: Vec<String>,
    pub email_pattern: String,
    pub phone_pattern: String,
    /// Minimum number of digits a phone number value must contain
    pub phone_min_digits: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            extend_defaults: true,
            currencies: to_owned(DEFAULT_CURRENCIES),
            temperature_units: to_owned(DEFAULT_TEMPERATURE_UNITS),
            distance_units: to_owned(DEFAULT_DISTANCE_UNITS),
            volume_units: to_owned(DEFAULT_VOLUME_UNITS),
            email_pattern: DEFAULT_EMAIL_PATTERN.to_string(),
            phone_pattern: DEFAULT_PHONE_PATTERN.to_string(),
            phone_min_digits: DEFAULT_PHONE_MIN_DIGITS,
        }
    }
}

impl ClassifierConfig {
    /// Load classifier configuration from a YAML file.
    ///
    /// # Example
    /// ```ignore
    /// use nlpkit::registry::ClassifierConfig;
    ///
    /// let config = ClassifierConfig::load_from_file("config/classifier.yaml")?;
    /// ```
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&contents)
    }

    /// Parse classifier configuration from YAML text.
    ///
    /// Lists given in the document replace the built-in ones, unless
    /// `extend_defaults` is true (the default), in which case they are added.
    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        let mut config: ClassifierConfig = serde_yaml::from_str(contents)?;

        if config.extend_defaults {
            extend(&mut config.currencies, DEFAULT_CURRENCIES);
            extend(&mut config.temperature_units, DEFAULT_TEMPERATURE_UNITS);
            extend(&mut config.distance_units, DEFAULT_DISTANCE_UNITS);
            extend(&mut config.volume_units, DEFAULT_VOLUME_UNITS);
        }

        Ok(config)
    }
}

fn to_owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn extend(target: &mut Vec<String>, defaults: &[&str]) {
    for default in defaults {
        if !target.iter().any(|v| v.eq_ignore_ascii_case(default)) {
            target.push(default.to_string());
        }
    }
}
