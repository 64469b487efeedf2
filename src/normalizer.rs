//! Duration normalization.
//!
//! Converts a duration component (a decimal quantity tagged with a unit name)
//! into seconds. The multipliers are fixed: a month is 30 days and a year is
//! 365 days, which is the approximation the NLP provider itself uses.
//! Arithmetic is done on [`Decimal`] so that results compare equal as
//! strings. Quantities that do not fit a `Decimal` are rejected.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::NormalizeError;

const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 60 * SECONDS_PER_MINUTE;
const SECONDS_PER_DAY: u64 = 24 * SECONDS_PER_HOUR;
const SECONDS_PER_MONTH: u64 = 30 * SECONDS_PER_DAY;
const SECONDS_PER_YEAR: u64 = 365 * SECONDS_PER_DAY;

/// Largest exponent magnitude a `Decimal` can absorb
const MAX_EXPONENT: u32 = 28;

/// Units a duration component can be expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationUnit {
    Second,
    Minute,
    Hour,
    Day,
    Month,
    Year,
}

impl DurationUnit {
    /// All units, smallest first. Also the set of duration sub-field names.
    pub const ALL: [DurationUnit; 6] = [
        DurationUnit::Second,
        DurationUnit::Minute,
        DurationUnit::Hour,
        DurationUnit::Day,
        DurationUnit::Month,
        DurationUnit::Year,
    ];

    /// The unit name as it appears in the payload
    pub fn as_str(&self) -> &'static str {
        match self {
            DurationUnit::Second => "second",
            DurationUnit::Minute => "minute",
            DurationUnit::Hour => "hour",
            DurationUnit::Day => "day",
            DurationUnit::Month => "month",
            DurationUnit::Year => "year",
        }
    }

    /// Number of seconds in one unit
    pub fn seconds(&self) -> u64 {
        match self {
            DurationUnit::Second => 1,
            DurationUnit::Minute => SECONDS_PER_MINUTE,
            DurationUnit::Hour => SECONDS_PER_HOUR,
            DurationUnit::Day => SECONDS_PER_DAY,
            DurationUnit::Month => SECONDS_PER_MONTH,
            DurationUnit::Year => SECONDS_PER_YEAR,
        }
    }
}

impl fmt::Display for DurationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DurationUnit {
    type Err = NormalizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DurationUnit::ALL
            .iter()
            .copied()
            .find(|unit| unit.as_str() == s)
            .ok_or_else(|| NormalizeError::UnsupportedUnit(s.to_string()))
    }
}

/// A quantity with its unit, the value kept as an exact decimal string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationQuantity {
    pub value: String,
    pub unit: String,
}

impl DurationQuantity {
    pub fn new(value: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            unit: unit.into(),
        }
    }
}

/// Convert `value` expressed in `unit` into seconds.
///
/// # Example
///
/// ```
/// use nlpkit::normalizer::{normalize, DurationUnit};
///
/// let total = normalize("2", DurationUnit::Minute).unwrap();
/// assert_eq!(total.value, "120");
/// assert_eq!(total.unit, "second");
/// ```
pub fn normalize(value: &str, unit: DurationUnit) -> Result<DurationQuantity, NormalizeError> {
    let invalid = || NormalizeError::InvalidQuantity(value.to_string());
    let quantity = parse_quantity(value).ok_or_else(invalid)?;
    let seconds = quantity
        .checked_mul(Decimal::from(unit.seconds()))
        .ok_or_else(invalid)?;

    Ok(DurationQuantity::new(
        seconds.normalize().to_string(),
        DurationUnit::Second.as_str(),
    ))
}

/// Same as [`normalize`], with the unit given by name.
///
/// Fails with [`NormalizeError::UnsupportedUnit`] for names outside
/// second/minute/hour/day/month/year.
pub fn normalize_str(value: &str, unit: &str) -> Result<DurationQuantity, NormalizeError> {
    let unit = unit.parse::<DurationUnit>()?;
    normalize(value, unit)
}

/// Parse a JSON-style decimal literal (`-12`, `1.50`, `2e3`)
fn parse_quantity(value: &str) -> Option<Decimal> {
    let text = value.trim();
    match text.split_once(['e', 'E']) {
        Some((_, exponent)) => {
            let magnitude = exponent.trim_start_matches(['+', '-']).parse::<u32>().ok()?;
            if magnitude > MAX_EXPONENT {
                return None;
            }
            Decimal::from_scientific(text).ok()
        }
        None => Decimal::from_str_exact(text).ok(),
    }
}
