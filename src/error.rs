//! Error types for entity narrowing, duration normalization and
//! classifier configuration.

use std::fmt;

use crate::entity::EntityKind;

/// Error type for operations on decoded entities
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NlpError {
    /// The entity holds a different variant than the one requested
    TypeMismatch {
        expected: EntityKind,
        actual: EntityKind,
    },
}

impl fmt::Display for NlpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NlpError::TypeMismatch { expected, actual } => {
                write!(f, "Type mismatch: expected {}, got {}", expected, actual)
            }
        }
    }
}

impl std::error::Error for NlpError {}

/// Error type for duration normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    /// The unit name is not one of second/minute/hour/day/month/year
    UnsupportedUnit(String),
    /// The quantity is missing or is not a plain decimal number
    InvalidQuantity(String),
}

impl fmt::Display for NormalizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizeError::UnsupportedUnit(unit) => write!(f, "Unsupported unit: {}", unit),
            NormalizeError::InvalidQuantity(value) => {
                write!(f, "Invalid quantity: '{}'", value)
            }
        }
    }
}

impl std::error::Error for NormalizeError {}

/// Error type for loading a classifier configuration
#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    YamlError(serde_yaml::Error),
    InvalidPattern(regex::Error),
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::YamlError(err)
    }
}

impl From<regex::Error> for ConfigError {
    fn from(err: regex::Error) -> Self {
        ConfigError::InvalidPattern(err)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::YamlError(e) => write!(f, "YAML error: {}", e),
            ConfigError::InvalidPattern(e) => write!(f, "Invalid pattern: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError(e) => Some(e),
            ConfigError::YamlError(e) => Some(e),
            ConfigError::InvalidPattern(e) => Some(e),
        }
    }
}
