// src/core/validators.rs

//! Built-in argument validators.
//!
//! A validator checks one raw token and either converts it into a typed
//! [`Value`] or explains why it was rejected. Validators are built once per
//! argument declaration and are shared read-only between concurrent requests.

use crate::core::host::{Caller, EntityDirectory};
use crate::models::Value;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Which side of a bound was violated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Limit<T> {
    /// Below the minimum.
    AtLeast(T),
    /// Above the maximum.
    AtMost(T),
}

impl<T: fmt::Display> fmt::Display for Limit<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AtLeast(bound) => write!(f, "at least {}", bound),
            Self::AtMost(bound) => write!(f, "at most {}", bound),
        }
    }
}

/// Why an entity lookup failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundReason {
    /// No such entity is known.
    Unknown,
    /// Known, but not online while online entities are required.
    Offline,
}

impl fmt::Display for NotFoundReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str("was not found"),
            Self::Offline => f.write_str("is not online"),
        }
    }
}

/// Why a single token was refused.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Not a number.
    #[error("{name} must be a valid number, got '{input}'")]
    ParseError { name: String, input: String },
    /// A number outside the declared range.
    #[error("{name} must be {limit}")]
    RangeError { name: String, limit: Limit<f64> },
    /// Text outside the declared length, counted in characters.
    #[error("{name} must be {limit} characters long")]
    LengthError { name: String, limit: Limit<usize> },
    /// A blank token where a value is required.
    #[error("{name} requires a value")]
    MissingValue { name: String },
    /// Not one of the allowed tokens.
    #[error("'{input}' is not a valid value for '{name}'. Allowed values: {allowed}")]
    InvalidEnumeration {
        name: String,
        input: String,
        allowed: String,
    },
    /// The token names no usable entity.
    #[error("'{input}' {reason}")]
    NotFound {
        name: String,
        input: String,
        reason: NotFoundReason,
    },
}

/// Either the converted value or the reason the token was refused.
pub type ValidationOutcome = Result<Value, ValidationError>;

/// Checks and converts a single raw token.
pub trait Validator: Send + Sync + fmt::Debug {
    /// Converts `input` or explains why it is not acceptable.
    fn validate(&self, input: &str, caller: &dyn Caller) -> ValidationOutcome;

    /// Candidate tokens, unfiltered; the router narrows them by prefix.
    fn completions(&self, _caller: &dyn Caller) -> Vec<String> {
        Vec::new()
    }
}

// --- NUMBER ---

/// Accepts any `f64` within `min..=max`. `NaN` never parses.
#[derive(Debug, Clone)]
pub struct NumberValidator {
    name: String,
    min: f64,
    max: f64,
}

impl NumberValidator {
    /// `min` must not exceed `max`.
    pub fn new(name: impl Into<String>, min: f64, max: f64) -> Self {
        Self {
            name: name.into(),
            min,
            max,
        }
    }
}

impl Validator for NumberValidator {
    fn validate(&self, input: &str, _caller: &dyn Caller) -> ValidationOutcome {
        let value = input
            .parse::<f64>()
            .ok()
            .filter(|v| !v.is_nan())
            .ok_or_else(|| ValidationError::ParseError {
                name: self.name.clone(),
                input: input.to_string(),
            })?;
        if value < self.min {
            return Err(ValidationError::RangeError {
                name: self.name.clone(),
                limit: Limit::AtLeast(self.min),
            });
        }
        if value > self.max {
            return Err(ValidationError::RangeError {
                name: self.name.clone(),
                limit: Limit::AtMost(self.max),
            });
        }
        Ok(Value::Number(value))
    }
}

// --- STRING ---

/// Accepts text whose length in characters is within bounds.
#[derive(Debug, Clone)]
pub struct StringValidator {
    name: String,
    min_length: usize,
    max_length: usize,
}

impl StringValidator {
    /// Lengths are counted in characters, not bytes.
    pub fn new(name: impl Into<String>, min_length: usize, max_length: usize) -> Self {
        Self {
            name: name.into(),
            min_length,
            max_length,
        }
    }
}

impl Validator for StringValidator {
    fn validate(&self, input: &str, _caller: &dyn Caller) -> ValidationOutcome {
        let length = input.chars().count();
        if length < self.min_length {
            return Err(ValidationError::LengthError {
                name: self.name.clone(),
                limit: Limit::AtLeast(self.min_length),
            });
        }
        if length > self.max_length {
            return Err(ValidationError::LengthError {
                name: self.name.clone(),
                limit: Limit::AtMost(self.max_length),
            });
        }
        Ok(Value::Text(input.to_string()))
    }
}

// --- BOOLEAN ---

/// Maps declared tokens to `true` or `false`, ignoring case.
#[derive(Debug, Clone)]
pub struct BooleanValidator {
    name: String,
    true_values: Vec<String>,
    false_values: Vec<String>,
}

impl BooleanValidator {
    /// Both token lists must be non-empty; the registry factory enforces this.
    pub fn new(name: impl Into<String>, true_values: Vec<String>, false_values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            true_values,
            false_values,
        }
    }

    fn matches(candidates: &[String], input: &str) -> bool {
        candidates.iter().any(|c| c.to_lowercase() == input)
    }
}

impl Validator for BooleanValidator {
    fn validate(&self, input: &str, _caller: &dyn Caller) -> ValidationOutcome {
        if input.trim().is_empty() {
            return Err(ValidationError::MissingValue {
                name: self.name.clone(),
            });
        }
        let lowered = input.to_lowercase();
        if Self::matches(&self.true_values, &lowered) {
            return Ok(Value::Bool(true));
        }
        if Self::matches(&self.false_values, &lowered) {
            return Ok(Value::Bool(false));
        }
        // The formatted `Value::Bool` must validate back to itself.
        match lowered.as_str() {
            "true" => return Ok(Value::Bool(true)),
            "false" => return Ok(Value::Bool(false)),
            _ => {}
        }
        Err(ValidationError::InvalidEnumeration {
            name: self.name.clone(),
            input: input.to_string(),
            allowed: format!(
                "{} or {}",
                self.true_values.join(", "),
                self.false_values.join(", ")
            ),
        })
    }

    fn completions(&self, _caller: &dyn Caller) -> Vec<String> {
        self.true_values
            .first()
            .into_iter()
            .chain(self.false_values.first())
            .cloned()
            .collect()
    }
}

// --- ENUMERATION ---

/// Accepts one of a fixed list of values and yields its declared spelling.
#[derive(Debug, Clone)]
pub struct EnumValidator {
    name: String,
    allowed: Vec<String>,
    case_sensitive: bool,
}

impl EnumValidator {
    /// `allowed` must not be empty.
    pub fn new(name: impl Into<String>, allowed: Vec<String>, case_sensitive: bool) -> Self {
        Self {
            name: name.into(),
            allowed,
            case_sensitive,
        }
    }
}

impl Validator for EnumValidator {
    fn validate(&self, input: &str, _caller: &dyn Caller) -> ValidationOutcome {
        if input.is_empty() {
            return Err(ValidationError::MissingValue {
                name: self.name.clone(),
            });
        }
        let canonical = if self.case_sensitive {
            self.allowed.iter().find(|value| value.as_str() == input)
        } else {
            let lowered = input.to_lowercase();
            self.allowed
                .iter()
                .find(|value| value.to_lowercase() == lowered)
        };
        canonical
            .map(|value| Value::Text(value.clone()))
            .ok_or_else(|| ValidationError::InvalidEnumeration {
                name: self.name.clone(),
                input: input.to_string(),
                allowed: self.allowed.join(", "),
            })
    }

    fn completions(&self, _caller: &dyn Caller) -> Vec<String> {
        self.allowed.clone()
    }
}

// --- ENTITY REFERENCE ---

/// Resolves a token to an entity through the host's directory.
pub struct EntityReferenceValidator {
    name: String,
    online_only: bool,
    directory: Arc<dyn EntityDirectory>,
}

impl EntityReferenceValidator {
    /// With `online_only`, known but offline entities are refused.
    pub fn new(name: impl Into<String>, online_only: bool, directory: Arc<dyn EntityDirectory>) -> Self {
        Self {
            name: name.into(),
            online_only,
            directory,
        }
    }
}

impl fmt::Debug for EntityReferenceValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityReferenceValidator")
            .field("name", &self.name)
            .field("online_only", &self.online_only)
            .finish_non_exhaustive()
    }
}

impl Validator for EntityReferenceValidator {
    fn validate(&self, input: &str, _caller: &dyn Caller) -> ValidationOutcome {
        let not_found = |reason| ValidationError::NotFound {
            name: self.name.clone(),
            input: input.to_string(),
            reason,
        };
        match self.directory.lookup(input) {
            None => Err(not_found(NotFoundReason::Unknown)),
            Some(entity) if self.online_only && !entity.online => {
                Err(not_found(NotFoundReason::Offline))
            }
            Some(entity) => Ok(Value::Entity(entity)),
        }
    }

    fn completions(&self, _caller: &dyn Caller) -> Vec<String> {
        self.directory.online_identifiers()
    }
}
