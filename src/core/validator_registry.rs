// src/core/validator_registry.rs

use crate::constants::{
    DEFAULT_FALSE_VALUES, DEFAULT_TRUE_VALUES, KIND_BOOLEAN, KIND_ENTITY, KIND_ENUM, KIND_NUMBER,
    KIND_PLAYER, KIND_STRING,
};
use crate::core::host::EntityDirectory;
use crate::core::validators::{
    BooleanValidator, EntityReferenceValidator, EnumValidator, NumberValidator, StringValidator,
    Validator,
};
use crate::models::ArgumentDeclaration;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Configuration errors raised while registering commands. Any of them aborts
/// the registration of the offending command.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    /// No factory exists for the declared kind.
    #[error("No validator registered for kind '{kind}' (argument '{argument}')")]
    UnregisteredKind { kind: String, argument: String },
    /// The factory refused the declared constraints.
    #[error("Invalid constraints for argument '{argument}': {reason}")]
    InvalidConstraint { argument: String, reason: String },
    /// A path segment is empty or contains a dot or whitespace.
    #[error("Invalid segment '{segment}' in command path '{path}'")]
    InvalidName { path: String, segment: String },
}

/// Builds a validator from an argument declaration.
pub type ValidatorFactory =
    Arc<dyn Fn(&ArgumentDeclaration) -> Result<Box<dyn Validator>, RegistryError> + Send + Sync>;

/// Maps kind identifiers to validator factories.
///
/// Constructed explicitly and handed to the command registry, so tests and
/// hosts can run several independent instances side by side.
#[derive(Clone, Default)]
pub struct ValidatorRegistry {
    factories: HashMap<String, ValidatorFactory>,
}

impl fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.factories.keys().collect();
        kinds.sort();
        f.debug_struct("ValidatorRegistry")
            .field("kinds", &kinds)
            .finish()
    }
}

impl ValidatorRegistry {
    /// An empty registry with no kinds at all.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in kinds. Entity references resolve against
    /// `directory`.
    pub fn with_builtins(directory: Arc<dyn EntityDirectory>) -> Self {
        let mut registry = Self::new();
        registry.register(KIND_NUMBER, number_validator);
        registry.register(KIND_STRING, string_validator);
        registry.register(KIND_BOOLEAN, boolean_validator);
        registry.register(KIND_ENUM, enum_validator);

        let entity_factory: ValidatorFactory = Arc::new(
            move |arg: &ArgumentDeclaration| -> Result<Box<dyn Validator>, RegistryError> {
                Ok(Box::new(EntityReferenceValidator::new(
                    &arg.name,
                    arg.constraints.online_only.unwrap_or(true),
                    Arc::clone(&directory),
                )))
            },
        );
        registry.register_factory(KIND_PLAYER, Arc::clone(&entity_factory));
        registry.register_factory(KIND_ENTITY, entity_factory);
        registry
    }

    /// Registers `factory` for `kind`. A previous factory for the same kind is
    /// replaced.
    pub fn register<F>(&mut self, kind: impl Into<String>, factory: F)
    where
        F: Fn(&ArgumentDeclaration) -> Result<Box<dyn Validator>, RegistryError>
            + Send
            + Sync
            + 'static,
    {
        self.register_factory(kind, Arc::new(factory));
    }

    /// Same as [`Self::register`] for an already shared factory.
    pub fn register_factory(&mut self, kind: impl Into<String>, factory: ValidatorFactory) {
        let kind = kind.into();
        if self.factories.insert(kind.clone(), factory).is_some() {
            log::debug!("Validator factory for kind '{}' replaced", kind);
        }
    }

    /// Whether a factory is registered for `kind`.
    pub fn has_factory(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Builds the validator for `argument`, failing if its kind is unknown.
    pub fn create(&self, argument: &ArgumentDeclaration) -> Result<Box<dyn Validator>, RegistryError> {
        let factory =
            self.factories
                .get(&argument.kind)
                .ok_or_else(|| RegistryError::UnregisteredKind {
                    kind: argument.kind.clone(),
                    argument: argument.name.clone(),
                })?;
        factory(argument)
    }

    /// Registered kind identifiers, sorted.
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }
}

// --- BUILT-IN FACTORIES ---

fn invalid(argument: &ArgumentDeclaration, reason: impl Into<String>) -> RegistryError {
    RegistryError::InvalidConstraint {
        argument: argument.name.clone(),
        reason: reason.into(),
    }
}

fn number_validator(arg: &ArgumentDeclaration) -> Result<Box<dyn Validator>, RegistryError> {
    let min = arg.constraints.min.unwrap_or(f64::MIN);
    let max = arg.constraints.max.unwrap_or(f64::MAX);
    if min.is_nan() || max.is_nan() || min > max {
        return Err(invalid(arg, format!("min {} exceeds max {}", min, max)));
    }
    Ok(Box::new(NumberValidator::new(&arg.name, min, max)))
}

fn string_validator(arg: &ArgumentDeclaration) -> Result<Box<dyn Validator>, RegistryError> {
    let min_length = arg.constraints.min_length.unwrap_or(0);
    let max_length = arg.constraints.max_length.unwrap_or(usize::MAX);
    if min_length > max_length {
        return Err(invalid(
            arg,
            format!("min_length {} exceeds max_length {}", min_length, max_length),
        ));
    }
    Ok(Box::new(StringValidator::new(&arg.name, min_length, max_length)))
}

fn boolean_validator(arg: &ArgumentDeclaration) -> Result<Box<dyn Validator>, RegistryError> {
    let or_default = |declared: &[String], default: &[&str]| -> Vec<String> {
        if declared.is_empty() {
            default.iter().map(|s| s.to_string()).collect()
        } else {
            declared.to_vec()
        }
    };
    let true_values = or_default(&arg.constraints.true_values, DEFAULT_TRUE_VALUES);
    let false_values = or_default(&arg.constraints.false_values, DEFAULT_FALSE_VALUES);
    let folded = |values: &[String]| -> Vec<String> {
        values.iter().map(|v| v.to_lowercase()).collect()
    };
    let (folded_true, folded_false) = (folded(&true_values), folded(&false_values));
    if let Some(shared) = folded_true.iter().find(|t| folded_false.contains(*t)) {
        return Err(invalid(
            arg,
            format!("'{}' is both a true and a false token", shared),
        ));
    }
    // `true` and `false` always read as themselves.
    if folded_true.iter().any(|t| t == "false") || folded_false.iter().any(|f| f == "true") {
        return Err(invalid(arg, "'true' and 'false' cannot swap meaning"));
    }
    Ok(Box::new(BooleanValidator::new(&arg.name, true_values, false_values)))
}

fn enum_validator(arg: &ArgumentDeclaration) -> Result<Box<dyn Validator>, RegistryError> {
    if arg.constraints.values.is_empty() {
        return Err(invalid(arg, "no allowed values declared"));
    }
    Ok(Box::new(EnumValidator::new(
        &arg.name,
        arg.constraints.values.clone(),
        arg.constraints.case_sensitive,
    )))
}
