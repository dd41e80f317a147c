// src/core/handler.rs

//! The invocation pipeline of a single command: permission check, arity
//! check, per-argument validation, then the action itself.

use crate::core::host::Caller;
use crate::core::validator_registry::{RegistryError, ValidatorRegistry};
use crate::core::validators::{ValidationError, Validator};
use crate::models::{CommandDeclaration, CommandDefinition, EntityRef, Value};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use thiserror::Error;

/// The code bound to a command. Receives the caller and the validated arguments.
pub type Action = Arc<dyn Fn(&dyn Caller, &Arguments) -> anyhow::Result<()> + Send + Sync>;

/// Wraps a closure or function into an [`Action`].
pub fn action<F>(f: F) -> Action
where
    F: Fn(&dyn Caller, &Arguments) -> anyhow::Result<()> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Why a command was not invoked (or why its invocation failed).
/// The `Display` text is what the caller gets to read.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Rejection {
    /// The caller lacks the command's permission node.
    #[error("You do not have permission to use this command.")]
    PermissionDenied { permission: String },
    /// Fewer tokens than required arguments.
    #[error("Too few arguments! Required: {required}, given: {supplied}")]
    TooFewArguments { required: usize, supplied: usize },
    /// A required argument had no token left to consume.
    #[error("Missing required argument: {name}")]
    MissingArgument { name: String },
    /// A token was refused by its argument's validator.
    #[error("Invalid argument '{name}': {source}")]
    InvalidArgument {
        name: String,
        #[source]
        source: ValidationError,
    },
    /// The action returned an error or panicked.
    #[error("An error occurred: {message}")]
    InvocationError { message: String },
}

// --- PARAMETER SLOTS ---

/// A validated positional argument.
#[derive(Debug)]
pub struct ArgumentSlot {
    /// Argument name, used in messages and for lookups in [`Arguments`].
    pub name: String,
    /// Whether leaving the argument out rejects the command.
    pub required: bool,
    /// Converts the raw token.
    pub validator: Box<dyn Validator>,
}

/// One declared parameter of an action, in order.
///
/// Keeping the caller context in the same list as the validated arguments
/// means token positions and validator positions can never drift apart.
#[derive(Debug)]
pub enum ParameterSlot {
    /// Bound to the caller; consumes no token. Only ever first.
    Context,
    /// Consumes the next token through its validator.
    Validated(ArgumentSlot),
}

// --- BOUND ARGUMENTS ---

/// What one [`ParameterSlot`] ended up bound to.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    /// The caller itself.
    Context,
    /// A validated token.
    Value { name: String, value: Value },
    /// An optional argument the caller left out.
    Absent { name: String },
}

/// The fully bound argument list handed to an action.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Arguments {
    bindings: Vec<Binding>,
}

impl Arguments {
    /// Every binding, in slot order.
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// The value bound to `name`, or `None` if absent or undeclared.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.iter().find_map(|binding| match binding {
            Binding::Value { name: n, value } if n == name => Some(value),
            _ => None,
        })
    }

    /// The numeric value of `name`, if bound to a number.
    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_number)
    }

    /// The text of `name`, if bound to a string or enum value.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_text)
    }

    /// The boolean value of `name`, if bound to a boolean.
    pub fn flag(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    /// The entity `name` refers to, if bound to an entity.
    pub fn entity(&self, name: &str) -> Option<&EntityRef> {
        self.get(name).and_then(Value::as_entity)
    }

    /// Named arguments in declaration order, skipping the context slot.
    pub fn named(&self) -> impl Iterator<Item = (&str, Option<&Value>)> {
        self.bindings.iter().filter_map(|binding| match binding {
            Binding::Context => None,
            Binding::Value { name, value } => Some((name.as_str(), Some(value))),
            Binding::Absent { name } => Some((name.as_str(), None)),
        })
    }

    /// Whether the action declared a leading caller context.
    pub fn has_context(&self) -> bool {
        matches!(self.bindings.first(), Some(Binding::Context))
    }
}

// --- HANDLER ---

/// A registered command: its declaration, its parameter slots and its action.
pub struct CommandHandler {
    declaration: CommandDeclaration,
    slots: Vec<ParameterSlot>,
    action: Action,
}

impl fmt::Debug for CommandHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandHandler")
            .field("declaration", &self.declaration)
            .field("slots", &self.slots)
            .finish_non_exhaustive()
    }
}

impl CommandHandler {
    /// Builds the slot chain for `definition`. Fails on the first argument
    /// whose validator cannot be created.
    pub fn new(
        definition: &CommandDefinition,
        action: Action,
        validators: &ValidatorRegistry,
    ) -> Result<Self, RegistryError> {
        let mut slots = Vec::with_capacity(definition.arguments.len() + 1);
        if definition.context {
            slots.push(ParameterSlot::Context);
        }
        for argument in &definition.arguments {
            slots.push(ParameterSlot::Validated(ArgumentSlot {
                name: argument.name.clone(),
                required: argument.required,
                validator: validators.create(argument)?,
            }));
        }
        Ok(Self {
            declaration: CommandDeclaration::from_definition(definition),
            slots,
            action,
        })
    }

    /// The immutable metadata this handler was built from.
    pub fn declaration(&self) -> &CommandDeclaration {
        &self.declaration
    }

    /// The parameter chain, context slot included.
    pub fn slots(&self) -> &[ParameterSlot] {
        &self.slots
    }

    fn arguments(&self) -> impl Iterator<Item = &ArgumentSlot> {
        self.slots.iter().filter_map(|slot| match slot {
            ParameterSlot::Context => None,
            ParameterSlot::Validated(argument) => Some(argument),
        })
    }

    /// Number of arguments the caller must supply.
    pub fn required_count(&self) -> usize {
        self.arguments().filter(|argument| argument.required).count()
    }

    /// Runs the whole pipeline. Any rejection is also sent to the caller.
    pub fn execute(&self, caller: &dyn Caller, tokens: &[String]) -> Result<(), Rejection> {
        let result = self
            .check_permission(caller)
            .and_then(|()| self.check_arity(tokens))
            .and_then(|()| self.bind(caller, tokens))
            .and_then(|arguments| self.invoke(caller, &arguments));
        if let Err(rejection) = &result {
            log::debug!(
                "Command '{}' rejected for {}: {:?}",
                self.declaration.full_path,
                caller.name(),
                rejection
            );
            caller.send_message(&rejection.to_string());
        }
        result
    }

    fn check_permission(&self, caller: &dyn Caller) -> Result<(), Rejection> {
        let permission = &self.declaration.permission;
        if !permission.is_empty() && !caller.has_permission(permission) {
            return Err(Rejection::PermissionDenied {
                permission: permission.clone(),
            });
        }
        Ok(())
    }

    fn check_arity(&self, tokens: &[String]) -> Result<(), Rejection> {
        let required = self.required_count();
        if tokens.len() < required {
            return Err(Rejection::TooFewArguments {
                required,
                supplied: tokens.len(),
            });
        }
        Ok(())
    }

    /// Walks the slots in order, consuming one token per validated slot.
    fn bind(&self, caller: &dyn Caller, tokens: &[String]) -> Result<Arguments, Rejection> {
        let mut remaining = tokens.iter();
        let mut bindings = Vec::with_capacity(self.slots.len());

        for slot in &self.slots {
            let argument = match slot {
                ParameterSlot::Context => {
                    bindings.push(Binding::Context);
                    continue;
                }
                ParameterSlot::Validated(argument) => argument,
            };

            let Some(token) = remaining.next() else {
                if argument.required {
                    return Err(Rejection::MissingArgument {
                        name: argument.name.clone(),
                    });
                }
                bindings.push(Binding::Absent {
                    name: argument.name.clone(),
                });
                continue;
            };

            let value = argument
                .validator
                .validate(token, caller)
                .map_err(|source| Rejection::InvalidArgument {
                    name: argument.name.clone(),
                    source,
                })?;
            bindings.push(Binding::Value {
                name: argument.name.clone(),
                value,
            });
        }

        Ok(Arguments { bindings })
    }

    /// Calls the action. Errors and panics are reported, never propagated.
    fn invoke(&self, caller: &dyn Caller, arguments: &Arguments) -> Result<(), Rejection> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| (self.action)(caller, arguments)));
        let message = match outcome {
            Ok(Ok(())) => return Ok(()),
            Ok(Err(err)) => format!("{:#}", err),
            Err(payload) => panic_message(payload.as_ref()),
        };
        log::error!(
            "Command '{}' failed for {}: {}",
            self.declaration.full_path,
            caller.name(),
            message
        );
        Err(Rejection::InvocationError { message })
    }

    /// Completions for the argument being typed.
    ///
    /// `tokens` is everything after the base word, path segments included,
    /// so the argument position is offset by the command's parent count.
    pub fn complete(&self, caller: &dyn Caller, tokens: &[String]) -> Vec<String> {
        let Some(current) = tokens.last() else {
            return Vec::new();
        };
        let Some(index) = tokens
            .len()
            .checked_sub(self.declaration.parent_count() + 1)
        else {
            return Vec::new();
        };
        let Some(argument) = self.arguments().nth(index) else {
            return Vec::new();
        };

        let current = current.to_lowercase();
        argument
            .validator
            .completions(caller)
            .into_iter()
            .filter(|candidate| candidate.to_lowercase().starts_with(&current))
            .collect()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "action panicked".to_string()
    }
}
