// src/core/testing.rs
// Shared fixtures for the unit tests of the `core` modules.

use crate::core::host::{Caller, EntityDirectory, InMemoryDirectory};
use crate::core::handler::{Action, action};
use crate::core::registry::CommandRegistry;
use crate::core::validator_registry::ValidatorRegistry;
use crate::models::{ArgumentDeclaration, CommandDefinition, EntityRef};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A caller that records every message sent to it.
#[derive(Debug, Default)]
pub(crate) struct TestCaller {
    name: String,
    permissions: HashSet<String>,
    messages: Mutex<Vec<String>>,
}

impl TestCaller {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub(crate) fn with_permissions(name: &str, permissions: &[&str]) -> Self {
        Self {
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            ..Self::new(name)
        }
    }

    pub(crate) fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Caller for TestCaller {
    fn name(&self) -> &str {
        &self.name
    }

    fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    fn send_message(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

/// Counts invocations so tests can assert an action did (not) run.
#[derive(Debug, Default, Clone)]
pub(crate) struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    pub(crate) fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    pub(crate) fn action(&self) -> Action {
        let counter = Arc::clone(&self.0);
        action(move |_caller, _args| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }
}

pub(crate) fn sample_directory() -> Arc<dyn EntityDirectory> {
    Arc::new(InMemoryDirectory::with_entities([
        EntityRef::online("Alice"),
        EntityRef::online("Albert"),
        EntityRef::offline("Bob"),
    ]))
}

/// The `serverinfo` command family: a bare root, `performance`, `player` and
/// `player inventory`, all bound to `counter`.
pub(crate) fn serverinfo_registry(counter: &CallCounter) -> CommandRegistry {
    let mut registry = CommandRegistry::new(ValidatorRegistry::with_builtins(sample_directory()));
    let definitions = [
        CommandDefinition::new("serverinfo")
            .description("Shows server information")
            .permission("serverutils.serverinfo")
            .with_context(),
        CommandDefinition::new("performance")
            .parent(["serverinfo"])
            .description("Shows performance information")
            .permission("serverutils.serverinfo.performance")
            .with_context()
            .argument(
                ArgumentDeclaration::one_of("detail", ["basic", "full"])
                    .description("Detail level")
                    .optional(),
            ),
        CommandDefinition::new("player")
            .parent(["serverinfo"])
            .description("Shows player information")
            .with_context()
            .argument(ArgumentDeclaration::player("target"))
            .argument(ArgumentDeclaration::string("infoType").length(3, 10)),
        CommandDefinition::new("inventory")
            .parent(["serverinfo", "player"])
            .description("Shows a player's inventory")
            .with_context()
            .argument(ArgumentDeclaration::player("target")),
    ];
    for definition in definitions {
        registry.register(definition, counter.action()).unwrap();
    }
    registry
}

pub(crate) fn tokens(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}
