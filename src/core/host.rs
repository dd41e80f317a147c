// src/core/host.rs

//! Interfaces the registry needs from its host: who is calling, what they may
//! do, and which live entities exist.

use crate::models::EntityRef;
use std::sync::RwLock;

/// The identity on whose behalf a command is dispatched.
///
/// The registry never inspects a caller beyond these methods; it is handed
/// through to validators and actions untouched.
pub trait Caller {
    /// A display name, used in log lines.
    fn name(&self) -> &str;

    /// Host permission predicate.
    fn has_permission(&self, permission: &str) -> bool;

    /// Delivers a caller-visible message, such as a rejection reason.
    fn send_message(&self, message: &str);
}

/// Read-only view of the entities a host currently knows about.
///
/// Implementations must answer from memory; lookups happen inside validation
/// and are expected to be fast and non-blocking.
pub trait EntityDirectory: Send + Sync {
    /// Finds a known entity (online or offline) by its identifier.
    fn lookup(&self, identifier: &str) -> Option<EntityRef>;

    /// Identifiers of all entities currently online.
    fn online_identifiers(&self) -> Vec<String>;
}

/// A thread-safe directory kept in memory, matching names case-insensitively.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    entities: RwLock<Vec<EntityRef>>,
}

impl InMemoryDirectory {
    /// An empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// A directory pre-filled with `entities`.
    pub fn with_entities(entities: impl IntoIterator<Item = EntityRef>) -> Self {
        Self {
            entities: RwLock::new(entities.into_iter().collect()),
        }
    }

    /// Adds an entity, replacing any existing one with the same name.
    pub fn insert(&self, entity: EntityRef) {
        let mut entities = self.entities.write().unwrap_or_else(|e| e.into_inner());
        entities.retain(|existing| !existing.name.eq_ignore_ascii_case(&entity.name));
        entities.push(entity);
    }

    /// Flips the online flag of a known entity. Returns `false` if unknown.
    pub fn set_online(&self, name: &str, online: bool) -> bool {
        let mut entities = self.entities.write().unwrap_or_else(|e| e.into_inner());
        match entities
            .iter_mut()
            .find(|entity| entity.name.eq_ignore_ascii_case(name))
        {
            Some(entity) => {
                entity.online = online;
                true
            }
            None => false,
        }
    }
}

impl EntityDirectory for InMemoryDirectory {
    fn lookup(&self, identifier: &str) -> Option<EntityRef> {
        let entities = self.entities.read().unwrap_or_else(|e| e.into_inner());
        entities
            .iter()
            .find(|entity| entity.name.eq_ignore_ascii_case(identifier))
            .cloned()
    }

    fn online_identifiers(&self) -> Vec<String> {
        let entities = self.entities.read().unwrap_or_else(|e| e.into_inner());
        entities
            .iter()
            .filter(|entity| entity.online)
            .map(|entity| entity.name.clone())
            .collect()
    }
}
