// src/core/mod.rs

pub mod handler;
/// Help and usage rendering.
pub mod help;
pub mod host;
pub mod manifest;
pub mod registry;
/// Argument kinds and their validator factories.
pub mod validator_registry;
pub mod validators;

#[cfg(test)]
pub(crate) mod testing;
