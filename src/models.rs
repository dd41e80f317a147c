// src/models.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use crate::constants::{
    KIND_BOOLEAN, KIND_ENUM, KIND_NUMBER, KIND_PLAYER, KIND_STRING, PATH_SEPARATOR,
};

// --- ARGUMENT MODELS ---
// Declarations are plain data: they can be built in code or deserialized from a
// TOML manifest, and are never mutated once handed to the registry.

/// Kind-specific settings of an argument. Every field is optional; each
/// validator factory reads only the ones that concern it and falls back to its
/// own defaults for the rest.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Constraints {
    /// Lower numeric bound (inclusive).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Upper numeric bound (inclusive).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Minimum length in characters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    /// Maximum length in characters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Allowed values of an enumeration, in their canonical spelling.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
    /// Whether enumeration matching honours case.
    pub case_sensitive: bool,
    /// Tokens read as `true` by a boolean argument.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub true_values: Vec<String>,
    /// Tokens read as `false` by a boolean argument.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub false_values: Vec<String>,
    /// Whether an entity reference must be currently online.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub online_only: Option<bool>,
    /// Free-form settings for custom validator kinds.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,
}

/// Describes one positional argument of a command.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ArgumentDeclaration {
    /// Name shown in usage lines and used to look the value up.
    pub name: String,
    /// One-line description for help output.
    #[serde(default)]
    pub description: String,
    /// Whether the command is rejected when the argument is missing.
    #[serde(default = "default_required")]
    pub required: bool,
    /// Identifier of the validator factory that checks this argument.
    pub kind: String,
    /// Kind-specific settings, flattened into the manifest table.
    #[serde(flatten)]
    pub constraints: Constraints,
}

fn default_required() -> bool {
    true
}

impl ArgumentDeclaration {
    /// Creates a required argument of an arbitrary kind with no constraints.
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            required: true,
            kind: kind.into(),
            constraints: Constraints::default(),
        }
    }

    /// A number bounded by `min..=max`.
    pub fn number(name: impl Into<String>, min: f64, max: f64) -> Self {
        let mut arg = Self::new(name, KIND_NUMBER);
        arg.constraints.min = Some(min);
        arg.constraints.max = Some(max);
        arg
    }

    /// A free-form string; see [`Self::length`].
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, KIND_STRING)
    }

    /// A boolean using the default `true/1` and `false/0` tokens.
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, KIND_BOOLEAN)
    }

    /// One of a fixed list of values.
    pub fn one_of<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut arg = Self::new(name, KIND_ENUM);
        arg.constraints.values = values.into_iter().map(Into::into).collect();
        arg
    }

    /// A reference to a live entity, online only by default.
    pub fn player(name: impl Into<String>) -> Self {
        Self::new(name, KIND_PLAYER)
    }

    /// Sets the help description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Marks the argument as optional.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Limits a string argument to `min..=max` characters.
    pub fn length(mut self, min: usize, max: usize) -> Self {
        self.constraints.min_length = Some(min);
        self.constraints.max_length = Some(max);
        self
    }

    /// Makes an enum argument compare case-sensitively.
    pub fn case_sensitive(mut self) -> Self {
        self.constraints.case_sensitive = true;
        self
    }

    /// Replaces the tokens a boolean argument reads as `true` and `false`.
    pub fn tokens<T, F>(mut self, true_values: T, false_values: F) -> Self
    where
        T: IntoIterator,
        T::Item: Into<String>,
        F: IntoIterator,
        F::Item: Into<String>,
    {
        self.constraints.true_values = true_values.into_iter().map(Into::into).collect();
        self.constraints.false_values = false_values.into_iter().map(Into::into).collect();
        self
    }

    /// Whether an entity argument must be online.
    pub fn online_only(mut self, online_only: bool) -> Self {
        self.constraints.online_only = Some(online_only);
        self
    }

    /// Sets a free-form option read by custom validator kinds.
    pub fn option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.constraints.options.insert(key.into(), value.into());
        self
    }

    /// Renders the argument as `<name>` when required and `[name]` otherwise.
    pub fn placeholder(&self) -> String {
        if self.required {
            format!("<{}>", self.name)
        } else {
            format!("[{}]", self.name)
        }
    }
}

// --- VALUE MODELS ---

/// A live entity known to the host, e.g. a connected player.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityRef {
    /// Stable identity.
    pub id: Uuid,
    /// Display name, also the identifier used in lookups.
    pub name: String,
    /// Whether the entity is currently online.
    pub online: bool,
}

impl EntityRef {
    /// Creates an online entity with a fresh random id.
    pub fn online(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            online: true,
        }
    }

    /// Creates a known but offline entity with a fresh random id.
    pub fn offline(name: impl Into<String>) -> Self {
        Self {
            online: false,
            ..Self::online(name)
        }
    }
}

/// A token after successful validation and conversion.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Value {
    /// From a `number` argument.
    Number(f64),
    /// From a `string` or `string-enum` argument.
    Text(String),
    /// From a `boolean` argument.
    Bool(bool),
    /// From a `player` or `entity` argument.
    Entity(EntityRef),
}

impl Value {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_entity(&self) -> Option<&EntityRef> {
        match self {
            Self::Entity(e) => Some(e),
            _ => None,
        }
    }
}

/// Formats the value back into a token that validates to the same value.
/// Booleans print as `true`/`false`, which every boolean argument accepts
/// whatever its declared tokens.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Entity(e) => f.write_str(&e.name),
        }
    }
}

// --- COMMAND MODELS ---

/// Input describing a command before registration.
///
/// Built in code through the chained setters or read from a manifest
/// (see `core::manifest`).
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct CommandDefinition {
    /// The last path segment.
    pub name: String,
    /// Parent path segments, outermost first (`["serverinfo", "player"]`).
    #[serde(default)]
    pub parent: Vec<String>,
    /// One-line description for help output.
    #[serde(default)]
    pub description: String,
    /// Permission the caller needs; empty means none.
    #[serde(default)]
    pub permission: String,
    /// Explicit usage line overriding the generated one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
    /// Whether the action receives the caller as a leading context parameter.
    #[serde(default)]
    pub context: bool,
    /// Validated arguments, in token order.
    #[serde(default)]
    pub arguments: Vec<ArgumentDeclaration>,
}

impl CommandDefinition {
    /// A root command named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Places the command below `segments`, outermost first.
    pub fn parent<I, S>(mut self, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parent = segments.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the help description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Permission node the caller must hold. Empty means none.
    pub fn permission(mut self, permission: impl Into<String>) -> Self {
        self.permission = permission.into();
        self
    }

    /// Overrides the generated usage line.
    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    /// Declares the leading caller context parameter.
    pub fn with_context(mut self) -> Self {
        self.context = true;
        self
    }

    /// Appends an argument.
    pub fn argument(mut self, argument: ArgumentDeclaration) -> Self {
        self.arguments.push(argument);
        self
    }

    /// Lowercased, dot-joined path: parent segments first, then the name.
    pub fn full_path(&self) -> String {
        self.parent
            .iter()
            .chain(std::iter::once(&self.name))
            .map(|segment| segment.to_lowercase())
            .collect::<Vec<_>>()
            .join(&PATH_SEPARATOR.to_string())
    }
}

/// Immutable metadata of a registered command, as listed for help and usage.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CommandDeclaration {
    /// Lowercase dotted path, base word first.
    pub full_path: String,
    /// One-line description for help output.
    pub description: String,
    /// Permission node; empty when none is required.
    pub permission: String,
    /// Explicit usage line, if one was declared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
    /// Validated arguments, in token order.
    pub arguments: Vec<ArgumentDeclaration>,
}

impl CommandDeclaration {
    pub(crate) fn from_definition(definition: &CommandDefinition) -> Self {
        Self {
            full_path: definition.full_path(),
            description: definition.description.clone(),
            permission: definition.permission.clone(),
            usage: definition.usage.clone(),
            arguments: definition.arguments.clone(),
        }
    }

    /// Iterates over the path segments, base word first.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.full_path.split(PATH_SEPARATOR)
    }

    /// The first path segment, i.e. the word the command line starts with.
    pub fn base_word(&self) -> &str {
        self.segments().next().unwrap_or_default()
    }

    /// Number of segments preceding the command's own name.
    pub fn parent_count(&self) -> usize {
        self.segments().count().saturating_sub(1)
    }

    /// Whether a permission node is set.
    pub fn requires_permission(&self) -> bool {
        !self.permission.is_empty()
    }

    /// Number of arguments that must be supplied.
    pub fn required_count(&self) -> usize {
        self.arguments.iter().filter(|arg| arg.required).count()
    }

    /// `<required> [optional]` placeholders, space separated.
    pub fn parameters_line(&self) -> String {
        self.arguments
            .iter()
            .map(ArgumentDeclaration::placeholder)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The declared usage, or `/path words <args>` when none was declared.
    pub fn usage_line(&self) -> String {
        if let Some(usage) = &self.usage {
            return usage.clone();
        }
        let command = format!("/{}", self.segments().collect::<Vec<_>>().join(" "));
        let parameters = self.parameters_line();
        if parameters.is_empty() {
            command
        } else {
            format!("{} {}", command, parameters)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player_info() -> CommandDefinition {
        CommandDefinition::new("Player")
            .parent(["ServerInfo"])
            .description("Shows player information")
            .permission("serverutils.serverinfo.player")
            .with_context()
            .argument(ArgumentDeclaration::player("target"))
            .argument(ArgumentDeclaration::string("infoType").length(3, 10).optional())
    }

    #[test]
    fn test_full_path_is_lowercased_and_parent_first() {
        assert_eq!(player_info().full_path(), "serverinfo.player");
        assert_eq!(CommandDefinition::new("Root").full_path(), "root");
        let nested = CommandDefinition::new("inventory").parent(["serverinfo", "player"]);
        assert_eq!(nested.full_path(), "serverinfo.player.inventory");
    }

    #[test]
    fn test_declaration_usage_and_parameters() {
        let declaration = CommandDeclaration::from_definition(&player_info());
        assert_eq!(declaration.parameters_line(), "<target> [infoType]");
        assert_eq!(declaration.usage_line(), "/serverinfo player <target> [infoType]");
        assert_eq!(declaration.base_word(), "serverinfo");
        assert_eq!(declaration.parent_count(), 1);
        assert_eq!(declaration.required_count(), 1);
        assert!(declaration.requires_permission());
    }

    #[test]
    fn test_explicit_usage_wins() {
        let declaration = CommandDeclaration::from_definition(
            &CommandDefinition::new("serverinfo").usage("/serverinfo"),
        );
        assert_eq!(declaration.usage_line(), "/serverinfo");
        assert_eq!(declaration.parameters_line(), "");
        assert!(!declaration.requires_permission());
    }

    #[test]
    fn test_value_display_round_trips_tokens() {
        assert_eq!(Value::Number(5.0).to_string(), "5");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::Bool(false).to_string(), "false");
        assert_eq!(Value::Entity(EntityRef::online("Alice")).to_string(), "Alice");
    }

    #[test]
    fn test_argument_deserializes_flattened_constraints() {
        let arg: ArgumentDeclaration = toml::from_str(
            r#"
            name = "amount"
            kind = "number"
            min = 1
            max = 10.5
            "#,
        )
        .unwrap();
        assert!(arg.required);
        assert_eq!(arg.constraints.min, Some(1.0));
        assert_eq!(arg.constraints.max, Some(10.5));
        assert!(arg.constraints.values.is_empty());
    }
}
