// src/constants.rs

/// Separator between the segments of a command's full path (`serverinfo.player`).
pub const PATH_SEPARATOR: char = '.';

/// Kind identifier of the bounds-checked numeric validator.
pub const KIND_NUMBER: &str = "number";

/// Kind identifier of the length-bounded string validator.
pub const KIND_STRING: &str = "string";

/// Kind identifier of the boolean validator.
pub const KIND_BOOLEAN: &str = "boolean";

/// Kind identifier of the allowed-value list validator.
pub const KIND_ENUM: &str = "string-enum";

/// Kind identifier of the live entity (player) reference validator.
pub const KIND_PLAYER: &str = "player";

/// Alias registered for [`KIND_PLAYER`] so hosts without players can use a neutral name.
pub const KIND_ENTITY: &str = "entity";

/// Tokens accepted as `true` by a boolean argument when none are declared.
pub const DEFAULT_TRUE_VALUES: &[&str] = &["true", "1"];

/// Tokens accepted as `false` by a boolean argument when none are declared.
pub const DEFAULT_FALSE_VALUES: &[&str] = &["false", "0"];

/// File extension picked up when loading a directory of command manifests.
pub const MANIFEST_EXTENSION: &str = "toml";
