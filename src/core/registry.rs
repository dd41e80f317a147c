// src/core/registry.rs

//! The command namespace: registration, longest-prefix resolution, dispatch
//! and completion.
//!
//! Commands live under lowercase dotted paths (`serverinfo.player.inventory`).
//! The first segment is the base word the host hands in separately; the rest
//! of the command line arrives as tokens.
//!
//! Registration is expected to finish before the first request. After that
//! every operation takes `&self` and the registry can be shared freely
//! between threads. Hosts that keep registering while serving requests should
//! wrap it in a `RwLock`.

use crate::constants::PATH_SEPARATOR;
use crate::core::handler::{Action, CommandHandler, Rejection};
use crate::core::host::Caller;
use crate::core::validator_registry::{RegistryError, ValidatorRegistry};
use crate::models::{CommandDeclaration, CommandDefinition};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};

lazy_static! {
    static ref SEGMENT_RE: Regex = Regex::new(r"^[^\s.]+$").expect("static regex is valid");
}

/// Whether `token` can stand for one path segment.
fn is_segment(token: &str) -> bool {
    SEGMENT_RE.is_match(token)
}

/// Joins `base` and `segments` into a lowercase dotted path.
fn join_path<I, S>(base: &str, segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut path = base.to_lowercase();
    for segment in segments {
        path.push(PATH_SEPARATOR);
        path.push_str(&segment.as_ref().to_lowercase());
    }
    path
}

/// Result of routing a command line.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// The action ran (whatever it did).
    Invoked,
    /// A check refused the command; the caller has been told why.
    Rejected(Rejection),
    /// No registered command matched; the host decides what to show.
    Unresolved,
}

/// Owns every registered command, keyed by full path.
#[derive(Debug)]
pub struct CommandRegistry {
    validators: ValidatorRegistry,
    handlers: BTreeMap<String, CommandHandler>,
    roots: BTreeSet<String>,
}

impl CommandRegistry {
    /// An empty registry using `validators` to build argument chains.
    pub fn new(validators: ValidatorRegistry) -> Self {
        Self {
            validators,
            handlers: BTreeMap::new(),
            roots: BTreeSet::new(),
        }
    }

    /// The factories used for new registrations.
    pub fn validators(&self) -> &ValidatorRegistry {
        &self.validators
    }

    /// Registers `definition` bound to `action`.
    ///
    /// A command registered under an existing path replaces the previous one.
    pub fn register(
        &mut self,
        definition: CommandDefinition,
        action: Action,
    ) -> Result<(), RegistryError> {
        let path = definition.full_path();
        if let Some(segment) = definition
            .parent
            .iter()
            .chain(std::iter::once(&definition.name))
            .find(|segment| !is_segment(segment))
        {
            return Err(RegistryError::InvalidName {
                path,
                segment: segment.clone(),
            });
        }

        let handler = CommandHandler::new(&definition, action, &self.validators)?;
        let declaration = handler.declaration();
        log::info!(
            "Registering command: {} (permission: {})",
            declaration.usage_line(),
            if declaration.requires_permission() {
                declaration.permission.as_str()
            } else {
                "none"
            }
        );

        if definition.parent.is_empty() {
            self.roots.insert(path.clone());
        }
        if self.handlers.insert(path.clone(), handler).is_some() {
            log::warn!("Command '{}' was registered twice; keeping the latest", path);
        }
        Ok(())
    }

    /// Finds the most specific command for `base` followed by `tokens`.
    ///
    /// Tries the longest candidate path first and shortens it one token at a
    /// time, so a command still matches when the tokens after it are
    /// arguments rather than sub-commands. Returns the handler and the tokens
    /// left over for it.
    pub fn resolve<'t>(
        &self,
        base: &str,
        tokens: &'t [String],
    ) -> Option<(&CommandHandler, &'t [String])> {
        let matchable = tokens.iter().take_while(|token| is_segment(token)).count();
        (0..=matchable).rev().find_map(|consumed| {
            let path = join_path(base, tokens.get(..consumed)?);
            let handler = self.handlers.get(&path)?;
            Some((handler, tokens.get(consumed..)?))
        })
    }

    /// Resolves and runs a command line on behalf of `caller`.
    pub fn dispatch(&self, caller: &dyn Caller, base: &str, tokens: &[String]) -> DispatchOutcome {
        let Some((handler, remaining)) = self.resolve(base, tokens) else {
            log::debug!("No command matches '{}' {:?}", base, tokens);
            return DispatchOutcome::Unresolved;
        };
        log::debug!(
            "Dispatching '{}' for {} with {:?}",
            handler.declaration().full_path,
            caller.name(),
            remaining
        );
        match handler.execute(caller, remaining) {
            Ok(()) => DispatchOutcome::Invoked,
            Err(rejection) => DispatchOutcome::Rejected(rejection),
        }
    }

    /// Suggestions for the last (partial) token of a command line.
    ///
    /// Sub-command names are offered first. Only when there are none does the
    /// matching command get asked for argument completions.
    pub fn complete(&self, caller: &dyn Caller, base: &str, tokens: &[String]) -> Vec<String> {
        let (current, path_tokens) = match tokens.split_last() {
            Some((last, rest)) => (last.to_lowercase(), rest),
            None => (String::new(), tokens),
        };

        let prefix = format!("{}{}", join_path(base, path_tokens), PATH_SEPARATOR);
        let sub_commands: Vec<String> = self
            .handlers
            .keys()
            .filter_map(|path| path.strip_prefix(&prefix))
            .filter(|rest| !rest.contains(PATH_SEPARATOR) && rest.starts_with(&current))
            .map(str::to_string)
            .collect();
        if !sub_commands.is_empty() {
            return sub_commands;
        }

        let path = join_path(base, tokens.iter().filter(|token| !token.is_empty()));
        self.handlers
            .get(&path)
            .map(|handler| handler.complete(caller, tokens))
            .unwrap_or_default()
    }

    /// The handler registered under the exact lowercase `path`.
    pub fn get(&self, path: &str) -> Option<&CommandHandler> {
        self.handlers.get(path)
    }

    /// A snapshot of every registered declaration, keyed by full path.
    pub fn declarations(&self) -> BTreeMap<String, CommandDeclaration> {
        self.handlers
            .iter()
            .map(|(path, handler)| (path.clone(), handler.declaration().clone()))
            .collect()
    }

    /// Base words registered as commands in their own right.
    pub fn roots(&self) -> impl Iterator<Item = &str> {
        self.roots.iter().map(String::as_str)
    }

    /// Number of registered commands.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::handler::action;
    use crate::core::testing::{
        CallCounter, TestCaller, sample_directory, serverinfo_registry, tokens,
    };
    use crate::models::ArgumentDeclaration;
    use std::sync::{Arc, Mutex};

    fn admin() -> TestCaller {
        TestCaller::with_permissions(
            "admin",
            &["serverutils.serverinfo", "serverutils.serverinfo.performance"],
        )
    }

    #[test]
    fn test_resolve_prefers_longest_path() {
        let registry = serverinfo_registry(&CallCounter::default());
        let input = tokens(&["player", "inventory", "Alice"]);

        let (handler, remaining) = registry.resolve("serverinfo", &input).unwrap();
        assert_eq!(handler.declaration().full_path, "serverinfo.player.inventory");
        assert_eq!(remaining, tokens(&["Alice"]).as_slice());
    }

    #[test]
    fn test_resolve_falls_back_to_shorter_paths() {
        let registry = serverinfo_registry(&CallCounter::default());

        let input = tokens(&["Player", "Alice", "stats"]);
        let (handler, remaining) = registry.resolve("SERVERINFO", &input).unwrap();
        assert_eq!(handler.declaration().full_path, "serverinfo.player");
        assert_eq!(remaining, tokens(&["Alice", "stats"]).as_slice());

        let (handler, remaining) = registry.resolve("serverinfo", &[]).unwrap();
        assert_eq!(handler.declaration().full_path, "serverinfo");
        assert!(remaining.is_empty());

        assert!(registry.resolve("weather", &tokens(&["player"])).is_none());
    }

    #[test]
    fn test_resolve_never_matches_dotted_tokens() {
        let registry = serverinfo_registry(&CallCounter::default());
        let input = tokens(&["player.inventory", "Alice"]);

        let (handler, remaining) = registry.resolve("serverinfo", &input).unwrap();
        assert_eq!(handler.declaration().full_path, "serverinfo");
        assert_eq!(remaining.len(), 2);
    }

    #[test]
    fn test_dispatch_outcomes() {
        let counter = CallCounter::default();
        let registry = serverinfo_registry(&counter);
        let guest = TestCaller::new("guest");

        assert_eq!(
            registry.dispatch(&guest, "serverinfo", &tokens(&["player", "inventory", "Alice"])),
            DispatchOutcome::Invoked
        );
        assert_eq!(
            registry.dispatch(&guest, "serverinfo", &[]),
            DispatchOutcome::Rejected(Rejection::PermissionDenied {
                permission: "serverutils.serverinfo".to_string()
            })
        );
        assert_eq!(
            registry.dispatch(&admin(), "serverinfo", &tokens(&["performance", "FULL"])),
            DispatchOutcome::Invoked
        );
        assert_eq!(
            registry.dispatch(&guest, "weather", &tokens(&["clear"])),
            DispatchOutcome::Unresolved
        );
        assert_eq!(counter.count(), 2);
        assert_eq!(guest.messages().len(), 1);
    }

    #[test]
    fn test_dispatch_checks_arity_after_resolution() {
        let counter = CallCounter::default();
        let registry = serverinfo_registry(&counter);
        let guest = TestCaller::new("guest");

        assert_eq!(
            registry.dispatch(&guest, "serverinfo", &tokens(&["player", "Alice"])),
            DispatchOutcome::Rejected(Rejection::TooFewArguments {
                required: 2,
                supplied: 1
            })
        );
        assert_eq!(
            registry.dispatch(&guest, "serverinfo", &tokens(&["player", "Alice", "stats"])),
            DispatchOutcome::Invoked
        );
        assert_eq!(counter.count(), 1);
    }

    #[test]
    fn test_dispatch_binds_converted_values() {
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let mut registry =
            CommandRegistry::new(ValidatorRegistry::with_builtins(sample_directory()));
        registry
            .register(
                CommandDefinition::new("performance")
                    .parent(["serverinfo"])
                    .with_context()
                    .argument(ArgumentDeclaration::one_of("detail", ["basic", "full"]).optional()),
                action(move |caller, args| {
                    *sink.lock().unwrap() =
                        Some((caller.name().to_string(), args.text("detail").map(String::from)));
                    Ok(())
                }),
            )
            .unwrap();

        let caller = TestCaller::new("guest");
        registry.dispatch(&caller, "serverinfo", &tokens(&["performance", "Full"]));
        assert_eq!(
            seen.lock().unwrap().clone(),
            Some(("guest".to_string(), Some("full".to_string())))
        );

        registry.dispatch(&caller, "serverinfo", &tokens(&["performance"]));
        assert_eq!(seen.lock().unwrap().clone(), Some(("guest".to_string(), None)));
    }

    #[test]
    fn test_complete_lists_sub_commands() {
        let registry = serverinfo_registry(&CallCounter::default());
        let caller = TestCaller::new("guest");

        assert_eq!(
            registry.complete(&caller, "serverinfo", &[]),
            tokens(&["performance", "player"])
        );
        assert_eq!(
            registry.complete(&caller, "serverinfo", &tokens(&["PL"])),
            tokens(&["player"])
        );
        assert_eq!(
            registry.complete(&caller, "serverinfo", &tokens(&["player", ""])),
            tokens(&["inventory"])
        );
        assert!(registry.complete(&caller, "weather", &tokens(&["c"])).is_empty());
    }

    #[test]
    fn test_complete_falls_back_to_arguments() {
        let registry = serverinfo_registry(&CallCounter::default());
        let caller = TestCaller::new("guest");

        assert_eq!(
            registry.complete(&caller, "serverinfo", &tokens(&["performance", ""])),
            tokens(&["basic", "full"])
        );
        assert_eq!(
            registry.complete(&caller, "serverinfo", &tokens(&["player", "inventory", ""])),
            tokens(&["Alice", "Albert"])
        );
        // The partial token is part of the reconstructed path, which then
        // matches no command.
        assert!(
            registry
                .complete(&caller, "serverinfo", &tokens(&["performance", "f"]))
                .is_empty()
        );
    }

    #[test]
    fn test_sub_commands_shadow_argument_completion() {
        let mut registry =
            CommandRegistry::new(ValidatorRegistry::with_builtins(sample_directory()));
        let counter = CallCounter::default();
        registry
            .register(
                CommandDefinition::new("mode")
                    .argument(ArgumentDeclaration::one_of("value", ["alpha", "beta"])),
                counter.action(),
            )
            .unwrap();
        let caller = TestCaller::new("guest");

        assert_eq!(
            registry.complete(&caller, "mode", &tokens(&[""])),
            tokens(&["alpha", "beta"])
        );

        registry
            .register(CommandDefinition::new("status").parent(["mode"]), counter.action())
            .unwrap();
        assert_eq!(
            registry.complete(&caller, "mode", &tokens(&[""])),
            tokens(&["status"])
        );
    }

    #[test]
    fn test_completion_is_deterministic() {
        let registry = serverinfo_registry(&CallCounter::default());
        let caller = TestCaller::new("guest");
        let first = registry.complete(&caller, "serverinfo", &tokens(&[""]));
        for _ in 0..10 {
            assert_eq!(registry.complete(&caller, "serverinfo", &tokens(&[""])), first);
        }
    }

    #[test]
    fn test_last_registration_wins() {
        let first = CallCounter::default();
        let second = CallCounter::default();
        let mut registry =
            CommandRegistry::new(ValidatorRegistry::with_builtins(sample_directory()));

        registry
            .register(
                CommandDefinition::new("Info").description("first"),
                first.action(),
            )
            .unwrap();
        registry
            .register(
                CommandDefinition::new("info").description("second"),
                second.action(),
            )
            .unwrap();

        let declarations = registry.declarations();
        assert_eq!(declarations.len(), 1);
        assert_eq!(declarations.get("info").unwrap().description, "second");

        registry.dispatch(&TestCaller::new("guest"), "info", &[]);
        assert_eq!(first.count(), 0);
        assert_eq!(second.count(), 1);
    }

    #[test]
    fn test_register_fails_fast() {
        let mut registry =
            CommandRegistry::new(ValidatorRegistry::with_builtins(sample_directory()));
        let counter = CallCounter::default();

        let unknown_kind = CommandDefinition::new("warp")
            .argument(ArgumentDeclaration::new("where", "location"));
        assert!(matches!(
            registry.register(unknown_kind, counter.action()),
            Err(RegistryError::UnregisteredKind { .. })
        ));

        let dotted = CommandDefinition::new("a.b");
        assert!(matches!(
            registry.register(dotted, counter.action()),
            Err(RegistryError::InvalidName { .. })
        ));

        let empty_parent = CommandDefinition::new("x").parent([""]);
        assert!(matches!(
            registry.register(empty_parent, counter.action()),
            Err(RegistryError::InvalidName { .. })
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_roots_only_lists_parentless_commands() {
        let registry = serverinfo_registry(&CallCounter::default());
        assert_eq!(registry.roots().collect::<Vec<_>>(), vec!["serverinfo"]);
        assert_eq!(registry.len(), 4);
        assert!(registry.get("serverinfo.player").is_some());
    }

    #[test]
    fn test_concurrent_dispatch_and_completion() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CommandRegistry>();

        let counter = CallCounter::default();
        let registry = serverinfo_registry(&counter);
        let caller = admin();

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..50 {
                        assert_eq!(
                            registry.dispatch(&caller, "serverinfo", &tokens(&["performance"])),
                            DispatchOutcome::Invoked
                        );
                        assert_eq!(
                            registry.complete(&caller, "serverinfo", &tokens(&["p"])),
                            tokens(&["performance", "player"])
                        );
                    }
                });
            }
        });
        assert_eq!(counter.count(), 400);
    }
}
