//! Handler registry
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: Alias map, duplicate detection and atomic hot-reload replacement
//! - 1.0.0: Initial implementation for handler dispatch

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::descriptor::HandlerDescriptor;
use super::handler::Handler;
use crate::core::RegistryError;

/// Registry shared between the dispatcher, handlers and the HTTP API
pub type SharedRegistry = Arc<RwLock<CommandRegistry>>;

/// A handler together with the descriptor captured when it was registered
#[derive(Clone)]
pub struct RegisteredHandler {
    pub descriptor: Arc<HandlerDescriptor>,
    pub handler: Arc<dyn Handler>,
}

impl std::fmt::Debug for RegisteredHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredHandler")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// Lookup table from primary id and aliases to handlers
///
/// All names are stored lowercased, so resolution is case-insensitive. Ids
/// and aliases share one namespace: a name may only ever point at one handler.
///
/// # Example
///
/// ```ignore
/// let mut registry = CommandRegistry::new();
/// registry.register(Arc::new(PingHandler))?;
///
/// if let Some(entry) = registry.resolve("LATENCY") {
///     assert_eq!(entry.descriptor.id, "ping");
/// }
/// ```
#[derive(Clone, Default)]
pub struct CommandRegistry {
    handlers: HashMap<String, RegisteredHandler>,
    aliases: HashMap<String, String>,
}

impl CommandRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap the registry for sharing across tasks
    pub fn into_shared(self) -> SharedRegistry {
        Arc::new(RwLock::new(self))
    }

    /// Register a handler under its id and aliases
    ///
    /// Fails if any of its names is already taken by another entry.
    pub fn register(&mut self, handler: Arc<dyn Handler>) -> Result<(), RegistryError> {
        let descriptor = handler.describe();
        let id = Self::validate_names(&descriptor)?;

        for name in descriptor.names() {
            if let Some(existing) = self.owner_of(&name) {
                return Err(RegistryError::DuplicateRegistration { name, existing });
            }
        }

        self.insert(id, descriptor, handler);
        Ok(())
    }

    /// Replace the handler registered under the same id (hot reload)
    ///
    /// The old entry and every one of its aliases are removed before the new
    /// descriptor's names are added. Collisions with other handlers leave the
    /// registry untouched. Returns the replaced entry, if there was one.
    pub fn replace(
        &mut self,
        handler: Arc<dyn Handler>,
    ) -> Result<Option<RegisteredHandler>, RegistryError> {
        let descriptor = handler.describe();
        let id = Self::validate_names(&descriptor)?;

        for name in descriptor.names() {
            if let Some(existing) = self.owner_of(&name) {
                if existing != id {
                    return Err(RegistryError::DuplicateRegistration { name, existing });
                }
            }
        }

        let previous = self.unregister(&id);
        self.insert(id, descriptor, handler);
        Ok(previous)
    }

    /// Remove a handler and all of its aliases
    pub fn unregister(&mut self, id: &str) -> Option<RegisteredHandler> {
        let id = id.to_lowercase();
        let removed = self.handlers.remove(&id)?;
        self.aliases.retain(|_, target| *target != id);
        Some(removed)
    }

    /// Resolve a token: primary ids first, then aliases
    pub fn resolve(&self, token: &str) -> Option<RegisteredHandler> {
        let token = token.to_lowercase();
        if let Some(entry) = self.handlers.get(&token) {
            return Some(entry.clone());
        }
        self.aliases
            .get(&token)
            .and_then(|id| self.handlers.get(id))
            .cloned()
    }

    /// Check if a token resolves to a handler
    pub fn contains(&self, token: &str) -> bool {
        self.resolve(token).is_some()
    }

    /// Number of registered handlers (aliases not counted)
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// All descriptors, sorted by id
    pub fn descriptors(&self) -> Vec<Arc<HandlerDescriptor>> {
        let mut descriptors: Vec<_> = self
            .handlers
            .values()
            .map(|entry| Arc::clone(&entry.descriptor))
            .collect();
        descriptors.sort_by(|a, b| a.id.cmp(&b.id));
        descriptors
    }

    /// Id of the handler that currently owns `name`
    fn owner_of(&self, name: &str) -> Option<String> {
        if self.handlers.contains_key(name) {
            return Some(name.to_string());
        }
        self.aliases.get(name).cloned()
    }

    /// Check a descriptor's own names and return its normalized id
    fn validate_names(descriptor: &HandlerDescriptor) -> Result<String, RegistryError> {
        let id = descriptor.id.to_lowercase();
        if id.trim().is_empty() {
            return Err(RegistryError::EmptyId);
        }

        let mut seen = std::collections::HashSet::new();
        for name in descriptor.names() {
            if !seen.insert(name.clone()) {
                return Err(RegistryError::DuplicateRegistration {
                    name,
                    existing: id,
                });
            }
        }
        Ok(id)
    }

    fn insert(&mut self, id: String, descriptor: HandlerDescriptor, handler: Arc<dyn Handler>) {
        for alias in descriptor.aliases.iter().map(|a| a.to_lowercase()) {
            self.aliases.insert(alias, id.clone());
        }
        self.handlers.insert(
            id,
            RegisteredHandler {
                descriptor: Arc::new(descriptor),
                handler,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::context::{CommandContext, InvocationContext};
    use crate::core::Replier;
    use anyhow::Result;
    use async_trait::async_trait;

    struct MockHandler {
        descriptor: HandlerDescriptor,
    }

    impl MockHandler {
        fn new(id: &str, aliases: &[&str]) -> Arc<dyn Handler> {
            Arc::new(Self {
                descriptor: HandlerDescriptor::command(id).aliases(aliases.iter().copied()),
            })
        }
    }

    #[async_trait]
    impl Handler for MockHandler {
        fn describe(&self) -> HandlerDescriptor {
            self.descriptor.clone()
        }

        async fn execute(
            &self,
            _ctx: Arc<CommandContext>,
            _invocation: &InvocationContext,
            _replier: &dyn Replier,
        ) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_registry_new_is_empty() {
        let registry = CommandRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_resolve_by_id_and_aliases() {
        let mut registry = CommandRegistry::new();
        registry
            .register(MockHandler::new("help", &["h", "commands"]))
            .unwrap();

        for token in ["help", "h", "commands", "HELP", "Commands"] {
            let entry = registry.resolve(token).expect("token should resolve");
            assert_eq!(entry.descriptor.id, "help");
        }
        assert!(registry.resolve("ping").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut registry = CommandRegistry::new();
        registry.register(MockHandler::new("ping", &[])).unwrap();

        let err = registry.register(MockHandler::new("Ping", &[])).unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateRegistration {
                name: "ping".to_string(),
                existing: "ping".to_string(),
            }
        );
    }

    #[test]
    fn test_alias_collision_rejected() {
        let mut registry = CommandRegistry::new();
        registry.register(MockHandler::new("help", &["h"])).unwrap();

        // alias colliding with an alias
        assert!(registry.register(MockHandler::new("hello", &["h"])).is_err());
        // id colliding with an alias
        assert!(registry.register(MockHandler::new("h", &[])).is_err());
        // alias colliding with an id
        assert!(registry.register(MockHandler::new("assist", &["help"])).is_err());

        // nothing partial was inserted
        assert_eq!(registry.len(), 1);
        assert!(!registry.contains("hello"));
        assert!(!registry.contains("assist"));
    }

    #[test]
    fn test_collision_reports_owning_id() {
        let mut registry = CommandRegistry::new();
        registry.register(MockHandler::new("help", &["h"])).unwrap();

        assert_eq!(
            registry.register(MockHandler::new("hint", &["H"])).unwrap_err(),
            RegistryError::DuplicateRegistration {
                name: "h".to_string(),
                existing: "help".to_string(),
            }
        );
        assert_eq!(
            registry.replace(MockHandler::new("info", &["help"])).unwrap_err(),
            RegistryError::DuplicateRegistration {
                name: "help".to_string(),
                existing: "help".to_string(),
            }
        );
    }

    #[test]
    fn test_self_colliding_descriptor_rejected() {
        let mut registry = CommandRegistry::new();
        assert!(registry.register(MockHandler::new("ping", &["ping"])).is_err());
        assert!(registry.register(MockHandler::new("ping", &["p", "P"])).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_empty_id_rejected() {
        let mut registry = CommandRegistry::new();
        assert_eq!(
            registry.register(MockHandler::new("  ", &[])).unwrap_err(),
            RegistryError::EmptyId
        );
    }

    #[test]
    fn test_replace_drops_old_aliases() {
        let mut registry = CommandRegistry::new();
        registry
            .register(MockHandler::new("help", &["h", "commands"]))
            .unwrap();

        let previous = registry
            .replace(MockHandler::new("help", &["h", "assist"]))
            .unwrap();

        assert!(previous.is_some());
        assert!(registry.contains("h"));
        assert!(registry.contains("assist"));
        assert!(!registry.contains("commands"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_replace_collision_leaves_registry_untouched() {
        let mut registry = CommandRegistry::new();
        registry.register(MockHandler::new("help", &["h"])).unwrap();
        registry.register(MockHandler::new("ping", &["latency"])).unwrap();

        assert!(registry
            .replace(MockHandler::new("help", &["latency"]))
            .is_err());
        assert!(registry.contains("h"));
        assert_eq!(registry.resolve("latency").unwrap().descriptor.id, "ping");
    }

    #[test]
    fn test_replace_unknown_id_registers() {
        let mut registry = CommandRegistry::new();
        let previous = registry.replace(MockHandler::new("uptime", &[])).unwrap();
        assert!(previous.is_none());
        assert!(registry.contains("uptime"));
    }

    #[test]
    fn test_unregister_removes_aliases() {
        let mut registry = CommandRegistry::new();
        registry.register(MockHandler::new("help", &["h"])).unwrap();

        assert!(registry.unregister("HELP").is_some());
        assert!(!registry.contains("h"));
        assert!(registry.unregister("help").is_none());
    }

    #[test]
    fn test_descriptors_sorted() {
        let mut registry = CommandRegistry::new();
        registry.register(MockHandler::new("uptime", &[])).unwrap();
        registry.register(MockHandler::new("help", &[])).unwrap();
        registry.register(MockHandler::new("ping", &[])).unwrap();

        let ids: Vec<String> = registry
            .descriptors()
            .iter()
            .map(|d| d.id.clone())
            .collect();
        assert_eq!(ids, vec!["help", "ping", "uptime"]);
    }
}
