//! Named authentication guards and the providers that back them.
//!
//! A guard is an authentication strategy (the package registers a single
//! session guard named `wink`); a provider is the lookup mechanism behind
//! it (`wink_authors`, backed by the author table). The registry is filled
//! once at startup and consulted read-only afterwards.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDriver {
    /// Cookie session resolved against the `wink_sessions` table.
    Session,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderDriver {
    /// Record lookup through the host's database pool.
    Database,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guard {
    pub driver: GuardDriver,
    /// Name of the provider the guard resolves identities through.
    pub provider: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provider {
    pub driver: ProviderDriver,
    /// Table holding the records this provider loads.
    pub model: String,
}

#[derive(Debug, Default, Clone)]
pub struct AuthRegistry {
    guards: BTreeMap<String, Guard>,
    providers: BTreeMap<String, Provider>,
}

impl AuthRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_guard(&mut self, name: &str, guard: Guard) {
        self.guards.insert(name.to_string(), guard);
    }

    pub fn set_provider(&mut self, name: &str, provider: Provider) {
        self.providers.insert(name.to_string(), provider);
    }

    #[must_use]
    pub fn guard(&self, name: &str) -> Option<&Guard> {
        self.guards.get(name)
    }

    #[must_use]
    pub fn provider(&self, name: &str) -> Option<&Provider> {
        self.providers.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_roundtrip() {
        let mut registry = AuthRegistry::new();

        registry.set_provider(
            "wink_authors",
            Provider {
                driver: ProviderDriver::Database,
                model: "wink_authors".to_string(),
            },
        );
        registry.set_guard(
            "wink",
            Guard {
                driver: GuardDriver::Session,
                provider: "wink_authors".to_string(),
            },
        );

        let guard = registry.guard("wink").unwrap();
        assert_eq!(guard.driver, GuardDriver::Session);

        let provider = registry.provider(&guard.provider).unwrap();
        assert_eq!(provider.driver, ProviderDriver::Database);
        assert!(registry.guard("missing").is_none());
    }
}
