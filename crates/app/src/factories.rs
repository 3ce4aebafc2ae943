//! Adapter factory registry handed to the logger at construction.

use rotolog_ports::{AdapterFactory, AdapterSpec, LogAdapter};
use rotolog_shared::{ErrorCode, ErrorEnvelope, Result};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Mapping from adapter kind name to its factory.
#[derive(Clone, Default)]
pub struct AdapterFactories {
    by_kind: BTreeMap<Box<str>, Arc<dyn AdapterFactory>>,
}

impl AdapterFactories {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` under its own kind, replacing any previous one.
    pub fn register(&mut self, factory: Arc<dyn AdapterFactory>) -> Option<Arc<dyn AdapterFactory>> {
        let kind: Box<str> = factory.kind().into();
        self.by_kind.insert(kind, factory)
    }

    /// Builder-style [`AdapterFactories::register`].
    #[must_use]
    pub fn with(mut self, factory: Arc<dyn AdapterFactory>) -> Self {
        self.register(factory);
        self
    }

    /// Returns true when a factory is registered for `kind`.
    #[must_use]
    pub fn contains(&self, kind: &str) -> bool {
        self.by_kind.contains_key(kind)
    }

    /// Registered kind names, sorted.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.by_kind.keys().map(AsRef::as_ref)
    }

    /// Build an adapter with the factory registered for `spec.kind`.
    pub fn build(&self, spec: &AdapterSpec) -> Result<Arc<dyn LogAdapter>> {
        let factory = self
            .by_kind
            .get(spec.kind.as_ref())
            .ok_or_else(|| unknown_kind(&spec.kind))?;
        factory.build(spec)
    }
}

impl std::fmt::Debug for AdapterFactories {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_set()
            .entries(self.by_kind.keys())
            .finish()
    }
}

pub(crate) fn unknown_kind(kind: &str) -> ErrorEnvelope {
    ErrorEnvelope::expected(
        ErrorCode::unknown_adapter_kind(),
        format!("no adapter factory registered for kind `{kind}`"),
    )
    .with_metadata("kind", kind)
}
