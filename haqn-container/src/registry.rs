//! Binding registry — maps abstract types to what produces them.
//!
//! The registry is a plain map from [`TypeKey`] to [`Binding`]. Inserting
//! under an existing key replaces the old binding; nothing is ever removed.

use std::collections::HashMap;

use tracing::debug;

use crate::container::Resolved;
use crate::factory::Factory;
use crate::key::TypeKey;

/// What is bound under an abstract type.
#[derive(Clone, Debug)]
pub(crate) enum Binding {
    /// A ready value, returned as-is on every resolve.
    Instance(Resolved),
    /// A factory, called on every resolve.
    Factory(Factory),
}

impl Binding {
    fn kind(&self) -> &'static str {
        match self {
            Binding::Instance(_) => "instance",
            Binding::Factory(_) => "factory",
        }
    }
}

/// Stores all bindings of a container.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    bindings: HashMap<TypeKey, Binding>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `binding` under `key`, replacing any previous binding.
    pub fn insert(&mut self, key: TypeKey, binding: Binding) {
        let kind = binding.kind();
        match self.bindings.insert(key, binding) {
            Some(previous) => {
                debug!(key = %key, kind, replaced = previous.kind(), "Replaced binding")
            }
            None => debug!(key = %key, kind, "Registered binding"),
        }
    }

    /// Looks up the binding for `key`.
    pub fn get(&self, key: &TypeKey) -> Option<&Binding> {
        self.bindings.get(key)
    }

    /// Returns `true` if something is bound under `key`.
    pub fn contains(&self, key: &TypeKey) -> bool {
        self.bindings.contains_key(key)
    }

    /// Returns the number of bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns `true` if nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Every bound key, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &TypeKey> {
        self.bindings.keys()
    }
}
