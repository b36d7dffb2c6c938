//! Dependency resolver
//!
//! A resolver is bound once at a validator tree root and propagated into every
//! nested validator. Contextual leaves reach it through
//! [`ValidationContext::resolve`](crate::foundation::ValidationContext::resolve).

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

/// Resolves a capability by type.
pub trait ServiceResolver: Send + Sync {
    fn resolve(&self, service: TypeId) -> Option<Arc<dyn Any + Send + Sync>>;
}

impl dyn ServiceResolver {
    /// Typed lookup.
    pub fn get<S: Any + Send + Sync>(&self) -> Option<Arc<S>> {
        self.resolve(TypeId::of::<S>())?.downcast::<S>().ok()
    }
}

impl<F> ServiceResolver for F
where
    F: Fn(TypeId) -> Option<Arc<dyn Any + Send + Sync>> + Send + Sync,
{
    fn resolve(&self, service: TypeId) -> Option<Arc<dyn Any + Send + Sync>> {
        self(service)
    }
}

/// A type-keyed service map.
#[derive(Default, Clone)]
pub struct Services {
    entries: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl Services {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `service`, replacing a previous one of the same type.
    #[must_use = "builder methods must be chained or built"]
    pub fn with<S: Any + Send + Sync>(mut self, service: S) -> Self {
        self.insert(service);
        self
    }

    pub fn insert<S: Any + Send + Sync>(&mut self, service: S) {
        self.entries.insert(TypeId::of::<S>(), Arc::new(service));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Wraps the map for binding.
    pub fn into_resolver(self) -> Arc<dyn ServiceResolver> {
        Arc::new(self)
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services").field("len", &self.entries.len()).finish()
    }
}

impl ServiceResolver for Services {
    fn resolve(&self, service: TypeId) -> Option<Arc<dyn Any + Send + Sync>> {
        self.entries.get(&service).cloned()
    }
}

/// Identity comparison ignoring vtable addresses.
pub(crate) fn same_resolver(a: &Arc<dyn ServiceResolver>, b: &Arc<dyn ServiceResolver>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// Binds `resolver` into `slot`; returns `false` when it was already bound.
pub(crate) fn bind_slot(slot: &mut Option<Arc<dyn ServiceResolver>>, resolver: &Arc<dyn ServiceResolver>) -> bool {
    if slot.as_ref().is_some_and(|bound| same_resolver(bound, resolver)) {
        return false;
    }
    *slot = Some(Arc::clone(resolver));
    true
}
