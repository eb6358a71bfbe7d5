use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use anyhow::Result;

use crate::error::ServiceError;

/// Type-keyed instance registry with optional parent delegation.
///
/// Each scope holds at most one instance per type; registering again under the
/// same type replaces the previous instance. Lookup is parent-first: a child
/// scope can never shadow something its parent registered. The container is
/// single-threaded by contract and does nothing to defend against concurrent
/// access.
#[derive(Default)]
pub struct ServiceProvider {
    parent: Option<Rc<ServiceProvider>>,
    services: RefCell<HashMap<TypeId, Rc<dyn Any>>>,
}

impl ServiceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// A child scope that consults `parent` before its own entries.
    pub fn with_parent(parent: Rc<ServiceProvider>) -> Self {
        Self {
            parent: Some(parent),
            services: RefCell::new(HashMap::new()),
        }
    }

    /// Stores `service` under its type, replacing any previous registration.
    pub fn register<T: 'static>(&self, service: T) {
        self.register_rc(Rc::new(service));
    }

    /// Stores an already-shared instance under `T`, replacing any previous
    /// registration.
    pub fn register_rc<T: 'static>(&self, service: Rc<T>) {
        self.services
            .borrow_mut()
            .insert(TypeId::of::<T>(), service);
    }

    /// Parent-first lookup. Absence is not an error.
    pub fn try_get<T: 'static>(&self) -> Option<Rc<T>> {
        if let Some(parent) = &self.parent {
            if let Some(service) = parent.try_get::<T>() {
                return Some(service);
            }
        }

        self.services
            .borrow()
            .get(&TypeId::of::<T>())
            .cloned()
            .and_then(|service| service.downcast::<T>().ok())
    }

    /// Like [`try_get`](Self::try_get), but a missing service is a fatal
    /// configuration error.
    pub fn expect<T: 'static>(&self) -> Result<Rc<T>> {
        self.try_get::<T>().ok_or_else(|| {
            ServiceError::NotRegistered {
                type_name: std::any::type_name::<T>(),
            }
            .into()
        })
    }

    /// Takes a registration out of this scope, if present. Parent entries
    /// are never removed through a child.
    pub fn remove<T: 'static>(&self) -> Option<Rc<T>> {
        self.services
            .borrow_mut()
            .remove(&TypeId::of::<T>())
            .and_then(|service| service.downcast::<T>().ok())
    }

    /// Drops every registration in this scope. The parent, if any, is left
    /// untouched.
    pub fn clear(&self) {
        self.services.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.services.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.borrow().is_empty()
    }
}
