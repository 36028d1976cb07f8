use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

type Slot = Arc<dyn Any + Send + Sync>;

/// Named slots through which in-process consumers find each other's APIs.
///
/// Values are stored type-erased; callers fetch them back by the concrete
/// type they registered (typically an `Arc<dyn Trait>`).
#[derive(Default)]
pub struct ExtensionRegistry {
    slots: RwLock<HashMap<String, Slot>>,
}

impl ExtensionRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register `value` under `name`. Replaces any existing extension.
    pub fn register<T: Any + Send + Sync>(&self, name: &str, value: T) {
        if let Ok(mut slots) = self.slots.write()
            && slots.insert(name.to_string(), Arc::new(value)).is_some()
        {
            tracing::warn!(extension = name, "Replaced existing extension");
        }
    }

    /// Remove an extension by name. Returns whether it was present.
    pub fn unregister(&self, name: &str) -> bool {
        self.slots
            .write()
            .is_ok_and(|mut slots| slots.remove(name).is_some())
    }

    /// Look up an extension by name and type.
    pub fn get<T: Any + Send + Sync + Clone>(&self, name: &str) -> Option<T> {
        let slots = self.slots.read().ok()?;
        slots.get(name)?.downcast_ref::<T>().cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.read().is_ok_and(|slots| slots.contains_key(name))
    }

    /// Sorted list of registered extension names.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .slots
            .read()
            .map(|slots| slots.keys().cloned().collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }
}
