//! In-memory storage backend

use dashmap::DashMap;

use super::StorageBackend;
use crate::shared::errors::InfraError;

/// In-memory storage for tests and throwaway sessions. Handles created
/// from the same `Arc` share state like tabs of one browser profile.
#[derive(Default)]
pub struct InMemoryBackend {
    items: DashMap<String, String>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl StorageBackend for InMemoryBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>, InfraError> {
        Ok(self.items.get(key).map(|value| value.clone()))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), InfraError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), InfraError> {
        self.items.remove(key);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let backend = InMemoryBackend::new();
        assert_eq!(backend.get_item("k").unwrap(), None);

        backend.set_item("k", "[1]").unwrap();
        backend.set_item("k", "[1,2]").unwrap();
        assert_eq!(backend.get_item("k").unwrap().as_deref(), Some("[1,2]"));
        assert_eq!(backend.len(), 1);

        backend.remove_item("k").unwrap();
        assert!(backend.is_empty());
    }
}
