//! Raw storage backend trait

use crate::shared::errors::InfraError;

/// Durable string key/value storage, the only layer that touches raw
/// storage. Values are whole serialized collections.
pub trait StorageBackend: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, InfraError>;

    /// Replace the value in a single step. Readers never see a partial value.
    fn set_item(&self, key: &str, value: &str) -> Result<(), InfraError>;

    fn remove_item(&self, key: &str) -> Result<(), InfraError>;

    fn name(&self) -> &'static str;
}
