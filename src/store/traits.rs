use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Common trait for hierarchical key-value store backends
/// This allows swapping the hosted backend for an in-memory double in tests
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Read the subtree at a slash-separated path; `None` if the key is absent
    async fn get(&self, path: &str) -> Result<Option<Value>>;

    /// Write a value at a path; writing `Value::Null` deletes the key
    async fn put(&self, path: &str, value: Value) -> Result<()>;

    /// Remove the key at a path; removing an absent key is a no-op
    async fn delete(&self, path: &str) -> Result<()>;

    /// Mint a fresh child id for pushes under a collection path
    fn push_id(&self) -> String;

    /// Get the name of the backend
    fn backend_name(&self) -> &'static str;
}

/// Shared handles behave like the store they wrap, so one backend can serve
/// several sessions
#[async_trait]
impl<T: KvStore + ?Sized> KvStore for std::sync::Arc<T> {
    async fn get(&self, path: &str) -> Result<Option<Value>> {
        (**self).get(path).await
    }

    async fn put(&self, path: &str, value: Value) -> Result<()> {
        (**self).put(path, value).await
    }

    async fn delete(&self, path: &str) -> Result<()> {
        (**self).delete(path).await
    }

    fn push_id(&self) -> String {
        (**self).push_id()
    }

    fn backend_name(&self) -> &'static str {
        (**self).backend_name()
    }
}
