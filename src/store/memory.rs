use crate::error::{CatalogError, Result};
use crate::store::push_id_with_counter;
use crate::store::traits::KvStore;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

/// In-memory key-value tree, used by the demo binary and by tests
///
/// Mirrors the hosted backend's semantics: paths address nested objects,
/// writing null deletes. Writes can be switched to fail for rollback tests.
pub struct MemoryKvStore {
    root: Mutex<Value>,
    counter: AtomicU64,
    fail_writes: AtomicBool,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self {
            root: Mutex::new(Value::Object(Map::new())),
            counter: AtomicU64::new(0),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Make every subsequent write fail with a simulated transport error
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CatalogError::store("simulated write failure"));
        }
        Ok(())
    }
}

impl Default for MemoryKvStore {
    fn default() -> Self {
        Self::new()
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, path: &str) -> Result<Option<Value>> {
        let root = self.root.lock().expect("kv tree lock poisoned");
        let mut node = &*root;
        for seg in segments(path) {
            match node.get(seg) {
                Some(child) => node = child,
                None => return Ok(None),
            }
        }
        if node.is_null() {
            return Ok(None);
        }
        Ok(Some(node.clone()))
    }

    async fn put(&self, path: &str, value: Value) -> Result<()> {
        self.check_writable()?;
        if value.is_null() {
            return self.delete(path).await;
        }
        let mut root = self.root.lock().expect("kv tree lock poisoned");
        let segs = segments(path);
        let mut node = &mut *root;
        for seg in segs {
            if !node.is_object() {
                *node = Value::Object(Map::new());
            }
            node = node
                .as_object_mut()
                .expect("just made an object")
                .entry(seg.to_string())
                .or_insert(Value::Null);
        }
        *node = value;
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.check_writable()?;
        let mut root = self.root.lock().expect("kv tree lock poisoned");
        let segs = segments(path);
        let Some((leaf, parents)) = segs.split_last() else {
            *root = Value::Object(Map::new());
            return Ok(());
        };
        let mut node = &mut *root;
        for seg in parents {
            match node.get_mut(*seg) {
                Some(child) => node = child,
                None => return Ok(()),
            }
        }
        if let Some(map) = node.as_object_mut() {
            map.remove(*leaf);
        }
        Ok(())
    }

    fn push_id(&self) -> String {
        push_id_with_counter(&self.counter)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn put_then_get_round_trips_a_subtree() {
        let store = MemoryKvStore::new();
        store.put("favorites/u1/p1", json!(true)).await.unwrap();
        store.put("favorites/u1/p2", json!(true)).await.unwrap();

        let subtree = store.get("favorites/u1").await.unwrap().unwrap();
        let keys: Vec<&String> = subtree.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["p1", "p2"]);
    }

    #[tokio::test]
    async fn writing_null_deletes_the_key() {
        let store = MemoryKvStore::new();
        store.put("properties/a", json!({"x": 1})).await.unwrap();
        store.put("properties/a", Value::Null).await.unwrap();
        assert!(store.get("properties/a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn deleting_an_absent_key_is_a_no_op() {
        let store = MemoryKvStore::new();
        store.delete("properties/ghost").await.unwrap();
        assert!(store.get("properties/ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn failing_writes_still_allow_reads() {
        let store = MemoryKvStore::new();
        store.put("properties/a", json!({"x": 1})).await.unwrap();
        store.set_fail_writes(true);

        assert!(store.put("properties/b", json!({})).await.is_err());
        assert!(store.get("properties/a").await.unwrap().is_some());
    }

    #[test]
    fn push_ids_are_unique() {
        let store = MemoryKvStore::new();
        let a = store.push_id();
        let b = store.push_id();
        assert_ne!(a, b);
    }
}
