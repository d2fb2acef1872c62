use crate::error::{CatalogError, Result};
use crate::models::Property;
use crate::store::traits::KvStore;
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, info, warn};

const PROPERTIES: &str = "properties";
const FAVORITES: &str = "favorites";

/// CRUD surface over the remote store for properties and favorite sets
///
/// The only component that talks to the `KvStore` collaborator. Records are
/// persisted as field/value entries under `properties/{id}`; favorite
/// relations as `favorites/{user}/{property} = true`.
pub struct CatalogStore<S: KvStore> {
    store: S,
}

impl<S: KvStore> CatalogStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    /// Persist a normalized record under a fresh id and return the id
    pub async fn create_property(&self, record: &Property) -> Result<String> {
        let id = self.store.push_id();
        let body = serde_json::to_value(record)?;
        self.store.put(&format!("{PROPERTIES}/{id}"), body).await?;
        info!("created property {}", id);
        Ok(id)
    }

    /// Fetch the entire catalog; an empty store yields an empty vec
    pub async fn get_all_properties(&self) -> Result<Vec<Property>> {
        let Some(tree) = self.store.get(PROPERTIES).await? else {
            return Ok(Vec::new());
        };
        let Value::Object(entries) = tree else {
            warn!("properties root is not an object, treating as empty");
            return Ok(Vec::new());
        };

        let mut properties = Vec::with_capacity(entries.len());
        for (id, body) in entries {
            match serde_json::from_value::<Property>(body) {
                Ok(mut property) => {
                    property.id = id;
                    properties.push(property);
                }
                // A malformed record must not take the whole catalog down
                Err(err) => warn!("skipping malformed property {}: {}", id, err),
            }
        }
        debug!("fetched {} properties", properties.len());
        Ok(properties)
    }

    /// Fetch the records a user owns
    ///
    /// Filters client-side; the store has no query engine.
    pub async fn get_properties_by_owner(&self, owner_id: &str) -> Result<Vec<Property>> {
        let mut properties = self.get_all_properties().await?;
        properties.retain(|p| p.owner_id == owner_id);
        Ok(properties)
    }

    pub async fn get_property_by_id(&self, id: &str) -> Result<Option<Property>> {
        let Some(body) = self.store.get(&format!("{PROPERTIES}/{id}")).await? else {
            return Ok(None);
        };
        let mut property: Property = serde_json::from_value(body)?;
        property.id = id.to_string();
        Ok(Some(property))
    }

    /// Replace the record at `id`; fails with `NotFound` if it vanished
    pub async fn update_property(&self, id: &str, record: &Property) -> Result<()> {
        if self.get_property_by_id(id).await?.is_none() {
            return Err(CatalogError::NotFound(format!("property {id}")));
        }
        let body = serde_json::to_value(record)?;
        self.store.put(&format!("{PROPERTIES}/{id}"), body).await?;
        info!("updated property {}", id);
        Ok(())
    }

    /// Remove the record at `id`; removing an absent record succeeds
    pub async fn delete_property(&self, id: &str) -> Result<()> {
        self.store.delete(&format!("{PROPERTIES}/{id}")).await?;
        info!("deleted property {}", id);
        Ok(())
    }

    /// Read a user's favorite ids as a set; absent node means empty set
    pub async fn get_favorite_ids(&self, user_id: &str) -> Result<HashSet<String>> {
        let Some(tree) = self.store.get(&format!("{FAVORITES}/{user_id}")).await? else {
            return Ok(HashSet::new());
        };
        match tree {
            Value::Object(entries) => Ok(entries.into_iter().map(|(id, _)| id).collect()),
            _ => Ok(HashSet::new()),
        }
    }

    pub async fn add_favorite(&self, user_id: &str, property_id: &str) -> Result<()> {
        self.store
            .put(&format!("{FAVORITES}/{user_id}/{property_id}"), Value::Bool(true))
            .await
    }

    pub async fn remove_favorite(&self, user_id: &str, property_id: &str) -> Result<()> {
        self.store
            .delete(&format!("{FAVORITES}/{user_id}/{property_id}"))
            .await
    }

    /// Join a user's favorite ids against the full catalog
    ///
    /// O(catalog) by design: the catalog is small and unpaginated, and the
    /// store does no server-side filtering. Stale favorite ids with no
    /// matching property simply drop out of the join.
    pub async fn get_favorite_properties(&self, user_id: &str) -> Result<Vec<Property>> {
        let favorite_ids = self.get_favorite_ids(user_id).await?;
        if favorite_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut properties = self.get_all_properties().await?;
        properties.retain(|p| favorite_ids.contains(&p.id));
        Ok(properties)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PropertyType;
    use crate::store::MemoryKvStore;
    use chrono::Utc;
    use serde_json::json;

    fn record(title: &str, owner: &str) -> Property {
        Property {
            id: String::new(),
            title: title.to_string(),
            address: "12 Main St".to_string(),
            description: String::new(),
            monthly_rent: 1500.0,
            property_type: PropertyType::Apartment,
            bedrooms: 2,
            bathrooms: 1,
            amenities: vec!["parking".to_string()],
            images: vec!["data:image/png;base64,AAAA".to_string()],
            owner_id: owner.to_string(),
            owner_email: format!("{owner}@example.com"),
            created_at: Utc::now(),
            updated_at: None,
            is_available: true,
        }
    }

    fn store() -> CatalogStore<MemoryKvStore> {
        CatalogStore::new(MemoryKvStore::new())
    }

    #[tokio::test]
    async fn created_records_come_back_with_their_id() {
        let store = store();
        let id = store.create_property(&record("Loft", "u1")).await.unwrap();

        let fetched = store.get_property_by_id(&id).await.unwrap().unwrap();
        assert_eq!(fetched.id, id);
        assert_eq!(fetched.title, "Loft");
    }

    #[tokio::test]
    async fn empty_catalog_is_an_empty_vec_not_an_error() {
        let store = store();
        assert!(store.get_all_properties().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn owner_filter_only_returns_that_owners_records() {
        let store = store();
        store.create_property(&record("A", "u1")).await.unwrap();
        store.create_property(&record("B", "u2")).await.unwrap();

        let mine = store.get_properties_by_owner("u1").await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].title, "A");
    }

    #[tokio::test]
    async fn update_of_a_vanished_record_is_not_found() {
        let store = store();
        let err = store
            .update_property("ghost", &record("X", "u1"))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = store();
        let id = store.create_property(&record("A", "u1")).await.unwrap();
        store.delete_property(&id).await.unwrap();
        store.delete_property(&id).await.unwrap();
        assert!(store.get_property_by_id(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn favorite_join_tolerates_stale_ids() {
        let store = store();
        let id = store.create_property(&record("A", "u1")).await.unwrap();
        store.add_favorite("u2", &id).await.unwrap();
        store.add_favorite("u2", "deleted-long-ago").await.unwrap();

        let favorites = store.get_favorite_properties("u2").await.unwrap();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].id, id);
    }

    #[tokio::test]
    async fn malformed_records_are_skipped_on_fetch() {
        let kv = MemoryKvStore::new();
        kv.put("properties/bad", json!({"title": 42})).await.unwrap();
        let store = CatalogStore::new(kv);
        let id = store.create_property(&record("Good", "u1")).await.unwrap();

        let all = store.get_all_properties().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, id);
    }
}
