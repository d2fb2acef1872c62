use crate::catalog::{
    accept_images, append_images, derive_view, normalize_new, normalize_update, remove_image,
    FavoritesSync, ImageFile, PropertyDraft, PropertyUpdate, ToggleOutcome,
};
use crate::error::{CatalogError, Result};
use crate::models::{FilterState, Property, SortOption};
use crate::store::{CatalogStore, KvStore};
use chrono::Utc;
use tracing::{debug, info};

/// One signed-in user's view of the catalog
///
/// Owns the fetched property collection, the optimistic favorite set and the
/// current filter/sort state. Mutations patch the local collection in place
/// so the view stays consistent without a full refetch.
pub struct CatalogSession<S: KvStore> {
    store: CatalogStore<S>,
    user_id: String,
    user_email: String,
    properties: Vec<Property>,
    favorites: FavoritesSync,
    filters: FilterState,
    sort: SortOption,
}

impl<S: KvStore> CatalogSession<S> {
    pub fn new(store: CatalogStore<S>, user_id: impl Into<String>, user_email: impl Into<String>) -> Self {
        Self {
            store,
            user_id: user_id.into(),
            user_email: user_email.into(),
            properties: Vec::new(),
            favorites: FavoritesSync::default(),
            filters: FilterState::default(),
            sort: SortOption::default(),
        }
    }

    pub fn store(&self) -> &CatalogStore<S> {
        &self.store
    }

    pub fn favorites(&self) -> &FavoritesSync {
        &self.favorites
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Fetch the full catalog and this user's favorite ids
    pub async fn refresh(&mut self) -> Result<()> {
        self.properties = self.store.get_all_properties().await?;
        let favorite_ids = self.store.get_favorite_ids(&self.user_id).await?;
        self.favorites.reload(favorite_ids);
        info!(
            "session refreshed: {} properties, {} favorites",
            self.properties.len(),
            self.favorites.ids().len()
        );
        Ok(())
    }

    /// The filtered, sorted subset the user currently sees
    pub fn visible(&self) -> Vec<Property> {
        derive_view(&self.properties, &self.filters, self.sort)
    }

    pub fn set_filters(&mut self, filters: FilterState) {
        self.filters = filters;
    }

    pub fn set_sort(&mut self, sort: SortOption) {
        self.sort = sort;
    }

    /// Clear every filter and the sort in one state change
    pub fn reset_filters(&mut self) {
        self.filters = FilterState::default();
        self.sort = SortOption::default();
    }

    /// Validate, encode and persist a brand-new listing; returns its id
    ///
    /// The image guard and normalizer both run before any store call, so a
    /// rejected draft leaves the store untouched.
    pub async fn list_property(&mut self, draft: PropertyDraft, files: Vec<ImageFile>) -> Result<String> {
        let mut draft = draft;
        if !files.is_empty() {
            draft.images = accept_images(files, 0).await?;
        }
        let mut record = normalize_new(draft, &self.user_id, &self.user_email, Utc::now())?;
        let id = self.store.create_property(&record).await?;
        record.id = id.clone();
        self.properties.push(record);
        Ok(id)
    }

    /// Merge an edit into an owned listing and persist it
    pub async fn edit_property(&mut self, id: &str, update: PropertyUpdate) -> Result<Property> {
        let existing = self
            .store
            .get_property_by_id(id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("property {id}")))?;
        if existing.owner_id != self.user_id {
            return Err(CatalogError::Unauthorized(format!(
                "property {id} belongs to another user"
            )));
        }

        let updated = normalize_update(update, &existing, Utc::now())?;
        self.store.update_property(id, &updated).await?;

        match self.properties.iter_mut().find(|p| p.id == id) {
            Some(slot) => *slot = updated.clone(),
            None => self.properties.push(updated.clone()),
        }
        Ok(updated)
    }

    /// Remove an owned listing and every local trace of it
    pub async fn delete_property(&mut self, id: &str) -> Result<()> {
        if let Some(existing) = self.store.get_property_by_id(id).await? {
            if existing.owner_id != self.user_id {
                return Err(CatalogError::Unauthorized(format!(
                    "property {id} belongs to another user"
                )));
            }
        }
        self.store.delete_property(id).await?;
        self.properties.retain(|p| p.id != id);
        // The favorite relation is now stale either way
        self.favorites.forget(id);
        debug!("removed property {} from session state", id);
        Ok(())
    }

    /// Append freshly picked files to an owned listing's image set
    ///
    /// The guard caps the batch at the room left under the four-image limit;
    /// a selection that caps down to nothing is a no-op, not an error.
    pub async fn append_property_images(
        &mut self,
        id: &str,
        files: Vec<ImageFile>,
    ) -> Result<Property> {
        let existing = self
            .store
            .get_property_by_id(id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("property {id}")))?;
        let encoded = accept_images(files, existing.images.len()).await?;
        if encoded.is_empty() {
            return Ok(existing);
        }
        let images = append_images(&existing.images, encoded);
        self.edit_property(
            id,
            PropertyUpdate {
                images: Some(images),
                ..PropertyUpdate::default()
            },
        )
        .await
    }

    /// Drop the image at `index` from an owned listing
    ///
    /// Dropping the last remaining image is rejected by the edit validation.
    pub async fn remove_property_image(&mut self, id: &str, index: usize) -> Result<Property> {
        let existing = self
            .store
            .get_property_by_id(id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("property {id}")))?;
        let mut images = existing.images;
        remove_image(&mut images, index);
        self.edit_property(
            id,
            PropertyUpdate {
                images: Some(images),
                ..PropertyUpdate::default()
            },
        )
        .await
    }

    /// Flip a favorite with optimistic local update; errors come back as a value
    pub async fn toggle_favorite(&self, property_id: &str) -> ToggleOutcome {
        self.favorites
            .toggle(&self.store, &self.user_id, property_id)
            .await
    }

    /// Listings this session's user owns, from the local collection
    pub fn my_listings(&self) -> Vec<Property> {
        self.properties
            .iter()
            .filter(|p| p.owner_id == self.user_id)
            .cloned()
            .collect()
    }

    /// Favorited listings, joined against the local collection
    ///
    /// Stale favorite ids with no matching property drop out silently.
    pub fn favorite_properties(&self) -> Vec<Property> {
        let ids = self.favorites.ids();
        self.properties
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect()
    }
}
