use crate::error::{CatalogError, Result};
use crate::catalog::images::MAX_IMAGES;
use crate::models::{Property, PropertyType};
use chrono::{DateTime, Utc};

/// Amenities arrive either pre-split or as one comma-separated line
#[derive(Debug, Clone)]
pub enum AmenitiesInput {
    List(Vec<String>),
    Csv(String),
}

impl Default for AmenitiesInput {
    fn default() -> Self {
        AmenitiesInput::List(Vec::new())
    }
}

impl AmenitiesInput {
    fn into_normalized(self) -> Vec<String> {
        let items = match self {
            AmenitiesInput::List(items) => items,
            AmenitiesInput::Csv(line) => line.split(',').map(str::to_string).collect(),
        };
        items
            .into_iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect()
    }
}

/// Raw input for a new listing, before validation
#[derive(Debug, Clone, Default)]
pub struct PropertyDraft {
    pub title: String,
    pub description: String,
    pub address: String,
    pub monthly_rent: Option<f64>,
    pub property_type: Option<PropertyType>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub amenities: AmenitiesInput,
    pub images: Vec<String>,
}

/// Partial edit of an existing listing; absent fields keep their value
#[derive(Debug, Clone, Default)]
pub struct PropertyUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub monthly_rent: Option<f64>,
    pub property_type: Option<PropertyType>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub amenities: Option<AmenitiesInput>,
    pub images: Option<Vec<String>>,
    pub owner_id: Option<String>,
    pub owner_email: Option<String>,
    pub is_available: Option<bool>,
}

fn check_rent(rent: Option<f64>) -> Result<f64> {
    match rent {
        Some(rent) if rent.is_finite() && rent >= 0.0 => Ok(rent),
        Some(_) => Err(CatalogError::validation(
            "monthly rent must be a non-negative number",
        )),
        None => Err(CatalogError::validation("monthly rent is required")),
    }
}

fn check_address(address: &str) -> Result<String> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(CatalogError::validation("address must not be empty"));
    }
    Ok(trimmed.to_string())
}

fn check_title(title: &str) -> Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(CatalogError::validation("title must not be empty"));
    }
    Ok(trimmed.to_string())
}

fn is_data_image(entry: &str) -> bool {
    entry.starts_with("data:image")
}

/// Validate a draft into a canonical record for a brand-new listing
///
/// Pure and fail-fast: nothing is persisted here, and an error means no
/// field of the draft was applied anywhere.
pub fn normalize_new(
    draft: PropertyDraft,
    owner_id: &str,
    owner_email: &str,
    now: DateTime<Utc>,
) -> Result<Property> {
    let title = check_title(&draft.title)?;
    let address = check_address(&draft.address)?;
    let monthly_rent = check_rent(draft.monthly_rent)?;

    if draft.images.is_empty() {
        return Err(CatalogError::validation(
            "at least one image is required for a listing",
        ));
    }
    if draft.images.len() > MAX_IMAGES {
        return Err(CatalogError::validation(format!(
            "maximum of {MAX_IMAGES} images allowed"
        )));
    }
    if !draft.images.iter().all(|img| is_data_image(img)) {
        return Err(CatalogError::validation(
            "all images must be base64 data URIs",
        ));
    }

    Ok(Property {
        id: String::new(),
        title,
        address,
        description: draft.description,
        monthly_rent,
        property_type: draft.property_type.unwrap_or(PropertyType::Apartment),
        bedrooms: draft.bedrooms.unwrap_or(1).max(1),
        bathrooms: draft.bathrooms.unwrap_or(1).max(1),
        amenities: draft.amenities.into_normalized(),
        images: draft.images,
        owner_id: owner_id.to_string(),
        owner_email: owner_email.to_string(),
        created_at: now,
        updated_at: None,
        is_available: true,
    })
}

/// Merge an edit over an existing record into a canonical updated record
///
/// Fields absent from the update keep the existing value. Ownership fields
/// survive unless explicitly supplied, `created_at` is never touched and
/// `updated_at` is always refreshed.
pub fn normalize_update(
    update: PropertyUpdate,
    existing: &Property,
    now: DateTime<Utc>,
) -> Result<Property> {
    let title = match update.title {
        Some(title) => check_title(&title)?,
        None => existing.title.clone(),
    };
    let address = match update.address {
        Some(address) => check_address(&address)?,
        None => existing.address.clone(),
    };
    let monthly_rent = match update.monthly_rent {
        Some(rent) => check_rent(Some(rent))?,
        None => existing.monthly_rent,
    };

    // Edits may keep previously-hosted http images alongside data URIs;
    // anything else is silently dropped, but the result must stay 1..=4.
    let images = match update.images {
        Some(images) => {
            if images.len() > MAX_IMAGES {
                return Err(CatalogError::validation(format!(
                    "maximum of {MAX_IMAGES} images allowed"
                )));
            }
            let valid: Vec<String> = images
                .into_iter()
                .filter(|img| is_data_image(img) || img.starts_with("http"))
                .collect();
            if valid.is_empty() {
                return Err(CatalogError::validation(
                    "at least one valid image is required",
                ));
            }
            valid
        }
        None => existing.images.clone(),
    };
    if images.is_empty() {
        return Err(CatalogError::validation(
            "at least one image is required for a listing",
        ));
    }

    Ok(Property {
        id: existing.id.clone(),
        title,
        address,
        description: update
            .description
            .unwrap_or_else(|| existing.description.clone()),
        monthly_rent,
        property_type: update.property_type.unwrap_or(existing.property_type),
        bedrooms: update.bedrooms.unwrap_or(existing.bedrooms).max(1),
        bathrooms: update.bathrooms.unwrap_or(existing.bathrooms).max(1),
        amenities: match update.amenities {
            Some(input) => input.into_normalized(),
            None => existing.amenities.clone(),
        },
        images,
        owner_id: update
            .owner_id
            .unwrap_or_else(|| existing.owner_id.clone()),
        owner_email: update
            .owner_email
            .unwrap_or_else(|| existing.owner_email.clone()),
        created_at: existing.created_at,
        updated_at: Some(now),
        is_available: update.is_available.unwrap_or(existing.is_available),
    })
}
