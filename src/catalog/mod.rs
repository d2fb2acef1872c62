pub mod favorites;
pub mod images;
pub mod normalize;
pub mod query;

pub use favorites::{FavoritesSync, ToggleOutcome, ToggleState};
pub use images::{accept_images, append_images, remove_image, ImageFile};
pub use normalize::{normalize_new, normalize_update, AmenitiesInput, PropertyDraft, PropertyUpdate};
pub use query::derive_view;
