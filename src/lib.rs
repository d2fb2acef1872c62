pub mod catalog;
pub mod error;
pub mod models;
pub mod session;
pub mod store;

pub use error::{CatalogError, Result};
pub use models::{FilterState, Property, PropertyType, RoomBand, SortOption, TypeFilter};
pub use session::CatalogSession;
