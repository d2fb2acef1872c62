use crate::models::{FilterState, Property, SortOption, TypeFilter};

/// Whether a single property passes every active filter
///
/// Predicate order does not change the result set; text match goes first
/// because it rejects most rows.
fn matches_filters(property: &Property, filters: &FilterState) -> bool {
    if !filters.search_query.is_empty() {
        let query = filters.search_query.to_lowercase();
        let hit = property.title.to_lowercase().contains(&query)
            || property.address.to_lowercase().contains(&query);
        if !hit {
            return false;
        }
    }

    if let TypeFilter::Only(wanted) = filters.property_type {
        if property.property_type != wanted {
            return false;
        }
    }

    filters.bedrooms.matches(property.bedrooms) && filters.bathrooms.matches(property.bathrooms)
}

/// Derive the visible, ordered subset of a fetched catalog
///
/// Pure and synchronous; safe to re-run on every filter or sort change.
/// `SortOption::Default` keeps store fetch order, the price sorts are stable
/// so equal rents keep their prior relative order.
pub fn derive_view(
    properties: &[Property],
    filters: &FilterState,
    sort: SortOption,
) -> Vec<Property> {
    let mut view: Vec<Property> = properties
        .iter()
        .filter(|p| matches_filters(p, filters))
        .cloned()
        .collect();

    match sort {
        SortOption::Default => {}
        SortOption::PriceAscending => {
            view.sort_by(|a, b| a.monthly_rent.total_cmp(&b.monthly_rent));
        }
        SortOption::PriceDescending => {
            view.sort_by(|a, b| b.monthly_rent.total_cmp(&a.monthly_rent));
        }
    }
    view
}
