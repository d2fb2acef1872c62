use rental_scout::catalog::{
    AmenitiesInput, ImageFile, PropertyDraft, PropertyUpdate, ToggleOutcome,
};
use rental_scout::models::{FilterState, PropertyType, RoomBand, SortOption};
use rental_scout::session::CatalogSession;
use rental_scout::store::{CatalogStore, KvStore, MemoryKvStore, RestKvStore};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber;

fn demo_file(name: &str, size: usize) -> ImageFile {
    ImageFile {
        name: name.to_string(),
        mime: "image/jpeg".to_string(),
        bytes: vec![0x7F; size],
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("🏠 Rental Scout - Catalog Demo");
    info!("==============================");
    info!("");

    // Point RENTAL_SCOUT_DB_URL at a hosted realtime database to run the
    // demo against it; otherwise everything stays in memory.
    let backend: Arc<dyn KvStore> = match std::env::var("RENTAL_SCOUT_DB_URL") {
        Ok(url) => {
            info!("Using REST store at {}", url);
            Arc::new(RestKvStore::new(url)?)
        }
        Err(_) => Arc::new(MemoryKvStore::new()),
    };
    let store = CatalogStore::new(backend);
    info!("Store backend: {}", store.backend_name());

    let mut session = CatalogSession::new(store, "demo-user", "demo@example.com");
    session.refresh().await?;

    // List a couple of properties through the full validation pipeline
    let first = session
        .list_property(
            PropertyDraft {
                title: "Sunny 2BR apartment".to_string(),
                description: "South-facing, steps from the lake.".to_string(),
                address: "210 Lakeshore Rd".to_string(),
                monthly_rent: Some(2000.0),
                property_type: Some(PropertyType::Apartment),
                bedrooms: Some(2),
                bathrooms: Some(1),
                amenities: AmenitiesInput::Csv("parking, laundry, gym".to_string()),
                images: Vec::new(),
            },
            vec![demo_file("front.jpg", 2_048), demo_file("kitchen.jpg", 4_096)],
        )
        .await?;

    let second = session
        .list_property(
            PropertyDraft {
                title: "Large family house".to_string(),
                description: "Six bedrooms, fenced yard.".to_string(),
                address: "14 Birchmount Ave".to_string(),
                monthly_rent: Some(1500.0),
                property_type: Some(PropertyType::House),
                bedrooms: Some(6),
                bathrooms: Some(2),
                amenities: AmenitiesInput::Csv("yard, garage".to_string()),
                images: Vec::new(),
            },
            vec![demo_file("house.jpg", 3_072)],
        )
        .await?;

    info!("Listed properties {} and {}", first, second);

    // Band filter: only six-or-more bedroom listings
    session.set_filters(FilterState {
        bedrooms: RoomBand::AtLeast(6),
        ..FilterState::default()
    });
    for property in session.visible() {
        println!(
            "match: {} ({} bed) — CAD {}/month",
            property.title, property.bedrooms, property.monthly_rent
        );
    }

    // Reset and sort by price
    session.reset_filters();
    session.set_sort(SortOption::PriceAscending);
    println!("\nAll listings, cheapest first:");
    for (i, property) in session.visible().iter().enumerate() {
        println!(
            "{}. {} — CAD {}/month at {}",
            i + 1,
            property.title,
            property.monthly_rent,
            property.address
        );
    }

    // Favorite the cheaper one optimistically
    match session.toggle_favorite(&second).await {
        ToggleOutcome::Committed(now_favorite) => {
            info!("favorite committed, membership = {}", now_favorite)
        }
        ToggleOutcome::InFlight => info!("toggle already in flight, dropped"),
        ToggleOutcome::Failed(err) => info!("toggle failed and was reverted: {}", err),
    }
    println!("\nFavorites: {}", session.favorite_properties().len());

    // Knock the rent down on the first listing and add one more photo
    session
        .edit_property(
            &first,
            PropertyUpdate {
                monthly_rent: Some(1850.0),
                ..PropertyUpdate::default()
            },
        )
        .await?;
    session
        .append_property_images(&first, vec![demo_file("balcony.jpg", 1_024)])
        .await?;

    info!("✅ Demo session complete");
    Ok(())
}
