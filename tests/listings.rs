//! End-to-end listing flows against the in-memory store

use serde_json::json;
use testresult::TestResult;

use rental_listings::{
    mapper::BOOTSTRAP_AGENT_ID,
    repository::{AGENTS_TABLE, PROPERTIES_TABLE},
    store::{MemoryStore, StoreCall},
    ListingError, NewProperty, PropertyDraft, PropertyPatch, PropertyRepository, PropertyState,
    StoreError,
};

fn store() -> Result<MemoryStore, StoreError> {
    let store = MemoryStore::new();
    store.seed(
        AGENTS_TABLE,
        json!({
            "id": BOOTSTRAP_AGENT_ID,
            "name": "John Mapfumo",
            "is_verified": true,
            "rating": "4.6",
            "properties_listed": 14
        }),
    )?;
    store.seed(
        PROPERTIES_TABLE,
        json!({
            "id": "b7c1",
            "title": "Avondale duplex",
            "location": "Avondale",
            "price": "1350.00",
            "bedrooms": 3,
            "bathrooms": 2,
            "area": 140,
            "image_url": null,
            "description": null,
            "amenities": null,
            "agent_id": BOOTSTRAP_AGENT_ID,
            "is_verified": true,
            "rating": "4.2",
            "reviews_count": 9,
            "has_virtual_tour": null,
            "is_featured": true
        }),
    )?;
    Ok(store)
}

#[tokio::test]
async fn created_property_is_found_with_amenities_and_agent() -> TestResult {
    let mut state = PropertyState::mount(PropertyRepository::new(store()?)).await;

    let draft = PropertyDraft {
        title: "Loft A".to_string(),
        location: "Harare".to_string(),
        price: 500.0,
        bedrooms: 1,
        bathrooms: 1,
        area: 40.0,
        image: "http://x/y.jpg".to_string(),
        description: "d".to_string(),
        amenities: "wifi,parking".to_string(),
    };
    assert!(state.add(draft.into_new_property()?).await);

    let id = state
        .last_added()
        .map(|p| p.id.clone())
        .ok_or("no property after add")?;
    let found = state.get_by_id(&id).ok_or("created property not found")?;

    assert_eq!(found.amenities, vec!["wifi", "parking"]);
    assert_eq!(found.agent.id, BOOTSTRAP_AGENT_ID);
    assert_eq!(found.agent.name, "John Mapfumo");
    assert_eq!(found.image, "http://x/y.jpg");

    Ok(())
}

#[tokio::test]
async fn stored_text_numbers_and_nulls_are_normalised() -> TestResult {
    let state = PropertyState::mount(PropertyRepository::new(store()?)).await;

    let duplex = state.get_by_id("b7c1").ok_or("seeded property missing")?;

    assert_eq!(duplex.price, 1350.0);
    assert_eq!(duplex.rating, 4.2);
    assert_eq!(duplex.agent.rating, 4.6);
    assert!(duplex.amenities.is_empty());
    assert_eq!(duplex.image, "");
    assert!(!duplex.virtual_tour);
    assert!(duplex.featured);

    Ok(())
}

#[tokio::test]
async fn partial_update_touches_only_given_columns() -> TestResult {
    let mut state = PropertyState::mount(PropertyRepository::new(store()?)).await;

    let patch = PropertyPatch {
        price: Some(1400.0),
        ..Default::default()
    };
    assert!(state.update("b7c1", &patch).await);

    let rows = state.repository().store().rows(PROPERTIES_TABLE);
    let row = rows.first().ok_or("row missing")?;
    assert_eq!(row["price"], json!(1400));
    // Untouched columns keep their stored representation
    assert_eq!(row["rating"], json!("4.2"));
    assert_eq!(row["amenities"], json!(null));

    Ok(())
}

#[tokio::test]
async fn edit_form_round_trips_through_the_store() -> TestResult {
    let mut state = PropertyState::mount(PropertyRepository::new(store()?)).await;
    let current = state.get_by_id("b7c1").ok_or("seeded property missing")?;

    let mut draft = PropertyDraft::from(current);
    draft.image = "http://img/duplex.png".to_string();
    draft.description = "Two storeys".to_string();
    draft.amenities = "borehole, solar".to_string();
    assert!(state.update("b7c1", &draft.into_patch()?).await);

    let updated = state.get_by_id("b7c1").ok_or("updated property missing")?;
    assert_eq!(updated.amenities, vec!["borehole", "solar"]);
    assert_eq!(updated.title, "Avondale duplex");
    assert!(updated.featured);

    Ok(())
}

#[tokio::test]
async fn failed_create_leaves_collection_untouched() -> TestResult {
    let mut state = PropertyState::mount(PropertyRepository::new(store()?)).await;
    let rejection = StoreError::rejected("new row violates row-level security policy");
    state
        .repository()
        .store()
        .fail_next(StoreCall::Insert, rejection)?;

    let added = state
        .add(NewProperty {
            title: "Blocked".to_string(),
            ..Default::default()
        })
        .await;

    assert!(!added);
    assert_eq!(state.properties().len(), 1);
    assert!(matches!(
        state.error(),
        Some(ListingError::StoreWrite { operation: "insert property", .. })
    ));

    Ok(())
}

#[tokio::test]
async fn saved_marks_stay_local() -> TestResult {
    let mut state = PropertyState::mount(PropertyRepository::new(store()?)).await;
    let before = state.repository().store().rows(PROPERTIES_TABLE);

    state.toggle_saved("b7c1");
    let saved: Vec<_> = state.saved_properties().iter().map(|p| p.id.clone()).collect();

    assert_eq!(saved, vec!["b7c1"]);
    assert_eq!(state.repository().store().rows(PROPERTIES_TABLE), before);
    assert_eq!(state.repository().store().calls(StoreCall::Update), 0);

    Ok(())
}
