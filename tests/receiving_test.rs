mod common;

use common::*;
use larder_api::entities::item::ItemType;
use larder_api::entities::{location, receiving_event};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

#[tokio::test]
async fn receiving_lands_in_the_configured_default_location() {
    let (engine, _rx) = setup_engine().await;
    let db = engine.db.as_ref();
    let ctx = manager_ctx();

    let beans = create_test_item(db, "Coffee Beans", ItemType::Ingredient, "Gram", None).await;
    let floor = create_test_location(db, STORE, "Sales Floor", true).await;
    let _back = create_test_location(db, STORE, "Back of House", false).await;
    set_default_location(db, STORE, beans.item_id, floor.location_id).await;

    let lot = engine
        .receiving
        .receive_stock(&ctx, beans.item_id, 500.0, None)
        .await
        .unwrap();

    assert_eq!(lot.location_id, floor.location_id);
    assert_close(lot.quantity, 500.0);
}

#[tokio::test]
async fn receiving_prefers_back_of_house_over_the_sales_floor() {
    let (engine, _rx) = setup_engine().await;
    let db = engine.db.as_ref();
    let ctx = manager_ctx();

    let beans = create_test_item(db, "Coffee Beans", ItemType::Ingredient, "Gram", None).await;
    let _floor = create_test_location(db, STORE, "Sales Floor", true).await;
    let back = create_test_location(db, STORE, "Storeroom", false).await;

    let lot = engine
        .receiving
        .receive_stock(&ctx, beans.item_id, 500.0, None)
        .await
        .unwrap();

    assert_eq!(lot.location_id, back.location_id);
}

#[tokio::test]
async fn receiving_falls_back_to_any_location() {
    let (engine, _rx) = setup_engine().await;
    let db = engine.db.as_ref();
    let ctx = manager_ctx();

    let beans = create_test_item(db, "Coffee Beans", ItemType::Ingredient, "Gram", None).await;
    let floor = create_test_location(db, STORE, "Sales Floor", true).await;

    let lot = engine
        .receiving
        .receive_stock(&ctx, beans.item_id, 500.0, None)
        .await
        .unwrap();

    assert_eq!(lot.location_id, floor.location_id);
}

#[tokio::test]
async fn receiving_bootstraps_a_location_for_an_empty_store() {
    let (engine, _rx) = setup_engine().await;
    let db = engine.db.as_ref();
    let ctx = manager_ctx();

    let beans = create_test_item(db, "Coffee Beans", ItemType::Ingredient, "Gram", None).await;

    let lot = engine
        .receiving
        .receive_stock(&ctx, beans.item_id, 500.0, None)
        .await
        .unwrap();

    let created = location::Entity::find_by_id(lot.location_id)
        .one(db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(created.name, "Back of House");
    assert_eq!(created.store_id, STORE);
    assert!(!created.is_sales_floor);
}

#[tokio::test]
async fn each_delivery_gets_its_own_lot_and_fresh_expiration() {
    let (engine, _rx) = setup_engine().await;
    let db = engine.db.as_ref();
    let ctx = manager_ctx();

    let milk = create_test_item(db, "Milk", ItemType::Ingredient, "Litre", Some(5)).await;
    create_test_location(db, STORE, "Walk-in", false).await;

    let first = engine
        .receiving
        .receive_stock(&ctx, milk.item_id, 20.0, Some(Decimal::new(149, 2)))
        .await
        .unwrap();
    let second = engine
        .receiving
        .receive_stock(&ctx, milk.item_id, 10.0, None)
        .await
        .unwrap();

    // Receiving never merges into an existing lot.
    assert_ne!(first.lot_id, second.lot_id);
    assert_eq!(lot_quantities(&engine.db, STORE, milk.item_id).await.len(), 2);
    assert_close(on_hand(&engine.db, STORE, milk.item_id).await, 30.0);

    // Expiration is shelf life from receipt.
    let expiration = first.expiration_date.expect("shelf-life item gets expiration");
    let delta = (expiration - days_from_now(5)).num_seconds().abs();
    assert!(delta < 5, "expiration should be ~5 days out, off by {}s", delta);

    // The immutable receiving log carries the delivery cost.
    let events = receiving_event::Entity::find()
        .filter(receiving_event::Column::ItemId.eq(milk.item_id))
        .all(db)
        .await
        .unwrap();
    assert_eq!(events.len(), 2);
    assert!(events[0].unit_cost.is_some());
    assert!(events[1].unit_cost.is_none());
}

#[tokio::test]
async fn items_without_shelf_life_get_no_expiration() {
    let (engine, _rx) = setup_engine().await;
    let db = engine.db.as_ref();
    let ctx = manager_ctx();

    let salt = create_test_item(db, "Salt", ItemType::Ingredient, "Gram", None).await;
    create_test_location(db, STORE, "Dry Storage", false).await;

    let lot = engine
        .receiving
        .receive_stock(&ctx, salt.item_id, 1000.0, None)
        .await
        .unwrap();
    assert!(lot.expiration_date.is_none());
}

#[tokio::test]
async fn non_positive_quantities_are_rejected() {
    let (engine, _rx) = setup_engine().await;
    let db = engine.db.as_ref();
    let ctx = manager_ctx();

    let salt = create_test_item(db, "Salt", ItemType::Ingredient, "Gram", None).await;
    create_test_location(db, STORE, "Dry Storage", false).await;

    assert!(engine
        .receiving
        .receive_stock(&ctx, salt.item_id, 0.0, None)
        .await
        .is_err());
    assert!(engine
        .receiving
        .receive_stock(&ctx, salt.item_id, -5.0, None)
        .await
        .is_err());
    assert_close(on_hand(&engine.db, STORE, salt.item_id).await, 0.0);
}
