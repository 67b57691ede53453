mod common;

use common::*;
use larder_api::entities::item::ItemType;
use larder_api::entities::production_event;
use larder_api::errors::ServiceError;
use larder_api::services::production::ProductionOutcome;
use sea_orm::{EntityTrait, PaginatorTrait};

struct Bakery {
    flour_id: i64,
    loaf_id: i64,
    recipe_id: i64,
    storage_id: i64,
    front_id: i64,
}

/// One loaf recipe consuming 250 g of flour per batch, yielding 2 loaves.
async fn seed_bakery(db: &sea_orm::DatabaseConnection) -> Bakery {
    let flour = create_test_item(db, "Flour", ItemType::Ingredient, "Gram", None).await;
    let loaf = create_test_item(db, "Sourdough Loaf", ItemType::Product, "Loaf", Some(2)).await;
    let recipe = create_test_recipe(db, loaf.item_id, 2.0, None).await;
    add_test_ingredient(db, recipe.recipe_id, flour.item_id, 250.0).await;
    let storage = create_test_location(db, STORE, "Dry Storage", false).await;
    let front = create_test_location(db, STORE, "Sales Floor", true).await;
    Bakery {
        flour_id: flour.item_id,
        loaf_id: loaf.item_id,
        recipe_id: recipe.recipe_id,
        storage_id: storage.location_id,
        front_id: front.location_id,
    }
}

#[tokio::test]
async fn production_consumes_expiring_lots_first() {
    let (engine, _rx) = setup_engine().await;
    let db = engine.db.as_ref();
    let ctx = manager_ctx();
    let bakery = seed_bakery(db).await;

    seed_lot(
        &engine.db,
        STORE,
        bakery.flour_id,
        bakery.storage_id,
        200.0,
        Some(days_from_now(2)),
    )
    .await;
    seed_lot(
        &engine.db,
        STORE,
        bakery.flour_id,
        bakery.storage_id,
        300.0,
        Some(days_from_now(10)),
    )
    .await;

    let outcome = engine
        .production
        .log_production(&ctx, bakery.recipe_id, 1.0, "batches", Some(bakery.front_id), false)
        .await
        .unwrap();

    let ProductionOutcome::Completed { output_lot, deficits, .. } = outcome else {
        panic!("expected completed production");
    };
    assert!(deficits.is_empty());

    // 250 g needed: the 2-day lot is gone, the 10-day lot keeps 250 g.
    let flour_lots = lot_quantities(&engine.db, STORE, bakery.flour_id).await;
    assert_eq!(flour_lots.len(), 1);
    assert_close(flour_lots[0], 250.0);

    // One batch of output: 2 loaves at the target location, shelf life applied.
    let output = output_lot.expect("target location given");
    assert_eq!(output.location_id, bakery.front_id);
    assert_eq!(output.item_id, bakery.loaf_id);
    assert_close(output.quantity, 2.0);
    assert!(output.expiration_date.is_some());
}

#[tokio::test]
async fn shortfall_reports_without_touching_the_ledger() {
    let (engine, _rx) = setup_engine().await;
    let db = engine.db.as_ref();
    let ctx = manager_ctx();

    let eggs = create_test_item(db, "Eggs", ItemType::Ingredient, "unit", None).await;
    let cake = create_test_item(db, "Sheet Cake", ItemType::Product, "Tray", None).await;
    let recipe = create_test_recipe(db, cake.item_id, 1.0, None).await;
    add_test_ingredient(db, recipe.recipe_id, eggs.item_id, 500.0).await;
    let fridge = create_test_location(db, STORE, "Walk-in", false).await;

    seed_lot(&engine.db, STORE, eggs.item_id, fridge.location_id, 100.0, None).await;

    let outcome = engine
        .production
        .log_production(&ctx, recipe.recipe_id, 1.0, "batches", Some(fridge.location_id), false)
        .await
        .unwrap();

    let ProductionOutcome::InsufficientStock(shortfalls) = outcome else {
        panic!("expected insufficient stock");
    };
    assert_eq!(shortfalls.len(), 1);
    let line = &shortfalls[0];
    assert_eq!(line.item_id, eggs.item_id);
    assert_eq!(line.name, "Eggs");
    assert_close(line.required, 500.0);
    assert_close(line.available, 100.0);
    assert_eq!(line.unit, "unit");

    // Check-before-commit: no lot changed, no output, no event persisted.
    assert_close(on_hand(&engine.db, STORE, eggs.item_id).await, 100.0);
    assert_close(on_hand(&engine.db, STORE, cake.item_id).await, 0.0);
    let events = production_event::Entity::find().count(db).await.unwrap();
    assert_eq!(events, 0);
}

#[tokio::test]
async fn shortfall_lines_carry_display_units() {
    let (engine, _rx) = setup_engine().await;
    let db = engine.db.as_ref();
    let ctx = manager_ctx();
    let bakery = seed_bakery(db).await;

    create_test_conversion(db, bakery.flour_id, "Kilogram", 1000.0, true).await;
    seed_lot(&engine.db, STORE, bakery.flour_id, bakery.storage_id, 100.0, None).await;

    let outcome = engine
        .production
        .log_production(&ctx, bakery.recipe_id, 2.0, "batches", None, false)
        .await
        .unwrap();

    let ProductionOutcome::InsufficientStock(shortfalls) = outcome else {
        panic!("expected insufficient stock");
    };
    let line = &shortfalls[0];
    assert_close(line.required, 500.0);
    assert_eq!(line.display_unit, "Kilogram");
    assert_close(line.display_required, 0.5);
    assert_close(line.display_available, 0.1);
}

#[tokio::test]
async fn forced_production_surfaces_the_residual_deficit() {
    let (engine, _rx) = setup_engine().await;
    let db = engine.db.as_ref();
    let ctx = manager_ctx();

    let eggs = create_test_item(db, "Eggs", ItemType::Ingredient, "unit", None).await;
    let cake = create_test_item(db, "Sheet Cake", ItemType::Product, "Tray", None).await;
    let recipe = create_test_recipe(db, cake.item_id, 1.0, None).await;
    add_test_ingredient(db, recipe.recipe_id, eggs.item_id, 500.0).await;
    let fridge = create_test_location(db, STORE, "Walk-in", false).await;

    seed_lot(&engine.db, STORE, eggs.item_id, fridge.location_id, 100.0, None).await;

    let outcome = engine
        .production
        .log_production(&ctx, recipe.recipe_id, 1.0, "batches", None, true)
        .await
        .unwrap();

    let ProductionOutcome::Completed { deficits, .. } = outcome else {
        panic!("expected forced completion");
    };
    assert_eq!(deficits.len(), 1);
    assert_eq!(deficits[0].item_id, eggs.item_id);
    assert_close(deficits[0].shortfall, 400.0);

    // Everything on hand was drained.
    assert_close(on_hand(&engine.db, STORE, eggs.item_id).await, 0.0);
}

#[tokio::test]
async fn no_target_location_means_consumption_only() {
    let (engine, _rx) = setup_engine().await;
    let db = engine.db.as_ref();
    let ctx = manager_ctx();
    let bakery = seed_bakery(db).await;

    seed_lot(&engine.db, STORE, bakery.flour_id, bakery.storage_id, 500.0, None).await;

    let outcome = engine
        .production
        .log_production(&ctx, bakery.recipe_id, 1.0, "batches", None, false)
        .await
        .unwrap();

    let ProductionOutcome::Completed { output_lot, .. } = outcome else {
        panic!("expected completed production");
    };
    assert!(output_lot.is_none());
    assert_close(on_hand(&engine.db, STORE, bakery.loaf_id).await, 0.0);
    assert_close(on_hand(&engine.db, STORE, bakery.flour_id).await, 250.0);
}

#[tokio::test]
async fn quantities_in_the_yield_unit_divide_by_yield() {
    let (engine, _rx) = setup_engine().await;
    let db = engine.db.as_ref();
    let ctx = manager_ctx();
    let bakery = seed_bakery(db).await;

    seed_lot(&engine.db, STORE, bakery.flour_id, bakery.storage_id, 1000.0, None).await;

    // 6 loaves at 2 loaves per batch = 3 batches = 750 g of flour.
    let outcome = engine
        .production
        .log_production(&ctx, bakery.recipe_id, 6.0, "Loaf", Some(bakery.front_id), false)
        .await
        .unwrap();

    let ProductionOutcome::Completed { output_lot, .. } = outcome else {
        panic!("expected completed production");
    };
    assert_close(on_hand(&engine.db, STORE, bakery.flour_id).await, 250.0);
    assert_close(output_lot.unwrap().quantity, 6.0);
}

#[tokio::test]
async fn conservation_across_receive_and_produce() {
    let (engine, _rx) = setup_engine().await;
    let db = engine.db.as_ref();
    let ctx = manager_ctx();
    let bakery = seed_bakery(db).await;

    engine
        .receiving
        .receive_stock(&ctx, bakery.flour_id, 500.0, None)
        .await
        .unwrap();
    let before = on_hand(&engine.db, STORE, bakery.flour_id).await;

    engine
        .production
        .log_production(&ctx, bakery.recipe_id, 1.0, "batches", Some(bakery.front_id), false)
        .await
        .unwrap();

    let after = on_hand(&engine.db, STORE, bakery.flour_id).await;
    assert_close(after, before - 250.0);
    assert_close(on_hand(&engine.db, STORE, bakery.loaf_id).await, 2.0);
}

#[tokio::test]
async fn zero_yield_recipes_are_a_configuration_error() {
    let (engine, _rx) = setup_engine().await;
    let db = engine.db.as_ref();
    let ctx = manager_ctx();

    let flour = create_test_item(db, "Flour", ItemType::Ingredient, "Gram", None).await;
    let loaf = create_test_item(db, "Loaf", ItemType::Product, "Loaf", None).await;
    let recipe = create_test_recipe(db, loaf.item_id, 0.0, None).await;
    add_test_ingredient(db, recipe.recipe_id, flour.item_id, 100.0).await;

    let result = engine
        .production
        .log_production(&ctx, recipe.recipe_id, 3.0, "Loaf", None, false)
        .await;
    assert!(matches!(result, Err(ServiceError::ValidationError(_))));
}

#[tokio::test]
async fn unknown_recipes_are_not_found() {
    let (engine, _rx) = setup_engine().await;
    let ctx = manager_ctx();

    let result = engine
        .production
        .log_production(&ctx, 404, 1.0, "batches", None, false)
        .await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}
