#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue::Set, ConnectOptions, Database, DatabaseConnection};
use tokio::sync::mpsc;

use larder_api::{
    access::{AccessContext, Role},
    db,
    entities::{
        inventory_lot, item,
        item::ItemType,
        location, receiving_event, recipe, recipe_ingredient, store_item_setting,
        unit_conversion,
    },
    events::{Event, EventSender},
    services::ledger,
    Engine,
};

pub const STORE: i64 = 1;

pub const TOLERANCE: f64 = 1e-6;

/// Spins up a fresh in-memory SQLite database with the full schema.
pub async fn setup_db() -> Arc<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(Duration::from_secs(600));

    let pool = Database::connect(options)
        .await
        .expect("Failed to connect to in-memory SQLite");
    db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    Arc::new(pool)
}

pub fn event_channel() -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(100);
    (EventSender::new(tx), rx)
}

pub async fn setup_engine() -> (Engine, mpsc::Receiver<Event>) {
    let pool = setup_db().await;
    let (sender, rx) = event_channel();
    (Engine::new(pool, Some(sender)), rx)
}

pub fn manager_ctx() -> AccessContext {
    AccessContext::new(STORE, Role::Manager)
}

pub fn staff_ctx() -> AccessContext {
    AccessContext::new(STORE, Role::Staff)
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() <= TOLERANCE,
        "expected {} within {} of {}",
        actual,
        TOLERANCE,
        expected
    );
}

pub fn days_from_now(days: i64) -> DateTime<Utc> {
    Utc::now() + chrono::Duration::days(days)
}

pub async fn create_test_item(
    db: &DatabaseConnection,
    name: &str,
    item_type: ItemType,
    base_unit: &str,
    shelf_life_days: Option<i32>,
) -> item::Model {
    item::ActiveModel {
        name: Set(name.to_string()),
        item_type: Set(item_type.to_string()),
        base_unit: Set(base_unit.to_string()),
        shelf_life_days: Set(shelf_life_days),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert item")
}

pub async fn create_test_location(
    db: &DatabaseConnection,
    store_id: i64,
    name: &str,
    is_sales_floor: bool,
) -> location::Model {
    location::ActiveModel {
        store_id: Set(store_id),
        name: Set(name.to_string()),
        is_sales_floor: Set(is_sales_floor),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert location")
}

pub async fn set_default_location(
    db: &DatabaseConnection,
    store_id: i64,
    item_id: i64,
    location_id: i64,
) -> store_item_setting::Model {
    store_item_setting::ActiveModel {
        store_id: Set(store_id),
        item_id: Set(item_id),
        default_location_id: Set(Some(location_id)),
        par_level: Set(0.0),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert store item setting")
}

pub async fn create_test_conversion(
    db: &DatabaseConnection,
    item_id: i64,
    unit_name: &str,
    factor: f64,
    is_default_display: bool,
) -> unit_conversion::Model {
    unit_conversion::ActiveModel {
        item_id: Set(item_id),
        unit_name: Set(unit_name.to_string()),
        factor: Set(factor),
        is_default_display: Set(is_default_display),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert unit conversion")
}

pub async fn create_test_recipe(
    db: &DatabaseConnection,
    item_id: i64,
    yield_quantity: f64,
    yield_unit_id: Option<i64>,
) -> recipe::Model {
    recipe::ActiveModel {
        item_id: Set(item_id),
        yield_quantity: Set(yield_quantity),
        yield_unit_id: Set(yield_unit_id),
        instructions: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert recipe")
}

pub async fn add_test_ingredient(
    db: &DatabaseConnection,
    recipe_id: i64,
    ingredient_item_id: i64,
    quantity_required: f64,
) -> recipe_ingredient::Model {
    recipe_ingredient::ActiveModel {
        recipe_id: Set(recipe_id),
        ingredient_item_id: Set(ingredient_item_id),
        quantity_required: Set(quantity_required),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert recipe ingredient")
}

pub async fn seed_lot(
    db: &DatabaseConnection,
    store_id: i64,
    item_id: i64,
    location_id: i64,
    quantity: f64,
    expiration_date: Option<DateTime<Utc>>,
) -> inventory_lot::Model {
    ledger::add_lot(db, store_id, item_id, location_id, quantity, expiration_date)
        .await
        .expect("Failed to seed lot")
}

pub async fn seed_receiving_event(
    db: &DatabaseConnection,
    store_id: i64,
    item_id: i64,
    quantity: f64,
    received_at: DateTime<Utc>,
) -> receiving_event::Model {
    receiving_event::ActiveModel {
        transaction_id: Set(uuid::Uuid::new_v4()),
        store_id: Set(store_id),
        item_id: Set(item_id),
        quantity: Set(quantity),
        unit_cost: Set(None),
        received_at: Set(received_at),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert receiving event")
}

pub async fn lot_quantities(db: &DatabaseConnection, store_id: i64, item_id: i64) -> Vec<f64> {
    ledger::lots_for_consumption(db, store_id, item_id, None)
        .await
        .expect("Failed to list lots")
        .iter()
        .map(|lot| lot.quantity)
        .collect()
}

pub async fn on_hand(db: &DatabaseConnection, store_id: i64, item_id: i64) -> f64 {
    ledger::total_quantity(db, store_id, item_id)
        .await
        .expect("Failed to total lots")
}
