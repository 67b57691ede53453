//! Receiving: turns a delivery into an immutable receiving event plus one
//! fresh inventory lot.

use std::sync::Arc;

use chrono::Utc;
use metrics::{counter, histogram};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::access::AccessContext;
use crate::entities::{inventory_lot, item, location, receiving_event, store_item_setting};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::ledger;

#[derive(Clone)]
pub struct ReceivingService {
    db: Arc<DatabaseConnection>,
    event_sender: Option<EventSender>,
}

impl ReceivingService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Option<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Books a delivery into the caller's store.
    ///
    /// Always creates a new lot so the delivery's expiration is tracked
    /// independently from older stock; receiving never merges lots.
    #[instrument(skip(self))]
    pub async fn receive_stock(
        &self,
        ctx: &AccessContext,
        item_id: i64,
        quantity: f64,
        unit_cost: Option<Decimal>,
    ) -> Result<inventory_lot::Model, ServiceError> {
        if quantity <= 0.0 {
            return Err(ServiceError::InvalidInput(format!(
                "received quantity must be positive, got {}",
                quantity
            )));
        }

        let store_id = ctx.store_id;
        let db = &*self.db;
        let txn = db.begin().await.map_err(ServiceError::db_error)?;

        let item = item::Entity::find_by_id(item_id)
            .one(&txn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Item {} not found", item_id)))?;

        let destination = resolve_destination(&txn, store_id, item_id).await?;

        let now = Utc::now();
        let transaction_id = Uuid::new_v4();

        receiving_event::ActiveModel {
            transaction_id: Set(transaction_id),
            store_id: Set(store_id),
            item_id: Set(item_id),
            quantity: Set(quantity),
            unit_cost: Set(unit_cost),
            received_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(ServiceError::db_error)?;

        let lot = ledger::add_lot(
            &txn,
            store_id,
            item_id,
            destination.location_id,
            quantity,
            item.expiration_from(now),
        )
        .await?;

        txn.commit().await.map_err(ServiceError::db_error)?;

        counter!("larder.receiving.deliveries", 1);
        histogram!("larder.receiving.quantity", quantity);

        if let Some(sender) = &self.event_sender {
            sender
                .send_or_log(Event::StockReceived {
                    transaction_id,
                    store_id,
                    item_id,
                    lot_id: lot.lot_id,
                    quantity,
                })
                .await;
        }

        info!(
            "Received {} {} of item {} into location {}",
            quantity, item.base_unit, item_id, destination.location_id
        );

        Ok(lot)
    }
}

/// Picks where received stock lands: the store's configured default location
/// for the item, else the first back-of-house location, else any location,
/// else a bootstrapped "Back of House".
pub(crate) async fn resolve_destination<C: ConnectionTrait>(
    conn: &C,
    store_id: i64,
    item_id: i64,
) -> Result<location::Model, ServiceError> {
    let setting = store_item_setting::Entity::find()
        .filter(store_item_setting::Column::StoreId.eq(store_id))
        .filter(store_item_setting::Column::ItemId.eq(item_id))
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?;

    if let Some(default_location_id) = setting.and_then(|s| s.default_location_id) {
        if let Some(loc) = location::Entity::find_by_id(default_location_id)
            .one(conn)
            .await
            .map_err(ServiceError::db_error)?
        {
            return Ok(loc);
        }
    }

    let back_of_house = location::Entity::find()
        .filter(location::Column::StoreId.eq(store_id))
        .filter(location::Column::IsSalesFloor.eq(false))
        .order_by_asc(location::Column::LocationId)
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?;
    if let Some(loc) = back_of_house {
        return Ok(loc);
    }

    let any = location::Entity::find()
        .filter(location::Column::StoreId.eq(store_id))
        .order_by_asc(location::Column::LocationId)
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?;
    if let Some(loc) = any {
        return Ok(loc);
    }

    location::ActiveModel {
        store_id: Set(store_id),
        name: Set("Back of House".to_string()),
        is_sales_floor: Set(false),
        ..Default::default()
    }
    .insert(conn)
    .await
    .map_err(ServiceError::db_error)
}
