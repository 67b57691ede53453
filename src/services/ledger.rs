//! Batch-level inventory primitives.
//!
//! Every function is generic over [`ConnectionTrait`] so callers can compose
//! them inside their own transaction; nothing here begins or commits one.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::NullOrdering;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait,
    Order, QueryFilter, QueryOrder, QuerySelect, Select,
};

use crate::entities::inventory_lot;
use crate::errors::ServiceError;

/// Quantities within this tolerance of zero are treated as zero; a lot
/// drained to it is deleted rather than kept as float dust.
pub const QUANTITY_EPSILON: f64 = 1e-9;

/// On-hand total for an item across every location of a store.
pub async fn total_quantity<C: ConnectionTrait>(
    conn: &C,
    store_id: i64,
    item_id: i64,
) -> Result<f64, ServiceError> {
    let lots = inventory_lot::Entity::find()
        .filter(inventory_lot::Column::StoreId.eq(store_id))
        .filter(inventory_lot::Column::ItemId.eq(item_id))
        .all(conn)
        .await
        .map_err(ServiceError::db_error)?;

    Ok(lots.iter().map(|lot| lot.quantity).sum())
}

/// On-hand total for an item at one location.
pub async fn total_quantity_at_location<C: ConnectionTrait>(
    conn: &C,
    store_id: i64,
    item_id: i64,
    location_id: i64,
) -> Result<f64, ServiceError> {
    let lots = lots_for_consumption(conn, store_id, item_id, Some(location_id)).await?;
    Ok(lots.iter().map(|lot| lot.quantity).sum())
}

fn consumption_query(store_id: i64, item_id: i64, location_id: Option<i64>) -> Select<inventory_lot::Entity> {
    let mut query = inventory_lot::Entity::find()
        .filter(inventory_lot::Column::StoreId.eq(store_id))
        .filter(inventory_lot::Column::ItemId.eq(item_id));

    if let Some(location_id) = location_id {
        query = query.filter(inventory_lot::Column::LocationId.eq(location_id));
    }

    // Soonest-to-expire first; never-expiring lots are consumed last.
    query
        .order_by_with_nulls(
            inventory_lot::Column::ExpirationDate,
            Order::Asc,
            NullOrdering::Last,
        )
        .order_by_asc(inventory_lot::Column::LotId)
}

/// Lots ordered for FIFO consumption: ascending expiration, null expirations
/// last.
pub async fn lots_for_consumption<C: ConnectionTrait>(
    conn: &C,
    store_id: i64,
    item_id: i64,
    location_id: Option<i64>,
) -> Result<Vec<inventory_lot::Model>, ServiceError> {
    consumption_query(store_id, item_id, location_id)
        .all(conn)
        .await
        .map_err(ServiceError::db_error)
}

/// Same ordering, but takes a row-level write lock so two concurrent
/// consumers cannot both observe sufficient stock and double-spend a lot.
pub async fn lots_for_consumption_locked<C: ConnectionTrait>(
    conn: &C,
    store_id: i64,
    item_id: i64,
    location_id: Option<i64>,
) -> Result<Vec<inventory_lot::Model>, ServiceError> {
    consumption_query(store_id, item_id, location_id)
        .lock_exclusive()
        .all(conn)
        .await
        .map_err(ServiceError::db_error)
}

/// Creates a new lot. Receiving and production always add fresh lots instead
/// of merging into existing ones, so each delivery's expiration is tracked
/// independently.
pub async fn add_lot<C: ConnectionTrait>(
    conn: &C,
    store_id: i64,
    item_id: i64,
    location_id: i64,
    quantity: f64,
    expiration_date: Option<DateTime<Utc>>,
) -> Result<inventory_lot::Model, ServiceError> {
    let lot = inventory_lot::ActiveModel {
        store_id: Set(store_id),
        item_id: Set(item_id),
        location_id: Set(location_id),
        quantity: Set(quantity),
        expiration_date: Set(expiration_date),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    lot.insert(conn).await.map_err(ServiceError::db_error)
}

/// Removes `amount` from a lot, deleting the row once it is drained.
pub async fn deduct_from_lot<C: ConnectionTrait>(
    conn: &C,
    lot: &inventory_lot::Model,
    amount: f64,
) -> Result<(), ServiceError> {
    if amount > lot.quantity + QUANTITY_EPSILON {
        return Err(ServiceError::InvalidOperation(format!(
            "cannot deduct {} from lot {} holding {}",
            amount, lot.lot_id, lot.quantity
        )));
    }

    let remaining = lot.quantity - amount;
    if remaining <= QUANTITY_EPSILON {
        lot.clone()
            .delete(conn)
            .await
            .map_err(ServiceError::db_error)?;
    } else {
        let mut active: inventory_lot::ActiveModel = lot.clone().into();
        active.quantity = Set(remaining);
        active.update(conn).await.map_err(ServiceError::db_error)?;
    }

    Ok(())
}

/// Rewrites the lots at one location so they sum to `target_quantity`.
///
/// Keeps never-expiring lots first, then the newest-expiring stock; older
/// lots are trimmed or deleted once the target is satisfied. Any shortfall
/// becomes one new lot with `fresh_expiration`.
pub async fn replace_lots_to_match<C: ConnectionTrait>(
    conn: &C,
    store_id: i64,
    item_id: i64,
    location_id: i64,
    target_quantity: f64,
    fresh_expiration: Option<DateTime<Utc>>,
) -> Result<(), ServiceError> {
    let lots = inventory_lot::Entity::find()
        .filter(inventory_lot::Column::StoreId.eq(store_id))
        .filter(inventory_lot::Column::ItemId.eq(item_id))
        .filter(inventory_lot::Column::LocationId.eq(location_id))
        .order_by_with_nulls(
            inventory_lot::Column::ExpirationDate,
            Order::Desc,
            NullOrdering::First,
        )
        .order_by_desc(inventory_lot::Column::LotId)
        .all(conn)
        .await
        .map_err(ServiceError::db_error)?;

    let mut remaining = target_quantity;
    for lot in lots {
        if remaining <= QUANTITY_EPSILON {
            // Target already filled by newer stock; this lot is phantom.
            lot.delete(conn).await.map_err(ServiceError::db_error)?;
        } else if lot.quantity <= remaining + QUANTITY_EPSILON {
            remaining -= lot.quantity;
        } else {
            let mut active: inventory_lot::ActiveModel = lot.into();
            active.quantity = Set(remaining);
            active.update(conn).await.map_err(ServiceError::db_error)?;
            remaining = 0.0;
        }
    }

    if remaining > QUANTITY_EPSILON {
        add_lot(
            conn,
            store_id,
            item_id,
            location_id,
            remaining,
            fresh_expiration,
        )
        .await?;
    }

    Ok(())
}
