//! Expired-stock handling: surfacing lots that are about to expire and
//! disposing of the ones already pulled from the shelf.

use std::sync::Arc;

use chrono::{Duration, Utc};
use metrics::counter;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, TransactionTrait,
};
use tracing::{info, instrument};

use crate::access::AccessContext;
use crate::entities::{expired_item_log, inventory_lot};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

#[derive(Clone)]
pub struct ExpirationService {
    db: Arc<DatabaseConnection>,
    event_sender: Option<EventSender>,
}

impl ExpirationService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Option<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Lots in the caller's store expiring within `within_days`, soonest
    /// first. Already-expired lots are included.
    #[instrument(skip(self))]
    pub async fn expiring_lots(
        &self,
        ctx: &AccessContext,
        within_days: i64,
    ) -> Result<Vec<inventory_lot::Model>, ServiceError> {
        let cutoff = Utc::now() + Duration::days(within_days);

        inventory_lot::Entity::find()
            .filter(inventory_lot::Column::StoreId.eq(ctx.store_id))
            .filter(inventory_lot::Column::ExpirationDate.is_not_null())
            .filter(inventory_lot::Column::ExpirationDate.lte(cutoff))
            .order_by_asc(inventory_lot::Column::ExpirationDate)
            .all(&*self.db)
            .await
            .map_err(ServiceError::db_error)
    }

    /// Deletes a lot and writes the immutable disposal audit row.
    #[instrument(skip(self))]
    pub async fn dispose_expired_lot(
        &self,
        ctx: &AccessContext,
        lot_id: i64,
        notes: Option<String>,
    ) -> Result<expired_item_log::Model, ServiceError> {
        ctx.ensure_manager()?;

        let db = &*self.db;
        let txn = db.begin().await.map_err(ServiceError::db_error)?;

        let lot = inventory_lot::Entity::find_by_id(lot_id)
            .one(&txn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Lot {} not found", lot_id)))?;
        ctx.ensure_store(lot.store_id)?;

        let log = expired_item_log::ActiveModel {
            store_id: Set(lot.store_id),
            item_id: Set(lot.item_id),
            location_id: Set(lot.location_id),
            quantity: Set(lot.quantity),
            expiration_date: Set(lot.expiration_date),
            notes: Set(notes),
            disposed_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(ServiceError::db_error)?;

        let disposed = lot.clone();
        lot.delete(&txn).await.map_err(ServiceError::db_error)?;

        txn.commit().await.map_err(ServiceError::db_error)?;

        counter!("larder.expiration.disposals", 1);
        if let Some(sender) = &self.event_sender {
            sender
                .send_or_log(Event::ExpiredLotDisposed {
                    store_id: disposed.store_id,
                    item_id: disposed.item_id,
                    lot_id: disposed.lot_id,
                    quantity: disposed.quantity,
                })
                .await;
        }

        info!(
            "Disposed lot {} ({} of item {})",
            disposed.lot_id, disposed.quantity, disposed.item_id
        );

        Ok(log)
    }
}
