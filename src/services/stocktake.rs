//! Stocktake: physical counts reconciled against the ledger.
//!
//! FULL sessions correct the ledger to the count and report usage and
//! variance; ADDITION sessions interpret each count as newly delivered
//! stock, so operators can log receiving without a formal receiving event.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use metrics::counter;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::access::AccessContext;
use crate::entities::stocktake_session::{SessionStatus, SessionType};
use crate::entities::{
    item, location, production_event, receiving_event, recipe, recipe_ingredient,
    stocktake_record, stocktake_session, variance_log,
};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::ledger::{self, QUANTITY_EPSILON};
use crate::services::units;

/// One line of a finalized session's report.
#[derive(Debug, Clone, Serialize)]
pub struct StocktakeReportRow {
    pub item_id: i64,
    pub item_name: String,
    pub start_quantity: f64,
    /// Ledger total before reconciliation (the expected quantity).
    pub system_quantity: f64,
    pub received_quantity: f64,
    pub end_quantity: f64,
    pub actual_usage: f64,
    pub theoretical_usage: f64,
    pub variance: f64,
    pub unit: String,
}

/// Raw row from a bulk count submission, before validation.
#[derive(Debug, Clone)]
pub struct RawCountRow {
    pub item_id: Option<i64>,
    pub location_id: Option<i64>,
    pub quantity: String,
    pub unit_name: Option<String>,
}

/// Per-row outcome of a bulk submission. Malformed rows are skipped, never
/// aborting the batch.
#[derive(Debug, Clone, Serialize)]
pub enum CountRowOutcome {
    Recorded {
        record_id: i64,
        item_id: i64,
        location_id: i64,
        quantity_counted: f64,
    },
    Skipped {
        reason: String,
    },
}

#[derive(Clone)]
pub struct StocktakeService {
    db: Arc<DatabaseConnection>,
    event_sender: Option<EventSender>,
}

impl StocktakeService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Option<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Starts a session for the caller's store, reusing an existing PENDING
    /// session instead of creating a duplicate.
    #[instrument(skip(self))]
    pub async fn start_session(
        &self,
        ctx: &AccessContext,
        session_type: SessionType,
    ) -> Result<stocktake_session::Model, ServiceError> {
        let db = &*self.db;
        let store_id = ctx.store_id;

        let existing = stocktake_session::Entity::find()
            .filter(stocktake_session::Column::StoreId.eq(store_id))
            .filter(stocktake_session::Column::Status.eq(SessionStatus::Pending.as_ref()))
            .one(db)
            .await
            .map_err(ServiceError::db_error)?;

        if let Some(session) = existing {
            if session.session_type != session_type.as_ref() {
                warn!(
                    session_id = session.session_id,
                    requested = %session_type,
                    open = %session.session_type,
                    "reusing open session of a different type"
                );
            }
            return Ok(session);
        }

        let session = stocktake_session::ActiveModel {
            store_id: Set(store_id),
            status: Set(SessionStatus::Pending.to_string()),
            session_type: Set(session_type.to_string()),
            started_at: Set(Utc::now()),
            completed_at: Set(None),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(ServiceError::db_error)?;

        counter!("larder.stocktake.sessions_started", 1);
        if let Some(sender) = &self.event_sender {
            sender
                .send_or_log(Event::StocktakeSessionStarted {
                    session_id: session.session_id,
                    store_id,
                })
                .await;
        }

        Ok(session)
    }

    /// Records one counted (item, location) pair. Idempotent: re-submitting
    /// the pair overwrites the earlier count.
    #[instrument(skip(self))]
    pub async fn record_count(
        &self,
        ctx: &AccessContext,
        session_id: i64,
        item_id: i64,
        location_id: i64,
        quantity_counted: f64,
        unit_name: Option<&str>,
    ) -> Result<stocktake_record::Model, ServiceError> {
        if quantity_counted < 0.0 {
            return Err(ServiceError::InvalidInput(format!(
                "counted quantity cannot be negative, got {}",
                quantity_counted
            )));
        }

        let db = &*self.db;
        let session = load_session(db, session_id).await?;
        ctx.ensure_store(session.store_id)?;
        if !session.is_pending() {
            return Err(ServiceError::InvalidOperation(format!(
                "session {} is {}, counts are frozen",
                session_id, session.status
            )));
        }

        let item = item::Entity::find_by_id(item_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Item {} not found", item_id)))?;

        let counted_location = location::Entity::find_by_id(location_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Location {} not found", location_id)))?;
        if counted_location.store_id != session.store_id {
            return Err(ServiceError::ValidationError(format!(
                "location {} belongs to another store",
                location_id
            )));
        }

        let base_quantity = match unit_name {
            Some(unit) => {
                let factor = units::resolve_factor(db, &item, unit).await?;
                quantity_counted * factor.factor()
            }
            None => quantity_counted,
        };

        let existing = stocktake_record::Entity::find()
            .filter(stocktake_record::Column::SessionId.eq(session_id))
            .filter(stocktake_record::Column::ItemId.eq(item_id))
            .filter(stocktake_record::Column::LocationId.eq(location_id))
            .one(db)
            .await
            .map_err(ServiceError::db_error)?;

        let record = match existing {
            Some(record) => {
                let mut active: stocktake_record::ActiveModel = record.into();
                active.quantity_counted = Set(base_quantity);
                active.update(db).await.map_err(ServiceError::db_error)?
            }
            None => {
                stocktake_record::ActiveModel {
                    session_id: Set(session_id),
                    item_id: Set(item_id),
                    location_id: Set(location_id),
                    quantity_counted: Set(base_quantity),
                    ..Default::default()
                }
                .insert(db)
                .await
                .map_err(ServiceError::db_error)?
            }
        };

        Ok(record)
    }

    /// Bulk count submission with the lenient per-row policy: rows missing
    /// ids or carrying an unparseable quantity are skipped individually and
    /// reported back; only database failures abort the batch.
    #[instrument(skip(self, rows))]
    pub async fn submit_counts(
        &self,
        ctx: &AccessContext,
        session_id: i64,
        rows: Vec<RawCountRow>,
    ) -> Result<Vec<CountRowOutcome>, ServiceError> {
        let mut outcomes = Vec::with_capacity(rows.len());

        for row in rows {
            let (item_id, location_id) = match (row.item_id, row.location_id) {
                (Some(item_id), Some(location_id)) => (item_id, location_id),
                _ => {
                    outcomes.push(CountRowOutcome::Skipped {
                        reason: "missing item or location id".to_string(),
                    });
                    continue;
                }
            };

            let quantity: f64 = match row.quantity.trim().parse() {
                Ok(q) => q,
                Err(_) => {
                    outcomes.push(CountRowOutcome::Skipped {
                        reason: format!("unparseable quantity '{}'", row.quantity),
                    });
                    continue;
                }
            };

            match self
                .record_count(
                    ctx,
                    session_id,
                    item_id,
                    location_id,
                    quantity,
                    row.unit_name.as_deref(),
                )
                .await
            {
                Ok(record) => outcomes.push(CountRowOutcome::Recorded {
                    record_id: record.record_id,
                    item_id: record.item_id,
                    location_id: record.location_id,
                    quantity_counted: record.quantity_counted,
                }),
                Err(err @ ServiceError::DatabaseError(_)) => return Err(err),
                Err(other) => outcomes.push(CountRowOutcome::Skipped {
                    reason: other.to_string(),
                }),
            }
        }

        Ok(outcomes)
    }

    /// Finalizes a session: computes the report, rewrites the ledger for
    /// every counted (item, location), and marks the session COMPLETED, all
    /// in one transaction. Returns `None` when the session was already
    /// completed (idempotent no-op).
    #[instrument(skip(self))]
    pub async fn finalize(
        &self,
        ctx: &AccessContext,
        session_id: i64,
    ) -> Result<Option<Vec<StocktakeReportRow>>, ServiceError> {
        ctx.ensure_manager()?;

        let db = &*self.db;
        let txn = db.begin().await.map_err(ServiceError::db_error)?;

        let session = load_session(&txn, session_id).await?;
        ctx.ensure_store(session.store_id)?;
        if session.is_completed() {
            return Ok(None);
        }
        if !session.is_pending() {
            return Err(ServiceError::InvalidOperation(format!(
                "session {} is {}, it cannot be finalized",
                session_id, session.status
            )));
        }

        let store_id = session.store_id;
        let addition = session.is_addition();
        let now = Utc::now();

        let records = stocktake_record::Entity::find()
            .filter(stocktake_record::Column::SessionId.eq(session_id))
            .order_by_asc(stocktake_record::Column::RecordId)
            .all(&txn)
            .await
            .map_err(ServiceError::db_error)?;

        // Usage window runs from the previous completed session to this
        // session's start.
        let last_session = stocktake_session::Entity::find()
            .filter(stocktake_session::Column::StoreId.eq(store_id))
            .filter(stocktake_session::Column::Status.eq(SessionStatus::Completed.as_ref()))
            .filter(stocktake_session::Column::CompletedAt.lt(session.started_at))
            .order_by_desc(stocktake_session::Column::CompletedAt)
            .one(&txn)
            .await
            .map_err(ServiceError::db_error)?;
        let window_start = last_session.as_ref().and_then(|s| s.completed_at);

        let mut counted_items: Vec<i64> = records.iter().map(|r| r.item_id).collect();
        counted_items.sort_unstable();
        counted_items.dedup();

        let mut report = Vec::with_capacity(counted_items.len());
        for item_id in counted_items {
            let item = item::Entity::find_by_id(item_id)
                .one(&txn)
                .await
                .map_err(ServiceError::db_error)?
                .ok_or_else(|| ServiceError::NotFound(format!("Item {} not found", item_id)))?;

            let item_records: Vec<&stocktake_record::Model> =
                records.iter().filter(|r| r.item_id == item_id).collect();
            let total_counted: f64 = item_records.iter().map(|r| r.quantity_counted).sum();
            let system_quantity = ledger::total_quantity(&txn, store_id, item_id).await?;

            let row = if addition {
                StocktakeReportRow {
                    item_id,
                    item_name: item.name.clone(),
                    start_quantity: system_quantity,
                    system_quantity,
                    received_quantity: total_counted,
                    end_quantity: system_quantity + total_counted,
                    actual_usage: 0.0,
                    theoretical_usage: 0.0,
                    variance: 0.0,
                    unit: item.base_unit.clone(),
                }
            } else {
                let start_quantity = match &last_session {
                    Some(last) => {
                        let last_records = stocktake_record::Entity::find()
                            .filter(stocktake_record::Column::SessionId.eq(last.session_id))
                            .filter(stocktake_record::Column::ItemId.eq(item_id))
                            .all(&txn)
                            .await
                            .map_err(ServiceError::db_error)?;
                        last_records.iter().map(|r| r.quantity_counted).sum()
                    }
                    None => 0.0,
                };

                let mut received_query = receiving_event::Entity::find()
                    .filter(receiving_event::Column::StoreId.eq(store_id))
                    .filter(receiving_event::Column::ItemId.eq(item_id))
                    .filter(receiving_event::Column::ReceivedAt.lte(session.started_at));
                if let Some(start) = window_start {
                    received_query =
                        received_query.filter(receiving_event::Column::ReceivedAt.gte(start));
                }
                let received_quantity: f64 = received_query
                    .all(&txn)
                    .await
                    .map_err(ServiceError::db_error)?
                    .iter()
                    .map(|r| r.quantity)
                    .sum();

                let theoretical_usage = theoretical_usage_for_item(
                    &txn,
                    store_id,
                    item_id,
                    window_start,
                    session.started_at,
                )
                .await?;

                StocktakeReportRow {
                    item_id,
                    item_name: item.name.clone(),
                    start_quantity,
                    system_quantity,
                    received_quantity,
                    end_quantity: total_counted,
                    actual_usage: start_quantity + received_quantity - total_counted,
                    theoretical_usage,
                    variance: total_counted - system_quantity,
                    unit: item.base_unit.clone(),
                }
            };
            report.push(row);

            for record in item_records {
                if addition {
                    // New stock: a fresh independent lot, existing lots untouched.
                    ledger::add_lot(
                        &txn,
                        store_id,
                        item_id,
                        record.location_id,
                        record.quantity_counted,
                        item.expiration_from(now),
                    )
                    .await?;
                } else {
                    let expected_here = ledger::total_quantity_at_location(
                        &txn,
                        store_id,
                        item_id,
                        record.location_id,
                    )
                    .await?;
                    let variance_here = record.quantity_counted - expected_here;
                    if variance_here.abs() > QUANTITY_EPSILON {
                        variance_log::ActiveModel {
                            store_id: Set(store_id),
                            item_id: Set(item_id),
                            location_id: Set(record.location_id),
                            expected_quantity: Set(expected_here),
                            actual_quantity: Set(record.quantity_counted),
                            variance: Set(variance_here),
                            recorded_at: Set(now),
                            ..Default::default()
                        }
                        .insert(&txn)
                        .await
                        .map_err(ServiceError::db_error)?;
                    }

                    ledger::replace_lots_to_match(
                        &txn,
                        store_id,
                        item_id,
                        record.location_id,
                        record.quantity_counted,
                        item.expiration_from(now),
                    )
                    .await?;
                }
            }
        }

        let mut active: stocktake_session::ActiveModel = session.into();
        active.status = Set(SessionStatus::Completed.to_string());
        active.completed_at = Set(Some(now));
        active.update(&txn).await.map_err(ServiceError::db_error)?;

        txn.commit().await.map_err(ServiceError::db_error)?;

        counter!("larder.stocktake.finalized", 1);
        if let Some(sender) = &self.event_sender {
            sender
                .send_or_log(Event::StocktakeFinalized {
                    session_id,
                    store_id,
                    item_count: report.len(),
                })
                .await;
        }

        info!(
            session_id,
            items = report.len(),
            addition,
            "stocktake session finalized"
        );

        Ok(Some(report))
    }

    /// Aborts a PENDING session. Terminal, with no ledger effect.
    #[instrument(skip(self))]
    pub async fn cancel(
        &self,
        ctx: &AccessContext,
        session_id: i64,
    ) -> Result<stocktake_session::Model, ServiceError> {
        ctx.ensure_manager()?;

        let db = &*self.db;
        let session = load_session(db, session_id).await?;
        ctx.ensure_store(session.store_id)?;
        if !session.is_pending() {
            return Err(ServiceError::InvalidOperation(format!(
                "session {} is {}, it cannot be cancelled",
                session_id, session.status
            )));
        }

        let store_id = session.store_id;
        let mut active: stocktake_session::ActiveModel = session.into();
        active.status = Set(SessionStatus::Cancelled.to_string());
        let cancelled = active.update(db).await.map_err(ServiceError::db_error)?;

        counter!("larder.stocktake.cancelled", 1);
        if let Some(sender) = &self.event_sender {
            sender
                .send_or_log(Event::StocktakeCancelled {
                    session_id,
                    store_id,
                })
                .await;
        }

        Ok(cancelled)
    }
}

async fn load_session<C: ConnectionTrait>(
    conn: &C,
    session_id: i64,
) -> Result<stocktake_session::Model, ServiceError> {
    stocktake_session::Entity::find_by_id(session_id)
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| ServiceError::NotFound(format!("Stocktake session {} not found", session_id)))
}

/// Expected consumption of `item_id` implied by the production log inside
/// the usage window: for every recipe listing the item as an ingredient,
/// each production event's batch count times the per-batch requirement.
async fn theoretical_usage_for_item<C: ConnectionTrait>(
    conn: &C,
    store_id: i64,
    item_id: i64,
    window_start: Option<DateTime<Utc>>,
    window_end: DateTime<Utc>,
) -> Result<f64, ServiceError> {
    let uses = recipe_ingredient::Entity::find()
        .filter(recipe_ingredient::Column::IngredientItemId.eq(item_id))
        .all(conn)
        .await
        .map_err(ServiceError::db_error)?;

    let mut total = 0.0;
    for ingredient in uses {
        let Some(used_in) = recipe::Entity::find_by_id(ingredient.recipe_id)
            .one(conn)
            .await
            .map_err(ServiceError::db_error)?
        else {
            continue;
        };
        let Some(produced_item) = item::Entity::find_by_id(used_in.item_id)
            .one(conn)
            .await
            .map_err(ServiceError::db_error)?
        else {
            continue;
        };

        let mut events_query = production_event::Entity::find()
            .filter(production_event::Column::StoreId.eq(store_id))
            .filter(production_event::Column::RecipeId.eq(used_in.recipe_id))
            .filter(production_event::Column::ProducedAt.lte(window_end));
        if let Some(start) = window_start {
            events_query = events_query.filter(production_event::Column::ProducedAt.gte(start));
        }

        for event in events_query
            .all(conn)
            .await
            .map_err(ServiceError::db_error)?
        {
            let computation = units::batches_for(
                conn,
                &used_in,
                &produced_item,
                event.quantity_made,
                &event.unit_type,
            )
            .await?;
            total += computation.batches * ingredient.quantity_required;
        }
    }

    Ok(total)
}
