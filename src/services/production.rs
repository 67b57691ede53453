//! Production: converts a logged production run into ingredient consumption
//! across expiring lots, plus an output lot for the finished item.
//!
//! The pipeline is CHECK, DEDUCT, PRODUCE inside a single transaction. The
//! availability check runs against the same row-locked lots the deduction
//! will drain, so a concurrent run cannot spend stock this run already
//! counted. The production event row is only written on the success path:
//! a shortfall leaves the ledger and the log untouched.

use std::sync::Arc;

use chrono::Utc;
use metrics::{counter, histogram};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    TransactionTrait,
};
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::access::AccessContext;
use crate::entities::{
    inventory_lot, item, location, production_event, recipe, recipe_ingredient,
};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::ledger::{self, QUANTITY_EPSILON};
use crate::services::units;

/// One ingredient the store cannot cover for the requested run.
#[derive(Debug, Clone, Serialize)]
pub struct ShortfallLine {
    pub item_id: i64,
    pub name: String,
    pub required: f64,
    pub available: f64,
    /// Base unit both quantities are expressed in.
    pub unit: String,
    pub display_required: f64,
    pub display_available: f64,
    pub display_unit: String,
}

/// Residual deficit left by a forced run that drained an ingredient's lots.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PartialDeduction {
    pub item_id: i64,
    pub shortfall: f64,
}

#[derive(Debug)]
pub enum ProductionOutcome {
    Completed {
        event: production_event::Model,
        output_lot: Option<inventory_lot::Model>,
        /// Non-empty only under `force`, when lots ran out mid-deduction.
        deficits: Vec<PartialDeduction>,
    },
    /// Recoverable: the caller may resubmit with `force`.
    InsufficientStock(Vec<ShortfallLine>),
}

#[derive(Clone)]
pub struct ProductionService {
    db: Arc<DatabaseConnection>,
    event_sender: Option<EventSender>,
}

impl ProductionService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Option<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Runs a production event for the caller's store.
    ///
    /// With `force`, the availability check is skipped and lots are drained
    /// as far as they go; any residual deficit is reported back rather than
    /// dropped.
    #[instrument(skip(self))]
    pub async fn log_production(
        &self,
        ctx: &AccessContext,
        recipe_id: i64,
        quantity_made: f64,
        unit_type: &str,
        target_location_id: Option<i64>,
        force: bool,
    ) -> Result<ProductionOutcome, ServiceError> {
        if quantity_made <= 0.0 {
            return Err(ServiceError::InvalidInput(format!(
                "quantity made must be positive, got {}",
                quantity_made
            )));
        }

        let store_id = ctx.store_id;
        let db = &*self.db;
        let txn = db.begin().await.map_err(ServiceError::db_error)?;

        let recipe = recipe::Entity::find_by_id(recipe_id)
            .one(&txn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Recipe {} not found", recipe_id)))?;

        let produced_item = item::Entity::find_by_id(recipe.item_id)
            .one(&txn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Item {} for recipe {} not found", recipe.item_id, recipe_id))
            })?;

        let computation =
            units::batches_for(&txn, &recipe, &produced_item, quantity_made, unit_type).await?;
        let batches = computation.batches;

        let ingredients = recipe_ingredient::Entity::find()
            .filter(recipe_ingredient::Column::RecipeId.eq(recipe_id))
            .all(&txn)
            .await
            .map_err(ServiceError::db_error)?;

        // CHECK: lock each ingredient's lots before trusting their totals.
        let mut shortfalls = Vec::new();
        let mut plans = Vec::with_capacity(ingredients.len());
        for ingredient in &ingredients {
            let required = ingredient.quantity_required * batches;
            let lots = ledger::lots_for_consumption_locked(
                &txn,
                store_id,
                ingredient.ingredient_item_id,
                None,
            )
            .await?;
            let available: f64 = lots.iter().map(|lot| lot.quantity).sum();

            if !force && available + QUANTITY_EPSILON < required {
                let ingredient_item = item::Entity::find_by_id(ingredient.ingredient_item_id)
                    .one(&txn)
                    .await
                    .map_err(ServiceError::db_error)?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!(
                            "Item {} not found",
                            ingredient.ingredient_item_id
                        ))
                    })?;
                let display_required =
                    units::display_quantity(&txn, &ingredient_item, required).await?;
                let display_available =
                    units::display_quantity(&txn, &ingredient_item, available).await?;
                shortfalls.push(ShortfallLine {
                    item_id: ingredient_item.item_id,
                    name: ingredient_item.name,
                    required,
                    available,
                    unit: ingredient_item.base_unit,
                    display_required: display_required.quantity,
                    display_available: display_available.quantity,
                    display_unit: display_required.unit,
                });
            }

            plans.push((ingredient.ingredient_item_id, required, lots));
        }

        if !shortfalls.is_empty() {
            txn.rollback().await.map_err(ServiceError::db_error)?;
            counter!("larder.production.shortfalls", 1);
            info!(
                recipe_id,
                missing = shortfalls.len(),
                "production blocked by insufficient ingredients"
            );
            return Ok(ProductionOutcome::InsufficientStock(shortfalls));
        }

        // DEDUCT: soonest-to-expire lots first.
        let mut deficits = Vec::new();
        for (ingredient_item_id, required, lots) in plans {
            let mut remaining = required;
            for lot in &lots {
                if remaining <= QUANTITY_EPSILON {
                    break;
                }
                let take = remaining.min(lot.quantity);
                ledger::deduct_from_lot(&txn, lot, take).await?;
                remaining -= take;
            }
            if remaining > QUANTITY_EPSILON {
                warn!(
                    item_id = ingredient_item_id,
                    shortfall = remaining,
                    "forced production drained all lots and left a deficit"
                );
                deficits.push(PartialDeduction {
                    item_id: ingredient_item_id,
                    shortfall: remaining,
                });
            }
        }

        // PRODUCE: no target location means consumption only (waste, rework).
        let now = Utc::now();
        let output_lot = match target_location_id {
            Some(location_id) => {
                let destination = location::Entity::find_by_id(location_id)
                    .one(&txn)
                    .await
                    .map_err(ServiceError::db_error)?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!("Location {} not found", location_id))
                    })?;
                if destination.store_id != store_id {
                    return Err(ServiceError::ValidationError(format!(
                        "location {} belongs to another store",
                        location_id
                    )));
                }

                let yield_base = units::yield_in_base_units(&txn, &recipe).await?;
                let output_quantity = batches * yield_base;
                Some(
                    ledger::add_lot(
                        &txn,
                        store_id,
                        recipe.item_id,
                        location_id,
                        output_quantity,
                        produced_item.expiration_from(now),
                    )
                    .await?,
                )
            }
            None => None,
        };

        let transaction_id = Uuid::new_v4();
        let event_row = production_event::ActiveModel {
            transaction_id: Set(transaction_id),
            store_id: Set(store_id),
            recipe_id: Set(recipe_id),
            quantity_made: Set(quantity_made),
            unit_type: Set(unit_type.to_string()),
            target_location_id: Set(target_location_id),
            produced_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(ServiceError::db_error)?;

        txn.commit().await.map_err(ServiceError::db_error)?;

        counter!("larder.production.runs", 1);
        histogram!("larder.production.batches", batches);
        if !deficits.is_empty() {
            counter!("larder.production.forced_deficits", deficits.len() as u64);
        }

        if let Some(sender) = &self.event_sender {
            sender
                .send_or_log(Event::ProductionCompleted {
                    transaction_id,
                    store_id,
                    recipe_id,
                    batches,
                    output_lot_id: output_lot.as_ref().map(|lot| lot.lot_id),
                })
                .await;
            for deficit in &deficits {
                sender
                    .send_or_log(Event::ForcedDeficitIncurred {
                        transaction_id,
                        store_id,
                        item_id: deficit.item_id,
                        shortfall: deficit.shortfall,
                    })
                    .await;
            }
        }

        info!(
            "Produced {} {} of recipe {} ({:.3} batches, basis {:?})",
            quantity_made, unit_type, recipe_id, batches, computation.basis
        );

        Ok(ProductionOutcome::Completed {
            event: event_row,
            output_lot,
            deficits,
        })
    }
}
