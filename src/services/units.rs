//! Unit resolution for catalog items: named-unit factors, preferred display
//! units, and the recipe batch calculator.
//!
//! Quantities entered in an unrecognized unit fall back to "already in base
//! units". That fallback is a known correctness risk, so it is a distinct
//! variant (`UnitFactor::AssumedBase`, `BatchBasis::UnscaledFallback`) rather
//! than a silent factor of 1.0, and every hit is logged and counted.

use metrics::counter;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use serde::Serialize;
use tracing::warn;

use crate::entities::{item, recipe, unit_conversion};
use crate::errors::ServiceError;

/// Smallest value still readable when picking a display unit.
const MIN_DISPLAY_VALUE: f64 = 0.25;

/// Outcome of resolving a named unit against an item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnitFactor {
    /// Base unit itself, or a configured conversion.
    Resolved(f64),
    /// No conversion configured; the quantity is assumed to already be in
    /// base units.
    AssumedBase,
}

impl UnitFactor {
    pub fn factor(&self) -> f64 {
        match self {
            UnitFactor::Resolved(f) => *f,
            UnitFactor::AssumedBase => 1.0,
        }
    }

    pub fn is_assumed(&self) -> bool {
        matches!(self, UnitFactor::AssumedBase)
    }
}

/// Resolves `unit_name` to a multiplicative factor against `item`'s base
/// unit.
pub async fn resolve_factor<C: ConnectionTrait>(
    conn: &C,
    item: &item::Model,
    unit_name: &str,
) -> Result<UnitFactor, ServiceError> {
    if unit_name == item.base_unit {
        return Ok(UnitFactor::Resolved(1.0));
    }

    let conversion = unit_conversion::Entity::find()
        .filter(unit_conversion::Column::ItemId.eq(item.item_id))
        .filter(unit_conversion::Column::UnitName.eq(unit_name))
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?;

    match conversion {
        Some(c) => Ok(UnitFactor::Resolved(c.factor)),
        None => {
            warn!(
                item_id = item.item_id,
                unit = unit_name,
                "no conversion for unit; assuming quantity is already in base units"
            );
            counter!("larder.units.assumed_base", 1);
            Ok(UnitFactor::AssumedBase)
        }
    }
}

/// A base-unit quantity re-expressed in the item's preferred display unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayQuantity {
    pub quantity: f64,
    pub unit: String,
}

/// Re-expresses `base_quantity` in the item's preferred display unit: the
/// default-display conversion if one is flagged, else the largest unit that
/// still shows a readable value, else the raw base unit.
pub async fn display_quantity<C: ConnectionTrait>(
    conn: &C,
    item: &item::Model,
    base_quantity: f64,
) -> Result<DisplayQuantity, ServiceError> {
    let conversions = unit_conversion::Entity::find()
        .filter(unit_conversion::Column::ItemId.eq(item.item_id))
        .all(conn)
        .await
        .map_err(ServiceError::db_error)?;

    Ok(select_display_unit(item, &conversions, base_quantity))
}

fn select_display_unit(
    item: &item::Model,
    conversions: &[unit_conversion::Model],
    base_quantity: f64,
) -> DisplayQuantity {
    if let Some(default) = conversions
        .iter()
        .find(|c| c.is_default_display && c.factor > 0.0)
    {
        return DisplayQuantity {
            quantity: base_quantity / default.factor,
            unit: default.unit_name.clone(),
        };
    }

    let mut candidates: Vec<&unit_conversion::Model> =
        conversions.iter().filter(|c| c.factor > 0.0).collect();
    candidates.sort_by(|a, b| {
        b.factor
            .partial_cmp(&a.factor)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    for conversion in candidates {
        let value = base_quantity / conversion.factor;
        if value >= MIN_DISPLAY_VALUE {
            return DisplayQuantity {
                quantity: value,
                unit: conversion.unit_name.clone(),
            };
        }
    }

    DisplayQuantity {
        quantity: base_quantity,
        unit: item.base_unit.clone(),
    }
}

/// How a production event's quantity was translated into batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BatchBasis {
    /// The operator logged batches directly.
    CountedBatches,
    /// Quantity was in the recipe's yield unit.
    YieldUnit,
    /// Quantity converted to base units through a configured conversion.
    Converted,
    /// No conversion configured; divided by yield quantity without scaling.
    UnscaledFallback,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchComputation {
    pub batches: f64,
    pub basis: BatchBasis,
}

/// Turns a logged production quantity into a batch count for `recipe`.
pub async fn batches_for<C: ConnectionTrait>(
    conn: &C,
    recipe: &recipe::Model,
    produced_item: &item::Model,
    quantity_made: f64,
    unit_type: &str,
) -> Result<BatchComputation, ServiceError> {
    let yield_unit = match recipe.yield_unit_id {
        Some(id) => unit_conversion::Entity::find_by_id(id)
            .one(conn)
            .await
            .map_err(ServiceError::db_error)?,
        None => None,
    };

    let event_conversion = unit_conversion::Entity::find()
        .filter(unit_conversion::Column::ItemId.eq(produced_item.item_id))
        .filter(unit_conversion::Column::UnitName.eq(unit_type))
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?;

    compute_batches(
        recipe,
        yield_unit.as_ref(),
        event_conversion.as_ref(),
        &produced_item.base_unit,
        quantity_made,
        unit_type,
    )
}

/// Yield of one batch in the produced item's base units.
pub fn yield_in_base(recipe: &recipe::Model, yield_unit: Option<&unit_conversion::Model>) -> f64 {
    match yield_unit {
        Some(unit) => recipe.yield_quantity * unit.factor,
        None => recipe.yield_quantity,
    }
}

/// Loads the recipe's yield unit and returns the per-batch yield in base
/// units.
pub async fn yield_in_base_units<C: ConnectionTrait>(
    conn: &C,
    recipe: &recipe::Model,
) -> Result<f64, ServiceError> {
    let yield_unit = match recipe.yield_unit_id {
        Some(id) => unit_conversion::Entity::find_by_id(id)
            .one(conn)
            .await
            .map_err(ServiceError::db_error)?,
        None => None,
    };
    Ok(yield_in_base(recipe, yield_unit.as_ref()))
}

fn compute_batches(
    recipe: &recipe::Model,
    yield_unit: Option<&unit_conversion::Model>,
    event_conversion: Option<&unit_conversion::Model>,
    base_unit: &str,
    quantity_made: f64,
    unit_type: &str,
) -> Result<BatchComputation, ServiceError> {
    if recipe.yield_quantity <= 0.0 {
        return Err(ServiceError::ValidationError(format!(
            "recipe {} has non-positive yield quantity",
            recipe.recipe_id
        )));
    }

    if unit_type.eq_ignore_ascii_case("batch") || unit_type.eq_ignore_ascii_case("batches") {
        return Ok(BatchComputation {
            batches: quantity_made,
            basis: BatchBasis::CountedBatches,
        });
    }

    let yield_unit_name = yield_unit.map(|u| u.unit_name.as_str()).unwrap_or(base_unit);
    if unit_type == yield_unit_name {
        return Ok(BatchComputation {
            batches: quantity_made / recipe.yield_quantity,
            basis: BatchBasis::YieldUnit,
        });
    }

    if let Some(conversion) = event_conversion {
        let quantity_in_base = quantity_made * conversion.factor;
        let yield_base = yield_in_base(recipe, yield_unit);
        if yield_base <= 0.0 {
            return Err(ServiceError::ValidationError(format!(
                "recipe {} yields zero base units per batch",
                recipe.recipe_id
            )));
        }
        return Ok(BatchComputation {
            batches: quantity_in_base / yield_base,
            basis: BatchBasis::Converted,
        });
    }

    warn!(
        recipe_id = recipe.recipe_id,
        unit = unit_type,
        "no conversion for production unit; dividing by yield quantity unscaled"
    );
    counter!("larder.units.unscaled_fallback", 1);
    Ok(BatchComputation {
        batches: quantity_made / recipe.yield_quantity,
        basis: BatchBasis::UnscaledFallback,
    })
}
