//! Larder API Library
//!
//! This crate provides the inventory ledger and reconciliation engine for
//! multi-store food production: expiring stock batches, recipe-driven
//! consumption, receiving, and stocktake variance reporting.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod access;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod migrator;
pub mod services;

use std::sync::Arc;

use anyhow::Context;
use sea_orm::DatabaseConnection;

use crate::events::EventSender;
use crate::services::{
    expiration::ExpirationService, production::ProductionService, receiving::ReceivingService,
    stocktake::StocktakeService,
};

/// Engine facade wiring every service to one database pool and event channel.
///
/// The surrounding service layer (HTTP handlers, schedulers) constructs one
/// of these per process and calls the services directly.
#[derive(Clone)]
pub struct Engine {
    pub db: Arc<DatabaseConnection>,
    pub receiving: ReceivingService,
    pub production: ProductionService,
    pub stocktake: StocktakeService,
    pub expiration: ExpirationService,
}

impl Engine {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Option<EventSender>) -> Self {
        Self {
            receiving: ReceivingService::new(db.clone(), event_sender.clone()),
            production: ProductionService::new(db.clone(), event_sender.clone()),
            stocktake: StocktakeService::new(db.clone(), event_sender.clone()),
            expiration: ExpirationService::new(db.clone(), event_sender),
            db,
        }
    }

    /// Process-edge bootstrap: load configuration, install telemetry,
    /// connect, and migrate.
    pub async fn from_env() -> anyhow::Result<Self> {
        let cfg = config::load_config().context("loading configuration")?;
        config::init_telemetry(&cfg);
        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .context("connecting to database")?;
        db::run_migrations(&pool).await.context("running migrations")?;
        Ok(Self::new(Arc::new(pool), None))
    }
}
