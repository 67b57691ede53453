pub mod expiration;
pub mod ledger;
pub mod production;
pub mod receiving;
pub mod stocktake;
pub mod units;
