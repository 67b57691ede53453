use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::warn;
use uuid::Uuid;

/// Events emitted by the engine after a successful commit. Consumers
/// (webhooks, notification fan-out, analytics) subscribe on the channel;
/// the engine never waits on them inside a transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    StockReceived {
        transaction_id: Uuid,
        store_id: i64,
        item_id: i64,
        lot_id: i64,
        quantity: f64,
    },
    ProductionCompleted {
        transaction_id: Uuid,
        store_id: i64,
        recipe_id: i64,
        batches: f64,
        output_lot_id: Option<i64>,
    },
    ForcedDeficitIncurred {
        transaction_id: Uuid,
        store_id: i64,
        item_id: i64,
        shortfall: f64,
    },
    StocktakeSessionStarted {
        session_id: i64,
        store_id: i64,
    },
    StocktakeFinalized {
        session_id: i64,
        store_id: i64,
        item_count: usize,
    },
    StocktakeCancelled {
        session_id: i64,
        store_id: i64,
    },
    ExpiredLotDisposed {
        store_id: i64,
        item_id: i64,
        lot_id: i64,
        quantity: f64,
    },
    /// Escape hatch for consumers that need to inject ad-hoc events onto the
    /// same channel.
    Generic {
        message: String,
        metadata: serde_json::Value,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging instead of failing when the channel is gone.
    /// Used after commit, where the mutation must not be reported as failed
    /// because a consumer went away.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("Event channel unavailable: {}", e);
        }
    }
}
