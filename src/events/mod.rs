use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

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
}

// Define the various events that can occur in the system. Events are
// emitted after the owning transaction has committed; a lost event never
// implies lost data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Catalog events
    ItemSubmitted(i64),
    ItemRetired(i64),

    // Ledger events
    StockAdjusted {
        item_id: i64,
        delta: i32,
        new_quantity: i32,
    },

    // Sale events
    SaleCompleted {
        sale_id: i64,
        reference: String,
    },

    // Purchase events
    PurchaseRecorded {
        purchase_id: i64,
    },

    // Supplier events
    SupplierRetired(i64),
}

// Function to process incoming events and log them. Runs as a background
// task for the lifetime of the server.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match event {
            Event::StockAdjusted {
                item_id,
                delta,
                new_quantity,
            } => {
                handle_stock_adjusted(item_id, delta, new_quantity).await;
            }
            Event::SaleCompleted { sale_id, reference } => {
                info!("Sale {} completed with reference {}", sale_id, reference);
            }
            Event::PurchaseRecorded { purchase_id } => {
                info!("Purchase {} recorded", purchase_id);
            }
            Event::ItemSubmitted(item_id) => {
                info!("Item {} submitted to the catalog", item_id);
            }
            Event::ItemRetired(item_id) => {
                info!("Item {} retired from the catalog", item_id);
            }
            Event::SupplierRetired(supplier_id) => {
                info!("Supplier {} retired", supplier_id);
            }
        }
    }

    warn!("Event processing loop has ended");
}

async fn handle_stock_adjusted(item_id: i64, delta: i32, new_quantity: i32) {
    info!(
        "Stock adjusted for item {}: delta={}, new_quantity={}",
        item_id, delta, new_quantity
    );

    if new_quantity == 0 {
        warn!("Item {} is now out of stock", item_id);
        // Could trigger a reorder or purchasing workflow here
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sender_delivers_events_in_order() {
        let (tx, mut rx) = mpsc::channel(8);
        let sender = EventSender::new(tx);

        sender
            .send(Event::ItemSubmitted(1))
            .await
            .expect("send failed");
        sender
            .send(Event::StockAdjusted {
                item_id: 1,
                delta: 5,
                new_quantity: 5,
            })
            .await
            .expect("send failed");

        assert!(matches!(rx.recv().await, Some(Event::ItemSubmitted(1))));
        assert!(matches!(
            rx.recv().await,
            Some(Event::StockAdjusted {
                item_id: 1,
                delta: 5,
                new_quantity: 5,
            })
        ));
    }

    #[tokio::test]
    async fn send_fails_when_receiver_is_gone() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);

        let result = sender.send(Event::ItemRetired(9)).await;
        assert!(result.is_err());
    }
}
