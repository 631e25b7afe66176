use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::allocated_part::PartStatus;
use crate::models::facility_stock::DestinationKind;

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

    /// Sends an event after the write it describes has committed. A closed
    /// channel is logged and otherwise ignored.
    pub async fn publish(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!(error = %e, "event dropped");
        }
    }
}

/// Creates a bounded event channel.
pub fn channel(capacity: usize) -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (EventSender::new(tx), rx)
}

// Domain events emitted after successful writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Work order events
    WorkOrderCreated {
        company_id: Uuid,
        work_order_id: Uuid,
    },
    WorkOrderUpdated {
        company_id: Uuid,
        work_order_id: Uuid,
    },
    CallLogEscalated {
        company_id: Uuid,
        call_log_id: Uuid,
        work_order_id: Uuid,
    },

    // Part allocation events
    PartsAllocated {
        company_id: Uuid,
        work_order_id: Uuid,
        part_ids: Vec<Uuid>,
    },
    PartStatusChanged {
        company_id: Uuid,
        part_id: Uuid,
        old_status: PartStatus,
        new_status: PartStatus,
        actor_id: Uuid,
    },
    PartVerificationRequested {
        company_id: Uuid,
        part_id: Uuid,
        status: PartStatus,
        requested_by: Uuid,
    },
    PartVerified {
        company_id: Uuid,
        part_id: Uuid,
        status: PartStatus,
        verified_by: String,
    },
    PartQuantityChanged {
        company_id: Uuid,
        part_id: Uuid,
        quantity: i32,
    },
    PartRemoved {
        company_id: Uuid,
        part_id: Uuid,
        work_order_id: Uuid,
    },

    // Stock events
    StockTransferred {
        company_id: Uuid,
        spare_part_id: Uuid,
        quantity: i32,
        destination_kind: DestinationKind,
        destination_id: Uuid,
    },
    FacilityStockUsed {
        company_id: Uuid,
        facility_stock_id: Uuid,
        quantity: i32,
        work_order_id: Uuid,
    },
    StockAdjusted {
        company_id: Uuid,
        spare_part_id: Uuid,
        old_quantity: i32,
        new_quantity: i32,
    },
    LowStock {
        company_id: Uuid,
        spare_part_id: Uuid,
        quantity: i32,
        min_quantity: i32,
    },

    // Ledger events
    PaymentRecorded {
        company_id: Uuid,
        transaction_id: Uuid,
        amount_cents: i64,
        paid_cents: i64,
    },
    TransactionsImported {
        company_id: Uuid,
        count: usize,
    },

    // Generic collection events
    RecordCreated {
        company_id: Uuid,
        collection: String,
        id: Uuid,
    },
    RecordUpdated {
        company_id: Uuid,
        collection: String,
        id: Uuid,
    },
    RecordDeleted {
        company_id: Uuid,
        collection: String,
        id: Uuid,
    },

    PermissionDenied {
        company_id: Uuid,
        user_id: Uuid,
        action: String,
    },
}

impl Event {
    pub fn company_id(&self) -> Uuid {
        match self {
            Event::WorkOrderCreated { company_id, .. }
            | Event::WorkOrderUpdated { company_id, .. }
            | Event::CallLogEscalated { company_id, .. }
            | Event::PartsAllocated { company_id, .. }
            | Event::PartStatusChanged { company_id, .. }
            | Event::PartVerificationRequested { company_id, .. }
            | Event::PartVerified { company_id, .. }
            | Event::PartQuantityChanged { company_id, .. }
            | Event::PartRemoved { company_id, .. }
            | Event::StockTransferred { company_id, .. }
            | Event::FacilityStockUsed { company_id, .. }
            | Event::StockAdjusted { company_id, .. }
            | Event::LowStock { company_id, .. }
            | Event::PaymentRecorded { company_id, .. }
            | Event::TransactionsImported { company_id, .. }
            | Event::RecordCreated { company_id, .. }
            | Event::RecordUpdated { company_id, .. }
            | Event::RecordDeleted { company_id, .. }
            | Event::PermissionDenied { company_id, .. } => *company_id,
        }
    }
}

/// Drains the event channel. Events are only logged; nothing downstream
/// depends on delivery.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        let company_id = event.company_id();
        match &event {
            Event::PermissionDenied {
                user_id, action, ..
            } => {
                warn!(%company_id, %user_id, action = %action, "permission denied");
            }
            Event::LowStock {
                spare_part_id,
                quantity,
                min_quantity,
                ..
            } => {
                warn!(
                    %company_id,
                    %spare_part_id,
                    quantity,
                    min_quantity,
                    "spare part at or below reorder threshold"
                );
            }
            other => {
                info!(%company_id, event = ?other, "event processed");
            }
        }
    }

    info!("Event channel closed; processing loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_delivers_and_survives_closed_channel() {
        let (sender, mut rx) = channel(4);
        let company_id = Uuid::new_v4();
        sender
            .publish(Event::RecordCreated {
                company_id,
                collection: "customers".into(),
                id: Uuid::new_v4(),
            })
            .await;

        let received = rx.recv().await.expect("event delivered");
        assert_eq!(received.company_id(), company_id);

        drop(rx);
        // No panic and no error surfaced once the receiver is gone.
        sender
            .publish(Event::TransactionsImported {
                company_id,
                count: 0,
            })
            .await;
        assert!(sender
            .send(Event::TransactionsImported {
                company_id,
                count: 0
            })
            .await
            .is_err());
    }
}
