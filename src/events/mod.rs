use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::services::audit::AuditService;
use crate::services::notifications::NotificationService;

/// Domain events emitted after the owning transaction has committed.
///
/// Consumers (audit recorder, notification dispatcher) are best-effort:
/// a failure to record an event never fails the request that produced it.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    AssetCreated {
        asset_id: Uuid,
        actor_user_id: Uuid,
    },
    AssetUpdated {
        asset_id: Uuid,
        actor_user_id: Uuid,
    },
    AssetRetired {
        asset_id: Uuid,
        actor_user_id: Uuid,
    },
    AssetStatusChanged {
        asset_id: Uuid,
        old_status: String,
        new_status: String,
        actor_user_id: Uuid,
    },
    AssetAssigned {
        asset_id: Uuid,
        assignment_id: Uuid,
        assigned_to_user_id: Uuid,
        assigned_by_user_id: Uuid,
    },
    AssetReturned {
        asset_id: Uuid,
        assignment_id: Uuid,
        returned_by_user_id: Uuid,
        return_condition: String,
    },
    TransferRequested {
        transfer_id: Uuid,
        asset_id: Uuid,
        to_user_id: Uuid,
        requested_by_user_id: Uuid,
    },
    TransferManagerApproved {
        transfer_id: Uuid,
        asset_id: Uuid,
        approver_user_id: Uuid,
    },
    TransferCompleted {
        transfer_id: Uuid,
        asset_id: Uuid,
        new_assignment_id: Uuid,
        approver_user_id: Uuid,
    },
    TransferRejected {
        transfer_id: Uuid,
        asset_id: Uuid,
        rejected_by_user_id: Uuid,
    },
    UserRegistered {
        user_id: Uuid,
    },
}

impl Event {
    /// Entity type and id the audit recorder files this event under.
    pub fn entity(&self) -> (&'static str, Uuid) {
        match self {
            Event::AssetCreated { asset_id, .. }
            | Event::AssetUpdated { asset_id, .. }
            | Event::AssetRetired { asset_id, .. }
            | Event::AssetStatusChanged { asset_id, .. } => ("asset", *asset_id),
            Event::AssetAssigned { assignment_id, .. }
            | Event::AssetReturned { assignment_id, .. } => ("asset_assignment", *assignment_id),
            Event::TransferRequested { transfer_id, .. }
            | Event::TransferManagerApproved { transfer_id, .. }
            | Event::TransferCompleted { transfer_id, .. }
            | Event::TransferRejected { transfer_id, .. } => ("asset_transfer", *transfer_id),
            Event::UserRegistered { user_id } => ("user", *user_id),
        }
    }

    /// Audit action name, stable across releases.
    pub fn action(&self) -> &'static str {
        match self {
            Event::AssetCreated { .. } => "asset.created",
            Event::AssetUpdated { .. } => "asset.updated",
            Event::AssetRetired { .. } => "asset.retired",
            Event::AssetStatusChanged { .. } => "asset.status_changed",
            Event::AssetAssigned { .. } => "asset.assigned",
            Event::AssetReturned { .. } => "asset.returned",
            Event::TransferRequested { .. } => "transfer.requested",
            Event::TransferManagerApproved { .. } => "transfer.manager_approved",
            Event::TransferCompleted { .. } => "transfer.completed",
            Event::TransferRejected { .. } => "transfer.rejected",
            Event::UserRegistered { .. } => "user.registered",
        }
    }

    /// The user who performed the action, when the event carries one.
    pub fn actor(&self) -> Option<Uuid> {
        match self {
            Event::AssetCreated { actor_user_id, .. }
            | Event::AssetUpdated { actor_user_id, .. }
            | Event::AssetRetired { actor_user_id, .. }
            | Event::AssetStatusChanged { actor_user_id, .. } => Some(*actor_user_id),
            Event::AssetAssigned {
                assigned_by_user_id,
                ..
            } => Some(*assigned_by_user_id),
            Event::AssetReturned {
                returned_by_user_id,
                ..
            } => Some(*returned_by_user_id),
            Event::TransferRequested {
                requested_by_user_id,
                ..
            } => Some(*requested_by_user_id),
            Event::TransferManagerApproved {
                approver_user_id, ..
            }
            | Event::TransferCompleted {
                approver_user_id, ..
            } => Some(*approver_user_id),
            Event::TransferRejected {
                rejected_by_user_id,
                ..
            } => Some(*rejected_by_user_id),
            Event::UserRegistered { .. } => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum EventError {
    #[error("Failed to send event: {0}")]
    SendError(String),
}

/// Handle services use to publish events after their transaction commits.
#[derive(Clone, Debug)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    pub async fn send(&self, event: Event) -> Result<(), EventError> {
        self.sender
            .send(event)
            .await
            .map_err(|e| EventError::SendError(e.to_string()))
    }
}

/// Consumes events until the channel closes, fanning each one out to the
/// audit recorder and the notification dispatcher. Failures are logged and
/// dropped; this loop never aborts on a bad event.
pub async fn process_events(
    mut receiver: mpsc::Receiver<Event>,
    audit: Arc<AuditService>,
    notifications: Arc<NotificationService>,
) {
    info!("Event processor started");
    while let Some(event) = receiver.recv().await {
        debug!(action = event.action(), "Processing event");
        if let Err(e) = audit.record(&event).await {
            error!(action = event.action(), error = %e, "Failed to record audit entry");
        }
        if let Err(e) = notifications.dispatch(&event).await {
            error!(action = event.action(), error = %e, "Failed to dispatch notifications");
        }
    }
    info!("Event processor stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_action_names_are_stable() {
        let event = Event::TransferCompleted {
            transfer_id: Uuid::new_v4(),
            asset_id: Uuid::new_v4(),
            new_assignment_id: Uuid::new_v4(),
            approver_user_id: Uuid::new_v4(),
        };
        assert_eq!(event.action(), "transfer.completed");
        assert_eq!(event.entity().0, "asset_transfer");
    }

    #[test]
    fn user_registered_has_no_actor() {
        let event = Event::UserRegistered {
            user_id: Uuid::new_v4(),
        };
        assert_eq!(event.actor(), None);
        assert_eq!(event.entity().0, "user");
    }

    #[tokio::test]
    async fn send_fails_after_receiver_drops() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);
        let result = sender
            .send(Event::UserRegistered {
                user_id: Uuid::new_v4(),
            })
            .await;
        assert!(result.is_err());
    }
}
