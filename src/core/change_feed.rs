//! Change notifications emitted by the store for every accepted mutation.
//!
//! Notifications are partitioned by entity kind, one broadcast channel per
//! kind. The store publishes while it still holds its write lock, so within a
//! kind every subscriber sees events in acceptance order. Nothing is promised
//! about interleaving across kinds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use super::model::CastingDateId;

/// Kind of entity a change refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A reservation row.
    Reservation,
    /// A casting date row.
    CastingDate,
}

/// Operation that was accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeOp {
    /// Entity inserted.
    Created,
    /// Entity modified.
    Updated,
    /// Entity removed.
    Deleted,
}

/// A single accepted mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Store-wide sequence number, strictly increasing in acceptance order.
    pub seq: u64,
    /// Entity kind.
    pub entity: EntityKind,
    /// Operation kind.
    pub op: ChangeOp,
    /// Identifier of the affected entity.
    pub entity_id: Uuid,
    /// Casting date the entity belongs to (the date itself for date events).
    pub casting_date_id: CastingDateId,
    /// When the store accepted the mutation.
    pub at: DateTime<Utc>,
}

/// Publishing side of the feed, owned by a store.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    reservations: broadcast::Sender<ChangeEvent>,
    casting_dates: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeed {
    /// Create a feed buffering up to `capacity` events per kind for slow
    /// subscribers. Lagging subscribers are told how many events they missed.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (reservations, _) = broadcast::channel(capacity);
        let (casting_dates, _) = broadcast::channel(capacity);
        Self {
            reservations,
            casting_dates,
        }
    }

    /// Publish an event on its kind's channel. Having no subscribers is fine.
    pub fn publish(&self, event: ChangeEvent) {
        let sender = match event.entity {
            EntityKind::Reservation => &self.reservations,
            EntityKind::CastingDate => &self.casting_dates,
        };
        tracing::debug!(
            seq = event.seq,
            entity = ?event.entity,
            op = ?event.op,
            entity_id = %event.entity_id,
            "publishing change"
        );
        let _ = sender.send(event);
    }

    /// Open a subscription to both kinds.
    #[must_use]
    pub fn subscribe(&self) -> ChangeSubscription {
        ChangeSubscription {
            reservations: self.reservations.subscribe(),
            casting_dates: self.casting_dates.subscribe(),
        }
    }
}

/// Receiving side of the feed held by one observer.
#[derive(Debug)]
pub struct ChangeSubscription {
    /// Reservation changes.
    pub reservations: broadcast::Receiver<ChangeEvent>,
    /// Casting date changes.
    pub casting_dates: broadcast::Receiver<ChangeEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(seq: u64, entity: EntityKind) -> ChangeEvent {
        ChangeEvent {
            seq,
            entity,
            op: ChangeOp::Created,
            entity_id: Uuid::new_v4(),
            casting_date_id: CastingDateId::new(),
            at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_events_are_partitioned_by_kind() {
        let feed = ChangeFeed::new(8);
        let mut sub = feed.subscribe();

        feed.publish(event(1, EntityKind::Reservation));
        feed.publish(event(2, EntityKind::CastingDate));
        feed.publish(event(3, EntityKind::Reservation));

        assert_eq!(sub.reservations.recv().await.unwrap().seq, 1);
        assert_eq!(sub.reservations.recv().await.unwrap().seq, 3);
        assert_eq!(sub.casting_dates.recv().await.unwrap().seq, 2);
        assert!(sub.reservations.try_recv().is_err());
    }

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        let feed = ChangeFeed::new(4);
        feed.publish(event(1, EntityKind::Reservation));
        let mut late = feed.subscribe();
        assert!(late.reservations.try_recv().is_err());
    }
}
