//! In-process firing bus backed by a tokio broadcast channel.

use std::future::Future;

use tokio::sync::broadcast;

use zonealarm_domain::error::ZoneAlarmError;
use zonealarm_domain::firing::Firing;

use crate::ports::AlarmSink;

/// Fan-out sink: every firing is broadcast to all current subscribers.
///
/// Invoking succeeds even when there are no active subscribers
/// (the firing is simply dropped).
pub struct InProcessFiringBus {
    sender: broadcast::Sender<Firing>,
}

impl InProcessFiringBus {
    /// Create a new bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to firings published *after* this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Firing> {
        self.sender.subscribe()
    }
}

impl AlarmSink for InProcessFiringBus {
    fn invoke(&self, firing: &Firing) -> impl Future<Output = Result<(), ZoneAlarmError>> + Send {
        // send only fails when nobody listens
        let _ = self.sender.send(firing.clone());
        async { Ok(()) }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use zonealarm_domain::alarm::Action;
    use zonealarm_domain::id::{SlotId, ZoneId};
    use zonealarm_domain::time::parse_wall_clock;
    use zonealarm_domain::zone_data::ZoneDataPayload;

    fn firing(zone: i64) -> Firing {
        Firing {
            zone: ZoneId::new(zone).unwrap(),
            slot: SlotId::new(0).unwrap(),
            action: Action::On,
            payload: ZoneDataPayload::empty(),
            at: parse_wall_clock("2025-06-16 08:30").unwrap(),
        }
    }

    #[tokio::test]
    async fn should_deliver_firing_to_every_subscriber() {
        let bus = InProcessFiringBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.invoke(&firing(2)).await.unwrap();

        assert_eq!(rx1.recv().await.unwrap().zone.get(), 2);
        assert_eq!(rx2.recv().await.unwrap().zone.get(), 2);
    }

    #[tokio::test]
    async fn should_succeed_when_no_subscribers() {
        let bus = InProcessFiringBus::new(16);
        assert!(bus.invoke(&firing(1)).await.is_ok());
    }

    #[tokio::test]
    async fn should_work_through_shared_handle() {
        let bus = Arc::new(InProcessFiringBus::new(4));
        let mut rx = bus.subscribe();
        let shared = Arc::clone(&bus);

        shared.invoke(&firing(4)).await.unwrap();

        assert_eq!(rx.recv().await.unwrap().zone.get(), 4);
    }
}
