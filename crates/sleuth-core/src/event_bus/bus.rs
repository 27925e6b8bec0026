use super::types::InvestigationEvent;
use tokio::sync::broadcast;

/// Broadcast-based event bus for investigation progress.
///
/// Slow subscribers miss events (lagged) rather than blocking the run.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<InvestigationEvent>,
}

impl EventBus {
    /// Create a new EventBus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events published from now on.
    ///
    /// A subscriber that falls more than `capacity` events behind gets
    /// `RecvError::Lagged` on its next `recv`.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<InvestigationEvent> {
        self.sender.subscribe()
    }

    /// Publish an event to all active subscribers.
    ///
    /// Returns the number of subscribers that received it; with none the
    /// event is dropped.
    pub fn publish(&self, event: InvestigationEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Current number of subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
