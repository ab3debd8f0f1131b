//! Bounded, non-blocking hand-off of click events to the background worker.

use tokio::sync::mpsc;
use tracing::warn;

use crate::domain::click_event::ClickEvent;

/// What happened to an event offered to the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    Queued,
    /// The queue was full and the event was discarded.
    Dropped,
    /// The worker has shut down.
    Closed,
}

/// Producer side of the click queue.
///
/// Enqueueing never awaits: a full queue drops the event, logs a warning and
/// bumps `clicks_dropped_total`.
#[derive(Clone)]
pub struct ClickQueue {
    sender: mpsc::Sender<ClickEvent>,
}

impl ClickQueue {
    /// Creates a queue with the given capacity and returns the worker's receiver.
    pub fn bounded(capacity: usize) -> (Self, mpsc::Receiver<ClickEvent>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, receiver)
    }

    pub fn enqueue(&self, event: ClickEvent) -> EnqueueOutcome {
        match self.sender.try_send(event) {
            Ok(()) => {
                metrics::counter!("clicks_enqueued_total").increment(1);
                EnqueueOutcome::Queued
            }
            Err(mpsc::error::TrySendError::Full(ev)) => {
                metrics::counter!("clicks_dropped_total").increment(1);
                warn!(link_id = ev.link_id, "Click queue full, dropping click");
                EnqueueOutcome::Dropped
            }
            Err(mpsc::error::TrySendError::Closed(ev)) => {
                metrics::counter!("clicks_dropped_total").increment(1);
                warn!(link_id = ev.link_id, "Click queue closed, dropping click");
                EnqueueOutcome::Closed
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Free slots currently available.
    pub fn capacity(&self) -> usize {
        self.sender.capacity()
    }

    pub fn max_capacity(&self) -> usize {
        self.sender.max_capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(link_id: i64) -> ClickEvent {
        ClickEvent::new(link_id, None, None, None)
    }

    #[tokio::test]
    async fn test_enqueue_until_full() {
        let (queue, mut rx) = ClickQueue::bounded(2);

        assert_eq!(queue.enqueue(event(1)), EnqueueOutcome::Queued);
        assert_eq!(queue.enqueue(event(2)), EnqueueOutcome::Queued);
        assert_eq!(queue.enqueue(event(3)), EnqueueOutcome::Dropped);
        assert_eq!(queue.capacity(), 0);

        assert_eq!(rx.recv().await.map(|e| e.link_id), Some(1));
        assert_eq!(queue.enqueue(event(4)), EnqueueOutcome::Queued);
    }

    #[tokio::test]
    async fn test_enqueue_after_worker_gone() {
        let (queue, rx) = ClickQueue::bounded(4);
        drop(rx);

        assert!(queue.is_closed());
        assert_eq!(queue.enqueue(event(1)), EnqueueOutcome::Closed);
    }
}
