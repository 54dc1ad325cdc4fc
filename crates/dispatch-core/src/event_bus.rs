//! Event bus for broadcasting order changes.
//!
//! Wraps a tokio broadcast channel. Every subscriber sees every event
//! published after it subscribed, in commit order.

use dispatch_types::DispatchEvent;
use tokio::sync::broadcast;

/// Default number of events buffered per subscriber.
pub const DEFAULT_CAPACITY: usize = 1000;

/// Broadcast channel for dispatch events.
#[derive(Clone)]
pub struct EventBus {
	sender: broadcast::Sender<DispatchEvent>,
}

impl EventBus {
	/// Creates a new event bus with the specified buffer capacity.
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity.max(1));
		Self { sender }
	}

	/// Creates a new receiver for events published from now on.
	pub fn subscribe(&self) -> broadcast::Receiver<DispatchEvent> {
		self.sender.subscribe()
	}

	/// Publishes an event to all subscribers.
	///
	/// Fails only when there are no subscribers, which callers may ignore.
	pub fn publish(
		&self,
		event: DispatchEvent,
	) -> Result<usize, broadcast::error::SendError<DispatchEvent>> {
		self.sender.send(event)
	}

	pub fn subscriber_count(&self) -> usize {
		self.sender.receiver_count()
	}
}

impl Default for EventBus {
	fn default() -> Self {
		Self::new(DEFAULT_CAPACITY)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::Utc;
	use dispatch_types::{EventSource, Order, OrderStatus};

	fn created(id: &str) -> DispatchEvent {
		DispatchEvent::OrderCreated {
			order: Order {
				id: id.to_string(),
				client: "Client A".into(),
				destination: "Marais".into(),
				amount: 25,
				status: OrderStatus::Pending,
				driver_id: None,
				created_at: Utc::now(),
			},
			source: EventSource::Manual,
		}
	}

	#[tokio::test]
	async fn test_subscribers_receive_in_order() {
		let bus = EventBus::default();
		let mut rx = bus.subscribe();

		bus.publish(created("c1")).unwrap();
		bus.publish(created("c2")).unwrap();

		assert_eq!(rx.recv().await.unwrap().order().id, "c1");
		assert_eq!(rx.recv().await.unwrap().order().id, "c2");
	}

	#[test]
	fn test_publish_without_subscribers_is_reported() {
		let bus = EventBus::new(4);
		assert_eq!(bus.subscriber_count(), 0);
		assert!(bus.publish(created("c1")).is_err());
	}
}
