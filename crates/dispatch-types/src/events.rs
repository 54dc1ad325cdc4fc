//! Event types published after each committed order change.
//!
//! Presentation layers subscribe to these to refresh views and show
//! notifications without polling the store.

use crate::Order;
use serde::{Deserialize, Serialize};

/// What triggered a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventSource {
	/// A caller of the mutation API.
	Manual,
	/// The periodic dispatch simulation.
	Simulation,
}

/// Order change notifications. Each variant carries the order as committed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DispatchEvent {
	/// A new pending order was created.
	OrderCreated { order: Order, source: EventSource },
	/// A pending order was given to a driver.
	OrderAssigned { order: Order, source: EventSource },
	/// An assigned order was delivered.
	OrderDelivered { order: Order, source: EventSource },
}

impl DispatchEvent {
	/// The order carried by this event.
	pub fn order(&self) -> &Order {
		match self {
			DispatchEvent::OrderCreated { order, .. }
			| DispatchEvent::OrderAssigned { order, .. }
			| DispatchEvent::OrderDelivered { order, .. } => order,
		}
	}

	/// What triggered this event.
	pub fn source(&self) -> EventSource {
		match self {
			DispatchEvent::OrderCreated { source, .. }
			| DispatchEvent::OrderAssigned { source, .. }
			| DispatchEvent::OrderDelivered { source, .. } => *source,
		}
	}
}
