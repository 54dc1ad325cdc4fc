//! Random incoming orders, used by the dashboard's refresh action.

use crate::random::RandomSource;
use dispatch_types::NewOrder;

/// Neighbourhoods new simulated orders are sent to.
const DEFAULT_DESTINATIONS: [&str; 4] = ["Marais", "Belleville", "Bercy", "Auteuil"];

/// Smallest simulated amount.
const MIN_AMOUNT: i64 = 10;

/// Number of distinct simulated amounts (10..=39).
const AMOUNT_SPAN: usize = 30;

/// Produces plausible order requests.
#[derive(Debug, Clone)]
pub struct OrderGenerator {
	destinations: Vec<String>,
}

impl Default for OrderGenerator {
	fn default() -> Self {
		Self::new(DEFAULT_DESTINATIONS.iter().map(|d| d.to_string()).collect())
	}
}

impl OrderGenerator {
	pub fn new(destinations: Vec<String>) -> Self {
		Self { destinations }
	}

	/// Builds a request for the order that would become number `order_count + 1`.
	///
	/// The client is named after a letter derived from `order_count`, cycling
	/// through A..Z.
	pub fn next_request(&self, order_count: usize, rng: &mut dyn RandomSource) -> NewOrder {
		let letter = char::from(b'A' + (order_count % 26) as u8);
		let destination = if self.destinations.is_empty() {
			DEFAULT_DESTINATIONS[0].to_string()
		} else {
			let index = rng.pick(self.destinations.len()).min(self.destinations.len() - 1);
			self.destinations[index].clone()
		};
		let amount = MIN_AMOUNT + rng.pick(AMOUNT_SPAN).min(AMOUNT_SPAN - 1) as i64;

		NewOrder {
			client: format!("Client {}", letter),
			destination,
			amount,
		}
	}
}
