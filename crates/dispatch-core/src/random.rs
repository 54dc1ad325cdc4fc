//! Random source used by the dispatch simulation.
//!
//! The simulation never calls an ambient RNG; it draws from a `RandomSource`
//! handed to it, so a fixed seed or a scripted source reproduces a run.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of the random decisions made by the simulation.
pub trait RandomSource: Send {
	/// Returns a value in `[0, 1)`.
	fn next_unit(&mut self) -> f64;

	/// Returns an index in `0..len`. Callers never pass `len == 0`.
	fn pick(&mut self, len: usize) -> usize;
}

impl RandomSource for StdRng {
	fn next_unit(&mut self) -> f64 {
		self.gen::<f64>()
	}

	fn pick(&mut self, len: usize) -> usize {
		if len == 0 {
			return 0;
		}
		self.gen_range(0..len)
	}
}

/// Builds the standard source, seeded when `seed` is given.
pub fn seeded(seed: Option<u64>) -> StdRng {
	match seed {
		Some(seed) => StdRng::seed_from_u64(seed),
		None => StdRng::from_entropy(),
	}
}

/// Replays fixed sequences of draws, cycling when exhausted.
#[cfg(any(test, feature = "testing"))]
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
	units: Vec<f64>,
	picks: Vec<usize>,
	unit_cursor: usize,
	pick_cursor: usize,
}

#[cfg(any(test, feature = "testing"))]
impl ScriptedRandom {
	pub fn new(units: Vec<f64>, picks: Vec<usize>) -> Self {
		Self {
			units,
			picks,
			unit_cursor: 0,
			pick_cursor: 0,
		}
	}

	/// Always returns the same draw and the same pick.
	pub fn constant(unit: f64, pick: usize) -> Self {
		Self::new(vec![unit], vec![pick])
	}
}

#[cfg(any(test, feature = "testing"))]
impl RandomSource for ScriptedRandom {
	fn next_unit(&mut self) -> f64 {
		if self.units.is_empty() {
			return 0.0;
		}
		let value = self.units[self.unit_cursor % self.units.len()];
		self.unit_cursor += 1;
		value
	}

	fn pick(&mut self, len: usize) -> usize {
		if self.picks.is_empty() || len == 0 {
			return 0;
		}
		let value = self.picks[self.pick_cursor % self.picks.len()];
		self.pick_cursor += 1;
		value % len
	}
}
