//! Core dispatch logic for the delivery dashboard.
//!
//! This crate owns everything that changes or derives order state:
//! - the order state machine behind the mutation API
//! - the periodic dispatch simulation that moves orders forward
//! - statistics and driver rankings computed from the store on read
//! - the engine that serialises all of the above against one shared store
//!   and publishes an event after each committed change

pub mod builder;
pub mod engine;
pub mod event_bus;
pub mod generator;
pub mod random;
pub mod ranking;
pub mod simulation;
pub mod state;
pub mod stats;

pub use builder::DispatchBuilder;
pub use engine::{DispatchEngine, EngineError};
pub use event_bus::EventBus;
pub use generator::OrderGenerator;
pub use random::RandomSource;
pub use simulation::{DispatchSimulator, TickOutcome};
pub use state::{DispatchError, EntityKind, OrderStateMachine};
