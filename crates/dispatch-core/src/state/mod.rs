//! State management for orders.
//!
//! This module provides the state machine that implements the mutation API:
//! order creation, driver assignment and delivery, each validated against the
//! lifecycle before anything is written to the store.

pub mod order;

pub use order::{DispatchError, EntityKind, OrderStateMachine};
