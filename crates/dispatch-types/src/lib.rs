//! Common types module for the delivery dispatch dashboard.
//!
//! This module defines the core data types shared by every dispatch component:
//! orders and their lifecycle status, drivers, the events published when an
//! order changes, dashboard statistics and the HTTP API payloads.

/// API types for HTTP endpoints and request/response structures.
pub mod api;
/// Driver types.
pub mod driver;
/// Event types for notifying presentation layers of order changes.
pub mod events;
/// Order types and the order lifecycle status.
pub mod order;
/// Aggregate dashboard statistics.
pub mod stats;
/// Display helpers.
pub mod utils;

pub use api::*;
pub use driver::*;
pub use events::*;
pub use order::*;
pub use stats::*;
pub use utils::format_amount;
