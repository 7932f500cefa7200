//! Event persistence for the order lifecycle.
//!
//! Orders are stored as append-only event streams. The expected-version
//! append check doubles as the per-order single-writer discipline: two
//! racing transitions on the same order are serialized, and the second
//! append fails with a concurrency conflict instead of being applied.

pub mod error;
pub mod event;
pub mod memory;
pub mod query;
pub mod store;

pub use common::AggregateId;
pub use error::{EventStoreError, Result};
pub use event::{EventEnvelope, EventEnvelopeBuilder, EventId, Version};
pub use memory::InMemoryEventStore;
pub use query::EventQuery;
pub use store::{AppendOptions, EventStore, EventStream};
