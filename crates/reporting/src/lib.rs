//! Read models and financial reporting for the operator console.
//!
//! The query side of the system:
//! - [`Projection`] trait and [`ProjectionProcessor`] for replaying order
//!   events into read models
//! - [`OrderBoardView`]: active orders the operators are working
//! - [`OrderLedgerView`]: every order, terminal included, in the persisted
//!   order shape — the source for customer order lists and financials
//! - [`ExpenseLedger`]: the append-only operational expense log
//! - [`compute_stats`]: the pure financial aggregator over both

pub mod error;
pub mod expense;
pub mod processor;
pub mod projection;
pub mod read_model;
pub mod stats;
pub mod views;

pub use error::{ReportingError, Result};
pub use expense::{Expense, ExpenseCategory, ExpenseId, ExpenseLedger};
pub use processor::ProjectionProcessor;
pub use projection::{Projection, ProjectionPosition};
pub use read_model::ReadModel;
pub use stats::{Distribution, FinancialStats, compute_stats, percentage};
pub use views::{OrderBoardEntry, OrderBoardView, OrderLedgerView, OrderRecord};
