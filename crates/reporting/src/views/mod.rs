//! Read model views.

mod order_board;
mod order_ledger;

pub use order_board::{OrderBoardEntry, OrderBoardView};
pub use order_ledger::{OrderLedgerView, OrderRecord};
