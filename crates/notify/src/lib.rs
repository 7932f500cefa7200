//! Lifecycle notification fan-out.
//!
//! The dispatcher pushes every order lifecycle change to two audiences:
//! the customer who owns the order (order-scoped channel) and the operator
//! console (shared channel). Delivery is at-least-once — a recipient
//! subscribed to both channels will see the same notification id twice —
//! so receivers apply notifications through [`NotificationInbox`], which
//! deduplicates by id.

pub mod dispatcher;
pub mod inbox;
pub mod notification;

pub use dispatcher::{Channel, NotificationDispatcher};
pub use inbox::NotificationInbox;
pub use notification::{Notification, NotificationId, NotificationKind};
