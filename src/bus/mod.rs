//! Typed message routing.
//!
//! Handlers declare the message types they accept through compile-time
//! capabilities; the bus fans published messages out to them synchronously.

#[allow(clippy::module_inception)]
mod bus;
mod handler;

pub use bus::{DeliveryHold, MessageBus};
pub use handler::{HandlerId, Handles, MessageHandler, SubscriptionSet, Subscriptions};
