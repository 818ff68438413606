//! Outbox - durable record of events awaiting delivery.
//!
//! Each event is recorded once per target handler so that handlers retry
//! independently. Records are written in the same unit of work as the
//! aggregate change that produced them (see `HashMapStore::commit`) and
//! completed by the dispatcher once their handler succeeds.

mod event;
mod record;
mod store;

pub use event::{Event, OutboundEvent};
pub use record::{PublicationId, PublicationRecord};
pub use store::EventStore;
