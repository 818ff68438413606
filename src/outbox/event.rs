use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::PersistenceError;

/// A typed domain event that can be written to the outbox.
pub trait Event: Serialize + DeserializeOwned {
    /// Tag identifying the event's schema.
    const EVENT_TYPE: &'static str;

    /// Identifier of the aggregate that produced the event.
    fn aggregate_id(&self) -> String;
}

/// An encoded event, ready to be recorded once per target handler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundEvent {
    pub event_type: String,
    pub aggregate_id: String,
    pub payload: Vec<u8>,
}

impl OutboundEvent {
    pub fn new(
        event_type: impl Into<String>,
        aggregate_id: impl Into<String>,
        payload: Vec<u8>,
    ) -> Self {
        Self {
            event_type: event_type.into(),
            aggregate_id: aggregate_id.into(),
            payload,
        }
    }

    /// Encode a typed event into bitcode bytes.
    pub fn encode<E: Event>(event: &E) -> Result<Self, PersistenceError> {
        let payload = bitcode::serialize(event)?;
        Ok(Self::new(E::EVENT_TYPE, event.aggregate_id(), payload))
    }
}
