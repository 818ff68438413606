use std::time::SystemTime;

use serde::de::DeserializeOwned;

use super::event::OutboundEvent;

pub type PublicationId = u64;

/// One delivery obligation: a single event bound for a single handler.
///
/// `completed_at == None` means the record is still pending.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicationRecord {
    pub id: PublicationId,
    pub event_type: String,
    pub aggregate_id: String,
    pub payload: Vec<u8>,
    pub target_handler: String,
    pub created_at: SystemTime,
    pub completed_at: Option<SystemTime>,
    pub attempts: u32,
    pub last_error: Option<String>,
}

impl PublicationRecord {
    pub(crate) fn new(
        id: PublicationId,
        event: &OutboundEvent,
        target_handler: &str,
        created_at: SystemTime,
    ) -> Self {
        Self {
            id,
            event_type: event.event_type.clone(),
            aggregate_id: event.aggregate_id.clone(),
            payload: event.payload.clone(),
            target_handler: target_handler.to_string(),
            created_at,
            completed_at: None,
            attempts: 0,
            last_error: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.completed_at.is_none()
    }

    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Decode the payload into a typed event.
    pub fn decode<E: DeserializeOwned>(&self) -> Result<E, bitcode::Error> {
        bitcode::deserialize(&self.payload)
    }
}
