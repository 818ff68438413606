use std::collections::HashMap;

use crate::outbox::{Event, PublicationRecord};

use super::error::{DispatchError, HandlerError};
use super::outcome::Outcome;

/// A registered handler. Receives the dispatch context and the record.
pub type Handler<C> = Box<dyn Fn(&C, &PublicationRecord) -> Outcome + Send + Sync>;

/// Mapping from `(event_type, handler_id)` to handler, built at startup.
///
/// Handlers for one event type keep their registration order; that order
/// decides the order in which publication records are created.
///
/// ## Example
///
/// ```ignore
/// let registry = HandlerRegistry::new()
///     .on_event::<PostCreated, _>("publisher", |service, event| {
///         service.publish(event.id).map(|_| ()).into()
///     });
/// ```
pub struct HandlerRegistry<C> {
    handlers: HashMap<(String, String), Handler<C>>,
    order: HashMap<String, Vec<String>>,
}

impl<C> Default for HandlerRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> HandlerRegistry<C> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            order: HashMap::new(),
        }
    }

    /// Register a raw handler for `event_type` under `handler_id`.
    ///
    /// Registering the same pair twice replaces the earlier handler but
    /// keeps its position.
    pub fn on<F>(mut self, event_type: &str, handler_id: &str, handler: F) -> Self
    where
        F: Fn(&C, &PublicationRecord) -> Outcome + Send + Sync + 'static,
    {
        let key = (event_type.to_string(), handler_id.to_string());
        if self.handlers.insert(key, Box::new(handler)).is_none() {
            self.order
                .entry(event_type.to_string())
                .or_default()
                .push(handler_id.to_string());
        }
        self
    }

    /// Register a typed handler. The payload is decoded into `E` before the
    /// handler runs; a decode failure becomes a handler failure.
    pub fn on_event<E, F>(self, handler_id: &str, handler: F) -> Self
    where
        E: Event + 'static,
        F: Fn(&C, E) -> Outcome + Send + Sync + 'static,
    {
        self.on(E::EVENT_TYPE, handler_id, move |ctx, record| {
            match record.decode::<E>() {
                Ok(event) => handler(ctx, event),
                Err(err) => Outcome::Failure(HandlerError::from(err)),
            }
        })
    }

    /// Handler ids registered for `event_type`, in registration order.
    pub fn handlers_for(&self, event_type: &str) -> &[String] {
        self.order
            .get(event_type)
            .map(|ids| ids.as_slice())
            .unwrap_or(&[])
    }

    pub fn resolve(
        &self,
        event_type: &str,
        handler_id: &str,
    ) -> Result<&Handler<C>, DispatchError> {
        self.handlers
            .get(&(event_type.to_string(), handler_id.to_string()))
            .ok_or_else(|| DispatchError::NoHandlerRegistered {
                event_type: event_type.to_string(),
                handler_id: handler_id.to_string(),
            })
    }

    /// Fail fast unless every listed event type has at least one handler.
    pub fn ensure_handles(&self, event_types: &[&str]) -> Result<(), DispatchError> {
        for event_type in event_types {
            if self.handlers_for(event_type).is_empty() {
                return Err(DispatchError::NoHandlerRegistered {
                    event_type: event_type.to_string(),
                    handler_id: "*".to_string(),
                });
            }
        }
        Ok(())
    }
}
