//! Record lifecycle events
//!
//! The store owns an `EventNotifier` and publishes one event per successful
//! mutation, after the write (and backup, where one is taken) has happened.
//!
//! Delivery is synchronous and in registration order. Listener failures,
//! including panics, are logged and swallowed: they never reach the
//! publishing operation and never stop later listeners from running.

use std::panic::{self, AssertUnwindSafe};

use anyhow::Result;
use tracing::{error, info};

use crate::models::Record;

/// A change to the collection, carrying the affected record
#[derive(Debug, Clone, PartialEq)]
pub enum VaultEvent {
    RecordAdded(Record),
    RecordUpdated(Record),
    /// Carries the record as it was before removal
    RecordDeleted(Record),
}

impl VaultEvent {
    /// Event name
    pub fn kind(&self) -> &'static str {
        match self {
            VaultEvent::RecordAdded(_) => "recordAdded",
            VaultEvent::RecordUpdated(_) => "recordUpdated",
            VaultEvent::RecordDeleted(_) => "recordDeleted",
        }
    }

    /// The record the event is about
    pub fn record(&self) -> &Record {
        match self {
            VaultEvent::RecordAdded(r)
            | VaultEvent::RecordUpdated(r)
            | VaultEvent::RecordDeleted(r) => r,
        }
    }
}

/// Subscriber to vault events
pub trait EventListener {
    fn on_event(&self, event: &VaultEvent) -> Result<()>;
}

impl<F> EventListener for F
where
    F: Fn(&VaultEvent) -> Result<()>,
{
    fn on_event(&self, event: &VaultEvent) -> Result<()> {
        self(event)
    }
}

/// Ordered registry of listeners
#[derive(Default)]
pub struct EventNotifier {
    listeners: Vec<Box<dyn EventListener>>,
}

impl EventNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener; it runs after all earlier ones
    pub fn subscribe(&mut self, listener: impl EventListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Deliver an event to every listener
    pub fn publish(&self, event: &VaultEvent) {
        for (index, listener) in self.listeners.iter().enumerate() {
            match panic::catch_unwind(AssertUnwindSafe(|| listener.on_event(event))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    error!(
                        "Listener {} failed handling {} for record {}: {:#}",
                        index,
                        event.kind(),
                        event.record().id,
                        e
                    );
                }
                Err(_) => {
                    error!(
                        "Listener {} panicked handling {} for record {}",
                        index,
                        event.kind(),
                        event.record().id
                    );
                }
            }
        }
    }
}

/// Logs every event at info level
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingListener;

impl EventListener for LoggingListener {
    fn on_event(&self, event: &VaultEvent) -> Result<()> {
        let record = event.record();
        match event {
            VaultEvent::RecordAdded(_) => {
                info!("[EVENT] Record added: ID {}, Name: {}", record.id, record.name)
            }
            VaultEvent::RecordUpdated(_) => {
                info!("[EVENT] Record updated: ID {}, Name: {}", record.id, record.name)
            }
            VaultEvent::RecordDeleted(_) => {
                info!("[EVENT] Record deleted: ID {}, Name: {}", record.id, record.name)
            }
        }
        Ok(())
    }
}
