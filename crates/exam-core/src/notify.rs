//! Outbox de notificaciones.
//!
//! El motor encola una notificación por comando confirmado, después del
//! commit; la entrega es responsabilidad de quien drena la cola.
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::history::HistoryAction;
use crate::routing::Destination;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Cola destinataria.
    pub recipient: Destination,
    pub question_id: Uuid,
    pub kind: HistoryAction,
    pub note: Option<String>,
}

#[derive(Debug, Default)]
pub struct Outbox {
    pending: Vec<Notification>,
}

impl Outbox {
    pub fn push(&mut self, notification: Notification) {
        self.pending.push(notification);
    }

    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.pending)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
