//! Predicados puros para la capa de presentación.
use serde::{Deserialize, Serialize};

use crate::flag;
use crate::repo::Snapshot;
use crate::routing::{self, Destination};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub can_process_question: bool,
    pub is_flagged: bool,
    pub gatherer_rejected_flag: bool,
    /// Hay una corrección lista para `resubmit_correction`.
    pub was_updated_after_flag: bool,
}

impl Availability {
    pub fn of(snap: &Snapshot) -> Self {
        Self { can_process_question: can_process_question(snap),
               is_flagged: snap.question.is_flagged,
               gatherer_rejected_flag: flag::is_gatherer_rejected(snap),
               was_updated_after_flag: flag::corrected_after_flag(snap) }
    }
}

/// La pregunta está en la cola del processor.
pub fn can_process_question(snap: &Snapshot) -> bool {
    routing::current_queue(snap) == Destination::Processor
}
