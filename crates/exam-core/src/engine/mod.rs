//! Motor de workflow: acciones, planificación pura y ejecución.

pub mod action;
pub mod availability;
pub mod builder;
pub mod core;
pub mod plan;

pub use action::{Action, ActionKind, Actor, CommandOutcome};
pub use availability::{can_process_question, Availability};
pub use builder::{EngineBuilder, EngineBuilderInit};
pub use core::WorkflowEngine;
pub use plan::{plan, AssignmentRequest, Transition};
