//! Builder para `WorkflowEngine`.
//!
//! `EngineBuilderInit` recibe los colaboradores obligatorios (store y
//! directorio); `EngineBuilder` acumula la configuración opcional.
//!
//! ```ignore
//! let engine = WorkflowEngine::new().with_config(WorkflowConfig::from_env()).build();
//! ```
use exam_policies::{ReflagPolicy, WorkflowPolicy};
use log::info;

use crate::assignment::{AssignmentResolver, UserDirectory};
use crate::config::WorkflowConfig;
use crate::constants::ENGINE_VERSION;
use crate::drafts::DraftStore;
use crate::engine::WorkflowEngine;
use crate::repo::QuestionStore;

#[derive(Debug)]
pub struct EngineBuilderInit<S: QuestionStore, D: UserDirectory> {
    pub store: S,
    pub directory: D,
}

impl<S: QuestionStore, D: UserDirectory> EngineBuilderInit<S, D> {
    pub fn with_config(self, config: WorkflowConfig) -> EngineBuilder<S, D> {
        EngineBuilder { store: self.store,
                        directory: self.directory,
                        config }
    }

    /// Motor con la configuración por defecto.
    pub fn build(self) -> WorkflowEngine<S, D> {
        self.with_config(WorkflowConfig::default()).build()
    }
}

#[derive(Debug)]
pub struct EngineBuilder<S: QuestionStore, D: UserDirectory> {
    store: S,
    directory: D,
    config: WorkflowConfig,
}

impl<S: QuestionStore, D: UserDirectory> EngineBuilder<S, D> {
    pub fn policy(mut self, policy: WorkflowPolicy) -> Self {
        self.config.policy = policy;
        self
    }

    pub fn reflag(mut self, reflag: ReflagPolicy) -> Self {
        self.config.policy.reflag = reflag;
        self
    }

    pub fn require_assignment_for_all(mut self, required: bool) -> Self {
        self.config.policy.assignment.require_for_all = required;
        self
    }

    pub fn draft_ttl_secs(mut self, secs: i64) -> Self {
        self.config.draft_ttl_secs = secs;
        self
    }

    pub fn build(self) -> WorkflowEngine<S, D> {
        info!("motor de workflow {ENGINE_VERSION} con políticas {}", self.config.policy.to_json());
        let resolver = AssignmentResolver::new(self.directory, self.config.directory_cache_ttl_secs);
        WorkflowEngine::new_with_parts(self.store,
                                       resolver,
                                       self.config.policy,
                                       DraftStore::new(self.config.draft_ttl_secs))
    }
}
