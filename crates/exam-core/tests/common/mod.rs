#![allow(dead_code)]

use exam_core::{Actor, InMemoryQuestionStore, InMemoryUserDirectory, Observed, WorkflowEngine};
use exam_domain::{Question, QuestionType, Role, UserAccount};
use uuid::Uuid;

pub type Engine = WorkflowEngine<InMemoryQuestionStore, InMemoryUserDirectory>;

/// Motor en memoria con un usuario registrado por rol.
pub struct Fixture {
    pub engine: Engine,
    pub gatherer: Actor,
    pub creator: Actor,
    pub explainer: Actor,
    pub processor: Actor,
    pub admin: Actor,
    pub student: Actor,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_engine(WorkflowEngine::new().build())
    }

    pub fn with_engine(mut engine: Engine) -> Self {
        let mut actor = |role: Role| {
            let id = engine.directory_mut().insert(UserAccount::new(role));
            Actor::new(id, role)
        };
        let gatherer = actor(Role::Gatherer);
        let creator = actor(Role::Creator);
        let explainer = actor(Role::Explainer);
        let processor = actor(Role::Processor);
        let admin = actor(Role::Admin);
        let student = actor(Role::Student);
        Self { engine,
               gatherer,
               creator,
               explainer,
               processor,
               admin,
               student }
    }

    pub fn observed(&self, id: Uuid) -> Observed {
        self.engine.observe(id).unwrap()
    }

    /// Pregunta MCQ enviada por el gatherer del fixture.
    pub fn submit(&mut self, text: &str) -> Uuid {
        let q = Question::new(text,
                              QuestionType::Mcq,
                              vec!["A".into(), "B".into(), "C".into()],
                              "A",
                              self.gatherer.id).unwrap();
        let gatherer = self.gatherer;
        self.engine.submit_question(&gatherer, q, false).unwrap().question_id
    }

    /// Lleva una pregunta nueva hasta `pending_explainer`.
    pub fn to_explainer(&mut self, text: &str) -> Uuid {
        let id = self.submit(text);
        let creator = self.creator;
        let obs = self.observed(id);
        self.engine.approve(id, obs, &creator, None).unwrap();
        id
    }

    /// Lleva una pregunta nueva hasta `pending_processor` con explicación.
    pub fn to_processor(&mut self, text: &str) -> Uuid {
        let id = self.to_explainer(text);
        let explainer = self.explainer;
        let obs = self.observed(id);
        self.engine.submit_explanation(id, obs, &explainer, "porque A").unwrap();
        id
    }

    /// Lleva una pregunta nueva hasta `completed`.
    pub fn to_completed(&mut self, text: &str) -> Uuid {
        let id = self.to_processor(text);
        let processor = self.processor;
        let obs = self.observed(id);
        self.engine.approve(id, obs, &processor, None).unwrap();
        id
    }

    pub fn history_len(&self, id: Uuid) -> usize {
        self.engine.history(id).unwrap().len()
    }
}
