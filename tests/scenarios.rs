//! Escenarios de punta a punta sobre los almacenes en memoria.
use exam_core::{Actor, Destination, HistoryAction, InMemoryQuestionStore, InMemoryUserDirectory, WorkflowEngine};
use exam_domain::{FlagStatus, FlagType, Question, QuestionType, Role, UserAccount, VariantDraft};
use uuid::Uuid;

struct World {
    engine: WorkflowEngine<InMemoryQuestionStore, InMemoryUserDirectory>,
    gatherer: Actor,
    creator: Actor,
    explainer: Actor,
    processor: Actor,
    admin: Actor,
    student: Actor,
}

impl World {
    fn new() -> Self {
        let mut engine = WorkflowEngine::new().build();
        let mut actor = |role: Role| Actor::new(engine.directory_mut().insert(UserAccount::new(role)), role);
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

    fn submit(&mut self, text: &str) -> Uuid {
        let q = Question::new(text, QuestionType::Mcq, vec!["A".into(), "B".into()], "A", self.gatherer.id).unwrap();
        let gatherer = self.gatherer;
        self.engine.submit_question(&gatherer, q, false).unwrap().question_id
    }

    fn completed(&mut self, text: &str) -> Uuid {
        let id = self.submit(text);
        let (c, e, p) = (self.creator, self.explainer, self.processor);
        self.engine.approve(id, self.engine.observe(id).unwrap(), &c, None).unwrap();
        self.engine.submit_explanation(id, self.engine.observe(id).unwrap(), &e, "porque A").unwrap();
        self.engine.approve(id, self.engine.observe(id).unwrap(), &p, None).unwrap();
        id
    }
}

fn draft(text: &str) -> VariantDraft {
    VariantDraft { question_text: text.into(),
                   options: vec!["X".into(), "Y".into()],
                   correct_answer: "X".into() }
}

#[test]
fn scenario_a_creator_approval_routes_to_explainer() {
    let mut w = World::new();
    let q1 = w.submit("Q1");
    let q = w.engine.question(q1).unwrap();
    assert_eq!(q.status.as_str(), "pending_creator");
    assert_eq!(w.engine.current_queue(q1).unwrap(), Destination::Creator);

    let creator = w.creator;
    let out = w.engine.approve(q1, w.engine.observe(q1).unwrap(), &creator, None).unwrap();
    assert_eq!(out.next_destination, Destination::Explainer);
    assert_eq!(out.history_entry.action, HistoryAction::Approved);
    assert_eq!(w.engine.history(q1).unwrap().len(), 2);
}

#[test]
fn scenario_b_variants_route_to_explainer() {
    let mut w = World::new();
    let q1 = w.submit("Q1");
    let (creator, explainer) = (w.creator, w.explainer);
    let outs = w.engine
                .create_variants(&creator, q1, w.engine.observe(q1).unwrap(), vec![draft("V1"), draft("V2")])
                .unwrap();
    assert_eq!(outs.len(), 3);
    assert_eq!(outs[0].question_id, q1);

    for out in &outs[1..] {
        let v = w.engine.question(out.question_id).unwrap();
        assert!(v.is_variant);
        assert_eq!(v.original_question_id, Some(q1));
        assert_eq!(w.engine.get_next_destination(v.id).unwrap(), Destination::Explainer);
        let approved = w.engine
                        .approve(v.id, w.engine.observe(v.id).unwrap(), &creator, Some(explainer.id))
                        .unwrap();
        assert_eq!(approved.next_destination, Destination::Explainer);
        assert_eq!(w.engine.question(v.id).unwrap().assigned_explainer_id, Some(explainer.id));
    }
}

#[test]
fn scenario_c_rejected_explainer_flag_returns_to_explainer() {
    let mut w = World::new();
    let q1 = w.submit("Q1");
    let (creator, explainer, processor) = (w.creator, w.explainer, w.processor);
    w.engine.approve(q1, w.engine.observe(q1).unwrap(), &creator, None).unwrap();

    w.engine
     .raise_flag(q1, w.engine.observe(q1).unwrap(), &explainer, "ambiguous wording")
     .unwrap();
    let q = w.engine.question(q1).unwrap();
    assert!(q.is_flagged);
    assert_eq!(q.flag_type, FlagType::Explainer);
    assert_eq!(q.flag_status, FlagStatus::Pending);

    let out = w.engine
               .reject_flag_reason(q1, w.engine.observe(q1).unwrap(), &processor, "wording is fine")
               .unwrap();
    assert_eq!(out.next_destination, Destination::Explainer);
    let q = w.engine.question(q1).unwrap();
    assert_eq!(q.flag_status, FlagStatus::Rejected);
    assert_eq!(q.flag_rejection_reason.as_deref(), Some("wording is fine"));
}

#[test]
fn scenario_d_accepted_gatherer_rejection_completes_question() {
    let mut w = World::new();
    let q2 = w.submit("Q2");
    let (creator, gatherer, processor) = (w.creator, w.gatherer, w.processor);
    w.engine.raise_flag(q2, w.engine.observe(q2).unwrap(), &creator, "typo").unwrap();
    w.engine
     .gatherer_reject_flag(q2, w.engine.observe(q2).unwrap(), &gatherer, "already fixed")
     .unwrap();
    let q = w.engine.question(q2).unwrap();
    assert_eq!(q.flag_rejection_reason.as_deref(), Some("already fixed"));
    assert!(w.engine.availability(q2).unwrap().gatherer_rejected_flag);

    let out = w.engine
               .accept_gatherer_rejection(q2, w.engine.observe(q2).unwrap(), &processor)
               .unwrap();
    assert_eq!(out.status.as_str(), "completed");
    let q = w.engine.question(q2).unwrap();
    assert!(!q.is_flagged);
    assert_eq!(q.flag_status, FlagStatus::None);
}

#[test]
fn scenario_e_student_flag_approved_by_admin_routes_by_lineage() {
    let mut w = World::new();
    let (student, admin) = (w.student, w.admin);

    let q3 = w.completed("Q3");
    w.engine.raise_flag(q3, w.engine.observe(q3).unwrap(), &student, "answer wrong").unwrap();
    let out = w.engine.approve_flag_reason(q3, w.engine.observe(q3).unwrap(), &admin).unwrap();
    assert_eq!(out.next_destination, Destination::Gatherer);
    assert_eq!(w.engine.question(q3).unwrap().flag_status, FlagStatus::Approved);

    let q4 = w.submit("Q4");
    let creator = w.creator;
    w.engine
     .create_variants(&creator, q4, w.engine.observe(q4).unwrap(), vec![draft("V")])
     .unwrap();
    let (c, e, p) = (w.creator, w.explainer, w.processor);
    w.engine.approve(q4, w.engine.observe(q4).unwrap(), &c, Some(e.id)).unwrap();
    w.engine.submit_explanation(q4, w.engine.observe(q4).unwrap(), &e, "porque A").unwrap();
    w.engine.approve(q4, w.engine.observe(q4).unwrap(), &p, None).unwrap();
    w.engine.raise_flag(q4, w.engine.observe(q4).unwrap(), &student, "answer wrong").unwrap();
    let out = w.engine.approve_flag_reason(q4, w.engine.observe(q4).unwrap(), &admin).unwrap();
    assert_eq!(out.next_destination, Destination::Creator);
    assert_eq!(w.engine.question(q4).unwrap().flag_status, FlagStatus::Approved);
}
