mod common;

use common::Fixture;
use exam_core::{Destination, HistoryAction, WorkflowEngine, WorkflowError};
use exam_domain::{FlagStatus, FlagType, QuestionEdit, QuestionStatus, VariantDraft};
use exam_policies::ReflagPolicy;

fn fix_text() -> QuestionEdit {
    QuestionEdit { question_text: Some("enunciado corregido".into()),
                   ..Default::default() }
}

#[test]
fn explainer_flag_rejected_returns_to_explainer() {
    let mut fx = Fixture::new();
    let id = fx.to_explainer("q1");
    let (explainer, processor) = (fx.explainer, fx.processor);

    let out = fx.engine.raise_flag(id, fx.observed(id), &explainer, "ambiguous wording").unwrap();
    assert_eq!(out.next_destination, Destination::Processor);
    let q = fx.engine.question(id).unwrap();
    assert!(q.is_flagged);
    assert_eq!(q.flag_type, FlagType::Explainer);
    assert_eq!(q.flag_status, FlagStatus::Pending);
    assert_eq!(q.status, QuestionStatus::PendingExplainer);

    let out = fx.engine.reject_flag_reason(id, fx.observed(id), &processor, "wording is fine").unwrap();
    assert_eq!(out.next_destination, Destination::Explainer);
    assert_eq!(out.status, QuestionStatus::PendingExplainer);
    assert_eq!(fx.engine.question(id).unwrap().flag_status, FlagStatus::Rejected);

    // un flag rechazado no bloquea el pipeline
    let out = fx.engine.submit_explanation(id, fx.observed(id), &explainer, "explicación").unwrap();
    assert_eq!(out.status, QuestionStatus::PendingProcessor);
    assert!(!fx.engine.question(id).unwrap().is_flagged);
}

#[test]
fn second_flag_while_pending_is_invalid_state() {
    let mut fx = Fixture::new();
    let id = fx.to_explainer("q");
    let (explainer, creator) = (fx.explainer, fx.creator);
    fx.engine.raise_flag(id, fx.observed(id), &explainer, "uno").unwrap();
    assert!(matches!(fx.engine.raise_flag(id, fx.observed(id), &creator, "dos"),
                     Err(WorkflowError::InvalidState(_))));
    assert_eq!(fx.history_len(id), 3);
}

#[test]
fn empty_flag_reason_is_a_validation_error() {
    let mut fx = Fixture::new();
    let id = fx.to_explainer("q");
    let explainer = fx.explainer;
    assert!(matches!(fx.engine.raise_flag(id, fx.observed(id), &explainer, "   "),
                     Err(WorkflowError::Validation(_))));
}

#[test]
fn resolving_without_pending_flag_is_invalid_state() {
    let mut fx = Fixture::new();
    let id = fx.to_processor("q");
    let processor = fx.processor;
    assert!(matches!(fx.engine.approve_flag_reason(id, fx.observed(id), &processor),
                     Err(WorkflowError::InvalidState(_))));
    assert!(matches!(fx.engine.reject_flag_reason(id, fx.observed(id), &processor, "x"),
                     Err(WorkflowError::InvalidState(_))));
    assert!(matches!(fx.engine.accept_gatherer_rejection(id, fx.observed(id), &processor),
                     Err(WorkflowError::InvalidState(_))));
}

#[test]
fn students_only_flag_completed_questions() {
    let mut fx = Fixture::new();
    let id = fx.to_explainer("q");
    let student = fx.student;
    assert!(matches!(fx.engine.raise_flag(id, fx.observed(id), &student, "x"),
                     Err(WorkflowError::InvalidTransition(_))));
}

#[test]
fn gatherer_rejection_of_creator_flag_accepted_completes() {
    let mut fx = Fixture::new();
    let id = fx.submit("q2");
    let (creator, gatherer, processor) = (fx.creator, fx.gatherer, fx.processor);
    fx.engine.raise_flag(id, fx.observed(id), &creator, "opción B ambigua").unwrap();

    let out = fx.engine.gatherer_reject_flag(id, fx.observed(id), &gatherer, "already fixed").unwrap();
    assert_eq!(out.status, QuestionStatus::PendingProcessor);
    let av = fx.engine.availability(id).unwrap();
    assert!(av.gatherer_rejected_flag);
    assert!(av.can_process_question);

    // mientras tanto el flag no se resuelve por la vía normal
    assert!(matches!(fx.engine.approve_flag_reason(id, fx.observed(id), &processor),
                     Err(WorkflowError::InvalidTransition(_))));
    assert!(matches!(fx.engine.raise_flag(id, fx.observed(id), &creator, "otro"),
                     Err(WorkflowError::InvalidState(_))));

    let out = fx.engine.accept_gatherer_rejection(id, fx.observed(id), &processor).unwrap();
    assert_eq!(out.status, QuestionStatus::Completed);
    let q = fx.engine.question(id).unwrap();
    assert!(!q.is_flagged);
    assert_eq!(q.flag_status, FlagStatus::None);
    assert!(!fx.engine.availability(id).unwrap().gatherer_rejected_flag);
}

#[test]
fn only_the_authoring_gatherer_may_reject_a_flag() {
    let mut fx = Fixture::new();
    let id = fx.submit("q");
    let creator = fx.creator;
    fx.engine.raise_flag(id, fx.observed(id), &creator, "dudosa").unwrap();
    let other = exam_core::Actor::new(uuid::Uuid::new_v4(), exam_domain::Role::Gatherer);
    assert!(matches!(fx.engine.gatherer_reject_flag(id, fx.observed(id), &other, "no"),
                     Err(WorkflowError::RoleMismatch { .. })));
    let admin = fx.admin;
    assert!(fx.engine.gatherer_reject_flag(id, fx.observed(id), &admin, "no").is_ok());
}

#[test]
fn rejected_gatherer_rejection_goes_back_to_gatherer_for_correction() {
    let mut fx = Fixture::new();
    let id = fx.submit("q");
    let (creator, gatherer, processor) = (fx.creator, fx.gatherer, fx.processor);
    fx.engine.raise_flag(id, fx.observed(id), &creator, "texto confuso").unwrap();
    fx.engine.gatherer_reject_flag(id, fx.observed(id), &gatherer, "está claro").unwrap();

    let out = fx.engine
                .reject_gatherer_rejection(id, fx.observed(id), &processor, "no lo está")
                .unwrap();
    assert_eq!(out.next_destination, Destination::Gatherer);
    assert_eq!(out.history_entry.note.as_deref(), Some("no lo está"));
    let q = fx.engine.question(id).unwrap();
    assert_eq!(q.flag_status, FlagStatus::Approved);
    assert!(q.flag_rejection_reason.is_none());
    assert_eq!(fx.engine.current_queue(id).unwrap(), Destination::Gatherer);

    // reenviar sin editar no se permite
    assert!(matches!(fx.engine.resubmit_correction(id, fx.observed(id), &gatherer),
                     Err(WorkflowError::InvalidTransition(_))));
    fx.engine.update_question(id, fx.observed(id), &gatherer, fix_text()).unwrap();
    assert!(fx.engine.availability(id).unwrap().was_updated_after_flag);
    let out = fx.engine.resubmit_correction(id, fx.observed(id), &gatherer).unwrap();
    assert_eq!(out.next_destination, Destination::Creator);
    assert_eq!(out.status, QuestionStatus::PendingCreator);
    assert!(!fx.engine.question(id).unwrap().is_flagged);
}

#[test]
fn student_flag_on_original_goes_to_gatherer() {
    let mut fx = Fixture::new();
    let id = fx.to_completed("q3");
    let (student, admin, gatherer) = (fx.student, fx.admin, fx.gatherer);
    fx.engine.raise_flag(id, fx.observed(id), &student, "answer wrong").unwrap();
    let out = fx.engine.approve_flag_reason(id, fx.observed(id), &admin).unwrap();
    assert_eq!(out.next_destination, Destination::Gatherer);
    let q = fx.engine.question(id).unwrap();
    assert_eq!(q.flag_status, FlagStatus::Approved);
    assert!(q.is_flagged);
    assert_eq!(q.status, QuestionStatus::Completed);

    fx.engine.update_question(id, fx.observed(id), &gatherer, fix_text()).unwrap();
    let out = fx.engine.resubmit_correction(id, fx.observed(id), &gatherer).unwrap();
    assert_eq!(out.next_destination, Destination::Explainer);
    assert_eq!(out.history_entry.action, HistoryAction::CorrectionResubmitted);
}

#[test]
fn student_flag_on_variant_lineage_goes_to_creator() {
    let mut fx = Fixture::new();
    let id = fx.submit("original");
    let (creator, explainer, processor, student, admin) =
        (fx.creator, fx.explainer, fx.processor, fx.student, fx.admin);
    let outs = fx.engine
                 .create_variants(&creator,
                                  id,
                                  fx.observed(id),
                                  vec![VariantDraft { question_text: "v1".into(),
                                                      options: vec!["X".into(), "Y".into()],
                                                      correct_answer: "Y".into() }])
                 .unwrap();
    let v1 = outs[1].question_id;
    fx.engine.approve(v1, fx.observed(v1), &creator, Some(explainer.id)).unwrap();
    fx.engine.submit_explanation(v1, fx.observed(v1), &explainer, "porque Y").unwrap();
    fx.engine.approve(v1, fx.observed(v1), &processor, None).unwrap();

    fx.engine.raise_flag(v1, fx.observed(v1), &student, "answer wrong").unwrap();
    let out = fx.engine.approve_flag_reason(v1, fx.observed(v1), &admin).unwrap();
    assert_eq!(out.next_destination, Destination::Creator);
    assert_eq!(out.status, QuestionStatus::PendingCreator);
    assert_eq!(fx.engine.question(v1).unwrap().flag_status, FlagStatus::Approved);
}

#[test]
fn creator_flag_correction_returns_to_creator() {
    let mut fx = Fixture::new();
    let id = fx.to_explainer("q");
    let (creator, processor) = (fx.creator, fx.processor);
    fx.engine.raise_flag(id, fx.observed(id), &creator, "me equivoqué").unwrap();
    let out = fx.engine.approve_flag_reason(id, fx.observed(id), &processor).unwrap();
    assert_eq!(out.status, QuestionStatus::PendingCreator);

    // el pipeline normal queda bloqueado hasta la corrección
    assert!(matches!(fx.engine.approve(id, fx.observed(id), &creator, None),
                     Err(WorkflowError::InvalidTransition(_))));
    fx.engine.update_question(id, fx.observed(id), &creator, fix_text()).unwrap();
    assert_eq!(fx.engine.get_next_destination(id).unwrap(), Destination::Creator);
    let out = fx.engine.resubmit_correction(id, fx.observed(id), &creator).unwrap();
    assert_eq!(out.status, QuestionStatus::PendingCreator);
    let out = fx.engine.approve(id, fx.observed(id), &creator, None).unwrap();
    assert_eq!(out.next_destination, Destination::Explainer);
}

#[test]
fn approved_explainer_flag_is_corrected_by_new_explanation() {
    let mut fx = Fixture::new();
    let id = fx.to_explainer("q");
    let (explainer, processor) = (fx.explainer, fx.processor);
    fx.engine.raise_flag(id, fx.observed(id), &explainer, "falta dato").unwrap();
    fx.engine.approve_flag_reason(id, fx.observed(id), &processor).unwrap();
    let out = fx.engine.submit_explanation(id, fx.observed(id), &explainer, "con el dato").unwrap();
    assert_eq!(out.status, QuestionStatus::PendingProcessor);
    assert!(!fx.engine.question(id).unwrap().is_flagged);
}

#[test]
fn deny_policy_blocks_reflag_of_completed_question() {
    let engine = WorkflowEngine::new().with_config(Default::default())
                                      .reflag(ReflagPolicy::Deny)
                                      .build();
    let mut fx = Fixture::with_engine(engine);
    let id = fx.to_completed("q");
    let (student, processor) = (fx.student, fx.processor);
    fx.engine.raise_flag(id, fx.observed(id), &student, "uno").unwrap();
    fx.engine.reject_flag_reason(id, fx.observed(id), &processor, "no").unwrap();
    assert!(matches!(fx.engine.raise_flag(id, fx.observed(id), &student, "dos"),
                     Err(WorkflowError::InvalidTransition(_))));
}

#[test]
fn allow_policy_permits_reflag_after_rejection() {
    let mut fx = Fixture::new();
    let id = fx.to_completed("q");
    let (student, processor) = (fx.student, fx.processor);
    fx.engine.raise_flag(id, fx.observed(id), &student, "uno").unwrap();
    fx.engine.reject_flag_reason(id, fx.observed(id), &processor, "no").unwrap();
    let out = fx.engine.raise_flag(id, fx.observed(id), &student, "dos").unwrap();
    assert_eq!(out.history_entry.note.as_deref(), Some("dos"));
    assert_eq!(fx.engine.question(id).unwrap().flag_status, FlagStatus::Pending);
}

#[test]
fn only_the_correction_role_edit_enables_resubmission() {
    let mut fx = Fixture::new();
    let id = fx.submit("q");
    let (creator, gatherer, processor) = (fx.creator, fx.gatherer, fx.processor);
    fx.engine.raise_flag(id, fx.observed(id), &creator, "opción C incorrecta").unwrap();
    fx.engine.approve_flag_reason(id, fx.observed(id), &processor).unwrap();

    // el gatherer autor puede editar en pending_creator, pero no es quien corrige
    fx.engine.update_question(id, fx.observed(id), &gatherer, fix_text()).unwrap();
    assert!(!fx.engine.availability(id).unwrap().was_updated_after_flag);
    assert!(matches!(fx.engine.resubmit_correction(id, fx.observed(id), &creator),
                     Err(WorkflowError::InvalidTransition(_))));

    fx.engine.update_question(id, fx.observed(id), &creator, fix_text()).unwrap();
    assert!(fx.engine.availability(id).unwrap().was_updated_after_flag);
    fx.engine.resubmit_correction(id, fx.observed(id), &creator).unwrap();
    assert!(!fx.engine.availability(id).unwrap().was_updated_after_flag);
}
