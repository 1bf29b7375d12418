use exam_domain::{DomainError, FlagStatus, Question, QuestionEdit, QuestionStatus, QuestionType, Role, UserAccount,
                  VariantDraft};
use uuid::Uuid;

fn mcq(text: &str) -> Question {
    Question::new(text,
                  QuestionType::Mcq,
                  vec!["A".into(), "B".into(), "C".into()],
                  "B",
                  Uuid::new_v4()).unwrap()
}

#[test]
fn new_question_starts_pending_creator_without_flag() {
    let q = mcq("2 + 2 = ?");
    assert_eq!(q.status, QuestionStatus::PendingCreator);
    assert!(!q.is_flagged);
    assert_eq!(q.flag_status, FlagStatus::None);
    assert!(!q.is_variant);
    assert!(q.flag_invariant_holds());
}

#[test]
fn true_false_defaults_options() {
    let q = Question::new("El agua hierve a 100C", QuestionType::TrueFalse, vec![], "true", Uuid::new_v4()).unwrap();
    assert_eq!(q.options, vec!["True".to_string(), "False".to_string()]);
}

#[test]
fn mcq_rejects_answer_outside_options() {
    let err = Question::new("x", QuestionType::Mcq, vec!["A".into(), "B".into()], "Z", Uuid::new_v4()).unwrap_err();
    assert!(matches!(err, DomainError::ValidationError(_)));
}

#[test]
fn mcq_rejects_duplicate_options() {
    let res = Question::new("x", QuestionType::Mcq, vec!["A".into(), "a".into()], "A", Uuid::new_v4());
    assert!(res.is_err());
}

#[test]
fn empty_text_is_rejected() {
    let res = Question::new("   ", QuestionType::Mcq, vec!["A".into(), "B".into()], "A", Uuid::new_v4());
    assert!(res.is_err());
}

#[test]
fn variant_inherits_subject_and_points_to_original() {
    let subject = Uuid::new_v4();
    let topic = Uuid::new_v4();
    let original = mcq("capital de Francia").with_subject(subject, Some(topic));
    let creator = Uuid::new_v4();
    let draft = VariantDraft { question_text: "capital de Italia".into(),
                               options: vec!["Roma".into(), "Milán".into()],
                               correct_answer: "Roma".into() };
    let v = Question::new_variant(&original, 1, draft, creator).unwrap();
    assert!(v.is_variant);
    assert_eq!(v.original_question_id, Some(original.id));
    assert_eq!(v.variant_number, Some(1));
    assert_eq!(v.subject_id, Some(subject));
    assert_eq!(v.topic_id, Some(topic));
    assert_eq!(v.created_by, creator);
}

#[test]
fn variant_of_variant_is_rejected() {
    let original = mcq("q");
    let draft = VariantDraft { question_text: "v".into(),
                               options: vec!["A".into(), "B".into()],
                               correct_answer: "A".into() };
    let v = Question::new_variant(&original, 1, draft.clone(), Uuid::new_v4()).unwrap();
    assert!(Question::new_variant(&v, 1, draft, Uuid::new_v4()).is_err());
}

#[test]
fn apply_edit_revalidates_content() {
    let mut q = mcq("q");
    let bad = QuestionEdit { correct_answer: Some("Z".into()),
                             ..Default::default() };
    assert!(q.apply_edit(&bad).is_err());

    let mut q2 = mcq("q");
    let good = QuestionEdit { question_text: Some("q editada".into()),
                              explanation: Some("porque sí".into()),
                              ..Default::default() };
    q2.apply_edit(&good).unwrap();
    assert_eq!(q2.question_text, "q editada");
    assert!(q2.has_explanation());
}

#[test]
fn blank_explanation_edit_clears_explanation() {
    let mut q = mcq("q");
    q.explanation = Some("vieja".into());
    q.apply_edit(&QuestionEdit { explanation: Some("  ".into()),
                                 ..Default::default() })
     .unwrap();
    assert!(!q.has_explanation());
}

#[test]
fn role_parsing_and_display() {
    assert_eq!("Explainer".parse::<Role>().unwrap(), Role::Explainer);
    assert_eq!(Role::Gatherer.to_string(), "gatherer");
    assert!("janitor".parse::<Role>().is_err());
    assert!(Role::Admin.is_processor_like());
    assert!(!Role::Creator.is_processor_like());
}

#[test]
fn user_account_holds_admin_role() {
    let u = UserAccount::new(Role::Admin).with_admin_role(Role::Explainer);
    assert!(u.holds(Role::Explainer));
    assert!(u.holds(Role::Admin));
    assert!(!u.holds(Role::Creator));
}

#[test]
fn status_round_trips_through_str() {
    for s in [QuestionStatus::PendingCreator,
              QuestionStatus::PendingExplainer,
              QuestionStatus::PendingProcessor,
              QuestionStatus::Completed]
    {
        assert_eq!(s.as_str().parse::<QuestionStatus>().unwrap(), s);
    }
}

#[test]
fn serde_uses_wire_names() {
    let q = mcq("q");
    let v = serde_json::to_value(&q).unwrap();
    assert_eq!(v["status"], "pending_creator");
    assert_eq!(v["question_type"], "MCQ");
    assert_eq!(v["flag_status"], "none");
}
