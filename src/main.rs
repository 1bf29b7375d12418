//! Demo en memoria del workflow de revisión: recorre los escenarios
//! principales (aprobación, variantes, flags) e imprime el historial.
use exam_core::{Actor, CommandOutcome, InMemoryQuestionStore, InMemoryUserDirectory, WorkflowEngine, WorkflowError};
use exam_domain::{Question, QuestionType, Role, UserAccount, VariantDraft};
use examflow_rust::{init_logging, CONFIG};
use log::info;
use uuid::Uuid;

type Engine = WorkflowEngine<InMemoryQuestionStore, InMemoryUserDirectory>;

struct Cast {
    gatherer: Actor,
    creator: Actor,
    explainer: Actor,
    processor: Actor,
    admin: Actor,
    student: Actor,
}

fn cast(engine: &mut Engine) -> Cast {
    let mut actor = |role: Role| Actor::new(engine.directory_mut().insert(UserAccount::new(role)), role);
    Cast { gatherer: actor(Role::Gatherer),
           creator: actor(Role::Creator),
           explainer: actor(Role::Explainer),
           processor: actor(Role::Processor),
           admin: actor(Role::Admin),
           student: actor(Role::Student) }
}

fn report(label: &str, out: &CommandOutcome) {
    println!("[{label}] {} status={} cola={} ({})",
             out.question_id, out.status, out.next_destination, out.history_entry.action);
}

fn submit(engine: &mut Engine, who: &Cast, text: &str) -> Result<Uuid, WorkflowError> {
    let q = Question::new(text, QuestionType::Mcq, vec!["A".into(), "B".into()], "A", who.gatherer.id)?;
    let out = engine.submit_question(&who.gatherer, q, false)?;
    report("submit", &out);
    Ok(out.question_id)
}

fn run() -> Result<(), WorkflowError> {
    let mut engine = WorkflowEngine::new().with_config(CONFIG.workflow.clone()).build();
    let who = cast(&mut engine);

    // A: aprobación directa del creator
    let q1 = submit(&mut engine, &who, "¿Cuánto es 2 + 2?")?;
    report("A", &engine.approve(q1, engine.observe(q1)?, &who.creator, None)?);

    // B: variantes
    let original = submit(&mut engine, &who, "Capital de Francia")?;
    let drafts = vec![VariantDraft { question_text: "Capital de Italia".into(),
                                     options: vec!["Roma".into(), "Milán".into()],
                                     correct_answer: "Roma".into() },
                      VariantDraft { question_text: "Capital de España".into(),
                                     options: vec!["Madrid".into(), "Sevilla".into()],
                                     correct_answer: "Madrid".into() }];
    let outs = engine.create_variants(&who.creator, original, engine.observe(original)?, drafts)?;
    for out in outs.iter().skip(1) {
        let v = out.question_id;
        report("B", &engine.approve(v, engine.observe(v)?, &who.creator, Some(who.explainer.id))?);
    }

    // C: flag del explainer rechazado por el processor
    report("C", &engine.raise_flag(q1, engine.observe(q1)?, &who.explainer, "ambiguous wording")?);
    report("C", &engine.reject_flag_reason(q1, engine.observe(q1)?, &who.processor, "wording is fine")?);

    // D: el gatherer rechaza el flag del creator
    let q2 = submit(&mut engine, &who, "El agua hierve a 100C")?;
    engine.raise_flag(q2, engine.observe(q2)?, &who.creator, "unidades")?;
    report("D", &engine.gatherer_reject_flag(q2, engine.observe(q2)?, &who.gatherer, "already fixed")?);
    report("D", &engine.accept_gatherer_rejection(q2, engine.observe(q2)?, &who.processor)?);

    // E: flag de estudiante sobre una pregunta publicada
    report("E", &engine.submit_explanation(q1, engine.observe(q1)?, &who.explainer, "2 + 2 = 4")?);
    report("E", &engine.approve(q1, engine.observe(q1)?, &who.processor, None)?);
    report("E", &engine.raise_flag(q1, engine.observe(q1)?, &who.student, "answer wrong")?);
    report("E", &engine.approve_flag_reason(q1, engine.observe(q1)?, &who.admin)?);

    for entry in engine.history(q1)? {
        println!("  #{} {} {} {}", entry.seq, entry.role, entry.action, entry.note.as_deref().unwrap_or(""));
    }
    info!("{} notificaciones pendientes", engine.drain_notifications().len());
    Ok(())
}

fn main() {
    init_logging();
    if let Err(e) = run() {
        eprintln!("demo falló: {e}");
        std::process::exit(1);
    }
}
