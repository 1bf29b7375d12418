mod args;

use args::{CliArgs, Command};
use exam_core::{classify_error, Action, Actor, ErrorClass, WorkflowEngine, WorkflowError};
use exam_persistence::{PgQuestionStore, PgUserDirectory, PoolProvider};
use tracing_subscriber::EnvFilter;

fn required(value: Option<String>, flag: &str) -> String {
    value.unwrap_or_else(|| {
             eprintln!("[exam-cli] {flag} requerido\n{}", args::USAGE);
             std::process::exit(2);
         })
}

fn action_for(cli: &CliArgs) -> Option<Action> {
    let action = match cli.command {
        Command::Approve => Action::Approve { assigned_user_id: cli.user },
        Command::Reject => Action::Reject { reason: required(cli.reason.clone(), "--reason") },
        Command::Flag => Action::RaiseFlag { reason: required(cli.reason.clone(), "--reason") },
        Command::ApproveFlag => Action::ApproveFlagReason,
        Command::RejectFlag => Action::RejectFlagReason { reason: required(cli.reason.clone(), "--reason") },
        Command::GathererReject => Action::GathererRejectFlag { reason: required(cli.reason.clone(), "--reason") },
        Command::AcceptGatherer => Action::AcceptGathererRejection,
        Command::RejectGatherer => Action::RejectGathererRejection { reason: required(cli.reason.clone(), "--reason") },
        Command::Explain => Action::SubmitExplanation { text: required(cli.text.clone(), "--text") },
        Command::Resubmit => Action::ResubmitCorrection,
        Command::Assign => {
            let user_id = cli.user.unwrap_or_else(|| {
                                      eprintln!("[exam-cli] --user requerido\n{}", args::USAGE);
                                      std::process::exit(2);
                                  });
            Action::Assign { user_id,
                             role: cli.assign_as.unwrap_or(exam_domain::Role::Explainer) }
        }
        Command::Show => return None,
    };
    Some(action)
}

fn exit_code(e: &WorkflowError) -> i32 {
    match classify_error(e) {
        ErrorClass::Validation | ErrorClass::Permanent => 4,
        ErrorClass::Transient => 3,
        ErrorClass::Runtime => 5,
    }
}

fn main() {
    // Cargar .env si existe para obtener DATABASE_URL
    let _ = dotenvy::dotenv();
    let _ = tracing_subscriber::fmt().with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                                                          EnvFilter::new("warn")
                                                      }))
                                     .try_init();

    let argv: Vec<String> = std::env::args().collect();
    let cli = match args::parse(&argv) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
    };
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("[exam-cli] requiere DATABASE_URL para operar contra backend persistente");
        std::process::exit(4);
    }
    let pool = match exam_persistence::build_dev_pool_from_env() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("[exam-cli] pool error: {e}");
            std::process::exit(5);
        }
    };
    let store = PgQuestionStore::new(PoolProvider { pool: pool.clone() });
    let directory = PgUserDirectory::new(PoolProvider { pool });
    let config = exam_core::WorkflowConfig::from_env();
    let mut engine = WorkflowEngine::builder(store, directory).with_config(config).build();

    if cli.command == Command::Show {
        let shown = engine.snapshot(cli.question).and_then(|snap| {
                                                     let availability = engine.availability(cli.question)?;
                                                     let queue = engine.current_queue(cli.question)?;
                                                     let assignee = match cli.user {
                                                         Some(user) => {
                                                             let role = cli.assign_as.unwrap_or(exam_domain::Role::Explainer);
                                                             Some(engine.preview_assignee(user, role)?)
                                                         }
                                                         None => None,
                                                     };
                                                     Ok(serde_json::json!({
                                                         "question": snap.question,
                                                         "history": snap.history,
                                                         "variants": snap.variant_ids,
                                                         "queue": queue,
                                                         "availability": availability,
                                                         "assignee_preview": assignee,
                                                         "policy": engine.policy().to_json(),
                                                     }))
                                                 });
        match shown {
            Ok(v) => {
                println!("{}", serde_json::to_string_pretty(&v).unwrap_or_default());
                std::process::exit(0);
            }
            Err(e) => {
                eprintln!("error: {e}");
                std::process::exit(exit_code(&e));
            }
        }
    }

    let (Some(actor_id), Some(role)) = (cli.actor, cli.role) else {
        eprintln!("{}", args::USAGE);
        std::process::exit(2);
    };
    let actor = Actor::new(actor_id, role);
    let Some(action) = action_for(&cli) else {
        eprintln!("{}", args::USAGE);
        std::process::exit(2);
    };
    // el CLI actúa sobre el estado recién leído
    let result = engine.observe(cli.question)
                       .and_then(|observed| engine.apply(cli.question, observed, &actor, action));
    match result {
        Ok(out) => {
            println!("{} -> status={} cola={} (seq {})",
                     out.question_id, out.status, out.next_destination, out.history_entry.seq);
            for n in engine.drain_notifications() {
                log::info!("notificación para {}: {} sobre {}", n.recipient, n.kind, n.question_id);
            }
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("rechazado: {e}");
            std::process::exit(exit_code(&e));
        }
    }
}
