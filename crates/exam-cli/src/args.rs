//! Parseo mínimo de argumentos: `exam-cli <comando> --question <UUID> --actor
//! <UUID> --role <ROL> [--reason <TXT>] [--text <TXT>] [--user <UUID>]
//! [--as <ROL>]`.
use exam_domain::Role;
use uuid::Uuid;

pub const USAGE: &str = "Uso: exam-cli <show|approve|reject|flag|approve-flag|reject-flag|gatherer-reject|\
                         accept-gatherer|reject-gatherer|explain|resubmit|assign> --question <UUID> \
                         [--actor <UUID> --role <ROL>] [--reason <TXT>] [--text <TXT>] [--user <UUID>] [--as <ROL>]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Show,
    Approve,
    Reject,
    Flag,
    ApproveFlag,
    RejectFlag,
    GathererReject,
    AcceptGatherer,
    RejectGatherer,
    Explain,
    Resubmit,
    Assign,
}

impl Command {
    fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "show" => Command::Show,
            "approve" => Command::Approve,
            "reject" => Command::Reject,
            "flag" => Command::Flag,
            "approve-flag" => Command::ApproveFlag,
            "reject-flag" => Command::RejectFlag,
            "gatherer-reject" => Command::GathererReject,
            "accept-gatherer" => Command::AcceptGatherer,
            "reject-gatherer" => Command::RejectGatherer,
            "explain" => Command::Explain,
            "resubmit" => Command::Resubmit,
            "assign" => Command::Assign,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub command: Command,
    pub question: Uuid,
    pub actor: Option<Uuid>,
    pub role: Option<Role>,
    pub reason: Option<String>,
    pub text: Option<String>,
    pub user: Option<Uuid>,
    pub assign_as: Option<Role>,
}

pub fn parse(args: &[String]) -> Result<CliArgs, String> {
    let command = args.get(1)
                      .and_then(|c| Command::parse(c))
                      .ok_or_else(|| USAGE.to_string())?;
    let mut question = None;
    let mut actor = None;
    let mut role = None;
    let mut reason = None;
    let mut text = None;
    let mut user = None;
    let mut assign_as = None;
    let mut i = 2;
    while i < args.len() {
        let value = args.get(i + 1).cloned();
        match args[i].as_str() {
            "--question" => question = value.as_deref().and_then(|v| Uuid::parse_str(v).ok()),
            "--actor" => actor = value.as_deref().and_then(|v| Uuid::parse_str(v).ok()),
            "--role" => role = value.as_deref().and_then(|v| v.parse().ok()),
            "--reason" => reason = value,
            "--text" => text = value,
            "--user" => user = value.as_deref().and_then(|v| Uuid::parse_str(v).ok()),
            "--as" => assign_as = value.as_deref().and_then(|v| v.parse().ok()),
            other => return Err(format!("argumento desconocido: {other}\n{USAGE}")),
        }
        i += 2;
    }
    let question = question.ok_or_else(|| format!("--question <UUID> requerido\n{USAGE}"))?;
    if command != Command::Show && (actor.is_none() || role.is_none()) {
        return Err(format!("--actor <UUID> y --role <ROL> requeridos\n{USAGE}"));
    }
    Ok(CliArgs { command,
                 question,
                 actor,
                 role,
                 reason,
                 text,
                 user,
                 assign_as })
}
