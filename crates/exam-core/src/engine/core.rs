//! Implementación del `WorkflowEngine`.

use exam_domain::{FlagStatus, Question, QuestionEdit, QuestionStatus, Role, UserAccount, VariantDraft};
use exam_policies::WorkflowPolicy;
use log::{debug, info, warn};
use uuid::Uuid;

use super::availability::Availability;
use super::plan::{plan, require_role};
use super::{Action, ActionKind, Actor, CommandOutcome, EngineBuilderInit};
use crate::assignment::{AssignmentResolver, InMemoryUserDirectory, UserDirectory};
use crate::drafts::{DraftStore, ExplanationDraft};
use crate::errors::WorkflowError;
use crate::history::{HistoryAction, HistoryEntry, NewHistoryEntry};
use crate::notify::{Notification, Outbox};
use crate::repo::{InMemoryQuestionStore, Observed, PendingWrite, QuestionStore, Snapshot};
use crate::routing::{self, Destination};

/// Motor del workflow de revisión.
///
/// Cada comando es un read-modify-write atómico: lee el snapshot, planifica
/// la transición, valida la asignación contra el directorio y confirma la
/// pregunta junto con exactamente una entrada de historial por pregunta
/// tocada. El `Observed` del actor se compara al inicio y otra vez en el
/// commit.
#[derive(Debug)]
pub struct WorkflowEngine<S, D>
    where S: QuestionStore,
          D: UserDirectory
{
    store: S,
    resolver: AssignmentResolver<D>,
    policy: WorkflowPolicy,
    drafts: DraftStore,
    outbox: Outbox,
}

impl WorkflowEngine<InMemoryQuestionStore, InMemoryUserDirectory> {
    /// Builder con store y directorio en memoria.
    #[inline]
    pub fn new() -> EngineBuilderInit<InMemoryQuestionStore, InMemoryUserDirectory> {
        EngineBuilderInit { store: InMemoryQuestionStore::new(),
                            directory: InMemoryUserDirectory::default() }
    }
}

impl<S, D> WorkflowEngine<S, D>
    where S: QuestionStore,
          D: UserDirectory
{
    #[inline]
    pub fn builder(store: S, directory: D) -> EngineBuilderInit<S, D> {
        EngineBuilderInit { store, directory }
    }

    pub fn new_with_parts(store: S, resolver: AssignmentResolver<D>, policy: WorkflowPolicy, drafts: DraftStore) -> Self {
        Self { store,
               resolver,
               policy,
               drafts,
               outbox: Outbox::default() }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn policy(&self) -> &WorkflowPolicy {
        &self.policy
    }

    /// Vista previa de un candidato a asignación (puede venir de la cache).
    pub fn preview_assignee(&self, user_id: Uuid, role: Role) -> Result<UserAccount, WorkflowError> {
        self.resolver.preview(user_id, role)
    }

    pub fn directory_mut(&mut self) -> &mut D {
        self.resolver.directory_mut()
    }

    pub fn question(&self, id: Uuid) -> Result<Question, WorkflowError> {
        self.store.load(id)
    }

    pub fn history(&self, id: Uuid) -> Result<Vec<HistoryEntry>, WorkflowError> {
        self.store.history(id)
    }

    pub fn snapshot(&self, id: Uuid) -> Result<Snapshot, WorkflowError> {
        self.store.snapshot(id)
    }

    /// `Observed` actual de la pregunta, para clientes que no guardan el suyo.
    pub fn observe(&self, id: Uuid) -> Result<Observed, WorkflowError> {
        Ok(Observed::of(&self.store.load(id)?))
    }

    pub fn get_next_destination(&self, id: Uuid) -> Result<Destination, WorkflowError> {
        Ok(routing::next_destination(&self.snapshot(id)?))
    }

    pub fn current_queue(&self, id: Uuid) -> Result<Destination, WorkflowError> {
        Ok(routing::current_queue(&self.snapshot(id)?))
    }

    pub fn availability(&self, id: Uuid) -> Result<Availability, WorkflowError> {
        Ok(Availability::of(&self.snapshot(id)?))
    }

    /// Acciones que `actor` puede ejecutar ahora sobre la pregunta. Usa la
    /// misma planificación que `apply`; un error de validación de payload no
    /// descarta la acción.
    pub fn available_actions(&self, id: Uuid, actor: &Actor) -> Result<Vec<ActionKind>, WorkflowError> {
        let snap = self.snapshot(id)?;
        Ok(ActionKind::ALL.into_iter()
                          .filter(|kind| match plan(&snap, actor, &kind.probe(), &self.policy) {
                              Ok(_) | Err(WorkflowError::Validation(_)) => true,
                              Err(_) => false,
                          })
                          .collect())
    }

    /// Alta de una pregunta original por un gatherer (o admin).
    pub fn submit_question(&mut self,
                           actor: &Actor,
                           mut question: Question,
                           bypass_creator: bool)
                           -> Result<CommandOutcome, WorkflowError> {
        require_role(actor, &[Role::Gatherer, Role::Admin])?;
        if question.is_variant {
            return Err(WorkflowError::Validation("las variantes se crean con create_variants".into()));
        }
        question.validate_content()?;
        question.created_by = actor.id;
        question.clear_flag();
        question.explanation = None;
        question.assigned_creator_id = None;
        question.assigned_explainer_id = None;
        question.approved_by_id = None;
        question.original_question_id = None;
        question.variant_number = None;
        question.status = if bypass_creator {
            QuestionStatus::PendingProcessor
        } else {
            QuestionStatus::PendingCreator
        };
        question.touch(actor.id);
        let dest = if bypass_creator { Destination::Processor } else { Destination::Creator };
        let id = question.id;
        let status = question.status;
        let entry = self.store
                        .insert(question, NewHistoryEntry::new(actor.role, HistoryAction::Created, actor.id))?;
        info!("pregunta {id} creada por {} -> {dest}", actor.role);
        Ok(self.finish(id, status, dest, entry))
    }

    /// Genera variantes de una pregunta original en la etapa creator.
    ///
    /// Registra una entrada `variant_created` en el original y una `created`
    /// en cada variante, todo en un único lote. El primer resultado es el del
    /// original.
    pub fn create_variants(&mut self,
                           actor: &Actor,
                           original_id: Uuid,
                           observed: Observed,
                           drafts: Vec<VariantDraft>)
                           -> Result<Vec<CommandOutcome>, WorkflowError> {
        require_role(actor, &[Role::Creator, Role::Admin])?;
        if drafts.is_empty() {
            return Err(WorkflowError::Validation("se requiere al menos una variante".into()));
        }
        let snap = self.snapshot(original_id)?;
        let original = &snap.question;
        if !observed.matches(original) {
            return Err(WorkflowError::Conflict(original_id));
        }
        if original.is_variant {
            return Err(WorkflowError::Validation(format!("la pregunta {original_id} ya es una variante")));
        }
        if original.status != QuestionStatus::PendingCreator {
            return Err(WorkflowError::InvalidTransition(format!("sólo se generan variantes en pending_creator (actual: {})",
                                                                original.status)));
        }
        if original.is_flagged && original.flag_status == FlagStatus::Pending {
            return Err(WorkflowError::InvalidTransition(format!("la pregunta {original_id} tiene un flag pendiente")));
        }

        let first_number = self.store
                               .variants_of(original_id)?
                               .iter()
                               .filter_map(|v| v.variant_number)
                               .max()
                               .unwrap_or(0)
                           + 1;
        let mut writes = Vec::with_capacity(drafts.len() + 1);
        let mut updated = original.clone();
        updated.touch(actor.id);
        writes.push(PendingWrite { expected: Some(observed),
                                   question: updated,
                                   entry: NewHistoryEntry::new(actor.role, HistoryAction::VariantCreated, actor.id)
                                       .with_note(format!("{} variantes", drafts.len())) });
        for (offset, draft) in drafts.into_iter().enumerate() {
            let variant = Question::new_variant(original, first_number + offset as u32, draft, actor.id)?;
            writes.push(PendingWrite { expected: None,
                                       question: variant,
                                       entry: NewHistoryEntry::new(actor.role, HistoryAction::Created, actor.id) });
        }

        let touched: Vec<(Uuid, QuestionStatus)> = writes.iter().map(|w| (w.question.id, w.question.status)).collect();
        let entries = self.store.apply_writes(writes)?;
        info!("{} variantes creadas para {original_id}", entries.len() - 1);
        Ok(touched.into_iter()
                  .zip(entries)
                  .map(|((id, status), entry)| self.finish(id, status, Destination::Creator, entry))
                  .collect())
    }

    /// Punto de entrada único de los comandos sobre preguntas existentes.
    pub fn apply(&mut self,
                 question_id: Uuid,
                 observed: Observed,
                 actor: &Actor,
                 action: Action)
                 -> Result<CommandOutcome, WorkflowError> {
        let kind = action.kind();
        debug!("{} sobre {question_id} por {} ({})", kind.as_str(), actor.id, actor.role);
        let snap = self.snapshot(question_id)?;
        if !observed.matches(&snap.question) {
            warn!("{} sobre {question_id}: estado observado desactualizado", kind.as_str());
            return Err(WorkflowError::Conflict(question_id));
        }
        let mut transition = plan(&snap, actor, &action, &self.policy).map_err(|e| {
                                                                         warn!("{} rechazado sobre {question_id}: {e}",
                                                                               kind.as_str());
                                                                         e
                                                                     })?;
        if let Some(req) = transition.assignment {
            self.resolver.assign(&mut transition.question, req.user_id, req.role)?;
        }
        if !transition.question.flag_invariant_holds() {
            return Err(WorkflowError::Internal(format!("flag_status sin is_flagged en {question_id}")));
        }

        let status = transition.question.status;
        let dest = transition.next_destination;
        let entry = self.store.commit(observed, transition.question, transition.entry)?;
        if kind == ActionKind::SubmitExplanation {
            self.drafts.discard(question_id);
        }
        info!("{question_id}: {} -> {status} (cola {dest})", kind.as_str());
        Ok(self.finish(question_id, status, dest, entry))
    }

    fn finish(&mut self,
              question_id: Uuid,
              status: QuestionStatus,
              next_destination: Destination,
              history_entry: HistoryEntry)
              -> CommandOutcome {
        self.outbox.push(Notification { recipient: next_destination,
                                        question_id,
                                        kind: history_entry.action,
                                        note: history_entry.note.clone() });
        CommandOutcome { question_id,
                         status,
                         next_destination,
                         history_entry }
    }

    pub fn approve(&mut self,
                   id: Uuid,
                   observed: Observed,
                   actor: &Actor,
                   assigned_user_id: Option<Uuid>)
                   -> Result<CommandOutcome, WorkflowError> {
        self.apply(id, observed, actor, Action::Approve { assigned_user_id })
    }

    pub fn reject(&mut self, id: Uuid, observed: Observed, actor: &Actor, reason: &str) -> Result<CommandOutcome, WorkflowError> {
        self.apply(id, observed, actor, Action::Reject { reason: reason.to_string() })
    }

    pub fn submit_explanation(&mut self,
                              id: Uuid,
                              observed: Observed,
                              actor: &Actor,
                              text: &str)
                              -> Result<CommandOutcome, WorkflowError> {
        self.apply(id, observed, actor, Action::SubmitExplanation { text: text.to_string() })
    }

    pub fn raise_flag(&mut self,
                      id: Uuid,
                      observed: Observed,
                      actor: &Actor,
                      reason: &str)
                      -> Result<CommandOutcome, WorkflowError> {
        self.apply(id, observed, actor, Action::RaiseFlag { reason: reason.to_string() })
    }

    pub fn approve_flag_reason(&mut self, id: Uuid, observed: Observed, actor: &Actor) -> Result<CommandOutcome, WorkflowError> {
        self.apply(id, observed, actor, Action::ApproveFlagReason)
    }

    pub fn reject_flag_reason(&mut self,
                              id: Uuid,
                              observed: Observed,
                              actor: &Actor,
                              reason: &str)
                              -> Result<CommandOutcome, WorkflowError> {
        self.apply(id, observed, actor, Action::RejectFlagReason { reason: reason.to_string() })
    }

    pub fn gatherer_reject_flag(&mut self,
                                id: Uuid,
                                observed: Observed,
                                actor: &Actor,
                                reason: &str)
                                -> Result<CommandOutcome, WorkflowError> {
        self.apply(id, observed, actor, Action::GathererRejectFlag { reason: reason.to_string() })
    }

    pub fn accept_gatherer_rejection(&mut self,
                                     id: Uuid,
                                     observed: Observed,
                                     actor: &Actor)
                                     -> Result<CommandOutcome, WorkflowError> {
        self.apply(id, observed, actor, Action::AcceptGathererRejection)
    }

    pub fn reject_gatherer_rejection(&mut self,
                                     id: Uuid,
                                     observed: Observed,
                                     actor: &Actor,
                                     reason: &str)
                                     -> Result<CommandOutcome, WorkflowError> {
        self.apply(id, observed, actor, Action::RejectGathererRejection { reason: reason.to_string() })
    }

    pub fn resubmit_correction(&mut self, id: Uuid, observed: Observed, actor: &Actor) -> Result<CommandOutcome, WorkflowError> {
        self.apply(id, observed, actor, Action::ResubmitCorrection)
    }

    pub fn update_question(&mut self,
                           id: Uuid,
                           observed: Observed,
                           actor: &Actor,
                           edit: QuestionEdit)
                           -> Result<CommandOutcome, WorkflowError> {
        self.apply(id, observed, actor, Action::Update { edit })
    }

    pub fn assign(&mut self,
                  id: Uuid,
                  observed: Observed,
                  actor: &Actor,
                  user_id: Uuid,
                  role: Role)
                  -> Result<CommandOutcome, WorkflowError> {
        self.apply(id, observed, actor, Action::Assign { user_id, role })
    }

    // --- borradores de explicación ---

    pub fn save_draft(&self, id: Uuid, actor: &Actor, text: &str) -> Result<ExplanationDraft, WorkflowError> {
        require_role(actor, &[Role::Explainer, Role::Admin])?;
        let q = self.store.load(id)?;
        if q.status != QuestionStatus::PendingExplainer {
            return Err(WorkflowError::InvalidTransition(format!("la pregunta {id} no espera explicación")));
        }
        self.drafts.save(id, actor.id, text)
    }

    pub fn draft(&self, id: Uuid) -> Option<ExplanationDraft> {
        self.drafts.get(id)
    }

    pub fn discard_draft(&self, id: Uuid) -> bool {
        self.drafts.discard(id)
    }

    /// Envía el borrador vigente como explicación.
    pub fn submit_draft_explanation(&mut self,
                                    id: Uuid,
                                    observed: Observed,
                                    actor: &Actor)
                                    -> Result<CommandOutcome, WorkflowError> {
        let draft = self.drafts
                        .get(id)
                        .ok_or_else(|| WorkflowError::NotFound(format!("draft for question {id}")))?;
        self.submit_explanation(id, observed, actor, &draft.text)
    }

    pub fn purge_expired_drafts(&self) -> usize {
        let purged = self.drafts.purge_expired();
        if purged > 0 {
            debug!("{purged} borradores vencidos eliminados");
        }
        purged
    }

    /// Entrega (y vacía) las notificaciones acumuladas.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.outbox.drain()
    }
}
