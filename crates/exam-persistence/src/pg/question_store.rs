use chrono::{DateTime, Utc};
use diesel::prelude::*;
use log::{debug, error};
use serde_json::Value;
use uuid::Uuid;

use exam_core::{HistoryEntry, PendingWrite, QuestionStore, WorkflowError};
use exam_domain::Question;

use super::{with_retry, ConnectionProvider};
use crate::error::PersistenceError;
use crate::schema::{history_log, questions};

/// Fila para alta en `questions`. La pregunta completa viaja en `payload`;
/// las columnas sueltas existen para el compare-and-set y las consultas de
/// variantes.
#[derive(Insertable, Debug)]
#[diesel(table_name = questions)]
struct NewQuestionRow<'a> {
    id: Uuid,
    status: &'a str,
    flag_status: &'a str,
    is_variant: bool,
    original_question_id: Option<Uuid>,
    variant_number: Option<i32>,
    created_by: Uuid,
    payload: &'a Value,
    updated_at: DateTime<Utc>,
}

#[derive(AsChangeset, Debug)]
#[diesel(table_name = questions)]
struct QuestionChanges<'a> {
    status: &'a str,
    flag_status: &'a str,
    payload: &'a Value,
    updated_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = history_log)]
struct NewHistoryRow<'a> {
    question_id: Uuid,
    role: &'a str,
    action: &'a str,
    actor_id: Uuid,
    note: Option<&'a str>,
}

/// Fila de `history_log` en el orden de columnas de la tabla.
#[derive(Queryable, Debug)]
struct HistoryRow {
    seq: i64,
    question_id: Uuid,
    role: String,
    action: String,
    actor_id: Uuid,
    ts: DateTime<Utc>,
    note: Option<String>,
}

impl HistoryRow {
    fn into_entry(self) -> Result<HistoryEntry, PersistenceError> {
        let role = self.role
                       .parse()
                       .map_err(|e| PersistenceError::Mapping(format!("{e}")))?;
        let action = self.action
                         .parse()
                         .map_err(|e| PersistenceError::Mapping(format!("{e}")))?;
        Ok(HistoryEntry { seq: self.seq as u64,
                          question_id: self.question_id,
                          role,
                          action,
                          actor_id: self.actor_id,
                          ts: self.ts,
                          note: self.note })
    }
}

fn decode_question(payload: Value) -> Result<Question, PersistenceError> {
    Ok(serde_json::from_value(payload)?)
}

/// Implementación Postgres de `QuestionStore`.
pub struct PgQuestionStore<P: ConnectionProvider> {
    pub provider: P,
}

impl<P: ConnectionProvider> PgQuestionStore<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    fn write_one(conn: &mut PgConnection, write: &PendingWrite) -> Result<HistoryEntry, PersistenceError> {
        let q = &write.question;
        let payload = serde_json::to_value(q)?;
        match write.expected {
            None => {
                let variant_number = q.variant_number
                                      .map(i32::try_from)
                                      .transpose()
                                      .map_err(|e| PersistenceError::Mapping(format!("variant_number: {e}")))?;
                diesel::insert_into(questions::table).values(NewQuestionRow { id: q.id,
                                                                              status: q.status.as_str(),
                                                                              flag_status: q.flag_status.as_str(),
                                                                              is_variant: q.is_variant,
                                                                              original_question_id:
                                                                                  q.original_question_id,
                                                                              variant_number,
                                                                              created_by: q.created_by,
                                                                              payload: &payload,
                                                                              updated_at: q.updated_at })
                                                     .execute(conn)?;
            }
            Some(expected) => {
                let target = questions::table.filter(questions::id.eq(q.id))
                                             .filter(questions::status.eq(expected.status.as_str()))
                                             .filter(questions::flag_status.eq(expected.flag_status.as_str()));
                let touched = diesel::update(target).set(QuestionChanges { status: q.status.as_str(),
                                                                           flag_status: q.flag_status.as_str(),
                                                                           payload: &payload,
                                                                           updated_at: q.updated_at })
                                                    .execute(conn)?;
                if touched == 0 {
                    let exists: i64 = questions::table.filter(questions::id.eq(q.id))
                                                      .count()
                                                      .get_result(conn)?;
                    return Err(if exists == 0 {
                                   PersistenceError::NotFound
                               } else {
                                   PersistenceError::StaleWrite(q.id)
                               });
                }
            }
        }
        let row: HistoryRow = diesel::insert_into(history_log::table).values(NewHistoryRow { question_id: q.id,
                                                                                             role: write.entry
                                                                                                        .role
                                                                                                        .as_str(),
                                                                                             action: write.entry
                                                                                                          .action
                                                                                                          .as_str(),
                                                                                             actor_id: write.entry
                                                                                                            .actor_id,
                                                                                             note: write.entry
                                                                                                        .note
                                                                                                        .as_deref() })
                                                                     .get_result(conn)?;
        row.into_entry()
    }
}

impl<P: ConnectionProvider> QuestionStore for PgQuestionStore<P> {
    fn load(&self, id: Uuid) -> Result<Question, WorkflowError> {
        let payload: Option<Value> = with_retry(|| {
                                         let mut conn = self.provider.connection()?;
                                         questions::table.find(id)
                                                         .select(questions::payload)
                                                         .first(&mut conn)
                                                         .optional()
                                                         .map_err(PersistenceError::from)
                                     })?;
        let payload = payload.ok_or_else(|| WorkflowError::NotFound(format!("question {id}")))?;
        Ok(decode_question(payload)?)
    }

    fn variants_of(&self, original_id: Uuid) -> Result<Vec<Question>, WorkflowError> {
        let payloads: Vec<Value> = with_retry(|| {
                                       let mut conn = self.provider.connection()?;
                                       questions::table.filter(questions::original_question_id.eq(original_id))
                                                       .filter(questions::is_variant.eq(true))
                                                       .order(questions::variant_number.asc())
                                                       .select(questions::payload)
                                                       .load(&mut conn)
                                                       .map_err(PersistenceError::from)
                                   })?;
        payloads.into_iter()
                .map(|p| decode_question(p).map_err(WorkflowError::from))
                .collect()
    }

    fn history(&self, id: Uuid) -> Result<Vec<HistoryEntry>, WorkflowError> {
        debug!("history:start question_id={id}");
        let rows: Vec<HistoryRow> = with_retry(|| {
                                        let mut conn = self.provider.connection()?;
                                        history_log::table.filter(history_log::question_id.eq(id))
                                                          .order(history_log::seq.asc())
                                                          .load(&mut conn)
                                                          .map_err(PersistenceError::from)
                                    })?;
        let entries = rows.into_iter()
                          .map(HistoryRow::into_entry)
                          .collect::<Result<Vec<_>, _>>()?;
        debug!("history:done question_id={id} count={}", entries.len());
        Ok(entries)
    }

    fn apply_writes(&mut self, writes: Vec<PendingWrite>) -> Result<Vec<HistoryEntry>, WorkflowError> {
        debug!("apply_writes:start count={}", writes.len());
        // Transacción atómica: si falla cualquier compare-and-set o insert, se
        // revierte el lote completo.
        let entries = with_retry(|| {
                          let mut conn = self.provider.connection()?;
                          conn.build_transaction()
                              .read_write()
                              .run(|tx_conn| {
                                  writes.iter()
                                        .map(|w| Self::write_one(tx_conn, w))
                                        .collect::<Result<Vec<_>, PersistenceError>>()
                              })
                      }).map_err(|e| {
                            if !matches!(e, PersistenceError::StaleWrite(_)) {
                                error!("apply_writes:error err={e:?}");
                            }
                            e
                        })?;
        debug!("apply_writes:done count={}", entries.len());
        Ok(entries)
    }
}
