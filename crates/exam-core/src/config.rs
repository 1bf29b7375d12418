//! Carga de configuración del motor desde variables de entorno.
//!
//! Variables reconocidas (todas opcionales):
//! - `EXAMFLOW_REFLAG_COMPLETED`: `allow` | `deny`.
//! - `EXAMFLOW_REQUIRE_ASSIGNMENT`: `true` | `false`.
//! - `EXAMFLOW_DRAFT_TTL_SECS`: vida de los borradores de explicación.
//! - `EXAMFLOW_DIRECTORY_CACHE_TTL_SECS`: vida de la cache de usuarios.

use chrono::Duration;
use dotenvy::dotenv;
use exam_policies::{AssignmentPolicy, ReflagPolicy, WorkflowPolicy};
use log::warn;
use once_cell::sync::Lazy;
use std::env;

use crate::constants::{DEFAULT_DIRECTORY_CACHE_TTL_SECS, DEFAULT_DRAFT_TTL_SECS, MAX_TTL_SECS};

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowConfig {
    pub policy: WorkflowPolicy,
    pub draft_ttl_secs: i64,
    pub directory_cache_ttl_secs: i64,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self { policy: WorkflowPolicy::default(),
               draft_ttl_secs: DEFAULT_DRAFT_TTL_SECS,
               directory_cache_ttl_secs: DEFAULT_DIRECTORY_CACHE_TTL_SECS }
    }
}

impl WorkflowConfig {
    pub fn from_env() -> Self {
        Lazy::force(&DOTENV_LOADED);
        let defaults = Self::default();
        let reflag = match env::var("EXAMFLOW_REFLAG_COMPLETED") {
            Ok(v) => v.parse::<ReflagPolicy>().unwrap_or_else(|e| {
                                                   warn!("{e}; usando {:?}", defaults.policy.reflag);
                                                   defaults.policy.reflag
                                               }),
            Err(_) => defaults.policy.reflag,
        };
        let require_for_all = env::var("EXAMFLOW_REQUIRE_ASSIGNMENT").ok()
                                                                    .and_then(|v| v.parse().ok())
                                                                    .unwrap_or(false);
        let draft_ttl_secs = ttl_var("EXAMFLOW_DRAFT_TTL_SECS", defaults.draft_ttl_secs);
        let directory_cache_ttl_secs = ttl_var("EXAMFLOW_DIRECTORY_CACHE_TTL_SECS", defaults.directory_cache_ttl_secs);
        Self { policy: WorkflowPolicy { reflag,
                                        assignment: AssignmentPolicy { require_for_all } },
               draft_ttl_secs,
               directory_cache_ttl_secs }
    }
}

fn ttl_var(name: &str, default: i64) -> i64 {
    match env::var(name).ok().and_then(|v| v.parse::<i64>().ok()) {
        Some(secs) => clamp_ttl_secs(name, secs),
        None => default,
    }
}

/// Acota un TTL a `0..=MAX_TTL_SECS`, avisando si hubo que recortarlo.
pub fn clamp_ttl_secs(name: &str, secs: i64) -> i64 {
    let clamped = secs.clamp(0, MAX_TTL_SECS);
    if clamped != secs {
        warn!("{name}={secs} fuera de rango; usando {clamped}");
    }
    clamped
}

/// TTL en segundos como `Duration`; nunca entra en pánico.
pub(crate) fn ttl_duration(secs: i64) -> Duration {
    Duration::try_seconds(secs.clamp(0, MAX_TTL_SECS)).unwrap_or_else(Duration::zero)
}

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_values_are_clamped_to_range() {
        assert_eq!(clamp_ttl_secs("X", 3600), 3600);
        assert_eq!(clamp_ttl_secs("X", -5), 0);
        assert_eq!(clamp_ttl_secs("X", i64::MAX), MAX_TTL_SECS);
        assert_eq!(ttl_duration(i64::MAX), Duration::seconds(MAX_TTL_SECS));
        assert_eq!(ttl_duration(i64::MIN), Duration::zero());
    }
}
