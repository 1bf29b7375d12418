//! Configuración central de la aplicación.
//! Carga variables de entorno (.env) una sola vez y expone `CONFIG`, inmutable.
//! La sección de base de datos es opcional: sin `DATABASE_URL` la aplicación
//! trabaja con los almacenes en memoria.
use exam_core::WorkflowConfig;
use exam_persistence::DbConfig;
use log::debug;
use once_cell::sync::Lazy;

/// Configuración global de la aplicación.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Políticas y tiempos de vida del motor.
    pub workflow: WorkflowConfig,
    /// Parámetros de Postgres, si hay `DATABASE_URL`.
    pub database: Option<DbConfig>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let workflow = WorkflowConfig::from_env();
        let database = match DbConfig::from_env() {
            Ok(db) => Some(db),
            Err(e) => {
                debug!("sin base de datos: {e}");
                None
            }
        };
        Self { workflow, database }
    }
}

/// Instancia global perezosa de configuración, evaluada una sola vez.
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);
