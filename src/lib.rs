//! ExamFlow Rust
//!
//! Crate raíz de la aplicación:
//! - `config`: configuración agregada (workflow + base de datos opcional).
//! - `logging`: inicialización del subscriber para binarios y demos.
//!
//! El motor vive en `exam-core`; aquí sólo se ensamblan las piezas.

pub mod config;
pub mod logging;

pub use config::{AppConfig, CONFIG};
pub use logging::init_logging;

#[cfg(test)]
mod tests {
    use super::config::AppConfig;

    #[test]
    fn app_config_defaults_without_database() {
        let cfg = AppConfig::default();
        assert!(cfg.database.is_none());
        assert!(!cfg.workflow.policy.assignment.require_for_all);
    }
}
