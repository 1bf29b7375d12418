//! exam-persistence
//!
//! Implementaciones Postgres (Diesel) de los contratos de `exam-core`.
//!
//! Módulos:
//! - `pg`: `PgQuestionStore` (preguntas + historial append-only) y
//!   `PgUserDirectory`, más utilidades de pool y reintento.
//! - `migrations`: runner embebido de migraciones Diesel.
//! - `config`: carga de configuración desde .env.
//! - `schema`: tablas Diesel declaradas para compilar queries.

pub mod config;
pub mod error;
pub mod migrations;
pub mod pg;
pub mod schema;

pub use config::{init_dotenv, DbConfig};
pub use error::PersistenceError;
pub use pg::{build_dev_pool_from_env, build_pool, ConnectionProvider, PgPool, PgQuestionStore, PgUserDirectory,
             PoolProvider};
