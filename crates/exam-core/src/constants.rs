//! Constantes del motor de workflow.

/// Versión lógica del motor; se registra al construir el motor.
pub const ENGINE_VERSION: &str = "W1.0";

/// Vida por defecto de un borrador de explicación (24h).
pub const DEFAULT_DRAFT_TTL_SECS: i64 = 86_400;

/// Vida por defecto de una entrada en la cache del directorio de usuarios.
pub const DEFAULT_DIRECTORY_CACHE_TTL_SECS: i64 = 60;

/// Tope para cualquier TTL configurable (10 años).
pub const MAX_TTL_SECS: i64 = 315_360_000;
