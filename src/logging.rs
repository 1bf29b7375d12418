use tracing_subscriber::EnvFilter;

/// Instala un subscriber `fmt` filtrado por `RUST_LOG` (por defecto `info`).
///
/// Los registros emitidos con `log` llegan al subscriber vía el puente
/// `tracing-log`. Llamarla más de una vez no tiene efecto.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
