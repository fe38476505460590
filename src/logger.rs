//! logger.rs
//! Inicialización del logger (env_logger).

pub fn init_logger() {
    // El nivel sale de RUST_LOG; sin definir, "info".
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}
