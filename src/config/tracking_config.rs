//! config/tracking_config.rs
//! Configuración global del servicio, leída del entorno (.env).

use std::env;

use anyhow::{anyhow, Context, Result};

#[derive(Debug, Clone)]
pub struct TrackingConfig {
    /// Puerto del servidor HTTP.
    pub http_port: u16,
    /// URL base del endpoint de tracking, sin query string.
    /// El pixel apunta a `<base>?id=<token>&action=open`.
    pub tracking_base_url: String,

    // SMTP
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_user: String,
    pub smtp_pass: String,
    pub sender_name: String,
    pub reply_to: Option<String>,

    /// Planilla de sellers (CSV) y cuántas filas de encabezado saltar.
    pub sellers_csv_path: String,
    pub csv_header_rows: usize,

    /// Directorio con los templates de notificación (tera).
    pub templates_dir: String,

    /// Cadencia de la corrida programada en segundos. 0 = deshabilitada.
    /// Semanal = 604800.
    pub run_interval_secs: u64,
}

impl TrackingConfig {
    /// Carga la configuración desde variables de entorno.
    /// Las credenciales SMTP son obligatorias; el resto tiene defaults.
    pub fn from_env() -> Result<Self> {
        Ok(TrackingConfig {
            http_port: env_or("HTTP_PORT", "5022")
                .parse()
                .context("HTTP_PORT inválido")?,
            tracking_base_url: env_or("TRACKING_BASE_URL", "http://localhost:5022/track"),
            smtp_host: env::var("SMTP_HOST").map_err(|_| anyhow!("No se definió SMTP_HOST"))?,
            smtp_port: env_or("SMTP_PORT", "587")
                .parse()
                .context("SMTP_PORT inválido")?,
            smtp_user: env::var("SMTP_USER").map_err(|_| anyhow!("No se definió SMTP_USER"))?,
            smtp_pass: env::var("SMTP_PASS").map_err(|_| anyhow!("No se definió SMTP_PASS"))?,
            sender_name: env_or("SENDER_NAME", "Marketplace Quality Team"),
            reply_to: env::var("REPLY_TO").ok().filter(|s| !s.is_empty()),
            sellers_csv_path: env_or("SELLERS_CSV_PATH", "data/sellers.csv"),
            csv_header_rows: env_or("CSV_HEADER_ROWS", "1")
                .parse()
                .context("CSV_HEADER_ROWS inválido")?,
            templates_dir: env_or("TEMPLATES_DIR", "templates"),
            run_interval_secs: env_or("RUN_INTERVAL_SECS", "0")
                .parse()
                .context("RUN_INTERVAL_SECS inválido")?,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
