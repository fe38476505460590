use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Un registro por correo enviado. El core nunca borra registros;
/// un registro que jamás se abre queda en `opened=false, views=0`
/// indefinidamente y eso es un estado normal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingRecord {
    pub token: String,
    pub email: String,
    pub seller_id: String,
    pub send_date: DateTime<Utc>,
    /// Se setea exactamente una vez, en la primera apertura confirmada.
    pub open_date: Option<DateTime<Utc>>,
    pub opened: bool,
    /// Aperturas *adicionales* después de la primera.
    pub views: i64,
}

impl TrackingRecord {
    /// Registro nuevo, sin aperturas.
    pub fn new(token: String, email: &str, seller_id: &str, send_date: DateTime<Utc>) -> Self {
        TrackingRecord {
            token,
            email: email.to_string(),
            seller_id: seller_id.to_string(),
            send_date,
            open_date: None,
            opened: false,
            views: 0,
        }
    }
}

/// Query params del callback del pixel: GET /track?id=<token>&action=open
#[derive(Debug, Clone, Deserialize)]
pub struct TrackPixelQuery {
    pub id: Option<String>,
    pub action: Option<String>,
}

/// Resultado de procesar un hit del pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    /// Primera apertura confirmada: transición única Unopened -> Opened.
    FirstOpen,
    /// El registro ya estaba abierto; se contó una vista adicional.
    RepeatView,
    /// Token que no existe en la tabla. No-op.
    UnknownToken,
    /// Callback sin action=open o sin id. No-op.
    Ignored,
}

/// Estadísticas agregadas sobre toda la tabla de tracking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackingStats {
    pub total_emails: u64,
    pub opened_emails: u64,
    /// Porcentaje 0..100.
    pub open_rate: f64,
    /// Suma de max(views, 1) sobre los abiertos: la primera apertura
    /// cuenta como una vista.
    pub total_views: u64,
    pub average_views: f64,
    /// Ventana móvil de 7 días sobre send_date.
    pub last_week_emails: u64,
    pub last_week_opened: u64,
    pub last_week_open_rate: f64,
}

/// Respuesta JSON de GET /api/tracking/stats, con los porcentajes
/// ya formateados a dos decimales.
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub total_emails: u64,
    pub opened_emails: u64,
    pub open_rate: String,
    pub total_views: u64,
    pub average_views: String,
    pub last_week_emails: u64,
    pub last_week_opened: u64,
    pub last_week_open_rate: String,
}

impl From<&TrackingStats> for StatsResponse {
    fn from(stats: &TrackingStats) -> Self {
        StatsResponse {
            total_emails: stats.total_emails,
            opened_emails: stats.opened_emails,
            open_rate: format!("{:.2}%", stats.open_rate),
            total_views: stats.total_views,
            average_views: format!("{:.2}", stats.average_views),
            last_week_emails: stats.last_week_emails,
            last_week_opened: stats.last_week_opened,
            last_week_open_rate: format!("{:.2}%", stats.last_week_open_rate),
        }
    }
}
