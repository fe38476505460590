use serde::{Deserialize, Serialize};

/// Fila de la planilla de sellers (fuente externa).
/// Columnas en orden fijo: seller_id, seller_name, email, result, report_url.
#[derive(Debug, Clone, Deserialize)]
pub struct SellerRow {
    pub seller_id: String,
    pub seller_name: String,
    /// Puede traer varias direcciones separadas por coma; cada una se
    /// trata como un envío independiente con su propio token.
    pub email: String,
    /// Texto libre; se compara case-insensitive contra "passed"/"failed".
    pub result: String,
    pub report_url: String,
}

/// Resultado del mystery order test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestResult {
    Passed,
    Failed,
}

impl TestResult {
    /// Matching case-insensitive contra los literales "passed"/"failed".
    /// Cualquier otro valor no matchea y la fila se saltea.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "passed" => Some(TestResult::Passed),
            "failed" => Some(TestResult::Failed),
            _ => None,
        }
    }

    pub fn template_name(&self) -> &'static str {
        match self {
            TestResult::Passed => "passed.html",
            TestResult::Failed => "failed.html",
        }
    }
}

/// Resumen de una corrida del batch de notificaciones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Filas leídas de la planilla.
    pub rows: u64,
    /// Envíos exitosos (uno por destinatario).
    pub sent: u64,
    /// Envíos fallidos (dirección inválida o rechazo del SMTP).
    pub failed: u64,
    /// Filas salteadas (result desconocido o sin direcciones).
    pub skipped: u64,
}
