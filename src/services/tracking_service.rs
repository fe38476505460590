use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::errors::TrackingError;
use crate::models::tracking_model::{OpenOutcome, TrackPixelQuery, TrackingRecord, TrackingStats};
use crate::services::tracking_store::TrackingStore;

#[derive(Clone)]
pub struct TrackingService {
    store: Arc<dyn TrackingStore>,
}

impl TrackingService {
    pub fn new(store: Arc<dyn TrackingStore>) -> Self {
        TrackingService { store }
    }

    /// Emite un token nuevo para un envío y registra la fila de tracking
    /// con send_date = now, sin aperturas.
    ///
    /// Si el storage falla, el caller decide qué hacer con el correo;
    /// acá solo se reporta `StorageUnavailable`.
    pub async fn issue(&self, email: &str, seller_id: &str) -> Result<String, TrackingError> {
        let token = Uuid::new_v4().to_string();
        let record = TrackingRecord::new(token.clone(), email, seller_id, Utc::now());

        self.store
            .append(record)
            .await
            .map_err(TrackingError::StorageUnavailable)?;

        log::info!(
            "(issue) Token {} registrado para {} (seller {})",
            token,
            email,
            seller_id
        );
        Ok(token)
    }

    /// Procesa un hit del pixel. Nunca devuelve error por token desconocido
    /// ni por callback malformado: esos casos son no-ops con su outcome.
    /// Solo un fallo real de storage sale como Err.
    pub async fn record_open(
        &self,
        query: &TrackPixelQuery,
    ) -> Result<OpenOutcome, TrackingError> {
        match self.try_record_open(query).await {
            Ok(outcome) => Ok(outcome),
            Err(TrackingError::MalformedCallback) => Ok(OpenOutcome::Ignored),
            Err(TrackingError::RecordNotFound) => Ok(OpenOutcome::UnknownToken),
            Err(err) => Err(err),
        }
    }

    async fn try_record_open(
        &self,
        query: &TrackPixelQuery,
    ) -> Result<OpenOutcome, TrackingError> {
        // action debe ser exactamente "open"
        if query.action.as_deref() != Some("open") {
            return Err(TrackingError::MalformedCallback);
        }
        let token = query
            .id
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(TrackingError::MalformedCallback)?;

        // Primero se intenta la transición condicional; si otro hit ya la
        // hizo (o el registro ya estaba abierto), se cuenta una vista más.
        // Así K hits simultáneos sobre un token fresco terminan en una sola
        // transición y views = K-1, sin updates perdidos.
        if self
            .store
            .mark_opened(token, Utc::now())
            .await
            .map_err(TrackingError::StorageUnavailable)?
        {
            log::info!("(record_open) Primera apertura para token {}", token);
            return Ok(OpenOutcome::FirstOpen);
        }

        if self
            .store
            .add_view(token)
            .await
            .map_err(TrackingError::StorageUnavailable)?
        {
            log::debug!("(record_open) Vista adicional para token {}", token);
            return Ok(OpenOutcome::RepeatView);
        }

        Err(TrackingError::RecordNotFound)
    }

    /// Full scan de la tabla y cálculo de estadísticas. Devuelve None con
    /// la tabla vacía: "sin datos" es un estado normal, no un error de
    /// división.
    pub async fn aggregate(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Option<TrackingStats>, TrackingError> {
        let records = self
            .store
            .scan()
            .await
            .map_err(TrackingError::StorageUnavailable)?;

        if records.is_empty() {
            return Ok(None);
        }

        let week_ago = now - Duration::days(7);

        let total_emails = records.len() as u64;
        let mut opened_emails = 0u64;
        let mut total_views = 0u64;
        let mut last_week_emails = 0u64;
        let mut last_week_opened = 0u64;

        for record in &records {
            if record.opened {
                opened_emails += 1;
                // La primera apertura cuenta como una vista aunque views
                // siga en 0.
                total_views += record.views.max(1) as u64;
            }
            if record.send_date > week_ago {
                last_week_emails += 1;
                if record.opened {
                    last_week_opened += 1;
                }
            }
        }

        let open_rate = percentage(opened_emails, total_emails);
        let average_views = if opened_emails == 0 {
            0.0
        } else {
            total_views as f64 / opened_emails as f64
        };
        let last_week_open_rate = percentage(last_week_opened, last_week_emails);

        Ok(Some(TrackingStats {
            total_emails,
            opened_emails,
            open_rate,
            total_views,
            average_views,
            last_week_emails,
            last_week_opened,
            last_week_open_rate,
        }))
    }
}

fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}
