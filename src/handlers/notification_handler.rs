use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::services::notification_service::NotificationService;

/// POST /api/notifications/run
/// Trigger manual de la corrida de notificaciones (el scheduler usa la
/// misma entrada sin argumentos).
pub async fn run_notifications_endpoint(
    notification_service: web::Data<NotificationService>,
) -> HttpResponse {
    match notification_service.run_batch().await {
        Ok(summary) => HttpResponse::Ok().json(json!({
            "success": true,
            "summary": summary
        })),
        Err(e) => {
            log::error!("Batch run failed: {:?}", e);
            HttpResponse::InternalServerError().json(json!({
                "success": false,
                "error": format!("{:?}", e)
            }))
        }
    }
}
