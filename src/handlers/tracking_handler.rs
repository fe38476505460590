use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde_json::json;

use crate::models::tracking_model::{StatsResponse, TrackPixelQuery};
use crate::services::pixel_service::TRANSPARENT_GIF;
use crate::services::tracking_service::TrackingService;

/// GET /track?id=<token>&action=open
///
/// Responde SIEMPRE 200, pase lo que pase: el cliente de correo no debe
/// poder distinguir un hit registrado de uno ignorado, ni ver un ícono de
/// imagen rota. Si el tracking interno falla, se degrada a texto plano
/// pero sigue siendo 200.
pub async fn track_pixel_endpoint(
    tracking_service: web::Data<TrackingService>,
    query: web::Query<TrackPixelQuery>,
) -> HttpResponse {
    match tracking_service.record_open(&query).await {
        Ok(outcome) => {
            log::debug!("(track_pixel) outcome={:?}", outcome);
            HttpResponse::Ok()
                .content_type("image/gif")
                .insert_header(("Cache-Control", "no-store, no-cache, must-revalidate"))
                .body(TRANSPARENT_GIF.to_vec())
        }
        Err(e) => {
            log::error!("(track_pixel) Fallo interno de tracking: {:?}", e);
            HttpResponse::Ok().content_type("text/plain").body("ok")
        }
    }
}

/// GET /api/tracking/stats
pub async fn tracking_stats_endpoint(
    tracking_service: web::Data<TrackingService>,
) -> HttpResponse {
    match tracking_service.aggregate(Utc::now()).await {
        Ok(Some(stats)) => HttpResponse::Ok().json(json!({
            "success": true,
            "stats": StatsResponse::from(&stats)
        })),
        // Tabla vacía: estado normal, no un error
        Ok(None) => HttpResponse::Ok().json(json!({
            "success": true,
            "message": "No hay datos de tracking todavía"
        })),
        Err(e) => {
            log::error!("Stats error: {}", e);
            HttpResponse::InternalServerError().json(json!({
                "success": false,
                "error": e.to_string()
            }))
        }
    }
}
