//! app.rs
use crate::handlers::{notification_handler, tracking_handler};
use actix_web::web;

pub fn init_app(cfg: &mut web::ServiceConfig) {
    // El pixel vive fuera de /api: es la URL que queda embebida en los
    // correos y conviene que sea lo más corta posible.
    cfg.route(
        "/track",
        web::get().to(tracking_handler::track_pixel_endpoint),
    )
    .service(
        web::scope("/api")
            .service(web::scope("/tracking").route(
                "/stats",
                web::get().to(tracking_handler::tracking_stats_endpoint),
            ))
            .service(web::scope("/notifications").route(
                "/run",
                web::post().to(notification_handler::run_notifications_endpoint),
            )),
    );
}
