use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use sqlx::{Pool, Sqlite};

use crate::config::tracking_config::TrackingConfig;
use crate::logger::init_logger;
use crate::services::mail_service::SmtpMailSender;
use crate::services::notification_service::NotificationService;
use crate::services::pixel_service::PixelEmbedder;
use crate::services::row_source::CsvRowSource;
use crate::services::tracking_service::TrackingService;
use crate::services::tracking_store::SqliteTrackingStore;

mod app;
mod config;
mod errors;
mod handlers;
mod logger;
mod models;
mod services;

#[cfg(test)]
mod tests;

async fn setup_database() -> Pool<Sqlite> {
    // 1) Crear carpeta "data"
    std::fs::create_dir_all("data").expect("No se pudo crear directorio 'data'");

    // 2) Ruta final: ./data/tracking.db (mode=rwc la crea si no existe)
    let db_path = std::env::current_dir()
        .expect("No se pudo obtener el current_dir")
        .join("data")
        .join("tracking.db");
    let db_url = format!("sqlite:{}?mode=rwc", db_path.to_string_lossy());

    log::info!("Conectando a SQLite en {}", db_url);

    // 3) Conectarnos con SQLx
    let db_pool = Pool::<Sqlite>::connect(&db_url)
        .await
        .expect("No se pudo conectar a la base de datos SQLite.");

    db_pool
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok(); // Cargar .env al inicio
    init_logger();

    let config = TrackingConfig::from_env().expect("Configuración inválida");

    // Conectarnos a la DB
    let db_pool = setup_database().await;

    // Tracking store + migraciones
    let store = SqliteTrackingStore::new(db_pool.clone());
    if let Err(e) = store.run_migrations().await {
        panic!("Fallo en migraciones de 'tracking_records': {:?}", e);
    }
    let tracking_service = TrackingService::new(Arc::new(store));

    // Colaboradores del batch
    let pixel = PixelEmbedder::new(config.tracking_base_url.clone());
    let mail_sender =
        SmtpMailSender::new(&config).expect("No se pudo inicializar el transporte SMTP");
    let row_source = CsvRowSource::new(&config.sellers_csv_path, config.csv_header_rows);

    let notification_service = NotificationService::new(
        tracking_service.clone(),
        pixel,
        Arc::new(mail_sender),
        Arc::new(row_source),
        config.templates_dir.clone(),
    );

    // Corrida programada (semanal = RUN_INTERVAL_SECS=604800)
    if config.run_interval_secs > 0 {
        let notif_service_clone = notification_service.clone();
        let interval = config.run_interval_secs;
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(std::time::Duration::from_secs(interval)).await;
                match notif_service_clone.run_batch().await {
                    Ok(summary) => {
                        log::info!("Corrida programada completada: {:?}", summary)
                    }
                    Err(e) => log::error!("Error en corrida programada: {:?}", e),
                }
            }
        });
    }

    // Levantar servidor
    let port = config.http_port;
    log::info!("Levantando servidor en 0.0.0.0:{}", port);
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(tracking_service.clone()))
            .app_data(web::Data::new(notification_service.clone()))
            .configure(app::init_app)
    })
    .workers(1)
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
