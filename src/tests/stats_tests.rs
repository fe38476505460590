//! tests/stats_tests.rs
//! Pruebas del agregador de estadísticas.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_rt::test;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    use crate::models::tracking_model::{StatsResponse, TrackingRecord};
    use crate::services::tracking_service::TrackingService;
    use crate::services::tracking_store::{MemoryTrackingStore, TrackingStore};

    fn create_test_service() -> (Arc<MemoryTrackingStore>, TrackingService) {
        let store = Arc::new(MemoryTrackingStore::default());
        (store.clone(), TrackingService::new(store))
    }

    /// Agrega un registro con send_date controlado; si `extra_views >= 0`
    /// lo deja abierto con esa cantidad de vistas adicionales.
    async fn seed_record(
        store: &Arc<MemoryTrackingStore>,
        days_ago: i64,
        extra_views: Option<i64>,
    ) -> String {
        let token = Uuid::new_v4().to_string();
        let send_date = Utc::now() - Duration::days(days_ago);
        store
            .append(TrackingRecord::new(
                token.clone(),
                "seller@x.com",
                "S-1",
                send_date,
            ))
            .await
            .unwrap();

        if let Some(views) = extra_views {
            store.mark_opened(&token, Utc::now()).await.unwrap();
            for _ in 0..views {
                store.add_view(&token).await.unwrap();
            }
        }
        token
    }

    #[test]
    async fn test_empty_store_has_no_data() {
        let (_store, service) = create_test_service();
        let stats = service.aggregate(Utc::now()).await.unwrap();
        assert!(stats.is_none(), "Tabla vacía no es un error, es 'sin datos'");
    }

    #[test]
    async fn test_aggregate_scenario_ten_records() {
        let (store, service) = create_test_service();

        // 10 registros: 4 abiertos (uno con 3 vistas extra, tres sin extra)
        seed_record(&store, 1, Some(3)).await;
        seed_record(&store, 1, Some(0)).await;
        seed_record(&store, 1, Some(0)).await;
        seed_record(&store, 1, Some(0)).await;
        for _ in 0..6 {
            seed_record(&store, 1, None).await;
        }

        let stats = service.aggregate(Utc::now()).await.unwrap().unwrap();
        assert_eq!(stats.total_emails, 10);
        assert_eq!(stats.opened_emails, 4);
        // La primera apertura cuenta como vista: 4+1+1+1 = 7
        assert_eq!(stats.total_views, 7);
        assert!((stats.average_views - 1.75).abs() < 1e-9);
        assert!((stats.open_rate - 40.0).abs() < 1e-9);

        let response = StatsResponse::from(&stats);
        assert_eq!(response.open_rate, "40.00%");
        assert_eq!(response.average_views, "1.75");
    }

    #[test]
    async fn test_last_week_window() {
        let (store, service) = create_test_service();

        // 3 recientes (1 abierto), 2 viejos (1 abierto)
        seed_record(&store, 1, Some(0)).await;
        seed_record(&store, 2, None).await;
        seed_record(&store, 3, None).await;
        seed_record(&store, 10, Some(2)).await;
        seed_record(&store, 30, None).await;

        let stats = service.aggregate(Utc::now()).await.unwrap().unwrap();
        assert_eq!(stats.total_emails, 5);
        assert_eq!(stats.opened_emails, 2);
        assert_eq!(stats.last_week_emails, 3);
        assert_eq!(stats.last_week_opened, 1);

        let response = StatsResponse::from(&stats);
        assert_eq!(response.last_week_open_rate, "33.33%");
    }

    #[test]
    async fn test_aggregate_is_idempotent() {
        let (store, service) = create_test_service();
        seed_record(&store, 1, Some(4)).await;
        seed_record(&store, 5, None).await;

        let now = Utc::now();
        let first = service.aggregate(now).await.unwrap().unwrap();
        let second = service.aggregate(now).await.unwrap().unwrap();
        assert_eq!(first, second, "re-agregar sin cambios debe dar lo mismo");
    }

    #[test]
    async fn test_open_rate_zero_without_opens() {
        let (store, service) = create_test_service();
        seed_record(&store, 1, None).await;
        seed_record(&store, 2, None).await;

        let stats = service.aggregate(Utc::now()).await.unwrap().unwrap();
        assert_eq!(stats.opened_emails, 0);
        assert_eq!(stats.total_views, 0);
        // Sin aperturas no hay división: promedios en 0
        assert_eq!(stats.average_views, 0.0);
        assert_eq!(stats.open_rate, 0.0);
    }
}
