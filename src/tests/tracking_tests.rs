//! tests/tracking_tests.rs
//! Pruebas del Open Recorder y del store de tracking.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_rt::test;
    use actix_web::{test as actix_test, web, App};
    use futures::future::join_all;
    use sqlx::{Pool, Sqlite};

    use crate::models::tracking_model::{OpenOutcome, TrackPixelQuery};
    use crate::services::pixel_service::TRANSPARENT_GIF;
    use crate::services::tracking_service::TrackingService;
    use crate::services::tracking_store::{
        MemoryTrackingStore, SqliteTrackingStore, TrackingStore,
    };

    fn create_test_service() -> (Arc<MemoryTrackingStore>, TrackingService) {
        let store = Arc::new(MemoryTrackingStore::default());
        (store.clone(), TrackingService::new(store))
    }

    fn open_query(token: &str) -> TrackPixelQuery {
        TrackPixelQuery {
            id: Some(token.to_string()),
            action: Some("open".to_string()),
        }
    }

    #[test]
    async fn test_unknown_token_is_noop() {
        let (store, service) = create_test_service();

        let outcome = service.record_open(&open_query("no-existe")).await.unwrap();
        assert_eq!(outcome, OpenOutcome::UnknownToken);

        // No debe crear registros
        assert_eq!(store.scan().await.unwrap().len(), 0);
    }

    #[test]
    async fn test_first_open_then_repeat_views() {
        let (store, service) = create_test_service();
        let token = service.issue("seller@x.com", "S-1").await.unwrap();

        let record = store.find(&token).await.unwrap().unwrap();
        assert!(!record.opened);
        assert!(record.open_date.is_none());
        assert_eq!(record.views, 0);

        // Primer hit: transición única, views queda en 0
        let outcome = service.record_open(&open_query(&token)).await.unwrap();
        assert_eq!(outcome, OpenOutcome::FirstOpen);

        let record = store.find(&token).await.unwrap().unwrap();
        assert!(record.opened);
        assert!(record.open_date.is_some());
        assert_eq!(record.views, 0);

        // Hit N deja views = N-1
        for n in 1..=5 {
            let outcome = service.record_open(&open_query(&token)).await.unwrap();
            assert_eq!(outcome, OpenOutcome::RepeatView);
            let record = store.find(&token).await.unwrap().unwrap();
            assert_eq!(record.views, n);
        }
    }

    #[test]
    async fn test_action_must_be_open_exactly() {
        let (store, service) = create_test_service();
        let token = service.issue("seller@x.com", "S-1").await.unwrap();

        // Sin action
        let query = TrackPixelQuery {
            id: Some(token.clone()),
            action: None,
        };
        assert_eq!(
            service.record_open(&query).await.unwrap(),
            OpenOutcome::Ignored
        );

        // action con otra capitalización u otro valor: también se ignora
        for bad_action in ["Open", "OPEN", "click", ""] {
            let query = TrackPixelQuery {
                id: Some(token.clone()),
                action: Some(bad_action.to_string()),
            };
            assert_eq!(
                service.record_open(&query).await.unwrap(),
                OpenOutcome::Ignored,
                "action '{}' no debería matchear",
                bad_action
            );
        }

        // Sin id
        let query = TrackPixelQuery {
            id: None,
            action: Some("open".to_string()),
        };
        assert_eq!(
            service.record_open(&query).await.unwrap(),
            OpenOutcome::Ignored
        );

        // El registro sigue intacto
        let record = store.find(&token).await.unwrap().unwrap();
        assert!(!record.opened);
        assert_eq!(record.views, 0);
    }

    #[test]
    async fn test_concurrent_first_hits_single_transition() {
        let (store, service) = create_test_service();
        let token = service.issue("seller@x.com", "S-1").await.unwrap();

        let hits = 16usize;
        let futures: Vec<_> = (0..hits)
            .map(|_| {
                let service = service.clone();
                let query = open_query(&token);
                async move { service.record_open(&query).await.unwrap() }
            })
            .collect();
        let outcomes = join_all(futures).await;

        let first_opens = outcomes
            .iter()
            .filter(|o| **o == OpenOutcome::FirstOpen)
            .count();
        let repeat_views = outcomes
            .iter()
            .filter(|o| **o == OpenOutcome::RepeatView)
            .count();
        assert_eq!(first_opens, 1, "la transición debe darse exactamente una vez");
        assert_eq!(repeat_views, hits - 1, "ningún hit se puede perder");

        let record = store.find(&token).await.unwrap().unwrap();
        assert!(record.opened);
        assert_eq!(record.views as usize, hits - 1);
    }

    #[test]
    async fn test_sqlite_store_roundtrip() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_path = dir.path().join("tracking-test.db");
        let db_url = format!("sqlite:{}?mode=rwc", db_path.to_string_lossy());

        let pool = Pool::<Sqlite>::connect(&db_url)
            .await
            .expect("No se pudo conectar a la DB de test");
        let store = SqliteTrackingStore::new(pool);
        store.run_migrations().await.expect("migraciones");

        let service = TrackingService::new(Arc::new(store.clone()));
        let token = service.issue("seller@x.com", "S-9").await.unwrap();

        let record = store.find(&token).await.unwrap().unwrap();
        assert_eq!(record.email, "seller@x.com");
        assert_eq!(record.seller_id, "S-9");
        assert!(!record.opened);

        // La transición condicional pega una sola vez
        let first = store.mark_opened(&token, chrono::Utc::now()).await.unwrap();
        let second = store.mark_opened(&token, chrono::Utc::now()).await.unwrap();
        assert!(first);
        assert!(!second);

        assert!(store.add_view(&token).await.unwrap());
        assert!(!store.add_view("token-inexistente").await.unwrap());

        let record = store.find(&token).await.unwrap().unwrap();
        assert!(record.opened);
        assert!(record.open_date.is_some());
        assert_eq!(record.views, 1);

        let all = store.scan().await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[test]
    async fn test_pixel_endpoint_always_returns_gif() {
        let (_store, service) = create_test_service();
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(service))
                .configure(crate::app::init_app),
        )
        .await;

        // Token desconocido: igual 200 + image/gif con los bytes fijos
        let req = actix_test::TestRequest::get()
            .uri("/track?id=desconocido&action=open")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
        assert_eq!(resp.headers().get("content-type").unwrap(), "image/gif");
        let body = actix_test::read_body(resp).await;
        assert_eq!(body.as_ref(), TRANSPARENT_GIF.as_slice());

        // Sin action: mismo placeholder
        let req = actix_test::TestRequest::get()
            .uri("/track?id=algo")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
        let body = actix_test::read_body(resp).await;
        assert_eq!(body.as_ref(), TRANSPARENT_GIF.as_slice());
    }
}
