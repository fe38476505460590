//! services/tracking_store.rs
//! Acceso a la tabla de tracking. El recorder y el agregador dependen
//! solo del trait, no de la tabla concreta.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Pool, Row, Sqlite};

use crate::models::tracking_model::TrackingRecord;

#[async_trait]
pub trait TrackingStore: Send + Sync {
    /// Agrega un registro nuevo. Falla si el token ya existe.
    async fn append(&self, record: TrackingRecord) -> Result<()>;

    async fn find(&self, token: &str) -> Result<Option<TrackingRecord>>;

    /// Transición atómica Unopened -> Opened. Devuelve true solo si ESTA
    /// llamada realizó la transición; con hits concurrentes sobre el mismo
    /// token, exactamente una devuelve true.
    async fn mark_opened(&self, token: &str, when: DateTime<Utc>) -> Result<bool>;

    /// Incrementa views en un registro ya abierto. Devuelve true si
    /// actualizó una fila.
    async fn add_view(&self, token: &str) -> Result<bool>;

    /// Full scan para el agregador de estadísticas.
    async fn scan(&self) -> Result<Vec<TrackingRecord>>;
}

// ============================================================
// Implementación SQLite (producción)
// ============================================================

#[derive(Debug, Clone)]
pub struct SqliteTrackingStore {
    db_pool: Pool<Sqlite>,
}

impl SqliteTrackingStore {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        SqliteTrackingStore { db_pool }
    }

    /// Corre migraciones con sqlx
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.db_pool)
            .await
            .context("Failed to run tracking store migrations")?;
        Ok(())
    }
}

/// Fechas guardadas como TEXT rfc3339; opened como 'Yes'/'No'
/// (herencia del esquema de planilla original de 7 columnas).
fn record_from_row(row: &SqliteRow) -> Result<TrackingRecord> {
    let send_date: String = row.get("send_date");
    let open_date: Option<String> = row.get("open_date");
    let opened: String = row.get("opened");

    Ok(TrackingRecord {
        token: row.get("token"),
        email: row.get("email"),
        seller_id: row.get("seller_id"),
        send_date: send_date.parse()?,
        open_date: match open_date {
            Some(raw) if !raw.is_empty() => Some(raw.parse()?),
            _ => None,
        },
        opened: opened == "Yes",
        views: row.get("views"),
    })
}

#[async_trait]
impl TrackingStore for SqliteTrackingStore {
    async fn append(&self, record: TrackingRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO tracking_records (
                token, email, seller_id, send_date, open_date, opened, views
            )
            VALUES (?1, ?2, ?3, ?4, NULL, 'No', 0)
            "#,
        )
        .bind(&record.token)
        .bind(&record.email)
        .bind(&record.seller_id)
        .bind(record.send_date.to_rfc3339())
        .execute(&self.db_pool)
        .await
        .context("Fallo al insertar tracking_record")?;

        Ok(())
    }

    async fn find(&self, token: &str) -> Result<Option<TrackingRecord>> {
        let row = sqlx::query(
            r#"
            SELECT token, email, seller_id, send_date, open_date, opened, views
            FROM tracking_records
            WHERE token = ?1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.db_pool)
        .await
        .context("Fallo al buscar tracking_record")?;

        match row {
            Some(row) => Ok(Some(record_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn mark_opened(&self, token: &str, when: DateTime<Utc>) -> Result<bool> {
        // La condición opened='No' hace la transición atómica: con varios
        // hits simultáneos, sqlite serializa y una sola UPDATE pega.
        let result = sqlx::query(
            r#"
            UPDATE tracking_records
            SET opened = 'Yes', open_date = ?2
            WHERE token = ?1 AND opened = 'No'
            "#,
        )
        .bind(token)
        .bind(when.to_rfc3339())
        .execute(&self.db_pool)
        .await
        .context("Fallo al marcar apertura")?;

        Ok(result.rows_affected() == 1)
    }

    async fn add_view(&self, token: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE tracking_records
            SET views = views + 1
            WHERE token = ?1 AND opened = 'Yes'
            "#,
        )
        .bind(token)
        .execute(&self.db_pool)
        .await
        .context("Fallo al incrementar views")?;

        Ok(result.rows_affected() == 1)
    }

    async fn scan(&self) -> Result<Vec<TrackingRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT token, email, seller_id, send_date, open_date, opened, views
            FROM tracking_records
            ORDER BY send_date
            "#,
        )
        .fetch_all(&self.db_pool)
        .await
        .context("Fallo al escanear tracking_records")?;

        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            records.push(record_from_row(row)?);
        }
        Ok(records)
    }
}

// ============================================================
// Implementación en memoria (tests y deployments chicos)
// ============================================================

#[derive(Debug, Default)]
pub struct MemoryTrackingStore {
    records: Mutex<HashMap<String, TrackingRecord>>,
}

impl MemoryTrackingStore {
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, TrackingRecord>>> {
        self.records
            .lock()
            .map_err(|_| anyhow!("tracking store mutex envenenado"))
    }
}

#[async_trait]
impl TrackingStore for MemoryTrackingStore {
    async fn append(&self, record: TrackingRecord) -> Result<()> {
        let mut records = self.lock()?;
        if records.contains_key(&record.token) {
            return Err(anyhow!("token duplicado: {}", record.token));
        }
        records.insert(record.token.clone(), record);
        Ok(())
    }

    async fn find(&self, token: &str) -> Result<Option<TrackingRecord>> {
        Ok(self.lock()?.get(token).cloned())
    }

    async fn mark_opened(&self, token: &str, when: DateTime<Utc>) -> Result<bool> {
        let mut records = self.lock()?;
        match records.get_mut(token) {
            Some(record) if !record.opened => {
                record.opened = true;
                record.open_date = Some(when);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn add_view(&self, token: &str) -> Result<bool> {
        let mut records = self.lock()?;
        match records.get_mut(token) {
            Some(record) if record.opened => {
                record.views += 1;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn scan(&self) -> Result<Vec<TrackingRecord>> {
        Ok(self.lock()?.values().cloned().collect())
    }
}
