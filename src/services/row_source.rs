//! services/row_source.rs
//! Fuente de filas de sellers. En producción es una planilla CSV con
//! columnas en orden fijo; los tests inyectan filas directamente.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::models::seller_model::SellerRow;

#[async_trait]
pub trait RowSource: Send + Sync {
    /// Devuelve todas las filas de sellers. Si la fuente es inaccesible,
    /// la corrida entera falla antes de enviar nada.
    async fn fetch_rows(&self) -> Result<Vec<SellerRow>>;
}

pub struct CsvRowSource {
    path: PathBuf,
    /// Filas de encabezado a saltar al principio del archivo.
    header_rows: usize,
}

impl CsvRowSource {
    pub fn new(path: impl Into<PathBuf>, header_rows: usize) -> Self {
        CsvRowSource {
            path: path.into(),
            header_rows,
        }
    }
}

#[async_trait]
impl RowSource for CsvRowSource {
    async fn fetch_rows(&self) -> Result<Vec<SellerRow>> {
        // has_headers(false): el salto de encabezados es por cantidad
        // configurada, no por la primera fila.
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .with_context(|| {
                format!(
                    "No se pudo abrir la planilla de sellers: {}",
                    self.path.display()
                )
            })?;

        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            if idx < self.header_rows {
                continue;
            }
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    // Una fila ilegible no voltea la corrida
                    log::error!("(fetch_rows) Fila {} ilegible, se ignora: {}", idx + 1, e);
                    continue;
                }
            };

            // Columnas: seller_id, seller_name, email, result, report_url
            rows.push(SellerRow {
                seller_id: record.get(0).unwrap_or_default().to_string(),
                seller_name: record.get(1).unwrap_or_default().to_string(),
                email: record.get(2).unwrap_or_default().to_string(),
                result: record.get(3).unwrap_or_default().to_string(),
                report_url: record.get(4).unwrap_or_default().to_string(),
            });
        }

        log::info!(
            "(fetch_rows) {} filas leídas de {}",
            rows.len(),
            self.path.display()
        );
        Ok(rows)
    }
}
