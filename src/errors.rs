//! errors.rs
//! Taxonomía de errores del subsistema de tracking.

use thiserror::Error;

/// Errores internos del tracking. Ninguno de estos debe llegar al cliente
/// remoto del pixel: el endpoint responde 200 pase lo que pase.
#[derive(Debug, Error)]
pub enum TrackingError {
    /// La tabla de tracking no está disponible (storage caído o inaccesible).
    #[error("tracking storage unavailable: {0}")]
    StorageUnavailable(anyhow::Error),

    /// Token desconocido. No se trata como error: el callback puede llegar
    /// para tokens que nunca existieron.
    #[error("tracking record not found")]
    RecordNotFound,

    /// Callback sin `action=open` o sin `id`. Se ignora en silencio.
    #[error("malformed tracking callback")]
    MalformedCallback,
}
