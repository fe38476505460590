//! services/pixel_service.rs
//! Construcción de la referencia de tracking que va al final del HTML.

/// GIF transparente de 1x1 (43 bytes, un solo frame). Es la respuesta fija
/// del endpoint de tracking, sea cual sea el resultado del hit.
pub const TRANSPARENT_GIF: [u8; 43] = [
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, // "GIF89a"
    0x01, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, // 1x1, paleta global de 2
    0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, // negro, blanco
    0x21, 0xF9, 0x04, 0x01, 0x00, 0x00, 0x00, 0x00, // GCE: índice 0 transparente
    0x2C, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, // descriptor
    0x02, 0x02, 0x44, 0x01, 0x00, // datos LZW
    0x3B, // trailer
];

#[derive(Debug, Clone)]
pub struct PixelEmbedder {
    base_url: String,
}

impl PixelEmbedder {
    pub fn new(base_url: impl Into<String>) -> Self {
        PixelEmbedder {
            base_url: base_url.into(),
        }
    }

    /// URL del callback para un token dado.
    pub fn callback_url(&self, token: &str) -> String {
        format!(
            "{}?id={}&action=open",
            self.base_url,
            urlencoding::encode(token)
        )
    }

    /// Referencia invisible de 1x1 para insertar al final del body HTML.
    /// Función pura del token y la base_url configurada.
    pub fn embed(&self, token: &str) -> String {
        format!(
            r#"<img src="{}" width="1" height="1" alt="" style="display:none;" />"#,
            self.callback_url(token)
        )
    }
}
