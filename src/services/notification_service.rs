use std::sync::Arc;

use anyhow::{bail, Context, Result};
use lettre::message::Mailbox;
use tera::Tera;

use crate::models::seller_model::{RunSummary, SellerRow, TestResult};
use crate::services::mail_service::MailSender;
use crate::services::pixel_service::PixelEmbedder;
use crate::services::row_source::RowSource;
use crate::services::tracking_service::TrackingService;

#[derive(Clone)]
pub struct NotificationService {
    tracking_service: TrackingService,
    pixel: PixelEmbedder,
    mail_sender: Arc<dyn MailSender>,
    row_source: Arc<dyn RowSource>,
    templates_dir: String,
}

impl NotificationService {
    pub fn new(
        tracking_service: TrackingService,
        pixel: PixelEmbedder,
        mail_sender: Arc<dyn MailSender>,
        row_source: Arc<dyn RowSource>,
        templates_dir: String,
    ) -> Self {
        Self {
            tracking_service,
            pixel,
            mail_sender,
            row_source,
            templates_dir,
        }
    }

    /// Corre el batch completo: lee la planilla y notifica a cada seller.
    ///
    /// Solo dos fallos abortan la corrida, y ambos ANTES de enviar nada:
    /// templates ilegibles y planilla inaccesible. Todo lo demás se aísla
    /// por fila/destinatario y se cuenta en el resumen.
    pub async fn run_batch(&self) -> Result<RunSummary> {
        log::info!("(run_batch) Iniciando corrida de notificaciones...");

        let tera = self.load_templates()?;
        let rows = self
            .row_source
            .fetch_rows()
            .await
            .context("No se pudo leer la fuente de sellers")?;

        let mut summary = RunSummary::default();

        for row in rows {
            summary.rows += 1;

            let result = match TestResult::parse(&row.result) {
                Some(result) => result,
                None => {
                    log::warn!(
                        "(run_batch) Fila de seller '{}' con result desconocido '{}', se saltea",
                        row.seller_id,
                        row.result
                    );
                    summary.skipped += 1;
                    continue;
                }
            };

            // El campo email puede traer varias direcciones separadas por
            // coma; cada una es un envío independiente con su propio token.
            let addresses: Vec<&str> = row
                .email
                .split(',')
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .collect();
            if addresses.is_empty() {
                log::warn!(
                    "(run_batch) Fila de seller '{}' sin direcciones, se saltea",
                    row.seller_id
                );
                summary.skipped += 1;
                continue;
            }

            let html_base = match self.render_body(&tera, &row, result) {
                Ok(html) => html,
                Err(e) => {
                    log::error!(
                        "(run_batch) Error renderizando template para seller '{}': {:?}",
                        row.seller_id,
                        e
                    );
                    summary.failed += addresses.len() as u64;
                    continue;
                }
            };

            for address in addresses {
                match self.send_one(address, &row, result, &html_base).await {
                    Ok(_) => {
                        log::info!(
                            "(run_batch) Notificación enviada a {} (seller {})",
                            address,
                            row.seller_id
                        );
                        summary.sent += 1;
                    }
                    Err(e) => {
                        // Una dirección fallida no corta ni la fila ni la corrida
                        log::error!(
                            "(run_batch) Falló el envío a {} (seller {}): {:?}",
                            address,
                            row.seller_id,
                            e
                        );
                        summary.failed += 1;
                    }
                }
            }
        }

        log::info!(
            "(run_batch) Corrida terminada: {} filas, {} enviados, {} fallidos, {} salteados",
            summary.rows,
            summary.sent,
            summary.failed,
            summary.skipped
        );
        Ok(summary)
    }

    fn load_templates(&self) -> Result<Tera> {
        let glob = format!("{}/*.html", self.templates_dir);
        let tera = Tera::new(&glob)
            .with_context(|| format!("No se pudieron cargar los templates de {glob}"))?;

        for name in ["passed.html", "failed.html"] {
            if !tera.get_template_names().any(|n| n == name) {
                bail!("Falta el template '{}' en {}", name, self.templates_dir);
            }
        }
        Ok(tera)
    }

    fn render_body(&self, tera: &Tera, row: &SellerRow, result: TestResult) -> Result<String> {
        let mut context = tera::Context::new();
        context.insert("seller_name", &row.seller_name);
        context.insert("seller_id", &row.seller_id);
        context.insert("report_url", &row.report_url);

        tera.render(result.template_name(), &context)
            .context("Fallo al renderizar template de notificación")
    }

    async fn send_one(
        &self,
        address: &str,
        row: &SellerRow,
        result: TestResult,
        html_base: &str,
    ) -> Result<()> {
        // Validar la dirección antes de emitir el token, para no dejar
        // registros de envíos que nunca salieron.
        address
            .parse::<Mailbox>()
            .with_context(|| format!("Dirección inválida: {address}"))?;

        // El tracking nunca bloquea el correo: si el storage falla, el
        // mail sale igual, sin pixel.
        let html_body = match self.tracking_service.issue(address, &row.seller_id).await {
            Ok(token) => format!("{}\n{}", html_base, self.pixel.embed(&token)),
            Err(e) => {
                log::error!(
                    "(send_one) No se pudo registrar tracking para {}: {}",
                    address,
                    e
                );
                html_base.to_string()
            }
        };

        let subject = subject_for(row, result);
        let text_body = text_fallback(row, result);

        self.mail_sender
            .send(address, &subject, &text_body, &html_body)
            .await
            .context("Fallo en mail_sender")
    }
}

fn subject_for(row: &SellerRow, result: TestResult) -> String {
    match result {
        TestResult::Passed => format!("Mystery order result for {}: passed", row.seller_name),
        TestResult::Failed => format!("Mystery order result for {}: failed", row.seller_name),
    }
}

fn text_fallback(row: &SellerRow, result: TestResult) -> String {
    let verdict = match result {
        TestResult::Passed => "passed",
        TestResult::Failed => "did not pass",
    };
    format!(
        "Hello {},\n\nYour store {} our latest mystery order quality test.\nFull report: {}\n\n- The Marketplace Quality Team\n",
        row.seller_name, verdict, row.report_url
    )
}
