//! services/mail_service.rs

use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::tracking_config::TrackingConfig;

/// Transporte de correo saliente. El batch depende del trait para poder
/// testearse sin un SMTP real.
#[async_trait]
pub trait MailSender: Send + Sync {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<()>;
}

#[derive(Clone)]
pub struct SmtpMailSender {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    reply_to: Option<Mailbox>,
}

impl SmtpMailSender {
    pub fn new(config: &TrackingConfig) -> Result<Self> {
        let from: Mailbox = format!("{} <{}>", config.sender_name, config.smtp_user)
            .parse()
            .context("Invalid from address")?;

        let reply_to = match &config.reply_to {
            Some(addr) => Some(addr.parse().context("Invalid reply-to address")?),
            None => None,
        };

        let tls_params = TlsParameters::new(config.smtp_host.clone())?;
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.smtp_user.clone(),
                config.smtp_pass.clone(),
            ))
            .tls(Tls::Required(tls_params))
            .build();

        Ok(SmtpMailSender {
            mailer,
            from,
            reply_to,
        })
    }
}

#[async_trait]
impl MailSender for SmtpMailSender {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<()> {
        let to: Mailbox = to.parse().context("Invalid recipient address")?;

        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject);
        if let Some(reply_to) = &self.reply_to {
            builder = builder.reply_to(reply_to.clone());
        }

        // multipart/alternative: fallback de texto plano + HTML con el pixel
        let text_part = SinglePart::builder()
            .header(ContentType::TEXT_PLAIN)
            .body(text_body.to_string());
        let html_part = SinglePart::builder()
            .header(ContentType::parse("text/html; charset=utf-8")?)
            .body(html_body.to_string());

        let message = builder.multipart(
            MultiPart::alternative()
                .singlepart(text_part)
                .singlepart(html_part),
        )?;

        tokio::time::timeout(std::time::Duration::from_secs(30), self.mailer.send(message))
            .await??;

        Ok(())
    }
}
