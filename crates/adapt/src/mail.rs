// crates/adapt/src/mail.rs
//
// Contact-form email: one notification to the site owner, one automatic
// reply to the visitor. Sent through a Resend-compatible HTTP API.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::contact::ContactSubmission;
use domain::setting::MailSettings;
use html_escape::{encode_double_quoted_attribute, encode_text};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("mail API responded {status}: {body}")]
    Status { status: u16, body: String },

    #[error("mail API key is not configured")]
    NotConfigured,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Email {
    pub from: String,
    pub to: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    pub subject: String,
    pub html: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send one message; returns the provider's message id when it gives one.
    async fn send(&self, email: Email) -> Result<Option<String>, MailError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Messages
// ─────────────────────────────────────────────────────────────────────────────

/// Sender and site-owner addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Addresses {
    pub from: String,
    pub to: String,
}

impl From<&MailSettings> for Addresses {
    fn from(s: &MailSettings) -> Self {
        Addresses {
            from: s.from.clone(),
            to: s.to.clone(),
        }
    }
}

const STYLE: &str = "body{font-family:Arial,sans-serif;line-height:1.6;color:#333;max-width:600px;margin:0 auto;padding:20px}.header{background-color:#F88379;color:white;padding:20px;border-radius:8px 8px 0 0}.content{background-color:#f9f9f9;padding:20px;border:1px solid #ddd;border-top:none;border-radius:0 0 8px 8px}.info-row{margin-bottom:15px;padding-bottom:15px;border-bottom:1px solid #ddd}.label{font-weight:bold;color:#555}.message-box{background-color:white;padding:15px;border-radius:5px;margin-top:10px;white-space:pre-wrap}.footer{margin-top:20px;padding-top:20px;border-top:1px solid #ddd;font-size:12px;color:#666;text-align:center}";

fn wrap(body: &str) -> String {
    format!(
        r#"<!DOCTYPE html><html><head><meta charset="utf-8"><style>{STYLE}</style></head><body>{body}</body></html>"#
    )
}

/// Message to the site owner; replies go to the visitor.
pub fn notification(
    addresses: &Addresses,
    sub: &ContactSubmission,
    received: DateTime<Utc>,
) -> Email {
    let body = format!(
        r#"<div class="header"><h1 style="margin:0">Nouveau message de contact</h1></div><div class="content"><div class="info-row"><span class="label">Nom :</span> {name}</div><div class="info-row"><span class="label">Email :</span> <a href="mailto:{email_attr}">{email}</a></div><div class="info-row"><span class="label">Message :</span><div class="message-box">{message}</div></div><div class="info-row" style="border-bottom:none"><span class="label">Consentement RGPD :</span> ✓ Accordé</div></div><div class="footer"><p>Ce message a été envoyé via le formulaire de contact de votre site web.</p><p>Date : {date}</p></div>"#,
        name = encode_text(&sub.name),
        email_attr = encode_double_quoted_attribute(&sub.email),
        email = encode_text(&sub.email),
        message = encode_text(&sub.message),
        date = received.format("%Y-%m-%d %H:%M:%S UTC"),
    );
    Email {
        from: addresses.from.clone(),
        to: vec![addresses.to.clone()],
        reply_to: Some(sub.email.clone()),
        subject: format!("Nouveau message de contact de {}", sub.name),
        html: wrap(&body),
    }
}

/// Acknowledgement sent back to the visitor.
pub fn auto_reply(addresses: &Addresses, sub: &ContactSubmission) -> Email {
    let body = format!(
        r#"<div class="header" style="text-align:center"><h1 style="margin:0">Merci pour votre message !</h1></div><div class="content"><p>Bonjour {},</p><p>Nous avons bien reçu votre message et nous vous en remercions.</p><p>Notre équipe vous répondra dans les plus brefs délais.</p><p>Cordialement,<br>L'équipe</p></div><div class="footer"><p>Cet email est envoyé automatiquement, merci de ne pas y répondre.</p></div>"#,
        encode_text(&sub.name)
    );
    Email {
        from: addresses.from.clone(),
        to: vec![sub.email.clone()],
        reply_to: None,
        subject: "Confirmation de réception de votre message".to_string(),
        html: wrap(&body),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HTTP mailer
// ─────────────────────────────────────────────────────────────────────────────

pub struct HttpMailer {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<SecretString>,
}

impl HttpMailer {
    pub fn new(settings: &MailSettings) -> Result<Self, MailError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(HttpMailer {
            http,
            endpoint: format!("{}/emails", settings.api_url.trim_end_matches('/')),
            api_key: settings
                .api_key
                .as_ref()
                .map(|k| SecretString::new(k.expose_secret().into())),
        })
    }
}

#[derive(Deserialize)]
struct SendResponse {
    #[serde(default)]
    id: Option<String>,
}

#[async_trait]
impl Mailer for HttpMailer {
    #[tracing::instrument(skip_all, fields(subject = %email.subject))]
    async fn send(&self, email: Email) -> Result<Option<String>, MailError> {
        let Some(key) = &self.api_key else {
            return Err(MailError::NotConfigured);
        };
        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(key.expose_secret())
            .header("Idempotency-Key", uuid::Uuid::new_v4().to_string())
            .json(&email)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(MailError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let id = resp.json::<SendResponse>().await.ok().and_then(|r| r.id);
        debug!(id = ?id, "mail accepted");
        Ok(id)
    }
}
