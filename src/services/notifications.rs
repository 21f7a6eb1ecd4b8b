// src/services/notifications.rs
//
// Envio de SMS e e-mail por trás de traits estreitos. Falha de provedor é
// SEMPRE recuperada aqui dentro: vira log + SendOutcome com `success = false`,
// nunca um AppError que derrube a operação que disparou o envio.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendOutcome {
    pub channel: String,
    pub success: bool,
    pub provider_ref: Option<String>,
    pub error: Option<String>,
}

impl SendOutcome {
    pub fn ok(channel: &str, provider_ref: Option<String>) -> Self {
        Self {
            channel: channel.to_string(),
            success: true,
            provider_ref,
            error: None,
        }
    }

    pub fn failed(channel: &str, error: impl Into<String>) -> Self {
        Self {
            channel: channel.to_string(),
            success: false,
            provider_ref: None,
            error: Some(error.into()),
        }
    }
}

#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send(&self, to: &str, body: &str) -> SendOutcome;
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> SendOutcome;
}

// Adapter HTTP genérico (o gateway real fica atrás de um endpoint + api key).
pub struct HttpSmsSender {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HttpSmsSender {
    pub fn new(endpoint: String, api_key: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self {
            client,
            endpoint,
            api_key,
        }
    }
}

#[async_trait]
impl SmsSender for HttpSmsSender {
    async fn send(&self, to: &str, body: &str) -> SendOutcome {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&json!({ "to": to, "body": body }))
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                let provider_ref = resp
                    .headers()
                    .get("x-message-id")
                    .and_then(|v| v.to_str().ok())
                    .map(|s| s.to_string());
                SendOutcome::ok("sms", provider_ref)
            }
            Ok(resp) => {
                tracing::warn!("Provedor de SMS respondeu {}", resp.status());
                SendOutcome::failed("sms", format!("provedor respondeu {}", resp.status()))
            }
            Err(e) => {
                tracing::warn!("Falha ao chamar provedor de SMS: {}", e);
                SendOutcome::failed("sms", e.to_string())
            }
        }
    }
}

pub struct HttpEmailSender {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HttpEmailSender {
    pub fn new(endpoint: String, api_key: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self {
            client,
            endpoint,
            api_key,
        }
    }
}

#[async_trait]
impl EmailSender for HttpEmailSender {
    async fn send(&self, to: &str, subject: &str, body: &str) -> SendOutcome {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&json!({ "to": to, "subject": subject, "body": body }))
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => SendOutcome::ok("email", None),
            Ok(resp) => {
                tracing::warn!("Provedor de e-mail respondeu {}", resp.status());
                SendOutcome::failed("email", format!("provedor respondeu {}", resp.status()))
            }
            Err(e) => {
                tracing::warn!("Falha ao chamar provedor de e-mail: {}", e);
                SendOutcome::failed("email", e.to_string())
            }
        }
    }
}

// Usado quando as variáveis do provedor não estão configuradas (dev/local).
pub struct DisabledSender;

#[async_trait]
impl SmsSender for DisabledSender {
    async fn send(&self, to: &str, _body: &str) -> SendOutcome {
        tracing::debug!("SMS desabilitado; ignorando envio para {}", to);
        SendOutcome::failed("sms", "provedor de SMS não configurado")
    }
}

#[async_trait]
impl EmailSender for DisabledSender {
    async fn send(&self, to: &str, _subject: &str, _body: &str) -> SendOutcome {
        tracing::debug!("E-mail desabilitado; ignorando envio para {}", to);
        SendOutcome::failed("email", "provedor de e-mail não configurado")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sender_desabilitado_falha_sem_erro() {
        // A falha fica contida no SendOutcome; nada de Err/panic.
        let outcome = SmsSender::send(&DisabledSender, "+14075550133", "oi").await;
        assert!(!outcome.success);
        assert!(outcome.error.is_some());

        let outcome = EmailSender::send(&DisabledSender, "a@b.com", "s", "b").await;
        assert!(!outcome.success);
    }
}
