// src/services/documents.rs
//
// Armazenamento de documentos é colaborador externo: o core só pergunta "que
// URLs existem para este cliente/tipo?" para montar os booleans de checklist.
// Conteúdo, upload e merge de PDF ficam inteiramente fora daqui.

use async_trait::async_trait;
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocType {
    IncomeProof,
    IdCard,
    ResidenceProof,
}

impl DocType {
    pub fn slug(&self) -> &'static str {
        match self {
            DocType::IncomeProof => "income_proof",
            DocType::IdCard => "id_card",
            DocType::ResidenceProof => "residence_proof",
        }
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    // Falha de provedor degrada para lista vazia (checklist aparece como
    // "não enviado"); não derruba a leitura do cliente.
    async fn list(&self, owner_id: Uuid, doc_type: DocType) -> Vec<String>;
}

pub struct HttpDocumentStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpDocumentStore {
    pub fn new(base_url: String, api_key: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url,
            api_key,
        }
    }
}

#[async_trait]
impl DocumentStore for HttpDocumentStore {
    async fn list(&self, owner_id: Uuid, doc_type: DocType) -> Vec<String> {
        let url = format!("{}/documents/{}/{}", self.base_url, owner_id, doc_type.slug());
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                resp.json::<Vec<String>>().await.unwrap_or_default()
            }
            Ok(resp) => {
                tracing::warn!("Provedor de documentos respondeu {}", resp.status());
                Vec::new()
            }
            Err(e) => {
                tracing::warn!("Falha ao listar documentos: {}", e);
                Vec::new()
            }
        }
    }
}

pub struct DisabledDocumentStore;

#[async_trait]
impl DocumentStore for DisabledDocumentStore {
    async fn list(&self, _owner_id: Uuid, _doc_type: DocType) -> Vec<String> {
        Vec::new()
    }
}
