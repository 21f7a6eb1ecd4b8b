// src/models/clients.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::opportunities::FinanceStatus;

// Cliente do CRM. `created_by` define o DONO — é imutável depois da criação e
// é a chave sobre a qual todo o escopo de visibilidade é aplicado.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_by: Uuid,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub last_contacted_at: Option<DateTime<Utc>>,
    pub sold_count: i32,
    pub opt_out_sms: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Linha de listagem: o cliente mais o status de financiamento da oportunidade
// MAIS RECENTE dele (LEFT JOIN LATERAL no repositório). É sobre esse campo que
// o filtro `excludeSold` decide.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub client: Client,
    pub latest_finance_status: Option<FinanceStatus>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CoSignerRelation {
    pub id: Uuid,
    pub buyer_client_id: Uuid,
    pub cosigner_client_id: Uuid,
    pub created_at: DateTime<Utc>,
}

// Booleans de "documento enviado" exibidos no detalhe do cliente; o conteúdo
// dos arquivos fica inteiramente no provedor externo.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentChecklist {
    pub income_proof: bool,
    pub id_card: bool,
    pub residence_proof: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientDetail {
    #[serde(flatten)]
    pub client: Client,
    pub documents: DocumentChecklist,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Maria")]
    pub first_name: String,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "da Silva")]
    pub last_name: String,

    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,

    #[schema(example = "(407) 555-0133")]
    pub phone: Option<String>,
    pub address: Option<String>,

    #[serde(default)]
    pub opt_out_sms: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClientPayload {
    pub first_name: Option<String>,
    pub last_name: Option<String>,

    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub opt_out_sms: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LinkCoSignerPayload {
    pub cosigner_client_id: Uuid,
}
