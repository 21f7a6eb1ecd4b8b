// src/models/opportunities.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// Status de financiamento de uma cartilha (oportunidade de venda).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "finance_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FinanceStatus {
    Pending,
    InReview,
    Approved,
    Sold,
    Delivered,
    Declined,
}

impl FinanceStatus {
    // Conjunto "venda concluída": alimenta o excludeSold da listagem de
    // clientes e a contagem de vendidos do dashboard.
    pub fn is_completed_sale(&self) -> bool {
        matches!(self, FinanceStatus::Sold | FinanceStatus::Delivered)
    }
}

// A cartilha. Versões formam uma cadeia simples via `previous_opportunity_id`;
// o banco garante (UNIQUE) que cada registro tem no máximo um sucessor.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub id: Uuid,
    pub client_id: Uuid,
    pub salesperson_id: Uuid,
    pub previous_opportunity_id: Option<Uuid>,
    pub opportunity_number: i32,
    pub finance_status: FinanceStatus,
    pub sold_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOpportunityPayload {
    pub client_id: Uuid,
    // Quando presente, a nova cartilha continua a cadeia do registro anterior.
    pub previous_opportunity_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFinanceStatusPayload {
    pub finance_status: FinanceStatus,
}
