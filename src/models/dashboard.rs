// src/models/dashboard.rs

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::auth::Role;

// Contadores agregados do dashboard. Leitura "read committed": não precisa ser
// linearizável com escritas concorrentes.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_clients: i64,
    pub sold_in_period: i64,
    pub appointments_in_period: i64,
    pub total_opportunities: i64,
    // Eco do período resolvido ("all", "month", "6months" ou "YYYY-MM").
    pub current_period: String,
}

// Uma linha por usuário dentro do escopo do solicitante. Para bdc_manager o
// conjunto estruturalmente não contém nenhum admin: o recorte entra na query,
// não no pós-processamento.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalespersonPerformance {
    pub user_id: Uuid,
    pub full_name: String,
    pub role: Role,
    pub total_clients: i64,
    pub total_opportunities: i64,
    pub sold_count: i64,
    pub appointments: i64,
}
