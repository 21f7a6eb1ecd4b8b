// src/handlers/dashboard.rs

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::ApprovedUser,
    models::dashboard::{DashboardStats, SalespersonPerformance},
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct StatsQuery {
    // "all" | "month" | "6months" | "YYYY-MM"; lixo degrada para "all".
    pub period: Option<String>,
    // Drill-down: só tem efeito para admin; para os demais é ignorado no
    // servidor (nunca confiar em parâmetro forjável).
    pub user_id: Option<Uuid>,
}

// GET /api/dashboard/stats
#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    tag = "Dashboard",
    params(StatsQuery),
    responses(
        (status = 200, description = "Contadores agregados do escopo do ator", body = DashboardStats)
    ),
    security(("api_jwt" = []))
)]
pub async fn stats(
    State(app_state): State<AppState>,
    ApprovedUser(user): ApprovedUser,
    Query(query): Query<StatsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let stats = app_state
        .dashboard_service
        .stats(&user, query.period.as_deref(), query.user_id)
        .await?;
    Ok(Json(stats))
}

// GET /api/dashboard/performance — admin e bdc_manager; os demais levam 403.
#[utoipa::path(
    get,
    path = "/api/dashboard/performance",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Uma linha por usuário do escopo", body = Vec<SalespersonPerformance>),
        (status = 403, description = "Papel sem acesso ao relatório")
    ),
    security(("api_jwt" = []))
)]
pub async fn salesperson_performance(
    State(app_state): State<AppState>,
    ApprovedUser(user): ApprovedUser,
) -> Result<impl IntoResponse, AppError> {
    let rows = app_state
        .dashboard_service
        .salesperson_performance(&user)
        .await?;
    Ok(Json(rows))
}
