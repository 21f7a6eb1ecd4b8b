// src/handlers/trash.rs
//
// Lixeira e remoção permanente: tudo exclusivo de admin, e a lixeira é
// deliberadamente SEM recorte de dono (o admin vê o lixo de todo mundo).
// Também fica aqui o gatilho manual do job de marketing.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AdminUser,
    models::{clients::Client, opportunities::Opportunity},
};

// GET /api/admin/trash/clients
#[utoipa::path(
    get,
    path = "/api/admin/trash/clients",
    tag = "Admin",
    responses(
        (status = 200, description = "Clientes na lixeira (todos os donos)", body = Vec<Client>),
        (status = 403, description = "Não é admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_trash_clients(
    State(app_state): State<AppState>,
    AdminUser(admin): AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let rows = app_state.client_service.list_trash(&admin).await?;
    Ok(Json(rows))
}

// GET /api/admin/trash/opportunities
#[utoipa::path(
    get,
    path = "/api/admin/trash/opportunities",
    tag = "Admin",
    responses(
        (status = 200, description = "Cartilhas na lixeira (todos os donos)", body = Vec<Opportunity>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_trash_opportunities(
    State(app_state): State<AppState>,
    AdminUser(admin): AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let rows = app_state.opportunity_service.list_trash(&admin).await?;
    Ok(Json(rows))
}

// DELETE /api/admin/trash/clients/{id} — permanente, com cascata sobre
// cartilhas, agendamentos e co-signers. Só a partir da lixeira.
#[utoipa::path(
    delete,
    path = "/api/admin/trash/clients/{id}",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 204, description = "Cliente removido permanentemente"),
        (status = 409, description = "Registro não está na lixeira")
    ),
    security(("api_jwt" = []))
)]
pub async fn purge_client(
    State(app_state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.client_service.purge(&admin, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// DELETE /api/admin/trash/opportunities/{id}
#[utoipa::path(
    delete,
    path = "/api/admin/trash/opportunities/{id}",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "ID da cartilha")),
    responses(
        (status = 204, description = "Cartilha removida permanentemente"),
        (status = 409, description = "Registro não está na lixeira")
    ),
    security(("api_jwt" = []))
)]
pub async fn purge_opportunity(
    State(app_state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.opportunity_service.purge(&admin, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/admin/marketing/run — dispara um tick do job fora do cronograma.
#[utoipa::path(
    post,
    path = "/api/admin/marketing/run",
    tag = "Admin",
    responses(
        (status = 200, description = "Tick executado; retorna quantos SMS saíram")
    ),
    security(("api_jwt" = []))
)]
pub async fn run_marketing_job(
    State(app_state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let sent = app_state.marketing_scheduler.run_once().await?;
    Ok(Json(json!({ "sent": sent })))
}
