// src/handlers/opportunities.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
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
    models::opportunities::{CreateOpportunityPayload, Opportunity, UpdateFinanceStatusPayload},
    services::opportunities::OpportunityFilters,
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListOpportunitiesQuery {
    pub client_id: Option<Uuid>,
    #[serde(default)]
    pub include_deleted: bool,
}

// GET /api/opportunities
#[utoipa::path(
    get,
    path = "/api/opportunities",
    tag = "Cartilhas",
    params(ListOpportunitiesQuery),
    responses(
        (status = 200, description = "Cartilhas visíveis para o ator", body = Vec<Opportunity>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_opportunities(
    State(app_state): State<AppState>,
    ApprovedUser(user): ApprovedUser,
    Query(query): Query<ListOpportunitiesQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filters = OpportunityFilters {
        client_id: query.client_id,
        include_deleted: query.include_deleted,
    };
    let rows = app_state
        .opportunity_service
        .list_opportunities(&user, &filters)
        .await?;
    Ok(Json(rows))
}

// POST /api/opportunities — nova cartilha, opcionalmente continuando uma
// cadeia existente.
#[utoipa::path(
    post,
    path = "/api/opportunities",
    tag = "Cartilhas",
    request_body = CreateOpportunityPayload,
    responses(
        (status = 201, description = "Cartilha criada", body = Opportunity),
        (status = 422, description = "Cadeia inválida (anterior de outro cliente ou já continuado)")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_opportunity(
    State(app_state): State<AppState>,
    ApprovedUser(user): ApprovedUser,
    Json(payload): Json<CreateOpportunityPayload>,
) -> Result<impl IntoResponse, AppError> {
    let opportunity = app_state
        .opportunity_service
        .create_opportunity(&user, &payload)
        .await?;
    Ok((StatusCode::CREATED, Json(opportunity)))
}

// GET /api/opportunities/{id}
#[utoipa::path(
    get,
    path = "/api/opportunities/{id}",
    tag = "Cartilhas",
    params(("id" = Uuid, Path, description = "ID da cartilha")),
    responses(
        (status = 200, description = "Cartilha", body = Opportunity),
        (status = 404, description = "Inexistente ou fora do escopo")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_opportunity(
    State(app_state): State<AppState>,
    ApprovedUser(user): ApprovedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let opportunity = app_state
        .opportunity_service
        .get_opportunity(&user, id)
        .await?;
    Ok(Json(opportunity))
}

// PATCH /api/opportunities/{id}/finance-status
#[utoipa::path(
    patch,
    path = "/api/opportunities/{id}/finance-status",
    tag = "Cartilhas",
    params(("id" = Uuid, Path, description = "ID da cartilha")),
    request_body = UpdateFinanceStatusPayload,
    responses(
        (status = 200, description = "Status atualizado", body = Opportunity)
    ),
    security(("api_jwt" = []))
)]
pub async fn update_finance_status(
    State(app_state): State<AppState>,
    ApprovedUser(user): ApprovedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateFinanceStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let opportunity = app_state
        .opportunity_service
        .update_finance_status(&user, id, payload.finance_status)
        .await?;
    Ok(Json(opportunity))
}

// DELETE /api/opportunities/{id}
#[utoipa::path(
    delete,
    path = "/api/opportunities/{id}",
    tag = "Cartilhas",
    params(("id" = Uuid, Path, description = "ID da cartilha")),
    responses(
        (status = 204, description = "Cartilha movida para a lixeira")
    ),
    security(("api_jwt" = []))
)]
pub async fn soft_delete_opportunity(
    State(app_state): State<AppState>,
    ApprovedUser(user): ApprovedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.opportunity_service.soft_delete(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/opportunities/{id}/restore
#[utoipa::path(
    post,
    path = "/api/opportunities/{id}/restore",
    tag = "Cartilhas",
    params(("id" = Uuid, Path, description = "ID da cartilha")),
    responses(
        (status = 200, description = "Cartilha restaurada", body = Opportunity),
        (status = 409, description = "Registro não está na lixeira")
    ),
    security(("api_jwt" = []))
)]
pub async fn restore_opportunity(
    State(app_state): State<AppState>,
    ApprovedUser(user): ApprovedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let opportunity = app_state.opportunity_service.restore(&user, id).await?;
    Ok(Json(opportunity))
}
