// src/handlers/clients.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::ApprovedUser,
    models::clients::{
        Client, ClientDetail, ClientSummary, CoSignerRelation, CreateClientPayload,
        LinkCoSignerPayload, UpdateClientPayload,
    },
    services::clients::{ClientFilters, OwnerFilter},
};

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListClientsQuery {
    pub search: Option<String>,
    pub owner_id: Option<Uuid>,
    #[serde(default)]
    pub owner_filter: OwnerFilter,
    #[serde(default)]
    pub exclude_sold: bool,
    #[serde(default)]
    pub include_deleted: bool,
}

// GET /api/clients
#[utoipa::path(
    get,
    path = "/api/clients",
    tag = "Clientes",
    params(ListClientsQuery),
    responses(
        (status = 200, description = "Clientes visíveis para o ator", body = Vec<ClientSummary>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_clients(
    State(app_state): State<AppState>,
    ApprovedUser(user): ApprovedUser,
    Query(query): Query<ListClientsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filters = ClientFilters {
        search: query.search,
        owner_id: query.owner_id,
        owner_filter: query.owner_filter,
        exclude_sold: query.exclude_sold,
        include_deleted: query.include_deleted,
    };

    let clients = app_state.client_service.list_clients(&user, &filters).await?;
    Ok(Json(clients))
}

// POST /api/clients
#[utoipa::path(
    post,
    path = "/api/clients",
    tag = "Clientes",
    request_body = CreateClientPayload,
    responses(
        (status = 201, description = "Cliente criado", body = Client),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_client(
    State(app_state): State<AppState>,
    ApprovedUser(user): ApprovedUser,
    Json(payload): Json<CreateClientPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let client = app_state.client_service.create_client(&user, &payload).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

// GET /api/clients/{id}
#[utoipa::path(
    get,
    path = "/api/clients/{id}",
    tag = "Clientes",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Detalhe do cliente com checklist de documentos", body = ClientDetail),
        (status = 404, description = "Inexistente OU fora do escopo (indistinguíveis de propósito)")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_client(
    State(app_state): State<AppState>,
    ApprovedUser(user): ApprovedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let detail = app_state.client_service.get_client(&user, id).await?;
    Ok(Json(detail))
}

// PUT /api/clients/{id}
#[utoipa::path(
    put,
    path = "/api/clients/{id}",
    tag = "Clientes",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    request_body = UpdateClientPayload,
    responses(
        (status = 200, description = "Cliente atualizado", body = Client),
        (status = 403, description = "Não é dono nem admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_client(
    State(app_state): State<AppState>,
    ApprovedUser(user): ApprovedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateClientPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let client = app_state
        .client_service
        .update_client(&user, id, &payload)
        .await?;
    Ok(Json(client))
}

// DELETE /api/clients/{id} — soft delete; repetido é no-op de sucesso.
#[utoipa::path(
    delete,
    path = "/api/clients/{id}",
    tag = "Clientes",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 204, description = "Cliente movido para a lixeira"),
        (status = 403, description = "Não é dono nem admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn soft_delete_client(
    State(app_state): State<AppState>,
    ApprovedUser(user): ApprovedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.client_service.soft_delete(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/clients/{id}/restore
#[utoipa::path(
    post,
    path = "/api/clients/{id}/restore",
    tag = "Clientes",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente restaurado", body = Client),
        (status = 409, description = "Registro não está na lixeira")
    ),
    security(("api_jwt" = []))
)]
pub async fn restore_client(
    State(app_state): State<AppState>,
    ApprovedUser(user): ApprovedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let client = app_state.client_service.restore(&user, id).await?;
    Ok(Json(client))
}

// =============================================================================
//  CO-SIGNERS
// =============================================================================

// GET /api/clients/{id}/cosigners
#[utoipa::path(
    get,
    path = "/api/clients/{id}/cosigners",
    tag = "Clientes",
    params(("id" = Uuid, Path, description = "ID do cliente comprador")),
    responses(
        (status = 200, description = "Relações de co-signer do comprador", body = Vec<CoSignerRelation>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_cosigners(
    State(app_state): State<AppState>,
    ApprovedUser(user): ApprovedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let relations = app_state.client_service.list_cosigners(&user, id).await?;
    Ok(Json(relations))
}

// POST /api/clients/{id}/cosigners
#[utoipa::path(
    post,
    path = "/api/clients/{id}/cosigners",
    tag = "Clientes",
    params(("id" = Uuid, Path, description = "ID do cliente comprador")),
    request_body = LinkCoSignerPayload,
    responses(
        (status = 201, description = "Co-signer vinculado", body = CoSignerRelation)
    ),
    security(("api_jwt" = []))
)]
pub async fn link_cosigner(
    State(app_state): State<AppState>,
    ApprovedUser(user): ApprovedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<LinkCoSignerPayload>,
) -> Result<impl IntoResponse, AppError> {
    let relation = app_state
        .client_service
        .link_cosigner(&user, id, &payload)
        .await?;
    Ok((StatusCode::CREATED, Json(relation)))
}

// DELETE /api/cosigners/{id}
#[utoipa::path(
    delete,
    path = "/api/cosigners/{id}",
    tag = "Clientes",
    params(("id" = Uuid, Path, description = "ID da relação")),
    responses(
        (status = 204, description = "Relação removida")
    ),
    security(("api_jwt" = []))
)]
pub async fn unlink_cosigner(
    State(app_state): State<AppState>,
    ApprovedUser(user): ApprovedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.client_service.unlink_cosigner(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
