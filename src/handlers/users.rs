// src/handlers/users.rs
//
// Gestão de usuários: rotas exclusivas de admin (o extractor AdminUser é o
// guardião; nada aqui confia em campo vindo do cliente).

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError, config::AppState, middleware::auth::AdminUser, models::auth::User,
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetActivePayload {
    pub active: bool,
}

// GET /api/admin/users
#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "Admin",
    responses(
        (status = 200, description = "Todos os usuários", body = Vec<User>),
        (status = 403, description = "Não é admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let users = app_state.auth_service.list_users().await?;
    Ok(Json(users))
}

// POST /api/admin/users/{id}/approve
#[utoipa::path(
    post,
    path = "/api/admin/users/{id}/approve",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "ID do usuário")),
    responses(
        (status = 200, description = "Usuário aprovado", body = User),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn approve_user(
    State(app_state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let user = app_state.auth_service.approve_user(id).await?;
    Ok(Json(user))
}

// PATCH /api/admin/users/{id}/active
#[utoipa::path(
    patch,
    path = "/api/admin/users/{id}/active",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "ID do usuário")),
    request_body = SetActivePayload,
    responses(
        (status = 200, description = "Status atualizado", body = User)
    ),
    security(("api_jwt" = []))
)]
pub async fn set_user_active(
    State(app_state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetActivePayload>,
) -> Result<impl IntoResponse, AppError> {
    let user = app_state
        .auth_service
        .set_user_active(id, payload.active)
        .await?;
    Ok(Json(user))
}
