// src/handlers/appointments.rs

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
    models::appointments::{
        Appointment, AppointmentCreated, CreateAppointmentPayload, UpdateAppointmentStatusPayload,
    },
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListAppointmentsQuery {
    pub client_id: Option<Uuid>,
}

// GET /api/appointments
#[utoipa::path(
    get,
    path = "/api/appointments",
    tag = "Agendamentos",
    params(ListAppointmentsQuery),
    responses(
        (status = 200, description = "Agendamentos visíveis para o ator", body = Vec<Appointment>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_appointments(
    State(app_state): State<AppState>,
    ApprovedUser(user): ApprovedUser,
    Query(query): Query<ListAppointmentsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let rows = app_state
        .appointment_service
        .list_appointments(&user, query.client_id)
        .await?;
    Ok(Json(rows))
}

// POST /api/appointments — a resposta carrega o resultado best-effort das
// notificações; falha de envio não falha a criação.
#[utoipa::path(
    post,
    path = "/api/appointments",
    tag = "Agendamentos",
    request_body = CreateAppointmentPayload,
    responses(
        (status = 201, description = "Agendamento criado", body = AppointmentCreated)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_appointment(
    State(app_state): State<AppState>,
    ApprovedUser(user): ApprovedUser,
    Json(payload): Json<CreateAppointmentPayload>,
) -> Result<impl IntoResponse, AppError> {
    let created = app_state
        .appointment_service
        .create_appointment(&user, &payload)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

// PATCH /api/appointments/{id}/status
#[utoipa::path(
    patch,
    path = "/api/appointments/{id}/status",
    tag = "Agendamentos",
    params(("id" = Uuid, Path, description = "ID do agendamento")),
    request_body = UpdateAppointmentStatusPayload,
    responses(
        (status = 200, description = "Status atualizado", body = Appointment)
    ),
    security(("api_jwt" = []))
)]
pub async fn update_appointment_status(
    State(app_state): State<AppState>,
    ApprovedUser(user): ApprovedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAppointmentStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let appointment = app_state
        .appointment_service
        .update_status(&user, id, payload.status)
        .await?;
    Ok(Json(appointment))
}
