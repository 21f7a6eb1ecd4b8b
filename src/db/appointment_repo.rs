// src/db/appointment_repo.rs

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::appointments::{Appointment, AppointmentStatus},
};

const APPOINTMENT_COLUMNS: &str = r#"
    id, client_id, opportunity_id, salesperson_id, scheduled_at, status, notes,
    created_at, updated_at
"#;

#[derive(Clone)]
pub struct AppointmentRepository {
    pool: PgPool,
}

impl AppointmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        client_id: Uuid,
        opportunity_id: Option<Uuid>,
        salesperson_id: Uuid,
        scheduled_at: DateTime<Utc>,
        notes: Option<&str>,
    ) -> Result<Appointment, AppError> {
        let appointment = sqlx::query_as::<_, Appointment>(&format!(
            r#"
            INSERT INTO appointments (client_id, opportunity_id, salesperson_id, scheduled_at, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {APPOINTMENT_COLUMNS}
            "#
        ))
        .bind(client_id)
        .bind(opportunity_id)
        .bind(salesperson_id)
        .bind(scheduled_at)
        .bind(notes)
        .fetch_one(&self.pool)
        .await?;
        Ok(appointment)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>, AppError> {
        let appointment = sqlx::query_as::<_, Appointment>(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(appointment)
    }

    pub async fn list(
        &self,
        owners: Option<Vec<Uuid>>,
        client_id: Option<Uuid>,
    ) -> Result<Vec<Appointment>, AppError> {
        let rows = sqlx::query_as::<_, Appointment>(&format!(
            r#"
            SELECT {APPOINTMENT_COLUMNS}
            FROM appointments
            WHERE ($1::uuid[] IS NULL OR salesperson_id = ANY($1))
              AND ($2::uuid IS NULL OR client_id = $2)
            ORDER BY scheduled_at DESC
            "#
        ))
        .bind(owners)
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // Transições de status só por chamada explícita de update.
    pub async fn update_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> Result<Appointment, AppError> {
        let appointment = sqlx::query_as::<_, Appointment>(&format!(
            r#"
            UPDATE appointments
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {APPOINTMENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound)?;
        Ok(appointment)
    }
}
