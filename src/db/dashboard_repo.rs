// src/db/dashboard_repo.rs

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{common::error::AppError, models::dashboard::SalespersonPerformance};

// Intervalo meio-aberto [start, end) já resolvido pelo serviço; None = "all".
pub type PeriodRange = Option<(DateTime<Utc>, DateTime<Utc>)>;

#[derive(Debug, Clone, Copy, Default)]
pub struct RawStats {
    pub total_clients: i64,
    pub sold_in_period: i64,
    pub appointments_in_period: i64,
    pub total_opportunities: i64,
}

#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Os quatro cards numa transação só (snapshot consistente dos dados).
    // `owners = NULL` = sem recorte de dono (admin olhando o todo). Um
    // user_id inexistente entra aqui como `owners = [id]` e sai com tudo
    // zero — nunca erro.
    pub async fn stats(
        &self,
        owners: Option<Vec<Uuid>>,
        range: PeriodRange,
    ) -> Result<RawStats, AppError> {
        let mut tx = self.pool.begin().await?;

        let (range_start, range_end) = match range {
            Some((start, end)) => (Some(start), Some(end)),
            None => (None, None),
        };

        let (total_clients,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM clients
            WHERE is_deleted = FALSE
              AND ($1::uuid[] IS NULL OR created_by = ANY($1))
            "#,
        )
        .bind(&owners)
        .fetch_one(&mut *tx)
        .await?;

        // "Vendido no período" olha o carimbo sold_at (quando o status entrou
        // no conjunto de venda concluída), não o created_at da cartilha.
        let (sold_in_period,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM opportunities
            WHERE is_deleted = FALSE
              AND sold_at IS NOT NULL
              AND ($1::uuid[] IS NULL OR salesperson_id = ANY($1))
              AND ($2::timestamptz IS NULL OR (sold_at >= $2 AND sold_at < $3))
            "#,
        )
        .bind(&owners)
        .bind(range_start)
        .bind(range_end)
        .fetch_one(&mut *tx)
        .await?;

        let (appointments_in_period,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM appointments
            WHERE ($1::uuid[] IS NULL OR salesperson_id = ANY($1))
              AND ($2::timestamptz IS NULL OR (scheduled_at >= $2 AND scheduled_at < $3))
            "#,
        )
        .bind(&owners)
        .bind(range_start)
        .bind(range_end)
        .fetch_one(&mut *tx)
        .await?;

        let (total_opportunities,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM opportunities
            WHERE is_deleted = FALSE
              AND ($1::uuid[] IS NULL OR salesperson_id = ANY($1))
            "#,
        )
        .bind(&owners)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(RawStats {
            total_clients,
            sold_in_period,
            appointments_in_period,
            total_opportunities,
        })
    }

    // Uma linha por usuário do recorte, zeros inclusos (subselects escalares
    // em vez de GROUP BY para não perder quem não tem movimento).
    pub async fn performance(
        &self,
        owners: Option<Vec<Uuid>>,
    ) -> Result<Vec<SalespersonPerformance>, AppError> {
        let rows = sqlx::query_as::<_, SalespersonPerformance>(
            r#"
            SELECT
                u.id AS user_id,
                u.full_name,
                u.role,
                (SELECT COUNT(*) FROM clients c
                  WHERE c.created_by = u.id AND c.is_deleted = FALSE) AS total_clients,
                (SELECT COUNT(*) FROM opportunities o
                  WHERE o.salesperson_id = u.id AND o.is_deleted = FALSE) AS total_opportunities,
                (SELECT COUNT(*) FROM opportunities o
                  WHERE o.salesperson_id = u.id AND o.is_deleted = FALSE
                    AND o.sold_at IS NOT NULL) AS sold_count,
                (SELECT COUNT(*) FROM appointments a
                  WHERE a.salesperson_id = u.id) AS appointments
            FROM users u
            WHERE ($1::uuid[] IS NULL OR u.id = ANY($1))
            ORDER BY u.full_name ASC
            "#,
        )
        .bind(&owners)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
