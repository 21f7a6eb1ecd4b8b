// src/db/opportunity_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::opportunities::{FinanceStatus, Opportunity},
};

const OPPORTUNITY_COLUMNS: &str = r#"
    id, client_id, salesperson_id, previous_opportunity_id, opportunity_number,
    finance_status, sold_at, is_deleted, deleted_at, created_at, updated_at
"#;

#[derive(Clone)]
pub struct OpportunityRepository {
    pool: PgPool,
}

impl OpportunityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // O UNIQUE em previous_opportunity_id é o backstop da invariante "cada
    // registro tem no máximo um sucessor": se dois pedidos tentarem encadear
    // no mesmo anterior ao mesmo tempo, um dos dois leva InvalidChain daqui.
    pub async fn create(
        &self,
        client_id: Uuid,
        salesperson_id: Uuid,
        previous_opportunity_id: Option<Uuid>,
        opportunity_number: i32,
    ) -> Result<Opportunity, AppError> {
        let opportunity = sqlx::query_as::<_, Opportunity>(&format!(
            r#"
            INSERT INTO opportunities (client_id, salesperson_id, previous_opportunity_id, opportunity_number)
            VALUES ($1, $2, $3, $4)
            RETURNING {OPPORTUNITY_COLUMNS}
            "#
        ))
        .bind(client_id)
        .bind(salesperson_id)
        .bind(previous_opportunity_id)
        .bind(opportunity_number)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::InvalidChain(
                        "O registro anterior já foi continuado por outra cartilha.".to_string(),
                    );
                }
            }
            e.into()
        })?;

        Ok(opportunity)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Opportunity>, AppError> {
        let opportunity = sqlx::query_as::<_, Opportunity>(&format!(
            "SELECT {OPPORTUNITY_COLUMNS} FROM opportunities WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(opportunity)
    }

    pub async fn has_successor(&self, id: Uuid) -> Result<bool, AppError> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM opportunities WHERE previous_opportunity_id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    pub async fn list(
        &self,
        owners: Option<Vec<Uuid>>,
        client_id: Option<Uuid>,
        include_deleted: bool,
    ) -> Result<Vec<Opportunity>, AppError> {
        let rows = sqlx::query_as::<_, Opportunity>(&format!(
            r#"
            SELECT {OPPORTUNITY_COLUMNS}
            FROM opportunities
            WHERE is_deleted = $1
              AND ($2::uuid[] IS NULL OR salesperson_id = ANY($2))
              AND ($3::uuid IS NULL OR client_id = $3)
            ORDER BY created_at DESC
            "#
        ))
        .bind(include_deleted)
        .bind(owners)
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // Muda o status de financiamento e, se for a PRIMEIRA entrada no conjunto
    // "venda concluída", carimba sold_at e incrementa o sold_count do cliente.
    // Tudo na mesma transação.
    pub async fn update_finance_status(
        &self,
        id: Uuid,
        status: FinanceStatus,
    ) -> Result<Opportunity, AppError> {
        let mut tx = self.pool.begin().await?;

        // FOR UPDATE: segura a linha para a dupla (status, sold_count) não
        // sofrer lost update com dois PATCHes concorrentes.
        let previous_sold_at: Option<(Option<chrono::DateTime<chrono::Utc>>,)> = sqlx::query_as(
            "SELECT sold_at FROM opportunities WHERE id = $1 AND is_deleted = FALSE FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let (previous_sold_at,) = previous_sold_at.ok_or(AppError::NotFound)?;
        let first_sale = status.is_completed_sale() && previous_sold_at.is_none();

        let opportunity = sqlx::query_as::<_, Opportunity>(&format!(
            r#"
            UPDATE opportunities
            SET finance_status = $2,
                sold_at = CASE WHEN $3 THEN NOW() ELSE sold_at END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {OPPORTUNITY_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status)
        .bind(first_sale)
        .fetch_one(&mut *tx)
        .await?;

        if first_sale {
            sqlx::query(
                "UPDATE clients SET sold_count = sold_count + 1, updated_at = NOW() WHERE id = $1",
            )
            .bind(opportunity.client_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(opportunity)
    }

    pub async fn soft_delete(&self, id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE opportunities
            SET is_deleted = TRUE, deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND is_deleted = FALSE
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn restore(&self, id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE opportunities
            SET is_deleted = FALSE, deleted_at = NULL, updated_at = NOW()
            WHERE id = $1 AND is_deleted = TRUE
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn list_trash(&self) -> Result<Vec<Opportunity>, AppError> {
        let rows = sqlx::query_as::<_, Opportunity>(&format!(
            r#"
            SELECT {OPPORTUNITY_COLUMNS}
            FROM opportunities
            WHERE is_deleted = TRUE
            ORDER BY deleted_at DESC
            "#
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // Purge de cartilha: agendamentos que apontavam para ela mantêm o vínculo
    // com o cliente (opportunity_id vira NULL); um eventual sucessor perde o
    // ponteiro de cadeia. O DELETE final é o compare-and-set.
    pub async fn purge(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE appointments SET opportunity_id = NULL WHERE opportunity_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "UPDATE opportunities SET previous_opportunity_id = NULL WHERE previous_opportunity_id = $1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM opportunities WHERE id = $1 AND is_deleted = TRUE")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::InvalidState(
                "Só registros na lixeira podem ser removidos permanentemente.".to_string(),
            ));
        }

        tx.commit().await?;
        Ok(())
    }
}
