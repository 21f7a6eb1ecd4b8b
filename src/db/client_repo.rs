// src/db/client_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::clients::{Client, ClientSummary, CoSignerRelation, CreateClientPayload, UpdateClientPayload},
};

const CLIENT_COLUMNS: &str = r#"
    id, first_name, last_name, email, phone, address, created_by,
    is_deleted, deleted_at, last_contacted_at, sold_count, opt_out_sms,
    created_at, updated_at
"#;

#[derive(Clone)]
pub struct ClientRepository {
    pool: PgPool,
}

impl ClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        created_by: Uuid,
        payload: &CreateClientPayload,
    ) -> Result<Client, AppError> {
        let client = sqlx::query_as::<_, Client>(&format!(
            r#"
            INSERT INTO clients (first_name, last_name, email, phone, address, created_by, opt_out_sms)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {CLIENT_COLUMNS}
            "#
        ))
        .bind(&payload.first_name)
        .bind(&payload.last_name)
        .bind(&payload.email)
        .bind(&payload.phone)
        .bind(&payload.address)
        .bind(created_by)
        .bind(payload.opt_out_sms)
        .fetch_one(&self.pool)
        .await?;

        Ok(client)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Client>, AppError> {
        let client = sqlx::query_as::<_, Client>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(client)
    }

    // Listagem já com o status da oportunidade mais recente de cada cliente
    // (é sobre ele que o excludeSold decide). O recorte de dono vem resolvido
    // do serviço: `owners = NULL` significa "sem restrição" (admin).
    pub async fn list(
        &self,
        owners: Option<Vec<Uuid>>,
        exclude_owner: Option<Uuid>,
        include_deleted: bool,
    ) -> Result<Vec<ClientSummary>, AppError> {
        let rows = sqlx::query_as::<_, ClientSummary>(
            r#"
            SELECT c.id, c.first_name, c.last_name, c.email, c.phone, c.address,
                   c.created_by, c.is_deleted, c.deleted_at, c.last_contacted_at,
                   c.sold_count, c.opt_out_sms, c.created_at, c.updated_at,
                   o.finance_status AS latest_finance_status
            FROM clients c
            LEFT JOIN LATERAL (
                SELECT finance_status
                FROM opportunities
                WHERE client_id = c.id AND is_deleted = FALSE
                ORDER BY created_at DESC
                LIMIT 1
            ) o ON TRUE
            WHERE c.is_deleted = $1
              AND ($2::uuid[] IS NULL OR c.created_by = ANY($2))
              AND ($3::uuid IS NULL OR c.created_by <> $3)
            ORDER BY c.created_at DESC
            "#,
        )
        .bind(include_deleted)
        .bind(owners)
        .bind(exclude_owner)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn update_fields(
        &self,
        id: Uuid,
        payload: &UpdateClientPayload,
    ) -> Result<Client, AppError> {
        let client = sqlx::query_as::<_, Client>(&format!(
            r#"
            UPDATE clients
            SET first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                email = COALESCE($4, email),
                phone = COALESCE($5, phone),
                address = COALESCE($6, address),
                opt_out_sms = COALESCE($7, opt_out_sms),
                updated_at = NOW()
            WHERE id = $1 AND is_deleted = FALSE
            RETURNING {CLIENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&payload.first_name)
        .bind(&payload.last_name)
        .bind(&payload.email)
        .bind(&payload.phone)
        .bind(&payload.address)
        .bind(payload.opt_out_sms)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound)?;

        Ok(client)
    }

    // Transição atômica active -> soft_deleted. O WHERE é o compare-and-set:
    // dois chamadores concorrentes não conseguem "deletar duas vezes".
    pub async fn soft_delete(&self, id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE clients
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
            UPDATE clients
            SET is_deleted = FALSE, deleted_at = NULL, updated_at = NOW()
            WHERE id = $1 AND is_deleted = TRUE
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    // Lixeira do admin: sem recorte de dono, de propósito.
    pub async fn list_trash(&self) -> Result<Vec<Client>, AppError> {
        let rows = sqlx::query_as::<_, Client>(&format!(
            r#"
            SELECT {CLIENT_COLUMNS}
            FROM clients
            WHERE is_deleted = TRUE
            ORDER BY deleted_at DESC
            "#
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // Remoção permanente em cascata, numa transação só: agendamentos,
    // relações de co-signer e cartilhas do cliente saem junto — referência
    // pendurada não sobrevive a um purge. O DELETE final é condicionado a
    // is_deleted = TRUE; se outra requisição restaurou no meio do caminho, a
    // transação inteira volta atrás.
    pub async fn purge_cascade(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM appointments WHERE client_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "DELETE FROM cosigner_relations WHERE buyer_client_id = $1 OR cosigner_client_id = $1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        // Cartilhas do cliente podem encadear entre si; solta os ponteiros
        // antes de deletar para não tropeçar na FK.
        sqlx::query(
            r#"
            UPDATE opportunities SET previous_opportunity_id = NULL
            WHERE previous_opportunity_id IN (SELECT id FROM opportunities WHERE client_id = $1)
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM opportunities WHERE client_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM clients WHERE id = $1 AND is_deleted = TRUE")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            // Rollback implícito no drop da transação.
            return Err(AppError::InvalidState(
                "Só registros na lixeira podem ser removidos permanentemente.".to_string(),
            ));
        }

        tx.commit().await?;
        Ok(())
    }

    // =========================================================================
    //  CO-SIGNERS
    // =========================================================================

    pub async fn link_cosigner(
        &self,
        buyer_client_id: Uuid,
        cosigner_client_id: Uuid,
    ) -> Result<CoSignerRelation, AppError> {
        let relation = sqlx::query_as::<_, CoSignerRelation>(
            r#"
            INSERT INTO cosigner_relations (buyer_client_id, cosigner_client_id)
            VALUES ($1, $2)
            RETURNING id, buyer_client_id, cosigner_client_id, created_at
            "#,
        )
        .bind(buyer_client_id)
        .bind(cosigner_client_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(relation)
    }

    pub async fn list_cosigners(
        &self,
        buyer_client_id: Uuid,
    ) -> Result<Vec<CoSignerRelation>, AppError> {
        let relations = sqlx::query_as::<_, CoSignerRelation>(
            r#"
            SELECT id, buyer_client_id, cosigner_client_id, created_at
            FROM cosigner_relations
            WHERE buyer_client_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(buyer_client_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(relations)
    }

    pub async fn find_cosigner_relation(
        &self,
        relation_id: Uuid,
    ) -> Result<Option<CoSignerRelation>, AppError> {
        let relation = sqlx::query_as::<_, CoSignerRelation>(
            r#"
            SELECT id, buyer_client_id, cosigner_client_id, created_at
            FROM cosigner_relations
            WHERE id = $1
            "#,
        )
        .bind(relation_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(relation)
    }

    pub async fn unlink_cosigner(&self, relation_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM cosigner_relations WHERE id = $1")
            .bind(relation_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    // =========================================================================
    //  JOB DE MARKETING
    // =========================================================================

    // Candidatos do disparo periódico: ativos, com telefone, sem opt-out e
    // fora da janela de resfriamento.
    pub async fn marketing_candidates(
        &self,
        cooldown_days: i32,
        limit: i64,
    ) -> Result<Vec<Client>, AppError> {
        let rows = sqlx::query_as::<_, Client>(&format!(
            r#"
            SELECT {CLIENT_COLUMNS}
            FROM clients
            WHERE is_deleted = FALSE
              AND opt_out_sms = FALSE
              AND phone IS NOT NULL
              AND (last_contacted_at IS NULL
                   OR last_contacted_at < NOW() - make_interval(days => $1))
            ORDER BY last_contacted_at ASC NULLS FIRST
            LIMIT $2
            "#
        ))
        .bind(cooldown_days)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn touch_last_contacted(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE clients SET last_contacted_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
