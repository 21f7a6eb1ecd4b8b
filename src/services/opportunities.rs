// src/services/opportunities.rs
//
// Cartilhas e a cadeia de versões. Criar "nova oportunidade" em cima de um
// registro anterior só é válido se o anterior (a) pertencer ao mesmo cliente e
// (b) ainda não tiver sido continuado — cada registro tem no máximo um
// sucessor, então a cadeia nunca bifurca nem cicla.

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ClientRepository, OpportunityRepository},
    models::{
        auth::User,
        opportunities::{CreateOpportunityPayload, FinanceStatus, Opportunity},
    },
    services::{
        lifecycle::{self, EntityState},
        scope::{ensure_owner_or_admin, ScopeResolver},
    },
};

#[derive(Debug, Clone, Default)]
pub struct OpportunityFilters {
    pub client_id: Option<Uuid>,
    pub include_deleted: bool,
}

// Número da nova cartilha a partir do registro anterior. Função pura: o
// serviço injeta o `has_successor` que buscou no banco.
pub fn next_opportunity_number(
    previous: &Opportunity,
    client_id: Uuid,
    has_successor: bool,
) -> Result<i32, AppError> {
    if previous.client_id != client_id {
        return Err(AppError::InvalidChain(
            "O registro anterior pertence a outro cliente.".to_string(),
        ));
    }
    if has_successor {
        return Err(AppError::InvalidChain(
            "O registro anterior já foi continuado por outra cartilha.".to_string(),
        ));
    }
    Ok(previous.opportunity_number + 1)
}

#[derive(Clone)]
pub struct OpportunityService {
    repo: OpportunityRepository,
    client_repo: ClientRepository,
    resolver: ScopeResolver,
}

impl OpportunityService {
    pub fn new(
        repo: OpportunityRepository,
        client_repo: ClientRepository,
        resolver: ScopeResolver,
    ) -> Self {
        Self {
            repo,
            client_repo,
            resolver,
        }
    }

    pub async fn create_opportunity(
        &self,
        actor: &User,
        payload: &CreateOpportunityPayload,
    ) -> Result<Opportunity, AppError> {
        let scope = self.resolver.resolve(actor).await?;

        // O cliente precisa existir e estar visível para o ator.
        self.client_repo
            .find_by_id(payload.client_id)
            .await?
            .filter(|c| !c.is_deleted && scope.contains(c.created_by))
            .ok_or(AppError::NotFound)?;

        let number = match payload.previous_opportunity_id {
            Some(prev_id) => {
                let previous = self
                    .repo
                    .find_by_id(prev_id)
                    .await?
                    .filter(|o| !o.is_deleted)
                    .ok_or(AppError::NotFound)?;
                let has_successor = self.repo.has_successor(prev_id).await?;
                next_opportunity_number(&previous, payload.client_id, has_successor)?
            }
            None => 1,
        };

        // O UNIQUE do banco fecha a corrida de dois encadeamentos simultâneos.
        self.repo
            .create(
                payload.client_id,
                actor.id,
                payload.previous_opportunity_id,
                number,
            )
            .await
    }

    pub async fn list_opportunities(
        &self,
        actor: &User,
        filters: &OpportunityFilters,
    ) -> Result<Vec<Opportunity>, AppError> {
        let scope = self.resolver.resolve(actor).await?;
        let owners = scope.owner_params().map(|ids| ids.to_vec());
        self.repo
            .list(owners, filters.client_id, filters.include_deleted)
            .await
    }

    pub async fn get_opportunity(&self, actor: &User, id: Uuid) -> Result<Opportunity, AppError> {
        let scope = self.resolver.resolve(actor).await?;
        self.repo
            .find_by_id(id)
            .await?
            .filter(|o| !o.is_deleted && scope.contains(o.salesperson_id))
            .ok_or(AppError::NotFound)
    }

    pub async fn update_finance_status(
        &self,
        actor: &User,
        id: Uuid,
        status: FinanceStatus,
    ) -> Result<Opportunity, AppError> {
        let opportunity = self.get_opportunity(actor, id).await?;
        ensure_owner_or_admin(opportunity.salesperson_id, actor)?;
        self.repo.update_finance_status(id, status).await
    }

    pub async fn soft_delete(&self, actor: &User, id: Uuid) -> Result<(), AppError> {
        let opportunity = self.find_for_lifecycle(actor, id).await?;
        ensure_owner_or_admin(opportunity.salesperson_id, actor)?;
        // rows == 0 -> já estava na lixeira: no-op de sucesso.
        self.repo.soft_delete(id).await?;
        Ok(())
    }

    pub async fn restore(&self, actor: &User, id: Uuid) -> Result<Opportunity, AppError> {
        let opportunity = self.find_for_lifecycle(actor, id).await?;
        ensure_owner_or_admin(opportunity.salesperson_id, actor)?;
        lifecycle::ensure_restorable(EntityState::from_flag(opportunity.is_deleted))?;

        let rows = self.repo.restore(id).await?;
        if rows == 0 {
            return Err(AppError::InvalidState(
                "O registro não está mais na lixeira.".to_string(),
            ));
        }
        self.repo.find_by_id(id).await?.ok_or(AppError::NotFound)
    }

    pub async fn list_trash(&self, actor: &User) -> Result<Vec<Opportunity>, AppError> {
        if !actor.role.is_admin() {
            return Err(AppError::Forbidden(
                "Apenas admins podem acessar a lixeira.".to_string(),
            ));
        }
        self.repo.list_trash().await
    }

    pub async fn purge(&self, actor: &User, id: Uuid) -> Result<(), AppError> {
        if !actor.role.is_admin() {
            return Err(AppError::Forbidden(
                "Apenas admins podem remover permanentemente.".to_string(),
            ));
        }
        let opportunity = self.repo.find_by_id(id).await?.ok_or(AppError::NotFound)?;
        lifecycle::ensure_purgeable(EntityState::from_flag(opportunity.is_deleted))?;
        self.repo.purge(id).await
    }

    async fn find_for_lifecycle(&self, actor: &User, id: Uuid) -> Result<Opportunity, AppError> {
        let scope = self.resolver.resolve(actor).await?;
        self.repo
            .find_by_id(id)
            .await?
            .filter(|o| scope.contains(o.salesperson_id))
            .ok_or(AppError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn opportunity(client_id: Uuid, number: i32) -> Opportunity {
        Opportunity {
            id: Uuid::new_v4(),
            client_id,
            salesperson_id: Uuid::new_v4(),
            previous_opportunity_id: None,
            opportunity_number: number,
            finance_status: FinanceStatus::Pending,
            sold_at: None,
            is_deleted: false,
            deleted_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn cadeia_numera_1_2_3() {
        let client_id = Uuid::new_v4();
        let first = opportunity(client_id, 1);
        let second_number = next_opportunity_number(&first, client_id, false).unwrap();
        assert_eq!(second_number, 2);

        let second = opportunity(client_id, second_number);
        let third_number = next_opportunity_number(&second, client_id, false).unwrap();
        assert_eq!(third_number, 3);
    }

    #[test]
    fn encadear_em_registro_ja_continuado_falha() {
        let client_id = Uuid::new_v4();
        // Registro #2 já tem o #3 como sucessor; tentar pendurar um quarto
        // registro nele viola a cadeia.
        let second = opportunity(client_id, 2);
        let err = next_opportunity_number(&second, client_id, true).unwrap_err();
        assert!(matches!(err, AppError::InvalidChain(_)));
    }

    #[test]
    fn registro_anterior_de_outro_cliente_falha() {
        let previous = opportunity(Uuid::new_v4(), 1);
        let err = next_opportunity_number(&previous, Uuid::new_v4(), false).unwrap_err();
        assert!(matches!(err, AppError::InvalidChain(_)));
    }
}
