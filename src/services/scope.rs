// src/services/scope.rs
//
// O único lugar do sistema que traduz papel -> escopo de visibilidade.
// Qualquer caminho de acesso a dados (listagens, dashboard, performance)
// consulta isto em vez de comparar papel na mão.
//
//   admin                     -> vê todos (inclusive outros admins)
//   bdc_manager               -> vê todos MENOS admins
//   telemarketer/salesperson  -> vê só a si mesmo

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{Role, User},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisibilityScope {
    // Sentinela do admin: nenhuma restrição de dono no SQL.
    All,
    // Conjunto materializado de donos visíveis. Para bdc_manager é recomputado
    // a cada chamada, já que o quadro de usuários muda.
    Owners(Vec<Uuid>),
}

impl VisibilityScope {
    pub fn contains(&self, owner: Uuid) -> bool {
        match self {
            VisibilityScope::All => true,
            VisibilityScope::Owners(ids) => ids.contains(&owner),
        }
    }

    // `None` = sem cláusula de dono no SQL; `Some` = `created_by = ANY($1)`.
    pub fn owner_params(&self) -> Option<&[Uuid]> {
        match self {
            VisibilityScope::All => None,
            VisibilityScope::Owners(ids) => Some(ids),
        }
    }
}

#[derive(Clone)]
pub struct ScopeResolver {
    user_repo: UserRepository,
}

impl ScopeResolver {
    pub fn new(user_repo: UserRepository) -> Self {
        Self { user_repo }
    }

    // Pré-condição (aprovado + ativo) já foi garantida pelo extractor
    // ApprovedUser; aqui só mapeamos papel -> escopo.
    pub async fn resolve(&self, actor: &User) -> Result<VisibilityScope, AppError> {
        match actor.role {
            Role::Admin => Ok(VisibilityScope::All),
            Role::BdcManager => {
                let ids = self.user_repo.list_non_admin_ids().await?;
                Ok(VisibilityScope::Owners(ids))
            }
            Role::Telemarketer | Role::Salesperson => {
                Ok(VisibilityScope::Owners(vec![actor.id]))
            }
        }
    }
}

// Checagem "dono ou admin" usada pelo ciclo de vida (soft-delete / restore).
pub fn ensure_owner_or_admin(owner: Uuid, actor: &User) -> Result<(), AppError> {
    if actor.role.is_admin() || actor.id == owner {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Apenas o dono do registro ou um admin pode fazer isso.".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            full_name: "Teste".to_string(),
            email: "t@t.com".to_string(),
            password_hash: "x".to_string(),
            role,
            approved: true,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn escopo_all_contem_qualquer_dono() {
        let scope = VisibilityScope::All;
        assert!(scope.contains(Uuid::new_v4()));
        assert!(scope.owner_params().is_none());
    }

    #[test]
    fn escopo_de_donos_e_exato() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let scope = VisibilityScope::Owners(vec![a]);
        assert!(scope.contains(a));
        assert!(!scope.contains(b));
        assert_eq!(scope.owner_params(), Some(&[a][..]));
    }

    #[test]
    fn dono_pode_admin_pode_terceiro_nao() {
        let owner = user(Role::Telemarketer);
        let admin = user(Role::Admin);
        let other = user(Role::Salesperson);

        assert!(ensure_owner_or_admin(owner.id, &owner).is_ok());
        assert!(ensure_owner_or_admin(owner.id, &admin).is_ok());
        assert!(matches!(
            ensure_owner_or_admin(owner.id, &other),
            Err(AppError::Forbidden(_))
        ));
    }
}
