// src/services/lifecycle.rs
//
// Ciclo de vida de clientes e cartilhas:
//
//   active -> soft_deleted -> { restaurado (= active), purgado (terminal) }
//
// Estado como enum em vez de boolean solto: o purge só é alcançável a partir
// de soft_deleted, e isso precisa aparecer no tipo. A transição em si é um
// UPDATE condicional (compare-and-set) no repositório; as funções daqui são a
// checagem de guarda que decide o que fazer com `rows_affected == 0`.

use crate::common::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityState {
    Active,
    SoftDeleted,
}

impl EntityState {
    pub fn from_flag(is_deleted: bool) -> Self {
        if is_deleted {
            EntityState::SoftDeleted
        } else {
            EntityState::Active
        }
    }
}

// Soft-delete repetido é no-op de SUCESSO: o chamador só quer o registro fora
// das listagens, e ele já está.
pub fn soft_delete_outcome(state_before: EntityState) -> Result<(), AppError> {
    match state_before {
        EntityState::Active | EntityState::SoftDeleted => Ok(()),
    }
}

pub fn ensure_restorable(state: EntityState) -> Result<(), AppError> {
    match state {
        EntityState::SoftDeleted => Ok(()),
        EntityState::Active => Err(AppError::InvalidState(
            "O registro não está na lixeira; não há o que restaurar.".to_string(),
        )),
    }
}

pub fn ensure_purgeable(state: EntityState) -> Result<(), AppError> {
    match state {
        EntityState::SoftDeleted => Ok(()),
        // Guarda deliberada em dois passos contra perda acidental de dados:
        // apagar de vez exige passar pela lixeira primeiro.
        EntityState::Active => Err(AppError::InvalidState(
            "Só registros na lixeira podem ser removidos permanentemente.".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estado_deriva_do_flag() {
        assert_eq!(EntityState::from_flag(false), EntityState::Active);
        assert_eq!(EntityState::from_flag(true), EntityState::SoftDeleted);
    }

    #[test]
    fn soft_delete_repetido_e_noop_de_sucesso() {
        assert!(soft_delete_outcome(EntityState::Active).is_ok());
        assert!(soft_delete_outcome(EntityState::SoftDeleted).is_ok());
    }

    #[test]
    fn restore_exige_lixeira() {
        assert!(ensure_restorable(EntityState::SoftDeleted).is_ok());
        assert!(matches!(
            ensure_restorable(EntityState::Active),
            Err(AppError::InvalidState(_))
        ));
    }

    #[test]
    fn purge_inalcancavel_a_partir_de_ativo() {
        assert!(ensure_purgeable(EntityState::SoftDeleted).is_ok());
        assert!(matches!(
            ensure_purgeable(EntityState::Active),
            Err(AppError::InvalidState(_))
        ));
    }
}
