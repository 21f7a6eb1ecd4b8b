// src/services/clients.rs
//
// Motor de consulta com escopo de dono para clientes. O fluxo é sempre:
//   1. resolver o escopo do ator (services/scope.rs);
//   2. reduzir escopo + filtros a uma OwnerSelection;
//   3. recortar por dono/lixeira no SQL;
//   4. aplicar busca e excludeSold em cima das linhas.

use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ClientRepository,
    models::{
        auth::User,
        clients::{
            Client, ClientDetail, ClientSummary, CoSignerRelation, CreateClientPayload,
            DocumentChecklist, LinkCoSignerPayload, UpdateClientPayload,
        },
    },
    services::{
        documents::{DocType, DocumentStore},
        lifecycle::{self, EntityState},
        scope::{ensure_owner_or_admin, ScopeResolver, VisibilityScope},
    },
};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum OwnerFilter {
    Mine,
    Others,
    #[default]
    All,
}

#[derive(Debug, Clone, Default)]
pub struct ClientFilters {
    pub search: Option<String>,
    pub owner_id: Option<Uuid>,
    pub owner_filter: OwnerFilter,
    pub exclude_sold: bool,
    pub include_deleted: bool,
}

// Recorte de dono já reduzido, pronto para virar cláusula SQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerSelection {
    // Nenhum dono pode casar: o chamador devolve lista vazia sem ir ao banco.
    // É o caso do ownerId fora do escopo — vazio, nunca erro, para não vazar
    // existência.
    Empty,
    All,
    Owners(Vec<Uuid>),
    AllExcept(Uuid),
}

impl OwnerSelection {
    pub fn into_sql_params(self) -> Option<(Option<Vec<Uuid>>, Option<Uuid>)> {
        match self {
            OwnerSelection::Empty => None,
            OwnerSelection::All => Some((None, None)),
            OwnerSelection::Owners(ids) => Some((Some(ids), None)),
            OwnerSelection::AllExcept(id) => Some((None, Some(id))),
        }
    }

    // Espelho em Rust da cláusula SQL; os testes de partição usam isto.
    pub fn matches(&self, owner: Uuid) -> bool {
        match self {
            OwnerSelection::Empty => false,
            OwnerSelection::All => true,
            OwnerSelection::Owners(ids) => ids.contains(&owner),
            OwnerSelection::AllExcept(excluded) => owner != *excluded,
        }
    }
}

// Reduz escopo + ownerId + ownerFilter a uma seleção única. `mine` e `others`
// particionam o escopo de forma exaustiva e mutuamente exclusiva; a soma das
// duas listagens é sempre a listagem `all`.
pub fn resolve_owner_selection(
    scope: &VisibilityScope,
    actor_id: Uuid,
    owner_id: Option<Uuid>,
    owner_filter: OwnerFilter,
) -> OwnerSelection {
    if let Some(owner) = owner_id {
        if !scope.contains(owner) {
            return OwnerSelection::Empty;
        }
        // ownerId dentro do escopo restringe a exatamente um dono; o
        // ownerFilter ainda se aplica por cima (interseção).
        return match owner_filter {
            OwnerFilter::All => OwnerSelection::Owners(vec![owner]),
            OwnerFilter::Mine if owner == actor_id => OwnerSelection::Owners(vec![owner]),
            OwnerFilter::Mine => OwnerSelection::Empty,
            OwnerFilter::Others if owner != actor_id => OwnerSelection::Owners(vec![owner]),
            OwnerFilter::Others => OwnerSelection::Empty,
        };
    }

    match owner_filter {
        OwnerFilter::All => match scope {
            VisibilityScope::All => OwnerSelection::All,
            VisibilityScope::Owners(ids) => OwnerSelection::Owners(ids.clone()),
        },
        OwnerFilter::Mine => {
            if scope.contains(actor_id) {
                OwnerSelection::Owners(vec![actor_id])
            } else {
                OwnerSelection::Empty
            }
        }
        OwnerFilter::Others => match scope {
            VisibilityScope::All => OwnerSelection::AllExcept(actor_id),
            VisibilityScope::Owners(ids) => {
                let rest: Vec<Uuid> = ids.iter().copied().filter(|id| *id != actor_id).collect();
                if rest.is_empty() {
                    OwnerSelection::Empty
                } else {
                    OwnerSelection::Owners(rest)
                }
            }
        },
    }
}

// Só os dígitos do telefone, para a busca casar "(407) 555-0133" com "4075550133".
pub fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

// Busca case-insensitive por substring em nome, sobrenome ou telefone
// normalizado.
pub fn matches_search(client: &Client, needle: &str) -> bool {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }

    if client.first_name.to_lowercase().contains(&needle)
        || client.last_name.to_lowercase().contains(&needle)
    {
        return true;
    }

    let needle_digits = normalize_phone(&needle);
    if needle_digits.is_empty() {
        return false;
    }
    client
        .phone
        .as_deref()
        .map(|p| normalize_phone(p).contains(&needle_digits))
        .unwrap_or(false)
}

// `excludeSold` corta quem tem a oportunidade mais recente no conjunto de
// venda concluída.
pub fn passes_sold_filter(row: &ClientSummary, exclude_sold: bool) -> bool {
    if !exclude_sold {
        return true;
    }
    !row.latest_finance_status
        .map(|s| s.is_completed_sale())
        .unwrap_or(false)
}

#[derive(Clone)]
pub struct ClientService {
    repo: ClientRepository,
    resolver: ScopeResolver,
    documents: Arc<dyn DocumentStore>,
}

impl ClientService {
    pub fn new(
        repo: ClientRepository,
        resolver: ScopeResolver,
        documents: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            repo,
            resolver,
            documents,
        }
    }

    pub async fn create_client(
        &self,
        actor: &User,
        payload: &CreateClientPayload,
    ) -> Result<Client, AppError> {
        // Qualquer ator aprovado/ativo cria; o dono é SEMPRE quem criou.
        self.repo.create(actor.id, payload).await
    }

    pub async fn list_clients(
        &self,
        actor: &User,
        filters: &ClientFilters,
    ) -> Result<Vec<ClientSummary>, AppError> {
        let scope = self.resolver.resolve(actor).await?;
        let selection =
            resolve_owner_selection(&scope, actor.id, filters.owner_id, filters.owner_filter);

        let Some((owners, exclude_owner)) = selection.into_sql_params() else {
            return Ok(Vec::new());
        };

        let rows = self
            .repo
            .list(owners, exclude_owner, filters.include_deleted)
            .await?;

        let rows = rows
            .into_iter()
            .filter(|row| passes_sold_filter(row, filters.exclude_sold))
            .filter(|row| {
                filters
                    .search
                    .as_deref()
                    .map(|needle| matches_search(&row.client, needle))
                    .unwrap_or(true)
            })
            .collect();

        Ok(rows)
    }

    // Miss fora do escopo responde NotFound igual a id inexistente.
    pub async fn get_client(&self, actor: &User, id: Uuid) -> Result<ClientDetail, AppError> {
        let scope = self.resolver.resolve(actor).await?;
        let client = self
            .repo
            .find_by_id(id)
            .await?
            .filter(|c| !c.is_deleted && scope.contains(c.created_by))
            .ok_or(AppError::NotFound)?;

        let documents = DocumentChecklist {
            income_proof: !self.documents.list(id, DocType::IncomeProof).await.is_empty(),
            id_card: !self.documents.list(id, DocType::IdCard).await.is_empty(),
            residence_proof: !self
                .documents
                .list(id, DocType::ResidenceProof)
                .await
                .is_empty(),
        };

        Ok(ClientDetail { client, documents })
    }

    pub async fn update_client(
        &self,
        actor: &User,
        id: Uuid,
        payload: &UpdateClientPayload,
    ) -> Result<Client, AppError> {
        let client = self.visible_client(actor, id).await?;
        ensure_owner_or_admin(client.created_by, actor)?;
        self.repo.update_fields(id, payload).await
    }

    pub async fn soft_delete(&self, actor: &User, id: Uuid) -> Result<(), AppError> {
        let client = self.find_for_lifecycle(actor, id).await?;
        ensure_owner_or_admin(client.created_by, actor)?;

        let rows = self.repo.soft_delete(id).await?;
        if rows == 0 {
            // Já estava na lixeira: no-op de sucesso.
            lifecycle::soft_delete_outcome(EntityState::SoftDeleted)?;
        }
        Ok(())
    }

    pub async fn restore(&self, actor: &User, id: Uuid) -> Result<Client, AppError> {
        let client = self.find_for_lifecycle(actor, id).await?;
        ensure_owner_or_admin(client.created_by, actor)?;
        lifecycle::ensure_restorable(EntityState::from_flag(client.is_deleted))?;

        let rows = self.repo.restore(id).await?;
        if rows == 0 {
            // Corrida: alguém restaurou (ou purgou) entre a checagem e o CAS.
            return Err(AppError::InvalidState(
                "O registro não está mais na lixeira.".to_string(),
            ));
        }
        self.repo.find_by_id(id).await?.ok_or(AppError::NotFound)
    }

    pub async fn list_trash(&self, actor: &User) -> Result<Vec<Client>, AppError> {
        ensure_admin(actor)?;
        self.repo.list_trash().await
    }

    pub async fn purge(&self, actor: &User, id: Uuid) -> Result<(), AppError> {
        ensure_admin(actor)?;
        let client = self.repo.find_by_id(id).await?.ok_or(AppError::NotFound)?;
        lifecycle::ensure_purgeable(EntityState::from_flag(client.is_deleted))?;
        self.repo.purge_cascade(id).await
    }

    // =========================================================================
    //  CO-SIGNERS
    // =========================================================================

    pub async fn link_cosigner(
        &self,
        actor: &User,
        buyer_client_id: Uuid,
        payload: &LinkCoSignerPayload,
    ) -> Result<CoSignerRelation, AppError> {
        // Os dois lados precisam existir e estar visíveis para o ator.
        self.visible_client(actor, buyer_client_id).await?;
        self.visible_client(actor, payload.cosigner_client_id).await?;
        self.repo
            .link_cosigner(buyer_client_id, payload.cosigner_client_id)
            .await
    }

    pub async fn list_cosigners(
        &self,
        actor: &User,
        buyer_client_id: Uuid,
    ) -> Result<Vec<CoSignerRelation>, AppError> {
        self.visible_client(actor, buyer_client_id).await?;
        self.repo.list_cosigners(buyer_client_id).await
    }

    pub async fn unlink_cosigner(&self, actor: &User, relation_id: Uuid) -> Result<(), AppError> {
        let relation = self
            .repo
            .find_cosigner_relation(relation_id)
            .await?
            .ok_or(AppError::NotFound)?;
        self.visible_client(actor, relation.buyer_client_id).await?;
        self.repo.unlink_cosigner(relation_id).await?;
        Ok(())
    }

    // Cliente visível (não deletado, dono dentro do escopo) ou NotFound.
    async fn visible_client(&self, actor: &User, id: Uuid) -> Result<Client, AppError> {
        let scope = self.resolver.resolve(actor).await?;
        self.repo
            .find_by_id(id)
            .await?
            .filter(|c| !c.is_deleted && scope.contains(c.created_by))
            .ok_or(AppError::NotFound)
    }

    // Para soft-delete/restore a entidade pode estar na lixeira; o recorte de
    // escopo continua valendo.
    async fn find_for_lifecycle(&self, actor: &User, id: Uuid) -> Result<Client, AppError> {
        let scope = self.resolver.resolve(actor).await?;
        self.repo
            .find_by_id(id)
            .await?
            .filter(|c| scope.contains(c.created_by))
            .ok_or(AppError::NotFound)
    }
}

fn ensure_admin(actor: &User) -> Result<(), AppError> {
    if actor.role.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Apenas admins podem acessar a lixeira.".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::opportunities::FinanceStatus;
    use chrono::Utc;

    fn client(owner: Uuid, first: &str, last: &str, phone: Option<&str>) -> Client {
        Client {
            id: Uuid::new_v4(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: None,
            phone: phone.map(|p| p.to_string()),
            address: None,
            created_by: owner,
            is_deleted: false,
            deleted_at: None,
            last_contacted_at: None,
            sold_count: 0,
            opt_out_sms: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn summary(owner: Uuid, status: Option<FinanceStatus>) -> ClientSummary {
        ClientSummary {
            client: client(owner, "Ana", "Souza", None),
            latest_finance_status: status,
        }
    }

    #[test]
    fn mine_e_others_particionam_o_escopo() {
        let me = Uuid::new_v4();
        let colleague = Uuid::new_v4();
        let third = Uuid::new_v4();
        let scope = VisibilityScope::Owners(vec![me, colleague, third]);

        let mine = resolve_owner_selection(&scope, me, None, OwnerFilter::Mine);
        let others = resolve_owner_selection(&scope, me, None, OwnerFilter::Others);
        let all = resolve_owner_selection(&scope, me, None, OwnerFilter::All);

        // Todo dono do escopo cai em exatamente um dos dois lados.
        for owner in [me, colleague, third] {
            assert!(all.matches(owner));
            assert_ne!(mine.matches(owner), others.matches(owner));
        }
        // E ninguém de fora aparece em lado nenhum.
        let outsider = Uuid::new_v4();
        assert!(!mine.matches(outsider));
        assert!(!others.matches(outsider));
        assert!(!all.matches(outsider));
    }

    #[test]
    fn particao_vale_tambem_para_admin() {
        let me = Uuid::new_v4();
        let scope = VisibilityScope::All;

        let mine = resolve_owner_selection(&scope, me, None, OwnerFilter::Mine);
        let others = resolve_owner_selection(&scope, me, None, OwnerFilter::Others);

        assert_eq!(mine, OwnerSelection::Owners(vec![me]));
        assert_eq!(others, OwnerSelection::AllExcept(me));
        let someone = Uuid::new_v4();
        assert!(others.matches(someone));
        assert!(!others.matches(me));
        assert!(mine.matches(me));
    }

    #[test]
    fn owner_id_fora_do_escopo_vira_selecao_vazia() {
        let me = Uuid::new_v4();
        let admin_dono = Uuid::new_v4();
        // bdc_manager: escopo materializado sem admins.
        let scope = VisibilityScope::Owners(vec![me]);

        let sel = resolve_owner_selection(&scope, me, Some(admin_dono), OwnerFilter::All);
        assert_eq!(sel, OwnerSelection::Empty);
        assert!(sel.into_sql_params().is_none());
    }

    #[test]
    fn owner_id_dentro_do_escopo_restringe_a_um_dono() {
        let me = Uuid::new_v4();
        let colleague = Uuid::new_v4();
        let scope = VisibilityScope::Owners(vec![me, colleague]);

        let sel = resolve_owner_selection(&scope, me, Some(colleague), OwnerFilter::All);
        assert_eq!(sel, OwnerSelection::Owners(vec![colleague]));

        // Interseção com mine: colega não é "meu" -> vazio.
        let sel = resolve_owner_selection(&scope, me, Some(colleague), OwnerFilter::Mine);
        assert_eq!(sel, OwnerSelection::Empty);

        let sel = resolve_owner_selection(&scope, me, Some(colleague), OwnerFilter::Others);
        assert_eq!(sel, OwnerSelection::Owners(vec![colleague]));
    }

    #[test]
    fn telemarketer_sem_colegas_nao_tem_others() {
        let me = Uuid::new_v4();
        let scope = VisibilityScope::Owners(vec![me]);
        let sel = resolve_owner_selection(&scope, me, None, OwnerFilter::Others);
        assert_eq!(sel, OwnerSelection::Empty);
    }

    #[test]
    fn busca_casa_nome_sobrenome_e_telefone_normalizado() {
        let owner = Uuid::new_v4();
        let c = client(owner, "Maria", "Fernandes", Some("(407) 555-0133"));

        assert!(matches_search(&c, "mari"));
        assert!(matches_search(&c, "FERNANDES"));
        assert!(matches_search(&c, "4075550133"));
        assert!(matches_search(&c, "555-0133"));
        assert!(!matches_search(&c, "jose"));
        assert!(!matches_search(&c, "9999"));
    }

    #[test]
    fn busca_vazia_nao_filtra_nada() {
        let c = client(Uuid::new_v4(), "Maria", "Fernandes", None);
        assert!(matches_search(&c, "  "));
    }

    #[test]
    fn exclude_sold_corta_venda_concluida() {
        let owner = Uuid::new_v4();
        let sold = summary(owner, Some(FinanceStatus::Sold));
        let delivered = summary(owner, Some(FinanceStatus::Delivered));
        let pending = summary(owner, Some(FinanceStatus::Pending));
        let sem_cartilha = summary(owner, None);

        assert!(!passes_sold_filter(&sold, true));
        assert!(!passes_sold_filter(&delivered, true));
        assert!(passes_sold_filter(&pending, true));
        assert!(passes_sold_filter(&sem_cartilha, true));

        // Sem o filtro, todo mundo passa.
        assert!(passes_sold_filter(&sold, false));
    }

    #[test]
    fn normalizacao_de_telefone_so_mantem_digitos() {
        assert_eq!(normalize_phone("+1 (407) 555-0133"), "14075550133");
        assert_eq!(normalize_phone("sem numero"), "");
    }
}
