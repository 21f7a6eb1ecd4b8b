// src/middleware/auth.rs

use axum::{
    extract::State,
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::{common::error::AppError, config::AppState, models::auth::User};

// O middleware em si: valida o Bearer token e pendura o usuário nos
// extensions da requisição. Quem decide o NÍVEL de acesso são os extractors
// abaixo, por rota.
pub async fn auth_guard(
    State(app_state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(AppError::InvalidToken)?;

    let user = app_state.auth_service.validate_token(bearer.token()).await?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

// Extrator para obter o usuário autenticado diretamente nos handlers.
// NÃO garante aprovação — serve só para rotas tipo /me.
pub struct AuthenticatedUser(pub User);

impl<S> axum::extract::FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<User>()
            .cloned()
            .map(AuthenticatedUser)
            .ok_or(AppError::InvalidToken)
    }
}

// A pré-condição de TODA operação de dados: autenticado + aprovado + ativo.
// Checada uma vez aqui, nunca re-derivada dentro dos serviços.
pub struct ApprovedUser(pub User);

impl<S> axum::extract::FromRequestParts<S> for ApprovedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<User>()
            .cloned()
            .ok_or(AppError::InvalidToken)?;

        if !user.approved || !user.active {
            return Err(AppError::Unauthorized);
        }
        Ok(ApprovedUser(user))
    }
}

// Guardião das rotas administrativas (usuários, lixeira, job de marketing).
pub struct AdminUser(pub User);

impl<S> axum::extract::FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let ApprovedUser(user) = ApprovedUser::from_request_parts(parts, state).await?;
        if !user.role.is_admin() {
            return Err(AppError::Forbidden(
                "Esta rota é exclusiva de admins.".to_string(),
            ));
        }
        Ok(AdminUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::Role;
    use axum::extract::FromRequestParts;
    use chrono::Utc;
    use uuid::Uuid;

    fn user(role: Role, approved: bool, active: bool) -> User {
        User {
            id: Uuid::new_v4(),
            full_name: "Teste".to_string(),
            email: "t@t.com".to_string(),
            password_hash: "x".to_string(),
            role,
            approved,
            active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn parts_with(user: User) -> Parts {
        let mut request = axum::http::Request::new(());
        request.extensions_mut().insert(user);
        request.into_parts().0
    }

    #[tokio::test]
    async fn nao_aprovado_barra_antes_de_qualquer_dado() {
        let mut parts = parts_with(user(Role::Salesperson, false, true));
        let result = ApprovedUser::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::Unauthorized)));

        // /me continua funcionando: o extractor básico não exige aprovação.
        let mut parts = parts_with(user(Role::Salesperson, false, true));
        assert!(AuthenticatedUser::from_request_parts(&mut parts, &())
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn desativado_barra_mesmo_aprovado() {
        let mut parts = parts_with(user(Role::Admin, true, false));
        let result = ApprovedUser::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn admin_user_exige_o_papel() {
        let mut parts = parts_with(user(Role::BdcManager, true, true));
        let result = AdminUser::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        let mut parts = parts_with(user(Role::Admin, true, true));
        assert!(AdminUser::from_request_parts(&mut parts, &()).await.is_ok());
    }
}
