//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, patch, post},
    Router,
};
use tokio::net::TcpListener;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // O job de marketing pertence ao ciclo de vida do processo: nasce aqui e
    // é abortado no shutdown.
    let scheduler_handle = app_state.marketing_scheduler.clone().spawn();

    // Rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Rotas de usuário (o /me funciona mesmo pendente de aprovação)
    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let client_routes = Router::new()
        .route(
            "/",
            post(handlers::clients::create_client).get(handlers::clients::list_clients),
        )
        .route(
            "/{id}",
            get(handlers::clients::get_client)
                .put(handlers::clients::update_client)
                .delete(handlers::clients::soft_delete_client),
        )
        .route("/{id}/restore", post(handlers::clients::restore_client))
        .route(
            "/{id}/cosigners",
            get(handlers::clients::list_cosigners).post(handlers::clients::link_cosigner),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let cosigner_routes = Router::new()
        .route("/{id}", delete(handlers::clients::unlink_cosigner))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let opportunity_routes = Router::new()
        .route(
            "/",
            post(handlers::opportunities::create_opportunity)
                .get(handlers::opportunities::list_opportunities),
        )
        .route(
            "/{id}",
            get(handlers::opportunities::get_opportunity)
                .delete(handlers::opportunities::soft_delete_opportunity),
        )
        .route(
            "/{id}/finance-status",
            patch(handlers::opportunities::update_finance_status),
        )
        .route(
            "/{id}/restore",
            post(handlers::opportunities::restore_opportunity),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let appointment_routes = Router::new()
        .route(
            "/",
            post(handlers::appointments::create_appointment)
                .get(handlers::appointments::list_appointments),
        )
        .route(
            "/{id}/status",
            patch(handlers::appointments::update_appointment_status),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let dashboard_routes = Router::new()
        .route("/stats", get(handlers::dashboard::stats))
        .route(
            "/performance",
            get(handlers::dashboard::salesperson_performance),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Área administrativa: usuários, lixeira e gatilho do job de marketing.
    // O recorte de admin é feito pelo extractor AdminUser em cada handler.
    let admin_routes = Router::new()
        .route("/users", get(handlers::users::list_users))
        .route("/users/{id}/approve", post(handlers::users::approve_user))
        .route("/users/{id}/active", patch(handlers::users::set_user_active))
        .route("/trash/clients", get(handlers::trash::list_trash_clients))
        .route(
            "/trash/clients/{id}",
            delete(handlers::trash::purge_client),
        )
        .route(
            "/trash/opportunities",
            get(handlers::trash::list_trash_opportunities),
        )
        .route(
            "/trash/opportunities/{id}",
            delete(handlers::trash::purge_opportunity),
        )
        .route("/marketing/run", post(handlers::trash::run_marketing_job))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/clients", client_routes)
        .nest("/api/cosigners", cosigner_routes)
        .nest("/api/opportunities", opportunity_routes)
        .nest("/api/appointments", appointment_routes)
        .nest("/api/dashboard", dashboard_routes)
        .nest("/api/admin", admin_routes)
        .merge(
            SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", docs::ApiDoc::with_security()),
        )
        .with_state(app_state);

    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Erro no servidor Axum");

    // Shutdown: encerra o job periódico junto com o servidor.
    scheduler_handle.abort();
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Falha ao instalar o handler de Ctrl+C");
    tracing::info!("Sinal de shutdown recebido; encerrando.");
}
