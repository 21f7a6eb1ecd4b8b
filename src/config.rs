// src/config.rs

use std::{env, sync::Arc, time::Duration};

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        AppointmentRepository, ClientRepository, DashboardRepository, OpportunityRepository,
        UserRepository,
    },
    services::{
        appointments::AppointmentService,
        auth::AuthService,
        clients::ClientService,
        dashboard::DashboardService,
        documents::{DisabledDocumentStore, DocumentStore, HttpDocumentStore},
        notifications::{DisabledSender, EmailSender, HttpEmailSender, HttpSmsSender, SmsSender},
        opportunities::OpportunityService,
        scheduler::MarketingScheduler,
        scope::ScopeResolver,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_secret: String,
    pub auth_service: AuthService,
    pub client_service: ClientService,
    pub opportunity_service: OpportunityService,
    pub appointment_service: AppointmentService,
    pub dashboard_service: DashboardService,
    pub marketing_scheduler: MarketingScheduler,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");

        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // Provedores externos: sem as variáveis, cai no adapter desabilitado
        // (a operação segue, o envio vira SendOutcome de falha logado).
        let sms: Arc<dyn SmsSender> = match (env::var("SMS_API_URL"), env::var("SMS_API_KEY")) {
            (Ok(url), Ok(key)) => Arc::new(HttpSmsSender::new(url, key)),
            _ => {
                tracing::warn!("SMS_API_URL/SMS_API_KEY ausentes; envio de SMS desabilitado.");
                Arc::new(DisabledSender)
            }
        };
        let email: Arc<dyn EmailSender> =
            match (env::var("EMAIL_API_URL"), env::var("EMAIL_API_KEY")) {
                (Ok(url), Ok(key)) => Arc::new(HttpEmailSender::new(url, key)),
                _ => {
                    tracing::warn!(
                        "EMAIL_API_URL/EMAIL_API_KEY ausentes; envio de e-mail desabilitado."
                    );
                    Arc::new(DisabledSender)
                }
            };
        let documents: Arc<dyn DocumentStore> =
            match (env::var("DOCS_API_URL"), env::var("DOCS_API_KEY")) {
                (Ok(url), Ok(key)) => Arc::new(HttpDocumentStore::new(url, key)),
                _ => Arc::new(DisabledDocumentStore),
            };

        let marketing_interval_secs: u64 = env::var("MARKETING_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3600);
        let marketing_cooldown_days: i32 = env::var("MARKETING_COOLDOWN_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let client_repo = ClientRepository::new(db_pool.clone());
        let opportunity_repo = OpportunityRepository::new(db_pool.clone());
        let appointment_repo = AppointmentRepository::new(db_pool.clone());
        let dashboard_repo = DashboardRepository::new(db_pool.clone());

        let resolver = ScopeResolver::new(user_repo.clone());

        let auth_service = AuthService::new(user_repo, jwt_secret.clone());
        let client_service =
            ClientService::new(client_repo.clone(), resolver.clone(), documents);
        let opportunity_service = OpportunityService::new(
            opportunity_repo,
            client_repo.clone(),
            resolver.clone(),
        );
        let appointment_service = AppointmentService::new(
            appointment_repo,
            client_repo.clone(),
            resolver.clone(),
            sms.clone(),
            email,
        );
        let dashboard_service = DashboardService::new(dashboard_repo, resolver);
        let marketing_scheduler = MarketingScheduler::new(
            client_repo,
            sms,
            Duration::from_secs(marketing_interval_secs),
            marketing_cooldown_days,
        );

        Ok(Self {
            db_pool,
            jwt_secret,
            auth_service,
            client_service,
            opportunity_service,
            appointment_service,
            dashboard_service,
            marketing_scheduler,
        })
    }
}
