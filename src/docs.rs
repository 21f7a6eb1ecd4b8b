// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Clientes ---
        handlers::clients::list_clients,
        handlers::clients::create_client,
        handlers::clients::get_client,
        handlers::clients::update_client,
        handlers::clients::soft_delete_client,
        handlers::clients::restore_client,
        handlers::clients::list_cosigners,
        handlers::clients::link_cosigner,
        handlers::clients::unlink_cosigner,

        // --- Cartilhas ---
        handlers::opportunities::list_opportunities,
        handlers::opportunities::create_opportunity,
        handlers::opportunities::get_opportunity,
        handlers::opportunities::update_finance_status,
        handlers::opportunities::soft_delete_opportunity,
        handlers::opportunities::restore_opportunity,

        // --- Agendamentos ---
        handlers::appointments::list_appointments,
        handlers::appointments::create_appointment,
        handlers::appointments::update_appointment_status,

        // --- Dashboard ---
        handlers::dashboard::stats,
        handlers::dashboard::salesperson_performance,

        // --- Admin ---
        handlers::users::list_users,
        handlers::users::approve_user,
        handlers::users::set_user_active,
        handlers::trash::list_trash_clients,
        handlers::trash::list_trash_opportunities,
        handlers::trash::purge_client,
        handlers::trash::purge_opportunity,
        handlers::trash::run_marketing_job,
    ),
    components(schemas(
        models::auth::User,
        models::auth::Role,
        models::auth::RegisterUserPayload,
        models::auth::LoginUserPayload,
        models::auth::AuthResponse,
        models::clients::Client,
        models::clients::ClientSummary,
        models::clients::ClientDetail,
        models::clients::DocumentChecklist,
        models::clients::CoSignerRelation,
        models::clients::CreateClientPayload,
        models::clients::UpdateClientPayload,
        models::clients::LinkCoSignerPayload,
        models::opportunities::Opportunity,
        models::opportunities::FinanceStatus,
        models::opportunities::CreateOpportunityPayload,
        models::opportunities::UpdateFinanceStatusPayload,
        models::appointments::Appointment,
        models::appointments::AppointmentCreated,
        models::appointments::AppointmentStatus,
        models::appointments::CreateAppointmentPayload,
        models::appointments::UpdateAppointmentStatusPayload,
        models::dashboard::DashboardStats,
        models::dashboard::SalespersonPerformance,
        services::notifications::SendOutcome,
        services::clients::OwnerFilter,
        handlers::users::SetActivePayload,
    )),
    tags(
        (name = "Auth", description = "Cadastro, login e sessão"),
        (name = "Clientes", description = "Clientes, co-signers e ciclo de vida"),
        (name = "Cartilhas", description = "Oportunidades de venda e cadeia de versões"),
        (name = "Agendamentos", description = "Atendimentos agendados"),
        (name = "Dashboard", description = "Agregados por escopo de visibilidade"),
        (name = "Admin", description = "Usuários, lixeira e job de marketing"),
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    pub fn with_security() -> utoipa::openapi::OpenApi {
        let mut doc = <ApiDoc as OpenApi>::openapi();
        if let Some(components) = doc.components.as_mut() {
            components.add_security_scheme(
                "api_jwt",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
        doc
    }
}
