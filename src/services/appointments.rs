// src/services/appointments.rs

use std::sync::Arc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AppointmentRepository, ClientRepository},
    models::{
        appointments::{
            Appointment, AppointmentCreated, AppointmentStatus, CreateAppointmentPayload,
        },
        auth::User,
    },
    services::{
        notifications::{EmailSender, SmsSender},
        scope::{ensure_owner_or_admin, ScopeResolver},
    },
};

#[derive(Clone)]
pub struct AppointmentService {
    repo: AppointmentRepository,
    client_repo: ClientRepository,
    resolver: ScopeResolver,
    sms: Arc<dyn SmsSender>,
    email: Arc<dyn EmailSender>,
}

impl AppointmentService {
    pub fn new(
        repo: AppointmentRepository,
        client_repo: ClientRepository,
        resolver: ScopeResolver,
        sms: Arc<dyn SmsSender>,
        email: Arc<dyn EmailSender>,
    ) -> Self {
        Self {
            repo,
            client_repo,
            resolver,
            sms,
            email,
        }
    }

    // Cria o agendamento e dispara as notificações best-effort. O resultado
    // dos envios vai no metadado da resposta; falha de provedor NUNCA falha a
    // criação.
    pub async fn create_appointment(
        &self,
        actor: &User,
        payload: &CreateAppointmentPayload,
    ) -> Result<AppointmentCreated, AppError> {
        let scope = self.resolver.resolve(actor).await?;
        let client = self
            .client_repo
            .find_by_id(payload.client_id)
            .await?
            .filter(|c| !c.is_deleted && scope.contains(c.created_by))
            .ok_or(AppError::NotFound)?;

        let appointment = self
            .repo
            .create(
                payload.client_id,
                payload.opportunity_id,
                actor.id,
                payload.scheduled_at,
                payload.notes.as_deref(),
            )
            .await?;

        let mut notifications = Vec::new();
        let when = appointment
            .scheduled_at
            .format("%d/%m/%Y %H:%M")
            .to_string();

        // Opt-out de SMS é respeitado também no disparo por evento.
        if let Some(phone) = client.phone.as_deref().filter(|_| !client.opt_out_sms) {
            let body = format!("Olá {}, seu atendimento foi agendado para {}.", client.first_name, when);
            notifications.push(self.sms.send(phone, &body).await);
        }
        if let Some(email) = client.email.as_deref() {
            let body = format!(
                "Olá {}, confirmamos seu atendimento na loja para {}.",
                client.first_name, when
            );
            notifications.push(self.email.send(email, "Atendimento agendado", &body).await);
        }

        Ok(AppointmentCreated {
            appointment,
            notifications,
        })
    }

    pub async fn list_appointments(
        &self,
        actor: &User,
        client_id: Option<Uuid>,
    ) -> Result<Vec<Appointment>, AppError> {
        let scope = self.resolver.resolve(actor).await?;
        let owners = scope.owner_params().map(|ids| ids.to_vec());
        self.repo.list(owners, client_id).await
    }

    pub async fn update_status(
        &self,
        actor: &User,
        id: Uuid,
        status: AppointmentStatus,
    ) -> Result<Appointment, AppError> {
        let scope = self.resolver.resolve(actor).await?;
        let appointment = self
            .repo
            .find_by_id(id)
            .await?
            .filter(|a| scope.contains(a.salesperson_id))
            .ok_or(AppError::NotFound)?;

        ensure_owner_or_admin(appointment.salesperson_id, actor)?;
        self.repo.update_status(id, status).await
    }
}
