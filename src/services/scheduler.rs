// src/services/scheduler.rs
//
// O único estado de longa duração do processo: o job periódico de SMS de
// marketing. É uma task explícita, criada no startup e abortada no shutdown;
// fora o banco, não há estado mutável compartilhado. O tick e os handlers de
// requisição rodam concorrentes sobre o mesmo store — os candidatos são
// refiltrados a cada tick, então um cliente deletado/opt-out entre ticks
// simplesmente some da seleção.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::{common::error::AppError, db::ClientRepository, services::notifications::SmsSender};

const BATCH_LIMIT: i64 = 100;

#[derive(Clone)]
pub struct MarketingScheduler {
    client_repo: ClientRepository,
    sms: Arc<dyn SmsSender>,
    interval: Duration,
    cooldown_days: i32,
}

impl MarketingScheduler {
    pub fn new(
        client_repo: ClientRepository,
        sms: Arc<dyn SmsSender>,
        interval: Duration,
        cooldown_days: i32,
    ) -> Self {
        Self {
            client_repo,
            sms,
            interval,
            cooldown_days,
        }
    }

    // Um tick: seleciona os elegíveis e dispara. Retorna quantos envios
    // tiveram sucesso (o endpoint de admin usa isso como resposta).
    pub async fn run_once(&self) -> Result<u64, AppError> {
        let candidates = self
            .client_repo
            .marketing_candidates(self.cooldown_days, BATCH_LIMIT)
            .await?;

        let mut sent = 0u64;
        for client in candidates {
            let Some(phone) = client.phone.as_deref() else {
                continue;
            };
            let body = format!(
                "Olá {}, temos novas condições de financiamento na loja. Responda SAIR para não receber mais.",
                client.first_name
            );
            let outcome = self.sms.send(phone, &body).await;
            if outcome.success {
                sent += 1;
            }
            // Marca contato mesmo em falha de provedor: evita martelar o
            // mesmo telefone a cada tick enquanto o gateway está fora.
            self.client_repo.touch_last_contacted(client.id).await?;
        }

        if sent > 0 {
            tracing::info!("📣 Job de marketing: {} SMS enviados.", sent);
        }
        Ok(sent)
    }

    // Task recorrente, dona do loop. O handle devolvido pertence ao main, que
    // o aborta no shutdown.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            // O primeiro tick do interval é imediato; pula para não disparar
            // marketing durante o boot.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if let Err(e) = self.run_once().await {
                    tracing::error!("Tick do job de marketing falhou: {}", e);
                }
            }
        })
    }
}
