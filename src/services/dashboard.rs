// src/services/dashboard.rs

use chrono::{DateTime, Datelike, Months, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{dashboard_repo::PeriodRange, DashboardRepository},
    models::{
        auth::{Role, User},
        dashboard::{DashboardStats, SalespersonPerformance},
    },
    services::scope::{ScopeResolver, VisibilityScope},
};

// Período do dashboard: "all", "month" (mês corrente), "6months" (janela
// móvel) ou um mês específico "YYYY-MM". Token não reconhecido degrada para
// All — fail-soft, igual ao userId inexistente que responde tudo zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    All,
    CurrentMonth,
    SixMonths,
    Month { year: i32, month: u32 },
}

impl Period {
    pub fn parse(raw: Option<&str>) -> Period {
        let raw = match raw {
            Some(r) => r.trim(),
            None => return Period::All,
        };
        match raw {
            "" | "all" => Period::All,
            "month" => Period::CurrentMonth,
            "6months" => Period::SixMonths,
            other => match parse_year_month(other) {
                Some((year, month)) => Period::Month { year, month },
                None => Period::All,
            },
        }
    }

    // Intervalo meio-aberto [início, fim) em UTC; None = sem recorte.
    pub fn range(&self, now: DateTime<Utc>) -> PeriodRange {
        match self {
            Period::All => None,
            Period::CurrentMonth => {
                let start = month_start(now.year(), now.month());
                Some((start, start + Months::new(1)))
            }
            Period::SixMonths => {
                let end = now;
                Some((end - Months::new(6), end))
            }
            Period::Month { year, month } => {
                let start = month_start(*year, *month);
                Some((start, start + Months::new(1)))
            }
        }
    }

    // Eco para o campo current_period da resposta.
    pub fn token(&self) -> String {
        match self {
            Period::All => "all".to_string(),
            Period::CurrentMonth => "month".to_string(),
            Period::SixMonths => "6months".to_string(),
            Period::Month { year, month } => format!("{:04}-{:02}", year, month),
        }
    }
}

fn parse_year_month(raw: &str) -> Option<(i32, u32)> {
    let (y, m) = raw.split_once('-')?;
    if y.len() != 4 || m.len() != 2 {
        return None;
    }
    let year: i32 = y.parse().ok()?;
    let month: u32 = m.parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }
    Some((year, month))
}

fn month_start(year: i32, month: u32) -> DateTime<Utc> {
    // month já validado em 1..=12; dia 1 sempre existe.
    let date = NaiveDate::from_ymd_opt(year, month, 1)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(1970, 1, 1).expect("data fixa válida"));
    Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).expect("meia-noite válida"))
}

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
    resolver: ScopeResolver,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository, resolver: ScopeResolver) -> Self {
        Self { repo, resolver }
    }

    // `user_id` é o drill-down do admin. Para não-admin o parâmetro é
    // IGNORADO no servidor — escalar privilégio forjando query string não
    // pode funcionar, e esconder o campo na UI não é defesa.
    pub async fn stats(
        &self,
        actor: &User,
        period: Option<&str>,
        user_id: Option<Uuid>,
    ) -> Result<DashboardStats, AppError> {
        let scope = self.resolver.resolve(actor).await?;

        let owners: Option<Vec<Uuid>> = if actor.role.is_admin() {
            // userId inexistente entra como recorte normal e rende contagens
            // zero, status 200 — o id é controlável pelo chamador.
            user_id.map(|id| vec![id])
        } else {
            scope.owner_params().map(|ids| ids.to_vec())
        };

        let period = Period::parse(period);
        let raw = self.repo.stats(owners, period.range(Utc::now())).await?;

        Ok(DashboardStats {
            total_clients: raw.total_clients,
            sold_in_period: raw.sold_in_period,
            appointments_in_period: raw.appointments_in_period,
            total_opportunities: raw.total_opportunities,
            current_period: period.token(),
        })
    }

    // Capacidade exclusiva de admin e bdc_manager. O recorte vem do escopo,
    // então o resultado do bdc_manager estruturalmente não contém admins.
    pub async fn salesperson_performance(
        &self,
        actor: &User,
    ) -> Result<Vec<SalespersonPerformance>, AppError> {
        match actor.role {
            Role::Admin | Role::BdcManager => {}
            Role::Telemarketer | Role::Salesperson => {
                return Err(AppError::Forbidden(
                    "Seu papel não tem acesso ao relatório de performance.".to_string(),
                ));
            }
        }

        let scope = self.resolver.resolve(actor).await?;
        let owners = match scope {
            VisibilityScope::All => None,
            VisibilityScope::Owners(ids) => Some(ids),
        };
        self.repo.performance(owners).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_conhecidos() {
        assert_eq!(Period::parse(Some("all")), Period::All);
        assert_eq!(Period::parse(Some("month")), Period::CurrentMonth);
        assert_eq!(Period::parse(Some("6months")), Period::SixMonths);
        assert_eq!(
            Period::parse(Some("2026-05")),
            Period::Month {
                year: 2026,
                month: 5
            }
        );
        assert_eq!(Period::parse(None), Period::All);
    }

    #[test]
    fn token_invalido_degrada_para_all() {
        assert_eq!(Period::parse(Some("ontem")), Period::All);
        assert_eq!(Period::parse(Some("2026-13")), Period::All);
        assert_eq!(Period::parse(Some("26-05")), Period::All);
        assert_eq!(Period::parse(Some("2026-5")), Period::All);
    }

    #[test]
    fn eco_do_periodo_resolvido() {
        assert_eq!(Period::parse(Some("2026-05")).token(), "2026-05");
        assert_eq!(Period::parse(Some("lixo")).token(), "all");
        assert_eq!(Period::CurrentMonth.token(), "month");
    }

    #[test]
    fn intervalo_de_mes_especifico_e_meio_aberto() {
        let period = Period::Month {
            year: 2026,
            month: 1,
        };
        let (start, end) = period.range(Utc::now()).unwrap();
        assert_eq!(start.to_rfc3339(), "2026-01-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2026-02-01T00:00:00+00:00");
    }

    #[test]
    fn all_nao_recorta() {
        assert!(Period::All.range(Utc::now()).is_none());
    }

    #[test]
    fn seis_meses_e_janela_movel() {
        let now = Utc.with_ymd_and_hms(2026, 8, 29, 12, 0, 0).unwrap();
        let (start, end) = Period::SixMonths.range(now).unwrap();
        assert_eq!(end, now);
        assert_eq!(start, now - Months::new(6));
    }
}
