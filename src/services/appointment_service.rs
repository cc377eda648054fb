// src/services/appointment_service.rs

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AppointmentRepository, ProfileRepository},
    models::{
        appointments::{Appointment, AppointmentStatus, Frequency},
        auth::{Role, User},
        notifications::NotificationKind,
    },
    services::{billing_service::BillingService, notification_service::NotificationService},
};

/// Horizonte fixo de geração de recorrências: 3 meses a partir do início.
/// Não há regeração automática depois disso; renovar é ação explícita.
pub const RECURRENCE_HORIZON_DAYS: i64 = 90;

/// Expande a regra de recorrência em timestamps de ocorrência.
///
/// Função pura: quem persiste é o chamador, dentro da transação de criação.
/// - `SingleEvent`: devolve os horários informados, exatamente como vieram.
/// - `Weekly`/`Biweekly`: passos de 7/14 dias a partir do início, incluindo
///   as duas pontas, enquanto não ultrapassar o horizonte.
pub fn expand_occurrences(
    start_date: DateTime<Utc>,
    frequency: Frequency,
    explicit_times: &[DateTime<Utc>],
) -> Vec<DateTime<Utc>> {
    let step = match frequency {
        Frequency::SingleEvent => return explicit_times.to_vec(),
        Frequency::Weekly => Duration::days(7),
        Frequency::Biweekly => Duration::days(14),
    };

    let horizon = start_date + Duration::days(RECURRENCE_HORIZON_DAYS);
    let mut occurrences = Vec::new();
    let mut current = start_date;
    while current <= horizon {
        occurrences.push(current);
        current += step;
    }
    occurrences
}

/// Valida a transição da máquina de estados:
/// `Scheduled -> Completed | Cancelled`, terminais não saem pelo fluxo normal.
pub fn ensure_transition(
    current: AppointmentStatus,
    new_status: AppointmentStatus,
) -> Result<(), AppError> {
    if current.is_terminal() {
        return Err(AppError::InvalidInput(format!(
            "Consulta em estado terminal ({:?}) não pode mudar para {:?}.",
            current, new_status
        )));
    }
    Ok(())
}

pub struct CreatedBooking {
    pub series_id: Option<Uuid>,
    pub appointments: Vec<Appointment>,
}

#[derive(Clone)]
pub struct AppointmentService {
    pool: PgPool,
    appointment_repo: AppointmentRepository,
    profile_repo: ProfileRepository,
    billing_service: BillingService,
    notification_service: NotificationService,
}

impl AppointmentService {
    pub fn new(
        pool: PgPool,
        appointment_repo: AppointmentRepository,
        profile_repo: ProfileRepository,
        billing_service: BillingService,
        notification_service: NotificationService,
    ) -> Self {
        Self {
            pool,
            appointment_repo,
            profile_repo,
            billing_service,
            notification_service,
        }
    }

    // =========================================================================
    //  CRIAÇÃO (regra de recorrência -> ocorrências)
    // =========================================================================

    /// Cria as ocorrências de um agendamento. Recorrente ganha uma série;
    /// sessão avulsa vira consultas sem série. Tudo numa transação só.
    pub async fn create_booking(
        &self,
        actor: &User,
        patient_id: Uuid,
        frequency: Frequency,
        start_date: Option<DateTime<Utc>>,
        explicit_times: &[DateTime<Utc>],
        session_value: Option<Decimal>,
    ) -> Result<CreatedBooking, AppError> {
        // Só o psicólogo agenda, e sempre em nome do próprio perfil
        let professional = self
            .profile_repo
            .find_professional_by_user_id(actor.id)
            .await?
            .ok_or_else(|| {
                AppError::Forbidden("Apenas psicólogos podem criar agendamentos.".into())
            })?;

        let patient = self
            .profile_repo
            .find_patient_by_id(patient_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Paciente {}", patient_id)))?;

        // Rejeita antes de persistir qualquer coisa. Para recorrência,
        // guarda a data de início que vira a âncora da série.
        let (occurrences, series_start) = match frequency {
            Frequency::SingleEvent => {
                if explicit_times.is_empty() {
                    return Err(AppError::InvalidInput(
                        "Sessão avulsa exige ao menos um horário.".into(),
                    ));
                }
                (expand_occurrences(Utc::now(), frequency, explicit_times), None)
            }
            Frequency::Weekly | Frequency::Biweekly => {
                let start = start_date.ok_or_else(|| {
                    AppError::InvalidInput("Agendamento recorrente exige data de início.".into())
                })?;
                (expand_occurrences(start, frequency, &[]), Some(start))
            }
        };

        // --- INÍCIO DA TRANSAÇÃO ---
        let mut tx = self.pool.begin().await?;

        // Série só existe para frequência recorrente
        let series_id = match series_start {
            None => None,
            Some(start) => {
                let series = self
                    .appointment_repo
                    .create_series(
                        &mut *tx,
                        professional.id,
                        patient.id,
                        start,
                        frequency,
                        session_value,
                    )
                    .await?;
                Some(series.id)
            }
        };

        let mut appointments = Vec::with_capacity(occurrences.len());
        for occurrence in &occurrences {
            let appointment = self
                .appointment_repo
                .insert_appointment(
                    &mut *tx,
                    series_id,
                    professional.id,
                    patient.id,
                    *occurrence,
                    session_value,
                )
                .await?;
            appointments.push(appointment);
        }

        tx.commit().await?;
        // --- FIM DA TRANSAÇÃO ---

        // Pós-commit, best-effort: aviso ao paciente + refresh das listas
        let message = format!(
            "Novo agendamento com {} ({} sessão(ões)).",
            professional.full_name,
            appointments.len()
        );
        if let Err(e) = self
            .notification_service
            .notify(patient.user_id, NotificationKind::NewAppointment, &message)
            .await
        {
            tracing::error!("Falha ao notificar paciente do agendamento: {}", e);
        }
        self.notification_service.broadcast_appointments_changed();

        Ok(CreatedBooking { series_id, appointments })
    }

    // =========================================================================
    //  MÁQUINA DE ESTADOS
    // =========================================================================

    /// Aplica uma transição de status. Quando a consulta é concluída com
    /// valor de sessão positivo, a cobrança roda NA MESMA transação; os
    /// avisos (push, e-mail) só rodam depois do commit.
    pub async fn set_status(
        &self,
        actor: &User,
        appointment_id: Uuid,
        new_status: AppointmentStatus,
    ) -> Result<Appointment, AppError> {
        let appointment = self
            .appointment_repo
            .find_by_id(&self.pool, appointment_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Consulta {}", appointment_id)))?;

        // Autorização: o ator precisa ser o psicólogo dono da consulta
        let professional = self
            .profile_repo
            .find_professional_by_user_id(actor.id)
            .await?
            .ok_or_else(|| {
                AppError::Forbidden("Apenas o psicólogo da consulta altera o status.".into())
            })?;
        if professional.id != appointment.professional_id {
            return Err(AppError::Forbidden(
                "A consulta pertence a outro profissional.".into(),
            ));
        }

        ensure_transition(appointment.status, new_status)?;

        // --- INÍCIO DA TRANSAÇÃO ---
        let mut tx = self.pool.begin().await?;

        let updated = self
            .appointment_repo
            .update_status(&mut *tx, appointment_id, new_status)
            .await?;

        // Conclusão com valor de sessão dispara a cobrança, atomicamente
        let billing = if new_status == AppointmentStatus::Completed {
            self.billing_service.charge_for_completion(&mut tx, &updated).await?
        } else {
            None
        };

        tx.commit().await?;
        // --- FIM DA TRANSAÇÃO ---

        // Pós-commit, best-effort e isolado por efeito:

        // 1. Sinal de refresh para quem mantém listas abertas
        self.notification_service.broadcast_appointments_changed();

        // 2. Aviso dirigido ao paciente sobre o novo status
        self.notify_patient_of_status(&updated).await;

        // 3. Efeitos da cobrança (notificação do pagador + e-mail)
        if let Some(billing) = billing {
            self.billing_service.post_commit_effects(&billing).await;
        }

        Ok(updated)
    }

    async fn notify_patient_of_status(&self, appointment: &Appointment) {
        let patient = match self.profile_repo.find_patient_by_id(appointment.patient_id).await {
            Ok(Some(p)) => p,
            Ok(None) => {
                tracing::error!(patient_id = %appointment.patient_id, "Paciente da consulta não encontrado");
                return;
            }
            Err(e) => {
                tracing::error!("Falha ao buscar paciente para notificação: {}", e);
                return;
            }
        };

        let date = appointment.appointment_time.format("%d/%m/%Y");
        let message = match appointment.status {
            AppointmentStatus::Completed => format!("Sua consulta de {} foi realizada.", date),
            AppointmentStatus::Cancelled => format!("Sua consulta de {} foi cancelada.", date),
            AppointmentStatus::Scheduled => format!("Sua consulta foi remarcada para {}.", date),
        };

        if let Err(e) = self
            .notification_service
            .notify(patient.user_id, NotificationKind::AppointmentRescheduled, &message)
            .await
        {
            tracing::error!("Falha ao notificar paciente da mudança de status: {}", e);
        }
    }

    // =========================================================================
    //  LISTAGEM POR PAPEL
    // =========================================================================

    /// Cada papel enxerga só o que é dele: psicólogo as próprias consultas,
    /// paciente as suas, empresa as dos conveniados, admin todas.
    pub async fn list_for(&self, actor: &User) -> Result<Vec<Appointment>, AppError> {
        match actor.role {
            Role::Admin => self.appointment_repo.list_all().await,
            Role::Professional => {
                let professional = self
                    .profile_repo
                    .find_professional_by_user_id(actor.id)
                    .await?
                    .ok_or_else(|| AppError::ResourceNotFound("Perfil de psicólogo".into()))?;
                self.appointment_repo.list_by_professional(professional.id).await
            }
            Role::Patient => {
                let patient = self
                    .profile_repo
                    .find_patient_by_user_id(actor.id)
                    .await?
                    .ok_or_else(|| AppError::ResourceNotFound("Perfil de paciente".into()))?;
                self.appointment_repo.list_by_patient(patient.id).await
            }
            Role::Company => {
                let company = self
                    .profile_repo
                    .find_company_by_user_id(actor.id)
                    .await?
                    .ok_or_else(|| AppError::ResourceNotFound("Perfil de empresa".into()))?;
                self.appointment_repo.list_by_company(company.id).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn dt(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 14, 0, 0).unwrap()
    }

    #[test]
    fn semanal_gera_ocorrencias_de_7_em_7_dias() {
        let start = dt(2026, 1, 5);
        let occurrences = expand_occurrences(start, Frequency::Weekly, &[]);

        // Inclui o início
        assert_eq!(occurrences[0], start);
        // Espaçamento exato de 7 dias
        for pair in occurrences.windows(2) {
            assert_eq!(pair[1] - pair[0], Duration::days(7));
        }
        // Nenhuma ocorrência além do horizonte de 90 dias
        let horizon = start + Duration::days(RECURRENCE_HORIZON_DAYS);
        assert!(occurrences.iter().all(|t| *t <= horizon));
        // 0, 7, ..., 84 dias -> 13 ocorrências
        assert_eq!(occurrences.len(), 13);
    }

    #[test]
    fn quinzenal_gera_ocorrencias_de_14_em_14_dias() {
        let start = dt(2026, 1, 5);
        let occurrences = expand_occurrences(start, Frequency::Biweekly, &[]);

        assert_eq!(occurrences[0], start);
        for pair in occurrences.windows(2) {
            assert_eq!(pair[1] - pair[0], Duration::days(14));
        }
        // 0, 14, ..., 84 dias -> 7 ocorrências
        assert_eq!(occurrences.len(), 7);
    }

    #[test]
    fn ultima_ocorrencia_respeita_o_horizonte() {
        // 90 não é múltiplo de 7: a última semanal cai no dia 84 e a
        // seguinte (91) já passaria do horizonte.
        let start = dt(2026, 1, 5);
        let occurrences = expand_occurrences(start, Frequency::Weekly, &[]);
        let last = *occurrences.last().unwrap();
        assert_eq!(last - start, Duration::days(84));
        assert!(last + Duration::days(7) > start + Duration::days(RECURRENCE_HORIZON_DAYS));
    }

    #[test]
    fn sessao_avulsa_devolve_horarios_informados() {
        let times = vec![dt(2026, 3, 1), dt(2026, 3, 15)];
        let occurrences = expand_occurrences(dt(2026, 1, 1), Frequency::SingleEvent, &times);
        assert_eq!(occurrences, times);
    }

    #[test]
    fn transicao_a_partir_de_agendada_e_aceita() {
        assert!(ensure_transition(AppointmentStatus::Scheduled, AppointmentStatus::Completed).is_ok());
        assert!(ensure_transition(AppointmentStatus::Scheduled, AppointmentStatus::Cancelled).is_ok());
    }

    #[test]
    fn estado_terminal_nao_transiciona() {
        assert!(matches!(
            ensure_transition(AppointmentStatus::Completed, AppointmentStatus::Cancelled),
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            ensure_transition(AppointmentStatus::Cancelled, AppointmentStatus::Scheduled),
            Err(AppError::InvalidInput(_))
        ));
    }
}
