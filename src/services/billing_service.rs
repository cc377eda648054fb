// src/services/billing_service.rs

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{BillingRepository, ProfileRepository, UserRepository},
    models::{
        appointments::Appointment,
        billing::Invoice,
        notifications::NotificationKind,
        profiles::PatientBillingInfo,
    },
    services::{
        email::{EmailNotifier, InvoiceEmailData},
        notification_service::NotificationService,
    },
};

/// Fração do valor da sessão retida pela plataforma (0,25 = 25%).
pub fn commission_rate() -> Decimal {
    Decimal::new(25, 2)
}

/// Prazo de vencimento da fatura, em dias corridos.
pub const INVOICE_DUE_DAYS: i64 = 15;

pub fn due_date_from(today: NaiveDate) -> NaiveDate {
    today + chrono::Duration::days(INVOICE_DUE_DAYS)
}

/// Quem paga a fatura. Função pura do perfil do paciente: havendo empresa
/// conveniada, o usuário dela SEMPRE vence; sem convênio, o próprio usuário
/// do paciente. O profissional nunca entra na resolução.
pub fn resolve_payer(info: &PatientBillingInfo) -> Uuid {
    info.company_user_id.unwrap_or(info.patient_user_id)
}

/// Resultado da fase transacional, carregado para os efeitos pós-commit.
#[derive(Debug, Clone)]
pub struct CompletedBilling {
    pub invoice: Invoice,
    pub payer_user_id: Uuid,
    pub patient_name: String,
}

#[derive(Clone)]
pub struct BillingService {
    billing_repo: BillingRepository,
    profile_repo: ProfileRepository,
    user_repo: UserRepository,
    notification_service: NotificationService,
    email_notifier: Arc<dyn EmailNotifier>,
}

impl BillingService {
    pub fn new(
        billing_repo: BillingRepository,
        profile_repo: ProfileRepository,
        user_repo: UserRepository,
        notification_service: NotificationService,
        email_notifier: Arc<dyn EmailNotifier>,
    ) -> Self {
        Self {
            billing_repo,
            profile_repo,
            user_repo,
            notification_service,
            email_notifier,
        }
    }

    /// Fase transacional da cobrança: registro de repasse + fatura, dentro
    /// da MESMA transação da mudança de status. Qualquer falha aqui desfaz
    /// tudo junto com a transição.
    ///
    /// Retorna `None` quando não há o que cobrar (sem valor de sessão) ou
    /// quando a cobrança já existia (reexecução absorvida pelo banco).
    pub async fn charge_for_completion(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        appointment: &Appointment,
    ) -> Result<Option<CompletedBilling>, AppError> {
        // 1. Valor bruto e comissão da plataforma
        let gross = match appointment.session_value {
            Some(v) if v > Decimal::ZERO => v,
            _ => return Ok(None),
        };
        let commission = (gross * commission_rate()).round_dp(2);

        // 2. Registro de cobrança idempotente (UNIQUE em appointment_id)
        let record = self
            .billing_repo
            .insert_billing_record(
                &mut **tx,
                appointment.professional_id,
                appointment.id,
                Utc::now().date_naive(),
                gross,
                commission,
            )
            .await?;

        if record.is_none() {
            // Reexecução (retry do cliente): a consulta já foi cobrada.
            tracing::warn!(
                appointment_id = %appointment.id,
                "Cobrança já existente para a consulta; nada a fazer"
            );
            return Ok(None);
        }

        // 3. Resolução do pagador a partir do perfil do paciente
        let info = self
            .profile_repo
            .find_patient_billing_info(&mut **tx, appointment.patient_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Paciente {}", appointment.patient_id)))?;
        let payer_user_id = resolve_payer(&info);

        let professional = self
            .profile_repo
            .find_professional_by_id(&mut **tx, appointment.professional_id)
            .await?
            .ok_or_else(|| {
                AppError::ResourceNotFound(format!("Profissional {}", appointment.professional_id))
            })?;

        // 4. Fatura para o pagador
        let due_date = due_date_from(Utc::now().date_naive());
        let description = format!(
            "Sessão de {} em {}",
            info.patient_name,
            appointment.appointment_time.format("%d/%m/%Y")
        );

        let invoice = self
            .billing_repo
            .insert_invoice(
                &mut **tx,
                appointment.id,
                payer_user_id,
                professional.user_id,
                gross,
                due_date,
                &description,
            )
            .await?;

        Ok(invoice.map(|invoice| CompletedBilling {
            invoice,
            payer_user_id,
            patient_name: info.patient_name,
        }))
    }

    /// Efeitos pós-commit, fora da transação e best-effort: notificação ao
    /// pagador e e-mail. As falhas são apenas logadas e isoladas entre si
    /// (o e-mail falhar não impede o push, e vice-versa). A transição já
    /// commitada nunca é desfeita por causa delas.
    pub async fn post_commit_effects(&self, billing: &CompletedBilling) {
        let message = format!(
            "Nova fatura disponível: sessão de {} (R$ {})",
            billing.patient_name, billing.invoice.amount
        );

        if let Err(e) = self
            .notification_service
            .notify(billing.payer_user_id, NotificationKind::NewInvoice, &message)
            .await
        {
            tracing::error!(
                payer = %billing.payer_user_id,
                "Falha ao notificar pagador sobre a fatura: {}", e
            );
        }

        match self.user_repo.find_by_id(billing.payer_user_id).await {
            Ok(Some(payer)) => {
                let data = InvoiceEmailData {
                    invoice_id: billing.invoice.id,
                    amount: billing.invoice.amount,
                    due_date: billing.invoice.due_date,
                    patient_name: billing.patient_name.clone(),
                };
                if let Err(e) = self.email_notifier.send_invoice_issued(&payer.email, &data).await {
                    tracing::error!(payer = %payer.email, "Falha no envio do e-mail de fatura: {}", e);
                }
            }
            Ok(None) => {
                tracing::error!(payer = %billing.payer_user_id, "Pagador sem usuário para envio de e-mail");
            }
            Err(e) => {
                tracing::error!(payer = %billing.payer_user_id, "Falha ao buscar e-mail do pagador: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn billing_info(company_user_id: Option<Uuid>) -> PatientBillingInfo {
        PatientBillingInfo {
            patient_id: Uuid::new_v4(),
            patient_user_id: Uuid::new_v4(),
            patient_name: "Maria da Silva".into(),
            company_user_id,
        }
    }

    #[test]
    fn comissao_de_25_por_cento() {
        let gross = Decimal::new(20000, 2); // 200.00
        let commission = (gross * commission_rate()).round_dp(2);
        assert_eq!(commission, Decimal::new(5000, 2)); // 50.00
    }

    #[test]
    fn pagador_e_a_empresa_quando_ha_convenio() {
        let company_user = Uuid::new_v4();
        let info = billing_info(Some(company_user));
        assert_eq!(resolve_payer(&info), company_user);
    }

    #[test]
    fn pagador_e_o_proprio_paciente_sem_convenio() {
        let info = billing_info(None);
        assert_eq!(resolve_payer(&info), info.patient_user_id);
    }

    #[test]
    fn vencimento_em_15_dias() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 5).unwrap();
        assert_eq!(due_date_from(today), NaiveDate::from_ymd_opt(2026, 8, 20).unwrap());
    }
}
