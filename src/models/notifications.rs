// src/models/notifications.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Conjunto fechado de tipos de notificação conhecidos pelo front-end.
/// Tipos fora da lista caem em `Unknown` e usam a rota padrão.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    NewMessage,
    NewInvoice,
    PaymentReceived,
    NewAppointment,
    AppointmentRescheduled,
    ProfileUpdate,
    NewTriage,
    #[serde(other)]
    Unknown,
}

impl NotificationKind {
    /// Identificador persistido e enviado no payload em tempo real.
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::NewMessage => "new_message",
            NotificationKind::NewInvoice => "new_invoice",
            NotificationKind::PaymentReceived => "payment_received",
            NotificationKind::NewAppointment => "new_appointment",
            NotificationKind::AppointmentRescheduled => "appointment_rescheduled",
            NotificationKind::ProfileUpdate => "profile_update",
            NotificationKind::NewTriage => "new_triage",
            NotificationKind::Unknown => "unknown",
        }
    }

    /// Sufixo de rota que o front-end abre ao clicar na notificação.
    pub fn path_suffix(&self) -> &'static str {
        match self {
            NotificationKind::NewMessage => "/chat",
            NotificationKind::NewInvoice => "/financeiro",
            NotificationKind::PaymentReceived => "/financeiro",
            NotificationKind::NewAppointment => "/agenda",
            NotificationKind::AppointmentRescheduled => "/agenda",
            NotificationKind::ProfileUpdate => "/perfil",
            NotificationKind::NewTriage => "/triagem",
            NotificationKind::Unknown => "/",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,

    #[schema(example = "new_invoice")]
    pub kind: String,

    #[schema(example = "Nova fatura disponível: sessão de Maria da Silva")]
    pub message: String,

    // Derivada no servidor a partir de (papel, tipo); nunca vem do cliente
    #[schema(example = "/empresa/financeiro")]
    pub related_url: String,

    pub is_read: bool,

    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tipo_desconhecido_cai_na_rota_padrao() {
        let kind: NotificationKind = serde_json::from_str("\"algum_tipo_novo\"").unwrap();
        assert_eq!(kind, NotificationKind::Unknown);
        assert_eq!(kind.path_suffix(), "/");
    }

    #[test]
    fn tipos_financeiros_apontam_para_financeiro() {
        assert_eq!(NotificationKind::NewInvoice.path_suffix(), "/financeiro");
        assert_eq!(NotificationKind::PaymentReceived.path_suffix(), "/financeiro");
    }
}
