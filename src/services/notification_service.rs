// src/services/notification_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{NotificationRepository, UserRepository},
    models::{
        auth::Role,
        notifications::{Notification, NotificationKind},
    },
    ws::{events::ServerEvent, presence::PresenceRegistry},
};

/// Rota que o front-end abre ao clicar na notificação. Função pura de
/// (papel, tipo): entradas iguais sempre produzem a mesma rota.
pub fn related_url(role: Role, kind: NotificationKind) -> String {
    format!("{}{}", role.route_prefix(), kind.path_suffix())
}

#[derive(Clone)]
pub struct NotificationService {
    notification_repo: NotificationRepository,
    user_repo: UserRepository,
    presence: PresenceRegistry,
}

impl NotificationService {
    pub fn new(
        notification_repo: NotificationRepository,
        user_repo: UserRepository,
        presence: PresenceRegistry,
    ) -> Self {
        Self { notification_repo, user_repo, presence }
    }

    /// Persiste a notificação e, se o destinatário estiver conectado,
    /// empurra o payload pelo socket. O push é fire-and-forget: a falha
    /// dele não desfaz a persistência, que já aconteceu.
    pub async fn notify(
        &self,
        target_user_id: Uuid,
        kind: NotificationKind,
        message: &str,
    ) -> Result<Notification, AppError> {
        let target = self
            .user_repo
            .find_by_id(target_user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        let url = related_url(target.role, kind);

        let notification = self
            .notification_repo
            .insert(target_user_id, kind.as_str(), message, &url)
            .await?;

        let delivered = self.presence.push(
            target_user_id,
            ServerEvent::Notification { notification: notification.clone() },
        );
        if !delivered {
            tracing::debug!(user_id = %target_user_id, "Destinatário offline; notificação fica para o próximo fetch");
        }

        Ok(notification)
    }

    /// Sinal de refresh para todos os conectados, sem payload.
    pub fn broadcast_appointments_changed(&self) {
        self.presence.broadcast(ServerEvent::AppointmentsChanged);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn related_url_e_deterministica() {
        let a = related_url(Role::Company, NotificationKind::NewInvoice);
        let b = related_url(Role::Company, NotificationKind::NewInvoice);
        assert_eq!(a, b);
        assert_eq!(a, "/empresa/financeiro");
    }

    #[test]
    fn related_url_combina_papel_e_tipo() {
        assert_eq!(
            related_url(Role::Patient, NotificationKind::NewAppointment),
            "/paciente/agenda"
        );
        assert_eq!(
            related_url(Role::Professional, NotificationKind::NewTriage),
            "/profissional/triagem"
        );
        assert_eq!(related_url(Role::Admin, NotificationKind::NewMessage), "/admin/chat");
    }

    #[test]
    fn tipo_desconhecido_usa_rota_padrao_do_papel() {
        assert_eq!(related_url(Role::Patient, NotificationKind::Unknown), "/paciente/");
    }
}
