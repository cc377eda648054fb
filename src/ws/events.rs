// src/ws/events.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::notifications::Notification;

/// Eventos nomeados que o servidor emite pelo canal em tempo real.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Payload completo de uma nova notificação persistida.
    Notification { notification: Notification },

    /// Sinal de atualização de listas de consultas. Sem payload: quem
    /// recebe refaz a própria consulta de listagem.
    AppointmentsChanged,

    /// Mensagem de chat encaminhada ao destinatário conectado.
    NewMessage { from_user_id: Uuid, content: String },

    /// Reação de chat encaminhada ao destinatário conectado.
    Reaction { from_user_id: Uuid, emoji: String },
}

/// Eventos aceitos vindos do cliente.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ClientEvent {
    SendMessage { to_user_id: Uuid, content: String },
    SendReaction { to_user_id: Uuid, emoji: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appointments_changed_serializa_sem_payload() {
        let json = serde_json::to_value(ServerEvent::AppointmentsChanged).unwrap();
        assert_eq!(json, serde_json::json!({ "event": "appointments_changed" }));
    }

    #[test]
    fn new_message_carrega_remetente() {
        let from = Uuid::new_v4();
        let json = serde_json::to_value(ServerEvent::NewMessage {
            from_user_id: from,
            content: "olá".into(),
        })
        .unwrap();
        assert_eq!(json["event"], "new_message");
        assert_eq!(json["from_user_id"], from.to_string());
    }
}
