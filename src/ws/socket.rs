// src/ws/socket.rs

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    models::auth::User,
    ws::events::{ClientEvent, ServerEvent},
};

/// Parâmetros do handshake: o mesmo JWT das rotas HTTP, via query string
/// (o handshake de WebSocket do navegador não envia headers customizados).
#[derive(Deserialize)]
pub struct WsAuthQuery {
    token: String,
}

// GET /ws?token=<jwt>
//
// O token é verificado ANTES do upgrade: conexão sem token válido é
// rejeitada e nunca entra no registro de presença.
pub async fn ws_upgrade(
    ws: WebSocketUpgrade,
    State(app_state): State<AppState>,
    Query(query): Query<WsAuthQuery>,
) -> Result<impl IntoResponse, AppError> {
    let user = app_state.auth_service.validate_token(&query.token).await?;

    tracing::info!(user_id = %user.id, "Upgrade de WebSocket aceito");
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, app_state, user)))
}

// Loop principal de uma conexão: registra presença, encaminha eventos do
// canal para o socket e trata o que chega do cliente até a desconexão.
async fn handle_socket(socket: WebSocket, app_state: AppState, user: User) {
    let connection_id = Uuid::new_v4();
    let (ws_sink, mut ws_stream) = socket.split();
    let (tx, mut rx) = mpsc::channel::<ServerEvent>(64);

    // A última conexão do usuário vence: substitui qualquer anterior
    app_state.presence.register(user.id, connection_id, tx);

    // Task de envio: lê do canal, serializa e escreve no socket
    let sender_handle = tokio::spawn(async move {
        let mut sink = ws_sink;
        while let Some(event) = rx.recv().await {
            let json = match serde_json::to_string(&event) {
                Ok(j) => j,
                Err(_) => continue,
            };
            if sink.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    // Loop de recepção: eventos de chat são repassados pelo mesmo registro
    while let Some(msg) = ws_stream.next().await {
        match msg {
            Ok(Message::Text(ref text)) => {
                if let Ok(event) = serde_json::from_str::<ClientEvent>(text) {
                    handle_client_event(&app_state, &user, event);
                }
                // JSON malformado é ignorado; a conexão continua viva
            }
            Ok(Message::Close(_)) | Err(_) => break,
            _ => {} // Ping/Pong ficam por conta do axum
        }
    }

    // O disconnect é o único sinal de cancelamento da conexão.
    // Remove do registro apenas se esta ainda for a conexão ativa.
    app_state.presence.unregister(user.id, connection_id);
    sender_handle.abort();

    tracing::info!(user_id = %user.id, "WebSocket desconectado");
}

/// Entrega best-effort dos eventos de chat: destinatário offline recebe
/// nada por aqui (o histórico de chat tem persistência própria).
fn handle_client_event(app_state: &AppState, user: &User, event: ClientEvent) {
    match event {
        ClientEvent::SendMessage { to_user_id, content } => {
            app_state.presence.push(
                to_user_id,
                ServerEvent::NewMessage { from_user_id: user.id, content },
            );
        }
        ClientEvent::SendReaction { to_user_id, emoji } => {
            app_state.presence.push(
                to_user_id,
                ServerEvent::Reaction { from_user_id: user.id, emoji },
            );
        }
    }
}
