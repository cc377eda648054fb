// src/handlers/notifications.rs

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::notifications::Notification,
};

// GET /api/notifications
//
// A listagem é a fonte da verdade: quem perdeu o push reconcilia aqui.
#[utoipa::path(
    get,
    path = "/api/notifications",
    tag = "Notifications",
    responses(
        (status = 200, description = "Notificações do usuário, mais recentes primeiro", body = [Notification])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_notifications(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<Notification>>, AppError> {
    let notifications = app_state.notification_repo.list_by_user(user.id).await?;

    Ok(Json(notifications))
}

// PATCH /api/notifications/{id}/read
#[utoipa::path(
    patch,
    path = "/api/notifications/{notification_id}/read",
    tag = "Notifications",
    responses(
        (status = 200, description = "Notificação marcada como lida", body = Notification),
        (status = 404, description = "Notificação não encontrada ou de outro usuário")
    ),
    params(
        ("notification_id" = Uuid, Path, description = "ID da Notificação")
    ),
    security(("api_jwt" = []))
)]
pub async fn mark_read(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(notification_id): Path<Uuid>,
) -> Result<Json<Notification>, AppError> {
    let notification = app_state
        .notification_repo
        .mark_read(notification_id, user.id)
        .await?
        .ok_or_else(|| AppError::ResourceNotFound(format!("Notificação {}", notification_id)))?;

    Ok(Json(notification))
}

// PATCH /api/notifications/read-all
#[utoipa::path(
    patch,
    path = "/api/notifications/read-all",
    tag = "Notifications",
    responses(
        (status = 200, description = "Todas marcadas como lidas")
    ),
    security(("api_jwt" = []))
)]
pub async fn mark_all_read(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Value>, AppError> {
    let updated = app_state.notification_repo.mark_all_read(user.id).await?;

    Ok(Json(json!({ "updated": updated })))
}
