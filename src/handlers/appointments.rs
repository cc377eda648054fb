// src/handlers/appointments.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::{AdminUser, AuthenticatedUser},
    models::appointments::{Appointment, AppointmentStatus, Frequency},
};

// =============================================================================
//  1. CRIAÇÃO (regra de recorrência)
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingPayload {
    pub patient_id: Uuid,

    #[schema(example = "Weekly")]
    pub frequency: Frequency,

    // Obrigatória para frequência recorrente
    pub start_date: Option<DateTime<Utc>>,

    // Horários explícitos, apenas para sessão avulsa
    pub times: Option<Vec<DateTime<Utc>>>,

    #[schema(example = "200.00")]
    pub session_value: Option<Decimal>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedBookingResponse {
    pub series_id: Option<Uuid>,
    pub appointments: Vec<Appointment>,
}

// POST /api/appointments
#[utoipa::path(
    post,
    path = "/api/appointments",
    tag = "Appointments",
    request_body = CreateBookingPayload,
    responses(
        (status = 201, description = "Ocorrências criadas", body = CreatedBookingResponse),
        (status = 400, description = "Recorrência inválida"),
        (status = 403, description = "Apenas psicólogos agendam")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_booking(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateBookingPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let times = payload.times.unwrap_or_default();
    let booking = app_state
        .appointment_service
        .create_booking(
            &user,
            payload.patient_id,
            payload.frequency,
            payload.start_date,
            &times,
            payload.session_value,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedBookingResponse {
            series_id: booking.series_id,
            appointments: booking.appointments,
        }),
    ))
}

// =============================================================================
//  2. MÁQUINA DE ESTADOS
// =============================================================================

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusPayload {
    #[schema(example = "Completed")]
    pub status: AppointmentStatus,
}

// PATCH /api/appointments/{id}/status
//
// Conclusão com valor de sessão dispara a cobrança (registro + fatura) na
// mesma transação; avisos em tempo real e e-mail saem depois do commit.
#[utoipa::path(
    patch,
    path = "/api/appointments/{appointment_id}/status",
    tag = "Appointments",
    request_body = UpdateStatusPayload,
    responses(
        (status = 200, description = "Status atualizado", body = Appointment),
        (status = 400, description = "Transição inválida"),
        (status = 403, description = "A consulta pertence a outro profissional"),
        (status = 404, description = "Consulta não encontrada")
    ),
    params(
        ("appointment_id" = Uuid, Path, description = "ID da Consulta")
    ),
    security(("api_jwt" = []))
)]
pub async fn set_status(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(appointment_id): Path<Uuid>,
    Json(payload): Json<UpdateStatusPayload>,
) -> Result<Json<Appointment>, AppError> {
    let appointment = app_state
        .appointment_service
        .set_status(&user, appointment_id, payload.status)
        .await?;

    Ok(Json(appointment))
}

// =============================================================================
//  3. LISTAGEM POR PAPEL
// =============================================================================

// GET /api/appointments
#[utoipa::path(
    get,
    path = "/api/appointments",
    tag = "Appointments",
    responses(
        (status = 200, description = "Consultas visíveis ao papel do usuário", body = [Appointment])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_appointments(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<Appointment>>, AppError> {
    let appointments = app_state.appointment_service.list_for(&user).await?;

    Ok(Json(appointments))
}

// =============================================================================
//  4. MANUTENÇÃO (admin)
// =============================================================================

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForceUpdatePayload {
    pub appointment_time: Option<DateTime<Utc>>,
    pub status: Option<AppointmentStatus>,
    pub session_value: Option<Decimal>,
}

// PATCH /api/appointments/{id}/force
//
// Atalho privilegiado: edita campos direto, sem passar pela máquina de
// estados e sem disparar cobrança.
#[utoipa::path(
    patch,
    path = "/api/appointments/{appointment_id}/force",
    tag = "Appointments",
    request_body = ForceUpdatePayload,
    responses(
        (status = 200, description = "Campos editados", body = Appointment),
        (status = 403, description = "Rota restrita a administradores")
    ),
    params(
        ("appointment_id" = Uuid, Path, description = "ID da Consulta")
    ),
    security(("api_jwt" = []))
)]
pub async fn force_update(
    State(app_state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(appointment_id): Path<Uuid>,
    Json(payload): Json<ForceUpdatePayload>,
) -> Result<Json<Appointment>, AppError> {
    let appointment = app_state
        .appointment_repo
        .force_update(
            appointment_id,
            payload.appointment_time,
            payload.status,
            payload.session_value,
        )
        .await?;

    Ok(Json(appointment))
}
