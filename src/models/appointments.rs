// src/models/appointments.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "appointment_frequency", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Frequency {
    Weekly,      // Semanal
    Biweekly,    // Quinzenal
    SingleEvent, // Sessão avulsa
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "appointment_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Scheduled, // Agendada (estado inicial)
    Completed, // Realizada (terminal)
    Cancelled, // Cancelada (terminal)
}

impl AppointmentStatus {
    /// Estados terminais não saem pelo fluxo normal de atualização.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Completed | AppointmentStatus::Cancelled)
    }
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentSeries {
    pub id: Uuid,
    pub professional_id: Uuid,
    pub patient_id: Uuid,

    pub start_date: DateTime<Utc>,
    pub frequency: Frequency,

    #[schema(example = "200.00")]
    pub session_value: Option<Decimal>,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,

    // Série dona da ocorrência; NULL para sessão avulsa
    pub series_id: Option<Uuid>,

    pub professional_id: Uuid,
    pub patient_id: Uuid,

    pub appointment_time: DateTime<Utc>,
    pub status: AppointmentStatus,

    #[schema(example = "200.00")]
    pub session_value: Option<Decimal>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
