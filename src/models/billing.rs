// src/models/billing.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "billing_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingStatus {
    Pending, // Aguardando repasse
    Settled, // Repassado ao profissional
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "invoice_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    Pending,
    Paid,
    Completed,
    Rejected,
}

// --- Structs ---

/// Registro interno de cobrança do profissional: valor bruto e comissão
/// retida pela plataforma para uma consulta realizada.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BillingRecord {
    pub id: Uuid,
    pub professional_id: Uuid,

    // No máximo um registro por consulta (UNIQUE no banco)
    pub appointment_id: Uuid,

    #[schema(value_type = String, format = Date, example = "2026-08-05")]
    pub billing_date: NaiveDate,

    #[schema(example = "200.00")]
    pub gross_value: Decimal,

    #[schema(example = "50.00")]
    pub commission_value: Decimal,

    pub status: BillingStatus,

    pub created_at: DateTime<Utc>,
}

/// Fatura voltada ao pagador (paciente ou empresa conveniada).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: Uuid,
    pub appointment_id: Uuid,

    pub payer_user_id: Uuid,
    pub creator_user_id: Uuid,

    #[schema(example = "200.00")]
    pub amount: Decimal,

    #[schema(value_type = String, format = Date, example = "2026-08-20")]
    pub due_date: NaiveDate,

    #[schema(example = "Sessão de Maria da Silva em 05/08/2026")]
    pub description: String,

    pub status: InvoiceStatus,

    pub receipt_url: Option<String>,

    pub created_at: DateTime<Utc>,
}
