// src/models/profiles.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Professional {
    pub id: Uuid,
    pub user_id: Uuid,

    #[schema(example = "Dra. Ana Castro")]
    pub full_name: String,

    #[schema(example = "Psicologia Clínica")]
    pub specialty: Option<String>,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: Uuid,
    pub user_id: Uuid,

    // Quando presente, a empresa conveniada paga as sessões deste paciente
    pub company_id: Option<Uuid>,

    #[schema(example = "Maria da Silva")]
    pub full_name: String,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: Uuid,
    pub user_id: Uuid,

    #[schema(example = "Acme Tecnologia LTDA")]
    pub corporate_name: String,

    pub created_at: DateTime<Utc>,
}

/// Projeção usada pelo faturamento: quem é o paciente e quem paga por ele.
/// O `company_user_id` só vem preenchido quando o paciente tem convênio ativo.
#[derive(Debug, Clone, FromRow)]
pub struct PatientBillingInfo {
    pub patient_id: Uuid,
    pub patient_user_id: Uuid,
    pub patient_name: String,
    pub company_user_id: Option<Uuid>,
}
