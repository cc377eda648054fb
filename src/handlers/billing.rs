// src/handlers/billing.rs

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::billing::{BillingRecord, Invoice},
};

// GET /api/billing/records
//
// Visão do psicólogo: valor bruto e comissão de cada consulta realizada.
#[utoipa::path(
    get,
    path = "/api/billing/records",
    tag = "Billing",
    responses(
        (status = 200, description = "Registros de cobrança do profissional", body = [BillingRecord]),
        (status = 404, description = "Usuário sem perfil de psicólogo")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_billing_records(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<BillingRecord>>, AppError> {
    let professional = app_state
        .profile_repo
        .find_professional_by_user_id(user.id)
        .await?
        .ok_or_else(|| AppError::ResourceNotFound("Perfil de psicólogo".into()))?;

    let records = app_state.billing_repo.list_by_professional(professional.id).await?;

    Ok(Json(records))
}

// GET /api/billing/invoices
//
// Visão do pagador (paciente ou empresa conveniada).
#[utoipa::path(
    get,
    path = "/api/billing/invoices",
    tag = "Billing",
    responses(
        (status = 200, description = "Faturas em nome do usuário", body = [Invoice])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_invoices(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<Invoice>>, AppError> {
    let invoices = app_state.billing_repo.list_invoices_by_payer(user.id).await?;

    Ok(Json(invoices))
}

// GET /api/billing/invoices/{id}/pdf
#[utoipa::path(
    get,
    path = "/api/billing/invoices/{invoice_id}/pdf",
    tag = "Billing",
    responses(
        (status = 200, description = "Recibo em PDF", content_type = "application/pdf"),
        (status = 403, description = "A fatura pertence a outro usuário"),
        (status = 404, description = "Fatura não encontrada")
    ),
    params(
        ("invoice_id" = Uuid, Path, description = "ID da Fatura")
    ),
    security(("api_jwt" = []))
)]
pub async fn download_invoice_pdf(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(invoice_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let pdf_bytes = app_state
        .document_service
        .generate_invoice_pdf(invoice_id, user.id)
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"fatura-{}.pdf\"", invoice_id),
            ),
        ],
        pdf_bytes,
    ))
}
