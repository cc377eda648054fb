// src/db/billing_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::billing::{BillingRecord, Invoice},
};

#[derive(Clone)]
pub struct BillingRepository {
    pool: PgPool,
}

impl BillingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  REGISTROS DE COBRANÇA (repasse do profissional)
    // =========================================================================

    /// Insere o registro de cobrança de uma consulta realizada.
    ///
    /// O `ON CONFLICT (appointment_id) DO NOTHING` absorve reexecuções
    /// (retry do cliente, transição disparada duas vezes): a segunda chamada
    /// retorna `None` em vez de duplicar a cobrança ou falhar.
    pub async fn insert_billing_record<'e, E>(
        &self,
        executor: E,
        professional_id: Uuid,
        appointment_id: Uuid,
        billing_date: NaiveDate,
        gross_value: Decimal,
        commission_value: Decimal,
    ) -> Result<Option<BillingRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let record = sqlx::query_as::<_, BillingRecord>(
            r#"
            INSERT INTO billing_records (professional_id, appointment_id, billing_date, gross_value, commission_value)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (appointment_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(professional_id)
        .bind(appointment_id)
        .bind(billing_date)
        .bind(gross_value)
        .bind(commission_value)
        .fetch_optional(executor)
        .await?;

        Ok(record)
    }

    pub async fn list_by_professional(
        &self,
        professional_id: Uuid,
    ) -> Result<Vec<BillingRecord>, AppError> {
        let records = sqlx::query_as::<_, BillingRecord>(
            "SELECT * FROM billing_records WHERE professional_id = $1 ORDER BY billing_date DESC",
        )
        .bind(professional_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    // =========================================================================
    //  FATURAS (voltadas ao pagador)
    // =========================================================================

    /// Mesma absorção de duplicata dos registros de cobrança: no máximo uma
    /// fatura por consulta.
    pub async fn insert_invoice<'e, E>(
        &self,
        executor: E,
        appointment_id: Uuid,
        payer_user_id: Uuid,
        creator_user_id: Uuid,
        amount: Decimal,
        due_date: NaiveDate,
        description: &str,
    ) -> Result<Option<Invoice>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let invoice = sqlx::query_as::<_, Invoice>(
            r#"
            INSERT INTO invoices (appointment_id, payer_user_id, creator_user_id, amount, due_date, description)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (appointment_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(appointment_id)
        .bind(payer_user_id)
        .bind(creator_user_id)
        .bind(amount)
        .bind(due_date)
        .bind(description)
        .fetch_optional(executor)
        .await?;

        Ok(invoice)
    }

    pub async fn find_invoice_by_id(&self, id: Uuid) -> Result<Option<Invoice>, AppError> {
        let invoice = sqlx::query_as::<_, Invoice>("SELECT * FROM invoices WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(invoice)
    }

    pub async fn list_invoices_by_payer(&self, payer_user_id: Uuid) -> Result<Vec<Invoice>, AppError> {
        let invoices = sqlx::query_as::<_, Invoice>(
            "SELECT * FROM invoices WHERE payer_user_id = $1 ORDER BY due_date DESC",
        )
        .bind(payer_user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(invoices)
    }
}
