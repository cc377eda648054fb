// src/db/profile_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::profiles::{Company, Patient, PatientBillingInfo, Professional},
};

// Perfis tipados de cada papel: psicólogo, paciente e empresa conveniada.
// Cada papel tem sua própria tabela; o despacho é feito pelo enum Role.
#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CRIAÇÃO (dentro da transação de cadastro)
    // =========================================================================

    pub async fn create_professional<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        full_name: &str,
        specialty: Option<&str>,
    ) -> Result<Professional, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let professional = sqlx::query_as::<_, Professional>(
            r#"
            INSERT INTO professionals (user_id, full_name, specialty)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(full_name)
        .bind(specialty)
        .fetch_one(executor)
        .await?;

        Ok(professional)
    }

    pub async fn create_patient<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        full_name: &str,
        company_id: Option<Uuid>,
    ) -> Result<Patient, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let patient = sqlx::query_as::<_, Patient>(
            r#"
            INSERT INTO patients (user_id, full_name, company_id)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(full_name)
        .bind(company_id)
        .fetch_one(executor)
        .await?;

        Ok(patient)
    }

    pub async fn create_company<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        corporate_name: &str,
    ) -> Result<Company, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let company = sqlx::query_as::<_, Company>(
            r#"
            INSERT INTO companies (user_id, corporate_name)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(corporate_name)
        .fetch_one(executor)
        .await?;

        Ok(company)
    }

    // =========================================================================
    //  CONSULTAS
    // =========================================================================

    pub async fn find_professional_by_id<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Professional>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let professional =
            sqlx::query_as::<_, Professional>("SELECT * FROM professionals WHERE id = $1")
                .bind(id)
                .fetch_optional(executor)
                .await?;

        Ok(professional)
    }

    pub async fn find_professional_by_user_id(
        &self,
        user_id: Uuid,
    ) -> Result<Option<Professional>, AppError> {
        let professional =
            sqlx::query_as::<_, Professional>("SELECT * FROM professionals WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(professional)
    }

    pub async fn find_patient_by_id(&self, id: Uuid) -> Result<Option<Patient>, AppError> {
        let patient = sqlx::query_as::<_, Patient>("SELECT * FROM patients WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(patient)
    }

    pub async fn find_patient_by_user_id(&self, user_id: Uuid) -> Result<Option<Patient>, AppError> {
        let patient = sqlx::query_as::<_, Patient>("SELECT * FROM patients WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(patient)
    }

    pub async fn find_company_by_user_id(&self, user_id: Uuid) -> Result<Option<Company>, AppError> {
        let company = sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(company)
    }

    /// Projeção de faturamento do paciente: o usuário dele e, se houver
    /// convênio, o usuário da empresa pagadora. Usada na resolução do pagador.
    pub async fn find_patient_billing_info<'e, E>(
        &self,
        executor: E,
        patient_id: Uuid,
    ) -> Result<Option<PatientBillingInfo>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let info = sqlx::query_as::<_, PatientBillingInfo>(
            r#"
            SELECT
                p.id AS patient_id,
                p.user_id AS patient_user_id,
                p.full_name AS patient_name,
                c.user_id AS company_user_id
            FROM patients p
            LEFT JOIN companies c ON c.id = p.company_id
            WHERE p.id = $1
            "#,
        )
        .bind(patient_id)
        .fetch_optional(executor)
        .await?;

        Ok(info)
    }
}
