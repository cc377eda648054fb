// src/db/appointment_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::appointments::{Appointment, AppointmentSeries, AppointmentStatus, Frequency},
};

#[derive(Clone)]
pub struct AppointmentRepository {
    pool: PgPool,
}

impl AppointmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  SÉRIES (regra de recorrência)
    // =========================================================================

    pub async fn create_series<'e, E>(
        &self,
        executor: E,
        professional_id: Uuid,
        patient_id: Uuid,
        start_date: DateTime<Utc>,
        frequency: Frequency,
        session_value: Option<Decimal>,
    ) -> Result<AppointmentSeries, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let series = sqlx::query_as::<_, AppointmentSeries>(
            r#"
            INSERT INTO appointment_series (professional_id, patient_id, start_date, frequency, session_value)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(professional_id)
        .bind(patient_id)
        .bind(start_date)
        .bind(frequency)
        .bind(session_value)
        .fetch_one(executor)
        .await?;

        Ok(series)
    }

    // =========================================================================
    //  CONSULTAS (ocorrências)
    // =========================================================================

    pub async fn insert_appointment<'e, E>(
        &self,
        executor: E,
        series_id: Option<Uuid>,
        professional_id: Uuid,
        patient_id: Uuid,
        appointment_time: DateTime<Utc>,
        session_value: Option<Decimal>,
    ) -> Result<Appointment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let appointment = sqlx::query_as::<_, Appointment>(
            r#"
            INSERT INTO appointments (series_id, professional_id, patient_id, appointment_time, session_value)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(series_id)
        .bind(professional_id)
        .bind(patient_id)
        .bind(appointment_time)
        .bind(session_value)
        .fetch_one(executor)
        .await?;

        Ok(appointment)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Appointment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let appointment = sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(appointment)
    }

    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        new_status: AppointmentStatus,
    ) -> Result<Appointment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let appointment = sqlx::query_as::<_, Appointment>(
            r#"
            UPDATE appointments
            SET status = $2, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(new_status)
        .fetch_one(executor)
        .await?;

        Ok(appointment)
    }

    /// Atalho administrativo: edita campos sem passar pela máquina de estados.
    pub async fn force_update(
        &self,
        id: Uuid,
        appointment_time: Option<DateTime<Utc>>,
        status: Option<AppointmentStatus>,
        session_value: Option<Decimal>,
    ) -> Result<Appointment, AppError> {
        let appointment = sqlx::query_as::<_, Appointment>(
            r#"
            UPDATE appointments
            SET appointment_time = COALESCE($2, appointment_time),
                status = COALESCE($3, status),
                session_value = COALESCE($4, session_value),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(appointment_time)
        .bind(status)
        .bind(session_value)
        .fetch_one(&self.pool)
        .await?;

        Ok(appointment)
    }

    // =========================================================================
    //  LISTAGENS POR PAPEL
    // =========================================================================

    pub async fn list_by_professional(
        &self,
        professional_id: Uuid,
    ) -> Result<Vec<Appointment>, AppError> {
        let appointments = sqlx::query_as::<_, Appointment>(
            "SELECT * FROM appointments WHERE professional_id = $1 ORDER BY appointment_time ASC",
        )
        .bind(professional_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(appointments)
    }

    pub async fn list_by_patient(&self, patient_id: Uuid) -> Result<Vec<Appointment>, AppError> {
        let appointments = sqlx::query_as::<_, Appointment>(
            "SELECT * FROM appointments WHERE patient_id = $1 ORDER BY appointment_time ASC",
        )
        .bind(patient_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(appointments)
    }

    /// Consultas dos pacientes conveniados de uma empresa.
    pub async fn list_by_company(&self, company_id: Uuid) -> Result<Vec<Appointment>, AppError> {
        let appointments = sqlx::query_as::<_, Appointment>(
            r#"
            SELECT a.*
            FROM appointments a
            JOIN patients p ON p.id = a.patient_id
            WHERE p.company_id = $1
            ORDER BY a.appointment_time ASC
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(appointments)
    }

    pub async fn list_all(&self) -> Result<Vec<Appointment>, AppError> {
        let appointments =
            sqlx::query_as::<_, Appointment>("SELECT * FROM appointments ORDER BY appointment_time ASC")
                .fetch_all(&self.pool)
                .await?;

        Ok(appointments)
    }
}
