//! Appointments repository for database operations

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::{AppointmentStore, ACTIVE_STATUS_PREDICATE};
use crate::{
    error::{AppError, AppResult},
    models::{
        appointment::{AppointmentFilter, NewAppointment},
        Actor, Appointment, AppointmentSnapshot, AppointmentStatus,
    },
};

const SNAPSHOT_SELECT: &str = r#"
    SELECT a.id, a.appointment_date, a.appointment_time, a.status, a.note,
           u.name AS client_name, u.email AS client_email,
           c.name AS company_name, s.name AS service_name,
           st.name AS staff_member_name
    FROM appointments a
    JOIN users u ON u.id = a.client_id
    JOIN companies c ON c.id = a.company_id
    JOIN services s ON s.id = a.service_id
    JOIN staff_members st ON st.id = a.staff_member_id
"#;

#[derive(Clone)]
pub struct AppointmentsRepository {
    pool: Pool<Postgres>,
}

impl AppointmentsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AppointmentStore for AppointmentsRepository {
    async fn find_active_at_slot(
        &self,
        staff_member_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
    ) -> AppResult<Option<Appointment>> {
        let query = format!(
            r#"
            SELECT * FROM appointments
            WHERE staff_member_id = $1 AND appointment_date = $2 AND appointment_time = $3
              AND {}
            LIMIT 1
            "#,
            ACTIVE_STATUS_PREDICATE
        );
        let row = sqlx::query_as::<_, Appointment>(&query)
            .bind(staff_member_id)
            .bind(date)
            .bind(time)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn occupied_times(
        &self,
        staff_member_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<Vec<NaiveTime>> {
        let query = format!(
            r#"
            SELECT appointment_time FROM appointments
            WHERE staff_member_id = $1 AND appointment_date = $2 AND {}
            ORDER BY appointment_time
            "#,
            ACTIVE_STATUS_PREDICATE
        );
        let times = sqlx::query_scalar::<_, NaiveTime>(&query)
            .bind(staff_member_id)
            .bind(date)
            .fetch_all(&self.pool)
            .await?;
        Ok(times)
    }

    async fn insert(&self, appointment: &NewAppointment) -> AppResult<Appointment> {
        let mut tx = self.pool.begin().await?;

        // Serialize bookings of one staff member on one day
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(format!("{}:{}", appointment.staff_member_id, appointment.date))
            .execute(&mut *tx)
            .await?;

        let taken_query = format!(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM appointments
                WHERE staff_member_id = $1 AND appointment_date = $2 AND appointment_time = $3
                  AND {}
            )
            "#,
            ACTIVE_STATUS_PREDICATE
        );
        let taken: bool = sqlx::query_scalar(&taken_query)
            .bind(appointment.staff_member_id)
            .bind(appointment.date)
            .bind(appointment.time)
            .fetch_one(&mut *tx)
            .await?;
        if taken {
            return Err(AppError::SlotUnavailable(
                "This time slot has already been booked".to_string(),
            ));
        }

        // The partial unique index still backs this insert
        let row = sqlx::query_as::<_, Appointment>(
            r#"
            INSERT INTO appointments (
                id, appointment_date, appointment_time, status, note,
                client_id, company_id, service_id, staff_member_id
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(appointment.date)
        .bind(appointment.time)
        .bind(AppointmentStatus::Pending)
        .bind(&appointment.note)
        .bind(appointment.client_id)
        .bind(appointment.company_id)
        .bind(appointment.service_id)
        .bind(appointment.staff_member_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::from_slot_write)?;

        tx.commit().await.map_err(AppError::from_slot_write)?;
        Ok(row)
    }

    async fn get(&self, id: Uuid) -> AppResult<Appointment> {
        sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Appointment {} not found", id)))
    }

    async fn get_snapshot(&self, id: Uuid) -> AppResult<AppointmentSnapshot> {
        let query = format!("{} WHERE a.id = $1", SNAPSHOT_SELECT);
        sqlx::query_as::<_, AppointmentSnapshot>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Appointment {} not found", id)))
    }

    async fn list_for_actor(
        &self,
        actor: &Actor,
        filter: &AppointmentFilter,
    ) -> AppResult<Vec<Appointment>> {
        let (owner_column, owner_id) = match *actor {
            Actor::Client { id } => ("client_id", id),
            Actor::Company { company_id } => ("company_id", company_id),
            Actor::Staff { staff_member_id } => ("staff_member_id", staff_member_id),
        };

        let mut conditions = vec![format!("{} = $1", owner_column)];
        let mut idx = 2;

        if filter.date.is_some() {
            conditions.push(format!("appointment_date = ${}", idx));
            idx += 1;
        }
        if filter.status.is_some() {
            conditions.push(format!("status = ${}", idx));
        }

        let query = format!(
            "SELECT * FROM appointments WHERE {} ORDER BY appointment_date, appointment_time",
            conditions.join(" AND ")
        );

        let mut builder = sqlx::query_as::<_, Appointment>(&query).bind(owner_id);
        if let Some(date) = filter.date {
            builder = builder.bind(date);
        }
        if let Some(status) = filter.status {
            builder = builder.bind(status);
        }

        let rows = builder.fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn update_status(
        &self,
        id: Uuid,
        from: AppointmentStatus,
        to: AppointmentStatus,
    ) -> AppResult<Appointment> {
        let row = sqlx::query_as::<_, Appointment>(
            r#"
            UPDATE appointments SET status = $1, updated_at = now()
            WHERE id = $2 AND status = $3
            RETURNING *
            "#,
        )
        .bind(to)
        .bind(id)
        .bind(from)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(row),
            None => {
                // Distinguish a vanished row from a concurrent status change
                let current = self.get(id).await?;
                Err(AppError::InvalidTransition(format!(
                    "Appointment status changed to {} in the meantime",
                    current.status
                )))
            }
        }
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM appointments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Appointment {} not found", id)));
        }
        Ok(())
    }

    async fn due_for_reminder(&self, date: NaiveDate) -> AppResult<Vec<AppointmentSnapshot>> {
        let query = format!(
            r#"
            {}
            WHERE a.appointment_date = $1
              AND a.{}
              AND a.reminder_sent_at IS NULL
            ORDER BY a.appointment_time
            "#,
            SNAPSHOT_SELECT, ACTIVE_STATUS_PREDICATE
        );
        let rows = sqlx::query_as::<_, AppointmentSnapshot>(&query)
            .bind(date)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn claim_reminder(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE appointments SET reminder_sent_at = now() WHERE id = $1 AND reminder_sent_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn release_reminder(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE appointments SET reminder_sent_at = NULL WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
