//! Staff members, working hours and blocked slots

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use sqlx::{types::Json, Pool, Postgres};
use uuid::Uuid;

use super::StaffStore;
use crate::{
    error::{AppError, AppResult},
    models::{BlockedSlot, StaffMember, WeeklySchedule},
};

#[derive(sqlx::FromRow)]
struct BlockedSlotRow {
    blocked_date: NaiveDate,
    blocked_time: NaiveTime,
}

impl From<BlockedSlotRow> for BlockedSlot {
    fn from(row: BlockedSlotRow) -> Self {
        BlockedSlot {
            date: row.blocked_date,
            time: row.blocked_time,
        }
    }
}

#[derive(Clone)]
pub struct StaffRepository {
    pool: Pool<Postgres>,
}

impl StaffRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StaffStore for StaffRepository {
    async fn get_staff_member(&self, id: Uuid) -> AppResult<StaffMember> {
        sqlx::query_as::<_, StaffMember>("SELECT * FROM staff_members WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Staff member {} not found", id)))
    }

    async fn update_working_hours(
        &self,
        id: Uuid,
        schedule: &WeeklySchedule,
    ) -> AppResult<StaffMember> {
        sqlx::query_as::<_, StaffMember>(
            "UPDATE staff_members SET working_hours = $1 WHERE id = $2 RETURNING *",
        )
        .bind(Json(schedule))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Staff member {} not found", id)))
    }

    async fn list_blocked_slots(&self, staff_member_id: Uuid) -> AppResult<Vec<BlockedSlot>> {
        let rows = sqlx::query_as::<_, BlockedSlotRow>(
            r#"
            SELECT blocked_date, blocked_time FROM staff_blocked_slots
            WHERE staff_member_id = $1
            ORDER BY blocked_date, blocked_time
            "#,
        )
        .bind(staff_member_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(BlockedSlot::from).collect())
    }

    async fn blocked_times_on(
        &self,
        staff_member_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<Vec<NaiveTime>> {
        let times = sqlx::query_scalar::<_, NaiveTime>(
            r#"
            SELECT blocked_time FROM staff_blocked_slots
            WHERE staff_member_id = $1 AND blocked_date = $2
            ORDER BY blocked_time
            "#,
        )
        .bind(staff_member_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        Ok(times)
    }

    async fn replace_blocked_slots(
        &self,
        staff_member_id: Uuid,
        slots: &[BlockedSlot],
    ) -> AppResult<Vec<BlockedSlot>> {
        let dates: Vec<NaiveDate> = slots.iter().map(|s| s.date).collect();
        let times: Vec<NaiveTime> = slots.iter().map(|s| s.time).collect();

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM staff_blocked_slots WHERE staff_member_id = $1")
            .bind(staff_member_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO staff_blocked_slots (staff_member_id, blocked_date, blocked_time)
            SELECT $1, d, t FROM UNNEST($2::date[], $3::time[]) AS x(d, t)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(staff_member_id)
        .bind(&dates)
        .bind(&times)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.list_blocked_slots(staff_member_id).await
    }
}
