//! Repository layer for database operations

pub mod appointments;
pub mod companies;
pub mod staff;

#[cfg(test)]
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        appointment::{AppointmentFilter, NewAppointment},
        Actor, Appointment, AppointmentSnapshot, AppointmentStatus, BlockedSlot, Company,
        Service, StaffMember, WeeklySchedule,
    },
};

/// SQL predicate selecting appointments that still hold their slot
pub(crate) const ACTIVE_STATUS_PREDICATE: &str =
    "status NOT IN ('cancelled_by_client', 'cancelled_by_company')";

/// Appointment persistence
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// Non-cancelled appointment holding the slot, if any
    async fn find_active_at_slot(
        &self,
        staff_member_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
    ) -> AppResult<Option<Appointment>>;

    /// Start times held by non-cancelled appointments of a staff member on a date
    async fn occupied_times(
        &self,
        staff_member_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<Vec<NaiveTime>>;

    /// Insert a pending appointment. Fails with `SlotUnavailable` when the slot is
    /// already held, including when a concurrent insert wins the race.
    async fn insert(&self, appointment: &NewAppointment) -> AppResult<Appointment>;

    async fn get(&self, id: Uuid) -> AppResult<Appointment>;

    async fn get_snapshot(&self, id: Uuid) -> AppResult<AppointmentSnapshot>;

    async fn list_for_actor(
        &self,
        actor: &Actor,
        filter: &AppointmentFilter,
    ) -> AppResult<Vec<Appointment>>;

    /// Move from `from` to `to`; fails if the status changed in between
    async fn update_status(
        &self,
        id: Uuid,
        from: AppointmentStatus,
        to: AppointmentStatus,
    ) -> AppResult<Appointment>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;

    /// Non-cancelled appointments on `date` that have not been reminded yet
    async fn due_for_reminder(&self, date: NaiveDate) -> AppResult<Vec<AppointmentSnapshot>>;

    /// Mark the reminder as sent; false if another run already claimed it
    async fn claim_reminder(&self, id: Uuid) -> AppResult<bool>;

    /// Undo a claim after a failed dispatch so a later run retries
    async fn release_reminder(&self, id: Uuid) -> AppResult<()>;
}

/// Staff member, working hours and blocked slots persistence
#[async_trait]
pub trait StaffStore: Send + Sync {
    async fn get_staff_member(&self, id: Uuid) -> AppResult<StaffMember>;

    async fn update_working_hours(
        &self,
        id: Uuid,
        schedule: &WeeklySchedule,
    ) -> AppResult<StaffMember>;

    async fn list_blocked_slots(&self, staff_member_id: Uuid) -> AppResult<Vec<BlockedSlot>>;

    async fn blocked_times_on(
        &self,
        staff_member_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<Vec<NaiveTime>>;

    /// Replace the whole blocked-slot set atomically
    async fn replace_blocked_slots(
        &self,
        staff_member_id: Uuid,
        slots: &[BlockedSlot],
    ) -> AppResult<Vec<BlockedSlot>>;
}

/// Company, subscription and service persistence
#[async_trait]
pub trait CompanyStore: Send + Sync {
    async fn get_company(&self, id: Uuid) -> AppResult<Company>;

    async fn get_service(&self, id: Uuid) -> AppResult<Service>;

    /// Demote every active/trialing company whose subscription ended before `today`.
    /// Returns the number of companies updated.
    async fn expire_subscriptions(&self, today: NaiveDate) -> AppResult<u64>;
}

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub appointments: appointments::AppointmentsRepository,
    pub staff: staff::StaffRepository,
    pub companies: companies::CompaniesRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            appointments: appointments::AppointmentsRepository::new(pool.clone()),
            staff: staff::StaffRepository::new(pool.clone()),
            companies: companies::CompaniesRepository::new(pool.clone()),
            pool,
        }
    }

    pub fn appointment_store(&self) -> Arc<dyn AppointmentStore> {
        Arc::new(self.appointments.clone())
    }

    pub fn staff_store(&self) -> Arc<dyn StaffStore> {
        Arc::new(self.staff.clone())
    }

    pub fn company_store(&self) -> Arc<dyn CompanyStore> {
        Arc::new(self.companies.clone())
    }
}
