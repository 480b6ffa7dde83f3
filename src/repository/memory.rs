//! In-memory store used by unit tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, Utc};
use tokio::sync::Barrier;
use uuid::Uuid;

use super::{AppointmentStore, CompanyStore, StaffStore};
use crate::{
    error::{AppError, AppResult},
    models::{
        appointment::{AppointmentFilter, NewAppointment},
        Actor, Appointment, AppointmentSnapshot, AppointmentStatus, BlockedSlot, Company,
        Service, StaffMember, WeeklySchedule,
    },
};

#[derive(Default)]
struct State {
    appointments: Vec<Appointment>,
    staff: HashMap<Uuid, StaffMember>,
    blocked: HashMap<Uuid, Vec<BlockedSlot>>,
    companies: HashMap<Uuid, Company>,
    services: HashMap<Uuid, Service>,
    client_names: HashMap<Uuid, String>,
}

/// Store double. With `enforce_unique` it behaves like the partial unique index
/// on the appointments table; without it, it is a plain read-then-write store.
pub struct MemoryStore {
    state: Mutex<State>,
    enforce_unique: bool,
    insert_barrier: Option<Arc<Barrier>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            enforce_unique: true,
            insert_barrier: None,
        }
    }

    pub fn without_unique_index() -> Self {
        Self {
            enforce_unique: false,
            ..Self::new()
        }
    }

    /// Make `insert` wait until `parties` callers reached it, so every racer
    /// has finished its reads before the first write lands
    pub fn with_insert_barrier(mut self, parties: usize) -> Self {
        self.insert_barrier = Some(Arc::new(Barrier::new(parties)));
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn add_company(&self, company: Company) {
        self.lock().companies.insert(company.id, company);
    }

    pub fn add_service(&self, service: Service) {
        self.lock().services.insert(service.id, service);
    }

    pub fn add_staff_member(&self, staff: StaffMember) {
        self.lock().staff.insert(staff.id, staff);
    }

    pub fn add_client(&self, id: Uuid, name: &str) {
        self.lock().client_names.insert(id, name.to_string());
    }

    pub fn put_appointment(&self, appointment: Appointment) {
        self.lock().appointments.push(appointment);
    }

    pub fn appointment(&self, id: Uuid) -> Option<Appointment> {
        self.lock().appointments.iter().find(|a| a.id == id).cloned()
    }

    pub fn company(&self, id: Uuid) -> Option<Company> {
        self.lock().companies.get(&id).cloned()
    }

    pub fn appointment_count(&self) -> usize {
        self.lock().appointments.len()
    }

    fn snapshot(state: &State, appointment: &Appointment) -> AppointmentSnapshot {
        let name_of = |id: &Uuid| state.client_names.get(id).cloned().unwrap_or_default();
        AppointmentSnapshot {
            id: appointment.id,
            date: appointment.date,
            time: appointment.time,
            status: appointment.status,
            note: appointment.note.clone(),
            client_name: name_of(&appointment.client_id),
            client_email: format!("{}@example.com", appointment.client_id),
            company_name: state
                .companies
                .get(&appointment.company_id)
                .map(|c| c.name.clone())
                .unwrap_or_default(),
            service_name: state
                .services
                .get(&appointment.service_id)
                .map(|s| s.name.clone())
                .unwrap_or_default(),
            staff_member_name: state
                .staff
                .get(&appointment.staff_member_id)
                .map(|s| s.name.clone())
                .unwrap_or_default(),
        }
    }
}

#[async_trait]
impl AppointmentStore for MemoryStore {
    async fn find_active_at_slot(
        &self,
        staff_member_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
    ) -> AppResult<Option<Appointment>> {
        Ok(self
            .lock()
            .appointments
            .iter()
            .find(|a| {
                a.staff_member_id == staff_member_id
                    && a.date == date
                    && a.time == time
                    && !a.status.is_cancelled()
            })
            .cloned())
    }

    async fn occupied_times(
        &self,
        staff_member_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<Vec<NaiveTime>> {
        let mut times: Vec<NaiveTime> = self
            .lock()
            .appointments
            .iter()
            .filter(|a| {
                a.staff_member_id == staff_member_id && a.date == date && !a.status.is_cancelled()
            })
            .map(|a| a.time)
            .collect();
        times.sort();
        Ok(times)
    }

    async fn insert(&self, new: &NewAppointment) -> AppResult<Appointment> {
        if let Some(barrier) = &self.insert_barrier {
            barrier.wait().await;
        }
        let mut state = self.lock();
        if self.enforce_unique {
            let taken = state.appointments.iter().any(|a| {
                a.staff_member_id == new.staff_member_id
                    && a.date == new.date
                    && a.time == new.time
                    && !a.status.is_cancelled()
            });
            if taken {
                return Err(AppError::SlotUnavailable(
                    "This time slot has already been booked".to_string(),
                ));
            }
        }
        let now = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            date: new.date,
            time: new.time,
            status: AppointmentStatus::Pending,
            note: new.note.clone(),
            client_id: new.client_id,
            company_id: new.company_id,
            service_id: new.service_id,
            staff_member_id: new.staff_member_id,
            reminder_sent_at: None,
            created_at: now,
            updated_at: now,
        };
        state.appointments.push(appointment.clone());
        Ok(appointment)
    }

    async fn get(&self, id: Uuid) -> AppResult<Appointment> {
        self.appointment(id)
            .ok_or_else(|| AppError::NotFound(format!("Appointment {} not found", id)))
    }

    async fn get_snapshot(&self, id: Uuid) -> AppResult<AppointmentSnapshot> {
        let state = self.lock();
        let snapshot = state
            .appointments
            .iter()
            .find(|a| a.id == id)
            .map(|a| Self::snapshot(&state, a));
        snapshot.ok_or_else(|| AppError::NotFound(format!("Appointment {} not found", id)))
    }

    async fn list_for_actor(
        &self,
        actor: &Actor,
        filter: &AppointmentFilter,
    ) -> AppResult<Vec<Appointment>> {
        let mut rows: Vec<Appointment> = self
            .lock()
            .appointments
            .iter()
            .filter(|a| match *actor {
                Actor::Client { id } => a.client_id == id,
                Actor::Company { company_id } => a.company_id == company_id,
                Actor::Staff { staff_member_id } => a.staff_member_id == staff_member_id,
            })
            .filter(|a| filter.date.map_or(true, |d| a.date == d))
            .filter(|a| filter.status.map_or(true, |s| a.status == s))
            .cloned()
            .collect();
        rows.sort_by_key(|a| (a.date, a.time));
        Ok(rows)
    }

    async fn update_status(
        &self,
        id: Uuid,
        from: AppointmentStatus,
        to: AppointmentStatus,
    ) -> AppResult<Appointment> {
        let mut state = self.lock();
        let appointment = state
            .appointments
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Appointment {} not found", id)))?;
        if appointment.status != from {
            return Err(AppError::InvalidTransition(format!(
                "Appointment status changed to {} in the meantime",
                appointment.status
            )));
        }
        appointment.status = to;
        appointment.updated_at = Utc::now();
        Ok(appointment.clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut state = self.lock();
        let before = state.appointments.len();
        state.appointments.retain(|a| a.id != id);
        if state.appointments.len() == before {
            return Err(AppError::NotFound(format!("Appointment {} not found", id)));
        }
        Ok(())
    }

    async fn due_for_reminder(&self, date: NaiveDate) -> AppResult<Vec<AppointmentSnapshot>> {
        let state = self.lock();
        let mut rows: Vec<AppointmentSnapshot> = state
            .appointments
            .iter()
            .filter(|a| a.date == date && !a.status.is_cancelled() && a.reminder_sent_at.is_none())
            .map(|a| Self::snapshot(&state, a))
            .collect();
        rows.sort_by_key(|s| s.time);
        Ok(rows)
    }

    async fn claim_reminder(&self, id: Uuid) -> AppResult<bool> {
        let mut state = self.lock();
        match state.appointments.iter_mut().find(|a| a.id == id) {
            Some(a) if a.reminder_sent_at.is_none() => {
                a.reminder_sent_at = Some(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn release_reminder(&self, id: Uuid) -> AppResult<()> {
        if let Some(a) = self.lock().appointments.iter_mut().find(|a| a.id == id) {
            a.reminder_sent_at = None;
        }
        Ok(())
    }
}

#[async_trait]
impl StaffStore for MemoryStore {
    async fn get_staff_member(&self, id: Uuid) -> AppResult<StaffMember> {
        self.lock()
            .staff
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Staff member {} not found", id)))
    }

    async fn update_working_hours(
        &self,
        id: Uuid,
        schedule: &WeeklySchedule,
    ) -> AppResult<StaffMember> {
        let mut state = self.lock();
        let staff = state
            .staff
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Staff member {} not found", id)))?;
        staff.working_hours.0 = schedule.clone();
        Ok(staff.clone())
    }

    async fn list_blocked_slots(&self, staff_member_id: Uuid) -> AppResult<Vec<BlockedSlot>> {
        Ok(self.lock().blocked.get(&staff_member_id).cloned().unwrap_or_default())
    }

    async fn blocked_times_on(
        &self,
        staff_member_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<Vec<NaiveTime>> {
        Ok(self
            .lock()
            .blocked
            .get(&staff_member_id)
            .map(|slots| slots.iter().filter(|s| s.date == date).map(|s| s.time).collect())
            .unwrap_or_default())
    }

    async fn replace_blocked_slots(
        &self,
        staff_member_id: Uuid,
        slots: &[BlockedSlot],
    ) -> AppResult<Vec<BlockedSlot>> {
        let mut sorted = slots.to_vec();
        sorted.sort();
        sorted.dedup();
        self.lock().blocked.insert(staff_member_id, sorted.clone());
        Ok(sorted)
    }
}

#[async_trait]
impl CompanyStore for MemoryStore {
    async fn get_company(&self, id: Uuid) -> AppResult<Company> {
        self.company(id)
            .ok_or_else(|| AppError::NotFound(format!("Company {} not found", id)))
    }

    async fn get_service(&self, id: Uuid) -> AppResult<Service> {
        self.lock()
            .services
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Service {} not found", id)))
    }

    async fn expire_subscriptions(&self, today: NaiveDate) -> AppResult<u64> {
        let mut updated = 0;
        for company in self.lock().companies.values_mut() {
            let ended = company.subscription_end_date.map_or(false, |end| end < today);
            if company.subscription_status.is_expirable() && ended {
                company.subscription_status = crate::models::SubscriptionStatus::EXPIRED;
                company.active = false;
                updated += 1;
            }
        }
        Ok(updated)
    }
}

/// One company with one service, one staff member and one client
pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub company_id: Uuid,
    pub service_id: Uuid,
    pub staff_member_id: Uuid,
    pub client_id: Uuid,
}

impl Fixture {
    /// Staff member working Tuesdays 09:00-11:00
    pub fn new(store: MemoryStore) -> Self {
        let store = Arc::new(store);
        let company_id = Uuid::new_v4();
        let service_id = Uuid::new_v4();
        let staff_member_id = Uuid::new_v4();
        let client_id = Uuid::new_v4();

        store.add_company(Company {
            id: company_id,
            name: "Studio Nord".to_string(),
            active: true,
            subscription_status: crate::models::SubscriptionStatus::Active,
            subscription_end_date: None,
        });
        store.add_service(Service {
            id: service_id,
            company_id,
            name: "Haircut".to_string(),
            duration_minutes: 30,
            active: true,
        });

        let mut schedule = WeeklySchedule::inactive_template();
        schedule.set(
            crate::models::Weekday::Tue,
            Some(crate::models::DaySchedule::new(
                true,
                NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
            )),
        );
        store.add_staff_member(StaffMember {
            id: staff_member_id,
            company_id,
            user_id: None,
            name: "Ana".to_string(),
            active: true,
            working_hours: sqlx::types::Json(schedule),
        });
        store.add_client(client_id, "Bruno");

        Self {
            store,
            company_id,
            service_id,
            staff_member_id,
            client_id,
        }
    }

    pub fn client(&self) -> Actor {
        Actor::Client { id: self.client_id }
    }

    pub fn company(&self) -> Actor {
        Actor::Company { company_id: self.company_id }
    }

    pub fn staff(&self) -> Actor {
        Actor::Staff { staff_member_id: self.staff_member_id }
    }

    pub fn new_appointment(&self, date: NaiveDate, time: NaiveTime) -> NewAppointment {
        NewAppointment {
            staff_member_id: self.staff_member_id,
            service_id: self.service_id,
            company_id: self.company_id,
            client_id: self.client_id,
            date,
            time,
            note: None,
        }
    }
}
