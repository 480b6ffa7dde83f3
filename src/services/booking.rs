//! Appointment booking, listing and status changes

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;
use validator::Validate;

use super::{availability, clock::Clock, notifications::Notifier, transitions};
use crate::{
    error::{AppError, AppResult},
    models::{
        appointment::{
            AppointmentFilter, AppointmentQuery, AvailableTimesQuery, CreateAppointment,
            NewAppointment, UpdateAppointmentStatus,
        },
        parse_date, parse_time, Actor, Appointment, AppointmentStatus, StaffMember,
    },
    repository::{AppointmentStore, CompanyStore, StaffStore},
};

#[derive(Clone)]
pub struct BookingService {
    appointments: Arc<dyn AppointmentStore>,
    staff: Arc<dyn StaffStore>,
    companies: Arc<dyn CompanyStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    slot_minutes: u32,
}

fn slot_taken() -> AppError {
    AppError::SlotUnavailable("This time slot is not available".to_string())
}

fn require_date(value: &str) -> AppResult<NaiveDate> {
    parse_date(value)
        .ok_or_else(|| {
            AppError::Validation(format!("Invalid date '{}', expected YYYY-MM-DD", value))
        })
}

fn require_time(value: &str) -> AppResult<NaiveTime> {
    parse_time(value)
        .ok_or_else(|| AppError::Validation(format!("Invalid time '{}', expected HH:MM", value)))
}

impl BookingService {
    pub fn new(
        appointments: Arc<dyn AppointmentStore>,
        staff: Arc<dyn StaffStore>,
        companies: Arc<dyn CompanyStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        slot_minutes: u32,
    ) -> Self {
        Self {
            appointments,
            staff,
            companies,
            notifier,
            clock,
            slot_minutes,
        }
    }

    /// Free start times of a staff member on a date
    async fn free_times(&self, staff: &StaffMember, date: NaiveDate) -> AppResult<Vec<NaiveTime>> {
        let occupied = self.appointments.occupied_times(staff.id, date).await?;
        let blocked = self.staff.blocked_times_on(staff.id, date).await?;
        let mut times = availability::available_times(
            Some(staff.schedule()),
            date,
            &occupied,
            &blocked,
            self.slot_minutes,
        );

        // Start times already behind us today are not offered
        let now = self.clock.now();
        if date == now.date() {
            times.retain(|time| *time > now.time());
        }
        Ok(times)
    }

    /// Book a slot for a client. The new appointment starts as `pending`.
    pub async fn request_booking(
        &self,
        client_id: Uuid,
        request: CreateAppointment,
    ) -> AppResult<Appointment> {
        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let missing: Vec<&str> = [
            ("date", request.date.is_none()),
            ("time", request.time.is_none()),
            ("serviceId", request.service_id.is_none()),
            ("companyId", request.company_id.is_none()),
            ("staffMemberId", request.staff_member_id.is_none()),
        ]
        .into_iter()
        .filter_map(|(field, absent)| absent.then_some(field))
        .collect();
        let (Some(date), Some(time), Some(service_id), Some(company_id), Some(staff_member_id)) = (
            request.date.as_deref(),
            request.time.as_deref(),
            request.service_id,
            request.company_id,
            request.staff_member_id,
        ) else {
            return Err(AppError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        };

        let date = require_date(date)?;
        let time = require_time(time)?;
        let now = self.clock.now();
        if date < now.date() || (date == now.date() && time <= now.time()) {
            return Err(AppError::Validation("Cannot book a time in the past".to_string()));
        }

        let company = self.companies.get_company(company_id).await?;
        let service = self.companies.get_service(service_id).await?;
        let staff = self.staff.get_staff_member(staff_member_id).await?;

        if !company.active {
            return Err(AppError::Validation("Company is not accepting bookings".to_string()));
        }
        if service.company_id != company.id || staff.company_id != company.id {
            return Err(AppError::Validation(
                "Service and staff member must belong to the company".to_string(),
            ));
        }
        if !service.active || !staff.active {
            return Err(AppError::Validation("Service or staff member is inactive".to_string()));
        }

        if self
            .appointments
            .find_active_at_slot(staff.id, date, time)
            .await?
            .is_some()
        {
            return Err(slot_taken());
        }
        if !self.free_times(&staff, date).await?.contains(&time) {
            return Err(slot_taken());
        }

        let appointment = self
            .appointments
            .insert(&NewAppointment {
                staff_member_id: staff.id,
                service_id: service.id,
                company_id: company.id,
                client_id,
                date,
                time,
                note: request.note,
            })
            .await?;

        tracing::info!(
            appointment_id = %appointment.id,
            staff_member_id = %staff.id,
            %date,
            %time,
            "Appointment booked"
        );

        let notifier = self.notifier.clone();
        let appointment_id = appointment.id;
        tokio::spawn(async move {
            if let Err(e) = notifier.send_confirmation(appointment_id).await {
                tracing::warn!(%appointment_id, "Failed to send booking confirmation: {}", e);
            }
        });

        Ok(appointment)
    }

    /// Get one appointment the actor takes part in
    pub async fn get_appointment(&self, actor: &Actor, id: Uuid) -> AppResult<Appointment> {
        let appointment = self.appointments.get(id).await?;
        if !transitions::can_view(actor, &appointment) {
            return Err(AppError::Authorization(
                "You are not a participant of this appointment".to_string(),
            ));
        }
        Ok(appointment)
    }

    /// Appointments visible to the actor, ordered by date then time
    pub async fn list_appointments(
        &self,
        actor: &Actor,
        query: AppointmentQuery,
    ) -> AppResult<Vec<Appointment>> {
        let filter = AppointmentFilter {
            date: query.date.as_deref().map(require_date).transpose()?,
            status: query
                .status
                .as_deref()
                .map(|s| s.parse::<AppointmentStatus>().map_err(AppError::Validation))
                .transpose()?,
        };
        self.appointments.list_for_actor(actor, &filter).await
    }

    /// Move an appointment to a new status
    pub async fn change_status(
        &self,
        actor: &Actor,
        id: Uuid,
        request: UpdateAppointmentStatus,
    ) -> AppResult<Appointment> {
        let target: AppointmentStatus = request
            .status
            .as_deref()
            .ok_or_else(|| AppError::Validation("Missing required field: status".to_string()))?
            .parse()
            .map_err(AppError::Validation)?;

        let appointment = self.appointments.get(id).await?;
        transitions::authorize_transition(actor, &appointment, target)?;

        let updated = self
            .appointments
            .update_status(id, appointment.status, target)
            .await?;

        tracing::info!(
            appointment_id = %id,
            from = %appointment.status,
            to = %target,
            "Appointment status changed"
        );
        Ok(updated)
    }

    /// Hard delete, owning company only
    pub async fn delete_appointment(&self, actor: &Actor, id: Uuid) -> AppResult<()> {
        let appointment = self.appointments.get(id).await?;
        transitions::authorize_delete(actor, &appointment)?;
        self.appointments.delete(id).await?;
        tracing::info!(appointment_id = %id, "Appointment deleted");
        Ok(())
    }

    /// Bookable start times ("HH:MM") for a staff member on a date
    pub async fn available_times(&self, query: AvailableTimesQuery) -> AppResult<Vec<String>> {
        let (Some(staff_member_id), Some(date), Some(service_id)) =
            (query.staff_member_id, query.date.as_deref(), query.service_id)
        else {
            return Err(AppError::Validation(
                "staffMemberId, date and serviceId are required".to_string(),
            ));
        };
        let date = require_date(date)?;

        let staff = self.staff.get_staff_member(staff_member_id).await?;
        let service = self.companies.get_service(service_id).await?;
        if service.company_id != staff.company_id {
            return Err(AppError::Validation(
                "Service is not offered by this staff member's company".to_string(),
            ));
        }
        if !staff.active || date < self.clock.today() {
            return Ok(Vec::new());
        }

        Ok(self
            .free_times(&staff, date)
            .await?
            .into_iter()
            .map(|t| t.format("%H:%M").to_string())
            .collect())
    }
}
