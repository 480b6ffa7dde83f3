//! Business logic services

pub mod availability;
pub mod booking;
pub mod clock;
pub mod notifications;
pub mod scanner;
pub mod scheduler;
pub mod schedules;
pub mod transitions;

use std::sync::Arc;

use chrono::NaiveTime;

use crate::{
    config::AppConfig,
    repository::{AppointmentStore, CompanyStore, Repository, StaffStore},
};
use clock::{Clock, SystemClock};
use notifications::{EmailNotifier, Notifier};
use scanner::{ReminderScan, SubscriptionExpiryScan};
use scheduler::DailyJob;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub booking: booking::BookingService,
    pub schedules: schedules::SchedulesService,
    appointments: Arc<dyn AppointmentStore>,
    companies: Arc<dyn CompanyStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl Services {
    /// Create all services on top of the Postgres repository
    pub fn new(repository: &Repository, config: &AppConfig) -> Self {
        let appointments = repository.appointment_store();
        let notifier = Arc::new(EmailNotifier::new(config.email.clone(), appointments.clone()));
        Self::from_stores(
            appointments,
            repository.staff_store(),
            repository.company_store(),
            notifier,
            Arc::new(SystemClock),
            config.booking.slot_minutes,
        )
    }

    /// Wire services on arbitrary stores
    pub fn from_stores(
        appointments: Arc<dyn AppointmentStore>,
        staff: Arc<dyn StaffStore>,
        companies: Arc<dyn CompanyStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        slot_minutes: u32,
    ) -> Self {
        Self {
            booking: booking::BookingService::new(
                appointments.clone(),
                staff.clone(),
                companies.clone(),
                notifier.clone(),
                clock.clone(),
                slot_minutes,
            ),
            schedules: schedules::SchedulesService::new(staff),
            appointments,
            companies,
            notifier,
            clock,
        }
    }

    /// Next-day reminder scan, run daily at `at`
    pub fn reminder_job(&self, at: NaiveTime) -> DailyJob {
        let task = ReminderScan::new(self.appointments.clone(), self.notifier.clone());
        DailyJob::new(Arc::new(task), at, self.clock.clone())
    }

    /// Subscription-expiry scan, run daily at `at`
    pub fn expiry_job(&self, at: NaiveTime) -> DailyJob {
        let task = SubscriptionExpiryScan::new(self.companies.clone());
        DailyJob::new(Arc::new(task), at, self.clock.clone())
    }
}
