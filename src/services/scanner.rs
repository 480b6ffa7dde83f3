//! Daily scans: next-day reminders and subscription expiry

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;

use super::notifications::Notifier;
use crate::{
    error::{AppError, AppResult},
    repository::{AppointmentStore, CompanyStore},
};

/// Outcome of one scan run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    /// Rows matched by the scan query
    pub selected: u64,
    /// Rows handled successfully
    pub processed: u64,
    /// Rows that failed and were skipped
    pub failed: u64,
}

/// A unit of work run once per day.
///
/// Runs must be idempotent: the same day may be scanned more than once after a restart.
#[async_trait]
pub trait ScheduledTask: Send + Sync {
    fn name(&self) -> &'static str;

    /// Run for the given execution date. Fails only if the initial query fails.
    async fn run_once(&self, today: NaiveDate) -> AppResult<ScanReport>;
}

/// Sends a reminder for every non-cancelled appointment dated tomorrow
pub struct ReminderScan {
    appointments: Arc<dyn AppointmentStore>,
    notifier: Arc<dyn Notifier>,
}

impl ReminderScan {
    pub fn new(appointments: Arc<dyn AppointmentStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { appointments, notifier }
    }
}

#[async_trait]
impl ScheduledTask for ReminderScan {
    fn name(&self) -> &'static str {
        "reminder-scan"
    }

    async fn run_once(&self, today: NaiveDate) -> AppResult<ScanReport> {
        let tomorrow = today
            .succ_opt()
            .ok_or_else(|| AppError::Internal(format!("No day after {}", today)))?;

        let due = self.appointments.due_for_reminder(tomorrow).await?;
        let mut report = ScanReport {
            selected: due.len() as u64,
            ..Default::default()
        };

        // Sequential on purpose: the mail relay is rate limited
        for appointment in &due {
            match self.appointments.claim_reminder(appointment.id).await {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    tracing::warn!(
                        appointment_id = %appointment.id,
                        "Failed to claim reminder: {}",
                        e
                    );
                    report.failed += 1;
                    continue;
                }
            }

            match self.notifier.send_reminder(appointment).await {
                Ok(()) => report.processed += 1,
                Err(e) => {
                    tracing::warn!(
                        appointment_id = %appointment.id,
                        "Failed to send reminder: {}",
                        e
                    );
                    report.failed += 1;
                    if let Err(e) = self.appointments.release_reminder(appointment.id).await {
                        tracing::error!(
                            appointment_id = %appointment.id,
                            "Failed to release reminder claim: {}",
                            e
                        );
                    }
                }
            }
        }

        Ok(report)
    }
}

/// Demotes companies whose subscription ended before the execution date
pub struct SubscriptionExpiryScan {
    companies: Arc<dyn CompanyStore>,
}

impl SubscriptionExpiryScan {
    pub fn new(companies: Arc<dyn CompanyStore>) -> Self {
        Self { companies }
    }
}

#[async_trait]
impl ScheduledTask for SubscriptionExpiryScan {
    fn name(&self) -> &'static str {
        "subscription-expiry-scan"
    }

    async fn run_once(&self, today: NaiveDate) -> AppResult<ScanReport> {
        let updated = self.companies.expire_subscriptions(today).await?;
        Ok(ScanReport {
            selected: updated,
            processed: updated,
            failed: 0,
        })
    }
}
