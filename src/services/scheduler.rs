//! Runs a [`ScheduledTask`] once a day at a fixed local time

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDateTime, NaiveTime};
use tokio::task::JoinHandle;

use super::{
    clock::Clock,
    scanner::{ScanReport, ScheduledTask},
};
use crate::error::AppResult;

/// Time left until the next occurrence of `at` after `now`.
///
/// When `now` is exactly `at`, the next occurrence is tomorrow.
pub fn duration_until_next(now: NaiveDateTime, at: NaiveTime) -> Duration {
    let today = now.date();
    let target = if now.time() < at {
        today.and_time(at)
    } else {
        today.and_time(at) + chrono::Duration::days(1)
    };
    (target - now)
        .to_std()
        .unwrap_or(Duration::from_secs(60))
}

/// Handle on one daily job, built by the startup routine
pub struct DailyJob {
    task: Arc<dyn ScheduledTask>,
    at: NaiveTime,
    clock: Arc<dyn Clock>,
}

impl DailyJob {
    pub fn new(task: Arc<dyn ScheduledTask>, at: NaiveTime, clock: Arc<dyn Clock>) -> Self {
        Self { task, at, clock }
    }

    pub fn name(&self) -> &'static str {
        self.task.name()
    }

    /// Trigger one run for the clock's current date
    pub async fn run_now(&self) -> AppResult<ScanReport> {
        let today = self.clock.today();
        match self.task.run_once(today).await {
            Ok(report) => {
                tracing::info!(
                    task = self.task.name(),
                    %today,
                    selected = report.selected,
                    processed = report.processed,
                    failed = report.failed,
                    "Scheduled task finished"
                );
                Ok(report)
            }
            Err(e) => {
                tracing::error!(task = self.task.name(), %today, "Scheduled task failed: {}", e);
                Err(e)
            }
        }
    }

    /// Start the daily loop on the runtime
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            tracing::info!(
                task = self.task.name(),
                at = %self.at.format("%H:%M"),
                "Daily job started"
            );
            loop {
                let wait = duration_until_next(self.clock.now(), self.at);
                tracing::debug!(
                    task = self.task.name(),
                    "Next run in {} minutes",
                    wait.as_secs() / 60
                );
                tokio::time::sleep(wait).await;
                // failures are logged by run_now; the next day retries
                let _ = self.run_now().await;
            }
        })
    }
}
