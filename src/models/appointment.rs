//! Appointment model and related types

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::hhmm;

/// Appointment lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
    CancelledByClient,
    CancelledByCompany,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::CancelledByClient => "cancelled_by_client",
            AppointmentStatus::CancelledByCompany => "cancelled_by_company",
        }
    }

    /// Cancelled appointments release their slot
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::CancelledByClient | AppointmentStatus::CancelledByCompany
        )
    }

    pub fn is_terminal(&self) -> bool {
        self.is_cancelled() || *self == AppointmentStatus::Completed
    }

    /// Statuses reachable in one step
    pub fn successors(&self) -> &'static [AppointmentStatus] {
        use AppointmentStatus::*;
        match self {
            Pending => &[Confirmed, Completed, CancelledByClient, CancelledByCompany],
            Confirmed => &[Completed, CancelledByClient, CancelledByCompany],
            Completed | CancelledByClient | CancelledByCompany => &[],
        }
    }

    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        self.successors().contains(&next)
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(AppointmentStatus::Pending),
            "confirmed" => Ok(AppointmentStatus::Confirmed),
            "completed" => Ok(AppointmentStatus::Completed),
            "cancelled_by_client" => Ok(AppointmentStatus::CancelledByClient),
            "cancelled_by_company" => Ok(AppointmentStatus::CancelledByCompany),
            _ => Err(format!("Invalid appointment status: {}", s)),
        }
    }
}

// SQLx conversion for AppointmentStatus (stored as TEXT)
impl sqlx::Type<Postgres> for AppointmentStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for AppointmentStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for AppointmentStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_str(), buf)
    }
}

/// Appointment row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    #[sqlx(rename = "appointment_date")]
    #[schema(value_type = String, example = "2025-03-04")]
    pub date: NaiveDate,
    #[sqlx(rename = "appointment_time")]
    #[serde(with = "hhmm")]
    #[schema(value_type = String, example = "09:30")]
    pub time: NaiveTime,
    pub status: AppointmentStatus,
    pub note: Option<String>,
    pub client_id: Uuid,
    pub company_id: Uuid,
    pub service_id: Uuid,
    pub staff_member_id: Uuid,
    pub reminder_sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated booking ready to be stored
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub staff_member_id: Uuid,
    pub service_id: Uuid,
    pub company_id: Uuid,
    pub client_id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub note: Option<String>,
}

/// Create appointment request
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointment {
    /// Date (YYYY-MM-DD)
    pub date: Option<String>,
    /// Start time (HH:MM)
    pub time: Option<String>,
    pub service_id: Option<Uuid>,
    pub company_id: Option<Uuid>,
    pub staff_member_id: Option<Uuid>,
    #[validate(length(max = 1000))]
    pub note: Option<String>,
}

/// Status change request
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateAppointmentStatus {
    /// Target status (pending, confirmed, completed, cancelled_by_client, cancelled_by_company)
    pub status: Option<String>,
}

/// Query parameters for listing appointments
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct AppointmentQuery {
    /// Only appointments on this date (YYYY-MM-DD)
    pub date: Option<String>,
    /// Only appointments with this status
    pub status: Option<String>,
}

/// Parsed listing filter
#[derive(Debug, Clone, Copy, Default)]
pub struct AppointmentFilter {
    pub date: Option<NaiveDate>,
    pub status: Option<AppointmentStatus>,
}

/// Query parameters for available times
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(rename_all = "camelCase")]
pub struct AvailableTimesQuery {
    pub staff_member_id: Option<Uuid>,
    /// Date (YYYY-MM-DD)
    pub date: Option<String>,
    pub service_id: Option<Uuid>,
}

/// Appointment with the client, company and service context used by notifications
#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentSnapshot {
    pub id: Uuid,
    #[sqlx(rename = "appointment_date")]
    #[schema(value_type = String)]
    pub date: NaiveDate,
    #[sqlx(rename = "appointment_time")]
    #[serde(with = "hhmm")]
    #[schema(value_type = String)]
    pub time: NaiveTime,
    pub status: AppointmentStatus,
    pub note: Option<String>,
    pub client_name: String,
    pub client_email: String,
    pub company_name: String,
    pub service_name: String,
    pub staff_member_name: String,
}
