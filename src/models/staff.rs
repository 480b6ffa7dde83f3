//! Staff member model

use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::ToSchema;
use uuid::Uuid;

use super::schedule::WeeklySchedule;

/// Staff member (professional) of a company
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StaffMember {
    pub id: Uuid,
    pub company_id: Uuid,
    pub user_id: Option<Uuid>,
    pub name: String,
    pub active: bool,
    #[schema(value_type = WeeklySchedule)]
    pub working_hours: Json<WeeklySchedule>,
}

impl StaffMember {
    pub fn schedule(&self) -> &WeeklySchedule {
        &self.working_hours.0
    }
}
