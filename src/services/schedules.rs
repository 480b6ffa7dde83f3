//! Staff working hours and blocked slots

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{schedule::ReplaceBlockedSlots, Actor, BlockedSlot, StaffMember, WeeklySchedule},
    repository::StaffStore,
};

#[derive(Clone)]
pub struct SchedulesService {
    staff: Arc<dyn StaffStore>,
}

/// The staff member themself or an admin of their company
fn ensure_can_edit(actor: &Actor, staff: &StaffMember) -> AppResult<()> {
    match *actor {
        Actor::Staff { staff_member_id } if staff_member_id == staff.id => Ok(()),
        Actor::Company { company_id } if company_id == staff.company_id => Ok(()),
        _ => Err(AppError::Authorization(
            "Only the staff member or their company can change this schedule".to_string(),
        )),
    }
}

impl SchedulesService {
    pub fn new(staff: Arc<dyn StaffStore>) -> Self {
        Self { staff }
    }

    pub async fn get_schedule(&self, staff_member_id: Uuid) -> AppResult<WeeklySchedule> {
        let staff = self.staff.get_staff_member(staff_member_id).await?;
        Ok(staff.working_hours.0)
    }

    /// Replace the weekly template
    pub async fn update_schedule(
        &self,
        actor: &Actor,
        staff_member_id: Uuid,
        schedule: WeeklySchedule,
    ) -> AppResult<WeeklySchedule> {
        let staff = self.staff.get_staff_member(staff_member_id).await?;
        ensure_can_edit(actor, &staff)?;
        schedule.validate()?;

        let updated = self.staff.update_working_hours(staff.id, &schedule).await?;
        tracing::info!(staff_member_id = %staff.id, "Working hours updated");
        Ok(updated.working_hours.0)
    }

    pub async fn get_blocked_slots(&self, staff_member_id: Uuid) -> AppResult<Vec<BlockedSlot>> {
        self.staff.get_staff_member(staff_member_id).await?;
        self.staff.list_blocked_slots(staff_member_id).await
    }

    /// Replace the whole blocked-slot set
    pub async fn replace_blocked_slots(
        &self,
        actor: &Actor,
        staff_member_id: Uuid,
        request: ReplaceBlockedSlots,
    ) -> AppResult<Vec<BlockedSlot>> {
        let staff = self.staff.get_staff_member(staff_member_id).await?;
        ensure_can_edit(actor, &staff)?;
        let slots = request.parse()?;

        let stored = self.staff.replace_blocked_slots(staff.id, &slots).await?;
        tracing::info!(staff_member_id = %staff.id, count = stored.len(), "Blocked slots replaced");
        Ok(stored)
    }
}
