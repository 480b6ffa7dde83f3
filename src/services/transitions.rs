//! Who may move an appointment to which status

use crate::{
    error::{AppError, AppResult},
    models::{Actor, Appointment, AppointmentStatus},
};

/// How the actor relates to the appointment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Relation {
    OwningClient,
    OwningCompany,
    AssignedStaff,
}

fn relation(actor: &Actor, appointment: &Appointment) -> Option<Relation> {
    match *actor {
        Actor::Client { id } if id == appointment.client_id => Some(Relation::OwningClient),
        Actor::Company { company_id } if company_id == appointment.company_id => {
            Some(Relation::OwningCompany)
        }
        Actor::Staff { staff_member_id } if staff_member_id == appointment.staff_member_id => {
            Some(Relation::AssignedStaff)
        }
        _ => None,
    }
}

/// The actor is a participant of the appointment (client, company or staff)
pub fn can_view(actor: &Actor, appointment: &Appointment) -> bool {
    relation(actor, appointment).is_some()
}

/// Check that `actor` may move `appointment` to `target`.
///
/// Fails with `Authorization` when the actor has no relationship to the
/// appointment or its role does not allow the target status, and with
/// `InvalidTransition` when the lifecycle has no such edge.
pub fn authorize_transition(
    actor: &Actor,
    appointment: &Appointment,
    target: AppointmentStatus,
) -> AppResult<()> {
    use AppointmentStatus::*;

    let relation = relation(actor, appointment).ok_or_else(|| {
        AppError::Authorization("You are not a participant of this appointment".to_string())
    })?;

    let allowed = match (relation, target) {
        (Relation::OwningClient, CancelledByClient) => true,
        (Relation::OwningClient, _) => false,
        (Relation::OwningCompany, _) => true,
        (Relation::AssignedStaff, Completed | CancelledByCompany) => true,
        (Relation::AssignedStaff, _) => false,
    };
    if !allowed {
        return Err(AppError::Authorization(format!(
            "You are not allowed to set status {}",
            target
        )));
    }

    if !appointment.status.can_transition_to(target) {
        return Err(AppError::InvalidTransition(format!(
            "Cannot change status from {} to {}",
            appointment.status, target
        )));
    }

    Ok(())
}

/// Only the owning company may hard-delete an appointment
pub fn authorize_delete(actor: &Actor, appointment: &Appointment) -> AppResult<()> {
    match relation(actor, appointment) {
        Some(Relation::OwningCompany) => Ok(()),
        _ => Err(AppError::Authorization(
            "Only the owning company can delete an appointment".to_string(),
        )),
    }
}
