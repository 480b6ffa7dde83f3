//! Staff schedule endpoints

use axum::{extract::State, Json};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{schedule::ReplaceBlockedSlots, BlockedSlot, WeeklySchedule},
    AppState,
};

use super::{ApiJson, ApiPath, AuthenticatedUser};

/// Weekly working hours of a staff member
#[utoipa::path(
    get,
    path = "/staff-members/{id}/schedule",
    tag = "staff",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Staff member ID")),
    responses(
        (status = 200, description = "Weekly template", body = WeeklySchedule),
        (status = 404, description = "Staff member not found")
    )
)]
pub async fn get_schedule(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<WeeklySchedule>> {
    let schedule = state.services.schedules.get_schedule(id).await?;
    Ok(Json(schedule))
}

/// Replace the weekly working hours
#[utoipa::path(
    put,
    path = "/staff-members/{id}/schedule",
    tag = "staff",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Staff member ID")),
    request_body = WeeklySchedule,
    responses(
        (status = 200, description = "Stored template", body = WeeklySchedule),
        (status = 400, description = "Start not before end on an active day"),
        (status = 403, description = "Not this staff member or their company"),
        (status = 404, description = "Staff member not found")
    )
)]
pub async fn update_schedule(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(schedule): ApiJson<WeeklySchedule>,
) -> AppResult<Json<WeeklySchedule>> {
    let actor = claims.actor()?;
    let schedule = state.services.schedules.update_schedule(&actor, id, schedule).await?;
    Ok(Json(schedule))
}

/// One-off blocked slots of a staff member
#[utoipa::path(
    get,
    path = "/staff-members/{id}/blocked-slots",
    tag = "staff",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Staff member ID")),
    responses(
        (status = 200, description = "Blocked slots ordered by date and time", body = Vec<BlockedSlot>),
        (status = 404, description = "Staff member not found")
    )
)]
pub async fn get_blocked_slots(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<Vec<BlockedSlot>>> {
    let slots = state.services.schedules.get_blocked_slots(id).await?;
    Ok(Json(slots))
}

/// Replace the whole set of blocked slots
#[utoipa::path(
    put,
    path = "/staff-members/{id}/blocked-slots",
    tag = "staff",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Staff member ID")),
    request_body = ReplaceBlockedSlots,
    responses(
        (status = 200, description = "Stored blocked slots", body = Vec<BlockedSlot>),
        (status = 400, description = "Malformed entry"),
        (status = 403, description = "Not this staff member or their company"),
        (status = 404, description = "Staff member not found")
    )
)]
pub async fn replace_blocked_slots(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<ReplaceBlockedSlots>,
) -> AppResult<Json<Vec<BlockedSlot>>> {
    let actor = claims.actor()?;
    let slots = state.services.schedules.replace_blocked_slots(&actor, id, request).await?;
    Ok(Json(slots))
}
