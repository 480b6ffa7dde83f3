//! Appointment booking endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        appointment::{
            AppointmentQuery, AvailableTimesQuery, CreateAppointment, UpdateAppointmentStatus,
        },
        Appointment,
    },
    AppState,
};

use super::{ApiJson, ApiPath, ApiQuery, AuthenticatedUser};

/// Plain acknowledgement
#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Book a slot (clients only)
#[utoipa::path(
    post,
    path = "/appointments",
    tag = "appointments",
    security(("bearer_auth" = [])),
    request_body = CreateAppointment,
    responses(
        (status = 201, description = "Appointment created", body = Appointment),
        (status = 400, description = "Missing fields, invalid values or slot unavailable", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Caller is not a client"),
        (status = 404, description = "Unknown company, service or staff member")
    )
)]
pub async fn create_appointment(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiJson(request): ApiJson<CreateAppointment>,
) -> AppResult<(StatusCode, Json<Appointment>)> {
    let client_id = claims.require_client()?;
    let appointment = state.services.booking.request_booking(client_id, request).await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

/// List the caller's appointments
#[utoipa::path(
    get,
    path = "/appointments",
    tag = "appointments",
    security(("bearer_auth" = [])),
    params(AppointmentQuery),
    responses(
        (status = 200, description = "Appointments visible to the caller", body = Vec<Appointment>),
        (status = 400, description = "Invalid filter"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_appointments(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiQuery(query): ApiQuery<AppointmentQuery>,
) -> AppResult<Json<Vec<Appointment>>> {
    let actor = claims.actor()?;
    let appointments = state.services.booking.list_appointments(&actor, query).await?;
    Ok(Json(appointments))
}

/// Get one appointment
#[utoipa::path(
    get,
    path = "/appointments/{id}",
    tag = "appointments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "Appointment", body = Appointment),
        (status = 403, description = "Caller is not a participant"),
        (status = 404, description = "Appointment not found")
    )
)]
pub async fn get_appointment(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<Appointment>> {
    let actor = claims.actor()?;
    let appointment = state.services.booking.get_appointment(&actor, id).await?;
    Ok(Json(appointment))
}

/// Change the status of an appointment
#[utoipa::path(
    put,
    path = "/appointments/{id}",
    tag = "appointments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Appointment ID")),
    request_body = UpdateAppointmentStatus,
    responses(
        (status = 200, description = "Updated appointment", body = Appointment),
        (status = 400, description = "Missing or unknown status"),
        (status = 403, description = "Forbidden or invalid transition", body = crate::error::ErrorResponse),
        (status = 404, description = "Appointment not found")
    )
)]
pub async fn update_appointment_status(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<UpdateAppointmentStatus>,
) -> AppResult<Json<Appointment>> {
    let actor = claims.actor()?;
    let appointment = state.services.booking.change_status(&actor, id, request).await?;
    Ok(Json(appointment))
}

/// Delete an appointment (owning company only)
#[utoipa::path(
    delete,
    path = "/appointments/{id}",
    tag = "appointments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "Appointment deleted", body = MessageResponse),
        (status = 403, description = "Caller is not the owning company"),
        (status = 404, description = "Appointment not found")
    )
)]
pub async fn delete_appointment(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    let actor = claims.actor()?;
    state.services.booking.delete_appointment(&actor, id).await?;
    Ok(Json(MessageResponse {
        message: "Appointment deleted".to_string(),
    }))
}

/// Bookable start times of a staff member on a date
#[utoipa::path(
    get,
    path = "/appointments/available-times",
    tag = "appointments",
    params(AvailableTimesQuery),
    responses(
        (status = 200, description = "Ordered start times (HH:MM), possibly empty", body = Vec<String>),
        (status = 400, description = "Missing or invalid parameters"),
        (status = 404, description = "Unknown staff member or service")
    )
)]
pub async fn available_times(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<AvailableTimesQuery>,
) -> AppResult<Json<Vec<String>>> {
    let times = state.services.booking.available_times(query).await?;
    Ok(Json(times))
}
