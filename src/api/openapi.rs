//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{appointments, health, staff};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Agenda API",
        version = "1.0.0",
        description = "Appointment scheduling REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html"),
        contact(name = "Agenda Team", email = "dev@agenda.local")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Appointments
        appointments::create_appointment,
        appointments::list_appointments,
        appointments::get_appointment,
        appointments::update_appointment_status,
        appointments::delete_appointment,
        appointments::available_times,
        // Staff schedules
        staff::get_schedule,
        staff::update_schedule,
        staff::get_blocked_slots,
        staff::replace_blocked_slots,
    ),
    components(
        schemas(
            // Appointments
            crate::models::Appointment,
            crate::models::AppointmentStatus,
            crate::models::appointment::CreateAppointment,
            crate::models::appointment::UpdateAppointmentStatus,
            appointments::MessageResponse,
            // Staff schedules
            crate::models::WeeklySchedule,
            crate::models::DaySchedule,
            crate::models::BlockedSlot,
            crate::models::schedule::BlockedSlotInput,
            crate::models::schedule::ReplaceBlockedSlots,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "appointments", description = "Booking and appointment lifecycle"),
        (name = "staff", description = "Staff working hours and blocked slots")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
