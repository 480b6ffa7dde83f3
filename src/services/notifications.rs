//! Booking confirmation and reminder emails

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, Message, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    SmtpTransport, Transport,
};
use uuid::Uuid;

use crate::{
    config::EmailConfig,
    error::{AppError, AppResult},
    models::AppointmentSnapshot,
    repository::AppointmentStore,
};

/// Outbound notifications about appointments
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Tell the client a booking was recorded
    async fn send_confirmation(&self, appointment_id: Uuid) -> AppResult<()>;

    /// Remind the client of an appointment happening tomorrow
    async fn send_reminder(&self, appointment: &AppointmentSnapshot) -> AppResult<()>;
}

/// SMTP notifier. With `enabled = false` messages are logged instead of sent.
#[derive(Clone)]
pub struct EmailNotifier {
    config: EmailConfig,
    appointments: Arc<dyn AppointmentStore>,
}

impl EmailNotifier {
    pub fn new(config: EmailConfig, appointments: Arc<dyn AppointmentStore>) -> Self {
        Self { config, appointments }
    }

    /// Generic email sending function
    async fn send_email(&self, to: &str, subject: &str, body: String) -> AppResult<()> {
        if !self.config.enabled {
            tracing::info!(to, subject, "Email delivery disabled, skipping");
            return Ok(());
        }

        let from_name = self.config.smtp_from_name.as_deref().unwrap_or("Agenda");
        let from_mailbox = Mailbox::from_str(&format!("{} <{}>", from_name, self.config.smtp_from))
            .map_err(|e| AppError::Internal(format!("Invalid from address: {}", e)))?;
        let to_mailbox = Mailbox::from_str(to)
            .map_err(|e| AppError::Internal(format!("Invalid to address: {}", e)))?;

        let html = format!(
            "<html><body><pre>{}</pre></body></html>",
            body.replace('\n', "<br>")
        );
        let email = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(body),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html),
                    ),
            )
            .map_err(|e| AppError::Internal(format!("Failed to build email: {}", e)))?;

        let mailer_builder = if self.config.smtp_use_tls {
            SmtpTransport::starttls_relay(&self.config.smtp_host)
                .map_err(|e| AppError::Internal(format!("Failed to create SMTP transport: {}", e)))?
        } else {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
        }
        .port(self.config.smtp_port);

        let mailer_builder = match (&self.config.smtp_username, &self.config.smtp_password) {
            (Some(username), Some(password)) => {
                mailer_builder.credentials(Credentials::new(username.clone(), password.clone()))
            }
            _ => mailer_builder,
        };
        let mailer = mailer_builder.build();

        // SmtpTransport blocks
        tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| AppError::Internal(format!("Email task failed: {}", e)))?
            .map_err(|e| AppError::Internal(format!("Failed to send email: {}", e)))?;

        tracing::info!(to, subject, "Email sent");
        Ok(())
    }
}

fn confirmation_body(appointment: &AppointmentSnapshot) -> String {
    format!(
        r#"
Hello {client},

Your appointment for {service} with {staff} at {company} has been recorded.

Date: {date}
Time: {time}

You will receive a reminder the day before.
"#,
        client = appointment.client_name,
        service = appointment.service_name,
        staff = appointment.staff_member_name,
        company = appointment.company_name,
        date = appointment.date.format("%d/%m/%Y"),
        time = appointment.time.format("%H:%M"),
    )
}

fn reminder_body(appointment: &AppointmentSnapshot) -> String {
    let note = appointment
        .note
        .as_deref()
        .map(|note| format!("\nNote: {}\n", note))
        .unwrap_or_default();
    format!(
        r#"
Hello {client},

This is a reminder of your appointment tomorrow.

Service: {service}
With: {staff} at {company}
Date: {date}
Time: {time}
{note}"#,
        client = appointment.client_name,
        service = appointment.service_name,
        staff = appointment.staff_member_name,
        company = appointment.company_name,
        date = appointment.date.format("%d/%m/%Y"),
        time = appointment.time.format("%H:%M"),
        note = note,
    )
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn send_confirmation(&self, appointment_id: Uuid) -> AppResult<()> {
        let appointment = self.appointments.get_snapshot(appointment_id).await?;
        let subject = format!("Appointment confirmed: {}", appointment.service_name);
        self.send_email(&appointment.client_email, &subject, confirmation_body(&appointment))
            .await
    }

    async fn send_reminder(&self, appointment: &AppointmentSnapshot) -> AppResult<()> {
        let subject = format!("Reminder: {} tomorrow", appointment.service_name);
        self.send_email(&appointment.client_email, &subject, reminder_body(appointment))
            .await
    }
}
