// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;
use crate::ws;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,

        // --- Appointments ---
        handlers::appointments::create_booking,
        handlers::appointments::set_status,
        handlers::appointments::list_appointments,
        handlers::appointments::force_update,

        // --- Notifications ---
        handlers::notifications::list_notifications,
        handlers::notifications::mark_read,
        handlers::notifications::mark_all_read,

        // --- Billing ---
        handlers::billing::list_billing_records,
        handlers::billing::list_invoices,
        handlers::billing::download_invoice_pdf,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Profiles ---
            models::profiles::Professional,
            models::profiles::Patient,
            models::profiles::Company,

            // --- Appointments ---
            models::appointments::Frequency,
            models::appointments::AppointmentStatus,
            models::appointments::AppointmentSeries,
            models::appointments::Appointment,
            handlers::appointments::CreateBookingPayload,
            handlers::appointments::CreatedBookingResponse,
            handlers::appointments::UpdateStatusPayload,
            handlers::appointments::ForceUpdatePayload,

            // --- Billing ---
            models::billing::BillingStatus,
            models::billing::InvoiceStatus,
            models::billing::BillingRecord,
            models::billing::Invoice,

            // --- Notifications ---
            models::notifications::NotificationKind,
            models::notifications::Notification,

            // --- Tempo real ---
            ws::events::ServerEvent,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados do Usuário e Perfil"),
        (name = "Appointments", description = "Agendamentos e Máquina de Estados"),
        (name = "Notifications", description = "Notificações Persistidas"),
        (name = "Billing", description = "Cobrança, Faturas e Recibos")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
