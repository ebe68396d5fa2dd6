// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Booking ---
        handlers::booking::get_availability,
        handlers::booking::create_reservation,
        handlers::booking::list_reservations,
        handlers::booking::get_reservation,
        handlers::booking::update_reservation,
        handlers::booking::cancel_reservation,
        handlers::booking::pay_reservation,

        // --- Payments ---
        handlers::payment::confirm_payment,
        handlers::payment::handle_webhook,

        // --- Partner ---
        handlers::partner::approve_reservation,
        handlers::partner::cancel_reservation,
    ),
    components(
        schemas(
            // --- Catalog ---
            models::catalog::PromotionType,
            models::catalog::Promotion,
            models::catalog::ScheduleSlot,
            models::catalog::SlotAvailability,

            // --- Booking ---
            models::booking::BookingStatus,
            models::booking::Booking,

            // --- Payments ---
            models::payment::PaymentStatus,
            models::payment::GatewayPaymentStatus,
            models::payment::Payment,

            // --- Notifications ---
            models::notification::NotificationType,
            models::notification::NotificationEvent,

            // --- Payloads ---
            handlers::booking::CreateReservationPayload,
            handlers::booking::UpdateReservationPayload,
            handlers::booking::Pagination,
            handlers::booking::PaginatedBookings,
            handlers::payment::ConfirmPaymentPayload,
            handlers::payment::WebhookPayload,
            handlers::partner::ApprovedReservation,
        )
    ),
    tags(
        (name = "Booking", description = "Disponibilidade e Reservas"),
        (name = "Payments", description = "Reconciliação de Pagamentos (confirmação e webhook)"),
        (name = "Partner", description = "Ações do Parceiro sobre Reservas")
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
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
