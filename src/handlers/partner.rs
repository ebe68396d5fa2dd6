// src/handlers/partner.rs

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::PartnerUser,
    models::{booking::Booking, payment::Payment},
};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApprovedReservation {
    pub booking: Booking,
    pub payment: Payment,
}

// POST /api/partner/reservations/{id}/approve
//
// Fluxo gated: o parceiro aprova a reserva PENDING, que passa a
// AWAITING_PAYMENT com um pagamento pendente criado no gateway.
#[utoipa::path(
    post,
    path = "/api/partner/reservations/{id}/approve",
    tag = "Partner",
    params(("id" = Uuid, Path, description = "ID da reserva")),
    responses(
        (status = 200, description = "Reserva aprovada, aguardando pagamento", body = ApprovedReservation),
        (status = 403, description = "Reserva de anúncio de outro parceiro"),
        (status = 409, description = "Reserva não está pendente")
    ),
    security(("api_jwt" = []))
)]
pub async fn approve_reservation(
    State(app_state): State<AppState>,
    PartnerUser(partner): PartnerUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let (booking, payment) = app_state
        .booking_service
        .approve_reservation(&app_state.db_pool, &partner, id)
        .await?;
    Ok(Json(ApprovedReservation { booking, payment }))
}

// PATCH /api/partner/reservations/{id}/cancel
#[utoipa::path(
    patch,
    path = "/api/partner/reservations/{id}/cancel",
    tag = "Partner",
    params(("id" = Uuid, Path, description = "ID da reserva")),
    responses(
        (status = 200, description = "Reserva cancelada pelo parceiro", body = Booking),
        (status = 403, description = "Reserva de anúncio de outro parceiro"),
        (status = 409, description = "Reserva já cancelada ou concluída")
    ),
    security(("api_jwt" = []))
)]
pub async fn cancel_reservation(
    State(app_state): State<AppState>,
    PartnerUser(partner): PartnerUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let booking = app_state
        .booking_service
        .cancel_reservation(&app_state.db_pool, &partner, id, true)
        .await?;
    Ok(Json(booking))
}
