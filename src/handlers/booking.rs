// src/handlers/booking.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::booking::{Booking, BookingStatus},
};

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AvailabilityQuery {
    pub listing_id: Uuid,
    /// Dia consultado (YYYY-MM-DD)
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationPayload {
    pub schedule_id: Uuid,

    #[validate(range(min = 1, message = "É necessário ao menos 1 participante."))]
    #[schema(example = 2)]
    pub num_participants: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReservationPayload {
    #[validate(range(min = 1, message = "É necessário ao menos 1 participante."))]
    #[schema(example = 3)]
    pub num_participants: i32,
}

fn default_page() -> i64 {
    1
}
fn default_limit() -> i64 {
    10
}

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListReservationsQuery {
    #[validate(range(min = 1))]
    #[serde(default = "default_page")]
    pub page: i64,

    #[validate(range(min = 1, max = 100))]
    #[serde(default = "default_limit")]
    pub limit: i64,

    pub status: Option<BookingStatus>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedBookings {
    pub data: Vec<Booking>,
    pub pagination: Pagination,
}

// ---
// Handlers
// ---

// GET /api/bookings/availability
#[utoipa::path(
    get,
    path = "/api/bookings/availability",
    tag = "Booking",
    params(AvailabilityQuery),
    responses(
        (status = 200, description = "Slots do dia com vagas restantes", body = [crate::models::catalog::SlotAvailability])
    )
)]
pub async fn get_availability(
    State(app_state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<impl IntoResponse, AppError> {
    let slots = app_state
        .booking_service
        .get_availability(&app_state.db_pool, query.listing_id, query.date)
        .await?;
    Ok(Json(slots))
}

// POST /api/bookings/reservations
#[utoipa::path(
    post,
    path = "/api/bookings/reservations",
    tag = "Booking",
    request_body = CreateReservationPayload,
    responses(
        (status = 201, description = "Reserva criada", body = Booking),
        (status = 409, description = "Capacidade insuficiente ou slot indisponível")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_reservation(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateReservationPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let booking = app_state
        .booking_service
        .create_reservation(
            &app_state.db_pool,
            user.id,
            payload.schedule_id,
            payload.num_participants,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(booking)))
}

// GET /api/bookings/reservations
#[utoipa::path(
    get,
    path = "/api/bookings/reservations",
    tag = "Booking",
    params(ListReservationsQuery),
    responses(
        (status = 200, description = "Reservas do usuário, paginadas", body = PaginatedBookings)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_reservations(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<ListReservationsQuery>,
) -> Result<impl IntoResponse, AppError> {
    query.validate()?;

    let (bookings, total) = app_state
        .booking_service
        .list_reservations(
            &app_state.db_pool,
            user.id,
            query.status,
            query.page,
            query.limit,
        )
        .await?;

    Ok(Json(PaginatedBookings {
        data: bookings,
        pagination: Pagination {
            total,
            page: query.page,
            limit: query.limit,
            total_pages: (total + query.limit - 1) / query.limit,
        },
    }))
}

// GET /api/bookings/reservations/{id}
#[utoipa::path(
    get,
    path = "/api/bookings/reservations/{id}",
    tag = "Booking",
    params(("id" = Uuid, Path, description = "ID da reserva")),
    responses(
        (status = 200, description = "Detalhe da reserva", body = Booking),
        (status = 403, description = "Reserva de outro usuário"),
        (status = 404, description = "Reserva não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_reservation(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let booking = app_state
        .booking_service
        .get_reservation(&app_state.db_pool, &user, id)
        .await?;
    Ok(Json(booking))
}

// PATCH /api/bookings/reservations/{id}
#[utoipa::path(
    patch,
    path = "/api/bookings/reservations/{id}",
    tag = "Booking",
    request_body = UpdateReservationPayload,
    params(("id" = Uuid, Path, description = "ID da reserva")),
    responses(
        (status = 200, description = "Participantes atualizados e preço recalculado", body = Booking),
        (status = 409, description = "Reserva não está confirmada ou capacidade insuficiente")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_reservation(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateReservationPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let booking = app_state
        .booking_service
        .update_participants(&app_state.db_pool, &user, id, payload.num_participants)
        .await?;
    Ok(Json(booking))
}

// PATCH /api/bookings/reservations/{id}/cancel
#[utoipa::path(
    patch,
    path = "/api/bookings/reservations/{id}/cancel",
    tag = "Booking",
    params(("id" = Uuid, Path, description = "ID da reserva")),
    responses(
        (status = 200, description = "Reserva cancelada e vagas devolvidas", body = Booking),
        (status = 409, description = "Reserva já cancelada ou concluída")
    ),
    security(("api_jwt" = []))
)]
pub async fn cancel_reservation(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let booking = app_state
        .booking_service
        .cancel_reservation(&app_state.db_pool, &user, id, false)
        .await?;
    Ok(Json(booking))
}

// POST /api/bookings/reservations/{id}/pay
#[utoipa::path(
    post,
    path = "/api/bookings/reservations/{id}/pay",
    tag = "Booking",
    params(("id" = Uuid, Path, description = "ID da reserva")),
    responses(
        (status = 200, description = "Checkout iniciado; pagamento pendente criado", body = crate::models::payment::Payment),
        (status = 409, description = "Reserva não está pendente")
    ),
    security(("api_jwt" = []))
)]
pub async fn pay_reservation(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let (_booking, payment) = app_state
        .booking_service
        .start_checkout(&app_state.db_pool, &user, id)
        .await?;
    Ok(Json(payment))
}
