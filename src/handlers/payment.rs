// src/handlers/payment.rs

use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::payment::GatewayPaymentStatus,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentPayload {
    #[validate(length(min = 1, message = "O transactionId é obrigatório."))]
    #[schema(example = "sys_7f9c2ba4-e1a9-4c3b-9f6e-000000000000")]
    pub gateway_transaction_id: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    #[validate(length(min = 1, message = "O transactionId é obrigatório."))]
    pub gateway_transaction_id: String,

    #[schema(example = "succeeded")]
    pub status: GatewayPaymentStatus,
}

// POST /api/payments/confirm
//
// Confirmação síncrona enviada pelo próprio usuário. O status real é
// consultado no gateway; o corpo só carrega a chave de reconciliação.
#[utoipa::path(
    post,
    path = "/api/payments/confirm",
    tag = "Payments",
    request_body = ConfirmPaymentPayload,
    responses(
        (status = 200, description = "Pagamento reconciliado"),
        (status = 404, description = "Registro de pagamento desconhecido")
    ),
    security(("api_jwt" = []))
)]
pub async fn confirm_payment(
    State(app_state): State<AppState>,
    Json(payload): Json<ConfirmPaymentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    app_state
        .payment_service
        .confirm_payment_via_gateway(&app_state.db_pool, &payload.gateway_transaction_id)
        .await?;

    Ok(Json(json!({ "success": true })))
}

// POST /api/payments/webhook
//
// Webhook do gateway (entrega at-least-once, possivelmente fora de ordem).
// A assinatura do evento já foi verificada na borda. Erros sobem como
// resposta não-2xx para o gateway reentregar.
#[utoipa::path(
    post,
    path = "/api/payments/webhook",
    tag = "Payments",
    request_body = WebhookPayload,
    responses(
        (status = 200, description = "Evento processado (ou repetido, no-op)"),
        (status = 404, description = "Registro de pagamento desconhecido")
    )
)]
pub async fn handle_webhook(
    State(app_state): State<AppState>,
    Json(payload): Json<WebhookPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    app_state
        .payment_service
        .confirm_payment(
            &app_state.db_pool,
            &payload.gateway_transaction_id,
            payload.status,
        )
        .await?;

    Ok(Json(json!({ "success": true })))
}
