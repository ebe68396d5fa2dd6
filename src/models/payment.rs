// src/models/payment.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Succeeded,
    Failed,
}

/// Status terminal reportado pelo gateway (webhook ou consulta síncrona).
/// O contrato do webhook usa minúsculas ("succeeded" / "failed").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum GatewayPaymentStatus {
    Pending,
    Succeeded,
    Failed,
}

// --- Structs ---

/// Registro 1:1 com a reserva que ele financia. Criado pelo orquestrador ao
/// entrar em AWAITING_PAYMENT; mutado apenas pelo serviço de reconciliação.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440030")]
    pub id: Uuid,

    pub booking_id: Uuid,
    pub user_id: Uuid,

    #[schema(example = "180.00")]
    pub amount: Decimal,

    #[schema(example = "MAD")]
    pub currency: String,

    pub status: PaymentStatus,

    #[schema(example = "system")]
    pub payment_gateway: String,

    /// Chave única usada na reconciliação idempotente dos webhooks.
    #[schema(example = "sys_7f9c2ba4-e1a9-4c3b-9f6e-000000000000")]
    pub gateway_transaction_id: String,

    #[schema(ignore)]
    pub payment_method_details: Option<serde_json::Value>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Intenção de pagamento criada no gateway externo antes da transação local.
#[derive(Debug, Clone)]
pub struct GatewayIntent {
    pub transaction_id: String,
    pub gateway: String,
}
