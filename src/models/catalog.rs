// src/models/catalog.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "promotion_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PromotionType {
    PercentageDiscount,
    FixedAmountDiscount,
}

// --- Structs ---

/// Janela de horário reservável de um anúncio ("pricing schedule").
/// `booked_slots` só é mutado pelas operações do ledger de disponibilidade,
/// sempre dentro da mesma transação que grava a reserva.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSlot {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440010")]
    pub id: Uuid,

    pub listing_id: Uuid,

    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,

    /// Preço base por participante.
    #[schema(example = "100.00")]
    pub price: Decimal,

    #[schema(example = "MAD")]
    pub currency: String,

    #[schema(example = 10)]
    pub capacity: i32,

    #[schema(example = 3)]
    pub booked_slots: i32,

    #[schema(example = true)]
    pub is_available: bool,
}

impl ScheduleSlot {
    pub fn remaining(&self) -> i32 {
        self.capacity - self.booked_slots
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Promotion {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440020")]
    pub id: Uuid,

    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub promotion_type: PromotionType,

    /// Percentual (0-100) ou valor fixo por participante, conforme o tipo.
    #[schema(example = "10.00")]
    pub value: Decimal,

    #[schema(example = true)]
    pub is_active: bool,

    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,

    pub created_at: DateTime<Utc>,
}

/// Resposta do endpoint de disponibilidade: o slot mais a conta
/// `capacity - booked_slots` que o front exibe.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SlotAvailability {
    pub id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[schema(example = "100.00")]
    pub price: Decimal,
    #[schema(example = 10)]
    pub capacity: i32,
    #[schema(example = 3)]
    pub booked_slots: i32,
    #[schema(example = 7)]
    pub available_slots: i32,
}
