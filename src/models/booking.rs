// src/models/booking.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Enums ---

/// Ciclo de vida da reserva. No sistema antigo o status era uma string solta
/// ("pending", "PENDING", "awaiting_payment"...); aqui é um enum fechado e as
/// transições válidas ficam em `can_transition_to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "booking_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    AwaitingPayment,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    /// Tabela de transições da máquina de estados.
    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, AwaitingPayment)
                | (Pending, Confirmed)
                | (AwaitingPayment, Confirmed)
                | (Pending, Cancelled)
                | (AwaitingPayment, Cancelled)
                | (Confirmed, Cancelled)
                | (Confirmed, Completed)
        )
    }

    /// Estados terminais não aceitam nenhuma transição de saída.
    pub fn is_terminal(self) -> bool {
        matches!(self, BookingStatus::Cancelled | BookingStatus::Completed)
    }
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,

    pub user_id: Uuid,
    pub listing_id: Uuid,
    pub schedule_id: Uuid,

    #[schema(example = 2)]
    pub num_participants: i32,

    #[schema(example = "180.00")]
    pub total_price: Decimal,

    #[schema(example = "MAD")]
    pub currency: String,

    pub status: BookingStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::BookingStatus::*;

    #[test]
    fn pending_pode_aguardar_pagamento_ou_confirmar_direto() {
        assert!(Pending.can_transition_to(AwaitingPayment));
        // Reserva de preço zero confirma na criação, sem pagamento.
        assert!(Pending.can_transition_to(Confirmed));
    }

    #[test]
    fn cancelamento_permitido_antes_de_estados_terminais() {
        assert!(Pending.can_transition_to(Cancelled));
        assert!(AwaitingPayment.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Cancelled));
    }

    #[test]
    fn estados_terminais_nao_transicionam() {
        for state in [Cancelled, Completed] {
            assert!(state.is_terminal());
            for next in [Pending, AwaitingPayment, Confirmed, Cancelled, Completed] {
                assert!(!state.can_transition_to(next));
            }
        }
    }

    #[test]
    fn confirmado_so_completa_ou_cancela() {
        assert!(Confirmed.can_transition_to(Completed));
        assert!(!Confirmed.can_transition_to(Pending));
        assert!(!Confirmed.can_transition_to(AwaitingPayment));
        assert!(!AwaitingPayment.can_transition_to(Completed));
    }
}
