// src/models/notification.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    BookingConfirmed,
    BookingCancelled,
    BookingApprovedForPayment,
}

/// Evento estruturado entregue ao colaborador de notificações após o commit.
/// Entrega é best-effort: falha aqui nunca desfaz uma transição já gravada.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEvent {
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub booking_id: Uuid,
    pub title: String,
    pub message: String,
    pub recipient_user_id: Uuid,
}
