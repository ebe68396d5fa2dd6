// src/services/payment_service.rs

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{Acquire, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{BookingRepository, PaymentRepository},
    models::{
        booking::BookingStatus,
        notification::{NotificationEvent, NotificationType},
        payment::{GatewayIntent, GatewayPaymentStatus, PaymentStatus},
    },
    services::notifier::Notifier,
};

// ---
// Gateway externo
// ---

/// Contrato estreito com o gateway de pagamento: criar intenção e consultar
/// status. A verificação de assinatura do webhook é responsabilidade da borda,
/// antes de chegar aqui.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_intent(
        &self,
        amount: Decimal,
        currency: &str,
    ) -> Result<GatewayIntent, AppError>;

    async fn retrieve_status(
        &self,
        gateway_transaction_id: &str,
    ) -> Result<GatewayPaymentStatus, AppError>;
}

/// Gateway interno ("system"), herdado do fluxo de aprovação do parceiro no
/// sistema antigo: gera um transaction id próprio e considera tudo pago
/// quando consultado.
#[derive(Default)]
pub struct SystemGateway;

#[async_trait]
impl PaymentGateway for SystemGateway {
    async fn create_intent(
        &self,
        _amount: Decimal,
        _currency: &str,
    ) -> Result<GatewayIntent, AppError> {
        Ok(GatewayIntent {
            transaction_id: format!("sys_{}", Uuid::new_v4()),
            gateway: "system".to_string(),
        })
    }

    async fn retrieve_status(
        &self,
        _gateway_transaction_id: &str,
    ) -> Result<GatewayPaymentStatus, AppError> {
        Ok(GatewayPaymentStatus::Succeeded)
    }
}

// ---
// Serviço de reconciliação
// ---

#[derive(Clone)]
pub struct PaymentService {
    payment_repo: PaymentRepository,
    booking_repo: BookingRepository,
    gateway: Arc<dyn PaymentGateway>,
    notifier: Notifier,
}

impl PaymentService {
    pub fn new(
        payment_repo: PaymentRepository,
        booking_repo: BookingRepository,
        gateway: Arc<dyn PaymentGateway>,
        notifier: Notifier,
    ) -> Self {
        Self {
            payment_repo,
            booking_repo,
            gateway,
            notifier,
        }
    }

    /// Confirmação síncrona: consulta o status no gateway e reconcilia.
    pub async fn confirm_payment_via_gateway<'e, E>(
        &self,
        executor: E,
        gateway_transaction_id: &str,
    ) -> Result<(), AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let reported = self
            .gateway
            .retrieve_status(gateway_transaction_id)
            .await?;
        self.confirm_payment(executor, gateway_transaction_id, reported)
            .await
    }

    /// Reconcilia um status terminal reportado pelo gateway (webhook ou
    /// confirmação síncrona). Idempotente: webhooks duplicados de uma reserva
    /// já confirmada são no-op com sucesso.
    pub async fn confirm_payment<'e, E>(
        &self,
        executor: E,
        gateway_transaction_id: &str,
        reported: GatewayPaymentStatus,
    ) -> Result<(), AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        // transactionId desconhecido é erro explícito, nunca silencioso:
        // o gateway precisa saber que mandou algo que não reconhecemos.
        let payment = self
            .payment_repo
            .find_by_gateway_transaction_id(&mut *tx, gateway_transaction_id)
            .await?
            .ok_or(AppError::PaymentRecordNotFound)?;

        let booking = self
            .booking_repo
            .get_booking_for_update(&mut *tx, payment.booking_id)
            .await?
            .ok_or(AppError::BookingNotFound)?;

        // Entrega at-least-once: se a reserva já está confirmada, este é um
        // webhook repetido. Nenhuma escrita, nenhum ajuste duplo de vagas.
        if booking.status == BookingStatus::Confirmed {
            tracing::info!(
                gateway_transaction_id,
                booking_id = %booking.id,
                "Webhook repetido para reserva já confirmada; no-op"
            );
            return Ok(());
        }

        match reported {
            GatewayPaymentStatus::Succeeded => {
                if !booking.status.can_transition_to(BookingStatus::Confirmed) {
                    return Err(AppError::InvalidStateTransition {
                        from: booking.status,
                        to: BookingStatus::Confirmed,
                    });
                }

                self.payment_repo
                    .update_status(&mut *tx, payment.id, PaymentStatus::Succeeded)
                    .await?;
                self.booking_repo
                    .update_status(&mut *tx, booking.id, BookingStatus::Confirmed)
                    .await?;
                tx.commit().await?;

                // Evento pós-commit, best-effort.
                self.notifier
                    .dispatch(NotificationEvent {
                        kind: NotificationType::BookingConfirmed,
                        booking_id: booking.id,
                        title: "Reserva confirmada".to_string(),
                        message: "Pagamento recebido: sua reserva está confirmada.".to_string(),
                        recipient_user_id: booking.user_id,
                    })
                    .await;
                Ok(())
            }

            GatewayPaymentStatus::Failed => {
                // Falha não transiciona a reserva e não dispara retry daqui;
                // escalonamento é problema de quem chamou.
                tracing::warn!(
                    gateway_transaction_id,
                    booking_id = %booking.id,
                    "Gateway reportou falha de pagamento"
                );
                self.payment_repo
                    .update_status(&mut *tx, payment.id, PaymentStatus::Failed)
                    .await?;
                tx.commit().await?;
                Ok(())
            }

            GatewayPaymentStatus::Pending => {
                tracing::info!(
                    gateway_transaction_id,
                    "Gateway ainda reporta pagamento pendente; nada a fazer"
                );
                Ok(())
            }
        }
    }
}
