// src/db/payment_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::payment::{Payment, PaymentStatus},
};

#[derive(Clone)]
pub struct PaymentRepository {
    #[allow(dead_code)]
    pool: PgPool,
}

impl PaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_payment<'e, E>(
        &self,
        executor: E,
        booking_id: Uuid,
        user_id: Uuid,
        amount: Decimal,
        currency: &str,
        payment_gateway: &str,
        gateway_transaction_id: &str,
    ) -> Result<Payment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments
                (booking_id, user_id, amount, currency, status, payment_gateway, gateway_transaction_id)
            VALUES ($1, $2, $3, $4, 'PENDING', $5, $6)
            RETURNING *
            "#,
        )
        .bind(booking_id)
        .bind(user_id)
        .bind(amount)
        .bind(currency)
        .bind(payment_gateway)
        .bind(gateway_transaction_id)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            // O UNIQUE em booking_id garante o 1:1 com a reserva; se a máquina
            // de estados já barrou a dupla entrada, chegar aqui é transição
            // repetida em corrida.
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::InvalidStateTransition {
                        from: crate::models::booking::BookingStatus::AwaitingPayment,
                        to: crate::models::booking::BookingStatus::AwaitingPayment,
                    };
                }
            }
            e.into()
        })
    }

    pub async fn find_by_gateway_transaction_id<'e, E>(
        &self,
        executor: E,
        gateway_transaction_id: &str,
    ) -> Result<Option<Payment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE gateway_transaction_id = $1",
        )
        .bind(gateway_transaction_id)
        .fetch_optional(executor)
        .await?;
        Ok(payment)
    }

    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: PaymentStatus,
    ) -> Result<Payment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment = sqlx::query_as::<_, Payment>(
            "UPDATE payments SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_one(executor)
        .await?;
        Ok(payment)
    }
}
