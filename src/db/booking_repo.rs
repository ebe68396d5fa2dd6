// src/db/booking_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::booking::{Booking, BookingStatus},
};

#[derive(Clone)]
pub struct BookingRepository {
    #[allow(dead_code)]
    pool: PgPool,
}

impl BookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_booking<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        listing_id: Uuid,
        schedule_id: Uuid,
        num_participants: i32,
        total_price: Decimal,
        currency: &str,
        status: BookingStatus,
    ) -> Result<Booking, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let booking = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings
                (user_id, listing_id, schedule_id, num_participants, total_price, currency, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(listing_id)
        .bind(schedule_id)
        .bind(num_participants)
        .bind(total_price)
        .bind(currency)
        .bind(status)
        .fetch_one(executor)
        .await?;
        Ok(booking)
    }

    pub async fn get_booking<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Booking>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(booking)
    }

    /// Lê a reserva com lock de escrita. Toda transição de status parte desta
    /// leitura, para que duas transições concorrentes não se atropelem.
    pub async fn get_booking_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Booking>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let booking =
            sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(executor)
                .await?;
        Ok(booking)
    }

    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: BookingStatus,
    ) -> Result<Booking, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let booking = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_one(executor)
        .await?;
        Ok(booking)
    }

    /// Atualização de participantes com reprecificação (só enquanto CONFIRMED;
    /// a regra fica no orquestrador, aqui é só o UPDATE).
    pub async fn update_participants<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        num_participants: i32,
        total_price: Decimal,
    ) -> Result<Booking, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let booking = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET num_participants = $2, total_price = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(num_participants)
        .bind(total_price)
        .fetch_one(executor)
        .await?;
        Ok(booking)
    }

    // ---
    // Listagem (paginada, mais recente primeiro)
    // ---

    pub async fn list_by_user<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        status: Option<BookingStatus>,
        page: i64,
        limit: i64,
    ) -> Result<Vec<Booking>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Saturado: página arbitrariamente grande vira OFFSET enorme (lista
        // vazia), nunca um OFFSET negativo por overflow.
        let offset = page.saturating_sub(1).saturating_mul(limit);
        let bookings = sqlx::query_as::<_, Booking>(
            r#"
            SELECT * FROM bookings
            WHERE user_id = $1 AND ($2::booking_status IS NULL OR status = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(user_id)
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(executor)
        .await?;
        Ok(bookings)
    }

    pub async fn count_by_user<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        status: Option<BookingStatus>,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM bookings
            WHERE user_id = $1 AND ($2::booking_status IS NULL OR status = $2)
            "#,
        )
        .bind(user_id)
        .bind(status)
        .fetch_one(executor)
        .await?;
        Ok(total.0)
    }
}
