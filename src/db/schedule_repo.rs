// src/db/schedule_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::catalog::{ScheduleSlot, SlotAvailability},
};

#[derive(Clone)]
pub struct ScheduleRepository {
    #[allow(dead_code)]
    pool: PgPool,
}

impl ScheduleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Leitura
    // ---

    /// Disponibilidade do dia para um anúncio, com o cálculo
    /// `capacity - booked_slots` já feito no banco.
    pub async fn list_availability<'e, E>(
        &self,
        executor: E,
        listing_id: Uuid,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
    ) -> Result<Vec<SlotAvailability>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let slots = sqlx::query_as::<_, SlotAvailability>(
            r#"
            SELECT id, start_time, end_time, price, capacity, booked_slots,
                   (capacity - booked_slots) AS available_slots
            FROM pricing_schedules
            WHERE listing_id = $1
              AND is_available = TRUE
              AND start_time >= $2
              AND start_time < $3
            ORDER BY start_time ASC
            "#,
        )
        .bind(listing_id)
        .bind(day_start)
        .bind(day_end)
        .fetch_all(executor)
        .await?;
        Ok(slots)
    }

    // ---
    // Escrita (sempre dentro da transação do orquestrador)
    // ---

    /// Lê o slot com lock de escrita (`FOR UPDATE`). É esse lock que serializa
    /// as reservas concorrentes no mesmo horário; nenhum mutex de aplicação
    /// é necessário além dele.
    pub async fn get_slot_for_update<'e, E>(
        &self,
        executor: E,
        schedule_id: Uuid,
    ) -> Result<Option<ScheduleSlot>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let slot = sqlx::query_as::<_, ScheduleSlot>(
            r#"
            SELECT id, listing_id, start_time, end_time, price, currency,
                   capacity, booked_slots, is_available
            FROM pricing_schedules
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(schedule_id)
        .fetch_optional(executor)
        .await?;
        Ok(slot)
    }

    /// Incrementa o contador de vagas ocupadas. O CHECK da tabela
    /// (booked_slots <= capacity) é a última linha de defesa do invariante.
    pub async fn add_booked_slots<'e, E>(
        &self,
        executor: E,
        schedule_id: Uuid,
        n: i32,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "UPDATE pricing_schedules SET booked_slots = booked_slots + $2 WHERE id = $1",
        )
        .bind(schedule_id)
        .bind(n)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Devolve vagas ao slot, com piso em zero (GREATEST no banco).
    pub async fn release_booked_slots<'e, E>(
        &self,
        executor: E,
        schedule_id: Uuid,
        n: i32,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "UPDATE pricing_schedules SET booked_slots = GREATEST(booked_slots - $2, 0) WHERE id = $1",
        )
        .bind(schedule_id)
        .bind(n)
        .execute(executor)
        .await?;
        Ok(())
    }
}
