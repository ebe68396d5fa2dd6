// src/db/catalog_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::catalog::Promotion};

/// Colaborador de catálogo: leitura de promoções e dados do anúncio.
/// O motor nunca escreve nestas tabelas (fora de `booked_slots`, que é
/// responsabilidade do `ScheduleRepository`).
#[derive(Clone)]
pub struct CatalogRepository {
    #[allow(dead_code)]
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Promoções candidatas de um anúncio, em ordem de criação.
    /// O filtro de vigência/atividade fica no resolvedor de preço, que é puro
    /// e recebe o `now` de fora.
    pub async fn get_promotions_for_listing<'e, E>(
        &self,
        executor: E,
        listing_id: Uuid,
    ) -> Result<Vec<Promotion>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let promotions = sqlx::query_as::<_, Promotion>(
            r#"
            SELECT p.id, p.type, p.value, p.is_active, p.start_date, p.end_date, p.created_at
            FROM promotions p
            JOIN listing_promotions lp ON lp.promotion_id = p.id
            WHERE lp.listing_id = $1
            ORDER BY p.created_at ASC
            "#,
        )
        .bind(listing_id)
        .fetch_all(executor)
        .await?;
        Ok(promotions)
    }

    /// Dono (parceiro) de um anúncio, para as checagens de autorização dos
    /// fluxos de aprovação/cancelamento pelo parceiro.
    pub async fn get_listing_partner<'e, E>(
        &self,
        executor: E,
        listing_id: Uuid,
    ) -> Result<Option<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row: Option<(Uuid,)> =
            sqlx::query_as("SELECT partner_id FROM listings WHERE id = $1")
                .bind(listing_id)
                .fetch_optional(executor)
                .await?;
        Ok(row.map(|r| r.0))
    }
}
