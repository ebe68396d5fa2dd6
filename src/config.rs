// src/config.rs

use std::{env, sync::Arc, time::Duration};

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{BookingRepository, CatalogRepository, PaymentRepository, ScheduleRepository},
    services::{
        booking_service::BookingService,
        ledger::AvailabilityLedger,
        notifier::{ConnectionRegistry, Notifier},
        payment_service::{PaymentGateway, PaymentService, SystemGateway},
    },
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_secret: String,
    pub booking_service: BookingService,
    pub payment_service: PaymentService,
    pub notifier: Notifier,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET")?;

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let booking_repo = BookingRepository::new(db_pool.clone());
        let schedule_repo = ScheduleRepository::new(db_pool.clone());
        let catalog_repo = CatalogRepository::new(db_pool.clone());
        let payment_repo = PaymentRepository::new(db_pool.clone());

        let ledger = AvailabilityLedger::new(schedule_repo.clone());
        let notifier = Notifier::new(ConnectionRegistry::new());
        let gateway: Arc<dyn PaymentGateway> = Arc::new(SystemGateway);

        let booking_service = BookingService::new(
            booking_repo.clone(),
            schedule_repo,
            catalog_repo,
            payment_repo.clone(),
            ledger,
            gateway.clone(),
            notifier.clone(),
        );
        let payment_service =
            PaymentService::new(payment_repo, booking_repo, gateway, notifier.clone());

        Ok(Self {
            db_pool,
            jwt_secret,
            booking_service,
            payment_service,
            notifier,
        })
    }
}
