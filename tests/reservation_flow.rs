// tests/reservation_flow.rs
//
// Testes de integração contra um Postgres real. Rodam apenas com
// DATABASE_URL definido: `cargo test -- --ignored`.

use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use casablanca_backend::{
    common::error::AppError,
    db::{BookingRepository, CatalogRepository, PaymentRepository, ScheduleRepository},
    models::{
        auth::{AuthUser, Role},
        booking::BookingStatus,
        payment::GatewayPaymentStatus,
    },
    services::{
        booking_service::BookingService,
        ledger::AvailabilityLedger,
        notifier::{ConnectionRegistry, Notifier},
        payment_service::{PaymentService, SystemGateway},
    },
};

struct TestApp {
    pool: PgPool,
    booking_service: BookingService,
    payment_service: PaymentService,
}

async fn setup() -> TestApp {
    dotenvy::dotenv().ok();
    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL é obrigatório para estes testes");
    let pool = PgPool::connect(&database_url).await.unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();

    let booking_repo = BookingRepository::new(pool.clone());
    let schedule_repo = ScheduleRepository::new(pool.clone());
    let catalog_repo = CatalogRepository::new(pool.clone());
    let payment_repo = PaymentRepository::new(pool.clone());
    let ledger = AvailabilityLedger::new(schedule_repo.clone());
    let notifier = Notifier::new(ConnectionRegistry::new());
    let gateway = Arc::new(SystemGateway);

    let booking_service = BookingService::new(
        booking_repo.clone(),
        schedule_repo,
        catalog_repo,
        payment_repo.clone(),
        ledger,
        gateway.clone(),
        notifier.clone(),
    );
    let payment_service = PaymentService::new(payment_repo, booking_repo, gateway, notifier);

    TestApp {
        pool,
        booking_service,
        payment_service,
    }
}

/// Semeia um anúncio com um slot e devolve (listing_id, schedule_id).
async fn seed_slot(pool: &PgPool, price: Decimal, capacity: i32) -> (Uuid, Uuid) {
    let partner_id = Uuid::new_v4();
    let listing_id: (Uuid,) = sqlx::query_as(
        "INSERT INTO listings (partner_id, title) VALUES ($1, 'Passeio de teste') RETURNING id",
    )
    .bind(partner_id)
    .fetch_one(pool)
    .await
    .unwrap();

    let start = Utc::now() + Duration::days(7);
    let schedule_id: (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO pricing_schedules (listing_id, start_time, end_time, price, capacity)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(listing_id.0)
    .bind(start)
    .bind(start + Duration::hours(2))
    .bind(price)
    .bind(capacity)
    .fetch_one(pool)
    .await
    .unwrap();

    (listing_id.0, schedule_id.0)
}

async fn booked_slots(pool: &PgPool, schedule_id: Uuid) -> i32 {
    let row: (i32,) =
        sqlx::query_as("SELECT booked_slots FROM pricing_schedules WHERE id = $1")
            .bind(schedule_id)
            .fetch_one(pool)
            .await
            .unwrap();
    row.0
}

fn user() -> AuthUser {
    AuthUser {
        id: Uuid::new_v4(),
        role: Role::User,
    }
}

#[tokio::test]
#[ignore = "requer DATABASE_URL apontando para um Postgres de teste"]
async fn corrida_de_reservas_respeita_a_capacidade() {
    let app = setup().await;
    let capacity = 5;
    let attempts = 12;
    let (_listing, schedule_id) = seed_slot(&app.pool, Decimal::from(100), capacity).await;

    let mut handles = Vec::new();
    for _ in 0..attempts {
        let service = app.booking_service.clone();
        let pool = app.pool.clone();
        handles.push(tokio::spawn(async move {
            service
                .create_reservation(&pool, Uuid::new_v4(), schedule_id, 1)
                .await
        }));
    }

    let mut successes = 0;
    let mut capacity_errors = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(AppError::CapacityExceeded { .. }) => capacity_errors += 1,
            Err(other) => panic!("erro inesperado: {other:?}"),
        }
    }

    // Exatamente C sucessos, N - C rejeições, e o contador bate com C.
    assert_eq!(successes, capacity);
    assert_eq!(capacity_errors, attempts - capacity);
    assert_eq!(booked_slots(&app.pool, schedule_id).await, capacity);
}

#[tokio::test]
#[ignore = "requer DATABASE_URL apontando para um Postgres de teste"]
async fn cancelamento_devolve_exatamente_as_vagas_reservadas() {
    let app = setup().await;
    let (_listing, schedule_id) = seed_slot(&app.pool, Decimal::from(100), 10).await;
    let caller = user();

    let booking = app
        .booking_service
        .create_reservation(&app.pool, caller.id, schedule_id, 3)
        .await
        .unwrap();
    assert_eq!(booked_slots(&app.pool, schedule_id).await, 3);

    let cancelled = app
        .booking_service
        .cancel_reservation(&app.pool, &caller, booking.id, false)
        .await
        .unwrap();
    assert_eq!(cancelled.status, BookingStatus::Cancelled);
    assert_eq!(booked_slots(&app.pool, schedule_id).await, 0);
}

#[tokio::test]
#[ignore = "requer DATABASE_URL apontando para um Postgres de teste"]
async fn reconciliacao_de_webhook_e_idempotente() {
    let app = setup().await;
    let (_listing, schedule_id) = seed_slot(&app.pool, Decimal::from(100), 10).await;
    let caller = user();

    let booking = app
        .booking_service
        .create_reservation(&app.pool, caller.id, schedule_id, 2)
        .await
        .unwrap();
    assert_eq!(booking.status, BookingStatus::Pending);

    let (_booking, payment) = app
        .booking_service
        .start_checkout(&app.pool, &caller, booking.id)
        .await
        .unwrap();

    // Primeira entrega confirma; a segunda é no-op com sucesso.
    for _ in 0..2 {
        app.payment_service
            .confirm_payment(
                &app.pool,
                &payment.gateway_transaction_id,
                GatewayPaymentStatus::Succeeded,
            )
            .await
            .unwrap();
    }

    let reloaded = app
        .booking_service
        .get_reservation(&app.pool, &caller, booking.id)
        .await
        .unwrap();
    assert_eq!(reloaded.status, BookingStatus::Confirmed);
    // Nenhum ajuste duplo de vagas.
    assert_eq!(booked_slots(&app.pool, schedule_id).await, 2);
}

#[tokio::test]
#[ignore = "requer DATABASE_URL apontando para um Postgres de teste"]
async fn webhook_com_transaction_id_desconhecido_e_erro_explicito() {
    let app = setup().await;
    let result = app
        .payment_service
        .confirm_payment(&app.pool, "sys_inexistente", GatewayPaymentStatus::Succeeded)
        .await;
    assert!(matches!(result, Err(AppError::PaymentRecordNotFound)));
}

#[tokio::test]
#[ignore = "requer DATABASE_URL apontando para um Postgres de teste"]
async fn reserva_gratuita_confirma_direto_sem_pagamento() {
    let app = setup().await;
    let (_listing, schedule_id) = seed_slot(&app.pool, Decimal::ZERO, 10).await;
    let caller = user();

    let booking = app
        .booking_service
        .create_reservation(&app.pool, caller.id, schedule_id, 2)
        .await
        .unwrap();

    assert_eq!(booking.status, BookingStatus::Confirmed);
    assert_eq!(booking.total_price, Decimal::ZERO);

    let payment: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM payments WHERE booking_id = $1")
            .bind(booking.id)
            .fetch_optional(&app.pool)
            .await
            .unwrap();
    assert!(payment.is_none());
}

#[tokio::test]
#[ignore = "requer DATABASE_URL apontando para um Postgres de teste"]
async fn cancelar_duas_vezes_e_rejeitado_sem_efeitos() {
    let app = setup().await;
    let (_listing, schedule_id) = seed_slot(&app.pool, Decimal::from(100), 10).await;
    let caller = user();

    let booking = app
        .booking_service
        .create_reservation(&app.pool, caller.id, schedule_id, 4)
        .await
        .unwrap();
    app.booking_service
        .cancel_reservation(&app.pool, &caller, booking.id, false)
        .await
        .unwrap();

    let result = app
        .booking_service
        .cancel_reservation(&app.pool, &caller, booking.id, false)
        .await;
    assert!(matches!(
        result,
        Err(AppError::InvalidStateTransition { .. })
    ));
    // O segundo cancelamento não devolveu vagas de novo.
    assert_eq!(booked_slots(&app.pool, schedule_id).await, 0);
}

#[tokio::test]
#[ignore = "requer DATABASE_URL apontando para um Postgres de teste"]
async fn atualizar_participantes_recheca_capacidade_e_reprecifica() {
    let app = setup().await;
    let (_listing, schedule_id) = seed_slot(&app.pool, Decimal::from(50), 5).await;
    let caller = user();

    let booking = app
        .booking_service
        .create_reservation(&app.pool, caller.id, schedule_id, 2)
        .await
        .unwrap();
    let (_b, payment) = app
        .booking_service
        .start_checkout(&app.pool, &caller, booking.id)
        .await
        .unwrap();
    app.payment_service
        .confirm_payment(
            &app.pool,
            &payment.gateway_transaction_id,
            GatewayPaymentStatus::Succeeded,
        )
        .await
        .unwrap();

    let updated = app
        .booking_service
        .update_participants(&app.pool, &caller, booking.id, 4)
        .await
        .unwrap();
    assert_eq!(updated.num_participants, 4);
    assert_eq!(updated.total_price, Decimal::from(200));
    assert_eq!(booked_slots(&app.pool, schedule_id).await, 4);

    // Acima da capacidade: erro com o saldo restante, estado intacto.
    let result = app
        .booking_service
        .update_participants(&app.pool, &caller, booking.id, 6)
        .await;
    assert!(matches!(result, Err(AppError::CapacityExceeded { remaining: 1 })));
    assert_eq!(booked_slots(&app.pool, schedule_id).await, 4);
}

#[tokio::test]
#[ignore = "requer DATABASE_URL apontando para um Postgres de teste"]
async fn reserva_concluida_nao_pode_ser_cancelada() {
    let app = setup().await;
    let (_listing, schedule_id) = seed_slot(&app.pool, Decimal::from(100), 10).await;
    let caller = user();

    let booking = app
        .booking_service
        .create_reservation(&app.pool, caller.id, schedule_id, 2)
        .await
        .unwrap();
    let (_b, payment) = app
        .booking_service
        .start_checkout(&app.pool, &caller, booking.id)
        .await
        .unwrap();
    app.payment_service
        .confirm_payment(
            &app.pool,
            &payment.gateway_transaction_id,
            GatewayPaymentStatus::Succeeded,
        )
        .await
        .unwrap();

    let completed = app
        .booking_service
        .complete_booking(&app.pool, booking.id)
        .await
        .unwrap();
    assert_eq!(completed.status, BookingStatus::Completed);

    // Concluída é terminal: cancelar é rejeitado e as vagas ficam como estão.
    let result = app
        .booking_service
        .cancel_reservation(&app.pool, &caller, booking.id, false)
        .await;
    assert!(matches!(
        result,
        Err(AppError::InvalidStateTransition {
            from: BookingStatus::Completed,
            to: BookingStatus::Cancelled,
        })
    ));
    assert_eq!(booked_slots(&app.pool, schedule_id).await, 2);
}

#[tokio::test]
#[ignore = "requer DATABASE_URL apontando para um Postgres de teste"]
async fn paginacao_com_pagina_gigantesca_devolve_lista_vazia() {
    let app = setup().await;
    let (_listing, schedule_id) = seed_slot(&app.pool, Decimal::from(100), 10).await;
    let caller = user();

    app.booking_service
        .create_reservation(&app.pool, caller.id, schedule_id, 1)
        .await
        .unwrap();

    // OFFSET satura em vez de estourar para negativo.
    let (bookings, total) = app
        .booking_service
        .list_reservations(&app.pool, caller.id, None, i64::MAX, 10)
        .await
        .unwrap();
    assert!(bookings.is_empty());
    assert_eq!(total, 1);
}
