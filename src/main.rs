// src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use casablanca_backend::config::AppState;
use casablanca_backend::middleware::auth::auth_guard;
use casablanca_backend::{docs, handlers};

#[tokio::main]
async fn main() {
    // Inicializa o logger
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas de reserva do usuário (protegidas)
    let reservation_routes = Router::new()
        .route(
            "/reservations",
            post(handlers::booking::create_reservation)
                .get(handlers::booking::list_reservations),
        )
        .route("/reservations/{id}", get(handlers::booking::get_reservation)
            .patch(handlers::booking::update_reservation))
        .route(
            "/reservations/{id}/cancel",
            patch(handlers::booking::cancel_reservation),
        )
        .route(
            "/reservations/{id}/pay",
            post(handlers::booking::pay_reservation),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Confirmação síncrona exige usuário autenticado; o webhook não
    // (a assinatura do gateway é verificada na borda).
    let payment_routes = Router::new()
        .route("/confirm", post(handlers::payment::confirm_payment))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ))
        .route("/webhook", post(handlers::payment::handle_webhook));

    // Ações do parceiro (o extrator PartnerUser checa o papel)
    let partner_routes = Router::new()
        .route(
            "/reservations/{id}/approve",
            post(handlers::partner::approve_reservation),
        )
        .route(
            "/reservations/{id}/cancel",
            patch(handlers::partner::cancel_reservation),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route(
            "/api/bookings/availability",
            get(handlers::booking::get_availability),
        )
        .nest("/api/bookings", reservation_routes)
        .nest("/api/payments", payment_routes)
        .nest("/api/partner", partner_routes)
        .merge(
            SwaggerUi::new("/docs")
                .url("/api-docs/openapi.json", docs::ApiDoc::openapi()),
        )
        .with_state(app_state);

    // Inicia o servidor
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
