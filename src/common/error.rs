// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::booking::BookingStatus;

// Nosso tipo de erro central, com `thiserror` para melhor ergonomia.
// Cada variante de regra de negócio mapeia 1:1 para um código HTTP.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // --- Regras de negócio da reserva ---
    #[error("Capacidade insuficiente: restam apenas {remaining} vagas")]
    CapacityExceeded { remaining: i32 },

    #[error("Este horário não está mais disponível")]
    SlotUnavailable,

    #[error("Transição de status inválida: {from:?} -> {to:?}")]
    InvalidStateTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    #[error("Você não tem permissão para acessar esta reserva")]
    Forbidden,

    #[error("Reserva não encontrada")]
    BookingNotFound,

    #[error("Horário não encontrado")]
    ScheduleNotFound,

    // Webhook com transactionId desconhecido: erro explícito, nunca ignorado.
    #[error("Registro de pagamento não encontrado")]
    PaymentRecordNotFound,

    #[error("Serviço externo indisponível: {0}")]
    ExternalServiceUnavailable(String),

    #[error("Token inválido")]
    InvalidToken,

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }

            // O cliente precisa do saldo restante para ajustar o pedido.
            AppError::CapacityExceeded { remaining } => (
                StatusCode::CONFLICT,
                json!({
                    "error": format!("Capacidade insuficiente: restam apenas {remaining} vagas."),
                    "remaining": remaining,
                }),
            ),

            AppError::SlotUnavailable => (
                StatusCode::CONFLICT,
                json!({ "error": "Este horário não está mais disponível." }),
            ),

            AppError::InvalidStateTransition { from, to } => (
                StatusCode::CONFLICT,
                json!({
                    "error": "Transição de status inválida para esta reserva.",
                    "from": from,
                    "to": to,
                }),
            ),

            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                json!({ "error": "Você não tem permissão para executar esta ação." }),
            ),

            AppError::BookingNotFound => (
                StatusCode::NOT_FOUND,
                json!({ "error": "Reserva não encontrada." }),
            ),
            AppError::ScheduleNotFound => (
                StatusCode::NOT_FOUND,
                json!({ "error": "Horário não encontrado." }),
            ),
            AppError::PaymentRecordNotFound => (
                StatusCode::NOT_FOUND,
                json!({ "error": "Registro de pagamento não encontrado." }),
            ),

            AppError::ExternalServiceUnavailable(ref service) => {
                tracing::error!("Serviço externo indisponível: {}", service);
                (
                    StatusCode::BAD_GATEWAY,
                    json!({ "error": "Serviço externo temporariamente indisponível." }),
                )
            }

            AppError::InvalidToken | AppError::JwtError(_) => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "Token de autenticação inválido ou ausente." }),
            ),

            // Todos os outros erros (DatabaseError, InternalServerError) viram 500.
            // O `tracing` loga a mensagem detalhada que o `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Ocorreu um erro inesperado." }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
