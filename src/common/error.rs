use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::models::requisition::RequisitionStatus;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Quantidade inválida: {0}")]
    InvalidQuantity(String),

    #[error("Transição de status inválida: {action} a partir de {from:?}")]
    InvalidTransition {
        from: RequisitionStatus,
        action: &'static str,
    },

    #[error("Estoque insuficiente para o item {item_id}")]
    InsufficientStock { item_id: Uuid },

    #[error("Login já existe")]
    LoginAlreadyExists,

    #[error("Código de item já existe")]
    CodeAlreadyExists(String),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acesso negado")]
    Forbidden,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Item não encontrado")]
    ItemNotFound,

    #[error("Requisição não encontrada")]
    RequisitionNotFound,

    #[error("Ciclo de inventário não encontrado")]
    CycleNotFound,

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado.
    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação.
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
            AppError::InvalidQuantity(msg) => {
                let body = Json(json!({ "error": msg }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::InvalidTransition { from, action } => {
                let body = Json(json!({
                    "error": format!(
                        "A ação '{}' não é permitida para o status atual ({:?}).",
                        action, from
                    ),
                }));
                return (StatusCode::UNPROCESSABLE_ENTITY, body).into_response();
            }
            AppError::InsufficientStock { item_id } => {
                let body = Json(json!({
                    "error": format!("Estoque insuficiente para o item {}.", item_id),
                }));
                return (StatusCode::CONFLICT, body).into_response();
            }
            AppError::CodeAlreadyExists(code) => {
                let body = Json(json!({
                    "error": format!("Já existe um item com o código '{}'.", code),
                }));
                return (StatusCode::CONFLICT, body).into_response();
            }
            AppError::LoginAlreadyExists => (StatusCode::CONFLICT, "Este login já está em uso."),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Login ou senha inválidos."),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Token de autenticação inválido ou ausente.",
            ),
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                "Você não tem permissão para realizar esta ação.",
            ),
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "Usuário não encontrado."),
            AppError::ItemNotFound => (StatusCode::NOT_FOUND, "Item não encontrado."),
            AppError::RequisitionNotFound => (StatusCode::NOT_FOUND, "Requisição não encontrada."),
            AppError::CycleNotFound => {
                (StatusCode::NOT_FOUND, "Ciclo de inventário não encontrado.")
            }

            // Todos os outros erros (DatabaseError, InternalServerError) viram 500.
            // O `tracing` vai logar a mensagem detalhada que `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.",
                )
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
