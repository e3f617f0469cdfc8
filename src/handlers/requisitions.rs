// src/handlers/requisitions.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{CanApprove, CanOperateWarehouse, RequireRole},
    },
    models::requisition::{Requisition, RequisitionPriority, RequisitionStatus},
    services::requisition_service::{
        DraftUpdateInput, FulfillLine, NewRequisitionInput, RequisitionLineInput, ReturnLine,
    },
};

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequisitionPayload {
    #[validate(length(min = 1, message = "O setor é obrigatório."))]
    pub sector: String,

    pub date: NaiveDate,

    pub priority: RequisitionPriority,

    // Sem informar, a requisição nasce como rascunho. O caminho de criação
    // rápida manda APROVADO direto.
    pub status: Option<RequisitionStatus>,

    pub observations: Option<String>,

    #[validate(length(min = 1, message = "A requisição precisa de ao menos um item."))]
    pub items: Vec<RequisitionLineInput>,
}

impl CreateRequisitionPayload {
    fn validate_consistency(&self) -> Result<(), ValidationError> {
        // Criação só em RASCUNHO ou direto em APROVADO; os demais status
        // são alcançados pelas transições.
        if let Some(status) = self.status {
            if !matches!(
                status,
                RequisitionStatus::Rascunho | RequisitionStatus::Aprovado
            ) {
                return Err(ValidationError::new("InvalidInitialStatus"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequisitionPayload {
    #[validate(length(min = 1, message = "O setor não pode ficar vazio."))]
    pub sector: Option<String>,
    pub date: Option<NaiveDate>,
    pub priority: Option<RequisitionPriority>,
    pub observations: Option<String>,
    #[validate(length(min = 1, message = "A requisição precisa de ao menos um item."))]
    pub items: Option<Vec<RequisitionLineInput>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RejectPayload {
    #[validate(length(min = 1, message = "O motivo da reprovação é obrigatório."))]
    pub reason: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FulfillPayload {
    #[validate(length(min = 1, message = "Informe ao menos uma linha de entrega."))]
    pub items: Vec<FulfillLine>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReturnPayload {
    #[validate(length(min = 1, message = "Informe ao menos uma linha de devolução."))]
    pub items: Vec<ReturnLine>,

    // A justificativa é contexto de negócio obrigatório.
    #[validate(length(min = 1, message = "A justificativa da devolução é obrigatória."))]
    pub notes: String,
}

// ---
// Handlers
// ---

#[utoipa::path(
    get,
    path = "/api/requisitions",
    tag = "Requisitions",
    responses((status = 200, description = "Todas as requisições", body = Vec<Requisition>)),
    security(("api_jwt" = []))
)]
pub async fn list_requisitions(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let reqs = app_state.requisition_service.get_all().await?;
    Ok((StatusCode::OK, Json(reqs)))
}

#[utoipa::path(
    get,
    path = "/api/requisitions/{id}",
    tag = "Requisitions",
    responses(
        (status = 200, description = "Requisição", body = Requisition),
        (status = 404, description = "Requisição não encontrada")
    ),
    params(("id" = Uuid, Path, description = "ID da requisição")),
    security(("api_jwt" = []))
)]
pub async fn get_requisition(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let req = app_state.requisition_service.get_by_id(id).await?;
    Ok((StatusCode::OK, Json(req)))
}

#[utoipa::path(
    post,
    path = "/api/requisitions",
    tag = "Requisitions",
    request_body = CreateRequisitionPayload,
    responses((status = 201, description = "Requisição criada", body = Requisition)),
    security(("api_jwt" = []))
)]
pub async fn create_requisition(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateRequisitionPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    payload.validate_consistency().map_err(|e| {
        let mut errors = validator::ValidationErrors::new();
        errors.add("status", e);
        AppError::ValidationError(errors)
    })?;

    let req = app_state
        .requisition_service
        .create(
            NewRequisitionInput {
                department: payload.sector,
                date: payload.date,
                priority: payload.priority,
                status: payload.status.unwrap_or(RequisitionStatus::Rascunho),
                observations: payload.observations,
                items: payload.items,
            },
            &user,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(req)))
}

#[utoipa::path(
    put,
    path = "/api/requisitions/{id}",
    tag = "Requisitions",
    request_body = UpdateRequisitionPayload,
    responses(
        (status = 200, description = "Rascunho atualizado", body = Requisition),
        (status = 422, description = "A requisição não é mais um rascunho")
    ),
    params(("id" = Uuid, Path, description = "ID da requisição")),
    security(("api_jwt" = []))
)]
pub async fn update_requisition(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRequisitionPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let req = app_state
        .requisition_service
        .update_draft(
            id,
            DraftUpdateInput {
                department: payload.sector,
                date: payload.date,
                priority: payload.priority,
                observations: payload.observations,
                items: payload.items,
            },
            &user,
        )
        .await?;
    Ok((StatusCode::OK, Json(req)))
}

#[utoipa::path(
    post,
    path = "/api/requisitions/{id}/submit",
    tag = "Requisitions",
    responses(
        (status = 200, description = "Requisição enviada para aprovação", body = Requisition),
        (status = 422, description = "Transição inválida")
    ),
    params(("id" = Uuid, Path, description = "ID da requisição")),
    security(("api_jwt" = []))
)]
pub async fn submit_requisition(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let req = app_state.requisition_service.submit(id, &user).await?;
    Ok((StatusCode::OK, Json(req)))
}

#[utoipa::path(
    post,
    path = "/api/requisitions/{id}/approve",
    tag = "Requisitions",
    responses(
        (status = 200, description = "Requisição aprovada", body = Requisition),
        (status = 422, description = "Transição inválida")
    ),
    params(("id" = Uuid, Path, description = "ID da requisição")),
    security(("api_jwt" = []))
)]
pub async fn approve_requisition(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequireRole<CanApprove>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let req = app_state.requisition_service.approve(id, &user).await?;
    Ok((StatusCode::OK, Json(req)))
}

#[utoipa::path(
    post,
    path = "/api/requisitions/{id}/reject",
    tag = "Requisitions",
    request_body = RejectPayload,
    responses(
        (status = 200, description = "Requisição reprovada", body = Requisition),
        (status = 422, description = "Transição inválida")
    ),
    params(("id" = Uuid, Path, description = "ID da requisição")),
    security(("api_jwt" = []))
)]
pub async fn reject_requisition(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequireRole<CanApprove>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RejectPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let req = app_state
        .requisition_service
        .reject(id, &payload.reason, &user)
        .await?;
    Ok((StatusCode::OK, Json(req)))
}

#[utoipa::path(
    post,
    path = "/api/requisitions/{id}/fulfill",
    tag = "Requisitions",
    request_body = FulfillPayload,
    responses(
        (status = 200, description = "Entrega registrada", body = Requisition),
        (status = 409, description = "Estoque insuficiente"),
        (status = 422, description = "Transição inválida")
    ),
    params(("id" = Uuid, Path, description = "ID da requisição")),
    security(("api_jwt" = []))
)]
pub async fn fulfill_requisition(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequireRole<CanOperateWarehouse>,
    Path(id): Path<Uuid>,
    Json(payload): Json<FulfillPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let req = app_state
        .requisition_service
        .fulfill(id, &payload.items, &user)
        .await?;
    Ok((StatusCode::OK, Json(req)))
}

#[utoipa::path(
    post,
    path = "/api/requisitions/{id}/return",
    tag = "Requisitions",
    request_body = ReturnPayload,
    responses(
        (status = 200, description = "Devolução registrada", body = Requisition),
        (status = 422, description = "Transição inválida")
    ),
    params(("id" = Uuid, Path, description = "ID da requisição")),
    security(("api_jwt" = []))
)]
pub async fn return_requisition_items(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequireRole<CanOperateWarehouse>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReturnPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let req = app_state
        .requisition_service
        .return_items(id, &payload.items, &payload.notes, &user)
        .await?;
    Ok((StatusCode::OK, Json(req)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn payload(status: Option<RequisitionStatus>) -> CreateRequisitionPayload {
        CreateRequisitionPayload {
            sector: "Manutenção".into(),
            date: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            priority: RequisitionPriority::Media,
            status,
            observations: None,
            items: vec![RequisitionLineInput {
                item_id: Uuid::new_v4(),
                requested_qty: Decimal::from(2),
            }],
        }
    }

    #[test]
    fn criacao_aceita_rascunho_e_aprovado() {
        assert!(payload(None).validate_consistency().is_ok());
        assert!(
            payload(Some(RequisitionStatus::Rascunho))
                .validate_consistency()
                .is_ok()
        );
        assert!(
            payload(Some(RequisitionStatus::Aprovado))
                .validate_consistency()
                .is_ok()
        );
    }

    #[test]
    fn criacao_rejeita_os_demais_status() {
        for status in [
            RequisitionStatus::Enviado,
            RequisitionStatus::EmAtendimento,
            RequisitionStatus::Entregue,
            RequisitionStatus::Reprovado,
            RequisitionStatus::Devolvido,
        ] {
            assert!(payload(Some(status)).validate_consistency().is_err());
        }
    }

    #[test]
    fn requisicao_sem_itens_e_rejeitada() {
        let mut p = payload(None);
        p.items.clear();
        assert!(p.validate().is_err());
    }
}
