// src/handlers/inventories.rs

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
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    db::inventory_repo::CycleUpdate,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{CanAudit, RequireRole},
    },
    models::inventory::{AuditCount, CycleStatus, InventoryCycle},
    services::inventory_service::NewCycleInput,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCyclePayload {
    pub date: NaiveDate,

    #[validate(length(min = 1, message = "O responsável é obrigatório."))]
    pub responsible: String,

    pub observation: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCyclePayload {
    pub date: Option<NaiveDate>,
    #[validate(length(min = 1, message = "O responsável não pode ficar vazio."))]
    pub responsible: Option<String>,
    pub status: Option<CycleStatus>,
    pub observation: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplyAuditPayload {
    #[validate(length(min = 1, message = "Informe ao menos uma contagem."))]
    pub counts: Vec<AuditCount>,
}

#[utoipa::path(
    get,
    path = "/api/inventories",
    tag = "Inventory",
    responses((status = 200, description = "Todos os ciclos", body = Vec<InventoryCycle>)),
    security(("api_jwt" = []))
)]
pub async fn list_cycles(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let cycles = app_state.inventory_service.get_all().await?;
    Ok((StatusCode::OK, Json(cycles)))
}

#[utoipa::path(
    post,
    path = "/api/inventories",
    tag = "Inventory",
    request_body = CreateCyclePayload,
    responses((status = 201, description = "Ciclo aberto", body = InventoryCycle)),
    security(("api_jwt" = []))
)]
pub async fn create_cycle(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequireRole<CanAudit>,
    Json(payload): Json<CreateCyclePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let cycle = app_state
        .inventory_service
        .create(
            NewCycleInput {
                date: payload.date,
                responsible: payload.responsible,
                observation: payload.observation,
            },
            &user,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(cycle)))
}

#[utoipa::path(
    put,
    path = "/api/inventories/{id}",
    tag = "Inventory",
    request_body = UpdateCyclePayload,
    responses(
        (status = 200, description = "Ciclo atualizado", body = InventoryCycle),
        (status = 404, description = "Ciclo não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do ciclo")),
    security(("api_jwt" = []))
)]
pub async fn update_cycle(
    State(app_state): State<AppState>,
    _guard: RequireRole<CanAudit>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCyclePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let cycle = app_state
        .inventory_service
        .update(
            id,
            &CycleUpdate {
                date: payload.date,
                responsible: payload.responsible,
                status: payload.status,
                observation: payload.observation,
            },
        )
        .await?;
    Ok((StatusCode::OK, Json(cycle)))
}

#[utoipa::path(
    post,
    path = "/api/inventories/{id}/apply",
    tag = "Inventory",
    request_body = ApplyAuditPayload,
    responses(
        (status = 200, description = "Ajuste aplicado, ciclo fechado", body = InventoryCycle),
        (status = 404, description = "Ciclo ou item não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do ciclo")),
    security(("api_jwt" = []))
)]
pub async fn apply_audit(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequireRole<CanAudit>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ApplyAuditPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let cycle = app_state
        .inventory_service
        .apply_audit(id, &payload.counts, &user)
        .await?;
    Ok((StatusCode::OK, Json(cycle)))
}
