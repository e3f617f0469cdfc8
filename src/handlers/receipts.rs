// src/handlers/receipts.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{CanOperateWarehouse, RequireRole},
    },
    models::receipt::Receipt,
    services::receipt_service::ReceiptInput,
};

fn validate_positive(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() || val.is_zero() {
        let mut err = ValidationError::new("range");
        err.message = Some("A quantidade deve ser maior que zero.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReceiptPayload {
    #[validate(length(min = 1, message = "O número do documento é obrigatório."))]
    pub doc: String,

    #[validate(length(min = 1, message = "O fornecedor é obrigatório."))]
    pub supplier: String,

    pub date: NaiveDate,

    #[validate(length(min = 1, message = "O SKU do item é obrigatório."))]
    pub item_sku: String,

    pub original_sku: Option<String>,

    #[validate(custom(function = "validate_positive"))]
    pub quantity: Decimal,

    #[validate(length(min = 1, message = "A unidade é obrigatória."))]
    pub unit: String,

    pub lot: Option<String>,
    pub expiry: Option<NaiveDate>,
    pub unit_cost: Option<Decimal>,
    pub total_value: Option<Decimal>,
}

#[utoipa::path(
    get,
    path = "/api/receipts",
    tag = "Receipts",
    responses((status = 200, description = "Todas as entradas", body = Vec<Receipt>)),
    security(("api_jwt" = []))
)]
pub async fn list_receipts(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let receipts = app_state.receipt_service.get_all().await?;
    Ok((StatusCode::OK, Json(receipts)))
}

#[utoipa::path(
    post,
    path = "/api/receipts",
    tag = "Receipts",
    request_body = CreateReceiptPayload,
    responses((status = 201, description = "Entrada registrada", body = Receipt)),
    security(("api_jwt" = []))
)]
pub async fn create_receipt(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequireRole<CanOperateWarehouse>,
    Json(payload): Json<CreateReceiptPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let receipt = app_state
        .receipt_service
        .receive(
            ReceiptInput {
                doc: payload.doc,
                supplier: payload.supplier,
                date: payload.date,
                item_sku: payload.item_sku,
                original_sku: payload.original_sku,
                quantity: payload.quantity,
                unit: payload.unit,
                lot: payload.lot,
                expiry: payload.expiry,
                unit_cost: payload.unit_cost,
                total_value: payload.total_value,
            },
            &user,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}
