// src/handlers/items.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError,
    config::AppState,
    db::item_repo::{ItemUpdate, NewItem},
    middleware::rbac::{CanOperateWarehouse, RequireRole},
    models::item::Item,
};

// ---
// Validação Customizada
// ---
fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

// ---
// Payload: CreateItem
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemPayload {
    #[validate(length(min = 1, message = "O código (SKU) é obrigatório."))]
    pub code: String,

    #[validate(length(min = 1, message = "A descrição é obrigatória."))]
    pub description: String,

    #[validate(length(min = 1, message = "A unidade é obrigatória."))]
    pub unit: String,

    #[validate(length(min = 1, message = "A categoria é obrigatória."))]
    pub category: String,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub min_stock: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub max_stock: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub reorder_point: Decimal,

    // Saldo de implantação. Sem informar, o item nasce zerado.
    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub current_stock: Decimal,

    #[serde(default)]
    pub control_lot: bool,

    #[serde(default)]
    pub control_expiry: bool,

    #[serde(default, rename = "defaultAddress")]
    pub location: String,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub price: Decimal,
}

impl CreateItemPayload {
    fn validate_consistency(&self) -> Result<(), ValidationError> {
        // Regra: o estoque mínimo não pode ultrapassar o máximo.
        if self.max_stock > Decimal::ZERO && self.min_stock > self.max_stock {
            return Err(ValidationError::new("MinStockAboveMax"));
        }
        Ok(())
    }
}

// ---
// Payload: UpdateItem (parcial)
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemPayload {
    #[validate(length(min = 1, message = "O código (SKU) não pode ficar vazio."))]
    pub code: Option<String>,
    pub description: Option<String>,
    pub unit: Option<String>,
    pub category: Option<String>,
    #[validate(custom(function = "validate_not_negative"))]
    pub min_stock: Option<Decimal>,
    #[validate(custom(function = "validate_not_negative"))]
    pub max_stock: Option<Decimal>,
    #[validate(custom(function = "validate_not_negative"))]
    pub reorder_point: Option<Decimal>,
    pub control_lot: Option<bool>,
    pub control_expiry: Option<bool>,
    #[serde(rename = "defaultAddress")]
    pub location: Option<String>,
    pub active: Option<bool>,
    #[validate(custom(function = "validate_not_negative"))]
    pub price: Option<Decimal>,
}

impl UpdateItemPayload {
    fn validate_consistency(&self) -> Result<(), ValidationError> {
        if let (Some(min), Some(max)) = (self.min_stock, self.max_stock) {
            if max > Decimal::ZERO && min > max {
                return Err(ValidationError::new("MinStockAboveMax"));
            }
        }
        Ok(())
    }
}

// ---
// Handlers
// ---

#[utoipa::path(
    get,
    path = "/api/items",
    tag = "Items",
    responses((status = 200, description = "Catálogo completo", body = Vec<Item>)),
    security(("api_jwt" = []))
)]
pub async fn get_all_items(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let items = app_state.item_repo.get_all().await?;
    Ok((StatusCode::OK, Json(items)))
}

#[utoipa::path(
    get,
    path = "/api/items/alerts",
    tag = "Items",
    responses((status = 200, description = "Itens ativos no estoque mínimo ou abaixo", body = Vec<Item>)),
    security(("api_jwt" = []))
)]
pub async fn get_stock_alerts(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let items = app_state.item_repo.get_stock_alerts().await?;
    Ok((StatusCode::OK, Json(items)))
}

#[utoipa::path(
    post,
    path = "/api/items",
    tag = "Items",
    request_body = CreateItemPayload,
    responses(
        (status = 201, description = "Item cadastrado", body = Item),
        (status = 409, description = "Código já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_item(
    State(app_state): State<AppState>,
    _guard: RequireRole<CanOperateWarehouse>,
    Json(payload): Json<CreateItemPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    payload.validate_consistency().map_err(|e| {
        let mut errors = validator::ValidationErrors::new();
        errors.add("minStock", e);
        AppError::ValidationError(errors)
    })?;

    let item = app_state
        .item_repo
        .create(
            &app_state.db_pool,
            &NewItem {
                code: payload.code,
                description: payload.description,
                unit: payload.unit,
                category: payload.category,
                min_stock: payload.min_stock,
                max_stock: payload.max_stock,
                reorder_point: payload.reorder_point,
                current_stock: payload.current_stock,
                control_lot: payload.control_lot,
                control_expiry: payload.control_expiry,
                location: payload.location,
                price: payload.price,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

#[utoipa::path(
    put,
    path = "/api/items/{id}",
    tag = "Items",
    request_body = UpdateItemPayload,
    responses(
        (status = 200, description = "Item atualizado", body = Item),
        (status = 404, description = "Item não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do item")),
    security(("api_jwt" = []))
)]
pub async fn update_item(
    State(app_state): State<AppState>,
    _guard: RequireRole<CanOperateWarehouse>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateItemPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    payload.validate_consistency().map_err(|e| {
        let mut errors = validator::ValidationErrors::new();
        errors.add("minStock", e);
        AppError::ValidationError(errors)
    })?;

    let item = app_state
        .item_repo
        .update(
            id,
            &ItemUpdate {
                code: payload.code,
                description: payload.description,
                unit: payload.unit,
                category: payload.category,
                min_stock: payload.min_stock,
                max_stock: payload.max_stock,
                reorder_point: payload.reorder_point,
                control_lot: payload.control_lot,
                control_expiry: payload.control_expiry,
                location: payload.location,
                active: payload.active,
                price: payload.price,
            },
        )
        .await?;
    Ok((StatusCode::OK, Json(item)))
}

#[utoipa::path(
    delete,
    path = "/api/items/{id}",
    tag = "Items",
    responses(
        (status = 204, description = "Item removido"),
        (status = 404, description = "Item não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do item")),
    security(("api_jwt" = []))
)]
pub async fn delete_item(
    State(app_state): State<AppState>,
    _guard: RequireRole<CanOperateWarehouse>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.item_repo.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_payload() -> CreateItemPayload {
        CreateItemPayload {
            code: "MAT-001".into(),
            description: "Luva nitrílica".into(),
            unit: "CX".into(),
            category: "EPI".into(),
            min_stock: Decimal::from(5),
            max_stock: Decimal::from(50),
            reorder_point: Decimal::from(10),
            current_stock: Decimal::ZERO,
            control_lot: false,
            control_expiry: false,
            location: "A-01".into(),
            price: Decimal::ZERO,
        }
    }

    #[test]
    fn minimo_acima_do_maximo_e_rejeitado() {
        let mut payload = base_payload();
        payload.min_stock = Decimal::from(60);
        assert!(payload.validate_consistency().is_err());
    }

    #[test]
    fn maximo_zerado_nao_restringe_o_minimo() {
        let mut payload = base_payload();
        payload.max_stock = Decimal::ZERO;
        payload.min_stock = Decimal::from(5);
        assert!(payload.validate_consistency().is_ok());
    }

    #[test]
    fn quantidades_negativas_sao_rejeitadas() {
        let mut payload = base_payload();
        payload.current_stock = Decimal::from(-1);
        assert!(payload.validate().is_err());
    }
}
