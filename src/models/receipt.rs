// src/models/receipt.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Entrada de material (nota fiscal). Registro de auditoria: é criado
// mesmo quando o SKU informado não resolve para um item do catálogo.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub id: Uuid,
    pub doc: String,
    pub supplier: String,
    pub date: NaiveDate,
    pub item_sku: String,
    pub original_sku: Option<String>,
    pub quantity: Decimal,
    pub unit: String,
    pub lot: Option<String>,
    pub expiry: Option<NaiveDate>,
    pub unit_cost: Option<Decimal>,
    pub total_value: Option<Decimal>,
    pub status: String,
    pub user_id: Option<Uuid>,
    pub user_name: Option<String>,
    pub created_at: DateTime<Utc>,
}
