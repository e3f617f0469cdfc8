// src/models/inventory.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "cycle_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CycleStatus {
    Aberto,
    Concluido,
    Ajustado,
}

// Ciclo de inventário (contagem física vs. sistema).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryCycle {
    pub id: Uuid,
    pub date: NaiveDate,
    pub responsible: String,
    pub status: CycleStatus,
    pub observation: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Contagem de um item dentro de um ciclo. A aplicação do ajuste
// sobrescreve o saldo do sistema com a quantidade contada.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditCount {
    pub item_id: Uuid,
    pub counted_qty: Decimal,
    pub price: Option<Decimal>,
}
