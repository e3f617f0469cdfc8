// src/models/item.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Item de catálogo do almoxarifado.
// O saldo (current_stock) só é alterado pelo ledger de estoque:
// entrada (+), atendimento (-), devolução (+) e ajuste de inventário (=).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: Uuid,
    pub code: String,
    pub description: String,
    pub unit: String,
    pub category: String,
    pub min_stock: Decimal,
    pub max_stock: Decimal,
    pub reorder_point: Decimal,
    pub current_stock: Decimal,
    pub control_lot: bool,
    pub control_expiry: bool,
    // A coluna chama 'location'; o frontend conhece como 'defaultAddress'.
    #[serde(rename = "defaultAddress")]
    pub location: String,
    pub active: bool,
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    // Alerta de reposição: saldo atual no piso (ou abaixo) do mínimo.
    pub fn is_below_min(&self) -> bool {
        self.current_stock <= self.min_stock
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(current: i64, min: i64) -> Item {
        Item {
            id: Uuid::new_v4(),
            code: "MAT-001".into(),
            description: "Luva nitrílica".into(),
            unit: "CX".into(),
            category: "EPI".into(),
            min_stock: Decimal::from(min),
            max_stock: Decimal::from(min * 10),
            reorder_point: Decimal::from(min * 2),
            current_stock: Decimal::from(current),
            control_lot: false,
            control_expiry: false,
            location: "A-01".into(),
            active: true,
            price: Decimal::ZERO,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn alerta_no_piso_do_minimo() {
        assert!(item(5, 5).is_below_min());
        assert!(item(3, 5).is_below_min());
        assert!(!item(6, 5).is_below_min());
    }
}
