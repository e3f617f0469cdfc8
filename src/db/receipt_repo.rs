// src/db/receipt_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::receipt::Receipt};

/// Dados de criação de uma entrada de material. O status usa o default
/// do banco ('CONCLUIDO').
#[derive(Debug)]
pub struct NewReceipt {
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
    pub user_id: Option<Uuid>,
    pub user_name: Option<String>,
}

#[derive(Clone)]
pub struct ReceiptRepository {
    pool: PgPool,
}

impl ReceiptRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_all(&self) -> Result<Vec<Receipt>, AppError> {
        let receipts =
            sqlx::query_as::<_, Receipt>("SELECT * FROM receipts ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;
        Ok(receipts)
    }

    pub async fn create<'e, E>(&self, executor: E, receipt: &NewReceipt) -> Result<Receipt, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let created = sqlx::query_as::<_, Receipt>(
            r#"
            INSERT INTO receipts (
                doc, supplier, date, item_sku, original_sku,
                quantity, unit, lot, expiry, unit_cost, total_value,
                user_id, user_name
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(&receipt.doc)
        .bind(&receipt.supplier)
        .bind(receipt.date)
        .bind(&receipt.item_sku)
        .bind(receipt.original_sku.as_deref())
        .bind(receipt.quantity)
        .bind(&receipt.unit)
        .bind(receipt.lot.as_deref())
        .bind(receipt.expiry)
        .bind(receipt.unit_cost)
        .bind(receipt.total_value)
        .bind(receipt.user_id)
        .bind(receipt.user_name.as_deref())
        .fetch_one(executor)
        .await?;
        Ok(created)
    }
}
