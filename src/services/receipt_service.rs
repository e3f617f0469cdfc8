// src/services/receipt_service.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{ItemRepository, ReceiptRepository, receipt_repo::NewReceipt},
    models::{auth::User, receipt::Receipt},
    services::stock_service::StockService,
};

#[derive(Debug)]
pub struct ReceiptInput {
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
}

#[derive(Clone)]
pub struct ReceiptService {
    receipt_repo: ReceiptRepository,
    item_repo: ItemRepository,
    stock_service: StockService,
    pool: PgPool,
}

impl ReceiptService {
    pub fn new(
        receipt_repo: ReceiptRepository,
        item_repo: ItemRepository,
        stock_service: StockService,
        pool: PgPool,
    ) -> Self {
        Self {
            receipt_repo,
            item_repo,
            stock_service,
            pool,
        }
    }

    pub async fn get_all(&self) -> Result<Vec<Receipt>, AppError> {
        self.receipt_repo.get_all().await
    }

    /// Registra uma entrada de material. O SKU é resolvido pelo código do
    /// catálogo; se não resolver, a entrada é registrada mesmo assim e fica
    /// o aviso no log. O registro de auditoria não depende do catálogo.
    pub async fn receive(&self, input: ReceiptInput, actor: &User) -> Result<Receipt, AppError> {
        let mut tx = self.pool.begin().await?;

        match self.item_repo.find_by_code(&mut *tx, &input.item_sku).await? {
            Some(item) => {
                self.stock_service
                    .increase(&mut tx, item.id, input.quantity)
                    .await?;
            }
            None => {
                tracing::warn!(
                    "Item com código {} não encontrado para atualização de estoque.",
                    input.item_sku
                );
            }
        }

        let total_value = input
            .total_value
            .or_else(|| input.unit_cost.map(|cost| cost * input.quantity));
        let created = self
            .receipt_repo
            .create(
                &mut *tx,
                &NewReceipt {
                    doc: input.doc,
                    supplier: input.supplier,
                    date: input.date,
                    item_sku: input.item_sku,
                    original_sku: input.original_sku,
                    quantity: input.quantity,
                    unit: input.unit,
                    lot: input.lot,
                    expiry: input.expiry,
                    unit_cost: input.unit_cost,
                    total_value,
                    user_id: Some(actor.id),
                    user_name: Some(actor.name.clone()),
                },
            )
            .await?;

        tx.commit().await?;
        tracing::info!(
            "Entrada {} registrada por {} (SKU {}, qtd {})",
            created.doc,
            actor.name,
            created.item_sku,
            created.quantity
        );
        Ok(created)
    }
}
