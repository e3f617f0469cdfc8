// src/services/inventory_service.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        InventoryCycleRepository, ItemRepository,
        inventory_repo::{CycleUpdate, NewCycle},
    },
    models::{
        auth::User,
        inventory::{AuditCount, CycleStatus, InventoryCycle},
    },
    services::stock_service::StockService,
};

#[derive(Debug)]
pub struct NewCycleInput {
    pub date: NaiveDate,
    pub responsible: String,
    pub observation: Option<String>,
}

#[derive(Clone)]
pub struct InventoryService {
    cycle_repo: InventoryCycleRepository,
    item_repo: ItemRepository,
    stock_service: StockService,
    pool: PgPool,
}

impl InventoryService {
    pub fn new(
        cycle_repo: InventoryCycleRepository,
        item_repo: ItemRepository,
        stock_service: StockService,
        pool: PgPool,
    ) -> Self {
        Self {
            cycle_repo,
            item_repo,
            stock_service,
            pool,
        }
    }

    pub async fn get_all(&self) -> Result<Vec<InventoryCycle>, AppError> {
        self.cycle_repo.get_all().await
    }

    pub async fn create(
        &self,
        input: NewCycleInput,
        actor: &User,
    ) -> Result<InventoryCycle, AppError> {
        let created = self
            .cycle_repo
            .create(
                &self.pool,
                &NewCycle {
                    date: input.date,
                    responsible: input.responsible,
                    observation: input.observation,
                    created_by: Some(actor.id),
                },
            )
            .await?;
        tracing::info!("Ciclo de inventário {} aberto por {}", created.id, actor.name);
        Ok(created)
    }

    pub async fn update(
        &self,
        id: Uuid,
        changes: &CycleUpdate,
    ) -> Result<InventoryCycle, AppError> {
        self.cycle_repo.update(id, changes).await
    }

    /// Aplica a contagem física sobre o sistema. Cada item cuja contagem
    /// difere do saldo atual é sobrescrito pelo ledger (substituição
    /// completa, sem diferencial contra atendimentos em andamento).
    /// Tudo numa transação; o ciclo fecha como AJUSTADO quando houve
    /// ajuste e CONCLUIDO quando as contagens bateram.
    pub async fn apply_audit(
        &self,
        cycle_id: Uuid,
        counts: &[AuditCount],
        actor: &User,
    ) -> Result<InventoryCycle, AppError> {
        let mut tx = self.pool.begin().await?;

        self.cycle_repo
            .find_by_id(&mut *tx, cycle_id)
            .await?
            .ok_or(AppError::CycleNotFound)?;

        let mut adjusted = 0usize;
        for count in counts {
            if count.counted_qty < Decimal::ZERO {
                return Err(AppError::InvalidQuantity(format!(
                    "Quantidade contada inválida para o item {}.",
                    count.item_id
                )));
            }
            let item = self
                .item_repo
                .find_by_id(&mut *tx, count.item_id)
                .await?
                .ok_or(AppError::ItemNotFound)?;
            let price_changed = count.price.is_some_and(|p| p != item.price);
            if item.current_stock != count.counted_qty || price_changed {
                self.stock_service
                    .overwrite(&mut tx, count.item_id, count.counted_qty, count.price)
                    .await?;
                adjusted += 1;
            }
        }

        let status = if adjusted > 0 {
            CycleStatus::Ajustado
        } else {
            CycleStatus::Concluido
        };
        let updated = self.cycle_repo.set_status(&mut *tx, cycle_id, status).await?;

        tx.commit().await?;
        tracing::info!(
            "Ciclo {} fechado por {}: {} de {} itens ajustados",
            cycle_id,
            actor.name,
            adjusted,
            counts.len()
        );
        Ok(updated)
    }
}
