// src/db/item_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::item::Item};

/// Dados de criação de um item de catálogo.
#[derive(Debug)]
pub struct NewItem {
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
    pub location: String,
    pub price: Decimal,
}

/// Atualização parcial de item. O saldo (current_stock) fica de fora de
/// propósito: ele só muda pelo ledger de estoque.
#[derive(Debug, Default)]
pub struct ItemUpdate {
    pub code: Option<String>,
    pub description: Option<String>,
    pub unit: Option<String>,
    pub category: Option<String>,
    pub min_stock: Option<Decimal>,
    pub max_stock: Option<Decimal>,
    pub reorder_point: Option<Decimal>,
    pub control_lot: Option<bool>,
    pub control_expiry: Option<bool>,
    pub location: Option<String>,
    pub active: Option<bool>,
    pub price: Option<Decimal>,
}

#[derive(Clone)]
pub struct ItemRepository {
    pool: PgPool,
}

impl ItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Funções de "Leitura" (Getters)
    // ---

    pub async fn get_all(&self) -> Result<Vec<Item>, AppError> {
        let items = sqlx::query_as::<_, Item>("SELECT * FROM items ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Item>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, Item>("SELECT * FROM items WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(item)
    }

    pub async fn find_by_code<'e, E>(
        &self,
        executor: E,
        code: &str,
    ) -> Result<Option<Item>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, Item>("SELECT * FROM items WHERE code = $1")
            .bind(code)
            .fetch_optional(executor)
            .await?;
        Ok(item)
    }

    /// Itens ativos com saldo no piso do estoque mínimo (ou abaixo).
    pub async fn get_stock_alerts(&self) -> Result<Vec<Item>, AppError> {
        let items = sqlx::query_as::<_, Item>(
            "SELECT * FROM items WHERE active AND current_stock <= min_stock ORDER BY code ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    // ---
    // Funções de "Escrita"
    // ---

    pub async fn create<'e, E>(&self, executor: E, item: &NewItem) -> Result<Item, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Item>(
            r#"
            INSERT INTO items (
                code, description, unit, category,
                min_stock, max_stock, reorder_point, current_stock,
                control_lot, control_expiry, location, price
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(&item.code)
        .bind(&item.description)
        .bind(&item.unit)
        .bind(&item.category)
        .bind(item.min_stock)
        .bind(item.max_stock)
        .bind(item.reorder_point)
        .bind(item.current_stock)
        .bind(item.control_lot)
        .bind(item.control_expiry)
        .bind(&item.location)
        .bind(item.price)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::CodeAlreadyExists(item.code.clone());
                }
            }
            e.into()
        })
    }

    pub async fn update(&self, id: Uuid, changes: &ItemUpdate) -> Result<Item, AppError> {
        sqlx::query_as::<_, Item>(
            r#"
            UPDATE items SET
                code = COALESCE($2, code),
                description = COALESCE($3, description),
                unit = COALESCE($4, unit),
                category = COALESCE($5, category),
                min_stock = COALESCE($6, min_stock),
                max_stock = COALESCE($7, max_stock),
                reorder_point = COALESCE($8, reorder_point),
                control_lot = COALESCE($9, control_lot),
                control_expiry = COALESCE($10, control_expiry),
                location = COALESCE($11, location),
                active = COALESCE($12, active),
                price = COALESCE($13, price),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.code.as_deref())
        .bind(changes.description.as_deref())
        .bind(changes.unit.as_deref())
        .bind(changes.category.as_deref())
        .bind(changes.min_stock)
        .bind(changes.max_stock)
        .bind(changes.reorder_point)
        .bind(changes.control_lot)
        .bind(changes.control_expiry)
        .bind(changes.location.as_deref())
        .bind(changes.active)
        .bind(changes.price)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    let code = changes.code.clone().unwrap_or_default();
                    return AppError::CodeAlreadyExists(code);
                }
            }
            AppError::from(e)
        })?
        .ok_or(AppError::ItemNotFound)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::ItemNotFound);
        }
        Ok(())
    }

    // ---
    // Ledger de estoque
    // ---
    // Os três comandos abaixo são as únicas escritas em current_stock.

    /// Soma (ou subtrai) o delta ao saldo, de forma atômica.
    pub async fn adjust_stock<'e, E>(
        &self,
        executor: E,
        item_id: Uuid,
        delta: Decimal,
    ) -> Result<Option<Item>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, Item>(
            r#"
            UPDATE items
            SET current_stock = current_stock + $2, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(item_id)
        .bind(delta)
        .fetch_optional(executor)
        .await?;
        Ok(item)
    }

    /// Baixa condicional: só subtrai se houver saldo suficiente.
    /// O WHERE garante que duas baixas concorrentes não passem juntas
    /// pela mesma verificação de saldo.
    pub async fn decrease_stock_checked<'e, E>(
        &self,
        executor: E,
        item_id: Uuid,
        qty: Decimal,
    ) -> Result<Option<Item>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, Item>(
            r#"
            UPDATE items
            SET current_stock = current_stock - $2, updated_at = now()
            WHERE id = $1 AND current_stock >= $2
            RETURNING *
            "#,
        )
        .bind(item_id)
        .bind(qty)
        .fetch_optional(executor)
        .await?;
        Ok(item)
    }

    /// Sobrescreve o saldo (ajuste de inventário). Substituição completa,
    /// intencionalmente destrutiva; opcionalmente atualiza o preço.
    pub async fn set_stock<'e, E>(
        &self,
        executor: E,
        item_id: Uuid,
        qty: Decimal,
        price: Option<Decimal>,
    ) -> Result<Option<Item>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, Item>(
            r#"
            UPDATE items
            SET current_stock = $2, price = COALESCE($3, price), updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(item_id)
        .bind(qty)
        .bind(price)
        .fetch_optional(executor)
        .await?;
        Ok(item)
    }
}
