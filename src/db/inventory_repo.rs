// src/db/inventory_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::inventory::{CycleStatus, InventoryCycle},
};

/// Dados de criação de um ciclo de inventário. Nasce ABERTO.
#[derive(Debug)]
pub struct NewCycle {
    pub date: NaiveDate,
    pub responsible: String,
    pub observation: Option<String>,
    pub created_by: Option<Uuid>,
}

/// Atualização parcial de ciclo.
#[derive(Debug, Default)]
pub struct CycleUpdate {
    pub date: Option<NaiveDate>,
    pub responsible: Option<String>,
    pub status: Option<CycleStatus>,
    pub observation: Option<String>,
}

#[derive(Clone)]
pub struct InventoryCycleRepository {
    pool: PgPool,
}

impl InventoryCycleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_all(&self) -> Result<Vec<InventoryCycle>, AppError> {
        let cycles =
            sqlx::query_as::<_, InventoryCycle>("SELECT * FROM inventory_cycles ORDER BY date DESC")
                .fetch_all(&self.pool)
                .await?;
        Ok(cycles)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<InventoryCycle>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let cycle =
            sqlx::query_as::<_, InventoryCycle>("SELECT * FROM inventory_cycles WHERE id = $1")
                .bind(id)
                .fetch_optional(executor)
                .await?;
        Ok(cycle)
    }

    pub async fn create<'e, E>(&self, executor: E, cycle: &NewCycle) -> Result<InventoryCycle, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let created = sqlx::query_as::<_, InventoryCycle>(
            r#"
            INSERT INTO inventory_cycles (date, responsible, observation, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(cycle.date)
        .bind(&cycle.responsible)
        .bind(cycle.observation.as_deref())
        .bind(cycle.created_by)
        .fetch_one(executor)
        .await?;
        Ok(created)
    }

    pub async fn update(&self, id: Uuid, changes: &CycleUpdate) -> Result<InventoryCycle, AppError> {
        sqlx::query_as::<_, InventoryCycle>(
            r#"
            UPDATE inventory_cycles
            SET date = COALESCE($2, date),
                responsible = COALESCE($3, responsible),
                status = COALESCE($4, status),
                observation = COALESCE($5, observation),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.date)
        .bind(changes.responsible.as_deref())
        .bind(changes.status)
        .bind(changes.observation.as_deref())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::CycleNotFound)
    }

    /// Fecha o ciclo com o resultado da reconciliação (CONCLUIDO ou AJUSTADO).
    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: CycleStatus,
    ) -> Result<InventoryCycle, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, InventoryCycle>(
            r#"
            UPDATE inventory_cycles
            SET status = $2, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::CycleNotFound)
    }
}
