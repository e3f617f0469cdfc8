// src/db/requisition_repo.rs

use chrono::NaiveDate;
use sqlx::types::Json;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::requisition::{
        Requisition, RequisitionItem, RequisitionPriority, RequisitionStatus, TimelineEvent,
    },
};

/// Dados de criação de uma requisição, já com número e linhas montados.
#[derive(Debug)]
pub struct NewRequisition {
    pub number: String,
    pub year: i32,
    pub department: String,
    pub user_id: Uuid,
    pub user_name: String,
    pub date: NaiveDate,
    pub priority: RequisitionPriority,
    pub status: RequisitionStatus,
    pub observations: Option<String>,
    pub items: Vec<RequisitionItem>,
    pub timeline: Vec<TimelineEvent>,
}

/// Campos editáveis enquanto a requisição ainda é um rascunho.
#[derive(Debug, Default)]
pub struct RequisitionDraftUpdate {
    pub department: Option<String>,
    pub date: Option<NaiveDate>,
    pub priority: Option<RequisitionPriority>,
    pub observations: Option<String>,
    pub items: Option<Vec<RequisitionItem>>,
}

#[derive(Clone)]
pub struct RequisitionRepository {
    pool: PgPool,
}

impl RequisitionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_all(&self) -> Result<Vec<Requisition>, AppError> {
        let reqs =
            sqlx::query_as::<_, Requisition>("SELECT * FROM requisitions ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;
        Ok(reqs)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Requisition>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let req = sqlx::query_as::<_, Requisition>("SELECT * FROM requisitions WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(req)
    }

    /// Carrega a requisição travando a linha até o fim da transação.
    /// Todo caminho que muta linhas/estoque passa por aqui: é o que
    /// impede dois atendimentos simultâneos sobre a mesma requisição.
    pub async fn find_by_id_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Requisition>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let req =
            sqlx::query_as::<_, Requisition>("SELECT * FROM requisitions WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(executor)
                .await?;
        Ok(req)
    }

    /// Próximo número sequencial do ano, zero-preenchido ("001", "002", ...).
    pub async fn next_number<'e, E>(&self, executor: E, year: i32) -> Result<String, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM requisitions WHERE year = $1")
                .bind(year)
                .fetch_one(executor)
                .await?;
        Ok(format!("{:03}", count + 1))
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        req: &NewRequisition,
    ) -> Result<Requisition, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let created = sqlx::query_as::<_, Requisition>(
            r#"
            INSERT INTO requisitions (
                number, year, department, user_id, user_name,
                date, priority, status, observations, items, timeline
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(&req.number)
        .bind(req.year)
        .bind(&req.department)
        .bind(req.user_id)
        .bind(&req.user_name)
        .bind(req.date)
        .bind(req.priority)
        .bind(req.status)
        .bind(req.observations.as_deref())
        .bind(Json(&req.items))
        .bind(Json(&req.timeline))
        .fetch_one(executor)
        .await?;
        Ok(created)
    }

    /// Transição simples de status (enviar / aprovar / reprovar):
    /// grava o novo status e a timeline com o evento anexado.
    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: RequisitionStatus,
        rejection_reason: Option<&str>,
        timeline: &[TimelineEvent],
    ) -> Result<Requisition, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Requisition>(
            r#"
            UPDATE requisitions
            SET status = $2,
                rejection_reason = COALESCE($3, rejection_reason),
                timeline = $4,
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(rejection_reason)
        .bind(Json(timeline))
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::RequisitionNotFound)
    }

    /// Grava o resultado de um atendimento ou devolução: linhas com as
    /// quantidades atualizadas, status recalculado e timeline estendida,
    /// numa única escrita.
    pub async fn store_progress<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: RequisitionStatus,
        items: &[RequisitionItem],
        timeline: &[TimelineEvent],
    ) -> Result<Requisition, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Requisition>(
            r#"
            UPDATE requisitions
            SET status = $2, items = $3, timeline = $4, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(Json(items))
        .bind(Json(timeline))
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::RequisitionNotFound)
    }

    /// Atualização de campos de rascunho.
    pub async fn update_draft<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        changes: &RequisitionDraftUpdate,
    ) -> Result<Requisition, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Requisition>(
            r#"
            UPDATE requisitions
            SET department = COALESCE($2, department),
                date = COALESCE($3, date),
                priority = COALESCE($4, priority),
                observations = COALESCE($5, observations),
                items = COALESCE($6, items),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.department.as_deref())
        .bind(changes.date)
        .bind(changes.priority)
        .bind(changes.observations.as_deref())
        .bind(changes.items.as_ref().map(Json))
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::RequisitionNotFound)
    }
}
