// src/services/requisition_service.rs

use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{PgConnection, PgPool};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        ItemRepository, RequisitionRepository,
        requisition_repo::{NewRequisition, RequisitionDraftUpdate},
    },
    models::{
        auth::{User, UserRole},
        requisition::{
            Requisition, RequisitionItem, RequisitionPriority, RequisitionStatus, TimelineEvent,
            TimelineStatus,
        },
    },
    services::stock_service::StockService,
};

// --- Entradas das operações ---

/// Linha de criação/edição: a descrição e a unidade são fotografadas do
/// catálogo na hora de montar a requisição.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequisitionLineInput {
    pub item_id: Uuid,
    pub requested_qty: Decimal,
}

/// Linha de atendimento: quanto entregar de cada item.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FulfillLine {
    pub item_id: Uuid,
    pub qty: Decimal,
}

/// Linha de devolução: quanto volta ao estoque de cada item.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReturnLine {
    pub item_id: Uuid,
    pub qty: Decimal,
}

#[derive(Debug)]
pub struct NewRequisitionInput {
    pub department: String,
    pub date: NaiveDate,
    pub priority: RequisitionPriority,
    // Restrito a RASCUNHO ou APROVADO na borda (caminho de criação rápida).
    pub status: RequisitionStatus,
    pub observations: Option<String>,
    pub items: Vec<RequisitionLineInput>,
}

#[derive(Debug, Default)]
pub struct DraftUpdateInput {
    pub department: Option<String>,
    pub date: Option<NaiveDate>,
    pub priority: Option<RequisitionPriority>,
    pub observations: Option<String>,
    pub items: Option<Vec<RequisitionLineInput>>,
}

// --- Funções puras do processador ---
// Operam sobre uma cópia de trabalho das linhas; o serviço só persiste
// quando tudo validou. Qualquer erro descarta a cópia.

/// Aplica as linhas de um atendimento: valida quantidade e pertencimento,
/// soma em fulfilled_qty. Revalida tudo aqui; o clamp da UI não é confiável.
fn apply_fulfillment(items: &mut [RequisitionItem], lines: &[FulfillLine]) -> Result<(), AppError> {
    for line in lines {
        if line.qty <= Decimal::ZERO {
            return Err(AppError::InvalidQuantity(format!(
                "Quantidade de entrega inválida para o item {}.",
                line.item_id
            )));
        }
        let item = items
            .iter_mut()
            .find(|i| i.item_id == line.item_id)
            .ok_or(AppError::ItemNotFound)?;
        if line.qty > item.remaining() {
            return Err(AppError::InvalidQuantity(format!(
                "Quantidade de entrega excede o saldo restante do item {}.",
                line.item_id
            )));
        }
        item.fulfilled_qty += line.qty;
    }
    Ok(())
}

/// Aplica as linhas de uma devolução: nunca mais do que foi entregue e
/// ainda não devolvido.
fn apply_return(items: &mut [RequisitionItem], lines: &[ReturnLine]) -> Result<(), AppError> {
    for line in lines {
        if line.qty <= Decimal::ZERO {
            return Err(AppError::InvalidQuantity(format!(
                "Quantidade de devolução inválida para o item {}.",
                line.item_id
            )));
        }
        let item = items
            .iter_mut()
            .find(|i| i.item_id == line.item_id)
            .ok_or(AppError::ItemNotFound)?;
        if line.qty > item.max_return() {
            return Err(AppError::InvalidQuantity(format!(
                "Quantidade de devolução excede o que foi entregue do item {}.",
                line.item_id
            )));
        }
        item.returned_qty += line.qty;
    }
    Ok(())
}

/// Status agregado após um atendimento: tudo entregue vira ENTREGUE,
/// entrega parcial vira EM_ATENDIMENTO, nada entregue mantém o atual.
fn recompute_status(current: RequisitionStatus, items: &[RequisitionItem]) -> RequisitionStatus {
    if !items.is_empty() && items.iter().all(RequisitionItem::is_fulfilled) {
        RequisitionStatus::Entregue
    } else if items.iter().any(|i| i.fulfilled_qty > Decimal::ZERO) {
        RequisitionStatus::EmAtendimento
    } else {
        current
    }
}

/// Tudo que saiu voltou?
fn fully_returned(items: &[RequisitionItem]) -> bool {
    items.iter().any(|i| i.fulfilled_qty > Decimal::ZERO)
        && items.iter().all(|i| i.returned_qty >= i.fulfilled_qty)
}

// --- Serviço ---

#[derive(Clone)]
pub struct RequisitionService {
    requisition_repo: RequisitionRepository,
    item_repo: ItemRepository,
    stock_service: StockService,
    pool: PgPool,
    // Devolução total promove a requisição para DEVOLVIDO?
    // Configurável: o produto ainda não bateu o martelo.
    auto_status_devolvido: bool,
}

impl RequisitionService {
    pub fn new(
        requisition_repo: RequisitionRepository,
        item_repo: ItemRepository,
        stock_service: StockService,
        pool: PgPool,
        auto_status_devolvido: bool,
    ) -> Self {
        Self {
            requisition_repo,
            item_repo,
            stock_service,
            pool,
            auto_status_devolvido,
        }
    }

    fn event(status: TimelineStatus, actor: &User, note: Option<String>) -> TimelineEvent {
        TimelineEvent {
            status,
            user_id: actor.id,
            user_name: actor.name.clone(),
            timestamp: Utc::now(),
            note,
        }
    }

    /// Rascunhos pertencem a quem os criou; só o dono (ou MASTER) mexe.
    fn ensure_owner(req: &Requisition, actor: &User) -> Result<(), AppError> {
        if req.user_id != actor.id && actor.role != UserRole::Master {
            return Err(AppError::Forbidden);
        }
        Ok(())
    }

    /// Monta as linhas fotografando descrição e unidade do catálogo.
    async fn build_lines(
        &self,
        conn: &mut PgConnection,
        lines: &[RequisitionLineInput],
    ) -> Result<Vec<RequisitionItem>, AppError> {
        let mut built = Vec::with_capacity(lines.len());
        for line in lines {
            if line.requested_qty <= Decimal::ZERO {
                return Err(AppError::InvalidQuantity(format!(
                    "Quantidade solicitada inválida para o item {}.",
                    line.item_id
                )));
            }
            let item = self
                .item_repo
                .find_by_id(&mut *conn, line.item_id)
                .await?
                .ok_or(AppError::ItemNotFound)?;
            built.push(RequisitionItem {
                item_id: item.id,
                description: item.description,
                unit: item.unit,
                requested_qty: line.requested_qty,
                fulfilled_qty: Decimal::ZERO,
                returned_qty: Decimal::ZERO,
            });
        }
        Ok(built)
    }

    pub async fn get_all(&self) -> Result<Vec<Requisition>, AppError> {
        self.requisition_repo.get_all().await
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Requisition, AppError> {
        self.requisition_repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or(AppError::RequisitionNotFound)
    }

    /// Cria a requisição em RASCUNHO (fluxo normal) ou direto em APROVADO
    /// (criação rápida). A timeline nasce com o evento do status inicial.
    pub async fn create(
        &self,
        input: NewRequisitionInput,
        actor: &User,
    ) -> Result<Requisition, AppError> {
        let mut tx = self.pool.begin().await?;

        let year = input.date.year();
        let number = self.requisition_repo.next_number(&mut *tx, year).await?;
        let items = self.build_lines(&mut tx, &input.items).await?;
        let timeline = vec![Self::event(input.status.into(), actor, None)];

        let created = self
            .requisition_repo
            .create(
                &mut *tx,
                &NewRequisition {
                    number,
                    year,
                    department: input.department,
                    user_id: actor.id,
                    user_name: actor.name.clone(),
                    date: input.date,
                    priority: input.priority,
                    status: input.status,
                    observations: input.observations,
                    items,
                    timeline,
                },
            )
            .await?;

        tx.commit().await?;
        tracing::info!(
            "Requisição {}/{} criada por {} ({:?})",
            created.number,
            created.year,
            actor.name,
            created.status
        );
        Ok(created)
    }

    /// Edição de campos enquanto a requisição ainda é rascunho.
    pub async fn update_draft(
        &self,
        id: Uuid,
        input: DraftUpdateInput,
        actor: &User,
    ) -> Result<Requisition, AppError> {
        let mut tx = self.pool.begin().await?;

        let req = self
            .requisition_repo
            .find_by_id_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::RequisitionNotFound)?;
        Self::ensure_owner(&req, actor)?;
        if req.status != RequisitionStatus::Rascunho {
            return Err(AppError::InvalidTransition {
                from: req.status,
                action: "editar",
            });
        }

        let items = match &input.items {
            Some(lines) => Some(self.build_lines(&mut tx, lines).await?),
            None => None,
        };
        let updated = self
            .requisition_repo
            .update_draft(
                &mut *tx,
                id,
                &RequisitionDraftUpdate {
                    department: input.department,
                    date: input.date,
                    priority: input.priority,
                    observations: input.observations,
                    items,
                },
            )
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// RASCUNHO -> ENVIADO, pelo dono.
    pub async fn submit(&self, id: Uuid, actor: &User) -> Result<Requisition, AppError> {
        let mut tx = self.pool.begin().await?;

        let req = self
            .requisition_repo
            .find_by_id_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::RequisitionNotFound)?;
        Self::ensure_owner(&req, actor)?;
        if !req.status.can_submit() {
            return Err(AppError::InvalidTransition {
                from: req.status,
                action: "enviar",
            });
        }

        let mut timeline = req.timeline.0;
        timeline.push(Self::event(TimelineStatus::Enviado, actor, None));
        let updated = self
            .requisition_repo
            .update_status(&mut *tx, id, RequisitionStatus::Enviado, None, &timeline)
            .await?;

        tx.commit().await?;
        tracing::info!(
            "Requisição {}/{} enviada para aprovação por {}",
            updated.number,
            updated.year,
            actor.name
        );
        Ok(updated)
    }

    /// ENVIADO -> APROVADO.
    pub async fn approve(&self, id: Uuid, actor: &User) -> Result<Requisition, AppError> {
        let mut tx = self.pool.begin().await?;

        let req = self
            .requisition_repo
            .find_by_id_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::RequisitionNotFound)?;
        if !req.status.can_review() {
            return Err(AppError::InvalidTransition {
                from: req.status,
                action: "aprovar",
            });
        }

        let mut timeline = req.timeline.0;
        timeline.push(Self::event(TimelineStatus::Aprovado, actor, None));
        let updated = self
            .requisition_repo
            .update_status(&mut *tx, id, RequisitionStatus::Aprovado, None, &timeline)
            .await?;

        tx.commit().await?;
        tracing::info!(
            "Requisição {}/{} aprovada por {}",
            updated.number,
            updated.year,
            actor.name
        );
        Ok(updated)
    }

    /// ENVIADO -> REPROVADO, com justificativa.
    pub async fn reject(
        &self,
        id: Uuid,
        reason: &str,
        actor: &User,
    ) -> Result<Requisition, AppError> {
        let mut tx = self.pool.begin().await?;

        let req = self
            .requisition_repo
            .find_by_id_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::RequisitionNotFound)?;
        if !req.status.can_review() {
            return Err(AppError::InvalidTransition {
                from: req.status,
                action: "reprovar",
            });
        }

        let mut timeline = req.timeline.0;
        timeline.push(Self::event(
            TimelineStatus::Reprovado,
            actor,
            Some(reason.to_owned()),
        ));
        let updated = self
            .requisition_repo
            .update_status(
                &mut *tx,
                id,
                RequisitionStatus::Reprovado,
                Some(reason),
                &timeline,
            )
            .await?;

        tx.commit().await?;
        tracing::info!(
            "Requisição {}/{} reprovada por {}",
            updated.number,
            updated.year,
            actor.name
        );
        Ok(updated)
    }

    /// Atendimento (total ou parcial). Baixa de estoque, linhas, status e
    /// timeline mudam juntos: uma transação, com a requisição travada.
    /// Qualquer linha inválida ou sem saldo desfaz o lote inteiro.
    pub async fn fulfill(
        &self,
        id: Uuid,
        lines: &[FulfillLine],
        actor: &User,
    ) -> Result<Requisition, AppError> {
        let mut tx = self.pool.begin().await?;

        let req = self
            .requisition_repo
            .find_by_id_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::RequisitionNotFound)?;
        if !req.status.accepts_fulfillment() {
            return Err(AppError::InvalidTransition {
                from: req.status,
                action: "atender",
            });
        }

        let mut items = req.items.0;
        apply_fulfillment(&mut items, lines)?;
        for line in lines {
            self.stock_service
                .decrease(&mut tx, line.item_id, line.qty)
                .await?;
        }

        let new_status = recompute_status(req.status, &items);
        let mut timeline = req.timeline.0;
        timeline.push(Self::event(
            TimelineStatus::Entrega,
            actor,
            Some(format!(
                "Entrega de materiais realizada. Status: {}",
                new_status.as_str()
            )),
        ));
        let updated = self
            .requisition_repo
            .store_progress(&mut *tx, id, new_status, &items, &timeline)
            .await?;

        tx.commit().await?;
        tracing::info!(
            "Requisição {}/{} atendida por {} ({} linhas, status {:?})",
            updated.number,
            updated.year,
            actor.name,
            lines.len(),
            updated.status
        );
        Ok(updated)
    }

    /// Devolução de materiais já entregues. Simétrica ao atendimento:
    /// estoque volta, returned_qty avança, um evento DEVOLUCAO na timeline.
    pub async fn return_items(
        &self,
        id: Uuid,
        lines: &[ReturnLine],
        notes: &str,
        actor: &User,
    ) -> Result<Requisition, AppError> {
        let mut tx = self.pool.begin().await?;

        let req = self
            .requisition_repo
            .find_by_id_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::RequisitionNotFound)?;
        if !req.status.accepts_return() {
            return Err(AppError::InvalidTransition {
                from: req.status,
                action: "devolver",
            });
        }

        let mut items = req.items.0;
        apply_return(&mut items, lines)?;
        for line in lines {
            self.stock_service
                .increase(&mut tx, line.item_id, line.qty)
                .await?;
        }

        let new_status = if self.auto_status_devolvido && fully_returned(&items) {
            RequisitionStatus::Devolvido
        } else {
            req.status
        };
        let mut timeline = req.timeline.0;
        timeline.push(Self::event(
            TimelineStatus::Devolucao,
            actor,
            Some(format!("Devolução: {}", notes)),
        ));
        let updated = self
            .requisition_repo
            .store_progress(&mut *tx, id, new_status, &items, &timeline)
            .await?;

        tx.commit().await?;
        tracing::info!(
            "Devolução registrada na requisição {}/{} por {}",
            updated.number,
            updated.year,
            actor.name
        );
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(requested: i64, fulfilled: i64, returned: i64) -> RequisitionItem {
        RequisitionItem {
            item_id: Uuid::new_v4(),
            description: "Parafuso sextavado".into(),
            unit: "UN".into(),
            requested_qty: Decimal::from(requested),
            fulfilled_qty: Decimal::from(fulfilled),
            returned_qty: Decimal::from(returned),
        }
    }

    fn fulfill(item: &RequisitionItem, qty: i64) -> FulfillLine {
        FulfillLine {
            item_id: item.item_id,
            qty: Decimal::from(qty),
        }
    }

    fn ret(item: &RequisitionItem, qty: i64) -> ReturnLine {
        ReturnLine {
            item_id: item.item_id,
            qty: Decimal::from(qty),
        }
    }

    #[test]
    fn entrega_total_fecha_a_requisicao() {
        // Uma linha de 10, entrega de 10: tudo entregue, status ENTREGUE.
        let mut items = vec![line(10, 0, 0)];
        let lines = vec![fulfill(&items[0], 10)];

        apply_fulfillment(&mut items, &lines).unwrap();

        assert_eq!(items[0].fulfilled_qty, Decimal::from(10));
        assert_eq!(
            recompute_status(RequisitionStatus::Aprovado, &items),
            RequisitionStatus::Entregue
        );
    }

    #[test]
    fn entrega_parcial_passa_por_em_atendimento() {
        // Entrega de 4 e depois de 6: EM_ATENDIMENTO no meio, ENTREGUE no fim.
        let mut items = vec![line(10, 0, 0)];

        apply_fulfillment(&mut items, &[fulfill(&items[0], 4)]).unwrap();
        assert_eq!(items[0].fulfilled_qty, Decimal::from(4));
        assert_eq!(
            recompute_status(RequisitionStatus::Aprovado, &items),
            RequisitionStatus::EmAtendimento
        );

        apply_fulfillment(&mut items, &[fulfill(&items[0], 6)]).unwrap();
        assert_eq!(items[0].fulfilled_qty, Decimal::from(10));
        assert_eq!(
            recompute_status(RequisitionStatus::EmAtendimento, &items),
            RequisitionStatus::Entregue
        );
    }

    #[test]
    fn entrega_acima_do_solicitado_e_rejeitada() {
        let mut items = vec![line(10, 0, 0)];
        let lines = vec![fulfill(&items[0], 11)];

        let err = apply_fulfillment(&mut items, &lines).unwrap_err();
        assert!(matches!(err, AppError::InvalidQuantity(_)));
        // Nada foi aplicado.
        assert_eq!(items[0].fulfilled_qty, Decimal::ZERO);
    }

    #[test]
    fn entrega_repetida_com_linha_completa_e_rejeitada() {
        // Saldo restante zero: qualquer quantidade positiva excede.
        let mut items = vec![line(10, 10, 0)];
        let lines = vec![fulfill(&items[0], 1)];

        assert!(apply_fulfillment(&mut items, &lines).is_err());
        assert_eq!(items[0].fulfilled_qty, Decimal::from(10));
    }

    #[test]
    fn entrega_de_quantidade_nula_ou_negativa_e_rejeitada() {
        let mut items = vec![line(10, 0, 0)];
        assert!(apply_fulfillment(&mut items, &[fulfill(&items[0], 0)]).is_err());
        assert!(apply_fulfillment(&mut items, &[fulfill(&items[0], -3)]).is_err());
    }

    #[test]
    fn entrega_de_item_fora_da_requisicao_e_rejeitada() {
        let mut items = vec![line(10, 0, 0)];
        let lines = vec![FulfillLine {
            item_id: Uuid::new_v4(),
            qty: Decimal::from(1),
        }];

        let err = apply_fulfillment(&mut items, &lines).unwrap_err();
        assert!(matches!(err, AppError::ItemNotFound));
    }

    #[test]
    fn linhas_repetidas_no_mesmo_lote_acumulam() {
        // Duas linhas para o mesmo item no mesmo lote: 6 + 4 cabem em 10,
        // mas 6 + 5 não.
        let mut items = vec![line(10, 0, 0)];
        let ok = vec![fulfill(&items[0], 6), fulfill(&items[0], 4)];
        apply_fulfillment(&mut items, &ok).unwrap();
        assert_eq!(items[0].fulfilled_qty, Decimal::from(10));

        let mut items = vec![line(10, 0, 0)];
        let overdraw = vec![fulfill(&items[0], 6), fulfill(&items[0], 5)];
        assert!(apply_fulfillment(&mut items, &overdraw).is_err());
    }

    #[test]
    fn devolucao_limitada_ao_que_foi_entregue() {
        // 4 entregues, 1 já devolvido: só cabem mais 3.
        let mut items = vec![line(10, 4, 1)];

        let err = apply_return(&mut items, &[ret(&items[0], 4)]).unwrap_err();
        assert!(matches!(err, AppError::InvalidQuantity(_)));
        assert_eq!(items[0].returned_qty, Decimal::from(1));

        apply_return(&mut items, &[ret(&items[0], 3)]).unwrap();
        assert_eq!(items[0].returned_qty, Decimal::from(4));
    }

    #[test]
    fn devolucao_nao_muda_status_por_padrao() {
        // O recompute só olha entregas; devolução mantém o status atual.
        let mut items = vec![line(10, 10, 0)];
        apply_return(&mut items, &[ret(&items[0], 10)]).unwrap();
        assert_eq!(
            recompute_status(RequisitionStatus::Entregue, &items),
            RequisitionStatus::Entregue
        );
        assert!(fully_returned(&items));
    }

    #[test]
    fn devolucao_total_exige_todas_as_linhas() {
        let items = vec![line(10, 10, 10), line(5, 5, 2)];
        assert!(!fully_returned(&items));

        let items = vec![line(10, 10, 10), line(5, 5, 5)];
        assert!(fully_returned(&items));
    }

    #[test]
    fn requisicao_sem_entrega_nao_conta_como_devolvida() {
        let items = vec![line(10, 0, 0)];
        assert!(!fully_returned(&items));
    }

    #[test]
    fn recompute_ignora_linhas_vazias() {
        // Nenhuma entrega ainda: status permanece o que era.
        let items = vec![line(10, 0, 0), line(5, 0, 0)];
        assert_eq!(
            recompute_status(RequisitionStatus::Aprovado, &items),
            RequisitionStatus::Aprovado
        );
    }

    #[test]
    fn recompute_com_varias_linhas() {
        // Uma linha completa e outra pela metade: EM_ATENDIMENTO.
        let items = vec![line(10, 10, 0), line(8, 3, 0)];
        assert_eq!(
            recompute_status(RequisitionStatus::Aprovado, &items),
            RequisitionStatus::EmAtendimento
        );

        let items = vec![line(10, 10, 0), line(8, 8, 0)];
        assert_eq!(
            recompute_status(RequisitionStatus::EmAtendimento, &items),
            RequisitionStatus::Entregue
        );
    }
}
