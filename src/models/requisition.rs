// src/models/requisition.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Enums ---

// Ciclo de vida de uma requisição.
// ATENDIDO existe no conjunto por compatibilidade de dados, mas nenhuma
// transição o atribui.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "requisition_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequisitionStatus {
    Rascunho,
    Enviado,
    Aprovado,
    EmAtendimento,
    Atendido,
    Entregue,
    Reprovado,
    Devolvido,
}

impl RequisitionStatus {
    /// Forma textual usada nas notas da timeline.
    pub fn as_str(self) -> &'static str {
        match self {
            RequisitionStatus::Rascunho => "RASCUNHO",
            RequisitionStatus::Enviado => "ENVIADO",
            RequisitionStatus::Aprovado => "APROVADO",
            RequisitionStatus::EmAtendimento => "EM_ATENDIMENTO",
            RequisitionStatus::Atendido => "ATENDIDO",
            RequisitionStatus::Entregue => "ENTREGUE",
            RequisitionStatus::Reprovado => "REPROVADO",
            RequisitionStatus::Devolvido => "DEVOLVIDO",
        }
    }

    /// Só rascunhos podem ser enviados para aprovação.
    pub fn can_submit(self) -> bool {
        matches!(self, RequisitionStatus::Rascunho)
    }

    /// Aprovar e reprovar atuam apenas sobre requisições enviadas.
    pub fn can_review(self) -> bool {
        matches!(self, RequisitionStatus::Enviado)
    }

    /// Entregas (totais ou parciais) exigem aprovação prévia.
    pub fn accepts_fulfillment(self) -> bool {
        matches!(
            self,
            RequisitionStatus::Aprovado | RequisitionStatus::EmAtendimento
        )
    }

    /// Devoluções só fazem sentido depois que algo foi entregue.
    pub fn accepts_return(self) -> bool {
        matches!(
            self,
            RequisitionStatus::EmAtendimento
                | RequisitionStatus::Entregue
                | RequisitionStatus::Devolvido
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "requisition_priority", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequisitionPriority {
    Baixa,
    Media,
    Alta,
    Urgente,
}

// Etiqueta dos eventos da timeline. Além dos status do ciclo de vida,
// entregas e devoluções registram eventos próprios (ENTREGA / DEVOLUCAO)
// sem mudar necessariamente o status da requisição.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimelineStatus {
    Rascunho,
    Enviado,
    Aprovado,
    EmAtendimento,
    Atendido,
    Entregue,
    Reprovado,
    Devolvido,
    Entrega,
    Devolucao,
}

impl From<RequisitionStatus> for TimelineStatus {
    fn from(status: RequisitionStatus) -> Self {
        match status {
            RequisitionStatus::Rascunho => TimelineStatus::Rascunho,
            RequisitionStatus::Enviado => TimelineStatus::Enviado,
            RequisitionStatus::Aprovado => TimelineStatus::Aprovado,
            RequisitionStatus::EmAtendimento => TimelineStatus::EmAtendimento,
            RequisitionStatus::Atendido => TimelineStatus::Atendido,
            RequisitionStatus::Entregue => TimelineStatus::Entregue,
            RequisitionStatus::Reprovado => TimelineStatus::Reprovado,
            RequisitionStatus::Devolvido => TimelineStatus::Devolvido,
        }
    }
}

// --- Linhas e timeline (JSONB) ---

// Linha de requisição. 'description' e 'unit' são fotografias do item no
// momento da criação; 'requested_qty' é imutável depois disso.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequisitionItem {
    pub item_id: Uuid,
    pub description: String,
    pub unit: String,
    pub requested_qty: Decimal,
    #[serde(default)]
    pub fulfilled_qty: Decimal,
    #[serde(default)]
    pub returned_qty: Decimal,
}

impl RequisitionItem {
    /// Quanto ainda falta entregar desta linha.
    pub fn remaining(&self) -> Decimal {
        self.requested_qty - self.fulfilled_qty
    }

    /// Quanto ainda pode ser devolvido desta linha.
    pub fn max_return(&self) -> Decimal {
        self.fulfilled_qty - self.returned_qty
    }

    pub fn is_fulfilled(&self) -> bool {
        self.fulfilled_qty >= self.requested_qty
    }
}

// Evento da trilha de auditoria. Append-only: nunca é alterado ou removido.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    pub status: TimelineStatus,
    pub user_id: Uuid,
    pub user_name: String,
    pub timestamp: DateTime<Utc>,
    pub note: Option<String>,
}

// --- Requisição ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Requisition {
    pub id: Uuid,
    pub number: String,
    pub year: i32,
    // A coluna chama 'department'; o frontend conhece como 'sector'.
    #[serde(rename = "sector")]
    pub department: String,
    #[serde(rename = "requesterId")]
    pub user_id: Uuid,
    #[serde(rename = "requesterName")]
    pub user_name: String,
    pub date: NaiveDate,
    pub priority: RequisitionPriority,
    pub status: RequisitionStatus,
    pub observations: Option<String>,
    pub rejection_reason: Option<String>,
    #[schema(value_type = Vec<RequisitionItem>)]
    pub items: Json<Vec<RequisitionItem>>,
    #[schema(value_type = Vec<TimelineEvent>)]
    pub timeline: Json<Vec<TimelineEvent>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_only_from_rascunho() {
        assert!(RequisitionStatus::Rascunho.can_submit());
        assert!(!RequisitionStatus::Enviado.can_submit());
        assert!(!RequisitionStatus::Aprovado.can_submit());
        assert!(!RequisitionStatus::Entregue.can_submit());
    }

    #[test]
    fn review_only_from_enviado() {
        assert!(RequisitionStatus::Enviado.can_review());
        assert!(!RequisitionStatus::Rascunho.can_review());
        assert!(!RequisitionStatus::Reprovado.can_review());
    }

    #[test]
    fn fulfillment_requires_approval() {
        assert!(RequisitionStatus::Aprovado.accepts_fulfillment());
        assert!(RequisitionStatus::EmAtendimento.accepts_fulfillment());
        assert!(!RequisitionStatus::Enviado.accepts_fulfillment());
        // Depois de ENTREGUE nenhuma nova entrega é aceita.
        assert!(!RequisitionStatus::Entregue.accepts_fulfillment());
        assert!(!RequisitionStatus::Reprovado.accepts_fulfillment());
    }

    #[test]
    fn returns_require_delivery() {
        assert!(RequisitionStatus::Entregue.accepts_return());
        assert!(RequisitionStatus::EmAtendimento.accepts_return());
        assert!(!RequisitionStatus::Aprovado.accepts_return());
        assert!(!RequisitionStatus::Rascunho.accepts_return());
    }

    #[test]
    fn line_bookkeeping_helpers() {
        let line = RequisitionItem {
            item_id: Uuid::new_v4(),
            description: "Luva nitrílica".into(),
            unit: "CX".into(),
            requested_qty: Decimal::from(10),
            fulfilled_qty: Decimal::from(4),
            returned_qty: Decimal::from(1),
        };
        assert_eq!(line.remaining(), Decimal::from(6));
        assert_eq!(line.max_return(), Decimal::from(3));
        assert!(!line.is_fulfilled());
    }
}
