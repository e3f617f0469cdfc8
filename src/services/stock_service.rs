// src/services/stock_service.rs

use rust_decimal::Decimal;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::{common::error::AppError, db::ItemRepository, models::item::Item};

// Ledger de estoque: a única porta de escrita em items.current_stock.
// Entrada (+), atendimento (-), devolução (+) e ajuste de inventário (=)
// passam todos por aqui, sempre dentro da transação do chamador.
#[derive(Clone)]
pub struct StockService {
    item_repo: ItemRepository,
}

impl StockService {
    pub fn new(item_repo: ItemRepository) -> Self {
        Self { item_repo }
    }

    /// Entrada de estoque (recebimento ou devolução).
    pub async fn increase(
        &self,
        conn: &mut PgConnection,
        item_id: Uuid,
        qty: Decimal,
    ) -> Result<Item, AppError> {
        if qty <= Decimal::ZERO {
            return Err(AppError::InvalidQuantity(
                "A quantidade de entrada deve ser maior que zero.".into(),
            ));
        }
        self.item_repo
            .adjust_stock(&mut *conn, item_id, qty)
            .await?
            .ok_or(AppError::ItemNotFound)
    }

    /// Baixa de estoque (atendimento). Falha com InsufficientStock quando o
    /// saldo não cobre a quantidade; o UPDATE condicional garante que duas
    /// baixas concorrentes não passem juntas pela mesma verificação.
    pub async fn decrease(
        &self,
        conn: &mut PgConnection,
        item_id: Uuid,
        qty: Decimal,
    ) -> Result<Item, AppError> {
        if qty <= Decimal::ZERO {
            return Err(AppError::InvalidQuantity(
                "A quantidade de saída deve ser maior que zero.".into(),
            ));
        }
        match self
            .item_repo
            .decrease_stock_checked(&mut *conn, item_id, qty)
            .await?
        {
            Some(item) => Ok(item),
            // Zero linhas afetadas: ou o item não existe, ou o saldo é curto.
            None => match self.item_repo.find_by_id(&mut *conn, item_id).await? {
                Some(_) => Err(AppError::InsufficientStock { item_id }),
                None => Err(AppError::ItemNotFound),
            },
        }
    }

    /// Sobrescreve o saldo (ajuste de inventário). Substituição completa,
    /// sem passar pela validação de entrada/saída.
    pub async fn overwrite(
        &self,
        conn: &mut PgConnection,
        item_id: Uuid,
        qty: Decimal,
        price: Option<Decimal>,
    ) -> Result<Item, AppError> {
        if qty < Decimal::ZERO {
            return Err(AppError::InvalidQuantity(
                "A quantidade contada não pode ser negativa.".into(),
            ));
        }
        self.item_repo
            .set_stock(&mut *conn, item_id, qty, price)
            .await?
            .ok_or(AppError::ItemNotFound)
    }
}
