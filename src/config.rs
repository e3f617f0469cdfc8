// src/config.rs

use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{env, time::Duration};

use crate::{
    db::{
        InventoryCycleRepository, ItemRepository, ReceiptRepository, RequisitionRepository,
        UserRepository,
    },
    services::{
        AuthService, InventoryService, ReceiptService, RequisitionService, StockService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub bind_addr: String,
    pub user_repo: UserRepository,
    pub item_repo: ItemRepository,
    pub auth_service: AuthService,
    pub requisition_service: RequisitionService,
    pub receipt_service: ReceiptService,
    pub inventory_service: InventoryService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        // Devolução total promove a requisição para DEVOLVIDO? Desligado
        // por padrão; ligue com AUTO_STATUS_DEVOLVIDO=true.
        let auto_status_devolvido = env::var("AUTO_STATUS_DEVOLVIDO")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let item_repo = ItemRepository::new(db_pool.clone());
        let requisition_repo = RequisitionRepository::new(db_pool.clone());
        let receipt_repo = ReceiptRepository::new(db_pool.clone());
        let cycle_repo = InventoryCycleRepository::new(db_pool.clone());

        let stock_service = StockService::new(item_repo.clone());
        let auth_service = AuthService::new(user_repo.clone(), jwt_secret, db_pool.clone());
        let requisition_service = RequisitionService::new(
            requisition_repo,
            item_repo.clone(),
            stock_service.clone(),
            db_pool.clone(),
            auto_status_devolvido,
        );
        let receipt_service = ReceiptService::new(
            receipt_repo,
            item_repo.clone(),
            stock_service.clone(),
            db_pool.clone(),
        );
        let inventory_service = InventoryService::new(
            cycle_repo,
            item_repo.clone(),
            stock_service,
            db_pool.clone(),
        );

        Ok(Self {
            db_pool,
            bind_addr,
            user_repo,
            item_repo,
            auth_service,
            requisition_service,
            receipt_service,
            inventory_service,
        })
    }
}
