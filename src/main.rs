// src/main.rs

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, post, put},
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    // Inicializa o logger.
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Rotas de usuário (protegidas pelo middleware)
    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .route("/", get(handlers::users::list_users))
        .route(
            "/{id}",
            put(handlers::users::update_user).delete(handlers::users::delete_user),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let item_routes = Router::new()
        .route(
            "/",
            get(handlers::items::get_all_items).post(handlers::items::create_item),
        )
        .route("/alerts", get(handlers::items::get_stock_alerts))
        .route(
            "/{id}",
            put(handlers::items::update_item).delete(handlers::items::delete_item),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let requisition_routes = Router::new()
        .route(
            "/",
            get(handlers::requisitions::list_requisitions)
                .post(handlers::requisitions::create_requisition),
        )
        .route(
            "/{id}",
            get(handlers::requisitions::get_requisition)
                .put(handlers::requisitions::update_requisition),
        )
        .route("/{id}/submit", post(handlers::requisitions::submit_requisition))
        .route(
            "/{id}/approve",
            post(handlers::requisitions::approve_requisition),
        )
        .route("/{id}/reject", post(handlers::requisitions::reject_requisition))
        .route(
            "/{id}/fulfill",
            post(handlers::requisitions::fulfill_requisition),
        )
        .route(
            "/{id}/return",
            post(handlers::requisitions::return_requisition_items),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let receipt_routes = Router::new()
        .route(
            "/",
            get(handlers::receipts::list_receipts).post(handlers::receipts::create_receipt),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let inventory_routes = Router::new()
        .route(
            "/",
            get(handlers::inventories::list_cycles).post(handlers::inventories::create_cycle),
        )
        .route("/{id}", put(handlers::inventories::update_cycle))
        .route("/{id}/apply", post(handlers::inventories::apply_audit))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/items", item_routes)
        .nest("/api/requisitions", requisition_routes)
        .nest("/api/receipts", receipt_routes)
        .nest("/api/inventories", inventory_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .with_state(app_state.clone());

    // Inicia o servidor
    let listener = TcpListener::bind(&app_state.bind_addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}
