// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};

use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,
        handlers::users::list_users,
        handlers::users::update_user,
        handlers::users::delete_user,

        // --- Items ---
        handlers::items::get_all_items,
        handlers::items::get_stock_alerts,
        handlers::items::create_item,
        handlers::items::update_item,
        handlers::items::delete_item,

        // --- Requisitions ---
        handlers::requisitions::list_requisitions,
        handlers::requisitions::get_requisition,
        handlers::requisitions::create_requisition,
        handlers::requisitions::update_requisition,
        handlers::requisitions::submit_requisition,
        handlers::requisitions::approve_requisition,
        handlers::requisitions::reject_requisition,
        handlers::requisitions::fulfill_requisition,
        handlers::requisitions::return_requisition_items,

        // --- Receipts ---
        handlers::receipts::list_receipts,
        handlers::receipts::create_receipt,

        // --- Inventory ---
        handlers::inventories::list_cycles,
        handlers::inventories::create_cycle,
        handlers::inventories::update_cycle,
        handlers::inventories::apply_audit,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Items ---
            models::item::Item,
            handlers::items::CreateItemPayload,
            handlers::items::UpdateItemPayload,

            // --- Requisitions ---
            models::requisition::RequisitionStatus,
            models::requisition::RequisitionPriority,
            models::requisition::TimelineStatus,
            models::requisition::RequisitionItem,
            models::requisition::TimelineEvent,
            models::requisition::Requisition,
            services::requisition_service::RequisitionLineInput,
            services::requisition_service::FulfillLine,
            services::requisition_service::ReturnLine,
            handlers::requisitions::CreateRequisitionPayload,
            handlers::requisitions::UpdateRequisitionPayload,
            handlers::requisitions::RejectPayload,
            handlers::requisitions::FulfillPayload,
            handlers::requisitions::ReturnPayload,

            // --- Receipts ---
            models::receipt::Receipt,
            handlers::receipts::CreateReceiptPayload,

            // --- Inventory ---
            models::inventory::CycleStatus,
            models::inventory::InventoryCycle,
            models::inventory::AuditCount,
            handlers::inventories::CreateCyclePayload,
            handlers::inventories::UpdateCyclePayload,
            handlers::inventories::ApplyAuditPayload,

            // --- Users ---
            handlers::users::UpdateUserPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Perfis e Administração de Usuários"),
        (name = "Items", description = "Catálogo do Almoxarifado"),
        (name = "Requisitions", description = "Requisições de Material e Ciclo de Vida"),
        (name = "Receipts", description = "Entradas de Material"),
        (name = "Inventory", description = "Ciclos de Inventário e Ajustes")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
