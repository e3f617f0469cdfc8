pub mod auth_service;
pub mod inventory_service;
pub mod receipt_service;
pub mod requisition_service;
pub mod stock_service;

pub use auth_service::AuthService;
pub use inventory_service::InventoryService;
pub use receipt_service::ReceiptService;
pub use requisition_service::RequisitionService;
pub use stock_service::StockService;
