pub mod auth;
pub mod inventories;
pub mod items;
pub mod receipts;
pub mod requisitions;
pub mod users;
