pub mod alert;
pub mod asset;
pub mod auth;
pub mod filter;
pub mod page;
pub mod portfolio;
pub mod settings;
pub mod transaction;
