pub mod admin;
pub mod auction;
pub mod bidding;
pub mod config;
pub mod coordinator;
pub mod database;
pub mod error;
pub mod handlers;
pub mod pricing;
pub mod scheduler;
pub mod store;
