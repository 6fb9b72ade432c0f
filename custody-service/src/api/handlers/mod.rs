pub mod config;
pub mod health;
pub mod transactions;
pub mod wallet;
