pub mod auth;
pub mod availability;
pub mod customers;
pub mod health;
pub mod query;
