pub mod app;
pub mod auth;
pub mod budgets;
pub mod config;
pub mod db;
pub mod error;
pub mod expenses;
pub mod memory;
pub mod state;
