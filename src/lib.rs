pub mod config;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod utils;
