pub mod cache;
pub mod config;
pub mod db;
pub mod handlers;
pub mod media;
pub mod models;
pub mod routes;
pub mod state;
pub mod utils;
